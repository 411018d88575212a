use crate::constants::{endpoints, models};
use crate::error::AssistantError;
use crate::gateway::classify::{classify_status, transport_error};
use crate::gateway::traits::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    system: String,
    params: GenerationParams,
    timeout: Option<Duration>,
}

impl ClaudeClient {
    pub fn new(api_key: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: models::DEFAULT_CLAUDE_MODEL.to_string(),
            base_url: endpoints::CLAUDE_BASE_URL.to_string(),
            system: system.into(),
            params: GenerationParams::default(),
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_request<'a>(&'a self, history: &'a [Message], user_text: &'a str) -> ClaudeRequest<'a> {
        // The instruction travels in `system`; the message list holds only turns.
        let mut messages: Vec<ClaudeMessage> = history
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| ClaudeMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect();
        messages.push(ClaudeMessage {
            role: Role::User.as_str(),
            content: user_text,
        });

        ClaudeRequest {
            model: &self.model,
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            system: &self.system,
            messages,
        }
    }
}

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<ClaudeMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClaudeApiResponse {
    #[serde(default)]
    content: Vec<ClaudeContent>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[async_trait::async_trait]
impl CompletionGateway for ClaudeClient {
    async fn complete(
        &self,
        history: &[Message],
        user_text: &str,
    ) -> Result<String, AssistantError> {
        let url = format!("{}/v1/messages", self.base_url);
        let request_body = self.build_request(history, user_text);

        tracing::debug!(
            model = %self.model,
            turns = request_body.messages.len(),
            "claude messages request"
        );

        let mut request = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", endpoints::CLAUDE_API_VERSION)
            .header("content-type", "application/json")
            .json(&request_body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let response_text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &response_text));
        }

        let api_response: ClaudeApiResponse = serde_json::from_str(&response_text)?;
        Ok(api_response
            .content
            .iter()
            .find(|c| c.content_type == "text")
            .map(|c| c.text.trim().to_string())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "Claude"
    }
}
