use crate::constants::{endpoints, models};
use crate::error::AssistantError;
use crate::gateway::classify::{classify_status, transport_error};
use crate::gateway::traits::*;
use crate::prompt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI chat completions. Also works against any server exposing the same
/// `/v1/chat/completions` shape via [`OpenAIClient::with_base_url`].
pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    system: String,
    params: GenerationParams,
    timeout: Option<Duration>,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: models::DEFAULT_OPENAI_MODEL.to_string(),
            base_url: endpoints::OPENAI_BASE_URL.to_string(),
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

    fn build_request<'a>(&'a self, messages: &'a [Message]) -> OpenAIRequest<'a> {
        OpenAIRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[async_trait::async_trait]
impl CompletionGateway for OpenAIClient {
    async fn complete(
        &self,
        history: &[Message],
        user_text: &str,
    ) -> Result<String, AssistantError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let messages = prompt::build_messages(&self.system, history, user_text);
        let request_body = self.build_request(&messages);

        tracing::debug!(model = %self.model, turns = messages.len(), "openai chat request");

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
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

        let api_response: OpenAIResponse = serde_json::from_str(&response_text)?;
        Ok(api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "OpenAI"
    }
}
