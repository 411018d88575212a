use crate::constants::{endpoints, models};
use crate::error::AssistantError;
use crate::gateway::classify::{classify_status, transport_error};
use crate::gateway::traits::*;
use crate::prompt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for a local Ollama server's `/api/chat`. No credential.
pub struct OllamaClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
    system: String,
    params: GenerationParams,
    timeout: Option<Duration>,
}

impl OllamaClient {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            model: models::DEFAULT_OLLAMA_MODEL.to_string(),
            base_url: endpoints::OLLAMA_BASE_URL.to_string(),
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
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
}

#[async_trait::async_trait]
impl CompletionGateway for OllamaClient {
    async fn complete(
        &self,
        history: &[Message],
        user_text: &str,
    ) -> Result<String, AssistantError> {
        let url = format!("{}/api/chat", self.base_url);
        let messages = prompt::build_messages(&self.system, history, user_text);
        let request_body = OllamaChatRequest {
            model: &self.model,
            messages: &messages,
            stream: false,
            options: OllamaOptions {
                temperature: self.params.temperature,
                num_predict: self.params.max_tokens,
            },
        };

        tracing::debug!(model = %self.model, turns = messages.len(), "ollama chat request");

        let mut request = self.client.post(&url).json(&request_body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let response_text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &response_text));
        }

        let chat: OllamaChatResponse = serde_json::from_str(&response_text)?;
        Ok(chat
            .message
            .map(|m| m.content.trim().to_string())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "Ollama"
    }
}
