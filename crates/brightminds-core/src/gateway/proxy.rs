use crate::constants::endpoints;
use crate::error::AssistantError;
use crate::gateway::classify::{classify_status, transport_error};
use crate::gateway::traits::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Posts the visitor's text to the site's own `/api/chat` endpoint.
///
/// The proxy keeps the instruction and the vendor credential server-side, so
/// only the new message is sent and the local transcript is not replayed.
pub struct ProxyClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl ProxyClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: endpoints::PROXY_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ProxyClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
struct ProxyRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProxyReply {
    reply: Option<String>,
}

#[async_trait::async_trait]
impl CompletionGateway for ProxyClient {
    async fn complete(
        &self,
        _history: &[Message],
        user_text: &str,
    ) -> Result<String, AssistantError> {
        let url = format!("{}/api/chat", self.base_url);

        tracing::debug!(%url, "proxy chat request");

        let mut request = self
            .client
            .post(&url)
            .json(&ProxyRequest { message: user_text });
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let response_text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &response_text));
        }

        let body: ProxyReply = serde_json::from_str(&response_text)?;
        Ok(body.reply.map(|r| r.trim().to_string()).unwrap_or_default())
    }

    fn name(&self) -> &str {
        "Site proxy"
    }
}
