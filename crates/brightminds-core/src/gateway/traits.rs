use crate::error::AssistantError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Only ever produced by request shaping; never stored in a transcript.
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Generation limits applied to every outbound request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: crate::constants::defaults::MAX_TOKENS,
            temperature: crate::constants::defaults::TEMPERATURE,
        }
    }
}

/// One remote call per visitor turn. Implementations shape the request for
/// their vendor and classify failures into [`AssistantError`] variants.
#[async_trait::async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Send the prior turns plus the new user text and return the raw reply.
    /// An empty string means the service answered without any text.
    async fn complete(&self, history: &[Message], user_text: &str)
        -> Result<String, AssistantError>;

    /// Short human-readable label, used in logs and the status bar.
    fn name(&self) -> &str;
}
