use crate::constants::{endpoints, models};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifies which backend answers the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAI,
    Claude,
    Ollama,
    Proxy,
}

impl ProviderId {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Claude => "Claude (Anthropic)",
            Self::Ollama => "Ollama (Local)",
            Self::Proxy => "Site proxy (/api/chat)",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Claude => "claude",
            Self::Ollama => "ollama",
            Self::Proxy => "proxy",
        }
    }

    /// Only the hosted vendors need a credential; Ollama is local and the
    /// proxy holds its own.
    pub fn needs_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Claude)
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAI => endpoints::OPENAI_BASE_URL,
            Self::Claude => endpoints::CLAUDE_BASE_URL,
            Self::Ollama => endpoints::OLLAMA_BASE_URL,
            Self::Proxy => endpoints::PROXY_BASE_URL,
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Claude => "ANTHROPIC_API_KEY",
            Self::Ollama | Self::Proxy => "",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAI => models::DEFAULT_OPENAI_MODEL,
            Self::Claude => models::DEFAULT_CLAUDE_MODEL,
            Self::Ollama => models::DEFAULT_OLLAMA_MODEL,
            Self::Proxy => "",
        }
    }

    pub fn all() -> Vec<ProviderId> {
        vec![Self::OpenAI, Self::Claude, Self::Ollama, Self::Proxy]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "chatgpt" => Ok(Self::OpenAI),
            "claude" | "anthropic" => Ok(Self::Claude),
            "ollama" => Ok(Self::Ollama),
            "proxy" | "api" => Ok(Self::Proxy),
            other => Err(format!(
                "unknown provider '{other}' (expected openai, claude, ollama or proxy)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("OpenAI".parse::<ProviderId>(), Ok(ProviderId::OpenAI));
        assert_eq!("anthropic".parse::<ProviderId>(), Ok(ProviderId::Claude));
        assert_eq!(" ollama ".parse::<ProviderId>(), Ok(ProviderId::Ollama));
        assert_eq!("proxy".parse::<ProviderId>(), Ok(ProviderId::Proxy));
        assert!("gemini".parse::<ProviderId>().is_err());
    }

    #[test]
    fn as_str_round_trips() {
        for id in ProviderId::all() {
            assert_eq!(id.as_str().parse::<ProviderId>(), Ok(id));
        }
    }

    #[test]
    fn only_hosted_vendors_need_keys() {
        assert!(ProviderId::OpenAI.needs_api_key());
        assert!(ProviderId::Claude.needs_api_key());
        assert!(!ProviderId::Ollama.needs_api_key());
        assert!(!ProviderId::Proxy.needs_api_key());
        assert_eq!(ProviderId::Proxy.default_api_key_env(), "");
    }
}
