use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::constants::{defaults, env};
use crate::error::AssistantError;
use crate::gateway::{
    ClaudeClient, CompletionGateway, GenerationParams, OllamaClient, OpenAIClient, ProviderId,
    ProxyClient,
};
use crate::prompt;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub assistant: AssistantSettings,
    #[serde(default)]
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    pub provider: ProviderId,
    /// Empty in the file means the provider's default model.
    #[serde(default)]
    pub model: String,
    /// Name of the environment variable holding the credential, never the key itself.
    #[serde(default)]
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Zero disables the timeout.
    pub request_timeout_secs: u64,
    pub school_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub theme: String,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        let provider = ProviderId::OpenAI;
        Self {
            provider,
            model: provider.default_model().to_string(),
            api_key_env: provider.default_api_key_env().to_string(),
            base_url: None,
            max_tokens: defaults::MAX_TOKENS,
            temperature: defaults::TEMPERATURE,
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            school_name: defaults::SCHOOL_NAME.to_string(),
        }
    }
}

impl AssistantSettings {
    /// Resolve fields the file left out against the configured provider.
    fn fill_provider_defaults(&mut self) {
        if self.model.trim().is_empty() {
            self.model = self.provider.default_model().to_string();
        }
        if self.api_key_env.trim().is_empty() {
            self.api_key_env = self.provider.default_api_key_env().to_string();
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme: defaults::THEME.to_string(),
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("brightminds")
            .join("config.toml")
    }

    /// Load the user config file, then apply environment overrides.
    pub fn load() -> Self {
        let mut settings = Self::load_from(&Self::config_path());
        settings.apply_env_overrides();
        settings
    }

    /// Read settings from `path`; a missing or unparsable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Self>(&content) {
                Ok(mut settings) => {
                    settings.assistant.fill_provider_defaults();
                    settings
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "ignoring invalid config: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), "cannot read config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), AssistantError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AssistantError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AssistantError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply `BRIGHTMINDS_PROVIDER` / `BRIGHTMINDS_BASE_URL` as read by `lookup`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(env::PROVIDER).filter(|v| !v.trim().is_empty()) {
            match raw.parse::<ProviderId>() {
                Ok(id) => self.set_provider(id),
                Err(e) => tracing::warn!("{}: {e}", env::PROVIDER),
            }
        }
        if let Some(url) = lookup(env::BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.assistant.base_url = Some(url.trim().to_string());
        }
    }

    /// Switch vendor, resetting model and credential variable to that vendor's defaults.
    pub fn set_provider(&mut self, provider: ProviderId) {
        if self.assistant.provider == provider {
            return;
        }
        self.assistant.provider = provider;
        self.assistant.model = provider.default_model().to_string();
        self.assistant.api_key_env = provider.default_api_key_env().to_string();
        self.assistant.base_url = None;
    }

    /// Get the API key from the environment variable named in settings.
    pub fn api_key(&self) -> Option<String> {
        if self.assistant.api_key_env.is_empty() {
            return None;
        }
        std::env::var(&self.assistant.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.assistant.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_tokens: self.assistant.max_tokens,
            temperature: self.assistant.temperature,
        }
    }

    pub fn base_url(&self) -> &str {
        self.assistant
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.assistant.provider.default_base_url())
    }

    /// Build the completion gateway for the configured provider.
    pub fn build_gateway(&self) -> Result<Arc<dyn CompletionGateway>, AssistantError> {
        let provider = self.assistant.provider;
        let system = prompt::system_instruction(&self.assistant.school_name);
        let base_url = self.base_url().trim_end_matches('/').to_string();
        let timeout = self.request_timeout();
        let params = self.generation_params();

        let api_key = if provider.needs_api_key() {
            Some(
                self.api_key()
                    .ok_or_else(|| AssistantError::MissingCredential(self.assistant.api_key_env.clone()))?,
            )
        } else {
            None
        };

        tracing::debug!(provider = provider.as_str(), %base_url, "building completion gateway");

        let gateway: Arc<dyn CompletionGateway> = match provider {
            ProviderId::OpenAI => Arc::new(
                OpenAIClient::new(api_key.unwrap_or_default(), system)
                    .with_model(&self.assistant.model)
                    .with_base_url(base_url)
                    .with_params(params)
                    .with_timeout(timeout),
            ),
            ProviderId::Claude => Arc::new(
                ClaudeClient::new(api_key.unwrap_or_default(), system)
                    .with_model(&self.assistant.model)
                    .with_base_url(base_url)
                    .with_params(params)
                    .with_timeout(timeout),
            ),
            ProviderId::Ollama => Arc::new(
                OllamaClient::new(system)
                    .with_model(&self.assistant.model)
                    .with_base_url(base_url)
                    .with_params(params)
                    .with_timeout(timeout),
            ),
            ProviderId::Proxy => Arc::new(
                ProxyClient::new()
                    .with_base_url(base_url)
                    .with_timeout(timeout),
            ),
        };
        Ok(gateway)
    }
}
