/// Bright Minds assistant — centralized constants.
/// Endpoints, default models and generation limits live here.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
    pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-haiku-20241022";
    pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:3b";
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
    pub const CLAUDE_BASE_URL: &str = "https://api.anthropic.com";
    pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";
    /// Same-origin proxy; the site serves `/api/chat` next to its pages.
    pub const PROXY_BASE_URL: &str = "http://localhost:3000";

    pub const CLAUDE_API_VERSION: &str = "2023-06-01";
}

// ─── Default Settings ─────────────────────────────────────────────────────────

pub mod defaults {
    pub const SCHOOL_NAME: &str = "AMUN Bright Minds Academy";
    pub const MAX_TOKENS: u32 = 300;
    pub const TEMPERATURE: f32 = 0.7;
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;
    pub const THEME: &str = "dark";
}

// ─── Environment ──────────────────────────────────────────────────────────────

pub mod env {
    /// Overrides `assistant.provider` from the config file.
    pub const PROVIDER: &str = "BRIGHTMINDS_PROVIDER";
    /// Overrides `assistant.base_url` from the config file.
    pub const BASE_URL: &str = "BRIGHTMINDS_BASE_URL";
}
