mod traits;
mod claude;
mod openai;
mod ollama;
mod proxy;
pub mod classify;
pub mod provider;

pub use traits::*;
pub use claude::ClaudeClient;
pub use openai::OpenAIClient;
pub use ollama::OllamaClient;
pub use proxy::ProxyClient;
pub use provider::ProviderId;
