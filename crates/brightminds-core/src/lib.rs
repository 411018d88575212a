pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod prompt;
pub mod session;

// Re-export key types
pub use config::Settings;
pub use error::{AssistantError, FailureKind};
pub use gateway::{CompletionGateway, Message, ProviderId, Role};
pub use session::{ChatSession, RejectReason, SessionEvent, SessionSnapshot, SubmitOutcome, Transcript};
