pub mod config;
pub mod error;
pub mod llm;
pub mod relay;
pub mod routes;

pub use error::RelayError;
pub use llm::{CompletionBackend, CompletionChunk, OpenAiBackend, SYSTEM_PROMPT};
pub use routes::{app, AppState};
