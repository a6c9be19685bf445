//! AI engine for Divine.
//!
//! Provides the remote chat endpoint abstraction and its Gemini
//! implementation, plus:
//! - a persona-bound chat `Session` that keeps turn history
//! - the `SessionManager`, which owns one lazily created session and
//!   turns every failed exchange into an in-character fallback reply
//! - SSE streaming, token usage tracking, and Whisper dictation

pub mod gemini;
pub mod manager;
pub mod persona;
pub mod session;
pub mod streaming;
pub mod token_tracker;
pub mod whisper;

#[cfg(test)]
mod testing;

use async_trait::async_trait;

pub use gemini::{GeminiClient, GeminiConfig};
pub use manager::{SessionManager, SessionState, FALLBACK_MESSAGE};
pub use persona::PERSONA_INSTRUCTION;
pub use session::Session;
pub use token_tracker::TokenTracker;
pub use whisper::{WhisperClient, WhisperConfig};

/// Callback receiving each streamed text chunk as it arrives.
pub type ChunkCallback = Box<dyn Fn(String) + Send + Sync>;

/// A hosted chat model. Implementations are stateless request/response
/// clients; conversation state lives in [`Session`].
#[async_trait]
pub trait AiClient: Send + Sync {
    async fn send_message(&self, messages: &[Message]) -> Result<AiResponse, AiError>;

    async fn send_message_streaming(
        &self,
        messages: &[Message],
        on_chunk: ChunkCallback,
    ) -> Result<AiResponse, AiError>;
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone)]
pub struct AiResponse {
    pub content: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
    #[error("{0} environment variable not set")]
    MissingCredential(&'static str),
}

impl AiError {
    /// Classify a transport error from `reqwest`.
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}
