//! Process-wide session manager.
//!
//! Owns the one chat session of the process, created on first use with the
//! fixed persona, and exposes `ask`, which always produces a reply: either
//! the model's text or [`FALLBACK_MESSAGE`].

use std::sync::{Arc, OnceLock};

use tracing::{error, info};

use crate::gemini::{GeminiClient, GeminiConfig};
use crate::persona::PERSONA_INSTRUCTION;
use crate::session::Session;
use crate::token_tracker::TokenTracker;
use crate::{AiClient, AiError, ChunkCallback};

/// Reply given in place of any failed exchange.
pub const FALLBACK_MESSAGE: &str =
    "My child, there seems to be a disturbance in the cosmic connection. Please try again later.";

/// Whether the session has been created yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
}

pub struct SessionManager {
    client: Arc<dyn AiClient>,
    persona: String,
    model: String,
    session: OnceLock<Arc<Session>>,
}

impl SessionManager {
    /// Manager bound to the standard persona.
    pub fn new(client: Arc<dyn AiClient>, model: impl Into<String>) -> Self {
        Self::with_persona(client, model, PERSONA_INSTRUCTION)
    }

    pub fn with_persona(
        client: Arc<dyn AiClient>,
        model: impl Into<String>,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            client,
            persona: persona.into(),
            model: model.into(),
            session: OnceLock::new(),
        }
    }

    /// Manager talking to Gemini. The credential is already resolved in
    /// `config`, so nothing here can fail later for lack of one.
    pub fn gemini(config: GeminiConfig) -> Self {
        let model = config.model.clone();
        Self::new(Arc::new(GeminiClient::new(config)), model)
    }

    /// The session, created with the persona on first call and shared by
    /// every later call.
    pub fn session(&self) -> &Arc<Session> {
        self.session.get_or_init(|| {
            info!(model = %self.model, "Opening chat session");
            Arc::new(Session::new(self.persona.clone(), self.model.clone()))
        })
    }

    pub fn state(&self) -> SessionState {
        if self.session.get().is_some() {
            SessionState::Ready
        } else {
            SessionState::Uninitialized
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Token usage so far; empty before the first exchange.
    pub fn usage(&self) -> TokenTracker {
        self.session
            .get()
            .map(|s| s.usage())
            .unwrap_or_default()
    }

    /// Send `user_text` as the next turn. Never fails: errors are logged
    /// and replaced by [`FALLBACK_MESSAGE`].
    pub async fn ask(&self, user_text: &str) -> String {
        self.try_ask(user_text)
            .await
            .unwrap_or_else(|e| self.fallback(&e))
    }

    /// Streaming variant of [`ask`](Self::ask). Chunks already forwarded
    /// before a failure are not retracted; the return value is still the
    /// fallback.
    pub async fn ask_streaming(&self, user_text: &str, on_chunk: ChunkCallback) -> String {
        self.try_ask_streaming(user_text, on_chunk)
            .await
            .unwrap_or_else(|e| self.fallback(&e))
    }

    /// The exchange with its failure detail intact.
    pub async fn try_ask(&self, user_text: &str) -> Result<String, AiError> {
        reject_blank(user_text)?;
        self.session().chat(self.client.as_ref(), user_text).await
    }

    pub async fn try_ask_streaming(
        &self,
        user_text: &str,
        on_chunk: ChunkCallback,
    ) -> Result<String, AiError> {
        reject_blank(user_text)?;
        self.session()
            .chat_streaming(self.client.as_ref(), user_text, on_chunk)
            .await
    }

    fn fallback(&self, err: &AiError) -> String {
        let session = self.session.get().map(|s| s.id().to_string());
        error!(error = %err, session = ?session, "Error getting answer from model");
        FALLBACK_MESSAGE.to_string()
    }
}

fn reject_blank(user_text: &str) -> Result<(), AiError> {
    if user_text.trim().is_empty() {
        return Err(AiError::ApiError("refusing to send an empty message".into()));
    }
    Ok(())
}
