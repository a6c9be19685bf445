//! Session struct and conversation state.

use std::sync::Mutex;

use divine_common::SessionId;
use tracing::debug;

use crate::token_tracker::TokenTracker;
use crate::{Message, Role};

/// A persona-bound conversation with the remote model.
pub struct Session {
    id: SessionId,
    persona: String,
    model: String,
    /// Completed exchanges, oldest first. The async lock is held for a whole
    /// exchange so turns reach the endpoint in arrival order.
    pub(super) history: tokio::sync::Mutex<Vec<Message>>,
    pub(super) tracker: Mutex<TokenTracker>,
}

impl Session {
    pub fn new(persona: impl Into<String>, model: impl Into<String>) -> Self {
        let session = Self {
            id: SessionId::new(),
            persona: persona.into(),
            model: model.into(),
            history: tokio::sync::Mutex::new(Vec::new()),
            tracker: Mutex::new(TokenTracker::new()),
        };
        debug!(session = %session.id, model = %session.model, "Chat session created");
        session
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Snapshot of token usage so far.
    pub fn usage(&self) -> TokenTracker {
        self.tracker
            .lock()
            .map(|t| t.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Number of messages in history. Waits for any in-flight exchange.
    pub async fn message_count(&self) -> usize {
        self.history.lock().await.len()
    }

    /// Copy of the completed history. Waits for any in-flight exchange.
    pub async fn messages(&self) -> Vec<Message> {
        self.history.lock().await.clone()
    }

    /// Persona followed by history and the pending user turn.
    pub(super) fn build_messages(&self, history: &[Message], user_message: &str) -> Vec<Message> {
        let mut msgs = Vec::with_capacity(history.len() + 2);
        msgs.push(Message::new(Role::System, self.persona.clone()));
        msgs.extend_from_slice(history);
        msgs.push(Message::new(Role::User, user_message));
        msgs
    }
}
