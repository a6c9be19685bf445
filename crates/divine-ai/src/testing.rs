//! In-memory `AiClient` fakes shared by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{AiClient, AiError, AiResponse, ChunkCallback, Message, Role, TokenUsage};

fn usage() -> TokenUsage {
    TokenUsage {
        input_tokens: 1,
        output_tokens: 1,
    }
}

/// Replies with the last user message unchanged.
#[derive(Default)]
pub(crate) struct EchoClient;

#[async_trait]
impl AiClient for EchoClient {
    async fn send_message(&self, messages: &[Message]) -> Result<AiResponse, AiError> {
        let content = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(AiResponse {
            content,
            usage: usage(),
        })
    }

    async fn send_message_streaming(
        &self,
        messages: &[Message],
        on_chunk: ChunkCallback,
    ) -> Result<AiResponse, AiError> {
        let response = self.send_message(messages).await?;
        for word in response.content.split_inclusive(' ') {
            on_chunk(word.to_string());
        }
        Ok(response)
    }
}

/// Fails every request with a freshly built error.
pub(crate) struct FailingClient {
    make: fn() -> AiError,
}

impl FailingClient {
    pub(crate) fn new(make: fn() -> AiError) -> Self {
        Self { make }
    }
}

#[async_trait]
impl AiClient for FailingClient {
    async fn send_message(&self, _messages: &[Message]) -> Result<AiResponse, AiError> {
        Err((self.make)())
    }

    async fn send_message_streaming(
        &self,
        _messages: &[Message],
        _on_chunk: ChunkCallback,
    ) -> Result<AiResponse, AiError> {
        Err((self.make)())
    }
}

/// Returns canned replies in order and records every request.
pub(crate) struct ScriptedClient {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<Message>>>,
    delay: Duration,
}

impl ScriptedClient {
    pub(crate) fn replying<const N: usize>(replies: [&str; N]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    pub(crate) fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AiClient for ScriptedClient {
    async fn send_message(&self, messages: &[Message]) -> Result<AiResponse, AiError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let content = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AiError::ApiError("script exhausted".into()))?;
        Ok(AiResponse {
            content,
            usage: usage(),
        })
    }

    async fn send_message_streaming(
        &self,
        messages: &[Message],
        on_chunk: ChunkCallback,
    ) -> Result<AiResponse, AiError> {
        let response = self.send_message(messages).await?;
        on_chunk(response.content.clone());
        Ok(response)
    }
}
