//! Async chat methods for Session (send + streaming).

use crate::{AiClient, AiError, AiResponse, ChunkCallback, Message, Role};

use super::manager::Session;

impl Session {
    /// Send a user turn and return the model's reply.
    ///
    /// The exchange is committed to history only on success; a failed
    /// exchange leaves history untouched.
    pub async fn chat(&self, client: &dyn AiClient, user_message: &str) -> Result<String, AiError> {
        let mut history = self.history.lock().await;
        let messages = self.build_messages(&history, user_message);

        let response = client.send_message(&messages).await?;
        Ok(self.commit(&mut history, user_message, response))
    }

    /// Like [`chat`](Self::chat), forwarding text chunks as they arrive.
    pub async fn chat_streaming(
        &self,
        client: &dyn AiClient,
        user_message: &str,
        on_chunk: ChunkCallback,
    ) -> Result<String, AiError> {
        let mut history = self.history.lock().await;
        let messages = self.build_messages(&history, user_message);

        let response = client.send_message_streaming(&messages, on_chunk).await?;
        Ok(self.commit(&mut history, user_message, response))
    }

    fn commit(&self, history: &mut Vec<Message>, user_message: &str, response: AiResponse) -> String {
        if let Ok(mut tracker) = self.tracker.lock() {
            tracker.record(&response.usage);
        }
        history.push(Message::new(Role::User, user_message));
        history.push(Message::new(Role::Assistant, response.content.clone()));
        response.content
    }
}
