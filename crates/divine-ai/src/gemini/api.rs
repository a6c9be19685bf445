//! AiClient trait implementation for GeminiClient (send_message + streaming).

use async_trait::async_trait;
use tracing::debug;

use crate::streaming::{parse_sse_stream, SseEvent};
use crate::{AiClient, AiError, AiResponse, ChunkCallback, Message, TokenUsage};

use super::client::{
    candidate_text, empty_candidate_reason, error_message, parse_usage, GeminiClient,
};

impl GeminiClient {
    async fn post(&self, url: &str, messages: &[Message]) -> Result<reqwest::Response, AiError> {
        let body = self.build_request_body(messages);

        let response = self
            .http
            .post(url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::from_transport(&e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
        }

        Ok(response)
    }
}

#[async_trait]
impl AiClient for GeminiClient {
    async fn send_message(&self, messages: &[Message]) -> Result<AiResponse, AiError> {
        debug!(model = %self.config.model, turns = messages.len(), "Gemini API request");

        let response = self.post(&self.api_url(false), messages).await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        self.parse_response(&json)
    }

    async fn send_message_streaming(
        &self,
        messages: &[Message],
        on_chunk: ChunkCallback,
    ) -> Result<AiResponse, AiError> {
        debug!(model = %self.config.model, turns = messages.len(), "Gemini API streaming request");

        let url = format!("{}?alt=sse", self.api_url(true));
        let response = self.post(&url, messages).await?;

        let mut full_content = String::new();
        let mut usage = TokenUsage::default();
        let mut saw_candidate = false;
        let mut finish_reason: Option<String> = None;
        let mut stream_error: Option<String> = None;

        parse_sse_stream(response, |event: SseEvent| {
            let Ok(data) = serde_json::from_str::<serde_json::Value>(&event.data) else {
                debug!(data = %event.data, "Skipping non-JSON SSE event");
                return;
            };

            if let Some(message) = error_message(&data) {
                stream_error = Some(message);
                return;
            }

            let mut chunk = String::new();
            if let Some(candidates) = data["candidates"].as_array() {
                saw_candidate |= !candidates.is_empty();
                for candidate in candidates {
                    chunk.push_str(&candidate_text(candidate));
                    if let Some(reason) = candidate["finishReason"].as_str() {
                        finish_reason = Some(reason.to_string());
                    }
                }
            }

            if let Some(u) = parse_usage(&data) {
                usage = u;
            }

            if !chunk.is_empty() {
                full_content.push_str(&chunk);
                on_chunk(chunk);
            }
        })
        .await?;

        if let Some(message) = stream_error {
            return Err(AiError::ApiError(format!("stream error: {message}")));
        }
        if !saw_candidate {
            return Err(AiError::ParseError("no candidates in stream".to_string()));
        }
        if full_content.is_empty() {
            return Err(AiError::ParseError(empty_candidate_reason(
                finish_reason.as_deref(),
            )));
        }

        Ok(AiResponse {
            content: full_content,
            usage,
        })
    }
}
