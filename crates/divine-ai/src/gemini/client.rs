//! Gemini API client struct, request building, and response parsing.

use crate::{AiError, AiResponse, Message, Role, TokenUsage};

use super::config::GeminiConfig;

/// Gemini API client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub(crate) fn api_url(&self, stream: bool) -> String {
        let method = if stream {
            "streamGenerateContent"
        } else {
            "generateContent"
        };
        format!(
            "{}/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            method
        )
    }

    /// Build the JSON request body for the Gemini API.
    pub(crate) fn build_request_body(&self, messages: &[Message]) -> serde_json::Value {
        let contents: Vec<_> = messages
            .iter()
            .filter_map(|msg| {
                let role = match msg.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                    Role::System => return None, // sent as systemInstruction
                };
                Some(serde_json::json!({
                    "role": role,
                    "parts": [{ "text": msg.content }]
                }))
            })
            .collect();

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
                "temperature": self.config.temperature,
            }
        });

        if let Some(system) = messages.iter().find(|m| m.role == Role::System) {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system.content }]
            });
        }

        body
    }

    /// Parse a non-streaming Gemini response.
    pub(crate) fn parse_response(&self, json: &serde_json::Value) -> Result<AiResponse, AiError> {
        let candidates = json["candidates"]
            .as_array()
            .ok_or_else(|| AiError::ParseError(no_candidates_reason(json)))?;

        let first = candidates
            .first()
            .ok_or_else(|| AiError::ParseError("empty candidates".to_string()))?;

        let content = candidate_text(first);
        if content.is_empty() {
            return Err(AiError::ParseError(empty_candidate_reason(
                first["finishReason"].as_str(),
            )));
        }

        Ok(AiResponse {
            content,
            usage: parse_usage(json).unwrap_or_default(),
        })
    }
}

/// A candidate with no text, e.g. a reply withheld by a safety filter.
pub(crate) fn empty_candidate_reason(finish_reason: Option<&str>) -> String {
    match finish_reason {
        Some(reason) => format!("candidate has no text (finishReason: {reason})"),
        None => "candidate has no text".to_string(),
    }
}

/// Message of an in-band `{"error": {...}}` payload.
pub(crate) fn error_message(json: &serde_json::Value) -> Option<String> {
    let error = json.get("error")?;
    let message = error["message"].as_str().unwrap_or("unknown error");
    Some(match error["code"].as_u64() {
        Some(code) => format!("{code}: {message}"),
        None => message.to_string(),
    })
}

/// Concatenate the text parts of one candidate.
pub(crate) fn candidate_text(candidate: &serde_json::Value) -> String {
    candidate["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default()
}

pub(crate) fn parse_usage(json: &serde_json::Value) -> Option<TokenUsage> {
    let meta = json.get("usageMetadata")?;
    Some(TokenUsage {
        input_tokens: meta["promptTokenCount"].as_u64().unwrap_or(0),
        output_tokens: meta["candidatesTokenCount"].as_u64().unwrap_or(0),
    })
}

fn no_candidates_reason(json: &serde_json::Value) -> String {
    match json["promptFeedback"]["blockReason"].as_str() {
        Some(reason) => format!("prompt blocked: {reason}"),
        None => "no candidates in response".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(GeminiConfig::new("test-key").with_base_url("http://localhost/v1beta/models/"))
    }

    #[test]
    fn api_url_selects_method() {
        let client = client();
        assert_eq!(
            client.api_url(false),
            "http://localhost/v1beta/models/gemini-2.5-pro:generateContent"
        );
        assert_eq!(
            client.api_url(true),
            "http://localhost/v1beta/models/gemini-2.5-pro:streamGenerateContent"
        );
    }

    #[test]
    fn request_body_maps_roles_and_lifts_system() {
        let messages = vec![
            Message::new(Role::System, "be kind"),
            Message::new(Role::User, "a"),
            Message::new(Role::Assistant, "b"),
            Message::new(Role::User, "c"),
        ];
        let body = client().build_request_body(&messages);

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "c");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be kind");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[test]
    fn request_body_without_system_has_no_instruction() {
        let body = client().build_request_body(&[Message::new(Role::User, "hi")]);
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn parse_response_joins_parts_and_reads_usage() {
        let json = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Peace " }, { "text": "be with you." }] }
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 5 }
        });
        let response = client().parse_response(&json).unwrap();
        assert_eq!(response.content, "Peace be with you.");
        assert_eq!(response.usage.input_tokens, 12);
        assert_eq!(response.usage.output_tokens, 5);
    }

    #[test]
    fn parse_response_reports_block_reason() {
        let json = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = client().parse_response(&json).unwrap_err();
        assert_eq!(err.to_string(), "Parse error: prompt blocked: SAFETY");
    }

    #[test]
    fn parse_response_rejects_candidate_without_text() {
        let json = serde_json::json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        let err = client().parse_response(&json).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse error: candidate has no text (finishReason: SAFETY)"
        );
    }

    #[test]
    fn error_message_reads_code_and_message() {
        let json = serde_json::json!({ "error": { "code": 500, "message": "Internal error" } });
        assert_eq!(error_message(&json).as_deref(), Some("500: Internal error"));
        assert_eq!(error_message(&serde_json::json!({ "candidates": [] })), None);
    }

    #[test]
    fn parse_response_rejects_empty_candidates() {
        let json = serde_json::json!({ "candidates": [] });
        assert!(matches!(
            client().parse_response(&json),
            Err(AiError::ParseError(_))
        ));
    }
}
