//! OpenAI Whisper API client for speech-to-text.
//!
//! Backs dictation: an audio file is transcribed and the text is submitted
//! like a typed message.

use std::path::Path;

use tracing::debug;

use crate::AiError;

const WHISPER_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Environment variable holding the Whisper API key.
pub const WHISPER_KEY_VAR: &str = "OPENAI_API_KEY";

/// Whisper API client configuration.
#[derive(Clone)]
pub struct WhisperConfig {
    pub api_key: String,
    pub model: String,
    pub language: Option<String>,
    pub url: String,
}

impl std::fmt::Debug for WhisperConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("language", &self.language)
            .field("url", &self.url)
            .finish()
    }
}

impl WhisperConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "whisper-1".to_string(),
            language: None,
            url: WHISPER_API_URL.to_string(),
        }
    }

    /// Config from `OPENAI_API_KEY`. Dictation is optional, so a missing
    /// key is `None` rather than an error.
    pub fn from_env() -> Option<Self> {
        std::env::var(WHISPER_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Self::new)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_language(mut self, lang: impl Into<String>) -> Self {
        self.language = Some(lang.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Whisper speech-to-text client.
pub struct WhisperClient {
    config: WhisperConfig,
    http: reqwest::Client,
}

impl WhisperClient {
    pub fn new(config: WhisperConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(300))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Read an audio file and transcribe it.
    pub async fn transcribe_file(&self, path: &Path) -> Result<String, AiError> {
        let audio = tokio::fs::read(path)
            .await
            .map_err(|e| AiError::ApiError(format!("could not read {}: {e}", path.display())))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());
        self.transcribe(audio, &filename).await
    }

    /// Transcribe audio bytes to text.
    ///
    /// `audio_data` should be valid audio in a supported format
    /// (mp3, mp4, mpeg, mpga, m4a, wav, webm).
    /// `filename` is used for the multipart form (e.g., "audio.wav").
    pub async fn transcribe(&self, audio_data: Vec<u8>, filename: &str) -> Result<String, AiError> {
        debug!(
            model = %self.config.model,
            size = audio_data.len(),
            "Whisper transcription request"
        );

        let file_part = reqwest::multipart::Part::bytes(audio_data)
            .file_name(filename.to_string())
            .mime_str(mime_for(filename))
            .map_err(|e| AiError::ApiError(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.config.model.clone());

        if let Some(ref lang) = self.config.language {
            form = form.text("language", lang.clone());
        }

        let response = self
            .http
            .post(&self.config.url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .multipart(form)
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

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        json["text"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| AiError::ParseError("no 'text' field in response".to_string()))
    }
}

fn mime_for(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("webm") => "audio/webm",
        Some("ogg") => "audio/ogg",
        _ => "audio/wav",
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for("clip.mp3"), "audio/mpeg");
        assert_eq!(mime_for("clip.webm"), "audio/webm");
        assert_eq!(mime_for("clip"), "audio/wav");
    }

    #[test]
    fn debug_redacts_key() {
        let debug = format!("{:?}", WhisperConfig::new("sk-hidden"));
        assert!(!debug.contains("sk-hidden"));
    }

    #[tokio::test]
    async fn transcribe_returns_text_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "text": " Who made the stars? " })),
            )
            .mount(&server)
            .await;

        let client = WhisperClient::new(
            WhisperConfig::new("sk-test")
                .with_language("en")
                .with_url(format!("{}/v1/audio/transcriptions", server.uri())),
        );
        let text = client.transcribe(vec![0u8; 16], "clip.wav").await.unwrap();
        assert_eq!(text, " Who made the stars? ");
    }

    #[tokio::test]
    async fn transcribe_file_reports_unreadable_path() {
        let client = WhisperClient::new(WhisperConfig::new("sk-test"));
        let err = client
            .transcribe_file(Path::new("/nonexistent/divine/clip.wav"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("could not read"));
    }

    #[tokio::test]
    async fn missing_text_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = WhisperClient::new(WhisperConfig::new("k").with_url(server.uri()));
        let err = client.transcribe(vec![1, 2, 3], "a.mp3").await.unwrap_err();
        assert!(matches!(err, AiError::ParseError(_)));
    }
}
