//! Dictation settings.

use serde::{Deserialize, Serialize};

/// Speech-to-text dictation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub enabled: bool,
    /// ISO-639-1 language hint passed to the transcription API.
    pub language: String,
    pub model: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "en".into(),
            model: "whisper-1".into(),
        }
    }
}
