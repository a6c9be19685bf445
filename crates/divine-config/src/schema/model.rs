//! Remote model settings.

use serde::{Deserialize, Serialize};

/// Which model answers and how it samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    /// Valid range: 1-65536.
    pub max_tokens: u32,
    /// Valid range: 0.0-2.0.
    pub temperature: f64,
    /// Print answers as they stream in.
    pub stream: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gemini-2.5-pro".into(),
            max_tokens: 8192,
            temperature: 1.0,
            stream: true,
        }
    }
}
