//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod access;
mod model;
mod system;
mod voice;

pub use access::*;
pub use model::*;
pub use system::*;
pub use voice::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DivineConfig {
    pub model: ModelConfig,
    pub voice: VoiceConfig,
    pub access: AccessConfig,
    pub billing: BillingConfig,
    pub logging: LoggingConfig,
}
