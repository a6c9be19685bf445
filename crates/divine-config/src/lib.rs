//! Divine configuration system.
//!
//! TOML-based configuration with full validation. All sections use
//! `serde(default)` so partial configs work out of the box.
//!
//! ```rust,no_run
//! let config = divine_config::load_config(None).expect("failed to load config");
//! println!("{}", config.model.name);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{DivineConfig, LogLevel};

use divine_common::ConfigError;
use std::path::Path;

/// Load config from `path`, or from the platform default location when
/// `None`, and reject it if validation fails.
///
/// The default file is created from the commented template when missing.
pub fn load_config(path: Option<&Path>) -> Result<DivineConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            toml_loader::load_from_path(path)?
        }
        None => toml_loader::load_default()?,
    };

    validation::validate(&config)?;
    Ok(config)
}
