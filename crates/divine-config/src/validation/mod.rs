//! Full configuration validation.
//!
//! Every check pushes onto a shared error list so one run reports all
//! problems in a single `ConfigError`.

mod helpers;


use crate::schema::DivineConfig;
use divine_common::ConfigError;
use helpers::{validate_non_empty, validate_range, validate_range_f64, validate_url};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &DivineConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_non_empty(&mut errors, "model.name", &config.model.name);
    validate_range(&mut errors, "model.max_tokens", config.model.max_tokens, 1, 65536);
    validate_range_f64(&mut errors, "model.temperature", config.model.temperature, 0.0, 2.0);

    if config.voice.enabled {
        validate_non_empty(&mut errors, "voice.model", &config.voice.model);
    }

    validate_range(&mut errors, "access.free_messages", config.access.free_messages, 0, 1000);

    validate_non_empty(&mut errors, "billing.monthly_price_id", &config.billing.monthly_price_id);
    validate_non_empty(&mut errors, "billing.yearly_price_id", &config.billing.yearly_price_id);
    validate_url(&mut errors, "billing.success_url", &config.billing.success_url);
    validate_url(&mut errors, "billing.cancel_url", &config.billing.cancel_url);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
