use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("payment is not configured: {0}")]
    NotConfigured(String),

    #[error("unknown plan: {0}")]
    UnknownPlan(String),

    #[error("checkout error: {0}")]
    Checkout(String),
}
