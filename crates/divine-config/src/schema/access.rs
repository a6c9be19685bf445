//! Access gate and billing settings.

use serde::{Deserialize, Serialize};

/// Sign-in and free-usage gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub require_sign_in: bool,
    /// Messages allowed before a subscription is required (0-1000).
    pub free_messages: u32,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            require_sign_in: true,
            free_messages: 3,
        }
    }
}

/// Checkout settings. Price ids refer to prices in the payment provider's
/// dashboard; the secret key comes from the environment, never from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    pub monthly_price_id: String,
    pub yearly_price_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            monthly_price_id: "price_1Pez00JgVRefg6YJtA9aBAbc".into(),
            yearly_price_id: "price_1Pez00JgVRefg6YJdE8cFDef".into(),
            success_url: "https://localhost/checkout/success?session_id={CHECKOUT_SESSION_ID}"
                .into(),
            cancel_url: "https://localhost/checkout/cancel".into(),
        }
    }
}
