//! Subscription plans and hosted checkout.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use divine_common::BillingError;
use divine_config::schema::BillingConfig;
use serde::Deserialize;
use tracing::debug;

const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Environment variable holding the payment provider's secret key.
pub const STRIPE_KEY_VAR: &str = "STRIPE_SECRET_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Monthly,
    Yearly,
}

impl Plan {
    pub const ALL: [Plan; 2] = [Plan::Monthly, Plan::Yearly];

    pub const fn price(self) -> &'static str {
        match self {
            Self::Monthly => "$9.99",
            Self::Yearly => "$99.99",
        }
    }

    pub const fn period(self) -> &'static str {
        match self {
            Self::Monthly => "/ month",
            Self::Yearly => "/ year",
        }
    }

    pub const fn discount(self) -> Option<&'static str> {
        match self {
            Self::Monthly => None,
            Self::Yearly => Some("Save 16%"),
        }
    }

    pub fn price_id(self, billing: &BillingConfig) -> &str {
        match self {
            Self::Monthly => &billing.monthly_price_id,
            Self::Yearly => &billing.yearly_price_id,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => f.write_str("monthly"),
            Self::Yearly => f.write_str("yearly"),
        }
    }
}

impl FromStr for Plan {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" | "annual" => Ok(Self::Yearly),
            other => Err(BillingError::UnknownPlan(other.to_string())),
        }
    }
}

/// One-line summary, e.g. `yearly   $99.99 / year (Save 16%)`.
pub fn describe_plan(plan: Plan) -> String {
    let mut line = format!("{:<8} {} {}", plan.to_string(), plan.price(), plan.period());
    if let Some(discount) = plan.discount() {
        line.push_str(&format!(" ({discount})"));
    }
    line
}

/// A hosted checkout page the user completes in a browser.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_session(&self, price_id: &str) -> Result<CheckoutSession, BillingError>;

    /// Whether the checkout session has been paid.
    async fn is_paid(&self, session_id: &str) -> Result<bool, BillingError>;
}

/// Stripe Checkout over its REST API.
pub struct StripeCheckout {
    secret_key: String,
    success_url: String,
    cancel_url: String,
    base_url: String,
    http: reqwest::Client,
}

impl fmt::Debug for StripeCheckout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeCheckout")
            .field("secret_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl StripeCheckout {
    pub fn new(secret_key: impl Into<String>, billing: &BillingConfig) -> Self {
        Self {
            secret_key: secret_key.into(),
            success_url: billing.success_url.clone(),
            cancel_url: billing.cancel_url.clone(),
            base_url: STRIPE_API_BASE.to_string(),
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Checkout is optional; without a key there is no provider.
    pub fn from_env(billing: &BillingConfig) -> Option<Self> {
        std::env::var(STRIPE_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Self::new(key, billing))
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn sessions_url(&self) -> String {
        format!("{}/v1/checkout/sessions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: String,
}

#[derive(Deserialize)]
struct SessionStatus {
    payment_status: String,
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, BillingError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BillingError::Checkout(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<StripeErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| format!("HTTP {status}"));
        return Err(BillingError::Checkout(message));
    }

    serde_json::from_str(&body).map_err(|e| BillingError::Checkout(e.to_string()))
}

#[async_trait]
impl CheckoutProvider for StripeCheckout {
    async fn create_session(&self, price_id: &str) -> Result<CheckoutSession, BillingError> {
        debug!(price_id, "Creating checkout session");

        let params = [
            ("mode", "subscription"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", self.success_url.as_str()),
            ("cancel_url", self.cancel_url.as_str()),
        ];

        let response = self
            .http
            .post(self.sessions_url())
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| BillingError::Checkout(e.to_string()))?;

        read_json(response).await
    }

    async fn is_paid(&self, session_id: &str) -> Result<bool, BillingError> {
        if !is_session_id(session_id) {
            return Err(BillingError::Checkout(format!(
                "invalid checkout session id: {session_id}"
            )));
        }

        let response = self
            .http
            .get(format!("{}/{session_id}", self.sessions_url()))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| BillingError::Checkout(e.to_string()))?;

        let status: SessionStatus = read_json(response).await?;
        Ok(status.payment_status == "paid")
    }
}

/// Checkout session ids are path segments: `[A-Za-z0-9_]+`.
fn is_session_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn stripe(server: &MockServer) -> StripeCheckout {
        StripeCheckout::new("sk_test_123", &BillingConfig::default()).with_base_url(server.uri())
    }

    #[test]
    fn plan_parsing() {
        assert_eq!("Monthly".parse::<Plan>().unwrap(), Plan::Monthly);
        assert_eq!("annual".parse::<Plan>().unwrap(), Plan::Yearly);
        assert!(matches!(
            "weekly".parse::<Plan>(),
            Err(BillingError::UnknownPlan(p)) if p == "weekly"
        ));
    }

    #[test]
    fn plan_price_ids_come_from_config() {
        let billing = BillingConfig {
            monthly_price_id: "price_m".into(),
            yearly_price_id: "price_y".into(),
            ..BillingConfig::default()
        };
        assert_eq!(Plan::Monthly.price_id(&billing), "price_m");
        assert_eq!(Plan::Yearly.price_id(&billing), "price_y");
    }

    #[test]
    fn describe_plan_mentions_discount() {
        assert_eq!(describe_plan(Plan::Monthly), "monthly  $9.99 / month");
        assert_eq!(describe_plan(Plan::Yearly), "yearly   $99.99 / year (Save 16%)");
    }

    #[test]
    fn debug_redacts_secret() {
        let checkout = StripeCheckout::new("sk_live_secret", &BillingConfig::default());
        assert!(!format!("{checkout:?}").contains("sk_live_secret"));
    }

    #[tokio::test]
    async fn create_session_posts_subscription_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("authorization", "Bearer sk_test_123"))
            .and(body_string_contains("mode=subscription"))
            .and(body_string_contains("price_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_1",
                "url": "https://checkout.stripe.com/c/pay/cs_test_1",
                "object": "checkout.session"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = stripe(&server).create_session("price_abc").await.unwrap();
        assert_eq!(session.id, "cs_test_1");
        assert!(session.url.ends_with("cs_test_1"));
    }

    #[tokio::test]
    async fn provider_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "message": "No such price: 'price_abc'" }
            })))
            .mount(&server)
            .await;

        let err = stripe(&server).create_session("price_abc").await.unwrap_err();
        assert_eq!(err.to_string(), "checkout error: No such price: 'price_abc'");
    }

    #[tokio::test]
    async fn is_paid_reads_payment_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_paid"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "payment_status": "paid" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_open"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "payment_status": "unpaid" })),
            )
            .mount(&server)
            .await;

        let checkout = stripe(&server);
        assert!(checkout.is_paid("cs_paid").await.unwrap());
        assert!(!checkout.is_paid("cs_open").await.unwrap());
    }

    #[tokio::test]
    async fn is_paid_rejects_ids_that_would_change_the_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "payment_status": "paid" })),
            )
            .expect(0)
            .mount(&server)
            .await;

        let checkout = stripe(&server);
        for id in ["cs_1/../../v1/charges", "cs_1?expand=x", "cs_1#frag", ""] {
            let err = checkout.is_paid(id).await.unwrap_err();
            assert!(
                err.to_string().contains("invalid checkout session id"),
                "{id}: {err}"
            );
        }
    }
}
