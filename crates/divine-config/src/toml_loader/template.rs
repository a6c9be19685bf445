//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Divine Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.
# Credentials are read from the environment, never from this file:
#   API_KEY (or GEMINI_API_KEY)  required
#   OPENAI_API_KEY               optional, enables /dictate
#   STRIPE_SECRET_KEY            optional, enables /subscribe

[model]
# name = "gemini-2.5-pro"
# max_tokens = 8192      # 1-65536
# temperature = 1.0      # 0.0-2.0
# stream = true

[voice]
# enabled = true
# language = "en"
# model = "whisper-1"

[access]
# require_sign_in = true
# free_messages = 3      # 0-1000

[billing]
# monthly_price_id = "price_..."
# yearly_price_id = "price_..."
# success_url = "https://example.com/success?session_id={CHECKOUT_SESSION_ID}"
# cancel_url = "https://example.com/cancel"

[logging]
# level = "info"         # debug, info, warn, error
"##
    .to_string()
}
