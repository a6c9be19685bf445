mod billing;
mod chat;
mod cli;
mod conversation;
mod gate;
mod input;

use std::process::ExitCode;

use divine_ai::{GeminiConfig, SessionManager, WhisperClient, WhisperConfig};
use divine_config::schema::VoiceConfig;
use divine_config::{DivineConfig, LogLevel};
use tracing_subscriber::EnvFilter;

use crate::billing::{CheckoutProvider, StripeCheckout};
use crate::chat::ChatApp;
use crate::gate::AccessGate;

/// Parse `.env` contents (KEY=VALUE lines, `#` comments, optional quotes).
fn parse_dotenv(contents: &str) -> Vec<(&str, &str)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            (
                key.trim(),
                value.trim().trim_matches('"').trim_matches('\''),
            )
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Load environment variables from `.env` in the working directory.
/// Variables already set in the environment win. Must run before any
/// other thread exists.
fn load_dotenv() {
    let Ok(contents) = std::fs::read_to_string(".env") else {
        return;
    };
    for (key, value) in parse_dotenv(&contents) {
        if std::env::var_os(key).is_none() {
            std::env::set_var(key, value);
        }
    }
}

fn init_logging(cli_directive: Option<&str>, level: LogLevel) {
    let default = format!(
        "warn,divine_app={0},divine_ai={0},divine_config={0}",
        level.as_directive()
    );
    let filter = match cli_directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn dictation_client(voice: &VoiceConfig) -> Option<WhisperClient> {
    if !voice.enabled {
        return None;
    }
    match WhisperConfig::from_env() {
        Some(config) => Some(WhisperClient::new(
            config
                .with_model(&voice.model)
                .with_language(&voice.language),
        )),
        None => {
            tracing::warn!("OPENAI_API_KEY not set, dictation disabled");
            None
        }
    }
}

fn main() -> ExitCode {
    load_dotenv();

    let args = cli::parse();

    let config = divine_config::load_config(args.config.as_deref());
    let level = config
        .as_ref()
        .map(|c| c.logging.level)
        .unwrap_or_default();
    init_logging(args.log_level.as_deref(), level);

    tracing::info!("Divine v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Config error: {e}");
            eprintln!("divine: {e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    runtime.block_on(run(args, config))
}

async fn run(args: cli::Args, config: DivineConfig) -> ExitCode {
    let gemini = match GeminiConfig::from_env() {
        Ok(gemini) => gemini,
        Err(e) => {
            tracing::error!("Cannot start: {e}");
            eprintln!("divine: {e}");
            return ExitCode::FAILURE;
        }
    };
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| config.model.name.clone());
    let manager = SessionManager::gemini(
        gemini
            .with_model(model)
            .with_max_tokens(config.model.max_tokens)
            .with_temperature(config.model.temperature),
    );
    tracing::info!(model = manager.model(), "Model configured");

    let checkout = StripeCheckout::from_env(&config.billing)
        .map(|c| Box::new(c) as Box<dyn CheckoutProvider>);
    if checkout.is_none() {
        tracing::info!("STRIPE_SECRET_KEY not set, checkout disabled");
    }

    let mut gate = AccessGate::new(config.access.require_sign_in, config.access.free_messages);
    if let Some(name) = args.name.as_deref() {
        if !gate.sign_in(name) {
            tracing::warn!("Ignoring blank --name");
        }
    }

    let mut app = ChatApp::new(manager, gate, config.billing.clone())
        .with_streaming(config.model.stream && !args.no_stream)
        .with_dictation(dictation_client(&config.voice))
        .with_checkout(checkout);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    if let Err(e) = app.run(stdin, &mut stdout).await {
        tracing::error!("Terminal I/O error: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
