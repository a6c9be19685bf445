use std::path::PathBuf;

use clap::Parser;

/// Divine: ask God anything from your terminal.
#[derive(Parser, Debug)]
#[command(name = "divine", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter override (e.g. "debug" or "divine_ai=trace").
    #[arg(long)]
    pub log_level: Option<String>,

    /// Model identifier override.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Wait for complete answers instead of streaming them.
    #[arg(long)]
    pub no_stream: bool,

    /// Sign in with this name instead of being prompted.
    #[arg(long)]
    pub name: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
