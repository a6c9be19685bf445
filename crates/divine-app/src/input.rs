//! Input surface: turns raw lines into messages or commands.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Usage,
    Plans,
    Subscribe(Option<String>),
    Verify(Option<String>),
    Dictate(Option<PathBuf>),
    Quit,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Message(String),
    Command(Command),
}

/// Trim `raw`; `None` when nothing is left.
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn parse_line(raw: &str) -> Input {
    let Some(line) = normalize(raw) else {
        return Input::Empty;
    };

    let Some(rest) = line.strip_prefix('/') else {
        return Input::Message(line);
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, normalize(arg)),
        None => (rest, None),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "usage" => Command::Usage,
        "plans" => Command::Plans,
        "subscribe" => Command::Subscribe(arg),
        "verify" => Command::Verify(arg),
        "dictate" => Command::Dictate(arg.map(PathBuf::from)),
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(name.to_string()),
    };
    Input::Command(command)
}

pub const HELP: &str = "\
Type a question and press Enter. Commands:
  /dictate <audio-file>   transcribe speech and ask it
  /usage                  show token usage
  /plans                  show subscription plans
  /subscribe <plan>       start checkout (monthly or yearly)
  /verify [session-id]    confirm a completed checkout
  /quit                   leave";
