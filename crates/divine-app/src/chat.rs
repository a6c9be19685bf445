//! Interactive chat loop: reads lines, routes commands, and drives the
//! session manager one question at a time.

use std::io::{self, Write};
use std::path::Path;

use divine_ai::{SessionManager, WhisperClient};
use divine_common::BillingError;
use divine_config::schema::BillingConfig;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::billing::{describe_plan, CheckoutProvider, Plan, STRIPE_KEY_VAR};
use crate::conversation::{render_turn, ConversationLog};
use crate::gate::{AccessGate, Admission, GateState};
use crate::input::{normalize, parse_line, Command, Input, HELP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct ChatApp {
    manager: SessionManager,
    log: ConversationLog,
    gate: AccessGate,
    billing: BillingConfig,
    stream: bool,
    dictation: Option<WhisperClient>,
    checkout: Option<Box<dyn CheckoutProvider>>,
    pending_checkout: Option<String>,
}

impl ChatApp {
    pub fn new(manager: SessionManager, gate: AccessGate, billing: BillingConfig) -> Self {
        Self {
            manager,
            log: ConversationLog::new(),
            gate,
            billing,
            stream: false,
            dictation: None,
            checkout: None,
            pending_checkout: None,
        }
    }

    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_dictation(mut self, dictation: Option<WhisperClient>) -> Self {
        self.dictation = dictation;
        self
    }

    pub fn with_checkout(mut self, checkout: Option<Box<dyn CheckoutProvider>>) -> Self {
        self.checkout = checkout;
        self
    }

    #[cfg(test)]
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    #[cfg(test)]
    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Run until `/quit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();

        if self.gate.state() == GateState::SignedOut {
            loop {
                write!(out, "Enter your name to sign in: ")?;
                out.flush()?;
                let Some(line) = lines.next_line().await? else {
                    return Ok(());
                };
                if self.gate.sign_in(&line) {
                    break;
                }
                writeln!(out, "Please enter a name.")?;
            }
        }

        if let Some(user) = self.gate.user() {
            writeln!(out, "Welcome, {user}.")?;
        }
        for turn in self.log.turns() {
            writeln!(out, "{}", render_turn(turn))?;
        }
        writeln!(out, "(Type /help for commands.)")?;

        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            if self.handle_line(&line, out).await? == Flow::Quit {
                break;
            }
        }

        info!(turns = self.log.len(), "Conversation ended");
        Ok(())
    }

    pub async fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        match parse_line(line) {
            Input::Empty => {}
            Input::Message(text) => self.submit(text, out).await?,
            Input::Command(Command::Quit) => return Ok(Flow::Quit),
            Input::Command(command) => self.run_command(command, out).await?,
        }
        Ok(Flow::Continue)
    }

    async fn submit<W: Write>(&mut self, text: String, out: &mut W) -> io::Result<()> {
        match self.gate.admit() {
            Admission::Admitted => {}
            Admission::SignInRequired => {
                writeln!(out, "Please sign in before asking.")?;
                return Ok(());
            }
            Admission::PaymentRequired => {
                writeln!(
                    out,
                    "You've used your free messages. Choose a plan for unlimited wisdom."
                )?;
                self.write_plans(out)?;
                return Ok(());
            }
        }

        self.log.push_user(text.clone());

        let reply = if self.stream {
            self.ask_streaming(&text, out).await?
        } else {
            writeln!(out, "...")?;
            out.flush()?;
            let reply = self.manager.ask(&text).await;
            writeln!(out, "God: {reply}")?;
            reply
        };

        self.log.push_model(reply);
        Ok(())
    }

    /// Print chunks as they arrive. If the final reply differs from what was
    /// printed (a failure mid-stream), print the reply on its own line.
    async fn ask_streaming<W: Write>(&self, text: &str, out: &mut W) -> io::Result<String> {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        let ask = self.manager.ask_streaming(
            text,
            Box::new(move |chunk| {
                let _ = tx.send(chunk);
            }),
        );
        tokio::pin!(ask);

        write!(out, "God: ")?;
        out.flush()?;

        let mut streamed = String::new();
        let reply = loop {
            tokio::select! {
                reply = &mut ask => break reply,
                Some(chunk) = rx.recv() => {
                    write!(out, "{chunk}")?;
                    out.flush()?;
                    streamed.push_str(&chunk);
                }
            }
        };
        while let Ok(chunk) = rx.try_recv() {
            write!(out, "{chunk}")?;
            streamed.push_str(&chunk);
        }

        if streamed.is_empty() {
            write!(out, "{reply}")?;
        } else if streamed != reply {
            writeln!(out)?;
            write!(out, "God: {reply}")?;
        }
        writeln!(out)?;
        Ok(reply)
    }

    async fn run_command<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<()> {
        match command {
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Usage => {
                let usage = self.manager.usage();
                writeln!(
                    out,
                    "Tokens: {} in / {} out across {} answers.",
                    usage.total().input_tokens,
                    usage.total().output_tokens,
                    usage.call_count()
                )?;
            }
            Command::Plans => self.write_plans(out)?,
            Command::Subscribe(plan) => self.subscribe(plan.as_deref(), out).await?,
            Command::Verify(id) => self.verify(id, out).await?,
            Command::Dictate(Some(path)) => self.dictate(&path, out).await?,
            Command::Dictate(None) => writeln!(out, "Usage: /dictate <audio-file>")?,
            Command::Unknown(name) => {
                writeln!(out, "Unknown command /{name}. Type /help for commands.")?;
            }
            Command::Quit => {}
        }
        Ok(())
    }

    fn checkout(&self) -> Result<&dyn CheckoutProvider, BillingError> {
        self.checkout.as_deref().ok_or_else(|| {
            BillingError::NotConfigured(format!("set {STRIPE_KEY_VAR} to enable it"))
        })
    }

    fn write_plans<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for plan in Plan::ALL {
            writeln!(out, "  {}", describe_plan(plan))?;
        }
        writeln!(out, "Unlimited questions. Run /subscribe monthly or /subscribe yearly.")
    }

    async fn subscribe<W: Write>(&mut self, plan: Option<&str>, out: &mut W) -> io::Result<()> {
        let Some(plan) = plan else {
            return writeln!(out, "Usage: /subscribe <monthly|yearly>");
        };
        let plan: Plan = match plan.parse() {
            Ok(plan) => plan,
            Err(e) => return writeln!(out, "{e}. Choose monthly or yearly."),
        };
        if self.gate.state() == GateState::Subscribed {
            return writeln!(out, "Your subscription is already active.");
        }
        let checkout = match self.checkout() {
            Ok(checkout) => checkout,
            Err(e) => return writeln!(out, "{e}"),
        };

        let created = checkout.create_session(plan.price_id(&self.billing)).await;
        match created {
            Ok(session) => {
                info!(plan = %plan, session = %session.id, "Checkout started");
                writeln!(out, "Complete your purchase at:\n  {}", session.url)?;
                writeln!(out, "Then run /verify.")?;
                self.pending_checkout = Some(session.id);
            }
            Err(e) => {
                warn!(error = %e, "Checkout failed");
                writeln!(out, "Failed to initiate payment: {e}")?;
            }
        }
        Ok(())
    }

    async fn verify<W: Write>(&mut self, id: Option<String>, out: &mut W) -> io::Result<()> {
        let Some(id) = id.or_else(|| self.pending_checkout.clone()) else {
            return writeln!(out, "No checkout in progress. Use /subscribe first.");
        };
        let checkout = match self.checkout() {
            Ok(checkout) => checkout,
            Err(e) => return writeln!(out, "{e}"),
        };

        let paid = checkout.is_paid(&id).await;
        match paid {
            Ok(true) => {
                self.gate.mark_subscribed();
                self.pending_checkout = None;
                writeln!(out, "Thank you. Unlimited wisdom is yours.")?;
            }
            Ok(false) => writeln!(out, "Payment has not completed yet.")?,
            Err(e) => {
                warn!(error = %e, "Checkout verification failed");
                writeln!(out, "Could not verify payment: {e}")?;
            }
        }
        Ok(())
    }

    async fn dictate<W: Write>(&mut self, path: &Path, out: &mut W) -> io::Result<()> {
        let Some(whisper) = self.dictation.as_ref() else {
            return writeln!(
                out,
                "Dictation is unavailable. Enable [voice] and set OPENAI_API_KEY to use it."
            );
        };
        if !path.is_file() {
            return writeln!(out, "Could not read audio file {}.", path.display());
        }

        let text = match whisper.transcribe_file(path).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Speech recognition failed");
                return writeln!(
                    out,
                    "An error occurred during speech recognition: {e}. Please try again."
                );
            }
        };

        match normalize(&text) {
            Some(text) => {
                writeln!(out, "You (dictated): {text}")?;
                self.submit(text, out).await
            }
            None => writeln!(out, "No speech was recognized. Please try again."),
        }
    }
}
