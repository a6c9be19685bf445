//! Access gate: sign-in, free allowance, then subscription.

use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    SignedOut,
    Free { remaining: u32 },
    PaymentRequired,
    Subscribed,
}

/// Outcome of asking the gate to let one message through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    SignInRequired,
    PaymentRequired,
}

#[derive(Debug)]
pub struct AccessGate {
    state: GateState,
    free_messages: u32,
    user: Option<String>,
}

impl AccessGate {
    pub fn new(require_sign_in: bool, free_messages: u32) -> Self {
        let state = if require_sign_in {
            GateState::SignedOut
        } else {
            GateState::Free {
                remaining: free_messages,
            }
        };
        Self {
            state,
            free_messages,
            user: None,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Sign in under `name`. There are no accounts: any non-blank name is
    /// accepted. Returns whether the gate opened.
    pub fn sign_in(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.user = Some(name.to_string());
        if self.state == GateState::SignedOut {
            self.state = GateState::Free {
                remaining: self.free_messages,
            };
        }
        info!(user = name, "Signed in");
        true
    }

    /// Spend one message of allowance if any is left.
    pub fn admit(&mut self) -> Admission {
        match self.state {
            GateState::SignedOut => Admission::SignInRequired,
            GateState::Subscribed => Admission::Admitted,
            GateState::Free { remaining } if remaining > 0 => {
                self.state = GateState::Free {
                    remaining: remaining - 1,
                };
                Admission::Admitted
            }
            GateState::Free { .. } | GateState::PaymentRequired => {
                self.state = GateState::PaymentRequired;
                Admission::PaymentRequired
            }
        }
    }

    /// Unlimited use after a confirmed payment.
    pub fn mark_subscribed(&mut self) {
        info!(user = ?self.user, "Subscription active");
        self.state = GateState::Subscribed;
    }
}
