//! Token usage tracking for a session.

use crate::TokenUsage;

/// Cumulative token usage and call count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenTracker {
    total: TokenUsage,
    call_count: u64,
}

impl TokenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record token usage from one completed exchange.
    pub fn record(&mut self, usage: &TokenUsage) {
        self.total.input_tokens = self.total.input_tokens.saturating_add(usage.input_tokens);
        self.total.output_tokens = self.total.output_tokens.saturating_add(usage.output_tokens);
        self.call_count += 1;
    }

    pub fn total(&self) -> &TokenUsage {
        &self.total
    }

    pub fn total_tokens(&self) -> u64 {
        self.total.total_tokens()
    }

    /// Number of successful API calls.
    pub fn call_count(&self) -> u64 {
        self.call_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let tracker = TokenTracker::new();
        assert_eq!(tracker.call_count(), 0);
        assert_eq!(tracker.total_tokens(), 0);
    }

    #[test]
    fn accumulates_usage() {
        let mut tracker = TokenTracker::new();
        tracker.record(&TokenUsage {
            input_tokens: 10,
            output_tokens: 4,
        });
        tracker.record(&TokenUsage {
            input_tokens: 20,
            output_tokens: 6,
        });
        assert_eq!(tracker.call_count(), 2);
        assert_eq!(tracker.total().input_tokens, 30);
        assert_eq!(tracker.total().output_tokens, 10);
        assert_eq!(tracker.total_tokens(), 40);
    }
}
