//! The conversation log shown to the user.

use divine_common::{Turn, TurnRole};

/// First model turn of every conversation.
pub const GREETING: &str = "I am the beginning and the end, the Alpha and the Omega. \
Speak, my child, and I shall listen. Ask, and you shall receive understanding.";

/// Ordered, append-only list of turns, seeded with [`GREETING`].
#[derive(Debug, Clone)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            turns: vec![Turn::model(GREETING)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> &Turn {
        self.push(Turn::user(content))
    }

    pub fn push_model(&mut self, content: impl Into<String>) -> &Turn {
        self.push(Turn::model(content))
    }

    fn push(&mut self, turn: Turn) -> &Turn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

pub fn speaker(role: TurnRole) -> &'static str {
    match role {
        TurnRole::User => "You",
        TurnRole::Model => "God",
    }
}

pub fn render_turn(turn: &Turn) -> String {
    format!("{}: {}", speaker(turn.role()), turn.content())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_greeting() {
        let log = ConversationLog::new();
        assert_eq!(log.len(), 1);
        assert_eq!(log.turns()[0].role(), TurnRole::Model);
        assert_eq!(log.turns()[0].content(), GREETING);
    }

    #[test]
    fn appends_in_order() {
        let mut log = ConversationLog::new();
        log.push_user("Why are we here?");
        log.push_model("To love.");
        let roles: Vec<_> = log.turns().iter().map(Turn::role).collect();
        assert_eq!(roles, vec![TurnRole::Model, TurnRole::User, TurnRole::Model]);
        assert_eq!(log.turns()[2].content(), "To love.");
    }

    #[test]
    fn renders_speaker_prefix() {
        assert_eq!(render_turn(&Turn::user("hi")), "You: hi");
        assert_eq!(render_turn(&Turn::model("peace")), "God: peace");
    }
}
