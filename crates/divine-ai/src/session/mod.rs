//! Conversation session management.
//!
//! A `Session` is the stateful handle to the remote endpoint: it is bound
//! to one persona at creation and accumulates the completed turns that
//! give the model its context.

mod chat;
mod manager;

pub use manager::Session;
