//! parlemoi-window: bounded conversation window for the listening assistant.
//!
//! Ring buffer of user/assistant turns, trimmed by whole exchanges so the
//! history handed to the completion provider always alternates user → assistant.

mod turn;
mod window;

pub use turn::{Role, Turn};
pub use window::{ConversationWindow, DEFAULT_MAX_EXCHANGES};
