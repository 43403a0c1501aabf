//! Session namespace: conversation keys and the bounded conversation history store.

mod key;
mod store;

pub use key::ConversationKey;
pub use store::{ConversationGuard, ConversationStore};
