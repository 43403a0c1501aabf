//! Bounded conversation store: conversation key → window of recent exchanges.
//!
//! One `ConversationWindow` per key, each behind its own async mutex so the chat
//! read → provider call → write-back sequence for one key never interleaves with
//! another request for the same key. Different keys never contend.

use std::collections::HashMap;
use std::sync::Arc;

use parlemoi_window::{ConversationWindow, Turn};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::key::ConversationKey;

/// In-memory history store. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ConversationStore {
    inner: Arc<RwLock<HashMap<ConversationKey, Arc<Mutex<ConversationWindow>>>>>,
    max_exchanges: usize,
}

impl ConversationStore {
    /// Create a store keeping at most `max_exchanges` user/assistant pairs per conversation.
    #[must_use]
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            max_exchanges: max_exchanges.max(1),
        }
    }

    /// Copy of the stored turns for `key`, oldest first. Empty when unknown.
    pub async fn get(&self, key: &ConversationKey) -> Vec<Turn> {
        let slot = {
            let g = self.inner.read().await;
            g.get(key).cloned()
        };
        let Some(slot) = slot else {
            return Vec::new();
        };
        let turns = slot.lock().await.to_vec();
        tracing::debug!(
            event = "session.history.loaded",
            conversation = %key,
            loaded_turns = turns.len(),
            "conversation history loaded"
        );
        turns
    }

    /// Append one exchange for `key` and trim to capacity.
    pub async fn append(&self, key: &ConversationKey, user: Turn, assistant: Turn) {
        let mut guard = self.lock(key).await;
        guard.append(user, assistant);
    }

    /// Enter the exclusive section for `key`, creating its (empty) history on first use.
    pub async fn lock(&self, key: &ConversationKey) -> ConversationGuard {
        let slot = self.slot(key).await;
        ConversationGuard {
            key: key.clone(),
            window: slot.lock_owned().await,
        }
    }

    /// Number of conversations seen since startup.
    pub async fn conversation_count(&self) -> usize {
        self.inner.read().await.len()
    }

    async fn slot(&self, key: &ConversationKey) -> Arc<Mutex<ConversationWindow>> {
        if let Some(slot) = self.inner.read().await.get(key) {
            return Arc::clone(slot);
        }
        let mut g = self.inner.write().await;
        Arc::clone(
            g.entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(ConversationWindow::new(self.max_exchanges)))),
        )
    }
}

/// Exclusive access to one conversation's history; released on drop.
pub struct ConversationGuard {
    key: ConversationKey,
    window: OwnedMutexGuard<ConversationWindow>,
}

impl ConversationGuard {
    #[must_use]
    pub fn key(&self) -> &ConversationKey {
        &self.key
    }

    /// Stored turns, oldest first.
    #[must_use]
    pub fn turns(&self) -> Vec<Turn> {
        self.window.to_vec()
    }

    /// Append (user, assistant) and trim from the front to capacity.
    pub fn append(&mut self, user: Turn, assistant: Turn) {
        self.window.append_exchange(user, assistant);
        tracing::debug!(
            event = "session.history.appended",
            conversation = %self.key,
            total_turns = self.window.len(),
            total_exchanges = self.window.total_exchanges(),
            "conversation history appended"
        );
    }
}
