//! Conversation window: bounded ring buffer of `Turn`s, trimmed pair by pair.

use std::collections::VecDeque;

use crate::Turn;

/// Exchanges kept per conversation when no explicit capacity is configured.
pub const DEFAULT_MAX_EXCHANGES: usize = 10;

/// Bounded window over the most recent exchanges. O(1) append, drops oldest pair when over capacity.
///
/// Turns are only ever appended as (user, assistant) pairs, so `len()` is always even.
#[derive(Debug, Clone)]
pub struct ConversationWindow {
    ring: VecDeque<Turn>,
    max_turns: usize,
    total_exchanges: u64,
}

impl Default for ConversationWindow {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EXCHANGES)
    }
}

impl ConversationWindow {
    /// Create a window holding at most `max_exchanges` user/assistant pairs (minimum 1).
    #[must_use]
    pub fn new(max_exchanges: usize) -> Self {
        let max_turns = max_exchanges.max(1).saturating_mul(2);
        Self {
            ring: VecDeque::with_capacity(max_turns.min(4096) + 2),
            max_turns,
            total_exchanges: 0,
        }
    }

    /// Append one exchange in order, then drop the oldest pairs until within capacity.
    pub fn append_exchange(&mut self, user: Turn, assistant: Turn) {
        self.ring.push_back(user);
        self.ring.push_back(assistant);
        self.total_exchanges += 1;
        while self.ring.len() > self.max_turns {
            if self.ring.pop_front().is_none() || self.ring.pop_front().is_none() {
                break;
            }
        }
    }

    /// Stored turns, oldest to newest.
    pub fn turns(&self) -> impl ExactSizeIterator<Item = &Turn> + '_ {
        self.ring.iter()
    }

    /// Owned copy of the stored turns, oldest to newest.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Turn> {
        self.ring.iter().cloned().collect()
    }

    /// Number of stored turns (always even).
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// True when no exchange has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Turn capacity (twice the exchange capacity).
    #[must_use]
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Exchanges appended over the window's lifetime, evicted ones included.
    #[must_use]
    pub fn total_exchanges(&self) -> u64 {
        self.total_exchanges
    }
}
