//! Bounded conversation log.
//!
//! The server keeps one [`SessionHandle`] for all callers: there is a single
//! shared conversation, not one per client. Known limitation.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::prompt::PROMPT_WINDOW;

pub const DEFAULT_HISTORY_LIMIT: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ring buffer of the most recent turns; the oldest turn is evicted when full.
#[derive(Debug)]
pub struct ChatSession {
    turns: VecDeque<ChatTurn>,
    capacity: usize,
}

/// Shared handle passed into every exchange.
pub type SessionHandle = Arc<Mutex<ChatSession>>;

impl Default for ChatSession {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_LIMIT)
    }
}

impl ChatSession {
    /// Capacity is raised to the prompt window if smaller.
    ///
    /// Capacity only bounds eviction; storage grows with the turns held.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(PROMPT_WINDOW);
        Self {
            turns: VecDeque::new(),
            capacity,
        }
    }

    pub fn handle(self) -> SessionHandle {
        Arc::new(Mutex::new(self))
    }

    pub fn append(&mut self, turn: ChatTurn) {
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// Up to `n` most recent turns, oldest first.
    pub fn recent(&self, n: usize) -> Vec<ChatTurn> {
        let skip = self.turns.len().saturating_sub(n);
        self.turns.iter().skip(skip).cloned().collect()
    }

    pub fn reset(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
