//! Per-chat conversation history.
//!
//! The whole mapping is persisted under a single key on every mutation. There is
//! no locking around the read-modify-write; two concurrent writers to the same
//! chat id resolve as last-write-wins.

use crate::core::error::LeetobError;
use crate::storage::KvStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

pub const HISTORY_KEY: &str = "leetob_conversations_v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    Empty,
}

pub struct HistoryStore {
    store: Box<dyn KvStore>,
    conversations: HashMap<String, Vec<Turn>>,
}

impl HistoryStore {
    /// Load the mapping from `store`. A missing or unreadable entry starts empty.
    pub fn load(store: Box<dyn KvStore>) -> Result<Self, LeetobError> {
        let conversations = match store.get(HISTORY_KEY)? {
            Some(value) => match serde_json::from_value(value) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Discarding unreadable conversation history: {}", e);
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        Ok(Self {
            store,
            conversations,
        })
    }

    pub fn turns(&self, chat_id: &str) -> &[Turn] {
        self.conversations
            .get(chat_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Turns to send upstream: the last `2 * max_len` entries, or everything when `max_len == 0`.
    pub fn context(&self, chat_id: &str, max_len: usize) -> &[Turn] {
        tail(self.turns(chat_id), max_len.saturating_mul(2))
    }

    /// History to resend when regenerating: everything up to the last user turn.
    ///
    /// Returns `None` unless the chat currently ends with an assistant turn.
    pub fn regeneration_context(&self, chat_id: &str, max_len: usize) -> Option<&[Turn]> {
        let turns = self.turns(chat_id);
        match turns.last() {
            Some(last) if last.role == TurnRole::Assistant && turns.len() >= 2 => {
                let base = &turns[..turns.len() - 1];
                Some(tail(base, max_len.saturating_mul(2).saturating_sub(1)))
            }
            _ => None,
        }
    }

    pub fn append(
        &mut self,
        chat_id: &str,
        user: Turn,
        assistant: Turn,
        max_len: usize,
    ) -> Result<(), LeetobError> {
        let turns = self.conversations.entry(chat_id.to_string()).or_default();
        turns.push(user);
        turns.push(assistant);
        truncate_front(turns, max_len);
        debug!(chat_id, len = turns.len(), "history appended");
        self.persist()
    }

    /// Swap the trailing assistant turn for a regenerated one.
    pub fn replace_last_assistant(
        &mut self,
        chat_id: &str,
        content: impl Into<String>,
    ) -> Result<(), LeetobError> {
        let turns = self.conversations.entry(chat_id.to_string()).or_default();
        match turns.last_mut() {
            Some(last) if last.role == TurnRole::Assistant => last.content = content.into(),
            _ => turns.push(Turn::assistant(content)),
        }
        self.persist()
    }

    pub fn clear(&mut self, chat_id: &str) -> Result<ClearOutcome, LeetobError> {
        if self.conversations.remove(chat_id).is_some() {
            self.persist()?;
            Ok(ClearOutcome::Cleared)
        } else {
            Ok(ClearOutcome::Empty)
        }
    }

    /// Number of exchanges shown in the reply header.
    pub fn turn_count(&self, chat_id: &str) -> usize {
        self.turns(chat_id).len() / 2
    }

    fn persist(&mut self) -> Result<(), LeetobError> {
        let value = serde_json::to_value(&self.conversations)?;
        self.store.set(HISTORY_KEY, value)
    }
}

fn tail(turns: &[Turn], limit: usize) -> &[Turn] {
    if limit == 0 || turns.len() <= limit {
        turns
    } else {
        &turns[turns.len() - limit..]
    }
}

fn truncate_front(turns: &mut Vec<Turn>, max_len: usize) {
    let limit = max_len.saturating_mul(2);
    if limit > 0 && turns.len() > limit {
        let excess = turns.len() - limit;
        turns.drain(..excess);
    }
}
