//! Sessions and the resumable-context checkpoint store.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::conversation::{Conversation, Turn};
use crate::types::ModelMessage;

/// Opaque session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One client's conversation. The id never changes after creation.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    created_at: DateTime<Utc>,
    conversation: Conversation,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            created_at: Utc::now(),
            conversation: Conversation::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Key under which the reasoning transcript of this session is checkpointed.
    pub fn context_key(&self) -> String {
        self.id.to_string()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Record a completed exchange. Both turns land together or not at all.
    pub(crate) fn commit(&mut self, question: Turn, answer: Turn) {
        self.conversation.append(question);
        self.conversation.append(answer);
    }
}

/// In-memory reasoning transcripts keyed by thread id.
///
/// Unlike the visible [`Conversation`], a checkpoint keeps tool calls and
/// tool results, so later turns can build on evidence gathered earlier.
#[derive(Debug, Default)]
pub struct CheckpointStore {
    threads: RwLock<HashMap<String, Vec<ModelMessage>>>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript saved for a thread, if any.
    pub fn load(&self, thread_id: &str) -> Option<Vec<ModelMessage>> {
        self.threads
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(thread_id)
            .cloned()
    }

    /// Replace the transcript saved for a thread.
    pub fn save(&self, thread_id: &str, messages: Vec<ModelMessage>) {
        self.threads
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(thread_id.to_string(), messages);
    }

    pub fn contains(&self, thread_id: &str) -> bool {
        self.threads
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(thread_id)
    }
}
