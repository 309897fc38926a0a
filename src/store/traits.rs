//! Persistence traits for conversation checkpoints and long-term memories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::graph::CompanionState;

/// Persists conversation state between turns, keyed by thread.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// Latest saved state for `thread_id`, or `None` for a new conversation.
    async fn load(&self, thread_id: &str) -> Result<Option<CompanionState>, DatabaseError>;

    /// Overwrite the saved state for `thread_id`.
    async fn save(&self, thread_id: &str, state: &CompanionState) -> Result<(), DatabaseError>;
}

/// A fact about the user, as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMemory {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl StoredMemory {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Storage for long-term memories. Ranking happens in `MemoryManager`.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    async fn insert_memory(&self, memory: &StoredMemory) -> Result<(), DatabaseError>;

    /// All memories, oldest first.
    async fn list_memories(&self) -> Result<Vec<StoredMemory>, DatabaseError>;
}
