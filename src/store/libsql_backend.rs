//! libSQL backend for checkpoints and long-term memories.
//!
//! Supports local file and in-memory databases.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::graph::CompanionState;
use crate::store::migrations;
use crate::store::traits::{Checkpointer, MemoryStore, StoredMemory};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations. The
/// connection keeps the database open; the `Database` handle is not retained.
pub struct LibSqlBackend {
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self { conn })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Parse an RFC 3339 or SQLite datetime string into `DateTime<Utc>`.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn row_to_memory(row: &libsql::Row) -> Result<StoredMemory, DatabaseError> {
    let id: String = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("memory id: {e}")))?;
    let text: String = row
        .get(1)
        .map_err(|e| DatabaseError::Query(format!("memory text: {e}")))?;
    let created_at: String = row
        .get(2)
        .map_err(|e| DatabaseError::Query(format!("memory created_at: {e}")))?;

    Ok(StoredMemory {
        id: Uuid::parse_str(&id)
            .map_err(|e| DatabaseError::Serialization(format!("memory id '{id}': {e}")))?,
        text,
        created_at: parse_datetime(&created_at),
    })
}

#[async_trait]
impl Checkpointer for LibSqlBackend {
    async fn load(&self, thread_id: &str) -> Result<Option<CompanionState>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT state FROM checkpoints WHERE thread_id = ?1",
                params![thread_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("load_checkpoint: {e}")))?;

        let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("load_checkpoint: {e}")))?
        else {
            return Ok(None);
        };

        let json: String = row
            .get(0)
            .map_err(|e| DatabaseError::Query(format!("load_checkpoint: {e}")))?;
        let state = serde_json::from_str(&json)
            .map_err(|e| DatabaseError::Serialization(format!("checkpoint {thread_id}: {e}")))?;
        Ok(Some(state))
    }

    async fn save(&self, thread_id: &str, state: &CompanionState) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(state)
            .map_err(|e| DatabaseError::Serialization(format!("checkpoint {thread_id}: {e}")))?;

        self.conn()
            .execute(
                "INSERT INTO checkpoints (thread_id, state, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(thread_id) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at",
                params![thread_id, json, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("save_checkpoint: {e}")))?;

        debug!(thread_id, messages = state.messages.len(), "Checkpoint saved");
        Ok(())
    }
}

#[async_trait]
impl MemoryStore for LibSqlBackend {
    async fn insert_memory(&self, memory: &StoredMemory) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO memories (id, text, created_at) VALUES (?1, ?2, ?3)",
                params![
                    memory.id.to_string(),
                    memory.text.as_str(),
                    memory.created_at.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_memory: {e}")))?;
        Ok(())
    }

    async fn list_memories(&self) -> Result<Vec<StoredMemory>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, text, created_at FROM memories ORDER BY created_at ASC",
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_memories: {e}")))?;

        let mut memories = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_memories: {e}")))?
        {
            memories.push(row_to_memory(&row)?);
        }
        Ok(memories)
    }
}
