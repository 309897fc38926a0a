//! Persistence layer: libSQL-backed checkpoints and memories.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{Checkpointer, MemoryStore, StoredMemory};
