//! Error types for the Ava companion.

use crate::graph::NodeId;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

/// Chat completion backend errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Speech and image backend errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Invalid input for {operation}: {reason}")]
    InvalidInput { operation: String, reason: String },

    #[error("{service} request failed: {reason}")]
    RequestFailed { service: String, reason: String },

    #[error("Invalid response from {service}: {reason}")]
    InvalidResponse { service: String, reason: String },

    #[error("Missing credentials: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Long-term memory errors.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("Memory analysis failed: {0}")]
    Analysis(#[from] LlmError),

    #[error("Memory store failed: {0}")]
    Store(#[from] DatabaseError),
}

/// Workflow graph errors: construction-time validation and run-time node failures.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Graph has no entry edge from START")]
    MissingEntry,

    #[error("Node {0} registered twice")]
    DuplicateNode(NodeId),

    #[error("Edge references unregistered node {0}")]
    UnknownNode(NodeId),

    #[error("Node {0} has more than one outgoing edge")]
    DuplicateEdge(NodeId),

    #[error("Node {0} has no outgoing edge")]
    DanglingNode(NodeId),

    #[error("Recursion limit of {limit} steps reached")]
    RecursionLimit { limit: usize },

    #[error("Node {node} failed: {source}")]
    NodeFailed {
        node: NodeId,
        #[source]
        source: NodeError,
    },
}

/// Failure raised inside a node body. Propagated unmodified to the caller.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

impl GraphError {
    /// The node that failed, if this is a run-time failure.
    pub fn failed_node(&self) -> Option<NodeId> {
        match self {
            Self::NodeFailed { node, .. } => Some(*node),
            _ => None,
        }
    }

    /// A node failed because a backend was not configured.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::NodeFailed {
                source: NodeError::Config(_) | NodeError::Media(MediaError::Config(_)),
                ..
            }
        )
    }
}

impl Error {
    /// Missing or invalid configuration, whether caught at startup or inside a node.
    pub fn is_config(&self) -> bool {
        match self {
            Self::Config(_) | Self::Media(MediaError::Config(_)) => true,
            Self::Graph(e) => e.is_config(),
            _ => false,
        }
    }
}

/// Result type alias for the companion.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn missing(key: &str) -> ConfigError {
        ConfigError::MissingRequired {
            key: key.to_string(),
            hint: String::new(),
        }
    }

    #[test]
    fn node_config_failures_count_as_config() {
        let tts = Error::Graph(GraphError::NodeFailed {
            node: NodeId::Audio,
            source: NodeError::Config(missing("ELEVENLABS_API_KEY")),
        });
        assert!(tts.is_config());

        let images = Error::Graph(GraphError::NodeFailed {
            node: NodeId::Image,
            source: NodeError::Media(MediaError::Config(missing("TOGETHER_API_KEY"))),
        });
        assert!(images.is_config());
        assert!(Error::Config(missing("GROQ_API_KEY")).is_config());
    }

    #[test]
    fn backend_failures_are_not_config() {
        let llm = Error::Graph(GraphError::NodeFailed {
            node: NodeId::Router,
            source: NodeError::Llm(LlmError::RequestFailed {
                provider: "groq".into(),
                reason: "HTTP 401".into(),
            }),
        });
        assert!(!llm.is_config());
        assert!(!Error::Graph(GraphError::MissingEntry).is_config());
    }
}
