//! Conversation workflow graph.
//!
//! Every user turn runs through the same fixed pipeline:
//! 1. `memory_extraction`: store personal facts from the new message
//! 2. `router`: classify the wanted response modality
//! 3. `context_injection`: look up Ava's current activity
//! 4. `memory_injection`: pull relevant long-term memories
//! 5. one of `conversation` / `image` / `audio`: generate the reply
//! 6. `summarize_conversation`: only when the history grew past the trigger

pub mod chains;
pub mod context;
pub mod edges;
pub mod engine;
pub mod helpers;
pub mod nodes;
pub mod state;
pub mod workflow;

use std::fmt;

use serde::Serialize;

pub use context::RunContext;
pub use engine::{CompiledGraph, Node, RunTrace, Source, StateGraph, Target};
pub use state::{CompanionState, WorkflowKind};
pub use workflow::{create_workflow_graph, workflow_graph};

/// Identifier of a processing step in the workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum NodeId {
    MemoryExtraction,
    Router,
    ContextInjection,
    MemoryInjection,
    Conversation,
    Image,
    Audio,
    SummarizeConversation,
}

impl NodeId {
    pub const ALL: [NodeId; 8] = [
        NodeId::MemoryExtraction,
        NodeId::Router,
        NodeId::ContextInjection,
        NodeId::MemoryInjection,
        NodeId::Conversation,
        NodeId::Image,
        NodeId::Audio,
        NodeId::SummarizeConversation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MemoryExtraction => "memory_extraction_node",
            Self::Router => "router_node",
            Self::ContextInjection => "context_injection_node",
            Self::MemoryInjection => "memory_injection_node",
            Self::Conversation => "conversation_node",
            Self::Image => "image_node",
            Self::Audio => "audio_node",
            Self::SummarizeConversation => "summarize_conversation_node",
        }
    }
}

impl From<NodeId> for &'static str {
    fn from(id: NodeId) -> Self {
        id.as_str()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn node_names_are_unique() {
        let names: HashSet<&str> = NodeId::ALL.iter().map(|n| n.as_str()).collect();
        assert_eq!(names.len(), NodeId::ALL.len());
    }

    #[test]
    fn node_id_serializes_as_name() {
        let json = serde_json::to_value(NodeId::SummarizeConversation).unwrap();
        assert_eq!(json, "summarize_conversation_node");
        assert_eq!(NodeId::Audio.to_string(), "audio_node");
    }
}
