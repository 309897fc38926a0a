//! Routing predicates for the conditional edges.

use crate::graph::NodeId;
use crate::graph::engine::Target;
use crate::graph::state::{CompanionState, WorkflowKind};

/// Summarize once the history holds strictly more than `threshold` messages.
pub fn should_summarize_conversation(state: &CompanionState, threshold: usize) -> Target {
    if state.messages.len() > threshold {
        Target::Node(NodeId::SummarizeConversation)
    } else {
        Target::End
    }
}

/// Response node for the workflow the router chose.
pub fn select_workflow(state: &CompanionState) -> Target {
    match state.workflow {
        WorkflowKind::Image => Target::Node(NodeId::Image),
        WorkflowKind::Audio => Target::Node(NodeId::Audio),
        WorkflowKind::Conversation => Target::Node(NodeId::Conversation),
    }
}
