//! Wiring of the eight nodes into the conversation workflow.

use std::sync::{Arc, OnceLock};

use crate::error::GraphError;
use crate::graph::NodeId;
use crate::graph::edges::{select_workflow, should_summarize_conversation};
use crate::graph::engine::{CompiledGraph, Source, StateGraph, Target};
use crate::graph::nodes::{
    AudioNode, ContextInjectionNode, ConversationNode, ImageNode, MemoryExtractionNode,
    MemoryInjectionNode, RouterNode, SummarizeConversationNode,
};

static WORKFLOW: OnceLock<Arc<CompiledGraph>> = OnceLock::new();

/// Uncompiled workflow graph.
pub fn create_workflow_graph() -> StateGraph {
    let mut graph = StateGraph::new()
        .add_node(NodeId::MemoryExtraction, MemoryExtractionNode)
        .add_node(NodeId::Router, RouterNode)
        .add_node(NodeId::ContextInjection, ContextInjectionNode)
        .add_node(NodeId::MemoryInjection, MemoryInjectionNode)
        .add_node(NodeId::Conversation, ConversationNode)
        .add_node(NodeId::Image, ImageNode)
        .add_node(NodeId::Audio, AudioNode)
        .add_node(NodeId::SummarizeConversation, SummarizeConversationNode)
        .add_edge(Source::Start, Target::Node(NodeId::MemoryExtraction))
        .add_edge(
            Source::Node(NodeId::MemoryExtraction),
            Target::Node(NodeId::Router),
        )
        .add_edge(
            Source::Node(NodeId::Router),
            Target::Node(NodeId::ContextInjection),
        )
        .add_edge(
            Source::Node(NodeId::ContextInjection),
            Target::Node(NodeId::MemoryInjection),
        )
        .add_conditional_edges(
            NodeId::MemoryInjection,
            &[
                Target::Node(NodeId::Conversation),
                Target::Node(NodeId::Image),
                Target::Node(NodeId::Audio),
            ],
            |state, _| select_workflow(state),
        );

    for response in [NodeId::Conversation, NodeId::Image, NodeId::Audio] {
        graph = graph.add_conditional_edges(
            response,
            &[Target::Node(NodeId::SummarizeConversation), Target::End],
            |state, ctx| {
                should_summarize_conversation(state, ctx.settings.total_messages_summary_trigger)
            },
        );
    }

    graph.add_edge(Source::Node(NodeId::SummarizeConversation), Target::End)
}

/// The process-wide compiled workflow. Built on first call; later calls
/// return the same handle.
pub fn workflow_graph() -> Result<Arc<CompiledGraph>, GraphError> {
    if let Some(graph) = WORKFLOW.get() {
        return Ok(Arc::clone(graph));
    }
    let compiled = Arc::new(create_workflow_graph().compile()?);
    Ok(Arc::clone(WORKFLOW.get_or_init(|| compiled)))
}
