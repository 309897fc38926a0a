//! Minimal state-graph engine: node registration, edges, conditional edges,
//! and a sequential run loop over one mutable `CompanionState`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{GraphError, NodeError};
use crate::graph::context::RunContext;
use crate::graph::state::CompanionState;
use crate::graph::NodeId;

/// Maximum node executions per run.
pub const RECURSION_LIMIT: usize = 25;

/// A processing step. Reads and writes fields of the shared state.
#[async_trait]
pub trait Node: Send + Sync {
    async fn run(&self, state: &mut CompanionState, ctx: &RunContext) -> Result<(), NodeError>;
}

/// Where an edge starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Start,
    Node(NodeId),
}

/// Where an edge leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Node(NodeId),
    End,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => id.fmt(f),
            Self::End => f.write_str("__end__"),
        }
    }
}

/// Routing function for a conditional edge.
pub type Router = Arc<dyn Fn(&CompanionState, &RunContext) -> Target + Send + Sync>;

#[derive(Clone)]
enum Edge {
    Direct(Target),
    Conditional {
        router: Router,
        /// Declared possible destinations, checked at compile time.
        targets: Vec<Target>,
    },
}

/// Graph under construction.
#[derive(Default)]
pub struct StateGraph {
    nodes: Vec<(NodeId, Arc<dyn Node>)>,
    edges: Vec<(Source, Edge)>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(mut self, id: NodeId, node: impl Node + 'static) -> Self {
        self.nodes.push((id, Arc::new(node)));
        self
    }

    pub fn add_edge(mut self, from: Source, to: Target) -> Self {
        self.edges.push((from, Edge::Direct(to)));
        self
    }

    /// Route out of `from` by calling `router` on the state after `from` ran.
    /// `targets` lists every destination the router may return.
    pub fn add_conditional_edges<F>(mut self, from: NodeId, targets: &[Target], router: F) -> Self
    where
        F: Fn(&CompanionState, &RunContext) -> Target + Send + Sync + 'static,
    {
        self.edges.push((
            Source::Node(from),
            Edge::Conditional {
                router: Arc::new(router),
                targets: targets.to_vec(),
            },
        ));
        self
    }

    /// Validate wiring and freeze the graph.
    pub fn compile(self) -> Result<CompiledGraph, GraphError> {
        let mut nodes: HashMap<NodeId, Arc<dyn Node>> = HashMap::with_capacity(self.nodes.len());
        for (id, node) in self.nodes {
            if nodes.insert(id, node).is_some() {
                return Err(GraphError::DuplicateNode(id));
            }
        }

        let mut entry = None;
        let mut edges: HashMap<NodeId, Edge> = HashMap::new();

        for (source, edge) in self.edges {
            let destinations = match &edge {
                Edge::Direct(target) => vec![*target],
                Edge::Conditional { targets, .. } => targets.clone(),
            };
            for target in destinations {
                if let Target::Node(id) = target
                    && !nodes.contains_key(&id)
                {
                    return Err(GraphError::UnknownNode(id));
                }
            }

            match source {
                Source::Start => match edge {
                    Edge::Direct(Target::Node(id)) if entry.is_none() => entry = Some(id),
                    _ => return Err(GraphError::MissingEntry),
                },
                Source::Node(id) => {
                    if !nodes.contains_key(&id) {
                        return Err(GraphError::UnknownNode(id));
                    }
                    if edges.insert(id, edge).is_some() {
                        return Err(GraphError::DuplicateEdge(id));
                    }
                }
            }
        }

        let entry = entry.ok_or(GraphError::MissingEntry)?;
        if let Some(id) = nodes.keys().find(|id| !edges.contains_key(id)) {
            return Err(GraphError::DanglingNode(*id));
        }

        Ok(CompiledGraph {
            entry,
            nodes,
            edges,
        })
    }
}

/// Validated, immutable graph. Holds no per-run data.
pub struct CompiledGraph {
    entry: NodeId,
    nodes: HashMap<NodeId, Arc<dyn Node>>,
    edges: HashMap<NodeId, Edge>,
}

/// Nodes visited by one run, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTrace {
    pub visited: Vec<NodeId>,
}

impl RunTrace {
    pub fn contains(&self, id: NodeId) -> bool {
        self.visited.contains(&id)
    }
}

impl CompiledGraph {
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Run the graph from its entry node until an edge leads to `End`.
    pub async fn invoke(
        &self,
        state: &mut CompanionState,
        ctx: &RunContext,
    ) -> Result<RunTrace, GraphError> {
        let mut trace = RunTrace::default();
        let mut current = Target::Node(self.entry);

        while let Target::Node(id) = current {
            if trace.visited.len() >= RECURSION_LIMIT {
                return Err(GraphError::RecursionLimit {
                    limit: RECURSION_LIMIT,
                });
            }

            let node = self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))?;
            debug!(node = %id, "Entering node");
            node.run(state, ctx)
                .await
                .map_err(|source| GraphError::NodeFailed { node: id, source })?;
            trace.visited.push(id);

            current = match self.edges.get(&id) {
                Some(Edge::Direct(target)) => *target,
                Some(Edge::Conditional { router, .. }) => router(state, ctx),
                None => return Err(GraphError::DanglingNode(id)),
            };
            debug!(from = %id, to = %current, "Transition");
        }

        info!(steps = trace.visited.len(), "Workflow run complete");
        Ok(trace)
    }
}
