//! Ava: an AI companion that routes each turn through a fixed workflow graph.

pub mod channels;
pub mod companion;
pub mod config;
pub mod error;
pub mod graph;
pub mod llm;
pub mod media;
pub mod memory;
pub mod prompts;
pub mod schedule;
pub mod store;
