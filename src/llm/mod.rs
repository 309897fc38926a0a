//! LLM integration for the companion.
//!
//! Chat completions go through the `LlmProvider` trait. rig-core does the HTTP
//! transport and `RigAdapter` bridges rig's `CompletionModel` to our trait.
//! Structured output is requested as a required tool call and decoded with
//! `complete_structured`.

pub mod groq;
pub mod provider;
mod rig_adapter;

pub use groq::create_groq_provider;
pub use provider::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, OutputSchema, Role,
    complete_structured,
};
pub use rig_adapter::RigAdapter;
