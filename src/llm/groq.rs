//! Groq chat models through rig's Groq client.

use std::sync::Arc;

use rig::client::CompletionClient;
use secrecy::{ExposeSecret, SecretString};

use crate::error::LlmError;
use crate::llm::{LlmProvider, RigAdapter};

/// OpenAI-compatible base URL, shared with the Groq speech and vision backends.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

const PROVIDER: &str = "groq";

/// Chat model bound to one model name and default temperature.
pub fn create_groq_provider(
    api_key: &SecretString,
    model: &str,
    temperature: f32,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::groq;

    let client: groq::Client = groq::Client::new(api_key.expose_secret()).map_err(|e| {
        LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: format!("Failed to create Groq client: {}", e),
        }
    })?;

    let completion_model = client.completion_model(model);
    tracing::debug!("Using Groq (model: {}, temperature: {})", model, temperature);
    Ok(Arc::new(RigAdapter::new(
        completion_model,
        model,
        PROVIDER,
        temperature,
    )))
}
