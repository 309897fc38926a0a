//! Prompt-plus-model pipelines: router classification and persona replies.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use crate::error::LlmError;
use crate::graph::helpers::{BackendFactory, DEFAULT_TEMPERATURE};
use crate::graph::state::WorkflowKind;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider, complete_structured};
use crate::prompts::{CHARACTER_CARD_PROMPT, ROUTER_PROMPT, SUMMARY_FRAGMENT_PREFIX};

pub use crate::graph::helpers::remove_asterisk_content;

/// Routing is a classification, so it runs cooler than replies.
pub const ROUTER_TEMPERATURE: f32 = 0.3;

/// Response type to give to the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct RouterResponse {
    /// The response type to give to the user. It must be one of: 'conversation', 'image' or 'audio'
    pub response_type: String,
}

impl RouterResponse {
    /// The label is kept verbatim; anything unknown maps to plain conversation.
    pub fn workflow(&self) -> WorkflowKind {
        WorkflowKind::from_label(&self.response_type)
    }
}

/// A system message followed by the conversation history.
///
/// `{name}` placeholders in the system text are filled per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    system: String,
}

impl PromptTemplate {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    /// System message with `vars` substituted, then `history` in order.
    pub fn format_messages(
        &self,
        vars: &[(&str, &str)],
        history: &[ChatMessage],
    ) -> Vec<ChatMessage> {
        let system = vars.iter().fold(self.system.clone(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        });

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(system));
        messages.extend_from_slice(history);
        messages
    }
}

/// Classifies the wanted response modality.
pub struct RouterChain {
    llm: Arc<dyn LlmProvider>,
    prompt: PromptTemplate,
    temperature: f32,
}

pub fn get_router_chain(backends: &dyn BackendFactory) -> Result<RouterChain, LlmError> {
    Ok(RouterChain {
        llm: backends.chat_model(ROUTER_TEMPERATURE)?,
        prompt: PromptTemplate::new(ROUTER_PROMPT),
        temperature: ROUTER_TEMPERATURE,
    })
}

impl RouterChain {
    /// One structured completion over `messages`. Errors are not retried.
    pub async fn invoke(&self, messages: &[ChatMessage]) -> Result<RouterResponse, LlmError> {
        let request = CompletionRequest::new(self.prompt.format_messages(&[], messages))
            .with_temperature(self.temperature);
        let response: RouterResponse =
            complete_structured(self.llm.as_ref(), request).await?;
        debug!(response_type = %response.response_type, "Router classified turn");
        Ok(response)
    }
}

/// Generates Ava's in-character reply.
pub struct CharacterResponseChain {
    llm: Arc<dyn LlmProvider>,
    prompt: PromptTemplate,
    temperature: f32,
}

/// Persona card, plus the running summary when one exists.
pub fn character_system_prompt(summary: &str) -> String {
    if summary.is_empty() {
        CHARACTER_CARD_PROMPT.to_string()
    } else {
        format!("{CHARACTER_CARD_PROMPT}\n\n{SUMMARY_FRAGMENT_PREFIX}{summary}")
    }
}

pub fn get_character_response_chain(
    backends: &dyn BackendFactory,
    summary: &str,
) -> Result<CharacterResponseChain, LlmError> {
    Ok(CharacterResponseChain {
        llm: backends.chat_model(DEFAULT_TEMPERATURE)?,
        prompt: PromptTemplate::new(character_system_prompt(summary)),
        temperature: DEFAULT_TEMPERATURE,
    })
}

impl CharacterResponseChain {
    pub fn system_prompt(&self) -> &str {
        self.prompt.system()
    }

    /// Reply to `messages` with stage directions stripped.
    pub async fn invoke(
        &self,
        messages: &[ChatMessage],
        memory_context: &str,
        current_activity: &str,
    ) -> Result<String, LlmError> {
        let vars = [
            ("memory_context", memory_context),
            ("current_activity", current_activity),
        ];
        let request = CompletionRequest::new(self.prompt.format_messages(&vars, messages))
            .with_temperature(self.temperature);
        let response = self.llm.complete(request).await?;
        Ok(remove_asterisk_content(&response.content))
    }
}
