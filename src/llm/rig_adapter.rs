//! Bridges a rig `CompletionModel` to the `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::{CompletionModel, ToolDefinition};
use rig::message::{AssistantContent, Message, ToolChoice};
use tracing::debug;

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role};

/// A rig completion model bound to one provider name and default temperature.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    provider: &'static str,
    temperature: f32,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str, provider: &'static str, temperature: f32) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            provider,
            temperature,
        }
    }
}

/// System messages become the preamble; the rest stays in order.
pub(crate) fn split_messages(messages: &[ChatMessage]) -> (Option<String>, Vec<Message>) {
    let mut system = Vec::new();
    let mut history = Vec::with_capacity(messages.len());
    for message in messages {
        match message.role {
            Role::System => system.push(message.content.as_str()),
            Role::User => history.push(Message::user(message.content.clone())),
            Role::Assistant => history.push(Message::assistant(message.content.clone())),
        }
    }
    let preamble = (!system.is_empty()).then(|| system.join("\n\n"));
    (preamble, history)
}

/// Text of a plain reply, or the raw JSON arguments of the first tool call.
pub(crate) fn response_content<'a>(
    choice: impl IntoIterator<Item = &'a AssistantContent>,
    structured: bool,
    provider: &str,
) -> Result<String, LlmError> {
    let mut text = String::new();
    let mut arguments = None;
    for content in choice {
        match content {
            AssistantContent::Text(part) => text.push_str(&part.text),
            AssistantContent::ToolCall(call) if arguments.is_none() => {
                arguments = Some(match &call.function.arguments {
                    serde_json::Value::String(raw) => raw.clone(),
                    other => other.to_string(),
                });
            }
            _ => {}
        }
    }

    if !structured {
        return Ok(text);
    }
    arguments.ok_or_else(|| LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: "structured request returned no tool call".to_string(),
    })
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let structured = request.output_schema.is_some();
        let (preamble, mut history) = split_messages(&request.messages);
        let prompt = history.pop().ok_or_else(|| LlmError::RequestFailed {
            provider: self.provider.to_string(),
            reason: "request has no user or assistant message".to_string(),
        })?;

        let temperature = request.temperature.unwrap_or(self.temperature);
        let mut builder = self
            .model
            .completion_request(prompt)
            .messages(history)
            .temperature(f64::from(temperature));
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(schema) = request.output_schema {
            builder = builder
                .tool(ToolDefinition {
                    name: schema.name,
                    description: schema.description,
                    parameters: schema.parameters,
                })
                .tool_choice(ToolChoice::Required);
        }

        let response = builder.send().await.map_err(|e| LlmError::RequestFailed {
            provider: self.provider.to_string(),
            reason: e.to_string(),
        })?;

        debug!(
            model = %self.model_name,
            structured,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Chat completion finished"
        );

        let content = response_content(response.choice.iter(), structured, self.provider)?;
        Ok(CompletionResponse::new(content))
    }
}
