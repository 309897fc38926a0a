//! Provider-agnostic chat completion types and the `LlmProvider` trait.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::LlmError;

/// Message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Schema for a structured-output request.
///
/// Sent to the backend as the only tool definition with a required tool
/// choice; the tool arguments are the structured result.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl OutputSchema {
    /// Derive the tool definition from a `JsonSchema` type.
    ///
    /// The type name becomes the tool name and its doc comment the description.
    pub fn for_type<T: JsonSchema>() -> Result<Self, LlmError> {
        let mut parameters = serde_json::to_value(schemars::schema_for!(T))?;
        let mut description = String::new();
        if let Some(object) = parameters.as_object_mut() {
            object.remove("$schema");
            if let Some(serde_json::Value::String(text)) = object.remove("description") {
                description = text;
            }
            if description.is_empty()
                && let Some(serde_json::Value::String(title)) = object.get("title")
            {
                description = title.clone();
            }
            object.remove("title");
        }
        Ok(Self {
            name: T::schema_name().to_string(),
            description,
            parameters,
        })
    }
}

/// A chat completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    /// When set, the backend must answer with arguments matching this schema.
    pub output_schema: Option<OutputSchema>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            output_schema: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_output_schema(mut self, schema: OutputSchema) -> Self {
        self.output_schema = Some(schema);
        self
    }
}

/// A chat completion response.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text content, or the raw JSON arguments for a structured request.
    pub content: String,
}

impl CompletionResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// A chat completion backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier used for requests.
    fn model_name(&self) -> &str;

    /// Temperature applied when a request doesn't set one.
    fn temperature(&self) -> f32;

    /// Run one completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Run a structured-output completion and deserialize the result.
///
/// The result is trusted to match the schema; only JSON decoding can fail here.
pub async fn complete_structured<T: DeserializeOwned + JsonSchema>(
    llm: &dyn LlmProvider,
    request: CompletionRequest,
) -> Result<T, LlmError> {
    let schema = OutputSchema::for_type::<T>()?;
    let response = llm.complete(request.with_output_schema(schema)).await?;
    Ok(serde_json::from_str(&response.content)?)
}
