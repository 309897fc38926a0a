//! Together AI image generation, plus scene planning through the chat model.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::MediaError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider, complete_structured};
use crate::media::{ScenarioPrompt, TextToImage};
use crate::prompts::IMAGE_SCENARIO_PROMPT;

const TOGETHER_BASE_URL: &str = "https://api.together.xyz/v1";

const SERVICE: &str = "together";

const IMAGE_WIDTH: u32 = 1024;
const IMAGE_HEIGHT: u32 = 768;
const IMAGE_STEPS: u32 = 4;

pub struct TogetherImageGenerator {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
    llm: Arc<dyn LlmProvider>,
}

impl TogetherImageGenerator {
    /// `llm` plans scenes; `model` renders them.
    pub fn new(api_key: SecretString, model: impl Into<String>, llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            base_url: TOGETHER_BASE_URL.to_string(),
            llm,
        }
    }
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    width: u32,
    height: u32,
    steps: u32,
    n: u32,
    response_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

/// Render the scenario prompt over a formatted chat history.
pub fn scenario_prompt(history: &[ChatMessage]) -> String {
    let chat_history = history
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n");
    IMAGE_SCENARIO_PROMPT.replace("{chat_history}", &chat_history)
}

fn decode_image(response: ImageResponse) -> Result<Vec<u8>, MediaError> {
    let encoded = response
        .data
        .into_iter()
        .next()
        .and_then(|d| d.b64_json)
        .ok_or_else(|| MediaError::InvalidResponse {
            service: SERVICE.to_string(),
            reason: "no image data in response".to_string(),
        })?;

    STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| MediaError::InvalidResponse {
            service: SERVICE.to_string(),
            reason: format!("invalid base64 image: {e}"),
        })
}

#[async_trait]
impl TextToImage for TogetherImageGenerator {
    async fn create_scenario(&self, history: &[ChatMessage]) -> Result<ScenarioPrompt, MediaError> {
        let request =
            CompletionRequest::new(vec![ChatMessage::user(scenario_prompt(history))])
                .with_temperature(0.4);
        let scenario: ScenarioPrompt =
            complete_structured(self.llm.as_ref(), request).await?;
        debug!(image_prompt = %scenario.image_prompt, "Scenario created");
        Ok(scenario)
    }

    async fn generate_image(
        &self,
        prompt: &str,
        output_path: &Path,
    ) -> Result<Vec<u8>, MediaError> {
        if prompt.trim().is_empty() {
            return Err(MediaError::InvalidInput {
                operation: "text-to-image".to_string(),
                reason: "prompt is empty".to_string(),
            });
        }

        let body = ImageRequest {
            prompt,
            model: &self.model,
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
            steps: IMAGE_STEPS,
            n: 1,
            response_format: "b64_json",
        };

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| MediaError::RequestFailed {
                service: SERVICE.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MediaError::RequestFailed {
                service: SERVICE.to_string(),
                reason: format!("HTTP {status}: {text}"),
            });
        }

        let parsed: ImageResponse =
            response.json().await.map_err(|e| MediaError::InvalidResponse {
                service: SERVICE.to_string(),
                reason: e.to_string(),
            })?;
        let image = decode_image(parsed)?;

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output_path, &image).await?;

        info!(path = %output_path.display(), bytes = image.len(), "Image generated");
        Ok(image)
    }
}
