//! Image description through a Groq vision model.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::MediaError;
use crate::llm::groq::GROQ_BASE_URL;
use crate::media::{ImageToText, sniff_image_mime};

/// Used when the caller passes an empty prompt.
pub const DEFAULT_ANALYSIS_PROMPT: &str = "Please describe what you see in this image in detail.";

const SERVICE: &str = "groq-vision";

const MAX_TOKENS: u32 = 1000;

pub struct GroqVision {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl GroqVision {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            base_url: GROQ_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct VisionRequest<'a> {
    model: &'a str,
    messages: [VisionMessage; 1],
    max_tokens: u32,
}

/// A user message whose content is an array of text and image parts.
#[derive(Debug, Serialize)]
struct VisionMessage {
    role: &'static str,
    content: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct VisionResponse {
    #[serde(default)]
    choices: Vec<VisionChoice>,
}

#[derive(Debug, Deserialize)]
struct VisionChoice {
    message: VisionReply,
}

#[derive(Debug, Deserialize)]
struct VisionReply {
    content: Option<String>,
}

/// Build the single user message carrying prompt text and the image data URI.
fn vision_message(image: &[u8], prompt: &str) -> VisionMessage {
    let data_uri = format!(
        "data:{};base64,{}",
        sniff_image_mime(image),
        STANDARD.encode(image)
    );
    VisionMessage {
        role: "user",
        content: serde_json::json!([
            { "type": "text", "text": prompt },
            { "type": "image_url", "image_url": { "url": data_uri } },
        ]),
    }
}

fn description(response: VisionResponse) -> Result<String, MediaError> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(MediaError::InvalidResponse {
            service: SERVICE.to_string(),
            reason: "empty description".to_string(),
        });
    }
    Ok(text)
}

#[async_trait]
impl ImageToText for GroqVision {
    async fn analyze_image(&self, image: &[u8], prompt: &str) -> Result<String, MediaError> {
        if image.is_empty() {
            return Err(MediaError::InvalidInput {
                operation: "image-to-text".to_string(),
                reason: "image is empty".to_string(),
            });
        }
        let prompt = if prompt.trim().is_empty() {
            DEFAULT_ANALYSIS_PROMPT
        } else {
            prompt
        };

        debug!(bytes = image.len(), model = %self.model, "Analyzing image");

        let body = VisionRequest {
            model: &self.model,
            messages: [vision_message(image, prompt)],
            max_tokens: MAX_TOKENS,
        };
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
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

        let parsed: VisionResponse =
            response.json().await.map_err(|e| MediaError::InvalidResponse {
                service: SERVICE.to_string(),
                reason: e.to_string(),
            })?;
        let description = description(parsed)?;

        info!(chars = description.len(), "Image described");
        Ok(description)
    }
}
