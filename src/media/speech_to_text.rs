//! Groq Whisper speech-to-text.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::error::MediaError;
use crate::llm::groq::GROQ_BASE_URL;
use crate::media::SpeechToText;

const SERVICE: &str = "groq-stt";

pub struct GroqWhisper {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl GroqWhisper {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            base_url: GROQ_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl SpeechToText for GroqWhisper {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, MediaError> {
        if audio.is_empty() {
            return Err(MediaError::InvalidInput {
                operation: "speech-to-text".to_string(),
                reason: "audio is empty".to_string(),
            });
        }

        let file = Part::bytes(audio.to_vec())
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| MediaError::RequestFailed {
                service: SERVICE.to_string(),
                reason: e.to_string(),
            })?;

        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", "en")
            .text("response_format", "text");

        debug!(bytes = audio.len(), model = %self.model, "Transcribing audio");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::RequestFailed {
                service: SERVICE.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| MediaError::InvalidResponse {
            service: SERVICE.to_string(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(MediaError::RequestFailed {
                service: SERVICE.to_string(),
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let transcript = body.trim().to_string();
        if transcript.is_empty() {
            return Err(MediaError::InvalidResponse {
                service: SERVICE.to_string(),
                reason: "transcription is empty".to_string(),
            });
        }

        info!(chars = transcript.len(), "Audio transcribed");
        Ok(transcript)
    }
}
