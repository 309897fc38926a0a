//! ElevenLabs text-to-speech.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::MediaError;
use crate::media::TextToSpeech;

const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io/v1";

/// ElevenLabs rejects longer inputs.
pub const MAX_TEXT_CHARS: usize = 5000;

const SERVICE: &str = "elevenlabs";

#[derive(Debug)]
pub struct ElevenLabsSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    voice_id: String,
    model_id: String,
    base_url: String,
}

impl ElevenLabsSpeech {
    pub fn new(api_key: SecretString, voice_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            voice_id: voice_id.into(),
            model_id: model_id.into(),
            base_url: ELEVENLABS_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

/// Reject input the backend would refuse anyway.
fn validate_text(text: &str) -> Result<(), MediaError> {
    if text.trim().is_empty() {
        return Err(MediaError::InvalidInput {
            operation: "text-to-speech".to_string(),
            reason: "text is empty".to_string(),
        });
    }
    let len = text.chars().count();
    if len > MAX_TEXT_CHARS {
        return Err(MediaError::InvalidInput {
            operation: "text-to-speech".to_string(),
            reason: format!("text is {len} characters, limit is {MAX_TEXT_CHARS}"),
        });
    }
    Ok(())
}

#[async_trait]
impl TextToSpeech for ElevenLabsSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, MediaError> {
        validate_text(text)?;

        let url = format!("{}/text-to-speech/{}", self.base_url, self.voice_id);
        let body = SpeechRequest {
            text,
            model_id: &self.model_id,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.5,
            },
        };

        debug!(chars = text.len(), voice = %self.voice_id, "Synthesizing speech");

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", self.api_key.expose_secret())
            .header(reqwest::header::ACCEPT, "audio/mpeg")
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

        let audio = response.bytes().await.map_err(|e| MediaError::InvalidResponse {
            service: SERVICE.to_string(),
            reason: e.to_string(),
        })?;

        if audio.is_empty() {
            return Err(MediaError::InvalidResponse {
                service: SERVICE.to_string(),
                reason: "empty audio body".to_string(),
            });
        }

        info!(bytes = audio.len(), "Speech synthesized");
        Ok(audio.to_vec())
    }
}
