//! Speech and image backends.
//!
//! Each concern sits behind a trait so nodes can run against stubs; the
//! hosted implementations are thin `reqwest` clients. Scene planning for
//! image generation goes through the `LlmProvider` seam.

pub mod image_to_text;
pub mod speech_to_text;
pub mod text_to_image;
pub mod text_to_speech;

use std::path::Path;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::MediaError;
use crate::llm::ChatMessage;

pub use image_to_text::GroqVision;
pub use speech_to_text::GroqWhisper;
pub use text_to_image::TogetherImageGenerator;
pub use text_to_speech::ElevenLabsSpeech;

/// Converts text to spoken audio.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize `text`, returning encoded audio bytes (MPEG).
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, MediaError>;
}

/// Converts spoken audio to text.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, MediaError>;
}

/// Describes images in text.
#[async_trait]
pub trait ImageToText: Send + Sync {
    async fn analyze_image(&self, image: &[u8], prompt: &str) -> Result<String, MediaError>;
}

/// Class for the scenario response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioPrompt {
    /// The AI's narrative response to the question
    pub narrative: String,
    /// The visual prompt to generate an image representing the scene
    pub image_prompt: String,
}

/// Generates images from text prompts.
#[async_trait]
pub trait TextToImage: Send + Sync {
    /// Derive a scene to depict from recent conversation.
    async fn create_scenario(&self, history: &[ChatMessage]) -> Result<ScenarioPrompt, MediaError>;

    /// Generate an image for `prompt`, write it to `output_path`, and return the bytes.
    async fn generate_image(&self, prompt: &str, output_path: &Path)
    -> Result<Vec<u8>, MediaError>;
}

/// Guess an image MIME type from its magic bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}
