//! Factories for configured backend clients, and the reply post-processing filter.
//!
//! Every factory builds a fresh client from `Settings`; nothing is cached.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use secrecy::SecretString;

use crate::config::Settings;
use crate::error::{ConfigError, LlmError, MediaError};
use crate::llm::{LlmProvider, create_groq_provider};
use crate::media::{
    ElevenLabsSpeech, GroqVision, GroqWhisper, ImageToText, SpeechToText, TextToImage,
    TextToSpeech, TogetherImageGenerator,
};

/// Temperature for persona replies and anything else that doesn't pick one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

static ASTERISK_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*.*?\*").expect("asterisk pattern is valid")
});

/// Strip `*stage directions*` from a model reply, then trim.
///
/// Pairs are matched left to right and never span a newline; an unpaired
/// asterisk is left alone.
pub fn remove_asterisk_content(text: &str) -> String {
    ASTERISK_SPAN.replace_all(text, "").trim().to_string()
}

/// Chat model used for persona replies, routing and summaries.
pub fn get_chat_model(
    settings: &Settings,
    temperature: f32,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    create_groq_provider(&settings.groq_api_key, &settings.text_model_name, temperature)
}

/// Smaller chat model for per-message memory analysis.
pub fn get_small_chat_model(settings: &Settings) -> Result<Arc<dyn LlmProvider>, LlmError> {
    create_groq_provider(
        &settings.groq_api_key,
        &settings.small_text_model_name,
        DEFAULT_TEMPERATURE,
    )
}

pub fn get_text_to_speech_module(settings: &Settings) -> Result<ElevenLabsSpeech, ConfigError> {
    let api_key = require(&settings.elevenlabs_api_key, "ELEVENLABS_API_KEY")?;
    let voice_id = settings
        .elevenlabs_voice_id
        .clone()
        .ok_or_else(|| missing("ELEVENLABS_VOICE_ID"))?;
    Ok(ElevenLabsSpeech::new(
        api_key,
        voice_id,
        &settings.tts_model_name,
    ))
}

pub fn get_speech_to_text_module(settings: &Settings) -> GroqWhisper {
    GroqWhisper::new(settings.groq_api_key.clone(), &settings.stt_model_name)
}

/// Image generator. Scene planning runs on the regular chat model.
pub fn get_text_to_image_module(
    settings: &Settings,
) -> Result<TogetherImageGenerator, MediaError> {
    let api_key = require(&settings.together_api_key, "TOGETHER_API_KEY")?;
    let planner = get_chat_model(settings, DEFAULT_TEMPERATURE)?;
    Ok(TogetherImageGenerator::new(
        api_key,
        &settings.tti_model_name,
        planner,
    ))
}

pub fn get_image_to_text_module(settings: &Settings) -> GroqVision {
    GroqVision::new(settings.groq_api_key.clone(), &settings.itt_model_name)
}

fn require(value: &Option<SecretString>, key: &str) -> Result<SecretString, ConfigError> {
    value.clone().ok_or_else(|| missing(key))
}

fn missing(key: &str) -> ConfigError {
    ConfigError::MissingRequired {
        key: key.to_string(),
        hint: format!("set {key} in the environment"),
    }
}

/// Source of backend clients for the workflow nodes.
///
/// Lets a run swap hosted services for local stubs.
pub trait BackendFactory: Send + Sync {
    fn chat_model(&self, temperature: f32) -> Result<Arc<dyn LlmProvider>, LlmError>;
    fn small_chat_model(&self) -> Result<Arc<dyn LlmProvider>, LlmError>;
    fn text_to_speech(&self) -> Result<Arc<dyn TextToSpeech>, ConfigError>;
    fn speech_to_text(&self) -> Result<Arc<dyn SpeechToText>, ConfigError>;
    /// Scene planning needs a chat model, so this can also fail on the LLM side.
    fn text_to_image(&self) -> Result<Arc<dyn TextToImage>, MediaError>;
    fn image_to_text(&self) -> Result<Arc<dyn ImageToText>, ConfigError>;
}

/// Hosted Groq / ElevenLabs / Together clients.
pub struct HostedBackends {
    settings: Arc<Settings>,
}

impl HostedBackends {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }
}

impl BackendFactory for HostedBackends {
    fn chat_model(&self, temperature: f32) -> Result<Arc<dyn LlmProvider>, LlmError> {
        get_chat_model(&self.settings, temperature)
    }

    fn small_chat_model(&self) -> Result<Arc<dyn LlmProvider>, LlmError> {
        get_small_chat_model(&self.settings)
    }

    fn text_to_speech(&self) -> Result<Arc<dyn TextToSpeech>, ConfigError> {
        Ok(Arc::new(get_text_to_speech_module(&self.settings)?))
    }

    fn speech_to_text(&self) -> Result<Arc<dyn SpeechToText>, ConfigError> {
        Ok(Arc::new(get_speech_to_text_module(&self.settings)))
    }

    fn text_to_image(&self) -> Result<Arc<dyn TextToImage>, MediaError> {
        Ok(Arc::new(get_text_to_image_module(&self.settings)?))
    }

    fn image_to_text(&self) -> Result<Arc<dyn ImageToText>, ConfigError> {
        Ok(Arc::new(get_image_to_text_module(&self.settings)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asterisk_filter_examples() {
        assert_eq!(remove_asterisk_content("Hello *waves* world"), "Hello  world");
        assert_eq!(remove_asterisk_content("*only*"), "");
        assert_eq!(remove_asterisk_content("*a* middle *b*"), "middle");
        assert_eq!(remove_asterisk_content("tail *open"), "tail *open");
        assert_eq!(remove_asterisk_content("no asterisks here"), "no asterisks here");
        assert_eq!(remove_asterisk_content("  plain  "), "plain");
    }

    #[test]
    fn asterisk_pairs_do_not_cross_lines() {
        assert_eq!(remove_asterisk_content("one *\ntwo* three"), "one *\ntwo* three");
        assert_eq!(remove_asterisk_content("*x**y* z"), "z");
    }

    #[test]
    fn chat_model_uses_configured_name_and_temperature() {
        let mut settings = Settings::new("gsk_test");
        settings.text_model_name = "custom-70b".into();
        let llm = get_chat_model(&settings, 0.3).unwrap();
        assert_eq!(llm.model_name(), "custom-70b");
        assert!((llm.temperature() - 0.3).abs() < f32::EPSILON);

        let small = get_small_chat_model(&settings).unwrap();
        assert_eq!(small.model_name(), "gemma2-9b-it");
    }

    #[test]
    fn tts_requires_credentials() {
        let mut settings = Settings::new("gsk_test");
        assert!(matches!(
            get_text_to_speech_module(&settings),
            Err(ConfigError::MissingRequired { ref key, .. }) if key == "ELEVENLABS_API_KEY"
        ));

        settings.elevenlabs_api_key = Some(SecretString::from("xi"));
        assert!(matches!(
            get_text_to_speech_module(&settings),
            Err(ConfigError::MissingRequired { ref key, .. }) if key == "ELEVENLABS_VOICE_ID"
        ));

        settings.elevenlabs_voice_id = Some("voice".into());
        assert!(get_text_to_speech_module(&settings).is_ok());
    }

    #[test]
    fn image_generation_requires_together_key() {
        let mut settings = Settings::new("gsk_test");
        let backends = HostedBackends::new(Arc::new(settings.clone()));
        assert!(matches!(
            backends.text_to_image(),
            Err(MediaError::Config(ConfigError::MissingRequired { .. }))
        ));
        assert!(backends.image_to_text().is_ok());
        assert!(backends.speech_to_text().is_ok());

        settings.together_api_key = Some(SecretString::from("tg"));
        assert!(get_text_to_image_module(&settings).is_ok());
    }
}
