//! Process-wide settings, read from the environment.

use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default chat model.
pub const DEFAULT_TEXT_MODEL: &str = "llama-3.3-70b-versatile";
/// Model used for cheap per-message memory analysis.
pub const DEFAULT_SMALL_TEXT_MODEL: &str = "gemma2-9b-it";
pub const DEFAULT_STT_MODEL: &str = "whisper-large-v3-turbo";
pub const DEFAULT_TTS_MODEL: &str = "eleven_flash_v2_5";
pub const DEFAULT_TTI_MODEL: &str = "black-forest-labs/FLUX.1-schnell-Free";
pub const DEFAULT_ITT_MODEL: &str = "llama-3.2-90b-vision-preview";

/// Settings shared by every backend factory and node.
#[derive(Debug, Clone)]
pub struct Settings {
    pub groq_api_key: SecretString,
    pub elevenlabs_api_key: Option<SecretString>,
    pub elevenlabs_voice_id: Option<String>,
    pub together_api_key: Option<SecretString>,

    pub text_model_name: String,
    pub small_text_model_name: String,
    pub stt_model_name: String,
    pub tts_model_name: String,
    pub tti_model_name: String,
    pub itt_model_name: String,

    /// Number of memories injected into the persona prompt.
    pub memory_top_k: usize,
    /// How many trailing messages the router classifies.
    pub router_messages_to_analyze: usize,
    /// Summarize once the history holds strictly more messages than this.
    pub total_messages_summary_trigger: usize,
    /// Messages kept verbatim after a summary is written.
    pub total_messages_after_summary: usize,

    pub db_path: PathBuf,
    pub image_dir: PathBuf,
    pub http_port: u16,
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    /// Settings with every optional value at its default.
    pub fn new(groq_api_key: impl Into<String>) -> Self {
        Self {
            groq_api_key: SecretString::from(groq_api_key.into()),
            elevenlabs_api_key: None,
            elevenlabs_voice_id: None,
            together_api_key: None,
            text_model_name: DEFAULT_TEXT_MODEL.to_string(),
            small_text_model_name: DEFAULT_SMALL_TEXT_MODEL.to_string(),
            stt_model_name: DEFAULT_STT_MODEL.to_string(),
            tts_model_name: DEFAULT_TTS_MODEL.to_string(),
            tti_model_name: DEFAULT_TTI_MODEL.to_string(),
            itt_model_name: DEFAULT_ITT_MODEL.to_string(),
            memory_top_k: 3,
            router_messages_to_analyze: 3,
            total_messages_summary_trigger: 20,
            total_messages_after_summary: 5,
            db_path: PathBuf::from("./data/ava.db"),
            image_dir: PathBuf::from("./generated_images"),
            http_port: 8080,
            log_dir: None,
        }
    }

    /// Read settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let groq_api_key = get("GROQ_API_KEY").ok_or_else(|| ConfigError::MissingRequired {
            key: "GROQ_API_KEY".to_string(),
            hint: "export GROQ_API_KEY=gsk_...".to_string(),
        })?;

        let defaults = Self::new(groq_api_key);

        Ok(Self {
            elevenlabs_api_key: get("ELEVENLABS_API_KEY").map(SecretString::from),
            elevenlabs_voice_id: get("ELEVENLABS_VOICE_ID"),
            together_api_key: get("TOGETHER_API_KEY").map(SecretString::from),
            text_model_name: get("TEXT_MODEL_NAME").unwrap_or(defaults.text_model_name.clone()),
            small_text_model_name: get("SMALL_TEXT_MODEL_NAME")
                .unwrap_or(defaults.small_text_model_name.clone()),
            stt_model_name: get("STT_MODEL_NAME").unwrap_or(defaults.stt_model_name.clone()),
            tts_model_name: get("TTS_MODEL_NAME").unwrap_or(defaults.tts_model_name.clone()),
            tti_model_name: get("TTI_MODEL_NAME").unwrap_or(defaults.tti_model_name.clone()),
            itt_model_name: get("ITT_MODEL_NAME").unwrap_or(defaults.itt_model_name.clone()),
            memory_top_k: parse_or("MEMORY_TOP_K", get("MEMORY_TOP_K"), defaults.memory_top_k)?,
            router_messages_to_analyze: parse_or(
                "ROUTER_MESSAGES_TO_ANALYZE",
                get("ROUTER_MESSAGES_TO_ANALYZE"),
                defaults.router_messages_to_analyze,
            )?,
            total_messages_summary_trigger: parse_or(
                "TOTAL_MESSAGES_SUMMARY_TRIGGER",
                get("TOTAL_MESSAGES_SUMMARY_TRIGGER"),
                defaults.total_messages_summary_trigger,
            )?,
            total_messages_after_summary: parse_or(
                "TOTAL_MESSAGES_AFTER_SUMMARY",
                get("TOTAL_MESSAGES_AFTER_SUMMARY"),
                defaults.total_messages_after_summary,
            )?,
            db_path: get("AVA_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path.clone()),
            image_dir: get("AVA_IMAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.image_dir.clone()),
            http_port: parse_or("AVA_HTTP_PORT", get("AVA_HTTP_PORT"), defaults.http_port)?,
            log_dir: get("AVA_LOG_DIR").map(PathBuf::from),
            ..defaults
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{value}': {e}"),
            }),
    }
}
