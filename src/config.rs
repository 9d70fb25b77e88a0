use std::env;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_CHAT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

pub const DEFAULT_TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const DEFAULT_SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";
pub const DEFAULT_SPEECH_MODEL: &str = "tts-1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Settings for the outbound chat-completion call.
#[derive(Clone)]
pub struct RelayConfig {
    pub api_key: String,
    pub api_url: String,
    pub default_model: String,
    pub max_tokens: u32,
}

// Keep the credential out of debug output and logs.
impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub template_dir: String,
    pub static_dir: String,
}

#[derive(Clone)]
pub struct SpeechConfig {
    pub api_key: String,
    pub transcription_url: String,
    pub transcription_model: String,
    pub speech_url: String,
    pub speech_model: String,
}

impl std::fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("api_key", &"<redacted>")
            .field("transcription_url", &self.transcription_url)
            .field("transcription_model", &self.transcription_model)
            .field("speech_url", &self.speech_url)
            .field("speech_model", &self.speech_model)
            .finish()
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_key: required(&lookup, "CHAT_API_KEY")?,
            api_url: or_default(&lookup, "CHAT_API_URL", DEFAULT_CHAT_API_URL),
            default_model: or_default(&lookup, "CHAT_DEFAULT_MODEL", DEFAULT_MODEL),
            max_tokens: parsed(&lookup, "CHAT_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
        })
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            bind_address: or_default(&lookup, "BIND_ADDRESS", "127.0.0.1"),
            port: parsed(&lookup, "PORT", 8080)?,
            template_dir: or_default(&lookup, "TEMPLATE_DIR", "templates"),
            static_dir: or_default(&lookup, "STATIC_DIR", "static"),
        })
    }
}

impl SpeechConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_key: required(&lookup, "SPEECH_API_KEY")?,
            transcription_url: or_default(&lookup, "TRANSCRIPTION_URL", DEFAULT_TRANSCRIPTION_URL),
            transcription_model: or_default(
                &lookup,
                "TRANSCRIPTION_MODEL",
                DEFAULT_TRANSCRIPTION_MODEL,
            ),
            speech_url: or_default(&lookup, "SPEECH_URL", DEFAULT_SPEECH_URL),
            speech_model: or_default(&lookup, "SPEECH_MODEL", DEFAULT_SPEECH_MODEL),
        })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

// Empty values are treated the same as unset ones.
fn lookup_non_empty<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup_non_empty(lookup, var).ok_or(ConfigError::Missing(var))
}

fn or_default<F>(lookup: &F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup_non_empty(lookup, var).unwrap_or_else(|| default.to_string())
}

fn parsed<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup_non_empty(lookup, var) {
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}
