//! Configuration management for the Vista gateway

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::agent::TurnConfig;
use crate::idle::IdleConfig;
use crate::prompt::DEFAULT_WAKE_PHRASES;
use crate::summarizer::SummarizerConfig;
use crate::{Error, Result};

/// Vista gateway configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data directory (booking database)
    pub data_dir: PathBuf,

    /// Phrases that end hold state when heard
    pub wake_phrases: Vec<String>,

    /// Language model configuration
    pub llm: LlmConfig,

    /// Speech-to-text configuration
    pub stt: SttConfig,

    /// Text-to-speech configuration
    pub tts: TtsConfig,

    /// Idle monitoring configuration
    pub idle: IdleSettings,

    /// Rolling summarizer configuration
    pub summarizer: SummarizerSettings,
}

/// Language model provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai", "cerebras", or "groq"
    pub provider: String,
    /// Model identifier
    pub model: String,
    /// API key (usually supplied via environment)
    pub api_key: String,
    /// Max tokens per completion
    pub max_tokens: u32,
    /// Max tool-call rounds per turn
    pub max_iterations: u32,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
            max_tokens: 1024,
            max_iterations: 8,
            temperature: None,
        }
    }
}

/// Speech-to-text provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Provider name: "whisper" or "deepgram"
    pub provider: String,
    /// Model identifier (e.g. "whisper-1", "nova-3")
    pub model: String,
    /// API key
    pub api_key: String,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            provider: "deepgram".to_string(),
            model: "nova-3".to_string(),
            api_key: String::new(),
        }
    }
}

/// Text-to-speech provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Provider name: "openai" or "elevenlabs"
    pub provider: String,
    /// Voice identifier
    pub voice: String,
    /// Model identifier
    pub model: String,
    /// Speed multiplier (0.25 to 4.0)
    pub speed: f32,
    /// API key
    pub api_key: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            voice: "alloy".to_string(),
            model: "tts-1".to_string(),
            speed: 1.0,
            api_key: String::new(),
        }
    }
}

/// Idle monitoring settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdleSettings {
    /// Seconds of user silence before a nudge
    pub timeout_secs: u64,
    /// Nudges before the session ends
    pub max_retries: u32,
}

impl Default for IdleSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 3,
        }
    }
}

/// Rolling summarizer settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummarizerSettings {
    /// Message count that triggers compaction
    pub threshold: usize,
    /// Trailing messages exempt from compaction
    pub keep_recent: usize,
    /// Bound on the auxiliary summarization call, in seconds
    pub request_timeout_secs: u64,
    /// Model for the auxiliary call; empty uses the session model
    pub model: String,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            threshold: 100,
            keep_recent: 20,
            request_timeout_secs: 30,
            model: String::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            wake_phrases: DEFAULT_WAKE_PHRASES
                .iter()
                .map(ToString::to_string)
                .collect(),
            llm: LlmConfig::default(),
            stt: SttConfig::default(),
            tts: TtsConfig::default(),
            idle: IdleSettings::default(),
            summarizer: SummarizerSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides (`VISTA_*` plus the usual
    /// provider key variables)
    pub fn apply_env(&mut self) {
        if let Ok(provider) = std::env::var("VISTA_LLM_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Ok(model) = std::env::var("VISTA_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Ok(provider) = std::env::var("VISTA_STT_PROVIDER") {
            self.stt.provider = provider;
        }
        if let Ok(provider) = std::env::var("VISTA_TTS_PROVIDER") {
            self.tts.provider = provider;
        }

        if self.llm.api_key.is_empty() {
            let var = match self.llm.provider.as_str() {
                "cerebras" => "CEREBRAS_API_KEY",
                "groq" => "GROQ_API_KEY",
                _ => "OPENAI_API_KEY",
            };
            self.llm.api_key = std::env::var(var).unwrap_or_default();
        }
        if self.stt.api_key.is_empty() {
            let var = match self.stt.provider.as_str() {
                "deepgram" => "DEEPGRAM_API_KEY",
                _ => "OPENAI_API_KEY",
            };
            self.stt.api_key = std::env::var(var).unwrap_or_default();
        }
        if self.tts.api_key.is_empty() {
            let var = match self.tts.provider.as_str() {
                "elevenlabs" => "ELEVENLABS_API_KEY",
                _ => "OPENAI_API_KEY",
            };
            self.tts.api_key = std::env::var(var).unwrap_or_default();
        }
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns error if a setting is out of range.
    pub fn validate(&self) -> Result<()> {
        if !(0.25..=4.0).contains(&self.tts.speed) {
            return Err(Error::Config(format!(
                "tts.speed must be between 0.25 and 4.0, got {}",
                self.tts.speed
            )));
        }
        if self.wake_phrases.is_empty() {
            return Err(Error::Config("wake_phrases must not be empty".to_string()));
        }
        if self.summarizer.keep_recent + 1 >= self.summarizer.threshold {
            return Err(Error::Config(
                "summarizer.threshold must exceed keep_recent + 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Turn configuration derived from the LLM settings
    #[must_use]
    pub fn turn_config(&self) -> TurnConfig {
        TurnConfig {
            model: self.llm.model.clone(),
            max_tokens: self.llm.max_tokens,
            max_iterations: self.llm.max_iterations,
            temperature: self.llm.temperature,
        }
    }

    /// Idle monitor configuration
    #[must_use]
    pub const fn idle_config(&self) -> IdleConfig {
        IdleConfig {
            timeout: Duration::from_secs(self.idle.timeout_secs),
            max_retries: self.idle.max_retries,
        }
    }

    /// Rolling summarizer configuration
    #[must_use]
    pub fn summarizer_config(&self) -> SummarizerConfig {
        SummarizerConfig {
            threshold: self.summarizer.threshold,
            keep_recent: self.summarizer.keep_recent,
            request_timeout: Duration::from_secs(self.summarizer.request_timeout_secs),
            model: if self.summarizer.model.is_empty() {
                self.llm.model.clone()
            } else {
                self.summarizer.model.clone()
            },
            ..SummarizerConfig::default()
        }
    }
}

/// Platform data directory, falling back to the working directory
fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("dev", "grandvista", "vista-gateway")
        .map_or_else(|| PathBuf::from("."), |dirs| dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(!config.wake_phrases.is_empty());
        assert_eq!(config.idle.timeout_secs, 10);
    }

    #[test]
    fn load_parses_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            r#"
            [llm]
            provider = "cerebras"
            model = "gpt-oss-120b"

            [summarizer]
            threshold = 40
            keep_recent = 10
            "#
        )
        .expect("write");

        let config = Config::load(file.path()).expect("load");
        assert_eq!(config.llm.provider, "cerebras");
        assert_eq!(config.summarizer.threshold, 40);
        // Untouched sections keep their defaults
        assert_eq!(config.stt.provider, "deepgram");
    }

    #[test]
    fn out_of_range_speed_rejected() {
        let mut config = Config::default();
        config.tts.speed = 9.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn summarizer_model_falls_back_to_session_model() {
        let config = Config::default();
        assert_eq!(config.summarizer_config().model, config.llm.model);
    }
}
