//! Provider layer
//!
//! Capability interfaces over the external STT, TTS, and LLM services, with
//! one implementation per backend and a factory keyed by configuration.
//! The core treats all of these as black boxes: given text, produce
//! text/tool calls; given audio, produce a transcript; given text, produce
//! audio.

mod llm;
mod stt;
mod tts;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{LlmConfig, SttConfig, TtsConfig};
use crate::{Error, Result};

pub use llm::{ChatChoice, ChatClient, ChatRequest, ChatResponse, FunctionDefinition, ToolDefinition};
pub use stt::{DeepgramStt, WhisperStt};
pub use tts::{ElevenLabsTts, OpenAiTts};

/// Generates text (and tool calls) from a conversation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run one non-streaming chat completion
    async fn generate(&self, request: ChatRequest) -> Result<ChatResponse>;
}

/// Transcribes speech audio to text
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe WAV audio bytes
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// Synthesizes speech audio from text
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize text into audio bytes
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Build a text generator from configuration
///
/// # Errors
///
/// Returns error if the provider name is unknown or the API key is missing.
pub fn make_generator(config: &LlmConfig) -> Result<Arc<dyn TextGenerator>> {
    let client = match config.provider.as_str() {
        "openai" => ChatClient::openai(config.api_key.clone(), config.model.clone()),
        "cerebras" => ChatClient::cerebras(config.api_key.clone(), config.model.clone()),
        "groq" => ChatClient::groq(config.api_key.clone(), config.model.clone()),
        other => {
            return Err(Error::Config(format!("unknown LLM provider: {other}")));
        }
    }?;
    Ok(Arc::new(client))
}

/// Build a speech recognizer from configuration
///
/// # Errors
///
/// Returns error if the provider name is unknown or the API key is missing.
pub fn make_recognizer(config: &SttConfig) -> Result<Arc<dyn SpeechRecognizer>> {
    match config.provider.as_str() {
        "whisper" => Ok(Arc::new(WhisperStt::new(
            config.api_key.clone(),
            config.model.clone(),
        )?)),
        "deepgram" => Ok(Arc::new(DeepgramStt::new(
            config.api_key.clone(),
            config.model.clone(),
        )?)),
        other => Err(Error::Config(format!("unknown STT provider: {other}"))),
    }
}

/// Build a speech synthesizer from configuration
///
/// # Errors
///
/// Returns error if the provider name is unknown or the API key is missing.
pub fn make_synthesizer(config: &TtsConfig) -> Result<Arc<dyn SpeechSynthesizer>> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiTts::new(
            config.api_key.clone(),
            config.voice.clone(),
            config.model.clone(),
            config.speed,
        )?)),
        "elevenlabs" => Ok(Arc::new(ElevenLabsTts::new(
            config.api_key.clone(),
            config.voice.clone(),
            config.model.clone(),
        )?)),
        other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
    }
}
