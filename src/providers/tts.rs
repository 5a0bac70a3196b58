//! Text-to-speech backends

use async_trait::async_trait;

use super::SpeechSynthesizer;
use crate::{Error, Result};

/// Synthesizes speech with `OpenAI` TTS
pub struct OpenAiTts {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    voice: String,
    model: String,
    speed: f32,
}

impl OpenAiTts {
    /// Create an `OpenAI` synthesizer
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty.
    pub fn new(api_key: String, voice: String, model: String, speed: f32) -> Result<Self> {
        Self::with_base_url(
            "https://api.openai.com/v1".to_string(),
            api_key,
            voice,
            model,
            speed,
        )
    }

    /// Create an `OpenAI` synthesizer against a custom endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty.
    pub fn with_base_url(
        base_url: String,
        api_key: String,
        voice: String,
        model: String,
        speed: f32,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            voice,
            model,
            speed,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
        };

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("OpenAI TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        tracing::debug!(bytes = audio.len(), "synthesis complete");
        Ok(audio.to_vec())
    }
}

/// Synthesizes speech with `ElevenLabs`
pub struct ElevenLabsTts {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    voice_id: String,
    model: String,
}

impl ElevenLabsTts {
    /// Create an `ElevenLabs` synthesizer
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty.
    pub fn new(api_key: String, voice_id: String, model: String) -> Result<Self> {
        Self::with_base_url(
            "https://api.elevenlabs.io/v1".to_string(),
            api_key,
            voice_id,
            model,
        )
    }

    /// Create an `ElevenLabs` synthesizer against a custom endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty.
    pub fn with_base_url(
        base_url: String,
        api_key: String,
        voice_id: String,
        model: String,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for TTS".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            voice_id,
            model,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!("{}/text-to-speech/{}", self.base_url, self.voice_id);
        let request = ElevenLabsRequest {
            text,
            model_id: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("ElevenLabs TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        tracing::debug!(bytes = audio.len(), "synthesis complete");
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_keys_rejected() {
        assert!(OpenAiTts::new(String::new(), "alloy".to_string(), "tts-1".to_string(), 1.0).is_err());
        assert!(
            ElevenLabsTts::new(String::new(), "voice".to_string(), "eleven_turbo_v2".to_string())
                .is_err()
        );
    }
}
