//! Speech-to-text backends

use async_trait::async_trait;

use super::SpeechRecognizer;
use crate::{Error, Result};

/// Response from the Whisper transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Response from the Deepgram transcription API
#[derive(serde::Deserialize)]
struct DeepgramResponse {
    results: DeepgramResults,
}

#[derive(serde::Deserialize)]
struct DeepgramResults {
    channels: Vec<DeepgramChannel>,
}

#[derive(serde::Deserialize)]
struct DeepgramChannel {
    alternatives: Vec<DeepgramAlternative>,
}

#[derive(serde::Deserialize)]
struct DeepgramAlternative {
    transcript: String,
}

/// Transcribes speech with `OpenAI` Whisper
pub struct WhisperStt {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl WhisperStt {
    /// Create a Whisper recognizer
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url("https://api.openai.com/v1".to_string(), api_key, model)
    }

    /// Create a Whisper recognizer against a custom endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty.
    pub fn with_base_url(base_url: String, api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for Whisper".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperStt {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting Whisper transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone());

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Whisper request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse Whisper response");
            e
        })?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }
}

/// Transcribes speech with Deepgram
pub struct DeepgramStt {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl DeepgramStt {
    /// Create a Deepgram recognizer
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url("https://api.deepgram.com/v1".to_string(), api_key, model)
    }

    /// Create a Deepgram recognizer against a custom endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty.
    pub fn with_base_url(base_url: String, api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("Deepgram API key required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl SpeechRecognizer for DeepgramStt {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting Deepgram transcription");

        let url = format!(
            "{}/listen?model={}&punctuate=true",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", "audio/wav")
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Deepgram request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Deepgram API error");
            return Err(Error::Stt(format!("Deepgram API error {status}: {body}")));
        }

        let result: DeepgramResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse Deepgram response");
            e
        })?;

        let transcript = result
            .results
            .channels
            .first()
            .and_then(|c| c.alternatives.first())
            .map(|a| a.transcript.clone())
            .unwrap_or_default();

        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_keys_rejected() {
        assert!(WhisperStt::new(String::new(), "whisper-1".to_string()).is_err());
        assert!(DeepgramStt::new(String::new(), "nova-3".to_string()).is_err());
    }
}
