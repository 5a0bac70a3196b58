//! OpenAI-compatible chat completion client
//!
//! One client covers every backend speaking the `/chat/completions` wire
//! shape; openai, cerebras, and groq differ only in base URL and model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::TextGenerator;
use crate::context::{Message, ToolCall};
use crate::{Error, Result};

/// A callable tool advertised to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDefinition,
}

/// Function name, description, and JSON Schema parameters of a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

impl ToolDefinition {
    /// Build a function tool definition
    #[must_use]
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: Some(description.into()),
                parameters: Some(parameters),
            },
        }
    }
}

/// A chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

impl ChatRequest {
    /// A plain request with no tools
    #[must_use]
    pub fn new(model: String, messages: Vec<Message>) -> Self {
        Self {
            model,
            messages,
            temperature: None,
            max_tokens: None,
            tools: None,
        }
    }
}

/// One completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: Message,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// A chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

impl ChatResponse {
    /// Wrap a single assistant message (used by in-process fakes)
    #[must_use]
    pub fn from_message(message: Message) -> Self {
        Self {
            choices: vec![ChatChoice {
                message,
                finish_reason: None,
            }],
        }
    }

    /// The first choice's message, if any
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        self.choices.first().map(|c| &c.message)
    }

    /// The first choice's text content, if any
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.message().and_then(Message::text)
    }

    /// The first choice's tool calls, empty when none
    #[must_use]
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.message()
            .and_then(|m| m.tool_calls.as_deref())
            .unwrap_or_default()
    }
}

/// Chat completion client for OpenAI-compatible APIs
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    /// Default model for requests that leave `model` empty
    model: String,
}

impl ChatClient {
    /// Create a client for the `OpenAI` API
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty.
    pub fn openai(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url("https://api.openai.com/v1".to_string(), api_key, model)
    }

    /// Create a client for the Cerebras API
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty.
    pub fn cerebras(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url("https://api.cerebras.ai/v1".to_string(), api_key, model)
    }

    /// Create a client for the Groq API
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty.
    pub fn groq(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url("https://api.groq.com/openai/v1".to_string(), api_key, model)
    }

    /// Create a client against an arbitrary OpenAI-compatible endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty.
    pub fn with_base_url(base_url: String, api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("LLM API key required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        })
    }

    /// The default model identifier
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one chat completion
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API reports an error.
    pub async fn chat_completion(&self, mut request: ChatRequest) -> Result<ChatResponse> {
        if request.model.is_empty() {
            request.model.clone_from(&self.model);
        }

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "starting chat completion"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "chat completion request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "chat API error");
            return Err(Error::Llm(format!("chat API error {status}: {body}")));
        }

        let result: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse chat response");
            e
        })?;

        Ok(result)
    }
}

#[async_trait]
impl TextGenerator for ChatClient {
    async fn generate(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.chat_completion(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_rejected() {
        assert!(ChatClient::openai(String::new(), "gpt-4o-mini".to_string()).is_err());
    }

    #[test]
    fn request_omits_absent_fields() {
        let request = ChatRequest::new("m".to_string(), vec![Message::user("hi")]);
        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json.get("tools").is_none());
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn response_accessors_read_first_choice() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_pricing", "arguments": "{}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let response: ChatResponse = serde_json::from_value(raw).expect("deserialize");
        assert!(response.text().is_none());
        assert_eq!(response.tool_calls().len(), 1);
        assert_eq!(response.tool_calls()[0].function.name, "get_pricing");
    }
}
