use std::env;

use async_trait::async_trait;
use quiz_core::model::{AiSettings, AiSettingsDraft, SettingsError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Clone, Debug)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl CompletionConfig {
    /// Read `QUIZ_AI_API_KEY`, `QUIZ_AI_BASE_URL` and `QUIZ_AI_MODEL`.
    ///
    /// Returns `Ok(None)` when no key is set.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidBaseUrl` if the base URL does not parse.
    pub fn from_env() -> Result<Option<Self>, SettingsError> {
        let settings = AiSettingsDraft {
            api_key: env::var("QUIZ_AI_API_KEY").ok(),
            api_model: env::var("QUIZ_AI_MODEL").ok(),
            api_base_url: env::var("QUIZ_AI_BASE_URL").ok(),
        }
        .validate()?;
        Ok(Self::from_settings(&settings))
    }

    #[must_use]
    pub fn from_settings(settings: &AiSettings) -> Option<Self> {
        let api_key = settings.api_key()?.to_string();
        Some(Self {
            base_url: settings.api_base_url().unwrap_or(DEFAULT_BASE_URL).to_string(),
            api_key,
            model: settings.api_model().unwrap_or(DEFAULT_MODEL).to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Opaque text-in / text-out access to a generative model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one prompt and return the trimmed reply.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError` when the client is disabled, the request fails,
    /// or the reply is empty.
    async fn complete(&self, prompt: &str) -> Result<String, GeneratorError>;
}

const TEMPERATURE: f32 = 0.7;

/// OpenAI-compatible `/chat/completions` client.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    config: Option<CompletionConfig>,
}

impl ChatCompletionsClient {
    #[must_use]
    pub fn new(config: Option<CompletionConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String, GeneratorError> {
        let config = self.config.as_ref().ok_or(GeneratorError::Disabled)?;

        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(config.endpoint())
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeneratorError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(GeneratorError::EmptyResponse)?;

        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_requires_api_key() {
        let settings = AiSettingsDraft {
            api_model: Some("local-model".into()),
            ..AiSettingsDraft::default()
        }
        .validate()
        .unwrap();
        assert!(CompletionConfig::from_settings(&settings).is_none());
    }

    #[test]
    fn config_fills_defaults() {
        let settings = AiSettingsDraft {
            api_key: Some("sk-test".into()),
            api_base_url: Some("http://localhost:8080/v1/".into()),
            ..AiSettingsDraft::default()
        }
        .validate()
        .unwrap();
        let config = CompletionConfig::from_settings(&settings).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn response_without_content_is_empty() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(body.choices[0].message.content.is_none());
    }

    #[tokio::test]
    async fn disabled_client_refuses() {
        let client = ChatCompletionsClient::new(None);
        assert!(!client.enabled());
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, GeneratorError::Disabled));
    }
}
