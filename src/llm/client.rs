use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{CompletionParams, InferenceBackend};
use crate::error::TriageError;

const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";
const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use for every stage
    pub model: String,
    /// Messages endpoint
    pub api_url: String,
}

impl AnthropicConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY environment variable not set")?;

        let model = std::env::var("TRIAGE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_url =
            std::env::var("TRIAGE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self {
            api_key,
            model,
            api_url,
        })
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Send a message to Claude and get the text of the first content block
    pub async fn send_message(
        &self,
        system: &str,
        user: &str,
        params: CompletionParams,
    ) -> Result<String, TriageError> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: params.max_tokens,
            temperature: Some(params.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                TriageError::InferenceUnavailable(format!(
                    "failed to send request to Anthropic API: {}",
                    e
                ))
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TriageError::InferenceUnavailable(
                "Anthropic API rate limit exceeded".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TriageError::InferenceUnavailable(format!(
                "Anthropic API error: {} - {}",
                status, body
            )));
        }

        let response: AnthropicResponse = response.json().await.map_err(|e| {
            TriageError::InferenceUnavailable(format!("failed to parse Anthropic API response: {}", e))
        })?;

        response
            .first_text()
            .ok_or_else(|| TriageError::InferenceUnavailable("no text content in response".into()))
    }
}

#[async_trait]
impl InferenceBackend for AnthropicClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        params: CompletionParams,
    ) -> Result<String, TriageError> {
        self.send_message(system, user, params).await
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

impl AnthropicResponse {
    fn first_text(&self) -> Option<String> {
        self.content
            .iter()
            .find(|c| c.content_type == "text" && !c.text.trim().is_empty())
            .map(|c| c.text.clone())
    }
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_skips_empty_blocks() {
        let json = r#"{"content": [
            {"type": "text", "text": "  "},
            {"type": "text", "text": "{\"severity\": \"CRITICAL\"}"}
        ]}"#;
        let response: AnthropicResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.first_text().as_deref(),
            Some("{\"severity\": \"CRITICAL\"}")
        );
    }

    #[test]
    fn test_first_text_none_without_text() {
        let json = r#"{"content": [{"type": "tool_use"}]}"#;
        let response: AnthropicResponse = serde_json::from_str(json).unwrap();
        assert!(response.first_text().is_none());
    }

    #[test]
    fn test_request_omits_missing_system() {
        let request = AnthropicRequest {
            model: "m".to_string(),
            max_tokens: 300,
            temperature: Some(0.1),
            system: None,
            messages: vec![],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("system").is_none());
        assert_eq!(value["max_tokens"], 300);
    }
}
