//! Anthropic Messages API judge.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use rag_core::{Judge, JudgeConfig, JudgeError, RagError, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Judge backed by the Anthropic Messages API.
///
/// Timeouts are applied by the caller; this client performs no retries.
pub struct AnthropicJudge {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [RequestMessage<'a>; 1],
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl AnthropicJudge {
    /// Create a judge with an explicit API key.
    pub fn new(api_key: impl Into<String>, config: &JudgeConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RagError::config("judge API key is empty"));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| RagError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Create a judge reading the API key from `config.api_key_env`.
    pub fn from_env(config: &JudgeConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            RagError::config(format!("{} not set", config.api_key_env))
        })?;
        Self::new(api_key, config)
    }
}

/// Concatenate the text blocks of a Messages API response.
fn extract_text(body: &str) -> std::result::Result<String, JudgeError> {
    let response: MessagesResponse =
        serde_json::from_str(body).map_err(|e| JudgeError::Malformed(e.to_string()))?;

    let text: String = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .collect();

    if text.trim().is_empty() {
        return Err(JudgeError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl Judge for AnthropicJudge {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> std::result::Result<String, JudgeError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            messages: [RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!("Calling {} ({} prompt chars)", self.model, prompt.len());

        let response = self
            .client
            .post(format!("{}/v1/messages", self.endpoint))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| JudgeError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| JudgeError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(JudgeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        extract_text(&body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        let err = AnthropicJudge::new("  ", &JudgeConfig::default()).err().unwrap();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_missing_env_rejected() {
        let config = JudgeConfig {
            api_key_env: "RAG_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..JudgeConfig::default()
        };
        assert!(AnthropicJudge::from_env(&config).is_err());
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let config = JudgeConfig {
            endpoint: "http://localhost:8080/".to_string(),
            ..JudgeConfig::default()
        };
        let judge = AnthropicJudge::new("key", &config).unwrap();
        assert_eq!(judge.endpoint, "http://localhost:8080");
        assert_eq!(judge.model(), "claude-3-5-haiku-latest");
    }

    #[test]
    fn test_request_shape() {
        let request = MessagesRequest {
            model: "m",
            max_tokens: 10,
            messages: [RequestMessage {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["max_tokens"], 10);
    }

    #[test]
    fn test_extract_text() {
        let body = r#"{"id":"msg_1","content":[{"type":"text","text":"[\"doc_2\","},{"type":"tool_use","id":"x","name":"y","input":{}},{"type":"text","text":" \"doc_1\"]"}]}"#;
        assert_eq!(extract_text(body).unwrap(), "[\"doc_2\", \"doc_1\"]");
    }

    #[test]
    fn test_extract_text_errors() {
        assert_eq!(
            extract_text(r#"{"content":[]}"#).unwrap_err(),
            JudgeError::EmptyResponse
        );
        assert!(matches!(
            extract_text("not json").unwrap_err(),
            JudgeError::Malformed(_)
        ));
    }
}
