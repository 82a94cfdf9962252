use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;

/// Thin client for an OpenAI-compatible chat-completions endpoint. Every
/// request asks for a JSON object reply.
#[derive(Debug, Clone)]
pub struct LlmProvider {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl LlmProvider {
    pub fn new(config: &GatewayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            config: config.clone(),
            client,
        }
    }

    /// Startup check. Real mode without a key can never succeed.
    pub fn validate_config(config: &GatewayConfig) -> Result<(), String> {
        if config.enabled && !config.mock && config.api_key.trim().is_empty() {
            return Err("Invalid gateway configuration: GATEWAY_MOCK=false requires LLM_API_KEY. \
                 Set LLM_API_KEY, GATEWAY_MOCK=true or GATEWAY_ENABLED=false."
                .to_string());
        }
        if config.enabled && !config.mock && config.api_url.trim().is_empty() {
            return Err("Invalid gateway configuration: LLM_API_URL is empty".to_string());
        }
        Ok(())
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.client
    }

    pub async fn chat(&self, messages: Vec<ChatMessage>, temperature: f32) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: &messages,
            temperature,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(LlmError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletion = response.json().await.map_err(LlmError::from_reqwest)?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: String) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("llm request timed out")]
    Timeout,
    #[error("llm network error: {0}")]
    Network(String),
    #[error("llm api error: status={status}, message={message}")]
    ApiError { status: u16, message: String },
    #[error("llm returned no choices")]
    EmptyResponse,
}

impl LlmError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real_mode(api_key: &str) -> GatewayConfig {
        GatewayConfig {
            mock: false,
            api_key: api_key.to_string(),
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn real_mode_without_key_is_rejected() {
        assert!(LlmProvider::validate_config(&real_mode("")).is_err());
        assert!(LlmProvider::validate_config(&real_mode("gsk_test")).is_ok());
    }

    #[test]
    fn mock_or_disabled_needs_no_key() {
        assert!(LlmProvider::validate_config(&GatewayConfig::default()).is_ok());
        let disabled = GatewayConfig {
            enabled: false,
            ..real_mode("")
        };
        assert!(LlmProvider::validate_config(&disabled).is_ok());
    }

    #[test]
    fn request_asks_for_json_object() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi".to_string())];
        let request = ChatRequest {
            model: "m",
            messages: &messages,
            temperature: 0.5,
            response_format: ResponseFormat { kind: "json_object" },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        let config = GatewayConfig {
            api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            timeout_secs: 2,
            ..real_mode("gsk_test")
        };
        let provider = LlmProvider::new(&config);
        let result = provider.chat(vec![ChatMessage::user("x".to_string())], 0.5).await;
        assert!(matches!(result, Err(LlmError::Network(_)) | Err(LlmError::Timeout)));
    }
}
