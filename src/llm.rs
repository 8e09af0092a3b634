use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("network unreachable")]
    Offline,

    #[error("API key rejected: {0}")]
    Rejected(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Checks that an API key is accepted by the model provider.
#[async_trait(?Send)]
pub trait ApiKeyValidator: Send + Sync {
    async fn verify_api_key(&self, api_key: &str) -> Result<(), ValidationError>;
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[allow(unused)]
struct ErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
}

/// Pulls the human readable message out of an OpenAI-style error body.
fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|response| response.error.message)
        .filter(|message| !message.is_empty())
}

/// Validates keys by listing the models visible to them.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    api_base_url: String,
}

impl OpenAiClient {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
        }
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.api_base_url.trim_end_matches('/'))
    }
}

#[async_trait(?Send)]
impl ApiKeyValidator for OpenAiClient {
    async fn verify_api_key(&self, api_key: &str) -> Result<(), ValidationError> {
        let client = Client::new();
        // No response at all means the request never reached the provider.
        let response = client
            .get(self.models_url())
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| {
                leptos::logging::log!("[WARN] [LLM] Key check request failed: {}", e);
                ValidationError::Offline
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        match parse_error_message(&body) {
            Some(message) => Err(ValidationError::Rejected(message)),
            None => Err(ValidationError::Unexpected(format!("HTTP {status}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_message_is_extracted() {
        let body = r#"{"error":{"message":"Incorrect API key provided: bad-key.","type":"invalid_request_error","param":null,"code":"invalid_api_key"}}"#;
        assert_eq!(
            parse_error_message(body).as_deref(),
            Some("Incorrect API key provided: bad-key.")
        );
    }

    #[test]
    fn non_json_bodies_have_no_message() {
        assert_eq!(parse_error_message("<html>Bad Gateway</html>"), None);
        assert_eq!(parse_error_message(r#"{"error":{"message":""}}"#), None);
    }

    #[test]
    fn models_url_ignores_trailing_slash() {
        assert_eq!(
            OpenAiClient::new("https://api.openai.com/v1/").models_url(),
            "https://api.openai.com/v1/models"
        );
    }
}
