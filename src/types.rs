use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key of the one and only settings record.
pub const SETTINGS_ID: &str = "general";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ApiFlavor {
    #[default]
    #[serde(rename = "openai")]
    Standard,
    #[serde(rename = "custom")]
    Custom,
}

impl ApiFlavor {
    pub const ALL: [ApiFlavor; 2] = [ApiFlavor::Standard, ApiFlavor::Custom];

    pub fn as_str(self) -> &'static str {
        match self {
            ApiFlavor::Standard => "openai",
            ApiFlavor::Custom => "custom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ApiFlavor::Standard => "OpenAI",
            ApiFlavor::Custom => "Custom (e.g. Azure OpenAI)",
        }
    }

    /// Parses a select value. The empty string means "no selection".
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flavor| flavor.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    #[serde(rename = "none")]
    NoAuth,
    #[serde(rename = "bearer-token")]
    BearerToken,
    #[serde(rename = "api-key")]
    ApiKey,
}

impl AuthMode {
    pub const ALL: [AuthMode; 3] = [AuthMode::NoAuth, AuthMode::BearerToken, AuthMode::ApiKey];

    pub fn as_str(self) -> &'static str {
        match self {
            AuthMode::NoAuth => "none",
            AuthMode::BearerToken => "bearer-token",
            AuthMode::ApiKey => "api-key",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AuthMode::NoAuth => "None",
            AuthMode::BearerToken => "Bearer Token",
            AuthMode::ApiKey => "API Key",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == value)
    }
}

// Field names follow the records already stored by earlier releases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_ai_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_ai_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_ai_api_type: Option<ApiFlavor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_ai_api_auth: Option<AuthMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_ai_api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_ai_api_version: Option<String>,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            id: SETTINGS_ID.to_string(),
            open_ai_api_key: None,
            open_ai_model: None,
            open_ai_api_type: None,
            open_ai_api_auth: None,
            open_ai_api_base: None,
            open_ai_api_version: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub chat_id: String,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_record_uses_stored_field_names() {
        let record = SettingsRecord {
            open_ai_api_key: Some("sk-test".to_string()),
            open_ai_api_type: Some(ApiFlavor::Custom),
            open_ai_api_auth: Some(AuthMode::BearerToken),
            ..SettingsRecord::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "general");
        assert_eq!(json["openAiApiKey"], "sk-test");
        assert_eq!(json["openAiApiType"], "custom");
        assert_eq!(json["openAiApiAuth"], "bearer-token");
        assert!(json.get("openAiModel").is_none());
    }

    #[test]
    fn settings_record_tolerates_missing_fields() {
        let record: SettingsRecord = serde_json::from_str(r#"{"id":"general"}"#).unwrap();
        assert_eq!(record, SettingsRecord::default());
    }

    #[test]
    fn select_values_parse_back() {
        for flavor in ApiFlavor::ALL {
            assert_eq!(ApiFlavor::parse(flavor.as_str()), Some(flavor));
        }
        for mode in AuthMode::ALL {
            assert_eq!(AuthMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(ApiFlavor::parse(""), None);
        assert_eq!(AuthMode::parse("basic"), None);
    }

    #[test]
    fn messages_are_keyed_by_chat_id() {
        let json = serde_json::json!({
            "id": "m1",
            "chatId": "c1",
            "role": "user",
            "content": "hola",
            "createdAt": "2026-01-01T00:00:00Z",
        });
        let message: ChatMessage = serde_json::from_value(json).unwrap();
        assert_eq!(message.chat_id, "c1");
    }
}
