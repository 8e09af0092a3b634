use crate::types::{ApiFlavor, AuthMode};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_DOWNLOAD_URL: &str = "https://gpt.ar";
pub const API_KEYS_URL: &str = "https://platform.openai.com/account/api-keys";

// --- Local Storage Keys ---
pub const LAST_CHAT_KEY: &str = "last_chat_id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOption {
    pub id: String,
    pub label: String,
}

impl ModelOption {
    fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

/// Static, read-only application configuration.
///
/// Compiled-in defaults can be overridden at build time through the
/// `PARLOR_*` environment variables (see [`AppConfig::from_build_env`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub default_model: String,
    pub default_flavor: ApiFlavor,
    pub default_auth: AuthMode,
    pub available_models: Vec<ModelOption>,
    pub api_base_url: String,
    pub allow_settings_modal: bool,
    pub show_download_link: bool,
    pub download_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            default_flavor: ApiFlavor::Standard,
            default_auth: AuthMode::NoAuth,
            available_models: vec![
                ModelOption::new("gpt-3.5-turbo", "GPT-3.5 Turbo"),
                ModelOption::new("gpt-3.5-turbo-16k", "GPT-3.5 Turbo 16k"),
                ModelOption::new("gpt-4", "GPT-4"),
                ModelOption::new("gpt-4-32k", "GPT-4 32k"),
            ],
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            allow_settings_modal: true,
            show_download_link: false,
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_build_env() -> Self {
        Self::with_overrides(
            option_env!("PARLOR_DEFAULT_MODEL"),
            option_env!("PARLOR_ALLOW_SETTINGS"),
            option_env!("PARLOR_SHOW_DOWNLOAD_LINK"),
            option_env!("PARLOR_DOWNLOAD_URL"),
            option_env!("PARLOR_API_BASE_URL"),
        )
    }

    fn with_overrides(
        default_model: Option<&str>,
        allow_settings: Option<&str>,
        show_download_link: Option<&str>,
        download_url: Option<&str>,
        api_base_url: Option<&str>,
    ) -> Self {
        let mut config = Self::default();

        if let Some(model) = default_model.map(str::trim).filter(|m| !m.is_empty()) {
            if !config.is_selectable_model(model) {
                config.available_models.insert(0, ModelOption::new(model, model));
            }
            config.default_model = model.to_string();
        }
        if let Some(flag) = allow_settings.and_then(parse_flag) {
            config.allow_settings_modal = flag;
        }
        if let Some(flag) = show_download_link.and_then(parse_flag) {
            config.show_download_link = flag;
        }
        if let Some(url) = download_url.filter(|u| !u.is_empty()) {
            config.download_url = url.to_string();
        }
        if let Some(url) = api_base_url.filter(|u| !u.is_empty()) {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        config
    }

    pub fn is_selectable_model(&self, id: &str) -> bool {
        self.available_models.iter().any(|m| m.id == id)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_selectable() {
        let config = AppConfig::default();
        assert!(config.is_selectable_model(&config.default_model));
        assert_eq!(config.default_flavor, ApiFlavor::Standard);
        assert_eq!(config.default_auth, AuthMode::NoAuth);
    }

    #[test]
    fn unknown_default_model_becomes_selectable() {
        let config = AppConfig::with_overrides(Some("gpt-4o"), None, None, None, None);
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.available_models[0].id, "gpt-4o");
    }

    #[test]
    fn flags_and_urls_are_overridable() {
        let config = AppConfig::with_overrides(
            None,
            Some("false"),
            Some("1"),
            Some("https://example.com/download"),
            Some("https://proxy.example.com/v1/"),
        );
        assert!(!config.allow_settings_modal);
        assert!(config.show_download_link);
        assert_eq!(config.download_url, "https://example.com/download");
        assert_eq!(config.api_base_url, "https://proxy.example.com/v1");
    }

    #[test]
    fn garbage_flags_keep_defaults() {
        let config = AppConfig::with_overrides(None, Some("maybe"), Some(""), None, None);
        assert!(config.allow_settings_modal);
        assert!(!config.show_download_link);
    }
}
