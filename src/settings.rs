pub mod modal;

use leptos::logging::log;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::llm::ApiKeyValidator;
use crate::notifications::Notice;
use crate::persistence::LocalStore;
use crate::types::{ApiFlavor, AuthMode, SettingsRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    ApiKey,
    ApiFlavor,
    Model,
    AuthMode,
    ApiBase,
    ApiVersion,
}

impl SettingField {
    pub fn name(self) -> &'static str {
        match self {
            SettingField::ApiKey => "api_key",
            SettingField::ApiFlavor => "api_flavor",
            SettingField::Model => "model",
            SettingField::AuthMode => "auth_mode",
            SettingField::ApiBase => "api_base",
            SettingField::ApiVersion => "api_version",
        }
    }
}

/// One independently submittable edit of the settings record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingChange {
    ApiKey(String),
    /// `None` falls back to [`ApiFlavor::Standard`].
    ApiFlavor(Option<ApiFlavor>),
    /// `None` clears the stored model.
    Model(Option<String>),
    /// `None` falls back to [`AuthMode::NoAuth`].
    AuthMode(Option<AuthMode>),
    ApiBase(String),
    ApiVersion(String),
}

impl SettingChange {
    pub fn field(&self) -> SettingField {
        match self {
            SettingChange::ApiKey(_) => SettingField::ApiKey,
            SettingChange::ApiFlavor(_) => SettingField::ApiFlavor,
            SettingChange::Model(_) => SettingField::Model,
            SettingChange::AuthMode(_) => SettingField::AuthMode,
            SettingChange::ApiBase(_) => SettingField::ApiBase,
            SettingChange::ApiVersion(_) => SettingField::ApiVersion,
        }
    }

    /// Writes the change into `record`. Text values are stored as given, empty strings included.
    pub fn apply_to(&self, record: &mut SettingsRecord) {
        match self {
            SettingChange::ApiKey(key) => record.open_ai_api_key = Some(key.clone()),
            SettingChange::ApiFlavor(flavor) => {
                record.open_ai_api_type = Some(flavor.unwrap_or(ApiFlavor::Standard))
            }
            SettingChange::Model(model) => record.open_ai_model = model.clone(),
            SettingChange::AuthMode(mode) => {
                record.open_ai_api_auth = Some(mode.unwrap_or(AuthMode::NoAuth))
            }
            SettingChange::ApiBase(base) => record.open_ai_api_base = Some(base.clone()),
            SettingChange::ApiVersion(version) => {
                record.open_ai_api_version = Some(version.clone())
            }
        }
    }

    pub fn success_notice(&self) -> Notice {
        let message = match self.field() {
            SettingField::ApiKey => "Your API key has been saved.",
            SettingField::ApiFlavor => "Your API type has been saved.",
            SettingField::Model => "Your model has been saved.",
            SettingField::AuthMode => "Your auth mode has been saved.",
            SettingField::ApiBase => "Your API base URL has been saved.",
            SettingField::ApiVersion => "Your API version has been saved.",
        };
        Notice::success("Saved", message)
    }
}

/// Settings as the UI sees them: stored values, or configured defaults where absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub api_key: String,
    pub model: String,
    pub flavor: ApiFlavor,
    pub auth: AuthMode,
    pub api_base: String,
    pub api_version: String,
}

impl EffectiveSettings {
    pub fn resolve(record: Option<&SettingsRecord>, config: &AppConfig) -> Self {
        let record = record.cloned().unwrap_or_default();
        Self {
            api_key: record.open_ai_api_key.unwrap_or_default(),
            model: record
                .open_ai_model
                .unwrap_or_else(|| config.default_model.clone()),
            flavor: record.open_ai_api_type.unwrap_or(config.default_flavor),
            auth: record.open_ai_api_auth.unwrap_or(config.default_auth),
            api_base: record.open_ai_api_base.unwrap_or_default(),
            api_version: record.open_ai_api_version.unwrap_or_default(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Validates and persists one settings change, returning the stored record.
///
/// Nothing is written unless every check passed.
pub async fn commit_setting(
    store: &dyn LocalStore,
    validator: &dyn ApiKeyValidator,
    config: &AppConfig,
    change: &SettingChange,
) -> Result<SettingsRecord, AppError> {
    match change {
        SettingChange::ApiKey(key) => {
            if key.trim().is_empty() {
                return Err(AppError::InvalidInput(
                    "Please enter an API key.".to_string(),
                ));
            }
            validator.verify_api_key(key).await?;
        }
        SettingChange::Model(Some(model)) if !config.is_selectable_model(model) => {
            return Err(AppError::InvalidInput(format!(
                "Unknown model: {model}"
            )));
        }
        _ => {}
    }

    let record = store.update_settings(change).await?;
    log!("[INFO] [Settings] Committed field '{}'", change.field().name());
    Ok(record)
}
