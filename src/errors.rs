use thiserror::Error;

use crate::llm::ValidationError;
use crate::notifications::Notice;

pub const OFFLINE_MESSAGE: &str = "No internet connection.";
pub const STORE_FAILURE_MESSAGE: &str =
    "Could not access local data. Please refresh the page and try again.";

/// Every way a dialog action can fail.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no internet connection")]
    Offline,

    /// The remote API answered with an error message.
    #[error("remote error: {0}")]
    Remote(String),

    #[error("local store failure: {0:#}")]
    Store(#[from] anyhow::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Offline => AppError::Offline,
            ValidationError::Rejected(message) => AppError::Remote(message),
            ValidationError::Unexpected(detail) => AppError::Unexpected(detail),
        }
    }
}

impl AppError {
    /// The single notification shown for this failure.
    pub fn notice(&self) -> Notice {
        match self {
            AppError::Offline => Notice::error(OFFLINE_MESSAGE),
            AppError::Remote(message) => Notice::error(message.clone()),
            AppError::Store(_) => Notice::error(STORE_FAILURE_MESSAGE),
            AppError::InvalidInput(message) => Notice::error(message.clone()),
            AppError::Unexpected(detail) => {
                Notice::error(format!("Something went wrong: {detail}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::Severity;
    use anyhow::anyhow;

    #[test]
    fn remote_messages_are_shown_verbatim() {
        let err = AppError::from(ValidationError::Rejected("invalid_api_key".to_string()));
        let notice = err.notice();
        assert_eq!(notice.message, "invalid_api_key");
        assert_eq!(notice.severity, Severity::Error);
    }

    #[test]
    fn connectivity_failures_get_their_own_message() {
        let notice = AppError::from(ValidationError::Offline).notice();
        assert_eq!(notice.message, OFFLINE_MESSAGE);
    }

    #[test]
    fn store_failures_hide_internal_detail() {
        let err = AppError::from(anyhow!("[DB] Delete: DB open error: blocked"));
        assert_eq!(err.notice().message, STORE_FAILURE_MESSAGE);
        assert!(err.to_string().contains("blocked"));
    }

    #[test]
    fn unclassified_failures_still_notify() {
        let notice = AppError::from(ValidationError::Unexpected("HTTP 502".to_string())).notice();
        assert_eq!(notice.severity, Severity::Error);
        assert!(notice.message.contains("HTTP 502"));
    }
}
