use std::sync::Arc;

use leptos::logging::log;
use leptos::prelude::*;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::llm::ApiKeyValidator;
use crate::notifications::{Notice, Notifications};
use crate::persistence::{LocalCache, LocalStore};

#[derive(Clone)]
pub struct GlobalState {
    // Collaborators
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn LocalStore>,
    pub validator: Arc<dyn ApiKeyValidator>,
    pub cache: Arc<dyn LocalCache>,
    pub notifications: Notifications,
    // App-wide state
    pub last_chat_id: Signal<String>,
    pub set_last_chat_id: WriteSignal<String>,
    /// Bumped after every write so lists reload.
    pub data_version: RwSignal<u64>,
    // Current session state
    pub current_chat_id: RwSignal<Option<String>>,
}

impl GlobalState {
    pub fn data_changed(&self) {
        self.data_version.update(|version| *version += 1);
    }

    pub fn notify(&self, notice: Notice) {
        self.notifications.show(notice);
    }

    /// Logs the failure and shows its notification.
    pub fn report(&self, err: &AppError) {
        log!("[ERROR] {}", err);
        self.notifications.show(err.notice());
    }
}
