mod actions;
mod chat_page;
mod config;
mod errors;
mod header;
mod index_page;
mod llm;
mod modals;
mod notifications;
mod persistence;
mod settings;
mod sidebar;
mod state;
#[cfg(test)]
mod test_support;
mod types;
mod utils;

use std::sync::Arc;

use codee::string::FromToStringCodec;
use leptos::logging::log;
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;
use leptos_use::storage::use_local_storage;

use chat_page::ChatPage;
use config::{AppConfig, LAST_CHAT_KEY};
use header::Header;
use index_page::IndexPage;
use llm::{ApiKeyValidator, OpenAiClient};
use notifications::{Notifications, ToastHost};
use persistence::browser::BrowserLocalStorage;
use persistence::indexed_db::IdbStore;
use persistence::memory::MemoryStore;
use persistence::{LocalCache, LocalStore};
use sidebar::Sidebar;
use state::GlobalState;

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}

fn open_store() -> Arc<dyn LocalStore> {
    if IdbStore::is_available() {
        Arc::new(IdbStore)
    } else {
        log!("[WARN] [Persistence] IndexedDB is unavailable, data will not survive a reload.");
        Arc::new(MemoryStore::new())
    }
}

#[component]
fn App() -> impl IntoView {
    let config = Arc::new(AppConfig::from_build_env());
    log!(
        "[INFO] [App] Starting with model '{}' against {}",
        config.default_model,
        config.api_base_url
    );

    let (last_chat_id, set_last_chat_id, _) =
        use_local_storage::<String, FromToStringCodec>(LAST_CHAT_KEY);

    let validator: Arc<dyn ApiKeyValidator> =
        Arc::new(OpenAiClient::new(config.api_base_url.clone()));
    let cache: Arc<dyn LocalCache> = Arc::new(BrowserLocalStorage);
    let notifications = Notifications::default();

    let state = GlobalState {
        config,
        store: open_store(),
        validator,
        cache,
        notifications,
        last_chat_id,
        set_last_chat_id,
        data_version: RwSignal::new(0),
        current_chat_id: RwSignal::new(None),
    };

    provide_context(notifications);
    provide_context(state);

    view! {
        <Router>
            <Header />
            <div class="layout">
                <Sidebar />
                <Routes fallback=|| view! { <p>"Page not found."</p> }>
                    <Route path=path!("/") view=IndexPage />
                    <Route path=path!("/chat/:id") view=ChatPage />
                </Routes>
            </div>
            <ToastHost />
        </Router>
    }
}
