use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

use crate::actions;
use crate::modals::{DeleteAllDataModal, DeleteChatsModal};
use crate::settings::modal::SettingsModal;
use crate::state::GlobalState;
use crate::utils::Submitting;

#[component]
pub fn Header() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState context not found");
    let creating = RwSignal::new(false);

    let on_new_chat = {
        let state = state.clone();
        let navigate = use_navigate();
        move |_| {
            let Some(guard) = Submitting::begin(creating) else {
                return;
            };
            let state = state.clone();
            let navigate = navigate.clone();
            spawn_local(async move {
                let _guard = guard;
                match actions::create_chat(state.store.as_ref()).await {
                    Ok(chat) => {
                        log!("[INFO] [Header] Created chat {}", chat.id);
                        state.data_changed();
                        navigate(&format!("/chat/{}", chat.id), Default::default());
                    }
                    Err(err) => state.report(&err),
                }
            });
        }
    };

    let allow_settings = state.config.allow_settings_modal;

    view! {
        <header>
            <button data-role="primary" data-size="compact" on:click=on_new_chat disabled=move || creating.get()>
                "New Chat"
            </button>
            <div style="margin-left: auto; display: flex; gap: 4px">
                {allow_settings.then(|| view! { <SettingsModal trigger_label="Settings".to_string() /> })}
                <DeleteChatsModal />
                <DeleteAllDataModal />
            </div>
        </header>
    }
}
