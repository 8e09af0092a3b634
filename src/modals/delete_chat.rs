use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

use super::{ConfirmForm, Modal};
use crate::actions;
use crate::notifications::Notice;
use crate::state::GlobalState;
use crate::types::Chat;
use crate::utils::Submitting;

#[component]
pub fn DeleteChatModal(chat: Chat) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState context not found");
    let navigate = StoredValue::new_local(use_navigate());
    let opened = RwSignal::new(false);
    let submitting = RwSignal::new(false);

    let on_confirm = move || {
        let Some(guard) = Submitting::begin(submitting) else {
            return;
        };
        let state = state.clone();
        let chat_id = chat.id.clone();
        spawn_local(async move {
            let _guard = guard;
            let active_chat_id = state.current_chat_id.get_untracked();
            match actions::delete_chat(state.store.as_ref(), &chat_id, active_chat_id.as_deref()).await {
                Ok(outcome) => {
                    if state.last_chat_id.get_untracked() == chat_id {
                        state.set_last_chat_id.set(String::new());
                    }
                    // Leave the chat view before it re-renders against deleted data.
                    if outcome.navigate_home {
                        log!("[DEBUG] [DeleteChat] Deleted the open chat, navigating to /");
                        state.current_chat_id.set(None);
                        navigate.with_value(|navigate| navigate("/", Default::default()));
                    }
                    opened.set(false);
                    state.notify(Notice::success("Deleted", "Chat deleted."));
                    state.data_changed();
                }
                Err(err) => state.report(&err),
            }
        });
    };

    view! {
        <button
            data-size="compact"
            data-role="destructive"
            title="Delete chat"
            on:click=move |_| opened.set(true)
        >
            "delete"
        </button>
        <Modal opened=opened title="Delete chat">
            <ConfirmForm
                question="Are you sure you want to delete this chat?"
                confirm_label="Delete"
                submitting=submitting
                on_confirm=on_confirm
            />
        </Modal>
    }
}
