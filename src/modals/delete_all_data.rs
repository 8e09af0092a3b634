use leptos::prelude::*;
use leptos::task::spawn_local;

use super::{ConfirmForm, Modal};
use crate::actions;
use crate::errors::AppError;
use crate::state::GlobalState;
use crate::utils::{reload_to_root, Submitting};

#[component]
pub fn DeleteAllDataModal() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState context not found");
    let opened = RwSignal::new(false);
    let submitting = RwSignal::new(false);

    let on_confirm = move || {
        let Some(guard) = Submitting::begin(submitting) else {
            return;
        };
        let state = state.clone();
        spawn_local(async move {
            let _guard = guard;
            let result = actions::delete_all_data(state.store.as_ref(), state.cache.as_ref())
                .await
                .and_then(|()| reload_to_root().map_err(|e| AppError::Unexpected(e.to_string())));
            if let Err(err) = result {
                state.report(&err);
            }
        });
    };

    view! {
        <button data-size="compact" data-role="destructive" on:click=move |_| opened.set(true)>
            "Delete All Data"
        </button>
        <Modal opened=opened title="Delete all data">
            <ConfirmForm
                question="Are you sure you want to delete all your data? This cannot be undone."
                confirm_label="Delete"
                submitting=submitting
                on_confirm=on_confirm
            />
        </Modal>
    }
}
