use leptos::prelude::*;
use leptos::task::spawn_local;

use super::{ConfirmForm, Modal};
use crate::actions;
use crate::notifications::Notice;
use crate::state::GlobalState;
use crate::types::Prompt;
use crate::utils::Submitting;

#[component]
pub fn DeletePromptModal(prompt: Prompt) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState context not found");
    let opened = RwSignal::new(false);
    let submitting = RwSignal::new(false);

    let on_confirm = move || {
        let Some(guard) = Submitting::begin(submitting) else {
            return;
        };
        let state = state.clone();
        let prompt_id = prompt.id.clone();
        spawn_local(async move {
            let _guard = guard;
            match actions::delete_prompt(state.store.as_ref(), &prompt_id).await {
                Ok(()) => {
                    opened.set(false);
                    state.notify(Notice::success("Deleted", "Prompt deleted."));
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
            title="Delete prompt"
            on:click=move |_| opened.set(true)
        >
            "delete"
        </button>
        <Modal opened=opened title="Delete prompt">
            <ConfirmForm
                question="Are you sure you want to delete this prompt?"
                confirm_label="Delete"
                submitting=submitting
                on_confirm=on_confirm
            />
        </Modal>
    }
}
