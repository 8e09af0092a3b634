use leptos::prelude::*;
use leptos::task::spawn_local;

use super::Modal;
use crate::actions;
use crate::notifications::Notice;
use crate::state::GlobalState;
use crate::utils::Submitting;

/// "New prompt" button, or a compact "save as prompt" action when `content`
/// is given, opening a dialog to store a prompt.
#[component]
pub fn CreatePromptModal(#[prop(optional)] content: Option<String>) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState context not found");
    let opened = RwSignal::new(false);
    let submitting = RwSignal::new(false);
    let title = RwSignal::new(String::new());
    let value = RwSignal::new(String::new());

    let prefill = StoredValue::new(content.clone().unwrap_or_default());
    let open = move |_| {
        title.set(String::new());
        value.set(prefill.get_value());
        opened.set(true);
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let Some(guard) = Submitting::begin(submitting) else {
            return;
        };
        let state = state.clone();
        let (title_value, content_value) = (title.get_untracked(), value.get_untracked());
        spawn_local(async move {
            let _guard = guard;
            match actions::create_prompt(state.store.as_ref(), title_value, content_value).await {
                Ok(_) => {
                    state.notify(Notice::success("Saved", "Prompt created."));
                    state.data_changed();
                    opened.set(false);
                }
                Err(err) => state.report(&err),
            }
        });
    };

    let trigger = if content.is_some() {
        view! {
            <button data-size="compact" title="Save as prompt" on:click=open>
                "save as prompt"
            </button>
        }
        .into_any()
    } else {
        view! {
            <button data-role="primary" style="width: 100%" on:click=open>
                "New Prompt"
            </button>
        }
        .into_any()
    };

    view! {
        {trigger}
        <Modal opened=opened title="Create prompt">
            <form on:submit=on_submit>
                <settings-section>
                    <settings-label>"Title"</settings-label>
                    <input
                        type="text"
                        prop:value=move || title.get()
                        on:input:target=move |ev| title.set(ev.target().value())
                        placeholder="Title"
                    />
                </settings-section>
                <settings-section>
                    <settings-label>"Content"</settings-label>
                    <textarea
                        rows="5"
                        prop:value=move || value.get()
                        on:input:target=move |ev| value.set(ev.target().value())
                        placeholder="Content"
                    />
                </settings-section>
                <button type="submit" data-role="primary" disabled=move || submitting.get()>
                    "Save"
                </button>
            </form>
        </Modal>
    }
}
