pub mod create_prompt;
pub mod delete_all_data;
pub mod delete_chat;
pub mod delete_chats;
pub mod delete_prompt;

pub use create_prompt::CreatePromptModal;
pub use delete_all_data::DeleteAllDataModal;
pub use delete_chat::DeleteChatModal;
pub use delete_chats::DeleteChatsModal;
pub use delete_prompt::DeletePromptModal;

use leptos::prelude::*;

/// Dialog shell. The content stays mounted while closed so that draft state
/// and in-flight submits survive closing and reopening.
#[component]
pub fn Modal(
    opened: RwSignal<bool>,
    #[prop(into)] title: String,
    children: Children,
) -> impl IntoView {
    view! {
        <div class="modal-backdrop" hidden=move || !opened.get() on:click=move |_| opened.set(false)></div>
        <modal-dialog role="dialog" hidden=move || !opened.get()>
            <modal-header>
                <span class="modal-title">{title}</span>
                <button data-size="compact" on:click=move |_| opened.set(false)>
                    "close"
                </button>
            </modal-header>
            {children()}
        </modal-dialog>
    }
}

/// Question plus a destructive confirm button.
#[component]
pub fn ConfirmForm(
    #[prop(into)] question: String,
    #[prop(into)] confirm_label: String,
    #[prop(into)] submitting: Signal<bool>,
    on_confirm: impl Fn() + 'static,
) -> impl IntoView {
    view! {
        <form on:submit=move |ev| {
            ev.prevent_default();
            on_confirm();
        }>
            <p>{question}</p>
            <button type="submit" data-role="destructive" disabled=move || submitting.get()>
                {move || if submitting.get() { view! { <span class="spinner"></span> }.into_any() } else { ().into_any() }}
                {confirm_label}
            </button>
        </form>
    }
}
