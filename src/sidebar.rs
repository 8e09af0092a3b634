use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;

use crate::errors::AppError;
use crate::modals::{CreatePromptModal, DeleteChatModal, DeletePromptModal};
use crate::state::GlobalState;
use crate::types::{Chat, Prompt};

pub fn chat_label(chat: &Chat) -> String {
    if chat.description.trim().is_empty() {
        "Untitled chat".to_string()
    } else {
        chat.description.clone()
    }
}

/// Chat list and prompt library, reloaded whenever stored data changes.
#[component]
pub fn Sidebar() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState context not found");
    let chats = RwSignal::new(Vec::<Chat>::new());
    let prompts = RwSignal::new(Vec::<Prompt>::new());

    Effect::new(move |_| {
        let version = state.data_version.get();
        let state = state.clone();
        spawn_local(async move {
            log!("[DEBUG] [Sidebar] Reloading lists (data version {})", version);
            match state.store.list_chats().await {
                Ok(list) => chats.set(list),
                Err(e) => state.report(&AppError::from(e)),
            }
            match state.store.list_prompts().await {
                Ok(list) => prompts.set(list),
                Err(e) => state.report(&AppError::from(e)),
            }
        });
    });

    view! {
        <aside>
            <section>
                <h3>"Chats"</h3>
                <Show when=move || chats.with(|c| c.is_empty())>
                    <p class="empty">"No chats yet."</p>
                </Show>
                <ul>
                    <For
                        each=move || chats.get()
                        key=|chat| chat.id.clone()
                        children=|chat| {
                            let href = format!("/chat/{}", chat.id);
                            let label = chat_label(&chat);
                            view! {
                                <li>
                                    <A href=href>{label}</A>
                                    <DeleteChatModal chat=chat />
                                </li>
                            }
                        }
                    />
                </ul>
            </section>
            <section>
                <h3>"Prompts"</h3>
                <CreatePromptModal />
                <ul>
                    <For
                        each=move || prompts.get()
                        key=|prompt| prompt.id.clone()
                        children=|prompt| {
                            let title = prompt.title.clone();
                            let content = prompt.content.clone();
                            view! {
                                <li title=content>
                                    <span>{title}</span>
                                    <DeletePromptModal prompt=prompt />
                                </li>
                            }
                        }
                    />
                </ul>
            </section>
        </aside>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::chat;

    #[test]
    fn blank_descriptions_get_a_placeholder_label() {
        let mut untitled = chat("c1");
        untitled.description = "   ".to_string();
        assert_eq!(chat_label(&untitled), "Untitled chat");

        let mut named = chat("c2");
        named.description = "Trip planning".to_string();
        assert_eq!(chat_label(&named), "Trip planning");
    }
}
