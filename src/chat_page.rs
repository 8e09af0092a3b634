use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params_map;

use crate::errors::AppError;
use crate::modals::{CreatePromptModal, DeleteChatModal};
use crate::sidebar::chat_label;
use crate::state::GlobalState;
use crate::types::{Chat, ChatMessage};

#[derive(Debug, Clone, PartialEq)]
enum ChatView {
    Loading,
    NotFound,
    Loaded(Chat, Vec<ChatMessage>),
}

#[component]
pub fn ChatPage() -> impl IntoView {
    let params = use_params_map();
    let state = use_context::<GlobalState>().expect("GlobalState context not found");
    let chat_view = RwSignal::new(ChatView::Loading);

    let chat_id = Memo::new(move |_| params.with(|p| p.get("id").unwrap_or_default()));

    // Remember the open chat so deleting it can leave this page.
    Effect::new({
        let state = state.clone();
        move |_| {
            let id = chat_id.get();
            log!("[DEBUG] [ChatPage] URL parameter 'id' changed to: '{}'.", &id);
            state.current_chat_id.set(Some(id.clone()));
            state.set_last_chat_id.set(id);
        }
    });

    Effect::new({
        let state = state.clone();
        move |_| {
            let id = chat_id.get();
            state.data_version.track();
            let state = state.clone();
            spawn_local(async move {
                let loaded = async {
                    let Some(chat) = state.store.get_chat(&id).await? else {
                        return Ok::<_, anyhow::Error>(None);
                    };
                    let messages = state.store.messages_for_chat(&id).await?;
                    Ok(Some((chat, messages)))
                }
                .await;
                match loaded {
                    Ok(Some((chat, messages))) => chat_view.set(ChatView::Loaded(chat, messages)),
                    Ok(None) => {
                        log!("[WARN] [ChatPage] Chat '{}' does not exist.", &id);
                        chat_view.set(ChatView::NotFound);
                    }
                    Err(e) => state.report(&AppError::from(e)),
                }
            });
        }
    });

    view! {
        <main class="chat-page">
            {move || match chat_view.get() {
                ChatView::Loading => ().into_any(),
                ChatView::NotFound => view! { <p>"This chat does not exist."</p> }.into_any(),
                ChatView::Loaded(chat, messages) => {
                    let title = chat_label(&chat);
                    view! {
                        <div class="chat-header">
                            <h2>{title}</h2>
                            <DeleteChatModal chat=chat />
                        </div>
                        <Show when={
                            let empty = messages.is_empty();
                            move || empty
                        }>
                            <p class="empty">"No messages yet."</p>
                        </Show>
                        {messages
                            .into_iter()
                            .map(|message| {
                                let content = message.content.clone();
                                let role = message.role.clone();
                                view! {
                                    <chat-message data-role=role>
                                        <div style="display: flex; gap: 4px">
                                            <div style:opacity="0.5">{message.role}</div>
                                            <CreatePromptModal content=content />
                                        </div>
                                        <div style:white-space="pre-wrap">{message.content}</div>
                                    </chat-message>
                                }
                            })
                            .collect_view()}
                    }
                        .into_any()
                }
            }}
        </main>
    }
}
