use chrono::Utc;
use leptos::logging::log;
use uuid::Uuid;

use crate::errors::AppError;
use crate::persistence::{LocalCache, LocalStore};
use crate::types::{Chat, Prompt};

/// What the caller has to do after a chat was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteChatOutcome {
    /// The deleted chat was the one on screen.
    pub navigate_home: bool,
}

pub async fn create_prompt(
    store: &dyn LocalStore,
    title: String,
    content: String,
) -> Result<Prompt, AppError> {
    let prompt = Prompt {
        id: Uuid::new_v4().to_string(),
        title,
        content,
        created_at: Utc::now(),
    };
    store.insert_prompt(&prompt).await?;
    log!("[INFO] [Prompts] Created prompt {}", prompt.id);
    Ok(prompt)
}

pub async fn delete_prompt(store: &dyn LocalStore, prompt_id: &str) -> Result<(), AppError> {
    store.delete_prompt(prompt_id).await?;
    log!("[INFO] [Prompts] Deleted prompt {}", prompt_id);
    Ok(())
}

/// Creates an empty chat for the chat page to fill.
pub async fn create_chat(store: &dyn LocalStore) -> Result<Chat, AppError> {
    let chat = Chat {
        id: Uuid::new_v4().to_string(),
        description: "New chat".to_string(),
        created_at: Utc::now(),
    };
    store.insert_chat(&chat).await?;
    log!("[INFO] [Chats] Created chat {}", chat.id);
    Ok(chat)
}

/// Deletes a chat together with its messages.
pub async fn delete_chat(
    store: &dyn LocalStore,
    chat_id: &str,
    active_chat_id: Option<&str>,
) -> Result<DeleteChatOutcome, AppError> {
    store.delete_chat_cascade(chat_id).await?;
    log!("[INFO] [Chats] Deleted chat {}", chat_id);
    Ok(DeleteChatOutcome {
        navigate_home: active_chat_id == Some(chat_id),
    })
}

/// Deletes every chat and message, then the local cache. Prompts and settings survive.
pub async fn delete_all_chats(
    store: &dyn LocalStore,
    cache: &dyn LocalCache,
) -> Result<(), AppError> {
    store.clear_chats().await?;
    cache.clear()?;
    log!("[INFO] [Chats] Deleted all chats");
    Ok(())
}

/// Drops the whole database and the local cache. There is no way back.
pub async fn delete_all_data(
    store: &dyn LocalStore,
    cache: &dyn LocalCache,
) -> Result<(), AppError> {
    store.destroy().await?;
    cache.clear()?;
    log!("[INFO] [Data] Deleted all local data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::memory::MemoryStore;
    use crate::settings::SettingChange;
    use crate::test_support::{chat, message, prompt, RecordingCache, UnavailableStore};
    use futures::executor::block_on;

    async fn store_with_two_chats() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_chat(&chat("c1")).await.unwrap();
        store.insert_chat(&chat("c2")).await.unwrap();
        store.insert_message(&message("m1", "c1", 1)).await.unwrap();
        store.insert_message(&message("m2", "c1", 2)).await.unwrap();
        store.insert_message(&message("m3", "c2", 1)).await.unwrap();
        store
    }

    #[test]
    fn create_prompt_adds_one_fresh_record() {
        block_on(async {
            let store = MemoryStore::new();
            store.insert_prompt(&prompt("existing", "Old", "old")).await.unwrap();
            let before = Utc::now();

            let created = create_prompt(&store, "Resumen".to_string(), "Resume este texto".to_string())
                .await
                .unwrap();

            let prompts = store.list_prompts().await.unwrap();
            assert_eq!(prompts.len(), 2);
            assert_ne!(created.id, "existing");
            assert!(created.created_at >= before);
            let stored = prompts.iter().find(|p| p.id == created.id).unwrap();
            assert_eq!(stored.title, "Resumen");
            assert_eq!(stored.content, "Resume este texto");
        });
    }

    #[test]
    fn prompts_get_unique_ids() {
        block_on(async {
            let store = MemoryStore::new();
            let a = create_prompt(&store, String::new(), "same".to_string()).await.unwrap();
            let b = create_prompt(&store, String::new(), "same".to_string()).await.unwrap();
            assert_ne!(a.id, b.id);
        });
    }

    #[test]
    fn delete_prompt_removes_only_that_prompt() {
        block_on(async {
            let store = MemoryStore::new();
            store.insert_prompt(&prompt("p1", "a", "a")).await.unwrap();
            store.insert_prompt(&prompt("p2", "b", "b")).await.unwrap();

            delete_prompt(&store, "p1").await.unwrap();

            let ids: Vec<String> = store.list_prompts().await.unwrap().into_iter().map(|p| p.id).collect();
            assert_eq!(ids, ["p2"]);
        });
    }

    #[test]
    fn deleting_the_open_chat_removes_its_messages_and_goes_home() {
        block_on(async {
            let store = store_with_two_chats().await;

            let outcome = delete_chat(&store, "c1", Some("c1")).await.unwrap();

            assert!(outcome.navigate_home);
            assert!(store.get_chat("c1").await.unwrap().is_none());
            assert!(store.messages_for_chat("c1").await.unwrap().is_empty());
            assert!(store.get_chat("c2").await.unwrap().is_some());
            assert_eq!(store.messages_for_chat("c2").await.unwrap().len(), 1);
        });
    }

    #[test]
    fn deleting_another_chat_stays_put() {
        block_on(async {
            let store = store_with_two_chats().await;
            assert!(!delete_chat(&store, "c2", Some("c1")).await.unwrap().navigate_home);
            assert!(!delete_chat(&store, "c1", None).await.unwrap().navigate_home);
        });
    }

    #[test]
    fn failed_chat_delete_reports_store_failure() {
        block_on(async {
            let err = delete_chat(&UnavailableStore, "c1", Some("c1")).await.unwrap_err();
            assert!(matches!(err, AppError::Store(_)));
        });
    }

    #[test]
    fn delete_all_chats_keeps_prompts_and_settings() {
        block_on(async {
            let store = store_with_two_chats().await;
            store.insert_prompt(&prompt("p1", "keep", "me")).await.unwrap();
            store
                .update_settings(&SettingChange::ApiKey("sk-keep".to_string()))
                .await
                .unwrap();
            let cache = RecordingCache::default();

            delete_all_chats(&store, &cache).await.unwrap();

            assert!(store.list_chats().await.unwrap().is_empty());
            assert!(store.messages_for_chat("c1").await.unwrap().is_empty());
            assert!(store.messages_for_chat("c2").await.unwrap().is_empty());
            assert_eq!(store.list_prompts().await.unwrap().len(), 1);
            let settings = store.get_settings().await.unwrap().unwrap();
            assert_eq!(settings.open_ai_api_key.as_deref(), Some("sk-keep"));
            assert_eq!(cache.clear_count(), 1);
        });
    }

    #[test]
    fn delete_all_data_empties_everything() {
        block_on(async {
            let store = store_with_two_chats().await;
            store.insert_prompt(&prompt("p1", "t", "c")).await.unwrap();
            store
                .update_settings(&SettingChange::ApiVersion("v1".to_string()))
                .await
                .unwrap();
            let cache = RecordingCache::default();

            delete_all_data(&store, &cache).await.unwrap();

            assert!(store.list_chats().await.unwrap().is_empty());
            assert!(store.messages_for_chat("c1").await.unwrap().is_empty());
            assert!(store.list_prompts().await.unwrap().is_empty());
            assert!(store.get_settings().await.unwrap().is_none());
            assert_eq!(cache.clear_count(), 1);
        });
    }

    #[test]
    fn cache_is_kept_when_the_store_fails() {
        block_on(async {
            let cache = RecordingCache::default();
            assert!(delete_all_data(&UnavailableStore, &cache).await.is_err());
            assert!(delete_all_chats(&UnavailableStore, &cache).await.is_err());
            assert_eq!(cache.clear_count(), 0);
        });
    }

    #[test]
    fn cache_failure_is_reported() {
        block_on(async {
            let store = store_with_two_chats().await;
            let cache = RecordingCache::broken();
            let err = delete_all_chats(&store, &cache).await.unwrap_err();
            assert!(matches!(err, AppError::Store(_)));
        });
    }
}
