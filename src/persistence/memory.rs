use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use super::LocalStore;
use crate::settings::SettingChange;
use crate::types::{Chat, ChatMessage, Prompt, SettingsRecord};

#[derive(Debug, Default)]
struct Tables {
    settings: Option<SettingsRecord>,
    prompts: Vec<Prompt>,
    chats: Vec<Chat>,
    messages: Vec<ChatMessage>,
}

/// In-memory [`LocalStore`], used for tests and as a placeholder when the
/// browser offers no IndexedDB. Data lives as long as the page.
///
/// Each operation holds the lock for its whole duration, which makes every
/// multi-collection operation atomic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("[DB] Memory store lock poisoned"))
    }
}

#[async_trait(?Send)]
impl LocalStore for MemoryStore {
    async fn get_settings(&self) -> Result<Option<SettingsRecord>> {
        Ok(self.lock()?.settings.clone())
    }

    async fn update_settings(&self, change: &SettingChange) -> Result<SettingsRecord> {
        let mut tables = self.lock()?;
        let record = tables.settings.get_or_insert_with(SettingsRecord::default);
        change.apply_to(record);
        Ok(record.clone())
    }

    async fn insert_prompt(&self, prompt: &Prompt) -> Result<()> {
        let mut tables = self.lock()?;
        if tables.prompts.iter().any(|p| p.id == prompt.id) {
            bail!("[DB] InsertPrompt: Key already exists: {}", prompt.id);
        }
        tables.prompts.push(prompt.clone());
        Ok(())
    }

    async fn list_prompts(&self) -> Result<Vec<Prompt>> {
        let mut prompts = self.lock()?.prompts.clone();
        prompts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(prompts)
    }

    async fn delete_prompt(&self, prompt_id: &str) -> Result<()> {
        self.lock()?.prompts.retain(|p| p.id != prompt_id);
        Ok(())
    }

    async fn insert_chat(&self, chat: &Chat) -> Result<()> {
        let mut tables = self.lock()?;
        if tables.chats.iter().any(|c| c.id == chat.id) {
            bail!("[DB] InsertChat: Key already exists: {}", chat.id);
        }
        tables.chats.push(chat.clone());
        Ok(())
    }

    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>> {
        Ok(self.lock()?.chats.iter().find(|c| c.id == chat_id).cloned())
    }

    async fn list_chats(&self) -> Result<Vec<Chat>> {
        let mut chats = self.lock()?.chats.clone();
        chats.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(chats)
    }

    async fn insert_message(&self, message: &ChatMessage) -> Result<()> {
        let mut tables = self.lock()?;
        if tables.messages.iter().any(|m| m.id == message.id) {
            bail!("[DB] InsertMessage: Key already exists: {}", message.id);
        }
        tables.messages.push(message.clone());
        Ok(())
    }

    async fn messages_for_chat(&self, chat_id: &str) -> Result<Vec<ChatMessage>> {
        let mut messages: Vec<ChatMessage> = self
            .lock()?
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }

    async fn delete_chat_cascade(&self, chat_id: &str) -> Result<()> {
        let mut tables = self.lock()?;
        tables.messages.retain(|m| m.chat_id != chat_id);
        tables.chats.retain(|c| c.id != chat_id);
        Ok(())
    }

    async fn clear_chats(&self) -> Result<()> {
        let mut tables = self.lock()?;
        tables.messages.clear();
        tables.chats.clear();
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        *self.lock()? = Tables::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{chat, message, prompt};
    use futures::executor::block_on;

    #[test]
    fn update_settings_creates_the_singleton() {
        block_on(async {
            let store = MemoryStore::new();
            assert!(store.get_settings().await.unwrap().is_none());

            store
                .update_settings(&SettingChange::ApiVersion("2023-05-15".to_string()))
                .await
                .unwrap();
            store
                .update_settings(&SettingChange::ApiBase("https://example.com".to_string()))
                .await
                .unwrap();

            let record = store.get_settings().await.unwrap().unwrap();
            assert_eq!(record.id, "general");
            assert_eq!(record.open_ai_api_version.as_deref(), Some("2023-05-15"));
            assert_eq!(record.open_ai_api_base.as_deref(), Some("https://example.com"));
        });
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        block_on(async {
            let store = MemoryStore::new();
            let p = prompt("p1", "Title", "Body");
            store.insert_prompt(&p).await.unwrap();
            assert!(store.insert_prompt(&p).await.is_err());
            assert_eq!(store.list_prompts().await.unwrap().len(), 1);
        });
    }

    #[test]
    fn messages_come_back_in_order_for_their_chat_only() {
        block_on(async {
            let store = MemoryStore::new();
            store.insert_chat(&chat("c1")).await.unwrap();
            store.insert_message(&message("m2", "c1", 2)).await.unwrap();
            store.insert_message(&message("m1", "c1", 1)).await.unwrap();
            store.insert_message(&message("x1", "c2", 1)).await.unwrap();

            let ids: Vec<String> = store
                .messages_for_chat("c1")
                .await
                .unwrap()
                .into_iter()
                .map(|m| m.id)
                .collect();
            assert_eq!(ids, ["m1", "m2"]);
        });
    }

    #[test]
    fn destroy_leaves_the_store_empty_but_usable() {
        block_on(async {
            let store = MemoryStore::new();
            store.insert_chat(&chat("c1")).await.unwrap();
            store.insert_prompt(&prompt("p1", "", "x")).await.unwrap();
            store
                .update_settings(&SettingChange::ApiVersion("v".to_string()))
                .await
                .unwrap();

            store.destroy().await.unwrap();

            assert!(store.list_chats().await.unwrap().is_empty());
            assert!(store.list_prompts().await.unwrap().is_empty());
            assert!(store.get_settings().await.unwrap().is_none());
            store.insert_chat(&chat("c2")).await.unwrap();
        });
    }
}
