pub mod browser;
pub mod indexed_db;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::settings::SettingChange;
use crate::types::{Chat, ChatMessage, Prompt, SettingsRecord};

// --- IndexedDB Constants ---
pub const DB_NAME: &str = "parlor_db";
pub const DB_VERSION: u32 = 1;
pub const CHATS_STORE_NAME: &str = "chats";
pub const MESSAGES_STORE_NAME: &str = "messages";
pub const PROMPTS_STORE_NAME: &str = "prompts";
pub const SETTINGS_STORE_NAME: &str = "settings";
pub const ID_KEY_PATH: &str = "id";
pub const CHAT_ID_INDEX: &str = "chatId"; // Index on messages.chatId

/// The browser-local database: chats, messages, prompts and the settings singleton.
///
/// Operations spanning `chats` and `messages` are all-or-nothing.
#[async_trait(?Send)]
pub trait LocalStore: Send + Sync {
    async fn get_settings(&self) -> Result<Option<SettingsRecord>>;

    /// Applies `change` to the settings record in a single read-modify-write,
    /// creating the record first if it does not exist yet.
    async fn update_settings(&self, change: &SettingChange) -> Result<SettingsRecord>;

    async fn insert_prompt(&self, prompt: &Prompt) -> Result<()>;
    /// Newest first.
    async fn list_prompts(&self) -> Result<Vec<Prompt>>;
    async fn delete_prompt(&self, prompt_id: &str) -> Result<()>;

    async fn insert_chat(&self, chat: &Chat) -> Result<()>;
    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>>;
    /// Newest first.
    async fn list_chats(&self) -> Result<Vec<Chat>>;
    async fn insert_message(&self, message: &ChatMessage) -> Result<()>;
    /// Oldest first.
    async fn messages_for_chat(&self, chat_id: &str) -> Result<Vec<ChatMessage>>;

    /// Deletes the chat and every message whose `chatId` is `chat_id`.
    async fn delete_chat_cascade(&self, chat_id: &str) -> Result<()>;
    /// Empties `chats` and `messages`, leaving prompts and settings alone.
    async fn clear_chats(&self) -> Result<()>;
    /// Drops every collection. The store is usable again afterwards, empty.
    async fn destroy(&self) -> Result<()>;
}

/// Key-value cache living outside the database (browser local storage).
pub trait LocalCache: Send + Sync {
    fn clear(&self) -> Result<()>;
}
