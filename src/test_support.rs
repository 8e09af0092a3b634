use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::llm::{ApiKeyValidator, ValidationError};
use crate::persistence::{LocalCache, LocalStore};
use crate::settings::SettingChange;
use crate::types::{Chat, ChatMessage, Prompt, SettingsRecord};

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
}

pub fn chat(id: &str) -> Chat {
    Chat {
        id: id.to_string(),
        description: format!("chat {id}"),
        created_at: at(0),
    }
}

pub fn message(id: &str, chat_id: &str, seq: i64) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        chat_id: chat_id.to_string(),
        role: "user".to_string(),
        content: format!("message {id}"),
        created_at: at(seq),
    }
}

pub fn prompt(id: &str, title: &str, content: &str) -> Prompt {
    Prompt {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        created_at: at(0),
    }
}

/// Answers every key check with the same scripted result.
pub struct ScriptedValidator {
    outcome: Result<(), ValidationError>,
    checked: Mutex<Vec<String>>,
}

impl ScriptedValidator {
    pub fn accepting() -> Self {
        Self {
            outcome: Ok(()),
            checked: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: ValidationError) -> Self {
        Self {
            outcome: Err(err),
            checked: Mutex::new(Vec::new()),
        }
    }

    pub fn checked_keys(&self) -> Vec<String> {
        self.checked.lock().unwrap().clone()
    }
}

#[async_trait(?Send)]
impl ApiKeyValidator for ScriptedValidator {
    async fn verify_api_key(&self, api_key: &str) -> Result<(), ValidationError> {
        self.checked.lock().unwrap().push(api_key.to_string());
        self.outcome.clone()
    }
}

#[derive(Default)]
pub struct RecordingCache {
    clears: AtomicUsize,
    broken: bool,
}

impl RecordingCache {
    pub fn broken() -> Self {
        Self {
            clears: AtomicUsize::new(0),
            broken: true,
        }
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl LocalCache for RecordingCache {
    fn clear(&self) -> Result<()> {
        if self.broken {
            bail!("[Cache] localStorage is not available");
        }
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A store whose every operation fails, like IndexedDB refusing to open.
pub struct UnavailableStore;

fn unavailable<T>() -> Result<T> {
    bail!("[DB] DB open error: UnknownError")
}

#[async_trait(?Send)]
impl LocalStore for UnavailableStore {
    async fn get_settings(&self) -> Result<Option<SettingsRecord>> {
        unavailable()
    }
    async fn update_settings(&self, _change: &SettingChange) -> Result<SettingsRecord> {
        unavailable()
    }
    async fn insert_prompt(&self, _prompt: &Prompt) -> Result<()> {
        unavailable()
    }
    async fn list_prompts(&self) -> Result<Vec<Prompt>> {
        unavailable()
    }
    async fn delete_prompt(&self, _prompt_id: &str) -> Result<()> {
        unavailable()
    }
    async fn insert_chat(&self, _chat: &Chat) -> Result<()> {
        unavailable()
    }
    async fn get_chat(&self, _chat_id: &str) -> Result<Option<Chat>> {
        unavailable()
    }
    async fn list_chats(&self) -> Result<Vec<Chat>> {
        unavailable()
    }
    async fn insert_message(&self, _message: &ChatMessage) -> Result<()> {
        unavailable()
    }
    async fn messages_for_chat(&self, _chat_id: &str) -> Result<Vec<ChatMessage>> {
        unavailable()
    }
    async fn delete_chat_cascade(&self, _chat_id: &str) -> Result<()> {
        unavailable()
    }
    async fn clear_chats(&self) -> Result<()> {
        unavailable()
    }
    async fn destroy(&self) -> Result<()> {
        unavailable()
    }
}
