use anyhow::{anyhow, Result};
use async_trait::async_trait;
use idb::{
    event::VersionChangeEvent, Database, DatabaseEvent, Error as IdbError, Factory,
    IndexParams, KeyPath, ObjectStoreParams, Query, Transaction, TransactionMode,
};
use leptos::logging::log;
use serde::{de::DeserializeOwned, Serialize};
use wasm_bindgen::JsValue;

use super::{
    LocalStore, CHATS_STORE_NAME, CHAT_ID_INDEX, DB_NAME, DB_VERSION, ID_KEY_PATH,
    MESSAGES_STORE_NAME, PROMPTS_STORE_NAME, SETTINGS_STORE_NAME,
};
use crate::settings::SettingChange;
use crate::types::{Chat, ChatMessage, Prompt, SettingsRecord, SETTINGS_ID};

const ALL_STORES: [&str; 4] = [
    CHATS_STORE_NAME,
    MESSAGES_STORE_NAME,
    PROMPTS_STORE_NAME,
    SETTINGS_STORE_NAME,
];

/// [`LocalStore`] backed by the browser's IndexedDB.
///
/// Every operation opens its own connection and closes it when done, so a
/// pending `destroy` is never blocked by a connection held elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdbStore;

impl IdbStore {
    /// False in contexts without IndexedDB (some private browsing modes).
    pub fn is_available() -> bool {
        Factory::new().is_ok()
    }
}

fn db_err(op: &'static str, step: &'static str) -> impl Fn(IdbError) -> anyhow::Error {
    move |e| anyhow!("[DB] {op}: {step}: {e}")
}

fn to_js<T: Serialize>(op: &'static str, value: &T) -> Result<JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| anyhow!("[DB] {op}: Failed to serialize: {e}"))
}

fn from_js<T: DeserializeOwned>(op: &'static str, value: JsValue) -> Result<T> {
    serde_wasm_bindgen::from_value(value).map_err(|e| anyhow!("[DB] {op}: Failed to deserialize: {e}"))
}

/// Opens the database, creating the object stores and the messages index on first use.
async fn get_db() -> Result<Database, IdbError> {
    let factory = Factory::new()?;
    let mut open_request = factory.open(DB_NAME, Some(DB_VERSION))?;

    open_request.on_upgrade_needed(|event: VersionChangeEvent| {
        let db = match event.database() {
            Ok(db) => db,
            Err(e) => {
                log!("[ERROR] [DB] Failed to get database in on_upgrade_needed: {:?}", e);
                return;
            }
        };
        let existing = db.store_names();

        for name in ALL_STORES {
            if existing.iter().any(|existing_name| existing_name == name) {
                continue;
            }
            log!("[INFO] [DB] Creating object store: {}", name);
            let mut store_params = ObjectStoreParams::new();
            store_params.key_path(Some(KeyPath::new_single(ID_KEY_PATH)));
            match db.create_object_store(name, store_params) {
                Ok(store) if name == MESSAGES_STORE_NAME => {
                    let mut index_params = IndexParams::new();
                    index_params.unique(false);
                    if let Err(e) = store.create_index(
                        CHAT_ID_INDEX,
                        KeyPath::new_single("chatId"),
                        Some(index_params),
                    ) {
                        log!("[ERROR] [DB] Failed to create index '{}' on store '{}': {:?}", CHAT_ID_INDEX, name, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log!("[ERROR] [DB] Failed to create object store '{}': {:?}", name, e);
                }
            }
        }
        // The upgrade transaction commits automatically when this handler returns.
    });

    open_request.await
}

/// Commits `tx` when `result` is `Ok`, aborts it otherwise.
///
/// IndexedDB auto-commits a transaction with no pending requests, so an early
/// return without an explicit abort would keep the writes made so far.
async fn finish<T>(op: &'static str, tx: Transaction, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            tx.commit()
                .map_err(db_err(op, "Failed to initiate commit (sync)"))?
                .await
                .map_err(db_err(op, "Transaction commit error"))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(abort_err) = tx.abort() {
                log!("[ERROR] [DB] {}: Failed to abort transaction: {:?}", op, abort_err);
            }
            Err(err)
        }
    }
}

/// An open database handle that must be closed explicitly.
trait Connection {
    fn close(&self);
}

impl Connection for Database {
    fn close(&self) {
        Database::close(self);
    }
}

/// Awaits `body` and then closes `conn`, on the error path too.
///
/// `Database` has no `Drop`, and a connection left open blocks `destroy`.
async fn close_after<C: Connection, T>(
    conn: &C,
    body: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    let result = body.await;
    conn.close();
    result
}

async fn read_all<T: DeserializeOwned>(op: &'static str, store_name: &str) -> Result<Vec<T>> {
    let db = get_db().await.map_err(db_err(op, "DB open error"))?;
    let values = close_after(&db, async {
        let tx = db
            .transaction(&[store_name], TransactionMode::ReadOnly)
            .map_err(db_err(op, "Failed to start transaction"))?;
        let values = tx
            .object_store(store_name)
            .map_err(db_err(op, "Failed to get object store"))?
            .get_all(None, None)
            .map_err(db_err(op, "Failed to initiate get_all (sync)"))?
            .await
            .map_err(db_err(op, "Failed to get values (async)"))?;
        tx.await.map_err(db_err(op, "Transaction completion error"))?;
        Ok::<_, anyhow::Error>(values)
    })
    .await?;

    values.into_iter().map(|value| from_js(op, value)).collect()
}

async fn read_one<T: DeserializeOwned>(op: &'static str, store_name: &str, key: &str) -> Result<Option<T>> {
    let db = get_db().await.map_err(db_err(op, "DB open error"))?;
    let value = close_after(&db, async {
        let tx = db
            .transaction(&[store_name], TransactionMode::ReadOnly)
            .map_err(db_err(op, "Failed to start transaction"))?;
        let value = tx
            .object_store(store_name)
            .map_err(db_err(op, "Failed to get object store"))?
            .get(Query::from(JsValue::from_str(key)))
            .map_err(db_err(op, "Failed to initiate get (sync)"))?
            .await
            .map_err(db_err(op, "Failed to get value (async)"))?;
        tx.await.map_err(db_err(op, "Transaction completion error"))?;
        Ok::<_, anyhow::Error>(value)
    })
    .await?;

    value.map(|value| from_js(op, value)).transpose()
}

async fn add_one<T: Serialize>(op: &'static str, store_name: &str, record: &T) -> Result<()> {
    let js_value = to_js(op, record)?;
    let db = get_db().await.map_err(db_err(op, "DB open error"))?;
    close_after(&db, async {
        let tx = db
            .transaction(&[store_name], TransactionMode::ReadWrite)
            .map_err(db_err(op, "Failed to start transaction"))?;
        let result = async {
            let store = tx
                .object_store(store_name)
                .map_err(db_err(op, "Failed to get object store"))?;
            // `add` refuses to overwrite an existing key.
            store
                .add(&js_value, None)
                .map_err(db_err(op, "Failed to add record (sync)"))?
                .await
                .map_err(db_err(op, "Failed to add record (async)"))?;
            Ok::<_, anyhow::Error>(())
        }
        .await;
        finish(op, tx, result).await
    })
    .await
}

#[async_trait(?Send)]
impl LocalStore for IdbStore {
    async fn get_settings(&self) -> Result<Option<SettingsRecord>> {
        read_one("GetSettings", SETTINGS_STORE_NAME, SETTINGS_ID).await
    }

    async fn update_settings(&self, change: &SettingChange) -> Result<SettingsRecord> {
        const OP: &str = "UpdateSettings";
        let db = get_db().await.map_err(db_err(OP, "DB open error"))?;
        let record = close_after(&db, async {
            let tx = db
                .transaction(&[SETTINGS_STORE_NAME], TransactionMode::ReadWrite)
                .map_err(db_err(OP, "Failed to start transaction"))?;
            let result = async {
                let store = tx
                    .object_store(SETTINGS_STORE_NAME)
                    .map_err(db_err(OP, "Failed to get object store"))?;
                let current = store
                    .get(Query::from(JsValue::from_str(SETTINGS_ID)))
                    .map_err(db_err(OP, "Failed to initiate get (sync)"))?
                    .await
                    .map_err(db_err(OP, "Failed to get settings (async)"))?;

                let mut record: SettingsRecord = match current {
                    Some(value) => from_js(OP, value)?,
                    None => {
                        log!("[INFO] [DB] No settings record yet, creating '{}'", SETTINGS_ID);
                        SettingsRecord::default()
                    }
                };
                change.apply_to(&mut record);

                store
                    .put(&to_js(OP, &record)?, None)
                    .map_err(db_err(OP, "Failed to put settings (sync)"))?
                    .await
                    .map_err(db_err(OP, "Failed to put settings (async)"))?;
                Ok::<_, anyhow::Error>(record)
            }
            .await;
            finish(OP, tx, result).await
        })
        .await?;

        log!("[DEBUG] [DB] Settings field '{}' updated", change.field().name());
        Ok(record)
    }

    async fn insert_prompt(&self, prompt: &Prompt) -> Result<()> {
        add_one("InsertPrompt", PROMPTS_STORE_NAME, prompt).await?;
        log!("[DEBUG] [DB] Prompt saved: {}", prompt.id);
        Ok(())
    }

    async fn list_prompts(&self) -> Result<Vec<Prompt>> {
        let mut prompts: Vec<Prompt> = read_all("ListPrompts", PROMPTS_STORE_NAME).await?;
        prompts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(prompts)
    }

    async fn delete_prompt(&self, prompt_id: &str) -> Result<()> {
        const OP: &str = "DeletePrompt";
        let db = get_db().await.map_err(db_err(OP, "DB open error"))?;
        close_after(&db, async {
            let tx = db
                .transaction(&[PROMPTS_STORE_NAME], TransactionMode::ReadWrite)
                .map_err(db_err(OP, "Failed to start transaction"))?;
            let result = async {
                tx.object_store(PROMPTS_STORE_NAME)
                    .map_err(db_err(OP, "Failed to get object store"))?
                    .delete(Query::from(JsValue::from_str(prompt_id)))
                    .map_err(db_err(OP, "Failed to initiate delete (sync)"))?
                    .await
                    .map_err(db_err(OP, "Failed to complete delete (async)"))?;
                Ok::<_, anyhow::Error>(())
            }
            .await;
            finish(OP, tx, result).await
        })
        .await?;

        log!("[DEBUG] [DB] Prompt deleted: {}", prompt_id);
        Ok(())
    }

    async fn insert_chat(&self, chat: &Chat) -> Result<()> {
        add_one("InsertChat", CHATS_STORE_NAME, chat).await
    }

    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>> {
        read_one("GetChat", CHATS_STORE_NAME, chat_id).await
    }

    async fn list_chats(&self) -> Result<Vec<Chat>> {
        let mut chats: Vec<Chat> = read_all("ListChats", CHATS_STORE_NAME).await?;
        chats.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(chats)
    }

    async fn insert_message(&self, message: &ChatMessage) -> Result<()> {
        add_one("InsertMessage", MESSAGES_STORE_NAME, message).await
    }

    async fn messages_for_chat(&self, chat_id: &str) -> Result<Vec<ChatMessage>> {
        const OP: &str = "MessagesForChat";
        let db = get_db().await.map_err(db_err(OP, "DB open error"))?;
        let values = close_after(&db, async {
            let tx = db
                .transaction(&[MESSAGES_STORE_NAME], TransactionMode::ReadOnly)
                .map_err(db_err(OP, "Failed to start transaction"))?;
            let values = tx
                .object_store(MESSAGES_STORE_NAME)
                .map_err(db_err(OP, "Failed to get object store"))?
                .index(CHAT_ID_INDEX)
                .map_err(db_err(OP, "Failed to get index"))?
                .get_all(Some(Query::from(JsValue::from_str(chat_id))), None)
                .map_err(db_err(OP, "Failed to initiate get_all (sync)"))?
                .await
                .map_err(db_err(OP, "Failed to get messages (async)"))?;
            tx.await.map_err(db_err(OP, "Transaction completion error"))?;
            Ok::<_, anyhow::Error>(values)
        })
        .await?;

        let mut messages = values
            .into_iter()
            .map(|value| from_js(OP, value))
            .collect::<Result<Vec<ChatMessage>>>()?;
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }

    async fn delete_chat_cascade(&self, chat_id: &str) -> Result<()> {
        const OP: &str = "DeleteChat";
        let db = get_db().await.map_err(db_err(OP, "DB open error"))?;
        let message_count = close_after(&db, async {
            let tx = db
                .transaction(&[CHATS_STORE_NAME, MESSAGES_STORE_NAME], TransactionMode::ReadWrite)
                .map_err(db_err(OP, "Failed to start transaction"))?;
            let result = async {
                // Messages first: an interrupted run may leave orphan messages, never a chat without its messages.
                let messages = tx
                    .object_store(MESSAGES_STORE_NAME)
                    .map_err(db_err(OP, "Failed to get messages store"))?;
                let keys = messages
                    .index(CHAT_ID_INDEX)
                    .map_err(db_err(OP, "Failed to get index"))?
                    .get_all_keys(Some(Query::from(JsValue::from_str(chat_id))), None)
                    .map_err(db_err(OP, "Failed to initiate key lookup (sync)"))?
                    .await
                    .map_err(db_err(OP, "Failed to look up message keys (async)"))?;
                let message_count = keys.len();
                for key in keys {
                    messages
                        .delete(Query::from(key))
                        .map_err(db_err(OP, "Failed to initiate message delete (sync)"))?
                        .await
                        .map_err(db_err(OP, "Failed to delete message (async)"))?;
                }

                tx.object_store(CHATS_STORE_NAME)
                    .map_err(db_err(OP, "Failed to get chats store"))?
                    .delete(Query::from(JsValue::from_str(chat_id)))
                    .map_err(db_err(OP, "Failed to initiate chat delete (sync)"))?
                    .await
                    .map_err(db_err(OP, "Failed to delete chat (async)"))?;
                Ok::<_, anyhow::Error>(message_count)
            }
            .await;
            finish(OP, tx, result).await
        })
        .await?;

        log!("[DEBUG] [DB] Chat {} deleted with {} messages", chat_id, message_count);
        Ok(())
    }

    async fn clear_chats(&self) -> Result<()> {
        const OP: &str = "ClearChats";
        let db = get_db().await.map_err(db_err(OP, "DB open error"))?;
        close_after(&db, async {
            let tx = db
                .transaction(&[CHATS_STORE_NAME, MESSAGES_STORE_NAME], TransactionMode::ReadWrite)
                .map_err(db_err(OP, "Failed to start transaction"))?;
            let result = async {
                for name in [MESSAGES_STORE_NAME, CHATS_STORE_NAME] {
                    tx.object_store(name)
                        .map_err(db_err(OP, "Failed to get object store"))?
                        .clear()
                        .map_err(db_err(OP, "Failed to initiate clear (sync)"))?
                        .await
                        .map_err(db_err(OP, "Failed to clear store (async)"))?;
                }
                Ok::<_, anyhow::Error>(())
            }
            .await;
            finish(OP, tx, result).await
        })
        .await?;

        log!("[INFO] [DB] All chats and messages cleared");
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        const OP: &str = "Destroy";
        let factory = Factory::new().map_err(db_err(OP, "IndexedDB unavailable"))?;
        factory
            .delete(DB_NAME)
            .map_err(db_err(OP, "Failed to initiate database delete (sync)"))?
            .await
            .map_err(db_err(OP, "Failed to delete database (async)"))?;
        log!("[INFO] [DB] Database '{}' deleted", DB_NAME);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingConnection {
        closes: Cell<usize>,
    }

    impl Connection for CountingConnection {
        fn close(&self) {
            self.closes.set(self.closes.get() + 1);
        }
    }

    #[test]
    fn connection_is_closed_when_the_body_fails() {
        let conn = CountingConnection::default();
        let result = block_on(close_after(&conn, async {
            Err::<(), _>(anyhow!("[DB] GetChat: Failed to start transaction: NotFoundError"))
        }));
        assert!(result.is_err());
        assert_eq!(conn.closes.get(), 1);
    }

    #[test]
    fn connection_is_closed_once_on_success() {
        let conn = CountingConnection::default();
        let value = block_on(close_after(&conn, async { Ok::<_, anyhow::Error>(7) })).unwrap();
        assert_eq!(value, 7);
        assert_eq!(conn.closes.get(), 1);
    }
}
