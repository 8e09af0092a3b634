use anyhow::{anyhow, Result};
use leptos::logging::log;
use leptos::prelude::window;

use super::LocalCache;

/// The page's `localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserLocalStorage;

impl LocalCache for BrowserLocalStorage {
    fn clear(&self) -> Result<()> {
        let storage = window()
            .local_storage()
            .map_err(|e| anyhow!("[Cache] Failed to access localStorage: {:?}", e))?
            .ok_or_else(|| anyhow!("[Cache] localStorage is not available"))?;
        storage
            .clear()
            .map_err(|e| anyhow!("[Cache] Failed to clear localStorage: {:?}", e))?;
        log!("[INFO] [Cache] localStorage cleared");
        Ok(())
    }
}
