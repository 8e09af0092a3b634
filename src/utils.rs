use anyhow::anyhow;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(inline_js = r#"
export function is_desktop_shell() {
  // Desktop wrapper builds inject this global into the page
  return typeof window.todesktop !== 'undefined' && window.todesktop !== null;
}
"#)]
extern "C" {
    pub fn is_desktop_shell() -> bool;
}

/// Full page load of `/`, throwing away all in-memory application state.
pub fn reload_to_root() -> anyhow::Result<()> {
    window()
        .location()
        .assign("/")
        .map_err(|e| anyhow!("[Nav] Failed to reload to root: {:?}", e))
}

/// Resets a "submitting" flag when dropped, however the owning task ends.
pub struct Submitting(RwSignal<bool>);

impl Submitting {
    /// Raises `flag`, or returns `None` when a submit is already in flight.
    pub fn begin(flag: RwSignal<bool>) -> Option<Self> {
        if flag.try_get_untracked().unwrap_or(true) {
            return None;
        }
        flag.set(true);
        Some(Self(flag))
    }
}

impl Drop for Submitting {
    fn drop(&mut self) {
        // The dialog may already be gone.
        let _ = self.0.try_set(false);
    }
}
