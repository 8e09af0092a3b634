use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;

use crate::errors::AppError;
use crate::settings::modal::SettingsModal;
use crate::settings::EffectiveSettings;
use crate::state::GlobalState;
use crate::utils::is_desktop_shell;

const FEATURES: &[&str] = &[
    "Chats and prompts are stored locally in this browser.",
    "Save any message as a reusable prompt.",
    "Bring your own OpenAI key or a compatible endpoint.",
];

fn api_key_label(has_key: bool) -> &'static str {
    if has_key {
        "Change API key"
    } else {
        "Enter API key"
    }
}

#[component]
pub fn IndexPage() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState context not found");
    let has_key = RwSignal::new(false);

    state.current_chat_id.set(None);

    Effect::new({
        let state = state.clone();
        move |_| {
            state.data_version.track();
            let state = state.clone();
            spawn_local(async move {
                match state.store.get_settings().await {
                    Ok(record) => has_key.set(
                        EffectiveSettings::resolve(record.as_ref(), &state.config).has_api_key(),
                    ),
                    Err(e) => state.report(&AppError::from(e)),
                }
            });
        }
    });

    let settings_button = state.config.allow_settings_modal.then(|| {
        view! { <SettingsModal trigger_label=Signal::derive(move || api_key_label(has_key.get()).to_string()) /> }
    });

    let download_link = (state.config.show_download_link && !is_desktop_shell()).then(|| {
        let url = state.config.download_url.clone();
        view! {
            <a href=url target="_blank" rel="noopener">
                "Download the desktop app"
            </a>
        }
    });

    let last_chat_id = state.last_chat_id;

    view! {
        <main class="index-page">
            <h1>"Parlor"</h1>
            <ul class="features">
                {FEATURES.iter().map(|feature| view! { <li>{*feature}</li> }).collect_view()}
            </ul>
            <div style="display: flex; gap: 8px">
                {settings_button}
                <Show when=move || !last_chat_id.get().is_empty()>
                    <A href=move || format!("/chat/{}", last_chat_id.get())>"Resume last chat"</A>
                </Show>
                {download_link}
            </div>
        </main>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_label_reflects_whether_a_key_is_stored() {
        assert_eq!(api_key_label(false), "Enter API key");
        assert_eq!(api_key_label(true), "Change API key");
    }
}
