use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::{commit_setting, EffectiveSettings, SettingChange, SettingField};
use crate::config::{AppConfig, API_KEYS_URL};
use crate::errors::AppError;
use crate::modals::Modal;
use crate::state::GlobalState;
use crate::types::{ApiFlavor, AuthMode, SettingsRecord};
use crate::utils::Submitting;

/// Local copy of the six fields the dialog edits.
#[derive(Clone, Copy)]
struct SettingsDraft {
    api_key: RwSignal<String>,
    model: RwSignal<String>,
    flavor: RwSignal<ApiFlavor>,
    auth: RwSignal<AuthMode>,
    api_base: RwSignal<String>,
    api_version: RwSignal<String>,
}

impl SettingsDraft {
    fn new(initial: &EffectiveSettings) -> Self {
        Self {
            api_key: RwSignal::new(initial.api_key.clone()),
            model: RwSignal::new(String::new()),
            flavor: RwSignal::new(initial.flavor),
            auth: RwSignal::new(initial.auth),
            api_base: RwSignal::new(initial.api_base.clone()),
            api_version: RwSignal::new(initial.api_version.clone()),
        }
    }

    fn load(&self, record: Option<&SettingsRecord>, config: &AppConfig) {
        for field in [
            SettingField::ApiKey,
            SettingField::ApiFlavor,
            SettingField::Model,
            SettingField::AuthMode,
            SettingField::ApiBase,
            SettingField::ApiVersion,
        ] {
            self.sync(field, record, config);
        }
    }

    /// Overwrites one field only, keeping unsaved edits in the others.
    fn sync(&self, field: SettingField, record: Option<&SettingsRecord>, config: &AppConfig) {
        let settings = EffectiveSettings::resolve(record, config);
        match field {
            SettingField::ApiKey => self.api_key.set(settings.api_key.clone()),
            SettingField::ApiFlavor => self.flavor.set(settings.flavor),
            SettingField::Model => self.model.set(selected_model(record)),
            SettingField::AuthMode => self.auth.set(settings.auth),
            SettingField::ApiBase => self.api_base.set(settings.api_base.clone()),
            SettingField::ApiVersion => self.api_version.set(settings.api_version.clone()),
        }
    }
}

/// Value of the model select. Empty selects the "Default" option.
fn selected_model(record: Option<&SettingsRecord>) -> String {
    record
        .and_then(|record| record.open_ai_model.clone())
        .unwrap_or_default()
}

/// One "submitting" flag per independently saved field.
#[derive(Clone, Copy)]
struct BusyFlags {
    api_key: RwSignal<bool>,
    flavor: RwSignal<bool>,
    model: RwSignal<bool>,
    auth: RwSignal<bool>,
    api_base: RwSignal<bool>,
    api_version: RwSignal<bool>,
}

impl BusyFlags {
    fn new() -> Self {
        Self {
            api_key: RwSignal::new(false),
            flavor: RwSignal::new(false),
            model: RwSignal::new(false),
            auth: RwSignal::new(false),
            api_base: RwSignal::new(false),
            api_version: RwSignal::new(false),
        }
    }

    fn flag(&self, field: SettingField) -> RwSignal<bool> {
        match field {
            SettingField::ApiKey => self.api_key,
            SettingField::ApiFlavor => self.flavor,
            SettingField::Model => self.model,
            SettingField::AuthMode => self.auth,
            SettingField::ApiBase => self.api_base,
            SettingField::ApiVersion => self.api_version,
        }
    }
}

fn is_selection(field: SettingField) -> bool {
    matches!(
        field,
        SettingField::ApiFlavor | SettingField::Model | SettingField::AuthMode
    )
}

fn commit(state: GlobalState, draft: SettingsDraft, busy: BusyFlags, change: SettingChange) {
    let field = change.field();
    let Some(guard) = Submitting::begin(busy.flag(field)) else {
        log!("[DEBUG] [Settings] '{}' is still saving, ignoring submit", field.name());
        return;
    };

    spawn_local(async move {
        let _guard = guard;
        let result = commit_setting(
            state.store.as_ref(),
            state.validator.as_ref(),
            &state.config,
            &change,
        )
        .await;

        match result {
            Ok(record) => {
                draft.sync(field, Some(&record), &state.config);
                state.notify(change.success_notice());
                state.data_changed();
            }
            Err(err) => {
                state.report(&err);
                // A select already shows the rejected value; put the stored one back.
                if is_selection(field) {
                    match state.store.get_settings().await {
                        Ok(record) => draft.sync(field, record.as_ref(), &state.config),
                        Err(e) => log!("[ERROR] [Settings] Failed to reload settings: {:?}", e),
                    }
                }
            }
        }
    });
}

#[component]
pub fn SettingsModal(#[prop(into)] trigger_label: Signal<String>) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState context not found");
    let opened = RwSignal::new(false);
    let draft = SettingsDraft::new(&EffectiveSettings::resolve(None, &state.config));
    let busy = BusyFlags::new();

    // Re-read the stored record every time the dialog opens.
    Effect::new({
        let state = state.clone();
        move |_| {
            if !opened.get() {
                return;
            }
            let state = state.clone();
            spawn_local(async move {
                match state.store.get_settings().await {
                    Ok(record) => draft.load(record.as_ref(), &state.config),
                    Err(e) => state.report(&AppError::from(e)),
                }
            });
        }
    });

    let on_key_submit = {
        let state = state.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            commit(state.clone(), draft, busy, SettingChange::ApiKey(draft.api_key.get_untracked()));
        }
    };
    let on_base_submit = {
        let state = state.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            commit(state.clone(), draft, busy, SettingChange::ApiBase(draft.api_base.get_untracked()));
        }
    };
    let on_version_submit = {
        let state = state.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            commit(state.clone(), draft, busy, SettingChange::ApiVersion(draft.api_version.get_untracked()));
        }
    };
    let on_flavor_change = {
        let state = state.clone();
        move |value: String| {
            let flavor = ApiFlavor::parse(&value);
            draft.flavor.set(flavor.unwrap_or_default());
            commit(state.clone(), draft, busy, SettingChange::ApiFlavor(flavor));
        }
    };
    let on_model_change = {
        let state = state.clone();
        move |value: String| {
            draft.model.set(value.clone());
            let model = Some(value).filter(|v| !v.is_empty());
            commit(state.clone(), draft, busy, SettingChange::Model(model));
        }
    };
    let on_auth_change = {
        let state = state.clone();
        move |value: String| {
            let mode = AuthMode::parse(&value);
            draft.auth.set(mode.unwrap_or_default());
            commit(state.clone(), draft, busy, SettingChange::AuthMode(mode));
        }
    };

    let models = state.config.available_models.clone();

    view! {
        <button data-size="compact" on:click=move |_| opened.set(true)>
            {move || trigger_label.get()}
        </button>
        <Modal opened=opened title="Settings">
            <form on:submit=on_key_submit>
                <settings-section>
                    <settings-label>"OpenAI API Key"</settings-label>
                    <div style="display: flex; gap: 4px">
                        <input
                            type="password"
                            placeholder="sk-xxxxxxxxxxxxxxxxxxxxxxxxxxxxxx"
                            prop:value=move || draft.api_key.get()
                            on:input:target=move |ev| draft.api_key.set(ev.target().value())
                        />
                        <button type="submit" data-role="primary" disabled=move || busy.api_key.get()>
                            "Save"
                        </button>
                    </div>
                    <ul>
                        <li>
                            <a href=API_KEYS_URL target="_blank">"Get your API key"</a>
                        </li>
                        <li>"Your API key is stored in this browser and never sent anywhere else."</li>
                    </ul>
                </settings-section>
            </form>
            <settings-section>
                <settings-label>"OpenAI Type"</settings-label>
                <select
                    on:change:target=move |ev| on_flavor_change(ev.target().value())
                    disabled=move || busy.flavor.get()
                >
                    {ApiFlavor::ALL
                        .into_iter()
                        .map(|flavor| {
                            view! {
                                <option value=flavor.as_str() selected=move || draft.flavor.get() == flavor>
                                    {flavor.label()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            </settings-section>
            <settings-section>
                <settings-label>"OpenAI Model (OpenAI only)"</settings-label>
                <select
                    on:change:target=move |ev| on_model_change(ev.target().value())
                    disabled=move || busy.model.get()
                >
                    <option value="" selected=move || draft.model.get().is_empty()>
                        "Default"
                    </option>
                    {models
                        .into_iter()
                        .map(|model| {
                            let id = model.id.clone();
                            view! {
                                <option value=model.id selected=move || draft.model.get() == id>
                                    {model.label}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            </settings-section>
            <settings-section>
                <settings-label>"OpenAI Auth (Custom only)"</settings-label>
                <select
                    on:change:target=move |ev| on_auth_change(ev.target().value())
                    disabled=move || busy.auth.get()
                >
                    {AuthMode::ALL
                        .into_iter()
                        .map(|mode| {
                            view! {
                                <option value=mode.as_str() selected=move || draft.auth.get() == mode>
                                    {mode.label()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            </settings-section>
            <form on:submit=on_base_submit>
                <settings-section>
                    <settings-label>"OpenAI API Base (Custom only)"</settings-label>
                    <div style="display: flex; gap: 4px">
                        <input
                            type="text"
                            placeholder="https://<resource-name>.openai.azure.com/openai/deployments/<deployment>"
                            prop:value=move || draft.api_base.get()
                            on:input:target=move |ev| draft.api_base.set(ev.target().value())
                        />
                        <button type="submit" data-role="primary" disabled=move || busy.api_base.get()>
                            "Save"
                        </button>
                    </div>
                </settings-section>
            </form>
            <form on:submit=on_version_submit>
                <settings-section>
                    <settings-label>"OpenAI API Version (Custom only)"</settings-label>
                    <div style="display: flex; gap: 4px">
                        <input
                            type="text"
                            placeholder="2023-03-15-preview"
                            prop:value=move || draft.api_version.get()
                            on:input:target=move |ev| draft.api_version.set(ev.target().value())
                        />
                        <button type="submit" data-role="primary" disabled=move || busy.api_version.get()>
                            "Save"
                        </button>
                    </div>
                </settings-section>
            </form>
        </Modal>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_model_selects_the_default_option() {
        assert_eq!(selected_model(None), "");

        let mut record = SettingsRecord::default();
        assert_eq!(selected_model(Some(&record)), "");

        record.open_ai_model = Some("gpt-4".to_string());
        assert_eq!(selected_model(Some(&record)), "gpt-4");
    }
}
