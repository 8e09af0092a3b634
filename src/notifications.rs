use leptos::prelude::*;
use leptos_use::use_timeout_fn;

pub const TOAST_DURATION_MS: u32 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

impl Severity {
    fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

/// A user-facing message: title, body and severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Toast {
    id: u64,
    notice: Notice,
}

/// Fire-and-forget toast queue, provided as context by `App`.
#[derive(Clone, Copy, Default)]
pub struct Notifications {
    toasts: RwSignal<Vec<Toast>>,
    next_id: RwSignal<u64>,
}

impl Notifications {
    pub fn show(&self, notice: Notice) {
        let id = self.next_id.get_untracked();
        self.next_id.set(id + 1);
        leptos::logging::log!("[DEBUG] [Toast] {}: {}", notice.title, notice.message);
        self.toasts.update(|toasts| toasts.push(Toast { id, notice }));
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|toasts| toasts.retain(|t| t.id != id));
    }
}

#[component]
pub fn ToastHost() -> impl IntoView {
    let notifications = use_context::<Notifications>().expect("Notifications context not found");

    view! {
        <toast-stack>
            <For
                each=move || notifications.toasts.get()
                key=|toast| toast.id
                children=move |toast| view! { <ToastItem id=toast.id notice=toast.notice /> }
            />
        </toast-stack>
    }
}

#[component]
fn ToastItem(id: u64, notice: Notice) -> impl IntoView {
    let notifications = use_context::<Notifications>().expect("Notifications context not found");

    let timeout_controls = use_timeout_fn(
        move |_| notifications.dismiss(id),
        TOAST_DURATION_MS as f64,
    );
    (timeout_controls.start)(());

    view! {
        <toast-item data-severity=notice.severity.as_str()>
            <div style="font-weight: bold">{notice.title}</div>
            <div>{notice.message}</div>
            <button data-size="compact" on:click=move |_| notifications.dismiss(id)>
                "dismiss"
            </button>
        </toast-item>
    }
}
