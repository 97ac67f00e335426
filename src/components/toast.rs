use chrono::{DateTime, Duration, Utc};
use dioxus::prelude::*;
use uuid::Uuid;

use crate::components::Icon;
use crate::utils::sleep_ms;

const TOAST_LIFETIME_MS: i64 = 3_000;
const SWEEP_INTERVAL_MS: u32 = 250;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Toast {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.raised_at >= Duration::milliseconds(TOAST_LIFETIME_MS)
    }
}

/// Drops expired toasts. Returns whether anything was removed.
pub fn sweep_expired(toasts: &mut Vec<Toast>, now: DateTime<Utc>) -> bool {
    let before = toasts.len();
    toasts.retain(|t| !t.is_expired(now));
    toasts.len() != before
}

/// Transient notifications shown in the corner of the shell. Expiry is
/// driven by [`ToastHost`], so a toast outlives the view that raised it.
#[derive(Clone, Copy, PartialEq)]
pub struct Toasts(pub Signal<Vec<Toast>>);

impl Toasts {
    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastKind::Error, message.into());
    }

    pub fn dismiss(&self, id: Uuid) {
        let mut list = self.0;
        list.write().retain(|t| t.id != id);
    }

    fn push(&self, kind: ToastKind, message: String) {
        let mut list = self.0;
        list.write().push(Toast {
            id: Uuid::new_v4(),
            kind,
            message,
            raised_at: Utc::now(),
        });
    }
}

#[component]
pub fn ToastHost() -> Element {
    let toasts = use_context::<Toasts>();

    use_hook(move || {
        let mut list = toasts.0;
        spawn(async move {
            loop {
                sleep_ms(SWEEP_INTERVAL_MS).await;
                let now = Utc::now();
                if list.peek().iter().any(|t| t.is_expired(now)) {
                    sweep_expired(&mut list.write(), now);
                }
            }
        });
    });

    let items = toasts.0();

    rsx! {
        div { class: "fixed bottom-4 right-4 z-50 flex flex-col gap-2 w-80 max-w-[90vw]",
            for toast in items {
                div {
                    key: "{toast.id}",
                    class: match toast.kind {
                        ToastKind::Success => "toast toast-success flex items-start gap-3 rounded-xl px-4 py-3 shadow-xl",
                        ToastKind::Error => "toast toast-error flex items-start gap-3 rounded-xl px-4 py-3 shadow-xl",
                    },
                    Icon {
                        name: match toast.kind {
                            ToastKind::Success => "check".to_string(),
                            ToastKind::Error => "alert".to_string(),
                        },
                        class: "w-5 h-5 shrink-0 mt-0.5".to_string(),
                    }
                    p { class: "flex-1 text-sm", "{toast.message}" }
                    button {
                        class: "text-white/60 hover:text-white",
                        aria_label: "Dismiss",
                        onclick: move |_| toasts.dismiss(toast.id),
                        Icon { name: "x".to_string(), class: "w-4 h-4".to_string() }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toast(message: &str, raised_at: DateTime<Utc>) -> Toast {
        Toast {
            id: Uuid::new_v4(),
            kind: ToastKind::Error,
            message: message.to_string(),
            raised_at,
        }
    }

    #[test]
    fn toast_expires_after_three_seconds() {
        let raised = Utc::now();
        let t = toast("Playlist not found", raised);
        assert!(!t.is_expired(raised + Duration::milliseconds(2_999)));
        assert!(t.is_expired(raised + Duration::seconds(3)));
    }

    #[test]
    fn sweep_keeps_fresh_toasts() {
        let now = Utc::now();
        let mut list = vec![
            toast("You left the playlist", now - Duration::seconds(4)),
            toast("Added song", now - Duration::seconds(1)),
        ];

        assert!(sweep_expired(&mut list, now));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].message, "Added song");
        assert!(!sweep_expired(&mut list, now));
    }
}
