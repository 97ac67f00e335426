use dioxus::prelude::*;
use tracing::warn;

use crate::api::Backend;
use crate::components::{AppView, Icon, SessionSignal, Toasts};

#[component]
pub fn Header() -> Element {
    let backend = use_context::<Backend>();
    let session = use_context::<SessionSignal>();
    let toasts = use_context::<Toasts>();
    let navigator = use_navigator();
    let state = session.state();

    let on_sign_out = move |_: MouseEvent| {
        let auth = backend.auth.clone();
        spawn(async move {
            match auth.sign_out().await {
                Ok(()) => {
                    navigator.push(AppView::LoginView {});
                }
                Err(err) => {
                    warn!(error = %err, "Sign out failed");
                    toasts.error(err.to_string());
                }
            }
        });
    };

    rsx! {
        header { class: "mobile-safe-top border-b border-zinc-800/60 bg-zinc-950/80 backdrop-blur-xl",
            div { class: "flex items-center justify-between px-4 py-3 max-w-6xl mx-auto",
                Link {
                    to: AppView::HomeView {},
                    class: "flex items-center gap-2 text-lg font-bold text-white",
                    Icon { name: "music".to_string(), class: "w-6 h-6 text-emerald-400".to_string() }
                    "Music Collaborator"
                }
                {match (state.loading, state.user) {
                    (true, _) => rsx! {
                        Icon { name: "loader".to_string(), class: "w-5 h-5 text-zinc-500".to_string() }
                    },
                    (false, Some(user)) => rsx! {
                        div { class: "flex items-center gap-3",
                            span { class: "hidden sm:inline text-sm text-zinc-400", "Welcome, {user.email}" }
                            button {
                                class: "flex items-center gap-2 px-3 py-2 rounded-lg text-sm text-zinc-300 hover:text-white hover:bg-zinc-800/60 transition-colors",
                                onclick: on_sign_out,
                                Icon { name: "logout".to_string(), class: "w-4 h-4".to_string() }
                                "Sign out"
                            }
                        }
                    },
                    (false, None) => rsx! {
                        Link {
                            to: AppView::LoginView {},
                            class: "px-3 py-2 rounded-lg text-sm font-medium bg-emerald-500 hover:bg-emerald-400 text-white transition-colors",
                            "Log in"
                        }
                    },
                }}
            }
        }
    }
}
