use dioxus::prelude::*;
use tracing::{info, warn};

use crate::api::Backend;
use crate::components::{AppView, Icon, SessionSignal};
use crate::forms::validate_credentials;
use crate::sync::session::{create_account, sign_in};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    SignIn,
    SignUp,
}

#[component]
pub fn LoginView() -> Element {
    let backend = use_context::<Backend>();
    let session = use_context::<SessionSignal>();
    let navigator = use_navigator();
    let mut mode = use_signal(|| Mode::SignIn);
    let mut name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut submitting = use_signal(|| false);

    use_effect(move || {
        if session.user().is_some() {
            navigator.replace(AppView::HomeView {});
        }
    });

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if submitting() {
            return;
        }
        let signing_up = mode() == Mode::SignUp;
        let credentials = match validate_credentials(&name(), &email(), &password(), signing_up) {
            Ok(credentials) => credentials,
            Err(message) => {
                error.set(Some(message));
                return;
            }
        };

        error.set(None);
        submitting.set(true);
        let backend = backend.clone();
        spawn(async move {
            let result = if signing_up {
                create_account(backend.auth.as_ref(), backend.store.as_ref(), credentials).await
            } else {
                sign_in(backend.auth.as_ref(), credentials).await
            };
            submitting.set(false);
            match result {
                Ok(user) => {
                    info!(uid = %user.uid, "Signed in");
                    navigator.replace(AppView::HomeView {});
                }
                Err(err) => {
                    warn!(error = %err, "Authentication failed");
                    error.set(Some(err.to_string()));
                }
            }
        });
    };

    let signing_up = mode() == Mode::SignUp;
    let password_autocomplete = if signing_up { "new-password" } else { "current-password" };
    let input_class = "w-full rounded-lg bg-zinc-800 border border-zinc-700 px-3 py-2 text-white placeholder-zinc-500 focus:outline-none focus:border-emerald-500";

    rsx! {
        div { class: "flex items-center justify-center px-4 py-16",
            div { class: "w-full max-w-sm rounded-2xl bg-zinc-900 border border-zinc-800 p-8 shadow-2xl",
                div { class: "flex flex-col items-center mb-6",
                    Icon { name: "music".to_string(), class: "w-10 h-10 text-emerald-400 mb-3".to_string() }
                    h1 { class: "text-2xl font-bold text-white",
                        if signing_up { "Create an account" } else { "Welcome back" }
                    }
                    p { class: "text-sm text-zinc-400 mt-1", "Build playlists together" }
                }

                form { class: "space-y-3", onsubmit: on_submit,
                    if signing_up {
                        input {
                            class: input_class,
                            r#type: "text",
                            placeholder: "Name",
                            value: "{name}",
                            oninput: move |evt| name.set(evt.value()),
                        }
                    }
                    input {
                        class: input_class,
                        r#type: "email",
                        placeholder: "Email",
                        autocomplete: "email",
                        value: "{email}",
                        oninput: move |evt| email.set(evt.value()),
                    }
                    input {
                        class: input_class,
                        r#type: "password",
                        placeholder: "Password",
                        autocomplete: password_autocomplete,
                        value: "{password}",
                        oninput: move |evt| password.set(evt.value()),
                    }

                    if let Some(message) = error() {
                        p { class: "text-sm text-red-400", "{message}" }
                    }

                    button {
                        class: "w-full flex items-center justify-center gap-2 px-4 py-2 rounded-lg bg-emerald-500 hover:bg-emerald-400 text-white font-medium transition-colors disabled:opacity-50",
                        r#type: "submit",
                        disabled: submitting(),
                        if submitting() {
                            Icon { name: "loader".to_string(), class: "w-4 h-4".to_string() }
                        }
                        if signing_up { "Sign up" } else { "Log in" }
                    }
                }

                button {
                    class: "w-full mt-4 text-sm text-zinc-400 hover:text-white",
                    onclick: move |_| {
                        error.set(None);
                        mode.set(if signing_up { Mode::SignIn } else { Mode::SignUp });
                    },
                    if signing_up {
                        "Already have an account? Log in"
                    } else {
                        "New here? Create an account"
                    }
                }
            }
        }
    }
}
