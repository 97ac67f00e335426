//! Dialogs used by the home and playlist views. Each one validates its own
//! fields and only hands cleaned values to `on_submit`.

use dioxus::prelude::*;

use crate::api::SongDraft;
use crate::components::Icon;
use crate::forms::{validate_email, validate_playlist_name, validate_song};

#[component]
fn ModalFrame(title: String, on_close: EventHandler<()>, children: Element) -> Element {
    rsx! {
        div {
            class: "fixed inset-0 z-40 flex items-center justify-center bg-black/60 backdrop-blur-sm p-4",
            onclick: move |_| on_close.call(()),
            div {
                class: "modal-panel w-full max-w-md rounded-2xl bg-zinc-900 border border-zinc-800 p-6 shadow-2xl",
                onclick: move |evt: MouseEvent| evt.stop_propagation(),
                div { class: "flex items-center justify-between mb-4",
                    h2 { class: "text-lg font-semibold text-white", "{title}" }
                    button {
                        class: "p-1 rounded-lg text-zinc-400 hover:text-white",
                        aria_label: "Close",
                        onclick: move |_| on_close.call(()),
                        Icon { name: "x".to_string(), class: "w-5 h-5".to_string() }
                    }
                }
                {children}
            }
        }
    }
}

#[component]
fn FieldError(message: Option<String>) -> Element {
    match message {
        Some(message) => rsx! {
            p { class: "text-sm text-red-400 mt-2", "{message}" }
        },
        None => rsx! {},
    }
}

const INPUT_CLASS: &str = "w-full rounded-lg bg-zinc-800 border border-zinc-700 px-3 py-2 text-white placeholder-zinc-500 focus:outline-none focus:border-emerald-500";
const PRIMARY_BUTTON: &str = "px-4 py-2 rounded-lg bg-emerald-500 hover:bg-emerald-400 text-white font-medium transition-colors disabled:opacity-50";
const SECONDARY_BUTTON: &str = "px-4 py-2 rounded-lg text-zinc-300 hover:text-white hover:bg-zinc-800 transition-colors";

#[component]
pub fn CreatePlaylistModal(on_submit: EventHandler<String>, on_close: EventHandler<()>) -> Element {
    let mut name = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        match validate_playlist_name(&name()) {
            Ok(clean) => {
                error.set(None);
                on_submit.call(clean);
            }
            Err(message) => error.set(Some(message)),
        }
    };

    rsx! {
        ModalFrame { title: "New playlist".to_string(), on_close,
            form { class: "space-y-4", onsubmit: submit,
                input {
                    class: INPUT_CLASS,
                    r#type: "text",
                    placeholder: "Playlist name",
                    autofocus: true,
                    value: "{name}",
                    oninput: move |evt| name.set(evt.value()),
                }
                FieldError { message: error() }
                div { class: "flex justify-end gap-2",
                    button { class: SECONDARY_BUTTON, r#type: "button", onclick: move |_| on_close.call(()), "Cancel" }
                    button { class: PRIMARY_BUTTON, r#type: "submit", "Create" }
                }
            }
        }
    }
}

#[component]
pub fn AddSongModal(on_submit: EventHandler<SongDraft>, on_close: EventHandler<()>) -> Element {
    let mut title = use_signal(String::new);
    let mut artist = use_signal(String::new);
    let mut url = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        let draft = SongDraft::new(title(), artist(), url());
        match validate_song(&draft) {
            Ok(clean) => {
                error.set(None);
                on_submit.call(clean);
            }
            Err(message) => error.set(Some(message)),
        }
    };

    rsx! {
        ModalFrame { title: "Add song".to_string(), on_close,
            form { class: "space-y-3", onsubmit: submit,
                input {
                    class: INPUT_CLASS,
                    r#type: "text",
                    placeholder: "Title",
                    autofocus: true,
                    value: "{title}",
                    oninput: move |evt| title.set(evt.value()),
                }
                input {
                    class: INPUT_CLASS,
                    r#type: "text",
                    placeholder: "Artist",
                    value: "{artist}",
                    oninput: move |evt| artist.set(evt.value()),
                }
                input {
                    class: INPUT_CLASS,
                    r#type: "url",
                    placeholder: "Audio URL",
                    value: "{url}",
                    oninput: move |evt| url.set(evt.value()),
                }
                FieldError { message: error() }
                div { class: "flex justify-end gap-2 pt-1",
                    button { class: SECONDARY_BUTTON, r#type: "button", onclick: move |_| on_close.call(()), "Cancel" }
                    button { class: PRIMARY_BUTTON, r#type: "submit", "Add song" }
                }
            }
        }
    }
}

#[component]
pub fn AddContributorModal(on_submit: EventHandler<String>, on_close: EventHandler<()>) -> Element {
    let mut email = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        match validate_email(&email()) {
            Ok(clean) => {
                error.set(None);
                on_submit.call(clean);
            }
            Err(message) => error.set(Some(message)),
        }
    };

    rsx! {
        ModalFrame { title: "Add contributor".to_string(), on_close,
            form { class: "space-y-4", onsubmit: submit,
                p { class: "text-sm text-zinc-400",
                    "Contributors can add and remove songs. They need an account first."
                }
                input {
                    class: INPUT_CLASS,
                    r#type: "email",
                    placeholder: "friend@example.com",
                    autofocus: true,
                    value: "{email}",
                    oninput: move |evt| email.set(evt.value()),
                }
                FieldError { message: error() }
                div { class: "flex justify-end gap-2",
                    button { class: SECONDARY_BUTTON, r#type: "button", onclick: move |_| on_close.call(()), "Cancel" }
                    button { class: PRIMARY_BUTTON, r#type: "submit", "Add" }
                }
            }
        }
    }
}

#[component]
pub fn ConfirmDialog(
    title: String,
    message: String,
    confirm_label: String,
    on_confirm: EventHandler<()>,
    on_close: EventHandler<()>,
) -> Element {
    rsx! {
        ModalFrame { title, on_close,
            p { class: "text-sm text-zinc-300 mb-6", "{message}" }
            div { class: "flex justify-end gap-2",
                button { class: SECONDARY_BUTTON, onclick: move |_| on_close.call(()), "Cancel" }
                button {
                    class: "px-4 py-2 rounded-lg bg-red-500 hover:bg-red-400 text-white font-medium transition-colors",
                    onclick: move |_| on_confirm.call(()),
                    "{confirm_label}"
                }
            }
        }
    }
}
