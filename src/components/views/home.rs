use dioxus::prelude::*;
use tracing::warn;

use crate::api::{Backend, Playlist};
use crate::components::{AppView, ConfirmDialog, CreatePlaylistModal, Icon, SessionSignal, Toasts};
use crate::sync::collection::{create_playlist, delete_playlist};
use crate::sync::{PlaylistCollection, SessionUser};

#[component]
pub fn HomeView() -> Element {
    let session = use_context::<SessionSignal>();
    let navigator = use_navigator();

    use_effect(move || {
        let state = session.state();
        if !state.loading && state.user.is_none() {
            navigator.replace(AppView::LoginView {});
        }
    });

    let state = session.state();
    match state.user {
        Some(user) => rsx! {
            PlaylistBoard { key: "{user.uid}", user }
        },
        None => rsx! {
            div { class: "flex items-center justify-center py-20",
                Icon { name: "loader".to_string(), class: "w-8 h-8 text-zinc-500".to_string() }
            }
        },
    }
}

#[component]
fn PlaylistBoard(user: SessionUser) -> Element {
    let backend = use_context::<Backend>();
    let toasts = use_context::<Toasts>();
    let navigator = use_navigator();
    let mut collection = use_signal(PlaylistCollection::default);
    let mut loading = use_signal(|| true);
    let mut show_create = use_signal(|| false);
    let mut pending_delete = use_signal(|| None::<Playlist>);

    use_hook({
        let backend = backend.clone();
        let email = user.email.clone();
        move || {
            spawn(async move {
                match PlaylistCollection::load(backend.store.as_ref(), &email).await {
                    Ok(loaded) => collection.set(loaded),
                    Err(err) => {
                        warn!(error = %err, "Failed to load playlists");
                        toasts.error(format!("Could not load playlists: {err}"));
                    }
                }
                loading.set(false);
            });
        }
    });

    // Never hold the signal borrowed across the fetch.
    let reload = {
        let backend = backend.clone();
        let email = user.email.clone();
        move || {
            let backend = backend.clone();
            let email = email.clone();
            spawn(async move {
                let mut next = collection.peek().clone();
                match next.refresh(backend.store.as_ref(), &email).await {
                    Ok(()) => collection.set(next),
                    Err(err) => {
                        warn!(error = %err, "Failed to refresh playlists");
                        toasts.error(format!("Could not load playlists: {err}"));
                    }
                }
            });
        }
    };

    let on_create = {
        let backend = backend.clone();
        let user = user.clone();
        let reload = reload.clone();
        move |name: String| {
            let backend = backend.clone();
            let user = user.clone();
            let reload = reload.clone();
            spawn(async move {
                match create_playlist(backend.store.as_ref(), &user, &name).await {
                    Ok(id) => {
                        show_create.set(false);
                        toasts.success(format!("Created \"{name}\""));
                        reload();
                        navigator.push(AppView::PlaylistDetailView { id });
                    }
                    Err(err) => toasts.error(err.to_string()),
                }
            });
        }
    };

    let on_confirm_delete = {
        let backend = backend.clone();
        let reload = reload.clone();
        move |_: ()| {
            let Some(playlist) = pending_delete() else {
                return;
            };
            pending_delete.set(None);
            let backend = backend.clone();
            let reload = reload.clone();
            spawn(async move {
                match delete_playlist(backend.store.as_ref(), &playlist.id).await {
                    Ok(()) => toasts.success(format!("Deleted \"{}\"", playlist.name)),
                    Err(err) => toasts.error(err.to_string()),
                }
                reload();
            });
        }
    };

    let view = collection.read();
    let visible = view.playlists().to_vec();
    let recent = view.recently_played();
    let has_any = !view.is_empty();
    let term = view.search_term().to_string();
    drop(view);

    rsx! {
        div { class: "space-y-8 max-w-6xl mx-auto px-4 py-6",
            header { class: "flex flex-col sm:flex-row sm:items-end justify-between gap-4",
                div {
                    h1 { class: "text-3xl font-bold text-white mb-2", "Your playlists" }
                    p { class: "text-zinc-400", "Playlists you created or were invited to" }
                }
                button {
                    class: "flex items-center gap-2 px-4 py-2 rounded-lg bg-emerald-500 hover:bg-emerald-400 text-white font-medium transition-colors",
                    onclick: move |_| show_create.set(true),
                    Icon { name: "plus".to_string(), class: "w-4 h-4".to_string() }
                    "New playlist"
                }
            }

            div { class: "relative",
                Icon {
                    name: "search".to_string(),
                    class: "w-4 h-4 text-zinc-500 absolute left-3 top-1/2 -translate-y-1/2".to_string(),
                }
                input {
                    class: "w-full rounded-xl bg-zinc-900 border border-zinc-800 pl-9 pr-3 py-2 text-white placeholder-zinc-500 focus:outline-none focus:border-emerald-500",
                    r#type: "search",
                    placeholder: "Search playlists",
                    value: "{term}",
                    oninput: move |evt| collection.write().search(&evt.value()),
                }
            }

            if !recent.is_empty() && term.is_empty() {
                section {
                    h2 { class: "text-sm uppercase tracking-widest text-zinc-500 mb-3", "Recently played" }
                    div { class: "flex gap-3 overflow-x-auto pb-2",
                        for playlist in recent {
                            Link {
                                key: "recent-{playlist.id}",
                                to: AppView::PlaylistDetailView { id: playlist.id.clone() },
                                class: "shrink-0 flex items-center gap-2 rounded-full bg-zinc-900 border border-zinc-800 px-4 py-2 text-sm text-zinc-200 hover:border-emerald-500",
                                Icon { name: "clock".to_string(), class: "w-4 h-4 text-zinc-500".to_string() }
                                span { "{playlist.name}" }
                                if let Some(played) = playlist.last_played_label() {
                                    span { class: "text-xs text-zinc-500", "Last played: {played}" }
                                }
                            }
                        }
                    }
                }
            }

            {if loading() {
                rsx! {
                    div { class: "flex items-center justify-center py-20",
                        Icon { name: "loader".to_string(), class: "w-8 h-8 text-zinc-500".to_string() }
                    }
                }
            } else if visible.is_empty() {
                rsx! {
                    div { class: "flex flex-col items-center justify-center py-20",
                        Icon { name: "playlist".to_string(), class: "w-16 h-16 text-zinc-600 mb-4".to_string() }
                        if has_any {
                            h2 { class: "text-xl font-semibold text-white mb-2", "No matches" }
                            p { class: "text-zinc-400", "No playlist name contains \"{term}\"" }
                        } else {
                            h2 { class: "text-xl font-semibold text-white mb-2", "No playlists yet" }
                            p { class: "text-zinc-400", "Create one and invite your friends" }
                        }
                    }
                }
            } else {
                rsx! {
                    div { class: "grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-4",
                        {visible.into_iter().map(move |playlist| {
                            let target = playlist.clone();
                            rsx! {
                                PlaylistCard {
                                    key: "{playlist.id}",
                                    playlist,
                                    on_delete: move |_| pending_delete.set(Some(target.clone())),
                                }
                            }
                        })}
                    }
                }
            }}
        }

        if show_create() {
            CreatePlaylistModal {
                on_submit: on_create,
                on_close: move |_| show_create.set(false),
            }
        }

        {pending_delete().map(|playlist| rsx! {
            ConfirmDialog {
                title: "Delete playlist".to_string(),
                message: format!("Delete \"{}\" for every contributor? This cannot be undone.", playlist.name),
                confirm_label: "Delete".to_string(),
                on_confirm: on_confirm_delete,
                on_close: move |_| pending_delete.set(None),
            }
        })}
    }
}

#[component]
fn PlaylistCard(playlist: Playlist, on_delete: EventHandler<()>) -> Element {
    let contributor_count = playlist.contributors.len();

    rsx! {
        div { class: "group relative rounded-xl bg-zinc-900 border border-zinc-800 hover:border-emerald-500/60 transition-colors",
            Link {
                to: AppView::PlaylistDetailView { id: playlist.id.clone() },
                class: "block p-4",
                div { class: "flex items-center gap-3 mb-3",
                    div { class: "w-12 h-12 rounded-lg bg-gradient-to-br from-indigo-600 to-purple-700 flex items-center justify-center",
                        Icon { name: "playlist".to_string(), class: "w-6 h-6 text-white/80".to_string() }
                    }
                    div { class: "min-w-0",
                        p { class: "font-medium text-white truncate group-hover:text-emerald-400 transition-colors", "{playlist.name}" }
                        p { class: "text-xs text-zinc-400", "{playlist.song_count_label()}" }
                    }
                }
                p { class: "flex items-center gap-1 text-xs text-zinc-500",
                    Icon { name: "users".to_string(), class: "w-3 h-3".to_string() }
                    "{contributor_count} contributor(s) · by {playlist.created_by}"
                }
            }
            button {
                class: "absolute top-3 right-3 p-2 rounded-lg text-zinc-500 hover:text-red-400 hover:bg-zinc-800 opacity-0 group-hover:opacity-100 transition",
                aria_label: "Delete playlist",
                onclick: move |_| on_delete.call(()),
                Icon { name: "trash".to_string(), class: "w-4 h-4".to_string() }
            }
        }
    }
}
