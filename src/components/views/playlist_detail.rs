use dioxus::prelude::*;
use std::cell::RefCell;
use std::ops::Deref;
use std::rc::Rc;
use tracing::debug;

use crate::api::{Backend, Song, SongDraft};
use crate::components::{
    AddContributorModal, AddSongModal, AppView, ConfirmDialog, EndedListener, HtmlAudio, Icon,
    SessionSignal, Toasts,
};
use crate::sync::{PlaylistDetail, PlaylistSubscription, SessionUser};
use crate::utils::initial;

#[component]
pub fn PlaylistDetailView(id: String) -> Element {
    let session = use_context::<SessionSignal>();
    let navigator = use_navigator();

    use_effect(move || {
        let state = session.state();
        if !state.loading && state.user.is_none() {
            navigator.replace(AppView::LoginView {});
        }
    });

    // A new user or playlist id remounts the page, which tears down the old subscriptions.
    match session.user() {
        Some(user) => rsx! {
            PlaylistPage { key: "{user.uid}/{id}", playlist_id: id.clone(), user }
        },
        None => rsx! {
            div { class: "flex items-center justify-center py-20",
                Icon { name: "loader".to_string(), class: "w-8 h-8 text-zinc-500".to_string() }
            }
        },
    }
}

/// Shared controller handle; props compare by identity.
#[derive(Clone)]
struct DetailHandle(Rc<PlaylistDetail>);

impl PartialEq for DetailHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for DetailHandle {
    type Target = PlaylistDetail;

    fn deref(&self) -> &PlaylistDetail {
        &self.0
    }
}

fn bump(mut revision: Signal<u64>) {
    *revision.write() += 1;
}

type LiveHandles = Rc<RefCell<Option<(PlaylistSubscription, EndedListener)>>>;

#[component]
fn PlaylistPage(playlist_id: String, user: SessionUser) -> Element {
    let backend = use_context::<Backend>();
    let toasts = use_context::<Toasts>();
    let navigator = use_navigator();
    let revision = use_signal(|| 0u64);
    let mut show_add_song = use_signal(|| false);
    let mut show_add_contributor = use_signal(|| false);
    let mut confirm_delete = use_signal(|| false);
    let mut leaving = use_signal(|| false);

    let detail = use_hook(|| {
        DetailHandle(Rc::new(PlaylistDetail::new(
            backend.store.clone(),
            user.clone(),
            playlist_id.clone(),
            Box::new(HtmlAudio::shared()),
        )))
    });

    let live: LiveHandles = use_hook(|| {
        let sink = detail.clone();
        let subscription =
            PlaylistSubscription::open(backend.store.as_ref(), &user, &playlist_id, move |event| {
                sink.apply(event);
                bump(revision);
            });
        let ended = {
            let detail = detail.clone();
            EndedListener::attach(move || {
                detail.on_ended();
                bump(revision);
            })
        };
        Rc::new(RefCell::new(Some((subscription, ended))))
    });

    use_drop({
        let live = live.clone();
        let detail = detail.clone();
        move || {
            live.borrow_mut().take();
            detail.stop_playback();
            debug!("Playlist page unmounted");
        }
    });

    use_effect({
        let detail = detail.clone();
        move || {
            revision();
            if detail.is_not_found() && !*leaving.peek() {
                leaving.set(true);
                toasts.error("Playlist not found");
                navigator.replace(AppView::HomeView {});
            }
        }
    });

    let on_add_song = {
        let detail = detail.clone();
        move |draft: SongDraft| {
            let detail = detail.clone();
            spawn(async move {
                let title = draft.title.clone();
                match detail.add_song(draft).await {
                    Ok(_) => {
                        show_add_song.set(false);
                        toasts.success(format!("Added \"{title}\""));
                    }
                    Err(err) => toasts.error(err.to_string()),
                }
            });
        }
    };

    let on_add_contributor = {
        let detail = detail.clone();
        move |email: String| {
            let detail = detail.clone();
            spawn(async move {
                match detail.add_contributor(&email).await {
                    Ok(()) => {
                        show_add_contributor.set(false);
                        toasts.success(format!("{email} can now edit this playlist"));
                    }
                    Err(err) => toasts.error(err.to_string()),
                }
            });
        }
    };

    let on_delete_playlist = {
        let detail = detail.clone();
        move |_: ()| {
            confirm_delete.set(false);
            leaving.set(true);
            bump(revision);
            let detail = detail.clone();
            spawn(async move {
                match detail.delete_playlist().await {
                    Ok(()) => {
                        toasts.success("Playlist deleted");
                        navigator.replace(AppView::HomeView {});
                    }
                    Err(err) => {
                        leaving.set(false);
                        toasts.error(err.to_string());
                    }
                }
            });
        }
    };

    revision();
    let playlist = detail.playlist();
    let songs = detail.songs();
    let contributors = detail.contributors();
    let current = detail.current_song();
    let is_playing = detail.is_playing();

    let Some(playlist) = playlist else {
        return rsx! {
            div { class: "flex items-center justify-center py-20",
                Icon { name: "loader".to_string(), class: "w-8 h-8 text-zinc-500".to_string() }
            }
        };
    };

    rsx! {
        div { class: "max-w-6xl mx-auto px-4 py-6 pb-32 space-y-8",
            Link {
                to: AppView::HomeView {},
                class: "inline-flex items-center gap-2 text-sm text-zinc-400 hover:text-white",
                Icon { name: "arrow-left".to_string(), class: "w-4 h-4".to_string() }
                "All playlists"
            }

            header { class: "flex flex-col md:flex-row md:items-end justify-between gap-4",
                div { class: "flex items-center gap-4",
                    div { class: "w-20 h-20 rounded-2xl bg-gradient-to-br from-indigo-600 to-purple-700 flex items-center justify-center shadow-lg",
                        Icon { name: "playlist".to_string(), class: "w-10 h-10 text-white/80".to_string() }
                    }
                    div {
                        h1 { class: "text-3xl font-bold text-white", "{playlist.name}" }
                        p { class: "text-sm text-zinc-400",
                            "{playlist.song_count_label()} · created by {playlist.created_by}"
                        }
                    }
                }
                div { class: "flex flex-wrap gap-2",
                    button {
                        class: "flex items-center gap-2 px-4 py-2 rounded-lg bg-emerald-500 hover:bg-emerald-400 text-white font-medium transition-colors",
                        onclick: move |_| show_add_song.set(true),
                        Icon { name: "plus".to_string(), class: "w-4 h-4".to_string() }
                        "Add song"
                    }
                    button {
                        class: "flex items-center gap-2 px-4 py-2 rounded-lg bg-zinc-800 hover:bg-zinc-700 text-white transition-colors",
                        onclick: move |_| show_add_contributor.set(true),
                        Icon { name: "user-plus".to_string(), class: "w-4 h-4".to_string() }
                        "Add contributor"
                    }
                    button {
                        class: "flex items-center gap-2 px-4 py-2 rounded-lg text-red-400 hover:bg-red-500/10 transition-colors",
                        onclick: move |_| confirm_delete.set(true),
                        Icon { name: "trash".to_string(), class: "w-4 h-4".to_string() }
                        "Delete"
                    }
                }
            }

            div { class: "grid grid-cols-1 lg:grid-cols-3 gap-6",
                section { class: "lg:col-span-2",
                    h2 { class: "text-sm uppercase tracking-widest text-zinc-500 mb-3", "Songs" }
                    if songs.is_empty() {
                        div { class: "flex flex-col items-center justify-center py-16 rounded-xl border border-dashed border-zinc-800",
                            Icon { name: "music".to_string(), class: "w-12 h-12 text-zinc-600 mb-3".to_string() }
                            p { class: "text-zinc-400", "No songs yet. Add the first one." }
                        }
                    } else {
                        div { class: "rounded-xl bg-zinc-900/60 border border-zinc-800 divide-y divide-zinc-800",
                            {songs.into_iter().enumerate().map(|(index, song)| {
                                let is_current = current.as_ref().is_some_and(|c| c.id == song.id);
                                rsx! {
                                    SongRow {
                                        key: "{song.id}",
                                        index,
                                        song,
                                        is_current,
                                        is_playing: is_current && is_playing,
                                        detail: detail.clone(),
                                        revision,
                                    }
                                }
                            })}
                        }
                    }
                }

                section {
                    h2 { class: "text-sm uppercase tracking-widest text-zinc-500 mb-3", "Contributors" }
                    ul { class: "rounded-xl bg-zinc-900/60 border border-zinc-800 divide-y divide-zinc-800",
                        {contributors.into_iter().map(|email| {
                            let removable = detail.can_remove_contributor(&email);
                            rsx! {
                                ContributorRow {
                                    key: "{email}",
                                    email,
                                    removable,
                                    detail: detail.clone(),
                                    revision,
                                }
                            }
                        })}
                    }
                }
            }
        }

        if let Some(song) = current {
            NowPlaying {
                song,
                is_playing,
                detail: detail.clone(),
                revision,
            }
        }

        if show_add_song() {
            AddSongModal {
                on_submit: on_add_song,
                on_close: move |_| show_add_song.set(false),
            }
        }

        if show_add_contributor() {
            AddContributorModal {
                on_submit: on_add_contributor,
                on_close: move |_| show_add_contributor.set(false),
            }
        }

        if confirm_delete() {
            ConfirmDialog {
                title: "Delete playlist".to_string(),
                message: format!("Delete \"{}\" for every contributor? This cannot be undone.", playlist.name),
                confirm_label: "Delete".to_string(),
                on_confirm: on_delete_playlist,
                on_close: move |_| confirm_delete.set(false),
            }
        }
    }
}

#[component]
fn SongRow(
    index: usize,
    song: Song,
    is_current: bool,
    is_playing: bool,
    detail: DetailHandle,
    revision: Signal<u64>,
) -> Element {
    let toasts = use_context::<Toasts>();

    let on_play = {
        let detail = detail.clone();
        let song = song.clone();
        move |_: MouseEvent| {
            if is_current {
                detail.toggle_play_pause();
            } else {
                detail.select(song.clone());
                let detail = detail.clone();
                spawn(async move {
                    if let Err(err) = detail.mark_played().await {
                        debug!(error = %err, "Last played not recorded");
                    }
                });
            }
            bump(revision);
        }
    };

    let on_delete = {
        let song_id = song.id.clone();
        let title = song.title.clone();
        move |_: MouseEvent| {
            if detail.is_current(&song_id) {
                detail.stop_playback();
                bump(revision);
            }
            let detail = detail.clone();
            let song_id = song_id.clone();
            let title = title.clone();
            spawn(async move {
                match detail.delete_song(&song_id).await {
                    Ok(()) => toasts.success(format!("Removed \"{title}\"")),
                    Err(err) => toasts.error(err.to_string()),
                }
            });
        }
    };

    let row_class = if is_current {
        "group flex items-center gap-3 px-4 py-3 bg-emerald-500/10"
    } else {
        "group flex items-center gap-3 px-4 py-3 hover:bg-zinc-800/50"
    };
    let number = index + 1;
    let play_label = if is_playing { "Pause" } else { "Play" };
    let title_class = if is_current {
        "font-medium text-emerald-400 truncate"
    } else {
        "font-medium text-white truncate"
    };

    rsx! {
        div { class: row_class,
            button {
                class: "w-8 h-8 rounded-full flex items-center justify-center text-zinc-400 hover:text-white hover:bg-emerald-500",
                aria_label: play_label,
                onclick: on_play,
                if is_playing {
                    Icon { name: "pause".to_string(), class: "w-4 h-4".to_string() }
                } else if is_current {
                    Icon { name: "play".to_string(), class: "w-4 h-4 ml-0.5".to_string() }
                } else {
                    span { class: "text-sm group-hover:hidden", "{number}" }
                    span { class: "hidden group-hover:inline",
                        Icon { name: "play".to_string(), class: "w-4 h-4 ml-0.5".to_string() }
                    }
                }
            }
            div { class: "flex-1 min-w-0",
                p { class: title_class, "{song.title}" }
                p { class: "text-xs text-zinc-400 truncate", "{song.artist}" }
            }
            span { class: "hidden md:inline text-xs text-zinc-500 truncate max-w-[12rem]",
                "added by {song.added_by}"
            }
            button {
                class: "p-2 rounded-lg text-zinc-500 hover:text-red-400 hover:bg-zinc-800",
                aria_label: "Remove song",
                onclick: on_delete,
                Icon { name: "trash".to_string(), class: "w-4 h-4".to_string() }
            }
        }
    }
}

#[component]
fn ContributorRow(
    email: String,
    removable: bool,
    detail: DetailHandle,
    revision: Signal<u64>,
) -> Element {
    let toasts = use_context::<Toasts>();
    let navigator = use_navigator();
    let is_self = email.eq_ignore_ascii_case(&detail.user().email);
    let creator = detail
        .playlist()
        .is_some_and(|p| p.created_by.eq_ignore_ascii_case(&email));

    let on_remove = {
        let email = email.clone();
        move |_: MouseEvent| {
            if is_self {
                detail.stop_playback();
                bump(revision);
            }
            let detail = detail.clone();
            let email = email.clone();
            spawn(async move {
                match detail.delete_contributor(&email).await {
                    Ok(()) if is_self => {
                        toasts.success("You left the playlist");
                        navigator.replace(AppView::HomeView {});
                    }
                    Ok(()) => toasts.success(format!("Removed {email}")),
                    Err(err) => toasts.error(err.to_string()),
                }
            });
        }
    };

    rsx! {
        li { class: "flex items-center gap-3 px-4 py-3",
            div { class: "w-8 h-8 rounded-full bg-zinc-700 flex items-center justify-center text-sm font-semibold text-white",
                "{initial(&email)}"
            }
            div { class: "flex-1 min-w-0",
                p { class: "text-sm text-white truncate", "{email}" }
                if creator {
                    p { class: "text-xs text-zinc-500", "Creator" }
                } else if is_self {
                    p { class: "text-xs text-zinc-500", "You" }
                }
            }
            if removable {
                button {
                    class: "p-2 rounded-lg text-zinc-500 hover:text-red-400 hover:bg-zinc-800",
                    aria_label: "Remove contributor",
                    onclick: on_remove,
                    Icon { name: "x".to_string(), class: "w-4 h-4".to_string() }
                }
            }
        }
    }
}

#[component]
fn NowPlaying(song: Song, is_playing: bool, detail: DetailHandle, revision: Signal<u64>) -> Element {
    let previous = {
        let detail = detail.clone();
        move |_: MouseEvent| {
            detail.previous();
            bump(revision);
        }
    };
    let toggle = {
        let detail = detail.clone();
        move |_: MouseEvent| {
            detail.toggle_play_pause();
            bump(revision);
        }
    };
    let next = move |_: MouseEvent| {
        detail.next();
        bump(revision);
    };
    let (toggle_label, toggle_icon) = if is_playing { ("Pause", "pause") } else { ("Play", "play") };

    rsx! {
        div { class: "fixed bottom-0 inset-x-0 z-30 border-t border-zinc-800 bg-zinc-950/95 backdrop-blur-xl",
            div { class: "max-w-6xl mx-auto flex items-center gap-4 px-4 py-3",
                div { class: "w-10 h-10 rounded-lg bg-emerald-500/20 flex items-center justify-center",
                    Icon { name: "music".to_string(), class: "w-5 h-5 text-emerald-400".to_string() }
                }
                div { class: "flex-1 min-w-0",
                    p { class: "text-sm font-medium text-white truncate", "{song.title}" }
                    p { class: "text-xs text-zinc-400 truncate", "{song.artist}" }
                }
                div { class: "flex items-center gap-2",
                    button {
                        class: "p-2 rounded-full text-zinc-300 hover:text-white",
                        aria_label: "Previous",
                        onclick: previous,
                        Icon { name: "prev".to_string(), class: "w-5 h-5".to_string() }
                    }
                    button {
                        class: "w-10 h-10 rounded-full bg-white text-black flex items-center justify-center hover:scale-105 transition-transform",
                        aria_label: toggle_label,
                        onclick: toggle,
                        Icon { name: toggle_icon.to_string(), class: "w-5 h-5".to_string() }
                    }
                    button {
                        class: "p-2 rounded-full text-zinc-300 hover:text-white",
                        aria_label: "Next",
                        onclick: next,
                        Icon { name: "next".to_string(), class: "w-5 h-5".to_string() }
                    }
                }
            }
        }
    }
}
