use std::cell::Cell;
use std::rc::Rc;
use tracing::debug;

use crate::api::path;
use crate::api::store::{DocumentStore, Subscription};
use crate::api::value::Document;
use crate::api::{Playlist, Song};

use super::session::SessionUser;

#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistEvent {
    Playlist(Playlist),
    /// The playlist document does not exist. Sent at most once.
    NotFound,
    Songs(Vec<Song>),
    Contributors(Vec<String>),
}

/// Live mirrors for one playlist as seen by one user.
///
/// Holds three subscriptions (playlist document, songs sub-collection, and the
/// contributors array of the playlist document). Dropping the adapter silences the
/// sink first and then releases all three, so a late snapshot can never reach a
/// view that has moved on.
pub struct PlaylistSubscription {
    uid: String,
    playlist_id: String,
    alive: Rc<Cell<bool>>,
    subscriptions: Vec<Subscription>,
}

impl PlaylistSubscription {
    pub fn open(
        store: &dyn DocumentStore,
        user: &SessionUser,
        playlist_id: &str,
        sink: impl Fn(PlaylistEvent) + 'static,
    ) -> Self {
        let alive = Rc::new(Cell::new(true));
        let not_found_sent = Rc::new(Cell::new(false));
        let sink: Rc<dyn Fn(PlaylistEvent)> = Rc::new(sink);
        let doc_path = path::playlist(playlist_id);

        debug!(uid = %user.uid, playlist_id, "Opening playlist subscriptions");

        let playlist_sub = {
            let alive = alive.clone();
            let sink = sink.clone();
            store.subscribe_document(
                doc_path.clone(),
                Rc::new(move |doc: Option<Document>| {
                    if !alive.get() {
                        return;
                    }
                    match doc {
                        Some(doc) => sink(PlaylistEvent::Playlist(Playlist::from_document(&doc))),
                        None if !not_found_sent.replace(true) => sink(PlaylistEvent::NotFound),
                        None => {}
                    }
                }),
            )
        };

        let songs_sub = {
            let alive = alive.clone();
            let sink = sink.clone();
            store.subscribe_collection(
                path::songs(playlist_id),
                Rc::new(move |docs: Vec<Document>| {
                    if !alive.get() {
                        return;
                    }
                    sink(PlaylistEvent::Songs(docs.iter().map(Song::from_document).collect()));
                }),
            )
        };

        let contributors_sub = {
            let alive = alive.clone();
            let sink = sink.clone();
            store.subscribe_document(
                doc_path,
                Rc::new(move |doc: Option<Document>| {
                    if !alive.get() {
                        return;
                    }
                    if let Some(doc) = doc {
                        sink(PlaylistEvent::Contributors(doc.string_array_field("contributors")));
                    }
                }),
            )
        };

        Self {
            uid: user.uid.clone(),
            playlist_id: playlist_id.to_string(),
            alive,
            subscriptions: vec![playlist_sub, songs_sub, contributors_sub],
        }
    }

    /// The `(uid, playlist id)` pair this adapter is bound to.
    pub fn key(&self) -> (&str, &str) {
        (&self.uid, &self.playlist_id)
    }

    pub fn close(&mut self) {
        if !self.alive.replace(false) {
            return;
        }
        for subscription in &mut self.subscriptions {
            subscription.cancel();
        }
        self.subscriptions.clear();
        debug!(uid = %self.uid, playlist_id = %self.playlist_id, "Closed playlist subscriptions");
    }
}

impl Drop for PlaylistSubscription {
    fn drop(&mut self) {
        self.close();
    }
}
