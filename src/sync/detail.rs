//! One open playlist: live mirrors fed by [`PlaylistSubscription`], the
//! playback sequencer, and the mutations a contributor can issue.
//!
//! [`PlaylistSubscription`]: super::PlaylistSubscription

use chrono::Utc;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{info, warn};

use crate::api::path;
use crate::api::store::{DocumentStore, Filter, Query};
use crate::api::value::Value;
use crate::api::{Playlist, Song, SongDraft};
use crate::fields;
use crate::forms::{validate_email, validate_song};
use crate::utils::normalize_email;

use super::sequencer::{MediaElement, Sequencer};
use super::session::SessionUser;
use super::subscription::PlaylistEvent;
use super::MutationError;

#[derive(Debug, Default)]
struct Mirrors {
    playlist: Option<Playlist>,
    songs: Vec<Song>,
    contributors: Vec<String>,
    not_found: bool,
}

pub struct PlaylistDetail {
    store: Rc<dyn DocumentStore>,
    user: SessionUser,
    playlist_id: String,
    mirrors: RefCell<Mirrors>,
    sequencer: RefCell<Sequencer>,
    played_marked: Cell<bool>,
}

impl PlaylistDetail {
    pub fn new(
        store: Rc<dyn DocumentStore>,
        user: SessionUser,
        playlist_id: impl Into<String>,
        media: Box<dyn MediaElement>,
    ) -> Self {
        Self {
            store,
            user,
            playlist_id: playlist_id.into(),
            mirrors: RefCell::new(Mirrors::default()),
            sequencer: RefCell::new(Sequencer::new(media)),
            played_marked: Cell::new(false),
        }
    }

    /// Folds one subscription delivery into the mirrors.
    pub fn apply(&self, event: PlaylistEvent) {
        let mut mirrors = self.mirrors.borrow_mut();
        match event {
            PlaylistEvent::Playlist(playlist) => mirrors.playlist = Some(playlist),
            PlaylistEvent::NotFound => {
                mirrors.not_found = true;
                mirrors.playlist = None;
                drop(mirrors);
                self.sequencer.borrow_mut().clear();
            }
            PlaylistEvent::Songs(songs) => {
                mirrors.songs = songs;
                let mut sequencer = self.sequencer.borrow_mut();
                let removed = sequencer
                    .current_song()
                    .is_some_and(|current| !mirrors.songs.iter().any(|s| s.id == current.id));
                if removed {
                    info!(playlist_id = %self.playlist_id, "Now playing song was removed");
                    sequencer.clear();
                }
            }
            PlaylistEvent::Contributors(contributors) => mirrors.contributors = contributors,
        }
    }

    pub fn playlist_id(&self) -> &str {
        &self.playlist_id
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    pub fn playlist(&self) -> Option<Playlist> {
        self.mirrors.borrow().playlist.clone()
    }

    pub fn songs(&self) -> Vec<Song> {
        self.mirrors.borrow().songs.clone()
    }

    pub fn contributors(&self) -> Vec<String> {
        self.mirrors.borrow().contributors.clone()
    }

    pub fn is_not_found(&self) -> bool {
        self.mirrors.borrow().not_found
    }

    /// The current user and the creator are never offered for removal.
    pub fn can_remove_contributor(&self, email: &str) -> bool {
        !email.eq_ignore_ascii_case(&self.user.email) && !self.is_creator(email)
    }

    fn is_creator(&self, email: &str) -> bool {
        self.mirrors
            .borrow()
            .playlist
            .as_ref()
            .is_some_and(|p| p.created_by.eq_ignore_ascii_case(email))
    }

    pub fn current_song(&self) -> Option<Song> {
        self.sequencer.borrow().current_song().cloned()
    }

    pub fn is_playing(&self) -> bool {
        self.sequencer.borrow().is_playing()
    }

    pub fn is_current(&self, song_id: &str) -> bool {
        self.sequencer.borrow().is_current(song_id)
    }

    pub fn select(&self, song: Song) {
        self.sequencer.borrow_mut().select(song);
    }

    pub fn toggle_play_pause(&self) {
        self.sequencer.borrow_mut().toggle_play_pause();
    }

    pub fn next(&self) {
        let songs = self.songs();
        self.sequencer.borrow_mut().next(&songs);
    }

    pub fn previous(&self) {
        let songs = self.songs();
        self.sequencer.borrow_mut().previous(&songs);
    }

    pub fn on_ended(&self) {
        let songs = self.songs();
        self.sequencer.borrow_mut().on_ended(&songs);
    }

    pub fn stop_playback(&self) {
        self.sequencer.borrow_mut().clear();
    }

    pub async fn add_song(&self, draft: SongDraft) -> Result<String, MutationError> {
        let draft = validate_song(&draft).map_err(MutationError::Validation)?;
        let count = self.cached_song_count();

        let song_id = self
            .store
            .add(
                path::songs(&self.playlist_id),
                draft.into_fields(&self.user.email, Utc::now()),
            )
            .await
            .inspect_err(|err| warn!(playlist_id = %self.playlist_id, error = %err, "Failed to add song"))?;
        info!(playlist_id = %self.playlist_id, song_id = %song_id, "Added song");

        self.write_song_count(count + 1).await;
        Ok(song_id)
    }

    /// Stops playback first when the song is playing, then deletes it.
    pub async fn delete_song(&self, song_id: &str) -> Result<(), MutationError> {
        let song_id = song_id.trim();
        if song_id.is_empty() {
            return Err(MutationError::Validation("Song id is required".to_string()));
        }
        if self.is_current(song_id) {
            self.stop_playback();
        }
        let count = self.cached_song_count();

        self.store
            .delete(path::song(&self.playlist_id, song_id))
            .await
            .inspect_err(|err| warn!(playlist_id = %self.playlist_id, song_id, error = %err, "Failed to delete song"))?;
        info!(playlist_id = %self.playlist_id, song_id, "Deleted song");

        self.write_song_count(count.saturating_sub(1).max(0)).await;
        Ok(())
    }

    /// Adds `email` after checking the user directory has an entry for it.
    pub async fn add_contributor(&self, email: &str) -> Result<(), MutationError> {
        let email = validate_email(email).map_err(MutationError::Validation)?;

        let lookup = Query::new(path::users())
            .filter(Filter::Equal("email".to_string(), email.clone().into()))
            .limit(1);
        let matches = self.store.query(lookup).await?;
        if matches.is_empty() {
            info!(playlist_id = %self.playlist_id, email = %email, "No directory entry for contributor");
            return Err(MutationError::NotFound(format!("No user found with email {email}")));
        }

        self.store
            .array_union(
                path::playlist(&self.playlist_id),
                "contributors",
                vec![Value::from(email.as_str())],
            )
            .await
            .inspect_err(|err| warn!(playlist_id = %self.playlist_id, error = %err, "Failed to add contributor"))?;
        info!(playlist_id = %self.playlist_id, email = %email, "Added contributor");
        Ok(())
    }

    pub async fn delete_contributor(&self, email: &str) -> Result<(), MutationError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(MutationError::Validation("Email is required".to_string()));
        }
        if self.is_creator(&email) {
            return Err(MutationError::Validation(
                "The playlist creator cannot be removed".to_string(),
            ));
        }
        if email.eq_ignore_ascii_case(&self.user.email) {
            self.stop_playback();
        }

        self.store
            .array_remove(
                path::playlist(&self.playlist_id),
                "contributors",
                vec![Value::from(email.as_str())],
            )
            .await
            .inspect_err(|err| warn!(playlist_id = %self.playlist_id, error = %err, "Failed to remove contributor"))?;
        info!(playlist_id = %self.playlist_id, email = %email, "Removed contributor");
        Ok(())
    }

    pub async fn delete_playlist(&self) -> Result<(), MutationError> {
        self.stop_playback();
        super::collection::delete_playlist(self.store.as_ref(), &self.playlist_id).await
    }

    /// Stamps `lastPlayed` once per open playlist. Later calls do nothing.
    pub async fn mark_played(&self) -> Result<(), MutationError> {
        if self.played_marked.replace(true) {
            return Ok(());
        }
        self.store
            .update(
                path::playlist(&self.playlist_id),
                fields! { "lastPlayed" => Utc::now() },
            )
            .await
            .inspect_err(|err| warn!(playlist_id = %self.playlist_id, error = %err, "Failed to record last played"))?;
        Ok(())
    }

    fn cached_song_count(&self) -> i64 {
        self.mirrors.borrow().songs.len() as i64
    }

    // Count follow-ups are not retried; the field may drift under concurrent edits.
    async fn write_song_count(&self, count: i64) {
        if let Err(err) = self
            .store
            .update(path::playlist(&self.playlist_id), fields! { "songs" => count })
            .await
        {
            warn!(playlist_id = %self.playlist_id, error = %err, "Failed to update song count");
        }
    }
}
