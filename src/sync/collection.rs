use chrono::Utc;
use tracing::{info, warn};

use crate::api::path;
use crate::api::store::{Direction, DocumentStore, Filter, Query, StoreResult};
use crate::api::Playlist;
use crate::diagnostics::{log_perf, PerfTimer};
use crate::forms::validate_playlist_name;
use crate::utils::normalize_email;

use super::session::SessionUser;
use super::MutationError;

const RECENTLY_PLAYED_LIMIT: usize = 5;

/// Playlists the signed-in user contributes to, plus the current search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistCollection {
    source: Vec<Playlist>,
    filtered: Vec<Playlist>,
    search_term: String,
}

impl PlaylistCollection {
    pub async fn load(store: &dyn DocumentStore, email: &str) -> StoreResult<Self> {
        let mut collection = Self::default();
        collection.replace(fetch_visible(store, email).await?);
        Ok(collection)
    }

    /// Swaps in a fresh source list and drops any active search.
    pub fn replace(&mut self, playlists: Vec<Playlist>) {
        self.source = playlists;
        self.filtered = self.source.clone();
        self.search_term.clear();
    }

    pub async fn refresh(&mut self, store: &dyn DocumentStore, email: &str) -> StoreResult<()> {
        let playlists = fetch_visible(store, email).await?;
        self.replace(playlists);
        Ok(())
    }

    pub fn search(&mut self, term: &str) {
        self.search_term = term.to_string();
        self.filtered = filter_by_name(&self.source, term);
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.filtered
    }

    pub fn all(&self) -> &[Playlist] {
        &self.source
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Playlists with a play timestamp, most recent first.
    pub fn recently_played(&self) -> Vec<Playlist> {
        let mut played: Vec<Playlist> = self
            .source
            .iter()
            .filter(|p| p.last_played.is_some())
            .cloned()
            .collect();
        played.sort_by(|a, b| b.last_played.cmp(&a.last_played));
        played.truncate(RECENTLY_PLAYED_LIMIT);
        played
    }
}

/// Case-insensitive substring match on the playlist name. An empty term keeps everything.
pub fn filter_by_name(playlists: &[Playlist], term: &str) -> Vec<Playlist> {
    let needle = term.to_lowercase();
    playlists
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub async fn fetch_visible(store: &dyn DocumentStore, email: &str) -> StoreResult<Vec<Playlist>> {
    let started = PerfTimer::now();
    let query = Query::new(path::playlists())
        .filter(Filter::ArrayContains(
            "contributors".to_string(),
            normalize_email(email).into(),
        ))
        .order_by("createdAt", Direction::Descending);

    let docs = store.query(query).await?;
    let playlists: Vec<Playlist> = docs.iter().map(Playlist::from_document).collect();
    log_perf(
        "collection.fetch_visible",
        started,
        &format!("count={}", playlists.len()),
    );
    Ok(playlists)
}

/// Creates a playlist owned by `user` and returns its id.
pub async fn create_playlist(
    store: &dyn DocumentStore,
    user: &SessionUser,
    name: &str,
) -> Result<String, MutationError> {
    let name = validate_playlist_name(name).map_err(MutationError::Validation)?;
    let email = normalize_email(&user.email);
    let id = store
        .add(path::playlists(), Playlist::new_fields(&name, &email, Utc::now()))
        .await
        .inspect_err(|err| warn!(error = %err, "Failed to create playlist"))?;
    info!(playlist_id = %id, name = %name, "Created playlist");
    Ok(id)
}

/// Removes the playlist document. Its songs sub-collection is left behind.
/// Deletes the playlist document. Fails with `NotFound` when someone else
/// already removed it.
pub async fn delete_playlist(store: &dyn DocumentStore, playlist_id: &str) -> Result<(), MutationError> {
    if playlist_id.trim().is_empty() {
        return Err(MutationError::Validation("Playlist id is required".to_string()));
    }
    let target = path::playlist(playlist_id);
    if store.get(target.clone()).await?.is_none() {
        info!(playlist_id, "Playlist already gone");
        return Err(MutationError::NotFound("Playlist not found".to_string()));
    }

    store
        .delete(target)
        .await
        .inspect_err(|err| warn!(playlist_id, error = %err, "Failed to delete playlist"))?;
    info!(playlist_id, "Deleted playlist");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::MemoryStore;
    use crate::fields;
    use chrono::{TimeZone, Utc};

    fn user(email: &str) -> SessionUser {
        SessionUser {
            uid: "u1".to_string(),
            email: email.to_string(),
        }
    }

    fn named(name: &str) -> Playlist {
        Playlist {
            id: name.to_lowercase(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn filter_matches_case_insensitive_substrings() {
        let playlists = vec![named("Road Trip"), named("Gym"), named("Sunday Roadhouse")];
        let names = |found: Vec<Playlist>| found.into_iter().map(|p| p.name).collect::<Vec<_>>();

        assert_eq!(names(filter_by_name(&playlists, "ROAD")), vec!["Road Trip", "Sunday Roadhouse"]);
        assert_eq!(names(filter_by_name(&playlists, "")).len(), 3);
        assert!(filter_by_name(&playlists, "jazz").is_empty());
    }

    #[test]
    fn filter_agrees_with_lowercase_contains_for_every_pair() {
        let playlists = vec![named("Road Trip"), named("gym"), named("ÉTÉ Mix"), named("")];
        for term in ["", "r", "TRIP", "Gy", "été", "x", "  "] {
            let found = filter_by_name(&playlists, term);
            for playlist in &playlists {
                let expected = playlist.name.to_lowercase().contains(&term.to_lowercase());
                assert_eq!(found.contains(playlist), expected, "term {term:?} name {:?}", playlist.name);
            }
        }
    }

    #[test]
    fn search_is_derived_from_source_each_time() {
        let mut collection = PlaylistCollection::default();
        collection.replace(vec![named("Road Trip"), named("Gym")]);

        collection.search("gym");
        assert_eq!(collection.playlists().len(), 1);
        collection.search("");
        assert_eq!(collection.playlists().len(), 2);
        assert_eq!(collection.all().len(), 2);
    }

    #[tokio::test]
    async fn load_returns_only_playlists_listing_the_user() {
        let store = MemoryStore::new();
        create_playlist(&store, &user("a@x.com"), "Mine").await.unwrap();
        create_playlist(&store, &user("b@x.com"), "Theirs").await.unwrap();

        let collection = PlaylistCollection::load(&store, "A@x.com").await.unwrap();
        let names: Vec<&str> = collection.all().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Mine"]);
    }

    #[tokio::test]
    async fn newest_playlist_comes_first() {
        let store = MemoryStore::new();
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        store.seed(path::playlist("old"), Playlist::new_fields("Old", "a@x.com", early));
        store.seed(path::playlist("new"), Playlist::new_fields("New", "a@x.com", late));

        let collection = PlaylistCollection::load(&store, "a@x.com").await.unwrap();
        let ids: Vec<&str> = collection.all().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn refresh_picks_up_writes_and_clears_search() {
        let store = MemoryStore::new();
        let me = user("a@x.com");
        create_playlist(&store, &me, "Road Trip").await.unwrap();
        let mut collection = PlaylistCollection::load(&store, &me.email).await.unwrap();
        collection.search("road");

        create_playlist(&store, &me, "Gym").await.unwrap();
        collection.refresh(&store, &me.email).await.unwrap();

        assert_eq!(collection.search_term(), "");
        assert_eq!(collection.playlists().len(), 2);
    }

    #[tokio::test]
    async fn create_rejects_blank_name_without_writing() {
        let store = MemoryStore::new();
        let err = create_playlist(&store, &user("a@x.com"), "   ").await.unwrap_err();
        assert!(err.is_validation());
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn create_writes_initial_fields() {
        let store = MemoryStore::new();
        let id = create_playlist(&store, &user("a@x.com"), " Road Trip ").await.unwrap();

        let playlist = Playlist::from_document(&store.document(&path::playlist(&id)).unwrap());
        assert_eq!(playlist.name, "Road Trip");
        assert_eq!(playlist.song_count, 0);
        assert_eq!(playlist.created_by, "a@x.com");
        assert_eq!(playlist.contributors, vec!["a@x.com"]);
        assert_eq!(playlist.last_played, None);
    }

    #[tokio::test]
    async fn delete_leaves_songs_behind() {
        let store = MemoryStore::new();
        let id = create_playlist(&store, &user("a@x.com"), "Road Trip").await.unwrap();
        store.seed(path::song(&id, "s1"), fields! { "title" => "Song A" });

        delete_playlist(&store, &id).await.unwrap();

        assert!(store.document(&path::playlist(&id)).is_none());
        assert_eq!(store.children(&path::songs(&id)).len(), 1);
    }

    #[tokio::test]
    async fn failed_delete_reports_remote_error() {
        let store = MemoryStore::new();
        let id = create_playlist(&store, &user("a@x.com"), "Road Trip").await.unwrap();
        store.fail_writes(true);

        let err = delete_playlist(&store, &id).await.unwrap_err();
        assert!(matches!(err, MutationError::Remote(_)));
        assert!(store.document(&path::playlist(&id)).is_some());
    }

    #[tokio::test]
    async fn deleting_missing_playlist_reports_not_found() {
        let store = MemoryStore::new();
        let id = create_playlist(&store, &user("a@x.com"), "Road Trip").await.unwrap();
        delete_playlist(&store, &id).await.unwrap();
        let before = store.writes();

        let err = delete_playlist(&store, &id).await.unwrap_err();

        assert!(matches!(err, MutationError::NotFound(_)));
        assert_eq!(store.writes(), before);
    }

    #[test]
    fn recently_played_is_capped_and_ordered() {
        let mut playlists = Vec::new();
        for day in 1..=7 {
            playlists.push(Playlist {
                id: format!("p{day}"),
                last_played: Some(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
                ..Default::default()
            });
        }
        playlists.push(named("Never"));
        let mut collection = PlaylistCollection::default();
        collection.replace(playlists);

        let ids: Vec<String> = collection.recently_played().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["p7", "p6", "p5", "p4", "p3"]);
    }
}
