use chrono::{DateTime, Local, Utc};

use super::value::{Document, Fields};
use crate::fields;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    /// Denormalized copy of the songs sub-collection size. Can drift.
    pub song_count: i64,
    pub created_by: String,
    pub contributors: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_played: Option<DateTime<Utc>>,
}

impl Playlist {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id().to_string(),
            name: doc.str_field("name").unwrap_or_default().to_string(),
            song_count: doc.int_field("songs").unwrap_or(0),
            created_by: doc.str_field("createdBy").unwrap_or_default().to_string(),
            contributors: doc.string_array_field("contributors"),
            created_at: doc.timestamp_field("createdAt").or(doc.created_at),
            last_played: doc.timestamp_field("lastPlayed"),
        }
    }

    /// Fields for a brand new playlist owned by `creator_email`.
    pub fn new_fields(name: &str, creator_email: &str, now: DateTime<Utc>) -> Fields {
        fields! {
            "name" => name,
            "songs" => 0i64,
            "createdBy" => creator_email,
            "contributors" => vec![creator_email.to_string()],
            "createdAt" => now,
            "lastPlayed" => None::<DateTime<Utc>>,
        }
    }

    pub fn song_count_label(&self) -> String {
        if self.song_count == 1 {
            "1 song".to_string()
        } else {
            format!("{} songs", self.song_count)
        }
    }

    pub fn last_played_label(&self) -> Option<String> {
        self.last_played
            .map(|at| at.with_timezone(&Local).format("%b %-d, %H:%M").to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub url: String,
    pub added_by: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Song {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id().to_string(),
            title: doc.str_field("title").unwrap_or_default().to_string(),
            artist: doc.str_field("artist").unwrap_or_default().to_string(),
            url: doc.str_field("url").unwrap_or_default().to_string(),
            added_by: doc.str_field("addedBy").unwrap_or_default().to_string(),
            created_at: doc.timestamp_field("createdAt").or(doc.created_at),
        }
    }
}

/// Input for a song that has not been written yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SongDraft {
    pub title: String,
    pub artist: String,
    pub url: String,
}

impl SongDraft {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            url: url.into(),
        }
    }

    pub fn into_fields(self, added_by: &str, now: DateTime<Utc>) -> Fields {
        fields! {
            "title" => self.title,
            "artist" => self.artist,
            "url" => self.url,
            "addedBy" => added_by,
            "createdAt" => now,
        }
    }
}

/// Entry in the user directory, written at sign-up.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirectoryUser {
    pub uid: String,
    pub email: String,
    pub name: String,
}

impl DirectoryUser {
    pub fn into_fields(self, now: DateTime<Utc>) -> Fields {
        fields! {
            "email" => self.email,
            "name" => self.name,
            "createdAt" => now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::path;
    use chrono::TimeZone;

    #[test]
    fn new_playlist_lists_creator_as_contributor() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let doc = Document::new(
            path::playlist("p1"),
            Playlist::new_fields("Road Trip", "creator@x.com", now),
        );
        let playlist = Playlist::from_document(&doc);

        assert_eq!(playlist.id, "p1");
        assert_eq!(playlist.name, "Road Trip");
        assert_eq!(playlist.song_count, 0);
        assert_eq!(playlist.contributors, vec!["creator@x.com"]);
        assert_eq!(playlist.created_at, Some(now));
        assert_eq!(playlist.last_played, None);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let doc = Document::new(path::song("p1", "s1"), Fields::new());
        let song = Song::from_document(&doc);
        assert_eq!(song.id, "s1");
        assert!(song.title.is_empty());
        assert!(song.url.is_empty());
    }

    #[test]
    fn song_count_label_is_singular_for_one() {
        let mut playlist = Playlist {
            song_count: 1,
            ..Default::default()
        };
        assert_eq!(playlist.song_count_label(), "1 song");
        playlist.song_count = 4;
        assert_eq!(playlist.song_count_label(), "4 songs");
    }

    #[test]
    fn last_played_label_only_for_played_playlists() {
        let mut playlist = Playlist::default();
        assert_eq!(playlist.last_played_label(), None);

        playlist.last_played = Some(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());
        let label = playlist.last_played_label().unwrap();
        assert!(label.starts_with("Mar 1"), "{label}");
    }
}
