use std::fmt;

pub const PLAYLISTS: &str = "playlists";
pub const SONGS: &str = "songs";
pub const USERS: &str = "users";

/// Slash-separated location of a document or collection.
///
/// An odd number of segments addresses a collection, an even number a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    pub fn parse(path: &str) -> Self {
        Self::from_segments(path.split('/'))
    }

    pub fn collection(name: &str) -> Self {
        Self::from_segments([name])
    }

    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_document(&self) -> bool {
        !self.segments.is_empty() && self.segments.len() % 2 == 0
    }

    /// Path with every segment percent-encoded, for use in request URLs.
    pub fn encoded(&self) -> String {
        self.segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

pub fn playlists() -> DocPath {
    DocPath::collection(PLAYLISTS)
}

pub fn playlist(playlist_id: &str) -> DocPath {
    playlists().child(playlist_id)
}

pub fn songs(playlist_id: &str) -> DocPath {
    playlist(playlist_id).child(SONGS)
}

pub fn song(playlist_id: &str, song_id: &str) -> DocPath {
    songs(playlist_id).child(song_id)
}

pub fn users() -> DocPath {
    DocPath::collection(USERS)
}

pub fn user(uid: &str) -> DocPath {
    users().child(uid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_path_nests_under_playlist() {
        let path = song("p1", "s9");
        assert_eq!(path.to_string(), "playlists/p1/songs/s9");
        assert!(path.is_document());
        assert_eq!(path.id(), "s9");
        assert_eq!(path.parent(), Some(songs("p1")));
        assert!(!songs("p1").is_document());
    }

    #[test]
    fn parse_ignores_empty_segments() {
        assert_eq!(DocPath::parse("/playlists//p1/"), playlist("p1"));
    }

    #[test]
    fn encoded_escapes_reserved_characters() {
        assert_eq!(user("a b").encoded(), "users/a%20b");
    }
}
