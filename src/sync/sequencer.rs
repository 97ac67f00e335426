//! "Now playing" pointer over a playlist's songs, driving one shared media element.

use tracing::debug;

use crate::api::Song;

/// The platform audio element. Implementations must tolerate calls in any order.
pub trait MediaElement {
    fn load(&mut self, url: &str);
    fn play(&mut self);
    fn pause(&mut self);
    /// Pauses and detaches the current source.
    fn stop(&mut self);
}

pub struct Sequencer {
    media: Box<dyn MediaElement>,
    current: Option<Song>,
    playing: bool,
}

impl Sequencer {
    pub fn new(media: Box<dyn MediaElement>) -> Self {
        Self {
            media,
            current: None,
            playing: false,
        }
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_current(&self, song_id: &str) -> bool {
        self.current.as_ref().is_some_and(|s| s.id == song_id)
    }

    pub fn select(&mut self, song: Song) {
        debug!(song_id = %song.id, title = %song.title, "Selecting song");
        self.media.load(&song.url);
        self.media.play();
        self.current = Some(song);
        self.playing = true;
    }

    pub fn toggle_play_pause(&mut self) {
        if self.current.is_none() {
            return;
        }
        if self.playing {
            self.media.pause();
        } else {
            self.media.play();
        }
        self.playing = !self.playing;
    }

    pub fn next(&mut self, songs: &[Song]) {
        if let Some(song) = self.neighbour(songs, Step::Forward) {
            self.select(song);
        }
    }

    pub fn previous(&mut self, songs: &[Song]) {
        if let Some(song) = self.neighbour(songs, Step::Back) {
            self.select(song);
        }
    }

    /// Natural end of track: advance, wrapping back to the first song.
    pub fn on_ended(&mut self, songs: &[Song]) {
        self.next(songs);
    }

    pub fn clear(&mut self) {
        self.media.stop();
        self.current = None;
        self.playing = false;
    }

    // The index is looked up by id on every call so list edits never leave it stale.
    fn neighbour(&self, songs: &[Song], step: Step) -> Option<Song> {
        let current = self.current.as_ref()?;
        if songs.is_empty() {
            return None;
        }
        let len = songs.len();
        let index = match songs.iter().position(|s| s.id == current.id) {
            Some(index) => match step {
                Step::Forward => (index + 1) % len,
                Step::Back => (index + len - 1) % len,
            },
            // Current song was removed from the list.
            None => match step {
                Step::Forward => 0,
                Step::Back => len - 1,
            },
        };
        songs.get(index).cloned()
    }
}

#[derive(Clone, Copy)]
enum Step {
    Forward,
    Back,
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingMedia;
    use super::*;

    fn song(id: &str) -> Song {
        Song {
            id: id.to_string(),
            title: format!("Song {id}"),
            artist: "Artist".to_string(),
            url: format!("https://x/{id}.mp3"),
            ..Default::default()
        }
    }

    fn sequencer() -> (Sequencer, RecordingMedia) {
        let media = RecordingMedia::default();
        (Sequencer::new(Box::new(media.clone())), media)
    }

    fn current_id(seq: &Sequencer) -> Option<String> {
        seq.current_song().map(|s| s.id.clone())
    }

    #[test]
    fn select_loads_and_plays() {
        let (mut seq, media) = sequencer();
        seq.select(song("a"));
        assert_eq!(media.calls(), vec!["load https://x/a.mp3", "play"]);
        assert!(seq.is_playing());
        assert_eq!(current_id(&seq).as_deref(), Some("a"));
    }

    #[test]
    fn next_and_previous_wrap_in_both_directions() {
        let songs = vec![song("a"), song("b"), song("c")];
        let (mut seq, _) = sequencer();

        seq.select(songs[2].clone());
        seq.next(&songs);
        assert_eq!(current_id(&seq).as_deref(), Some("a"));

        seq.previous(&songs);
        assert_eq!(current_id(&seq).as_deref(), Some("c"));
    }

    #[test]
    fn next_then_previous_returns_to_start_for_every_index() {
        let songs = vec![song("a"), song("b"), song("c"), song("d")];
        for start in &songs {
            let (mut seq, _) = sequencer();
            seq.select(start.clone());
            seq.next(&songs);
            seq.previous(&songs);
            assert_eq!(current_id(&seq), Some(start.id.clone()));

            seq.previous(&songs);
            seq.next(&songs);
            assert_eq!(current_id(&seq), Some(start.id.clone()));
        }
    }

    #[test]
    fn navigation_without_selection_is_a_noop() {
        let songs = vec![song("a")];
        let (mut seq, media) = sequencer();
        seq.next(&songs);
        seq.previous(&songs);
        seq.toggle_play_pause();
        assert!(seq.current_song().is_none());
        assert!(media.calls().is_empty());
    }

    #[test]
    fn navigation_over_empty_list_keeps_current_song() {
        let (mut seq, _) = sequencer();
        seq.select(song("a"));
        seq.next(&[]);
        seq.previous(&[]);
        assert_eq!(current_id(&seq).as_deref(), Some("a"));
    }

    #[test]
    fn single_song_list_wraps_onto_itself() {
        let songs = vec![song("a")];
        let (mut seq, media) = sequencer();
        seq.select(songs[0].clone());
        seq.next(&songs);
        assert_eq!(current_id(&seq).as_deref(), Some("a"));
        assert_eq!(media.calls().iter().filter(|c| *c == "play").count(), 2);
    }

    #[test]
    fn index_is_recomputed_after_list_changes() {
        let (mut seq, _) = sequencer();
        seq.select(song("c"));

        // "a" and "b" were deleted elsewhere, "d" was appended.
        let songs = vec![song("c"), song("d")];
        seq.next(&songs);
        assert_eq!(current_id(&seq).as_deref(), Some("d"));
    }

    #[test]
    fn removed_current_song_falls_back_to_list_ends() {
        let songs = vec![song("a"), song("b"), song("c")];
        let (mut seq, _) = sequencer();

        seq.select(song("gone"));
        seq.next(&songs);
        assert_eq!(current_id(&seq).as_deref(), Some("a"));

        seq.select(song("gone"));
        seq.previous(&songs);
        assert_eq!(current_id(&seq).as_deref(), Some("c"));
    }

    #[test]
    fn toggle_pauses_and_resumes_same_song() {
        let (mut seq, media) = sequencer();
        seq.select(song("a"));
        seq.toggle_play_pause();
        assert!(!seq.is_playing());
        assert_eq!(media.last().as_deref(), Some("pause"));

        seq.toggle_play_pause();
        assert!(seq.is_playing());
        assert_eq!(media.last().as_deref(), Some("play"));
        assert_eq!(current_id(&seq).as_deref(), Some("a"));
    }

    #[test]
    fn ended_advances_through_the_list() {
        let songs = vec![song("a"), song("b")];
        let (mut seq, _) = sequencer();
        seq.select(songs[0].clone());
        seq.on_ended(&songs);
        assert_eq!(current_id(&seq).as_deref(), Some("b"));
        seq.on_ended(&songs);
        assert_eq!(current_id(&seq).as_deref(), Some("a"));
    }

    #[test]
    fn clear_stops_media_and_resets_state() {
        let (mut seq, media) = sequencer();
        seq.select(song("a"));
        seq.clear();
        assert!(seq.current_song().is_none());
        assert!(!seq.is_playing());
        assert_eq!(media.last().as_deref(), Some("stop"));
    }
}
