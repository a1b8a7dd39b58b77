//! Domain types shared between the persistence layer and the TUI. These stay
//! light-weight data holders so the other layers can focus on queries and
//! presentation; the only logic living here is the filename-parsing
//! convention that stands in for real tag metadata.

use std::path::Path;
use std::time::Duration;

use crate::audio::TagReader;

/// The authenticated user for the running process. Returned by a successful
/// login and carried explicitly through the UI instead of living in a global,
/// so every store call that needs identity receives it as an argument.
#[derive(Debug, Clone)]
pub struct Session {
    username: String,
}

impl Session {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Display metadata for one catalog entry. There is no structured song table
/// behind this: the filename is the primary key everywhere, and by convention
/// it reads `"<Title>, <Artist>.mp3"`, so title and artist are recovered by
/// splitting on the first comma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongDetails {
    pub title: String,
    pub artist: String,
    /// Human-readable playback length, e.g. `3 minutes 45 seconds`. `None`
    /// when the file is missing or its audio properties cannot be read.
    pub duration: Option<String>,
}

impl SongDetails {
    /// Parse title and artist out of a catalog filename. No comma means the
    /// whole filename is the title and the artist falls back to `Unknown`.
    /// A literal `.mp3` suffix is stripped from the artist half only; the
    /// title half is shown as stored.
    pub fn from_filename(filename: &str) -> Self {
        let (title, artist) = match filename.split_once(',') {
            Some((title, artist)) => {
                let artist = artist.trim_end_matches(".mp3").trim();
                (title.trim(), artist)
            }
            None => (filename.trim(), "Unknown"),
        };

        Self {
            title: title.to_string(),
            artist: if artist.is_empty() {
                "Unknown".to_string()
            } else {
                artist.to_string()
            },
            duration: None,
        }
    }

    /// Parse the filename and additionally ask `reader` for the playback
    /// length of the file under `music_dir`. Duration lookup is best-effort:
    /// a missing or unreadable file leaves it `None` and the details still
    /// render.
    pub fn probe(reader: &dyn TagReader, music_dir: &Path, filename: &str) -> Self {
        let mut details = Self::from_filename(filename);
        details.duration = reader
            .duration(&music_dir.join(filename))
            .map(format_duration);
        details
    }
}

/// Render a duration as `<minutes> minutes <seconds> seconds`, truncating
/// fractional seconds rather than rounding.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{} minutes {} seconds", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedReader(Option<Duration>);

    impl TagReader for FixedReader {
        fn duration(&self, _path: &Path) -> Option<Duration> {
            self.0
        }
    }

    #[test]
    fn parses_title_and_artist_from_convention() {
        let details = SongDetails::from_filename("Song Title, Artist Name.mp3");
        assert_eq!(details.title, "Song Title");
        assert_eq!(details.artist, "Artist Name");
        assert_eq!(details.duration, None);
    }

    #[test]
    fn filename_without_comma_is_all_title() {
        let details = SongDetails::from_filename("NoCommaHere.mp3");
        assert_eq!(details.title, "NoCommaHere.mp3");
        assert_eq!(details.artist, "Unknown");
    }

    #[test]
    fn splits_on_first_comma_only() {
        let details = SongDetails::from_filename("Hey, Me, Myself.mp3");
        assert_eq!(details.title, "Hey");
        assert_eq!(details.artist, "Me, Myself");
    }

    #[test]
    fn probe_formats_duration_when_reader_succeeds() {
        let reader = FixedReader(Some(Duration::from_secs_f64(225.9)));
        let details = SongDetails::probe(&reader, Path::new("Songs"), "A, B.mp3");
        assert_eq!(details.duration.as_deref(), Some("3 minutes 45 seconds"));
    }

    #[test]
    fn probe_leaves_duration_unset_when_reader_fails() {
        let reader = FixedReader(None);
        let details = SongDetails::probe(&reader, Path::new("Songs"), "A, B.mp3");
        assert_eq!(details.duration, None);
    }

    #[test]
    fn duration_components_truncate() {
        assert_eq!(
            format_duration(Duration::from_secs(125)),
            "2 minutes 5 seconds"
        );
        assert_eq!(
            format_duration(Duration::from_secs(59)),
            "0 minutes 59 seconds"
        );
    }
}
