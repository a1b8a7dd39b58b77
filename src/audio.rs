//! Narrow capability traits around the native audio collaborators, plus the
//! production implementations. The stores and the TUI only ever see the
//! traits, so everything above this module can be exercised with fakes and
//! never touches a sound device or a codec directly.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use lofty::file::AudioFile;
use log::warn;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};

/// Reads playback length out of an audio file's properties.
pub trait TagReader {
    /// Duration of the file at `path`, or `None` when the file is missing or
    /// its properties cannot be parsed. Implementations must not fail loudly;
    /// an unreadable file only costs the caller its timing info.
    fn duration(&self, path: &Path) -> Option<Duration>;
}

/// `TagReader` backed by lofty's format probing.
pub struct LoftyTagReader;

impl TagReader for LoftyTagReader {
    fn duration(&self, path: &Path) -> Option<Duration> {
        match lofty::read_from_path(path) {
            Ok(tagged_file) => Some(tagged_file.properties().duration()),
            Err(err) => {
                warn!("failed to read audio properties from {:?}: {}", path, err);
                None
            }
        }
    }
}

/// Fire-and-forget playback. `play` replaces whatever is currently sounding;
/// completion is never awaited or reported back.
pub trait AudioPlayer {
    fn play(&mut self, path: &Path) -> Result<()>;
    fn stop(&mut self);
}

/// Playback through rodio. The output stream must stay alive for the lifetime
/// of the player; a fresh sink is created per track.
pub struct RodioPlayer {
    stream: OutputStream,
    sink: Option<Sink>,
}

impl RodioPlayer {
    pub fn new() -> Result<Self> {
        let stream = OutputStreamBuilder::open_default_stream()
            .context("failed to open default audio output")?;
        Ok(Self { stream, sink: None })
    }
}

impl AudioPlayer for RodioPlayer {
    fn play(&mut self, path: &Path) -> Result<()> {
        self.stop();

        let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
        let decoder =
            Decoder::new(BufReader::new(file)).with_context(|| format!("cannot decode {:?}", path))?;

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(decoder);
        sink.play();
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

/// Stand-in player used when no audio device can be opened (headless boxes,
/// CI). Every command succeeds and nothing sounds.
pub struct NullPlayer;

impl AudioPlayer for NullPlayer {
    fn play(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lofty_reader_returns_none_for_missing_file() {
        let reader = LoftyTagReader;
        assert_eq!(reader.duration(Path::new("Songs/does-not-exist.mp3")), None);
    }

    #[test]
    fn null_player_accepts_any_path() {
        let mut player = NullPlayer;
        assert!(player.play(Path::new("nowhere.mp3")).is_ok());
        player.stop();
    }
}
