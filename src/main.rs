//! Binary entry point that glues the SQLite-backed stores to the TUI. The
//! bootstrapping pipeline: initialize logging, bring up the database, pick an
//! audio backend, and drive the Ratatui event loop until the user exits.
use log::warn;
use mixtape_manager::{
    ensure_schema, music_dir, run_app, App, AudioPlayer, LoftyTagReader, NullPlayer, RodioPlayer,
};

/// Initialize persistence and audio, then launch the Ratatui event loop.
///
/// Returning a `Result` bubbles fatal initialization problems (an unwritable
/// home directory, a corrupt database file) to the terminal instead of
/// crashing silently. A missing audio device is not fatal: the app falls back
/// to a silent player so the library and playlists remain usable.
fn main() -> anyhow::Result<()> {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Info);
    clog.init();

    let conn = ensure_schema()?;
    let music_dir = music_dir()?;

    let player: Box<dyn AudioPlayer> = match RodioPlayer::new() {
        Ok(player) => Box::new(player),
        Err(err) => {
            warn!("no audio output available, playback disabled: {}", err);
            Box::new(NullPlayer)
        }
    };

    let mut app = App::new(conn, music_dir, player, Box::new(LoftyTagReader));
    run_app(&mut app)
}
