//! Core library surface for the Mixtape Manager TUI application.
//!
//! The public modules exposed here keep the API intentionally small: the `bin`
//! target and any external tooling get the persistence layer, the audio
//! capability traits, and the interactive app without reaching into
//! submodules.
pub mod audio;
pub mod db;
pub mod models;
pub mod ui;

/// Convenience re-exports for the persistence layer, typically used by
/// `main.rs` to bring up the embedded SQLite store.
pub use db::{ensure_schema, music_dir, sync_catalog};

/// The audio collaborators injected into the app.
pub use audio::{AudioPlayer, LoftyTagReader, NullPlayer, RodioPlayer, TagReader};

/// The primary domain types other layers manipulate.
pub use models::{Session, SongDetails};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
