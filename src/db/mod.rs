//! Persistence module split across logical submodules.

mod catalog;
mod connection;
mod error;
mod playlists;
mod users;

pub use catalog::{fetch_all_songs, sync_catalog};
pub use connection::{apply_schema, ensure_schema, music_dir};
pub use error::StoreError;
pub use playlists::{
    add_songs_to_playlist, create_playlist, fetch_playlist, fetch_playlists_for_user,
    remove_playlist, replace_playlist_songs,
};
pub use users::{hash_password, login, signup};

/// In-memory database with the production schema applied, for store tests.
#[cfg(test)]
pub(crate) fn test_connection() -> rusqlite::Connection {
    let conn = rusqlite::Connection::open_in_memory().expect("in-memory database");
    apply_schema(&conn).expect("schema");
    conn
}
