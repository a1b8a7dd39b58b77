use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::Connection;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".mixtape-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";
/// Directory holding the playable audio files, next to the database. File
/// names inside it double as song identifiers throughout the application.
const MUSIC_DIR_NAME: &str = "Songs";

/// Ensure the database file exists, run lazy migrations, and return a live
/// connection. The connection is opened once at startup and owned by the app;
/// everything runs sequentially on one thread, so no pooling is needed.
/// `PRAGMA foreign_keys = ON` is toggled so the membership cascade behaves the
/// same during tests and production runs.
pub fn ensure_schema() -> Result<Connection> {
    let db_path = db_path()?;

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(&db_path).context("failed to open SQLite database")?;
    apply_schema(&conn)?;
    Ok(conn)
}

/// Create the tables on an already-open connection. Split out from
/// `ensure_schema` so tests can run the same migrations against an in-memory
/// database.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            username TEXT PRIMARY KEY,
            password_hash TEXT NOT NULL,
            default_playlist TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create users table")?;

    // owner is intentionally nullable: the companion playlist created at
    // signup carries no owner (see db::users::signup).
    conn.execute(
        "CREATE TABLE IF NOT EXISTS playlists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            owner TEXT
        )",
        [],
    )
    .context("failed to create playlists table")?;

    // Ordered membership. The composite primary key is the real uniqueness
    // guarantee: a song can appear in a playlist at most once. Positions may
    // have gaps; only their relative order matters.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS playlist_songs (
            playlist_id INTEGER NOT NULL,
            filename TEXT NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (playlist_id, filename),
            FOREIGN KEY(playlist_id) REFERENCES playlists(id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create playlist_songs table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT NOT NULL UNIQUE
        )",
        [],
    )
    .context("failed to create songs table")?;

    Ok(())
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(DB_FILE_NAME))
}

/// Resolve the music directory that catalog sync scans and playback reads
/// from. The directory itself is created lazily by `db::catalog::sync_catalog`.
pub fn music_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join(MUSIC_DIR_NAME))
}

fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
