use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use rusqlite::{params, Connection};

/// Mirror the contents of `music_dir` into the catalog table and return how
/// many rows were added. The directory is created when missing, entries that
/// are not regular files are skipped, and filenames already present are left
/// alone, so running the sync repeatedly over an unchanged directory is a
/// no-op. Rows are never deleted: a file removed from disk leaves its catalog
/// entry behind.
///
/// Filenames are inserted in sorted order so the catalog's insertion order
/// (which `fetch_all_songs` reports) does not depend on how the OS happens to
/// enumerate the directory.
pub fn sync_catalog(conn: &Connection, music_dir: &Path) -> Result<usize> {
    fs::create_dir_all(music_dir).context("failed to create music directory")?;

    let mut filenames = Vec::new();
    for entry in fs::read_dir(music_dir).context("failed to read music directory")? {
        let entry = entry.context("failed to read directory entry")?;
        let file_type = entry.file_type().context("failed to stat directory entry")?;
        if !file_type.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            filenames.push(name);
        }
    }
    filenames.sort();

    let mut added = 0;
    for filename in filenames {
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO songs (filename) VALUES (?1)",
                params![filename],
            )
            .context("failed to insert catalog row")?;
        if inserted > 0 {
            info!("added '{}' to the catalog", filename);
            added += 1;
        }
    }

    Ok(added)
}

/// Every catalog filename in insertion order. This is the library view the
/// songs screen renders from.
pub fn fetch_all_songs(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT filename FROM songs ORDER BY id")
        .context("failed to prepare catalog query")?;

    let songs = stmt
        .query_map([], |row| row.get(0))
        .context("failed to iterate catalog rows")?
        .collect::<Result<Vec<String>, _>>()
        .context("failed to collect catalog rows")?;

    Ok(songs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use std::fs::File;

    #[test]
    fn sync_creates_missing_directory_and_finds_nothing() {
        let conn = test_connection();
        let dir = tempfile::tempdir().unwrap();
        let music = dir.path().join("Songs");

        let added = sync_catalog(&conn, &music).unwrap();
        assert_eq!(added, 0);
        assert!(music.is_dir());
    }

    #[test]
    fn sync_is_idempotent_over_an_unchanged_directory() {
        let conn = test_connection();
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("B, Y.mp3")).unwrap();
        File::create(dir.path().join("A, X.mp3")).unwrap();

        assert_eq!(sync_catalog(&conn, dir.path()).unwrap(), 2);
        assert_eq!(sync_catalog(&conn, dir.path()).unwrap(), 0);
        assert_eq!(
            fetch_all_songs(&conn).unwrap(),
            vec!["A, X.mp3".to_string(), "B, Y.mp3".to_string()]
        );
    }

    #[test]
    fn sync_picks_up_new_files_and_keeps_stale_rows() {
        let conn = test_connection();
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("A, X.mp3");
        File::create(&first).unwrap();
        sync_catalog(&conn, dir.path()).unwrap();

        fs::remove_file(&first).unwrap();
        File::create(dir.path().join("B, Y.mp3")).unwrap();
        assert_eq!(sync_catalog(&conn, dir.path()).unwrap(), 1);

        // The deleted file's row survives; the catalog only grows.
        assert_eq!(
            fetch_all_songs(&conn).unwrap(),
            vec!["A, X.mp3".to_string(), "B, Y.mp3".to_string()]
        );
    }

    #[test]
    fn sync_skips_subdirectories() {
        let conn = test_connection();
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("covers")).unwrap();
        File::create(dir.path().join("A, X.mp3")).unwrap();

        assert_eq!(sync_catalog(&conn, dir.path()).unwrap(), 1);
        assert_eq!(fetch_all_songs(&conn).unwrap(), vec!["A, X.mp3".to_string()]);
    }
}
