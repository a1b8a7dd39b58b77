use std::collections::HashSet;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::error::StoreError;

/// Membership of the first playlist whose name matches, in stored order. The
/// lookup is by name alone: when two owners share a playlist name, the row
/// with the lowest id wins. That first-match behavior is inherited from the
/// system this store replaces and is kept on purpose rather than silently
/// widened to a composite key.
///
/// A playlist that exists but holds no songs returns `Ok` with an empty list;
/// only a missing row is an error.
pub fn fetch_playlist(conn: &Connection, name: &str) -> Result<Vec<String>> {
    let playlist_id: Option<i64> = conn
        .query_row(
            "SELECT id FROM playlists WHERE name = ?1 ORDER BY id LIMIT 1",
            params![name],
            |row| row.get(0),
        )
        .optional()
        .context("failed to look up playlist")?;

    let playlist_id =
        playlist_id.ok_or_else(|| StoreError::PlaylistNotFound(name.to_string()))?;

    fetch_membership(conn, playlist_id)
}

/// Names of every playlist owned by `username`, in creation order. Zero rows
/// surface as an error rather than an empty list; the source system conflated
/// "owns no playlists" with a failed lookup and callers render the message
/// either way, so the conflation is preserved.
pub fn fetch_playlists_for_user(conn: &Connection, username: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM playlists WHERE owner = ?1 ORDER BY id")
        .context("failed to prepare playlist listing")?;

    let names = stmt
        .query_map(params![username], |row| row.get(0))
        .context("failed to iterate playlists")?
        .collect::<Result<Vec<String>, _>>()
        .context("failed to collect playlists")?;

    if names.is_empty() {
        return Err(StoreError::NoPlaylists(username.to_string()).into());
    }

    Ok(names)
}

/// Find the `(name, owner)` playlist or create it empty, returning its id.
/// This is both the "New Playlist" UI action and the implicit creation that
/// happens on the first add to a name the user has not used before.
pub fn create_playlist(conn: &Connection, username: &str, name: &str) -> Result<i64> {
    if let Some(id) = find_playlist(conn, username, name)? {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO playlists (name, owner) VALUES (?1, ?2)",
        params![name, username],
    )
    .context("failed to insert playlist")?;

    Ok(conn.last_insert_rowid())
}

/// Append songs to the `(name, owner=username)` playlist, creating it when
/// absent. Input order is preserved for first occurrences; songs already in
/// the playlist, and repeats within the input itself, are silently dropped.
pub fn add_songs_to_playlist(
    conn: &Connection,
    username: &str,
    name: &str,
    songs: &[String],
) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to begin playlist update")?;

    let playlist_id = create_playlist(conn, username, name)?;

    let mut present: HashSet<String> = fetch_membership(conn, playlist_id)?.into_iter().collect();
    let mut position = next_position(conn, playlist_id)?;

    for song in songs {
        if !present.insert(song.clone()) {
            continue;
        }
        conn.execute(
            "INSERT INTO playlist_songs (playlist_id, filename, position) VALUES (?1, ?2, ?3)",
            params![playlist_id, song, position],
        )
        .context("failed to insert playlist song")?;
        position += 1;
    }

    tx.commit().context("failed to commit playlist update")
}

/// Overwrite the playlist's membership verbatim with `songs`, creating the
/// playlist when absent. Used by the edit flow, whose checkbox selection is
/// already duplicate-free; a repeated input song would simply keep its first
/// position.
pub fn replace_playlist_songs(
    conn: &Connection,
    username: &str,
    name: &str,
    songs: &[String],
) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to begin playlist rewrite")?;

    let playlist_id = create_playlist(conn, username, name)?;

    conn.execute(
        "DELETE FROM playlist_songs WHERE playlist_id = ?1",
        params![playlist_id],
    )
    .context("failed to clear playlist")?;

    for (position, song) in songs.iter().enumerate() {
        conn.execute(
            "INSERT OR IGNORE INTO playlist_songs (playlist_id, filename, position)
             VALUES (?1, ?2, ?3)",
            params![playlist_id, song, position as i64],
        )
        .context("failed to insert playlist song")?;
    }

    tx.commit().context("failed to commit playlist rewrite")
}

/// Delete the `(name, owner=username)` playlist; membership rows cascade.
/// Deleting a playlist that does not exist surfaces the same message as a
/// failed fetch.
pub fn remove_playlist(conn: &Connection, username: &str, name: &str) -> Result<()> {
    let deleted = conn
        .execute(
            "DELETE FROM playlists WHERE name = ?1 AND owner = ?2",
            params![name, username],
        )
        .context("failed to delete playlist")?;

    if deleted == 0 {
        return Err(StoreError::PlaylistNotFound(name.to_string()).into());
    }

    Ok(())
}

/// Membership filenames for a playlist id, ordered by position.
fn fetch_membership(conn: &Connection, playlist_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT filename FROM playlist_songs WHERE playlist_id = ?1 ORDER BY position")
        .context("failed to prepare membership query")?;

    let songs = stmt
        .query_map(params![playlist_id], |row| row.get(0))
        .context("failed to iterate membership")?
        .collect::<Result<Vec<String>, _>>()
        .context("failed to collect membership")?;

    Ok(songs)
}

fn find_playlist(conn: &Connection, username: &str, name: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM playlists WHERE name = ?1 AND owner = ?2 ORDER BY id LIMIT 1",
        params![name, username],
        |row| row.get(0),
    )
    .optional()
    .context("failed to look up playlist by owner")
}

fn next_position(conn: &Connection, playlist_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM playlist_songs WHERE playlist_id = ?1",
        params![playlist_id],
        |row| row.get(0),
    )
    .context("failed to compute next position")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;

    fn list(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn add_appends_in_order_and_drops_duplicates() {
        let conn = test_connection();
        add_songs_to_playlist(&conn, "alice", "L", &list(&["a.mp3", "b.mp3"])).unwrap();
        add_songs_to_playlist(&conn, "alice", "L", &list(&["b.mp3", "c.mp3"])).unwrap();

        assert_eq!(
            fetch_playlist(&conn, "L").unwrap(),
            list(&["a.mp3", "b.mp3", "c.mp3"])
        );
    }

    #[test]
    fn add_deduplicates_within_a_single_batch() {
        let conn = test_connection();
        add_songs_to_playlist(&conn, "alice", "L", &list(&["a.mp3", "a.mp3", "b.mp3"])).unwrap();
        assert_eq!(fetch_playlist(&conn, "L").unwrap(), list(&["a.mp3", "b.mp3"]));
    }

    #[test]
    fn first_add_creates_the_playlist_implicitly() {
        let conn = test_connection();
        add_songs_to_playlist(&conn, "alice", "road trip", &list(&["a.mp3"])).unwrap();
        assert_eq!(
            fetch_playlists_for_user(&conn, "alice").unwrap(),
            list(&["road trip"])
        );
    }

    #[test]
    fn replace_overwrites_verbatim_regardless_of_prior_content() {
        let conn = test_connection();
        add_songs_to_playlist(&conn, "alice", "L", &list(&["a.mp3", "b.mp3", "c.mp3"])).unwrap();
        replace_playlist_songs(&conn, "alice", "L", &list(&["x.mp3"])).unwrap();
        assert_eq!(fetch_playlist(&conn, "L").unwrap(), list(&["x.mp3"]));
    }

    #[test]
    fn replace_can_reorder_existing_membership() {
        let conn = test_connection();
        add_songs_to_playlist(&conn, "alice", "L", &list(&["a.mp3", "b.mp3"])).unwrap();
        replace_playlist_songs(&conn, "alice", "L", &list(&["b.mp3", "a.mp3"])).unwrap();
        assert_eq!(fetch_playlist(&conn, "L").unwrap(), list(&["b.mp3", "a.mp3"]));
    }

    #[test]
    fn remove_then_fetch_reports_not_found() {
        let conn = test_connection();
        add_songs_to_playlist(&conn, "alice", "L", &list(&["a.mp3"])).unwrap();
        remove_playlist(&conn, "alice", "L").unwrap();

        let err = fetch_playlist(&conn, "L").unwrap_err();
        assert_eq!(err.to_string(), "Playlist 'L' not found.");
    }

    #[test]
    fn remove_missing_playlist_reports_not_found() {
        let conn = test_connection();
        let err = remove_playlist(&conn, "alice", "ghost").unwrap_err();
        assert_eq!(err.to_string(), "Playlist 'ghost' not found.");
    }

    #[test]
    fn fetch_by_name_matches_the_oldest_row_across_owners() {
        let conn = test_connection();
        add_songs_to_playlist(&conn, "alice", "shared", &list(&["a.mp3"])).unwrap();
        add_songs_to_playlist(&conn, "bob", "shared", &list(&["b.mp3"])).unwrap();

        // Name-only lookup keeps the source system's first-match semantics.
        assert_eq!(fetch_playlist(&conn, "shared").unwrap(), list(&["a.mp3"]));
    }

    #[test]
    fn listing_a_user_with_no_playlists_is_an_error() {
        let conn = test_connection();
        let err = fetch_playlists_for_user(&conn, "alice").unwrap_err();
        assert_eq!(err.to_string(), "No playlists found for user 'alice'.");
    }

    #[test]
    fn explicit_create_yields_an_empty_fetchable_playlist() {
        let conn = test_connection();
        create_playlist(&conn, "alice", "fresh").unwrap();
        assert!(fetch_playlist(&conn, "fresh").unwrap().is_empty());
        assert_eq!(
            fetch_playlists_for_user(&conn, "alice").unwrap(),
            list(&["fresh"])
        );
    }
}
