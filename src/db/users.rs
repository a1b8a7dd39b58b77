use anyhow::{Context, Result};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use super::error::StoreError;
use crate::models::Session;

/// Hex-encoded SHA-256 digest of the password bytes. Deliberately unsalted to
/// match the system this store replaces, which means two accounts sharing a
/// password share a stored digest. Flagged in DESIGN.md; do not point real
/// credentials at this table.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Register a new account. Rejects duplicate usernames, then creates the
/// user's companion playlist `<username>_playlist` followed by the user row
/// itself.
///
/// The companion playlist is inserted with a NULL owner, exactly like the
/// system this replaces: it can be fetched by name but never shows up in the
/// per-user playlist listing. Preserved quirk, pinned by tests.
pub fn signup(conn: &Connection, username: &str, password: &str) -> Result<()> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM users WHERE username = ?1",
            params![username],
            |_| Ok(()),
        )
        .optional()
        .context("failed to check for existing user")?;

    if exists.is_some() {
        return Err(StoreError::UsernameTaken.into());
    }

    let playlist_name = format!("{username}_playlist");
    conn.execute(
        "INSERT INTO playlists (name, owner) VALUES (?1, NULL)",
        params![playlist_name],
    )
    .context("failed to create signup playlist")?;

    conn.execute(
        "INSERT INTO users (username, password_hash, default_playlist) VALUES (?1, ?2, ?3)",
        params![username, hash_password(password), playlist_name],
    )
    .context("failed to insert user")?;

    info!("created account '{}'", username);
    Ok(())
}

/// Authenticate and return the session for `username`. The unknown-user and
/// wrong-password paths fail with one shared message so the login form cannot
/// be used to probe which accounts exist.
pub fn login(conn: &Connection, username: &str, password: &str) -> Result<Session> {
    if username.is_empty() || password.is_empty() {
        return Err(StoreError::EmptyCredentials.into());
    }

    let stored: Option<String> = conn
        .query_row(
            "SELECT password_hash FROM users WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )
        .optional()
        .context("failed to look up user")?;

    match stored {
        Some(stored) if stored == hash_password(password) => {
            info!("'{}' logged in", username);
            Ok(Session::new(username))
        }
        _ => Err(StoreError::BadCredentials.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fetch_playlist, fetch_playlists_for_user, test_connection};

    #[test]
    fn signup_then_login_yields_session_for_that_user() {
        let conn = test_connection();
        signup(&conn, "alice", "hunter2").unwrap();
        let session = login(&conn, "alice", "hunter2").unwrap();
        assert_eq!(session.username(), "alice");
    }

    #[test]
    fn duplicate_signup_is_rejected() {
        let conn = test_connection();
        signup(&conn, "alice", "hunter2").unwrap();
        let err = signup(&conn, "alice", "other").unwrap_err();
        assert_eq!(err.to_string(), "Username already exists.");
    }

    #[test]
    fn empty_credentials_are_rejected_before_any_lookup() {
        let conn = test_connection();
        let err = login(&conn, "", "pw").unwrap_err();
        assert_eq!(err.to_string(), "Username and password cannot be empty.");
        let err = login(&conn, "alice", "").unwrap_err();
        assert_eq!(err.to_string(), "Username and password cannot be empty.");
    }

    #[test]
    fn wrong_password_and_unknown_user_share_one_message() {
        let conn = test_connection();
        signup(&conn, "alice", "hunter2").unwrap();

        let wrong_password = login(&conn, "alice", "nope").unwrap_err().to_string();
        let unknown_user = login(&conn, "nobody", "nope").unwrap_err().to_string();
        assert_eq!(wrong_password, "Incorrect username or password.");
        assert_eq!(wrong_password, unknown_user);
    }

    #[test]
    fn hashing_is_deterministic_and_input_sensitive() {
        assert_eq!(hash_password("secret"), hash_password("secret"));
        assert_ne!(hash_password("secret"), hash_password("secret "));
    }

    #[test]
    fn signup_playlist_is_fetchable_but_unowned() {
        let conn = test_connection();
        signup(&conn, "alice", "hunter2").unwrap();

        // Reachable by name with an empty membership list...
        let songs = fetch_playlist(&conn, "alice_playlist").unwrap();
        assert!(songs.is_empty());

        // ...but invisible to the per-user listing because its owner is NULL.
        let err = fetch_playlists_for_user(&conn, "alice").unwrap_err();
        assert_eq!(err.to_string(), "No playlists found for user 'alice'.");
    }
}
