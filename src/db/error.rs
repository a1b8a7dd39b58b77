use thiserror::Error;

/// Failures whose messages are shown to the user verbatim in the footer.
/// Keeping them typed (instead of ad-hoc `anyhow!` strings at each call site)
/// pins the exact wording in one place; several of these strings are part of
/// the observable behavior contract and are asserted byte-for-byte in tests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Username already exists.")]
    UsernameTaken,

    #[error("Username and password cannot be empty.")]
    EmptyCredentials,

    /// Shared by the unknown-username and wrong-password paths so a failed
    /// login never reveals which usernames exist.
    #[error("Incorrect username or password.")]
    BadCredentials,

    #[error("Playlist '{0}' not found.")]
    PlaylistNotFound(String),

    /// Also returned when the user exists but owns zero playlists; the
    /// source system never distinguished the two cases and the UI renders
    /// this string either way.
    #[error("No playlists found for user '{0}'.")]
    NoPlaylists(String),
}
