//! Error types for the rhythm_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for rhythm_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key-value store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// No sample or custom playlist has this id
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    /// Attempted to modify a built-in sample playlist
    #[error("Playlist {0} is a read-only sample; copy it with `new --from` first")]
    ReadOnlyPlaylist(String),

    /// Playlist failed validation and was not saved
    #[error("Playlist failed validation: {}", .0.join(", "))]
    InvalidPlaylist(Vec<String>),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
