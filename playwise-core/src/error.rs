//! Common error types for PlayWise
//!
//! Containers report routine misuse (bad index, empty container) through
//! `bool`/`Option` returns. This type carries the cases where a caller needs
//! to know *why* something was rejected.

use thiserror::Error;

/// Common result type for PlayWise operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the core library and the CLI
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML configuration
    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Requested track or resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Track failed the validity predicate (empty id/title/artist or zero duration)
    #[error("Invalid track: {0}")]
    InvalidTrack(String),

    /// A track with this identifier already exists
    #[error("Duplicate track id: {0}")]
    DuplicateId(String),

    /// Another track already uses this title + artist combination
    #[error("Duplicate track: '{title}' by '{artist}' already exists as {existing_id}")]
    DuplicateTrack {
        title: String,
        artist: String,
        existing_id: String,
    },

    /// Rating outside the 1-5 star range
    #[error("Invalid rating: {0} (expected 1-5)")]
    InvalidRating(u8),

    /// Snapshot line that could not be parsed
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}
