//! Error types for the console shell

use thiserror::Error;

/// Errors from parsing a command line typed into the shell
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    /// First word is not a known command
    #[error("Unknown command: {0} (type 'help' for a list)")]
    Unknown(String),

    /// Missing or extra arguments
    #[error("Usage: {0}")]
    Usage(&'static str),

    /// Argument present but not parseable
    #[error("Invalid {name}: '{value}'")]
    InvalidArgument { name: &'static str, value: String },
}
