use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for palaver-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the palaver transcript viewer
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// No transcript file found in the chat folder
    #[error("no .txt transcript found in {0}")]
    NoTranscript(PathBuf),

    /// The chat folder path does not point at a directory
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}
