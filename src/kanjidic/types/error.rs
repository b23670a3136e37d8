//! Custom error types for the kanjidic-reader crate.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum KanjidicError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `open` was called while a dictionary is already loaded.
    #[error("Kanjidic already open (close it first to reload it, or expand it to extend it)")]
    AlreadyOpen,

    /// An operation needing loaded entries was called on a closed dictionary.
    #[error("Kanjidic is not open (load a dictionary with open first)")]
    NotOpen,

    /// The file content is not valid in the requested text encoding.
    #[error("Failed to decode {} as {encoding}", path.display())]
    Decoding {
        path: PathBuf,
        encoding: &'static str,
    },

    /// The element pattern built from the code catalogs did not compile.
    #[error("Invalid element pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The element pattern and the code table disagree. This is a programming
    /// error, never a data error.
    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),
}

/// A convenience `Result` type alias using the crate's `KanjidicError` type.
pub type Result<T> = std::result::Result<T, KanjidicError>;
