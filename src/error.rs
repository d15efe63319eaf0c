//! Error types for coordrill

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("session duration must be between {min} and {max} seconds, got {secs}")]
    InvalidDuration { secs: u64, min: u64, max: u64 },

    #[error("board size must be between 1 and 26, got {0}")]
    InvalidBoardSize(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid statistics file: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("invalid statistics file format: missing {0}")]
    MissingField(&'static str),

    #[error("invalid statistics file format: {field} has {found} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("there are no statistics to save yet, play some games first")]
    NothingToSave,
}

pub type Result<T> = std::result::Result<T, Error>;
