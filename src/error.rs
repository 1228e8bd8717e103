//! Error type shared by the library.

use std::io;

/// Errors produced while decoding payloads or touching the filesystem.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed message payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to determine data directory")]
    NoDataDir,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
