//! # World Error Types
//!
//! Errors surfaced by configuration and whole-world persistence.
//!
//! Per-chunk decode failures have their own type
//! ([`ChunkDecodeError`](crate::chunk::ChunkDecodeError)) because the loader
//! absorbs them record by record instead of failing the whole load.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the world store.
#[derive(Error, Debug)]
pub enum WorldError {
    /// The world file could not be opened, read, or written.
    #[error("world file I/O failed for {}: {source}", path.display())]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The world file ended before the fixed-size header was complete.
    #[error("world file header truncated: {len} bytes, need {need}")]
    TruncatedHeader {
        /// Bytes actually present.
        len: usize,
        /// Header length required.
        need: usize,
    },

    /// The world file header is complete but unusable.
    #[error("world file header corrupt: {0}")]
    CorruptHeader(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl WorldError {
    /// Wraps an I/O error with the path it concerns.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
