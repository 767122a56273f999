//! Error types for storage operations.

use crate::validate::{FilenameViolation, PathViolation};
use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
///
/// [`StorageError::AlreadyExists`] and [`StorageError::NotFound`] carry the
/// normalized path (`""` for the root). Validation errors carry the input
/// that was rejected, as given.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The filename failed validation.
    #[error("invalid filename {filename:?}: {reason}")]
    InvalidFilename {
        /// The rejected filename.
        filename: String,
        /// Why it was rejected.
        reason: FilenameViolation,
    },

    /// The path failed validation.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The rejected path, as given by the caller.
        path: String,
        /// Why it was rejected.
        reason: PathViolation,
    },

    /// A store request carried no bytes.
    #[error("content is required to store {complete_path}")]
    EmptyContent {
        /// The complete path the request targeted.
        complete_path: String,
    },

    /// A file already occupies the target address.
    #[error("file already exists: {filename} in {}", display_path(.path))]
    AlreadyExists {
        /// The filename that collided.
        filename: String,
        /// The normalized path that collided.
        path: String,
    },

    /// No file exists at the target address.
    #[error("file not found: {filename} in {}", display_path(.path))]
    NotFound {
        /// The filename that was looked up.
        filename: String,
        /// The normalized path that was looked up.
        path: String,
    },

    /// The backend failed to read, write or delete.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Returns true if this is an [`StorageError::AlreadyExists`] error.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns true if this is a [`StorageError::NotFound`] error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the caller can fix the error by changing its input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidFilename { .. } | Self::InvalidPath { .. } | Self::EmptyContent { .. }
        )
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "root path"
    } else {
        path
    }
}
