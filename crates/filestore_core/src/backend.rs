//! Storage backend trait definition.

use crate::address::PathAddress;
use crate::error::StorageResult;
use crate::stored::{StoredArtifact, StoredInfo};
use std::sync::Arc;

/// A physical store for file bytes.
///
/// Backends are **dumb byte stores** keyed by a [`PathAddress`]. They never
/// validate names and never decide policy - [`crate::Storage`] validates every
/// address, checks for collisions and compensates failed batches before and
/// after calling into the backend.
///
/// # Invariants
///
/// - `write` is only called for addresses `exists` reported free, but a
///   concurrent writer may have claimed the address in between. A backend
///   that detects the collision at commit time must fail with
///   [`crate::StorageError::AlreadyExists`] rather than overwrite.
/// - `read` and `stat` return `Ok(None)` for absent files; absence is not
///   an error.
/// - `delete` fails if nothing exists at the address.
/// - Backends must be `Send + Sync`; the facade may be shared across threads.
///
/// No ordering or transactional guarantee is assumed across calls.
///
/// # Implementors
///
/// - [`crate::InMemoryBackend`] - For testing
/// - [`crate::DiskBackend`] - For files on the local disk
pub trait StorageBackend: Send + Sync {
    /// Writes `content` at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::AlreadyExists`] on a detected
    /// collision, or an I/O error if the write fails.
    fn write(&self, address: &PathAddress, content: &[u8]) -> StorageResult<()>;

    /// Reads the file at `address`, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn read(&self, address: &PathAddress) -> StorageResult<Option<StoredArtifact>>;

    /// Reads only the metadata of the file at `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn stat(&self, address: &PathAddress) -> StorageResult<Option<StoredInfo>>;

    /// Returns true if a file exists at `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn exists(&self, address: &PathAddress) -> StorageResult<bool>;

    /// Deletes the file at `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is absent or cannot be deleted.
    fn delete(&self, address: &PathAddress) -> StorageResult<()>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Arc<B> {
    fn write(&self, address: &PathAddress, content: &[u8]) -> StorageResult<()> {
        (**self).write(address, content)
    }

    fn read(&self, address: &PathAddress) -> StorageResult<Option<StoredArtifact>> {
        (**self).read(address)
    }

    fn stat(&self, address: &PathAddress) -> StorageResult<Option<StoredInfo>> {
        (**self).stat(address)
    }

    fn exists(&self, address: &PathAddress) -> StorageResult<bool> {
        (**self).exists(address)
    }

    fn delete(&self, address: &PathAddress) -> StorageResult<()> {
        (**self).delete(address)
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn write(&self, address: &PathAddress, content: &[u8]) -> StorageResult<()> {
        (**self).write(address, content)
    }

    fn read(&self, address: &PathAddress) -> StorageResult<Option<StoredArtifact>> {
        (**self).read(address)
    }

    fn stat(&self, address: &PathAddress) -> StorageResult<Option<StoredInfo>> {
        (**self).stat(address)
    }

    fn exists(&self, address: &PathAddress) -> StorageResult<bool> {
        (**self).exists(address)
    }

    fn delete(&self, address: &PathAddress) -> StorageResult<()> {
        (**self).delete(address)
    }
}
