//! Test fixtures and storage helpers.
//!
//! Provides convenience functions for setting up storages over memory and
//! temporary-directory backends.

use filestore_core::{DiskBackend, InMemoryBackend, Storage};
use std::path::Path;
use tempfile::TempDir;

/// A disk-backed storage with automatic cleanup.
pub struct TestDiskStorage {
    /// The storage instance.
    pub storage: Storage<DiskBackend>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestDiskStorage {
    /// Creates a storage over a fresh temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let backend = DiskBackend::open_dir(temp_dir.path()).expect("Failed to open disk backend");

        Self {
            storage: Storage::new(backend),
            _temp_dir: temp_dir,
        }
    }

    /// Returns the storage root directory.
    pub fn root(&self) -> &Path {
        self.storage.backend().root()
    }
}

impl Default for TestDiskStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestDiskStorage {
    type Target = Storage<DiskBackend>;

    fn deref(&self) -> &Self::Target {
        &self.storage
    }
}

/// Creates a storage over an empty in-memory backend.
pub fn memory_storage() -> Storage<InMemoryBackend> {
    Storage::new(InMemoryBackend::new())
}

/// Runs a test with a fresh in-memory storage.
///
/// # Example
///
/// ```rust
/// use filestore_testkit::with_memory_storage;
///
/// with_memory_storage(|storage| {
///     assert!(!storage.exists_at("nothing.txt").unwrap());
/// });
/// ```
pub fn with_memory_storage<F, R>(f: F) -> R
where
    F: FnOnce(&Storage<InMemoryBackend>) -> R,
{
    let storage = memory_storage();
    f(&storage)
}

/// Runs a test with a fresh disk storage; the closure also receives the
/// root directory.
pub fn with_disk_storage<F, R>(f: F) -> R
where
    F: FnOnce(&Storage<DiskBackend>, &Path) -> R,
{
    let test_storage = TestDiskStorage::new();
    f(&test_storage.storage, test_storage.root())
}

/// Creates `n` distinct payloads of the form `payload-<i>`.
pub fn payloads(n: usize) -> Vec<Vec<u8>> {
    (0..n).map(|i| format!("payload-{i}").into_bytes()).collect()
}
