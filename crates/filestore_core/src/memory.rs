//! In-memory storage backend for testing.

use crate::address::PathAddress;
use crate::backend::StorageBackend;
use crate::content_type::{ContentTypeGuesser, ExtensionGuesser};
use crate::error::StorageResult;
use crate::stored::{StoredArtifact, StoredInfo};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Entry {
    content: Vec<u8>,
    content_type: String,
}

/// An in-memory storage backend.
///
/// Files are kept in a map keyed by complete path. The content type is guessed
/// once, at write time. Suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral storage that doesn't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use filestore_core::{InMemoryBackend, PathAddress, StorageBackend};
///
/// let backend = InMemoryBackend::new();
/// let addr = PathAddress::new("docs", "a.txt").unwrap();
/// backend.write(&addr, b"hello").unwrap();
/// assert!(backend.exists(&addr).unwrap());
/// assert_eq!(backend.paths(), vec!["docs/a.txt".to_string()]);
/// ```
pub struct InMemoryBackend {
    files: RwLock<BTreeMap<String, Entry>>,
    guesser: Arc<dyn ContentTypeGuesser>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::with_guesser(Arc::new(ExtensionGuesser::new()))
    }

    /// Creates an empty backend that asks `guesser` for content types.
    #[must_use]
    pub fn with_guesser(guesser: Arc<dyn ContentTypeGuesser>) -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
            guesser,
        }
    }

    /// Returns the complete paths of all stored files, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.files.read().keys().cloned().collect()
    }

    /// Returns the number of stored files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Returns true if no files are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    /// Removes every file.
    pub fn clear(&self) {
        self.files.write().clear();
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("files", &self.len())
            .finish_non_exhaustive()
    }
}

impl StorageBackend for InMemoryBackend {
    fn write(&self, address: &PathAddress, content: &[u8]) -> StorageResult<()> {
        let key = address.complete_path();
        let mut files = self.files.write();
        if files.contains_key(&key) {
            return Err(address.already_exists());
        }
        let entry = Entry {
            content: content.to_vec(),
            content_type: self.guesser.guess(address.filename()),
        };
        files.insert(key, entry);
        Ok(())
    }

    fn read(&self, address: &PathAddress) -> StorageResult<Option<StoredArtifact>> {
        let files = self.files.read();
        Ok(files.get(&address.complete_path()).map(|entry| {
            let info = StoredInfo::new(address, entry.content.len() as u64, &entry.content_type);
            StoredArtifact::new(entry.content.clone(), info)
        }))
    }

    fn stat(&self, address: &PathAddress) -> StorageResult<Option<StoredInfo>> {
        let files = self.files.read();
        Ok(files
            .get(&address.complete_path())
            .map(|entry| StoredInfo::new(address, entry.content.len() as u64, &entry.content_type)))
    }

    fn exists(&self, address: &PathAddress) -> StorageResult<bool> {
        Ok(self.files.read().contains_key(&address.complete_path()))
    }

    fn delete(&self, address: &PathAddress) -> StorageResult<()> {
        match self.files.write().remove(&address.complete_path()) {
            Some(_) => Ok(()),
            None => Err(address.not_found()),
        }
    }
}
