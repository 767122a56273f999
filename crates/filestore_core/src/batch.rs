//! Deferred batches and purgeable references.

use crate::address::StoreRequest;
use crate::error::StorageResult;

/// Anything that references stored files by full path.
///
/// Implemented by caller entities (an invoice with attachments, a user with
/// an avatar) so they can be handed to [`crate::Storage::purge`].
pub trait Purgeable {
    /// The full paths of the files this value references.
    fn stored_paths(&self) -> Vec<String>;
}

impl Purgeable for str {
    fn stored_paths(&self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl Purgeable for String {
    fn stored_paths(&self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<T: Purgeable> Purgeable for [T] {
    fn stored_paths(&self) -> Vec<String> {
        self.iter().flat_map(Purgeable::stored_paths).collect()
    }
}

impl<T: Purgeable> Purgeable for Vec<T> {
    fn stored_paths(&self) -> Vec<String> {
        self.as_slice().stored_paths()
    }
}

impl<T: Purgeable + ?Sized> Purgeable for &T {
    fn stored_paths(&self) -> Vec<String> {
        (**self).stored_paths()
    }
}

/// Pending stores and removals, committed together by
/// [`crate::Storage::commit`].
///
/// Every store is validated when it is queued, so a batch that builds
/// without error only fails at commit time for collisions or I/O.
#[derive(Debug, Clone, Default)]
pub struct StorageBatch {
    stores: Vec<StoreRequest>,
    removals: Vec<String>,
}

impl StorageBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a store and returns the complete path it will occupy.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the address or content is invalid.
    pub fn store(
        &mut self,
        content: impl Into<Vec<u8>>,
        filename: &str,
        path: &str,
    ) -> StorageResult<String> {
        let request = StoreRequest::new(path, filename, content)?;
        Ok(self.push(request))
    }

    /// Queues an already validated store request.
    pub fn push(&mut self, request: StoreRequest) -> String {
        let complete_path = request.complete_path();
        self.stores.push(request);
        complete_path
    }

    /// Queues the removal of a full path.
    pub fn remove(&mut self, full_path: impl Into<String>) {
        self.removals.push(full_path.into());
    }

    /// The queued stores, in order.
    #[must_use]
    pub fn stores(&self) -> &[StoreRequest] {
        &self.stores
    }

    /// The queued removals, in order.
    #[must_use]
    pub fn removals(&self) -> &[String] {
        &self.removals
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty() && self.removals.is_empty()
    }
}
