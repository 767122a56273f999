//! The storage facade.

use crate::address::{PathAddress, StoreRequest};
use crate::backend::StorageBackend;
use crate::batch::{Purgeable, StorageBatch};
use crate::error::StorageResult;
use crate::stored::{StoredArtifact, StoredInfo};
use crate::tracking;
use tracing::{debug, warn};

/// Backend-agnostic file storage.
///
/// `Storage` validates and normalizes every address, enforces
/// no-overwrite, runs the batch protocol and records successful stores in
/// the active [`tracking`] scope. All physical I/O is delegated to the
/// bound [`StorageBackend`].
///
/// Operations come in two forms: addressed by `(filename, path)`, or by a
/// single full path such as `"2024/q1/report.pdf"` (the `*_at` methods).
///
/// # Concurrency
///
/// `Storage` holds no mutable state of its own and can be shared across
/// threads if the backend can. The existence check before a write is not
/// atomic with the write: two callers storing the same address at once may
/// both pass the check, and the backend decides the winner.
#[derive(Debug)]
pub struct Storage<B> {
    backend: B,
}

impl<B: StorageBackend> Storage<B> {
    /// Creates a facade over `backend`.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consumes the facade, returning the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Stores `content` as `filename` under `path` and returns the complete
    /// path.
    ///
    /// An empty or `"/"` path stores at the root.
    ///
    /// # Errors
    ///
    /// - Validation errors for the filename, path or empty content
    /// - [`crate::StorageError::AlreadyExists`] if the address is taken;
    ///   nothing is written
    /// - Backend I/O errors
    pub fn store(
        &self,
        content: impl Into<Vec<u8>>,
        filename: &str,
        path: &str,
    ) -> StorageResult<String> {
        let request = StoreRequest::new(path, filename, content)?;
        self.store_request(&request)
    }

    /// Stores a validated request and returns its complete path.
    ///
    /// # Errors
    ///
    /// See [`Storage::store`].
    pub fn store_request(&self, request: &StoreRequest) -> StorageResult<String> {
        let address = request.address();
        debug!(filename = address.filename(), path = address.path(), "storing file");

        self.ensure_free(address)?;
        self.backend.write(address, request.content())?;

        let complete_path = address.complete_path();
        tracking::record(&complete_path);
        Ok(complete_path)
    }

    /// Stores several files as one unit and returns their complete paths.
    ///
    /// Every address is checked before anything is written; if one is
    /// taken, nothing is written. Writes then run in order. If one fails,
    /// the files already written by this call are deleted again and the
    /// original error is returned; failures while deleting are logged and
    /// otherwise ignored. Paths are tracked only once every write succeeded.
    ///
    /// # Errors
    ///
    /// - [`crate::StorageError::AlreadyExists`] for the first taken address
    /// - The first write error
    pub fn store_batch(&self, requests: &[StoreRequest]) -> StorageResult<Vec<String>> {
        for request in requests {
            self.ensure_free(request.address())?;
        }

        let mut written: Vec<&PathAddress> = Vec::with_capacity(requests.len());
        for request in requests {
            let address = request.address();
            if let Err(e) = self.backend.write(address, request.content()) {
                warn!(
                    path = %address,
                    written = written.len(),
                    error = %e,
                    "batch write failed, compensating"
                );
                self.compensate(&written);
                return Err(e);
            }
            debug!(path = %address, "stored batch file");
            written.push(address);
        }

        let paths: Vec<String> = written.iter().map(|a| a.complete_path()).collect();
        tracking::record_all(&paths);
        Ok(paths)
    }

    /// Commits a [`StorageBatch`]: stores first, then removals.
    ///
    /// The stores follow [`Storage::store_batch`]; if they fail nothing is
    /// removed. Removals then run in order and stop at the first failure.
    ///
    /// # Errors
    ///
    /// The first store or removal error.
    pub fn commit(&self, batch: &StorageBatch) -> StorageResult<Vec<String>> {
        let stored = self.store_batch(batch.stores())?;
        for full_path in batch.removals() {
            self.remove_at(full_path)?;
        }
        Ok(stored)
    }

    /// Downloads a file, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Validation or backend errors. Absence is not an error.
    pub fn download(&self, filename: &str, path: &str) -> StorageResult<Option<StoredArtifact>> {
        let address = PathAddress::new(path, filename)?;
        self.backend.read(&address)
    }

    /// Downloads a file by full path.
    ///
    /// # Errors
    ///
    /// See [`Storage::download`].
    pub fn download_at(&self, full_path: &str) -> StorageResult<Option<StoredArtifact>> {
        let address = PathAddress::parse(full_path)?;
        self.backend.read(&address)
    }

    /// Returns a file's metadata, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Validation or backend errors. Absence is not an error.
    pub fn info(&self, filename: &str, path: &str) -> StorageResult<Option<StoredInfo>> {
        let address = PathAddress::new(path, filename)?;
        self.backend.stat(&address)
    }

    /// Returns a file's metadata by full path.
    ///
    /// # Errors
    ///
    /// See [`Storage::info`].
    pub fn info_at(&self, full_path: &str) -> StorageResult<Option<StoredInfo>> {
        let address = PathAddress::parse(full_path)?;
        self.backend.stat(&address)
    }

    /// Returns true if a file exists.
    ///
    /// # Errors
    ///
    /// Validation or backend errors.
    pub fn exists(&self, filename: &str, path: &str) -> StorageResult<bool> {
        let address = PathAddress::new(path, filename)?;
        self.backend.exists(&address)
    }

    /// Returns true if a file exists at a full path.
    ///
    /// # Errors
    ///
    /// Validation or backend errors.
    pub fn exists_at(&self, full_path: &str) -> StorageResult<bool> {
        let address = PathAddress::parse(full_path)?;
        self.backend.exists(&address)
    }

    /// Removes a file.
    ///
    /// # Errors
    ///
    /// [`crate::StorageError::NotFound`] if the file does not exist, or
    /// validation and backend errors.
    pub fn remove(&self, filename: &str, path: &str) -> StorageResult<()> {
        let address = PathAddress::new(path, filename)?;
        self.remove_address(&address)
    }

    /// Removes a file by full path.
    ///
    /// # Errors
    ///
    /// See [`Storage::remove`].
    pub fn remove_at(&self, full_path: &str) -> StorageResult<()> {
        let address = PathAddress::parse(full_path)?;
        self.remove_address(&address)
    }

    /// Removes every file `purgeable` references, in order.
    ///
    /// Stops at the first failure; files removed before it stay removed.
    ///
    /// # Errors
    ///
    /// The first removal error.
    pub fn purge<P: Purgeable + ?Sized>(&self, purgeable: &P) -> StorageResult<()> {
        for full_path in purgeable.stored_paths() {
            self.remove_at(&full_path)?;
        }
        Ok(())
    }

    /// Purges several purgeables in order.
    ///
    /// # Errors
    ///
    /// The first removal error.
    pub fn purge_all<I>(&self, purgeables: I) -> StorageResult<()>
    where
        I: IntoIterator,
        I::Item: Purgeable,
    {
        for purgeable in purgeables {
            self.purge(&purgeable)?;
        }
        Ok(())
    }

    /// Copies a file into `target` at the same filename and path.
    ///
    /// The source is left untouched whether or not the copy succeeds.
    ///
    /// # Errors
    ///
    /// [`crate::StorageError::NotFound`] if the source file does not exist,
    /// or any error from storing into `target` (such as
    /// [`crate::StorageError::AlreadyExists`]).
    pub fn transfer_to<T: StorageBackend>(
        &self,
        target: &Storage<T>,
        filename: &str,
        path: &str,
    ) -> StorageResult<String> {
        let address = PathAddress::new(path, filename)?;
        self.transfer_address(target, address)
    }

    /// Copies a file, addressed by full path, into `target`.
    ///
    /// # Errors
    ///
    /// See [`Storage::transfer_to`].
    pub fn transfer_to_at<T: StorageBackend>(
        &self,
        target: &Storage<T>,
        full_path: &str,
    ) -> StorageResult<String> {
        let address = PathAddress::parse(full_path)?;
        self.transfer_address(target, address)
    }

    fn transfer_address<T: StorageBackend>(
        &self,
        target: &Storage<T>,
        address: PathAddress,
    ) -> StorageResult<String> {
        let artifact = self
            .backend
            .read(&address)?
            .ok_or_else(|| address.not_found())?;
        debug!(path = %address, "transferring file");

        let request = StoreRequest::at(address, artifact.into_content())?;
        target.store_request(&request)
    }

    fn remove_address(&self, address: &PathAddress) -> StorageResult<()> {
        if !self.backend.exists(address)? {
            return Err(address.not_found());
        }
        self.backend.delete(address)?;
        debug!(path = %address, "removed file");
        Ok(())
    }

    fn ensure_free(&self, address: &PathAddress) -> StorageResult<()> {
        if self.backend.exists(address)? {
            return Err(address.already_exists());
        }
        Ok(())
    }

    fn compensate(&self, written: &[&PathAddress]) {
        for address in written {
            match self.backend.delete(address) {
                Ok(()) => debug!(path = %address, "rolled back batch file"),
                Err(e) => warn!(path = %address, error = %e, "failed to roll back batch file"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::memory::InMemoryBackend;
    use parking_lot::Mutex;
    use std::io;

    /// Wraps the memory backend and fails writes to one filename.
    #[derive(Debug, Default)]
    struct RejectingBackend {
        inner: InMemoryBackend,
        reject: Option<&'static str>,
        deletes: Mutex<Vec<String>>,
    }

    impl RejectingBackend {
        fn rejecting(filename: &'static str) -> Self {
            Self {
                reject: Some(filename),
                ..Self::default()
            }
        }
    }

    impl StorageBackend for RejectingBackend {
        fn write(&self, address: &PathAddress, content: &[u8]) -> StorageResult<()> {
            if self.reject == Some(address.filename()) {
                return Err(io::Error::other("device full").into());
            }
            self.inner.write(address, content)
        }

        fn read(&self, address: &PathAddress) -> StorageResult<Option<StoredArtifact>> {
            self.inner.read(address)
        }

        fn stat(&self, address: &PathAddress) -> StorageResult<Option<StoredInfo>> {
            self.inner.stat(address)
        }

        fn exists(&self, address: &PathAddress) -> StorageResult<bool> {
            self.inner.exists(address)
        }

        fn delete(&self, address: &PathAddress) -> StorageResult<()> {
            self.deletes.lock().push(address.complete_path());
            self.inner.delete(address)
        }
    }

    fn request(path: &str, filename: &str) -> StoreRequest {
        StoreRequest::new(path, filename, filename.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn store_returns_complete_path() {
        let storage = Storage::new(InMemoryBackend::new());
        assert_eq!(storage.store(b"x".to_vec(), "a.txt", "").unwrap(), "a.txt");
        assert!(storage.store(b"x".to_vec(), "a.txt", "/").unwrap_err().is_already_exists());
        assert_eq!(storage.store(b"x".to_vec(), "a.txt", "/docs/").unwrap(), "docs/a.txt");
    }

    #[test]
    fn store_twice_keeps_first_content() {
        let storage = Storage::new(InMemoryBackend::new());
        storage.store(b"first".to_vec(), "a.txt", "x").unwrap();

        let err = storage.store(b"second".to_vec(), "a.txt", "x").unwrap_err();
        assert!(matches!(
            err,
            StorageError::AlreadyExists { ref filename, ref path } if filename == "a.txt" && path == "x"
        ));
        assert_eq!(storage.download("a.txt", "x").unwrap().unwrap().content, b"first");
    }

    #[test]
    fn invalid_input_never_reaches_backend() {
        let storage = Storage::new(InMemoryBackend::new());
        assert!(storage.store(b"x".to_vec(), "a|b", "").unwrap_err().is_validation());
        assert!(storage.store(b"x".to_vec(), "a.txt", "../up").unwrap_err().is_validation());
        assert!(storage.store(Vec::new(), "a.txt", "").unwrap_err().is_validation());
        assert!(storage.backend().is_empty());
    }

    #[test]
    fn lookups_return_none_when_absent() {
        let storage = Storage::new(InMemoryBackend::new());
        assert!(storage.download("a.txt", "x").unwrap().is_none());
        assert!(storage.info_at("x/a.txt").unwrap().is_none());
        assert!(!storage.exists_at("x/a.txt").unwrap());
    }

    #[test]
    fn remove_missing_is_not_found() {
        let storage = Storage::new(InMemoryBackend::new());
        let err = storage.remove_at("x/a.txt").unwrap_err();
        assert!(err.is_not_found());
        assert!(!storage.exists_at("x/a.txt").unwrap());
    }

    #[test]
    fn full_path_and_pair_forms_agree() {
        let storage = Storage::new(InMemoryBackend::new());
        storage.store(b"abc".to_vec(), "a.txt", "x/y").unwrap();

        assert!(storage.exists("a.txt", "/x/y/").unwrap());
        assert!(storage.exists_at("x/y/a.txt").unwrap());
        assert_eq!(
            storage.info("a.txt", "x/y").unwrap(),
            storage.info_at("x/y/a.txt").unwrap()
        );
        storage.remove("a.txt", "x/y").unwrap();
        assert!(!storage.exists_at("x/y/a.txt").unwrap());
    }

    #[test]
    fn batch_with_existing_address_writes_nothing() {
        let storage = Storage::new(InMemoryBackend::new());
        storage.store(b"old".to_vec(), "b.txt", "docs").unwrap();

        let batch = [request("docs", "a.txt"), request("docs", "b.txt"), request("docs", "c.txt")];
        let err = storage.store_batch(&batch).unwrap_err();

        assert!(err.is_already_exists());
        assert!(!storage.exists_at("docs/a.txt").unwrap());
        assert!(!storage.exists_at("docs/c.txt").unwrap());
        assert_eq!(storage.download_at("docs/b.txt").unwrap().unwrap().content, b"old");
    }

    #[test]
    fn batch_write_failure_compensates_in_write_order() {
        let storage = Storage::new(RejectingBackend::rejecting("c.txt"));
        let batch = [request("docs", "a.txt"), request("docs", "b.txt"), request("docs", "c.txt")];

        let err = storage.store_batch(&batch).unwrap_err();
        assert!(matches!(err, StorageError::Io(ref e) if e.to_string() == "device full"));
        assert!(!storage.exists_at("docs/a.txt").unwrap());
        assert!(!storage.exists_at("docs/b.txt").unwrap());
        assert_eq!(
            *storage.backend().deletes.lock(),
            vec!["docs/a.txt", "docs/b.txt"]
        );
    }

    #[test]
    fn batch_success_returns_paths_in_order() {
        let storage = Storage::new(InMemoryBackend::new());
        let batch = [request("", "a.txt"), request("x", "b.txt")];
        assert_eq!(storage.store_batch(&batch).unwrap(), vec!["a.txt", "x/b.txt"]);
    }

    #[test]
    fn batch_tracks_only_after_success() {
        let storage = Storage::new(RejectingBackend::rejecting("b.txt"));
        let scope = tracking::begin();

        storage.store_batch(&[request("", "a.txt"), request("", "b.txt")]).unwrap_err();
        assert!(scope.tracked().is_empty());

        storage.store_batch(&[request("", "c.txt"), request("", "d.txt")]).unwrap();
        storage.store(b"e".to_vec(), "e.txt", "").unwrap();
        assert_eq!(scope.end(), vec!["c.txt", "d.txt", "e.txt"]);
    }

    #[test]
    fn commit_stores_then_removes() {
        let storage = Storage::new(InMemoryBackend::new());
        storage.store(b"old".to_vec(), "old.txt", "avatars").unwrap();

        let mut batch = StorageBatch::new();
        batch.store(b"new".to_vec(), "new.txt", "avatars").unwrap();
        batch.remove("avatars/old.txt");

        assert_eq!(storage.commit(&batch).unwrap(), vec!["avatars/new.txt"]);
        assert_eq!(storage.backend().paths(), vec!["avatars/new.txt"]);
    }

    #[test]
    fn commit_failure_removes_nothing() {
        let storage = Storage::new(InMemoryBackend::new());
        storage.store(b"old".to_vec(), "old.txt", "").unwrap();
        storage.store(b"taken".to_vec(), "taken.txt", "").unwrap();

        let mut batch = StorageBatch::new();
        batch.store(b"x".to_vec(), "taken.txt", "").unwrap();
        batch.remove("old.txt");

        assert!(storage.commit(&batch).unwrap_err().is_already_exists());
        assert!(storage.exists_at("old.txt").unwrap());
    }

    #[test]
    fn purge_stops_at_first_missing() {
        let storage = Storage::new(InMemoryBackend::new());
        storage.store(b"1".to_vec(), "1.txt", "p").unwrap();
        storage.store(b"3".to_vec(), "3.txt", "p").unwrap();

        let refs = vec!["p/1.txt".to_string(), "p/2.txt".to_string(), "p/3.txt".to_string()];
        let err = storage.purge(&refs).unwrap_err();

        assert!(err.is_not_found());
        assert!(!storage.exists_at("p/1.txt").unwrap());
        assert!(storage.exists_at("p/3.txt").unwrap());
    }

    #[test]
    fn purge_all_removes_every_reference() {
        let storage = Storage::new(InMemoryBackend::new());
        storage.store(b"1".to_vec(), "1.txt", "").unwrap();
        storage.store(b"2".to_vec(), "2.txt", "q").unwrap();

        storage.purge_all(["1.txt", "q/2.txt"]).unwrap();
        assert!(storage.backend().is_empty());
    }

    #[test]
    fn transfer_copies_between_backends() {
        let source = Storage::new(InMemoryBackend::new());
        let target = Storage::new(InMemoryBackend::new());
        source.store(b"payload".to_vec(), "b.txt", "a").unwrap();

        assert_eq!(source.transfer_to_at(&target, "a/b.txt").unwrap(), "a/b.txt");
        assert_eq!(target.download_at("a/b.txt").unwrap().unwrap().content, b"payload");
        assert!(source.exists_at("a/b.txt").unwrap());
    }

    #[test]
    fn transfer_missing_source_is_not_found() {
        let source = Storage::new(InMemoryBackend::new());
        let target = Storage::new(InMemoryBackend::new());
        let err = source.transfer_to(&target, "b.txt", "a").unwrap_err();
        assert!(matches!(
            err,
            StorageError::NotFound { ref filename, ref path } if filename == "b.txt" && path == "a"
        ));
        assert!(target.backend().is_empty());
    }

    #[test]
    fn transfer_collision_leaves_both_sides() {
        let source = Storage::new(InMemoryBackend::new());
        let target = Storage::new(InMemoryBackend::new());
        source.store(b"new".to_vec(), "b.txt", "a").unwrap();
        target.store(b"old".to_vec(), "b.txt", "a").unwrap();

        assert!(source.transfer_to_at(&target, "a/b.txt").unwrap_err().is_already_exists());
        assert_eq!(target.download_at("a/b.txt").unwrap().unwrap().content, b"old");
        assert!(source.exists_at("a/b.txt").unwrap());
    }
}
