//! Fault injection.
//!
//! [`FaultyBackend`] wraps a real backend and fails selected calls, so tests
//! can drive the batch protocol into its compensation path.

use filestore_core::{
    PathAddress, StorageBackend, StorageResult, StoredArtifact, StoredInfo,
};
use parking_lot::Mutex;
use std::io;

/// Calls observed by a [`FaultyBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// A write to the complete path.
    Write(String),
    /// A delete of the complete path.
    Delete(String),
}

#[derive(Debug, Default)]
struct Faults {
    fail_write_at: Option<usize>,
    fail_deletes: bool,
    writes: usize,
    calls: Vec<BackendCall>,
}

/// A backend wrapper that fails on demand.
///
/// Reads, stats and existence checks always pass through. Writes and
/// deletes are recorded in [`FaultyBackend::calls`] whether or not they
/// fail.
#[derive(Debug)]
pub struct FaultyBackend<B> {
    inner: B,
    faults: Mutex<Faults>,
}

impl<B: StorageBackend> FaultyBackend<B> {
    /// Wraps `inner` with no faults armed.
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            faults: Mutex::new(Faults::default()),
        }
    }

    /// Fails the `n`th write from now on (1-based) with an I/O error.
    #[must_use]
    pub fn fail_write_at(self, n: usize) -> Self {
        {
            let mut faults = self.faults.lock();
            faults.fail_write_at = Some(faults.writes + n);
        }
        self
    }

    /// Fails every delete with an I/O error.
    #[must_use]
    pub fn fail_deletes(self) -> Self {
        self.faults.lock().fail_deletes = true;
        self
    }

    /// Returns the wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Returns the writes and deletes seen so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.faults.lock().calls.clone()
    }

    /// Returns the complete paths of the deletes seen so far.
    pub fn deleted(&self) -> Vec<String> {
        self.faults
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::Delete(path) => Some(path.clone()),
                BackendCall::Write(_) => None,
            })
            .collect()
    }
}

impl<B: StorageBackend> StorageBackend for FaultyBackend<B> {
    fn write(&self, address: &PathAddress, content: &[u8]) -> StorageResult<()> {
        {
            let mut faults = self.faults.lock();
            faults.writes += 1;
            faults.calls.push(BackendCall::Write(address.complete_path()));
            if faults.fail_write_at == Some(faults.writes) {
                return Err(io::Error::other(format!("injected write failure at {address}")).into());
            }
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
        {
            let mut faults = self.faults.lock();
            faults.calls.push(BackendCall::Delete(address.complete_path()));
            if faults.fail_deletes {
                return Err(io::Error::other(format!("injected delete failure at {address}")).into());
            }
        }
        self.inner.delete(address)
    }
}
