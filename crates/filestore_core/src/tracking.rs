//! Per-unit-of-work tracking of stored files.
//!
//! A caller that stores several files during one logical unit of work (one
//! inbound request, one job) can open a tracking scope at the top of that
//! unit. Every successful [`crate::Storage`] store made on the same thread
//! while the scope is open appends its complete path. If the surrounding
//! operation fails, the caller reads the tracked paths and decides what to
//! clean up; the storage layer itself never acts on them.
//!
//! Tracking is bound to the calling thread and is never visible to other
//! threads. When no scope is open, recording is a no-op.
//!
//! ```rust
//! use filestore_core::{tracking, InMemoryBackend, Storage};
//!
//! let storage = Storage::new(InMemoryBackend::new());
//! let scope = tracking::begin();
//! storage.store(b"a".to_vec(), "a.txt", "inbox").unwrap();
//! assert_eq!(scope.tracked(), vec!["inbox/a.txt".to_string()]);
//!
//! let written = scope.end();
//! assert_eq!(written.len(), 1);
//! assert!(!tracking::is_tracking());
//! ```

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use tracing::debug;

struct Active {
    generation: u64,
    paths: Vec<String>,
}

thread_local! {
    static TRACKED: RefCell<Option<Active>> = const { RefCell::new(None) };
    static GENERATION: Cell<u64> = const { Cell::new(0) };
}

/// Guard for an open tracking scope on the current thread.
///
/// Dropping the guard ends the scope and discards the tracked paths, so a
/// unit of work that exits early (including by panic) cannot leak its paths
/// into the next unit that runs on the same thread. Use [`TrackingScope::end`]
/// to end the scope and keep the paths.
///
/// A scope superseded by a later [`begin`] on the same thread is inert: it
/// reports no paths and dropping it leaves the newer scope open.
#[derive(Debug)]
#[must_use = "dropping the scope ends tracking immediately"]
pub struct TrackingScope {
    generation: u64,
    // Tied to the thread that opened it.
    _not_send: PhantomData<*const ()>,
}

impl TrackingScope {
    /// Returns the paths tracked so far, in store order.
    #[must_use]
    pub fn tracked(&self) -> Vec<String> {
        TRACKED.with(|cell| match cell.borrow().as_ref() {
            Some(active) if active.generation == self.generation => active.paths.clone(),
            _ => Vec::new(),
        })
    }

    /// Returns true while this scope is the open one on its thread.
    #[must_use]
    pub fn is_active(&self) -> bool {
        current_generation() == Some(self.generation)
    }

    /// Ends the scope and returns the tracked paths.
    #[must_use]
    pub fn end(self) -> Vec<String> {
        self.take_own()
    }

    fn take_own(&self) -> Vec<String> {
        if self.is_active() {
            take()
        } else {
            Vec::new()
        }
    }
}

impl Drop for TrackingScope {
    fn drop(&mut self) {
        drop(self.take_own());
    }
}

/// Starts tracking on the current thread.
///
/// Starting while a scope is already open resets the tracked list and
/// supersedes the older guard.
pub fn begin() -> TrackingScope {
    let generation = GENERATION.with(|counter| {
        let next = counter.get().wrapping_add(1);
        counter.set(next);
        next
    });
    TRACKED.with(|cell| {
        let previous = cell.borrow_mut().replace(Active {
            generation,
            paths: Vec::new(),
        });
        if let Some(active) = previous {
            debug!(discarded = active.paths.len(), "restarted store tracking");
        } else {
            debug!("started store tracking");
        }
    });
    TrackingScope {
        generation,
        _not_send: PhantomData,
    }
}

/// Stops tracking on the current thread and discards the tracked paths.
pub fn end() {
    drop(take());
}

/// Returns true if tracking is active on the current thread.
#[must_use]
pub fn is_tracking() -> bool {
    TRACKED.with(|cell| cell.borrow().is_some())
}

/// Returns the paths tracked on the current thread, or an empty list if
/// tracking is not active.
#[must_use]
pub fn tracked() -> Vec<String> {
    TRACKED.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|active| active.paths.clone())
            .unwrap_or_default()
    })
}

fn current_generation() -> Option<u64> {
    TRACKED.with(|cell| cell.borrow().as_ref().map(|active| active.generation))
}

fn take() -> Vec<String> {
    let active = TRACKED.with(|cell| cell.borrow_mut().take());
    if active.is_some() {
        debug!("cleared store tracking");
    }
    active.map(|active| active.paths).unwrap_or_default()
}

pub(crate) fn record(path: &str) {
    TRACKED.with(|cell| match cell.borrow_mut().as_mut() {
        Some(active) => {
            active.paths.push(path.to_string());
            debug!(path, "tracked stored path");
        }
        None => debug!(path, "tracking not started, skipping path"),
    });
}

pub(crate) fn record_all(batch: &[String]) {
    TRACKED.with(|cell| match cell.borrow_mut().as_mut() {
        Some(active) => {
            active.paths.extend_from_slice(batch);
            debug!(count = batch.len(), "tracked stored batch");
        }
        None => debug!(count = batch.len(), "tracking not started, skipping batch"),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_without_scope_is_noop() {
        assert!(!is_tracking());
        record("a.txt");
        assert!(tracked().is_empty());
        assert!(!is_tracking());
    }

    #[test]
    fn scope_collects_in_order() {
        let scope = begin();
        record("a.txt");
        record_all(&["b/c.txt".to_string(), "d.txt".to_string()]);

        assert_eq!(scope.tracked(), vec!["a.txt", "b/c.txt", "d.txt"]);
        assert_eq!(scope.end(), vec!["a.txt", "b/c.txt", "d.txt"]);
        assert!(!is_tracking());
    }

    #[test]
    fn dropping_scope_clears() {
        {
            let _scope = begin();
            record("a.txt");
            assert!(is_tracking());
        }
        assert!(!is_tracking());
        assert!(tracked().is_empty());
    }

    #[test]
    fn begin_resets_previous_paths() {
        let first = begin();
        record("old.txt");
        std::mem::forget(first);

        let scope = begin();
        assert!(scope.tracked().is_empty());
        drop(scope);
    }

    #[test]
    fn superseded_scope_leaves_newer_scope_open() {
        let outer = begin();
        record("outer.txt");

        let inner = begin();
        record("inner.txt");
        assert!(!outer.is_active());
        assert!(outer.tracked().is_empty());

        drop(outer);
        assert!(is_tracking());
        assert!(inner.is_active());
        assert_eq!(inner.end(), vec!["inner.txt"]);
        assert!(!is_tracking());
    }

    #[test]
    fn ending_superseded_scope_returns_nothing() {
        let outer = begin();
        let inner = begin();
        record("a.txt");

        assert!(outer.end().is_empty());
        assert_eq!(inner.tracked(), vec!["a.txt"]);
    }

    #[test]
    fn tracking_is_per_thread() {
        let scope = begin();
        record("main.txt");

        let other = std::thread::spawn(|| {
            record("worker.txt");
            (is_tracking(), tracked())
        })
        .join()
        .unwrap();

        assert_eq!(other, (false, Vec::<String>::new()));
        assert_eq!(scope.end(), vec!["main.txt"]);
    }
}
