//! # filestore core
//!
//! Backend-agnostic file storage.
//!
//! This crate provides one logical storage contract (store, download, info,
//! exists, remove, transfer, purge and batch store) on top of interchangeable
//! physical backends. Backends are **dumb byte stores** keyed by a validated
//! address - all naming rules, existence checks and batch compensation live
//! in [`Storage`].
//!
//! ## Design Principles
//!
//! - Every address is validated before any backend call
//! - Backends only implement the five capabilities of [`StorageBackend`]
//! - Lookups return `None` for absence; mutations that need an existing
//!   file fail with [`StorageError::NotFound`]
//! - Batches are all-or-nothing on a best-effort basis (delete-on-failure)
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`DiskBackend`] - Files under a root directory on the local disk
//!
//! ## Example
//!
//! ```rust
//! use filestore_core::{InMemoryBackend, Storage};
//!
//! let storage = Storage::new(InMemoryBackend::new());
//! let stored = storage.store(b"%PDF-1.7".to_vec(), "report.pdf", "2024/q1").unwrap();
//! assert_eq!(stored, "2024/q1/report.pdf");
//!
//! let info = storage.info_at(&stored).unwrap().unwrap();
//! assert_eq!(info.content_type, "application/pdf");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod address;
mod backend;
mod batch;
mod config;
mod content_type;
mod disk;
mod error;
mod memory;
mod storage;
mod stored;
pub mod tracking;
pub mod validate;

pub use address::{normalize_path, split_full_path, PathAddress, StoreRequest};
pub use backend::StorageBackend;
pub use batch::{Purgeable, StorageBatch};
pub use config::DiskConfig;
pub use content_type::{ContentTypeGuesser, ExtensionGuesser, DEFAULT_CONTENT_TYPE};
pub use disk::DiskBackend;
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryBackend;
pub use storage::Storage;
pub use stored::{StoredArtifact, StoredInfo};
pub use tracking::TrackingScope;
pub use validate::{FilenameViolation, PathViolation, MAX_FILENAME_LENGTH};
