//! # filestore testkit
//!
//! Test utilities for filestore.
//!
//! This crate provides:
//! - Storage fixtures over memory and temporary-directory backends
//! - A fault-injecting backend for exercising batch compensation
//! - Property-based test generators using proptest
//! - Test logging setup
//!
//! ## Usage
//!
//! ```rust
//! use filestore_testkit::prelude::*;
//!
//! with_memory_storage(|storage| {
//!     storage.store(b"x".to_vec(), "a.txt", "").unwrap();
//!     assert!(storage.exists_at("a.txt").unwrap());
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faulty;
pub mod fixtures;
pub mod generators;
pub mod logging;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faulty::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::*;
}

pub use faulty::*;
pub use fixtures::*;
pub use generators::*;
pub use logging::*;
