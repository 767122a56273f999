//! Validated addresses and store requests.

use crate::error::{StorageError, StorageResult};
use crate::validate::{is_root, validate_filename, validate_path};
use std::fmt;

/// A validated, normalized `(path, filename)` pair.
///
/// The path never starts or ends with `/` and is `""` for the root.
/// The filename never contains a separator. The only way to obtain a
/// `PathAddress` is through validation, so an invalid pair never exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathAddress {
    path: String,
    filename: String,
}

impl PathAddress {
    /// Validates and normalizes an address.
    ///
    /// The filename is checked before the path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidFilename`] or
    /// [`StorageError::InvalidPath`] for the first rule broken.
    pub fn new(path: &str, filename: &str) -> StorageResult<Self> {
        validate_filename(filename).map_err(|reason| StorageError::InvalidFilename {
            filename: filename.to_string(),
            reason,
        })?;
        validate_path(path).map_err(|reason| StorageError::InvalidPath {
            path: path.to_string(),
            reason,
        })?;

        Ok(Self {
            path: normalize_path(path),
            filename: filename.to_string(),
        })
    }

    /// Validates an address at the storage root.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidFilename`] if the filename is invalid.
    pub fn root(filename: &str) -> StorageResult<Self> {
        Self::new("", filename)
    }

    /// Parses a complete path such as `"2024/q1/report.pdf"`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either part is invalid.
    pub fn parse(full_path: &str) -> StorageResult<Self> {
        let (path, filename) = split_full_path(full_path);
        Self::new(path, filename)
    }

    /// The normalized directory path (`""` for root).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The filename.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns true if the file lives at the storage root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// The path segments, outermost first. Empty for the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    /// The `path/filename` identifier, or just the filename at root.
    #[must_use]
    pub fn complete_path(&self) -> String {
        if self.path.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.path, self.filename)
        }
    }

    pub(crate) fn already_exists(&self) -> StorageError {
        StorageError::AlreadyExists {
            filename: self.filename.clone(),
            path: self.path.clone(),
        }
    }

    pub(crate) fn not_found(&self) -> StorageError {
        StorageError::NotFound {
            filename: self.filename.clone(),
            path: self.path.clone(),
        }
    }
}

impl fmt::Display for PathAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.filename)
        } else {
            write!(f, "{}/{}", self.path, self.filename)
        }
    }
}

/// An address plus the bytes to store there.
///
/// The content is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRequest {
    address: PathAddress,
    content: Vec<u8>,
}

impl StoreRequest {
    /// Validates a store request.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the address, or
    /// [`StorageError::EmptyContent`] if `content` is empty.
    pub fn new(path: &str, filename: &str, content: impl Into<Vec<u8>>) -> StorageResult<Self> {
        let address = PathAddress::new(path, filename)?;
        Self::at(address, content)
    }

    /// Builds a request for an already validated address.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EmptyContent`] if `content` is empty.
    pub fn at(address: PathAddress, content: impl Into<Vec<u8>>) -> StorageResult<Self> {
        let content = content.into();
        if content.is_empty() {
            return Err(StorageError::EmptyContent {
                complete_path: address.complete_path(),
            });
        }
        Ok(Self { address, content })
    }

    /// The target address.
    #[must_use]
    pub fn address(&self) -> &PathAddress {
        &self.address
    }

    /// The bytes to store.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Shorthand for `self.address().complete_path()`.
    #[must_use]
    pub fn complete_path(&self) -> String {
        self.address.complete_path()
    }

    /// Splits the request into its parts.
    #[must_use]
    pub fn into_parts(self) -> (PathAddress, Vec<u8>) {
        (self.address, self.content)
    }
}

/// Normalizes a raw path.
///
/// Blank input and `"/"` become `""`; otherwise leading and trailing `/`
/// are stripped.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    if is_root(path) {
        return String::new();
    }
    path.trim_start_matches('/').trim_end_matches('/').to_string()
}

/// Splits a full path into `(path, filename)`.
///
/// The filename is everything after the last `/`. The path is everything up
/// to and including the last `/`, or `"/"` when there is none. Feed the
/// result to [`PathAddress::new`] to validate and normalize it.
#[must_use]
pub fn split_full_path(full_path: &str) -> (&str, &str) {
    match full_path.rfind('/') {
        Some(idx) => (&full_path[..=idx], &full_path[idx + 1..]),
        None => ("/", full_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{FilenameViolation, PathViolation};
    use proptest::prelude::*;

    #[test]
    fn normalize_root_forms() {
        assert_eq!(normalize_path(""), "");
        assert_eq!(normalize_path("   "), "");
        assert_eq!(normalize_path("/"), "");
    }

    #[test]
    fn normalize_strips_separators() {
        assert_eq!(normalize_path("/a/b/"), "a/b");
        assert_eq!(normalize_path("a/b"), "a/b");
        assert_eq!(normalize_path("a/b//"), "a/b");
    }

    #[test]
    fn complete_path_joins() {
        let addr = PathAddress::new("/2024/q1/", "report.pdf").unwrap();
        assert_eq!(addr.path(), "2024/q1");
        assert_eq!(addr.complete_path(), "2024/q1/report.pdf");
        assert_eq!(addr.to_string(), "2024/q1/report.pdf");
        assert_eq!(addr.segments().collect::<Vec<_>>(), vec!["2024", "q1"]);
    }

    #[test]
    fn root_address_is_just_the_filename() {
        let addr = PathAddress::root("notes.txt").unwrap();
        assert!(addr.is_root());
        assert_eq!(addr.complete_path(), "notes.txt");
        assert_eq!(addr.segments().count(), 0);
    }

    #[test]
    fn filename_is_checked_before_path() {
        let err = PathAddress::new("a//b", "bad|name").unwrap_err();
        assert!(matches!(
            err,
            StorageError::InvalidFilename {
                reason: FilenameViolation::InvalidCharacters(_),
                ..
            }
        ));

        let err = PathAddress::new("a//b", "fine.txt").unwrap_err();
        assert!(matches!(
            err,
            StorageError::InvalidPath {
                reason: PathViolation::EmptySegment,
                ..
            }
        ));
    }

    #[test]
    fn invalid_path_keeps_rejected_input() {
        let err = PathAddress::new("/a/ b/", "fine.txt").unwrap_err();
        assert!(matches!(
            err,
            StorageError::InvalidPath { ref path, .. } if path == "/a/ b/"
        ));
    }

    #[test]
    fn split_full_path_cases() {
        assert_eq!(split_full_path("a/b/c.txt"), ("a/b/", "c.txt"));
        assert_eq!(split_full_path("c.txt"), ("/", "c.txt"));
        assert_eq!(split_full_path("/c.txt"), ("/", "c.txt"));
        assert_eq!(split_full_path("a/"), ("a/", ""));
    }

    #[test]
    fn parse_full_path() {
        let addr = PathAddress::parse("docs/readme.md").unwrap();
        assert_eq!(addr.path(), "docs");
        assert_eq!(addr.filename(), "readme.md");

        let err = PathAddress::parse("docs/").unwrap_err();
        assert!(matches!(
            err,
            StorageError::InvalidFilename {
                reason: FilenameViolation::Required,
                ..
            }
        ));
    }

    #[test]
    fn store_request_rejects_empty_content() {
        let err = StoreRequest::new("a", "b.txt", Vec::new()).unwrap_err();
        assert!(matches!(err, StorageError::EmptyContent { ref complete_path } if complete_path == "a/b.txt"));
    }

    #[test]
    fn store_request_validates_address_first() {
        let err = StoreRequest::new("a", "", Vec::new()).unwrap_err();
        assert!(matches!(err, StorageError::InvalidFilename { .. }));
    }

    proptest! {
        #[test]
        fn complete_path_round_trips(
            segments in prop::collection::vec("[a-zA-Z0-9_-][a-zA-Z0-9_ .-]{0,8}[a-zA-Z0-9_-]", 0..4),
            filename in "[a-zA-Z0-9_-][a-zA-Z0-9_. -]{0,20}",
        ) {
            prop_assume!(filename != "." && filename != "..");
            let path = segments.join("/");
            let addr = PathAddress::new(&path, &filename).unwrap();

            let complete = addr.complete_path();
            let (split_path, split_name) = split_full_path(&complete);
            prop_assert_eq!(normalize_path(split_path), addr.path());
            prop_assert_eq!(split_name, addr.filename());
            prop_assert_eq!(PathAddress::parse(&complete).unwrap(), addr);
        }
    }
}
