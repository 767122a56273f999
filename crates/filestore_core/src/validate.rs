//! Filename and path validation.
//!
//! Both validators are pure functions. They run when a [`crate::PathAddress`]
//! or [`crate::StoreRequest`] is constructed, so an address that reaches a
//! backend has always passed them.

use thiserror::Error;

/// Maximum filename length, in characters.
pub const MAX_FILENAME_LENGTH: usize = 255;

const FORBIDDEN_FILENAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];
const FORBIDDEN_PATH_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\\'];

/// Why a filename was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameViolation {
    /// The filename is empty.
    #[error("the filename is required")]
    Required,

    /// The filename exceeds [`MAX_FILENAME_LENGTH`] characters.
    #[error("the filename is too long ({length} characters), it must be at most {max}")]
    TooLong {
        /// Length of the rejected filename, in characters.
        length: usize,
        /// The allowed maximum.
        max: usize,
    },

    /// The filename contains forbidden characters.
    ///
    /// Holds each distinct offender once, in first-seen order.
    #[error("the filename contains invalid characters: {}", join_chars(.0))]
    InvalidCharacters(Vec<char>),

    /// The filename is `.` or `..`.
    #[error("the filename cannot be a relative directory reference")]
    Reserved,
}

/// Why a path was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathViolation {
    /// The path contains forbidden characters.
    ///
    /// Holds each distinct offender once, in first-seen order.
    #[error("the path contains invalid characters: {}", join_chars(.0))]
    InvalidCharacters(Vec<char>),

    /// Two separators with nothing between them.
    #[error("the path cannot contain empty segments")]
    EmptySegment,

    /// A segment begins with a space.
    #[error("the path cannot contain segments starting with spaces")]
    SegmentStartsWithSpace,

    /// A segment ends with a space.
    #[error("the path cannot contain segments ending with spaces")]
    SegmentEndsWithSpace,

    /// A segment made only of dots (`.`, `..`, `...`).
    #[error("the path cannot contain segments with only dots")]
    DotsOnlySegment,

    /// A segment ends with a dot.
    #[error("the path cannot contain segments ending with a dot")]
    SegmentEndsWithDot,
}

/// Validates a filename.
///
/// # Errors
///
/// Returns the first rule the filename breaks: empty, too long,
/// forbidden characters (`\ / : * ? " < > |`), or `.`/`..`.
pub fn validate_filename(filename: &str) -> Result<(), FilenameViolation> {
    if filename.is_empty() {
        return Err(FilenameViolation::Required);
    }

    let length = filename.chars().count();
    if length > MAX_FILENAME_LENGTH {
        return Err(FilenameViolation::TooLong {
            length,
            max: MAX_FILENAME_LENGTH,
        });
    }

    let offenders = distinct_offenders(filename, FORBIDDEN_FILENAME_CHARS);
    if !offenders.is_empty() {
        return Err(FilenameViolation::InvalidCharacters(offenders));
    }

    if filename == "." || filename == ".." {
        return Err(FilenameViolation::Reserved);
    }

    Ok(())
}

/// Validates a directory path.
///
/// Empty, all-whitespace and `"/"` paths denote the root and are valid.
/// A single leading `/` and any trailing `/` are ignored when splitting
/// into segments.
///
/// # Errors
///
/// Returns the first rule the path breaks: forbidden characters
/// (`< > : " | ? * \`), then per segment in order: empty, leading space,
/// trailing space, dots only, trailing dot.
pub fn validate_path(path: &str) -> Result<(), PathViolation> {
    if is_root(path) {
        return Ok(());
    }

    let offenders = distinct_offenders(path, FORBIDDEN_PATH_CHARS);
    if !offenders.is_empty() {
        return Err(PathViolation::InvalidCharacters(offenders));
    }

    let relative = path.strip_prefix('/').unwrap_or(path);
    for segment in relative.trim_end_matches('/').split('/') {
        validate_segment(segment)?;
    }

    Ok(())
}

/// Returns true if `path` denotes the storage root.
pub(crate) fn is_root(path: &str) -> bool {
    path == "/" || path.trim().is_empty()
}

fn validate_segment(segment: &str) -> Result<(), PathViolation> {
    if segment.is_empty() {
        return Err(PathViolation::EmptySegment);
    }
    if segment.starts_with(' ') {
        return Err(PathViolation::SegmentStartsWithSpace);
    }
    if segment.ends_with(' ') {
        return Err(PathViolation::SegmentEndsWithSpace);
    }
    if segment.chars().all(|c| c == '.') {
        return Err(PathViolation::DotsOnlySegment);
    }
    if segment.ends_with('.') {
        return Err(PathViolation::SegmentEndsWithDot);
    }
    Ok(())
}

fn distinct_offenders(input: &str, forbidden: &[char]) -> Vec<char> {
    let mut found = Vec::new();
    for c in input.chars().filter(|c| forbidden.contains(c)) {
        if !found.contains(&c) {
            found.push(c);
        }
    }
    found
}

fn join_chars(chars: &[char]) -> String {
    chars
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
