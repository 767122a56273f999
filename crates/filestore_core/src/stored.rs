//! Values returned by backends for stored files.

use crate::address::PathAddress;
use crate::content_type::ContentTypeGuesser;
use serde::{Deserialize, Serialize};

/// Metadata about a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredInfo {
    /// The filename.
    pub filename: String,
    /// The normalized directory path (`""` for root).
    pub path: String,
    /// MIME type of the content.
    pub content_type: String,
    /// Content length in bytes.
    pub file_size: u64,
}

impl StoredInfo {
    /// Builds metadata with an explicit content type.
    #[must_use]
    pub fn new(address: &PathAddress, file_size: u64, content_type: impl Into<String>) -> Self {
        Self {
            filename: address.filename().to_string(),
            path: address.path().to_string(),
            content_type: content_type.into(),
            file_size,
        }
    }

    /// Builds metadata, asking `guesser` for the content type.
    #[must_use]
    pub fn guessed(address: &PathAddress, file_size: u64, guesser: &dyn ContentTypeGuesser) -> Self {
        Self::new(address, file_size, guesser.guess(address.filename()))
    }

    /// The `path/filename` identifier of the file.
    #[must_use]
    pub fn complete_path(&self) -> String {
        if self.path.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.path, self.filename)
        }
    }
}

/// A downloaded file: its bytes plus metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    /// The file content.
    pub content: Vec<u8>,
    /// The file metadata.
    pub info: StoredInfo,
}

impl StoredArtifact {
    /// Wraps backend output.
    #[must_use]
    pub fn new(content: Vec<u8>, info: StoredInfo) -> Self {
        Self { content, info }
    }

    /// Wraps bytes read from `address`, guessing the content type.
    #[must_use]
    pub fn guessed(address: &PathAddress, content: Vec<u8>, guesser: &dyn ContentTypeGuesser) -> Self {
        let info = StoredInfo::guessed(address, content.len() as u64, guesser);
        Self { content, info }
    }

    /// Consumes the artifact, returning the content.
    #[must_use]
    pub fn into_content(self) -> Vec<u8> {
        self.content
    }
}
