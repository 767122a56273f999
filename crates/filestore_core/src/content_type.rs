//! Content-type guessing.

/// Content type reported when nothing better is known.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Guesses a MIME type from a filename.
///
/// Consulted by backends when they build a [`crate::StoredInfo`] without an
/// explicit content type. Implementations must not block.
pub trait ContentTypeGuesser: Send + Sync {
    /// Returns the MIME type for `filename`.
    fn guess(&self, filename: &str) -> String;
}

impl<F> ContentTypeGuesser for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn guess(&self, filename: &str) -> String {
        self(filename)
    }
}

/// Guesses by file extension, case-insensitively, from the `mime_guess`
/// extension table.
///
/// Unknown or missing extensions map to [`DEFAULT_CONTENT_TYPE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionGuesser;

impl ExtensionGuesser {
    /// Creates the guesser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ContentTypeGuesser for ExtensionGuesser {
    fn guess(&self, filename: &str) -> String {
        filename
            .rsplit_once('.')
            .filter(|(stem, _)| !stem.is_empty())
            .and_then(|(_, ext)| mime_guess::from_ext(ext).first_raw())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string()
    }
}
