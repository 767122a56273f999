//! Disk backend configuration.

use crate::content_type::{ContentTypeGuesser, ExtensionGuesser};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

const USER_DIR: &str = "{user.dir}";
const USER_HOME: &str = "{user.home}";

/// Configuration for opening a [`crate::DiskBackend`].
#[derive(Clone)]
pub struct DiskConfig {
    /// Storage root. May contain `{user.dir}` (working directory) or
    /// `{user.home}` (home directory) placeholders.
    pub root: String,

    /// Whether to create the root directory if it doesn't exist.
    pub create_root: bool,

    /// Guesser used to report content types.
    pub guesser: Arc<dyn ContentTypeGuesser>,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            root: format!("{USER_DIR}/uploads"),
            create_root: true,
            guesser: Arc::new(ExtensionGuesser::new()),
        }
    }
}

impl fmt::Debug for DiskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskConfig")
            .field("root", &self.root)
            .field("create_root", &self.create_root)
            .finish_non_exhaustive()
    }
}

impl DiskConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage root.
    #[must_use]
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Sets whether to create the root directory if missing.
    #[must_use]
    pub fn create_root(mut self, value: bool) -> Self {
        self.create_root = value;
        self
    }

    /// Sets the content-type guesser.
    #[must_use]
    pub fn guesser(mut self, guesser: Arc<dyn ContentTypeGuesser>) -> Self {
        self.guesser = guesser;
        self
    }

    /// Expands placeholders and trims a trailing separator.
    ///
    /// # Errors
    ///
    /// Returns an error if a placeholder cannot be resolved.
    pub fn resolve_root(&self) -> io::Result<PathBuf> {
        let mut root = self.root.clone();

        if root.contains(USER_DIR) {
            let cwd = std::env::current_dir()?;
            root = root.replace(USER_DIR, &cwd.to_string_lossy());
        }

        if root.contains(USER_HOME) {
            let home = std::env::var_os("HOME")
                .or_else(|| std::env::var_os("USERPROFILE"))
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "home directory is not set"))?;
            root = root.replace(USER_HOME, &home.to_string_lossy());
        }

        let trimmed = root.trim_end_matches(['/', '\\']);
        if trimmed.is_empty() {
            return Ok(PathBuf::from(root));
        }
        Ok(PathBuf::from(trimmed))
    }
}
