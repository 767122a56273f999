//! Disk storage backend for persistent storage.

use crate::address::PathAddress;
use crate::backend::StorageBackend;
use crate::config::DiskConfig;
use crate::content_type::ContentTypeGuesser;
use crate::error::StorageResult;
use crate::stored::{StoredArtifact, StoredInfo};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// A disk storage backend.
///
/// Each address maps to one file under the root directory: the path
/// segments become directories and the filename becomes the file name.
/// Data survives process restarts.
///
/// # Collisions
///
/// Files are created with `create_new`, so a concurrent writer that won the
/// race is reported as [`crate::StorageError::AlreadyExists`] instead of being
/// overwritten.
///
/// # Example
///
/// ```no_run
/// use filestore_core::{DiskBackend, DiskConfig, Storage};
///
/// let backend = DiskBackend::open(&DiskConfig::new().root("/var/lib/uploads")).unwrap();
/// let storage = Storage::new(backend);
/// storage.store(b"hello".to_vec(), "hello.txt", "greetings").unwrap();
/// ```
pub struct DiskBackend {
    root: PathBuf,
    guesser: Arc<dyn ContentTypeGuesser>,
}

impl DiskBackend {
    /// Opens a disk backend as described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be resolved or created, or if it
    /// is missing and `create_root` is off.
    pub fn open(config: &DiskConfig) -> StorageResult<Self> {
        let root = config.resolve_root()?;
        if config.create_root {
            fs::create_dir_all(&root)?;
        } else if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("storage root {} is not a directory", root.display()),
            )
            .into());
        }
        debug!(root = %root.display(), "opened disk storage");

        Ok(Self {
            root,
            guesser: Arc::clone(&config.guesser),
        })
    }

    /// Opens a disk backend rooted at `root`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open_dir(root: &Path) -> StorageResult<Self> {
        Self::open(&DiskConfig::new().root(root.to_string_lossy()))
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file system location of `address`.
    #[must_use]
    pub fn file_path(&self, address: &PathAddress) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(address.segments());
        path.push(address.filename());
        path
    }

    /// Metadata of the regular file at `target`, or `None` if there is no
    /// file there.
    ///
    /// A directory at `target`, or a regular file where one of its parent
    /// directories should be, counts as absent. Other I/O errors propagate.
    fn file_metadata(&self, target: &Path) -> StorageResult<Option<fs::Metadata>> {
        match fs::metadata(target) {
            Ok(meta) if meta.is_file() => Ok(Some(meta)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(_) if self.parent_is_file(target) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn parent_is_file(&self, target: &Path) -> bool {
        target
            .ancestors()
            .skip(1)
            .take_while(|dir| *dir != self.root.as_path())
            .any(Path::is_file)
    }
}

impl fmt::Debug for DiskBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskBackend")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl StorageBackend for DiskBackend {
    fn write(&self, address: &PathAddress, content: &[u8]) -> StorageResult<()> {
        let target = self.file_path(address);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(address.already_exists());
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = file.write_all(content).and_then(|()| file.sync_all()) {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&target) {
                warn!(file = %target.display(), error = %cleanup, "failed to remove partial file");
            }
            return Err(e.into());
        }

        Ok(())
    }

    fn read(&self, address: &PathAddress) -> StorageResult<Option<StoredArtifact>> {
        let target = self.file_path(address);
        if self.file_metadata(&target)?.is_none() {
            return Ok(None);
        }
        match fs::read(&target) {
            Ok(content) => Ok(Some(StoredArtifact::guessed(
                address,
                content,
                self.guesser.as_ref(),
            ))),
            // removed between the metadata check and the read
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn stat(&self, address: &PathAddress) -> StorageResult<Option<StoredInfo>> {
        Ok(self
            .file_metadata(&self.file_path(address))?
            .map(|meta| StoredInfo::guessed(address, meta.len(), self.guesser.as_ref())))
    }

    fn exists(&self, address: &PathAddress) -> StorageResult<bool> {
        Ok(self.file_metadata(&self.file_path(address))?.is_some())
    }

    fn delete(&self, address: &PathAddress) -> StorageResult<()> {
        match fs::remove_file(self.file_path(address)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(address.not_found()),
            Err(e) => Err(e.into()),
        }
    }
}
