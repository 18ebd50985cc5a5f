//! Transient relay files for uploaded archives
//!
//! The archive lister only accepts a filesystem path, so each upload is written
//! to its own file under a unique name and removed as soon as the request is done.
//! A [`TransientFile`] removes its file when dropped, which covers every exit
//! path including panics and cancelled requests.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use uuid::Uuid;

/// Source of per-request unique identifiers for transient file names
pub trait UniqueIdSource: Send + Sync {
    /// Return an identifier not returned before by this source
    fn next_id(&self) -> String;
}

/// Process id plus a monotonically increasing counter
#[derive(Debug)]
pub struct SequentialIds {
    scope: String,
    counter: AtomicU64,
}

impl SequentialIds {
    /// Counter scoped to the current process
    #[must_use]
    pub fn new() -> Self {
        Self::with_scope(std::process::id().to_string())
    }

    /// Counter scoped to an explicit label
    #[must_use]
    pub fn with_scope(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl UniqueIdSource for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.scope)
    }
}

/// Random UUID v4 identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl UniqueIdSource for RandomIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Directory where upload relay files are created
#[derive(Clone)]
pub struct TransientStore {
    dir: PathBuf,
    ids: Arc<dyn UniqueIdSource>,
}

impl fmt::Debug for TransientStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransientStore")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl TransientStore {
    /// File name prefix for relay files
    pub const PREFIX: &'static str = "ziptree-upload-";

    /// Create a store in `dir` naming files with ids from `ids`
    pub fn new(dir: impl Into<PathBuf>, ids: Arc<dyn UniqueIdSource>) -> Self {
        Self {
            dir: dir.into(),
            ids,
        }
    }

    /// Directory holding relay files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` to a new uniquely named file.
    ///
    /// The file is created exclusively; an existing file with the same name is
    /// an error and is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns the IO error from creating or writing the file.
    pub fn persist(&self, bytes: &[u8]) -> io::Result<TransientFile> {
        let prefix = format!("{}{}", Self::PREFIX, self.ids.next_id());
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".zip")
            .rand_bytes(0)
            .tempfile_in(&self.dir)?;

        file.write_all(bytes)?;
        file.flush()?;

        debug!(
            "Created transient file {} ({} bytes)",
            file.path().display(),
            bytes.len()
        );
        Ok(TransientFile { file })
    }
}

/// Relay file that is deleted when dropped
#[derive(Debug)]
pub struct TransientFile {
    file: NamedTempFile,
}

impl TransientFile {
    /// Path of the relay file
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file now, logging instead of failing if removal does not succeed
    pub fn remove(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => debug!("Removed transient file {}", path.display()),
            Err(e) => warn!("Failed to remove transient file {}: {}", path.display(), e),
        }
    }
}
