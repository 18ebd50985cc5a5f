//! ZIP archive listing
//!
//! Only the central directory is read: entry names come back in index order and
//! no entry is ever decompressed or written to disk.

use crate::error::ArchiveError;
use log::debug;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Source of entry path strings for an archive stored on disk.
///
/// Names use `/` as the separator; directory entries may carry a trailing `/`.
pub trait ArchiveLister: Send + Sync {
    /// List entry names in the order the archive reports them
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError` if the file cannot be opened or is not a valid archive.
    fn list_entries(&self, path: &Path) -> Result<Vec<String>, ArchiveError>;
}

/// [`ArchiveLister`] backed by the `zip` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipLister;

impl ArchiveLister for ZipLister {
    fn list_entries(&self, path: &Path) -> Result<Vec<String>, ArchiveError> {
        list_zip_entries(path)
    }
}

/// List entry names of the ZIP archive at `path`
///
/// # Errors
///
/// Returns `ArchiveError` if:
/// - The file cannot be opened
/// - The file is not a ZIP archive or its central directory is corrupted
///
/// # Examples
///
/// ```no_run
/// use ziptree_archive::listing::list_zip_entries;
/// use std::path::Path;
///
/// for name in list_zip_entries(Path::new("archive.zip")).unwrap() {
///     println!("{name}");
/// }
/// ```
#[must_use = "this function returns archive entry names that should be processed"]
pub fn list_zip_entries(path: &Path) -> Result<Vec<String>, ArchiveError> {
    let file = File::open(path)?;
    let names = list_zip_entries_from_reader(BufReader::new(file))?;
    debug!("Listed {} entries from {}", names.len(), path.display());
    Ok(names)
}

/// List entry names of a ZIP archive read from any seekable source
///
/// # Errors
///
/// Returns `ArchiveError::InvalidZip` if the data is not a readable ZIP archive.
pub fn list_zip_entries_from_reader<R: Read + Seek>(
    reader: R,
) -> Result<Vec<String>, ArchiveError> {
    let archive = ZipArchive::new(reader)?;

    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        if let Some(name) = archive.name_for_index(i) {
            names.push(name.to_string());
        }
    }

    Ok(names)
}
