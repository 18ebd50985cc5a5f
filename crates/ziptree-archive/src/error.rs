//! Error types for archive operations

use thiserror::Error;

/// Errors that can occur while listing an archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// IO error while opening or reading the archive file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a readable ZIP archive
    #[error("Invalid ZIP archive: {0}")]
    InvalidZip(#[from] zip::result::ZipError),
}
