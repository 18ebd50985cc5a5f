//! Single-file extraction from a `multipart/form-data` body
//!
//! This is deliberately not a MIME parser. It finds the first part that looks
//! like an uploaded file and returns that part's raw bytes, ignoring every other
//! field, header, and nested boundary.
//!
//! The scan is a small state machine:
//!
//! ```text
//! SeekingFingerprint --found--> SeekingSeparator --found--> SeekingBoundaryEnd --> Trimming
//!        |                            |                            |
//!   NoFileFieldFound        MalformedMultipartBody      (no boundary: run to end of body)
//! ```
//!
//! `Trimming` drops the line break that precedes the closing boundary and fails
//! with `EmptyFilePayload` if nothing is left.

use memchr::memmem;
use thiserror::Error;

/// Header fragments that mark the file-bearing part, in priority order.
///
/// The first fingerprint present anywhere in the body wins, regardless of where
/// a lower-priority fingerprint occurs.
pub const FILE_FIELD_FINGERPRINTS: [&[u8]; 5] = [
    b"Content-Disposition: form-data; name=\"file\"",
    b"Content-Disposition: form-data; name='file'",
    b"Content-Type: application/zip",
    b"Content-Type: application/x-zip-compressed",
    b"Content-Type: application/octet-stream",
];

/// Failures of [`extract_file_payload`]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MultipartError {
    /// No fingerprint from [`FILE_FIELD_FINGERPRINTS`] occurs in the body
    #[error("no file field found in multipart body")]
    NoFileFieldFound,

    /// The file part's headers are never terminated by a blank line
    #[error("no header/body separator after file field header at byte {offset}")]
    MalformedMultipartBody {
        /// Offset of the fingerprint the search started from
        offset: usize,
    },

    /// The payload span is empty once the trailing line break is removed
    #[error("file payload is empty")]
    EmptyFilePayload,
}

/// Blank line that ended the file part's headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `\r\n\r\n`
    Crlf,
    /// `\n\n`, accepted when no CRLF separator follows the fingerprint
    Lf,
}

impl Separator {
    const fn bytes(self) -> &'static [u8] {
        match self {
            Self::Crlf => b"\r\n\r\n",
            Self::Lf => b"\n\n",
        }
    }
}

/// Location of the extracted payload inside the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadSpan {
    /// Index into [`FILE_FIELD_FINGERPRINTS`] of the fingerprint that matched
    pub fingerprint: usize,
    /// Separator that ended the part headers
    pub separator: Separator,
    /// First payload byte
    pub start: usize,
    /// One past the last payload byte
    pub end: usize,
    /// False when the boundary never reappeared and the payload ran to the end
    pub closed_by_boundary: bool,
}

impl PayloadSpan {
    /// Number of payload bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false for a span returned by [`locate_file_payload`]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

enum ScanState {
    SeekingFingerprint,
    SeekingSeparator {
        fingerprint: usize,
        at: usize,
    },
    SeekingBoundaryEnd {
        fingerprint: usize,
        separator: Separator,
        start: usize,
    },
    Trimming {
        fingerprint: usize,
        separator: Separator,
        start: usize,
        end: usize,
        closed_by_boundary: bool,
    },
}

/// Locate the file payload in `body`.
///
/// `boundary` is the full delimiter including its leading `--`.
///
/// # Errors
///
/// Returns `MultipartError` if no file part is found, its headers are not
/// terminated, or its payload is empty.
pub fn locate_file_payload(body: &[u8], boundary: &[u8]) -> Result<PayloadSpan, MultipartError> {
    let mut state = ScanState::SeekingFingerprint;

    loop {
        state = match state {
            ScanState::SeekingFingerprint => {
                let (fingerprint, at) = FILE_FIELD_FINGERPRINTS
                    .iter()
                    .enumerate()
                    .find_map(|(i, needle)| memmem::find(body, needle).map(|at| (i, at)))
                    .ok_or(MultipartError::NoFileFieldFound)?;
                ScanState::SeekingSeparator { fingerprint, at }
            }
            ScanState::SeekingSeparator { fingerprint, at } => {
                let headers = &body[at..];
                let (separator, offset) = [Separator::Crlf, Separator::Lf]
                    .into_iter()
                    .find_map(|sep| memmem::find(headers, sep.bytes()).map(|off| (sep, off)))
                    .ok_or(MultipartError::MalformedMultipartBody { offset: at })?;
                ScanState::SeekingBoundaryEnd {
                    fingerprint,
                    separator,
                    start: at + offset + separator.bytes().len(),
                }
            }
            ScanState::SeekingBoundaryEnd {
                fingerprint,
                separator,
                start,
            } => {
                let found = memmem::find(&body[start..], boundary);
                ScanState::Trimming {
                    fingerprint,
                    separator,
                    start,
                    end: found.map_or(body.len(), |off| start + off),
                    closed_by_boundary: found.is_some(),
                }
            }
            ScanState::Trimming {
                fingerprint,
                separator,
                start,
                mut end,
                closed_by_boundary,
            } => {
                while end > start && matches!(body[end - 1], b'\r' | b'\n') {
                    end -= 1;
                }
                if end <= start {
                    return Err(MultipartError::EmptyFilePayload);
                }
                return Ok(PayloadSpan {
                    fingerprint,
                    separator,
                    start,
                    end,
                    closed_by_boundary,
                });
            }
        };
    }
}

/// Extract the bytes of the file part in `body`.
///
/// `boundary` must already carry the `--` prefix used by the multipart framing.
///
/// # Errors
///
/// See [`locate_file_payload`].
pub fn extract_file_payload<'a>(
    body: &'a [u8],
    boundary: &str,
) -> Result<&'a [u8], MultipartError> {
    let span = locate_file_payload(body, boundary.as_bytes())?;
    Ok(&body[span.start..span.end])
}
