//! Upload pipeline: multipart body to directory-tree JSON
//!
//! [`UploadHandler::handle`] is a plain function of the request body and headers,
//! independent of any socket or runtime, so it can be driven directly in tests.

use crate::multipart::{extract_file_payload, MultipartError};
use crate::storage::TransientStore;
use crate::types::ErrorResponse;
use axum::http::{header::CONTENT_TYPE, HeaderMap};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use ziptree_archive::{parse_zip_tree, tree_to_json, ArchiveError, ArchiveLister, RolePolicy};

/// Failures of the upload pipeline.
///
/// `Display` carries diagnostic detail for logs; clients only ever see
/// [`UploadError::client_message`].
#[derive(Debug, Error)]
pub enum UploadError {
    /// `Content-Type` has no usable `boundary=` parameter
    #[error("Content-Type header has no boundary parameter")]
    MissingBoundary,

    /// The multipart body did not yield a file payload
    #[error("multipart extraction failed: {0}")]
    Multipart(#[from] MultipartError),

    /// The relay file could not be created or written
    #[error("transient storage failed: {0}")]
    TransientStorage(#[source] io::Error),

    /// The lister rejected the uploaded bytes
    #[error("archive listing failed: {0}")]
    InvalidArchive(#[from] ArchiveError),

    /// Storage and listing did not finish in time
    #[error("archive listing did not finish within {0:?}")]
    ListingTimeout(Duration),

    /// The tree could not be encoded as JSON
    #[error("tree serialization failed: {0}")]
    Render(#[from] serde_json::Error),
}

impl UploadError {
    /// Fixed message returned to the client in `{"error": ...}`
    #[must_use]
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::MissingBoundary => "No boundary found in Content-Type header",
            Self::Multipart(MultipartError::NoFileFieldFound) => {
                "No file found in multipart data"
            }
            Self::Multipart(MultipartError::MalformedMultipartBody { .. }) => {
                "Invalid multipart format - no data separator found"
            }
            Self::Multipart(MultipartError::EmptyFilePayload) => "No file data found",
            Self::TransientStorage(_) => "Failed to create temporary file",
            Self::InvalidArchive(_) => "Failed to parse ZIP file - invalid or corrupted ZIP",
            Self::ListingTimeout(_) => "Timed out while reading ZIP file",
            Self::Render(_) => "Failed to render directory tree",
        }
    }

    /// JSON error body for this failure
    #[must_use]
    pub fn to_json(&self) -> String {
        ErrorResponse::new(self.client_message()).to_json()
    }
}

/// Derive the multipart delimiter (`--` + boundary) from a `Content-Type` value.
///
/// The parameter name is matched literally and case-sensitively. The value ends
/// at the next `;`, is trimmed, and loses one pair of surrounding double quotes.
#[must_use]
pub fn boundary_token(content_type: &str) -> Option<String> {
    const PARAM: &str = "boundary=";

    let start = content_type.find(PARAM)? + PARAM.len();
    let rest = &content_type[start..];
    let value = rest.split(';').next().unwrap_or_default().trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);

    if value.is_empty() {
        None
    } else {
        Some(format!("--{value}"))
    }
}

/// Turns an uploaded multipart body into directory-tree JSON
#[derive(Clone)]
pub struct UploadHandler {
    store: TransientStore,
    lister: Arc<dyn ArchiveLister>,
    policy: RolePolicy,
}

impl UploadHandler {
    /// Create a handler that relays uploads through `store` and lists them with `lister`
    pub fn new(
        store: TransientStore,
        lister: Arc<dyn ArchiveLister>,
        policy: RolePolicy,
    ) -> Self {
        Self {
            store,
            lister,
            policy,
        }
    }

    /// Transient store used for relay files
    #[must_use]
    pub fn store(&self) -> &TransientStore {
        &self.store
    }

    /// Run the pipeline, returning the serialized tree.
    ///
    /// The relay file is removed before this returns, whether listing succeeded or not.
    ///
    /// # Errors
    ///
    /// Returns `UploadError` describing the first stage that failed.
    pub fn handle(&self, body: &[u8], headers: &HeaderMap) -> Result<String, UploadError> {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let boundary = boundary_token(content_type).ok_or(UploadError::MissingBoundary)?;

        let payload = extract_file_payload(body, &boundary)?;
        info!(
            "Extracted {} byte payload from {} byte upload",
            payload.len(),
            body.len()
        );

        let file = self
            .store
            .persist(payload)
            .map_err(UploadError::TransientStorage)?;
        let parsed = parse_zip_tree(self.lister.as_ref(), file.path(), self.policy);
        file.remove();
        let tree = parsed?;

        info!("Built tree with {} nodes", tree.len());
        Ok(tree_to_json(&tree)?)
    }

    /// Run the pipeline and render failures as `{"error": ...}`.
    ///
    /// Every failure is logged at `warn` with its diagnostic detail.
    #[must_use]
    pub fn respond(&self, body: &[u8], headers: &HeaderMap) -> String {
        match self.handle(body, headers) {
            Ok(json) => json,
            Err(e) => {
                warn!("Upload rejected: {}", e);
                e.to_json()
            }
        }
    }
}
