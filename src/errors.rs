//! Error taxonomy for the client.
//!
//! Every remote failure is wrapped with the operation name and the affected
//! bucket/key so callers get a descriptive message without digging through
//! SDK error chains. Multipart failures keep both the upload error and any
//! abort error; neither is dropped.

use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A transport or service failure reported by the remote store.
    #[error("{op} failed for bucket `{bucket}` key `{key}`: {message}")]
    Transport {
        op: &'static str,
        bucket: String,
        key: String,
        message: String,
    },

    /// Local file I/O failure (open/stat/read). Never retried.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A part upload kept failing until the retry budget ran out.
    #[error("part {part_number} failed after {attempts} attempts: {source}")]
    PartRetriesExhausted {
        part_number: i32,
        attempts: u32,
        source: Box<StoreError>,
    },

    /// A part upload failed and the multipart session was aborted cleanly.
    #[error("multipart upload aborted after part {part_number} failed: {source}")]
    UploadAborted {
        part_number: i32,
        source: Box<StoreError>,
    },

    /// A part upload failed and aborting the session failed as well.
    #[error(
        "abort of multipart upload `{upload_id}` failed: {abort_error} \
         (original upload error: {upload_error})"
    )]
    AbortFailed {
        upload_id: String,
        abort_error: Box<StoreError>,
        upload_error: Box<StoreError>,
    },

    /// The store accepted a multipart create but returned no upload id.
    #[error("store returned no upload id for bucket `{bucket}` key `{key}`")]
    MissingUploadId { bucket: String, key: String },

    /// An object was still visible after the delete-confirmation window.
    #[error("object `{key}` in bucket `{bucket}` still present after {waited:?}")]
    DeleteTimeout {
        bucket: String,
        key: String,
        waited: Duration,
    },

    /// Configuration could not be assembled (bad env value, missing field).
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Wrap a remote-store failure with operation context.
    pub(crate) fn transport(
        op: &'static str,
        bucket: impl Into<String>,
        key: impl Into<String>,
        err: impl std::fmt::Display,
    ) -> Self {
        StoreError::Transport {
            op,
            bucket: bucket.into(),
            key: key.into(),
            message: err.to_string(),
        }
    }
}
