//! Represents multipart upload sessions and completed parts.

use serde::{Deserialize, Serialize};

/// A multipart upload in progress on the remote store.
///
/// Lives only for the duration of one large-file upload and must end in
/// either a complete or an abort; leaving it open leaks storage on the
/// remote side.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UploadSession {
    /// Target bucket.
    pub bucket: String,

    /// Object key being uploaded.
    pub key: String,

    /// Upload id issued by the store when the session was created.
    pub upload_id: String,
}

/// One successfully uploaded chunk of a multipart upload.
///
/// The ordered sequence of these must exactly match the parts the file was
/// split into, with no gaps or duplicates, or the finalize call fails.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PartResult {
    /// Part number (1-based, ascending).
    pub part_number: i32,

    /// ETag hash the store returned for this part.
    pub etag: String,
}
