//! Represents an object (file) stored in a bucket, as seen by a listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in a bucket listing.
///
/// A read-only projection of remote state; never mutated locally.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ObjectSummary {
    /// Object key (path-like identifier within the bucket).
    pub key: String,

    /// Opaque content fingerprint returned by the store.
    pub etag: String,

    /// Size in bytes.
    pub size: i64,

    /// Timestamp when the object was last modified.
    pub last_modified: DateTime<Utc>,
}

/// Outcome of streaming one object to a caller-provided sink.
///
/// The original wrote these straight onto an HTTP response; here they are
/// returned so any HTTP layer can apply them.
#[derive(Clone, Debug)]
pub struct FetchResult {
    /// Number of body bytes copied to the sink.
    pub bytes_written: u64,

    /// Content type reported by the store.
    pub content_type: String,

    /// `max-age=N` directive, present only when caching was requested.
    pub cache_control: Option<String>,

    /// Client-side etag derived from the key and last-modified time,
    /// present only when caching was requested.
    pub etag: Option<String>,
}
