//! Backend seam between the high-level operations and the remote store.
//!
//! [`ObjectStoreBackend`] covers exactly the primitives the session needs:
//! one listing page, single-object get/head/put/delete, bulk delete, and
//! the four multipart calls. The production implementation lives in
//! [`s3::S3Backend`]; tests drive the same trait with a scripted mock.

pub mod s3;

use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use crate::errors::StoreResult;
use crate::models::multipart::{PartResult, UploadSession};
use crate::models::object::ObjectSummary;

/// One page of a prefix listing.
#[derive(Debug)]
pub struct ListPage {
    /// Objects in store-provided order.
    pub objects: Vec<ObjectSummary>,
    /// Continuation token for the next page, if the listing was truncated.
    pub next_token: Option<String>,
}

/// An object fetched for streaming out.
pub struct FetchedObject {
    /// Content type reported by the store.
    pub content_type: Option<String>,
    /// Last-modified timestamp reported by the store.
    pub last_modified: Option<DateTime<Utc>>,
    /// Body chunks.
    pub body: BoxStream<'static, io::Result<Bytes>>,
}

/// Primitive operations against the remote object store.
///
/// Implementations perform the authenticated network calls; retry policy,
/// part tracking, and flavor branching all live above this trait.
#[async_trait]
pub trait ObjectStoreBackend: Send + Sync {
    /// Fetch one listing page under `prefix`, optionally continuing from a
    /// previous page's token.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<String>,
    ) -> StoreResult<ListPage>;

    /// Open an object for reading.
    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<FetchedObject>;

    /// Fetch only the last-modified timestamp. `None` means the object does
    /// not exist (used by delete confirmation polling).
    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<Option<DateTime<Utc>>>;

    /// Upload a whole object in one request.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StoreResult<()>;

    /// Delete a single object.
    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()>;

    /// Delete many objects in one request.
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> StoreResult<()>;

    /// Start a multipart upload and return its session handle.
    async fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> StoreResult<UploadSession>;

    /// Upload one part; returns the etag the store assigned to it.
    async fn upload_part(
        &self,
        session: &UploadSession,
        part_number: i32,
        body: Bytes,
    ) -> StoreResult<String>;

    /// Finalize a multipart upload from its ordered part list.
    async fn complete_multipart_upload(
        &self,
        session: &UploadSession,
        parts: &[PartResult],
    ) -> StoreResult<()>;

    /// Abort a multipart upload, releasing the remote-held resource.
    async fn abort_multipart_upload(&self, session: &UploadSession) -> StoreResult<()>;
}
