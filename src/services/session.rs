//! src/services/session.rs
//!
//! StoreSession — the public operations of the client: list, fetch, head,
//! upload (single-shot and multipart), and delete (single object and whole
//! folder). The session owns a backend handle and can be reused across many
//! operations; each call blocks its caller until completion or failure and
//! shares no mutable state with other calls.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::backend::ObjectStoreBackend;
use crate::backend::s3::S3Backend;
use crate::config::StoreConfig;
use crate::errors::{StoreError, StoreResult};
use crate::models::object::{FetchResult, ObjectSummary};

use super::flavor::PrefixRemoval;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A reusable client session against one object store.
pub struct StoreSession {
    pub(crate) backend: Arc<dyn ObjectStoreBackend>,
    pub(crate) removal: Box<dyn PrefixRemoval>,
    pub(crate) config: StoreConfig,
}

impl StoreSession {
    /// Connect to the store described by `config`.
    ///
    /// The session can be reused to run many operations; callers needing
    /// concurrency run separate operations on separate tasks themselves.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        let backend = Arc::new(S3Backend::connect(&config).await);
        Ok(Self::with_backend(config, backend))
    }

    /// Build a session over an existing backend.
    ///
    /// This is the seam tests use to substitute a scripted backend; it also
    /// lets callers share one backend between sessions.
    pub fn with_backend(config: StoreConfig, backend: Arc<dyn ObjectStoreBackend>) -> Self {
        let removal = config.flavor.prefix_removal();
        Self {
            backend,
            removal,
            config,
        }
    }

    /// The configuration this session was built from.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// List every object under `prefix`, following continuation tokens
    /// until the listing is exhausted. Objects come back in store-provided
    /// order.
    pub async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> StoreResult<Vec<ObjectSummary>> {
        let mut objects = Vec::new();
        let mut token = None;

        loop {
            let page = match self.backend.list_page(bucket, prefix, token).await {
                Ok(page) => page,
                Err(err) => {
                    self.log_op("list-objects", bucket, prefix, &format!("list error: {err}"));
                    return Err(err);
                }
            };
            objects.extend(page.objects);
            token = page.next_token;
            if token.is_none() {
                break;
            }
        }

        self.log_op(
            "list-objects",
            bucket,
            prefix,
            &format!("{} objects listed", objects.len()),
        );
        Ok(objects)
    }

    /// Stream one object's bytes into `sink`.
    ///
    /// When `cache_secs` is positive the result carries a `max-age`
    /// cache-control value and an etag derived from the key and the
    /// object's last-modified time, ready to be applied as response
    /// headers.
    pub async fn fetch_object<W>(
        &self,
        bucket: &str,
        key: &str,
        sink: &mut W,
        cache_secs: u32,
    ) -> StoreResult<FetchResult>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let fetched = match self.backend.get_object(bucket, key).await {
            Ok(fetched) => fetched,
            Err(err) => {
                self.log_op("get-object", bucket, key, &format!("get error: {err}"));
                return Err(err);
            }
        };

        let (cache_control, etag) = if cache_secs > 0 {
            let last_modified = fetched.last_modified.unwrap_or_default();
            (
                Some(format!("max-age={cache_secs}")),
                Some(cache_etag(key, &last_modified)),
            )
        } else {
            (None, None)
        };

        let content_type = fetched
            .content_type
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        let mut body = fetched.body;
        let mut bytes_written: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|err| {
                StoreError::transport("get-object", bucket, key, format!("body read: {err}"))
            })?;
            sink.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        sink.flush().await?;

        self.log_op(
            "get-object",
            bucket,
            key,
            &format!("{bytes_written} bytes streamed"),
        );
        Ok(FetchResult {
            bytes_written,
            content_type,
            cache_control,
            etag,
        })
    }

    /// Fetch only the last-modified timestamp of one object, without its
    /// contents.
    pub async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<DateTime<Utc>> {
        match self.backend.head_object(bucket, key).await {
            Ok(Some(last_modified)) => {
                self.log_op("head-object", bucket, key, "head succeeded");
                Ok(last_modified)
            }
            Ok(None) => {
                let err = StoreError::transport("head-object", bucket, key, "object not found");
                self.log_op("head-object", bucket, key, &format!("head error: {err}"));
                Err(err)
            }
            Err(err) => {
                self.log_op("head-object", bucket, key, &format!("head error: {err}"));
                Err(err)
            }
        }
    }

    /// Upload a single file in one request.
    ///
    /// The remote key defaults to the local file's base name and the
    /// content type to a guess from the file name.
    pub async fn upload_file(
        &self,
        local_path: impl AsRef<Path>,
        remote_key: Option<&str>,
        bucket: &str,
        content_type: Option<&str>,
    ) -> StoreResult<()> {
        let path = local_path.as_ref();
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(err) => {
                self.log_op(
                    "upload-file",
                    bucket,
                    &path.display().to_string(),
                    &format!("file open error: {err}"),
                );
                return Err(err.into());
            }
        };

        let key = resolve_key(path, remote_key);
        let content_type = resolve_content_type(path, content_type);

        match self
            .backend
            .put_object(bucket, &key, Bytes::from(data), &content_type)
            .await
        {
            Ok(()) => {
                self.log_op("upload-file", bucket, &key, "put succeeded");
                Ok(())
            }
            Err(err) => {
                self.log_op("upload-file", bucket, &key, &format!("put error: {err}"));
                Err(err)
            }
        }
    }

    /// Upload a single large file as a multipart upload.
    ///
    /// Chunks are streamed from the file in part-size slices rather than
    /// buffering the whole file; the file handle is owned by this call and
    /// closed when it returns, success or failure.
    pub async fn upload_large_file(
        &self,
        local_path: impl AsRef<Path>,
        remote_key: Option<&str>,
        bucket: &str,
        content_type: Option<&str>,
    ) -> StoreResult<()> {
        let path = local_path.as_ref();
        let mut file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(err) => {
                self.log_op(
                    "upload-large-file",
                    bucket,
                    &path.display().to_string(),
                    &format!("file open error: {err}"),
                );
                return Err(err.into());
            }
        };
        let file_size = file.metadata().await?.len();

        let key = resolve_key(path, remote_key);
        let content_type = resolve_content_type(path, content_type);

        let upload = self
            .backend
            .create_multipart_upload(bucket, &key, &content_type)
            .await
            .inspect_err(|err| {
                self.log_op(
                    "upload-large-file",
                    bucket,
                    &key,
                    &format!("create-multipart-upload error: {err}"),
                );
            })?;

        self.run_multipart_upload(&mut file, file_size, &upload).await
    }

    /// Delete one object and wait until the store confirms it is gone.
    ///
    /// Polls head-object at the configured interval; if the object is still
    /// visible when the timeout elapses, a [`StoreError::DeleteTimeout`] is
    /// returned.
    pub async fn remove_file(&self, bucket: &str, key: &str) -> StoreResult<()> {
        if let Err(err) = self.backend.delete_object(bucket, key).await {
            self.log_op("remove-file", bucket, key, &format!("delete error: {err}"));
            return Err(err);
        }

        let started = Instant::now();
        loop {
            match self.backend.head_object(bucket, key).await? {
                None => {
                    self.log_op("remove-file", bucket, key, "delete confirmed");
                    return Ok(());
                }
                Some(_) if started.elapsed() >= self.config.delete_poll_timeout => {
                    let err = StoreError::DeleteTimeout {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        waited: started.elapsed(),
                    };
                    self.log_op("remove-file", bucket, key, &format!("{err}"));
                    return Err(err);
                }
                Some(_) => tokio::time::sleep(self.config.delete_poll_interval).await,
            }
        }
    }

    /// Delete every object under `prefix`, plus the prefix marker where the
    /// configured flavor requires it.
    ///
    /// Deletes are not transactional; a failure surfaces immediately and
    /// already-deleted objects stay deleted.
    pub async fn remove_folder(&self, bucket: &str, prefix: &str) -> StoreResult<()> {
        let objects = self.list_objects(bucket, prefix).await?;
        let keys: Vec<String> = objects.into_iter().map(|o| o.key).collect();

        match self
            .removal
            .remove_prefix(self.backend.as_ref(), bucket, prefix, keys)
            .await
        {
            Ok(()) => {
                self.log_op("remove-folder", bucket, prefix, "folder delete succeeded");
                Ok(())
            }
            Err(err) => {
                self.log_op(
                    "remove-folder",
                    bucket,
                    prefix,
                    &format!("folder delete error: {err}"),
                );
                Err(err)
            }
        }
    }

    /// Emit a structured debug line when debug logging is enabled.
    ///
    /// Side-channel only: never consulted for control flow.
    pub(crate) fn log_op(&self, op: &'static str, bucket: &str, key: &str, message: &str) {
        if self.config.debug {
            tracing::debug!(operation = op, bucket, key, "{message}");
        }
    }
}

/// Remote key: explicit override, or the local file's base name.
fn resolve_key(path: &Path, remote_key: Option<&str>) -> String {
    match remote_key {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Content type: explicit override, or a guess from the file name.
fn resolve_content_type(path: &Path, content_type: Option<&str>) -> String {
    match content_type {
        Some(ct) if !ct.is_empty() => ct.to_string(),
        _ => mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string(),
    }
}

/// Client-side etag for cached fetches: md5 over the key and the object's
/// last-modified time.
fn cache_etag(key: &str, last_modified: &DateTime<Utc>) -> String {
    format!("{:x}", md5::compute(format!("{key}{last_modified}")))
}
