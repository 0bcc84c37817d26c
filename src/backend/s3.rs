//! AWS SDK implementation of [`ObjectStoreBackend`].
//!
//! All authentication, signing, and transport concerns are delegated to
//! `aws-sdk-s3`; this module only adapts its request builders and response
//! shapes to the crate's own types.

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart, Delete, ObjectIdentifier};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio_util::io::ReaderStream;

use crate::config::StoreConfig;
use crate::errors::{StoreError, StoreResult};
use crate::models::multipart::{PartResult, UploadSession};
use crate::models::object::ObjectSummary;

use super::{FetchedObject, ListPage, ObjectStoreBackend};

/// S3-compatible backend over the AWS Rust SDK.
pub struct S3Backend {
    client: Client,
}

impl S3Backend {
    /// Build an SDK client from the session configuration.
    ///
    /// Uses static credentials, an optional custom endpoint, and optional
    /// path-style addressing, matching what self-hosted stores expect.
    pub async fn connect(config: &StoreConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "static",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(SharedCredentialsProvider::new(credentials))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl ObjectStoreBackend for S3Backend {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<String>,
    ) -> StoreResult<ListPage> {
        let resp = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(token)
            .send()
            .await
            .map_err(|e| {
                StoreError::transport("list-objects", bucket, prefix, DisplayErrorContext(&e))
            })?;

        let objects = resp
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|obj| {
                let key = obj.key?;
                Some(ObjectSummary {
                    key,
                    etag: obj.e_tag.unwrap_or_default(),
                    size: obj.size.unwrap_or(0),
                    last_modified: obj.last_modified.map(to_chrono).unwrap_or_default(),
                })
            })
            .collect();

        Ok(ListPage {
            objects,
            next_token: resp.next_continuation_token,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<FetchedObject> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                StoreError::transport("get-object", bucket, key, DisplayErrorContext(&e))
            })?;

        Ok(FetchedObject {
            content_type: resp.content_type,
            last_modified: resp.last_modified.map(to_chrono),
            body: ReaderStream::new(resp.body.into_async_read()).boxed(),
        })
    }

    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<Option<DateTime<Utc>>> {
        match self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(resp) => Ok(Some(resp.last_modified.map(to_chrono).unwrap_or_default())),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(None),
            Err(err) => Err(StoreError::transport(
                "head-object",
                bucket,
                key,
                DisplayErrorContext(&err),
            )),
        }
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StoreResult<()> {
        let length = body.len() as i64;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_length(length)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                StoreError::transport("put-object", bucket, key, DisplayErrorContext(&e))
            })?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                StoreError::transport("delete-object", bucket, key, DisplayErrorContext(&e))
            })?;
        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> StoreResult<()> {
        let identifiers = keys
            .iter()
            .map(|key| {
                ObjectIdentifier::builder().key(key).build().map_err(|e| {
                    StoreError::transport("delete-objects", bucket, key.as_str(), e)
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(false)
            .build()
            .map_err(|e| StoreError::transport("delete-objects", bucket, "", e))?;

        self.client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| {
                StoreError::transport("delete-objects", bucket, "", DisplayErrorContext(&e))
            })?;
        Ok(())
    }

    async fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> StoreResult<UploadSession> {
        let resp = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                StoreError::transport("create-multipart-upload", bucket, key, DisplayErrorContext(&e))
            })?;

        let upload_id = resp.upload_id.ok_or_else(|| StoreError::MissingUploadId {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })?;

        Ok(UploadSession {
            bucket: bucket.to_string(),
            key: key.to_string(),
            upload_id,
        })
    }

    async fn upload_part(
        &self,
        session: &UploadSession,
        part_number: i32,
        body: Bytes,
    ) -> StoreResult<String> {
        let length = body.len() as i64;
        let resp = self
            .client
            .upload_part()
            .bucket(&session.bucket)
            .key(&session.key)
            .upload_id(&session.upload_id)
            .part_number(part_number)
            .body(ByteStream::from(body))
            .content_length(length)
            .send()
            .await
            .map_err(|e| {
                StoreError::transport(
                    "upload-part",
                    &session.bucket,
                    &session.key,
                    DisplayErrorContext(&e),
                )
            })?;

        resp.e_tag.ok_or_else(|| {
            StoreError::transport(
                "upload-part",
                &session.bucket,
                &session.key,
                format!("store returned no etag for part {part_number}"),
            )
        })
    }

    async fn complete_multipart_upload(
        &self,
        session: &UploadSession,
        parts: &[PartResult],
    ) -> StoreResult<()> {
        let completed = parts
            .iter()
            .map(|p| {
                CompletedPart::builder()
                    .part_number(p.part_number)
                    .e_tag(&p.etag)
                    .build()
            })
            .collect();

        self.client
            .complete_multipart_upload()
            .bucket(&session.bucket)
            .key(&session.key)
            .upload_id(&session.upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| {
                StoreError::transport(
                    "complete-multipart-upload",
                    &session.bucket,
                    &session.key,
                    DisplayErrorContext(&e),
                )
            })?;
        Ok(())
    }

    async fn abort_multipart_upload(&self, session: &UploadSession) -> StoreResult<()> {
        self.client
            .abort_multipart_upload()
            .bucket(&session.bucket)
            .key(&session.key)
            .upload_id(&session.upload_id)
            .send()
            .await
            .map_err(|e| {
                StoreError::transport(
                    "abort-multipart-upload",
                    &session.bucket,
                    &session.key,
                    DisplayErrorContext(&e),
                )
            })?;
        Ok(())
    }
}

/// Convert an SDK timestamp to a chrono UTC timestamp.
fn to_chrono(dt: aws_sdk_s3::primitives::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()).unwrap_or_default()
}
