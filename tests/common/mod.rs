//! Scripted in-memory backend used by the integration tests.
//!
//! Records every call the session makes and lets a test script failures
//! (per-part upload failures, abort failure, head-object poll answers)
//! without touching a real store.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;

use object_store_client::{
    FetchedObject, ListPage, ObjectStoreBackend, ObjectSummary, PartResult, StoreError,
    StoreResult, UploadSession,
};

/// Always-fail marker for [`MockBackend::fail_part`].
pub const ALWAYS: u32 = u32::MAX;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListPage { prefix: String, token: Option<String> },
    GetObject { key: String },
    HeadObject { key: String },
    PutObject { key: String, len: usize, content_type: String },
    DeleteObject { key: String },
    DeleteObjects { keys: Vec<String> },
    CreateMultipart { key: String, content_type: String },
    UploadPart { part_number: i32, len: usize },
    CompleteMultipart { parts: Vec<PartResult> },
    AbortMultipart,
}

#[derive(Default)]
pub struct MockBackend {
    pub calls: Mutex<Vec<Call>>,
    /// Listing pages returned in order; a second page implies a token.
    pub pages: Vec<Vec<ObjectSummary>>,
    /// Remaining failures per part number ([`ALWAYS`] never succeeds).
    pub part_failures: Mutex<HashMap<i32, u32>>,
    /// Scripted head-object answers, consumed front to back.
    pub head_answers: Mutex<VecDeque<Option<DateTime<Utc>>>>,
    /// Fallback once the scripted answers run out.
    pub head_default: Option<DateTime<Utc>>,
    /// Body served by get_object.
    pub object_body: Bytes,
    pub object_content_type: Option<String>,
    pub object_last_modified: Option<DateTime<Utc>>,
    pub fail_abort: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script `failures` consecutive failures for one part number.
    pub fn fail_part(self, part_number: i32, failures: u32) -> Self {
        self.part_failures
            .lock()
            .unwrap()
            .insert(part_number, failures);
        self
    }

    /// Script the next head-object answers in order.
    pub fn head_sequence(self, answers: Vec<Option<DateTime<Utc>>>) -> Self {
        *self.head_answers.lock().unwrap() = answers.into();
        self
    }

    pub fn recorded(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn fail(op: &'static str, detail: &str) -> StoreError {
        StoreError::Transport {
            op,
            bucket: "test-bucket".into(),
            key: String::new(),
            message: detail.into(),
        }
    }
}

pub fn summary(key: &str) -> ObjectSummary {
    ObjectSummary {
        key: key.to_string(),
        etag: format!("\"etag-{key}\""),
        size: 1,
        last_modified: DateTime::<Utc>::default(),
    }
}

#[async_trait]
impl ObjectStoreBackend for MockBackend {
    async fn list_page(
        &self,
        _bucket: &str,
        prefix: &str,
        token: Option<String>,
    ) -> StoreResult<ListPage> {
        self.record(Call::ListPage {
            prefix: prefix.to_string(),
            token: token.clone(),
        });
        let index = token
            .as_deref()
            .map(|t| t.parse::<usize>().unwrap())
            .unwrap_or(0);
        let objects = self.pages.get(index).cloned().unwrap_or_default();
        let next_token = if index + 1 < self.pages.len() {
            Some((index + 1).to_string())
        } else {
            None
        };
        Ok(ListPage {
            objects,
            next_token,
        })
    }

    async fn get_object(&self, _bucket: &str, key: &str) -> StoreResult<FetchedObject> {
        self.record(Call::GetObject {
            key: key.to_string(),
        });
        let body = self.object_body.clone();
        Ok(FetchedObject {
            content_type: self.object_content_type.clone(),
            last_modified: self.object_last_modified,
            body: futures::stream::iter(vec![io::Result::Ok(body)]).boxed(),
        })
    }

    async fn head_object(
        &self,
        _bucket: &str,
        key: &str,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        self.record(Call::HeadObject {
            key: key.to_string(),
        });
        let scripted = self.head_answers.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or(self.head_default))
    }

    async fn put_object(
        &self,
        _bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StoreResult<()> {
        self.record(Call::PutObject {
            key: key.to_string(),
            len: body.len(),
            content_type: content_type.to_string(),
        });
        Ok(())
    }

    async fn delete_object(&self, _bucket: &str, key: &str) -> StoreResult<()> {
        self.record(Call::DeleteObject {
            key: key.to_string(),
        });
        Ok(())
    }

    async fn delete_objects(&self, _bucket: &str, keys: &[String]) -> StoreResult<()> {
        self.record(Call::DeleteObjects {
            keys: keys.to_vec(),
        });
        Ok(())
    }

    async fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> StoreResult<UploadSession> {
        self.record(Call::CreateMultipart {
            key: key.to_string(),
            content_type: content_type.to_string(),
        });
        Ok(UploadSession {
            bucket: bucket.to_string(),
            key: key.to_string(),
            upload_id: "upload-1".to_string(),
        })
    }

    async fn upload_part(
        &self,
        _session: &UploadSession,
        part_number: i32,
        body: Bytes,
    ) -> StoreResult<String> {
        self.record(Call::UploadPart {
            part_number,
            len: body.len(),
        });
        let mut failures = self.part_failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(&part_number) {
            if *remaining == ALWAYS {
                return Err(Self::fail("upload-part", "scripted failure"));
            }
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Self::fail("upload-part", "scripted failure"));
            }
        }
        Ok(format!("\"etag-part-{part_number}\""))
    }

    async fn complete_multipart_upload(
        &self,
        _session: &UploadSession,
        parts: &[PartResult],
    ) -> StoreResult<()> {
        self.record(Call::CompleteMultipart {
            parts: parts.to_vec(),
        });
        Ok(())
    }

    async fn abort_multipart_upload(&self, _session: &UploadSession) -> StoreResult<()> {
        self.record(Call::AbortMultipart);
        if self.fail_abort {
            return Err(Self::fail("abort-multipart-upload", "scripted abort failure"));
        }
        Ok(())
    }
}
