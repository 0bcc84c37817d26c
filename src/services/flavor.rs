//! Delete-semantics strategies for folder removal.
//!
//! Removing a prefix differs between store flavors: GCS drops empty
//! prefixes on its own, while S3-compatible stores keep an explicit prefix
//! marker object that must be deleted after its contents. Each flavor is a
//! [`PrefixRemoval`] implementation selected once at session construction.

use async_trait::async_trait;

use crate::backend::ObjectStoreBackend;
use crate::config::BackendFlavor;
use crate::errors::StoreResult;

/// Removes every object under a prefix according to one store flavor.
#[async_trait]
pub trait PrefixRemoval: Send + Sync {
    /// Delete `keys` (the already-listed contents of `prefix`) and, where
    /// the flavor requires it, the prefix marker itself.
    ///
    /// Deletes are not transactional: a failure aborts the operation and
    /// may leave the prefix partially deleted.
    async fn remove_prefix(
        &self,
        backend: &dyn ObjectStoreBackend,
        bucket: &str,
        prefix: &str,
        keys: Vec<String>,
    ) -> StoreResult<()>;
}

/// S3-compatible semantics: one bulk delete for the contents, then one
/// explicit delete for the prefix marker object.
pub struct S3PrefixRemoval;

#[async_trait]
impl PrefixRemoval for S3PrefixRemoval {
    async fn remove_prefix(
        &self,
        backend: &dyn ObjectStoreBackend,
        bucket: &str,
        prefix: &str,
        keys: Vec<String>,
    ) -> StoreResult<()> {
        if !keys.is_empty() {
            backend.delete_objects(bucket, &keys).await?;
        }
        backend.delete_object(bucket, prefix).await
    }
}

/// GCS semantics: delete each listed object individually. The store removes
/// the now-empty prefix itself, so skipping the marker is correct here, not
/// an error.
pub struct GcsPrefixRemoval;

#[async_trait]
impl PrefixRemoval for GcsPrefixRemoval {
    async fn remove_prefix(
        &self,
        backend: &dyn ObjectStoreBackend,
        bucket: &str,
        _prefix: &str,
        keys: Vec<String>,
    ) -> StoreResult<()> {
        for key in &keys {
            backend.delete_object(bucket, key).await?;
        }
        Ok(())
    }
}

impl BackendFlavor {
    /// Pick the removal strategy for this flavor.
    pub(crate) fn prefix_removal(self) -> Box<dyn PrefixRemoval> {
        match self {
            BackendFlavor::S3Compatible => Box::new(S3PrefixRemoval),
            BackendFlavor::Gcs => Box::new(GcsPrefixRemoval),
        }
    }
}
