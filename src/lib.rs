//! Client-side convenience layer over an S3-compatible object store.
//!
//! Wraps the AWS SDK with a small set of blocking-until-done async
//! operations: list a prefix, stream an object out, upload files (multipart
//! with bounded per-part retry for large ones), and delete objects or whole
//! folders — including the delete-semantics difference between
//! S3-compatible stores and GCS.
//!
//! ```no_run
//! use object_store_client::{StoreConfig, StoreSession};
//!
//! # async fn run() -> object_store_client::StoreResult<()> {
//! let mut config = StoreConfig::from_env()?;
//! config.debug = true;
//! let session = StoreSession::connect(config).await?;
//!
//! session
//!     .upload_large_file("/tmp/backup.tar", None, "my-bucket", None)
//!     .await?;
//! let objects = session.list_objects("my-bucket", "backups/").await?;
//! # let _ = objects;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;

pub use backend::s3::S3Backend;
pub use backend::{FetchedObject, ListPage, ObjectStoreBackend};
pub use config::{BackendFlavor, StoreConfig};
pub use errors::{StoreError, StoreResult};
pub use models::multipart::{PartResult, UploadSession};
pub use models::object::{FetchResult, ObjectSummary};
pub use services::flavor::{GcsPrefixRemoval, PrefixRemoval, S3PrefixRemoval};
pub use services::session::StoreSession;
