//! Centralized client configuration.
//!
//! Everything the original hard-coded (part size, retry budget) or switched
//! on inline (GCS vs S3 delete semantics) is an explicit field here so
//! callers can tune it per deployment.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};

/// Which delete semantics the remote store follows when a folder is removed.
///
/// GCS removes empty prefixes on its own; S3-compatible stores keep the
/// prefix marker object around until it is deleted explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendFlavor {
    #[default]
    S3Compatible,
    Gcs,
}

/// Connection and behavior settings for a [`StoreSession`].
///
/// [`StoreSession`]: crate::services::session::StoreSession
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store region, e.g. `us-east-1`.
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint URL. `None` uses the default AWS endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Static access key id.
    pub access_key: String,

    /// Static secret access key.
    pub secret_key: String,

    /// Force path-style addressing (MinIO and most self-hosted stores).
    #[serde(default)]
    pub force_path_style: bool,

    /// Delete semantics of the remote store.
    #[serde(default)]
    pub flavor: BackendFlavor,

    /// When set, every operation emits a structured debug log line tagged
    /// with the operation name and the affected bucket/key.
    #[serde(default)]
    pub debug: bool,

    /// Size of each multipart chunk in bytes. All parts except the last are
    /// exactly this size. S3 requires at least 5 MB.
    #[serde(default = "default_part_size")]
    pub part_size: usize,

    /// How many times a failed part upload is re-attempted before the whole
    /// upload is aborted. Retries are immediate, with no backoff.
    #[serde(default = "default_part_retries")]
    pub part_retries: u32,

    /// How long a single-object delete waits for the object to disappear.
    #[serde(default = "default_delete_poll_timeout", with = "duration_millis")]
    pub delete_poll_timeout: Duration,

    /// Interval between head-object polls while confirming a delete.
    #[serde(default = "default_delete_poll_interval", with = "duration_millis")]
    pub delete_poll_interval: Duration,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_part_size() -> usize {
    6_000_000
}

fn default_part_retries() -> u32 {
    2
}

fn default_delete_poll_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_delete_poll_interval() -> Duration {
    Duration::from_millis(500)
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(de)?))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint: None,
            access_key: String::new(),
            secret_key: String::new(),
            force_path_style: false,
            flavor: BackendFlavor::default(),
            debug: false,
            part_size: default_part_size(),
            part_retries: default_part_retries(),
            delete_poll_timeout: default_delete_poll_timeout(),
            delete_poll_interval: default_delete_poll_interval(),
        }
    }
}

impl StoreConfig {
    /// Assemble a configuration from `S3_*` environment variables.
    ///
    /// `S3_ACCESS_KEY` and `S3_SECRET_KEY` are required; everything else
    /// falls back to the defaults above.
    pub fn from_env() -> StoreResult<Self> {
        let access_key = env::var("S3_ACCESS_KEY")
            .map_err(|_| StoreError::Config("S3_ACCESS_KEY is not set".into()))?;
        let secret_key = env::var("S3_SECRET_KEY")
            .map_err(|_| StoreError::Config("S3_SECRET_KEY is not set".into()))?;

        let flavor = if env_flag("S3_GCS")? {
            BackendFlavor::Gcs
        } else {
            BackendFlavor::S3Compatible
        };

        Ok(Self {
            region: env::var("S3_REGION").unwrap_or_else(|_| default_region()),
            endpoint: env::var("S3_ENDPOINT").ok().filter(|e| !e.is_empty()),
            access_key,
            secret_key,
            force_path_style: env_flag("S3_FORCE_PATH_STYLE")?,
            flavor,
            debug: env_flag("S3_DEBUG")?,
            ..Self::default()
        })
    }
}

/// Read a boolean environment flag, treating absence as `false`.
fn env_flag(name: &str) -> StoreResult<bool> {
    match env::var(name) {
        Ok(value) => value
            .parse::<bool>()
            .map_err(|_| StoreError::Config(format!("{name} must be `true` or `false`, got `{value}`"))),
        Err(env::VarError::NotPresent) => Ok(false),
        Err(err) => Err(StoreError::Config(format!("reading {name}: {err}"))),
    }
}
