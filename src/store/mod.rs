//! Object store backends - where telemetry CSV objects live
//!
//! - s3: Amazon S3 (or any S3-compatible endpoint) via aws-sdk-s3
//! - local: a directory tree, `<root>/<bucket>/<key>`

pub mod local;
#[cfg(test)]
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use crate::config::{Backend, Config};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// S3 never returns more than this many keys per listing page
pub const MAX_PAGE_SIZE: usize = 1000;

/// One stored CSV batch of sensor readings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub size: Option<u64>,
}

impl TelemetryObject {
    pub fn new(key: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            last_modified,
            size: None,
        }
    }
}

/// Storage backend trait
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Fetch a single listing page of at most `page_limit` objects
    async fn list(&self, bucket: &str, page_limit: usize)
        -> Result<Vec<TelemetryObject>, StoreError>;

    /// Read the raw body of one object
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Get storage backend name
    fn backend_name(&self) -> &str;
}

/// Build the backend selected by the config
pub async fn connect(config: &Config) -> anyhow::Result<Arc<dyn ObjectStore>> {
    match config.backend {
        Backend::Local => {
            let root = config
                .local_root
                .clone()
                .ok_or_else(|| anyhow::anyhow!("backend = \"local\" requires local_root"))?;
            tracing::info!("Using local object store at {:?}", root);
            Ok(Arc::new(local::LocalStore::new(root)))
        }
        #[cfg(feature = "s3")]
        Backend::S3 => {
            let store = s3::S3Store::connect(
                &config.region,
                config.profile.as_deref(),
                config.endpoint_url.as_deref(),
            )
            .await;
            tracing::info!("Using S3 object store in region {}", config.region);
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "s3"))]
        Backend::S3 => anyhow::bail!("S3 backend requested but plantwatch was built without the \"s3\" feature"),
    }
}
