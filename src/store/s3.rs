//! Amazon S3 object store

use super::{ObjectStore, TelemetryObject};
use crate::error::StoreError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use chrono::DateTime;

#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    /// Resolve credentials through the default AWS provider chain
    pub async fn connect(region: &str, profile: Option<&str>, endpoint_url: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(url) = endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let shared = loader.load().await;

        // Custom endpoints (MinIO, localstack) rarely support virtual-hosted buckets
        let conf = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(endpoint_url.is_some())
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(conf),
        }
    }
}

fn to_telemetry_object(obj: &aws_sdk_s3::types::Object) -> Option<TelemetryObject> {
    let key = obj.key()?;
    let modified = obj.last_modified()?;
    let last_modified = DateTime::from_timestamp(modified.secs(), modified.subsec_nanos())?;
    Some(TelemetryObject {
        key: key.to_string(),
        last_modified,
        size: obj.size().and_then(|s| u64::try_from(s).ok()),
    })
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list(
        &self,
        bucket: &str,
        page_limit: usize,
    ) -> Result<Vec<TelemetryObject>, StoreError> {
        let max_keys = i32::try_from(page_limit).unwrap_or(i32::MAX);
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| StoreError::List {
                bucket: bucket.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let mut objects = Vec::new();
        for obj in response.contents() {
            match to_telemetry_object(obj) {
                Some(t) => objects.push(t),
                None => tracing::warn!("Skipping listing entry without key or timestamp: {:?}", obj.key()),
            }
        }

        if response.is_truncated().unwrap_or(false) {
            tracing::debug!(
                "Bucket {} has more than {} objects; only the first page is considered",
                bucket,
                page_limit
            );
        }

        Ok(objects)
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::Get {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let data = response.body.collect().await.map_err(|e| StoreError::Get {
            key: key.to_string(),
            message: format!("body read failed: {}", e),
        })?;

        Ok(data.into_bytes().to_vec())
    }

    fn backend_name(&self) -> &str {
        "s3"
    }
}
