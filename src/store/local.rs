//! Local directory object store
//!
//! Each bucket is a directory under the root; each file below it is an
//! object whose key is its `/`-separated relative path.

use super::{ObjectStore, TelemetryObject};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.root.join(bucket)
    }
}

fn relative_key(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<&str>>>()?;
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn list(
        &self,
        bucket: &str,
        page_limit: usize,
    ) -> Result<Vec<TelemetryObject>, StoreError> {
        let base = self.bucket_path(bucket);
        if !fs::try_exists(&base).await? {
            return Err(StoreError::NoSuchBucket(bucket.to_string()));
        }

        let mut objects = Vec::new();
        let mut pending = vec![base.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let meta = entry.metadata().await?;
                if meta.is_dir() {
                    pending.push(path);
                    continue;
                }

                let Some(key) = relative_key(&base, &path) else {
                    tracing::warn!("Skipping non UTF-8 path {:?}", path);
                    continue;
                };
                let modified: DateTime<Utc> = meta.modified()?.into();
                objects.push(TelemetryObject {
                    key,
                    last_modified: modified,
                    size: Some(meta.len()),
                });
            }
        }

        // S3 pages are in key order, so the first page is the lexicographically smallest keys
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        objects.truncate(page_limit);
        Ok(objects)
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.bucket_path(bucket).join(key);
        fs::read(&path).await.map_err(|e| StoreError::Get {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    fn backend_name(&self) -> &str {
        "local"
    }
}
