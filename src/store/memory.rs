//! In-memory store used by the pipeline tests

use super::{ObjectStore, TelemetryObject};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Vec<(TelemetryObject, Vec<u8>)>,
    fail_listing: bool,
    fail_keys: Vec<String>,
    gets: Mutex<Vec<String>>,
}

/// Seconds since the epoch as a UTC timestamp
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, key: &str, modified: i64, body: &str) -> Self {
        self.with_bytes(key, modified, body.as_bytes())
    }

    pub fn with_bytes(mut self, key: &str, modified: i64, body: &[u8]) -> Self {
        self.objects
            .push((TelemetryObject::new(key, at(modified)), body.to_vec()));
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn failing_get(mut self, key: &str) -> Self {
        self.fail_keys.push(key.to_string());
        self
    }

    /// Keys requested through `get`, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(
        &self,
        bucket: &str,
        page_limit: usize,
    ) -> Result<Vec<TelemetryObject>, StoreError> {
        if self.fail_listing {
            return Err(StoreError::List {
                bucket: bucket.to_string(),
                message: "access denied".to_string(),
            });
        }
        Ok(self
            .objects
            .iter()
            .take(page_limit)
            .map(|(obj, _)| obj.clone())
            .collect())
    }

    async fn get(&self, _bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.gets.lock().unwrap().push(key.to_string());
        if self.fail_keys.iter().any(|k| k == key) {
            return Err(StoreError::Get {
                key: key.to_string(),
                message: "connection reset".to_string(),
            });
        }
        let bodies: HashMap<&str, &Vec<u8>> = self
            .objects
            .iter()
            .map(|(obj, body)| (obj.key.as_str(), body))
            .collect();
        bodies
            .get(key)
            .map(|b| (*b).clone())
            .ok_or_else(|| StoreError::Get {
                key: key.to_string(),
                message: "no such key".to_string(),
            })
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
