//! Object lister: the N most recently modified telemetry objects

use crate::error::PipelineError;
use crate::store::{ObjectStore, TelemetryObject};

/// Newest first, at most `max_keys`. Ties keep page order.
pub fn sort_recent(mut page: Vec<TelemetryObject>, max_keys: usize) -> Vec<TelemetryObject> {
    page.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    page.truncate(max_keys);
    page
}

/// List one page of the bucket and keep the most recent `max_keys` objects.
///
/// Only the first page is read; objects past it are never considered.
pub async fn list_recent(
    store: &dyn ObjectStore,
    bucket: &str,
    max_keys: usize,
    page_size: usize,
) -> Result<Vec<TelemetryObject>, PipelineError> {
    let page = store
        .list(bucket, page_size)
        .await
        .map_err(PipelineError::Listing)?;

    if page.len() >= page_size {
        tracing::debug!(
            "Listing page of {} is full; older objects beyond it are ignored",
            page_size
        );
    }

    let recent = sort_recent(page, max_keys);
    tracing::debug!("Selected {} recent objects from {}", recent.len(), bucket);
    Ok(recent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{at, MemoryStore};

    fn obj(key: &str, secs: i64) -> TelemetryObject {
        TelemetryObject::new(key, at(secs))
    }

    fn keys(objs: &[TelemetryObject]) -> Vec<&str> {
        objs.iter().map(|o| o.key.as_str()).collect()
    }

    #[test]
    fn test_sort_recent_descending_and_truncated() {
        let page = vec![obj("a", 10), obj("b", 30), obj("c", 20), obj("d", 40)];
        let recent = sort_recent(page, 3);
        assert_eq!(keys(&recent), vec!["d", "b", "c"]);
    }

    #[test]
    fn test_sort_recent_length_is_min_of_page_and_max() {
        for max in 0..6 {
            let page: Vec<_> = (0..4).map(|i| obj(&i.to_string(), i)).collect();
            assert_eq!(sort_recent(page, max).len(), max.min(4));
        }
    }

    #[test]
    fn test_sort_recent_ties_keep_page_order() {
        let page = vec![obj("x", 5), obj("y", 5), obj("z", 9)];
        assert_eq!(keys(&sort_recent(page, 10)), vec!["z", "x", "y"]);
    }

    #[tokio::test]
    async fn test_list_recent_only_sees_first_page() {
        let store = MemoryStore::new()
            .with_object("old", 1, "")
            .with_object("mid", 2, "")
            .with_object("new", 3, "");

        let recent = list_recent(&store, "plants", 10, 2).await.unwrap();
        assert_eq!(keys(&recent), vec!["mid", "old"]);
    }

    #[tokio::test]
    async fn test_list_recent_propagates_failure() {
        let store = MemoryStore::new().with_object("a", 1, "").failing_listing();
        let err = list_recent(&store, "plants", 10, 1000).await.unwrap_err();
        assert!(matches!(err, PipelineError::Listing(_)));
    }
}
