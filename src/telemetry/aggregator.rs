//! Series aggregator: merge rows from every object into one SeriesState

use super::parser::fetch_rows;
use super::reading::Row;
use super::series::SeriesState;
use crate::error::PipelineError;
use crate::store::{ObjectStore, TelemetryObject};
use serde::Serialize;

/// Result of one aggregation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregate {
    pub series: SeriesState,
    /// Every row of every object, in the same order as `series`
    pub records: Vec<Row>,
    pub objects: usize,
    /// Rows that needed NaN substitution
    pub issues: usize,
}

impl Aggregate {
    /// Append one object's rows to the series and the records table
    pub fn extend(&mut self, key: &str, rows: Vec<Row>) {
        for (line, row) in rows.iter().enumerate() {
            let reading = match row.to_reading() {
                Ok(reading) => reading,
                Err(issue) => {
                    tracing::debug!("{} line {}: {}", key, line + 1, issue);
                    self.issues += 1;
                    row.to_reading_lossy()
                }
            };
            self.series.push(reading);
        }
        self.records.extend(rows);
        self.objects += 1;
    }
}

/// Fetch and merge objects one at a time, in the order given.
///
/// Each object is fully appended before the next fetch starts; the first
/// failing fetch aborts the whole pass.
pub async fn aggregate(
    store: &dyn ObjectStore,
    bucket: &str,
    objects: &[TelemetryObject],
) -> Result<Aggregate, PipelineError> {
    let mut acc = Aggregate::default();
    for obj in objects {
        let rows = fetch_rows(store, bucket, &obj.key).await?;
        acc.extend(&obj.key, rows);
    }

    if acc.issues > 0 {
        tracing::warn!(
            "{} of {} rows did not match the timestamp,a,_,b layout",
            acc.issues,
            acc.records.len()
        );
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{at, MemoryStore};

    fn objects(keys: &[&str]) -> Vec<TelemetryObject> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| TelemetryObject::new(*k, at(100 - i as i64)))
            .collect()
    }

    #[tokio::test]
    async fn test_records_are_concatenated_in_listing_order() {
        let store = MemoryStore::new()
            .with_object("b.csv", 2, "b1,1,x,1\nb2,2,x,2\n")
            .with_object("a.csv", 1, "a1,3,x,3\na2,4,x,4\na3,5,x,5\n");

        let agg = aggregate(&store, "plants", &objects(&["b.csv", "a.csv"]))
            .await
            .unwrap();

        let first: Vec<&str> = agg.records.iter().filter_map(|r| r.field(0)).collect();
        assert_eq!(first, vec!["b1", "b2", "a1", "a2", "a3"]);
        assert_eq!(agg.series.timestamps(), first.as_slice());
        assert_eq!(agg.series.moisture_a(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(agg.objects, 2);
        assert_eq!(store.fetched(), vec!["b.csv", "a.csv"]);
    }

    #[test]
    fn test_lengths_equal_after_each_object() {
        let mut agg = Aggregate::default();
        let batches = [
            vec![Row::from(&["t", "1", "x", "2"][..])],
            vec![Row::from(&["t", "1"][..]), Row::default()],
            vec![],
        ];
        for (i, rows) in batches.into_iter().enumerate() {
            agg.extend(&format!("obj{}", i), rows);
            let s = &agg.series;
            assert_eq!(s.timestamps().len(), s.moisture_a().len());
            assert_eq!(s.moisture_a().len(), s.moisture_b().len());
            assert_eq!(s.len(), agg.records.len());
        }
        assert_eq!(agg.issues, 2);
        assert_eq!(agg.objects, 3);
    }

    #[tokio::test]
    async fn test_malformed_rows_degrade_to_nan() {
        let store = MemoryStore::new().with_object("a.csv", 1, "t1,abc,x\nt2,7,x,8\n");

        let agg = aggregate(&store, "plants", &objects(&["a.csv"])).await.unwrap();
        assert_eq!(agg.series.len(), 2);
        assert!(agg.series.moisture_a()[0].is_nan());
        assert!(agg.series.moisture_b()[0].is_nan());
        assert_eq!(agg.series.moisture_b()[1], 8.0);
        assert_eq!(agg.issues, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_before_later_objects() {
        let store = MemoryStore::new()
            .with_object("a.csv", 3, "t,1,x,1")
            .with_object("b.csv", 2, "t,1,x,1")
            .with_object("c.csv", 1, "t,1,x,1")
            .failing_get("b.csv");

        let err = aggregate(&store, "plants", &objects(&["a.csv", "b.csv", "c.csv"]))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { ref key, .. } if key == "b.csv"));
        assert_eq!(store.fetched(), vec!["a.csv", "b.csv"]);
    }
}
