//! Record parser: object body -> rows

use super::reading::Row;
use crate::error::PipelineError;
use crate::store::ObjectStore;

/// Parse a CSV payload into rows.
///
/// No header row and no schema: rows keep however many fields the line had.
/// Blank lines are skipped.
pub fn parse_csv(text: &str) -> Result<Vec<Row>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(Row::new(record.iter().map(str::to_string).collect()));
    }
    Ok(rows)
}

/// Fetch one object and parse it into rows
pub async fn fetch_rows(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<Vec<Row>, PipelineError> {
    let body = store
        .get(bucket, key)
        .await
        .map_err(|e| PipelineError::fetch(key, e))?;

    let text = String::from_utf8_lossy(&body);
    let rows = parse_csv(&text).map_err(|e| PipelineError::fetch(key, e))?;
    tracing::debug!("Parsed {} rows from {} ({} bytes)", rows.len(), key, body.len());
    Ok(rows)
}
