//! Moisture telemetry tools

use crate::config::Config;
use crate::error::PipelineError;
use crate::render::overlay::{classify, Moisture, DRY_THRESHOLD};
use crate::render::report::HtmlReport;
use crate::shared::{format_bytes, format_duration, internal_error};
use crate::store::{ObjectStore, TelemetryObject};
use crate::telemetry::lister::list_recent;
use crate::telemetry::series::SeriesState;
use crate::telemetry::{fetch_cycle, refresh, CycleOptions};
use chrono::{DateTime, Utc};
use rmcp::{model::*, ErrorData as McpError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// === Parameter Types ===

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecentParams {
    #[schemars(description = "How many of the most recent telemetry objects to use (default from config, usually 10)")]
    pub max_keys: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClassifyParams {
    #[schemars(description = "Raw moisture sensor reading")]
    pub value: f64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReportParams {
    #[schemars(description = "How many of the most recent telemetry objects to use (default from config, usually 10)")]
    pub max_keys: Option<usize>,
    #[schemars(description = "Directory to write index.html and the chart SVGs into (default from config)")]
    pub output_dir: Option<String>,
}

// === Output Types ===

#[derive(Debug, Serialize)]
pub struct SeriesPoint {
    /// 1-based chart position, oldest first
    pub position: usize,
    pub timestamp: String,
    pub plant1: Option<f64>,
    pub plant1_state: Option<Moisture>,
    pub plant2: Option<f64>,
    pub plant2_state: Option<Moisture>,
}

#[derive(Debug, Serialize)]
pub struct SeriesReport {
    pub bucket: String,
    pub objects: usize,
    pub readings: usize,
    pub malformed_rows: usize,
    pub threshold: f64,
    pub points: Vec<SeriesPoint>,
}

// === Helper Functions ===

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Chronological points with their classification; non-numeric readings are null
pub fn series_points(series: &SeriesState) -> Vec<SeriesPoint> {
    let chrono = series.chronological();
    chrono
        .timestamps
        .iter()
        .enumerate()
        .map(|(i, ts)| {
            let plant1 = finite(chrono.moisture_a[i]);
            let plant2 = finite(chrono.moisture_b[i]);
            SeriesPoint {
                position: i + 1,
                timestamp: ts.clone(),
                plant1,
                plant1_state: plant1.map(classify),
                plant2,
                plant2_state: plant2.map(classify),
            }
        })
        .collect()
}

/// Log an aborted cycle the way `refresh` does, then turn it into a tool error
fn cycle_error(e: PipelineError) -> McpError {
    tracing::error!("Error fetching records ({}): {}", e.kind(), e);
    internal_error(format!("{} failed: {}", e.kind(), e))
}

fn describe_object(obj: &TelemetryObject, now: DateTime<Utc>) -> String {
    let age = (now - obj.last_modified).num_seconds().max(0) as u64;
    let size = obj.size.map(format_bytes).unwrap_or_else(|| "?".into());
    format!(
        "  {} ({}, modified {} - {} ago)\n",
        obj.key,
        size,
        obj.last_modified.format("%Y-%m-%d %H:%M:%S UTC"),
        format_duration(age)
    )
}

// === Tool Functions ===

pub async fn list_recent_objects(
    store: &dyn ObjectStore,
    config: &Config,
    params: RecentParams,
) -> Result<CallToolResult, McpError> {
    let opts = CycleOptions::from_config(config).with_max_keys(params.max_keys);
    let recent = list_recent(store, &opts.bucket, opts.max_keys, opts.page_size)
        .await
        .map_err(cycle_error)?;

    if recent.is_empty() {
        return Ok(CallToolResult::success(vec![Content::text(format!(
            "No telemetry objects in {}",
            opts.bucket
        ))]));
    }

    let now = Utc::now();
    let mut output = format!("{} recent object(s) in {}, newest first:\n\n", recent.len(), opts.bucket);
    for obj in &recent {
        output.push_str(&describe_object(obj, now));
    }

    Ok(CallToolResult::success(vec![Content::text(output)]))
}

pub async fn get_moisture_series(
    store: &dyn ObjectStore,
    config: &Config,
    params: RecentParams,
) -> Result<CallToolResult, McpError> {
    let opts = CycleOptions::from_config(config).with_max_keys(params.max_keys);
    let agg = fetch_cycle(store, &opts).await.map_err(cycle_error)?;

    let report = SeriesReport {
        bucket: opts.bucket,
        objects: agg.objects,
        readings: agg.series.len(),
        malformed_rows: agg.issues,
        threshold: DRY_THRESHOLD,
        points: series_points(&agg.series),
    };
    let json = serde_json::to_string_pretty(&report).map_err(|e| internal_error(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

pub async fn get_records_table(
    store: &dyn ObjectStore,
    config: &Config,
    params: RecentParams,
) -> Result<CallToolResult, McpError> {
    let opts = CycleOptions::from_config(config).with_max_keys(params.max_keys);
    let agg = fetch_cycle(store, &opts).await.map_err(cycle_error)?;

    let mut table = crate::render::table::RecordsTable::new();
    table.append(&agg.records);

    let output = format!(
        "{} record(s) from {} object(s), newest object first:\n\n{}",
        table.len(),
        agg.objects,
        table.to_text()
    );
    Ok(CallToolResult::success(vec![Content::text(output)]))
}

pub async fn classify_moisture(params: ClassifyParams) -> Result<CallToolResult, McpError> {
    if !params.value.is_finite() {
        return Err(internal_error("Value must be a finite number"));
    }
    let state = classify(params.value);
    let output = format!(
        "{} -> {} (dry above {})",
        params.value,
        state.label(),
        DRY_THRESHOLD
    );
    Ok(CallToolResult::success(vec![Content::text(output)]))
}

pub async fn render_report(
    store: &dyn ObjectStore,
    config: &Config,
    params: ReportParams,
) -> Result<CallToolResult, McpError> {
    let opts = CycleOptions::from_config(config).with_max_keys(params.max_keys);
    let dir = params
        .output_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| config.output_dir.clone());

    let mut report = HtmlReport::new(format!("Soil moisture - {}", opts.bucket));
    let agg = refresh(store, &opts, &mut report)
        .await
        .map_err(|e| internal_error(format!("{} failed: {}", e.kind(), e)))?;
    let written = report
        .write_to(&dir)
        .map_err(|e| internal_error(format!("Failed to write report: {}", e)))?;

    let mut output = format!(
        "Rendered {} readings from {} object(s):\n\n",
        agg.series.len(),
        agg.objects
    );
    for path in written {
        output.push_str(&format!("  {}\n", path.display()));
    }
    Ok(CallToolResult::success(vec![Content::text(output)]))
}
