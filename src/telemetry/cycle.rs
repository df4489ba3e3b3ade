//! One fetch-and-display cycle

use super::aggregator::{aggregate, Aggregate};
use super::lister::list_recent;
use crate::config::Config;
use crate::error::PipelineError;
use crate::render::DisplaySurface;
use crate::store::ObjectStore;

/// The knobs a cycle needs, taken from the config and CLI overrides
#[derive(Debug, Clone)]
pub struct CycleOptions {
    pub bucket: String,
    pub max_keys: usize,
    pub page_size: usize,
}

impl CycleOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bucket: config.bucket.clone(),
            max_keys: config.max_keys,
            page_size: config.effective_page_size(),
        }
    }

    pub fn with_max_keys(mut self, max_keys: Option<usize>) -> Self {
        if let Some(n) = max_keys {
            self.max_keys = n;
        }
        self
    }
}

/// List the recent objects and aggregate them into a fresh state
pub async fn fetch_cycle(
    store: &dyn ObjectStore,
    opts: &CycleOptions,
) -> Result<Aggregate, PipelineError> {
    let recent = list_recent(store, &opts.bucket, opts.max_keys, opts.page_size).await?;
    let agg = aggregate(store, &opts.bucket, &recent).await?;
    if agg.series.is_empty() {
        tracing::warn!("No readings in the {} most recent objects of {}", recent.len(), opts.bucket);
    }
    tracing::info!(
        "Aggregated {} readings from {} objects in {} ({})",
        agg.series.len(),
        agg.objects,
        opts.bucket,
        store.backend_name()
    );
    Ok(agg)
}

/// Fetch, then hand the result to the display surface.
///
/// The surface is only touched once aggregation has fully succeeded; on a
/// listing or fetch failure it keeps whatever it showed before.
pub async fn refresh(
    store: &dyn ObjectStore,
    opts: &CycleOptions,
    surface: &mut dyn DisplaySurface,
) -> Result<Aggregate, PipelineError> {
    let agg = match fetch_cycle(store, opts).await {
        Ok(agg) => agg,
        Err(e) => {
            tracing::error!("Error fetching or displaying records ({}): {}", e.kind(), e);
            return Err(e);
        }
    };

    surface.populate_table(&agg.records);
    surface.draw_charts(&agg.series)?;
    Ok(agg)
}
