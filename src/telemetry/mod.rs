//! Telemetry pipeline - list, parse and aggregate moisture readings
//!
//! lister -> parser (per object) -> aggregator -> renderers

pub mod aggregator;
pub mod cycle;
pub mod lister;
pub mod parser;
pub mod reading;
pub mod series;

pub use cycle::{fetch_cycle, refresh, CycleOptions};
