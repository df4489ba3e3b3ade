//! Renderers - records table, moisture charts, HTML report

pub mod chart;
pub mod overlay;
pub mod report;
pub mod table;

use crate::error::PipelineError;
use crate::telemetry::reading::Row;
use crate::telemetry::series::SeriesState;

/// Where a finished cycle is displayed
pub trait DisplaySurface: Send {
    /// Append the records to the table body
    fn populate_table(&mut self, records: &[Row]);

    /// Draw both moisture charts from the aggregated series
    fn draw_charts(&mut self, series: &SeriesState) -> Result<(), PipelineError>;
}
