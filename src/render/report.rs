//! HTML report: the records table and both charts on one page

use super::chart::{render_charts, ChartConfig, RenderedChart};
use super::table::RecordsTable;
use super::DisplaySurface;
use crate::error::PipelineError;
use crate::telemetry::reading::Row;
use crate::telemetry::series::SeriesState;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct HtmlReport {
    title: String,
    chart_config: ChartConfig,
    table: RecordsTable,
    charts: Vec<RenderedChart>,
}

impl HtmlReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            chart_config: ChartConfig::default(),
            table: RecordsTable::new(),
            charts: Vec::new(),
        }
    }

    pub fn table(&self) -> &RecordsTable {
        &self.table
    }

    #[cfg(test)]
    pub fn charts(&self) -> &[RenderedChart] {
        &self.charts
    }

    pub fn to_html(&self) -> String {
        let title = crate::shared::escape_xml(&self.title);
        let mut html = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
             <style>body{{font-family:Arial,sans-serif}}table{{border-collapse:collapse}}\
             td,th{{border:1px solid #ccc;padding:2px 6px}}</style>\n</head>\n<body>\n<h1>{title}</h1>\n"
        );
        for chart in &self.charts {
            html.push_str(&format!("<div id=\"{}\" class=\"chart\">\n{}</div>\n", chart.id, chart.svg));
        }
        html.push_str(&self.table.to_html());
        html.push_str("</body>\n</html>\n");
        html
    }

    /// Write `index.html` plus one standalone SVG per chart
    pub fn write_to(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for chart in &self.charts {
            let path = dir.join(format!("{}.svg", chart.id));
            fs::write(&path, &chart.svg)?;
            written.push(path);
        }

        let index = dir.join("index.html");
        fs::write(&index, self.to_html())?;
        written.push(index);

        tracing::info!("Wrote report to {:?}", dir);
        Ok(written)
    }
}

impl DisplaySurface for HtmlReport {
    fn populate_table(&mut self, records: &[Row]) {
        self.table.append(records);
    }

    /// Charts are redrawn from scratch, unlike the table
    fn draw_charts(&mut self, series: &SeriesState) -> Result<(), PipelineError> {
        self.charts = render_charts(series, &self.chart_config)?;
        Ok(())
    }
}
