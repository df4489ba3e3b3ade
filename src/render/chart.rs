//! Moisture line charts rendered to SVG with plotters

use super::overlay::{HoverLabel, DRY_THRESHOLD, HOVER_STYLE, Y_MAX, Y_MIN};
use crate::error::PipelineError;
use crate::telemetry::series::SeriesState;
use plotters::prelude::*;
use serde::Serialize;

/// Settings shared by both charts
#[derive(Debug, Clone, Copy)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub threshold: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 320,
            threshold: DRY_THRESHOLD,
            y_min: Y_MIN,
            y_max: Y_MAX,
        }
    }
}

/// Per-chart identity: canvas id, legend label and line color
#[derive(Debug, Clone, Copy)]
pub struct ChartSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub color: RGBColor,
}

pub const PLANT_A: ChartSpec = ChartSpec {
    id: "plant1MoistureChart",
    label: "Plant 1 Moisture",
    color: RGBColor(75, 192, 192),
};

pub const PLANT_B: ChartSpec = ChartSpec {
    id: "plant2MoistureChart",
    label: "Plant 2 Moisture",
    color: RGBColor(153, 102, 255),
};

#[derive(Debug, Clone, Serialize)]
pub struct RenderedChart {
    pub id: &'static str,
    pub label: &'static str,
    pub svg: String,
    pub hover: Vec<HoverLabel>,
}

fn render_err<E: std::fmt::Display>(e: E) -> PipelineError {
    PipelineError::Render(e.to_string())
}

/// Split values into runs of finite points at 1-based x positions.
///
/// A NaN or infinite value ends the current run, leaving a gap in the line.
pub fn segments(values: &[f64]) -> Vec<Vec<(i32, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, v) in values.iter().enumerate() {
        if v.is_finite() {
            current.push((i as i32 + 1, *v));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// X tick text: reading positions `1..=len` are labelled, the padding ticks are blank
fn position_label(x: i32, len: usize) -> String {
    if x >= 1 && x as usize <= len {
        x.to_string()
    } else {
        String::new()
    }
}

/// Draw one chart from oldest-first `values`.
///
/// `timestamp_at` resolves a display index to the tooltip timestamp.
pub fn render_chart<'a>(
    config: &ChartConfig,
    spec: &ChartSpec,
    values: &[f64],
    timestamp_at: impl Fn(usize) -> Option<&'a str>,
) -> Result<RenderedChart, PipelineError> {
    let len = values.len();
    let x_max = len.max(1) as i32 + 1;
    let in_range = |v: f64| v >= config.y_min && v <= config.y_max;
    let mut svg = String::new();
    let mut hover = Vec::new();

    {
        let root = SVGBackend::with_string(&mut svg, (config.width, config.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(spec.label, ("sans-serif", 16))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(55)
            .build_cartesian_2d(0..x_max, config.y_min..config.y_max)
            .map_err(render_err)?;

        // One tick per integer up to a dozen readings, then plotters thins them out
        chart
            .configure_mesh()
            .x_labels(len.min(12) + 2)
            .y_labels(7)
            .x_label_formatter(&|x| position_label(*x, len))
            .y_label_formatter(&|y| format!("{:.0}", y))
            .y_desc("Moisture")
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(
                [(0, config.threshold), (x_max, config.threshold)],
                RED.stroke_width(2),
            ))
            .map_err(render_err)?;

        for run in segments(values) {
            chart
                .draw_series(LineSeries::new(run, spec.color.stroke_width(1)))
                .map_err(render_err)?;
        }

        let points: Vec<(i32, f64)> = segments(values)
            .into_iter()
            .flatten()
            .filter(|(_, v)| in_range(*v))
            .collect();
        chart
            .draw_series(points.iter().map(|p| Circle::new(*p, 3, spec.color.filled())))
            .map_err(render_err)?;

        for (x, value) in points {
            let display_index = x as usize - 1;
            let timestamp = timestamp_at(display_index).unwrap_or_default();
            let at = chart.backend_coord(&(x, value));
            hover.push(HoverLabel::new(display_index, timestamp, value, at));
        }

        root.present().map_err(render_err)?;
    }

    let skipped = segments(values).iter().flatten().filter(|(_, v)| !in_range(*v)).count();
    if skipped > 0 {
        tracing::debug!("{}: {} readings outside the y range have no hover label", spec.id, skipped);
    }

    Ok(RenderedChart {
        id: spec.id,
        label: spec.label,
        svg: with_overlay(svg, &hover),
        hover,
    })
}

/// Append the hover groups just before the closing `</svg>`
fn with_overlay(mut svg: String, hover: &[HoverLabel]) -> String {
    let mut overlay = format!("<style>{}</style><g class=\"hover-overlay\">", HOVER_STYLE);
    for label in hover {
        overlay.push_str(&label.to_svg());
    }
    overlay.push_str("</g>\n");

    match svg.rfind("</svg>") {
        Some(pos) => svg.insert_str(pos, &overlay),
        None => svg.push_str(&overlay),
    }
    svg
}

/// Render both plant charts in chronological order
pub fn render_charts(
    series: &SeriesState,
    config: &ChartConfig,
) -> Result<Vec<RenderedChart>, PipelineError> {
    let chrono = series.chronological();
    let lookup = |i: usize| series.timestamp_for_display_index(i);

    Ok(vec![
        render_chart(config, &PLANT_A, &chrono.moisture_a, lookup)?,
        render_chart(config, &PLANT_B, &chrono.moisture_b, lookup)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::overlay::Moisture;
    use crate::telemetry::reading::Reading;

    fn series(points: &[(&str, f64, f64)]) -> SeriesState {
        let mut s = SeriesState::new();
        for (ts, a, b) in points {
            s.push(Reading {
                timestamp: ts.to_string(),
                moisture_a: *a,
                moisture_b: *b,
            });
        }
        s
    }

    #[test]
    fn test_segments_break_on_nan() {
        let runs = segments(&[1.0, f64::NAN, 3.0, 4.0, f64::INFINITY]);
        assert_eq!(runs, vec![vec![(1, 1.0)], vec![(3, 3.0), (4, 4.0)]]);
        assert!(segments(&[f64::NAN]).is_empty());
    }

    #[test]
    fn test_charts_plot_oldest_first() {
        // Newest first, as the aggregator produces it
        let s = series(&[
            ("2024-01-01T00:01", 30000.0, 10000.0),
            ("2024-01-01T00:00", 15000.0, 25000.0),
        ]);
        let charts = render_charts(&s, &ChartConfig::default()).unwrap();
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0].id, "plant1MoistureChart");
        assert_eq!(charts[1].id, "plant2MoistureChart");

        let a = &charts[0].hover;
        assert_eq!(a[0].timestamp, "2024-01-01T00:00");
        assert_eq!(a[0].value, 15000.0);
        assert_eq!(a[0].moisture, Moisture::Wet);
        assert_eq!(a[1].timestamp, "2024-01-01T00:01");
        assert_eq!(a[1].moisture, Moisture::Dry);
        assert!(a[0].x < a[1].x);
        // Higher readings sit higher on the canvas
        assert!(a[1].y < a[0].y);

        let b = &charts[1].hover;
        assert_eq!(b[0].moisture, Moisture::Dry);
        assert_eq!(b[1].moisture, Moisture::Wet);
    }

    #[test]
    fn test_svg_carries_overlay() {
        let s = series(&[("t2", 25000.0, 1.0), ("t1", 5000.0, 2.0)]);
        let charts = render_charts(&s, &ChartConfig::default()).unwrap();
        let svg = &charts[0].svg;

        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("hover-overlay"));
        assert!(svg.contains(HOVER_STYLE));
        assert!(svg.contains(">Dry</text>"));
        assert!(svg.contains(">Wet</text>"));
        assert!(svg.find("<title>t1").unwrap() < svg.find("<title>t2").unwrap());
    }

    #[test]
    fn test_nan_points_have_no_hover() {
        let s = series(&[("t3", 1.0, f64::NAN), ("t2", f64::NAN, 2.0), ("t1", 3.0, 3.0)]);
        let charts = render_charts(&s, &ChartConfig::default()).unwrap();

        let a: Vec<usize> = charts[0].hover.iter().map(|h| h.display_index).collect();
        assert_eq!(a, vec![0, 2]);
        let b: Vec<&str> = charts[1].hover.iter().map(|h| h.timestamp.as_str()).collect();
        assert_eq!(b, vec!["t1", "t2"]);
    }

    #[test]
    fn test_empty_series_still_renders_axes() {
        let charts = render_charts(&SeriesState::new(), &ChartConfig::default()).unwrap();
        assert!(charts.iter().all(|c| c.hover.is_empty()));
        assert!(charts[0].svg.contains("<svg"));
    }

    /// Text of every plotters `<text>` element with the given anchor, overlay excluded
    fn tick_texts(svg: &str, anchor: &str) -> Vec<String> {
        let plot = svg.split("<g class=\"hover-overlay\"").next().unwrap();
        let needle = format!("text-anchor=\"{}\"", anchor);
        plot.split("<text ")
            .skip(1)
            .filter(|el| el[..el.find('>').unwrap()].contains(&needle))
            .map(|el| {
                let body = &el[el.find('>').unwrap() + 1..el.find("</text>").unwrap()];
                body.trim().to_string()
            })
            .filter(|t| !t.is_empty())
            .collect()
    }

    #[test]
    fn test_x_ticks_are_reading_positions() {
        let s = series(&[("t3", 1.0, 1.0), ("t2", 2.0, 2.0), ("t1", 3.0, 3.0)]);
        let charts = render_charts(&s, &ChartConfig::default()).unwrap();

        let numeric: Vec<String> = tick_texts(&charts[0].svg, "middle")
            .into_iter()
            .filter(|t| t.parse::<i64>().is_ok())
            .collect();
        assert_eq!(numeric, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_position_label_hides_padding() {
        assert_eq!(position_label(0, 3), "");
        assert_eq!(position_label(1, 3), "1");
        assert_eq!(position_label(3, 3), "3");
        assert_eq!(position_label(4, 3), "");
        assert_eq!(position_label(1, 0), "");
    }

    #[test]
    fn test_y_axis_is_fixed_with_whole_number_ticks() {
        // Readings well inside the range must not rescale the axis
        let s = series(&[("t2", 12000.0, 1.0), ("t1", 11000.0, 2.0)]);
        let charts = render_charts(&s, &ChartConfig::default()).unwrap();

        let ticks = tick_texts(&charts[0].svg, "end");
        assert_eq!(ticks.first().map(String::as_str), Some("0"));
        assert!(ticks.iter().any(|t| t == "30000"));
        assert!(ticks.iter().all(|t| !t.contains('.')), "{:?}", ticks);
    }

    #[test]
    fn test_threshold_line_is_red_at_20000() {
        let s = series(&[("t2", 20000.0, 1.0), ("t1", 5000.0, 2.0)]);
        let charts = render_charts(&s, &ChartConfig::default()).unwrap();
        let at_threshold = charts[0].hover.iter().find(|h| h.value == 20000.0).unwrap();

        let red: Vec<&str> = charts[0]
            .svg
            .split("<polyline ")
            .skip(1)
            .map(|el| &el[..el.find("/>").unwrap()])
            .filter(|el| el.contains("stroke=\"#FF0000\""))
            .collect();
        assert_eq!(red.len(), 1);

        let points = red[0].split("points=\"").nth(1).unwrap();
        let ys: Vec<i32> = points
            .split_whitespace()
            .map(|p| p.split(',').nth(1).unwrap().trim_end_matches('"').parse().unwrap())
            .collect();
        assert!(ys.len() >= 2);
        assert!(ys.iter().all(|y| *y == at_threshold.y), "{:?} vs {}", ys, at_threshold.y);
    }

    #[test]
    fn test_out_of_range_readings_have_no_hover() {
        let s = series(&[("t3", 45000.0, 1.0), ("t2", -5.0, 2.0), ("t1", 30000.0, 3.0)]);
        let charts = render_charts(&s, &ChartConfig::default()).unwrap();

        let a: Vec<&str> = charts[0].hover.iter().map(|h| h.timestamp.as_str()).collect();
        assert_eq!(a, vec!["t1"]);
        assert!(charts[0].hover.iter().all(|h| h.y >= 0 && h.y <= 320));
        assert_eq!(charts[1].hover.len(), 3);
    }
}
