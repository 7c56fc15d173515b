//! Chart geometry, computed once from the reshaped records.
//!
//! Everything the plot draws is decided here, so coordinates can be checked
//! without a window. `plot.rs` only turns these into egui_plot items.

use std::collections::BTreeMap;

use eframe::egui::Color32;

use crate::color::{generate_palette, resolve_color};
use crate::config::{ChartConfig, MarkerStyle};
use crate::data::model::RawTable;
use crate::data::reshape::LongRecord;
use crate::error::{TrendError, TrendResult};

pub type Point = [f64; 2];

/// All average markers of one metric, across categories.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSeries {
    pub metric: String,
    pub marker: MarkerStyle,
    pub color: Color32,
    pub points: Vec<Point>,
}

/// Solid line through one category's average markers, in metric order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    pub category: String,
    pub color: Color32,
    pub segments: Vec<Vec<Point>>,
}

/// Faint line through one raw row's metric values.
#[derive(Debug, Clone, PartialEq)]
pub struct RowTrace {
    pub category: String,
    pub row: usize,
    pub segments: Vec<Vec<Point>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub marker: MarkerStyle,
    pub color: Color32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    /// (x position, label) of each category tick.
    pub ticks: Vec<(f64, String)>,
    pub markers: Vec<MarkerSeries>,
    pub trend_lines: Vec<TrendLine>,
    pub row_traces: Vec<RowTrace>,
    /// Keyed by metric identity, not by anything plotted.
    pub legend: Vec<LegendEntry>,
    pub x_label: String,
    pub y_label: String,
}

impl ChartLayout {
    pub fn build(
        records: &[LongRecord],
        table: &RawTable,
        config: &ChartConfig,
    ) -> TrendResult<Self> {
        let styles = config.metric_styles()?;
        let offsets: BTreeMap<&str, f64> = styles
            .iter()
            .map(|s| (s.column.as_str(), s.offset))
            .collect();

        let mut markers = Vec::with_capacity(styles.len());
        let mut legend = Vec::with_capacity(styles.len());
        for style in &styles {
            let color = resolve_color(&style.color)?;
            let points = records
                .iter()
                .filter(|r| r.metric == style.column && r.value.is_finite())
                .map(|r| [r.x(style.offset), r.value])
                .collect();
            markers.push(MarkerSeries {
                metric: style.column.clone(),
                marker: style.marker,
                color,
                points,
            });
            legend.push(LegendEntry {
                label: style.column.clone(),
                marker: style.marker,
                color,
            });
        }

        let line_colors = generate_palette(config.display_order.len());
        let trend_lines = config
            .display_order
            .iter()
            .zip(line_colors)
            .map(|(category, color)| {
                let points: Vec<Point> = records
                    .iter()
                    .filter(|r| &r.category == category)
                    .map(|r| {
                        let offset = offsets.get(r.metric.as_str()).copied().unwrap_or(0.0);
                        [r.x(offset), r.value]
                    })
                    .collect();
                TrendLine {
                    category: category.clone(),
                    color,
                    segments: split_at_gaps(&points),
                }
            })
            .collect();

        let metric_cols: Vec<(usize, f64)> = styles
            .iter()
            .map(|s| Ok((table.column_index(&s.column)?, s.offset)))
            .collect::<TrendResult<_>>()?;

        let mut row_traces = Vec::new();
        for range in &config.row_ranges {
            let ordinal = config
                .display_order
                .iter()
                .position(|c| c == &range.category)
                .ok_or_else(|| {
                    TrendError::Configuration(format!(
                        "category '{}' is missing from the display order",
                        range.category
                    ))
                })?;
            for row in table.clamp_range(range.start, range.end) {
                let points: Vec<Point> = metric_cols
                    .iter()
                    .map(|&(col, offset)| {
                        let y = table.cell(row, col).as_f64().unwrap_or(f64::NAN);
                        [ordinal as f64 + offset, y]
                    })
                    .collect();
                row_traces.push(RowTrace {
                    category: range.category.clone(),
                    row,
                    segments: split_at_gaps(&points),
                });
            }
        }

        let ticks = config
            .display_order
            .iter()
            .enumerate()
            .map(|(i, c)| (i as f64, c.clone()))
            .collect();

        Ok(ChartLayout {
            ticks,
            markers,
            trend_lines,
            row_traces,
            legend,
            x_label: config.x_label.clone(),
            y_label: config.y_label.clone(),
        })
    }

    /// X range that keeps every category tick comfortably inside the plot.
    pub fn x_bounds(&self) -> (f64, f64) {
        (-0.5, self.ticks.len().max(1) as f64 - 0.5)
    }
}

/// Break a polyline wherever y is missing or non-finite, dropping the
/// offending points. Single-point runs are kept so isolated values still
/// show up as a segment of length one.
fn split_at_gaps(points: &[Point]) -> Vec<Vec<Point>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for &p in points {
        if p[1].is_finite() {
            current.push(p);
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}
