//! Chart configuration and the two built-in presets.
//!
//! Every behaviour-shaping value lives in [`ChartConfig`] and is handed to
//! each stage explicitly. A config can also be read from a JSON file with the
//! same field names as the serialized presets (see `--print-config`).

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{TrendError, TrendResult};

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// A named, half-open row range `[start, end)` into the raw table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRange {
    pub category: String,
    pub start: usize,
    pub end: usize,
}

impl CategoryRange {
    pub fn new(category: &str, start: usize, end: usize) -> Self {
        Self {
            category: category.to_string(),
            start,
            end,
        }
    }
}

/// Marker shapes, serialized with their matplotlib symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerStyle {
    #[serde(rename = "o")]
    Circle,
    #[serde(rename = "X")]
    Cross,
    #[serde(rename = "^")]
    TriangleUp,
    #[serde(rename = "s")]
    Square,
    #[serde(rename = "D")]
    Diamond,
    #[serde(rename = "+")]
    Plus,
}

/// Fully resolved display metadata for one metric column.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricStyle {
    pub column: String,
    pub offset: f64,
    pub marker: MarkerStyle,
    pub color: String,
}

// ---------------------------------------------------------------------------
// ChartConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Input table (.csv, .tsv, .json or .parquet).
    pub file_path: PathBuf,

    /// Category → row range, in declaration order.
    pub row_ranges: Vec<CategoryRange>,

    /// Explicit left-to-right order of categories on the x axis.
    pub display_order: Vec<String>,

    /// Metric columns to average, in plotting order.
    pub columns_to_average: Vec<String>,

    pub metric_offsets: BTreeMap<String, f64>,
    pub metric_markers: BTreeMap<String, MarkerStyle>,
    /// CSS color name or `#rrggbb`.
    pub metric_colors: BTreeMap<String, String>,

    #[serde(default = "default_x_label")]
    pub x_label: String,
    #[serde(default = "default_y_label")]
    pub y_label: String,
    #[serde(default)]
    pub title: Option<String>,
}

fn default_x_label() -> String {
    "Prompt Type".to_string()
}

fn default_y_label() -> String {
    "Lole Network Score".to_string()
}

/// Built-in configurations selectable with `--preset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    /// Generic / Extrinsic / Intrinsic hallucination prompts.
    #[default]
    Hallucinations,
    /// Opinion / Factual / Imaginative response types.
    ResponseTypes,
}

const GATE_COLUMNS: [&str; 4] = [
    "OR Similarity Score",
    "AND Similarity Score",
    "NOT XOR Similarity Score",
    "NOT AND Similarity Score",
];

impl Preset {
    pub fn config(self) -> ChartConfig {
        let ranges = match self {
            Preset::Hallucinations => vec![
                CategoryRange::new("Generic", 1, 12),
                CategoryRange::new("Extrinsic", 119, 127),
                CategoryRange::new("Intrinsic", 176, 187),
            ],
            Preset::ResponseTypes => vec![
                CategoryRange::new("Opinion", 1, 12),
                CategoryRange::new("Factual", 59, 70),
                CategoryRange::new("Imaginative", 83, 94),
            ],
        };
        let display_order = ranges.iter().map(|r| r.category.clone()).collect();

        let offsets = [-1.5 * 0.1, -0.5 * 0.1, 0.5 * 0.1, 1.5 * 0.1];
        let markers = [
            MarkerStyle::Circle,
            MarkerStyle::Cross,
            MarkerStyle::TriangleUp,
            MarkerStyle::Square,
        ];
        let colors = ["blue", "orange", "green", "red"];

        let mut metric_offsets = BTreeMap::new();
        let mut metric_markers = BTreeMap::new();
        let mut metric_colors = BTreeMap::new();
        for (i, col) in GATE_COLUMNS.iter().enumerate() {
            metric_offsets.insert(col.to_string(), offsets[i]);
            metric_markers.insert(col.to_string(), markers[i]);
            metric_colors.insert(col.to_string(), colors[i].to_string());
        }

        ChartConfig {
            file_path: PathBuf::from("logic_scores.csv"),
            row_ranges: ranges,
            display_order,
            columns_to_average: GATE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            metric_offsets,
            metric_markers,
            metric_colors,
            x_label: default_x_label(),
            y_label: default_y_label(),
            title: None,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Preset::default().config()
    }
}

impl ChartConfig {
    /// Read and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> TrendResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| TrendError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ChartConfig =
            serde_json::from_str(&text).map_err(|e| TrendError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject duplicated category or metric names.
    ///
    /// Ranges past the end of the table are fine and an inverted range is
    /// only warned about; the aggregator clamps both.
    pub fn validate(&self) -> TrendResult<()> {
        let mut seen = BTreeSet::new();
        for range in &self.row_ranges {
            if range.start > range.end {
                log::warn!(
                    "row range {}..{} for '{}' is inverted and will average no rows",
                    range.start,
                    range.end,
                    range.category
                );
            }
            if !seen.insert(range.category.as_str()) {
                return Err(TrendError::Configuration(format!(
                    "category '{}' has more than one row range",
                    range.category
                )));
            }
        }
        let mut seen = BTreeSet::new();
        for metric in &self.columns_to_average {
            if !seen.insert(metric.as_str()) {
                return Err(TrendError::Configuration(format!(
                    "metric '{metric}' is listed twice"
                )));
            }
        }
        self.metric_styles().map(|_| ())
    }

    /// Resolve offset, marker and color for every metric, in plotting order.
    pub fn metric_styles(&self) -> TrendResult<Vec<MetricStyle>> {
        self.columns_to_average
            .iter()
            .map(|column| {
                let missing = |what: &str| {
                    TrendError::Configuration(format!("metric '{column}' has no {what}"))
                };
                Ok(MetricStyle {
                    column: column.clone(),
                    offset: *self
                        .metric_offsets
                        .get(column)
                        .ok_or_else(|| missing("offset"))?,
                    marker: *self
                        .metric_markers
                        .get(column)
                        .ok_or_else(|| missing("marker"))?,
                    color: self
                        .metric_colors
                        .get(column)
                        .cloned()
                        .ok_or_else(|| missing("color"))?,
                })
            })
            .collect()
    }

    pub fn window_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("Gate Trends – {}", self.file_path.display()))
    }
}
