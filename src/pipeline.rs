//! load → aggregate → reshape → lay out, run once before the window opens.

use anyhow::{Context, Result};

use crate::config::ChartConfig;
use crate::data::aggregate::{aggregate, Averages};
use crate::data::loader::load_file;
use crate::data::model::RawTable;
use crate::data::reshape::{reshape, LongRecord};
use crate::ui::layout::ChartLayout;

/// Everything computed for one run. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct TrendChart {
    pub config: ChartConfig,
    pub table: RawTable,
    pub averages: Averages,
    pub records: Vec<LongRecord>,
    pub layout: ChartLayout,
}

impl TrendChart {
    /// Rows actually averaged for `category` after clamping.
    pub fn rows_used(&self, category: &str) -> usize {
        self.config
            .row_ranges
            .iter()
            .find(|r| r.category == category)
            .map_or(0, |r| self.table.clamp_range(r.start, r.end).len())
    }

    pub fn average(&self, category: &str, metric: &str) -> f64 {
        self.averages
            .get(category)
            .and_then(|m| m.get(metric))
            .copied()
            .unwrap_or(f64::NAN)
    }
}

pub fn run(config: ChartConfig) -> Result<TrendChart> {
    let path = config.file_path.display().to_string();

    let table = load_file(&config.file_path).with_context(|| format!("loading {path}"))?;
    if table.is_empty() {
        log::warn!("{path} has no data rows; every average will be NaN");
    }
    log::info!(
        "Loaded {} rows with columns {:?}",
        table.len(),
        table.columns
    );

    let averages = aggregate(&table, &config.row_ranges, &config.columns_to_average)
        .with_context(|| format!("averaging metrics from {path}"))?;
    for (category, means) in &averages {
        log::debug!("{category}: {means:?}");
    }

    let records = reshape(&averages, &config.display_order, &config.columns_to_average)
        .context("reshaping averages into per-metric records")?;

    let layout = ChartLayout::build(&records, &table, &config)
        .with_context(|| format!("laying out chart for {path}"))?;
    log::info!(
        "{} categories × {} metrics, {} row traces",
        config.display_order.len(),
        config.columns_to_average.len(),
        layout.row_traces.len()
    );

    Ok(TrendChart {
        config,
        table,
        averages,
        records,
        layout,
    })
}
