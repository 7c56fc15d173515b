use std::collections::BTreeSet;

use super::aggregate::Averages;
use crate::error::{TrendError, TrendResult};

/// One (category, metric, value) triple, the unit the renderer consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub category: String,
    /// Position of `category` in the display order; the baseline x.
    pub ordinal: usize,
    pub metric: String,
    pub value: f64,
}

impl LongRecord {
    /// Jittered x-coordinate for this record's metric.
    pub fn x(&self, offset: f64) -> f64 {
        self.ordinal as f64 + offset
    }
}

/// Pivot the averages into long form, categories in `display_order` and
/// metrics in `metrics` order. NaN means pass through untouched.
pub fn reshape(
    averages: &Averages,
    display_order: &[String],
    metrics: &[String],
) -> TrendResult<Vec<LongRecord>> {
    let mut ordered = BTreeSet::new();
    for category in display_order {
        if !ordered.insert(category.as_str()) {
            return Err(TrendError::Configuration(format!(
                "category '{category}' appears twice in the display order"
            )));
        }
        if !averages.contains_key(category) {
            return Err(TrendError::Configuration(format!(
                "category '{category}' is in the display order but has no averages"
            )));
        }
    }
    if let Some(extra) = averages.keys().find(|c| !ordered.contains(c.as_str())) {
        return Err(TrendError::Configuration(format!(
            "category '{extra}' has averages but is missing from the display order"
        )));
    }

    let mut records = Vec::with_capacity(display_order.len() * metrics.len());
    for (ordinal, category) in display_order.iter().enumerate() {
        let means = &averages[category];
        for metric in metrics {
            let value = *means.get(metric).ok_or_else(|| {
                TrendError::Configuration(format!(
                    "no average of '{metric}' for category '{category}'"
                ))
            })?;
            records.push(LongRecord {
                category: category.clone(),
                ordinal,
                metric: metric.clone(),
                value,
            });
        }
    }
    Ok(records)
}
