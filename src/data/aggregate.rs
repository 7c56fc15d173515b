use std::collections::BTreeMap;

use super::model::{CellValue, RawTable};
use crate::config::CategoryRange;
use crate::error::{TrendError, TrendResult};

/// Category → metric → mean over the category's rows.
pub type Averages = BTreeMap<String, BTreeMap<String, f64>>;

/// Average every metric over each category's `[start, end)` row slice.
///
/// Ranges are clamped to the table (an inverted range is an empty slice) and
/// may overlap. Null and non-finite cells are skipped; a slice with nothing
/// left to average yields NaN.
pub fn aggregate(
    table: &RawTable,
    row_ranges: &[CategoryRange],
    metrics: &[String],
) -> TrendResult<Averages> {
    // Resolve every column up front so a bad column fails before any work.
    let metric_cols: Vec<(&String, usize)> = metrics
        .iter()
        .map(|m| Ok((m, table.column_index(m)?)))
        .collect::<TrendResult<_>>()?;

    let mut averages = Averages::new();
    for range in row_ranges {
        let rows = table.clamp_range(range.start, range.end);
        if rows.len() != range.end.saturating_sub(range.start) {
            log::warn!(
                "row range {}..{} for '{}' clamped to {}..{} ({} rows in table)",
                range.start,
                range.end,
                range.category,
                rows.start,
                rows.end,
                table.len()
            );
        }

        let mut means = BTreeMap::new();
        for &(metric, col) in &metric_cols {
            let mean = column_mean(table, rows.clone(), col, metric)?;
            means.insert(metric.clone(), mean);
        }
        averages.insert(range.category.clone(), means);
    }
    Ok(averages)
}

fn column_mean(
    table: &RawTable,
    rows: std::ops::Range<usize>,
    col: usize,
    metric: &str,
) -> TrendResult<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for row in rows {
        let cell = table.cell(row, col);
        if let CellValue::Text(value) = cell {
            return Err(TrendError::NonNumeric {
                column: metric.to_string(),
                row,
                value: value.clone(),
            });
        }
        match cell.as_f64() {
            Some(v) if v.is_finite() => {
                sum += v;
                count += 1;
            }
            _ => {}
        }
    }
    Ok(if count == 0 { f64::NAN } else { sum / count as f64 })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORE: &str = "OR Similarity Score";

    fn score_table(values: &[Option<f64>]) -> RawTable {
        let rows = values
            .iter()
            .map(|v| vec![v.map_or(CellValue::Null, CellValue::Float)])
            .collect();
        RawTable::new(vec![SCORE.to_string()], rows)
    }

    fn metrics() -> Vec<String> {
        vec![SCORE.to_string()]
    }

    fn mean_of(averages: &Averages, category: &str) -> f64 {
        averages[category][SCORE]
    }

    #[test]
    fn generic_slice_mean() {
        // Row 0 is outside the range; rows 1..=11 hold 0.1 ..= 1.1.
        let mut values = vec![Some(99.0)];
        values.extend((1..=11).map(|i| Some(i as f64 / 10.0)));
        let table = score_table(&values);

        let averages =
            aggregate(&table, &[CategoryRange::new("Generic", 1, 12)], &metrics()).unwrap();
        assert!((mean_of(&averages, "Generic") - 0.6).abs() < 1e-9);
    }

    #[test]
    fn mean_is_permutation_invariant() {
        let forward = score_table(&[Some(0.0), Some(0.3), Some(0.9), Some(0.4), Some(0.0)]);
        let shuffled = score_table(&[Some(0.0), Some(0.4), Some(0.3), Some(0.9), Some(0.0)]);
        let ranges = [CategoryRange::new("c", 1, 4)];

        let a = mean_of(&aggregate(&forward, &ranges, &metrics()).unwrap(), "c");
        let b = mean_of(&aggregate(&shuffled, &ranges, &metrics()).unwrap(), "c");
        assert!((a - b).abs() < 1e-12);
        assert!((a - 1.6 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_range_is_nan() {
        let table = score_table(&[Some(1.0), Some(2.0)]);
        let averages = aggregate(&table, &[CategoryRange::new("e", 1, 1)], &metrics()).unwrap();
        assert!(mean_of(&averages, "e").is_nan());
    }

    #[test]
    fn out_of_bounds_range_is_clamped() {
        let values: Vec<_> = (0..50).map(|i| Some(i as f64)).collect();
        let table = score_table(&values);
        let averages =
            aggregate(&table, &[CategoryRange::new("wide", 40, 1000)], &metrics()).unwrap();
        let mean = mean_of(&averages, "wide");
        assert!(mean.is_finite());
        assert!((mean - 44.5).abs() < 1e-12);

        let past_end =
            aggregate(&table, &[CategoryRange::new("far", 60, 70)], &metrics()).unwrap();
        assert!(mean_of(&past_end, "far").is_nan());
    }

    #[test]
    fn inverted_range_does_not_raise() {
        let table = score_table(&[Some(1.0), Some(2.0), Some(3.0)]);
        let averages = aggregate(&table, &[CategoryRange::new("inv", 2, 1)], &metrics()).unwrap();
        assert!(mean_of(&averages, "inv").is_nan());
    }

    #[test]
    fn overlapping_ranges_are_independent() {
        let table = score_table(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let ranges = [CategoryRange::new("a", 0, 3), CategoryRange::new("b", 2, 4)];
        let averages = aggregate(&table, &ranges, &metrics()).unwrap();
        assert!((mean_of(&averages, "a") - 2.0).abs() < 1e-12);
        assert!((mean_of(&averages, "b") - 3.5).abs() < 1e-12);
    }

    #[test]
    fn missing_and_non_finite_cells_are_skipped() {
        let table = score_table(&[Some(1.0), None, Some(f64::NAN), Some(f64::INFINITY), Some(3.0)]);
        let averages = aggregate(&table, &[CategoryRange::new("c", 0, 5)], &metrics()).unwrap();
        assert!((mean_of(&averages, "c") - 2.0).abs() < 1e-12);
    }

    #[test]
    fn missing_metric_column() {
        let table = score_table(&[Some(1.0)]);
        let err = aggregate(
            &table,
            &[CategoryRange::new("c", 0, 1)],
            &["AND Similarity Score".to_string()],
        )
        .unwrap_err();
        assert!(matches!(err, TrendError::MissingColumn { column } if column == "AND Similarity Score"));
    }

    #[test]
    fn text_in_metric_column() {
        let table = RawTable::new(
            vec![SCORE.to_string()],
            vec![vec![CellValue::Float(1.0)], vec![CellValue::Text("n/a?".into())]],
        );
        let err = aggregate(&table, &[CategoryRange::new("c", 0, 2)], &metrics()).unwrap_err();
        assert!(matches!(err, TrendError::NonNumeric { row: 1, .. }));
    }

    #[test]
    fn loaded_na_markers_are_skipped() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{SCORE}\n0.2\nn/a\n<NA>\n0.4\n").unwrap();
        let table = crate::data::loader::load_file(file.path()).unwrap();

        let averages =
            aggregate(&table, &[CategoryRange::new("Generic", 0, 4)], &metrics()).unwrap();
        assert!((mean_of(&averages, "Generic") - 0.3).abs() < 1e-9);
    }
}
