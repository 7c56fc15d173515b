use crate::error::{TrendError, TrendResult};

// ---------------------------------------------------------------------------
// CellValue – a single cell in the raw table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a CSV reader infers.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    /// Numeric view of the cell. Booleans count as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – the loaded input, immutable after load
// ---------------------------------------------------------------------------

/// Rows × named columns. Row order is significant: categories are defined
/// by positional row ranges.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    /// Every row has exactly `columns.len()` cells.
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> TrendResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TrendError::MissingColumn {
                column: name.to_string(),
            })
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        &self.rows[row][col]
    }

    /// Number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Clamp `[start, end)` to the rows that exist. An inverted range
    /// collapses to an empty one at `start`.
    pub fn clamp_range(&self, start: usize, end: usize) -> std::ops::Range<usize> {
        let start = start.min(self.len());
        let end = end.min(self.len()).max(start);
        start..end
    }
}
