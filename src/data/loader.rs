use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawTable};
use crate::error::{TrendError, TrendResult};

/// Tokens read as missing, pandas' `read_csv` default `na_values`.
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a score table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` (or anything unrecognised) – comma-delimited with a header row
/// * `.tsv`     – tab-delimited with a header row
/// * `.json`    – `[{ "column": value, ... }, ...]`
/// * `.parquet` – flat scalar columns
pub fn load_file(path: &Path) -> TrendResult<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let file = File::open(path).map_err(|source| TrendError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(file),
        "json" => load_json(file),
        "tsv" => load_delimited(file, b'\t'),
        _ => load_delimited(file, b','),
    }
    .map_err(|e| TrendError::Parse {
        path: path.to_path_buf(),
        message: format!("{e:#}"),
    })?;

    log::debug!(
        "{}: {} rows, columns {:?}",
        path.display(),
        table.len(),
        table.columns
    );
    Ok(table)
}

fn check_header(columns: &[String]) -> Result<()> {
    if columns.is_empty() || columns.iter().all(|c| c.trim().is_empty()) {
        bail!("missing header row");
    }
    let mut seen = BTreeSet::new();
    for col in columns {
        if !seen.insert(col.as_str()) {
            bail!("duplicate column name '{col}'");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line. Every record must have
/// as many fields as the header.
fn load_delimited(file: File, delimiter: u8) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(file);

    let columns: Vec<String> = reader
        .headers()
        .context("reading header")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    check_header(&columns)?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawTable::new(columns, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() || NA_TOKENS.contains(&s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "OR Similarity Score": 0.41, "AND Similarity Score": 0.37, ... },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen order; keys absent from a record are Null.
fn load_json(file: File) -> Result<RawTable> {
    let root: JsonValue =
        serde_json::from_reader(std::io::BufReader::new(file)).context("parsing JSON")?;
    let records = root
        .as_array()
        .context("expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    check_header(&columns)?;

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map_or(CellValue::Null, json_to_cell))
                .collect()
        })
        .collect();

    Ok(RawTable::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) if NA_TOKENS.contains(&s.trim()) => CellValue::Null,
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Flat Parquet file as written by `df.to_parquet()`: one scalar column per
/// table column. Nested columns are kept as text describing their type.
fn load_parquet(file: File) -> Result<RawTable> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    check_header(&columns)?;

    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let widened = batch
            .columns()
            .iter()
            .zip(&columns)
            .map(|(col, name)| widen(col).with_context(|| format!("column '{name}'")))
            .collect::<Result<Vec<_>>>()?;
        for row in 0..batch.num_rows() {
            rows.push(
                widened
                    .iter()
                    .map(|col| extract_cell(col.as_ref(), row))
                    .collect(),
            );
        }
    }

    Ok(RawTable::new(columns, rows))
}

/// Cast narrow integer, half-float and decimal columns to Int64 / Float64 so
/// every numeric column reads as a number.
fn widen(col: &ArrayRef) -> Result<ArrayRef> {
    let target = match col.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => DataType::Int64,
        DataType::UInt64
        | DataType::Float16
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => DataType::Float64,
        _ => return Ok(col.clone()),
    };
    cast(col, &target).with_context(|| format!("casting {} to {target}", col.data_type()))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &dyn Array, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => CellValue::Text(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    fn temp_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn csv_cells_are_typed() {
        let file = temp_file(".csv", "Prompt,Score,Flag\nhello,0.5,True\nworld,,false\nNA,3,x\n");
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.columns, ["Prompt", "Score", "Flag"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(0, 1), &CellValue::Float(0.5));
        assert_eq!(table.cell(0, 2), &CellValue::Bool(true));
        assert_eq!(table.cell(1, 1), &CellValue::Null);
        assert_eq!(table.cell(2, 0), &CellValue::Null);
        assert_eq!(table.cell(2, 1), &CellValue::Integer(3));
        assert_eq!(table.cell(2, 2), &CellValue::Text("x".into()));
    }

    #[test]
    fn pandas_na_tokens_are_missing() {
        let file = temp_file(
            ".csv",
            "Score\n0.2\nn/a\n<NA>\n#NA\n#N/A N/A\n-1.#IND\n1.#QNAN\n-nan\n0.4\n",
        );
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 9);
        assert_eq!(table.cell(0, 0), &CellValue::Float(0.2));
        for row in 1..8 {
            assert_eq!(table.cell(row, 0), &CellValue::Null, "row {row}");
        }
        assert_eq!(table.cell(8, 0), &CellValue::Float(0.4));
    }

    #[test]
    fn tsv_uses_tabs() {
        let file = temp_file(".tsv", "a\tb\n1\t2\n");
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.columns, ["a", "b"]);
        assert_eq!(table.cell(0, 1), &CellValue::Integer(2));
    }

    #[test]
    fn missing_file_is_file_access_error() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, TrendError::FileAccess { .. }));
    }

    #[test]
    fn ragged_rows_are_parse_errors() {
        let file = temp_file(".csv", "a,b\n1,2\n3\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, TrendError::Parse { .. }), "{err}");
    }

    #[test]
    fn empty_and_duplicate_headers_rejected() {
        let empty = temp_file(".csv", "");
        assert!(matches!(
            load_file(empty.path()),
            Err(TrendError::Parse { .. })
        ));

        let dup = temp_file(".csv", "a,a\n1,2\n");
        let err = load_file(dup.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate column"));
    }

    #[test]
    fn json_records_fill_missing_keys() {
        let file = temp_file(".json", r#"[{"a": 1, "b": "x"}, {"a": 2.5}]"#);
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.columns, ["a", "b"]);
        assert_eq!(table.cell(1, 0), &CellValue::Float(2.5));
        assert_eq!(table.cell(1, 1), &CellValue::Null);
    }

    #[test]
    fn json_na_strings_are_missing() {
        let file = temp_file(".json", r#"[{"a": "n/a"}, {"a": "<NA>"}, {"a": "text"}]"#);
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.cell(0, 0), &CellValue::Null);
        assert_eq!(table.cell(1, 0), &CellValue::Null);
        assert_eq!(table.cell(2, 0), &CellValue::Text("text".into()));
    }

    #[test]
    fn json_must_be_array_of_objects() {
        let file = temp_file(".json", r#"{"a": 1}"#);
        assert!(matches!(
            load_file(file.path()),
            Err(TrendError::Parse { .. })
        ));
    }

    #[test]
    fn parquet_scalar_columns() {
        use arrow::array::{Float64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("name", DataType::Utf8, false),
            Field::new("score", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["a", "b"])),
                Arc::new(Float64Array::from(vec![Some(0.25), None])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.columns, ["name", "score"]);
        assert_eq!(table.cell(0, 0), &CellValue::Text("a".into()));
        assert_eq!(table.cell(0, 1), &CellValue::Float(0.25));
        assert_eq!(table.cell(1, 1), &CellValue::Null);
    }

    #[test]
    fn parquet_narrow_numeric_columns_are_widened() {
        use arrow::array::{Decimal128Array, Int8Array, UInt32Array};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("small", DataType::Int8, false),
            Field::new("unsigned", DataType::UInt32, false),
            Field::new("decimal", DataType::Decimal128(10, 4), true),
        ]));
        let decimal = Decimal128Array::from(vec![Some(12_345), None])
            .with_precision_and_scale(10, 4)
            .unwrap();
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int8Array::from(vec![-3, 7])),
                Arc::new(UInt32Array::from(vec![1, 40_000])),
                Arc::new(decimal),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.cell(0, 0), &CellValue::Integer(-3));
        assert_eq!(table.cell(1, 1), &CellValue::Integer(40_000));
        let CellValue::Float(v) = table.cell(0, 2) else {
            panic!("decimal column not numeric: {:?}", table.cell(0, 2));
        };
        assert!((v - 1.2345).abs() < 1e-9);
        assert_eq!(table.cell(1, 2), &CellValue::Null);
    }
}
