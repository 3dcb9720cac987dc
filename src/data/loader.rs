use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray, UInt32Array, UInt64Array,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::DataError;
use super::model::{CATEGORICAL_COLUMNS, CellValue, REQUIRED_COLUMNS, VideoDataset, VideoRecord};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the video dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming at least the ten schema columns
/// * `.json`    – `[{ "views": 10, "category": "Music", ... }, ...]`
/// * `.parquet` – flat columns of ints, floats, strings or bools
///
/// Every row is validated into a [`VideoRecord`]; the first bad row fails
/// the whole load.
pub fn load_file(path: &Path) -> Result<VideoDataset, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let loaded = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(anyhow::anyhow!("Unsupported file extension: .{other}")),
    };

    match loaded {
        Ok(dataset) => {
            log::info!(
                "Loaded {} videos from {} with columns {:?}",
                dataset.len(),
                path.display(),
                dataset.column_names
            );
            Ok(dataset)
        }
        Err(e) => Err(DataError::Load {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        }),
    }
}

/// Check the header and turn named rows into a dataset.
fn build_dataset(
    column_names: Vec<String>,
    rows: impl IntoIterator<Item = Result<BTreeMap<String, CellValue>>>,
) -> Result<VideoDataset> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|req| !column_names.iter().any(|c| c == req))
        .collect();
    if !missing.is_empty() {
        bail!("missing required column(s): {}", missing.join(", "));
    }

    let mut records = Vec::new();
    for (row_no, row) in rows.into_iter().enumerate() {
        let cells = row?;
        let record = VideoRecord::from_cells(cells)
            .map_err(|reason| anyhow::anyhow!("row {row_no}: {reason}"))?;
        records.push(record);
    }

    if records.is_empty() {
        bail!("dataset contains no rows");
    }

    Ok(VideoDataset::from_records(records, column_names))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one video per line.
/// Rows with a different field count than the header are rejected by the
/// reader. Label columns are read as text; every other cell is inferred.
fn load_csv(path: &Path) -> Result<VideoDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let cells = result
            .with_context(|| format!("CSV row {row_no}"))
            .map(|record| {
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(col, value)| {
                        let cell = if CATEGORICAL_COLUMNS.contains(&col.as_str()) {
                            CellValue::text(value)
                        } else {
                            CellValue::infer(value)
                        };
                        (col.clone(), cell)
                    })
                    .collect::<BTreeMap<_, _>>()
            });
        rows.push(cells);
    }

    build_dataset(headers, rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "views": 1000, "likes": 50, "category": "Gaming", ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<VideoDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut column_names: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for key in obj.keys() {
            if !column_names.contains(key) {
                column_names.push(key.clone());
            }
        }

        let cells: BTreeMap<String, CellValue> = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_cell(val)))
            .collect();
        rows.push(Ok(cells));
    }

    build_dataset(column_names, rows)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<VideoDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for row in 0..batch.num_rows() {
            let mut cells = BTreeMap::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                let value = extract_cell(batch.column(col_idx), row)
                    .with_context(|| format!("Row {row}: failed to read '{}'", field.name()))?;
                cells.insert(field.name().clone(), value);
            }
            rows.push(Ok(cells));
        }
    }

    build_dataset(column_names, rows)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }

    fn downcast<'a, T: 'static>(col: &'a Arc<dyn Array>) -> Result<&'a T> {
        col.as_any()
            .downcast_ref::<T>()
            .with_context(|| format!("unexpected array layout for {:?}", col.data_type()))
    }

    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(downcast::<StringArray>(col)?.value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(downcast::<Int32Array>(col)?.value(row) as i64),
        DataType::Int64 => CellValue::Integer(downcast::<Int64Array>(col)?.value(row)),
        DataType::UInt32 => CellValue::Integer(downcast::<UInt32Array>(col)?.value(row) as i64),
        DataType::UInt64 => {
            let v = downcast::<UInt64Array>(col)?.value(row);
            CellValue::Integer(i64::try_from(v).context("unsigned value exceeds i64")?)
        }
        DataType::Float32 => CellValue::Float(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Float64 => CellValue::Float(downcast::<Float64Array>(col)?.value(row)),
        DataType::Boolean => CellValue::Bool(downcast::<BooleanArray>(col)?.value(row)),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(value)
}
