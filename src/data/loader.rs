use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Dataset, Record};

/// Columns every input file must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 5] = ["location", "year", "age", "sex", "val"];

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Loading failures. Fatal at startup (no chart can render without data);
/// recoverable from the Open dialog, where the previous dataset stays active.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: {message}")]
    Malformed { row: usize, message: String },
}

fn malformed(row: usize, message: impl ToString) -> DataLoadError {
    DataLoadError::Malformed {
        row,
        message: message.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a mortality dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row `location, year, age, sex, val` (canonical)
/// * `.json`    – `[{ "location": ..., "year": ..., ... }, ...]`
/// * `.parquet` – flat columns with the same five names
pub fn load(path: &Path) -> Result<Dataset, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataLoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset, DataLoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| from_csv_error(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| malformed(0, format!("reading CSV headers: {e}")))?
        .clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(DataLoadError::MissingColumn(col));
        }
    }

    let mut records = Vec::new();
    for (row, result) in reader.deserialize::<Record>().enumerate() {
        // Rows are 1-based in messages, the header being row 0.
        let record = result.map_err(|e| malformed(row + 1, e))?;
        records.push(record);
    }
    Ok(Dataset::from_records(records))
}

fn from_csv_error(path: &Path, e: csv::Error) -> DataLoadError {
    match e.into_kind() {
        csv::ErrorKind::Io(source) => DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => malformed(0, format!("{other:?}")),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "location": "Chad", "year": 2020, "age": "0-4", "sex": "Male", "val": 120.0 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset, DataLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| malformed(0, format!("invalid JSON: {e}")))?;

    let rows = root
        .as_array()
        .ok_or_else(|| malformed(0, "expected a top-level JSON array"))?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| malformed(i, "not a JSON object"))?;
        for col in REQUIRED_COLUMNS {
            if !obj.contains_key(col) {
                return Err(DataLoadError::MissingColumn(col));
            }
        }

        records.push(Record {
            location: obj["location"]
                .as_str()
                .ok_or_else(|| malformed(i, "'location' is not a string"))?
                .to_string(),
            year: obj["year"]
                .as_i64()
                .ok_or_else(|| malformed(i, "'year' is not an integer"))? as i32,
            age: obj["age"]
                .as_str()
                .ok_or_else(|| malformed(i, "'age' is not a string"))?
                .to_string(),
            sex: obj["sex"]
                .as_str()
                .ok_or_else(|| malformed(i, "'sex' is not a string"))?
                .to_string(),
            val: obj["val"]
                .as_f64()
                .ok_or_else(|| malformed(i, "'val' is not a number"))?,
        });
    }
    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat `location, year, age, sex, val` columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset, DataLoadError> {
    let file = std::fs::File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| malformed(0, format!("reading parquet metadata: {e}")))?;
    let reader = builder
        .build()
        .map_err(|e| malformed(0, format!("building parquet reader: {e}")))?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch =
            batch_result.map_err(|e| malformed(0, format!("reading parquet record batch: {e}")))?;
        let schema = batch.schema();

        let index_of = |name: &'static str| {
            schema
                .index_of(name)
                .map_err(|_| DataLoadError::MissingColumn(name))
        };
        let location_col = batch.column(index_of("location")?);
        let year_col = batch.column(index_of("year")?);
        let age_col = batch.column(index_of("age")?);
        let sex_col = batch.column(index_of("sex")?);
        let val_col = batch.column(index_of("val")?);

        for row in 0..batch.num_rows() {
            let record = (|| -> Result<Record> {
                Ok(Record {
                    location: string_at(location_col, row).context("column 'location'")?,
                    year: int_at(year_col, row).context("column 'year'")? as i32,
                    age: string_at(age_col, row).context("column 'age'")?,
                    sex: string_at(sex_col, row).context("column 'sex'")?,
                    val: float_at(val_col, row).context("column 'val'")?,
                })
            })()
            .map_err(|e| malformed(row, format!("{e:#}")))?;
            records.push(record);
        }
    }
    Ok(Dataset::from_records(records))
}

// -- Parquet / Arrow helpers --

fn string_at(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("expected a string column, got {other:?}"),
    }
}

fn int_at(col: &Arc<dyn Array>, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Ok(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(arr.value(row))
        }
        other => bail!("expected an integer column, got {other:?}"),
    }
}

fn float_at(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            Ok(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            Ok(arr.value(row) as f64)
        }
        // Death counts are sometimes exported as integers.
        DataType::Int32 | DataType::Int64 => Ok(int_at(col, row)? as f64),
        other => bail!("expected a numeric column, got {other:?}"),
    }
}
