//! File ingestion: CSV and JSON into a [`Dataset`].
//!
//! CSV goes through Polars and is flattened into records; JSON is read with
//! `serde_json`. Either way every field ends up as a [`Value`], with empty
//! strings and nulls normalized to [`Value::Missing`].

use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::error::{InsightError, Result, ResultExt};
use crate::types::{Dataset, Record, Value};

/// Rows sampled by Polars for CSV schema inference.
const CSV_INFER_SCHEMA_ROWS: usize = 100;

/// Load a dataset from a `.csv` or `.json` file.
pub fn load_path(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let dataset = match extension.as_str() {
        "csv" => read_csv(path),
        "json" => read_json(path),
        other => Err(InsightError::UnsupportedFormat(if other.is_empty() {
            path.display().to_string()
        } else {
            format!(".{}", other)
        })),
    }
    .context(format!("While loading {}", path.display()))?;

    info!(
        "Loaded {} ({} rows x {} columns)",
        path.display(),
        dataset.len(),
        dataset.columns().len()
    );
    Ok(dataset)
}

// =============================================================================
// CSV
// =============================================================================

/// Read a CSV file with a header row.
///
/// Parsing is first attempted with `"` quote handling and retried without it.
pub fn read_csv(path: &Path) -> Result<Dataset> {
    if std::fs::metadata(path)?.len() == 0 {
        return Err(InsightError::EmptyDataset);
    }

    let path = PathBuf::from(path);
    let df = match csv_options(Some(b'"'))
        .try_into_reader_with_file_path(Some(path.clone()))?
        .finish()
    {
        Ok(df) => df,
        Err(e) => {
            debug!("Standard CSV loading failed: {}", e);
            csv_options(None)
                .try_into_reader_with_file_path(Some(path))?
                .finish()
                .context("Failed to parse CSV")?
        }
    };

    dataframe_to_dataset(&df)
}

/// Parse CSV content held in memory.
pub fn parse_csv(content: &str) -> Result<Dataset> {
    if content.trim().is_empty() {
        return Err(InsightError::EmptyDataset);
    }

    let df = match csv_options(Some(b'"'))
        .into_reader_with_file_handle(Cursor::new(content.as_bytes().to_vec()))
        .finish()
    {
        Ok(df) => df,
        Err(e) => {
            debug!("Standard CSV parsing failed: {}", e);
            csv_options(None)
                .into_reader_with_file_handle(Cursor::new(content.as_bytes().to_vec()))
                .finish()
                .context("Failed to parse CSV")?
        }
    };

    dataframe_to_dataset(&df)
}

fn csv_options(quote_char: Option<u8>) -> CsvReadOptions {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(CSV_INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(quote_char))
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Values of one column, in row order.
fn series_values(series: &Series) -> Result<Vec<Value>> {
    let dtype = series.dtype();

    if is_numeric_dtype(dtype) {
        let floats = series.cast(&DataType::Float64)?;
        return Ok(floats
            .f64()?
            .into_iter()
            .map(|v| v.map(Value::Number).unwrap_or(Value::Missing))
            .collect());
    }

    let strings = if dtype == &DataType::String {
        series.clone()
    } else {
        series.cast(&DataType::String)?
    };
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.map(Value::text).unwrap_or(Value::Missing))
        .collect())
}

/// Flatten a DataFrame into a dataset, keeping column order.
pub fn dataframe_to_dataset(df: &DataFrame) -> Result<Dataset> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut rows: Vec<Vec<Value>> = vec![Vec::with_capacity(columns.len()); df.height()];
    for column in df.get_columns() {
        let values = series_values(column.as_materialized_series())
            .context(format!("Failed to read column '{}'", column.name()))?;
        for (row, value) in rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    Dataset::from_rows(columns, rows)
}

// =============================================================================
// JSON
// =============================================================================

pub fn read_json(path: &Path) -> Result<Dataset> {
    let content = std::fs::read_to_string(path)?;
    parse_json(&content)
}

/// Parse a JSON array of objects, or a single object as one record.
///
/// Columns appear in first-encounter key order across all objects.
pub fn parse_json(content: &str) -> Result<Dataset> {
    if content.trim().is_empty() {
        return Err(InsightError::EmptyDataset);
    }

    let items = match serde_json::from_str::<JsonValue>(content)? {
        JsonValue::Array(items) => items,
        object @ JsonValue::Object(_) => vec![object],
        _ => {
            return Err(InsightError::UnsupportedFormat(
                "JSON root must be an array of objects or an object".to_string(),
            ));
        }
    };
    if items.is_empty() {
        return Err(InsightError::EmptyDataset);
    }

    let mut columns: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let JsonValue::Object(fields) = item else {
            return Err(InsightError::UnsupportedFormat(format!(
                "JSON element {} is not an object",
                index
            )));
        };

        let mut record = Record::new();
        for (name, value) in fields {
            if seen.insert(name.clone()) {
                columns.push(name.clone());
            }
            record.insert(name, Value::from(value));
        }
        records.push(record);
    }

    Dataset::new(columns, records)
}
