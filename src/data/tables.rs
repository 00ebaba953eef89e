// ============================================================
// Layer 4 - Ground-Truth Tables
// ============================================================
// Reads the delimited files that describe the dataset:
//
//   TextQuery_GT_Train.csv       (;)  "Text Query ID";"Model ID"
//   TextQuery_GT_Validation.csv  (;)  "Text Query ID";"Model ID"
//   TextQuery_Train.csv          (;)  <id>;<text>
//   ModelID.csv                  (,)  ID
//
// Columns are located by header name, except for the query
// text table which is read positionally (first two columns).

use anyhow::{anyhow, Context, Result};
use std::{collections::HashMap, fs::File, path::Path};

use crate::domain::query::{Association, QueryRecord};

pub const QUERY_ID_COLUMN: &str = "Text Query ID";
pub const MODEL_ID_COLUMN: &str = "Model ID";
pub const CATALOG_ID_COLUMN: &str = "ID";

/// Load a ground-truth table as (query, model) rows in file order.
pub fn load_ground_truth(path: &Path, delimiter: u8) -> Result<Vec<Association>> {
    let mut reader = open_reader(path, delimiter)?;
    let headers    = reader
        .headers()
        .with_context(|| format!("Cannot read header of '{}'", path.display()))?
        .clone();

    let query_col = column_index(&headers, QUERY_ID_COLUMN, path)?;
    let model_col = column_index(&headers, MODEL_ID_COLUMN, path)?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("Malformed row {} in '{}'", line + 2, path.display()))?;
        let query_id = field(&record, query_col, line, path)?;
        let model_id = field(&record, model_col, line, path)?;
        rows.push(Association::new(query_id, model_id));
    }

    tracing::debug!("Read {} associations from '{}'", rows.len(), path.display());
    Ok(rows)
}

/// Load the query text table as id → text.
/// A repeated id keeps the last text seen.
pub fn load_query_texts(path: &Path, delimiter: u8) -> Result<HashMap<String, String>> {
    Ok(load_query_records(path, delimiter)?
        .into_iter()
        .map(|r| (r.query_id, r.query_text))
        .collect())
}

/// Load the query text table as records in file order.
pub fn load_query_records(path: &Path, delimiter: u8) -> Result<Vec<QueryRecord>> {
    let mut reader  = open_reader(path, delimiter)?;
    let mut records = Vec::new();

    for (line, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("Malformed row {} in '{}'", line + 2, path.display()))?;
        let id   = field(&record, 0, line, path)?;
        let text = field(&record, 1, line, path)?;
        records.push(QueryRecord::new(id, text));
    }

    Ok(records)
}

/// Load the catalog of every valid model id, in file order.
pub fn load_model_catalog(path: &Path, delimiter: u8) -> Result<Vec<String>> {
    let mut reader = open_reader(path, delimiter)?;
    let headers    = reader
        .headers()
        .with_context(|| format!("Cannot read header of '{}'", path.display()))?
        .clone();
    let id_col = column_index(&headers, CATALOG_ID_COLUMN, path)?;

    let mut ids = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("Malformed row {} in '{}'", line + 2, path.display()))?;
        ids.push(field(&record, id_col, line, path)?);
    }

    Ok(ids)
}

fn open_reader(path: &Path, delimiter: u8) -> Result<csv::Reader<File>> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Cannot open table '{}'", path.display()))
}

/// Find a header by name. Excel exports often start with a BOM,
/// so it is stripped before comparing.
fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        .ok_or_else(|| {
            anyhow!(
                "Column '{}' not found in '{}' (headers: {:?})",
                name,
                path.display(),
                headers.iter().collect::<Vec<_>>()
            )
        })
}

fn field(record: &csv::StringRecord, col: usize, line: usize, path: &Path) -> Result<String> {
    record
        .get(col)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Row {} in '{}' has no column {}", line + 2, path.display(), col))
}
