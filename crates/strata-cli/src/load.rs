use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use strata_decoder::Row;
use strata_types::{FieldDescriptor, RawValue};
use tracing::debug;

/// Read and validate a rowtype file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a JSON array of
/// descriptors, or any descriptor breaks the shape rules.
pub fn row_type(path: &Path) -> Result<Vec<FieldDescriptor>> {
    let text = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let columns = FieldDescriptor::row_type_from_json(&text)
        .with_context(|| format!("invalid rowtype in {}", path.display()))?;
    debug!(columns = columns.len(), path = %path.display(), "loaded rowtype");
    Ok(columns)
}

/// Read a rows file: a JSON array of rows, each an array of cells.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not an array of
/// arrays.
pub fn rows(path: &Path) -> Result<Vec<Row>> {
    let text = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))?;
    let Value::Array(rows) = value else {
        bail!("{}: expected an array of rows", path.display());
    };
    let rows = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Array(cells) => Ok(cells.into_iter().map(RawValue::from).collect()),
            _ => bail!("{}: row {} is not an array", path.display(), i + 1),
        })
        .collect::<Result<Vec<Row>>>()?;
    debug!(rows = rows.len(), path = %path.display(), "loaded rows");
    Ok(rows)
}
