//! Wire shapes for the spreadsheet table endpoint.
//!
//! A table travels as a header row plus data rows. Spreadsheet cells are loosely
//! typed: numbers may come back as JSON numbers or as numeric text, and trailing
//! empty cells are often omitted, so decoding is tolerant about representation
//! and strict about meaning.

use liftlog_core::model::{ExerciseCatalog, Ledger};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::repository::{DATA_COLUMNS, EXERCISES_COLUMN, EntryRecord, StorageError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDto {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl TableDto {
    #[must_use]
    pub fn from_ledger(ledger: &Ledger) -> Self {
        let rows = ledger
            .entries()
            .iter()
            .map(|entry| {
                let record = EntryRecord::from_entry(entry);
                vec![
                    Value::from(record.name),
                    Value::from(record.timestamp),
                    Value::from(record.exercise),
                    Value::from(record.weight),
                    Value::from(record.sets),
                    Value::from(record.reps),
                    Value::from(record.last_set),
                    Value::from(record.effort),
                ]
            })
            .collect();
        Self {
            columns: DATA_COLUMNS.iter().map(|c| (*c).to_owned()).collect(),
            rows,
        }
    }

    #[must_use]
    pub fn from_catalog(catalog: &ExerciseCatalog) -> Self {
        Self {
            columns: vec![EXERCISES_COLUMN.to_owned()],
            rows: catalog
                .names()
                .iter()
                .map(|name| vec![Value::from(name.as_str())])
                .collect(),
        }
    }

    /// Decode the `Data` table.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Schema` if the header differs from the entry
    /// columns or any non-blank row fails to decode.
    pub fn into_ledger(self) -> Result<Ledger, StorageError> {
        expect_columns(&self.columns, &DATA_COLUMNS)?;
        let mut entries = Vec::with_capacity(self.rows.len());
        for (idx, row) in self.rows.iter().enumerate() {
            if is_blank(row) {
                continue;
            }
            let entry = decode_row(row)
                .map_err(StorageError::Schema)
                .and_then(EntryRecord::into_entry)
                .map_err(|err| match err {
                    StorageError::Schema(msg) => StorageError::Schema(format!("row {idx}: {msg}")),
                    other => other,
                })?;
            entries.push(entry);
        }
        Ok(Ledger::from_entries(entries))
    }

    /// Decode the `Exercises` table, skipping blank cells.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Schema` if the header is not the single catalog column.
    pub fn into_catalog(self) -> Result<ExerciseCatalog, StorageError> {
        expect_columns(&self.columns, &[EXERCISES_COLUMN])?;
        let cells = self
            .rows
            .iter()
            .filter_map(|row| row.first())
            .filter_map(|cell| text(cell).ok());
        Ok(ExerciseCatalog::from_cells(cells))
    }
}

fn expect_columns(found: &[String], expected: &[&str]) -> Result<(), StorageError> {
    let matches = found.len() == expected.len()
        && found
            .iter()
            .zip(expected)
            .all(|(f, e)| f.trim().eq_ignore_ascii_case(e));
    if matches {
        Ok(())
    } else {
        tracing::warn!(?found, ?expected, "remote table header mismatch");
        Err(StorageError::Schema(format!(
            "expected columns {expected:?}, found {found:?}"
        )))
    }
}

fn is_blank(row: &[Value]) -> bool {
    row.iter().all(|cell| match cell {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

fn decode_row(row: &[Value]) -> Result<EntryRecord, String> {
    let cell = |idx: usize| row.get(idx).unwrap_or(&Value::Null);
    let column = |idx: usize| DATA_COLUMNS.get(idx).copied().unwrap_or("?");
    let field = |idx: usize, msg: String| format!("{}: {msg}", column(idx));

    Ok(EntryRecord {
        name: text(cell(0)).map_err(|m| field(0, m))?,
        timestamp: text(cell(1)).map_err(|m| field(1, m))?,
        exercise: text(cell(2)).map_err(|m| field(2, m))?,
        weight: number(cell(3)).map_err(|m| field(3, m))?,
        sets: integer(cell(4)).map_err(|m| field(4, m))?,
        reps: integer(cell(5)).map_err(|m| field(5, m))?,
        last_set: integer(cell(6)).map_err(|m| field(6, m))?,
        effort: integer(cell(7)).map_err(|m| field(7, m))?,
    })
}

fn text(cell: &Value) -> Result<String, String> {
    match cell {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("expected text, got {other}")),
    }
}

fn number(cell: &Value) -> Result<f64, String> {
    match cell {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("not a number: {n}")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("not a number: {s:?}")),
        other => Err(format!("expected a number, got {other}")),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn integer(cell: &Value) -> Result<i64, String> {
    if let Value::Number(n) = cell {
        if let Some(v) = n.as_i64() {
            return Ok(v);
        }
    }
    let value = number(cell)?;
    if value.fract() != 0.0 || value.abs() > 1e15 {
        return Err(format!("not a whole number: {value}"));
    }
    Ok(value as i64)
}
