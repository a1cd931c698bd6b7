use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{EntryRecord, StorageError, schema};

pub(crate) fn connectivity<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connectivity(e.to_string())
}

pub(crate) fn position_to_i64(position: usize) -> Result<i64, StorageError> {
    i64::try_from(position).map_err(|_| StorageError::Schema("position overflow".into()))
}

pub(crate) fn row_count(count: i64) -> Result<usize, StorageError> {
    usize::try_from(count).map_err(|_| StorageError::Schema(format!("invalid row count: {count}")))
}

pub(crate) fn map_entry_row(row: &SqliteRow) -> Result<EntryRecord, StorageError> {
    Ok(EntryRecord {
        name: row.try_get("name").map_err(schema)?,
        timestamp: row.try_get("timestamp").map_err(schema)?,
        exercise: row.try_get("exercise").map_err(schema)?,
        weight: row.try_get("weight").map_err(schema)?,
        sets: row.try_get("sets").map_err(schema)?,
        reps: row.try_get("reps").map_err(schema)?,
        last_set: row.try_get("last_set").map_err(schema)?,
        effort: row.try_get("effort").map_err(schema)?,
    })
}
