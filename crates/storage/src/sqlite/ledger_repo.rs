use liftlog_core::model::Ledger;
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use super::SqliteRepository;
use super::mapping::{connectivity, map_entry_row, position_to_i64, row_count};
use crate::repository::{EntryRecord, LedgerRepository, StorageError, ledger_from_records};

async fn replace_rows(
    tx: &mut Transaction<'_, Sqlite>,
    ledger: &Ledger,
) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM data")
        .execute(&mut **tx)
        .await
        .map_err(connectivity)?;

    for (position, entry) in ledger.entries().iter().enumerate() {
        let record = EntryRecord::from_entry(entry);
        sqlx::query(
            r"
            INSERT INTO data (position, name, timestamp, exercise, weight, sets, reps, last_set, effort)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(position_to_i64(position)?)
        .bind(record.name)
        .bind(record.timestamp)
        .bind(record.exercise)
        .bind(record.weight)
        .bind(record.sets)
        .bind(record.reps)
        .bind(record.last_set)
        .bind(record.effort)
        .execute(&mut **tx)
        .await
        .map_err(connectivity)?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl LedgerRepository for SqliteRepository {
    async fn read_all(&self) -> Result<Ledger, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT name, timestamp, exercise, weight, sets, reps, last_set, effort
            FROM data
            ORDER BY position ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(connectivity)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            records.push(map_entry_row(row)?);
        }
        debug!(rows = records.len(), "read ledger from sqlite");
        ledger_from_records(records)
    }

    async fn overwrite_all(&self, ledger: &Ledger) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(connectivity)?;
        replace_rows(&mut tx, ledger).await?;
        tx.commit().await.map_err(connectivity)?;
        debug!(rows = ledger.len(), "overwrote sqlite ledger");
        Ok(())
    }

    async fn overwrite_if_unchanged(
        &self,
        expected_rows: usize,
        ledger: &Ledger,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(connectivity)?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM data")
            .fetch_one(&mut *tx)
            .await
            .map_err(connectivity)?;
        let found = row_count(count)?;
        if found != expected_rows {
            return Err(StorageError::Conflict {
                expected: expected_rows,
                found,
            });
        }
        replace_rows(&mut tx, ledger).await?;
        tx.commit().await.map_err(connectivity)?;
        debug!(rows = ledger.len(), "overwrote sqlite ledger (guarded)");
        Ok(())
    }
}
