use liftlog_core::model::ExerciseCatalog;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{connectivity, position_to_i64};
use crate::repository::{CatalogRepository, StorageError, schema};

#[async_trait::async_trait]
impl CatalogRepository for SqliteRepository {
    async fn list_exercises(&self) -> Result<ExerciseCatalog, StorageError> {
        let rows = sqlx::query("SELECT name FROM exercises ORDER BY position ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(connectivity)?;

        let mut names = Vec::with_capacity(rows.len());
        for row in &rows {
            names.push(row.try_get::<String, _>("name").map_err(schema)?);
        }
        Ok(ExerciseCatalog::from_cells(names))
    }

    async fn replace_exercises(&self, catalog: &ExerciseCatalog) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(connectivity)?;
        sqlx::query("DELETE FROM exercises")
            .execute(&mut *tx)
            .await
            .map_err(connectivity)?;
        for (position, name) in catalog.names().iter().enumerate() {
            sqlx::query("INSERT INTO exercises (position, name) VALUES (?1, ?2)")
                .bind(position_to_i64(position)?)
                .bind(name.as_str())
                .execute(&mut *tx)
                .await
                .map_err(connectivity)?;
        }
        tx.commit().await.map_err(connectivity)?;
        Ok(())
    }
}
