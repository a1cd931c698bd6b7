use async_trait::async_trait;
use liftlog_core::model::{
    Entry, ExerciseCatalog, ExerciseName, Ledger, LoggedAt, Performance, UserName,
};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Name of the remote table holding committed entries.
pub const DATA_TABLE: &str = "Data";

/// Name of the remote table holding the exercise catalog.
pub const EXERCISES_TABLE: &str = "Exercises";

/// Header row of the `Data` table, in column order.
pub const DATA_COLUMNS: [&str; 8] = [
    "Name",
    "Timestamp",
    "Exercise",
    "Weight",
    "Sets",
    "Reps",
    "Last-set",
    "Effort",
];

/// Single column of the `Exercises` table.
pub const EXERCISES_COLUMN: &str = "Exercises";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The store could not be reached, or the request timed out.
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// The store answered with data that does not have the entry shape.
    #[error("schema error: {0}")]
    Schema(String),

    /// The table changed between the read and the guarded overwrite.
    #[error("ledger changed concurrently: expected {expected} rows, found {found}")]
    Conflict { expected: usize, found: usize },
}

/// Persisted shape of an entry: one row of the `Data` table.
///
/// Integer columns are kept wide so adapters can decode whatever the store
/// returns and reject out-of-range values in one place.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRecord {
    pub name: String,
    pub timestamp: String,
    pub exercise: String,
    pub weight: f64,
    pub sets: i64,
    pub reps: i64,
    pub last_set: i64,
    pub effort: i64,
}

impl EntryRecord {
    #[must_use]
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            name: entry.user().as_str().to_owned(),
            timestamp: entry.logged_at().to_string(),
            exercise: entry.exercise().as_str().to_owned(),
            weight: entry.weight(),
            sets: i64::from(entry.sets()),
            reps: i64::from(entry.reps()),
            last_set: i64::from(entry.last_set_reps()),
            effort: i64::from(entry.effort()),
        }
    }

    /// Convert the record back into a domain `Entry`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Schema` if any column fails domain validation.
    pub fn into_entry(self) -> Result<Entry, StorageError> {
        let user = UserName::new(self.name).map_err(schema)?;
        let logged_at = LoggedAt::parse(&self.timestamp).map_err(schema)?;
        let exercise = ExerciseName::new(self.exercise).map_err(schema)?;
        let performance = Performance {
            weight: self.weight,
            sets: count("Sets", self.sets)?,
            reps: count("Reps", self.reps)?,
            last_set_reps: count("Last-set", self.last_set)?,
            effort: u8::try_from(self.effort)
                .map_err(|_| StorageError::Schema(format!("invalid Effort: {}", self.effort)))?,
        };
        Entry::new(user, logged_at, exercise, performance).map_err(schema)
    }
}

pub(crate) fn schema<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Schema(e.to_string())
}

fn count(column: &'static str, value: i64) -> Result<u32, StorageError> {
    u32::try_from(value).map_err(|_| StorageError::Schema(format!("invalid {column}: {value}")))
}

/// Decode a table of records into a ledger, keeping row order.
///
/// # Errors
///
/// Returns `StorageError::Schema` naming the first row that fails to decode.
pub fn ledger_from_records(
    records: impl IntoIterator<Item = EntryRecord>,
) -> Result<Ledger, StorageError> {
    let entries = records
        .into_iter()
        .enumerate()
        .map(|(row, record)| {
            record.into_entry().map_err(|e| match e {
                StorageError::Schema(msg) => StorageError::Schema(format!("row {row}: {msg}")),
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Ledger::from_entries(entries))
}

/// Remote Ledger Client contract: full-table read and full-table overwrite.
///
/// There is no locking. Two writers that read the same table and overwrite it
/// in turn lose the first writer's rows unless they go through
/// [`LedgerRepository::overwrite_if_unchanged`].
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Fetch every committed entry, in ledger order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connectivity` if the store is unreachable, or
    /// `StorageError::Schema` if the table does not have the entry shape.
    async fn read_all(&self) -> Result<Ledger, StorageError>;

    /// Replace the whole table with `ledger`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connectivity` on transport failure.
    async fn overwrite_all(&self, ledger: &Ledger) -> Result<(), StorageError>;

    /// Replace the whole table, but only if it still holds `expected_rows` rows.
    ///
    /// The default implementation re-reads and compares before writing, which
    /// narrows the lost-update window without closing it. Adapters that can check
    /// and write atomically override it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the row count moved, or any error from
    /// `read_all` / `overwrite_all`.
    async fn overwrite_if_unchanged(
        &self,
        expected_rows: usize,
        ledger: &Ledger,
    ) -> Result<(), StorageError> {
        let found = self.read_all().await?.len();
        if found != expected_rows {
            return Err(StorageError::Conflict {
                expected: expected_rows,
                found,
            });
        }
        self.overwrite_all(ledger).await
    }
}

/// Read/replace access to the exercise catalog table.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Fetch the catalog in table order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the table cannot be read.
    async fn list_exercises(&self) -> Result<ExerciseCatalog, StorageError>;

    /// Replace the catalog table.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the table cannot be written.
    async fn replace_exercises(&self, catalog: &ExerciseCatalog) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    ledger: Arc<Mutex<Ledger>>,
    catalog: Arc<Mutex<ExerciseCatalog>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given ledger and catalog already stored.
    #[must_use]
    pub fn with_contents(ledger: Ledger, catalog: ExerciseCatalog) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            catalog: Arc::new(Mutex::new(catalog)),
        }
    }
}

#[async_trait]
impl LedgerRepository for InMemoryRepository {
    async fn read_all(&self) -> Result<Ledger, StorageError> {
        let guard = self
            .ledger
            .lock()
            .map_err(|e| StorageError::Connectivity(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn overwrite_all(&self, ledger: &Ledger) -> Result<(), StorageError> {
        let mut guard = self
            .ledger
            .lock()
            .map_err(|e| StorageError::Connectivity(e.to_string()))?;
        *guard = ledger.clone();
        Ok(())
    }

    async fn overwrite_if_unchanged(
        &self,
        expected_rows: usize,
        ledger: &Ledger,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .ledger
            .lock()
            .map_err(|e| StorageError::Connectivity(e.to_string()))?;
        if guard.len() != expected_rows {
            return Err(StorageError::Conflict {
                expected: expected_rows,
                found: guard.len(),
            });
        }
        *guard = ledger.clone();
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn list_exercises(&self) -> Result<ExerciseCatalog, StorageError> {
        let guard = self
            .catalog
            .lock()
            .map_err(|e| StorageError::Connectivity(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn replace_exercises(&self, catalog: &ExerciseCatalog) -> Result<(), StorageError> {
        let mut guard = self
            .catalog
            .lock()
            .map_err(|e| StorageError::Connectivity(e.to_string()))?;
        *guard = catalog.clone();
        Ok(())
    }
}

/// Aggregates ledger and catalog repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub ledger: Arc<dyn LedgerRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let ledger: Arc<dyn LedgerRepository> = Arc::new(repo.clone());
        let catalog: Arc<dyn CatalogRepository> = Arc::new(repo);
        Self { ledger, catalog }
    }
}
