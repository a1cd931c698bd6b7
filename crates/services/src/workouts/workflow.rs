use std::sync::Arc;

use liftlog_core::model::{Entry, Ledger};
use storage::repository::{CatalogRepository, LedgerRepository, Storage};
use tracing::{info, warn};

use crate::Clock;
use crate::error::SessionError;
use crate::form::EntryForm;
use super::session::WorkoutSession;

/// Result of pushing the buffer to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushOutcome {
    /// Entries moved from the buffer into the ledger.
    pub appended: usize,
    /// Rows in the ledger after the push.
    pub ledger_rows: usize,
}

/// Orchestrates sessions against the shared ledger store.
#[derive(Clone)]
pub struct WorkoutService {
    clock: Clock,
    ledger: Arc<dyn LedgerRepository>,
    catalog: Arc<dyn CatalogRepository>,
    guard_overwrites: bool,
}

impl WorkoutService {
    #[must_use]
    pub fn new(
        clock: Clock,
        ledger: Arc<dyn LedgerRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            clock,
            ledger,
            catalog,
            guard_overwrites: true,
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(
            clock,
            Arc::clone(&storage.ledger),
            Arc::clone(&storage.catalog),
        )
    }

    /// Toggle the row-count check made before each overwrite.
    ///
    /// With the guard off, a push blindly replaces the table and the last
    /// writer wins.
    #[must_use]
    pub fn with_overwrite_guard(mut self, guard_overwrites: bool) -> Self {
        self.guard_overwrites = guard_overwrites;
        self
    }

    /// Load the ledger and catalog into a fresh, signed-out session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if either table cannot be read.
    pub async fn start_session(&self) -> Result<WorkoutSession, SessionError> {
        let ledger = self.ledger.read_all().await?;
        let catalog = self.catalog.list_exercises().await?;
        Ok(WorkoutSession::new(ledger, catalog))
    }

    /// Validate the form and buffer it as a new entry stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSignedIn` when nobody is signed in, or
    /// `SessionError::Validation` when a field is outside the allowed range.
    pub fn add_entry(
        &self,
        session: &mut WorkoutSession,
        form: &EntryForm,
    ) -> Result<usize, SessionError> {
        let user = session.user().cloned().ok_or(SessionError::NotSignedIn)?;
        let (exercise, performance) = form.validate(session.catalog())?;
        let entry = Entry::new(user, self.clock.now(), exercise, performance)?;
        session.add(entry)
    }

    /// Remove a buffered entry by index.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Buffer` if `index` is out of range.
    pub fn delete_entry(
        &self,
        session: &mut WorkoutSession,
        index: usize,
    ) -> Result<Entry, SessionError> {
        session.delete(index)
    }

    /// Push every buffered entry to the ledger.
    ///
    /// Re-reads the ledger first so rows written by others since the session
    /// loaded are kept, appends the buffer, and overwrites the table. On success
    /// the merged table becomes the session's snapshot and the buffer is cleared.
    /// On failure the session is left exactly as it was. An empty buffer is a
    /// no-op that does not touch the store.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the read or the overwrite fails,
    /// including `StorageError::Conflict` when the guard sees the table move.
    pub async fn flush(&self, session: &mut WorkoutSession) -> Result<FlushOutcome, SessionError> {
        if session.buffer().is_empty() {
            return Ok(FlushOutcome {
                appended: 0,
                ledger_rows: session.ledger().len(),
            });
        }

        let pending = session.buffer().len();
        let merged = match self.merge_and_write(session).await {
            Ok(merged) => merged,
            Err(err) => {
                warn!(pending, error = %err, "flush failed; buffer kept");
                return Err(err);
            }
        };

        let outcome = FlushOutcome {
            appended: pending,
            ledger_rows: merged.len(),
        };
        session.commit(merged);
        info!(
            user = ?session.user().map(ToString::to_string),
            appended = outcome.appended,
            ledger_rows = outcome.ledger_rows,
            "flushed session buffer"
        );
        Ok(outcome)
    }

    async fn merge_and_write(
        &self,
        session: &WorkoutSession,
    ) -> Result<Ledger, SessionError> {
        let current = self.ledger.read_all().await?;
        let merged = current.appended(session.buffer().entries());
        if self.guard_overwrites {
            self.ledger
                .overwrite_if_unchanged(current.len(), &merged)
                .await?;
        } else {
            self.ledger.overwrite_all(&merged).await?;
        }
        Ok(merged)
    }

    /// Re-read the ledger and catalog, keeping the user and the buffer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if either table cannot be read; the
    /// session is left unchanged.
    pub async fn refresh(&self, session: &mut WorkoutSession) -> Result<(), SessionError> {
        let ledger = self.ledger.read_all().await?;
        let catalog = self.catalog.list_exercises().await?;
        session.replace_snapshot(ledger, catalog);
        Ok(())
    }

    /// Throw the whole session away and start over signed out.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the new snapshot cannot be read; the
    /// old session is kept in that case.
    pub async fn full_reset(&self, session: &mut WorkoutSession) -> Result<(), SessionError> {
        *session = self.start_session().await?;
        Ok(())
    }
}
