use liftlog_core::model::{
    Entry, ExerciseCatalog, ExerciseName, Ledger, SessionBuffer, UserName,
};
use tracing::debug;

use crate::error::SessionError;
use crate::form::EntryForm;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Per-connection state of one sitting.
///
/// Holds the signed-in user, the last-known ledger snapshot, the exercise
/// catalog and the buffer of entries not yet pushed. Each caller owns its own
/// session; nothing here is shared between users.
#[derive(Debug, Clone)]
pub struct WorkoutSession {
    user: Option<UserName>,
    ledger: Ledger,
    catalog: ExerciseCatalog,
    buffer: SessionBuffer,
}

impl WorkoutSession {
    /// Create a signed-out session over the given snapshot.
    #[must_use]
    pub fn new(ledger: Ledger, catalog: ExerciseCatalog) -> Self {
        Self {
            user: None,
            ledger,
            catalog,
            buffer: SessionBuffer::new(),
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserName> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Last-known ledger snapshot; history queries run against it.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[must_use]
    pub fn catalog(&self) -> &ExerciseCatalog {
        &self.catalog
    }

    /// Entries logged this sitting and not yet pushed.
    #[must_use]
    pub fn buffer(&self) -> &SessionBuffer {
        &self.buffer
    }

    /// Sign in under `name`. The buffer always starts empty for the new user.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Name` if the name is blank or too long; the session
    /// is left as it was.
    pub fn sign_in(&mut self, name: &str) -> Result<&UserName, SessionError> {
        let user = UserName::for_sign_in(name)?;
        if !self.buffer.is_empty() {
            debug!(dropped = self.buffer.len(), "discarding unpushed entries at sign-in");
        }
        self.buffer.clear();
        Ok(self.user.insert(user))
    }

    /// Sign out, discarding any unpushed entries.
    pub fn sign_out(&mut self) {
        self.user = None;
        self.buffer.clear();
    }

    fn signed_in_user(&self) -> Result<&UserName, SessionError> {
        self.user.as_ref().ok_or(SessionError::NotSignedIn)
    }

    /// Append an entry for the signed-in user, returning its buffer index.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSignedIn` when nobody is signed in, or
    /// `SessionError::UserMismatch` when the entry belongs to someone else.
    pub fn add(&mut self, entry: Entry) -> Result<usize, SessionError> {
        let user = self.signed_in_user()?;
        if entry.user() != user {
            return Err(SessionError::UserMismatch {
                expected: user.to_string(),
                found: entry.user().to_string(),
            });
        }
        debug!(exercise = %entry.exercise(), "buffered entry");
        self.buffer.add(entry);
        Ok(self.buffer.len() - 1)
    }

    /// Remove a buffered entry; later rows shift down by one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Buffer` if `index` is out of range.
    pub fn delete(&mut self, index: usize) -> Result<Entry, SessionError> {
        let removed = self.buffer.delete(index)?;
        debug!(index, exercise = %removed.exercise(), "removed buffered entry");
        Ok(removed)
    }

    /// Latest committed entry for the pair, used to pre-fill a new entry.
    #[must_use]
    pub fn most_recent_settings(&self, user: &UserName, exercise: &ExerciseName) -> Option<&Entry> {
        self.ledger.most_recent(user, exercise)
    }

    /// Entry form for `exercise` pre-filled from the signed-in user's last attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSignedIn` when nobody is signed in.
    pub fn prefill(&self, exercise: &ExerciseName) -> Result<EntryForm, SessionError> {
        let user = self.signed_in_user()?;
        Ok(EntryForm::prefill(
            exercise,
            self.most_recent_settings(user, exercise),
        ))
    }

    /// Exercise choices, with the signed-in user's recent exercises first.
    #[must_use]
    pub fn catalog_options(&self) -> Vec<ExerciseName> {
        match &self.user {
            Some(user) => self.catalog.options_for(user, &self.ledger),
            None => self.catalog.names().to_vec(),
        }
    }

    pub(crate) fn replace_snapshot(&mut self, ledger: Ledger, catalog: ExerciseCatalog) {
        self.ledger = ledger;
        self.catalog = catalog;
    }

    pub(crate) fn commit(&mut self, merged: Ledger) {
        self.ledger = merged;
        self.buffer.clear();
    }
}
