use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::entry::Entry;
use crate::model::names::{ExerciseName, UserName};
use crate::model::timestamp::LogDate;

/// Snapshot of the shared, append-only record of committed entries.
///
/// Insertion order is history order. Rows are not guaranteed to be sorted by
/// timestamp, so every query that cares about recency sorts on read. When two
/// entries carry the same timestamp, the one further down the ledger is treated
/// as the more recent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    entries: Vec<Entry>,
}

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A new ledger with `extra` appended after the existing rows, in order.
    #[must_use]
    pub fn appended(&self, extra: &[Entry]) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + extra.len());
        entries.extend_from_slice(&self.entries);
        entries.extend_from_slice(extra);
        Self { entries }
    }

    fn rows_for(&self, user: &UserName) -> Vec<(usize, &Entry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.user() == user)
            .collect()
    }

    /// The user's entries in ledger order.
    #[must_use]
    pub fn history_for(&self, user: &UserName) -> Vec<&Entry> {
        self.rows_for(user).into_iter().map(|(_, entry)| entry).collect()
    }

    /// All of the user's entries, newest first.
    #[must_use]
    pub fn all_entries_for(&self, user: &UserName) -> Vec<&Entry> {
        newest_first(self.rows_for(user).into_iter())
    }

    /// The user's entries for one exercise, newest first.
    #[must_use]
    pub fn entries_for(&self, user: &UserName, exercise: &ExerciseName) -> Vec<&Entry> {
        newest_first(
            self.rows_for(user)
                .into_iter()
                .filter(|(_, entry)| entry.exercise() == exercise),
        )
    }

    /// Latest committed entry for the user and exercise, if any.
    #[must_use]
    pub fn most_recent(&self, user: &UserName, exercise: &ExerciseName) -> Option<&Entry> {
        self.rows_for(user)
            .into_iter()
            .filter(|(_, entry)| entry.exercise() == exercise)
            .max_by_key(|(idx, entry)| (entry.logged_at(), *idx))
            .map(|(_, entry)| entry)
    }

    /// One row per exercise the user has logged: the most recent one.
    #[must_use]
    pub fn latest_per_exercise(&self, user: &UserName) -> BTreeMap<ExerciseName, &Entry> {
        let mut latest: BTreeMap<ExerciseName, &Entry> = BTreeMap::new();
        for (_, entry) in self.rows_for(user) {
            match latest.get(entry.exercise()) {
                // Rows are visited in ledger order; ties fall through so later rows win.
                Some(current) if entry.logged_at() < current.logged_at() => {}
                _ => {
                    latest.insert(entry.exercise().clone(), entry);
                }
            }
        }
        latest
    }

    /// Exercises performed per calendar day.
    #[must_use]
    pub fn sessions_by_date(&self, user: &UserName) -> BTreeMap<LogDate, BTreeSet<ExerciseName>> {
        let mut sessions: BTreeMap<LogDate, BTreeSet<ExerciseName>> = BTreeMap::new();
        for (_, entry) in self.rows_for(user) {
            sessions
                .entry(entry.logged_at().day())
                .or_default()
                .insert(entry.exercise().clone());
        }
        sessions
    }

    /// Distinct exercises the user has logged, most recently performed first.
    #[must_use]
    pub fn recent_exercises(&self, user: &UserName) -> Vec<&ExerciseName> {
        let mut seen = BTreeSet::new();
        self.all_entries_for(user)
            .into_iter()
            .map(Entry::exercise)
            .filter(|exercise| seen.insert(*exercise))
            .collect()
    }
}

fn newest_first<'a>(rows: impl Iterator<Item = (usize, &'a Entry)>) -> Vec<&'a Entry> {
    let mut rows: Vec<_> = rows.collect();
    rows.sort_by_key(|(idx, entry)| Reverse((entry.logged_at(), *idx)));
    rows.into_iter().map(|(_, entry)| entry).collect()
}
