use std::collections::HashSet;

use crate::model::ledger::Ledger;
use crate::model::names::{ExerciseName, UserName};

/// Selectable exercise names, in the order the catalog table lists them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseCatalog {
    names: Vec<ExerciseName>,
}

impl ExerciseCatalog {
    /// Build a catalog, dropping duplicate names (first occurrence wins).
    #[must_use]
    pub fn new(names: impl IntoIterator<Item = ExerciseName>) -> Self {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();
        Self { names }
    }

    /// Build a catalog from raw cell text, skipping blank cells.
    #[must_use]
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(cells.into_iter().filter_map(|cell| ExerciseName::new(cell).ok()))
    }

    #[must_use]
    pub fn names(&self) -> &[ExerciseName] {
        &self.names
    }

    #[must_use]
    pub fn contains(&self, name: &ExerciseName) -> bool {
        self.names.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Selection list for `user`: catalog exercises the user has logged come first,
    /// most recently performed first, followed by the rest in catalog order.
    #[must_use]
    pub fn options_for(&self, user: &UserName, ledger: &Ledger) -> Vec<ExerciseName> {
        let pinned: Vec<ExerciseName> = ledger
            .recent_exercises(user)
            .into_iter()
            .filter(|name| self.contains(name))
            .cloned()
            .collect();
        let mut options = pinned.clone();
        options.extend(
            self.names
                .iter()
                .filter(|name| !pinned.contains(name))
                .cloned(),
        );
        options
    }
}
