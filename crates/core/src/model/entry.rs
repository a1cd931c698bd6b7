use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::names::{ExerciseName, UserName};
use crate::model::timestamp::LoggedAt;

/// Highest effort rating an entry can carry.
pub const MAX_EFFORT: u8 = 10;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EntryError {
    #[error("weight must be a finite number >= 0 (got {0})")]
    InvalidWeight(f64),

    #[error("effort must be between 0 and {MAX_EFFORT} (got {0})")]
    InvalidEffort(u8),
}

//
// ─── PERFORMANCE ───────────────────────────────────────────────────────────────
//

/// What was lifted in one logged set-group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub weight: f64,
    pub sets: u32,
    pub reps: u32,
    pub last_set_reps: u32,
    pub effort: u8,
}

impl Performance {
    /// Checks the shape constraints every stored entry satisfies.
    ///
    /// # Errors
    ///
    /// Returns `EntryError` for a negative or non-finite weight, or an effort above
    /// [`MAX_EFFORT`].
    pub fn validate(&self) -> Result<(), EntryError> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(EntryError::InvalidWeight(self.weight));
        }
        if self.effort > MAX_EFFORT {
            return Err(EntryError::InvalidEffort(self.effort));
        }
        Ok(())
    }
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// One logged exercise performance record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EntryParts")]
pub struct Entry {
    user: UserName,
    logged_at: LoggedAt,
    exercise: ExerciseName,
    performance: Performance,
}

/// Unchecked wire shape; deserialized entries go through [`Entry::new`].
#[derive(Deserialize)]
struct EntryParts {
    user: UserName,
    logged_at: LoggedAt,
    exercise: ExerciseName,
    performance: Performance,
}

impl TryFrom<EntryParts> for Entry {
    type Error = EntryError;

    fn try_from(parts: EntryParts) -> Result<Self, Self::Error> {
        Self::new(parts.user, parts.logged_at, parts.exercise, parts.performance)
    }
}

impl Entry {
    /// Build an entry, checking its numeric shape.
    ///
    /// # Errors
    ///
    /// Returns `EntryError` if the performance fails [`Performance::validate`].
    pub fn new(
        user: UserName,
        logged_at: LoggedAt,
        exercise: ExerciseName,
        performance: Performance,
    ) -> Result<Self, EntryError> {
        performance.validate()?;
        Ok(Self {
            user,
            logged_at,
            exercise,
            performance,
        })
    }

    #[must_use]
    pub fn user(&self) -> &UserName {
        &self.user
    }

    #[must_use]
    pub fn logged_at(&self) -> LoggedAt {
        self.logged_at
    }

    #[must_use]
    pub fn exercise(&self) -> &ExerciseName {
        &self.exercise
    }

    #[must_use]
    pub fn performance(&self) -> &Performance {
        &self.performance
    }

    #[must_use]
    pub fn weight(&self) -> f64 {
        self.performance.weight
    }

    #[must_use]
    pub fn sets(&self) -> u32 {
        self.performance.sets
    }

    #[must_use]
    pub fn reps(&self) -> u32 {
        self.performance.reps
    }

    #[must_use]
    pub fn last_set_reps(&self) -> u32 {
        self.performance.last_set_reps
    }

    #[must_use]
    pub fn effort(&self) -> u8 {
        self.performance.effort
    }

    /// True if this entry was logged by `user` for `exercise`.
    #[must_use]
    pub fn is_for(&self, user: &UserName, exercise: &ExerciseName) -> bool {
        &self.user == user && &self.exercise == exercise
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squat(performance: Performance) -> Result<Entry, EntryError> {
        Entry::new(
            UserName::new("al").unwrap(),
            LoggedAt::parse("2024/01/01 10:00:00").unwrap(),
            ExerciseName::new("Squat").unwrap(),
            performance,
        )
    }

    fn perf(weight: f64, effort: u8) -> Performance {
        Performance {
            weight,
            sets: 3,
            reps: 5,
            last_set_reps: 5,
            effort,
        }
    }

    #[test]
    fn builds_entry_with_accessors() {
        let entry = squat(perf(100.0, 8)).unwrap();
        assert_eq!(entry.user().as_str(), "al");
        assert_eq!(entry.exercise().as_str(), "Squat");
        assert_eq!(entry.logged_at().to_string(), "2024/01/01 10:00:00");
        assert!((entry.weight() - 100.0).abs() < f64::EPSILON);
        assert_eq!(entry.sets(), 3);
        assert_eq!(entry.reps(), 5);
        assert_eq!(entry.last_set_reps(), 5);
        assert_eq!(entry.effort(), 8);
    }

    #[test]
    fn zero_values_are_valid_shape() {
        let zero = Performance {
            weight: 0.0,
            sets: 0,
            reps: 0,
            last_set_reps: 0,
            effort: 0,
        };
        assert!(squat(zero).is_ok());
    }

    #[test]
    fn rejects_negative_or_nan_weight() {
        assert_eq!(
            squat(perf(-2.5, 5)).unwrap_err(),
            EntryError::InvalidWeight(-2.5)
        );
        assert!(matches!(
            squat(perf(f64::NAN, 5)),
            Err(EntryError::InvalidWeight(_))
        ));
    }

    #[test]
    fn rejects_effort_above_ten() {
        assert_eq!(squat(perf(50.0, 11)).unwrap_err(), EntryError::InvalidEffort(11));
    }

    #[test]
    fn deserializing_runs_the_shape_checks() {
        let entry = squat(perf(100.0, 8)).unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        let back: Entry = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, entry);

        let mut bad = json;
        bad["performance"]["effort"] = serde_json::json!(200);
        assert!(serde_json::from_value::<Entry>(bad.clone()).is_err());
        bad["performance"]["effort"] = serde_json::json!(5);
        bad["performance"]["weight"] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<Entry>(bad).is_err());
    }
}
