use std::ops::RangeInclusive;

use liftlog_core::model::{Entry, ExerciseCatalog, ExerciseName, MAX_EFFORT, Performance};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Heaviest weight the form accepts.
pub const MAX_WEIGHT: f64 = 500.0;
/// Weight increment the form accepts.
pub const WEIGHT_STEP: f64 = 0.5;
pub const SETS_RANGE: RangeInclusive<u32> = 1..=20;
pub const REPS_RANGE: RangeInclusive<u32> = 1..=40;
pub const LAST_SET_REPS_RANGE: RangeInclusive<u32> = 1..=40;
pub const EFFORT_RANGE: RangeInclusive<u8> = 0..=MAX_EFFORT;

/// Raw values of the add-entry form, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryForm {
    pub exercise: String,
    pub weight: f64,
    pub sets: u32,
    pub reps: u32,
    pub last_set_reps: u32,
    pub effort: u8,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            exercise: String::new(),
            weight: 0.0,
            sets: *SETS_RANGE.start(),
            reps: *REPS_RANGE.start(),
            last_set_reps: *LAST_SET_REPS_RANGE.start(),
            effort: *EFFORT_RANGE.start(),
        }
    }
}

impl EntryForm {
    /// Form for `exercise`, pre-filled from the previous entry when there is one.
    ///
    /// Older ledger rows may hold values the form no longer accepts (zero sets,
    /// odd weights), so each value is pulled back into range.
    #[must_use]
    pub fn prefill(exercise: &ExerciseName, previous: Option<&Entry>) -> Self {
        let Some(previous) = previous else {
            return Self {
                exercise: exercise.as_str().to_owned(),
                ..Self::default()
            };
        };
        Self {
            exercise: exercise.as_str().to_owned(),
            weight: snap_weight(previous.weight()),
            sets: clamp(previous.sets(), &SETS_RANGE),
            reps: clamp(previous.reps(), &REPS_RANGE),
            last_set_reps: clamp(previous.last_set_reps(), &LAST_SET_REPS_RANGE),
            effort: clamp(previous.effort(), &EFFORT_RANGE),
        }
    }

    /// Check every field against the input ranges and the catalog.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found, in field order.
    pub fn validate(
        &self,
        catalog: &ExerciseCatalog,
    ) -> Result<(ExerciseName, Performance), ValidationError> {
        let exercise =
            ExerciseName::new(self.exercise.as_str()).map_err(|_| ValidationError::MissingExercise)?;
        if !catalog.contains(&exercise) {
            return Err(ValidationError::UnknownExercise(exercise.to_string()));
        }

        if !self.weight.is_finite() || !(0.0..=MAX_WEIGHT).contains(&self.weight) {
            return Err(ValidationError::WeightOutOfRange {
                value: self.weight,
                max: MAX_WEIGHT,
            });
        }
        if (self.weight / WEIGHT_STEP).fract() != 0.0 {
            return Err(ValidationError::WeightStep {
                value: self.weight,
                step: WEIGHT_STEP,
            });
        }
        if !SETS_RANGE.contains(&self.sets) {
            return Err(ValidationError::SetsOutOfRange {
                value: self.sets,
                min: *SETS_RANGE.start(),
                max: *SETS_RANGE.end(),
            });
        }
        if !REPS_RANGE.contains(&self.reps) {
            return Err(ValidationError::RepsOutOfRange {
                value: self.reps,
                min: *REPS_RANGE.start(),
                max: *REPS_RANGE.end(),
            });
        }
        if !LAST_SET_REPS_RANGE.contains(&self.last_set_reps) {
            return Err(ValidationError::LastSetRepsOutOfRange {
                value: self.last_set_reps,
                min: *LAST_SET_REPS_RANGE.start(),
                max: *LAST_SET_REPS_RANGE.end(),
            });
        }
        if !EFFORT_RANGE.contains(&self.effort) {
            return Err(ValidationError::EffortOutOfRange {
                value: self.effort,
                min: *EFFORT_RANGE.start(),
                max: *EFFORT_RANGE.end(),
            });
        }

        Ok((
            exercise,
            Performance {
                weight: self.weight,
                sets: self.sets,
                reps: self.reps,
                last_set_reps: self.last_set_reps,
                effort: self.effort,
            },
        ))
    }
}

fn clamp<T: Ord + Copy>(value: T, range: &RangeInclusive<T>) -> T {
    value.clamp(*range.start(), *range.end())
}

fn snap_weight(weight: f64) -> f64 {
    let snapped = (weight / WEIGHT_STEP).round() * WEIGHT_STEP;
    snapped.clamp(0.0, MAX_WEIGHT)
}
