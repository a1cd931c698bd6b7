//! Shared error types for the services crate.

use thiserror::Error;

use liftlog_core::model::{BufferError, EntryError, NameError};
use storage::repository::StorageError;

/// Entry form fields outside what the input surface allows.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("choose an exercise")]
    MissingExercise,
    #[error("unknown exercise: {0}")]
    UnknownExercise(String),
    #[error("weight must be between 0 and {max} (got {value})")]
    WeightOutOfRange { value: f64, max: f64 },
    #[error("weight must be a multiple of {step} (got {value})")]
    WeightStep { value: f64, step: f64 },
    #[error("sets must be between {min} and {max} (got {value})")]
    SetsOutOfRange { value: u32, min: u32, max: u32 },
    #[error("reps must be between {min} and {max} (got {value})")]
    RepsOutOfRange { value: u32, min: u32, max: u32 },
    #[error("last-set reps must be between {min} and {max} (got {value})")]
    LastSetRepsOutOfRange { value: u32, min: u32, max: u32 },
    #[error("effort must be between {min} and {max} (got {value})")]
    EffortOutOfRange { value: u8, min: u8, max: u8 },
}

/// Errors emitted by workout session operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("sign in before logging entries")]
    NotSignedIn,
    #[error("entry belongs to {found}, but {expected} is signed in")]
    UserMismatch { expected: String, found: String },
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Entry(#[from] EntryError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
