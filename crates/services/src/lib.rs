#![forbid(unsafe_code)]

pub mod error;
pub mod form;
pub mod workouts;

pub use liftlog_core::Clock;

pub use error::{SessionError, ValidationError};
pub use form::EntryForm;
pub use workouts::{FlushOutcome, WorkoutService, WorkoutSession};
