mod session;
mod workflow;

// Public API of the workout subsystem.
pub use crate::error::SessionError;
pub use session::WorkoutSession;
pub use workflow::{FlushOutcome, WorkoutService};
