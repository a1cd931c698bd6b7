mod buffer;
mod catalog;
mod entry;
mod ledger;
mod names;
mod timestamp;

pub use buffer::{BufferError, SessionBuffer};
pub use catalog::ExerciseCatalog;
pub use entry::{Entry, EntryError, MAX_EFFORT, Performance};
pub use ledger::Ledger;
pub use names::{ExerciseName, MAX_USER_NAME_CHARS, NameError, UserName};
pub use timestamp::{DATE_FORMAT, LogDate, LoggedAt, TIMESTAMP_FORMAT, TimestampError};
