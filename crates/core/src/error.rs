use thiserror::Error;

use crate::model::{BufferError, EntryError, NameError, TimestampError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
    #[error(transparent)]
    Entry(#[from] EntryError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}
