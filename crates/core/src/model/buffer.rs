use thiserror::Error;

use crate::model::entry::Entry;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BufferError {
    #[error("row {index} is out of range (buffer has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Entries logged in the current sitting that have not reached the ledger yet.
///
/// Rows are addressed by dense, zero-based position; deleting a row shifts every
/// later row down by one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionBuffer {
    rows: Vec<Entry>,
}

impl SessionBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: Entry) {
        self.rows.push(entry);
    }

    /// Remove the row at `index`, returning it.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::IndexOutOfRange` if `index >= len`; the buffer is left
    /// unchanged.
    pub fn delete(&mut self, index: usize) -> Result<Entry, BufferError> {
        if index >= self.rows.len() {
            return Err(BufferError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.rows
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExerciseName, LoggedAt, Performance, UserName};

    fn entry(exercise: &str, sets: u32) -> Entry {
        Entry::new(
            UserName::new("al").unwrap(),
            LoggedAt::parse("2024/01/01 10:00:00").unwrap(),
            ExerciseName::new(exercise).unwrap(),
            Performance {
                weight: 20.0,
                sets,
                reps: 8,
                last_set_reps: 6,
                effort: 5,
            },
        )
        .unwrap()
    }

    #[test]
    fn delete_compacts_indices() {
        let mut buffer = SessionBuffer::new();
        buffer.add(entry("Squat", 1));
        buffer.add(entry("Dips", 2));
        buffer.add(entry("Pull-up", 3));

        let removed = buffer.delete(1).unwrap();
        assert_eq!(removed.exercise().as_str(), "Dips");
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.get(0).unwrap().exercise().as_str(), "Squat");
        assert_eq!(buffer.get(1).unwrap().exercise().as_str(), "Pull-up");
        assert!(buffer.get(2).is_none());
    }

    #[test]
    fn out_of_range_delete_leaves_buffer_unchanged() {
        let mut buffer = SessionBuffer::new();
        buffer.add(entry("Squat", 1));
        let before = buffer.clone();

        assert_eq!(
            buffer.delete(1),
            Err(BufferError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert_eq!(
            buffer.delete(usize::MAX),
            Err(BufferError::IndexOutOfRange {
                index: usize::MAX,
                len: 1
            })
        );
        assert_eq!(buffer, before);
    }

    #[test]
    fn delete_on_empty_buffer_fails() {
        let mut buffer = SessionBuffer::new();
        assert!(matches!(
            buffer.delete(0),
            Err(BufferError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn length_tracks_adds_minus_deletes() {
        let mut buffer = SessionBuffer::new();
        let mut expected = 0_usize;
        for step in 0..20_u32 {
            if step % 3 == 2 {
                let index = usize::try_from(step).unwrap() % buffer.len().max(1);
                if buffer.delete(index).is_ok() {
                    expected -= 1;
                }
            } else {
                buffer.add(entry("Squat", step));
                expected += 1;
            }
            assert_eq!(buffer.len(), expected);
            assert_eq!(buffer.entries().len(), expected);
        }
    }
}
