//! Input description of a lay-up job: tapes and the order they are laid in.
//!
//! Tapes live in a [`TapeStore`] arena and passes refer to them by
//! [`TapeId`], so the same tape can be laid several times without copying
//! its geometry.

pub mod pass;
pub mod tape;

pub use pass::{PlyPass, TapePass};
pub use tape::{LayDirection, Tape, TapeId};

use slotmap::SlotMap;

use crate::error::LayupError;

/// Arena that owns every tape of a job.
#[derive(Debug, Default)]
pub struct TapeStore {
    tapes: SlotMap<TapeId, Tape>,
}

impl TapeStore {
    /// Creates a new, empty tape store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tape and returns its ID.
    pub fn add_tape(&mut self, tape: Tape) -> TapeId {
        self.tapes.insert(tape)
    }

    /// Returns a reference to the tape, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the tape is not in the store.
    pub fn tape(&self, id: TapeId) -> Result<&Tape, LayupError> {
        self.tapes.get(id).ok_or(LayupError::TapeNotFound)
    }

    /// Removes a tape, returning it if present.
    pub fn remove_tape(&mut self, id: TapeId) -> Option<Tape> {
        self.tapes.remove(id)
    }

    /// Returns the number of tapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tapes.len()
    }

    /// Returns whether the store holds no tapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tapes.is_empty()
    }

    /// Iterates over all tapes with their IDs.
    pub fn iter(&self) -> impl Iterator<Item = (TapeId, &Tape)> {
        self.tapes.iter()
    }
}
