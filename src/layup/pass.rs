use crate::error::Result;
use crate::geometry::curve::Curve;
use crate::math::Point3;

use super::tape::{LayDirection, TapeId};
use super::TapeStore;

/// One application of a tape in the lay-up sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapePass {
    /// The tape being laid.
    pub tape: TapeId,
    /// Direction the head runs along the tape.
    pub direction: LayDirection,
}

impl TapePass {
    /// Creates a pass over `tape` in `direction`.
    #[must_use]
    pub fn new(tape: TapeId, direction: LayDirection) -> Self {
        Self { tape, direction }
    }

    /// Returns the traversal curve chosen by this pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the tape is not in `store`.
    pub fn path<'s>(&self, store: &'s TapeStore) -> Result<&'s dyn Curve> {
        Ok(store.tape(self.tape)?.path(self.direction))
    }

    /// Returns the point where the head touches down.
    ///
    /// # Errors
    ///
    /// Returns an error if the tape is not in `store`.
    pub fn start_point(&self, store: &TapeStore) -> Result<Point3> {
        self.path(store)?.start_point()
    }

    /// Returns the point where the head lifts off.
    ///
    /// # Errors
    ///
    /// Returns an error if the tape is not in `store`.
    pub fn end_point(&self, store: &TapeStore) -> Result<Point3> {
        self.path(store)?.end_point()
    }
}

/// One layer: tape passes in lay-up order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlyPass {
    pub tape_passes: Vec<TapePass>,
}

impl PlyPass {
    /// Creates a ply from passes in lay-up order.
    #[must_use]
    pub fn new(tape_passes: Vec<TapePass>) -> Self {
        Self { tape_passes }
    }

    /// Returns the number of tape passes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tape_passes.len()
    }

    /// Returns whether the ply has no tape passes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tape_passes.is_empty()
    }
}

impl FromIterator<TapePass> for PlyPass {
    fn from_iter<I: IntoIterator<Item = TapePass>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
