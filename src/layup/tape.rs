use crate::geometry::curve::Curve;

slotmap::new_key_type! {
    /// Unique identifier for a tape in the tape store.
    pub struct TapeId;
}

/// Direction in which the head runs along a tape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayDirection {
    #[default]
    Forward,
    Backward,
}

/// A physical strip of material laid along a path on the layup surface.
///
/// The tape carries one traversal curve per lay direction. Both are owned by
/// the tape and never change after construction.
#[derive(Debug, Clone)]
pub struct Tape {
    forward: Box<dyn Curve>,
    backward: Box<dyn Curve>,
}

impl Tape {
    /// Creates a tape from its forward path; the backward path is its reverse.
    #[must_use]
    pub fn new(path: Box<dyn Curve>) -> Self {
        let backward = path.reversed();
        Self {
            forward: path,
            backward,
        }
    }

    /// Creates a tape with explicit traversal curves for each direction.
    ///
    /// Useful when the head follows a different line on the way back, for
    /// example when the roller is offset from the tape center line.
    #[must_use]
    pub fn with_paths(forward: Box<dyn Curve>, backward: Box<dyn Curve>) -> Self {
        Self { forward, backward }
    }

    /// Returns the curve followed when laying in the forward direction.
    #[must_use]
    pub fn forward(&self) -> &dyn Curve {
        self.forward.as_ref()
    }

    /// Returns the curve followed when laying in the backward direction.
    #[must_use]
    pub fn backward(&self) -> &dyn Curve {
        self.backward.as_ref()
    }

    /// Returns the traversal curve for `direction`.
    #[must_use]
    pub fn path(&self, direction: LayDirection) -> &dyn Curve {
        match direction {
            LayDirection::Forward => self.forward(),
            LayDirection::Backward => self.backward(),
        }
    }
}
