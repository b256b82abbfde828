//! Pluggable geometric strategies used by the trajectory builder.
//!
//! Touch strategies build the short approach and departure moves at either
//! end of a tape. Link strategies route the head between two standoff points
//! without cutting through the layup surface.

mod link;
mod touch;

pub use link::{OffsetLink, StraightLink};
pub use touch::NormalTouch;

use std::fmt::Debug;

use crate::error::{ConfigError, Result};
use crate::geometry::curve::Curve;
use crate::geometry::surface::Surface;
use crate::math::{Point3, TOLERANCE};

/// Safe height used when none is configured, in millimetres.
pub const DEFAULT_SAFE_HEIGHT: f64 = 200.0;

/// Validated standoff distance between the head and the layup surface.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SafeHeight(f64);

impl SafeHeight {
    /// Creates a safe height.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositiveSafeHeight`] for zero, negative,
    /// or non-finite values.
    pub fn new(height: f64) -> std::result::Result<Self, ConfigError> {
        if height.is_finite() && height > TOLERANCE {
            Ok(Self(height))
        } else {
            Err(ConfigError::NonPositiveSafeHeight(height))
        }
    }

    /// Returns the height in model units.
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for SafeHeight {
    fn default() -> Self {
        Self(DEFAULT_SAFE_HEIGHT)
    }
}

/// Whether a touch move approaches or leaves the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchDirection {
    /// From the standoff point down to the surface.
    Approach,
    /// From the surface up to the standoff point.
    Depart,
}

/// Available shapes of touch moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TouchStrategyKind {
    /// Straight along the surface normal.
    #[default]
    Normal,
    /// Along a circular arc.
    Arc,
    /// Along an inclined ramp.
    Ramp,
}

/// Available shapes of link moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkStrategyKind {
    /// Along the section of the offset surface.
    #[default]
    Offset,
    /// Straight line between the endpoints.
    Straight,
}

/// Builds approach and departure moves at a contact point.
pub trait TouchStrategy: Debug + Send + Sync {
    /// Creates the move between a standoff point and `surface_point`.
    ///
    /// Approach moves end at `surface_point`; departure moves start there.
    ///
    /// # Errors
    ///
    /// Returns a geometry error if the point cannot be projected onto the
    /// surface or the move cannot be constructed.
    fn create_trajectory(
        &self,
        surface_point: &Point3,
        direction: TouchDirection,
    ) -> Result<Box<dyn Curve>>;
}

/// Builds repositioning moves between two standoff points.
pub trait LinkStrategy: Debug + Send + Sync {
    /// Creates the move from `source` to `target`.
    ///
    /// # Errors
    ///
    /// Returns a geometry error if the link cannot be routed.
    fn create_trajectory(&self, source: &Point3, target: &Point3) -> Result<Box<dyn Curve>>;
}

impl TouchStrategyKind {
    /// Instantiates the strategy for `surface`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedStrategy`] for shapes that have no
    /// implementation.
    pub fn create<'a>(
        self,
        surface: &'a dyn Surface,
        height: SafeHeight,
    ) -> Result<Box<dyn TouchStrategy + 'a>> {
        match self {
            Self::Normal => Ok(Box::new(NormalTouch::with_height(surface, height))),
            Self::Arc => Err(ConfigError::UnsupportedStrategy("arc touch").into()),
            Self::Ramp => Err(ConfigError::UnsupportedStrategy("ramp touch").into()),
        }
    }
}

impl LinkStrategyKind {
    /// Instantiates the strategy for `surface`.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset surface cannot be built.
    pub fn create(self, surface: &dyn Surface, height: SafeHeight) -> Result<Box<dyn LinkStrategy>> {
        match self {
            Self::Offset => Ok(Box::new(OffsetLink::with_height(surface, height)?)),
            Self::Straight => Ok(Box::new(StraightLink)),
        }
    }
}
