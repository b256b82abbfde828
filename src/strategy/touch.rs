use tracing::trace;

use crate::error::Result;
use crate::geometry::curve::{Curve, LineSegment};
use crate::geometry::surface::Surface;
use crate::math::Point3;

use super::{SafeHeight, TouchDirection, TouchStrategy};

/// Touch move straight along the surface normal.
///
/// The standoff point sits one safe height above the contact point, measured
/// along the normal at the contact point's projection.
#[derive(Debug, Clone, Copy)]
pub struct NormalTouch<'a> {
    surface: &'a dyn Surface,
    height: SafeHeight,
}

impl<'a> NormalTouch<'a> {
    /// Creates the strategy for `surface` with a standoff of `safe_height`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositiveSafeHeight`](crate::error::ConfigError::NonPositiveSafeHeight)
    /// if `safe_height` is not positive.
    pub fn new(surface: &'a dyn Surface, safe_height: f64) -> Result<Self> {
        Ok(Self::with_height(surface, SafeHeight::new(safe_height)?))
    }

    /// Creates the strategy from an already validated height.
    #[must_use]
    pub fn with_height(surface: &'a dyn Surface, height: SafeHeight) -> Self {
        Self { surface, height }
    }

    /// Returns the standoff distance.
    #[must_use]
    pub fn height(&self) -> SafeHeight {
        self.height
    }
}

impl TouchStrategy for NormalTouch<'_> {
    fn create_trajectory(
        &self,
        surface_point: &Point3,
        direction: TouchDirection,
    ) -> Result<Box<dyn Curve>> {
        let foot = self.surface.project(surface_point, false)?;
        let normal = self.surface.normal(foot.u, foot.v)?;
        let segment = LineSegment::from_offset(*surface_point, normal * self.height.get());
        trace!(?direction, u = foot.u, v = foot.v, "normal touch");

        Ok(match direction {
            TouchDirection::Approach => segment.reversed(),
            TouchDirection::Depart => Box::new(segment),
        })
    }
}
