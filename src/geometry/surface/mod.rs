mod cylinder;
mod plane;

pub use cylinder::Cylinder;
pub use plane::Plane;

use std::fmt::Debug;

use crate::error::Result;
use crate::geometry::curve::Curve;
use crate::math::{Point3, Vector3, POINT_TOLERANCE};

/// Parameter domain for a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDomain {
    /// Start of the U parameter range.
    pub u_min: f64,
    /// End of the U parameter range.
    pub u_max: f64,
    /// Start of the V parameter range.
    pub v_min: f64,
    /// End of the V parameter range.
    pub v_max: f64,
}

impl SurfaceDomain {
    /// Creates a new surface domain.
    #[must_use]
    pub fn new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
        }
    }

    /// Creates a domain without bounds in either direction.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
        )
    }

    /// Returns whether `(u, v)` lies inside the domain, up to `tolerance`.
    #[must_use]
    pub fn contains(&self, u: f64, v: f64, tolerance: f64) -> bool {
        u >= self.u_min - tolerance
            && u <= self.u_max + tolerance
            && v >= self.v_min - tolerance
            && v <= self.v_max + tolerance
    }
}

/// Result of a nearest-point projection onto a surface.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoint {
    /// U parameter on the surface.
    pub u: f64,
    /// V parameter on the surface.
    pub v: f64,
    /// 3D point on the surface.
    pub point: Point3,
    /// Distance from the query point to the surface point.
    pub distance: f64,
}

/// Trait for parametric surfaces in 3D space.
///
/// This is the boundary to the geometric modeling kernel: tool path
/// construction only talks to layup surfaces through these operations.
pub trait Surface: Debug + Send + Sync {
    /// Evaluates the surface at parameters `(u, v)`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are out of range or evaluation fails.
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3>;

    /// Computes the unit surface normal at parameters `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are out of range or the normal is degenerate.
    fn normal(&self, u: f64, v: f64) -> Result<Vector3>;

    /// Returns the parameter domain of the surface.
    fn domain(&self) -> SurfaceDomain;

    /// Finds the point on the surface nearest to `point`.
    ///
    /// Without `allow_extension` the foot point must lie inside the domain.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Projection`](crate::error::GeometryError::Projection)
    /// if the nearest point is undefined or falls outside the domain.
    fn project(&self, point: &Point3, allow_extension: bool) -> Result<SurfacePoint>;

    /// Builds the surface displaced by `distance` along its normal.
    ///
    /// # Errors
    ///
    /// Returns an error if the displaced surface would be degenerate.
    fn offset(&self, distance: f64) -> Result<Box<dyn Surface>>;

    /// Intersects the surface with a plane, returning the section curve.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Intersection`](crate::error::GeometryError::Intersection)
    /// if the plane does not cut the surface.
    fn section(&self, plane: &Plane) -> Result<Box<dyn Curve>>;
}

/// Fails a projection whose foot point lies outside the domain.
pub(crate) fn check_projection(
    surface: &dyn Surface,
    foot: SurfacePoint,
    allow_extension: bool,
) -> Result<SurfacePoint> {
    if allow_extension || surface.domain().contains(foot.u, foot.v, POINT_TOLERANCE) {
        Ok(foot)
    } else {
        Err(crate::error::GeometryError::Projection(format!(
            "foot point ({:.6}, {:.6}) lies outside the surface domain",
            foot.u, foot.v
        ))
        .into())
    }
}
