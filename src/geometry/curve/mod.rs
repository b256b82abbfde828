mod ellipse;
mod line;
mod polyline;
mod segment;

pub use ellipse::Ellipse;
pub use line::Line;
pub use polyline::Polyline;
pub use segment::LineSegment;

use std::fmt::Debug;

use crate::error::Result;
use crate::math::{Point3, Vector3};

/// Parameter domain for a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    /// Start of the parameter range.
    pub t_min: f64,
    /// End of the parameter range.
    pub t_max: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }

    /// Returns `t` clamped into the domain.
    #[must_use]
    pub fn clamp(&self, t: f64) -> f64 {
        t.clamp(self.t_min, self.t_max)
    }

    /// Returns the width of the domain.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.t_max - self.t_min
    }
}

/// Concrete shape behind a [`Curve`] trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    Line,
    LineSegment,
    Ellipse,
    Polyline,
}

/// Trait for parametric curves in 3D space.
///
/// Every curve in a trajectory is owned through a `Box<dyn Curve>` and never
/// mutated after construction; operations that change shape return new curves.
pub trait Curve: Debug + Send + Sync {
    /// Evaluates the curve at parameter `t`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is out of range or evaluation fails.
    fn evaluate(&self, t: f64) -> Result<Point3>;

    /// Computes the unit tangent vector at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is out of range or the tangent is degenerate.
    fn tangent(&self, t: f64) -> Result<Vector3>;

    /// Returns the parameter domain of the curve.
    fn domain(&self) -> CurveDomain;

    /// Returns whether the curve is closed.
    fn is_closed(&self) -> bool;

    /// Returns the parameter period for curves that wrap around their seam.
    fn period(&self) -> Option<f64> {
        None
    }

    /// Returns the concrete shape of the curve.
    fn kind(&self) -> CurveKind;

    /// Finds the parameter of the point on the curve nearest to `point`.
    ///
    /// Without `allow_extension` the result is restricted to the domain;
    /// with it, unbounded extensions of the curve are considered as well.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Projection`](crate::error::GeometryError::Projection)
    /// if no nearest point can be determined.
    fn project(&self, point: &Point3, allow_extension: bool) -> Result<f64>;

    /// Returns the part of the curve between two parameters as a new curve.
    ///
    /// The result starts at `evaluate(from)` and ends at `evaluate(to)`, so it
    /// runs against this curve's direction when `from > to`. Periodic curves
    /// take the shorter way between the two parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if either parameter is outside the domain.
    fn trimmed(&self, from: f64, to: f64) -> Result<Box<dyn Curve>>;

    /// Returns a copy of the curve running in the opposite direction.
    fn reversed(&self) -> Box<dyn Curve>;

    /// Returns the arc length of the curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve is unbounded.
    fn length(&self) -> Result<f64>;

    /// Returns an owned copy of the curve.
    fn clone_box(&self) -> Box<dyn Curve>;

    /// Returns the point at the start of the domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve is unbounded at its start.
    fn start_point(&self) -> Result<Point3> {
        self.evaluate(self.domain().t_min)
    }

    /// Returns the point at the end of the domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve is unbounded at its end.
    fn end_point(&self) -> Result<Point3> {
        self.evaluate(self.domain().t_max)
    }
}

impl Clone for Box<dyn Curve> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Checks that `t` lies in `domain`, allowing for round-off.
pub(crate) fn check_parameter(t: f64, domain: CurveDomain) -> Result<()> {
    let slack = crate::math::TOLERANCE * (1.0 + domain.span().abs().min(1e12));
    if t.is_nan() || t < domain.t_min - slack || t > domain.t_max + slack {
        return Err(crate::error::GeometryError::ParameterOutOfRange {
            parameter: "t",
            value: t,
            min: domain.t_min,
            max: domain.t_max,
        }
        .into());
    }
    Ok(())
}
