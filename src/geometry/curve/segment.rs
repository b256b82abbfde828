use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{check_parameter, Curve, CurveDomain, CurveKind};

/// A straight segment between two points.
///
/// `P(t) = start + t * (end - start)` for `t` in `[0, 1]`. Zero-length
/// segments are allowed; they stand for a move that stays in place.
#[derive(Debug, Clone)]
pub struct LineSegment {
    start: Point3,
    end: Point3,
}

impl LineSegment {
    /// Creates a segment from `start` to `end`.
    #[must_use]
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Creates a segment from `start` along `offset`.
    #[must_use]
    pub fn from_offset(start: Point3, offset: Vector3) -> Self {
        Self::new(start, start + offset)
    }

    /// Returns the vector from start to end.
    #[must_use]
    pub fn delta(&self) -> Vector3 {
        self.end - self.start
    }

    /// Evaluates inside the domain, returning the stored endpoints exactly
    /// at (or beyond) the domain bounds.
    fn snapped(&self, t: f64) -> Point3 {
        if t <= 0.0 {
            self.start
        } else if t >= 1.0 {
            self.end
        } else {
            self.start + self.delta() * t
        }
    }

    /// Returns whether the segment has no extent.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.delta().norm() < TOLERANCE
    }
}

impl Curve for LineSegment {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        Ok(self.start + self.delta() * t)
    }

    fn tangent(&self, _t: f64) -> Result<Vector3> {
        let delta = self.delta();
        let len = delta.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(delta / len)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, 1.0)
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn kind(&self) -> CurveKind {
        CurveKind::LineSegment
    }

    fn project(&self, point: &Point3, allow_extension: bool) -> Result<f64> {
        let delta = self.delta();
        let len_sq = delta.norm_squared();
        if len_sq < TOLERANCE * TOLERANCE {
            return Ok(0.0);
        }
        let t = (point - self.start).dot(&delta) / len_sq;
        Ok(if allow_extension {
            t
        } else {
            self.domain().clamp(t)
        })
    }

    fn trimmed(&self, from: f64, to: f64) -> Result<Box<dyn Curve>> {
        check_parameter(from, self.domain())?;
        check_parameter(to, self.domain())?;
        Ok(Box::new(Self::new(self.snapped(from), self.snapped(to))))
    }

    fn reversed(&self) -> Box<dyn Curve> {
        Box::new(Self::new(self.end, self.start))
    }

    fn length(&self) -> Result<f64> {
        Ok(self.delta().norm())
    }

    fn clone_box(&self) -> Box<dyn Curve> {
        Box::new(self.clone())
    }

    fn start_point(&self) -> Result<Point3> {
        Ok(self.start)
    }

    fn end_point(&self) -> Result<Point3> {
        Ok(self.end)
    }
}
