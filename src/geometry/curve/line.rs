use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{check_parameter, Curve, CurveDomain, CurveKind, LineSegment};

/// An infinite line defined by an origin point and a direction vector.
///
/// The parametric form is: `P(t) = origin + t * direction`.
#[derive(Debug, Clone)]
pub struct Line {
    origin: Point3,
    direction: Vector3,
}

impl Line {
    /// Creates a new line from an origin and direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vector is zero-length.
    pub fn new(origin: Point3, direction: Vector3) -> Result<Self> {
        let len = direction.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            origin,
            direction: direction / len,
        })
    }

    /// Returns the origin point of the line.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the unit direction vector of the line.
    #[must_use]
    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }
}

impl Curve for Line {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        Ok(self.origin + self.direction * t)
    }

    fn tangent(&self, _t: f64) -> Result<Vector3> {
        Ok(self.direction)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn kind(&self) -> CurveKind {
        CurveKind::Line
    }

    fn project(&self, point: &Point3, _allow_extension: bool) -> Result<f64> {
        Ok((point - self.origin).dot(&self.direction))
    }

    fn trimmed(&self, from: f64, to: f64) -> Result<Box<dyn Curve>> {
        for t in [from, to] {
            check_parameter(t, self.domain())?;
            if !t.is_finite() {
                return Err(GeometryError::ParameterOutOfRange {
                    parameter: "t",
                    value: t,
                    min: f64::MIN,
                    max: f64::MAX,
                }
                .into());
            }
        }
        Ok(Box::new(LineSegment::new(
            self.evaluate(from)?,
            self.evaluate(to)?,
        )))
    }

    fn reversed(&self) -> Box<dyn Curve> {
        Box::new(Self {
            origin: self.origin,
            direction: -self.direction,
        })
    }

    fn length(&self) -> Result<f64> {
        Err(GeometryError::Degenerate("infinite line has no length".into()).into())
    }

    fn clone_box(&self) -> Box<dyn Curve> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn project_ignores_domain() {
        let line = Line::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(2.0, 0.0, 0.0)).unwrap();
        let t = line.project(&Point3::new(-4.0, 3.0, 0.0), false).unwrap();
        assert!((t + 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn trimmed_backwards_gives_reversed_segment() {
        let line = Line::new(Point3::origin(), Vector3::y()).unwrap();
        let seg = line.trimmed(3.0, -1.0).unwrap();
        assert_eq!(seg.kind(), CurveKind::LineSegment);
        assert!((seg.start_point().unwrap() - Point3::new(0.0, 3.0, 0.0)).norm() < TOLERANCE);
        assert!((seg.end_point().unwrap() - Point3::new(0.0, -1.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn trimmed_to_infinity_fails() {
        let line = Line::new(Point3::origin(), Vector3::x()).unwrap();
        assert!(line.trimmed(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Line::new(Point3::origin(), Vector3::zeros()).is_err());
    }
}
