use std::f64::consts::{PI, TAU};

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{check_parameter, Curve, CurveDomain, CurveKind};

const PROJECTION_SAMPLES: u32 = 128;
const NEWTON_ITERATIONS: usize = 32;
const LENGTH_INTERVALS: u32 = 512;

/// An ellipse (or elliptical arc) in 3D space.
///
/// Defined by a center, semi-major and semi-minor axes, a normal,
/// a major axis direction, and angular range.
///
/// `P(t) = center + a * cos(t) * major_dir + b * sin(t) * minor_dir`
/// where `minor_dir = normal x major_dir`. A circle is the case `a == b`.
#[derive(Debug, Clone)]
pub struct Ellipse {
    center: Point3,
    semi_major: f64,
    semi_minor: f64,
    normal: Vector3,
    major_dir: Vector3,
    start_angle: f64,
    end_angle: f64,
}

impl Ellipse {
    /// Creates a new ellipse.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the ellipse
    /// * `semi_major` - Semi-major axis length (must be positive)
    /// * `semi_minor` - Semi-minor axis length (must be positive)
    /// * `normal` - Normal vector defining the ellipse plane
    /// * `major_dir` - Major axis direction (must be perpendicular to normal)
    /// * `start_angle` - Start angle in radians
    /// * `end_angle` - End angle in radians (not less than `start_angle`)
    ///
    /// # Errors
    ///
    /// Returns an error if either axis length is non-positive, the normal is
    /// zero-length, the major direction is not perpendicular to the normal,
    /// or the angular range is inverted.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        center: Point3,
        semi_major: f64,
        semi_minor: f64,
        normal: Vector3,
        major_dir: Vector3,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if semi_major < TOLERANCE {
            return Err(
                GeometryError::Degenerate("semi-major axis must be positive".into()).into(),
            );
        }
        if semi_minor < TOLERANCE {
            return Err(
                GeometryError::Degenerate("semi-minor axis must be positive".into()).into(),
            );
        }

        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / normal_len;

        let major_len = major_dir.norm();
        if major_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let major_dir = major_dir / major_len;

        if normal.dot(&major_dir).abs() > 1e-9 {
            return Err(GeometryError::Degenerate(
                "major direction must be perpendicular to normal".into(),
            )
            .into());
        }
        if end_angle < start_angle {
            return Err(GeometryError::Degenerate("ellipse angles are inverted".into()).into());
        }

        Ok(Self {
            center,
            semi_major,
            semi_minor,
            normal,
            major_dir,
            start_angle,
            end_angle,
        })
    }

    /// Creates a full (closed) ellipse.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Ellipse::new`].
    pub fn full(
        center: Point3,
        semi_major: f64,
        semi_minor: f64,
        normal: Vector3,
        major_dir: Vector3,
    ) -> Result<Self> {
        Self::new(center, semi_major, semi_minor, normal, major_dir, 0.0, TAU)
    }

    /// Returns the center of the ellipse.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the semi-major axis length.
    #[must_use]
    pub fn semi_major(&self) -> f64 {
        self.semi_major
    }

    /// Returns the semi-minor axis length.
    #[must_use]
    pub fn semi_minor(&self) -> f64 {
        self.semi_minor
    }

    /// Returns the normal vector of the ellipse plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Computes the minor axis direction (`normal x major_dir`).
    fn minor_dir(&self) -> Vector3 {
        self.normal.cross(&self.major_dir)
    }

    fn point_at(&self, t: f64) -> Point3 {
        self.center
            + self.major_dir * (self.semi_major * t.cos())
            + self.minor_dir() * (self.semi_minor * t.sin())
    }

    fn derivative_at(&self, t: f64) -> Vector3 {
        self.major_dir * (-self.semi_major * t.sin()) + self.minor_dir() * (self.semi_minor * t.cos())
    }

    /// Same arc, parameterised the other way round.
    ///
    /// Flipping the normal mirrors the angle, so `[s, e]` becomes `[-e, -s]`.
    fn flipped(&self, start_angle: f64, end_angle: f64) -> Self {
        Self {
            normal: -self.normal,
            start_angle: -end_angle,
            end_angle: -start_angle,
            ..self.clone()
        }
    }

    fn with_angles(&self, start_angle: f64, end_angle: f64) -> Self {
        Self {
            start_angle,
            end_angle,
            ..self.clone()
        }
    }

    /// Finds the angle in `[lo, hi]` nearest to `query`: dense sampling
    /// followed by Newton refinement of `(P - q) . P' = 0`.
    fn nearest_angle(&self, query: &Point3, lo: f64, hi: f64) -> Result<f64> {
        if !(query.x.is_finite() && query.y.is_finite() && query.z.is_finite()) {
            return Err(GeometryError::Projection("query point is not finite".into()).into());
        }

        let mut best_t = lo;
        let mut best_dist = f64::INFINITY;
        for i in 0..=PROJECTION_SAMPLES {
            let t = lo + (hi - lo) * f64::from(i) / f64::from(PROJECTION_SAMPLES);
            let d = (self.point_at(t) - query).norm_squared();
            if d < best_dist {
                best_dist = d;
                best_t = t;
            }
        }

        let mut t = best_t;
        for _ in 0..NEWTON_ITERATIONS {
            let diff = self.point_at(t) - query;
            let d1 = self.derivative_at(t);
            // P'' = -(P - center)
            let d2 = self.center - self.point_at(t);
            let g = diff.dot(&d1);
            let dg = d1.dot(&d1) + diff.dot(&d2);
            if dg.abs() < TOLERANCE {
                break;
            }
            let next = (t - g / dg).clamp(lo, hi);
            let step = (next - t).abs();
            t = next;
            if step < 1e-14 {
                break;
            }
        }

        if (self.point_at(t) - query).norm_squared() > best_dist {
            t = best_t;
        }
        Ok(t)
    }
}

impl Curve for Ellipse {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        if self.period().is_none() {
            check_parameter(t, self.domain())?;
        }
        Ok(self.point_at(t))
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        let tangent = self.derivative_at(t);
        let len = tangent.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(tangent / len)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(self.start_angle, self.end_angle)
    }

    fn is_closed(&self) -> bool {
        (self.end_angle - self.start_angle - TAU).abs() < TOLERANCE
    }

    fn period(&self) -> Option<f64> {
        self.is_closed().then_some(TAU)
    }

    fn kind(&self) -> CurveKind {
        CurveKind::Ellipse
    }

    fn project(&self, point: &Point3, allow_extension: bool) -> Result<f64> {
        if allow_extension || self.is_closed() {
            self.nearest_angle(point, self.start_angle, self.start_angle + TAU)
        } else {
            self.nearest_angle(point, self.start_angle, self.end_angle)
        }
    }

    fn trimmed(&self, from: f64, to: f64) -> Result<Box<dyn Curve>> {
        if self.is_closed() {
            // A span of one full turn keeps the whole loop.
            if ((to - from).abs() - TAU).abs() < TOLERANCE {
                let arc = if from <= to {
                    self.with_angles(from, to)
                } else {
                    self.flipped(to, from)
                };
                return Ok(Box::new(arc));
            }
            let mut delta = (to - from).rem_euclid(TAU);
            if delta > PI {
                delta -= TAU;
            }
            let arc = if delta >= 0.0 {
                self.with_angles(from, from + delta)
            } else {
                self.flipped(from + delta, from)
            };
            return Ok(Box::new(arc));
        }

        check_parameter(from, self.domain())?;
        check_parameter(to, self.domain())?;
        let arc = if from <= to {
            self.with_angles(from, to)
        } else {
            self.flipped(to, from)
        };
        Ok(Box::new(arc))
    }

    fn reversed(&self) -> Box<dyn Curve> {
        Box::new(self.flipped(self.start_angle, self.end_angle))
    }

    fn length(&self) -> Result<f64> {
        // Composite Simpson rule on |P'(t)|.
        let (lo, hi) = (self.start_angle, self.end_angle);
        let h = (hi - lo) / f64::from(LENGTH_INTERVALS);
        let mut sum = self.derivative_at(lo).norm() + self.derivative_at(hi).norm();
        for i in 1..LENGTH_INTERVALS {
            let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
            sum += weight * self.derivative_at(lo + h * f64::from(i)).norm();
        }
        Ok(sum * h / 3.0)
    }

    fn clone_box(&self) -> Box<dyn Curve> {
        Box::new(self.clone())
    }
}
