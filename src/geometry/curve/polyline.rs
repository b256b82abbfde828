use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{check_parameter, Curve, CurveDomain, CurveKind, LineSegment};

/// A piecewise-linear curve through a sequence of 3D points.
///
/// Parameterised by arc length, so `t` runs from `0` to the total length.
/// Tape center lines are usually handed over in this form.
#[derive(Debug, Clone)]
pub struct Polyline {
    points: Vec<Point3>,
    /// Arc length at each point; `cumulative[0] == 0`.
    cumulative: Vec<f64>,
}

impl Polyline {
    /// Creates a polyline, dropping consecutive duplicate points.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two distinct points remain.
    pub fn new(points: impl IntoIterator<Item = Point3>) -> Result<Self> {
        let mut kept: Vec<Point3> = Vec::new();
        for p in points {
            if kept.last().is_none_or(|last| (p - last).norm() > TOLERANCE) {
                kept.push(p);
            }
        }
        if kept.len() < 2 {
            return Err(GeometryError::Degenerate(
                "polyline needs at least two distinct points".into(),
            )
            .into());
        }

        let mut cumulative = Vec::with_capacity(kept.len());
        let mut total = 0.0;
        cumulative.push(total);
        for pair in kept.windows(2) {
            total += (pair[1] - pair[0]).norm();
            cumulative.push(total);
        }

        Ok(Self {
            points: kept,
            cumulative,
        })
    }

    /// Returns the vertices of the polyline.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Index of the segment containing arc length `t`.
    fn segment_index(&self, t: f64) -> usize {
        let last_segment = self.points.len() - 2;
        self.cumulative
            .partition_point(|&c| c <= t)
            .saturating_sub(1)
            .min(last_segment)
    }

    fn point_at(&self, t: f64) -> Point3 {
        if t <= 0.0 {
            return self.points[0];
        }
        if t >= self.total() {
            return self.points[self.points.len() - 1];
        }
        let i = self.segment_index(t);
        let (a, b) = (self.points[i], self.points[i + 1]);
        let len = self.cumulative[i + 1] - self.cumulative[i];
        a + (b - a) * ((t - self.cumulative[i]) / len)
    }
}

impl Curve for Polyline {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        check_parameter(t, self.domain())?;
        Ok(self.point_at(t))
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        check_parameter(t, self.domain())?;
        let i = self.segment_index(t);
        let d = self.points[i + 1] - self.points[i];
        Ok(d / d.norm())
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, self.total())
    }

    fn is_closed(&self) -> bool {
        (self.points[0] - self.points[self.points.len() - 1]).norm() < TOLERANCE
    }

    fn kind(&self) -> CurveKind {
        CurveKind::Polyline
    }

    fn project(&self, point: &Point3, allow_extension: bool) -> Result<f64> {
        let last_segment = self.points.len() - 2;
        let mut best_t = 0.0;
        let mut best_dist = f64::INFINITY;

        for (i, pair) in self.points.windows(2).enumerate() {
            let d = pair[1] - pair[0];
            let len = d.norm();
            let mut s = (point - pair[0]).dot(&d) / len;
            let lo = if allow_extension && i == 0 { f64::NEG_INFINITY } else { 0.0 };
            let hi = if allow_extension && i == last_segment { f64::INFINITY } else { len };
            s = s.clamp(lo, hi);
            let dist = (point - (pair[0] + d * (s / len))).norm();
            if dist < best_dist {
                best_dist = dist;
                best_t = self.cumulative[i] + s;
            }
        }

        if best_dist.is_finite() {
            Ok(best_t)
        } else {
            Err(GeometryError::Projection("query point is not finite".into()).into())
        }
    }

    fn trimmed(&self, from: f64, to: f64) -> Result<Box<dyn Curve>> {
        check_parameter(from, self.domain())?;
        check_parameter(to, self.domain())?;
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };

        if hi - lo < TOLERANCE {
            let p = self.point_at(lo);
            return Ok(Box::new(LineSegment::new(p, p)));
        }

        let mut points = vec![self.point_at(lo)];
        points.extend(
            self.points
                .iter()
                .zip(&self.cumulative)
                .filter(|&(_, &c)| c > lo + TOLERANCE && c < hi - TOLERANCE)
                .map(|(p, _)| *p),
        );
        points.push(self.point_at(hi));
        if from > to {
            points.reverse();
        }
        Ok(Box::new(Self::new(points)?))
    }

    fn reversed(&self) -> Box<dyn Curve> {
        let points: Vec<Point3> = self.points.iter().rev().copied().collect();
        let total = self.total();
        let cumulative = self.cumulative.iter().rev().map(|c| total - c).collect();
        Box::new(Self { points, cumulative })
    }

    fn length(&self) -> Result<f64> {
        Ok(self.total())
    }

    fn clone_box(&self) -> Box<dyn Curve> {
        Box::new(self.clone())
    }

    fn start_point(&self) -> Result<Point3> {
        Ok(self.points[0])
    }

    fn end_point(&self) -> Result<Point3> {
        Ok(self.points[self.points.len() - 1])
    }
}
