use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::geometry::curve::{Curve, Ellipse, Line, LineSegment};
use crate::math::{Point3, Vector3, POINT_TOLERANCE, TOLERANCE};

use super::{check_projection, Plane, Surface, SurfaceDomain, SurfacePoint};

/// Below this `|cos|` between cutting-plane normal and axis, the plane is
/// treated as parallel to the axis.
const PARALLEL_COS: f64 = 1e-9;

/// Samples per turn when locating where a section leaves the domain.
const SECTION_SAMPLES: u32 = 720;
const BISECTION_STEPS: usize = 60;

/// A cylindrical surface in 3D space, such as a mandrel or spar skin.
///
/// Defined by a center point on the axis, radius, axis direction, and
/// a reference direction for u=0.
///
/// `P(u, v) = center + radius * cos(u) * ref_dir + radius * sin(u) * binormal + v * axis`
/// where `binormal = axis x ref_dir`.
///
/// The normal points outward: `cos(u) * ref_dir + sin(u) * binormal`.
#[derive(Debug, Clone)]
pub struct Cylinder {
    center: Point3,
    radius: f64,
    axis: Vector3,
    ref_dir: Vector3,
    domain: SurfaceDomain,
}

impl Cylinder {
    /// Creates a new cylinder spanning the full circle and an unbounded length.
    ///
    /// # Arguments
    ///
    /// * `center` - A point on the cylinder axis
    /// * `radius` - Radius (must be positive)
    /// * `axis` - Axis direction (will be normalized)
    /// * `ref_dir` - Reference direction for u=0 (must be perpendicular to axis)
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, axis is zero-length,
    /// or the reference direction is not perpendicular to the axis.
    pub fn new(center: Point3, radius: f64, axis: Vector3, ref_dir: Vector3) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("cylinder radius must be positive".into()).into(),
            );
        }

        let axis_len = axis.norm();
        if axis_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let axis = axis / axis_len;

        let ref_len = ref_dir.norm();
        if ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let ref_dir = ref_dir / ref_len;

        if axis.dot(&ref_dir).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to axis".into(),
            )
            .into());
        }

        Ok(Self {
            center,
            radius,
            axis,
            ref_dir,
            domain: SurfaceDomain::new(0.0, TAU, f64::NEG_INFINITY, f64::INFINITY),
        })
    }

    /// Restricts the cylinder to `domain` (angle range in U, axial range in V).
    #[must_use]
    pub fn bounded(mut self, domain: SurfaceDomain) -> Self {
        self.domain = domain;
        self
    }

    /// Returns the center point on the axis.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the axis direction (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Computes the binormal direction (`axis x ref_dir`).
    fn binormal(&self) -> Vector3 {
        self.axis.cross(&self.ref_dir)
    }

    /// Computes the (u, v) parameters for a given 3D point on the surface.
    ///
    /// `u` is wrapped into `[u_min, u_min + 2pi)`; `v` is the signed
    /// distance along the axis from the center.
    #[must_use]
    pub fn inverse(&self, point: &Point3) -> (f64, f64) {
        let dp = point - self.center;
        let v = dp.dot(&self.axis);
        let angle = dp.dot(&self.binormal()).atan2(dp.dot(&self.ref_dir));
        let u = self.domain.u_min + (angle - self.domain.u_min).rem_euclid(TAU);
        (u, v)
    }

    /// Section by a plane parallel to the axis.
    ///
    /// The plane cuts two generator lines; the one nearest the plane's
    /// origin is returned.
    fn generator_section(&self, plane: &Plane) -> Result<Box<dyn Curve>> {
        let n = plane.plane_normal();
        let offset = plane.signed_distance(&self.center);
        if offset.abs() > self.radius + POINT_TOLERANCE {
            return Err(GeometryError::Intersection(format!(
                "cutting plane passes {:.3} from the axis, outside radius {:.3}",
                offset.abs(),
                self.radius
            ))
            .into());
        }

        let foot = self.center - n * offset;
        let across = n.cross(&self.axis);
        let half_chord = (self.radius * self.radius - offset * offset).max(0.0).sqrt();
        let near_origin = |base: &Point3| {
            let dp = plane.origin() - base;
            (dp - self.axis * dp.dot(&self.axis)).norm()
        };
        let (a, b) = (foot + across * half_chord, foot - across * half_chord);
        let base = if near_origin(&a) <= near_origin(&b) { a } else { b };

        let (u, _) = self.inverse(&base);
        if u > self.domain.u_max + POINT_TOLERANCE {
            return Err(GeometryError::Intersection(
                "section line lies outside the cylinder's angular range".into(),
            )
            .into());
        }

        let (v_min, v_max) = (self.domain.v_min, self.domain.v_max);
        if v_min.is_finite() && v_max.is_finite() {
            Ok(Box::new(LineSegment::new(
                base + self.axis * v_min,
                base + self.axis * v_max,
            )))
        } else {
            Ok(Box::new(Line::new(base, self.axis)?))
        }
    }

    /// Restricts a closed section to the cylinder's domain.
    ///
    /// Returns the whole ellipse when it stays inside, otherwise the arc of
    /// the section nearest to `origin`. `arc(start, end)` rebuilds the
    /// section over an angle range.
    fn clip_section(
        &self,
        ellipse: Ellipse,
        arc: &dyn Fn(f64, f64) -> Result<Ellipse>,
        origin: &Point3,
    ) -> Result<Box<dyn Curve>> {
        let inside = |t: f64| -> Result<bool> {
            let (u, v) = self.inverse(&ellipse.evaluate(t)?);
            Ok(self.domain.contains(u, v, POINT_TOLERANCE))
        };
        let step = TAU / f64::from(SECTION_SAMPLES);
        let flags = (0..SECTION_SAMPLES)
            .map(|i| inside(step * f64::from(i)))
            .collect::<Result<Vec<bool>>>()?;
        let Some(first_out) = flags.iter().position(|&f| !f) else {
            return Ok(Box::new(ellipse.clone()));
        };

        // Inside runs as sample ranges, walked from an outside sample so
        // that no run wraps past the end of the sample list.
        let first_out = u32::try_from(first_out).unwrap_or(0);
        let mut runs = Vec::new();
        let mut open = None;
        for j in first_out..=first_out + SECTION_SAMPLES {
            let is_inside = flags[(j % SECTION_SAMPLES) as usize];
            match (open, is_inside) {
                (None, true) => open = Some(j),
                (Some(start), false) => {
                    runs.push((start, j - 1));
                    open = None;
                }
                _ => {}
            }
        }

        let boundary = |mut t_in: f64, mut t_out: f64| -> Result<f64> {
            for _ in 0..BISECTION_STEPS {
                let mid = 0.5 * (t_in + t_out);
                if inside(mid)? {
                    t_in = mid;
                } else {
                    t_out = mid;
                }
            }
            Ok(t_in)
        };

        let mut best: Option<(f64, Ellipse)> = None;
        for (first, last) in runs {
            let start = boundary(step * f64::from(first), step * f64::from(first - 1))?;
            let end = boundary(step * f64::from(last), step * f64::from(last + 1))?;
            let turns = (start / TAU).floor() * TAU;
            let piece = arc(start - turns, end - turns)?;
            let distance = (piece.evaluate(piece.project(origin, false)?)? - origin).norm();
            if best.as_ref().is_none_or(|(d, _)| distance < *d) {
                best = Some((distance, piece));
            }
        }

        best.map(|(_, piece)| Box::new(piece) as Box<dyn Curve>)
            .ok_or_else(|| {
                GeometryError::Intersection(
                    "cutting plane misses the cylinder's bounded extent".into(),
                )
                .into()
            })
    }
}

impl Surface for Cylinder {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let binormal = self.binormal();
        let x = self.radius * u.cos();
        let y = self.radius * u.sin();
        Ok(self.center + self.ref_dir * x + binormal * y + self.axis * v)
    }

    fn normal(&self, u: f64, _v: f64) -> Result<Vector3> {
        let n = self.ref_dir * u.cos() + self.binormal() * u.sin();
        let len = n.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(n / len)
    }

    fn domain(&self) -> SurfaceDomain {
        self.domain
    }

    fn project(&self, point: &Point3, allow_extension: bool) -> Result<SurfacePoint> {
        let dp = point - self.center;
        let along = dp.dot(&self.axis);
        let radial = dp - self.axis * along;
        let radial_len = radial.norm();
        if !radial_len.is_finite() {
            return Err(GeometryError::Projection("query point is not finite".into()).into());
        }
        if radial_len < TOLERANCE {
            return Err(GeometryError::Projection(
                "point lies on the cylinder axis; nearest point is undefined".into(),
            )
            .into());
        }

        let foot = self.center + self.axis * along + radial * (self.radius / radial_len);
        let (u, v) = self.inverse(&foot);
        check_projection(
            self,
            SurfacePoint {
                u,
                v,
                point: foot,
                distance: (point - foot).norm(),
            },
            allow_extension,
        )
    }

    fn offset(&self, distance: f64) -> Result<Box<dyn Surface>> {
        let radius = self.radius + distance;
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "cylinder offset would produce zero or negative radius".into(),
            )
            .into());
        }
        Ok(Box::new(Self {
            radius,
            ..self.clone()
        }))
    }

    fn section(&self, plane: &Plane) -> Result<Box<dyn Curve>> {
        let n = plane.plane_normal();
        let cos = n.dot(&self.axis);
        if cos.abs() < PARALLEL_COS {
            return self.generator_section(plane);
        }

        // Ellipse centered where the axis crosses the plane.
        let t = (plane.origin() - self.center).dot(n) / cos;
        let center = self.center + self.axis * t;
        let cross = self.axis.cross(n);
        let cross_len = cross.norm();

        let (semi_major, major_dir) = if cross_len < PARALLEL_COS {
            (self.radius, self.ref_dir)
        } else {
            (self.radius / cos.abs(), n.cross(&(cross / cross_len)))
        };
        let arc = |start: f64, end: f64| {
            Ellipse::new(center, semi_major, self.radius, *n, major_dir, start, end)
        };
        self.clip_section(arc(0.0, TAU)?, &arc, plane.origin())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::TapepathError;
    use crate::geometry::curve::CurveKind;
    use std::f64::consts::{FRAC_PI_2, PI};

    /// Horizontal mandrel along X with radius 2.
    fn mandrel() -> Cylinder {
        Cylinder::new(Point3::origin(), 2.0, Vector3::x(), Vector3::z()).unwrap()
    }

    #[test]
    fn evaluate_and_normal_at_top() {
        let c = mandrel();
        let p = c.evaluate(0.0, 5.0).unwrap();
        assert!((p - Point3::new(5.0, 0.0, 2.0)).norm() < TOLERANCE);
        assert!((c.normal(0.0, 0.0).unwrap() - Vector3::z()).norm() < TOLERANCE);
    }

    #[test]
    fn inverse_roundtrip() {
        let c = mandrel();
        for &(u, v) in &[(0.0, 0.0), (FRAC_PI_2, 3.0), (1.0, -2.5), (TAU * 0.75, 1.0)] {
            let p = c.evaluate(u, v).unwrap();
            let (u2, v2) = c.inverse(&p);
            let p2 = c.evaluate(u2, v2).unwrap();
            assert!((p - p2).norm() < 1e-9, "roundtrip failed for u={u}, v={v}");
        }
    }

    #[test]
    fn project_from_outside() {
        let sp = mandrel().project(&Point3::new(1.0, 0.0, 7.0), false).unwrap();
        assert!((sp.point - Point3::new(1.0, 0.0, 2.0)).norm() < 1e-9);
        assert!((sp.distance - 5.0).abs() < 1e-9);
    }

    #[test]
    fn project_on_axis_fails() {
        assert!(matches!(
            mandrel().project(&Point3::new(3.0, 0.0, 0.0), false),
            Err(TapepathError::Geometry(GeometryError::Projection(_)))
        ));
    }

    #[test]
    fn project_beyond_length_fails_when_bounded() {
        let c = mandrel().bounded(SurfaceDomain::new(0.0, TAU, 0.0, 10.0));
        assert!(c.project(&Point3::new(12.0, 0.0, 3.0), false).is_err());
        assert!(c.project(&Point3::new(12.0, 0.0, 3.0), true).is_ok());
    }

    #[test]
    fn offset_grows_radius() {
        let off = mandrel().offset(3.0).unwrap();
        let p = off.evaluate(0.0, 0.0).unwrap();
        assert!((p - Point3::new(0.0, 0.0, 5.0)).norm() < TOLERANCE);
        assert!(mandrel().offset(-2.0).is_err());
    }

    #[test]
    fn cross_cut_is_circle() {
        let cutter = Plane::new(Point3::new(4.0, 0.0, 2.0), Vector3::y(), Vector3::z()).unwrap();
        let curve = mandrel().section(&cutter).unwrap();
        assert_eq!(curve.kind(), CurveKind::Ellipse);
        assert!(curve.is_closed());
        assert!((curve.length().unwrap() - 2.0 * TAU).abs() < 1e-6);
    }

    #[test]
    fn oblique_cut_lies_on_cylinder() {
        let c = mandrel();
        let cutter = Plane::new(
            Point3::new(0.0, 0.0, 2.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::z(),
        )
        .unwrap();
        let curve = c.section(&cutter).unwrap();
        for i in 0..16 {
            let p = curve.evaluate(f64::from(i) * TAU / 16.0).unwrap();
            let radial = (p.y * p.y + p.z * p.z).sqrt();
            assert!((radial - 2.0).abs() < 1e-9);
            assert!(cutter.signed_distance(&p).abs() < 1e-9);
        }
    }

    #[test]
    fn cross_cut_of_half_shell_is_half_circle() {
        let c = mandrel().bounded(SurfaceDomain::new(0.0, PI, 0.0, 10.0));
        let cutter = Plane::new(Point3::new(4.0, 0.0, 0.0), Vector3::y(), Vector3::z()).unwrap();
        let curve = c.section(&cutter).unwrap();
        assert!(!curve.is_closed());
        assert!((curve.length().unwrap() - 2.0 * PI).abs() < 1e-6);
        for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let p = curve.evaluate(curve.domain().t_min + t * curve.domain().span()).unwrap();
            let (u, _) = c.inverse(&p);
            assert!(u <= PI + 1e-6, "point at u={u} is off the shell");
        }
    }

    #[test]
    fn oblique_cut_stops_at_mandrel_end() {
        let c = mandrel().bounded(SurfaceDomain::new(0.0, TAU, 0.0, 10.0));
        // Plane x - z = 1: its ellipse reaches x=-1..3, so the mandrel end
        // at x=0 cuts a piece off.
        let cutter = Plane::new(
            Point3::new(1.0, 0.0, 0.0),
            Vector3::y(),
            Vector3::new(1.0, 0.0, 1.0),
        )
        .unwrap();
        let curve = c.section(&cutter).unwrap();
        assert!(!curve.is_closed());
        for i in 0..=8 {
            let t = curve.domain().t_min + f64::from(i) / 8.0 * curve.domain().span();
            let (_, v) = c.inverse(&curve.evaluate(t).unwrap());
            assert!((-1e-6..=10.0 + 1e-6).contains(&v));
        }
        assert!(curve.start_point().unwrap().x.abs() < 1e-6);
        assert!(curve.end_point().unwrap().x.abs() < 1e-6);
    }

    #[test]
    fn cross_cut_beyond_mandrel_fails() {
        let c = mandrel().bounded(SurfaceDomain::new(0.0, TAU, 0.0, 10.0));
        let cutter = Plane::new(Point3::new(15.0, 0.0, 0.0), Vector3::y(), Vector3::z()).unwrap();
        assert!(matches!(
            c.section(&cutter),
            Err(TapepathError::Geometry(GeometryError::Intersection(_)))
        ));
    }

    #[test]
    fn axial_cut_is_generator_line() {
        let c = mandrel().bounded(SurfaceDomain::new(0.0, TAU, -1.0, 9.0));
        let cutter = Plane::new(Point3::new(0.0, 0.5, 1.9), Vector3::x(), Vector3::z()).unwrap();
        let curve = c.section(&cutter).unwrap();
        assert_eq!(curve.kind(), CurveKind::LineSegment);
        let a = curve.start_point().unwrap();
        assert!((a.x + 1.0).abs() < 1e-9);
        assert!((a.y - 0.5).abs() < 1e-9);
        assert!(a.z > 0.0);
        assert!((curve.length().unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn axial_cut_outside_radius_fails() {
        let cutter = Plane::new(Point3::new(0.0, 3.0, 0.0), Vector3::x(), Vector3::z()).unwrap();
        assert!(matches!(
            mandrel().section(&cutter),
            Err(TapepathError::Geometry(GeometryError::Intersection(_)))
        ));
    }
}
