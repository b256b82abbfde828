use crate::error::{GeometryError, Result};
use crate::geometry::curve::{Curve, Line, LineSegment};
use crate::math::intersect_3d::{clip_to_domain, plane_plane_intersect, PlanePairRelation};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{check_projection, Surface, SurfaceDomain, SurfacePoint};

/// A plane in 3D space, optionally bounded to a rectangular patch.
///
/// Defined by an origin point, and two orthogonal direction vectors
/// (`u_dir`, `v_dir`). The normal is `u_dir × v_dir`.
///
/// Parametric form: `P(u, v) = origin + u * u_dir + v * v_dir`.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
    domain: SurfaceDomain,
}

impl Plane {
    /// Creates a new unbounded plane from an origin and two direction vectors.
    ///
    /// `v_dir` is made orthogonal to `u_dir` within their common plane.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vectors are zero-length
    /// or parallel (degenerate plane).
    pub fn new(origin: Point3, u_dir: Vector3, v_dir: Vector3) -> Result<Self> {
        let u_len = u_dir.norm();
        if u_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        if v_dir.norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let u_dir = u_dir / u_len;

        let normal = u_dir.cross(&v_dir);
        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(
                GeometryError::Degenerate("plane directions are parallel".into()).into(),
            );
        }
        let normal = normal / normal_len;
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
            domain: SurfaceDomain::unbounded(),
        })
    }

    /// Creates an unbounded plane from an origin and a normal vector.
    ///
    /// The U and V directions are computed automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;

        // Choose a reference vector not parallel to the normal
        let reference = if normal.x.abs() < 0.9 {
            Vector3::new(1.0, 0.0, 0.0)
        } else {
            Vector3::new(0.0, 1.0, 0.0)
        };

        let v_dir = normal.cross(&reference).normalize();
        let u_dir = v_dir.cross(&normal);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
            domain: SurfaceDomain::unbounded(),
        })
    }

    /// Restricts the plane to the patch `domain`.
    #[must_use]
    pub fn bounded(mut self, domain: SurfaceDomain) -> Self {
        self.domain = domain;
        self
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the U direction vector.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the V direction vector.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the normal vector of the plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the signed distance from the plane to `point` along the normal.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.normal)
    }
}

impl Surface for Plane {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(self.origin + self.u_dir * u + self.v_dir * v)
    }

    fn normal(&self, _u: f64, _v: f64) -> Result<Vector3> {
        Ok(self.normal)
    }

    fn domain(&self) -> SurfaceDomain {
        self.domain
    }

    fn project(&self, point: &Point3, allow_extension: bool) -> Result<SurfacePoint> {
        let dp = point - self.origin;
        let u = dp.dot(&self.u_dir);
        let v = dp.dot(&self.v_dir);
        if !(u.is_finite() && v.is_finite()) {
            return Err(GeometryError::Projection("query point is not finite".into()).into());
        }
        let foot = self.evaluate(u, v)?;
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
        Ok(Box::new(Self {
            origin: self.origin + self.normal * distance,
            ..self.clone()
        }))
    }

    fn section(&self, plane: &Plane) -> Result<Box<dyn Curve>> {
        let (origin, direction) = match plane_plane_intersect(self, plane) {
            PlanePairRelation::IntersectionLine { origin, direction } => (origin, direction),
            PlanePairRelation::Parallel { distance } => {
                return Err(GeometryError::Intersection(format!(
                    "cutting plane is parallel to the surface at distance {distance}"
                ))
                .into());
            }
            PlanePairRelation::Coincident => {
                return Err(GeometryError::Intersection(
                    "cutting plane coincides with the surface".into(),
                )
                .into());
            }
        };

        let dp = origin - self.origin;
        let start = (dp.dot(&self.u_dir), dp.dot(&self.v_dir));
        let delta = (direction.dot(&self.u_dir), direction.dot(&self.v_dir));
        let Some((s_min, s_max)) = clip_to_domain(start, delta, &self.domain) else {
            return Err(GeometryError::Intersection(
                "cutting plane misses the surface patch".into(),
            )
            .into());
        };

        if s_min.is_finite() && s_max.is_finite() {
            Ok(Box::new(LineSegment::new(
                origin + direction * s_min,
                origin + direction * s_max,
            )))
        } else {
            Ok(Box::new(Line::new(origin, direction)?))
        }
    }
}
