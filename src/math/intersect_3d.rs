use crate::geometry::surface::{Plane, SurfaceDomain};

use super::{Point3, Vector3, TOLERANCE};

/// Relationship between two planes.
#[derive(Debug)]
pub enum PlanePairRelation {
    /// Planes intersect along a line.
    IntersectionLine {
        origin: Point3,
        direction: Vector3,
    },
    /// Planes are parallel but not coincident.
    Parallel { distance: f64 },
    /// Planes are the same (coincident).
    Coincident,
}

/// Computes the intersection of two planes.
///
/// Returns an [`IntersectionLine`](PlanePairRelation::IntersectionLine) with a
/// unit-length `direction` when the planes cross, [`Parallel`](PlanePairRelation::Parallel)
/// when they don't, or [`Coincident`](PlanePairRelation::Coincident) when they overlap.
#[must_use]
pub fn plane_plane_intersect(a: &Plane, b: &Plane) -> PlanePairRelation {
    let na = a.plane_normal();
    let nb = b.plane_normal();

    let dir = na.cross(nb);
    let dir_len = dir.norm();

    if dir_len < TOLERANCE {
        let dist = (b.origin() - a.origin()).dot(na).abs();
        if dist < TOLERANCE {
            PlanePairRelation::Coincident
        } else {
            PlanePairRelation::Parallel { distance: dist }
        }
    } else {
        let dir = dir / dir_len;

        // p = oa + s * na + t * nb lies on both planes:
        //   s + t * (na.nb) = 0
        //   s * (na.nb) + t = nb.(ob - oa)
        let d2 = nb.dot(&(b.origin() - a.origin()));
        let dot_nn = na.dot(nb);
        let denom = 1.0 - dot_nn * dot_nn;

        let origin = if denom.abs() < TOLERANCE {
            *a.origin()
        } else {
            let s = -dot_nn * d2 / denom;
            let t = d2 / denom;
            a.origin() + na * s + nb * t
        };

        PlanePairRelation::IntersectionLine {
            origin,
            direction: dir,
        }
    }
}

/// Clips the parametric line `(u0 + s * du, v0 + s * dv)` to a rectangular
/// surface domain (Liang-Barsky).
///
/// Returns the parameter interval `(s_min, s_max)` inside the domain, or
/// `None` when the line misses it. Infinite domain bounds never clip.
#[must_use]
pub fn clip_to_domain(
    start: (f64, f64),
    delta: (f64, f64),
    domain: &SurfaceDomain,
) -> Option<(f64, f64)> {
    let mut s_min = f64::NEG_INFINITY;
    let mut s_max = f64::INFINITY;

    let axes = [
        (start.0, delta.0, domain.u_min, domain.u_max),
        (start.1, delta.1, domain.v_min, domain.v_max),
    ];
    for (p, d, lo, hi) in axes {
        if d.abs() < TOLERANCE {
            if p < lo - TOLERANCE || p > hi + TOLERANCE {
                return None;
            }
            continue;
        }
        let (a, b) = ((lo - p) / d, (hi - p) / d);
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        s_min = s_min.max(a);
        s_max = s_max.min(b);
    }

    (s_min <= s_max).then_some((s_min, s_max))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn perpendicular_planes_meet_in_a_line() {
        let floor = Plane::from_normal(Point3::new(0.0, 0.0, 2.0), Vector3::z()).unwrap();
        let wall = Plane::from_normal(Point3::new(3.0, 0.0, 0.0), Vector3::x()).unwrap();

        match plane_plane_intersect(&floor, &wall) {
            PlanePairRelation::IntersectionLine { origin, direction } => {
                assert!((origin.x - 3.0).abs() < 1e-9);
                assert!((origin.z - 2.0).abs() < 1e-9);
                assert!(direction.cross(&Vector3::y()).norm() < 1e-9);
            }
            other => panic!("expected a line, got {other:?}"),
        }
    }

    #[test]
    fn parallel_planes_report_distance() {
        let a = Plane::from_normal(Point3::origin(), Vector3::z()).unwrap();
        let b = Plane::from_normal(Point3::new(0.0, 0.0, 4.0), Vector3::z()).unwrap();

        assert!(matches!(
            plane_plane_intersect(&a, &b),
            PlanePairRelation::Parallel { distance } if (distance - 4.0).abs() < 1e-9
        ));
        assert!(matches!(
            plane_plane_intersect(&a, &a),
            PlanePairRelation::Coincident
        ));
    }

    #[test]
    fn clip_diagonal_through_square() {
        let domain = SurfaceDomain::new(0.0, 10.0, 0.0, 10.0);
        let (s0, s1) = clip_to_domain((-5.0, 5.0), (1.0, 0.0), &domain).unwrap();
        assert!((s0 - 5.0).abs() < 1e-12);
        assert!((s1 - 15.0).abs() < 1e-12);
    }

    #[test]
    fn clip_misses_square() {
        let domain = SurfaceDomain::new(0.0, 10.0, 0.0, 10.0);
        assert!(clip_to_domain((0.0, 12.0), (1.0, 0.0), &domain).is_none());
    }

    #[test]
    fn clip_unbounded_domain_keeps_line() {
        let domain = SurfaceDomain::unbounded();
        let (s0, s1) = clip_to_domain((0.0, 0.0), (1.0, 1.0), &domain).unwrap();
        assert!(s0.is_infinite() && s1.is_infinite());
    }
}
