use tracing::trace;

use crate::error::{GeometryError, Result};
use crate::geometry::curve::{Curve, LineSegment};
use crate::geometry::surface::{Plane, Surface};
use crate::math::{horizontal, Point3, Vector3, POINT_TOLERANCE, TOLERANCE};

use super::{LinkStrategy, SafeHeight};

/// Link routed along the offset of the layup surface.
///
/// The offset surface lies one safe height off the layup surface on the
/// side its normal points to, which is where touch moves put their standoff
/// points. It is built once and shared by every link query.
///
/// A link follows the section of the offset surface with a vertical plane
/// through the travel direction, trimmed between the two endpoints.
#[derive(Debug)]
pub struct OffsetLink {
    height: SafeHeight,
    offset: Box<dyn Surface>,
}

impl OffsetLink {
    /// Creates the strategy for `surface` with a clearance of `safe_height`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `safe_height` is not positive, or a
    /// geometry error if the offset surface is degenerate.
    pub fn new(surface: &dyn Surface, safe_height: f64) -> Result<Self> {
        Self::with_height(surface, SafeHeight::new(safe_height)?)
    }

    /// Creates the strategy from an already validated height.
    ///
    /// # Errors
    ///
    /// Returns a geometry error if the offset surface is degenerate.
    pub fn with_height(surface: &dyn Surface, height: SafeHeight) -> Result<Self> {
        let offset = surface.offset(height.get())?;
        Ok(Self { height, offset })
    }

    /// Returns the clearance above the layup surface.
    #[must_use]
    pub fn height(&self) -> SafeHeight {
        self.height
    }

    /// Returns the offset surface links are routed on.
    #[must_use]
    pub fn offset_surface(&self) -> &dyn Surface {
        self.offset.as_ref()
    }

    /// Builds the vertical cutting plane through `source` along `travel`.
    fn cutter(&self, source: &Point3, travel: &Vector3) -> Result<Plane> {
        let along = horizontal(travel);
        if along.norm() < TOLERANCE {
            return Err(GeometryError::Intersection(
                "travel direction is vertical; no cutting plane along it".into(),
            )
            .into());
        }
        let origin = self.offset.project(source, false)?.point;
        Plane::new(origin, along, Vector3::z())
    }
}

impl LinkStrategy for OffsetLink {
    fn create_trajectory(&self, source: &Point3, target: &Point3) -> Result<Box<dyn Curve>> {
        let travel = target - source;
        if travel.norm() < POINT_TOLERANCE {
            trace!("coincident link endpoints, staying in place");
            return Ok(Box::new(LineSegment::new(*source, *source)));
        }

        let cutter = self.cutter(source, &travel)?;
        let section = self.offset.section(&cutter)?;

        let from = section.project(source, false)?;
        let to = section.project(target, false)?;
        let (entry, exit) = (section.evaluate(from)?, section.evaluate(to)?);
        if (entry - exit).norm() < POINT_TOLERANCE {
            return Err(GeometryError::DegenerateLink(format!(
                "endpoints {:.3} apart resolve to the same section point",
                travel.norm()
            ))
            .into());
        }
        // Both endpoints must lie on the section piece that was cut.
        let gap = (entry - source).norm().max((exit - target).norm());
        if gap > POINT_TOLERANCE {
            return Err(GeometryError::Intersection(format!(
                "section misses a link endpoint by {gap:.3}"
            ))
            .into());
        }

        trace!(from, to, kind = ?section.kind(), "offset link");
        section.trimmed(from, to)
    }
}

/// Link along the straight line between the endpoints.
///
/// Does not keep clear of the surface; meant for flat tools or as a
/// fallback when the offset section cannot be built.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLink;

impl LinkStrategy for StraightLink {
    fn create_trajectory(&self, source: &Point3, target: &Point3) -> Result<Box<dyn Curve>> {
        Ok(Box::new(LineSegment::new(*source, *target)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, TapepathError};
    use crate::geometry::curve::CurveKind;
    use crate::geometry::surface::{Cylinder, SurfaceDomain};
    use std::f64::consts::{PI, TAU};

    fn plate() -> Plane {
        Plane::new(Point3::origin(), Vector3::x(), Vector3::y())
            .unwrap()
            .bounded(SurfaceDomain::new(0.0, 100.0, 0.0, 100.0))
    }

    fn mandrel() -> Cylinder {
        Cylinder::new(Point3::origin(), 10.0, Vector3::x(), Vector3::z())
            .unwrap()
            .bounded(SurfaceDomain::new(0.0, TAU, 0.0, 200.0))
    }

    #[test]
    fn plate_link_runs_at_safe_height() {
        let surface = plate();
        let link = OffsetLink::new(&surface, 20.0).unwrap();
        let source = Point3::new(10.0, 10.0, 20.0);
        let target = Point3::new(60.0, 40.0, 20.0);

        let curve = link.create_trajectory(&source, &target).unwrap();
        assert!((curve.start_point().unwrap() - source).norm() < 1e-9);
        assert!((curve.end_point().unwrap() - target).norm() < 1e-9);
        assert!((curve.evaluate(0.5).unwrap().z - 20.0).abs() < 1e-9);
    }

    #[test]
    fn mandrel_link_follows_offset_circle() {
        let surface = mandrel();
        let link = OffsetLink::new(&surface, 5.0).unwrap();
        // Standoff points on radius 15, same axial station, a quarter turn apart.
        let source = Point3::new(50.0, 0.0, 15.0);
        let target = Point3::new(50.0, 15.0, 0.0);

        let curve = link.create_trajectory(&source, &target).unwrap();
        assert_eq!(curve.kind(), CurveKind::Ellipse);
        assert!((curve.start_point().unwrap() - source).norm() < 1e-6);
        assert!((curve.end_point().unwrap() - target).norm() < 1e-6);
        let mid = curve.evaluate(curve.domain().t_min + curve.domain().span() / 2.0).unwrap();
        assert!(((mid.y * mid.y + mid.z * mid.z).sqrt() - 15.0).abs() < 1e-6);
        assert!((curve.length().unwrap() - 15.0 * TAU / 4.0).abs() < 1e-6);
    }

    #[test]
    fn mandrel_link_along_axis_is_straight() {
        let surface = mandrel();
        let link = OffsetLink::new(&surface, 5.0).unwrap();
        let source = Point3::new(20.0, 0.0, 15.0);
        let target = Point3::new(120.0, 0.0, 15.0);

        let curve = link.create_trajectory(&source, &target).unwrap();
        assert_eq!(curve.kind(), CurveKind::LineSegment);
        assert!((curve.start_point().unwrap() - source).norm() < 1e-9);
        assert!((curve.end_point().unwrap() - target).norm() < 1e-9);
    }

    #[test]
    fn coincident_endpoints_give_zero_length_link() {
        let surface = plate();
        let link = OffsetLink::new(&surface, 20.0).unwrap();
        let p = Point3::new(30.0, 30.0, 20.0);

        let curve = link.create_trajectory(&p, &p).unwrap();
        assert!(curve.length().unwrap() < TOLERANCE);
        assert_eq!(curve.start_point().unwrap(), p);
    }

    #[test]
    fn vertical_travel_cannot_be_cut() {
        let surface = plate();
        let link = OffsetLink::new(&surface, 20.0).unwrap();
        let result = link.create_trajectory(
            &Point3::new(30.0, 30.0, 20.0),
            &Point3::new(30.0, 30.0, 40.0),
        );
        assert!(matches!(
            result,
            Err(TapepathError::Geometry(GeometryError::Intersection(_)))
        ));
    }

    #[test]
    fn endpoints_collapsing_on_section_are_degenerate() {
        // The source sits on the patch's far edge and the target beyond it,
        // so the clipped section clamps both onto its end.
        let surface = plate();
        let link = OffsetLink::new(&surface, 20.0).unwrap();
        let result = link.create_trajectory(
            &Point3::new(100.0, 50.0, 20.0),
            &Point3::new(300.0, 50.0, 20.0),
        );
        assert!(matches!(
            result,
            Err(TapepathError::Geometry(GeometryError::DegenerateLink(_)))
        ));
    }

    #[test]
    fn upright_mandrel_link_across_generators_fails() {
        // A vertical cut through an upright mandrel yields generator lines;
        // the target sits on a different one than the source.
        let surface = Cylinder::new(Point3::origin(), 100.0, Vector3::z(), Vector3::x())
            .unwrap()
            .bounded(SurfaceDomain::new(0.0, TAU, 0.0, 1000.0));
        let link = OffsetLink::new(&surface, 20.0).unwrap();
        let offset = link.offset_surface();
        let source = offset.evaluate(0.0, 900.0).unwrap();
        let target = offset.evaluate(0.5, 100.0).unwrap();

        let result = link.create_trajectory(&source, &target);
        assert!(matches!(
            result,
            Err(TapepathError::Geometry(GeometryError::Intersection(_)))
        ));
    }

    #[test]
    fn endpoint_off_the_offset_surface_fails() {
        // Target lifted 5 above the link height, as a taller touch would leave it.
        let surface = plate();
        let link = OffsetLink::new(&surface, 20.0).unwrap();
        let result = link.create_trajectory(
            &Point3::new(10.0, 10.0, 20.0),
            &Point3::new(60.0, 10.0, 25.0),
        );
        assert!(matches!(
            result,
            Err(TapepathError::Geometry(GeometryError::Intersection(_)))
        ));
    }

    #[test]
    fn partial_shell_link_stays_on_the_skin() {
        // Three-quarter skin: the short way from u=0.1 to u=4.5 crosses the
        // missing quarter, so the link must go the long way round.
        let surface = Cylinder::new(Point3::origin(), 10.0, Vector3::x(), Vector3::z())
            .unwrap()
            .bounded(SurfaceDomain::new(0.0, 1.5 * PI, 0.0, 200.0));
        let link = OffsetLink::new(&surface, 5.0).unwrap();
        let offset = link.offset_surface();
        let source = offset.evaluate(0.1, 50.0).unwrap();
        let target = offset.evaluate(4.5, 50.0).unwrap();

        let curve = link.create_trajectory(&source, &target).unwrap();
        assert!((curve.start_point().unwrap() - source).norm() < 1e-6);
        assert!((curve.end_point().unwrap() - target).norm() < 1e-6);
        assert!((curve.length().unwrap() - 15.0 * 4.4).abs() < 1e-4);
        let mid = curve.evaluate(curve.domain().t_min + curve.domain().span() / 2.0).unwrap();
        let (u, _) = surface.inverse(&mid);
        assert!(u < 1.5 * PI);
    }

    #[test]
    fn zero_height_fails_at_construction() {
        let surface = plate();
        assert!(matches!(
            OffsetLink::new(&surface, 0.0),
            Err(TapepathError::Config(ConfigError::NonPositiveSafeHeight(_)))
        ));
    }

    #[test]
    fn straight_link_joins_endpoints() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(4.0, 6.0, 3.0);
        let curve = StraightLink.create_trajectory(&a, &b).unwrap();
        assert_eq!(curve.start_point().unwrap(), a);
        assert_eq!(curve.end_point().unwrap(), b);
        assert!((curve.length().unwrap() - 5.0).abs() < TOLERANCE);
    }
}
