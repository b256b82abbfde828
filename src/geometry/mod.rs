pub mod curve;
pub mod surface;

pub use curve::{Curve, CurveDomain, CurveKind, Ellipse, Line, LineSegment, Polyline};
pub use surface::{Cylinder, Plane, Surface, SurfaceDomain, SurfacePoint};
