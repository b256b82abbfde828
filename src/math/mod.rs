pub mod intersect_3d;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Distance below which two points are treated as the same machine position.
pub const POINT_TOLERANCE: f64 = 1e-6;

/// Returns the component of `v` perpendicular to the global Z axis.
#[must_use]
pub fn horizontal(v: &Vector3) -> Vector3 {
    Vector3::new(v.x, v.y, 0.0)
}
