// Re-export glam for convenience
pub use glam::*;

// Ember math types
mod aabb;
mod interval;
mod ray;
pub mod sampling;
mod transform;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Mat4Ext;
pub use vector::{near_zero, reflect, refract};

/// A point in 3D space.
pub type Point3 = Vec3;

/// Linear RGB color, channels nominally in [0, 1].
pub type Color = Vec3;
