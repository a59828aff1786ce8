//! Rigidly transformed geometry (translation and rotation about Y).
//!
//! Rather than moving the object, incoming rays are moved into its local
//! space and the hit is moved back out.

use crate::{HitRecord, Hittable};
use ember_math::{Aabb, Interval, Mat4, Mat4Ext, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A hittable placed in the world by a rigid transform.
pub struct Transformed {
    object: Arc<dyn Hittable>,
    /// Local-to-world transform
    to_world: Mat4,
    /// World-to-local transform (for ray transformation)
    to_local: Mat4,
}

impl Transformed {
    /// Place `object` with a local-to-world transform.
    ///
    /// Only rotations and translations are supported: normals are carried
    /// across with the same matrix.
    pub fn new(object: Arc<dyn Hittable>, to_world: Mat4) -> Self {
        Self {
            object,
            to_world,
            to_local: to_world.inverse(),
        }
    }

    /// Move `object` by `offset`.
    pub fn translate(object: Arc<dyn Hittable>, offset: Vec3) -> Self {
        Self::new(object, Mat4::from_translation(offset))
    }

    /// Rotate `object` about the Y axis by `degrees` (counter-clockwise
    /// looking down from +Y).
    pub fn rotate_y(object: Arc<dyn Hittable>, degrees: f32) -> Self {
        Self::new(object, Mat4::from_rotation_y(degrees.to_radians()))
    }
}

impl Hittable for Transformed {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        // Direction is not normalized so t means the same thing in both spaces
        let local_ray = Ray::new(
            self.to_local.transform_point3(ray.origin()),
            self.to_local.transform_vector3(ray.direction()),
            ray.time(),
        );

        let mut rec = self.object.hit(&local_ray, ray_t, rng)?;

        // The local normal already opposes the local ray, and a rigid
        // transform preserves that, so front_face carries over unchanged.
        rec.p = self.to_world.transform_point3(rec.p);
        rec.normal = self.to_world.transform_vector3(rec.normal);

        Some(rec)
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        self.object
            .bounding_box(time0, time1)
            .map(|bbox| self.to_world.transform_aabb(&bbox))
    }
}
