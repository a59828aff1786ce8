//! Constant-density participating media (smoke, fog).

use crate::{HitRecord, Hittable, Isotropic, Texture};
use ember_math::sampling::gen_f32;
use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Gap left after the entry point when searching for the exit point.
const EXIT_EPSILON: f32 = 0.0001;

/// A volume of uniform density filling a closed boundary.
///
/// Rays passing through scatter at an exponentially distributed distance;
/// those that make it across pass through untouched.
pub struct ConstantMedium {
    boundary: Arc<dyn Hittable>,
    phase_function: Isotropic,
    neg_inv_density: f32,
}

impl ConstantMedium {
    pub fn new(boundary: Arc<dyn Hittable>, density: f32, albedo: impl Into<Texture>) -> Self {
        Self {
            boundary,
            phase_function: Isotropic::textured(albedo.into()),
            neg_inv_density: -1.0 / density,
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        // Entry and exit along the whole line, then clipped to the window
        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self.boundary.hit(
            ray,
            Interval::new(entry.t + EXIT_EPSILON, f32::INFINITY),
            rng,
        )?;

        let t_enter = entry.t.max(ray_t.min).max(0.0);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }

        let ray_length = ray.direction().length();
        let distance_inside = (t_exit - t_enter) * ray_length;
        // Uniform in (0, 1] so the logarithm stays finite
        let sample = 1.0 - gen_f32(rng);
        let hit_distance = self.neg_inv_density * sample.ln();
        if hit_distance > distance_inside {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        if !ray_t.admits(t) {
            return None;
        }

        // Normal and face are arbitrary inside a volume
        Some(HitRecord {
            p: ray.at(t),
            normal: Vec3::X,
            material: &self.phase_function,
            t,
            u: 0.0,
            v: 0.0,
            front_face: true,
        })
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        self.boundary.bounding_box(time0, time1)
    }
}
