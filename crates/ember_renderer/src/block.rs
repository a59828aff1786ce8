//! Axis-aligned box built from six rectangles.

use crate::{AaRect, HitRecord, Hittable, HittableList, Material};
use ember_math::{Aabb, Interval, Point3, Ray};
use rand::RngCore;
use std::sync::Arc;

pub struct Block {
    bbox: Aabb,
    sides: HittableList,
}

impl Block {
    /// Box spanning corners `p0` (min) and `p1` (max).
    pub fn new(p0: Point3, p1: Point3, material: Arc<dyn Material>) -> Self {
        let mut sides = HittableList::new();

        sides.push(AaRect::xy((p0.x, p1.x), (p0.y, p1.y), p1.z, material.clone()));
        sides.push(AaRect::xy((p0.x, p1.x), (p0.y, p1.y), p0.z, material.clone()));

        sides.push(AaRect::xz((p0.x, p1.x), (p0.z, p1.z), p1.y, material.clone()));
        sides.push(AaRect::xz((p0.x, p1.x), (p0.z, p1.z), p0.y, material.clone()));

        sides.push(AaRect::yz((p0.y, p1.y), (p0.z, p1.z), p1.x, material.clone()));
        sides.push(AaRect::yz((p0.y, p1.y), (p0.z, p1.z), p0.x, material));

        Self {
            bbox: Aabb::from_points(p0, p1),
            sides,
        }
    }
}

impl Hittable for Block {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        self.sides.hit(ray, ray_t, rng)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        Some(self.bbox)
    }
}
