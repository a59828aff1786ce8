//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Each node splits its objects in half along a randomly chosen axis, sorted
//! by the minimum corner of their bounding boxes, and caches the union of its
//! children's boxes for early rejection.

use crate::error::{SceneError, SceneResult};
use crate::{HitRecord, Hittable, HittableList};
use ember_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};
use rayon::slice::ParallelSliceMut;
use std::cmp::Ordering;
use std::sync::Arc;

/// Ranges at least this long are sorted on the rayon pool.
const PARALLEL_SORT_THRESHOLD: usize = 4096;

/// An object together with its box over the build's shutter interval.
struct Entry {
    object: Arc<dyn Hittable>,
    bbox: Aabb,
}

/// BVH node with two children.
///
/// Children are either primitives or further nodes. A node built over a
/// single object holds that object on both sides.
pub struct BvhNode {
    left: Arc<dyn Hittable>,
    right: Arc<dyn Hittable>,
    bbox: Aabb,
}

impl BvhNode {
    /// Build a BVH over `objects` using their boxes for `[time0, time1]`.
    pub fn new(
        objects: Vec<Arc<dyn Hittable>>,
        time0: f32,
        time1: f32,
        rng: &mut dyn RngCore,
    ) -> SceneResult<Self> {
        if objects.is_empty() {
            return Err(SceneError::Empty);
        }

        let mut entries = objects
            .into_iter()
            .enumerate()
            .map(|(index, object)| {
                object
                    .bounding_box(time0, time1)
                    .map(|bbox| Entry { object, bbox })
                    .ok_or(SceneError::MissingBoundingBox { index })
            })
            .collect::<SceneResult<Vec<_>>>()?;

        let (node, depth) = Self::build(&mut entries, rng);
        log::debug!("Built BVH over {} objects (depth {})", entries.len(), depth);

        Ok(node)
    }

    /// Build a BVH from the contents of a list.
    pub fn from_list(
        list: HittableList,
        time0: f32,
        time1: f32,
        rng: &mut dyn RngCore,
    ) -> SceneResult<Self> {
        Self::new(list.into_objects(), time0, time1, rng)
    }

    /// Recursive construction; returns the node and the depth below it.
    fn build(entries: &mut [Entry], rng: &mut dyn RngCore) -> (Self, usize) {
        let axis = rng.gen_range(0..3);
        let compare = move |a: &Entry, b: &Entry| box_compare(&a.bbox, &b.bbox, axis);

        match entries.len() {
            1 => {
                let only = &entries[0];
                (
                    Self {
                        left: only.object.clone(),
                        right: only.object.clone(),
                        bbox: only.bbox,
                    },
                    1,
                )
            }
            2 => {
                let (first, second) = match compare(&entries[0], &entries[1]) {
                    Ordering::Greater => (&entries[1], &entries[0]),
                    _ => (&entries[0], &entries[1]),
                };
                (
                    Self {
                        left: first.object.clone(),
                        right: second.object.clone(),
                        bbox: Aabb::surrounding(&first.bbox, &second.bbox),
                    },
                    1,
                )
            }
            len => {
                if len >= PARALLEL_SORT_THRESHOLD {
                    entries.par_sort_unstable_by(compare);
                } else {
                    entries.sort_unstable_by(compare);
                }

                let mid = len / 2;
                let (lower, upper) = entries.split_at_mut(mid);
                let (left, left_depth) = Self::build(lower, rng);
                let (right, right_depth) = Self::build(upper, rng);

                let bbox = Aabb::surrounding(&left.bbox, &right.bbox);
                (
                    Self {
                        left: Arc::new(left),
                        right: Arc::new(right),
                        bbox,
                    },
                    1 + left_depth.max(right_depth),
                )
            }
        }
    }
}

/// Order two boxes by their minimum on `axis`.
fn box_compare(a: &Aabb, b: &Aabb, axis: usize) -> Ordering {
    a.axis_interval(axis)
        .min
        .total_cmp(&b.axis_interval(axis).min)
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let hit_left = self.left.hit(ray, ray_t, rng);
        if Arc::ptr_eq(&self.left, &self.right) {
            return hit_left;
        }

        // Only check right up to closest hit
        let right_t = hit_left.map_or(ray_t, |rec| ray_t.with_max(rec.t));
        self.right.hit(ray, right_t, rng).or(hit_left)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        Some(self.bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Material, Sphere};
    use ember_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Unbounded;

    impl Hittable for Unbounded {
        fn hit<'a>(
            &'a self,
            _ray: &Ray,
            _ray_t: Interval,
            _rng: &mut dyn RngCore,
        ) -> Option<HitRecord<'a>> {
            None
        }

        fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
            None
        }
    }

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Vec3::splat(0.5)))
    }

    fn sphere_at(center: Vec3) -> Arc<dyn Hittable> {
        Arc::new(Sphere::new(center, 0.5, gray()))
    }

    fn window() -> Interval {
        Interval::new(0.001, f32::INFINITY)
    }

    #[test]
    fn test_bvh_empty_is_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = BvhNode::new(Vec::new(), 0.0, 1.0, &mut rng);
        assert_eq!(result.err(), Some(SceneError::Empty));
    }

    #[test]
    fn test_bvh_unbounded_object_is_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let objects: Vec<Arc<dyn Hittable>> = vec![sphere_at(Vec3::ZERO), Arc::new(Unbounded)];
        let result = BvhNode::new(objects, 0.0, 1.0, &mut rng);
        assert_eq!(result.err(), Some(SceneError::MissingBoundingBox { index: 1 }));
    }

    #[test]
    fn test_bvh_single_sphere() {
        let mut rng = StdRng::seed_from_u64(2);
        let bvh = BvhNode::new(vec![sphere_at(Vec3::new(0.0, 0.0, -1.0))], 0.0, 1.0, &mut rng)
            .expect("one bounded object");

        assert!(Arc::ptr_eq(&bvh.left, &bvh.right));

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let rec = bvh.hit(&ray, window(), &mut rng).expect("sphere is in front of the ray");
        assert!((rec.t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_bvh_two_objects_ordered_by_box_min() {
        // Both spheres are offset on every axis, so any chosen axis orders them
        let near = sphere_at(Vec3::ZERO);
        let far = sphere_at(Vec3::splat(3.0));

        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let bvh = BvhNode::new(vec![far.clone(), near.clone()], 0.0, 1.0, &mut rng)
                .expect("two bounded objects");
            assert!(Arc::ptr_eq(&bvh.left, &near));
            assert!(Arc::ptr_eq(&bvh.right, &far));
        }
    }

    #[test]
    fn test_bvh_box_encloses_children() {
        let mut rng = StdRng::seed_from_u64(3);
        let objects = (0..10)
            .map(|i| sphere_at(Vec3::new(i as f32, -(i as f32), 2.0 * i as f32)))
            .collect();
        let bvh = BvhNode::new(objects, 0.0, 1.0, &mut rng).expect("bounded objects");

        let bbox = bvh.bounding_box(0.0, 1.0).expect("nodes are bounded");
        assert!((bbox.min() - Vec3::new(-0.5, -9.5, -0.5)).length() < 1e-5);
        assert!((bbox.max() - Vec3::new(9.5, 0.5, 18.5)).length() < 1e-5);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let mut rng = StdRng::seed_from_u64(4);
        let spheres = (0..10)
            .map(|i| sphere_at(Vec3::new(i as f32, 0.0, -5.0)))
            .collect();
        let bvh = BvhNode::new(spheres, 0.0, 1.0, &mut rng).expect("bounded objects");

        // Test ray that hits sphere at x=5
        let ray = Ray::new_simple(Vec3::new(5.0, 0.0, 0.0), -Vec3::Z);
        let rec = bvh.hit(&ray, window(), &mut rng).expect("sphere at x=5 is hit");

        // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((rec.p.z - (-4.5)).abs() < 0.01);

        let miss = Ray::new_simple(Vec3::new(5.0, 2.0, 0.0), -Vec3::Z);
        assert!(bvh.hit(&miss, window(), &mut rng).is_none());
    }

    #[test]
    fn test_bvh_returns_nearest_of_overlapping() {
        let mut rng = StdRng::seed_from_u64(5);
        let spheres = (0..6)
            .map(|i| sphere_at(Vec3::new(0.0, 0.0, -2.0 - i as f32)))
            .collect();
        let bvh = BvhNode::new(spheres, 0.0, 1.0, &mut rng).expect("bounded objects");

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let rec = bvh.hit(&ray, window(), &mut rng).expect("line of spheres is hit");
        assert!((rec.t - 1.5).abs() < 1e-5);
    }
}
