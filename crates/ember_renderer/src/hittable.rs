//! Hittable trait and HitRecord for ray-object intersection.

use crate::Material;
use ember_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Record of a ray-object intersection.
///
/// Borrows the material of the object that was hit; the scene outlives
/// every record produced while rendering it.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Point3,
    /// Unit surface normal, always pointing against the incoming ray
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record, orienting `outward_normal` against the ray.
    ///
    /// `outward_normal` must be unit length.
    pub fn new(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        (u, v): (f32, f32),
        material: &'a dyn Material,
    ) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            t,
            u,
            v,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Find the nearest intersection with `t` in `(ray_t.min, ray_t.max]`.
    ///
    /// Surfaces ignore `rng`; volumes draw their scattering distance from it.
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>>;

    /// Box enclosing the object over the shutter interval `[time0, time1]`.
    ///
    /// `None` means the object is unbounded.
    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb>;
}

/// A list of hittable objects.
#[derive(Clone, Default)]
pub struct HittableList {
    objects: Vec<Arc<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shared object to the list.
    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        self.objects.push(object);
    }

    /// Add an owned object to the list.
    pub fn push<H: Hittable + 'static>(&mut self, object: H) {
        self.objects.push(Arc::new(object));
    }

    pub fn objects(&self) -> &[Arc<dyn Hittable>] {
        &self.objects
    }

    pub fn into_objects(self) -> Vec<Arc<dyn Hittable>> {
        self.objects
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl From<Vec<Arc<dyn Hittable>>> for HittableList {
    fn from(objects: Vec<Arc<dyn Hittable>>) -> Self {
        Self { objects }
    }
}

impl Hittable for HittableList {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            let window = ray_t.with_max(closest.map_or(ray_t.max, |rec| rec.t));
            if let Some(rec) = object.hit(ray, window, rng) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        let (first, rest) = self.objects.split_first()?;
        rest.iter().try_fold(first.bounding_box(time0, time1)?, |acc, object| {
            object
                .bounding_box(time0, time1)
                .map(|bbox| Aabb::surrounding(&acc, &bbox))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};
    use ember_math::sampling::{random_unit_vector, random_vec3_range};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Vec3::splat(0.5)))
    }

    fn window() -> Interval {
        Interval::new(0.001, f32::INFINITY)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    #[test]
    fn test_face_normal_flips_for_back_face() {
        let mat = Lambertian::new(Vec3::ONE);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::Z);

        let rec = HitRecord::new(&ray, 1.0, Vec3::Z, (0.0, 0.0), &mat);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Z);

        let rec = HitRecord::new(&ray, 1.0, -Vec3::Z, (0.0, 0.0), &mat);
        assert!(rec.front_face);
        assert_eq!(rec.normal, -Vec3::Z);
        assert_eq!(rec.p, Vec3::Z);
    }

    #[test]
    fn test_empty_list() {
        let list = HittableList::new();
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);

        assert!(list.is_empty());
        assert!(list.hit(&ray, window(), &mut rng()).is_none());
        assert!(list.bounding_box(0.0, 1.0).is_none());
    }

    #[test]
    fn test_list_returns_closest_hit() {
        let mut list = HittableList::new();
        // Far sphere added first so the shrinking window has to prune it
        list.push(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0, gray()));
        list.push(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, gray()));
        list.push(Sphere::new(Vec3::new(0.0, 0.0, -6.0), 1.0, gray()));

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let rec = list.hit(&ray, window(), &mut rng()).expect("ray should hit");
        assert!((rec.t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_list_respects_max() {
        let mut list = HittableList::new();
        list.push(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, gray()));

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        assert!(list.hit(&ray, Interval::new(0.001, 1.5), &mut rng()).is_none());
    }

    #[test]
    fn test_list_bounding_box_is_union() {
        let mut list = HittableList::new();
        list.push(Sphere::new(Vec3::new(-2.0, 0.0, 0.0), 1.0, gray()));
        list.push(Sphere::new(Vec3::new(3.0, 1.0, 0.0), 0.5, gray()));

        let bbox = list.bounding_box(0.0, 1.0).expect("spheres are bounded");
        assert_eq!(bbox.min(), Vec3::new(-3.0, -1.0, -1.0));
        assert_eq!(bbox.max(), Vec3::new(3.5, 1.5, 1.0));
    }

    #[test]
    fn test_list_matches_brute_force_minimum() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut list = HittableList::new();
        let mut materials = Vec::new();
        for _ in 0..40 {
            let material = gray();
            materials.push(material.clone());
            let center = random_vec3_range(&mut rng, -6.0, 6.0);
            list.push(Sphere::new(center, rng.gen_range(0.3..1.5), material));
        }

        let mut hits = 0;
        for _ in 0..1000 {
            let origin = random_vec3_range(&mut rng, -8.0, 8.0);
            let ray = Ray::new_simple(origin, random_unit_vector(&mut rng));

            // Each sphere queried on its own over the full window
            let expected = list
                .objects()
                .iter()
                .zip(&materials)
                .filter_map(|(object, material)| {
                    object.hit(&ray, window(), &mut rng).map(|rec| (rec.t, rec.p, material))
                })
                .min_by(|a, b| a.0.total_cmp(&b.0));

            match (list.hit(&ray, window(), &mut rng), expected) {
                (Some(rec), Some((t, p, material))) => {
                    hits += 1;
                    assert_eq!(rec.t, t);
                    assert_eq!(rec.p, p);
                    let hit_material = rec.material as *const dyn Material as *const ();
                    assert_eq!(hit_material, Arc::as_ptr(material) as *const ());
                }
                (None, None) => {}
                (got, want) => panic!(
                    "list {:?} vs brute force {:?} for {:?}",
                    got.map(|rec| rec.t),
                    want.map(|(t, _, _)| t),
                    ray
                ),
            }
        }
        assert!(hits > 100, "only {} hits", hits);
    }
}
