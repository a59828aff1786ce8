//! Sphere primitives for ray tracing.

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use ember_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;
use std::sync::Arc;

/// A static sphere primitive.
pub struct Sphere {
    center: Point3,
    radius: f32,
    material: Arc<dyn Material>,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Point3, radius: f32, material: Arc<dyn Material>) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    pub fn center(&self) -> Point3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Hittable for Sphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        hit_sphere(self.center, self.radius, &*self.material, ray, ray_t)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        Some(sphere_box(self.center, self.radius))
    }
}

/// A sphere whose center moves linearly from `center0` at `time0` to
/// `center1` at `time1`.
pub struct MovingSphere {
    center0: Point3,
    center1: Point3,
    time0: f32,
    time1: f32,
    radius: f32,
    material: Arc<dyn Material>,
}

impl MovingSphere {
    pub fn new(
        (center0, center1): (Point3, Point3),
        (time0, time1): (f32, f32),
        radius: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            center0,
            center1,
            time0,
            time1,
            radius,
            material,
        }
    }

    /// Center of the sphere at the given time.
    pub fn center(&self, time: f32) -> Point3 {
        self.center0
            + ((time - self.time0) / (self.time1 - self.time0)) * (self.center1 - self.center0)
    }
}

impl Hittable for MovingSphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        hit_sphere(
            self.center(ray.time()),
            self.radius,
            &*self.material,
            ray,
            ray_t,
        )
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        let box0 = sphere_box(self.center(time0), self.radius);
        let box1 = sphere_box(self.center(time1), self.radius);
        Some(Aabb::surrounding(&box0, &box1))
    }
}

/// Ray-sphere intersection using the half-b form of the quadratic.
fn hit_sphere<'a>(
    center: Point3,
    radius: f32,
    material: &'a dyn Material,
    ray: &Ray,
    ray_t: Interval,
) -> Option<HitRecord<'a>> {
    let oc = ray.origin() - center;
    let a = ray.direction().length_squared();
    let half_b = oc.dot(ray.direction());
    let c = oc.length_squared() - radius * radius;

    let discriminant = half_b * half_b - a * c;
    if discriminant <= 0.0 {
        return None;
    }
    let sqrtd = discriminant.sqrt();

    // Find the nearest root in the acceptable range
    let mut root = (-half_b - sqrtd) / a;
    if !ray_t.admits(root) {
        root = (-half_b + sqrtd) / a;
        if !ray_t.admits(root) {
            return None;
        }
    }

    let outward_normal = (ray.at(root) - center) / radius;
    Some(HitRecord::new(
        ray,
        root,
        outward_normal,
        sphere_uv(outward_normal),
        material,
    ))
}

/// UV coordinates for a point on the unit sphere centered at the origin.
///
/// u: angle around the Y axis from X=-1, v: angle from Y=-1 to Y=+1.
fn sphere_uv(p: Vec3) -> (f32, f32) {
    let theta = (-p.y).acos();
    let phi = (-p.z).atan2(p.x) + PI;

    (phi / (2.0 * PI), theta / PI)
}

fn sphere_box(center: Point3, radius: f32) -> Aabb {
    let rvec = Vec3::splat(radius.abs());
    Aabb::from_points(center - rvec, center + rvec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

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
    fn test_sphere_hit_distance() {
        // Ray from distance d toward the center hits at t = d - r
        let sphere = Sphere::new(Vec3::ZERO, 1.5, gray());

        for d in [2.0_f32, 5.0, 37.5] {
            let ray = Ray::new_simple(Vec3::new(0.0, d, 0.0), -Vec3::Y);
            let rec = sphere.hit(&ray, window(), &mut rng()).expect("ray aimed at center must hit");
            assert!((rec.t - (d - 1.5)).abs() < 1e-4, "d={d} t={}", rec.t);
            assert!(rec.front_face);
        }
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray());

        // Ray pointing away from sphere
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.hit(&ray, window(), &mut rng()).is_none());

        // Closest approach (0.6) exceeds the radius
        let ray = Ray::new_simple(Vec3::new(0.6, 0.0, 0.0), -Vec3::Z);
        assert!(sphere.hit(&ray, window(), &mut rng()).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside_uses_far_root() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, gray());
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::X);

        let rec = sphere.hit(&ray, window(), &mut rng()).expect("inside ray must hit");
        assert!((rec.t - 2.0).abs() < 1e-4);
        assert!(!rec.front_face);
        assert!(rec.normal.dot(ray.direction()) <= 0.0);
    }

    #[test]
    fn test_sphere_normal_opposes_ray() {
        let sphere = Sphere::new(Vec3::new(0.3, -0.2, -4.0), 1.0, gray());
        let origins = [Vec3::ZERO, Vec3::new(0.3, -0.2, -4.0), Vec3::new(2.0, 1.0, -8.0)];

        for origin in origins {
            let ray = Ray::new_simple(origin, Vec3::new(0.3, -0.2, -4.0) - origin + Vec3::X * 0.1);
            if let Some(rec) = sphere.hit(&ray, window(), &mut rng()) {
                assert!(rec.normal.dot(ray.direction()) <= 0.0);
                assert!((rec.normal.length() - 1.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_sphere_uv() {
        let (u, v) = sphere_uv(Vec3::new(1.0, 0.0, 0.0));
        assert!((u - 0.5).abs() < 1e-5);
        assert!((v - 0.5).abs() < 1e-5);

        let (_, v) = sphere_uv(Vec3::new(0.0, 1.0, 0.0));
        assert!((v - 1.0).abs() < 1e-5);

        let (u, _) = sphere_uv(Vec3::new(0.0, 0.0, 1.0));
        assert!((u - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_moving_sphere_center_interpolates() {
        let sphere = MovingSphere::new(
            (Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)),
            (0.0, 1.0),
            0.5,
            gray(),
        );

        assert_eq!(sphere.center(0.0), Vec3::ZERO);
        assert_eq!(sphere.center(0.5), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(sphere.center(1.0), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_moving_sphere_hit_depends_on_ray_time() {
        let sphere = MovingSphere::new(
            (Vec3::new(0.0, 0.0, -5.0), Vec3::new(4.0, 0.0, -5.0)),
            (0.0, 1.0),
            1.0,
            gray(),
        );

        let early = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let late = Ray::new(Vec3::ZERO, -Vec3::Z, 1.0);

        assert!(sphere.hit(&early, window(), &mut rng()).is_some());
        assert!(sphere.hit(&late, window(), &mut rng()).is_none());
    }

    #[test]
    fn test_moving_sphere_bounding_box_covers_path() {
        let sphere = MovingSphere::new(
            (Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)),
            (0.0, 1.0),
            1.0,
            gray(),
        );

        let bbox = sphere.bounding_box(0.0, 1.0).expect("moving sphere is bounded");
        assert_eq!(bbox.min(), Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(bbox.max(), Vec3::new(5.0, 1.0, 1.0));
    }
}
