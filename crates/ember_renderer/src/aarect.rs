//! Axis-aligned rectangles.

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use ember_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// The plane a rectangle lies in, named by its two free axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// Fixed z, spans x and y.
    XY,
    /// Fixed y, spans x and z.
    XZ,
    /// Fixed x, spans y and z.
    YZ,
}

impl Plane {
    /// Axis indices as (fixed, first free, second free).
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::XY => (2, 0, 1),
            Plane::XZ => (1, 0, 2),
            Plane::YZ => (0, 1, 2),
        }
    }
}

/// A rectangle perpendicular to one of the coordinate axes.
pub struct AaRect {
    plane: Plane,
    a: Interval,
    b: Interval,
    k: f32,
    material: Arc<dyn Material>,
}

impl AaRect {
    /// Rectangle in `plane` at fixed coordinate `k`, spanning `a` on the
    /// first free axis and `b` on the second.
    pub fn new(plane: Plane, a: (f32, f32), b: (f32, f32), k: f32, material: Arc<dyn Material>) -> Self {
        Self {
            plane,
            a: Interval::new(a.0, a.1),
            b: Interval::new(b.0, b.1),
            k,
            material,
        }
    }

    pub fn xy(x: (f32, f32), y: (f32, f32), k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::XY, x, y, k, material)
    }

    pub fn xz(x: (f32, f32), z: (f32, f32), k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::XZ, x, z, k, material)
    }

    pub fn yz(y: (f32, f32), z: (f32, f32), k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::YZ, y, z, k, material)
    }

    pub fn plane(&self) -> Plane {
        self.plane
    }
}

impl Hittable for AaRect {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let (fixed, ia, ib) = self.plane.axes();

        let t = (self.k - ray.origin[fixed]) / ray.direction[fixed];
        if !ray_t.admits(t) {
            return None;
        }

        let a = ray.origin[ia] + t * ray.direction[ia];
        let b = ray.origin[ib] + t * ray.direction[ib];
        if !self.a.contains(a) || !self.b.contains(b) {
            return None;
        }

        let u = (a - self.a.min) / self.a.size();
        let v = (b - self.b.min) / self.b.size();

        let mut outward_normal = Vec3::ZERO;
        outward_normal[fixed] = 1.0;

        Some(HitRecord::new(ray, t, outward_normal, (u, v), &*self.material))
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        // from_points pads the zero-thickness axis
        let (fixed, ia, ib) = self.plane.axes();
        let mut lo = Point3::ZERO;
        let mut hi = Point3::ZERO;
        lo[fixed] = self.k;
        hi[fixed] = self.k;
        lo[ia] = self.a.min;
        hi[ia] = self.a.max;
        lo[ib] = self.b.min;
        hi[ib] = self.b.max;
        Some(Aabb::from_points(lo, hi))
    }
}
