//! Ember Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer: geometry and materials are trait objects
//! shared behind `Arc`, textures are a closed enum, and [`render`] fans
//! image rows out over the rayon pool.
//!
//! ```no_run
//! use ember_renderer::*;
//! use std::sync::Arc;
//!
//! let mut world = HittableList::new();
//! world.push(Sphere::new(
//!     Point3::new(0.0, 0.0, -1.0),
//!     0.5,
//!     Arc::new(Lambertian::new(Color::new(0.7, 0.3, 0.3))),
//! ));
//!
//! let config = RenderConfig::default().with_seed(7);
//! let camera = Camera::new().with_aspect_ratio(config.aspect_ratio());
//! let image = render(&camera, &world, &config);
//! image.write_ppm(std::io::stdout().lock()).unwrap();
//! ```

mod aarect;
mod block;
mod bvh;
mod camera;
mod error;
mod hittable;
mod image_texture;
mod material;
mod medium;
mod perlin;
mod renderer;
mod sphere;
mod texture;
mod transformed;

pub use aarect::{AaRect, Plane};
pub use block::Block;
pub use bvh::BvhNode;
pub use camera::Camera;
pub use error::{SceneError, SceneResult, TextureError, TextureResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use image_texture::{ImageTexture, WrapMode, MISSING_TEXTURE_COLOR};
pub use material::{
    Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, ScatterResult,
};
pub use medium::ConstantMedium;
pub use perlin::{Perlin, DEFAULT_TURBULENCE_DEPTH};
pub use renderer::{
    color_to_rgb8, linear_to_gamma, ray_color, render, render_pixel, Background, ImageBuffer,
    RenderConfig,
};
pub use sphere::{MovingSphere, Sphere};
pub use texture::{NoiseStyle, NoiseTexture, Texture};
pub use transformed::Transformed;

/// Re-export common math types from ember_math
pub use ember_math::{Aabb, Color, Interval, Point3, Ray, Vec3};
