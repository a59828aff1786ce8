//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Bounded-depth light transport
//! - Gamma correction
//! - Anti-aliasing via multi-sampling
//! - Row-parallel dispatch on the rayon pool

use crate::{Camera, Hittable};
use ember_math::sampling::gen_f32;
use ember_math::{Color, Interval, Ray};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::time::Instant;

/// Smallest accepted hit distance; keeps scattered rays off their own surface.
const T_MIN: f32 = 0.001;

/// What a ray sees when it leaves the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// The same color in every direction.
    Solid(Color),
    /// Vertical blend from `bottom` (looking down) to `top` (looking up).
    Gradient { bottom: Color, top: Color },
}

impl Background {
    /// White horizon fading to light blue overhead.
    pub fn sky() -> Self {
        Background::Gradient {
            bottom: Color::ONE,
            top: Color::new(0.5, 0.7, 1.0),
        }
    }

    /// Background radiance along `ray`.
    pub fn value(&self, ray: &Ray) -> Color {
        match *self {
            Background::Solid(color) => color,
            Background::Gradient { bottom, top } => {
                let unit_direction = ray.direction().normalize();
                let a = 0.5 * (unit_direction.y + 1.0);
                bottom * (1.0 - a) + top * a
            }
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::sky()
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub image_width: u32,
    pub image_height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    pub background: Background,
    /// Fixed seed for reproducible output; drawn from OS entropy when unset
    pub seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: 400,
            image_height: 225,
            samples_per_pixel: 100,
            max_depth: 50,
            background: Background::default(),
            seed: None,
        }
    }
}

impl RenderConfig {
    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples;
        self.max_depth = max_depth;
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Width over height, for matching the camera's viewport.
    pub fn aspect_ratio(&self) -> f32 {
        self.image_width as f32 / self.image_height.max(1) as f32
    }
}

/// Compute the color seen by a ray.
///
/// Follows the path for at most `depth` surface interactions, accumulating
/// emission weighted by the attenuation gathered so far. A path still
/// bouncing when the depth runs out contributes nothing further.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    background: &Background,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut radiance = Color::ZERO;
    let mut throughput = Color::ONE;
    let mut ray = *ray;

    for _ in 0..depth {
        let Some(rec) = world.hit(&ray, Interval::new(T_MIN, f32::INFINITY), rng) else {
            return radiance + throughput * background.value(&ray);
        };

        radiance += throughput * rec.material.emitted(rec.u, rec.v, rec.p);

        match rec.material.scatter(&ray, &rec, rng) {
            Some(result) => {
                throughput *= result.attenuation;
                ray = result.scattered;
            }
            // Absorbed
            None => return radiance,
        }
    }

    radiance
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Quantize a linear color to 8-bit gamma-corrected RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let quantize = |c: f32| (256.0 * linear_to_gamma(c).clamp(0.0, 0.999)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Average of `samples_per_pixel` jittered samples for pixel (i, j), with
/// `j` counted from the bottom row.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    i: u32,
    j: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    // A single row or column maps onto s or t = 0 instead of dividing by zero
    let s_scale = config.image_width.saturating_sub(1).max(1) as f32;
    let t_scale = config.image_height.saturating_sub(1).max(1) as f32;

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let s = (i as f32 + gen_f32(rng)) / s_scale;
        let t = (j as f32 + gen_f32(rng)) / t_scale;
        let ray = camera.get_ray(s, t, rng);
        pixel_color += ray_color(&ray, world, &config.background, config.max_depth, rng);
    }

    // Average the samples
    pixel_color / config.samples_per_pixel.max(1) as f32
}

/// Rendered image: row-major 8-bit RGB, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 3]>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 3]; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y), y counted from the top.
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y), y counted from the top.
    pub fn set(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        self.pixels[(y * self.width + x) as usize] = rgb;
    }

    /// Packed RGB bytes, three per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Write the image as plain-text PPM (P3).
    pub fn write_ppm<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "P3\n{} {}\n255\n", self.width, self.height)?;
        for [r, g, b] in &self.pixels {
            writeln!(writer, "{} {} {}", r, g, b)?;
        }
        writer.flush()
    }
}

/// Seed for a row's generator, so output does not depend on which worker
/// renders which row.
fn row_seed(seed: u64, row: u64) -> u64 {
    seed ^ row.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Render the entire scene to an image buffer.
///
/// Rows are rendered in parallel on the rayon pool. With a fixed seed the
/// output is identical across runs and thread counts.
pub fn render(camera: &Camera, world: &dyn Hittable, config: &RenderConfig) -> ImageBuffer {
    let width = config.image_width;
    let height = config.image_height;
    let mut image = ImageBuffer::new(width, height);
    if image.pixels.is_empty() {
        log::warn!("Nothing to render for a {}x{} image", width, height);
        return image;
    }

    let seed = config.seed.unwrap_or_else(rand::random);
    log::info!(
        "Rendering {}x{} at {} spp (max depth {}, seed {})",
        width,
        height,
        config.samples_per_pixel,
        config.max_depth,
        seed
    );
    let start = Instant::now();

    image
        .pixels
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(row, pixels)| {
            let mut rng = StdRng::seed_from_u64(row_seed(seed, row as u64));
            let j = height - 1 - row as u32;
            for (i, pixel) in pixels.iter_mut().enumerate() {
                let color = render_pixel(camera, world, i as u32, j, config, &mut rng);
                *pixel = color_to_rgb8(color);
            }
        });

    log::info!("Render complete in {:.2?}", start.elapsed());
    image
}
