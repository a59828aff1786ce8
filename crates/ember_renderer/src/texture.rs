//! Procedural and image textures.
//!
//! The set of textures is closed, so they are an enum rather than a trait
//! object. Child textures and heavy data (noise tables, pixels) sit behind
//! `Arc`, which keeps clones cheap when many materials share them.

use crate::image_texture::ImageTexture;
use crate::perlin::{Perlin, DEFAULT_TURBULENCE_DEPTH};
use ember_math::{Color, Point3};
use rand::RngCore;
use std::sync::Arc;

/// Maps surface coordinates and a world-space point to a color.
#[derive(Clone)]
pub enum Texture {
    /// A constant color.
    Solid(Color),
    /// 3D checkerboard alternating between two textures.
    Checker { odd: Arc<Texture>, even: Arc<Texture> },
    /// Perlin-noise pattern.
    Noise(NoiseTexture),
    /// Sampled image.
    Image(Arc<ImageTexture>),
}

impl Texture {
    pub fn solid(color: Color) -> Self {
        Texture::Solid(color)
    }

    pub fn checker(odd: Texture, even: Texture) -> Self {
        Texture::Checker {
            odd: Arc::new(odd),
            even: Arc::new(even),
        }
    }

    pub fn image(image: ImageTexture) -> Self {
        Texture::Image(Arc::new(image))
    }

    /// Color at surface coordinates (u, v) and point p.
    pub fn value(&self, u: f32, v: f32, p: Point3) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checker { odd, even } => {
                let sines = (10.0 * p.x).sin() * (10.0 * p.y).sin() * (10.0 * p.z).sin();
                if sines < 0.0 {
                    odd.value(u, v, p)
                } else {
                    even.value(u, v, p)
                }
            }
            Texture::Noise(noise) => noise.value(p),
            Texture::Image(image) => image.sample(u, v),
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Solid(color)
    }
}

impl From<NoiseTexture> for Texture {
    fn from(noise: NoiseTexture) -> Self {
        Texture::Noise(noise)
    }
}

impl From<ImageTexture> for Texture {
    fn from(image: ImageTexture) -> Self {
        Texture::image(image)
    }
}

/// How a noise texture turns turbulence into a gray level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseStyle {
    /// `0.5 * (1 + turbulence(scale * p))`
    #[default]
    Turbulence,
    /// Sine bands along z, phase-shifted by turbulence.
    Marble,
}

/// Grayscale Perlin-noise texture.
#[derive(Clone)]
pub struct NoiseTexture {
    perlin: Arc<Perlin>,
    scale: f32,
    style: NoiseStyle,
}

impl NoiseTexture {
    pub fn new(scale: f32, rng: &mut dyn RngCore) -> Self {
        Self {
            perlin: Arc::new(Perlin::new(rng)),
            scale,
            style: NoiseStyle::default(),
        }
    }

    pub fn marble(scale: f32, rng: &mut dyn RngCore) -> Self {
        Self::new(scale, rng).with_style(NoiseStyle::Marble)
    }

    pub fn with_style(mut self, style: NoiseStyle) -> Self {
        self.style = style;
        self
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn value(&self, p: Point3) -> Color {
        let turbulence = self
            .perlin
            .turbulence(self.scale * p, DEFAULT_TURBULENCE_DEPTH);

        let level = match self.style {
            NoiseStyle::Turbulence => 0.5 * (1.0 + turbulence),
            NoiseStyle::Marble => 0.5 * (1.0 + (self.scale * p.z + 10.0 * turbulence).sin()),
        };
        Color::ONE * level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_solid_color() {
        let tex = Texture::from(Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(tex.value(0.9, 0.1, Vec3::new(5.0, 6.0, 7.0)), Vec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_checker_alternates() {
        let odd = Vec3::new(1.0, 0.0, 0.0);
        let even = Vec3::new(0.0, 0.0, 1.0);
        let tex = Texture::checker(Texture::solid(odd), Texture::solid(even));

        // All three sines positive
        let p = Vec3::splat(0.1);
        assert_eq!(tex.value(0.0, 0.0, p), even);

        // Flip the sign of one sine
        let p = Vec3::new(-0.1, 0.1, 0.1);
        assert_eq!(tex.value(0.0, 0.0, p), odd);
    }

    #[test]
    fn test_nested_checker() {
        let inner = Texture::checker(Texture::solid(Vec3::ONE), Texture::solid(Vec3::ZERO));
        let tex = Texture::checker(inner, Texture::solid(Vec3::splat(0.5)));

        let p = Vec3::new(-0.1, 0.1, 0.1);
        assert_eq!(tex.value(0.0, 0.0, p), Vec3::ONE);
    }

    #[test]
    fn test_noise_texture_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let noise = NoiseTexture::new(4.0, &mut rng);
        let tex = Texture::from(noise);

        for i in 0..200 {
            let p = Vec3::new(i as f32 * 0.37, i as f32 * -0.11, 1.5);
            let c = tex.value(0.0, 0.0, p);
            assert_eq!(c.x, c.y);
            assert_eq!(c.y, c.z);
            // 0.5 * (1 + t) with t in [0, 2)
            assert!(c.x >= 0.5 && c.x < 1.5);
        }
    }

    #[test]
    fn test_marble_texture_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let marble = NoiseTexture::marble(4.0, &mut rng);

        for i in 0..200 {
            let c = marble.value(Vec3::new(i as f32 * 0.21, 0.3, i as f32 * 0.05));
            assert!(c.x >= 0.0 && c.x <= 1.0);
        }
    }

    #[test]
    fn test_image_texture_uses_uv() {
        let image = ImageTexture::from_rgb8(1, 1, &[0, 255, 0]).expect("1x1 image");
        let tex = Texture::from(image);
        assert_eq!(tex.value(0.3, 0.3, Vec3::ZERO), Vec3::new(0.0, 1.0, 0.0));
    }
}
