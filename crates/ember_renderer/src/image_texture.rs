//! Image-backed textures.
//!
//! Decoding goes through the `image` crate; the renderer only ever sees the
//! resulting 8-bit RGB grid.

use crate::error::{TextureError, TextureResult};
use ember_math::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Color returned when sampling a texture that has no pixels.
pub const MISSING_TEXTURE_COLOR: Color = Color::new(0.0, 1.0, 1.0);

/// How UV coordinates outside [0, 1) map back onto the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// Tile the image: `|x| mod 1`.
    #[default]
    Repeat,
    /// Tile the image, flipping every other tile.
    Mirror,
}

impl WrapMode {
    fn wrap(self, x: f32) -> f32 {
        let x = x.abs();
        let f = x.fract();
        match self {
            WrapMode::Repeat => f,
            WrapMode::Mirror if x.floor() as i64 % 2 == 1 => 1.0 - f,
            WrapMode::Mirror => f,
        }
    }
}

/// A decoded RGB image sampled by UV coordinates.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    /// Row-major RGB triples, row 0 at the top of the image
    pixels: Vec<[u8; 3]>,
    wrap: WrapMode,
}

impl ImageTexture {
    /// Wrap an already decoded, packed RGB8 buffer.
    pub fn from_rgb8(width: u32, height: u32, data: &[u8]) -> TextureResult<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(TextureError::InvalidDimensions {
                width,
                height,
                actual: data.len(),
            });
        }

        let pixels = data
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();

        Ok(Self {
            width,
            height,
            pixels,
            wrap: WrapMode::default(),
        })
    }

    /// Load and decode an image file.
    pub fn open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();

        log::debug!(
            "Loaded texture: {} ({}x{})",
            path.display(),
            width,
            height
        );

        Self::from_rgb8(width, height, rgb.as_raw())
    }

    /// A texture with no pixel data; samples as [`MISSING_TEXTURE_COLOR`].
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
            wrap: WrapMode::default(),
        }
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Nearest-pixel lookup. `v = 0` is the bottom of the image.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if self.pixels.is_empty() {
            return MISSING_TEXTURE_COLOR;
        }

        let u = self.wrap.wrap(u);
        let v = 1.0 - self.wrap.wrap(v);

        let i = ((u * self.width as f32) as u32).min(self.width - 1);
        let j = ((v * self.height as f32) as u32).min(self.height - 1);

        let [r, g, b] = self.pixels[(j * self.width + i) as usize];
        let color_scale = 1.0 / 255.0;
        Color::new(r as f32, g as f32, b as f32) * color_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x2 image: top row red, green; bottom row blue, white.
    fn quad() -> ImageTexture {
        let data = [
            255, 0, 0, 0, 255, 0, //
            0, 0, 255, 255, 255, 255,
        ];
        ImageTexture::from_rgb8(2, 2, &data).expect("valid dimensions")
    }

    #[test]
    fn test_sample_corners() {
        let tex = quad();
        assert_eq!(tex.sample(0.25, 0.75), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.sample(0.75, 0.75), Color::new(0.0, 1.0, 0.0));
        assert_eq!(tex.sample(0.25, 0.25), Color::new(0.0, 0.0, 1.0));
        assert_eq!(tex.sample(0.75, 0.25), Color::ONE);
    }

    #[test]
    fn test_sample_repeats_outside_unit_square() {
        let tex = quad();
        assert_eq!(tex.sample(1.25, 0.75), tex.sample(0.25, 0.75));
        assert_eq!(tex.sample(-0.25, 0.75), tex.sample(0.25, 0.75));
    }

    #[test]
    fn test_sample_mirror() {
        let tex = quad().with_wrap(WrapMode::Mirror);
        // Second tile is flipped horizontally
        assert_eq!(tex.sample(1.25, 0.75), tex.sample(0.75, 0.75));
        assert_eq!(tex.sample(2.25, 0.75), tex.sample(0.25, 0.75));
    }

    #[test]
    fn test_sample_edge_is_clamped() {
        let tex = quad();
        // v = 0 maps to j = height, which must clamp to the last row
        assert_eq!(tex.sample(0.0, 0.0), Color::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_empty_texture_returns_placeholder() {
        assert_eq!(ImageTexture::empty().sample(0.5, 0.5), MISSING_TEXTURE_COLOR);
    }

    #[test]
    fn test_from_rgb8_rejects_bad_length() {
        let err = ImageTexture::from_rgb8(2, 2, &[0; 5]).unwrap_err();
        assert!(matches!(err, TextureError::InvalidDimensions { actual: 5, .. }));
    }

    #[test]
    fn test_open_missing_file_is_error() {
        assert!(ImageTexture::open("does/not/exist.png").is_err());
    }
}
