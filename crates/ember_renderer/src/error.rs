//! Error types for scene assembly and texture loading.
//!
//! Misses and absorbed rays are ordinary `None` results, not errors. These
//! types only cover failures while building the scene.

use thiserror::Error;

/// Errors that can occur while loading an image texture.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Pixel buffer of {actual} bytes does not match {width}x{height} RGB")]
    InvalidDimensions {
        width: u32,
        height: u32,
        actual: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Errors that can occur while building acceleration structures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Cannot build a BVH from an empty object list")]
    Empty,

    #[error("Object {index} has no bounding box and cannot be placed in a BVH")]
    MissingBoundingBox { index: usize },
}

pub type SceneResult<T> = Result<T, SceneError>;
