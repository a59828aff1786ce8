//! Vector helpers used by the shading code.
//!
//! These are free functions rather than methods because glam's `Vec3` has
//! inherent `reflect`/`refract` with different conventions (GLSL-style
//! refraction returns zero on total internal reflection).

use crate::Vec3;

/// Components smaller than this count as zero for [`near_zero`].
const NEAR_ZERO_EPSILON: f32 = 1e-8;

/// True if every component is smaller than 1e-8 in magnitude.
#[inline]
pub fn near_zero(v: Vec3) -> bool {
    v.abs().max_element() < NEAR_ZERO_EPSILON
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with the given `eta_i / eta_t`.
///
/// The caller is responsible for detecting total internal reflection.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
