//! Perlin gradient noise.

use ember_math::sampling::random_vec3_range;
use ember_math::{Point3, Vec3};
use rand::seq::SliceRandom;
use rand::RngCore;

const POINT_COUNT: usize = 256;

/// Octave count used by [`Perlin::turbulence`] when none is given.
pub const DEFAULT_TURBULENCE_DEPTH: u32 = 7;

/// Perlin noise generator.
///
/// Holds random unit gradients on a 256-cell lattice, addressed through
/// three independently shuffled permutation tables. Immutable once built.
pub struct Perlin {
    gradients: Box<[Vec3; POINT_COUNT]>,
    perm_x: Box<[u8; POINT_COUNT]>,
    perm_y: Box<[u8; POINT_COUNT]>,
    perm_z: Box<[u8; POINT_COUNT]>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let mut gradients = Box::new([Vec3::X; POINT_COUNT]);
        for g in gradients.iter_mut() {
            // Reject near-zero samples so every gradient normalizes cleanly
            *g = loop {
                let v = random_vec3_range(rng, -1.0, 1.0);
                if v.length_squared() > 1e-6 {
                    break v.normalize();
                }
            };
        }

        Self {
            gradients,
            perm_x: generate_perm(rng),
            perm_y: generate_perm(rng),
            perm_z: generate_perm(rng),
        }
    }

    /// Smoothed gradient noise at `p`, roughly in [-1, 1].
    pub fn noise(&self, p: Point3) -> f32 {
        let floor = p.floor();
        let frac = p - floor;
        let i = floor.x as i32;
        let j = floor.y as i32;
        let k = floor.z as i32;

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let index = self.perm_x[lattice(i, di)]
                        ^ self.perm_y[lattice(j, dj)]
                        ^ self.perm_z[lattice(k, dk)];
                    *cell = self.gradients[index as usize];
                }
            }
        }

        trilinear_interp(&c, frac)
    }

    /// Sum of `depth` octaves of noise with halving weight, absolute value.
    ///
    /// The result lies in `[0, 2 - 2^(1 - depth)]`.
    pub fn turbulence(&self, p: Point3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }
}

/// Lattice table index for coordinate `base + offset`, wrapped to 0..256.
#[inline]
fn lattice(base: i32, offset: usize) -> usize {
    (base.wrapping_add(offset as i32) & 255) as usize
}

fn generate_perm(rng: &mut dyn RngCore) -> Box<[u8; POINT_COUNT]> {
    let mut perm = Box::new([0u8; POINT_COUNT]);
    for (i, p) in perm.iter_mut().enumerate() {
        *p = i as u8;
    }
    perm.shuffle(rng);
    perm
}

/// Blend the corner gradients' contributions with Hermite-smoothed weights.
fn trilinear_interp(c: &[[[Vec3; 2]; 2]; 2], frac: Vec3) -> f32 {
    let smooth = frac * frac * (Vec3::splat(3.0) - 2.0 * frac);
    let mut accum = 0.0;

    for (i, plane) in c.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, gradient) in row.iter().enumerate() {
                let (fi, fj, fk) = (i as f32, j as f32, k as f32);
                let weight_v = frac - Vec3::new(fi, fj, fk);
                accum += (fi * smooth.x + (1.0 - fi) * (1.0 - smooth.x))
                    * (fj * smooth.y + (1.0 - fj) * (1.0 - smooth.y))
                    * (fk * smooth.z + (1.0 - fk) * (1.0 - smooth.z))
                    * gradient.dot(weight_v);
            }
        }
    }

    accum
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn perlin(seed: u64) -> Perlin {
        Perlin::new(&mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_permutations_are_permutations() {
        let p = perlin(1);
        for table in [&p.perm_x, &p.perm_y, &p.perm_z] {
            let mut sorted = table.to_vec();
            sorted.sort_unstable();
            assert!(sorted.iter().enumerate().all(|(i, &v)| v as usize == i));
        }
        assert_ne!(p.perm_x, p.perm_y);
    }

    #[test]
    fn test_noise_is_zero_on_lattice_points() {
        // Every corner offset is zero at an integer point
        let p = perlin(2);
        for point in [Vec3::ZERO, Vec3::new(3.0, -7.0, 12.0), Vec3::new(-1.0, 300.0, 5.0)] {
            assert!(p.noise(point).abs() < 1e-6);
        }
    }

    #[test]
    fn test_noise_is_continuous() {
        let p = perlin(3);
        let a = Vec3::new(1.2345, -2.5, 0.75);
        let b = a + Vec3::splat(1e-4);
        assert!((p.noise(a) - p.noise(b)).abs() < 1e-2);
    }

    #[test]
    fn test_turbulence_bounds() {
        let p = perlin(4);
        let mut rng = StdRng::seed_from_u64(5);
        let bound: f32 = (0..DEFAULT_TURBULENCE_DEPTH).map(|i| 0.5_f32.powi(i as i32)).sum();

        for _ in 0..2000 {
            let point = random_vec3_range(&mut rng, -50.0, 50.0);
            let t = p.turbulence(point, DEFAULT_TURBULENCE_DEPTH);
            assert!(t >= 0.0);
            assert!(t <= bound, "turbulence {t} exceeded {bound}");
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = perlin(9);
        let b = perlin(9);
        let point = Vec3::new(0.3, 4.7, -2.2);
        assert_eq!(a.noise(point), b.noise(point));
    }
}
