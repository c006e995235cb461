//! Random sampling helpers.
//!
//! Nothing in here owns a generator. Every function draws from the
//! generator handed in by the caller, which in a render is the one owned
//! by the current worker thread.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracer_math::{Real, Vec3};

/// Uniform sample in [0, 1).
#[inline]
pub fn gen_real(rng: &mut dyn RngCore) -> Real {
    rng.gen::<Real>()
}

/// Uniform point strictly inside the unit sphere.
///
/// Rejection sampling over the [-1, 1]^3 cube.
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = 2.0 * Vec3::new(gen_real(rng), gen_real(rng), gen_real(rng)) - Vec3::ONE;
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Fresh generator for an unseeded render.
pub fn entropy_rng() -> StdRng {
    StdRng::from_entropy()
}

/// Deterministic generator for one pixel of a seeded render.
///
/// Seeded images are therefore independent of thread count and claim order.
pub fn pixel_rng(seed: u64, pixel: u64) -> StdRng {
    // Golden-ratio increment spreads neighbouring pixels apart before PCG expansion
    StdRng::seed_from_u64(seed ^ pixel.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}
