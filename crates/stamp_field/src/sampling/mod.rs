//! Random sampling primitives used by the stamp pipeline.
//!
//! This module defines the [`PositionSampling`] trait for choosing raster positions, the
//! [`ConstrainedGaussianSampler`] used to jitter hues, and the small uniform helpers they share.
use mint::Vector2;
use rand::RngCore;

pub mod gaussian;
pub mod uniform_pixel;

pub use gaussian::ConstrainedGaussianSampler;
pub use uniform_pixel::UniformPixelSampling;

/// Trait for choosing stamp positions on a raster of the given extent (in pixels).
pub trait PositionSampling: Send + Sync {
    /// Draw a single position with `x < extent.x` and `y < extent.y`.
    fn sample(&self, raster_extent: Vector2<u32>, rng: &mut dyn RngCore) -> Vector2<u32>;

    /// Draw `count` positions.
    fn generate(
        &self,
        raster_extent: Vector2<u32>,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<Vector2<u32>> {
        (0..count).map(|_| self.sample(raster_extent, rng)).collect()
    }
}

/// Generate a random float in the range [0, 1).
///
/// Uses the upper 53 bits of a 64-bit draw so every representable step is equally likely.
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Generate a uniform index in `0..n`. Returns `0` when `n == 0`.
#[inline]
pub(crate) fn rand_index(rng: &mut dyn RngCore, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    ((rand01(rng) * n as f64) as usize).min(n - 1)
}
