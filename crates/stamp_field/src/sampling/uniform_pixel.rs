//! Uniform random pixel positions.
use mint::Vector2;
use rand::RngCore;

use crate::sampling::{rand_index, PositionSampling};

/// Uniform i.i.d. pixel positions over the whole raster.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformPixelSampling;

impl UniformPixelSampling {
    pub fn new() -> Self {
        Self
    }
}

impl PositionSampling for UniformPixelSampling {
    fn sample(&self, raster_extent: Vector2<u32>, rng: &mut dyn RngCore) -> Vector2<u32> {
        let x = rand_index(rng, raster_extent.x as usize) as u32;
        let y = rand_index(rng, raster_extent.y as usize) as u32;
        Vector2 { x, y }
    }
}
