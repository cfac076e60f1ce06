//! Per-pixel lookup fields that drive stamp colors.
//!
//! A pattern pairs a hue field (hue, saturation and value per pixel) with a spread field
//! (standard deviation of the hue jitter per pixel). Fields are built once, registered by
//! name in a [`FieldRegistry`] and shared by every pattern that references them.
pub mod import;
pub mod presets;
pub mod registry;
pub mod spatial;

use glam::UVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use registry::FieldRegistry;
pub use spatial::{FieldCell, HueCell, HueField, SpatialField, SpreadField};

pub type FieldId = String;

/// Upper bound for raw spread values, both imported and constructed.
pub const MAX_RAW_SPREAD: f64 = 100_000.0;

/// Pixel dimensions of the output raster and of every field.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RasterSize {
    pub width: u32,
    pub height: u32,
}

impl RasterSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// Row-major index of `(x, y)`. The caller guarantees the position is inside the raster.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn extent(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }
}
