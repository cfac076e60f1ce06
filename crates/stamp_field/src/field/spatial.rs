//! Field storage.
use crate::color::Hsv;
use crate::error::{Error, Result};
use crate::field::{RasterSize, MAX_RAW_SPREAD};

/// Hue, saturation and value stored per pixel of a hue field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HueCell {
    /// Degrees in `[0, 360)`.
    pub hue: f64,
    /// Fraction in `[0, 1]`.
    pub saturation: f64,
    /// Fraction in `[0, 1]`.
    pub value: f64,
}

impl HueCell {
    pub fn new(hue: f64, saturation: f64, value: f64) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
        .normalized()
    }

    /// Fully saturated, full value color at `hue`.
    pub fn vivid(hue: f64) -> Self {
        Self::new(hue, 1.0, 1.0)
    }

    /// Saturation and value given in percent, as palettes are usually written.
    pub fn from_percent(hue: u16, saturation: u16, value: u16) -> Self {
        Self::new(hue as f64, saturation as f64 / 100.0, value as f64 / 100.0)
    }

    pub fn to_hsv(self) -> Hsv {
        Hsv::new(self.hue, self.saturation, self.value)
    }
}

/// Values that can live in a [`SpatialField`]; `normalized` enforces the value invariants.
pub trait FieldCell: Copy + PartialEq + std::fmt::Debug {
    fn normalized(self) -> Self;
}

impl FieldCell for f64 {
    fn normalized(self) -> Self {
        if self.is_nan() {
            0.0
        } else {
            self.clamp(0.0, MAX_RAW_SPREAD)
        }
    }
}

impl FieldCell for HueCell {
    fn normalized(self) -> Self {
        let mut hue = if self.hue.is_finite() {
            self.hue.rem_euclid(360.0)
        } else {
            0.0
        };
        // rem_euclid can round tiny negative inputs up to exactly 360.
        if hue >= 360.0 {
            hue = 0.0;
        }
        let unit = |x: f64| if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        Self {
            hue,
            saturation: unit(self.saturation),
            value: unit(self.value),
        }
    }
}

/// A row-major per-pixel table covering the whole raster.
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialField<T> {
    size: RasterSize,
    data: Vec<T>,
}

/// Per-pixel base color.
pub type HueField = SpatialField<HueCell>;

/// Per-pixel hue standard deviation (raw units, capped at [`MAX_RAW_SPREAD`]).
pub type SpreadField = SpatialField<f64>;

impl<T: FieldCell> SpatialField<T> {
    /// A field with the same value at every pixel.
    pub fn filled(size: RasterSize, value: T) -> Self {
        Self {
            size,
            data: vec![value.normalized(); size.pixel_count()],
        }
    }

    /// A field computed per pixel from `(x, y)`.
    pub fn from_fn(size: RasterSize, mut f: impl FnMut(u32, u32) -> T) -> Self {
        let mut data = Vec::with_capacity(size.pixel_count());
        for y in 0..size.height {
            for x in 0..size.width {
                data.push(f(x, y).normalized());
            }
        }
        Self { size, data }
    }

    /// A field from row-major values.
    pub fn from_vec(size: RasterSize, data: Vec<T>) -> Result<Self> {
        if data.len() != size.pixel_count() {
            return Err(Error::InvalidConfig(format!(
                "field data has {} cells but a {}x{} raster needs {}",
                data.len(),
                size.width,
                size.height,
                size.pixel_count()
            )));
        }
        Ok(Self {
            size,
            data: data.into_iter().map(FieldCell::normalized).collect(),
        })
    }

    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at `(x, y)`, or `None` outside the raster.
    pub fn get(&self, x: u32, y: u32) -> Option<T> {
        if x < self.size.width && y < self.size.height {
            Some(self.data[self.size.index(x, y)])
        } else {
            None
        }
    }

    /// Value at a row-major index. Panics when out of range.
    #[inline]
    pub fn at(&self, index: usize) -> T {
        self.data[index]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Write a value at a row-major index, normalizing it first.
    pub(crate) fn set(&mut self, index: usize, value: T) {
        self.data[index] = value.normalized();
    }

    /// Raw mutable access for blending. Callers keep values normalized.
    pub(crate) fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_cells_are_wrapped_and_clamped() {
        let cell = HueCell::new(370.0, 1.5, -0.2);
        assert_eq!(cell, HueCell::new(10.0, 1.0, 0.0));
        assert_eq!(HueCell::new(-90.0, 0.5, 0.5).hue, 270.0);
        assert_eq!(HueCell::new(-1e-20, 0.5, 0.5).hue, 0.0);
        assert_eq!(HueCell::from_percent(226, 64, 64), HueCell::new(226.0, 0.64, 0.64));
    }

    #[test]
    fn spread_is_capped() {
        let size = RasterSize::new(2, 1);
        let field = SpreadField::from_vec(size, vec![-3.0, 250_000.0]).unwrap();
        assert_eq!(field.as_slice(), &[0.0, MAX_RAW_SPREAD]);
    }

    #[test]
    fn from_fn_is_row_major() {
        let size = RasterSize::new(3, 2);
        let field = SpreadField::from_fn(size, |x, y| (x + 10 * y) as f64);
        assert_eq!(field.as_slice(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        assert_eq!(field.get(2, 1), Some(12.0));
        assert_eq!(field.get(3, 0), None);
    }

    #[test]
    fn from_vec_checks_length() {
        let size = RasterSize::new(2, 2);
        assert!(SpreadField::from_vec(size, vec![1.0; 3]).is_err());
    }
}
