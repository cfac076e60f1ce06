//! Density input: how many stamps to draw this tick.
//!
//! A [`DensitySource`] reports a raw reading once per tick (for example a people counter),
//! and a [`DensityMapping`] turns that reading into a stamp count.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reports the raw density reading for the current tick.
pub trait DensitySource {
    fn poll(&mut self) -> u16;
}

impl<S: DensitySource + ?Sized> DensitySource for Box<S> {
    fn poll(&mut self) -> u16 {
        (**self).poll()
    }
}

/// A fixed reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConstantDensity(pub u16);

impl ConstantDensity {
    pub fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn set(&mut self, value: u16) {
        self.0 = value;
    }
}

impl DensitySource for ConstantDensity {
    #[inline]
    fn poll(&mut self) -> u16 {
        self.0
    }
}

/// A reading produced by a closure.
pub struct FnDensity<F>
where
    F: FnMut() -> u16,
{
    f: F,
}

impl<F> FnDensity<F>
where
    F: FnMut() -> u16,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> DensitySource for FnDensity<F>
where
    F: FnMut() -> u16,
{
    #[inline]
    fn poll(&mut self) -> u16 {
        (self.f)()
    }
}

/// Mapping from a raw reading to a stamp count.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DensityMapping {
    /// The reading is the stamp count, capped at `stamps_per_tick`.
    Direct,
    /// `clamp(raw * a + b, 0, 100)` percent of `stamps_per_tick`.
    Linear { a: f64, b: f64 },
}

impl Default for DensityMapping {
    fn default() -> Self {
        DensityMapping::Linear { a: 0.5, b: 0.0 }
    }
}

impl DensityMapping {
    pub fn linear(a: f64, b: f64) -> Self {
        DensityMapping::Linear { a, b }
    }

    /// Stamp count for `raw`, never above `stamps_per_tick`.
    pub fn map(&self, raw: u16, stamps_per_tick: usize) -> usize {
        match *self {
            DensityMapping::Direct => (raw as usize).min(stamps_per_tick),
            DensityMapping::Linear { a, b } => {
                let percent = (raw as f64 * a + b).clamp(0.0, 100.0);
                if percent.is_nan() {
                    return 0;
                }
                ((percent / 100.0 * stamps_per_tick as f64) as usize).min(stamps_per_tick)
            }
        }
    }
}
