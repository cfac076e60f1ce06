//! HSV to RGB conversion.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A color in HSV space: hue in degrees, saturation and value as fractions in `[0, 1]`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    pub fn new(h: f64, s: f64, v: f64) -> Self {
        Self { h, s, v }
    }
}

/// A color with red, green and blue fractions in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Quantize to 8 bits per channel, truncating `x * 255`.
    pub fn to_rgb8(self) -> Rgb8 {
        let q = |x: f64| (x.clamp(0.0, 1.0) * 255.0) as u8;
        Rgb8 {
            r: q(self.r),
            g: q(self.g),
            b: q(self.b),
        }
    }
}

/// An 8-bit per channel color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Rgb8 = Rgb8 { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Opaque pixel in B, G, R, A byte order.
    #[inline]
    pub fn to_bgra(self) -> [u8; 4] {
        [self.b, self.g, self.r, u8::MAX]
    }
}

/// Convert HSV to RGB using the six-sector decomposition of the hue circle.
///
/// A non-positive saturation yields the achromatic `(v, v, v)`. Hues outside `[0, 360)` are
/// wrapped onto the circle first.
pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let Hsv { h, s, v } = hsv;
    if s <= 0.0 {
        return Rgb::new(v, v, v);
    }

    let hh = h.rem_euclid(360.0) / 60.0;
    let sector = (hh.floor() as i64).rem_euclid(6);
    let f = hh - hh.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector {
        0 => Rgb::new(v, t, p),
        1 => Rgb::new(q, v, p),
        2 => Rgb::new(p, v, t),
        3 => Rgb::new(p, q, v),
        4 => Rgb::new(t, p, v),
        _ => Rgb::new(v, p, q),
    }
}
