//! Built-in field generators and stripe palettes.
use crate::field::{HueCell, HueField, RasterSize, SpreadField};

/// Stripe palettes as `(hue°, saturation%, value%)`, top stripe first.
pub mod palettes {
    pub const PRIDE: &[(u16, u16, u16)] = &[
        (359, 85, 74),
        (6, 83, 94),
        (51, 100, 100),
        (141, 78, 51),
        (226, 64, 64),
        (294, 69, 54),
    ];

    pub const PROGRESS: &[(u16, u16, u16)] = &[
        (0, 0, 0),
        (35, 82, 47),
        (0, 100, 100),
        (33, 100, 100),
        (54, 100, 100),
        (117, 94, 62),
        (218, 98, 69),
        (291, 79, 86),
    ];

    pub const BISEXUAL: &[(u16, u16, u16)] = &[
        (332, 89, 85),
        (332, 89, 85),
        (269, 45, 58),
        (224, 79, 61),
        (224, 79, 61),
    ];

    pub const TRANSGENDER: &[(u16, u16, u16)] = &[
        (197, 60, 97),
        (347, 33, 97),
        (180, 1, 100),
        (347, 33, 97),
        (197, 60, 97),
    ];

    pub const ASEXUAL: &[(u16, u16, u16)] = &[(0, 0, 0), (0, 0, 64), (0, 0, 100), (301, 100, 51)];
}

/// Full-saturation hue sweep across the width, shifted by `offset` degrees.
pub fn rainbow(size: RasterSize, offset: f64) -> HueField {
    let width = size.width.max(1) as f64;
    HueField::from_fn(size, |x, _| {
        let base = (360.0 * x as f64 / width).floor();
        HueCell::vivid(base + offset)
    })
}

/// Horizontal stripes of equal height, top to bottom. The last stripe absorbs any remainder.
///
/// An empty stripe list yields a black field.
pub fn stripes(size: RasterSize, colors: &[HueCell]) -> HueField {
    if colors.is_empty() {
        return HueField::filled(size, HueCell::new(0.0, 0.0, 0.0));
    }
    let band = (size.height as usize / colors.len()).max(1);
    HueField::from_fn(size, |_, y| {
        let idx = (y as usize / band).min(colors.len() - 1);
        colors[idx]
    })
}

/// [`stripes`] from a percent palette such as [`palettes::PRIDE`].
pub fn flag(size: RasterSize, palette: &[(u16, u16, u16)]) -> HueField {
    let colors: Vec<HueCell> = palette
        .iter()
        .map(|&(h, s, v)| HueCell::from_percent(h, s, v))
        .collect();
    stripes(size, &colors)
}

pub fn uniform_hue(size: RasterSize, cell: HueCell) -> HueField {
    HueField::filled(size, cell)
}

pub fn uniform_spread(size: RasterSize, spread: f64) -> SpreadField {
    SpreadField::filled(size, spread)
}

/// Spread growing exponentially from 1 at the left edge to `2^octaves` at the right edge.
pub fn spread_ramp(size: RasterSize, octaves: f64) -> SpreadField {
    let width = size.width.max(1) as f64;
    SpreadField::from_fn(size, |x, _| 2f64.powf(octaves * x as f64 / width))
}
