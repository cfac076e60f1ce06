use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context};
use image::{Rgb, RgbImage, RgbaImage};
use stamp_field::prelude::*;

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating '{}'", parent.display()))?;
        }
    }
    Ok(())
}

/// Write a rendered frame as an RGBA PNG.
pub fn save_raster_png(raster: &FrameRaster, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let img = RgbaImage::from_raw(raster.width(), raster.height(), raster.to_rgba8())
        .ok_or_else(|| anyhow!("raster buffer does not match its size"))?;
    ensure_parent(path)?;
    img.save(path)
        .with_context(|| format!("writing '{}'", path.display()))?;
    Ok(())
}

/// Write a hue field as its colors.
pub fn save_hue_field_png(field: &HueField, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let size = field.size();
    let img = RgbImage::from_fn(size.width, size.height, |x, y| {
        let cell = field.get(x, y).unwrap_or(HueCell::new(0.0, 0.0, 0.0));
        let c = hsv_to_rgb(cell.to_hsv()).to_rgb8();
        Rgb([c.r, c.g, c.b])
    });
    ensure_parent(path)?;
    img.save(path)
        .with_context(|| format!("writing '{}'", path.display()))?;
    Ok(())
}

/// Write a spread field as log-scaled grey (black = 1 or less, white = the cap).
pub fn save_spread_field_png(field: &SpreadField, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let size = field.size();
    let top = MAX_RAW_SPREAD.ln();
    let img = RgbImage::from_fn(size.width, size.height, |x, y| {
        let s = field.get(x, y).unwrap_or(0.0).max(1.0);
        let g = (s.ln() / top * 255.0).clamp(0.0, 255.0) as u8;
        Rgb([g, g, g])
    });
    ensure_parent(path)?;
    img.save(path)
        .with_context(|| format!("writing '{}'", path.display()))?;
    Ok(())
}
