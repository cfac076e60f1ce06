//! Ring buffer of recent stamp batches and the raster they are drawn into.
//!
//! Every batch stays visible for `depth` ticks: pushing a new batch overwrites the oldest.
//! Rendering clears the raster and draws the batches oldest first, so newer stamps cover
//! older ones where they overlap.
use std::mem;

use crate::color::Rgb8;
use crate::engine::stamp::StampBatch;
use crate::error::{Error, Result};
use crate::field::RasterSize;
use crate::forms::FormLibrary;

/// Output pixels in B, G, R, A byte order, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRaster {
    size: RasterSize,
    data: Vec<u8>,
}

impl FrameRaster {
    pub fn new(size: RasterSize) -> Self {
        Self {
            size,
            data: vec![0; size.pixel_count() * 4],
        }
    }

    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Raw BGRA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// BGRA value at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = self.size.index(x, y) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Color at `(x, y)` if something was drawn there.
    pub fn color_at(&self, x: u32, y: u32) -> Option<Rgb8> {
        let [b, g, r, a] = self.pixel(x, y)?;
        (a != 0).then_some(Rgb8::new(r, g, b))
    }

    /// Number of pixels drawn since the last clear.
    pub fn painted_pixels(&self) -> usize {
        self.data.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    /// Copy of the pixels in R, G, B, A byte order for image encoders.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
        }
        out
    }

    #[inline]
    fn put(&mut self, x: u32, y: u32, bgra: [u8; 4]) {
        let i = self.size.index(x, y) * 4;
        self.data[i..i + 4].copy_from_slice(&bgra);
    }
}

/// Fixed-depth ring of [`StampBatch`]es.
#[derive(Clone, Debug)]
pub struct FrameCompositor {
    batches: Vec<StampBatch>,
    cursor: usize,
    forms: FormLibrary,
}

impl FrameCompositor {
    /// A compositor keeping the last `depth` batches. `depth` must be at least 1.
    pub fn new(depth: usize, forms: FormLibrary) -> Result<Self> {
        if depth == 0 {
            return Err(Error::InvalidConfig("buffer depth must be >= 1".into()));
        }
        Ok(Self {
            batches: vec![StampBatch::default(); depth],
            cursor: 0,
            forms,
        })
    }

    pub fn depth(&self) -> usize {
        self.batches.len()
    }

    /// Slot the next push overwrites, which is also the oldest batch.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn forms(&self) -> &FormLibrary {
        &self.forms
    }

    /// Batch stored in ring slot `i`.
    pub fn batch(&self, i: usize) -> Option<&StampBatch> {
        self.batches.get(i)
    }

    /// Active stamps across all slots.
    pub fn live_stamps(&self) -> usize {
        self.batches.iter().map(StampBatch::active_count).sum()
    }

    /// Store `batch` in the oldest slot and return the batch it replaced.
    pub fn push(&mut self, batch: StampBatch) -> StampBatch {
        let evicted = mem::replace(&mut self.batches[self.cursor], batch);
        self.cursor = (self.cursor + 1) % self.batches.len();
        evicted
    }

    /// Drop every stored stamp.
    pub fn clear(&mut self) {
        for batch in &mut self.batches {
            batch.clear();
        }
        self.cursor = 0;
    }

    /// Clear `raster` and draw every live stamp, oldest batch first.
    pub fn render(&self, raster: &mut FrameRaster) {
        raster.clear();
        let size = raster.size();
        let depth = self.batches.len();
        for k in 0..depth {
            let batch = &self.batches[(self.cursor + k) % depth];
            for stamp in batch.iter_active() {
                let Some(form) = self.forms.get(stamp.form) else {
                    continue;
                };
                let bgra = stamp.color.to_bgra();
                let (px, py) = (stamp.position.x as i64, stamp.position.y as i64);
                for (dx, dy) in form.painted_offsets() {
                    let (x, y) = (px + dx as i64, py + dy as i64);
                    if size.contains(x, y) {
                        raster.put(x as u32, y as u32, bgra);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::UVec2;

    use super::*;
    use crate::engine::stamp::{Stamp, StampBatch};
    use crate::forms::{GeometricForm, ShapeCatalog};

    const SIZE: RasterSize = RasterSize::new(12, 12);

    fn dot_library() -> FormLibrary {
        FormLibrary::from_forms(vec![GeometricForm::square(0), GeometricForm::circle(3)]).unwrap()
    }

    fn batch_with(stamps: &[Stamp]) -> StampBatch {
        StampBatch::from_stamps(stamps.to_vec())
    }

    fn dot(x: u32, y: u32, color: Rgb8) -> Stamp {
        Stamp {
            position: UVec2::new(x, y),
            color,
            form: 0,
            active: true,
        }
    }

    #[test]
    fn zero_depth_is_rejected() {
        assert!(FrameCompositor::new(0, dot_library()).is_err());
    }

    #[test]
    fn stamp_lives_for_depth_ticks() {
        let depth = 3;
        let mut compositor = FrameCompositor::new(depth, dot_library()).unwrap();
        let mut raster = FrameRaster::new(SIZE);
        let red = Rgb8::new(255, 0, 0);

        compositor.push(batch_with(&[dot(4, 5, red)]));
        compositor.render(&mut raster);
        assert_eq!(raster.color_at(4, 5), Some(red));

        for _ in 1..depth {
            compositor.push(StampBatch::default());
            compositor.render(&mut raster);
            assert_eq!(raster.color_at(4, 5), Some(red));
        }

        compositor.push(StampBatch::default());
        compositor.render(&mut raster);
        assert_eq!(raster.color_at(4, 5), None);
        assert_eq!(raster.painted_pixels(), 0);
    }

    #[test]
    fn newer_batches_are_drawn_on_top() {
        let mut compositor = FrameCompositor::new(4, dot_library()).unwrap();
        let mut raster = FrameRaster::new(SIZE);
        let old = Rgb8::new(10, 20, 30);
        let new = Rgb8::new(200, 100, 50);

        compositor.push(batch_with(&[dot(1, 1, old)]));
        compositor.push(batch_with(&[dot(1, 1, new)]));
        compositor.render(&mut raster);
        assert_eq!(raster.pixel(1, 1), Some([50, 100, 200, 255]));
    }

    #[test]
    fn push_returns_evicted_batch_and_wraps_cursor() {
        let mut compositor = FrameCompositor::new(2, dot_library()).unwrap();
        let first = batch_with(&[dot(0, 0, Rgb8::BLACK)]);
        assert!(compositor.push(first).is_empty());
        assert_eq!(compositor.cursor(), 1);
        assert!(compositor.push(StampBatch::default()).is_empty());
        assert_eq!(compositor.cursor(), 0);

        let evicted = compositor.push(StampBatch::default());
        assert_eq!(evicted.active_count(), 1);
        assert_eq!(compositor.live_stamps(), 0);
    }

    #[test]
    fn forms_are_clipped_at_the_edges() {
        let mut compositor = FrameCompositor::new(1, dot_library()).unwrap();
        let mut raster = FrameRaster::new(SIZE);
        let mut corner = dot(0, 0, Rgb8::new(0, 255, 0));
        corner.form = 1;
        compositor.push(batch_with(&[corner]));
        compositor.render(&mut raster);

        // Only offsets with dx >= 0 and dy >= 0 land inside.
        let circle = GeometricForm::circle(3);
        let visible = circle
            .painted_offsets()
            .filter(|(dx, dy)| *dx >= 0 && *dy >= 0)
            .count();
        assert_eq!(raster.painted_pixels(), visible);
    }

    #[test]
    fn clear_drops_stamps() {
        let mut compositor =
            FrameCompositor::new(2, FormLibrary::from_catalog(ShapeCatalog::Single)).unwrap();
        compositor.push(batch_with(&[dot(3, 3, Rgb8::BLACK)]));
        assert_eq!(compositor.live_stamps(), 1);
        compositor.clear();
        assert_eq!(compositor.live_stamps(), 0);
        assert_eq!(compositor.cursor(), 0);
    }

    #[test]
    fn rgba_conversion_swaps_channels() {
        let mut compositor = FrameCompositor::new(1, dot_library()).unwrap();
        let mut raster = FrameRaster::new(RasterSize::new(2, 1));
        compositor.push(batch_with(&[dot(1, 0, Rgb8::new(1, 2, 3))]));
        compositor.render(&mut raster);
        assert_eq!(raster.as_bytes(), &[0, 0, 0, 0, 3, 2, 1, 255]);
        assert_eq!(raster.to_rgba8(), vec![0, 0, 0, 0, 1, 2, 3, 255]);
    }
}
