//! Stamps and the per-tick generator.
use glam::UVec2;
use rand::RngCore;

use crate::color::{hsv_to_rgb, Hsv, Rgb8};
use crate::engine::DEFAULT_NOISE_THRESHOLD;
use crate::forms::FormLibrary;
use crate::pattern::PatternScheduler;
use crate::sampling::{ConstrainedGaussianSampler, PositionSampling, UniformPixelSampling};

/// One colored form drawn at a raster position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stamp {
    /// Anchor position in pixels.
    pub position: UVec2,
    pub color: Rgb8,
    /// Index into the [`FormLibrary`].
    pub form: u16,
    pub active: bool,
}

/// The stamps produced by one tick.
///
/// Capacity is fixed at construction; slots past the active count are inactive.
#[derive(Clone, Debug, Default)]
pub struct StampBatch {
    stamps: Vec<Stamp>,
    active: usize,
}

impl StampBatch {
    pub fn new(capacity: usize) -> Self {
        Self {
            stamps: vec![Stamp::default(); capacity],
            active: 0,
        }
    }

    /// A batch holding exactly `stamps`.
    pub fn from_stamps(stamps: Vec<Stamp>) -> Self {
        let active = stamps.iter().filter(|s| s.active).count();
        Self { stamps, active }
    }

    pub fn capacity(&self) -> usize {
        self.stamps.len()
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    pub fn stamps(&self) -> &[Stamp] {
        &self.stamps
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Stamp> {
        self.stamps.iter().filter(|s| s.active)
    }

    /// Mark every slot inactive.
    pub fn clear(&mut self) {
        for stamp in &mut self.stamps {
            stamp.active = false;
        }
        self.active = 0;
    }

    fn resize(&mut self, capacity: usize) {
        self.stamps.resize(capacity, Stamp::default());
        self.active = self.active.min(capacity);
    }
}

/// Fills [`StampBatch`]es from the scheduler's working fields.
#[derive(Clone, Debug)]
pub struct StampGenerator {
    sampler: ConstrainedGaussianSampler,
    sampling: UniformPixelSampling,
    stamps_per_tick: usize,
    noise_threshold: f64,
}

impl StampGenerator {
    pub fn new(stamps_per_tick: usize) -> Self {
        Self {
            sampler: ConstrainedGaussianSampler::new(),
            sampling: UniformPixelSampling::new(),
            stamps_per_tick,
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
        }
    }

    pub fn with_noise_threshold(mut self, noise_threshold: f64) -> Self {
        self.noise_threshold = noise_threshold;
        self
    }

    pub fn stamps_per_tick(&self) -> usize {
        self.stamps_per_tick
    }

    pub fn noise_threshold(&self) -> f64 {
        self.noise_threshold
    }

    /// Generate `count` stamps (clamped to `stamps_per_tick`) into `batch`.
    ///
    /// Each stamp gets a uniform position, a hue drawn from a Gaussian around the working
    /// hue with the envelope-scaled spread, and a uniformly chosen form. Where the spread
    /// exceeds the noise threshold the stamp is fully saturated and bright. Returns the
    /// number of active stamps.
    pub fn generate<R: RngCore>(
        &mut self,
        rng: &mut R,
        scheduler: &PatternScheduler,
        forms: &FormLibrary,
        count: usize,
        batch: &mut StampBatch,
    ) -> usize {
        if batch.capacity() != self.stamps_per_tick {
            batch.resize(self.stamps_per_tick);
        }
        let count = count.min(self.stamps_per_tick);
        let size = scheduler.graph().size();
        let extent: mint::Vector2<u32> = size.extent().into();

        for (i, slot) in batch.stamps.iter_mut().enumerate() {
            if i >= count {
                slot.active = false;
                continue;
            }
            let position = UVec2::from(self.sampling.sample(extent, rng));
            let index = size.index(position.x, position.y);
            let cell = scheduler.hue_at(index);
            let spread = scheduler.effective_spread(index);

            let hue = self.sampler.sample(rng, cell.hue, spread, 0.0, 360.0);
            let (s, v) = if spread > self.noise_threshold {
                (1.0, 1.0)
            } else {
                (cell.saturation, cell.value)
            };

            *slot = Stamp {
                position,
                color: hsv_to_rgb(Hsv::new(hue, s, v)).to_rgb8(),
                form: forms.pick(rng),
                active: true,
            };
        }
        batch.active = count;
        count
    }
}
