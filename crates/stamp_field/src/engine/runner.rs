//! The tick loop tying scheduler, generator, compositor, density and controls together.
use std::mem;

use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::compositor::{FrameCompositor, FrameRaster};
use crate::engine::controls::{Control, ControlState};
use crate::engine::density::{DensityMapping, DensitySource};
use crate::engine::events::{EngineEvent, EngineEventKind, EventSink};
use crate::engine::stamp::{StampBatch, StampGenerator};
use crate::engine::{DEFAULT_BUFFER_DEPTH, DEFAULT_NOISE_THRESHOLD, DEFAULT_STAMPS_PER_TICK};
use crate::error::{Error, Result};
use crate::field::RasterSize;
use crate::forms::{FormLibrary, ShapeCatalog};
use crate::pattern::scheduler::{DEFAULT_BASE_BIAS, DEFAULT_MAX_SPREAD};
use crate::pattern::{PatternGraph, PatternScheduler, TransitionEnvelope, TransitionPolicy};

/// Configuration for an [`Engine`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Output raster size; every field in the pattern graph must match it.
    pub size: RasterSize,
    /// Upper bound on stamps generated per tick.
    pub stamps_per_tick: usize,
    /// Number of tick batches kept visible.
    pub buffer_depth: usize,
    pub shape_catalog: ShapeCatalog,
    pub transition_policy: TransitionPolicy,
    pub envelope: TransitionEnvelope,
    pub density_mapping: DensityMapping,
    /// Spread above which stamps are drawn fully saturated and bright.
    pub noise_threshold: f64,
    /// Cap on envelope-scaled spread.
    pub max_spread: f64,
    /// Probability of returning to the base pattern after a terminal pattern.
    pub base_bias: f64,
    /// Whether the base-pattern bias starts enabled.
    pub white_noise_bias: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            size: RasterSize::new(656, 416),
            stamps_per_tick: DEFAULT_STAMPS_PER_TICK,
            buffer_depth: DEFAULT_BUFFER_DEPTH,
            shape_catalog: ShapeCatalog::default(),
            transition_policy: TransitionPolicy::default(),
            envelope: TransitionEnvelope::default(),
            density_mapping: DensityMapping::default(),
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            max_spread: DEFAULT_MAX_SPREAD,
            base_bias: DEFAULT_BASE_BIAS,
            white_noise_bias: true,
        }
    }
}

impl EngineConfig {
    /// Creates a new [`EngineConfig`] for a raster of `size`.
    pub fn new(size: RasterSize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn with_stamps_per_tick(mut self, stamps_per_tick: usize) -> Self {
        self.stamps_per_tick = stamps_per_tick;
        self
    }

    pub fn with_buffer_depth(mut self, buffer_depth: usize) -> Self {
        self.buffer_depth = buffer_depth;
        self
    }

    pub fn with_shape_catalog(mut self, shape_catalog: ShapeCatalog) -> Self {
        self.shape_catalog = shape_catalog;
        self
    }

    pub fn with_transition_policy(mut self, transition_policy: TransitionPolicy) -> Self {
        self.transition_policy = transition_policy;
        self
    }

    pub fn with_envelope(mut self, envelope: TransitionEnvelope) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_density_mapping(mut self, density_mapping: DensityMapping) -> Self {
        self.density_mapping = density_mapping;
        self
    }

    pub fn with_noise_threshold(mut self, noise_threshold: f64) -> Self {
        self.noise_threshold = noise_threshold;
        self
    }

    pub fn with_max_spread(mut self, max_spread: f64) -> Self {
        self.max_spread = max_spread;
        self
    }

    pub fn with_base_bias(mut self, base_bias: f64) -> Self {
        self.base_bias = base_bias;
        self
    }

    pub fn with_white_noise_bias(mut self, white_noise_bias: bool) -> Self {
        self.white_noise_bias = white_noise_bias;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.size.is_empty() {
            return Err(Error::InvalidConfig(
                "raster size must be > 0 in both dimensions".into(),
            ));
        }
        if self.buffer_depth == 0 {
            return Err(Error::InvalidConfig("buffer_depth must be >= 1".into()));
        }
        if !(0.0..=1.0).contains(&self.base_bias) {
            return Err(Error::InvalidConfig("base_bias must be within [0, 1]".into()));
        }
        if self.max_spread.is_nan() || self.max_spread < 0.0 {
            return Err(Error::InvalidConfig("max_spread must be >= 0".into()));
        }
        if self.noise_threshold.is_nan() {
            return Err(Error::InvalidConfig("noise_threshold must be a number".into()));
        }
        let env = &self.envelope;
        if !(env.min_multiplier > 0.0 && env.min_multiplier <= env.max_multiplier) {
            return Err(Error::InvalidConfig(
                "envelope multipliers must satisfy 0 < min <= max".into(),
            ));
        }
        if let TransitionPolicy::SmoothBlend {
            hue_retain,
            spread_retain,
        } = self.transition_policy
        {
            if !(0.0..1.0).contains(&hue_retain) || !(0.0..1.0).contains(&spread_retain) {
                return Err(Error::InvalidConfig(
                    "smooth blend retention must be within [0, 1)".into(),
                ));
            }
        }
        if let DensityMapping::Linear { a, b } = self.density_mapping {
            if !a.is_finite() || !b.is_finite() {
                return Err(Error::InvalidConfig(
                    "density mapping coefficients must be finite".into(),
                ));
            }
        }

        Ok(())
    }
}

/// What a call to [`Engine::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was generated and rendered.
    Rendered { count: usize, raw: u16 },
    /// Paused: the raster was cleared and nothing advanced.
    Paused,
    /// Quit was requested; nothing was done.
    Stopped,
}

/// Owns all mutable state of a running visualization.
pub struct Engine<R: RngCore> {
    config: EngineConfig,
    scheduler: PatternScheduler,
    generator: StampGenerator,
    compositor: FrameCompositor,
    raster: FrameRaster,
    controls: ControlState,
    density: Box<dyn DensitySource>,
    rng: R,
    scratch: StampBatch,
    ticks: u64,
    started: bool,
    last_count: usize,
    last_raw: u16,
}

impl<R: RngCore> Engine<R> {
    /// Build an engine for `graph`, reading density from `density`.
    pub fn new(
        config: EngineConfig,
        graph: PatternGraph,
        density: impl DensitySource + 'static,
        rng: R,
    ) -> Result<Self> {
        config.validate()?;
        if graph.size() != config.size {
            return Err(Error::InvalidConfig(format!(
                "pattern graph is {}x{} but the raster is {}x{}",
                graph.size().width,
                graph.size().height,
                config.size.width,
                config.size.height
            )));
        }

        let scheduler = PatternScheduler::new(graph, config.transition_policy)
            .with_envelope(config.envelope)
            .with_base_bias(config.base_bias)
            .with_white_noise_bias(config.white_noise_bias)
            .with_max_spread(config.max_spread);
        let generator = StampGenerator::new(config.stamps_per_tick)
            .with_noise_threshold(config.noise_threshold);
        let compositor = FrameCompositor::new(
            config.buffer_depth,
            FormLibrary::from_catalog(config.shape_catalog),
        )?;

        Ok(Self {
            scheduler,
            generator,
            compositor,
            raster: FrameRaster::new(config.size),
            controls: ControlState::new(config.density_mapping),
            density: Box::new(density),
            rng,
            scratch: StampBatch::new(config.stamps_per_tick),
            ticks: 0,
            started: false,
            last_count: 0,
            last_raw: 0,
            config,
        })
    }

    /// Replace the stencil set. Stored stamps are dropped.
    pub fn with_forms(mut self, forms: FormLibrary) -> Result<Self> {
        self.compositor = FrameCompositor::new(self.config.buffer_depth, forms)?;
        Ok(self)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &PatternScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut PatternScheduler {
        &mut self.scheduler
    }

    pub fn compositor(&self) -> &FrameCompositor {
        &self.compositor
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    /// The most recently rendered frame.
    pub fn raster(&self) -> &FrameRaster {
        &self.raster
    }

    /// Rendered ticks so far; paused ticks are not counted.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_stopped(&self) -> bool {
        self.controls.quit
    }

    pub fn set_density(&mut self, density: impl DensitySource + 'static) {
        self.density = Box::new(density);
    }

    /// Overlay string for the last rendered tick, per the display mode.
    pub fn overlay_text(&self) -> Option<String> {
        self.controls.overlay_text(self.last_count, self.last_raw)
    }

    pub fn apply(&mut self, control: Control) {
        self.apply_with_events(control, &mut ());
    }

    pub fn apply_with_events(&mut self, control: Control, sink: &mut dyn EventSink) {
        match control {
            Control::ToggleWhiteNoiseBias => {
                let on = self.scheduler.toggle_white_noise_bias();
                debug!("white-noise bias {}", if on { "on" } else { "off" });
            }
            _ => {
                if self.controls.apply(control) {
                    debug!("control {:?} applied: {:?}", control, self.controls);
                } else {
                    debug!("control {:?} has no effect", control);
                }
            }
        }
        if sink.wants(EngineEventKind::ControlApplied) {
            sink.send(EngineEvent::ControlApplied { control });
        }
    }

    /// Run one tick and render the frame into [`Engine::raster`].
    pub fn tick(&mut self) -> TickOutcome {
        self.tick_with_events(&mut ())
    }

    pub fn tick_with_events(&mut self, sink: &mut dyn EventSink) -> TickOutcome {
        if self.controls.quit {
            return TickOutcome::Stopped;
        }

        if !self.started {
            self.started = true;
            let pattern = self.scheduler.active().name.clone();
            info!(
                "Engine started: {}x{} raster, {} patterns, starting at '{}'.",
                self.config.size.width,
                self.config.size.height,
                self.scheduler.graph().len(),
                pattern
            );
            if sink.wants(EngineEventKind::EngineStarted) {
                sink.send(EngineEvent::EngineStarted {
                    pattern,
                    size_px: (self.config.size.width, self.config.size.height),
                });
            }
        }

        if self.controls.paused {
            self.raster.clear();
            if sink.wants(EngineEventKind::Paused) {
                sink.send(EngineEvent::Paused { tick: self.ticks });
            }
            return TickOutcome::Paused;
        }

        if let Some(change) = self.scheduler.tick(&mut self.rng) {
            if sink.wants(EngineEventKind::PatternChanged) {
                sink.send(EngineEvent::PatternChanged {
                    change,
                    name: self.scheduler.active().name.clone(),
                });
            }
        }

        let raw = self.controls.raw_count(|| self.density.poll());
        let count = self
            .controls
            .mapping
            .map(raw, self.generator.stamps_per_tick());

        self.generator.generate(
            &mut self.rng,
            &self.scheduler,
            self.compositor.forms(),
            count,
            &mut self.scratch,
        );
        self.scratch = self.compositor.push(mem::take(&mut self.scratch));
        self.compositor.render(&mut self.raster);

        self.last_count = count;
        self.last_raw = raw;
        debug!("tick {}: {} stamps (raw {})", self.ticks, count, raw);
        if sink.wants(EngineEventKind::TickRendered) {
            sink.send(EngineEvent::TickRendered {
                tick: self.ticks,
                count,
                raw,
                live: self.compositor.live_stamps(),
            });
        }
        self.ticks += 1;

        TickOutcome::Rendered { count, raw }
    }
}
