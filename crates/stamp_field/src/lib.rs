#![forbid(unsafe_code)]
//! stamp_field: field-driven procedural stamp visualization.
//!
//! Modules:
//! - sampling: truncated Gaussian sampler and uniform pixel positions
//! - color: HSV to RGB conversion
//! - forms: stencil catalog used to draw each stamp
//! - field: per-pixel hue/spread fields, registry, presets and the binary import format
//! - pattern: pattern graph, restart selection and the scheduler with its transition envelope
//! - engine: stamp generation, ring-buffered compositor, density mapping, controls, events, runner
//!
//! For a runnable demo, see the `stamp_field_examples` crate.
pub mod color;
pub mod engine;
pub mod error;
pub mod field;
pub mod forms;
pub mod pattern;
pub mod sampling;

/// Convenient re-exports for common types. Import with `use stamp_field::prelude::*;`.
pub mod prelude {
    pub use crate::color::{hsv_to_rgb, Hsv, Rgb, Rgb8};
    pub use crate::engine::compositor::{FrameCompositor, FrameRaster};
    pub use crate::engine::controls::{Control, ControlState, DisplayMode};
    pub use crate::engine::density::{
        ConstantDensity, DensityMapping, DensitySource, FnDensity,
    };
    pub use crate::engine::events::{EngineEvent, EngineEventKind, EventSink, FnSink, VecSink};
    pub use crate::engine::runner::{Engine, EngineConfig, TickOutcome};
    pub use crate::engine::stamp::{Stamp, StampBatch, StampGenerator};
    pub use crate::error::{Error, Result};
    pub use crate::field::import::{
        decode_field_records, encode_field_records, load_field_file, ImportDefaults,
        ImportLayout, ImportedField,
    };
    pub use crate::field::presets;
    pub use crate::field::{
        FieldId, FieldRegistry, HueCell, HueField, RasterSize, SpatialField, SpreadField,
        MAX_RAW_SPREAD,
    };
    pub use crate::forms::{FormLibrary, GeometricForm, ShapeCatalog};
    pub use crate::pattern::{
        ChangeReason, Pattern, PatternChange, PatternGraph, PatternGraphSpec, PatternId,
        PatternScheduler, PatternSpec, TransitionEnvelope, TransitionPolicy,
    };
    pub use crate::sampling::{ConstrainedGaussianSampler, PositionSampling, UniformPixelSampling};
}

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
pub struct ReadmeDoctests;
