//! Per-tick engine: stamp generation, compositing and the loop around them.
//!
//! Most callers only need [`runner::Engine`]. The parts are public so a host can drive
//! them directly (for example to render into its own buffer).
pub mod compositor;
pub mod controls;
pub mod density;
pub mod events;
pub mod runner;
pub mod stamp;

/// Stamps generated per tick unless configured otherwise.
pub const DEFAULT_STAMPS_PER_TICK: usize = 1000;

/// Number of tick batches kept on screen unless configured otherwise.
pub const DEFAULT_BUFFER_DEPTH: usize = 100;

/// Spread above which stamps ignore the field's saturation and value.
pub const DEFAULT_NOISE_THRESHOLD: f64 = 100.0;
