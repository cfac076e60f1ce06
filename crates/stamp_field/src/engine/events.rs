//! Event types and sinks for observing an [`Engine`](crate::engine::runner::Engine).
//!
//! Sinks receive an [`EngineEvent`] for notable moments in the tick loop. The engine asks
//! [`EventSink::wants`] first, so a sink that only cares about pattern changes does not pay
//! for per-tick events.
use crate::engine::controls::Control;
use crate::pattern::PatternChange;

/// Describes events emitted by the engine.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Emitted on the first tick.
    EngineStarted {
        /// Name of the starting pattern.
        pattern: String,
        /// Raster (width, height) in pixels.
        size_px: (u32, u32),
    },

    /// Emitted when the active pattern changes.
    PatternChanged {
        change: PatternChange,
        /// Name of the new pattern.
        name: String,
    },

    /// Emitted after a frame was rendered.
    TickRendered {
        /// Engine tick index.
        tick: u64,
        /// Stamps generated this tick.
        count: usize,
        /// Raw density reading.
        raw: u16,
        /// Stamps alive across the ring buffer.
        live: usize,
    },

    /// Emitted when a control was applied.
    ControlApplied { control: Control },

    /// Emitted instead of a frame while paused.
    Paused { tick: u64 },
}

/// Discriminant of [`EngineEvent`] used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineEventKind {
    EngineStarted,
    PatternChanged,
    TickRendered,
    ControlApplied,
    Paused,
}

impl EngineEvent {
    pub fn kind(&self) -> EngineEventKind {
        match self {
            EngineEvent::EngineStarted { .. } => EngineEventKind::EngineStarted,
            EngineEvent::PatternChanged { .. } => EngineEventKind::PatternChanged,
            EngineEvent::TickRendered { .. } => EngineEventKind::TickRendered,
            EngineEvent::ControlApplied { .. } => EngineEventKind::ControlApplied,
            EngineEvent::Paused { .. } => EngineEventKind::Paused,
        }
    }
}

/// A generic event sink that accepts [`EngineEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: EngineEvent);

    /// Whether events of `kind` should be built and sent at all.
    #[inline]
    fn wants(&self, _kind: EngineEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: EngineEvent) {}

    #[inline]
    fn wants(&self, _kind: EngineEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(EngineEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(EngineEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(EngineEvent),
{
    #[inline]
    fn send(&mut self, event: EngineEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<EngineEvent>,
    only: Option<Vec<EngineEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect only events of the given kinds.
    pub fn only(kinds: &[EngineEventKind]) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.to_vec()),
        }
    }

    pub fn into_inner(self) -> Vec<EngineEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    fn wants(&self, kind: EngineEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}
