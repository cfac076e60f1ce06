//! Pattern graph and scheduling.
//!
//! A pattern names a hue field, a spread field, how long it stays active and how long its
//! transitions last. Patterns either chain to a successor or, when terminal, hand over to a
//! randomly chosen pattern. The [`PatternScheduler`] drives that state machine tick by tick
//! and maintains the working fields and transition envelope the stamp generator reads.
pub mod envelope;
pub mod graph;
pub mod scheduler;
pub mod selection;
pub mod spec;

use std::fmt;

pub use envelope::{TransitionEnvelope, TransitionPolicy};
pub use graph::{Pattern, PatternGraph};
pub use scheduler::PatternScheduler;
pub use spec::{PatternGraphSpec, PatternSpec};

/// Index of a pattern inside a [`PatternGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternId(pub usize);

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why the active pattern changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeReason {
    /// The previous pattern named this one as its successor.
    Chained,
    /// Terminal pattern; uniform pick among random-start patterns.
    RandomRestart,
    /// Terminal pattern; the white-noise bias sent the scheduler back to the base pattern.
    BaseBias,
    /// Set explicitly by the caller.
    Jump,
}

/// Record of one change of the active pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternChange {
    pub from: PatternId,
    pub to: PatternId,
    pub reason: ChangeReason,
    /// Scheduler tick on which the change took effect.
    pub tick: u64,
}
