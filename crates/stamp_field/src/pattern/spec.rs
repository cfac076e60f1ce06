//! Specification types for authoring pattern graphs.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::field::FieldId;

pub const DEFAULT_DURATION_TICKS: u32 = 1000;
pub const DEFAULT_TRANSITION_TICKS: u32 = 100;

/// One pattern as authored: field references by id and the successor by name.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct PatternSpec {
    pub name: String,
    pub hue_field: FieldId,
    pub spread_field: FieldId,
    pub duration_ticks: u32,
    pub transition_ticks: u32,
    /// Successor pattern name. `None` makes the pattern terminal.
    pub next: Option<String>,
    /// Whether a terminal pattern's random restart may land here.
    pub random_start: bool,
}

impl Default for PatternSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            hue_field: FieldId::new(),
            spread_field: FieldId::new(),
            duration_ticks: DEFAULT_DURATION_TICKS,
            transition_ticks: DEFAULT_TRANSITION_TICKS,
            next: None,
            random_start: true,
        }
    }
}

impl PatternSpec {
    pub fn new(
        name: impl Into<String>,
        hue_field: impl Into<FieldId>,
        spread_field: impl Into<FieldId>,
    ) -> Self {
        Self {
            name: name.into(),
            hue_field: hue_field.into(),
            spread_field: spread_field.into(),
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, ticks: u32) -> Self {
        self.duration_ticks = ticks;
        self
    }

    pub fn with_transition(mut self, ticks: u32) -> Self {
        self.transition_ticks = ticks;
        self
    }

    pub fn with_next(mut self, name: impl Into<String>) -> Self {
        self.next = Some(name.into());
        self
    }

    pub fn with_random_start(mut self, random_start: bool) -> Self {
        self.random_start = random_start;
        self
    }
}

/// A full pattern graph as authored.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct PatternGraphSpec {
    pub patterns: Vec<PatternSpec>,
    /// Pattern the white-noise bias returns to. Defaults to the first pattern.
    pub base: Option<String>,
}

impl PatternGraphSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pattern to the graph specification.
    pub fn add(&mut self, pattern: PatternSpec) -> &mut Self {
        self.patterns.push(pattern);
        self
    }

    /// Add a pattern and return the specification, for chained construction.
    pub fn with_pattern(mut self, pattern: PatternSpec) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Set the base pattern by name.
    pub fn with_base(mut self, name: impl Into<String>) -> Self {
        self.base = Some(name.into());
        self
    }

    /// Add `hue_fields.len()` patterns sharing one spread field, chained in order.
    ///
    /// Only the first link is eligible as a random start; the last link is terminal.
    pub fn add_chain(
        &mut self,
        prefix: &str,
        hue_fields: &[&str],
        spread_field: &str,
        duration_ticks: u32,
        transition_ticks: u32,
    ) -> &mut Self {
        for (i, hue) in hue_fields.iter().enumerate() {
            let mut spec = PatternSpec::new(format!("{prefix}{}", i + 1), *hue, spread_field)
                .with_duration(duration_ticks)
                .with_transition(transition_ticks)
                .with_random_start(i == 0);
            if i + 1 < hue_fields.len() {
                spec = spec.with_next(format!("{prefix}{}", i + 2));
            }
            self.add(spec);
        }
        self
    }
}
