//! Compiled, index-based pattern graph.
//!
//! [`PatternGraph::compile`] validates a [`PatternGraphSpec`] against a [`FieldRegistry`],
//! resolves field ids to shared field handles and successor names to [`PatternId`]s.
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::field::{FieldRegistry, HueField, RasterSize, SpreadField};
use crate::pattern::spec::PatternGraphSpec;
use crate::pattern::PatternId;

/// A compiled pattern.
#[derive(Clone, Debug)]
pub struct Pattern {
    pub name: String,
    pub hue: Arc<HueField>,
    pub spread: Arc<SpreadField>,
    pub duration_ticks: u32,
    pub transition_ticks: u32,
    pub successor: Option<PatternId>,
    pub random_start: bool,
}

impl Pattern {
    pub fn is_terminal(&self) -> bool {
        self.successor.is_none()
    }
}

/// Patterns stored by index with successor links.
#[derive(Clone, Debug)]
pub struct PatternGraph {
    patterns: Vec<Pattern>,
    base: PatternId,
    size: RasterSize,
}

impl PatternGraph {
    /// Compile a specification for a raster of `size`.
    ///
    /// Fails when the graph is empty, names repeat, durations are zero or shorter than
    /// their transition, fields or successors are unknown, field sizes differ from `size`,
    /// or a terminal pattern exists while no pattern is eligible as a random start.
    pub fn compile(
        spec: &PatternGraphSpec,
        registry: &FieldRegistry,
        size: RasterSize,
    ) -> Result<Self> {
        if spec.patterns.is_empty() {
            return Err(Error::InvalidConfig("pattern graph is empty".into()));
        }

        let mut index: HashMap<&str, PatternId> = HashMap::with_capacity(spec.patterns.len());
        for (i, p) in spec.patterns.iter().enumerate() {
            if p.name.is_empty() {
                return Err(Error::InvalidConfig(format!("pattern {i} has an empty name")));
            }
            if index.insert(p.name.as_str(), PatternId(i)).is_some() {
                return Err(Error::InvalidConfig(format!(
                    "pattern name '{}' is used more than once",
                    p.name
                )));
            }
        }

        let mut patterns = Vec::with_capacity(spec.patterns.len());
        for p in &spec.patterns {
            if p.duration_ticks == 0 {
                return Err(Error::InvalidConfig(format!(
                    "pattern '{}' has zero duration",
                    p.name
                )));
            }
            if p.transition_ticks > p.duration_ticks {
                return Err(Error::InvalidConfig(format!(
                    "pattern '{}' transition ({}) exceeds its duration ({})",
                    p.name, p.transition_ticks, p.duration_ticks
                )));
            }

            let hue = registry.require_hue(&p.hue_field)?;
            let spread = registry.require_spread(&p.spread_field)?;
            for (kind, id, field_size) in [
                ("hue", &p.hue_field, hue.size()),
                ("spread", &p.spread_field, spread.size()),
            ] {
                if field_size != size {
                    return Err(Error::InvalidConfig(format!(
                        "{kind} field '{id}' is {}x{} but the raster is {}x{}",
                        field_size.width, field_size.height, size.width, size.height
                    )));
                }
            }

            let successor = match &p.next {
                Some(next) => Some(*index.get(next.as_str()).ok_or_else(|| {
                    Error::UnknownPattern {
                        name: next.clone(),
                    }
                })?),
                None => None,
            };

            patterns.push(Pattern {
                name: p.name.clone(),
                hue,
                spread,
                duration_ticks: p.duration_ticks,
                transition_ticks: p.transition_ticks,
                successor,
                random_start: p.random_start,
            });
        }

        let base = match &spec.base {
            Some(name) => *index
                .get(name.as_str())
                .ok_or_else(|| Error::UnknownPattern { name: name.clone() })?,
            None => PatternId(0),
        };

        let any_terminal = patterns.iter().any(Pattern::is_terminal);
        let any_eligible = patterns.iter().any(|p| p.random_start);
        if any_terminal && !any_eligible {
            return Err(Error::InvalidConfig(
                "a terminal pattern exists but no pattern is eligible as a random start".into(),
            ));
        }

        Ok(Self {
            patterns,
            base,
            size,
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, id: PatternId) -> Option<&Pattern> {
        self.patterns.get(id.0)
    }

    /// Look up a pattern id by name.
    pub fn id_of(&self, name: &str) -> Option<PatternId> {
        self.patterns
            .iter()
            .position(|p| p.name == name)
            .map(PatternId)
    }

    /// Pattern the white-noise bias returns to.
    pub fn base(&self) -> PatternId {
        self.base
    }

    /// Raster size every field in the graph matches.
    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn iter(&self) -> impl Iterator<Item = (PatternId, &Pattern)> {
        self.patterns
            .iter()
            .enumerate()
            .map(|(i, p)| (PatternId(i), p))
    }

    pub(crate) fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.0]
    }
}
