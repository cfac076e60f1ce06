//! Tick-by-tick pattern state machine.
//!
//! The scheduler owns the working hue and spread fields the stamp generator samples from,
//! advances through the [`PatternGraph`] whenever the global tick count is a multiple of the
//! active pattern's duration, and tracks the transition envelope that widens spread around
//! each change.
use rand::RngCore;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::field::{HueCell, HueField, SpreadField};
use crate::pattern::envelope::{TransitionEnvelope, TransitionPolicy};
use crate::pattern::graph::{Pattern, PatternGraph};
use crate::pattern::selection::pick_restart;
use crate::pattern::{ChangeReason, PatternChange, PatternId};

/// Probability of returning to the base pattern after a terminal pattern.
pub const DEFAULT_BASE_BIAS: f64 = 0.75;

/// Cap on the envelope-scaled spread.
pub const DEFAULT_MAX_SPREAD: f64 = 1000.0;

/// Drives a [`PatternGraph`] and maintains the working fields.
#[derive(Clone, Debug)]
pub struct PatternScheduler {
    graph: PatternGraph,
    policy: TransitionPolicy,
    envelope: TransitionEnvelope,
    active: PatternId,
    /// Ticks completed in the active pattern.
    elapsed: u64,
    /// Ticks completed overall.
    ticks: u64,
    sigma_effect: f64,
    working_hue: HueField,
    working_spread: SpreadField,
    white_noise_bias: bool,
    base_bias: f64,
    max_spread: f64,
}

impl PatternScheduler {
    /// Start at the first pattern of `graph` with its fields loaded.
    pub fn new(graph: PatternGraph, policy: TransitionPolicy) -> Self {
        let active = PatternId(0);
        let first = graph.pattern(active);
        let working_hue = (*first.hue).clone();
        let working_spread = (*first.spread).clone();
        let envelope = TransitionEnvelope::default();
        Self {
            policy,
            envelope,
            active,
            elapsed: 0,
            ticks: 0,
            sigma_effect: envelope.entry_value(),
            working_hue,
            working_spread,
            white_noise_bias: true,
            base_bias: DEFAULT_BASE_BIAS,
            max_spread: DEFAULT_MAX_SPREAD,
            graph,
        }
    }

    pub fn with_envelope(mut self, envelope: TransitionEnvelope) -> Self {
        self.envelope = envelope;
        self.sigma_effect = envelope.entry_value();
        self
    }

    pub fn with_base_bias(mut self, base_bias: f64) -> Self {
        self.base_bias = base_bias.clamp(0.0, 1.0);
        self
    }

    pub fn with_white_noise_bias(mut self, enabled: bool) -> Self {
        self.white_noise_bias = enabled;
        self
    }

    pub fn with_max_spread(mut self, max_spread: f64) -> Self {
        self.max_spread = max_spread.max(0.0);
        self
    }

    /// Start at `id` instead of the first pattern. Its fields are copied for both policies.
    pub fn starting_at(mut self, id: PatternId) -> Result<Self> {
        self.check(id)?;
        self.active = id;
        self.load_active_fields();
        Ok(self)
    }

    pub fn graph(&self) -> &PatternGraph {
        &self.graph
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn envelope(&self) -> TransitionEnvelope {
        self.envelope
    }

    pub fn active(&self) -> &Pattern {
        self.graph.pattern(self.active)
    }

    pub fn active_id(&self) -> PatternId {
        self.active
    }

    /// Ticks completed in the active pattern.
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Ticks completed since the scheduler was created.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn sigma_effect(&self) -> f64 {
        self.sigma_effect
    }

    pub fn working_hue(&self) -> &HueField {
        &self.working_hue
    }

    pub fn working_spread(&self) -> &SpreadField {
        &self.working_spread
    }

    pub fn max_spread(&self) -> f64 {
        self.max_spread
    }

    pub fn white_noise_bias(&self) -> bool {
        self.white_noise_bias
    }

    pub fn set_white_noise_bias(&mut self, enabled: bool) {
        self.white_noise_bias = enabled;
    }

    /// Flip the white-noise bias and return the new state.
    pub fn toggle_white_noise_bias(&mut self) -> bool {
        self.white_noise_bias = !self.white_noise_bias;
        self.white_noise_bias
    }

    /// Working hue cell at a row-major pixel index.
    #[inline]
    pub fn hue_at(&self, index: usize) -> HueCell {
        self.working_hue.at(index)
    }

    /// Envelope-scaled spread at a row-major pixel index.
    #[inline]
    pub fn effective_spread(&self, index: usize) -> f64 {
        TransitionEnvelope::apply(
            self.sigma_effect,
            self.working_spread.at(index),
            self.max_spread,
        )
    }

    /// Advance the state machine by one tick.
    ///
    /// The active pattern is left on every tick after the first whose global count is a
    /// multiple of its duration, so mixed durations do not line up with the time spent in
    /// each pattern. Returns the pattern change that took effect on this tick, if any.
    pub fn tick<R: RngCore>(&mut self, rng: &mut R) -> Option<PatternChange> {
        let duration = self.active().duration_ticks as u64;
        let change = if self.ticks > 0 && self.ticks % duration == 0 {
            Some(self.advance(rng))
        } else {
            None
        };

        if let TransitionPolicy::SmoothBlend {
            hue_retain,
            spread_retain,
        } = self.policy
        {
            self.blend_toward_active(hue_retain, spread_retain);
        }

        let (duration, transition) = {
            let pattern = self.active();
            (pattern.duration_ticks, pattern.transition_ticks)
        };
        self.sigma_effect =
            self.envelope
                .step(self.sigma_effect, self.ticks, duration, transition);

        self.elapsed += 1;
        self.ticks += 1;
        change
    }

    /// Leave the active pattern for its successor, or for a restart pick when terminal.
    pub fn advance<R: RngCore>(&mut self, rng: &mut R) -> PatternChange {
        let from = self.active;
        let (to, reason) = match self.active().successor {
            Some(next) => (next, ChangeReason::Chained),
            None => {
                let bias = self.white_noise_bias.then_some(self.base_bias);
                pick_restart(&self.graph, rng, bias)
            }
        };
        self.enter(to);

        let change = PatternChange {
            from,
            to,
            reason,
            tick: self.ticks,
        };
        info!(
            "pattern {} -> {} ({:?}) at tick {}",
            self.graph.pattern(from).name,
            self.graph.pattern(to).name,
            reason,
            self.ticks
        );
        change
    }

    /// Make `id` active immediately, as if the scheduler had advanced to it.
    ///
    /// The next automatic advance still waits for a global tick that is a multiple of the
    /// new pattern's duration.
    pub fn jump_to(&mut self, id: PatternId) -> Result<PatternChange> {
        self.check(id)?;
        let from = self.active;
        self.enter(id);
        debug!("jumped to pattern {}", self.active().name);
        Ok(PatternChange {
            from,
            to: id,
            reason: ChangeReason::Jump,
            tick: self.ticks,
        })
    }

    fn check(&self, id: PatternId) -> Result<()> {
        if self.graph.get(id).is_none() {
            return Err(Error::UnknownPattern {
                name: id.to_string(),
            });
        }
        Ok(())
    }

    fn enter(&mut self, id: PatternId) {
        self.active = id;
        self.elapsed = 0;
        self.sigma_effect = self.envelope.entry_value();
        if self.policy == TransitionPolicy::HardCut {
            self.load_active_fields();
        }
    }

    fn load_active_fields(&mut self) {
        let pattern = self.graph.pattern(self.active);
        self.working_hue.clone_from(&pattern.hue);
        self.working_spread.clone_from(&pattern.spread);
    }

    fn blend_toward_active(&mut self, hue_retain: f64, spread_retain: f64) {
        let pattern = self.graph.pattern(self.active);
        let hue_take = 1.0 - hue_retain;
        for (cell, target) in self
            .working_hue
            .data_mut()
            .iter_mut()
            .zip(pattern.hue.as_slice())
        {
            cell.hue = cell.hue * hue_retain + target.hue * hue_take;
            cell.saturation = cell.saturation * hue_retain + target.saturation * hue_take;
            cell.value = cell.value * hue_retain + target.value * hue_take;
        }

        let spread_take = 1.0 - spread_retain;
        for (spread, target) in self
            .working_spread
            .data_mut()
            .iter_mut()
            .zip(pattern.spread.as_slice())
        {
            *spread = *spread * spread_retain + target * spread_take;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::pattern::graph::tests::{registry, SIZE};
    use crate::pattern::spec::{PatternGraphSpec, PatternSpec};

    fn chain_graph() -> PatternGraph {
        // A -> B -> C, C terminal; only A may be picked at random.
        let spec = PatternGraphSpec::new()
            .with_pattern(
                PatternSpec::new("a", "red", "tight")
                    .with_duration(3)
                    .with_transition(0)
                    .with_next("b"),
            )
            .with_pattern(
                PatternSpec::new("b", "green", "tight")
                    .with_duration(2)
                    .with_transition(0)
                    .with_next("c")
                    .with_random_start(false),
            )
            .with_pattern(
                PatternSpec::new("c", "blue", "noise")
                    .with_duration(4)
                    .with_transition(0)
                    .with_random_start(false),
            );
        PatternGraph::compile(&spec, &registry(), SIZE).unwrap()
    }

    fn two_pattern_graph(duration: u32, transition: u32) -> PatternGraph {
        let spec = PatternGraphSpec::new()
            .with_pattern(
                PatternSpec::new("first", "red", "tight")
                    .with_duration(duration)
                    .with_transition(transition)
                    .with_next("second"),
            )
            .with_pattern(
                PatternSpec::new("second", "blue", "noise")
                    .with_duration(duration)
                    .with_transition(transition)
                    .with_next("first"),
            );
        PatternGraph::compile(&spec, &registry(), SIZE).unwrap()
    }

    #[test]
    fn chain_timing_then_eligible_restart() {
        let mut scheduler =
            PatternScheduler::new(chain_graph(), TransitionPolicy::HardCut).with_white_noise_bias(false);
        let mut rng = StdRng::seed_from_u64(3);

        let mut active = Vec::new();
        let mut changes = Vec::new();
        for _ in 0..10 {
            if let Some(change) = scheduler.tick(&mut rng) {
                changes.push(change);
            }
            active.push(scheduler.active_id().0);
        }

        // a leaves at 3 (3 % 3), b at 4 (4 % 2), c at 8 (8 % 4) and a again at 9 (9 % 3).
        assert_eq!(active, vec![0, 0, 0, 1, 2, 2, 2, 2, 0, 1]);
        let reasons: Vec<_> = changes.iter().map(|c| (c.tick, c.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (3, ChangeReason::Chained),
                (4, ChangeReason::Chained),
                (8, ChangeReason::RandomRestart),
                (9, ChangeReason::Chained),
            ]
        );
    }

    #[test]
    fn equal_durations_advance_every_duration() {
        let mut scheduler =
            PatternScheduler::new(two_pattern_graph(3, 0), TransitionPolicy::HardCut);
        let mut rng = StdRng::seed_from_u64(3);
        let active: Vec<_> = (0..9)
            .map(|_| {
                scheduler.tick(&mut rng);
                scheduler.active_id().0
            })
            .collect();
        assert_eq!(active, vec![0, 0, 0, 1, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn mixed_durations_follow_global_tick_count() {
        let spec = PatternGraphSpec::new()
            .with_pattern(
                PatternSpec::new("long", "red", "tight")
                    .with_duration(4)
                    .with_transition(0)
                    .with_next("short"),
            )
            .with_pattern(
                PatternSpec::new("short", "green", "tight")
                    .with_duration(3)
                    .with_transition(0)
                    .with_next("long"),
            );
        let graph = PatternGraph::compile(&spec, &registry(), SIZE).unwrap();
        let mut scheduler = PatternScheduler::new(graph, TransitionPolicy::HardCut);
        let mut rng = StdRng::seed_from_u64(5);

        let mut active = Vec::new();
        let mut change_ticks = Vec::new();
        for _ in 0..13 {
            if let Some(change) = scheduler.tick(&mut rng) {
                change_ticks.push(change.tick);
            }
            active.push(scheduler.active_id().0);
        }

        // short is entered at 4 and left at 6, because 6 % 3 == 0.
        assert_eq!(active, vec![0, 0, 0, 0, 1, 1, 0, 0, 1, 0, 0, 0, 1]);
        assert_eq!(change_ticks, vec![4, 6, 8, 9, 12]);
    }

    #[test]
    fn restart_with_bias_returns_to_base_most_of_the_time() {
        let spec = PatternGraphSpec::new()
            .with_pattern(PatternSpec::new("base", "red", "noise").with_duration(1).with_transition(0))
            .with_pattern(PatternSpec::new("other", "green", "tight").with_duration(1).with_transition(0))
            .with_base("base");
        let graph = PatternGraph::compile(&spec, &registry(), SIZE).unwrap();
        let mut scheduler = PatternScheduler::new(graph, TransitionPolicy::HardCut);
        let mut rng = StdRng::seed_from_u64(8);

        let mut base_hits = 0;
        let n = 4000;
        for _ in 0..n {
            scheduler.tick(&mut rng);
            if scheduler.active_id() == PatternId(0) {
                base_hits += 1;
            }
        }
        // Bias 0.75 plus half of the uniform remainder lands on base.
        let rate = base_hits as f64 / n as f64;
        assert!((rate - 0.875).abs() < 0.03, "rate {rate}");
    }

    #[test]
    fn hard_cut_copies_target_fields() {
        let mut scheduler =
            PatternScheduler::new(two_pattern_graph(2, 0), TransitionPolicy::HardCut);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(scheduler.hue_at(0).hue, 0.0);

        scheduler.tick(&mut rng);
        scheduler.tick(&mut rng);
        let change = scheduler.tick(&mut rng).expect("advance on third tick");
        assert_eq!(change.to, PatternId(1));
        assert_eq!(scheduler.hue_at(0).hue, 240.0);
        assert_eq!(scheduler.working_spread().at(0), 10_000.0);
    }

    #[test]
    fn smooth_blend_converges_toward_target() {
        let mut scheduler =
            PatternScheduler::new(two_pattern_graph(200, 0), TransitionPolicy::smooth());
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            scheduler.tick(&mut rng);
        }
        // Still on the first pattern: fields unchanged.
        assert_eq!(scheduler.hue_at(0).hue, 0.0);

        scheduler.tick(&mut rng);
        assert_eq!(scheduler.active_id(), PatternId(1));
        let first = scheduler.hue_at(0).hue;
        assert!((first - 12.0).abs() < 1e-9, "one blend step, got {first}");
        assert!((scheduler.working_spread().at(0) - 1004.5).abs() < 1e-9);

        for _ in 0..150 {
            scheduler.tick(&mut rng);
        }
        assert!((scheduler.hue_at(0).hue - 240.0).abs() < 1.0);
        assert!((scheduler.working_spread().at(0) - 10_000.0).abs() < 1.0);
    }

    #[test]
    fn envelope_resets_on_every_advance() {
        let mut scheduler =
            PatternScheduler::new(two_pattern_graph(10, 2), TransitionPolicy::HardCut);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(scheduler.sigma_effect(), 1000.0);

        for _ in 0..5 {
            scheduler.tick(&mut rng);
        }
        assert_eq!(scheduler.sigma_effect(), 1.0);

        for _ in 0..4 {
            scheduler.tick(&mut rng);
        }
        // Tick 8 has phase 9 > 10 - 2: one up-step.
        assert!((scheduler.sigma_effect() - 500.5).abs() < 1e-9);
        // Tick 9 wraps to phase 0: back down to the minimum.
        scheduler.tick(&mut rng);
        assert_eq!(scheduler.sigma_effect(), 1.0);

        // Entering the second pattern resets to the maximum before the first down-step.
        scheduler.tick(&mut rng);
        assert_eq!(scheduler.active_id(), PatternId(1));
        assert_eq!(scheduler.elapsed(), 1);
        assert!((scheduler.sigma_effect() - (1000.0 - 999.0 / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn effective_spread_is_scaled_and_capped() {
        let mut scheduler =
            PatternScheduler::new(two_pattern_graph(10, 0), TransitionPolicy::HardCut);
        let mut rng = StdRng::seed_from_u64(1);
        // Entry value 1000 before the first tick: 5 * sqrt(1000) > 100.
        assert!((scheduler.effective_spread(0) - 5.0 * 1000f64.sqrt()).abs() < 1e-9);
        scheduler.tick(&mut rng);
        assert_eq!(scheduler.effective_spread(0), 5.0);

        let capped = scheduler.with_max_spread(2.0);
        assert_eq!(capped.effective_spread(0), 2.0);
    }

    #[test]
    fn jump_to_enters_pattern_and_rejects_unknown_ids() {
        let mut scheduler =
            PatternScheduler::new(two_pattern_graph(10, 2), TransitionPolicy::HardCut);
        let change = scheduler.jump_to(PatternId(1)).unwrap();
        assert_eq!(change.reason, ChangeReason::Jump);
        assert_eq!(scheduler.active().name, "second");
        assert_eq!(scheduler.elapsed(), 0);

        assert!(matches!(
            scheduler.jump_to(PatternId(7)),
            Err(Error::UnknownPattern { .. })
        ));
    }

    #[test]
    fn toggling_white_noise_bias() {
        let mut scheduler =
            PatternScheduler::new(two_pattern_graph(10, 2), TransitionPolicy::HardCut);
        assert!(scheduler.white_noise_bias());
        assert!(!scheduler.toggle_white_noise_bias());
        scheduler.set_white_noise_bias(true);
        assert!(scheduler.white_noise_bias());
    }
}
