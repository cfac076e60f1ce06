//! Choosing the pattern that follows a terminal pattern.
//!
//! - [pick_random_start]: uniform over all patterns, redrawing until one is eligible as a
//!   random start.
//! - [pick_restart]: optionally returns to the graph's base pattern with a fixed probability
//!   first (the white-noise bias), and otherwise defers to [pick_random_start].
use rand::RngCore;

use crate::pattern::{ChangeReason, PatternGraph, PatternId};
use crate::sampling::{rand01, rand_index};

/// Uniform pick among patterns with `random_start`, by rejection.
///
/// Returns the base pattern when no pattern is eligible, which a compiled graph with a
/// terminal pattern rules out.
pub fn pick_random_start<R: RngCore>(graph: &PatternGraph, rng: &mut R) -> PatternId {
    if !graph.patterns().iter().any(|p| p.random_start) {
        return graph.base();
    }
    loop {
        let id = PatternId(rand_index(rng, graph.len()));
        if graph.pattern(id).random_start {
            return id;
        }
    }
}

/// Pick the successor of a terminal pattern.
///
/// With `base_bias = Some(p)`, the base pattern is chosen with probability `p`; the random
/// pick covers the rest. With `None`, the random pick always decides.
pub fn pick_restart<R: RngCore>(
    graph: &PatternGraph,
    rng: &mut R,
    base_bias: Option<f64>,
) -> (PatternId, ChangeReason) {
    if let Some(p) = base_bias {
        if rand01(rng) < p {
            return (graph.base(), ChangeReason::BaseBias);
        }
    }
    (pick_random_start(graph, rng), ChangeReason::RandomRestart)
}
