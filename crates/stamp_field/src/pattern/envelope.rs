//! Transition policies and the spread envelope around pattern changes.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the working fields follow a newly active pattern.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TransitionPolicy {
    /// Replace the working fields with the new pattern's fields on entry.
    #[default]
    HardCut,
    /// Every tick, move the working fields toward the active pattern:
    /// `working = working * retain + target * (1 - retain)`.
    SmoothBlend {
        /// Retention for hue, saturation and value.
        hue_retain: f64,
        /// Retention for spread.
        spread_retain: f64,
    },
}

impl TransitionPolicy {
    /// Smooth blending with the usual retention rates.
    pub fn smooth() -> Self {
        TransitionPolicy::SmoothBlend {
            hue_retain: 0.95,
            spread_retain: 0.9,
        }
    }

    pub fn is_smooth(&self) -> bool {
        matches!(self, TransitionPolicy::SmoothBlend { .. })
    }
}

/// Multiplier applied (as its square root) to spread near pattern boundaries.
///
/// Entering a pattern resets the multiplier to `max_multiplier`. The ramp follows the phase
/// `(tick + 1) % duration` of the global tick counter: below `transition_ticks` it falls
/// linearly toward `min_multiplier`, above `duration - transition_ticks` it climbs back
/// toward `max_multiplier`, and in between it holds at the minimum. The final tick of each
/// cycle has phase 0 and so steps down.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionEnvelope {
    pub min_multiplier: f64,
    pub max_multiplier: f64,
}

impl Default for TransitionEnvelope {
    fn default() -> Self {
        Self {
            min_multiplier: 1.0,
            max_multiplier: 1000.0,
        }
    }
}

impl TransitionEnvelope {
    pub fn new(min_multiplier: f64, max_multiplier: f64) -> Self {
        Self {
            min_multiplier,
            max_multiplier,
        }
    }

    /// Value on entering a pattern.
    pub fn entry_value(&self) -> f64 {
        self.max_multiplier
    }

    /// Next multiplier for global tick `tick` in a pattern of `duration` ticks with
    /// `transition`-tick ramps.
    pub fn step(&self, current: f64, tick: u64, duration: u32, transition: u32) -> f64 {
        let (min, max) = (self.min_multiplier, self.max_multiplier);
        if transition == 0 || duration == 0 {
            return min;
        }
        let slope = (max - min) / transition as f64;
        let transition = transition as u64;
        let duration = duration as u64;
        let phase = (tick + 1) % duration;

        let next = if phase < transition {
            current - slope
        } else if phase > duration.saturating_sub(transition) {
            current + slope
        } else {
            min
        };
        next.clamp(min, max)
    }

    /// Scale a raw spread value by the envelope and cap it.
    #[inline]
    pub fn apply(multiplier: f64, spread: f64, max_spread: f64) -> f64 {
        (spread * multiplier.sqrt()).min(max_spread)
    }
}
