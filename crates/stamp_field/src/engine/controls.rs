//! Discrete operator controls and the state they drive.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::density::DensityMapping;

/// Step applied to the linear density gain.
pub const GAIN_STEP: f64 = 0.01;

/// Step applied to the linear density offset.
pub const OFFSET_STEP: f64 = 0.25;

/// Fake reading used until changed.
pub const DEFAULT_FAKE_COUNT: u16 = 20;

/// One operator input.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    DensityGainUp,
    DensityGainDown,
    DensityOffsetUp,
    DensityOffsetDown,
    CycleDisplay,
    ToggleFakeDensity,
    FakeCountUp,
    FakeCountDown,
    TogglePause,
    ToggleWhiteNoiseBias,
    Quit,
}

/// What the overlay shows.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    /// The mapped stamp count.
    #[default]
    Count,
    /// Stamp count and raw reading.
    CountAndRaw,
    Hidden,
}

impl DisplayMode {
    pub fn next(self) -> Self {
        match self {
            DisplayMode::Count => DisplayMode::CountAndRaw,
            DisplayMode::CountAndRaw => DisplayMode::Hidden,
            DisplayMode::Hidden => DisplayMode::Count,
        }
    }
}

/// Operator-facing state. The white-noise bias lives on the scheduler.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlState {
    pub mapping: DensityMapping,
    pub display: DisplayMode,
    pub fake_density: bool,
    pub fake_count: u16,
    pub paused: bool,
    pub quit: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new(DensityMapping::default())
    }
}

impl ControlState {
    pub fn new(mapping: DensityMapping) -> Self {
        Self {
            mapping,
            display: DisplayMode::default(),
            fake_density: false,
            fake_count: DEFAULT_FAKE_COUNT,
            paused: false,
            quit: false,
        }
    }

    /// Apply `control`. Returns `false` when it has no effect on this state
    /// (gain and offset under a direct mapping, and the white-noise toggle).
    pub fn apply(&mut self, control: Control) -> bool {
        match control {
            Control::DensityGainUp => self.adjust_linear(GAIN_STEP, 0.0),
            Control::DensityGainDown => self.adjust_linear(-GAIN_STEP, 0.0),
            Control::DensityOffsetUp => self.adjust_linear(0.0, OFFSET_STEP),
            Control::DensityOffsetDown => self.adjust_linear(0.0, -OFFSET_STEP),
            Control::CycleDisplay => {
                self.display = self.display.next();
                true
            }
            Control::ToggleFakeDensity => {
                self.fake_density = !self.fake_density;
                true
            }
            Control::FakeCountUp => {
                self.fake_count = self.fake_count.saturating_add(1);
                true
            }
            Control::FakeCountDown => {
                self.fake_count = self.fake_count.saturating_sub(1);
                true
            }
            Control::TogglePause => {
                self.paused = !self.paused;
                true
            }
            Control::Quit => {
                self.quit = true;
                true
            }
            Control::ToggleWhiteNoiseBias => false,
        }
    }

    /// Reading to use this tick: the fake count when the override is on, else `polled`.
    pub fn raw_count(&self, polled: impl FnOnce() -> u16) -> u16 {
        if self.fake_density {
            self.fake_count
        } else {
            polled()
        }
    }

    /// Overlay text for the current display mode.
    pub fn overlay_text(&self, count: usize, raw: u16) -> Option<String> {
        match self.display {
            DisplayMode::Count => Some(format!("{count}")),
            DisplayMode::CountAndRaw => Some(format!("{count}/{raw}")),
            DisplayMode::Hidden => None,
        }
    }

    fn adjust_linear(&mut self, da: f64, db: f64) -> bool {
        match &mut self.mapping {
            DensityMapping::Linear { a, b } => {
                *a = (*a + da).max(0.0);
                *b = (*b + db).max(0.0);
                true
            }
            DensityMapping::Direct => false,
        }
    }
}
