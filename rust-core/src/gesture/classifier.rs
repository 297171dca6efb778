//! Push/pull classification with hysteresis
//!
//! Opposite gestures never follow each other directly: a `Pull` is only
//! reported when the previous frame was not `Push` and vice versa, so every
//! reversal passes through `None` for at least one frame.

use super::bandwidth::BandwidthEstimate;
use std::fmt;

/// Gesture reported for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureState {
    #[default]
    None,
    /// Hand moving towards the device (upshifted skirt)
    Push,
    /// Hand moving away from the device (downshifted skirt)
    Pull,
}

impl GestureState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureState::None => "none",
            GestureState::Push => "push",
            GestureState::Pull => "pull",
        }
    }
}

impl fmt::Display for GestureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure transition function
///
/// # Arguments
/// * `left_band` / `right_band` - Half-bandwidths in bins
/// * `previous` - State reported for the previous frame
/// * `threshold_bins` - Half-bandwidth that must be exceeded
pub fn next_state(
    left_band: usize,
    right_band: usize,
    previous: GestureState,
    threshold_bins: usize,
) -> GestureState {
    if left_band > threshold_bins && previous != GestureState::Push {
        GestureState::Pull
    } else if right_band > threshold_bins && previous != GestureState::Pull {
        GestureState::Push
    } else {
        GestureState::None
    }
}

/// Stateful classifier holding the previous frame's state
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    previous: GestureState,
    threshold_bins: usize,
}

impl GestureClassifier {
    pub fn new(threshold_bins: usize) -> Self {
        Self {
            previous: GestureState::None,
            threshold_bins,
        }
    }

    /// Classify one frame's band widths and remember the result
    pub fn step(&mut self, left_band: usize, right_band: usize) -> GestureState {
        let state = next_state(left_band, right_band, self.previous, self.threshold_bins);
        self.previous = state;
        state
    }

    /// Classify a bandwidth estimate
    pub fn classify(&mut self, estimate: &BandwidthEstimate) -> GestureState {
        self.step(estimate.left_band(), estimate.right_band())
    }

    /// State reported for the most recent frame
    pub fn state(&self) -> GestureState {
        self.previous
    }

    pub fn reset(&mut self) {
        self.previous = GestureState::None;
    }
}
