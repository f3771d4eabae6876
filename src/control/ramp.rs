//! Ramp regression tester.
//!
//! Exercises a fresh calibration across a sweep of pulse cadences. One
//! cycle sends `ramp_repeat_count` CW-limit/stop pairs, then the same for
//! the CCW limit, each pulse held for the current step delay, followed by
//! a fixed pause.
//!
//! ```text
//!  RAMP_UP   100 → 125 → … → 500 ──[≥ max: clamp, switch]──▶ RAMP_DOWN
//!  RAMP_DOWN 500 → 475 → … → 100 ──[< min]──▶ COMPLETE
//! ```

use super::pulse::{pause, send_pulse};
use crate::app::ports::Rig;
use crate::calibration::{CalibrationRecord, Rotation};
use crate::config::ServoConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampDirection {
    RampUp,
    RampDown,
}

/// Outcome of advancing the ramp after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampStep {
    Continue,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampState {
    step_delay_ms: u32,
    direction: RampDirection,
}

impl RampState {
    /// Start ramping up from the lower bound.
    pub fn new(config: &ServoConfig) -> Self {
        Self {
            step_delay_ms: config.ramp_min_ms,
            direction: RampDirection::RampUp,
        }
    }

    pub fn step_delay_ms(&self) -> u32 {
        self.step_delay_ms
    }

    pub fn direction(&self) -> RampDirection {
        self.direction
    }

    /// Move to the next cadence after a completed cycle.
    pub fn advance(&mut self, config: &ServoConfig) -> RampStep {
        match self.direction {
            RampDirection::RampUp => {
                if self.step_delay_ms >= config.ramp_max_ms {
                    self.step_delay_ms = config.ramp_max_ms;
                    self.direction = RampDirection::RampDown;
                } else {
                    self.step_delay_ms += config.ramp_step_ms;
                }
                RampStep::Continue
            }
            RampDirection::RampDown => {
                self.step_delay_ms = self.step_delay_ms.saturating_sub(config.ramp_step_ms);
                if self.step_delay_ms < config.ramp_min_ms {
                    RampStep::Complete
                } else {
                    RampStep::Continue
                }
            }
        }
    }
}

/// Run one full CW/CCW cycle at the current cadence, then pause.
pub fn run_cycle(
    hw: &mut impl Rig,
    record: &CalibrationRecord,
    state: &RampState,
    config: &ServoConfig,
) {
    let delay = state.step_delay_ms;
    hw.write_line(&format!(
        "Ramp {:?}: step delay {} ms",
        state.direction, delay
    ));
    for rotation in [Rotation::Cw, Rotation::Ccw] {
        let limit = record.limit(rotation);
        for _ in 0..config.ramp_repeat_count {
            send_pulse(hw, limit, delay, record.stop);
            send_pulse(hw, record.stop, delay, record.stop);
        }
    }
    pause(hw, config.ramp_pause_ms);
}
