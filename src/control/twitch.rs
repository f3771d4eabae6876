//! Manual twitch controller.
//!
//! Terminal mode of a session. Each control pass samples the CCW button
//! and then the CW button; a debounced press issues one fixed-length
//! pulse at that direction's limit, flashing the indicator, followed by
//! the stop pulse. Both buttons are evaluated independently, so a
//! simultaneous press twitches CCW first, then CW.

use heapless::Vec;
use log::info;

use super::pulse::hold_stop;
use crate::app::ports::Rig;
use crate::calibration::{CalibrationRecord, Rotation};
use crate::config::ServoConfig;
use crate::drivers::button::{ButtonDriver, ButtonEvent};

pub struct ManualController {
    buttons: [ButtonDriver; 2],
    twitch_ms: u32,
}

impl ManualController {
    pub fn new(config: &ServoConfig) -> Self {
        Self {
            buttons: [
                ButtonDriver::with_debounce(Rotation::Ccw, config.debounce_ms),
                ButtonDriver::with_debounce(Rotation::Cw, config.debounce_ms),
            ],
            twitch_ms: config.twitch_ms,
        }
    }

    /// One control pass. Returns the directions twitched, in order.
    pub fn poll(&mut self, hw: &mut impl Rig, record: &CalibrationRecord) -> Vec<Rotation, 2> {
        let mut fired = Vec::new();
        for button in &mut self.buttons {
            let rotation = button.rotation();
            let level = hw.read_pin(rotation);
            if button.tick(hw.now_ms(), level) == Some(ButtonEvent::Pressed) {
                twitch(hw, rotation, record, self.twitch_ms);
                // Capacity equals the button count.
                let _ = fired.push(rotation);
            }
        }
        fired
    }
}

/// Single directional pulse, then back to stop. The indicator is lit for
/// the whole pulse even when the limit coincides with the stop pulse.
pub fn twitch(hw: &mut impl Rig, rotation: Rotation, record: &CalibrationRecord, twitch_ms: u32) {
    let limit = record.limit(rotation);
    info!("Twitch {} at {} us", rotation, limit);
    hw.set_indicator(true);
    hw.set_pulse(limit);
    hw.write_line(&format!("Pulse {} us for {} ms", limit, twitch_ms));
    hw.delay_ms(twitch_ms);
    hw.set_indicator(false);
    hold_stop(hw, record.stop);
}
