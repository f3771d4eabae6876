//! Timed pulse primitives shared by the ramp tester and manual mode.
//!
//! In a ramp cycle a *move* pulse (anything other than the stop pulse)
//! lights the indicator and is reported on the console for as long as it
//! is held. A stop pulse is a holding command and stays silent. Manual
//! twitches always flash; see [`super::twitch::twitch`].

use embedded_hal::delay::DelayNs;

use crate::app::ports::{ConsolePort, IndicatorPort, MotorPort};

/// Send `pulse_us`, hold it for `hold_ms`, and return whether it was a
/// move pulse.
pub fn send_pulse(
    hw: &mut (impl MotorPort + IndicatorPort + ConsolePort + DelayNs),
    pulse_us: u16,
    hold_ms: u32,
    stop_us: u16,
) -> bool {
    hw.set_pulse(pulse_us);
    let moving = pulse_us != stop_us;
    if moving {
        hw.set_indicator(true);
        hw.write_line(&format!("Pulse {} us for {} ms", pulse_us, hold_ms));
    }
    hw.delay_ms(hold_ms);
    if moving {
        hw.set_indicator(false);
    }
    moving
}

/// Command the stop pulse without holding.
pub fn hold_stop(hw: &mut impl MotorPort, stop_us: u16) {
    hw.set_pulse(stop_us);
}

/// Blocking inter-phase pause. Nothing is sampled meanwhile.
pub fn pause(hw: &mut impl DelayNs, ms: u32) {
    hw.delay_ms(ms);
}
