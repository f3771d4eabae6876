//! Continuous-rotation servo driver.
//!
//! One LEDC channel produces the 50 Hz frame; the pulse width inside the
//! frame encodes speed and direction. Releasing the servo drops the duty
//! to zero so no pulses are sent at all and the motor free-wheels.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LEDC channel via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoState {
    /// No pulse train on the signal line.
    Released,
    /// Pulse train running at this width.
    Holding { pulse_us: u16 },
}

pub struct ServoDriver {
    state: ServoState,
}

impl Default for ServoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoDriver {
    pub fn new() -> Self {
        Self {
            state: ServoState::Released,
        }
    }

    pub fn set_pulse(&mut self, pulse_us: u16) {
        hw_init::ledc_set(hw_init::LEDC_CH_SERVO, pulse_to_duty(pulse_us));
        self.state = ServoState::Holding { pulse_us };
    }

    pub fn release(&mut self) {
        hw_init::ledc_set(hw_init::LEDC_CH_SERVO, 0);
        self.state = ServoState::Released;
    }

    pub fn state(&self) -> ServoState {
        self.state
    }
}

/// LEDC duty counts for a pulse width, clamped to one full frame.
pub fn pulse_to_duty(pulse_us: u16) -> u32 {
    let full_scale = 1u32 << pins::SERVO_PWM_RESOLUTION_BITS;
    let pulse = u32::from(pulse_us).min(pins::SERVO_PERIOD_US);
    pulse * full_scale / pins::SERVO_PERIOD_US
}
