//! Polled debounced button driver.
//!
//! ## Hardware
//!
//! Active-low momentary switch with internal pull-up: a pressed button
//! reads LOW. The main loop samples the raw level every control pass and
//! hands it to [`ButtonDriver::tick`], which only accepts a new level once
//! it has been stable for the debounce window.
//!
//! ## Edge detection
//!
//! | Raw level held stable ≥ debounce | Debounced change  | Event      |
//! |----------------------------------|-------------------|------------|
//! | LOW                              | released → pressed| `Pressed`  |
//! | HIGH                             | pressed → released| `Released` |
//!
//! A glitch shorter than the window restarts the timer and is never
//! reported. Samples are not taken while the loop is blocked in a pulse,
//! so a press and release that both fall inside one blocking wait are
//! lost.

use crate::calibration::Rotation;

pub const DEBOUNCE_MS: u32 = 50;

/// Debounced edge events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
    Released,
}

pub struct ButtonDriver {
    rotation: Rotation,
    debounce_ms: u32,
    /// Raw pressed state seen on the previous sample.
    raw_last: bool,
    /// Accepted (debounced) pressed state.
    debounced: bool,
    /// When `raw_last` last changed.
    last_change_ms: u32,
}

impl ButtonDriver {
    pub fn new(rotation: Rotation) -> Self {
        Self::with_debounce(rotation, DEBOUNCE_MS)
    }

    pub fn with_debounce(rotation: Rotation, debounce_ms: u32) -> Self {
        Self {
            rotation,
            debounce_ms,
            raw_last: false,
            debounced: false,
            last_change_ms: 0,
        }
    }

    /// Direction this button twitches the motor in.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Current debounced state (`true` = pressed).
    pub fn is_pressed(&self) -> bool {
        self.debounced
    }

    /// Feed one raw sample. `level_high` is the electrical level; the
    /// button is active-low. Returns an edge once a change has been stable
    /// for the debounce window.
    pub fn tick(&mut self, now_ms: u32, level_high: bool) -> Option<ButtonEvent> {
        let pressed = !level_high;

        if pressed != self.raw_last {
            self.raw_last = pressed;
            self.last_change_ms = now_ms;
            return None;
        }

        if pressed == self.debounced {
            return None;
        }

        if now_ms.wrapping_sub(self.last_change_ms) < self.debounce_ms {
            return None;
        }

        self.debounced = pressed;
        Some(if pressed {
            ButtonEvent::Pressed
        } else {
            ButtonEvent::Released
        })
    }
}
