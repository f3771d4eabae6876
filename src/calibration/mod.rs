//! Calibration data model.
//!
//! A [`CalibrationRecord`] is the product of a successful search: the most
//! extreme pulse that still moved the motor in each direction, plus the
//! derived hold ("stop") pulse between them. A record is only trusted when
//! all three fields lie inside [`VALID_PULSE_US`].

pub mod search;
pub mod store;

use core::fmt;
use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Inclusive pulse range every persisted or driven calibration field must
/// fall in.
pub const VALID_PULSE_US: RangeInclusive<u16> = 1000..=2000;

/// Rotational direction. CW is driven by pulses above neutral, CCW by
/// pulses below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    Cw,
    Ccw,
}

impl Rotation {
    /// Move `pulse` by `step` away from neutral in this direction.
    pub fn away(self, pulse: u16, step: u16) -> u16 {
        match self {
            Self::Cw => pulse.saturating_add(step),
            Self::Ccw => pulse.saturating_sub(step),
        }
    }

    /// Move `pulse` by `step` back toward neutral.
    pub fn toward(self, pulse: u16, step: u16) -> u16 {
        match self {
            Self::Cw => pulse.saturating_sub(step),
            Self::Ccw => pulse.saturating_add(step),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Cw => "CW",
            Self::Ccw => "CCW",
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The three calibration values, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub cw_limit: u16,
    pub ccw_limit: u16,
    pub stop: u16,
}

impl CalibrationRecord {
    /// Build a record from two confirmed limits, deriving the stop pulse.
    pub fn from_limits(cw_limit: u16, ccw_limit: u16) -> Self {
        Self {
            cw_limit,
            ccw_limit,
            stop: derive_stop(cw_limit, ccw_limit),
        }
    }

    /// Check every field against [`VALID_PULSE_US`], reporting the first
    /// offender.
    pub fn validate(&self) -> Result<(), RecordError> {
        for (field, value) in [
            ("cw_limit", self.cw_limit),
            ("ccw_limit", self.ccw_limit),
            ("stop", self.stop),
        ] {
            if !VALID_PULSE_US.contains(&value) {
                return Err(RecordError::OutOfRange { field, value });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Limit pulse for the given direction.
    pub fn limit(&self, rotation: Rotation) -> u16 {
        match rotation {
            Rotation::Cw => self.cw_limit,
            Rotation::Ccw => self.ccw_limit,
        }
    }
}

impl fmt::Display for CalibrationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CW limit {} us, CCW limit {} us, stop {} us",
            self.cw_limit, self.ccw_limit, self.stop
        )
    }
}

/// Midpoint of the two limits, `round((cw + ccw) / 2)` with halves
/// rounded away from zero.
pub fn derive_stop(cw_limit: u16, ccw_limit: u16) -> u16 {
    ((u32::from(cw_limit) + u32::from(ccw_limit) + 1) / 2) as u16
}
