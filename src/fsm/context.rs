//! Session context threaded through every phase handler.
//!
//! `SessionContext` replaces free-floating session globals: it holds the
//! configuration and the calibration currently in effect. Phase-local data (search
//! progress, ramp cadence, button state) lives in the [`Phase`] payload
//! instead, so no phase can disturb another's working state.
//!
//! [`Phase`]: super::Phase

use crate::calibration::CalibrationRecord;
use crate::config::ServoConfig;

pub struct SessionContext {
    pub config: ServoConfig,

    /// Calibration in effect: loaded at boot or produced by a search.
    /// Written only by the boot and calibrate phases.
    pub calibration: Option<CalibrationRecord>,
}

impl SessionContext {
    pub fn new(config: ServoConfig) -> Self {
        Self {
            config,
            calibration: None,
        }
    }

    /// The calibration in effect, only if it is safe to drive the motor
    /// with.
    pub fn valid_calibration(&self) -> Option<CalibrationRecord> {
        self.calibration.filter(CalibrationRecord::is_valid)
    }
}
