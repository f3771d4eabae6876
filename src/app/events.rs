//! Outbound application events.
//!
//! The phase machine and [`AppService`](super::service::AppService) emit
//! these through the [`EventSink`](super::ports::EventSink) port. Adapters
//! decide what to do with them; on the device they are logged.

use crate::calibration::{CalibrationRecord, Rotation};
use crate::control::ramp::RampDirection;
use crate::fsm::PhaseId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The application service has started (carries initial phase).
    Started(PhaseId),

    /// The phase machine moved between phases.
    PhaseChanged { from: PhaseId, to: PhaseId },

    /// A valid record was read from persistent storage at boot.
    CalibrationLoaded(CalibrationRecord),

    /// A calibration probe pulse is being held while the operator answers.
    ProbeIssued { rotation: Rotation, pulse_us: u16 },

    /// The search pinned down one direction's movement threshold.
    LimitFound { rotation: Rotation, pulse_us: u16 },

    /// Both limits found and the derived record passed validation.
    CalibrationComplete(CalibrationRecord),

    /// The operator chose to persist the record.
    CalibrationSaved(CalibrationRecord),

    /// One full ramp cycle ran at the given cadence.
    RampCycle {
        step_delay_ms: u32,
        direction: RampDirection,
    },

    /// The ramp sweep finished.
    RampComplete,

    /// A debounced button press drove a twitch pulse.
    Twitch { rotation: Rotation, pulse_us: u16 },
}
