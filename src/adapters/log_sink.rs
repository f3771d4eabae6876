//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC on the device). Per-probe events are
//! chatty, so they go out at `debug`.

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(phase) => info!("START | initial_phase={}", phase),
            AppEvent::PhaseChanged { from, to } => info!("PHASE | {} -> {}", from, to),
            AppEvent::CalibrationLoaded(rec) => info!("CAL   | loaded {}", rec),
            AppEvent::ProbeIssued { rotation, pulse_us } => {
                debug!("PROBE | {} {} us", rotation, pulse_us);
            }
            AppEvent::LimitFound { rotation, pulse_us } => {
                info!("CAL   | {} limit {} us", rotation, pulse_us);
            }
            AppEvent::CalibrationComplete(rec) => info!("CAL   | complete {}", rec),
            AppEvent::CalibrationSaved(rec) => info!("CAL   | saved {}", rec),
            AppEvent::RampCycle {
                step_delay_ms,
                direction,
            } => info!("RAMP  | {:?} step={}ms", direction, step_delay_ms),
            AppEvent::RampComplete => info!("RAMP  | complete"),
            AppEvent::Twitch { rotation, pulse_us } => {
                info!("TWITCH| {} {} us", rotation, pulse_us);
            }
        }
    }
}
