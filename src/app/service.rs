//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the phase machine and the session context. It
//! exposes a hardware-agnostic API; all I/O flows through port traits
//! injected at call sites, so a whole session can be driven by mocks.
//!
//! ```text
//!   ConsolePort ─┐                          ┌──▶ MotorPort
//!   InputPort ───┼──▶ ┌──────────────────┐ ─┼──▶ IndicatorPort
//!   ClockPort ───┘    │    AppService    │  └──▶ EventSink
//!                     │  FSM · Context   │
//! ByteStorePort ◀───▶ └──────────────────┘
//! ```

use log::info;

use crate::calibration::CalibrationRecord;
use crate::calibration::store::CalibrationStore;
use crate::config::ServoConfig;
use crate::fsm::context::SessionContext;
use crate::fsm::{Fsm, Phase, PhaseId};

use super::events::AppEvent;
use super::ports::{ByteStorePort, EventSink, Rig};

const BANNER: &str = "Servo calibration utility";

/// The application service orchestrates one calibration session.
pub struct AppService {
    fsm: Fsm,
    ctx: SessionContext,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: ServoConfig) -> Self {
        Self {
            fsm: Fsm::new(Phase::Boot),
            ctx: SessionContext::new(config),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Greet the operator and enter the Boot phase.
    pub fn start(&mut self, hw: &mut impl Rig, sink: &mut impl EventSink) {
        hw.release();
        hw.set_indicator(false);
        hw.write_line(BANNER);
        self.fsm.start(&mut self.ctx, hw, sink);
        sink.emit(&AppEvent::Started(self.fsm.current_phase()));
        info!("AppService started in {}", self.fsm.current_phase());
    }

    /// Run one step of the current phase.
    pub fn tick(
        &mut self,
        hw: &mut impl Rig,
        store: &mut CalibrationStore<impl ByteStorePort>,
        sink: &mut impl EventSink,
    ) {
        self.fsm.tick(&mut self.ctx, hw, store, sink);
    }

    /// Start, then tick forever. Manual mode never exits, so neither
    /// does this.
    pub fn run(
        &mut self,
        hw: &mut impl Rig,
        store: &mut CalibrationStore<impl ByteStorePort>,
        sink: &mut impl EventSink,
    ) -> ! {
        self.start(hw, sink);
        loop {
            self.tick(hw, store, sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> PhaseId {
        self.fsm.current_phase()
    }

    /// The calibration in effect, if any.
    pub fn calibration(&self) -> Option<CalibrationRecord> {
        self.ctx.calibration
    }
}
