//! Session phase machine.
//!
//! ```text
//!            ┌──[record loaded]──▶ AWAIT_RECALIBRATE ──[no / timeout]──┐
//!  BOOT ─────┤                            │                            │
//!            └──[no valid data]──┐      [yes]                          │
//!                                ▼        ▼                            ▼
//!                          CALIBRATE (CW, then CCW) ──▶ CONFIRM_SAVE   MANUAL
//!                                                            │           ▲
//!                                                            ▼           │
//!                                                        RAMP_TEST ──────┘
//! ```
//!
//! Each [`Phase`] variant carries exactly the data that phase works on
//! (search progress, ramp cadence, debounced buttons). Each tick the
//! engine calls the handler for the **current** phase; if it returns
//! `Some(next)`, the engine runs the exit action for the current phase,
//! swaps in the next one, and runs its enter action. All handlers share
//! the explicit [`SessionContext`].

pub mod context;
pub mod states;

use core::fmt;

use log::info;

use context::SessionContext;

use crate::app::events::AppEvent;
use crate::app::ports::{ByteStorePort, EventSink, Rig};
use crate::calibration::Rotation;
use crate::calibration::search::SearchState;
use crate::calibration::store::CalibrationStore;
use crate::config::ServoConfig;
use crate::control::operator::LineReader;
use crate::control::ramp::RampState;
use crate::control::twitch::ManualController;

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

/// Payload-free discriminant of [`Phase`], for events and queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseId {
    Boot,
    AwaitRecalibrate,
    Calibrate,
    ConfirmSave,
    RampTest,
    Manual,
}

impl PhaseId {
    pub fn name(self) -> &'static str {
        match self {
            Self::Boot => "Boot",
            Self::AwaitRecalibrate => "AwaitRecalibrate",
            Self::Calibrate => "Calibrate",
            Self::ConfirmSave => "ConfirmSave",
            Self::RampTest => "RampTest",
            Self::Manual => "Manual",
        }
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Phase (state + payload)
// ---------------------------------------------------------------------------

pub enum Phase {
    /// Load the persisted calibration and route on the result.
    Boot,
    /// A valid record was loaded; ask whether to recalibrate.
    AwaitRecalibrate {
        /// When the prompt was (re-)issued, for the timeout.
        since_ms: u32,
        reader: LineReader,
    },
    /// Threshold search. `cw_limit` is set once the CW pass is done.
    Calibrate {
        search: SearchState,
        cw_limit: Option<u16>,
    },
    /// Ask whether to persist the fresh calibration.
    ConfirmSave,
    /// Ramp regression over the calibration in effect.
    RampTest { ramp: RampState },
    /// Terminal manual twitch mode.
    Manual { controller: ManualController },
}

impl Phase {
    pub fn id(&self) -> PhaseId {
        match self {
            Self::Boot => PhaseId::Boot,
            Self::AwaitRecalibrate { .. } => PhaseId::AwaitRecalibrate,
            Self::Calibrate { .. } => PhaseId::Calibrate,
            Self::ConfirmSave => PhaseId::ConfirmSave,
            Self::RampTest { .. } => PhaseId::RampTest,
            Self::Manual { .. } => PhaseId::Manual,
        }
    }

    pub fn await_recalibrate(now_ms: u32) -> Self {
        Self::AwaitRecalibrate {
            since_ms: now_ms,
            reader: LineReader::new(),
        }
    }

    /// Fresh calibration, starting with the CW direction.
    pub fn calibrate(config: &ServoConfig) -> Self {
        Self::Calibrate {
            search: SearchState::new(Rotation::Cw, config),
            cw_limit: None,
        }
    }

    pub fn ramp_test(config: &ServoConfig) -> Self {
        Self::RampTest {
            ramp: RampState::new(config),
        }
    }

    pub fn manual(config: &ServoConfig) -> Self {
        Self::Manual {
            controller: ManualController::new(config),
        }
    }
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The phase machine engine.
///
/// Owns the current [`Phase`] and threads a mutable [`SessionContext`]
/// through every handler call.
pub struct Fsm {
    phase: Phase,
    /// Monotonically increasing tick counter.
    tick_count: u64,
    /// Tick at which the current phase was entered.
    phase_entry_tick: u64,
}

impl Fsm {
    pub fn new(initial: Phase) -> Self {
        Self {
            phase: initial,
            tick_count: 0,
            phase_entry_tick: 0,
        }
    }

    /// Run the enter action of the starting phase.
    /// Call once after construction, before the first `tick()`.
    pub fn start(
        &mut self,
        ctx: &mut SessionContext,
        hw: &mut impl Rig,
        sink: &mut impl EventSink,
    ) {
        info!("FSM starting in phase: {}", self.phase.id());
        states::enter(&mut self.phase, ctx, hw, sink);
    }

    /// Advance the phase machine by one tick.
    pub fn tick(
        &mut self,
        ctx: &mut SessionContext,
        hw: &mut impl Rig,
        store: &mut CalibrationStore<impl ByteStorePort>,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        if let Some(next) = states::update(&mut self.phase, ctx, hw, store, sink) {
            self.transition(next, ctx, hw, sink);
        }
    }

    /// Jump to `next` regardless of what the current handler wants.
    pub fn force_transition(
        &mut self,
        next: Phase,
        ctx: &mut SessionContext,
        hw: &mut impl Rig,
        sink: &mut impl EventSink,
    ) {
        self.transition(next, ctx, hw, sink);
    }

    pub fn current_phase(&self) -> PhaseId {
        self.phase.id()
    }

    pub fn ticks_in_current_phase(&self) -> u64 {
        self.tick_count - self.phase_entry_tick
    }

    fn transition(
        &mut self,
        next: Phase,
        ctx: &mut SessionContext,
        hw: &mut impl Rig,
        sink: &mut impl EventSink,
    ) {
        let from = self.phase.id();
        let to = next.id();
        info!("FSM transition: {} -> {}", from, to);

        states::exit(&self.phase, hw);

        self.phase = next;
        self.phase_entry_tick = self.tick_count;

        sink.emit(&AppEvent::PhaseChanged { from, to });
        states::enter(&mut self.phase, ctx, hw, sink);
    }
}
