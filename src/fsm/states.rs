//! Phase handlers: enter, update and exit actions for every [`Phase`].
//!
//! Operator-facing text goes to the console port; diagnostics go to
//! `log`. Every handler resolves its own anomalies. Nothing here fails,
//! and a phase that finds no usable calibration falls back to
//! calibrating rather than driving the motor blind.

use log::{info, warn};

use super::Phase;
use super::context::SessionContext;
use crate::app::events::AppEvent;
use crate::app::ports::{ByteStorePort, ConsolePort, EventSink, MotorPort, Rig};
use crate::calibration::search::{Answer, SearchState, SearchStep};
use crate::calibration::store::CalibrationStore;
use crate::calibration::{CalibrationRecord, Rotation, VALID_PULSE_US};
use crate::config::ServoConfig;
use crate::control::operator::{LineAnswer, LineReader, read_answer};
use crate::control::pulse::hold_stop;
use crate::control::ramp::{RampState, RampStep, run_cycle};
use crate::control::twitch::ManualController;

const MOVING_PROMPT: &str = "Is the motor moving? (y/n, ? for help)";
const MOVING_HELP: &str = "y = motor is turning, n = motor is still, ? = repeat this pulse";
const SAVE_PROMPT: &str = "Save calibration? (y/n)";

// ═══════════════════════════════════════════════════════════════════════════
//  Dispatch
// ═══════════════════════════════════════════════════════════════════════════

pub fn enter(
    phase: &mut Phase,
    ctx: &mut SessionContext,
    hw: &mut impl Rig,
    sink: &mut impl EventSink,
) {
    match phase {
        Phase::Boot => {}
        Phase::AwaitRecalibrate { .. } => prompt_recalibrate(hw, &ctx.config),
        Phase::Calibrate { search, .. } => {
            hw.write_line(&format!("Calibrating {} direction", search.direction()));
            issue_probe(hw, search, sink);
        }
        Phase::ConfirmSave => hw.write_line(SAVE_PROMPT),
        Phase::RampTest { .. } => hw.write_line("Starting ramp test"),
        Phase::Manual { .. } => {
            if let Some(record) = ctx.valid_calibration() {
                hold_stop(hw, record.stop);
            }
            hw.write_line("Manual mode: press the CCW or CW button to twitch the motor");
        }
    }
}

pub fn update(
    phase: &mut Phase,
    ctx: &mut SessionContext,
    hw: &mut impl Rig,
    store: &mut CalibrationStore<impl ByteStorePort>,
    sink: &mut impl EventSink,
) -> Option<Phase> {
    match phase {
        Phase::Boot => boot_update(ctx, hw, store, sink),
        Phase::AwaitRecalibrate { since_ms, reader } => {
            await_recalibrate_update(since_ms, reader, ctx, hw)
        }
        Phase::Calibrate { search, cw_limit } => calibrate_update(search, cw_limit, ctx, hw, sink),
        Phase::ConfirmSave => confirm_save_update(ctx, hw, store, sink),
        Phase::RampTest { ramp } => ramp_test_update(ramp, ctx, hw, sink),
        Phase::Manual { controller } => manual_update(controller, ctx, hw, sink),
    }
}

pub fn exit(phase: &Phase, hw: &mut impl Rig) {
    if let Phase::Calibrate { .. } = phase {
        hw.release();
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  BOOT
// ═══════════════════════════════════════════════════════════════════════════

fn boot_update(
    ctx: &mut SessionContext,
    hw: &mut impl Rig,
    store: &mut CalibrationStore<impl ByteStorePort>,
    sink: &mut impl EventSink,
) -> Option<Phase> {
    if let Some(record) = store.load() {
        ctx.calibration = Some(record);
        sink.emit(&AppEvent::CalibrationLoaded(record));
        hw.write_line(&format!("Loaded calibration: {}", record));
        Some(Phase::await_recalibrate(hw.now_ms()))
    } else {
        hw.write_line("No valid calibration data found, starting calibration");
        Some(Phase::calibrate(&ctx.config))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAIT_RECALIBRATE (the only phase with a timeout)
// ═══════════════════════════════════════════════════════════════════════════

fn prompt_recalibrate(hw: &mut impl ConsolePort, config: &ServoConfig) {
    hw.write_line(&format!(
        "Recalibrate? (yes/no, continuing in {} s)",
        config.prompt_timeout_ms / 1000
    ));
}

fn await_recalibrate_update(
    since_ms: &mut u32,
    reader: &mut LineReader,
    ctx: &SessionContext,
    hw: &mut impl Rig,
) -> Option<Phase> {
    while let Some(c) = hw.read_char() {
        match reader.push(c) {
            Some(LineAnswer::Yes) => {
                hw.write_line("Recalibrating");
                return Some(Phase::calibrate(&ctx.config));
            }
            Some(LineAnswer::No) => {
                hw.write_line("Keeping stored calibration");
                return Some(Phase::manual(&ctx.config));
            }
            Some(LineAnswer::Unrecognized) => {
                hw.write_line("Please answer yes or no");
                prompt_recalibrate(hw, &ctx.config);
                *since_ms = hw.now_ms();
            }
            None => {}
        }
    }

    if hw.now_ms().wrapping_sub(*since_ms) >= ctx.config.prompt_timeout_ms {
        info!("AWAIT_RECALIBRATE: prompt timed out");
        hw.write_line("No answer, keeping stored calibration");
        return Some(Phase::manual(&ctx.config));
    }

    hw.delay_ms(ctx.config.input_poll_ms);
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  CALIBRATE (one operator answer per tick)
// ═══════════════════════════════════════════════════════════════════════════

fn issue_probe(
    hw: &mut (impl MotorPort + ConsolePort),
    search: &SearchState,
    sink: &mut impl EventSink,
) {
    let pulse_us = search.probe_us();
    let rotation = search.direction();
    if !VALID_PULSE_US.contains(&pulse_us) {
        warn!("CALIBRATE: probe {} us lies outside the valid range", pulse_us);
    }
    hw.set_pulse(pulse_us);
    hw.write_line(&format!(
        "{} {}: {} us",
        rotation,
        search.phase().label(),
        pulse_us
    ));
    hw.write_line(MOVING_PROMPT);
    sink.emit(&AppEvent::ProbeIssued { rotation, pulse_us });
}

fn calibrate_update(
    search: &mut SearchState,
    cw_limit: &mut Option<u16>,
    ctx: &mut SessionContext,
    hw: &mut impl Rig,
    sink: &mut impl EventSink,
) -> Option<Phase> {
    let answer = read_answer(hw, ctx.config.input_poll_ms);

    match search.answer(answer) {
        SearchStep::Repeat => {
            hw.write_line(MOVING_HELP);
            issue_probe(hw, search, sink);
            None
        }
        SearchStep::Moved { .. } => {
            hw.release();
            issue_probe(hw, search, sink);
            None
        }
        SearchStep::Still { .. } => {
            issue_probe(hw, search, sink);
            None
        }
        SearchStep::Found { limit } => {
            hw.release();
            let rotation = search.direction();
            info!("CALIBRATE: {} limit {} us", rotation, limit);
            hw.write_line(&format!("{} limit: {} us", rotation, limit));
            sink.emit(&AppEvent::LimitFound {
                rotation,
                pulse_us: limit,
            });

            match (rotation, *cw_limit) {
                (Rotation::Cw, _) => {
                    *cw_limit = Some(limit);
                    *search = SearchState::new(Rotation::Ccw, &ctx.config);
                    hw.write_line("Calibrating CCW direction");
                    issue_probe(hw, search, sink);
                    None
                }
                (Rotation::Ccw, Some(cw)) => finish_calibration(cw, limit, ctx, hw, sink),
                (Rotation::Ccw, None) => {
                    warn!("CALIBRATE: CCW pass finished without a CW limit, restarting");
                    Some(Phase::calibrate(&ctx.config))
                }
            }
        }
    }
}

fn finish_calibration(
    cw_limit: u16,
    ccw_limit: u16,
    ctx: &mut SessionContext,
    hw: &mut impl ConsolePort,
    sink: &mut impl EventSink,
) -> Option<Phase> {
    let record = CalibrationRecord::from_limits(cw_limit, ccw_limit);
    if let Err(e) = record.validate() {
        warn!("CALIBRATE: result rejected ({})", e);
        hw.write_line(&format!("Calibration invalid ({}), starting over", e));
        return Some(Phase::calibrate(&ctx.config));
    }

    ctx.calibration = Some(record);
    sink.emit(&AppEvent::CalibrationComplete(record));
    hw.write_line(&format!("Calibration complete: {}", record));
    match serde_json::to_string(&record) {
        Ok(json) => hw.write_line(&json),
        Err(e) => warn!("CALIBRATE: summary encode failed ({})", e),
    }
    Some(Phase::ConfirmSave)
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONFIRM_SAVE
// ═══════════════════════════════════════════════════════════════════════════

fn confirm_save_update(
    ctx: &SessionContext,
    hw: &mut impl Rig,
    store: &mut CalibrationStore<impl ByteStorePort>,
    sink: &mut impl EventSink,
) -> Option<Phase> {
    let Some(record) = ctx.valid_calibration() else {
        warn!("CONFIRM_SAVE: no valid calibration, recalibrating");
        return Some(Phase::calibrate(&ctx.config));
    };

    match read_answer(hw, ctx.config.input_poll_ms) {
        Answer::Repeat => {
            hw.write_line(SAVE_PROMPT);
            None
        }
        Answer::Yes => {
            store.save(&record);
            sink.emit(&AppEvent::CalibrationSaved(record));
            hw.write_line("Calibration saved");
            Some(Phase::ramp_test(&ctx.config))
        }
        Answer::No => {
            hw.write_line("Calibration not saved");
            Some(Phase::ramp_test(&ctx.config))
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  RAMP_TEST (one full cycle per tick)
// ═══════════════════════════════════════════════════════════════════════════

fn ramp_test_update(
    ramp: &mut RampState,
    ctx: &SessionContext,
    hw: &mut impl Rig,
    sink: &mut impl EventSink,
) -> Option<Phase> {
    let Some(record) = ctx.valid_calibration() else {
        warn!("RAMP_TEST: no valid calibration, recalibrating");
        return Some(Phase::calibrate(&ctx.config));
    };

    run_cycle(hw, &record, ramp, &ctx.config);
    sink.emit(&AppEvent::RampCycle {
        step_delay_ms: ramp.step_delay_ms(),
        direction: ramp.direction(),
    });

    match ramp.advance(&ctx.config) {
        RampStep::Continue => None,
        RampStep::Complete => {
            info!("RAMP_TEST: complete");
            hw.write_line("Ramp test complete");
            sink.emit(&AppEvent::RampComplete);
            Some(Phase::manual(&ctx.config))
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  MANUAL (terminal)
// ═══════════════════════════════════════════════════════════════════════════

fn manual_update(
    controller: &mut ManualController,
    ctx: &SessionContext,
    hw: &mut impl Rig,
    sink: &mut impl EventSink,
) -> Option<Phase> {
    let Some(record) = ctx.valid_calibration() else {
        warn!("MANUAL: no valid calibration, recalibrating");
        return Some(Phase::calibrate(&ctx.config));
    };

    for rotation in controller.poll(hw, &record) {
        sink.emit(&AppEvent::Twitch {
            rotation,
            pulse_us: record.limit(rotation),
        });
    }
    hw.delay_ms(ctx.config.manual_poll_ms);
    None
}
