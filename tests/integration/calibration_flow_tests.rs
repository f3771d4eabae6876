//! End-to-end session tests: boot, the recalibrate prompt, the threshold
//! search, the save decision and the ramp test, all driven through
//! `AppService` against mock hardware on a virtual clock.

use crate::mock_hw::{Call, MockEeprom, MockRig, RecordingSink};

use servocal::app::events::AppEvent;
use servocal::app::service::AppService;
use servocal::calibration::store::{CalibrationStore, RECORD_CAPACITY, encode_record};
use servocal::calibration::{CalibrationRecord, Rotation};
use servocal::config::ServoConfig;
use servocal::fsm::PhaseId;

type Store = CalibrationStore<MockEeprom>;

fn stored(record: &CalibrationRecord) -> MockEeprom {
    let mut buf = [0u8; RECORD_CAPACITY];
    let len = encode_record(record, &mut buf).unwrap();
    MockEeprom::with_bytes(&buf[..len])
}

fn boot(hw: &mut MockRig, eeprom: MockEeprom) -> (AppService, Store, RecordingSink) {
    let mut app = AppService::new(ServoConfig::default());
    let store = CalibrationStore::new(eeprom);
    let mut sink = RecordingSink::new();
    app.start(hw, &mut sink);
    (app, store, sink)
}

fn run_until(
    app: &mut AppService,
    hw: &mut MockRig,
    store: &mut Store,
    sink: &mut RecordingSink,
    target: PhaseId,
    max_ticks: u32,
) {
    for _ in 0..max_ticks {
        if app.phase() == target {
            return;
        }
        app.tick(hw, store, sink);
    }
    assert_eq!(app.phase(), target, "phase not reached in {} ticks", max_ticks);
}

const GOOD: CalibrationRecord = CalibrationRecord {
    cw_limit: 1520,
    ccw_limit: 1480,
    stop: 1500,
};

// ── Fresh device: full calibration ───────────────────────────

#[test]
fn fresh_device_calibrates_saves_ramps_then_goes_manual() {
    let mut hw = MockRig::with_servo(1520, 1480);
    hw.reply_on("Save calibration?", "y");
    let (mut app, mut store, mut sink) = boot(&mut hw, MockEeprom::new());

    run_until(&mut app, &mut hw, &mut store, &mut sink, PhaseId::Manual, 200);

    assert!(hw.printed("No valid calibration data found"));
    assert!(sink.has(&AppEvent::LimitFound {
        rotation: Rotation::Cw,
        pulse_us: 1520
    }));
    assert!(sink.has(&AppEvent::LimitFound {
        rotation: Rotation::Ccw,
        pulse_us: 1480
    }));
    assert!(sink.has(&AppEvent::CalibrationComplete(GOOD)));
    assert!(sink.has(&AppEvent::CalibrationSaved(GOOD)));
    assert!(sink.has(&AppEvent::RampComplete));
    assert_eq!(app.calibration(), Some(GOOD));
    assert_eq!(store.load(), Some(GOOD));
}

#[test]
fn search_probes_follow_coarse_then_fine_pattern() {
    let mut hw = MockRig::with_servo(1520, 1480);
    hw.reply_on("Save calibration?", "n");
    let (mut app, mut store, mut sink) = boot(&mut hw, MockEeprom::new());

    run_until(&mut app, &mut hw, &mut store, &mut sink, PhaseId::ConfirmSave, 50);

    assert_eq!(
        hw.pulses(),
        vec![1500, 1510, 1520, 1519, 1500, 1490, 1480, 1481]
    );
}

#[test]
fn motor_is_released_after_every_confirmed_move() {
    let mut hw = MockRig::with_servo(1520, 1480);
    hw.reply_on("Save calibration?", "n");
    let (mut app, mut store, mut sink) = boot(&mut hw, MockEeprom::new());

    run_until(&mut app, &mut hw, &mut store, &mut sink, PhaseId::ConfirmSave, 50);

    // 1520 moved: released before the fine probe.
    let moved = hw
        .calls
        .iter()
        .position(|c| *c == Call::SetPulse(1520))
        .unwrap();
    assert_eq!(hw.calls[moved + 1], Call::Release);
    assert_eq!(hw.calls[moved + 2], Call::SetPulse(1519));
    assert_eq!(hw.pulse(), None, "motor released once calibration is done");
}

#[test]
fn completion_prints_json_summary() {
    let mut hw = MockRig::with_servo(1520, 1480);
    hw.reply_on("Save calibration?", "n");
    let (mut app, mut store, mut sink) = boot(&mut hw, MockEeprom::new());

    run_until(&mut app, &mut hw, &mut store, &mut sink, PhaseId::ConfirmSave, 50);

    assert!(hw.printed(r#"{"cw_limit":1520,"ccw_limit":1480,"stop":1500}"#));
}

#[test]
fn declining_save_leaves_store_untouched_but_still_ramps() {
    let mut hw = MockRig::with_servo(1520, 1480);
    hw.reply_on("Save calibration?", "n");
    let (mut app, mut store, mut sink) = boot(&mut hw, MockEeprom::new());

    run_until(&mut app, &mut hw, &mut store, &mut sink, PhaseId::Manual, 200);

    assert_eq!(store.storage().writes, 0);
    assert_eq!(store.load(), None);
    assert!(!sink.has(&AppEvent::CalibrationSaved(GOOD)));
    assert!(sink.has(&AppEvent::RampComplete));
    assert_eq!(app.calibration(), Some(GOOD));
}

#[test]
fn save_prompt_help_repeats_prompt() {
    let mut hw = MockRig::with_servo(1520, 1480);
    hw.reply_on("Save calibration?", "?");
    hw.reply_on("Save calibration?", "y");
    let (mut app, mut store, mut sink) = boot(&mut hw, MockEeprom::new());

    run_until(&mut app, &mut hw, &mut store, &mut sink, PhaseId::RampTest, 50);

    assert_eq!(hw.count_printed("Save calibration?"), 2);
    assert_eq!(store.load(), Some(GOOD));
}

#[test]
fn storage_failure_is_not_fatal() {
    let mut hw = MockRig::with_servo(1520, 1480);
    hw.reply_on("Save calibration?", "y");
    let mut eeprom = MockEeprom::new();
    eeprom.fail_writes = true;
    let (mut app, mut store, mut sink) = boot(&mut hw, eeprom);

    run_until(&mut app, &mut hw, &mut store, &mut sink, PhaseId::Manual, 200);

    assert_eq!(store.load(), None);
    assert_eq!(app.calibration(), Some(GOOD));
}

// ── Calibration edge cases ───────────────────────────────────

#[test]
fn help_reissues_same_probe_without_advancing() {
    let mut hw = MockRig::new();
    hw.reply_on("Is the motor moving?", "?");
    let (mut app, mut store, mut sink) = boot(&mut hw, MockEeprom::new());

    app.tick(&mut hw, &mut store, &mut sink); // Boot -> Calibrate, probe 1500
    app.tick(&mut hw, &mut store, &mut sink); // '?' -> same probe again

    assert_eq!(app.phase(), PhaseId::Calibrate);
    assert_eq!(hw.pulses(), vec![1500, 1500]);
    assert!(hw.printed("y = motor is turning"));
}

#[test]
fn garbage_characters_are_ignored_while_waiting_for_answer() {
    let mut hw = MockRig::new();
    hw.reply_on("Is the motor moving?", "x7 N");
    let (mut app, mut store, mut sink) = boot(&mut hw, MockEeprom::new());

    app.tick(&mut hw, &mut store, &mut sink);
    app.tick(&mut hw, &mut store, &mut sink);

    assert_eq!(hw.pulses(), vec![1500, 1510]);
}

#[test]
fn movement_at_neutral_records_neutral_as_limit() {
    let mut hw = MockRig::with_servo(1500, 1480);
    let (mut app, mut store, mut sink) = boot(&mut hw, MockEeprom::new());

    for _ in 0..4 {
        app.tick(&mut hw, &mut store, &mut sink);
    }

    assert!(sink.has(&AppEvent::LimitFound {
        rotation: Rotation::Cw,
        pulse_us: 1500
    }));
}

#[test]
fn out_of_range_limit_restarts_calibration() {
    // CW only moves at 2005 us and beyond, outside the valid range.
    let mut hw = MockRig::with_servo(2005, 1480);
    let (mut app, mut store, mut sink) = boot(&mut hw, MockEeprom::new());

    for _ in 0..200 {
        if hw.count_printed("Calibrating CW direction") == 2 {
            break;
        }
        app.tick(&mut hw, &mut store, &mut sink);
    }

    assert_eq!(hw.count_printed("Calibrating CW direction"), 2);
    assert!(hw.printed("Calibration invalid"));
    assert!(sink.has(&AppEvent::LimitFound {
        rotation: Rotation::Cw,
        pulse_us: 2005
    }));
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::CalibrationComplete(_))),
        0
    );
    assert_eq!(app.phase(), PhaseId::Calibrate);
    assert_eq!(app.calibration(), None);
}

// ── Boot with stored data ────────────────────────────────────

#[test]
fn out_of_range_stored_record_forces_calibration() {
    let bad = CalibrationRecord {
        cw_limit: 2200,
        ccw_limit: 1480,
        stop: 1500,
    };
    let mut hw = MockRig::new();
    let (mut app, mut store, mut sink) = boot(&mut hw, stored(&bad));

    app.tick(&mut hw, &mut store, &mut sink);

    assert_eq!(app.phase(), PhaseId::Calibrate);
    assert!(hw.printed("No valid calibration data found"));
    assert_eq!(app.calibration(), None);
}

#[test]
fn valid_record_prompts_and_times_out_into_manual() {
    let mut hw = MockRig::new();
    let (mut app, mut store, mut sink) = boot(&mut hw, stored(&GOOD));

    run_until(&mut app, &mut hw, &mut store, &mut sink, PhaseId::Manual, 5_000);

    assert!(sink.has(&AppEvent::CalibrationLoaded(GOOD)));
    assert!(hw.printed("Recalibrate?"));
    assert!(hw.now() >= 10_000);
    assert!(hw.now() < 10_100);
    assert_eq!(app.calibration(), Some(GOOD));
    assert!(!sink.has(&AppEvent::RampComplete), "no ramp on the timeout path");
}

#[test]
fn yes_at_prompt_recalibrates() {
    let mut hw = MockRig::new();
    hw.feed("YES\r\n");
    let (mut app, mut store, mut sink) = boot(&mut hw, stored(&GOOD));

    run_until(&mut app, &mut hw, &mut store, &mut sink, PhaseId::Calibrate, 10);

    assert!(hw.now() < 10_000);
}

#[test]
fn no_at_prompt_keeps_stored_record() {
    let mut hw = MockRig::new();
    hw.feed("n\n");
    let (mut app, mut store, mut sink) = boot(&mut hw, stored(&GOOD));

    run_until(&mut app, &mut hw, &mut store, &mut sink, PhaseId::Manual, 10);

    assert_eq!(app.calibration(), Some(GOOD));
    assert_eq!(hw.pulse(), Some(1500), "manual mode holds the stop pulse");
}

#[test]
fn unrecognized_answer_reprompts_and_restarts_timeout() {
    let mut hw = MockRig::new();
    hw.feed_at(8_000, "maybe\r");
    let (mut app, mut store, mut sink) = boot(&mut hw, stored(&GOOD));

    run_until(&mut app, &mut hw, &mut store, &mut sink, PhaseId::Manual, 5_000);

    assert!(hw.printed("Please answer yes or no"));
    assert_eq!(hw.count_printed("Recalibrate?"), 2);
    assert!(hw.now() >= 18_000, "timeout restarted at the rejection");
}

#[test]
fn blank_lines_do_not_restart_timeout() {
    let mut hw = MockRig::new();
    hw.feed_at(8_000, "\r\n\r\n");
    let (mut app, mut store, mut sink) = boot(&mut hw, stored(&GOOD));

    run_until(&mut app, &mut hw, &mut store, &mut sink, PhaseId::Manual, 5_000);

    assert!(!hw.printed("Please answer yes or no"));
    assert!(hw.now() < 10_100);
}

// ── Ramp test ────────────────────────────────────────────────

#[test]
fn ramp_runs_full_sweep_up_and_down() {
    let mut hw = MockRig::with_servo(1520, 1480);
    hw.reply_on("Save calibration?", "n");
    let (mut app, mut store, mut sink) = boot(&mut hw, MockEeprom::new());

    run_until(&mut app, &mut hw, &mut store, &mut sink, PhaseId::Manual, 200);

    let cycles: Vec<u32> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::RampCycle { step_delay_ms, .. } => Some(*step_delay_ms),
            _ => None,
        })
        .collect();
    assert_eq!(cycles.len(), 34);
    assert_eq!(cycles.first(), Some(&100));
    assert_eq!(cycles.last(), Some(&100));
    assert_eq!(cycles.iter().filter(|&&ms| ms == 500).count(), 2);
    assert_eq!(hw.count_printed("Ramp test complete"), 1);
}

#[test]
fn ramp_cycle_alternates_limit_and_stop() {
    let mut hw = MockRig::with_servo(1520, 1480);
    hw.reply_on("Save calibration?", "n");
    let (mut app, mut store, mut sink) = boot(&mut hw, MockEeprom::new());

    run_until(&mut app, &mut hw, &mut store, &mut sink, PhaseId::RampTest, 50);
    hw.clear_history();
    app.tick(&mut hw, &mut store, &mut sink);

    let pulses = hw.pulses();
    assert_eq!(pulses.len(), 40);
    assert!(pulses[..20].chunks(2).all(|p| p == [1520, 1500]));
    assert!(pulses[20..].chunks(2).all(|p| p == [1480, 1500]));
    assert_eq!(hw.calls.last(), Some(&Call::Delay(3_000)));
    assert!(hw.calls.contains(&Call::Indicator(true)));
}
