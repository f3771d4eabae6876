//! Mock hardware for integration tests.
//!
//! [`MockRig`] implements every per-tick port on a virtual clock: delays
//! advance time instantly, console input can be scheduled at a given
//! time, buttons follow a press schedule, and every motor/indicator
//! command is recorded so tests can assert on the full history.
//!
//! An optional [`SimServo`] plays the operator during calibration: each
//! time the "is the motor moving?" prompt is printed it answers from the
//! pulse currently applied.

#![allow(dead_code)]

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use servocal::app::events::AppEvent;
use servocal::app::ports::{
    ByteStorePort, ClockPort, ConsolePort, EventSink, IndicatorPort, InputPort, MotorPort,
    StorageError,
};
use servocal::calibration::Rotation;

/// Consecutive empty console reads after which the script is deemed
/// exhausted and the test fails instead of spinning forever.
const MAX_EMPTY_READS: u32 = 200_000;

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    SetPulse(u16),
    Release,
    Indicator(bool),
    Delay(u32),
}

// ── Simulated servo / operator ────────────────────────────────

/// A servo that turns CW for pulses at or above `cw_threshold` and CCW at
/// or below `ccw_threshold`, watched by a truthful operator.
#[derive(Debug, Clone, Copy)]
pub struct SimServo {
    pub cw_threshold: u16,
    pub ccw_threshold: u16,
}

impl SimServo {
    pub fn moving(&self, pulse: Option<u16>) -> bool {
        pulse.is_some_and(|p| p >= self.cw_threshold || p <= self.ccw_threshold)
    }
}

/// Interval during which a button pin reads LOW.
#[derive(Debug, Clone, Copy)]
pub struct Press {
    pub rotation: Rotation,
    pub from_ms: u32,
    pub until_ms: u32,
}

// ── MockRig ───────────────────────────────────────────────────

pub struct MockRig {
    pub calls: Vec<Call>,
    pub lines: Vec<String>,
    now_ms: u32,
    pulse: Option<u16>,
    input: VecDeque<(u32, char)>,
    servo: Option<SimServo>,
    /// One-shot replies: when a written line contains the trigger, the
    /// reply is typed immediately. Consumed in order.
    replies: VecDeque<(String, String)>,
    presses: Vec<Press>,
    empty_reads: u32,
}

impl MockRig {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            lines: Vec::new(),
            now_ms: 0,
            pulse: None,
            input: VecDeque::new(),
            servo: None,
            replies: VecDeque::new(),
            presses: Vec::new(),
            empty_reads: 0,
        }
    }

    pub fn with_servo(cw_threshold: u16, ccw_threshold: u16) -> Self {
        let mut rig = Self::new();
        rig.servo = Some(SimServo {
            cw_threshold,
            ccw_threshold,
        });
        rig
    }

    /// Type `text` now.
    pub fn feed(&mut self, text: &str) {
        let now = self.now_ms;
        self.feed_at(now, text);
    }

    /// Type `text` once the clock reaches `at_ms`.
    pub fn feed_at(&mut self, at_ms: u32, text: &str) {
        self.input.extend(text.chars().map(|c| (at_ms, c)));
    }

    /// Type `reply` as soon as a line containing `trigger` is printed.
    pub fn reply_on(&mut self, trigger: &str, reply: &str) {
        self.replies.push_back((trigger.to_owned(), reply.to_owned()));
    }

    pub fn press(&mut self, rotation: Rotation, from_ms: u32, until_ms: u32) {
        self.presses.push(Press {
            rotation,
            from_ms,
            until_ms,
        });
    }

    pub fn now(&self) -> u32 {
        self.now_ms
    }

    pub fn pulse(&self) -> Option<u16> {
        self.pulse
    }

    pub fn clear_history(&mut self) {
        self.calls.clear();
        self.lines.clear();
    }

    /// Pulses commanded, in order.
    pub fn pulses(&self) -> Vec<u16> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::SetPulse(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn printed(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    pub fn count_printed(&self, needle: &str) -> usize {
        self.lines.iter().filter(|l| l.contains(needle)).count()
    }
}

impl Default for MockRig {
    fn default() -> Self {
        Self::new()
    }
}

impl MotorPort for MockRig {
    fn set_pulse(&mut self, pulse_us: u16) {
        self.pulse = Some(pulse_us);
        self.calls.push(Call::SetPulse(pulse_us));
    }

    fn release(&mut self) {
        self.pulse = None;
        self.calls.push(Call::Release);
    }
}

impl IndicatorPort for MockRig {
    fn set_indicator(&mut self, on: bool) {
        self.calls.push(Call::Indicator(on));
    }
}

impl ConsolePort for MockRig {
    fn read_char(&mut self) -> Option<char> {
        match self.input.front() {
            Some(&(at, c)) if at <= self.now_ms => {
                self.input.pop_front();
                self.empty_reads = 0;
                Some(c)
            }
            _ => {
                self.empty_reads += 1;
                assert!(
                    self.empty_reads < MAX_EMPTY_READS,
                    "console script exhausted at {} ms; last line: {:?}",
                    self.now_ms,
                    self.lines.last()
                );
                None
            }
        }
    }

    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_owned());

        if line.starts_with("Is the motor moving?") {
            if let Some(servo) = self.servo {
                let answer = if servo.moving(self.pulse) { "y" } else { "n" };
                self.feed(answer);
                return;
            }
        }

        let hit = self
            .replies
            .front()
            .is_some_and(|(trigger, _)| line.contains(trigger.as_str()));
        if hit {
            if let Some((_, reply)) = self.replies.pop_front() {
                self.feed(&reply);
            }
        }
    }
}

impl InputPort for MockRig {
    fn read_pin(&mut self, rotation: Rotation) -> bool {
        let now = self.now_ms;
        !self
            .presses
            .iter()
            .any(|p| p.rotation == rotation && p.from_ms <= now && now < p.until_ms)
    }
}

impl ClockPort for MockRig {
    fn now_ms(&self) -> u32 {
        self.now_ms
    }
}

impl DelayNs for MockRig {
    fn delay_ns(&mut self, ns: u32) {
        self.now_ms = self.now_ms.wrapping_add(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now_ms = self.now_ms.wrapping_add(ms);
        self.calls.push(Call::Delay(ms));
    }
}

// ── MockEeprom ────────────────────────────────────────────────

pub struct MockEeprom {
    pub bytes: Vec<u8>,
    pub writes: usize,
    pub fail_writes: bool,
}

impl MockEeprom {
    pub fn new() -> Self {
        Self {
            bytes: vec![0xFF; 64],
            writes: 0,
            fail_writes: false,
        }
    }

    pub fn with_bytes(image: &[u8]) -> Self {
        let mut eeprom = Self::new();
        eeprom.bytes[..image.len()].copy_from_slice(image);
        eeprom
    }
}

impl Default for MockEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteStorePort for MockEeprom {
    fn read(&self, addr: u16, buf: &mut [u8]) -> Result<(), StorageError> {
        let start = usize::from(addr);
        let src = self
            .bytes
            .get(start..start + buf.len())
            .ok_or(StorageError::OutOfBounds)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn write(&mut self, addr: u16, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        let start = usize::from(addr);
        let dst = self
            .bytes
            .get_mut(start..start + data.len())
            .ok_or(StorageError::OutOfBounds)?;
        dst.copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn has(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
