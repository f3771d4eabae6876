//! Operator input over the character console.
//!
//! Two input styles exist:
//!
//! - **Single-key answers** ([`read_answer`]) during calibration and the
//!   save decision: `y`, `n` or `?`, case-insensitive. Every other
//!   character is dropped on the floor and never reaches the state machine.
//! - **Line answers** ([`LineReader`]) for the startup "recalibrate?"
//!   prompt: a whole word terminated by CR or LF, so a stray keystroke
//!   cannot trigger a full recalibration by accident.

use embedded_hal::delay::DelayNs;
use heapless::String;

use crate::app::ports::ConsolePort;
use crate::calibration::search::Answer;

/// Longest accepted prompt line; anything longer is unrecognized.
pub const LINE_CAPACITY: usize = 16;

/// Busy-poll the console until a `y`/`n`/`?` arrives. No timeout: an
/// absent operator stalls here indefinitely.
pub fn read_answer(hw: &mut (impl ConsolePort + DelayNs), poll_ms: u32) -> Answer {
    loop {
        match hw.read_char() {
            Some(c) => {
                if let Some(answer) = Answer::from_char(c) {
                    return answer;
                }
            }
            None => hw.delay_ms(poll_ms),
        }
    }
}

/// Parsed result of one prompt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAnswer {
    Yes,
    No,
    Unrecognized,
}

/// Accumulates characters into a yes/no line answer.
#[derive(Debug, Clone, Default)]
pub struct LineReader {
    buf: String<LINE_CAPACITY>,
    overflow: bool,
}

impl LineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one character. Returns an answer when a non-empty line is
    /// terminated; empty lines are ignored.
    pub fn push(&mut self, c: char) -> Option<LineAnswer> {
        if c == '\r' || c == '\n' {
            let answer = if self.overflow {
                Some(LineAnswer::Unrecognized)
            } else {
                parse_line(&self.buf)
            };
            self.buf.clear();
            self.overflow = false;
            return answer;
        }
        if self.buf.push(c).is_err() {
            self.overflow = true;
        }
        None
    }
}

fn parse_line(line: &str) -> Option<LineAnswer> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let answer = if line.eq_ignore_ascii_case("y") || line.eq_ignore_ascii_case("yes") {
        LineAnswer::Yes
    } else if line.eq_ignore_ascii_case("n") || line.eq_ignore_ascii_case("no") {
        LineAnswer::No
    } else {
        LineAnswer::Unrecognized
    };
    Some(answer)
}
