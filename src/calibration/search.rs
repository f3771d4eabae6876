//! Coarse-then-fine movement threshold search.
//!
//! ```text
//!  CHECK_NEUTRAL ──[no]──▶ COARSE_SCAN ──[no]──▶ (advance coarse step)
//!        │                     │
//!      [yes]                 [yes]
//!        ▼                     ▼
//!   FINE_SCAN ◀────────────────┘
//!        │
//!      [yes] ──▶ (record, one fine step toward neutral)
//!      [no]  ──▶ FOUND(last confirmed move)
//! ```
//!
//! The engine is pure: it never touches the motor or the console. The
//! caller issues [`SearchState::probe_us`], collects an [`Answer`], and
//! feeds it back through [`SearchState::answer`]. Every `Moved` step means
//! the caller must stop the motor before issuing the next probe.

use log::debug;

use super::Rotation;
use crate::config::ServoConfig;

/// Sub-phase of a single-direction search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    CheckNeutral,
    CoarseScan,
    FineScan,
}

impl SearchPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::CheckNeutral => "neutral check",
            Self::CoarseScan => "coarse scan",
            Self::FineScan => "fine scan",
        }
    }
}

/// Operator response to "is the motor moving?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Repeat,
}

impl Answer {
    /// Map a console character (case-insensitive). Anything other than
    /// `y`, `n` or `?` is not an answer.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'y' => Some(Self::Yes),
            'n' => Some(Self::No),
            '?' => Some(Self::Repeat),
            _ => None,
        }
    }
}

/// Result of feeding one [`Answer`] into the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    /// Re-issue the same probe; nothing changed.
    Repeat,
    /// Movement confirmed: stop the motor, then probe `next`.
    Moved { next: u16 },
    /// No movement: probe `next`.
    Still { next: u16 },
    /// Search over; `limit` is the last pulse that moved the motor.
    Found { limit: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchState {
    direction: Rotation,
    phase: SearchPhase,
    probe_us: u16,
    last_confirmed_move: Option<u16>,
    coarse_step_us: u16,
    fine_step_us: u16,
}

impl SearchState {
    /// Begin a search in `direction`, probing neutral first.
    pub fn new(direction: Rotation, config: &ServoConfig) -> Self {
        Self {
            direction,
            phase: SearchPhase::CheckNeutral,
            probe_us: config.neutral_us,
            last_confirmed_move: None,
            coarse_step_us: config.coarse_step_us,
            fine_step_us: config.fine_step_us,
        }
    }

    pub fn direction(&self) -> Rotation {
        self.direction
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Pulse the operator is currently being asked about.
    pub fn probe_us(&self) -> u16 {
        self.probe_us
    }

    pub fn last_confirmed_move(&self) -> Option<u16> {
        self.last_confirmed_move
    }

    /// Advance the search with the operator's answer for the current probe.
    pub fn answer(&mut self, answer: Answer) -> SearchStep {
        let step = match (self.phase, answer) {
            (_, Answer::Repeat) => SearchStep::Repeat,

            // Movement anywhere before the fine scan: that pulse is the
            // first confirmed move, refine back toward neutral from it.
            (SearchPhase::CheckNeutral | SearchPhase::CoarseScan, Answer::Yes) => {
                self.confirm_move();
                self.phase = SearchPhase::FineScan;
                SearchStep::Moved {
                    next: self.probe_us,
                }
            }

            (SearchPhase::CheckNeutral | SearchPhase::CoarseScan, Answer::No) => {
                self.phase = SearchPhase::CoarseScan;
                self.probe_us = self.direction.away(self.probe_us, self.coarse_step_us);
                SearchStep::Still {
                    next: self.probe_us,
                }
            }

            (SearchPhase::FineScan, Answer::Yes) => {
                self.confirm_move();
                SearchStep::Moved {
                    next: self.probe_us,
                }
            }

            // The limit is the edge of the movement band, not the first
            // pulse that stopped.
            (SearchPhase::FineScan, Answer::No) => match self.last_confirmed_move {
                Some(limit) => SearchStep::Found { limit },
                None => {
                    debug_assert!(false, "fine scan entered without a confirmed move");
                    SearchStep::Found {
                        limit: self.probe_us,
                    }
                }
            },
        };

        debug!(
            "search {} {}: {:?} -> {:?}",
            self.direction,
            self.phase.label(),
            answer,
            step
        );
        step
    }

    fn confirm_move(&mut self) {
        self.last_confirmed_move = Some(self.probe_us);
        self.probe_us = self.direction.toward(self.probe_us, self.fine_step_us);
    }
}
