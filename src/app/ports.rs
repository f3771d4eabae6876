//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (servo output, indicator, console, buttons, storage,
//! event sinks) implement these traits. The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly.
//!
//! Blocking waits go through [`embedded_hal::delay::DelayNs`]; during a
//! wait nothing is sampled, which is the intended single-device model.

use embedded_hal::delay::DelayNs;

use crate::calibration::Rotation;

// ───────────────────────────────────────────────────────────────
// Motor port (driven adapter: domain → servo)
// ───────────────────────────────────────────────────────────────

/// Pulse-width output to the servo.
pub trait MotorPort {
    /// Command a pulse width in microseconds. Idempotent, effective
    /// immediately, held until the next command.
    fn set_pulse(&mut self, pulse_us: u16);

    /// Cut the pulse output entirely (motor free-wheels).
    fn release(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LED / buzzer)
// ───────────────────────────────────────────────────────────────

pub trait IndicatorPort {
    fn set_indicator(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Console port (driven adapter: domain ↔ serial line)
// ───────────────────────────────────────────────────────────────

/// Character-in, line-out operator console.
pub trait ConsolePort {
    /// Next received character, if one is waiting. Never blocks.
    fn read_char(&mut self) -> Option<char>;

    /// Emit one human-readable status line.
    fn write_line(&mut self, line: &str);
}

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: buttons → domain)
// ───────────────────────────────────────────────────────────────

/// Raw digital input sampling for the two manual buttons.
pub trait InputPort {
    /// Raw electrical level of the button for `rotation`
    /// (`true` = high = released, buttons are active-low).
    fn read_pin(&mut self, rotation: Rotation) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Milliseconds since boot, monotonic, wrapping at `u32::MAX`.
    fn now_ms(&self) -> u32;
}

/// Everything a phase handler touches on a single tick, bundled so call
/// sites can write `hw: &mut impl Rig`.
pub trait Rig: MotorPort + IndicatorPort + ConsolePort + InputPort + ClockPort + DelayNs {}

impl<T> Rig for T where T: MotorPort + IndicatorPort + ConsolePort + InputPort + ClockPort + DelayNs {}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Byte store port (driven adapter: domain ↔ EEPROM / NVS)
// ───────────────────────────────────────────────────────────────

/// Address-based persistent byte store (EEPROM semantics).
///
/// No atomicity is promised: a power loss between writes may leave a
/// torn record, which the record decoder rejects on the next load.
pub trait ByteStorePort {
    /// Fill `buf` with the bytes starting at `addr`.
    fn read(&self, addr: u16, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` starting at `addr`.
    fn write(&mut self, addr: u16, data: &[u8]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ByteStorePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The requested span runs past the end of the store.
    OutOfBounds,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "address out of bounds"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
