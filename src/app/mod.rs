//! Application core: session orchestration with no direct I/O.
//!
//! This module ties the phase machine, calibration search, ramp tester
//! and manual controller together. All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without a servo attached.

pub mod events;
pub mod ports;
pub mod service;
