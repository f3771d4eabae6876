//! ServoCal firmware library.
//!
//! Calibrates a continuous-rotation servo interactively, persists the
//! result, exercises it with a ramp regression test, and then hands the
//! motor to two manual twitch buttons.
//!
//! Exposes the pure-logic modules for integration testing. All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module, with a host simulation branch beside it.

#![deny(unused_must_use)]

pub mod app;
pub mod calibration;
pub mod config;
pub mod control;
pub mod error;
pub mod fsm;

pub mod adapters;
pub mod drivers;

pub mod pins;
