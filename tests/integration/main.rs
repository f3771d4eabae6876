//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises a whole session phase
//! against mock adapters. All tests run on the host (x86_64) with no
//! real hardware required.

mod calibration_flow_tests;
mod mock_hw;
