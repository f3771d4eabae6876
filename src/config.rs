//! System configuration parameters
//!
//! All tunable parameters for the calibration session. The defaults are
//! the values the search, ramp and twitch logic are specified against;
//! overriding them is only meant for bench experiments.

use serde::{Deserialize, Serialize};

use crate::calibration::VALID_PULSE_US;
use crate::error::ConfigError;

/// Core session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    // --- Pulse ---
    /// Theoretical hold pulse, probed first in every direction (µs)
    pub neutral_us: u16,

    // --- Search ---
    /// Coarse scan increment away from neutral (µs)
    pub coarse_step_us: u16,
    /// Fine scan increment back toward neutral (µs)
    pub fine_step_us: u16,

    // --- Ramp regression ---
    /// Move/stop pairs per direction in one ramp cycle
    pub ramp_repeat_count: u16,
    /// Step delay change per ramp cycle (ms)
    pub ramp_step_ms: u32,
    /// Starting and lower bound of the ramp (ms)
    pub ramp_min_ms: u32,
    /// Upper bound of the ramp (ms)
    pub ramp_max_ms: u32,
    /// Pause after every ramp cycle (ms)
    pub ramp_pause_ms: u32,

    // --- Manual mode ---
    /// Duration of one twitch pulse (ms)
    pub twitch_ms: u32,
    /// Stable time before a button edge is accepted (ms)
    pub debounce_ms: u32,

    // --- Timing ---
    /// Timeout of the initial "recalibrate?" prompt (ms)
    pub prompt_timeout_ms: u32,
    /// Sleep between console polls while waiting for the operator (ms)
    pub input_poll_ms: u32,
    /// Sleep between manual-mode control passes (ms)
    pub manual_poll_ms: u32,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            // Pulse
            neutral_us: 1500,

            // Search
            coarse_step_us: 10,
            fine_step_us: 1,

            // Ramp
            ramp_repeat_count: 10,
            ramp_step_ms: 25,
            ramp_min_ms: 100,
            ramp_max_ms: 500,
            ramp_pause_ms: 3000,

            // Manual mode
            twitch_ms: 100,
            debounce_ms: 50,

            // Timing
            prompt_timeout_ms: 10_000,
            input_poll_ms: 10,
            manual_poll_ms: 5,
        }
    }
}

impl ServoConfig {
    /// Parse a JSON override and validate it. Fields missing from the
    /// document keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check every field. Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_PULSE_US.contains(&self.neutral_us) {
            return Err(ConfigError::ValidationFailed(
                "neutral_us must lie inside the pulse range",
            ));
        }
        if !(1..=100).contains(&self.coarse_step_us) {
            return Err(ConfigError::ValidationFailed("coarse_step_us must be 1–100"));
        }
        if self.fine_step_us == 0 || self.fine_step_us > self.coarse_step_us {
            return Err(ConfigError::ValidationFailed(
                "fine_step_us must be 1..=coarse_step_us",
            ));
        }
        if self.ramp_repeat_count == 0 {
            return Err(ConfigError::ValidationFailed("ramp_repeat_count must be > 0"));
        }
        if self.ramp_step_ms == 0 || self.ramp_step_ms > self.ramp_min_ms {
            return Err(ConfigError::ValidationFailed(
                "ramp_step_ms must be 1..=ramp_min_ms",
            ));
        }
        if self.ramp_min_ms >= self.ramp_max_ms {
            return Err(ConfigError::ValidationFailed(
                "ramp_min_ms must be < ramp_max_ms",
            ));
        }
        if !(10..=1000).contains(&self.twitch_ms) {
            return Err(ConfigError::ValidationFailed("twitch_ms must be 10–1000"));
        }
        if !(5..=500).contains(&self.debounce_ms) {
            return Err(ConfigError::ValidationFailed("debounce_ms must be 5–500"));
        }
        if !(1_000..=120_000).contains(&self.prompt_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "prompt_timeout_ms must be 1000–120000",
            ));
        }
        if self.input_poll_ms == 0 || self.manual_poll_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll intervals must be > 0"));
        }
        if self.manual_poll_ms >= self.debounce_ms {
            return Err(ConfigError::ValidationFailed(
                "manual_poll_ms must be shorter than debounce_ms",
            ));
        }
        Ok(())
    }
}
