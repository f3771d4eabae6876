//! GPIO / peripheral pin assignments for the servo calibration board.
//!
//! Single source of truth: every driver references this module rather
//! than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Servo output (continuous-rotation servo signal line)
// ---------------------------------------------------------------------------

/// LEDC PWM output carrying the servo pulse train.
pub const SERVO_PWM_GPIO: i32 = 4;

/// Servo frame rate. One pulse every 20 ms.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// Frame period in microseconds, for duty conversion.
pub const SERVO_PERIOD_US: u32 = 1_000_000 / SERVO_PWM_FREQ_HZ;
/// LEDC timer resolution (bits). 14 bits gives ~1.2 us per count at 50 Hz.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;

// ---------------------------------------------------------------------------
// Indicator (discrete LED, active HIGH)
// ---------------------------------------------------------------------------

pub const INDICATOR_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Manual buttons (active-low with internal pull-up)
// ---------------------------------------------------------------------------

pub const BUTTON_CCW_GPIO: i32 = 5;
pub const BUTTON_CW_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Operator console (UART)
// ---------------------------------------------------------------------------

pub const CONSOLE_UART: i32 = 0;
pub const UART_TX_GPIO: i32 = 43;
pub const UART_RX_GPIO: i32 = 44;
pub const UART_BAUD: i32 = 115_200;
/// Driver RX ring buffer size in bytes.
pub const UART_RX_BUFFER: i32 = 256;
