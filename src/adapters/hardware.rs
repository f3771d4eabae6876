//! Hardware adapter: bridges real peripherals to the domain port traits.
//!
//! Owns the servo, indicator, console and clock, exposing them through
//! every per-tick port so the session can take a single `&mut impl Rig`.
//! This is the only module in the system that touches actual hardware.
//! On non-espidf targets the underlying drivers use cfg-gated simulation
//! stubs.

use embedded_hal::delay::DelayNs;

use crate::adapters::console::UartConsole;
use crate::adapters::time::Esp32TimeAdapter;
use crate::app::ports::{ClockPort, ConsolePort, IndicatorPort, InputPort, MotorPort};
use crate::calibration::Rotation;
use crate::drivers::hw_init;
use crate::drivers::servo::ServoDriver;
use crate::drivers::status_led::StatusLed;
use crate::pins;

/// Concrete adapter that combines all per-tick hardware behind port traits.
pub struct HardwareAdapter {
    servo: ServoDriver,
    led: StatusLed,
    console: UartConsole,
    time: Esp32TimeAdapter,
}

impl HardwareAdapter {
    pub fn new(
        servo: ServoDriver,
        led: StatusLed,
        console: UartConsole,
        time: Esp32TimeAdapter,
    ) -> Self {
        Self {
            servo,
            led,
            console,
            time,
        }
    }

    pub fn console_mut(&mut self) -> &mut UartConsole {
        &mut self.console
    }

    pub fn servo(&self) -> &ServoDriver {
        &self.servo
    }

    pub fn led(&self) -> &StatusLed {
        &self.led
    }
}

// ── MotorPort ─────────────────────────────────────────────────

impl MotorPort for HardwareAdapter {
    fn set_pulse(&mut self, pulse_us: u16) {
        self.servo.set_pulse(pulse_us);
    }

    fn release(&mut self) {
        self.servo.release();
    }
}

// ── IndicatorPort ─────────────────────────────────────────────

impl IndicatorPort for HardwareAdapter {
    fn set_indicator(&mut self, on: bool) {
        self.led.set(on);
    }
}

// ── ConsolePort ───────────────────────────────────────────────

impl ConsolePort for HardwareAdapter {
    fn read_char(&mut self) -> Option<char> {
        self.console.read_char()
    }

    fn write_line(&mut self, line: &str) {
        self.console.write_line(line);
    }
}

// ── InputPort ─────────────────────────────────────────────────

impl InputPort for HardwareAdapter {
    fn read_pin(&mut self, rotation: Rotation) -> bool {
        let pin = match rotation {
            Rotation::Ccw => pins::BUTTON_CCW_GPIO,
            Rotation::Cw => pins::BUTTON_CW_GPIO,
        };
        hw_init::gpio_read(pin)
    }
}

// ── Clock / delay ─────────────────────────────────────────────

impl ClockPort for HardwareAdapter {
    fn now_ms(&self) -> u32 {
        self.time.now_ms()
    }
}

impl DelayNs for HardwareAdapter {
    fn delay_ns(&mut self, ns: u32) {
        self.time.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.time.delay_ms(ms);
    }
}
