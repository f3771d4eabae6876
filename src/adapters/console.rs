//! Operator console adapter.
//!
//! Implements [`ConsolePort`] over the console UART. Input is consumed a
//! byte at a time without blocking; output is written as CRLF-terminated
//! lines.
//!
//! On host targets the UART is replaced by an in-memory queue that can
//! be fed with [`UartConsole::feed`], and written lines are kept for
//! inspection and echoed to the log.

use crate::app::ports::ConsolePort;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

pub struct UartConsole {
    #[cfg(not(target_os = "espidf"))]
    input: VecDeque<char>,
    #[cfg(not(target_os = "espidf"))]
    output: Vec<String>,
}

impl Default for UartConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl UartConsole {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            input: VecDeque::new(),
            #[cfg(not(target_os = "espidf"))]
            output: Vec::new(),
        }
    }

    /// Queue characters as if typed by the operator.
    #[cfg(not(target_os = "espidf"))]
    pub fn feed(&mut self, text: &str) {
        self.input.extend(text.chars());
    }

    /// Lines written so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn output(&self) -> &[String] {
        &self.output
    }
}

impl ConsolePort for UartConsole {
    #[cfg(target_os = "espidf")]
    fn read_char(&mut self) -> Option<char> {
        hw_init::uart_read_byte().map(char::from)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_char(&mut self) -> Option<char> {
        self.input.pop_front()
    }

    #[cfg(target_os = "espidf")]
    fn write_line(&mut self, line: &str) {
        hw_init::uart_write(line.as_bytes());
        hw_init::uart_write(b"\r\n");
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_line(&mut self, line: &str) {
        log::debug!("console(sim): {}", line);
        self.output.push(line.to_owned());
    }
}
