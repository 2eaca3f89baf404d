//! Serial console adapter.
//!
//! Implements [`ConsolePort`] over the console UART.  Reads never block:
//! a byte is returned only if the UART driver already holds one.  Output
//! goes to stdout, which ESP-IDF routes to the same UART.
//!
//! On non-espidf targets, input is a scripted byte queue and output is
//! captured for inspection.

use crate::app::ports::ConsolePort;

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

#[derive(Default)]
pub struct UartConsole {
    #[cfg(not(target_os = "espidf"))]
    input: VecDeque<u8>,
    #[cfg(not(target_os = "espidf"))]
    output: Vec<String>,
}

impl UartConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes as if they had arrived on the wire.
    #[cfg(not(target_os = "espidf"))]
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    /// Lines written so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn output(&self) -> &[String] {
        &self.output
    }
}

impl ConsolePort for UartConsole {
    #[cfg(target_os = "espidf")]
    fn read_byte(&mut self) -> Option<u8> {
        crate::drivers::hw_init::console_read_byte()
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    #[cfg(target_os = "espidf")]
    fn write_line(&mut self, line: &str) {
        println!("{}", line);
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_line(&mut self, line: &str) {
        self.output.push(line.to_owned());
    }
}
