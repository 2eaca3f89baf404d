//! Mock adapters for integration tests.
//!
//! Records console output, EEPROM writes and emitted events so tests can
//! assert on the full history without touching real peripherals.

use std::cell::Cell;
use std::collections::VecDeque;

use tdsprobe::app::events::AppEvent;
use tdsprobe::app::ports::{
    AnalogPort, ClockPort, ConsolePort, EepromPort, EventSink, StorageError,
};

// ── MockProbe ─────────────────────────────────────────────────

/// ADC + clock.  The sample and the time are set by the test.
pub struct MockProbe {
    pub raw: u16,
    now_ms: Cell<u32>,
}

#[allow(dead_code)]
impl MockProbe {
    pub fn new(raw: u16) -> Self {
        Self {
            raw,
            now_ms: Cell::new(0),
        }
    }

    pub fn set_time(&self, ms: u32) {
        self.now_ms.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.now_ms.set(self.now_ms.get().wrapping_add(ms));
    }
}

impl AnalogPort for MockProbe {
    fn read_raw(&mut self) -> u16 {
        self.raw
    }
}

impl ClockPort for MockProbe {
    fn now_ms(&self) -> u32 {
        self.now_ms.get()
    }
}

// ── MockConsole ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockConsole {
    pub input: VecDeque<u8>,
    pub output: Vec<String>,
}

#[allow(dead_code)]
impl MockConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, text: &str) {
        self.input.extend(text.bytes());
    }

    pub fn printed(&self, line: &str) -> bool {
        self.output.iter().any(|l| l == line)
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }
}

impl ConsolePort for MockConsole {
    fn read_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn write_line(&mut self, line: &str) {
        self.output.push(line.to_owned());
    }
}

// ── MockEeprom ────────────────────────────────────────────────

pub struct MockEeprom {
    pub cells: Vec<u8>,
    pub fail_writes: bool,
    pub writes: usize,
}

#[allow(dead_code)]
impl MockEeprom {
    pub fn erased(size: usize) -> Self {
        Self {
            cells: vec![0xFF; size],
            fail_writes: false,
            writes: 0,
        }
    }

    pub fn slot(&self, address: usize) -> [u8; 4] {
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.cells[address..address + 4]);
        out
    }
}

impl EepromPort for MockEeprom {
    fn capacity(&self) -> usize {
        self.cells.len()
    }

    fn read(&self, address: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        let cells = self
            .cells
            .get(address..address + buf.len())
            .ok_or(StorageError::OutOfBounds {
                address,
                len: buf.len(),
            })?;
        buf.copy_from_slice(cells);
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::CommitFailed);
        }
        let cells = self
            .cells
            .get_mut(address..address + data.len())
            .ok_or(StorageError::OutOfBounds {
                address,
                len: data.len(),
            })?;
        cells.copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
