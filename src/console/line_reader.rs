//! Bounded command-line accumulator.
//!
//! Bytes arrive one at a time from the console.  The reader collects them
//! into a fixed-capacity buffer and yields a [`CommandLine`] when:
//!
//! - a `\n` arrives, or
//! - a byte arrives while the buffer is already full (forced completion;
//!   that byte is consumed, never stored).
//!
//! A gap longer than the timeout between two bytes abandons the partial
//! line before the new byte is handled, so a half-typed command from
//! minutes ago cannot prefix the next one.  Completed lines are uppercased.
//!
//! No heap: the buffer is a `heapless::Vec` sized at compile time.

use heapless::Vec;
use log::debug;

use crate::app::commands::Command;
use crate::app::ports::{ClockPort, ConsolePort};

/// Maximum stored bytes per line.
pub const LINE_CAPACITY: usize = 15;

/// Inter-byte gap after which a partial line is dropped.
pub const LINE_TIMEOUT_MS: u32 = 500;

/// One completed, uppercased console line (terminator excluded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine<const N: usize = LINE_CAPACITY> {
    bytes: Vec<u8, N>,
}

impl<const N: usize> CommandLine<N> {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Classify this line.  The returned command borrows the payload text.
    pub fn command(&self) -> Command<'_> {
        Command::parse(&self.bytes)
    }
}

/// Streaming line assembler.
pub struct LineReader<const N: usize = LINE_CAPACITY> {
    buf: Vec<u8, N>,
    last_rx_ms: u32,
    timeout_ms: u32,
}

impl<const N: usize> Default for LineReader<N> {
    fn default() -> Self {
        Self::new(LINE_TIMEOUT_MS)
    }
}

impl<const N: usize> LineReader<N> {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            buf: Vec::new(),
            last_rx_ms: 0,
            timeout_ms,
        }
    }

    /// Drain the console until a line completes or no bytes remain.
    ///
    /// Bytes after a completed line stay queued in the console for the
    /// next call.  Never blocks.
    pub fn poll(
        &mut self,
        console: &mut impl ConsolePort,
        clock: &impl ClockPort,
    ) -> Option<CommandLine<N>> {
        while let Some(byte) = console.read_byte() {
            let now = clock.now_ms();
            if now.wrapping_sub(self.last_rx_ms) > self.timeout_ms {
                if !self.buf.is_empty() {
                    debug!(
                        "console: dropping stale partial line ({} bytes)",
                        self.buf.len()
                    );
                }
                self.buf.clear();
            }
            self.last_rx_ms = now;

            if byte == b'\n' || self.buf.is_full() {
                return Some(self.take_line());
            }
            // Cannot fail: fullness was checked above.
            let _ = self.buf.push(byte);
        }
        None
    }

    /// Bytes of the line currently being assembled.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    fn take_line(&mut self) -> CommandLine<N> {
        self.buf.make_ascii_uppercase();
        let line = CommandLine {
            bytes: self.buf.clone(),
        };
        self.buf.clear();
        line
    }
}
