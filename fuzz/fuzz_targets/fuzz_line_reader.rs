//! Fuzz target: `LineReader::poll`
//!
//! Drives arbitrary byte sequences through the console line assembler.
//! Every fourth input byte is reinterpreted as a clock step so timeouts
//! fire at arbitrary points.  Lines must stay within capacity and never
//! carry the terminator.
//!
//! cargo fuzz run fuzz_line_reader

#![no_main]

use std::cell::Cell;
use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use tdsprobe::app::ports::{ClockPort, ConsolePort};
use tdsprobe::console::{LineReader, LINE_CAPACITY};

struct Feed(VecDeque<u8>);

impl ConsolePort for Feed {
    fn read_byte(&mut self) -> Option<u8> {
        self.0.pop_front()
    }
    fn write_line(&mut self, _line: &str) {}
}

struct Clock(Cell<u32>);

impl ClockPort for Clock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}

fuzz_target!(|data: &[u8]| {
    let mut reader: LineReader = LineReader::default();
    let clock = Clock(Cell::new(0));
    let mut console = Feed(VecDeque::new());

    for chunk in data.chunks(4) {
        let step = u32::from(chunk[0]) * 8;
        clock.0.set(clock.0.get().wrapping_add(step));
        console.0.extend(&chunk[1..]);

        while let Some(line) = reader.poll(&mut console, &clock) {
            assert!(line.as_bytes().len() <= LINE_CAPACITY);
            assert!(!line.as_bytes().contains(&b'\n'));
            let _ = line.command();
        }
        assert!(reader.pending().len() <= LINE_CAPACITY);
    }
});
