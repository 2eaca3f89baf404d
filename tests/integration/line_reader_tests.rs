//! Integration tests for console line assembly against the mock console.

use crate::mock_hw::{MockConsole, MockProbe};

use tdsprobe::app::commands::Command;
use tdsprobe::console::{LineReader, LINE_CAPACITY, LINE_TIMEOUT_MS};

fn reader() -> LineReader {
    LineReader::new(LINE_TIMEOUT_MS)
}

#[test]
fn newline_completes_and_uppercases() {
    let (mut r, mut console, clock) = (reader(), MockConsole::new(), MockProbe::new(0));
    console.send("cal:707\n");
    let line = r.poll(&mut console, &clock).expect("line");
    assert_eq!(line.as_bytes(), b"CAL:707");
    assert_eq!(line.command(), Command::Calibrate("707"));
    assert!(r.pending().is_empty());
}

#[test]
fn carriage_return_is_kept_and_ignored_by_the_parser() {
    let (mut r, mut console, clock) = (reader(), MockConsole::new(), MockProbe::new(0));
    console.send("CAL:707\r\n");
    let line = r.poll(&mut console, &clock).expect("line");
    assert_eq!(line.as_bytes(), b"CAL:707\r");
    assert_eq!(line.command(), Command::Calibrate("707\r"));
}

#[test]
fn full_buffer_forces_completion_and_eats_the_trigger_byte() {
    let (mut r, mut console, clock) = (reader(), MockConsole::new(), MockProbe::new(0));
    console.send("ABCDEFGHIJKLMNOPQRS");

    let line = r.poll(&mut console, &clock).expect("forced line");
    assert_eq!(line.as_bytes().len(), LINE_CAPACITY);
    assert_eq!(line.as_bytes(), b"ABCDEFGHIJKLMNO");

    // 'P' triggered completion and is gone; the rest keeps accumulating.
    assert!(r.poll(&mut console, &clock).is_none());
    assert_eq!(r.pending(), b"QRS");
}

#[test]
fn incomplete_line_waits_for_more_bytes() {
    let (mut r, mut console, clock) = (reader(), MockConsole::new(), MockProbe::new(0));
    console.send("ENT");
    assert!(r.poll(&mut console, &clock).is_none());
    console.send("ER\n");
    let line = r.poll(&mut console, &clock).expect("line");
    assert_eq!(line.command(), Command::Enter);
}

#[test]
fn gap_at_the_timeout_is_not_stale() {
    let (mut r, mut console, clock) = (reader(), MockConsole::new(), MockProbe::new(0));
    clock.set_time(1_000);
    console.send("EX");
    assert!(r.poll(&mut console, &clock).is_none());

    clock.advance(LINE_TIMEOUT_MS);
    console.send("IT\n");
    assert_eq!(
        r.poll(&mut console, &clock).expect("line").command(),
        Command::Exit
    );
}

#[test]
fn gap_beyond_the_timeout_drops_the_partial_line() {
    let (mut r, mut console, clock) = (reader(), MockConsole::new(), MockProbe::new(0));
    clock.set_time(1_000);
    console.send("EX");
    assert!(r.poll(&mut console, &clock).is_none());

    clock.advance(LINE_TIMEOUT_MS + 1);
    console.send("IT\n");
    assert_eq!(r.poll(&mut console, &clock).expect("line").as_bytes(), b"IT");
}

#[test]
fn clock_wraparound_is_not_a_timeout() {
    let (mut r, mut console, clock) = (reader(), MockConsole::new(), MockProbe::new(0));
    clock.set_time(u32::MAX - 100);
    console.send("EN");
    assert!(r.poll(&mut console, &clock).is_none());

    clock.set_time(100);
    console.send("TER\n");
    assert_eq!(
        r.poll(&mut console, &clock).expect("line").command(),
        Command::Enter
    );
}

#[test]
fn empty_line_classifies_as_none() {
    let (mut r, mut console, clock) = (reader(), MockConsole::new(), MockProbe::new(0));
    console.send("\n");
    let line = r.poll(&mut console, &clock).expect("empty line");
    assert!(line.as_bytes().is_empty());
    assert_eq!(line.command(), Command::None);
}

#[test]
fn keyword_precedence_applies_anywhere_in_the_line() {
    let (mut r, mut console, clock) = (reader(), MockConsole::new(), MockProbe::new(0));
    console.send("EXIT ENTER\nCAL:1 EXIT\n");
    assert_eq!(
        r.poll(&mut console, &clock).expect("first").command(),
        Command::Enter
    );
    assert_eq!(
        r.poll(&mut console, &clock).expect("second").command(),
        Command::Exit
    );
}
