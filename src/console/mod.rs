//! Operator console — command line assembly and calibration feedback text.
//!
//! The feedback strings are the protocol: operators (and scripts written
//! against the vendor Arduino library) match on them verbatim.

pub mod line_reader;

pub use line_reader::{CommandLine, LineReader, LINE_CAPACITY, LINE_TIMEOUT_MS};

use core::fmt::Write;

use crate::app::ports::ConsolePort;
use crate::fsm::Outcome;

pub const ENTER_BANNER: &str = ">>>Enter Calibration Mode<<<";
pub const PROBE_PROMPT: &str = ">>>Please put the probe into the standard buffer solution<<<";
pub const EXIT_BANNER: &str = ">>>Exit Calibration Mode<<<";
pub const FINISHED_BANNER: &str = ">>>Calibration Finished<<<";
pub const BUFFER_SOLUTION_ERROR: &str = ">>>Error: Please use standard buffer solution<<<";
pub const ENTER_MODE_ERROR: &str = ">>>Error: Enter Calibration Mode<<<";
pub const COMMAND_ERROR: &str = "Command Error";

/// Write the operator-facing lines for a calibration outcome.
pub fn write_feedback(console: &mut impl ConsolePort, outcome: &Outcome) {
    match outcome {
        Outcome::Silent => {}
        Outcome::Entered => {
            console.write_line("");
            console.write_line(ENTER_BANNER);
            console.write_line(PROBE_PROMPT);
            console.write_line("");
        }
        Outcome::Committed { k_value } => {
            let mut line: heapless::String<64> = heapless::String::new();
            // 64 bytes always fit the banner plus a formatted f32 of the
            // accepted magnitude.
            let _ = write!(line, "{}>>>KValue: {:.2}", FINISHED_BANNER, k_value);
            console.write_line(&line);
            console.write_line(EXIT_BANNER);
            console.write_line("");
        }
        Outcome::Rejected { .. } => console.write_line(BUFFER_SOLUTION_ERROR),
        Outcome::Exited => {
            console.write_line("");
            console.write_line(EXIT_BANNER);
            console.write_line("");
        }
        Outcome::NotCalibrating => console.write_line(ENTER_MODE_ERROR),
        Outcome::CommandError => console.write_line(COMMAND_ERROR),
    }
}
