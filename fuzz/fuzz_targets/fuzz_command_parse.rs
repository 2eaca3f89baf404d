//! Fuzz target: `Command::parse` + calibration state machine
//!
//! Any console line must classify without panicking, and a line fed to
//! the calibration machine must never commit a k-value outside the
//! plausible window.
//!
//! cargo fuzz run fuzz_command_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use tdsprobe::app::commands::Command;
use tdsprobe::fsm::{CalibrationFsm, Outcome, ProbeConditions, K_VALUE_MAX, K_VALUE_MIN};

fuzz_target!(|data: &[u8]| {
    let Some((&volt_byte, line)) = data.split_first() else {
        return;
    };
    let probe = ProbeConditions {
        voltage: f32::from(volt_byte) / 255.0 * 3.0,
        temperature_c: 25.0,
    };

    let mut fsm = CalibrationFsm::new();
    fsm.handle(Command::Enter, &probe);

    if let Outcome::Committed { k_value } = fsm.handle(Command::parse(line), &probe) {
        assert!((K_VALUE_MIN..=K_VALUE_MAX).contains(&k_value));
    }
});
