//! Integration tests for the console → calibration → EEPROM pipeline.
//!
//! A `TdsMeter` is driven cycle by cycle with mock adapters, the way the
//! firmware main loop drives it.

use crate::mock_hw::{MockConsole, MockEeprom, MockProbe, RecordingSink};

use tdsprobe::app::coefficient::{encode_k_value, UsageMode};
use tdsprobe::app::events::AppEvent;
use tdsprobe::app::service::TdsMeter;
use tdsprobe::config::{MeterConfig, EEPROM_SIZE};
use tdsprobe::console::{
    BUFFER_SOLUTION_ERROR, COMMAND_ERROR, ENTER_BANNER, ENTER_MODE_ERROR, EXIT_BANNER,
    PROBE_PROMPT,
};
use tdsprobe::fsm::CalibrationState;
use tdsprobe::sensors::tds::measure;

/// Mid-scale sample: 512 / 1024 × 5 V = 2.5 V.
const MIDSCALE_RAW: u16 = 512;
const K_707_AT_2V5: f32 = 1414.0 / 2629.0375;

struct Rig {
    meter: TdsMeter,
    probe: MockProbe,
    console: MockConsole,
    eeprom: MockEeprom,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: MeterConfig) -> Self {
        let mut rig = Self {
            meter: TdsMeter::new(config),
            probe: MockProbe::new(MIDSCALE_RAW),
            console: MockConsole::new(),
            eeprom: MockEeprom::erased(EEPROM_SIZE),
            sink: RecordingSink::new(),
        };
        rig.meter.begin(&mut rig.eeprom, &mut rig.sink);
        rig
    }

    fn cycle(&mut self) {
        self.meter.update(
            &mut self.probe,
            &mut self.console,
            &mut self.eeprom,
            &mut self.sink,
        );
        self.probe.advance(10);
    }

    fn send(&mut self, text: &str) {
        self.console.send(text);
        self.cycle();
    }
}

fn calibrating_rig() -> Rig {
    let mut rig = Rig::new(MeterConfig::default());
    rig.cycle();
    rig.send("ENTER\n");
    assert_eq!(rig.meter.calibration_state(), CalibrationState::Calibrating);
    rig.console.take_output();
    rig
}

#[test]
fn fresh_eeprom_boots_with_unit_k_value() {
    let rig = Rig::new(MeterConfig::default());
    assert_eq!(rig.meter.k_value(), 1.0);
    assert_eq!(rig.eeprom.slot(8), encode_k_value(1.0));
    assert!(matches!(
        rig.sink.events.last(),
        Some(AppEvent::Started { k_value }) if *k_value == 1.0
    ));
}

#[test]
fn enter_prints_banner_and_prompt() {
    let mut rig = Rig::new(MeterConfig::default());
    rig.send("ENTER\n");
    assert_eq!(
        rig.console.output,
        ["", ENTER_BANNER, PROBE_PROMPT, ""].map(str::to_owned)
    );
    assert_eq!(rig.meter.calibration_state(), CalibrationState::Calibrating);
}

#[test]
fn standard_solution_commits_and_persists_k_value() {
    let mut rig = calibrating_rig();
    rig.send("CAL:707\n");

    let k = rig.meter.k_value();
    assert!((k - K_707_AT_2V5).abs() < 1e-4, "k = {k}");
    assert_eq!(rig.eeprom.slot(8), encode_k_value(k));
    assert_eq!(rig.meter.calibration_state(), CalibrationState::Idle);
    assert!(rig.meter.is_calibration_finished());
    assert_eq!(
        rig.console.output,
        [
            ">>>Calibration Finished<<<>>>KValue: 0.54",
            EXIT_BANNER,
            "",
        ]
        .map(str::to_owned)
    );
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::CalibrationCommitted { .. })),
        1
    );
}

#[test]
fn committed_k_value_applies_from_next_cycle() {
    let mut rig = calibrating_rig();
    rig.send("CAL:707\n");
    let k = rig.meter.k_value();

    rig.cycle();
    let expected = measure(MIDSCALE_RAW, 5.0, 1024.0, 25.0, k);
    assert_eq!(rig.meter.reading(), expected);
    assert!((rig.meter.tds_value() - 707.0).abs() < 0.5);
}

#[test]
fn implausible_solution_is_rejected_and_mode_kept() {
    let mut rig = calibrating_rig();
    rig.send("CAL:100\n");

    assert_eq!(rig.console.output, [BUFFER_SOLUTION_ERROR.to_owned()]);
    assert_eq!(rig.meter.k_value(), 1.0);
    assert_eq!(rig.meter.calibration_state(), CalibrationState::Calibrating);
    assert!(!rig.meter.is_calibration_finished());
}

#[test]
fn calibrate_while_idle_asks_to_enter_first() {
    let mut rig = Rig::new(MeterConfig::default());
    rig.cycle();
    let writes = rig.eeprom.writes;
    rig.send("CAL:707\n");

    assert_eq!(rig.console.output, [ENTER_MODE_ERROR.to_owned()]);
    assert_eq!(rig.meter.k_value(), 1.0);
    assert_eq!(rig.eeprom.writes, writes);
}

#[test]
fn exit_leaves_without_change() {
    let mut rig = calibrating_rig();
    rig.send("EXIT\n");

    assert_eq!(
        rig.console.output,
        ["", EXIT_BANNER, ""].map(str::to_owned)
    );
    assert_eq!(rig.meter.calibration_state(), CalibrationState::Idle);
    assert_eq!(rig.meter.k_value(), 1.0);
}

#[test]
fn unknown_line_while_calibrating_is_a_command_error() {
    let mut rig = calibrating_rig();
    rig.send("HELLO\n");
    assert_eq!(rig.console.output, [COMMAND_ERROR.to_owned()]);
    assert_eq!(rig.meter.calibration_state(), CalibrationState::Calibrating);
}

#[test]
fn unknown_line_while_idle_is_silent() {
    let mut rig = Rig::new(MeterConfig::default());
    rig.send("HELLO\n");
    assert!(rig.console.output.is_empty());
}

#[test]
fn commands_are_case_insensitive() {
    let mut rig = Rig::new(MeterConfig::default());
    rig.cycle();
    rig.send("enter\n");
    assert_eq!(rig.meter.calibration_state(), CalibrationState::Calibrating);
    rig.send("cal:707\n");
    assert!((rig.meter.k_value() - K_707_AT_2V5).abs() < 1e-4);
}

#[test]
fn stale_partial_line_is_discarded() {
    let mut rig = calibrating_rig();

    rig.send("EXI");
    rig.probe.advance(600);
    rig.send("T\n");

    // Only "T" survived the gap.
    assert_eq!(rig.console.output, [COMMAND_ERROR.to_owned()]);
    assert_eq!(rig.meter.calibration_state(), CalibrationState::Calibrating);
}

#[test]
fn one_line_is_handled_per_cycle() {
    let mut rig = Rig::new(MeterConfig::default());
    rig.cycle();
    rig.console.send("ENTER\nEXIT\n");

    rig.cycle();
    assert_eq!(rig.meter.calibration_state(), CalibrationState::Calibrating);
    rig.cycle();
    assert_eq!(rig.meter.calibration_state(), CalibrationState::Idle);
}

#[test]
fn configured_usage_mode_overrides_stored_calibration() {
    let config = MeterConfig {
        usage_mode: Some(UsageMode::Industrial),
        ..Default::default()
    };
    let rig = Rig::new(config);
    assert_eq!(rig.meter.k_value(), 0.9);
    assert_eq!(rig.eeprom.slot(8), encode_k_value(0.9));
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::UsageModeApplied { .. })),
        1
    );
}

#[test]
fn telemetry_follows_configured_cadence() {
    let config = MeterConfig {
        telemetry_every: 2,
        ..Default::default()
    };
    let mut rig = Rig::new(config);
    for _ in 0..4 {
        rig.cycle();
    }
    let telemetry: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(telemetry.len(), 2);

    let stats = telemetry[1].tds_stats.expect("window populated");
    assert_eq!(stats.count, 4);
    assert_eq!(stats.min, stats.max);
    assert_eq!(telemetry[1].calibration, CalibrationState::Idle);
}

#[test]
fn temperature_change_shifts_compensated_reading() {
    let mut rig = Rig::new(MeterConfig::default());
    rig.cycle();
    let at_25 = rig.meter.ec_value();

    rig.meter.set_temperature(35.0);
    rig.cycle();
    let at_35 = rig.meter.ec_value();

    assert!((at_25 / at_35 - 1.2).abs() < 1e-4);
}

#[test]
fn board_scaling_calibrates_a_twelve_bit_sample() {
    // 1585 / 4096 × 3.1 V ≈ 1.2 V, inside the sensor's output span.
    let mut rig = Rig::new(MeterConfig::esp32s3());
    rig.probe.raw = 1585;
    rig.cycle();
    assert!((rig.meter.reading().voltage - 1.2).abs() < 1e-3);

    rig.send("ENTER\n");
    rig.send("CAL:300\n");

    let k = rig.meter.k_value();
    assert!((0.5..=0.9).contains(&k), "k = {k}");
    assert_eq!(rig.eeprom.slot(8), encode_k_value(k));
    assert_eq!(rig.meter.calibration_state(), CalibrationState::Idle);
}
