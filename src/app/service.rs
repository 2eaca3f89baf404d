//! Application service — the hexagonal core.
//!
//! [`TdsMeter`] owns the probe driver, the coefficient cache, the console
//! line reader and the calibration state machine.  All I/O flows through
//! port traits passed in at call sites, making the entire service testable
//! with mock adapters.
//!
//! ```text
//!  AnalogPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!   ClockPort ──▶ │         TdsMeter          │
//! ConsolePort ◀──▶│ Probe · Reader · Cal FSM  │◀──▶ EepromPort
//!                 └──────────────────────────┘
//! ```
//!
//! One call to [`TdsMeter::update`] is one measurement cycle:
//! sample → convert → poll console → advance calibration.  A k-value
//! accepted during a cycle is used from the next cycle on.

use log::info;

use crate::config::MeterConfig;
use crate::console::{self, CommandLine, LineReader, LINE_CAPACITY};
use crate::fsm::{CalibrationFsm, CalibrationState, Outcome, ProbeConditions};
use crate::sensors::{RollingWindow, TdsReading, TdsSensor, WINDOW_LEN};

use super::coefficient::{CoefficientStore, UsageMode};
use super::events::{AppEvent, TelemetryData};
use super::ports::{AnalogPort, ClockPort, ConsolePort, EepromPort, EventSink};

// ───────────────────────────────────────────────────────────────
// TdsMeter
// ───────────────────────────────────────────────────────────────

pub struct TdsMeter {
    config: MeterConfig,
    sensor: TdsSensor,
    coefficient: CoefficientStore,
    reader: LineReader<LINE_CAPACITY>,
    calibration: CalibrationFsm,
    tds_window: RollingWindow<WINDOW_LEN>,
    ec_window: RollingWindow<WINDOW_LEN>,
    temperature_window: RollingWindow<WINDOW_LEN>,
    cycle_count: u64,
}

impl TdsMeter {
    /// Construct the meter from configuration.
    ///
    /// The k-value is 1.0 until [`begin`](Self::begin) loads it.
    pub fn new(config: MeterConfig) -> Self {
        let sensor = TdsSensor::new(config.aref_volts, config.adc_range, config.temperature_c);
        let coefficient = CoefficientStore::new(config.k_value_address as usize);
        let reader = LineReader::new(config.line_timeout_ms);
        Self {
            config,
            sensor,
            coefficient,
            reader,
            calibration: CalibrationFsm::new(),
            tds_window: RollingWindow::new(),
            ec_window: RollingWindow::new(),
            temperature_window: RollingWindow::new(),
            cycle_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load the persisted k-value, then apply the configured usage mode
    /// (if any), which overrides it.
    pub fn begin(&mut self, eeprom: &mut impl EepromPort, sink: &mut impl EventSink) {
        self.coefficient.load(eeprom);
        if let Some(mode) = self.config.usage_mode {
            self.set_usage_mode(mode, eeprom, sink);
        }
        let k_value = self.coefficient.k_value();
        sink.emit(&AppEvent::Started { k_value });
        info!("TdsMeter started, k={}", k_value);
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one measurement cycle and return the fresh reading.
    pub fn update(
        &mut self,
        hw: &mut (impl AnalogPort + ClockPort),
        console: &mut impl ConsolePort,
        eeprom: &mut impl EepromPort,
        sink: &mut impl EventSink,
    ) -> TdsReading {
        self.cycle_count += 1;

        // 1. Sample + convert with the k-value in force this cycle
        let reading = self.sensor.read(hw, self.coefficient.k_value());
        self.tds_window.push(reading.tds_ppm);
        self.ec_window.push(reading.ec25);
        self.temperature_window.push(reading.temperature_c);

        // 2. Console → calibration
        if let Some(line) = self.reader.poll(console, &*hw) {
            self.handle_line(&line, console, eeprom, sink);
        }

        // 3. Telemetry
        if self.cycle_count % u64::from(self.config.telemetry_every.max(1)) == 0 {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }

        reading
    }

    // ── Command handling ──────────────────────────────────────

    /// Feed one completed console line through the calibration machine,
    /// persisting and reporting the result.
    pub fn handle_line(
        &mut self,
        line: &CommandLine<LINE_CAPACITY>,
        console: &mut impl ConsolePort,
        eeprom: &mut impl EepromPort,
        sink: &mut impl EventSink,
    ) -> Outcome {
        let probe = ProbeConditions {
            voltage: self.sensor.last().voltage,
            temperature_c: self.sensor.temperature(),
        };
        let outcome = self.calibration.handle(line.command(), &probe);

        match outcome {
            Outcome::Committed { k_value } => {
                self.coefficient.save(eeprom, k_value);
                sink.emit(&AppEvent::CalibrationCommitted { k_value });
            }
            Outcome::Entered => sink.emit(&AppEvent::CalibrationEntered),
            Outcome::Exited => sink.emit(&AppEvent::CalibrationExited),
            Outcome::Rejected {
                candidate,
                projected_ec,
            } => sink.emit(&AppEvent::CalibrationRejected {
                candidate,
                projected_ec,
            }),
            Outcome::Silent | Outcome::NotCalibrating | Outcome::CommandError => {}
        }

        console::write_feedback(console, &outcome);
        outcome
    }

    // ── Configuration ─────────────────────────────────────────

    /// Water temperature for compensation, normally from an external sensor.
    pub fn set_temperature(&mut self, celsius: f32) {
        self.config.temperature_c = celsius;
        self.sensor.set_temperature(celsius);
    }

    pub fn set_aref(&mut self, volts: f32) {
        self.config.aref_volts = volts;
        self.sensor.set_aref(volts);
    }

    pub fn set_adc_range(&mut self, range: f32) {
        self.config.adc_range = range;
        self.sensor.set_adc_range(range);
    }

    /// Move the persisted slot.  Takes effect on the next load or save;
    /// the cached k-value is unchanged.
    pub fn set_k_value_address(&mut self, address: u16) {
        self.config.k_value_address = address;
        self.coefficient.set_address(address as usize);
    }

    /// Replace the k-value with a usage-mode preset and persist it.
    pub fn set_usage_mode(
        &mut self,
        mode: UsageMode,
        eeprom: &mut impl EepromPort,
        sink: &mut impl EventSink,
    ) {
        self.config.usage_mode = Some(mode);
        let k_value = self.coefficient.apply_usage_mode(eeprom, mode);
        sink.emit(&AppEvent::UsageModeApplied { mode, k_value });
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn k_value(&self) -> f32 {
        self.coefficient.k_value()
    }

    pub fn tds_value(&self) -> f32 {
        self.sensor.last().tds_ppm
    }

    /// Temperature-compensated EC of the latest reading.
    pub fn ec_value(&self) -> f32 {
        self.sensor.last().ec25
    }

    pub fn reading(&self) -> TdsReading {
        self.sensor.last()
    }

    pub fn calibration_state(&self) -> CalibrationState {
        self.calibration.state()
    }

    pub fn is_calibration_finished(&self) -> bool {
        self.calibration.is_finished()
    }

    /// Build a telemetry snapshot from the latest reading and windows.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            reading: self.sensor.last(),
            k_value: self.coefficient.k_value(),
            calibration: self.calibration.state(),
            tds_stats: self.tds_window.stats(),
            ec_stats: self.ec_window.stats(),
            temperature_stats: self.temperature_window.stats(),
        }
    }
}
