//! Gravity analog TDS probe.
//!
//! The signal board outputs a voltage that rises with conductivity.  A
//! fixed cubic fit converts that voltage to EC (µS/cm), the cell constant
//! correction (k-value) scales it, a linear 2 %/°C coefficient brings it
//! back to 25 °C, and a fixed factor converts EC to TDS (ppm).
//!
//! ```text
//! raw ──▶ volts ──▶ poly(v)·k ──▶ ÷ (1 + 0.02·(T − 25)) ──▶ × 0.5 ──▶ ppm
//! ```
//!
//! Nothing here validates its inputs.  A compensation denominator at or
//! below zero (T ≤ −25 °C) yields an infinite or negative EC; callers are
//! expected to sanity-check readings.

use serde::Serialize;

use crate::app::ports::AnalogPort;

/// EC (µS/cm) → TDS (ppm) conversion factor.
pub const TDS_FACTOR: f32 = 0.5;

/// Temperature the compensation is anchored to.
pub const REFERENCE_TEMP_C: f32 = 25.0;

/// Linear temperature coefficient of conductivity (per °C).
pub const TEMP_COEFFICIENT: f32 = 0.02;

const POLY_A3: f32 = 133.42;
const POLY_A2: f32 = -255.86;
const POLY_A1: f32 = 857.39;

/// Probe voltage → uncorrected EC.  Shared by measurement and calibration.
pub fn probe_polynomial(voltage: f32) -> f32 {
    POLY_A3 * voltage * voltage * voltage + POLY_A2 * voltage * voltage + POLY_A1 * voltage
}

/// `1 + 0.02·(T − 25)`.  Not guarded against zero.
pub fn compensation_factor(temperature_c: f32) -> f32 {
    1.0 + TEMP_COEFFICIENT * (temperature_c - REFERENCE_TEMP_C)
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TdsReading {
    pub raw: u16,
    pub voltage: f32,
    /// EC at the water's actual temperature, k-value applied.
    pub ec_raw: f32,
    /// EC compensated to 25 °C.
    pub ec25: f32,
    pub tds_ppm: f32,
    pub temperature_c: f32,
}

/// Run one sample through the conversion pipeline.
pub fn measure(
    raw: u16,
    aref_volts: f32,
    adc_range: f32,
    temperature_c: f32,
    k_value: f32,
) -> TdsReading {
    let voltage = raw as f32 / adc_range * aref_volts;
    let ec_raw = probe_polynomial(voltage) * k_value;
    let ec25 = ec_raw / compensation_factor(temperature_c);
    TdsReading {
        raw,
        voltage,
        ec_raw,
        ec25,
        tds_ppm: ec25 * TDS_FACTOR,
        temperature_c,
    }
}

/// Probe driver: holds the electrical setup and the latest reading.
pub struct TdsSensor {
    aref_volts: f32,
    adc_range: f32,
    temperature_c: f32,
    last: TdsReading,
}

impl TdsSensor {
    pub fn new(aref_volts: f32, adc_range: f32, temperature_c: f32) -> Self {
        Self {
            aref_volts,
            adc_range,
            temperature_c,
            last: TdsReading::default(),
        }
    }

    pub fn set_temperature(&mut self, celsius: f32) {
        self.temperature_c = celsius;
    }

    pub fn set_aref(&mut self, volts: f32) {
        self.aref_volts = volts;
    }

    pub fn set_adc_range(&mut self, range: f32) {
        self.adc_range = range;
    }

    pub fn temperature(&self) -> f32 {
        self.temperature_c
    }

    /// Sample the probe and convert with the given k-value.
    pub fn read(&mut self, adc: &mut impl AnalogPort, k_value: f32) -> TdsReading {
        let raw = adc.read_raw();
        self.last = measure(
            raw,
            self.aref_volts,
            self.adc_range,
            self.temperature_c,
            k_value,
        );
        self.last
    }

    /// Most recent reading (all zeros before the first [`read`](Self::read)).
    pub fn last(&self) -> TdsReading {
        self.last
    }
}
