//! Meter configuration parameters
//!
//! All tunable parameters for the TDS probe.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

use crate::app::coefficient::UsageMode;
use crate::app::ports::ConfigError;
use crate::pins;

/// Size of the emulated EEPROM region holding the k-value.
pub const EEPROM_SIZE: usize = 512;

/// Core meter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterConfig {
    // --- Probe ---
    /// GPIO the probe's analog output is wired to
    pub probe_adc_gpio: i32,
    /// ADC reference voltage (volts)
    pub aref_volts: f32,
    /// Number of ADC codes across the reference range
    pub adc_range: f32,
    /// Water temperature used for compensation (Celsius)
    pub temperature_c: f32,

    // --- Calibration ---
    /// Byte offset of the persisted k-value in EEPROM
    pub k_value_address: u16,
    /// Preset k-value applied at boot; `None` keeps the stored calibration
    pub usage_mode: Option<UsageMode>,

    // --- Timing ---
    /// Gap after which a partial console line is abandoned (milliseconds)
    pub line_timeout_ms: u32,
    /// Measurement cycle period (milliseconds)
    pub sample_interval_ms: u32,
    /// Emit a telemetry event every N measurement cycles
    pub telemetry_every: u32,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            // Probe
            probe_adc_gpio: pins::TDS_ADC_GPIO,
            aref_volts: 5.0,
            adc_range: 1024.0,
            temperature_c: 25.0,

            // Calibration
            k_value_address: 8,
            usage_mode: None,

            // Timing
            line_timeout_ms: 500,
            sample_interval_ms: 1000, // 1 Hz
            telemetry_every: 10,
        }
    }
}

impl MeterConfig {
    /// Defaults with the ADC scaling of this board's ADC1 oneshot unit.
    ///
    /// `Default` keeps the 5 V / 10-bit scaling of the reference circuit;
    /// the firmware boots with this one when nothing is stored in NVS.
    pub fn esp32s3() -> Self {
        Self {
            aref_volts: pins::ADC_FULL_SCALE_V,
            adc_range: pins::ADC_CODES,
            ..Self::default()
        }
    }
}

/// Range-check every field.  Rejects, never clamps.
pub fn validate_config(cfg: &MeterConfig) -> Result<(), ConfigError> {
    if !(cfg.aref_volts > 0.0 && cfg.aref_volts <= 5.5) {
        return Err(ConfigError::ValidationFailed("aref_volts must be in (0, 5.5]"));
    }
    if !(cfg.adc_range >= 1.0) {
        return Err(ConfigError::ValidationFailed("adc_range must be >= 1"));
    }
    if !(-40.0..=125.0).contains(&cfg.temperature_c) {
        return Err(ConfigError::ValidationFailed(
            "temperature_c must be -40.0–125.0",
        ));
    }
    if cfg.k_value_address as usize + 4 > EEPROM_SIZE {
        return Err(ConfigError::ValidationFailed(
            "k_value_address must leave 4 bytes inside EEPROM",
        ));
    }
    if cfg.line_timeout_ms == 0 {
        return Err(ConfigError::ValidationFailed("line_timeout_ms must be > 0"));
    }
    if !(10..=60_000).contains(&cfg.sample_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "sample_interval_ms must be 10–60000",
        ));
    }
    if cfg.telemetry_every == 0 {
        return Err(ConfigError::ValidationFailed("telemetry_every must be > 0"));
    }
    Ok(())
}
