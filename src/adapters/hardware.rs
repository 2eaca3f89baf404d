//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the probe's ADC channel and the system clock, exposing them
//! through [`AnalogPort`] and [`ClockPort`].  On non-espidf targets the
//! ADC is replaced by a settable simulated sample.

use crate::app::ports::{AnalogPort, ClockPort};

use super::time::Esp32TimeAdapter;

/// Concrete adapter combining the probe ADC and the clock.
pub struct HardwareAdapter {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    adc_channel: u32,
    clock: Esp32TimeAdapter,
    #[cfg(not(target_os = "espidf"))]
    sim_raw: u16,
}

impl HardwareAdapter {
    /// `adc_channel` is the ADC1 channel returned by
    /// [`init_peripherals`](crate::drivers::hw_init::init_peripherals).
    pub fn new(adc_channel: u32, clock: Esp32TimeAdapter) -> Self {
        Self {
            adc_channel,
            clock,
            #[cfg(not(target_os = "espidf"))]
            sim_raw: 0,
        }
    }

    /// Set the sample the simulated ADC returns.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_sim_raw(&mut self, raw: u16) {
        self.sim_raw = raw;
    }
}

// ── AnalogPort implementation ─────────────────────────────────

impl AnalogPort for HardwareAdapter {
    #[cfg(target_os = "espidf")]
    fn read_raw(&mut self) -> u16 {
        crate::drivers::hw_init::adc1_read(self.adc_channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(&mut self) -> u16 {
        self.sim_raw
    }
}

// ── ClockPort implementation ──────────────────────────────────

impl ClockPort for HardwareAdapter {
    fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }
}
