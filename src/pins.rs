//! GPIO / peripheral pin assignments for the TDS probe board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors — Analog (ADC1)
// ---------------------------------------------------------------------------

/// Gravity TDS probe signal board — analog output, 0 – 2.3 V.
/// ADC1 channel 3 (GPIO 4 on ESP32-S3).
pub const TDS_ADC_GPIO: i32 = 4;

/// Input span of ADC1 at 12 dB attenuation on the ESP32-S3 (volts).
/// Matches `ADC_ATTEN_DB_12` in `drivers::hw_init`.
pub const ADC_FULL_SCALE_V: f32 = 3.1;
/// Codes per conversion at `ADC_BITWIDTH_12`.
pub const ADC_CODES: f32 = 4096.0;

/// ADC1 channel number for a GPIO on the ESP32-S3 (GPIO 1–10 → CH0–CH9).
/// Returns `None` for pins not routed to ADC1.
pub const fn adc1_channel_for_gpio(gpio: i32) -> Option<u32> {
    if gpio >= 1 && gpio <= 10 {
        Some((gpio - 1) as u32)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Operator console
// ---------------------------------------------------------------------------

/// UART port carrying the calibration console (UART0 = USB-serial bridge).
pub const CONSOLE_UART_NUM: i32 = 0;
/// Console baud rate.
pub const CONSOLE_BAUD: u32 = 115_200;
