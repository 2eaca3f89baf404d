//! One-shot hardware peripheral initialization.
//!
//! Configures the probe's ADC channel and the console UART using raw
//! ESP-IDF sys calls. Called once from `main()` before the measurement
//! loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    /// The configured probe GPIO is not routed to ADC1.
    InvalidAdcPin(i32),
    AdcInitFailed(i32),
    UartInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidAdcPin(gpio) => write!(f, "GPIO {} has no ADC1 channel", gpio),
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::UartInitFailed(rc) => write!(f, "console UART init failed (rc={})", rc),
        }
    }
}

/// Configure the probe ADC channel and the console UART.
///
/// Returns the ADC1 channel the probe is read from.
#[cfg(target_os = "espidf")]
pub fn init_peripherals(probe_gpio: i32) -> Result<u32, HwInitError> {
    let channel =
        pins::adc1_channel_for_gpio(probe_gpio).ok_or(HwInitError::InvalidAdcPin(probe_gpio))?;
    // SAFETY: Called once from main() before the loop; single-threaded.
    unsafe {
        init_adc(channel)?;
        init_console_uart()?;
    }
    log::info!("hw_init: peripherals configured (probe on ADC1 CH{})", channel);
    Ok(channel)
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(probe_gpio: i32) -> Result<u32, HwInitError> {
    let channel =
        pins::adc1_channel_for_gpio(probe_gpio).ok_or(HwInitError::InvalidAdcPin(probe_gpio))?;
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(channel)
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc(channel: u32) -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }
    Ok(())
}

/// One raw sample; a failed conversion reads as 0.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract — single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

// ── Console UART ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
const UART_RX_BUFFER: i32 = 256;

#[cfg(target_os = "espidf")]
unsafe fn init_console_uart() -> Result<(), HwInitError> {
    let cfg = uart_config_t {
        baud_rate: pins::CONSOLE_BAUD as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    let port = pins::CONSOLE_UART_NUM;
    let ret = unsafe { uart_param_config(port, &cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::UartInitFailed(ret));
    }
    // TX stays on the logger's blocking path; only RX needs a driver buffer.
    let ret = unsafe {
        uart_driver_install(port, UART_RX_BUFFER, 0, 0, core::ptr::null_mut(), 0)
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::UartInitFailed(ret));
    }
    Ok(())
}

/// Non-blocking read of one console byte.
#[cfg(target_os = "espidf")]
pub fn console_read_byte() -> Option<u8> {
    let mut byte = 0u8;
    // SAFETY: driver installed in init_console_uart(); zero tick timeout.
    let n = unsafe {
        uart_read_bytes(
            pins::CONSOLE_UART_NUM,
            (&raw mut byte).cast(),
            1,
            0,
        )
    };
    (n == 1).then_some(byte)
}
