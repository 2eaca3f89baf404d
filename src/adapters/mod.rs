//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements  | Connects to              |
//! |------------|-------------|--------------------------|
//! | `hardware` | AnalogPort  | ESP32 ADC1 oneshot       |
//! |            | ClockPort   |                          |
//! | `log_sink` | EventSink   | Serial log output        |
//! | `nvs`      | ConfigPort  | NVS / in-memory store    |
//! |            | EepromPort  |                          |
//! | `serial`   | ConsolePort | Console UART             |
//! | `time`     | ClockPort   | ESP32 system timer       |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod serial;
pub mod time;
