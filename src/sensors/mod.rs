//! Sensor subsystem — the TDS probe driver and the rolling statistics
//! kept over its readings.

pub mod stats;
pub mod tds;

pub use stats::{ReadingStats, RollingWindow, WINDOW_LEN};
pub use tds::{TdsReading, TdsSensor};
