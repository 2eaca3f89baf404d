//! Outbound application events.
//!
//! The [`TdsMeter`](super::service::TdsMeter) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — log to serial, store, forward.

use serde::Serialize;

use super::coefficient::UsageMode;
use crate::fsm::CalibrationState;
use crate::sensors::{ReadingStats, TdsReading};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The meter finished booting with this k-value.
    Started { k_value: f32 },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    CalibrationEntered,

    /// A calibration was accepted and persisted.
    CalibrationCommitted { k_value: f32 },

    CalibrationRejected { candidate: f32, projected_ec: f32 },

    CalibrationExited,

    /// A usage-mode preset replaced the k-value.
    UsageModeApplied { mode: UsageMode, k_value: f32 },
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryData {
    pub reading: TdsReading,
    pub k_value: f32,
    pub calibration: CalibrationState,
    pub tds_stats: Option<ReadingStats>,
    pub ec_stats: Option<ReadingStats>,
    pub temperature_stats: Option<ReadingStats>,
}
