//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Telemetry is logged as one JSON object per line so a host-side
//! dashboard can parse it straight off the serial stream.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => match serde_json::to_string(t) {
                Ok(json) => info!("TELEM | {}", json),
                Err(e) => warn!("TELEM | serialisation failed: {}", e),
            },
            AppEvent::Started { k_value } => {
                info!("START | k={:.4}", k_value);
            }
            AppEvent::CalibrationEntered => {
                info!("CAL   | entered");
            }
            AppEvent::CalibrationCommitted { k_value } => {
                info!("CAL   | committed k={:.4}", k_value);
            }
            AppEvent::CalibrationRejected {
                candidate,
                projected_ec,
            } => {
                info!(
                    "CAL   | rejected k={:.4} (projected EC {:.1})",
                    candidate, projected_ec
                );
            }
            AppEvent::CalibrationExited => {
                info!("CAL   | exited");
            }
            AppEvent::UsageModeApplied { mode, k_value } => {
                info!("MODE  | {:?} k={:.2}", mode, k_value);
            }
        }
    }
}
