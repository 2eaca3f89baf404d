//! Calibration state machine.
//!
//! ```text
//!            Enter                       Calibrate (plausible)
//!   ┌──────┐ ─────▶ ┌─────────────┐ ─────────────────────────▶ ┌──────┐
//!   │ Idle │        │ Calibrating │                            │ Idle │
//!   └──────┘ ◀───── └─────────────┘ ◀─┐                        └──────┘
//!              Exit        │          │ Calibrate (implausible)
//!                          └──────────┘ None → "Command Error"
//! ```
//!
//! The operator dips the probe in a buffer solution of known value and
//! sends `CAL:<value>`.  The value is converted back to raw EC at the
//! water's current temperature and divided by the probe polynomial at the
//! current voltage; the quotient is the candidate k-value.  A candidate is
//! accepted only inside `[0.5, 0.9]` with a projected EC in `(0, 2000)`.
//!
//! The machine is pure: it decides, the [`TdsMeter`](crate::app::service::TdsMeter)
//! persists the accepted k-value and prints the feedback.  There is no
//! timeout; `Calibrating` lasts until `Exit` or a successful `Calibrate`.

use log::{info, warn};
use serde::Serialize;

use crate::app::commands::{parse_leading_f32, Command};
use crate::sensors::tds::{compensation_factor, probe_polynomial, TDS_FACTOR};

/// Projected EC must be strictly below this (µS/cm).
pub const PROJECTED_EC_MAX: f32 = 2000.0;
/// Smallest plausible cell correction.
pub const K_VALUE_MIN: f32 = 0.5;
/// Largest plausible cell correction.
pub const K_VALUE_MAX: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CalibrationState {
    Idle,
    Calibrating,
}

/// Probe conditions at the moment a calibration value is submitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeConditions {
    pub voltage: f32,
    pub temperature_c: f32,
}

/// What a command did.  Drives both persistence and operator feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Nothing to report (unrecognised line outside calibration).
    Silent,
    Entered,
    /// Candidate accepted; the caller must persist `k_value`.
    Committed { k_value: f32 },
    Rejected { candidate: f32, projected_ec: f32 },
    Exited,
    /// `Calibrate` or `Exit` while idle.
    NotCalibrating,
    /// Unrecognised line while calibrating.
    CommandError,
}

/// Solution value (TDS-scaled) → raw EC expected at `temperature_c`.
pub fn project_solution_ec(solution_value: f32, temperature_c: f32) -> f32 {
    solution_value / TDS_FACTOR * compensation_factor(temperature_c)
}

/// Acceptance window: `0 < projected_ec < 2000` and `0.5 ≤ k ≤ 0.9`.
/// NaN in either argument is rejected.
pub fn is_plausible(projected_ec: f32, candidate: f32) -> bool {
    projected_ec > 0.0
        && projected_ec < PROJECTED_EC_MAX
        && (K_VALUE_MIN..=K_VALUE_MAX).contains(&candidate)
}

pub struct CalibrationFsm {
    state: CalibrationState,
    finished: bool,
}

impl Default for CalibrationFsm {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationFsm {
    pub const fn new() -> Self {
        Self {
            state: CalibrationState::Idle,
            finished: false,
        }
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn is_calibrating(&self) -> bool {
        self.state == CalibrationState::Calibrating
    }

    /// Whether the last session ended with an accepted k-value.
    /// Cleared on the next `Enter`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Apply one command.
    pub fn handle(&mut self, command: Command<'_>, probe: &ProbeConditions) -> Outcome {
        match (self.state, command) {
            (CalibrationState::Idle, Command::None) => Outcome::Silent,
            (CalibrationState::Calibrating, Command::None) => Outcome::CommandError,

            (_, Command::Enter) => {
                self.state = CalibrationState::Calibrating;
                self.finished = false;
                info!("calibration: entered");
                Outcome::Entered
            }

            (CalibrationState::Idle, Command::Calibrate(_) | Command::Exit) => {
                warn!("calibration: command ignored, not in calibration mode");
                Outcome::NotCalibrating
            }

            (CalibrationState::Calibrating, Command::Exit) => {
                self.state = CalibrationState::Idle;
                info!("calibration: exited without change");
                Outcome::Exited
            }

            (CalibrationState::Calibrating, Command::Calibrate(text)) => {
                let solution = parse_leading_f32(text);
                let projected_ec = project_solution_ec(solution, probe.temperature_c);
                let candidate = projected_ec / probe_polynomial(probe.voltage);

                if is_plausible(projected_ec, candidate) {
                    self.state = CalibrationState::Idle;
                    self.finished = true;
                    info!("calibration: accepted k={:.4}", candidate);
                    Outcome::Committed { k_value: candidate }
                } else {
                    warn!(
                        "calibration: rejected k={} (projected EC {}, solution {})",
                        candidate, projected_ec, solution
                    );
                    Outcome::Rejected {
                        candidate,
                        projected_ec,
                    }
                }
            }
        }
    }
}
