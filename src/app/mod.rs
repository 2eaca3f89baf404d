//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the TDS probe: the
//! measurement cycle, the persisted k-value lifecycle, and the console
//! command vocabulary.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod coefficient;
pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
