//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TdsMeter (domain)
//! ```
//!
//! Driven adapters (ADC, serial console, clock, EEPROM, event sinks)
//! implement these traits.  The [`TdsMeter`](super::service::TdsMeter)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! All port errors are typed — callers must handle every variant explicitly.

use crate::config::MeterConfig;

// ───────────────────────────────────────────────────────────────
// Analog port (driven adapter: probe → domain)
// ───────────────────────────────────────────────────────────────

/// Source of raw probe samples.
pub trait AnalogPort {
    /// Take one raw ADC sample from the probe channel.
    fn read_raw(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Console port (driven adapter: operator ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Line-oriented operator console (UART, USB-CDC, stdin in simulation).
pub trait ConsolePort {
    /// Pop the next received byte, or `None` if nothing is buffered.
    /// Must never block.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write one line of feedback text, terminated by the adapter.
    fn write_line(&mut self, line: &str);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Wraps at `u32::MAX`; consumers must
/// compare with `wrapping_sub`.
pub trait ClockPort {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// EEPROM port (driven adapter: domain ↔ non-volatile bytes)
// ───────────────────────────────────────────────────────────────

/// Byte-addressable non-volatile memory.
///
/// Erased cells read as `0xFF`.  Writes complete synchronously before the
/// call returns.
pub trait EepromPort {
    /// Size of the addressable region in bytes.
    fn capacity(&self) -> usize;

    /// Fill `buf` with the bytes starting at `address`.
    fn read(&self, address: usize, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` starting at `address` and commit it.
    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the meter configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`MeterConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<MeterConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &MeterConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`EepromPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The access falls (partly) outside the EEPROM region.
    OutOfBounds { address: usize, len: usize },
    /// The backing store rejected the commit.
    CommitFailed,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfBounds { address, len } => {
                write!(f, "access of {} bytes at 0x{:03x} out of bounds", len, address)
            }
            Self::CommitFailed => write!(f, "commit failed"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
