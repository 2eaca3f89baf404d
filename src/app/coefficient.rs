//! Persisted k-value (probe cell constant correction).
//!
//! The k-value lives as a 4-byte IEEE-754 `f32` at a configurable EEPROM
//! offset.  Erased EEPROM reads `FF FF FF FF`; that pattern means "never
//! written", so [`CoefficientStore::load`] substitutes 1.0 and writes it
//! back, making every later load return the same value.
//!
//! Storage failures never reach the control loop.  A failed write is
//! logged and the in-memory value stays authoritative until the next boot;
//! a failed read falls back to the default without touching storage.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::ports::EepromPort;

/// k-value used when storage holds nothing.
pub const DEFAULT_K_VALUE: f32 = 1.0;

/// Value of an erased EEPROM cell.
pub const ERASED_BYTE: u8 = 0xFF;

/// Encoded size of the k-value.
pub const K_VALUE_LEN: usize = 4;

// ---------------------------------------------------------------------------
// Usage modes
// ---------------------------------------------------------------------------

/// Coarse application presets, each pinning a fixed k-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum UsageMode {
    Default = 0,
    Industrial = 1,
    Agriculture = 2,
    Household = 3,
}

impl UsageMode {
    /// Map a numeric mode selector; unknown values select `Default`.
    pub fn from_index(idx: u8) -> Self {
        match idx {
            1 => Self::Industrial,
            2 => Self::Agriculture,
            3 => Self::Household,
            _ => Self::Default,
        }
    }

    pub const fn k_value(self) -> f32 {
        match self {
            Self::Industrial => 0.9,
            Self::Agriculture => 0.7,
            Self::Household | Self::Default => 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Byte representation
// ---------------------------------------------------------------------------

/// The only place the on-flash layout is defined: little-endian IEEE-754,
/// identical to the in-memory layout on every supported MCU.
pub fn encode_k_value(k: f32) -> [u8; K_VALUE_LEN] {
    k.to_le_bytes()
}

/// `None` for the erased pattern.
pub fn decode_k_value(bytes: [u8; K_VALUE_LEN]) -> Option<f32> {
    if bytes == [ERASED_BYTE; K_VALUE_LEN] {
        None
    } else {
        Some(f32::from_le_bytes(bytes))
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Cached k-value plus the EEPROM slot it is persisted in.
pub struct CoefficientStore {
    address: usize,
    k_value: f32,
}

impl CoefficientStore {
    /// The cache starts at [`DEFAULT_K_VALUE`] until [`load`](Self::load).
    pub fn new(address: usize) -> Self {
        Self {
            address,
            k_value: DEFAULT_K_VALUE,
        }
    }

    /// Move the slot.  Nothing is copied; the next load/save uses it.
    pub fn set_address(&mut self, address: usize) {
        self.address = address;
    }

    pub fn k_value(&self) -> f32 {
        self.k_value
    }

    /// Read the persisted k-value into the cache, repairing erased storage.
    pub fn load(&mut self, eeprom: &mut impl EepromPort) -> f32 {
        let mut bytes = [0u8; K_VALUE_LEN];
        if let Err(e) = eeprom.read(self.address, &mut bytes) {
            warn!(
                "coefficient: read at 0x{:03x} failed ({}), using k={}",
                self.address, e, DEFAULT_K_VALUE
            );
            self.k_value = DEFAULT_K_VALUE;
            return self.k_value;
        }

        match decode_k_value(bytes) {
            Some(k) => {
                self.k_value = k;
                info!("coefficient: loaded k={} from 0x{:03x}", k, self.address);
            }
            None => {
                info!(
                    "coefficient: slot 0x{:03x} erased, initialising k={}",
                    self.address, DEFAULT_K_VALUE
                );
                self.save(eeprom, DEFAULT_K_VALUE);
            }
        }
        self.k_value
    }

    /// Update the cache and persist.  A failed write is logged only.
    pub fn save(&mut self, eeprom: &mut impl EepromPort, k_value: f32) {
        self.k_value = k_value;
        if let Err(e) = eeprom.write(self.address, &encode_k_value(k_value)) {
            warn!(
                "coefficient: write of k={} at 0x{:03x} failed ({}), kept in RAM only",
                k_value, self.address, e
            );
        }
    }

    /// Overwrite (and persist) the k-value with a usage-mode preset.
    /// Any manual calibration is lost.
    pub fn apply_usage_mode(&mut self, eeprom: &mut impl EepromPort, mode: UsageMode) -> f32 {
        let k = mode.k_value();
        info!("coefficient: usage mode {:?} -> k={}", mode, k);
        self.save(eeprom, k);
        k
    }
}
