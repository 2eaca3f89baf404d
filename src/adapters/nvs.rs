//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`EepromPort`] for the TDS probe.
//!
//! - Config: the [`MeterConfig`] is stored as a postcard blob and
//!   range-checked before every write.
//! - EEPROM: the ESP32 has no EEPROM, so a fixed [`EEPROM_SIZE`]-byte image
//!   is kept in RAM and mirrored to a single NVS blob.  A missing blob reads
//!   as all-`0xFF`, exactly like erased EEPROM.  Every write commits the
//!   whole image; ESP-IDF NVS commits are atomic per `nvs_commit()`.
//!   The RAM image only changes once the commit has succeeded, so it never
//!   runs ahead of flash.

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort, EepromPort, StorageError};
use crate::config::{validate_config, MeterConfig, EEPROM_SIZE};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const NAMESPACE: &str = "tdsprobe";
#[cfg(not(target_os = "espidf"))]
const CONFIG_KEY: &str = "metercfg";
#[cfg(not(target_os = "espidf"))]
const EEPROM_KEY: &str = "eeprom";

#[cfg(target_os = "espidf")]
const MAX_CONFIG_BLOB: usize = 256;

pub struct NvsAdapter {
    image: [u8; EEPROM_SIZE],
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
    /// Simulated flash failure: every commit returns `CommitFailed`.
    #[cfg(not(target_os = "espidf"))]
    fail_commits: bool,
}

impl NvsAdapter {
    /// Initialise NVS flash and load the EEPROM image.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> crate::error::Result<Self> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as i32 {
                    return Err(StorageError::IoError.into());
                }
                if unsafe { nvs_flash_init() } != ESP_OK as i32 {
                    return Err(StorageError::IoError.into());
                }
            } else if ret != ESP_OK as i32 {
                return Err(StorageError::IoError.into());
            }

            let mut image = [0xFF_u8; EEPROM_SIZE];
            let loaded = Self::with_nvs_handle(false, |handle| {
                let mut size = EEPROM_SIZE;
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        b"eeprom\0".as_ptr() as *const _,
                        image.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(size)
            });
            match loaded {
                Ok(size) => info!("NvsAdapter: EEPROM image loaded ({} bytes)", size),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => {
                    info!("NvsAdapter: no EEPROM image, starting erased");
                }
                Err(e) => {
                    warn!("NvsAdapter: EEPROM image read error {}, starting erased", e);
                    image = [0xFF; EEPROM_SIZE];
                }
            }
            Ok(Self { image })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("NvsAdapter: simulation backend");
            Ok(Self {
                image: [0xFF; EEPROM_SIZE],
                store: std::cell::RefCell::new(HashMap::new()),
                fail_commits: false,
            })
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(key: &str) -> String {
        format!("{}::{}", NAMESPACE, key)
    }

    /// Open the namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns = NAMESPACE.as_bytes();
        let len = ns.len().min(15);
        ns_buf[..len].copy_from_slice(&ns[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    /// Persist a full image. `self.image` is not touched here.
    fn commit_image(&self, image: &[u8; EEPROM_SIZE]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            if self.fail_commits {
                warn!("NvsAdapter: simulated EEPROM commit failure");
                return Err(StorageError::CommitFailed);
            }
            self.store
                .borrow_mut()
                .insert(Self::composite_key(EEPROM_KEY), image.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(true, |handle| {
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        b"eeprom\0".as_ptr() as *const _,
                        image.as_ptr() as *const _,
                        EEPROM_SIZE,
                    )
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|e| {
                warn!("NvsAdapter: EEPROM commit error {}", e);
                StorageError::CommitFailed
            })
        }
    }

    fn bounds(address: usize, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        match address.checked_add(len) {
            Some(end) if end <= EEPROM_SIZE => Ok(address..end),
            _ => Err(StorageError::OutOfBounds { address, len }),
        }
    }
}

impl NvsAdapter {
    /// Load the stored config, or `fallback` when nothing is stored or the
    /// NVS read fails.  A stored but invalid config is still an error.
    pub fn load_or(&self, fallback: MeterConfig) -> Result<MeterConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            if let Some(bytes) = self.store.borrow().get(&Self::composite_key(CONFIG_KEY)) {
                let cfg: MeterConfig =
                    postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
                validate_config(&cfg)?;
                info!("NvsAdapter: loaded config from store");
                Ok(cfg)
            } else {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(fallback)
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(false, |handle| {
                let mut buf = [0u8; MAX_CONFIG_BLOB];
                let mut size = MAX_CONFIG_BLOB;
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        b"metercfg\0".as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok((buf, size))
            });

            match result {
                Ok((buf, size)) => {
                    let cfg: MeterConfig =
                        postcard::from_bytes(&buf[..size]).map_err(|_| ConfigError::Corrupted)?;
                    validate_config(&cfg)?;
                    info!("NvsAdapter: loaded config from NVS ({} bytes)", size);
                    Ok(cfg)
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => {
                    info!("NvsAdapter: no stored config, using defaults");
                    Ok(fallback)
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS read error {}, using defaults", e);
                    Ok(fallback)
                }
            }
        }
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<MeterConfig, ConfigError> {
        self.load_or(MeterConfig::default())
    }

    fn save(&self, config: &MeterConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        #[cfg(not(target_os = "espidf"))]
        {
            self.store
                .borrow_mut()
                .insert(Self::composite_key(CONFIG_KEY), bytes);
            info!("NvsAdapter: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(true, |handle| {
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        b"metercfg\0".as_ptr() as *const _,
                        bytes.as_ptr() as *const _,
                        bytes.len(),
                    )
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsAdapter: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}

impl EepromPort for NvsAdapter {
    fn capacity(&self) -> usize {
        EEPROM_SIZE
    }

    fn read(&self, address: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        let range = Self::bounds(address, buf.len())?;
        buf.copy_from_slice(&self.image[range]);
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StorageError> {
        let range = Self::bounds(address, data.len())?;
        if self.image[range.clone()] == *data {
            return Ok(());
        }
        let mut staged = self.image;
        staged[range].copy_from_slice(data);
        self.commit_image(&staged)?;
        self.image = staged;
        Ok(())
    }
}
