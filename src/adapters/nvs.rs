//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ByteStorePort`] as a small emulated EEPROM: a fixed-size
//! byte image mirrored in RAM and persisted as one NVS blob. Reads are
//! served from the mirror; every write updates the mirror and then
//! rewrites and commits the blob.
//!
//! An erased or never-written store reads back as `0xFF`, like a fresh
//! EEPROM, so a missing blob simply fails the record tag check.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{ByteStorePort, StorageError};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Size of the emulated EEPROM in bytes.
pub const EEPROM_SIZE: usize = 64;

const ERASED: u8 = 0xFF;

#[cfg(target_os = "espidf")]
const NAMESPACE: &[u8] = b"servocal\0";
#[cfg(target_os = "espidf")]
const EEPROM_KEY: &[u8] = b"eeprom\0";

pub struct NvsAdapter {
    image: [u8; EEPROM_SIZE],
    /// False when flash could not be initialised; writes stay in RAM.
    persistent: bool,
}

impl NvsAdapter {
    /// Initialise NVS flash and pull the stored image into RAM.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError);
            }

            let mut image = [ERASED; EEPROM_SIZE];
            match Self::with_nvs_handle(false, |handle| {
                let mut size = EEPROM_SIZE;
                // SAFETY: `image` is EEPROM_SIZE bytes and `size` says so.
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        EEPROM_KEY.as_ptr().cast(),
                        image.as_mut_ptr().cast(),
                        &mut size,
                    )
                };
                if ret == ESP_OK { Ok(size) } else { Err(ret) }
            }) {
                Ok(size) => info!("NvsAdapter: loaded {} byte image", size),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => {
                    info!("NvsAdapter: no stored image, starting erased");
                }
                Err(e) => {
                    warn!("NvsAdapter: read error {}, starting erased", e);
                    image = [ERASED; EEPROM_SIZE];
                }
            }
            Ok(Self {
                image,
                persistent: true,
            })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("NvsAdapter: simulation backend");
            Ok(Self {
                image: [ERASED; EEPROM_SIZE],
                persistent: true,
            })
        }
    }

    /// RAM-only store for when flash is unavailable. Starts erased and
    /// forgets everything at reset.
    pub fn volatile() -> Self {
        Self {
            image: [ERASED; EEPROM_SIZE],
            persistent: false,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Open the namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        // SAFETY: NAMESPACE is NUL-terminated; handle is a valid out-pointer.
        let ret = unsafe { nvs_open(NAMESPACE.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        // SAFETY: handle was opened above and is closed exactly once.
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn persist(&self) -> Result<(), StorageError> {
        if !self.persistent {
            return Ok(());
        }
        Self::with_nvs_handle(true, |handle| {
            // SAFETY: the image outlives the call; NVS copies it.
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    EEPROM_KEY.as_ptr().cast(),
                    self.image.as_ptr().cast(),
                    EEPROM_SIZE,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret == ESP_OK { Ok(()) } else { Err(ret) }
        })
        .map_err(|e| {
            warn!("NvsAdapter: commit failed ({})", e);
            StorageError::IoError
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn persist(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn span(addr: u16, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        let start = usize::from(addr);
        let end = start.checked_add(len).ok_or(StorageError::OutOfBounds)?;
        if end > EEPROM_SIZE {
            return Err(StorageError::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl ByteStorePort for NvsAdapter {
    fn read(&self, addr: u16, buf: &mut [u8]) -> Result<(), StorageError> {
        let range = Self::span(addr, buf.len())?;
        buf.copy_from_slice(&self.image[range]);
        Ok(())
    }

    fn write(&mut self, addr: u16, data: &[u8]) -> Result<(), StorageError> {
        let range = Self::span(addr, data.len())?;
        self.image[range].copy_from_slice(data);
        self.persist()
    }
}
