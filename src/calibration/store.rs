//! Persisted calibration store.
//!
//! The record lives at byte address [`RECORD_ADDR`] of a
//! [`ByteStorePort`] and is tagged and versioned so a future layout is
//! never misread as this one:
//!
//! ```text
//!  0    1    2         3            4 ..
//! ┌────┬────┬─────────┬────────────┬──────────────────────────┐
//! │ 'S'│ 'C'│ version │ payload len│ postcard(CalibrationRecord)│
//! └────┴────┴─────────┴────────────┴──────────────────────────┘
//! ```
//!
//! `load` treats every decode failure, and any field outside
//! [`VALID_PULSE_US`](super::VALID_PULSE_US), as "no data". `save` writes
//! unconditionally and never reports failure to the caller.

use log::{info, warn};

use super::CalibrationRecord;
use crate::app::ports::ByteStorePort;
use crate::error::RecordError;

pub const RECORD_ADDR: u16 = 0;
pub const RECORD_CAPACITY: usize = 32;
pub const RECORD_VERSION: u8 = 1;

const TAG: [u8; 2] = *b"SC";
const HEADER_LEN: usize = 4;

/// Serialize `record` into its on-store image. Returns the number of
/// bytes of `buf` used.
pub fn encode_record(
    record: &CalibrationRecord,
    buf: &mut [u8; RECORD_CAPACITY],
) -> Result<usize, RecordError> {
    let payload_len = postcard::to_slice(record, &mut buf[HEADER_LEN..])
        .map_err(|_| RecordError::Corrupted)?
        .len();
    buf[..2].copy_from_slice(&TAG);
    buf[2] = RECORD_VERSION;
    buf[3] = payload_len as u8;
    Ok(HEADER_LEN + payload_len)
}

/// Parse and validate a stored record image.
pub fn decode_record(bytes: &[u8]) -> Result<CalibrationRecord, RecordError> {
    if bytes.len() < HEADER_LEN {
        return Err(RecordError::Corrupted);
    }
    if bytes[..2] != TAG {
        return Err(RecordError::BadTag);
    }
    if bytes[2] != RECORD_VERSION {
        return Err(RecordError::UnsupportedVersion(bytes[2]));
    }
    let len = bytes[3];
    let end = HEADER_LEN + len as usize;
    if end > RECORD_CAPACITY || end > bytes.len() {
        return Err(RecordError::Oversize(len));
    }
    let record: CalibrationRecord =
        postcard::from_bytes(&bytes[HEADER_LEN..end]).map_err(|_| RecordError::Corrupted)?;
    record.validate()?;
    Ok(record)
}

/// Typed load/save of the calibration record over a byte store.
pub struct CalibrationStore<S> {
    storage: S,
}

impl<S: ByteStorePort> CalibrationStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Load the stored record. `None` if it is missing, torn, from an
    /// unknown layout, or holds any out-of-range field.
    pub fn load(&self) -> Option<CalibrationRecord> {
        let mut buf = [0u8; RECORD_CAPACITY];
        if let Err(e) = self.storage.read(RECORD_ADDR, &mut buf) {
            warn!("CalibrationStore: read failed ({})", e);
            return None;
        }
        match decode_record(&buf) {
            Ok(record) => {
                info!("CalibrationStore: loaded {}", record);
                Some(record)
            }
            Err(e) => {
                warn!("CalibrationStore: no valid record ({})", e);
                None
            }
        }
    }

    /// Write `record` as-is. Not verified by re-read; failures are logged.
    pub fn save(&mut self, record: &CalibrationRecord) {
        let mut buf = [0u8; RECORD_CAPACITY];
        let len = match encode_record(record, &mut buf) {
            Ok(len) => len,
            Err(e) => {
                warn!("CalibrationStore: encode failed ({})", e);
                return;
            }
        };
        match self.storage.write(RECORD_ADDR, &buf[..len]) {
            Ok(()) => info!("CalibrationStore: saved {}", record),
            Err(e) => warn!("CalibrationStore: write failed ({})", e),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
