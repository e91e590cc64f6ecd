//! # Persistence Format
//!
//! Binary backup archive holding every slot of a ledger.
//!
//! Format: Header (5 bytes) + postcard-serialized `LedgerArchive`.
//! - 4 bytes: Magic ("ZAFR")
//! - 1 byte: Version
//!
//! Each slot is carried as its JSON slot value, byte for byte, so a
//! restore writes back exactly what a save would have written, NaN-as-null
//! included.
//!
//! ## Validation
//!
//! Size and header are checked BEFORE the payload is decoded, and every
//! slot key must be one of the six known slots.

use crate::{LedgerError, Slot, primitives};
use serde::{Deserialize, Serialize};

/// Size of the fixed header in bytes.
const HEADER_SIZE: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The persistence header precedes all archive data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PersistenceHeader {
    /// Create a new header with current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(LedgerError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(LedgerError::DeserializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        if bytes.len() < HEADER_SIZE {
            return Err(LedgerError::DeserializationError(
                "Header too short".to_string(),
            ));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ARCHIVE
// =============================================================================

/// One slot's stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotImage {
    pub slot: String,
    pub data: Vec<u8>,
}

/// Every slot of a ledger, in `Slot::ALL` order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerArchive {
    pub slots: Vec<SlotImage>,
}

impl LedgerArchive {
    /// The stored value of `slot`, if the archive carries it.
    #[must_use]
    pub fn get(&self, slot: Slot) -> Option<&[u8]> {
        self.slots
            .iter()
            .find(|image| image.slot == slot.key())
            .map(|image| image.data.as_slice())
    }

    /// Add or replace the value of `slot`.
    pub fn insert(&mut self, slot: Slot, data: Vec<u8>) {
        match self.slots.iter_mut().find(|image| image.slot == slot.key()) {
            Some(image) => image.data = data,
            None => self.slots.push(SlotImage {
                slot: slot.key().to_string(),
                data,
            }),
        }
    }

    fn validate(&self) -> Result<(), LedgerError> {
        for image in &self.slots {
            if Slot::from_key(&image.slot).is_none() {
                return Err(LedgerError::DeserializationError(format!(
                    "Unknown slot '{}' in archive",
                    image.slot
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize an archive to bytes (header + payload).
///
/// This is a pure transformation - no file I/O.
pub fn archive_to_bytes(archive: &LedgerArchive) -> Result<Vec<u8>, LedgerError> {
    let header = PersistenceHeader::new();

    let payload = postcard::to_stdvec(archive)
        .map_err(|e| LedgerError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(&header.to_bytes());
    result.extend_from_slice(&payload);

    Ok(result)
}

/// Deserialize an archive from bytes.
///
/// This is a pure transformation - no file I/O.
///
/// Checks, in order: minimum size, maximum size, header, payload, slot keys.
pub fn archive_from_bytes(bytes: &[u8]) -> Result<LedgerArchive, LedgerError> {
    if bytes.len() < HEADER_SIZE {
        return Err(LedgerError::DeserializationError(
            "Data too short: minimum 5 bytes required".to_string(),
        ));
    }

    if bytes.len() > primitives::MAX_ARCHIVE_SIZE {
        return Err(LedgerError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            primitives::MAX_ARCHIVE_SIZE
        )));
    }

    let header = PersistenceHeader::from_bytes(bytes)?;
    header.validate()?;

    let archive: LedgerArchive = postcard::from_bytes(&bytes[HEADER_SIZE..]).map_err(|e| {
        LedgerError::DeserializationError(format!("Failed to decode archive data: {}", e))
    })?;
    archive.validate()?;

    Ok(archive)
}

// =============================================================================
// CRYPTOGRAPHIC DIGEST
// =============================================================================

/// BLAKE3 digest of serialized archive bytes, as 64 hex characters.
#[cfg(feature = "crypto-hash")]
#[must_use]
pub fn archive_digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Whether `bytes` hash to `expected_hex`.
#[cfg(feature = "crypto-hash")]
#[must_use]
pub fn verify_archive_digest(bytes: &[u8], expected_hex: &str) -> bool {
    archive_digest(bytes).eq_ignore_ascii_case(expected_hex.trim())
}

// =============================================================================
// TESTS
// =============================================================================
