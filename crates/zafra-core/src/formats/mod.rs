//! # Backup Formats
//!
//! Whole-ledger snapshot serialization. File I/O lives in the app layer.

pub mod persistence;

pub use persistence::{
    LedgerArchive, PersistenceHeader, SlotImage, archive_from_bytes, archive_to_bytes,
};

#[cfg(feature = "crypto-hash")]
pub use persistence::{archive_digest, verify_archive_digest};
