//! # Ledger Primitives
//!
//! Fixed constants compiled into the ledger core.

/// VAT rate applied to a transaction's base amount when `hasVAT` is set.
pub const VAT_RATE: f64 = 0.22;

/// Magic bytes for the Zafra backup archive header.
///
/// - File Header = Magic Bytes ("ZAFR") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"ZAFR";

/// Current backup archive format version.
///
/// Increment this when making breaking changes to the archive layout.
pub const FORMAT_VERSION: u8 = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length in bytes of any free-text record field accepted over HTTP.
pub const MAX_TEXT_LENGTH: usize = 512;

/// Maximum length in bytes of a search term.
pub const MAX_SEARCH_TERM_LENGTH: usize = 256;

/// Maximum size of a backup archive accepted for restore (64 MB).
pub const MAX_ARCHIVE_SIZE: usize = 64 * 1024 * 1024;
