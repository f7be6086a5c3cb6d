//! Card identifier value type.
//!
//! A `CardUid` is the ordered byte sequence a contactless card broadcasts
//! during selection — 4, 7 or 10 bytes for ISO 14443 single/double/triple
//! size UIDs. It is immutable once read and lives only for the duration
//! of one scan cycle.

use core::fmt::{self, Write as _};

/// Largest UID the selection protocol can produce (triple-size).
pub const MAX_UID_LEN: usize = 10;

/// An immutable card identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardUid {
    bytes: heapless::Vec<u8, MAX_UID_LEN>,
}

impl CardUid {
    /// Wrap a raw UID. Returns `None` for empty or oversized sequences.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        let bytes = heapless::Vec::from_slice(bytes).ok()?;
        Some(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Render as uppercase hex: two digits per byte, zero-padded, no
    /// separators — the exact wire form the backend expects.
    pub fn hex(&self) -> heapless::String<{ 2 * MAX_UID_LEN }> {
        let mut out = heapless::String::new();
        for b in &self.bytes {
            // Capacity is 2 * MAX_UID_LEN, so the write cannot overflow.
            let _ = write!(out, "{b:02X}");
        }
        out
    }
}

impl fmt::Display for CardUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}
