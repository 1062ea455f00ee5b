// Patch data model.
//
// A `PatchSet` is a single-use value: it is built once (by the diff engine
// or by the decoder) and read thereafter. Fields are private so nothing can
// mutate a set after construction.

use std::fmt;

use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Checksum
// ---------------------------------------------------------------------------

/// SHA-256 digest of a whole buffer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Checksum([u8; Checksum::LEN]);

impl Checksum {
    /// Digest width in bytes.
    pub const LEN: usize = 32;

    /// Compute the digest of `data`.
    pub fn of(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Wrap raw digest bytes (e.g. as read from the wire).
    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({self})")
    }
}

// ---------------------------------------------------------------------------
// PatchItem
// ---------------------------------------------------------------------------

/// One contiguous replacement region: write `content` starting at `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchItem {
    offset: u32,
    content: Vec<u8>,
}

impl PatchItem {
    pub fn new(offset: u32, content: Vec<u8>) -> Self {
        Self { offset, content }
    }

    /// Byte position in the target buffer.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    #[inline]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Exclusive end position (`offset + len(content)`), widened so it
    /// cannot overflow for items read from untrusted input.
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.content.len() as u64
    }

    /// Bytes this item occupies on the wire (offset + length + content).
    #[inline]
    pub fn encoded_len(&self) -> usize {
        8 + self.content.len()
    }

    /// Extend this item with the content of one that starts where it ends.
    #[cfg(feature = "parallel")]
    pub(crate) fn append(&mut self, next: PatchItem) {
        debug_assert_eq!(self.end(), next.offset as u64);
        self.content.extend_from_slice(&next.content);
    }
}

// ---------------------------------------------------------------------------
// PatchSet
// ---------------------------------------------------------------------------

/// A complete, self-verifying delta between two buffers.
///
/// Lengths and checksums are always populated, even when `items` is empty
/// (identical inputs). Items are kept in the order they were produced or
/// stored; nothing re-sorts them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSet {
    original_len: u32,
    original_checksum: Checksum,
    patched_len: u32,
    patched_checksum: Checksum,
    items: Vec<PatchItem>,
}

impl PatchSet {
    /// Fixed-size prefix of the wire encoding: magic, version, both
    /// length/checksum blocks and the item count.
    pub const HEADER_LEN: usize = 8 + 2 + (4 + Checksum::LEN) * 2 + 4;

    /// Assemble a patch set from its parts.
    pub fn from_parts(
        original_len: u32,
        original_checksum: Checksum,
        patched_len: u32,
        patched_checksum: Checksum,
        items: Vec<PatchItem>,
    ) -> Self {
        Self {
            original_len,
            original_checksum,
            patched_len,
            patched_checksum,
            items,
        }
    }

    pub fn original_len(&self) -> u32 {
        self.original_len
    }

    pub fn original_checksum(&self) -> &Checksum {
        &self.original_checksum
    }

    pub fn patched_len(&self) -> u32 {
        self.patched_len
    }

    pub fn patched_checksum(&self) -> &Checksum {
        &self.patched_checksum
    }

    pub fn items(&self) -> &[PatchItem] {
        &self.items
    }

    /// True when the patch describes no change at all.
    pub fn is_identity(&self) -> bool {
        self.items.is_empty()
            && self.original_len == self.patched_len
            && self.original_checksum == self.patched_checksum
    }

    /// Total number of content bytes carried by all items.
    pub fn content_len(&self) -> u64 {
        self.items.iter().map(|i| i.content.len() as u64).sum()
    }

    /// Exact size of the wire encoding of this set.
    pub fn encoded_len(&self) -> usize {
        Self::HEADER_LEN + self.items.iter().map(PatchItem::encoded_len).sum::<usize>()
    }

    /// Largest `offset + len(content)` over all items, if any.
    pub fn max_item_end(&self) -> Option<u64> {
        self.items.iter().map(PatchItem::end).max()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
