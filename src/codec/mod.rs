// MTGADIFF wire codec.
//
// `encode` writes the header followed by every item as
// offset(u32) + length(u32) + content. `decode` validates magic and version,
// then reads exactly `item_count` items in stored order. Every read is a
// full read; a source that ends early yields `TruncatedData`, never a
// silently short field.
//
// Decode trusts the stored item order and does not check for overlapping
// or non-monotonic offsets.
//
// - `header` — `FormatConfig` and the fixed 86-byte `PatchHeader`

pub mod header;

use std::io::{Read, Write};

use crate::error::{PatchError, Result};
use crate::patch::{PatchItem, PatchSet};

pub use header::{FormatConfig, PatchHeader};

use header::read_u32;

/// Upper bound on speculative allocation driven by untrusted length fields.
/// Larger items/lists still decode; they just grow as bytes actually arrive.
const MAX_PREALLOC_ITEMS: usize = 4096;
const MAX_PREALLOC_BYTES: usize = 1 << 20; // 1 MiB

// ---------------------------------------------------------------------------
// PatchCodec
// ---------------------------------------------------------------------------

/// Encoder/decoder bound to one format identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchCodec {
    format: FormatConfig,
}

impl PatchCodec {
    pub const fn new(format: FormatConfig) -> Self {
        Self { format }
    }

    /// Serialize `patch` to `w`.
    ///
    /// Only fails on a write fault (`Io`) or on an item too long for the
    /// 32-bit length field.
    pub fn encode<W: Write>(&self, patch: &PatchSet, w: &mut W) -> Result<()> {
        let header = PatchHeader::for_patch(patch)?;
        header.encode(&self.format, w)?;

        for item in patch.items() {
            let len = item.content().len();
            let len = u32::try_from(len).map_err(|_| PatchError::InputTooLarge { len })?;
            w.write_all(&item.offset().to_be_bytes())?;
            w.write_all(&len.to_be_bytes())?;
            w.write_all(item.content())?;
        }

        log::debug!(
            "codec: encoded {} items ({} bytes)",
            header.item_count,
            patch.encoded_len()
        );
        Ok(())
    }

    /// Serialize `patch` into a freshly allocated, exactly sized buffer.
    pub fn encode_to_vec(&self, patch: &PatchSet) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(patch.encoded_len());
        self.encode(patch, &mut out)?;
        Ok(out)
    }

    /// Read only the fixed header, leaving `r` positioned at the first item.
    pub fn decode_header<R: Read>(&self, r: &mut R) -> Result<PatchHeader> {
        PatchHeader::decode(&self.format, r)
    }

    /// Deserialize a patch set from `r`.
    pub fn decode<R: Read>(&self, r: &mut R) -> Result<PatchSet> {
        let header = self.decode_header(r)?;
        let count = header.item_count as usize;

        let mut items = Vec::with_capacity(count.min(MAX_PREALLOC_ITEMS));
        for _ in 0..count {
            let offset = read_u32(r, "item offset")?;
            let len = read_u32(r, "item length")?;
            let content = read_content(r, len)?;
            log::trace!("codec: item at {offset} len {len}");
            items.push(PatchItem::new(offset, content));
        }

        log::debug!(
            "codec: decoded {count} items (original {} bytes, patched {} bytes)",
            header.original_len,
            header.patched_len
        );

        Ok(PatchSet::from_parts(
            header.original_len,
            header.original_checksum,
            header.patched_len,
            header.patched_checksum,
            items,
        ))
    }

    /// Deserialize from an in-memory buffer.
    ///
    /// Bytes after the last item are ignored.
    pub fn decode_slice(&self, bytes: &[u8]) -> Result<PatchSet> {
        let mut rest = bytes;
        let patch = self.decode(&mut rest)?;
        if !rest.is_empty() {
            log::debug!("codec: ignoring {} trailing bytes", rest.len());
        }
        Ok(patch)
    }
}

/// Read exactly `len` content bytes.
///
/// Reads through `take` so a hostile length cannot force a huge up-front
/// allocation; the buffer only grows as data is actually delivered.
fn read_content<R: Read>(r: &mut R, len: u32) -> Result<Vec<u8>> {
    let len = len as usize;
    let mut content = Vec::with_capacity(len.min(MAX_PREALLOC_BYTES));
    r.by_ref()
        .take(len as u64)
        .read_to_end(&mut content)
        .map_err(|e| PatchError::from_read(e, "item content"))?;
    if content.len() != len {
        return Err(PatchError::TruncatedData {
            field: "item content",
        });
    }
    Ok(content)
}

// ---------------------------------------------------------------------------
// Convenience functions
// ---------------------------------------------------------------------------

/// Encode `patch` in the MTGADIFF 1.0 format.
pub fn encode<W: Write>(patch: &PatchSet, w: &mut W) -> Result<()> {
    PatchCodec::default().encode(patch, w)
}

/// Decode an MTGADIFF 1.0 patch from `r`.
pub fn decode<R: Read>(r: &mut R) -> Result<PatchSet> {
    PatchCodec::default().decode(r)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
