// MTGADIFF format identity and fixed-size header.
//
// Layout (all integers big-endian):
//
//   0   magic            8 bytes
//   8   version major    1 byte
//   9   version minor    1 byte
//   10  original length  u32
//   14  original digest  32 bytes
//   46  patched length   u32
//   50  patched digest   32 bytes
//   82  item count       u32
//   86  items...

use std::io::{Read, Write};

use crate::error::{PatchError, Result};
use crate::patch::{Checksum, PatchSet};

// ---------------------------------------------------------------------------
// Format identity
// ---------------------------------------------------------------------------

/// Magic identifier and version accepted/emitted by a codec.
///
/// Passed into [`PatchCodec`](super::PatchCodec) explicitly; there is no
/// process-wide format state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatConfig {
    pub magic: [u8; 8],
    pub version_major: u8,
    pub version_minor: u8,
}

impl FormatConfig {
    /// The MTGADIFF 1.0 format.
    pub const MTGADIFF: Self = Self {
        magic: *b"MTGADIFF",
        version_major: 0x01,
        version_minor: 0x00,
    };

    /// Exact-match version check. No forward or backward compatibility.
    #[inline]
    pub fn supports(&self, major: u8, minor: u8) -> bool {
        major == self.version_major && minor == self.version_minor
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self::MTGADIFF
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Everything before the item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchHeader {
    pub original_len: u32,
    pub original_checksum: Checksum,
    pub patched_len: u32,
    pub patched_checksum: Checksum,
    pub item_count: u32,
}

impl PatchHeader {
    /// Encoded size of the header, magic and version included.
    pub const LEN: usize = PatchSet::HEADER_LEN;

    /// Header describing `patch`.
    ///
    /// Fails with `InputTooLarge` if the set holds more items than the
    /// 32-bit count field can describe.
    pub fn for_patch(patch: &PatchSet) -> Result<Self> {
        let count = patch.items().len();
        let item_count =
            u32::try_from(count).map_err(|_| PatchError::InputTooLarge { len: count })?;
        Ok(Self {
            original_len: patch.original_len(),
            original_checksum: *patch.original_checksum(),
            patched_len: patch.patched_len(),
            patched_checksum: *patch.patched_checksum(),
            item_count,
        })
    }

    /// Write magic, version and the header fields.
    pub fn encode<W: Write>(&self, format: &FormatConfig, w: &mut W) -> Result<()> {
        w.write_all(&format.magic)?;
        w.write_all(&[format.version_major, format.version_minor])?;
        w.write_all(&self.original_len.to_be_bytes())?;
        w.write_all(self.original_checksum.as_bytes())?;
        w.write_all(&self.patched_len.to_be_bytes())?;
        w.write_all(self.patched_checksum.as_bytes())?;
        w.write_all(&self.item_count.to_be_bytes())?;
        Ok(())
    }

    /// Read and validate magic and version, then read the header fields.
    ///
    /// Checks run in wire order: a bad magic is reported before the
    /// version is even read.
    pub fn decode<R: Read>(format: &FormatConfig, r: &mut R) -> Result<Self> {
        let magic: [u8; 8] = read_array(r, "magic")?;
        if magic != format.magic {
            return Err(PatchError::MalformedFormat { found: magic });
        }

        let [major, minor]: [u8; 2] = read_array(r, "version")?;
        if !format.supports(major, minor) {
            return Err(PatchError::UnsupportedVersion { major, minor });
        }

        let original_len = read_u32(r, "original length")?;
        let original_checksum = Checksum::from_bytes(read_array(r, "original checksum")?);
        let patched_len = read_u32(r, "patched length")?;
        let patched_checksum = Checksum::from_bytes(read_array(r, "patched checksum")?);
        let item_count = read_u32(r, "item count")?;

        Ok(Self {
            original_len,
            original_checksum,
            patched_len,
            patched_checksum,
            item_count,
        })
    }
}

// ---------------------------------------------------------------------------
// Full-read helpers
// ---------------------------------------------------------------------------

/// Read exactly `N` bytes; a short source is `TruncatedData { field }`.
pub(crate) fn read_array<const N: usize, R: Read>(
    r: &mut R,
    field: &'static str,
) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)
        .map_err(|e| PatchError::from_read(e, field))?;
    Ok(buf)
}

pub(crate) fn read_u32<R: Read>(r: &mut R, field: &'static str) -> Result<u32> {
    read_array(r, field).map(u32::from_be_bytes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> PatchHeader {
        PatchHeader {
            original_len: 0x0102_0304,
            original_checksum: Checksum::of(b"old"),
            patched_len: 7,
            patched_checksum: Checksum::of(b"new"),
            item_count: 2,
        }
    }

    #[test]
    fn layout_matches_offsets() {
        let hdr = sample();
        let mut buf = Vec::new();
        hdr.encode(&FormatConfig::MTGADIFF, &mut buf).unwrap();

        assert_eq!(buf.len(), PatchHeader::LEN);
        assert_eq!(&buf[0..8], b"MTGADIFF");
        assert_eq!(&buf[8..10], &[0x01, 0x00]);
        assert_eq!(&buf[10..14], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&buf[14..46], hdr.original_checksum.as_bytes());
        assert_eq!(&buf[46..50], &[0, 0, 0, 7]);
        assert_eq!(&buf[50..82], hdr.patched_checksum.as_bytes());
        assert_eq!(&buf[82..86], &[0, 0, 0, 2]);
    }

    #[test]
    fn decode_reads_back_fields() {
        let hdr = sample();
        let mut buf = Vec::new();
        hdr.encode(&FormatConfig::MTGADIFF, &mut buf).unwrap();
        let decoded = PatchHeader::decode(&FormatConfig::MTGADIFF, &mut Cursor::new(&buf)).unwrap();
        assert_eq!(decoded, hdr);
    }

    #[test]
    fn rejects_bad_magic_before_version() {
        let mut buf = Vec::new();
        sample().encode(&FormatConfig::MTGADIFF, &mut buf).unwrap();
        buf[0] = b'X';
        buf[8] = 0x09;
        let err = PatchHeader::decode(&FormatConfig::MTGADIFF, &mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, PatchError::MalformedFormat { found } if &found == b"XTGADIFF"));
    }

    #[test]
    fn rejects_any_other_version() {
        for (major, minor) in [(0x01, 0x01), (0x02, 0x00), (0x00, 0x00), (0xFF, 0xFF)] {
            let mut buf = Vec::new();
            sample().encode(&FormatConfig::MTGADIFF, &mut buf).unwrap();
            buf[8] = major;
            buf[9] = minor;
            let err =
                PatchHeader::decode(&FormatConfig::MTGADIFF, &mut Cursor::new(&buf)).unwrap_err();
            assert!(
                matches!(err, PatchError::UnsupportedVersion { major: a, minor: b } if a == major && b == minor),
                "{major}.{minor} accepted"
            );
        }
    }

    #[test]
    fn truncation_names_the_field() {
        let mut buf = Vec::new();
        sample().encode(&FormatConfig::MTGADIFF, &mut buf).unwrap();

        let cases = [
            (4, "magic"),
            (9, "version"),
            (12, "original length"),
            (40, "original checksum"),
            (48, "patched length"),
            (60, "patched checksum"),
            (84, "item count"),
        ];
        for (cut, field) in cases {
            let err = PatchHeader::decode(&FormatConfig::MTGADIFF, &mut Cursor::new(&buf[..cut]))
                .unwrap_err();
            assert!(
                matches!(err, PatchError::TruncatedData { field: f } if f == field),
                "cut at {cut}: {err:?}"
            );
        }
    }

    #[test]
    fn custom_format_is_honoured() {
        let format = FormatConfig {
            magic: *b"TESTDIFF",
            version_major: 3,
            version_minor: 7,
        };
        let mut buf = Vec::new();
        sample().encode(&format, &mut buf).unwrap();
        assert_eq!(&buf[0..10], b"TESTDIFF\x03\x07");

        assert!(PatchHeader::decode(&format, &mut Cursor::new(&buf)).is_ok());
        assert!(matches!(
            PatchHeader::decode(&FormatConfig::MTGADIFF, &mut Cursor::new(&buf)),
            Err(PatchError::MalformedFormat { .. })
        ));
    }
}
