// Error type shared by the diff, codec and apply stages.
//
// Every check is fail-fast: the first violated invariant is returned to the
// caller and nothing partially built escapes. I/O faults from the byte
// source/sink are carried unchanged in `Io`; a short read during decode is
// reported as `TruncatedData` instead, naming the field that was cut off.

use std::io;

use crate::patch::Checksum;

/// Errors produced while generating, encoding, decoding or applying a patch.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// One of the two input buffers has zero length.
    #[error("empty input: both original and modified buffers must be non-empty")]
    EmptyInput,

    /// A buffer is too long to be described by the 32-bit length fields.
    #[error("input too large: {len} bytes exceeds the 32-bit format limit")]
    InputTooLarge { len: usize },

    /// The magic identifier at the start of the stream did not match.
    #[error("malformed patch: bad magic {}", escape(.found))]
    MalformedFormat { found: [u8; 8] },

    /// The version bytes are not the exact supported major/minor pair.
    #[error("unsupported patch version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// The byte source ended before `field` was fully read.
    #[error("truncated patch data while reading {field}")]
    TruncatedData { field: &'static str },

    /// The source buffer length differs from the one the patch was built for.
    #[error("original length mismatch: patch expects {expected} bytes, got {actual}")]
    OriginalLengthMismatch { expected: u32, actual: u64 },

    /// The source buffer digest differs from the one the patch was built for.
    #[error("original checksum mismatch: expected {expected}, got {actual}")]
    OriginalChecksumMismatch { expected: Checksum, actual: Checksum },

    /// The reconstructed buffer has the wrong length.
    #[error("patched length mismatch: expected {expected} bytes, got {actual}")]
    PatchedLengthMismatch { expected: u32, actual: u64 },

    /// The reconstructed buffer has the wrong digest.
    #[error("patched checksum mismatch: expected {expected}, got {actual}")]
    PatchedChecksumMismatch { expected: Checksum, actual: Checksum },

    /// Underlying transport failure while encoding or decoding.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl PatchError {
    /// Map a read failure for `field` to either `TruncatedData` or `Io`.
    pub(crate) fn from_read(err: io::Error, field: &'static str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::TruncatedData { field }
        } else {
            Self::Io(err)
        }
    }

    /// True for the four integrity failures raised by apply.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::OriginalLengthMismatch { .. }
                | Self::OriginalChecksumMismatch { .. }
                | Self::PatchedLengthMismatch { .. }
                | Self::PatchedChecksumMismatch { .. }
        )
    }
}

fn escape(bytes: &[u8]) -> String {
    bytes.escape_ascii().to_string()
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = PatchError> = std::result::Result<T, E>;
