// Verified patch application.
//
// Order of checks is fixed:
//   1. original length   2. original checksum
//   3. build base buffer 4. write items in stored order (last write wins)
//   5. patched length    6. patched checksum
//
// The output buffer is only handed back once every check has passed.

use crate::error::{PatchError, Result};
use crate::patch::{Checksum, PatchSet};

/// Reconstruct the patched buffer from `original` and `patch`.
///
/// Items are written in stored order; where items overlap the later one
/// wins. An item reaching past `patched_len` is reported as
/// `PatchedLengthMismatch` before the output buffer is allocated.
///
/// # Errors
///
/// `OriginalLengthMismatch` / `OriginalChecksumMismatch` when `original` is
/// not the buffer the patch was built against;
/// `PatchedLengthMismatch` / `PatchedChecksumMismatch` when the result does
/// not match what the patch promises.
///
/// # Example
/// ```
/// let original = [1u8, 2, 3];
/// let modified = [1u8, 2, 3, 4, 5];
/// let patch = mtgadiff::diff::generate(&original, &modified).unwrap();
/// assert_eq!(mtgadiff::apply::apply(&original, &patch).unwrap(), modified);
/// ```
pub fn apply(original: &[u8], patch: &PatchSet) -> Result<Vec<u8>> {
    verify_original(original, patch)?;

    let patched_len = patch.patched_len() as usize;

    // Growth past `patched_len` can only end in a length mismatch, so the
    // final size is known before anything is allocated.
    let grown_len = patch
        .max_item_end()
        .map_or(patched_len as u64, |end| end.max(patched_len as u64));
    if grown_len != patched_len as u64 {
        return Err(PatchError::PatchedLengthMismatch {
            expected: patch.patched_len(),
            actual: grown_len,
        });
    }

    let mut out = vec![0u8; patched_len];
    let base = original.len().min(patched_len);
    out[..base].copy_from_slice(&original[..base]);

    for item in patch.items() {
        let start = item.offset() as usize;
        let end = start + item.content().len();
        out[start..end].copy_from_slice(item.content());
    }

    verify_patched(&out, patch)?;

    log::debug!(
        "apply: {} -> {} bytes via {} items",
        original.len(),
        out.len(),
        patch.items().len()
    );
    Ok(out)
}

/// Check that `original` is the buffer `patch` was generated against.
pub fn verify_original(original: &[u8], patch: &PatchSet) -> Result<()> {
    if original.len() as u64 != patch.original_len() as u64 {
        return Err(PatchError::OriginalLengthMismatch {
            expected: patch.original_len(),
            actual: original.len() as u64,
        });
    }
    let actual = Checksum::of(original);
    if actual != *patch.original_checksum() {
        return Err(PatchError::OriginalChecksumMismatch {
            expected: *patch.original_checksum(),
            actual,
        });
    }
    Ok(())
}

fn verify_patched(out: &[u8], patch: &PatchSet) -> Result<()> {
    if out.len() as u64 != patch.patched_len() as u64 {
        return Err(PatchError::PatchedLengthMismatch {
            expected: patch.patched_len(),
            actual: out.len() as u64,
        });
    }
    let actual = Checksum::of(out);
    if actual != *patch.patched_checksum() {
        return Err(PatchError::PatchedChecksumMismatch {
            expected: *patch.patched_checksum(),
            actual,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::generate;
    use crate::patch::PatchItem;

    /// Patch whose checksums are computed from the given buffers, with
    /// hand-written items.
    fn handmade(original: &[u8], patched: &[u8], items: Vec<PatchItem>) -> PatchSet {
        PatchSet::from_parts(
            original.len() as u32,
            Checksum::of(original),
            patched.len() as u32,
            Checksum::of(patched),
            items,
        )
    }

    #[test]
    fn growth_roundtrip() {
        let patch = generate(&[1, 2, 3], &[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(apply(&[1, 2, 3], &patch).unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn shrink_truncates() {
        let patch = generate(&[1, 2, 3, 4, 5], &[1, 2, 3]).unwrap();
        assert_eq!(apply(&[1, 2, 3, 4, 5], &patch).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn identity_returns_copy() {
        let data = b"unchanged";
        let patch = generate(data, data).unwrap();
        assert_eq!(apply(data, &patch).unwrap(), data);
    }

    #[test]
    fn wrong_original_length() {
        let patch = generate(b"abcd", b"abce").unwrap();
        let err = apply(b"abc", &patch).unwrap_err();
        assert!(matches!(
            err,
            PatchError::OriginalLengthMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn wrong_original_content() {
        let patch = generate(b"abcd", b"abce").unwrap();
        let err = apply(b"abcX", &patch).unwrap_err();
        assert!(matches!(err, PatchError::OriginalChecksumMismatch { .. }));
    }

    #[test]
    fn overlapping_items_last_write_wins() {
        let original = [0u8; 6];
        let patched = [1u8, 2, 2, 2, 1, 0];
        let patch = handmade(
            &original,
            &patched,
            vec![
                PatchItem::new(0, vec![1, 1, 1, 1, 1]),
                PatchItem::new(1, vec![2, 2, 2]),
            ],
        );
        assert_eq!(apply(&original, &patch).unwrap(), patched);
    }

    #[test]
    fn item_past_declared_length_fails_length_check() {
        let original = [0u8; 4];
        let patch = handmade(&original, &original, vec![PatchItem::new(3, vec![7, 7, 7])]);
        let err = apply(&original, &patch).unwrap_err();
        assert!(matches!(
            err,
            PatchError::PatchedLengthMismatch {
                expected: 4,
                actual: 6
            }
        ));
    }

    #[test]
    fn far_offset_does_not_allocate() {
        let original = [0u8; 4];
        let patch = handmade(&original, &original, vec![PatchItem::new(u32::MAX, vec![1])]);
        let err = apply(&original, &patch).unwrap_err();
        assert!(matches!(
            err,
            PatchError::PatchedLengthMismatch { actual, .. } if actual == u32::MAX as u64 + 1
        ));
    }

    #[test]
    fn wrong_patched_checksum() {
        let original = b"abcd";
        let patch = handmade(original, b"abXd", vec![PatchItem::new(2, b"Y".to_vec())]);
        let err = apply(original, &patch).unwrap_err();
        assert!(matches!(err, PatchError::PatchedChecksumMismatch { .. }));
    }

    #[test]
    fn growth_region_is_zero_filled_when_items_skip_it() {
        let original = [9u8, 9];
        let patched = [9u8, 9, 0, 0, 5];
        let patch = handmade(&original, &patched, vec![PatchItem::new(4, vec![5])]);
        assert_eq!(apply(&original, &patch).unwrap(), patched);
    }
}
