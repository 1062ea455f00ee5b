// Positional diff engine.
//
// Compares the two buffers byte-for-byte over their overlapping length and
// records each maximal run of mismatched bytes as one `PatchItem`. There is
// no alignment: an insertion near the start shifts every later byte and the
// whole tail becomes one run. The wire format depends on exactly this item
// layout, so the scan must not be "improved" in place.
//
// - `generate`      — sequential scan with default options
// - `generate_with` — scan with explicit `DiffOptions`
// - `parallel`      — chunked scan over rayon (feature `parallel`)

#[cfg(feature = "parallel")]
pub mod parallel;

use crate::error::{PatchError, Result};
use crate::patch::{Checksum, PatchItem, PatchSet};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Tuning for the diff scan. Options never change the produced patch.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Split the scan across the rayon thread pool (needs feature `parallel`;
    /// ignored otherwise).
    pub parallel: bool,
    /// Bytes of overlap handled per parallel task.
    pub chunk_size: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 1 << 20, // 1 MiB
        }
    }
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

/// Build the patch that turns `original` into `modified`.
///
/// # Errors
///
/// `EmptyInput` if either buffer is empty, `InputTooLarge` if either is
/// longer than the 32-bit length fields can describe.
///
/// # Example
/// ```
/// let patch = mtgadiff::diff::generate(&[0, 1, 2, 3, 4], &[0, 9, 9, 3, 4]).unwrap();
/// assert_eq!(patch.items().len(), 1);
/// assert_eq!(patch.items()[0].offset(), 1);
/// assert_eq!(patch.items()[0].content(), &[9, 9]);
/// ```
pub fn generate(original: &[u8], modified: &[u8]) -> Result<PatchSet> {
    generate_with(original, modified, &DiffOptions::default())
}

/// Like [`generate`], with explicit scan options.
pub fn generate_with(original: &[u8], modified: &[u8], opts: &DiffOptions) -> Result<PatchSet> {
    if original.is_empty() || modified.is_empty() {
        return Err(PatchError::EmptyInput);
    }
    let original_len = wire_len(original)?;
    let patched_len = wire_len(modified)?;

    let original_checksum = Checksum::of(original);
    let patched_checksum = Checksum::of(modified);

    if original_len == patched_len && original_checksum == patched_checksum {
        log::debug!("diff: inputs identical ({original_len} bytes), no items");
        return Ok(PatchSet::from_parts(
            original_len,
            original_checksum,
            patched_len,
            patched_checksum,
            Vec::new(),
        ));
    }

    let overlap = original.len().min(modified.len());
    let mut items = scan_overlap(&original[..overlap], &modified[..overlap], opts);

    // Growth is always a separate trailing item, even when the last run
    // ends exactly at `original.len()`.
    if modified.len() > original.len() {
        items.push(PatchItem::new(
            original_len,
            modified[original.len()..].to_vec(),
        ));
    }

    log::debug!(
        "diff: original {original_len} bytes, modified {patched_len} bytes, {} items",
        items.len()
    );

    Ok(PatchSet::from_parts(
        original_len,
        original_checksum,
        patched_len,
        patched_checksum,
        items,
    ))
}

#[cfg(feature = "parallel")]
fn scan_overlap(original: &[u8], modified: &[u8], opts: &DiffOptions) -> Vec<PatchItem> {
    if opts.parallel && original.len() > opts.chunk_size.max(1) {
        return parallel::scan_chunked(original, modified, opts.chunk_size);
    }
    let mut items = Vec::new();
    scan_runs(original, modified, 0, &mut items);
    items
}

#[cfg(not(feature = "parallel"))]
fn scan_overlap(original: &[u8], modified: &[u8], opts: &DiffOptions) -> Vec<PatchItem> {
    if opts.parallel {
        log::debug!("diff: built without `parallel`, scanning sequentially");
    }
    let mut items = Vec::new();
    scan_runs(original, modified, 0, &mut items);
    items
}

// ---------------------------------------------------------------------------
// Scan kernel
// ---------------------------------------------------------------------------

/// Append one item per maximal mismatch run of two equal-length slices.
///
/// `base` is the absolute position of `original[0]`, so chunked callers get
/// absolute offsets back.
pub(crate) fn scan_runs(original: &[u8], modified: &[u8], base: usize, items: &mut Vec<PatchItem>) {
    debug_assert_eq!(original.len(), modified.len());
    let n = original.len();
    let mut i = 0;

    while i < n {
        if original[i] == modified[i] {
            i += 1;
            continue;
        }
        let start = i;
        while i < n && original[i] != modified[i] {
            i += 1;
        }
        log::trace!("diff: run at {} len {}", base + start, i - start);
        items.push(PatchItem::new(
            (base + start) as u32,
            modified[start..i].to_vec(),
        ));
    }
}

fn wire_len(buf: &[u8]) -> Result<u32> {
    u32::try_from(buf.len()).map_err(|_| PatchError::InputTooLarge { len: buf.len() })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
