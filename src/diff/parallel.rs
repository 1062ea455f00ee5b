// Chunked diff scan over the rayon thread pool.
//
// Each chunk is scanned independently with absolute offsets. A run that
// straddles a chunk boundary shows up as one item ending exactly at the
// boundary followed by one starting there; the merge joins those so the
// result is identical to the sequential scan. Within a single chunk two
// items are always separated by at least one matching byte, so
// "previous end == next offset" only ever happens across a boundary.

use rayon::prelude::*;

use super::scan_runs;
use crate::patch::PatchItem;

/// Scan two equal-length slices in `chunk_size` pieces and merge the runs.
pub fn scan_chunked(original: &[u8], modified: &[u8], chunk_size: usize) -> Vec<PatchItem> {
    debug_assert_eq!(original.len(), modified.len());
    let chunk_size = chunk_size.max(1);

    let per_chunk: Vec<Vec<PatchItem>> = original
        .par_chunks(chunk_size)
        .zip(modified.par_chunks(chunk_size))
        .enumerate()
        .map(|(idx, (o, m))| {
            let mut items = Vec::new();
            scan_runs(o, m, idx * chunk_size, &mut items);
            items
        })
        .collect();

    log::debug!(
        "diff: scanned {} bytes in {} chunks",
        original.len(),
        per_chunk.len()
    );

    merge_chunks(per_chunk)
}

/// Concatenate per-chunk items, coalescing runs split by a chunk boundary.
fn merge_chunks(per_chunk: Vec<Vec<PatchItem>>) -> Vec<PatchItem> {
    let total = per_chunk.iter().map(Vec::len).sum();
    let mut merged: Vec<PatchItem> = Vec::with_capacity(total);

    for item in per_chunk.into_iter().flatten() {
        match merged.last_mut() {
            Some(prev) if prev.end() == item.offset() as u64 => prev.append(item),
            _ => merged.push(item),
        }
    }
    merged
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
