// File-level helpers around the in-memory core.
//
// Provides `create_patch_file()`, `apply_patch_file()` and
// `read_patch_info()`. Inputs are read fully into memory; outputs go through
// `BufWriter`. A reconstructed file is only created after `apply` has
// verified the result, so a failed apply never leaves a partial output.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use crate::apply;
use crate::codec::{PatchCodec, PatchHeader};
use crate::diff::{self, DiffOptions};
use crate::error::PatchError;
use crate::patch::{Checksum, PatchSet};

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `create_patch_file()`.
#[derive(Debug, Clone)]
pub struct CreateStats {
    /// Original file size in bytes.
    pub original_size: u64,
    /// Modified file size in bytes.
    pub modified_size: u64,
    /// Patch file size in bytes.
    pub patch_size: u64,
    /// Number of patch items written.
    pub items: u64,
    /// Content bytes carried by the items.
    pub content_bytes: u64,
    pub original_sha256: Checksum,
    pub modified_sha256: Checksum,
}

/// Statistics returned by `apply_patch_file()`.
#[derive(Debug, Clone)]
pub struct ApplyStats {
    pub original_size: u64,
    /// Patch file size on disk, trailing bytes included.
    pub patch_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// Number of patch items applied.
    pub items: u64,
    /// Verified SHA-256 of the reconstructed output.
    pub output_sha256: Checksum,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// File open/read/write failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Diff, format or verification failure from the core.
    #[error(transparent)]
    Patch(#[from] PatchError),
}

// ---------------------------------------------------------------------------
// create_patch_file
// ---------------------------------------------------------------------------

/// Diff `original_path` against `modified_path` and write the patch to
/// `patch_path`.
pub fn create_patch_file(
    original_path: &Path,
    modified_path: &Path,
    patch_path: &Path,
    opts: &DiffOptions,
) -> Result<CreateStats, IoError> {
    let original = std::fs::read(original_path)?;
    let modified = std::fs::read(modified_path)?;

    let patch = diff::generate_with(&original, &modified, opts)?;

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(patch_path)?);
    PatchCodec::default().encode(&patch, &mut writer)?;
    writer.flush()?;

    log::info!(
        "created patch {} ({} items)",
        patch_path.display(),
        patch.items().len()
    );

    Ok(CreateStats {
        original_size: original.len() as u64,
        modified_size: modified.len() as u64,
        patch_size: patch.encoded_len() as u64,
        items: patch.items().len() as u64,
        content_bytes: patch.content_len(),
        original_sha256: *patch.original_checksum(),
        modified_sha256: *patch.patched_checksum(),
    })
}

// ---------------------------------------------------------------------------
// apply_patch_file
// ---------------------------------------------------------------------------

/// Apply the patch at `patch_path` to `original_path`.
///
/// With `output_path = None` the result is verified and discarded
/// (check-only mode).
pub fn apply_patch_file(
    original_path: &Path,
    patch_path: &Path,
    output_path: Option<&Path>,
) -> Result<ApplyStats, IoError> {
    let original = std::fs::read(original_path)?;
    let patch_size = std::fs::metadata(patch_path)?.len();
    let patch = read_patch_file(patch_path)?;

    let output = apply::apply(&original, &patch)?;

    if let Some(path) = output_path {
        let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(path)?);
        writer.write_all(&output)?;
        writer.flush()?;
        log::info!("applied patch to {}", path.display());
    }

    Ok(ApplyStats {
        original_size: original.len() as u64,
        patch_size,
        output_size: output.len() as u64,
        items: patch.items().len() as u64,
        output_sha256: *patch.patched_checksum(),
    })
}

// ---------------------------------------------------------------------------
// Reading patches
// ---------------------------------------------------------------------------

/// Decode the full patch stored at `path`.
pub fn read_patch_file(path: &Path) -> Result<PatchSet, IoError> {
    let mut reader = BufReader::with_capacity(BUF_SIZE, File::open(path)?);
    Ok(PatchCodec::default().decode(&mut reader)?)
}

/// Decode only the fixed header of the patch at `path`.
pub fn read_patch_info(path: &Path) -> Result<PatchHeader, IoError> {
    let mut reader = BufReader::new(File::open(path)?);
    Ok(PatchCodec::default().decode_header(&mut reader)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
