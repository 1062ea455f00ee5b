//! mtgadiff: positional binary patches in the MTGADIFF format.
//!
//! The crate provides:
//! - A positional diff engine (`diff`)
//! - The MTGADIFF 1.0 wire codec (`codec`)
//! - Verified patch application (`apply`)
//! - File-oriented helpers (`io`, `file-io` feature)
//! - An optional CLI (`cli` feature)
//!
//! Every patch carries the length and SHA-256 digest of both buffers, and
//! `apply` refuses to return anything that does not match them.
//!
//! # Quick Start
//!
//! ```
//! use mtgadiff::{apply, codec, diff};
//!
//! let original = b"hello old world";
//! let modified = b"hello new world!";
//!
//! let patch = diff::generate(original, modified).unwrap();
//!
//! let mut bytes = Vec::new();
//! codec::encode(&patch, &mut bytes).unwrap();
//! let decoded = codec::decode(&mut bytes.as_slice()).unwrap();
//!
//! let rebuilt = apply::apply(original, &decoded).unwrap();
//! assert_eq!(rebuilt, modified);
//! ```

pub mod apply;
pub mod codec;
pub mod diff;
pub mod error;
pub mod patch;

#[cfg(feature = "file-io")]
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{PatchError, Result};
pub use patch::{Checksum, PatchItem, PatchSet};
