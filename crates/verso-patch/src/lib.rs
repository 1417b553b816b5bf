//! Patch codec for Verso.
//!
//! Computes and applies line-level patches between two serialized document
//! contents. Patches operate on the raw text, never on the parsed document
//! tree, so the codec is independent of the rich-text schema.
//!
//! # Key Types
//!
//! - [`PatchCodec`] -- diff/apply entry point (configurable context radius)
//! - [`Patch`] / [`PatchHunk`] / [`PatchLine`] -- the self-describing patch
//! - [`PatchSummary`] -- addition/deletion counts for history listings
//!
//! # Round-trip law
//!
//! For every pair of strings `a` and `b`,
//! `codec.apply(a, &codec.encode_diff(a, b)?)? == b`. Applying a patch to any
//! other base fails with a [`PatchError`] instead of producing wrong text.

pub mod codec;
pub mod error;
pub mod patch;

pub use codec::{PatchCodec, DEFAULT_CONTEXT_LINES};
pub use error::{PatchError, PatchResult};
pub use patch::{Patch, PatchHunk, PatchLine, PatchSummary, PATCH_FORMAT};
