//! Patch computation.
//!
//! Uses the `similar` crate (Myers diff algorithm) over line tokens and groups
//! the resulting operations into hunks with context lines.

use similar::{capture_diff_slices, group_diff_ops, Algorithm, DiffTag};

use crate::error::PatchResult;
use crate::patch::{digest, split_lines, Patch, PatchHunk, PatchLine, PATCH_FORMAT};

/// Context lines kept around each hunk unless configured otherwise.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// Computes and applies patches between serialized contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatchCodec {
    context_lines: usize,
}

impl PatchCodec {
    pub fn new(context_lines: usize) -> Self {
        Self { context_lines }
    }

    pub fn context_lines(&self) -> usize {
        self.context_lines
    }

    /// Compute the patch turning `old` into `new`.
    ///
    /// The texts are treated as opaque: any `String` is a valid input,
    /// including the empty string and text without line breaks.
    pub fn diff(&self, old: &str, new: &str) -> Patch {
        let old_lines = split_lines(old);
        let new_lines = split_lines(new);

        let ops = capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines);
        let mut hunks = Vec::new();

        for group in group_diff_ops(ops, self.context_lines) {
            let Some(first) = group.first() else { continue };
            let mut hunk = PatchHunk {
                old_start: first.old_range().start,
                new_start: first.new_range().start,
                lines: Vec::new(),
            };

            for op in &group {
                let (tag, old_range, new_range) = op.as_tag_tuple();
                match tag {
                    DiffTag::Equal => hunk.lines.extend(
                        old_lines[old_range].iter().map(|l| PatchLine::Context(l.to_string())),
                    ),
                    DiffTag::Delete => hunk.lines.extend(
                        old_lines[old_range].iter().map(|l| PatchLine::Delete(l.to_string())),
                    ),
                    DiffTag::Insert => hunk.lines.extend(
                        new_lines[new_range].iter().map(|l| PatchLine::Insert(l.to_string())),
                    ),
                    DiffTag::Replace => {
                        hunk.lines.extend(
                            old_lines[old_range].iter().map(|l| PatchLine::Delete(l.to_string())),
                        );
                        hunk.lines.extend(
                            new_lines[new_range].iter().map(|l| PatchLine::Insert(l.to_string())),
                        );
                    }
                }
            }

            if hunk.lines.iter().any(|l| !matches!(l, PatchLine::Context(_))) {
                hunks.push(hunk);
            }
        }

        Patch {
            format: PATCH_FORMAT,
            base_len: old.len(),
            result_len: new.len(),
            result_digest: digest(new),
            hunks,
        }
    }

    /// Compute the patch turning `old` into `new` and serialize it.
    pub fn encode_diff(&self, old: &str, new: &str) -> PatchResult<String> {
        self.diff(old, new).encode()
    }

    /// Decode a serialized patch and apply it to `base`.
    pub fn apply(&self, base: &str, blob: &str) -> PatchResult<String> {
        Patch::decode(blob)?.apply(base)
    }
}

impl Default for PatchCodec {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_LINES)
    }
}
