//! The serialized patch format.
//!
//! A patch records, for each changed region, the line offsets it applies at
//! and the exact context, deleted, and inserted lines (terminators included).
//! It also records the base length and the BLAKE3 digest of the result, so
//! applying it to the wrong base is always detected.

use serde::{Deserialize, Serialize};

use crate::error::{PatchError, PatchResult};

/// Current patch format revision.
pub const PATCH_FORMAT: u32 = 1;

/// A self-describing patch from one text to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    /// Format revision, checked on decode.
    pub format: u32,
    /// Byte length of the text this patch was computed against.
    pub base_len: usize,
    /// Byte length of the text this patch produces.
    pub result_len: usize,
    /// Hex BLAKE3 digest of the text this patch produces.
    pub result_digest: String,
    /// Changed regions in ascending order of `old_start`.
    pub hunks: Vec<PatchHunk>,
}

/// A contiguous region of changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchHunk {
    /// Index (0-based) of the first base line covered by this hunk.
    pub old_start: usize,
    /// Index (0-based) of the first result line covered by this hunk.
    pub new_start: usize,
    pub lines: Vec<PatchLine>,
}

impl PatchHunk {
    /// Number of base lines this hunk consumes.
    pub fn old_count(&self) -> usize {
        self.lines.iter().filter(|l| !l.is_insert()).count()
    }

    /// Number of result lines this hunk produces.
    pub fn new_count(&self) -> usize {
        self.lines.iter().filter(|l| !l.is_delete()).count()
    }
}

/// A single line in a hunk, with its line terminator if it had one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "text", rename_all = "lowercase")]
pub enum PatchLine {
    /// Present in both base and result; must match the base on apply.
    Context(String),
    /// Present only in the base; must match the base on apply.
    Delete(String),
    /// Present only in the result.
    Insert(String),
}

impl PatchLine {
    pub fn text(&self) -> &str {
        match self {
            Self::Context(t) | Self::Delete(t) | Self::Insert(t) => t,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Self::Insert(_))
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete(_))
    }
}

/// Line counts describing a patch, shown in version listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSummary {
    pub additions: usize,
    pub deletions: usize,
    pub hunks: usize,
}

impl Patch {
    /// Returns `true` if the patch leaves its base unchanged.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Total lines inserted across all hunks.
    pub fn additions(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.is_insert())
            .count()
    }

    /// Total lines deleted across all hunks.
    pub fn deletions(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.is_delete())
            .count()
    }

    pub fn summary(&self) -> PatchSummary {
        PatchSummary {
            additions: self.additions(),
            deletions: self.deletions(),
            hunks: self.hunks.len(),
        }
    }

    /// Serialize to the stored textual form.
    pub fn encode(&self) -> PatchResult<String> {
        serde_json::to_string(self).map_err(|e| PatchError::Serialization(e.to_string()))
    }

    /// Parse the stored textual form, rejecting unknown format revisions.
    pub fn decode(blob: &str) -> PatchResult<Self> {
        let patch: Patch =
            serde_json::from_str(blob).map_err(|e| PatchError::Malformed(e.to_string()))?;
        if patch.format != PATCH_FORMAT {
            return Err(PatchError::UnsupportedFormat(patch.format));
        }
        Ok(patch)
    }

    /// Apply this patch to `base`, verifying every context and deleted line
    /// and the digest of the result.
    pub fn apply(&self, base: &str) -> PatchResult<String> {
        if base.len() != self.base_len {
            return Err(PatchError::LengthMismatch {
                expected: self.base_len,
                actual: base.len(),
            });
        }

        let old: Vec<&str> = split_lines(base);
        let mut out = String::with_capacity(self.result_len);
        let mut cursor = 0usize;

        for hunk in &self.hunks {
            if hunk.old_start < cursor || hunk.old_start > old.len() {
                return Err(PatchError::Malformed(format!(
                    "hunk at line {} is out of order or out of range",
                    hunk.old_start + 1
                )));
            }
            for line in &old[cursor..hunk.old_start] {
                out.push_str(line);
            }
            cursor = hunk.old_start;

            for line in &hunk.lines {
                match line {
                    PatchLine::Context(expected) | PatchLine::Delete(expected) => {
                        let found = old.get(cursor).copied();
                        if found != Some(expected.as_str()) {
                            return Err(PatchError::ContextMismatch {
                                line: cursor + 1,
                                expected: expected.clone(),
                                found: found.map(str::to_string),
                            });
                        }
                        if !line.is_delete() {
                            out.push_str(expected);
                        }
                        cursor += 1;
                    }
                    PatchLine::Insert(text) => out.push_str(text),
                }
            }
        }

        for line in &old[cursor..] {
            out.push_str(line);
        }

        let computed = digest(&out);
        if out.len() != self.result_len || computed != self.result_digest {
            return Err(PatchError::DigestMismatch {
                expected: self.result_digest.clone(),
                computed,
            });
        }
        Ok(out)
    }
}

/// Split text into lines, keeping each line's `\n` terminator.
///
/// Concatenating the result always reproduces the input exactly.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Hex BLAKE3 digest of `text`.
pub(crate) fn digest(text: &str) -> String {
    hex::encode(blake3::hash(text.as_bytes()).as_bytes())
}
