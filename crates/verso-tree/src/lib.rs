//! Rich-text documents and their structural comparison for Verso.
//!
//! Stored versions are opaque strings; this crate reads them as editor
//! document trees and compares two of them for human review.
//!
//! # Key Types
//!
//! - [`Node`] / [`Mark`] -- Document tree: containers and marked text leaves
//! - [`DocumentDiff`] / [`DiffNode`] / [`Change`] -- Merged tree annotated with
//!   added, removed, and moved spans at block and character granularity
//! - [`DiffStats`] -- Leaf counts per change kind

mod align;
pub mod diff;
pub mod error;
pub mod node;

pub use diff::{diff_documents, diff_nodes, diff_trees, Change, DiffNode, DiffStats, DocumentDiff};
pub use error::{TreeError, TreeResult};
pub use node::{parse_document, Attrs, Element, Mark, Node, Text};
