//! Version table storage for Verso.
//!
//! The versioning core treats persistence as an external relational store
//! reachable through simple keyed reads and writes. This crate defines that
//! boundary as the [`VersionStore`] trait and ships an in-memory backend.
//!
//! # Layout
//!
//! - One append-only version table keyed by `(document, version number)`.
//! - One live document row per document holding its latest full content.
//!
//! # Design Rules
//!
//! 1. Version rows are never updated after insert, except the `active` flag.
//! 2. Version rows are never physically removed.
//! 3. Inserting a version and replacing the live content is one atomic step.
//! 4. A second insert for an existing `(document, number)` fails with
//!    [`StoreError::VersionConflict`]; the store never renumbers.
//! 5. All backend errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryVersionStore;
pub use traits::{ActiveFilter, VersionStore};
