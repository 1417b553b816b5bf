//! Foundation types for Verso, the document versioning subsystem.
//!
//! Every other Verso crate depends on `verso-types`.
//!
//! # Key Types
//!
//! - [`DocumentId`]: Identity of an already-authorized document (UUID v7)
//! - [`UserId`]: Identity of the authenticated user performing a save
//! - [`VersionNumber`]: Per-document, 1-based, strictly increasing revision number
//! - [`VersionRecord`]: One saved revision: either a baseline or a delta
//! - [`VersionBody`]: The baseline/delta payload, exactly one of content or patch

pub mod error;
pub mod identity;
pub mod version;

pub use error::TypeError;
pub use identity::{DocumentId, UserId};
pub use version::{VersionBody, VersionKind, VersionNumber, VersionRecord};
