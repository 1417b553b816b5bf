//! Version history for Verso.
//!
//! This crate owns the storage-efficiency policy and its inverse:
//!
//! - [`VersionSequencer`] numbers each save and decides whether it is stored
//!   as a full baseline or as a patch against the previous version.
//! - [`ContentReconstructor`] rebuilds any version by locating the nearest
//!   preceding baseline and replaying patches forward, failing loudly on a
//!   missing baseline, a gap in the chain, or a patch that does not fit.
//! - [`VersioningConfig`] carries the baseline interval, the chain policy for
//!   soft-deleted versions, and the patch context radius.
//!
//! Neither component keeps in-process state between calls: every operation
//! re-reads the store, so version numbering is always derived from a fresh
//! `max(version)` read.

pub mod config;
pub mod error;
pub mod reconstructor;
pub mod sequencer;
pub mod summary;

pub use config::{ChainPolicy, VersioningConfig, DEFAULT_BASELINE_INTERVAL};
pub use error::{ConfigError, HistoryError, HistoryResult};
pub use reconstructor::ContentReconstructor;
pub use sequencer::{SaveOutcome, VersionSequencer};
pub use summary::ChangeSummary;
