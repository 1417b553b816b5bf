use std::path::Path;

use serde::{Deserialize, Serialize};
use verso_patch::{PatchCodec, DEFAULT_CONTEXT_LINES};
use verso_store::ActiveFilter;
use verso_types::VersionNumber;

use crate::error::ConfigError;

/// Every this-many versions, a full baseline is stored.
pub const DEFAULT_BASELINE_INTERVAL: u32 = 5;

/// How soft-deleted versions take part in chain replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChainPolicy {
    /// Soft-deleting hides a version from listings only; its patch is still
    /// replayed when reconstructing later versions.
    #[default]
    IncludeInactive,
    /// Soft-deleted versions are treated as absent, so reconstructing a
    /// version past one fails with `ChainBroken`.
    ExcludeInactive,
}

impl ChainPolicy {
    /// The store filter used when walking a chain under this policy.
    pub fn filter(self) -> ActiveFilter {
        match self {
            Self::IncludeInactive => ActiveFilter::All,
            Self::ExcludeInactive => ActiveFilter::ActiveOnly,
        }
    }
}

/// Configuration for the versioning core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersioningConfig {
    /// Versions `1, 1 + k * baseline_interval` store full content.
    pub baseline_interval: u32,
    /// Whether soft-deleted deltas are replayed.
    pub chain_policy: ChainPolicy,
    /// Unchanged lines recorded around each patch hunk.
    pub context_lines: usize,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            baseline_interval: DEFAULT_BASELINE_INTERVAL,
            chain_policy: ChainPolicy::default(),
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

impl VersioningConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baseline_interval == 0 {
            return Err(ConfigError::Invalid("baseline_interval must be at least 1".into()));
        }
        Ok(())
    }

    pub fn with_baseline_interval(mut self, interval: u32) -> Self {
        self.baseline_interval = interval;
        self
    }

    pub fn with_chain_policy(mut self, policy: ChainPolicy) -> Self {
        self.chain_policy = policy;
        self
    }

    /// Whether `number` must be stored as a baseline.
    ///
    /// Equivalent to `number % interval == 1` for intervals of 2 or more;
    /// an interval of 1 makes every version a baseline.
    pub fn is_baseline(&self, number: VersionNumber) -> bool {
        (number.get() - 1) % self.baseline_interval.max(1) == 0
    }

    pub fn codec(&self) -> PatchCodec {
        PatchCodec::new(self.context_lines)
    }
}
