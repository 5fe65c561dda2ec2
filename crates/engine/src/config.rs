// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation log configuration
//!
//! Defaults suit an interactive client. A TOML file can override any field:
//!
//! ```toml
//! dir = "/var/lib/planner/oplog"
//! gc_interval = "5m"
//! retention = 1000
//! ```

use oplog_storage::OpStoreConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable that overrides the store directory
pub const DIR_ENV: &str = "OPLOG_DIR";

/// Applied records kept per plan by garbage collection
pub const DEFAULT_RETENTION: usize = 1000;

/// Time between scheduled garbage-collection passes
pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpLogConfig {
    /// Directory holding the log and its lock file
    pub dir: PathBuf,
    /// Run garbage collection in the background after initialization
    pub gc_enabled: bool,
    #[serde(with = "humantime_serde")]
    pub gc_interval: Duration,
    /// Most recent applied records kept per plan
    pub retention: usize,
    /// Dead log entries tolerated before the log is rewritten
    pub compaction_threshold: u64,
    /// Stamped on every log entry; random per open when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<String>,
}

impl Default for OpLogConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            gc_enabled: true,
            gc_interval: DEFAULT_GC_INTERVAL,
            retention: DEFAULT_RETENTION,
            compaction_threshold: OpStoreConfig::default().compaction_threshold,
            machine_id: None,
        }
    }
}

impl OpLogConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn with_gc_interval(mut self, interval: Duration) -> Self {
        self.gc_interval = interval;
        self
    }

    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_compaction_threshold(mut self, threshold: u64) -> Self {
        self.compaction_threshold = threshold;
        self
    }

    pub fn with_machine_id(mut self, machine_id: impl Into<String>) -> Self {
        self.machine_id = Some(machine_id.into());
        self
    }

    /// Disable the background collector; `collect_garbage` still works
    pub fn without_gc(mut self) -> Self {
        self.gc_enabled = false;
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Apply `OPLOG_DIR` if it is set
    pub fn with_env_overrides(self) -> Self {
        match std::env::var_os(DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self {
                dir: PathBuf::from(dir),
                ..self
            },
            _ => self,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gc_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "gc_interval must be greater than zero".to_string(),
            ));
        }
        if self.retention == 0 {
            return Err(ConfigError::Invalid(
                "retention must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn store_config(&self) -> OpStoreConfig {
        let defaults = OpStoreConfig::default();
        OpStoreConfig {
            compaction_threshold: self.compaction_threshold,
            machine_id: self.machine_id.clone().unwrap_or(defaults.machine_id),
        }
    }
}

/// `<local data dir>/oplog`, falling back to the temp dir on hosts without one
pub fn default_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("oplog")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
