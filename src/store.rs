//! Config file classification and persistence
//!
//! The store looks at two facts about the file, whether it exists and
//! whether it parses as a [`ProxyConfig`], and derives both the reported
//! [`FileStatus`] and the write strategy from them.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::ProxyConfig;
use crate::error::{Error, Result};
use crate::persist;

/// Classification of a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Nonexistent,
    Invalid,
    Valid,
    /// Not classified yet; existence is checked when persisting
    Unknown,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Nonexistent => "nonexistent",
            FileStatus::Invalid => "invalid",
            FileStatus::Valid => "valid",
            FileStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a write will land on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistAction {
    /// No file yet
    Create,
    /// An existing file is replaced wholesale
    Replace,
}

impl PersistAction {
    fn for_existence(exists: bool) -> Self {
        if exists {
            PersistAction::Replace
        } else {
            PersistAction::Create
        }
    }
}

/// The config file inside a data directory
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn is_well_formed(&self) -> bool {
        self.load().is_ok()
    }

    pub fn classify(&self) -> FileStatus {
        match (self.exists(), self.is_well_formed()) {
            (false, _) => FileStatus::Nonexistent,
            (true, false) => FileStatus::Invalid,
            (true, true) => FileStatus::Valid,
        }
    }

    /// The write strategy for a given status
    pub fn action_for(&self, status: FileStatus) -> PersistAction {
        match status {
            FileStatus::Nonexistent => PersistAction::Create,
            FileStatus::Invalid | FileStatus::Valid => PersistAction::Replace,
            FileStatus::Unknown => PersistAction::for_existence(self.exists()),
        }
    }

    pub fn load(&self) -> Result<ProxyConfig> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::filesystem("read", &self.path, e))?;
        ProxyConfig::from_json(&content)
    }

    /// Write `config`, choosing the strategy from `status`
    pub fn persist(&self, config: &ProxyConfig, status: FileStatus) -> Result<PersistAction> {
        let action = self.action_for(status);
        let json = config.to_pretty_json()?;

        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            persist::ensure_dir(dir)?;
        }
        persist::write_atomic(&self.path, json.as_bytes(), 0o644)?;

        tracing::info!(
            path = %self.path.display(),
            status = %status,
            action = ?action,
            endpoints = config.endpoints.len(),
            "Config written"
        );
        Ok(action)
    }

    /// Rewrite the `https` flag of an existing, valid config
    pub fn set_https(&self, enabled: bool) -> Result<ProxyConfig> {
        match self.classify() {
            FileStatus::Valid => {}
            FileStatus::Invalid => {
                return Err(Error::config(format!(
                    "your config at {} is invalid; regenerate it by running setup again",
                    self.path.display()
                )));
            }
            FileStatus::Nonexistent | FileStatus::Unknown => {
                return Err(Error::missing(
                    &self.path,
                    "generate one by running setup, or point --data-dir at an existing one",
                ));
            }
        }

        let mut config = self.load()?;
        config.config.https = Some(enabled);
        self.persist(&config, FileStatus::Valid)?;
        Ok(config)
    }
}
