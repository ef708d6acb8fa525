//! Configuration files read (and, for the plugin's own file, written) at scan time.

use crate::error::{Result, ScanError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The scan plugin's persistent configuration.
///
/// Written once at environment setup (Docker Desktop install), read at scan
/// time to find where the bundled Snyk binary lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Location of the bundled Snyk binary.
    pub path: PathBuf,
}

impl ScanConfig {
    /// Get the path to the plugin configuration file.
    pub fn config_path() -> PathBuf {
        paths::scan_config_path()
    }

    /// Load the plugin configuration from disk.
    ///
    /// Returns `Ok(None)` when no configuration file exists, which means no
    /// bundled binary is available to fall back to.
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(&Self::config_path())
    }

    /// Load the plugin configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScanError::Io { path: path.to_path_buf(), source: e })?;
        serde_json::from_str(&content).map(Some).map_err(|e| ScanError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save the plugin configuration to disk, creating parent directories.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save the plugin configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ScanError::Io { path: parent.to_path_buf(), source: e })?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| ScanError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, content)
            .map_err(|e| ScanError::Io { path: path.to_path_buf(), source: e })
    }
}

/// The Snyk CLI's own configstore file, recorded by `snyk auth`.
///
/// Read-only from the plugin's perspective: its presence tells us whether the
/// user already holds a Snyk session token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnykConfig {
    /// Session token recorded by the Snyk login flow.
    #[serde(default)]
    pub api: Option<String>,
}

impl SnykConfig {
    /// Read the Snyk session token from the user's configstore, if any.
    ///
    /// A missing or unreadable file is not an error: it simply means the user
    /// is not authenticated against Snyk and a Docker scan token is needed.
    pub fn session_token() -> Option<String> {
        let path = paths::snyk_config_path()?;
        Self::session_token_at(&path)
    }

    /// Read the session token from an explicit configstore path.
    pub fn session_token_at(path: &Path) -> Option<String> {
        if !path.exists() {
            return None;
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                debug!(path = %path.display(), "unreadable Snyk config: {}", err);
                return None;
            }
        };
        let config: SnykConfig = match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                debug!(path = %path.display(), "malformed Snyk config: {}", err);
                return None;
            }
        };
        config.api.filter(|token| !token.is_empty())
    }
}
