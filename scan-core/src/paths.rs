//! Centralized path resolution for the scan plugin.
//!
//! All on-disk surfaces (Docker CLI config, plugin config, Snyk configstore)
//! are resolved here so the CLI and the library agree on locations.

use std::path::PathBuf;

/// Get the user's home directory.
///
/// Resolution order:
/// 1. `HOME` environment variable
/// 2. `USERPROFILE` environment variable (Windows)
/// 3. Platform default via `dirs`
pub fn home_dir() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Some(PathBuf::from(home));
        }
    }
    if let Ok(profile) = std::env::var("USERPROFILE") {
        if !profile.is_empty() {
            return Some(PathBuf::from(profile));
        }
    }
    dirs::home_dir()
}

/// Get the Docker CLI configuration directory.
///
/// Resolution order:
/// 1. `DOCKER_CONFIG` environment variable
/// 2. `~/.docker`
pub fn docker_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DOCKER_CONFIG") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    home_dir().map(|h| h.join(".docker")).unwrap_or_else(|| PathBuf::from(".docker"))
}

/// Get the Docker CLI `config.json` path (registry credentials live here).
pub fn docker_config_path() -> PathBuf {
    docker_config_dir().join("config.json")
}

/// Get the scan plugin's own `config.json` path (bundled binary location).
pub fn scan_config_path() -> PathBuf {
    docker_config_dir().join("scan").join("config.json")
}

/// Get the Snyk CLI configstore path, written by Snyk's own login flow.
pub fn snyk_config_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".config").join("configstore").join("snyk.json"))
}
