//! Scanner binary resolution and version gating.
//!
//! A user-installed Snyk binary is preferred over the bundled one, but only
//! when it is at least as recent as the version embedded by Docker Desktop.

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use semver::{Version, VersionReq};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Snyk version embedded by Docker Desktop, injected at build time.
pub const DESKTOP_SNYK_VERSION: &str = match option_env!("SNYK_DESKTOP_VERSION") {
    Some(version) => version,
    None => "unknown",
};

/// The binary a scan should invoke, plus any fallback warning to surface.
#[derive(Debug, Clone)]
pub struct ResolvedBinary {
    pub path: PathBuf,
    /// Set when an obsolete user-installed binary was skipped.
    pub fallback_warning: Option<String>,
}

/// Reduce raw `--version` output to its leading version field.
///
/// Snyk prints `1.563.0 (standalone)`; only the first whitespace-separated
/// field is the semantic version.
pub fn clean_version(raw: &str) -> &str {
    raw.trim().split_whitespace().next().unwrap_or("")
}

/// Minimum acceptable version for a user-installed binary.
pub fn minimum_requirement() -> Result<VersionReq> {
    requirement_for(DESKTOP_SNYK_VERSION)
}

fn requirement_for(desktop_version: &str) -> Result<VersionReq> {
    VersionReq::parse(&format!(">={}", desktop_version))
        .map_err(|_| ScanError::InvalidVersion { output: desktop_version.to_string() })
}

/// Check raw `--version` output against a minimum requirement.
///
/// Returns the parsed version when it satisfies the requirement, and
/// `ObsoleteBinary` when it is too old.
pub fn check_version_output(output: &str, minimum: &VersionReq) -> Result<Version> {
    let version = Version::parse(clean_version(output))
        .map_err(|_| ScanError::InvalidVersion { output: output.to_string() })?;
    if !minimum.matches(&version) {
        return Err(ScanError::ObsoleteBinary {
            installed: version.to_string(),
            minimum: minimum.to_string(),
        });
    }
    Ok(version)
}

/// Run `--version` on a candidate binary and gate it against `minimum`.
pub async fn check_user_binary(path: &Path, minimum: &VersionReq) -> Result<Version> {
    let output = Command::new(path).arg("--version").output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ScanError::BinaryNotFound
        } else {
            ScanError::Io { path: path.to_path_buf(), source: e }
        }
    })?;
    if !output.status.success() {
        return Err(ScanError::VersionFailed {
            reason: format!("exit status {}", output.status.code().unwrap_or(-1)),
        });
    }
    check_version_output(&String::from_utf8_lossy(&output.stdout), minimum)
}

/// Find a user-installed Snyk binary in common locations.
pub fn find_snyk_binary() -> Option<PathBuf> {
    if let Ok(output) = std::process::Command::new("which").arg("snyk").output() {
        if output.status.success() {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
    }

    let common_paths = ["/usr/local/bin/snyk", "/usr/bin/snyk", "/opt/homebrew/bin/snyk"];
    for path in common_paths {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Decide which Snyk binary a scan should use.
///
/// A user-installed binary wins when it passes the version gate; otherwise the
/// bundled binary recorded in the plugin configuration is used, with a warning
/// when the user binary was skipped for being obsolete.
pub async fn resolve_binary() -> Result<ResolvedBinary> {
    let mut fallback_warning = None;

    if let Some(user_path) = find_snyk_binary() {
        match minimum_requirement() {
            Ok(minimum) => match check_user_binary(&user_path, &minimum).await {
                Ok(installed) => {
                    debug!(path = %user_path.display(), %installed, "using user-installed Snyk binary");
                    return Ok(ResolvedBinary { path: user_path, fallback_warning: None });
                }
                Err(err @ ScanError::ObsoleteBinary { .. }) => {
                    debug!(path = %user_path.display(), "user-installed Snyk binary is obsolete");
                    fallback_warning = Some(err.to_string());
                }
                Err(err) => {
                    debug!(path = %user_path.display(), "ignoring user-installed Snyk binary: {}", err);
                }
            },
            Err(err) => {
                debug!("cannot gate user-installed Snyk binary: {}", err);
            }
        }
    }

    match ScanConfig::load()? {
        Some(config) => Ok(ResolvedBinary { path: config.path, fallback_warning }),
        None => Err(ScanError::BinaryNotFound),
    }
}
