//! Error types for the scan plugin.
//!
//! All errors use `thiserror` for ergonomic error handling and proper error chains.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Main error type for the scan plugin.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The Snyk binary is neither installed nor bundled at the configured path.
    #[error("could not find Snyk binary")]
    BinaryNotFound,

    /// A token passed to `--login` that does not parse as a UUID.
    #[error("invalid authentication token: {token}")]
    InvalidToken { token: String },

    /// The host CLI holds no Docker Hub credential.
    #[error(
        "You need to be logged in to Docker Hub to use scan feature.\n\
         please login to Docker Hub using the Docker Login command"
    )]
    AuthenticationRequired,

    /// The Hub identity service did not hand out a scan token.
    #[error("failed to get DockerScanID: {reason}")]
    TokenFetchFailed { reason: String },

    /// Running `snyk --version` failed outright.
    #[error("failed to get snyk version: {reason}")]
    VersionFailed { reason: String },

    /// The scanner's version output did not parse as a semantic version.
    #[error("failed to parse Snyk version from {output:?}")]
    InvalidVersion { output: String },

    /// A user-installed scanner older than the bundled minimum.
    #[error(
        "The Snyk version {installed} installed on your system is older than the one \
         embedded by Docker Desktop ({minimum}), using embedded Snyk version instead."
    )]
    ObsoleteBinary { installed: String, minimum: String },

    /// A config file exists but does not hold what it should.
    #[error("invalid configuration at {path:?}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The scanner subprocess exited non-zero where success was required.
    #[error("Snyk exited with status {status}")]
    CommandFailed { status: i32 },

    #[error("scan timed out after {secs}s")]
    Timeout { secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_required_message() {
        let msg = ScanError::AuthenticationRequired.to_string();
        assert_eq!(
            msg,
            "You need to be logged in to Docker Hub to use scan feature.\n\
             please login to Docker Hub using the Docker Login command"
        );
    }

    #[test]
    fn test_obsolete_binary_message_names_both_versions() {
        let msg = ScanError::ObsoleteBinary {
            installed: "1.0.0".to_string(),
            minimum: ">=1.2.0".to_string(),
        }
        .to_string();
        assert!(msg.contains("1.0.0"));
        assert!(msg.contains(">=1.2.0"));
        assert!(msg.contains("using embedded Snyk version instead"));
    }

    #[test]
    fn test_token_fetch_failed_prefix() {
        let msg = ScanError::TokenFetchFailed { reason: "HTTP 503".to_string() }.to_string();
        assert_eq!(msg, "failed to get DockerScanID: HTTP 503");
    }
}
