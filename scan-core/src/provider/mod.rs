//! Provider abstraction over external vulnerability-scanning tools.

use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

mod snyk;

pub use snyk::SnykProvider;

/// A vulnerability-scanning tool the plugin can delegate to.
#[async_trait]
pub trait Provider {
    /// Authenticate the scanner with an optional API token.
    async fn authenticate(&self, token: Option<&str>) -> Result<()>;

    /// Scan an image and return the scanner's exit code verbatim
    /// (0 = clean, 1 = vulnerabilities found, other = tool error).
    async fn scan(&self, image: &str) -> Result<i32>;

    /// Get the scanner's version string.
    async fn version(&self) -> Result<String>;
}

/// Options for one provider invocation.
///
/// Configuration is applied in order through chained setters after
/// construction.
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    pub(crate) binary_path: PathBuf,
    pub(crate) flags: Vec<String>,
    pub(crate) timeout_secs: Option<u64>,
}

impl ProviderOptions {
    /// Create options for the scanner binary at `binary_path`.
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        Self { binary_path: binary_path.into(), flags: Vec::new(), timeout_secs: None }
    }

    /// Append a single scanner flag.
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    /// Append scanner flags, preserving order.
    pub fn flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Bound the scan subprocess to `secs` seconds.
    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}
