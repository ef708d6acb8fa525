//! Snyk implementation of the scan provider.
//!
//! Builds and runs subprocess invocations against a located Snyk binary,
//! injects the session or Docker scan token, and relays the scanner's exit
//! code through the plugin.

use super::{Provider, ProviderOptions};
use crate::config::SnykConfig;
use crate::error::{Result, ScanError};
use crate::hub::{DockerConfig, HubClient};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;
use uuid::Uuid;

/// Snyk-backed scan provider.
pub struct SnykProvider {
    options: ProviderOptions,
    hub: HubClient,
}

impl SnykProvider {
    /// Create a Snyk provider from invocation options.
    ///
    /// The binary path must be non-empty before any invocation.
    pub fn new(options: ProviderOptions) -> Result<Self> {
        if options.binary_path.as_os_str().is_empty() {
            return Err(ScanError::BinaryNotFound);
        }
        let hub = HubClient::new()?;
        Ok(Self { options, hub })
    }

    /// Build a command against the Snyk binary with the plugin's ambient
    /// environment applied on top of the parent's.
    fn base_command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut cmd = Command::new(&self.options.binary_path);
        cmd.args(args)
            .env("NO_UPDATE_NOTIFIER", "true")
            .env("SNYK_CFG_DISABLESUGGESTIONS", "true")
            .env("SNYK_INTEGRATION_NAME", "DOCKER_DESKTOP")
            .kill_on_drop(true);
        cmd
    }

    /// Spawn a command with inherited stdio and relay its exit code.
    async fn run_relayed(&self, mut cmd: Command) -> Result<i32> {
        let mut child =
            cmd.spawn().map_err(|e| spawn_error(e, &self.options.binary_path))?;

        let status = match self.options.timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs), child.wait()).await {
                    Ok(waited) => waited,
                    Err(_) => {
                        let _ = child.kill().await;
                        return Err(ScanError::Timeout { secs });
                    }
                }
            }
            None => child.wait().await,
        }
        .map_err(|e| ScanError::Io {
            path: self.options.binary_path.clone(),
            source: e,
        })?;

        Ok(status.code().unwrap_or(1))
    }

    /// Resolve the token to inject into the scan environment.
    ///
    /// An existing Snyk session token wins; otherwise the Hub credential is
    /// traded for a Docker scan token.
    async fn apply_scan_token(&self, cmd: &mut Command) -> Result<()> {
        if let Some(token) = SnykConfig::session_token() {
            debug!("found existing Snyk session token");
            cmd.env("SNYK_TOKEN", token);
            return Ok(());
        }

        debug!("no Snyk session token, requesting a Docker scan token");
        let docker_config = DockerConfig::load()?;
        let credentials = docker_config.hub_credentials()?;
        let token = self.hub.fetch_scan_token(&credentials).await.map_err(|err| match err {
            fetch @ (ScanError::TokenFetchFailed { .. } | ScanError::AuthenticationRequired) => {
                fetch
            }
            other => ScanError::TokenFetchFailed { reason: other.to_string() },
        })?;
        cmd.env("SNYK_DOCKER_TOKEN", token);
        Ok(())
    }
}

#[async_trait]
impl Provider for SnykProvider {
    async fn authenticate(&self, token: Option<&str>) -> Result<()> {
        let token = token.unwrap_or("");
        if !token.is_empty() && Uuid::parse_str(token).is_err() {
            return Err(ScanError::InvalidToken { token: token.to_string() });
        }

        let mut args = vec!["auth"];
        if !token.is_empty() {
            args.push(token);
        }

        let mut cmd = self.base_command(args);
        cmd.env("SNYK_UTM_MEDIUM", "Partner")
            .env("SNYK_UTM_SOURCE", "Docker")
            .env("SNYK_UTM_CAMPAIGN", "Docker-Desktop-2020");

        let status = self.run_relayed(cmd).await?;
        if status != 0 {
            return Err(ScanError::CommandFailed { status });
        }
        Ok(())
    }

    async fn scan(&self, image: &str) -> Result<i32> {
        let mut args: Vec<&str> = self.options.flags.iter().map(String::as_str).collect();
        args.push(image);

        let mut cmd = self.base_command(args);
        self.apply_scan_token(&mut cmd).await?;

        debug!(image, binary = %self.options.binary_path.display(), "invoking Snyk scan");
        self.run_relayed(cmd).await
    }

    async fn version(&self) -> Result<String> {
        let output = self
            .base_command(["--version"])
            .output()
            .await
            .map_err(|e| spawn_error(e, &self.options.binary_path))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let mut reason = format!("exit status {}", output.status.code().unwrap_or(-1));
            if !stderr.is_empty() {
                reason = format!("{}, {}", reason, stderr);
            }
            return Err(ScanError::VersionFailed { reason });
        }

        Ok(format!("Snyk ({})", String::from_utf8_lossy(&output.stdout).trim()))
    }
}

fn spawn_error(err: std::io::Error, path: &Path) -> ScanError {
    if err.kind() == std::io::ErrorKind::NotFound {
        ScanError::BinaryNotFound
    } else {
        ScanError::Io { path: path.to_path_buf(), source: err }
    }
}
