//! Docker Hub credential discovery and scan-token client.
//!
//! Unauthenticated scans are allowed for users logged in to Docker Hub: the
//! plugin reads the host CLI's `config.json`, then trades the Hub credential
//! for a short-lived Docker scan token passed to Snyk via `SNYK_DOCKER_TOKEN`.

use crate::error::{Result, ScanError};
use crate::paths;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Registry key under which the Docker CLI stores Hub credentials.
pub const HUB_REGISTRY_URL: &str = "https://index.docker.io/v1/";

/// Default Docker Hub API endpoint.
pub const DEFAULT_HUB_URL: &str = "https://hub.docker.com";

/// The subset of the Docker CLI `config.json` the plugin cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DockerConfig {
    /// Registry credentials keyed by registry URL.
    #[serde(default)]
    pub auths: HashMap<String, AuthEntry>,
}

/// One registry credential entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthEntry {
    /// base64(`username:password`) blob.
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A usable Docker Hub credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubCredentials {
    pub username: String,
    pub password: String,
}

impl DockerConfig {
    /// Load the Docker CLI configuration.
    ///
    /// A missing file is an empty configuration: the user is not logged in
    /// anywhere.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::docker_config_path())
    }

    /// Load the Docker CLI configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScanError::Io { path: path.to_path_buf(), source: e })?;
        serde_json::from_str(&content).map_err(|e| ScanError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the Docker Hub credential.
    ///
    /// A credential for any other registry does not count: scanning requires
    /// being logged in to Docker Hub specifically.
    pub fn hub_credentials(&self) -> Result<HubCredentials> {
        self.auths
            .get(HUB_REGISTRY_URL)
            .and_then(AuthEntry::credentials)
            .ok_or(ScanError::AuthenticationRequired)
    }
}

impl AuthEntry {
    /// Extract a usable credential from this entry, if it carries one.
    pub fn credentials(&self) -> Option<HubCredentials> {
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            if !username.is_empty() && !password.is_empty() {
                return Some(HubCredentials {
                    username: username.clone(),
                    password: password.clone(),
                });
            }
        }

        let blob = self.auth.as_deref().filter(|blob| !blob.is_empty())?;
        let decoded = STANDARD.decode(blob).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some(HubCredentials { username: username.to_string(), password: password.to_string() })
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: String,
}

/// Client for the Docker Hub identity service.
pub struct HubClient {
    client: reqwest::Client,
    base_url: String,
}

impl HubClient {
    /// Create a new Hub client.
    ///
    /// The endpoint can be overridden with `DOCKER_SCAN_HUB_URL` (used by
    /// tests and staging environments).
    pub fn new() -> Result<Self> {
        let base_url =
            std::env::var("DOCKER_SCAN_HUB_URL").unwrap_or_else(|_| DEFAULT_HUB_URL.to_string());
        Self::with_base_url(base_url)
    }

    /// Create a Hub client against an explicit endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("docker-scan/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string() })
    }

    /// Trade a Docker Hub credential for a scan token (the DockerScanID).
    pub async fn fetch_scan_token(&self, credentials: &HubCredentials) -> Result<String> {
        let url = format!("{}/v2/users/login", self.base_url);
        debug!(%url, username = %credentials.username, "requesting Docker scan token");

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest {
                username: &credentials.username,
                password: &credentials.password,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::TokenFetchFailed {
                reason: format!("hub returned HTTP {}", status.as_u16()),
            });
        }

        let body: LoginResponse = response.json().await?;
        if body.token.is_empty() {
            return Err(ScanError::TokenFetchFailed {
                reason: "hub returned an empty token".to_string(),
            });
        }
        Ok(body.token)
    }
}
