//! Docker CLI plugin handshake.
//!
//! The Docker CLI probes plugin binaries with the `docker-cli-plugin-metadata`
//! subcommand and expects a JSON description on stdout.

use serde::Serialize;

/// Schema version of the Docker CLI plugin protocol.
const SCHEMA_VERSION: &str = "0.1.0";

/// Metadata describing this plugin to the Docker CLI.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PluginMetadata {
    pub schema_version: &'static str,
    pub vendor: &'static str,
    pub version: &'static str,
    pub short_description: &'static str,
    #[serde(rename = "URL")]
    pub url: &'static str,
}

/// Build the metadata for this build of the plugin.
pub fn metadata() -> PluginMetadata {
    PluginMetadata {
        schema_version: SCHEMA_VERSION,
        vendor: "Docker Inc.",
        version: env!("CARGO_PKG_VERSION"),
        short_description: "Docker Scan (powered by Snyk)",
        url: "https://github.com/docker/scan-cli-plugin",
    }
}

/// Render the plugin metadata as the JSON the Docker CLI expects.
pub fn metadata_json() -> anyhow::Result<String> {
    Ok(serde_json::to_string(&metadata())?)
}
