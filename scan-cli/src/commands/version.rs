//! `docker scan --version` command - Display plugin and provider versions

use anyhow::Result;
use scan_core::Provider;

/// Print the plugin version followed by the provider's own version string.
pub async fn run() -> Result<()> {
    let provider = super::provider(Vec::<String>::new()).await?;
    let provider_version = provider.version().await?;

    println!("Version:  {}", env!("CARGO_PKG_VERSION"));
    println!("Provider: {}", provider_version);
    Ok(())
}
