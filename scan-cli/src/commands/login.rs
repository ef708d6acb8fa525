//! `docker scan --login` command - Authenticate against the scan provider

use anyhow::Result;
use scan_core::Provider;

/// Authenticate the scanner, optionally with a user-supplied API token.
///
/// Without a token the scanner opens its browser-based login flow; the
/// token, when present, must be a UUID.
pub async fn run(token: Option<&str>) -> Result<()> {
    let provider = super::provider(Vec::<String>::new()).await?;
    provider.authenticate(token).await?;
    Ok(())
}
