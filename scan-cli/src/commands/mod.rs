//! CLI command implementations

pub mod login;
pub mod scan;
pub mod version;

use anyhow::Result;
use colored::Colorize;
use scan_core::{ProviderOptions, SnykProvider};

/// Build a Snyk provider for the given scanner flags.
///
/// Binary resolution happens here: a recent-enough user install wins,
/// otherwise the bundled binary with a visible warning.
pub(crate) async fn provider<I, S>(flags: I) -> Result<SnykProvider>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let resolved = scan_core::version::resolve_binary().await?;
    if let Some(warning) = resolved.fallback_warning {
        eprintln!("{}", warning.yellow());
    }

    let options = ProviderOptions::new(resolved.path).flags(flags);
    Ok(SnykProvider::new(options)?)
}
