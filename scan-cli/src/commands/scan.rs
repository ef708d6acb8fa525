//! `docker scan` command - Scan a container image for vulnerabilities

use anyhow::Result;
use clap::ValueEnum;
use scan_core::Provider;
use std::path::PathBuf;

/// Arguments the scanner binary always receives.
const BASE_ARGS: [&str; 2] = ["container", "test"];

/// Minimum severity reported by the scanner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Pass-through options mapped onto scanner flags.
#[derive(Debug, Default)]
pub struct ScanFlags {
    pub json: bool,
    pub file: Option<PathBuf>,
    pub exclude_base: bool,
    pub dependency_tree: bool,
    pub severity: Option<Severity>,
}

impl ScanFlags {
    /// Translate the plugin's surface into the scanner's own flag names.
    pub fn to_scanner_flags(&self) -> Vec<String> {
        let mut flags: Vec<String> = BASE_ARGS.iter().map(|s| s.to_string()).collect();
        if self.json {
            flags.push("--json".to_string());
        }
        if self.dependency_tree {
            flags.push("--print-deps".to_string());
        }
        if let Some(severity) = self.severity {
            flags.push(format!("--severity={}", severity.as_str()));
        }
        if let Some(file) = &self.file {
            flags.push(format!("--file={}", file.display()));
        }
        if self.exclude_base {
            flags.push("--exclude-base-image-vulns".to_string());
        }
        flags
    }
}

/// Scan an image and return the scanner's exit code.
pub async fn run(image: &str, flags: &ScanFlags) -> Result<i32> {
    let provider = super::provider(flags.to_scanner_flags()).await?;
    let code = provider.scan(image).await?;
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags_only_carry_base_args() {
        let flags = ScanFlags::default();
        assert_eq!(flags.to_scanner_flags(), vec!["container", "test"]);
    }

    #[test]
    fn test_all_flags_mapped() {
        let flags = ScanFlags {
            json: true,
            file: Some(PathBuf::from("Dockerfile")),
            exclude_base: true,
            dependency_tree: true,
            severity: Some(Severity::High),
        };
        assert_eq!(
            flags.to_scanner_flags(),
            vec![
                "container",
                "test",
                "--json",
                "--print-deps",
                "--severity=high",
                "--file=Dockerfile",
                "--exclude-base-image-vulns",
            ]
        );
    }

    #[test]
    fn test_severity_names() {
        assert_eq!(Severity::Low.as_str(), "low");
        assert_eq!(Severity::Medium.as_str(), "medium");
        assert_eq!(Severity::High.as_str(), "high");
    }
}
