//! Integration tests for the Snyk provider, driven by a fake scanner binary.
//!
//! The fake scanner is a shell script dropped into a temp directory, so these
//! tests exercise the real subprocess path without a Snyk install.

#![cfg(unix)]

use scan_core::version::check_user_binary;
use scan_core::{Provider, ProviderOptions, ScanError, SnykProvider};
use semver::{Version, VersionReq};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_fake_scanner(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("snyk");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn provider_for(path: &Path) -> SnykProvider {
    SnykProvider::new(ProviderOptions::new(path).flags(["container", "test"])).unwrap()
}

/// Token resolution and exit-code relaying, end to end.
///
/// Environment mutation is confined to this single test function so the
/// remaining tests can run concurrently against explicit paths.
#[tokio::test]
async fn scan_resolves_tokens_and_relays_exit_codes() {
    let home = TempDir::new().unwrap();
    let docker_config = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();

    std::env::set_var("HOME", home.path());
    std::env::remove_var("USERPROFILE");
    std::env::set_var("DOCKER_CONFIG", docker_config.path());

    let scanner = write_fake_scanner(bin.path(), "exit 0");
    let provider = provider_for(&scanner);

    // No Snyk session token and no Docker Hub credential: the scan is refused
    // before the scanner is even spawned.
    let err = provider.scan("example:image").await.unwrap_err();
    assert!(matches!(err, ScanError::AuthenticationRequired));
    assert!(err.to_string().starts_with("You need to be logged in to Docker Hub"));

    // A credential for a registry other than Docker Hub changes nothing.
    fs::write(
        docker_config.path().join("config.json"),
        r#"{"auths": {"com.example.registry": {"auth": "dXNlcjpzZWNyZXQ="}}}"#,
    )
    .unwrap();
    let err = provider.scan("example:image").await.unwrap_err();
    assert!(matches!(err, ScanError::AuthenticationRequired));

    // Once a Snyk session token exists it is injected as SNYK_TOKEN and the
    // scanner's exit code comes back verbatim.
    let store = home.path().join(".config").join("configstore");
    fs::create_dir_all(&store).unwrap();
    fs::write(store.join("snyk.json"), r#"{"api": "8a3b5e40-68c5-4fb8-bf12-180f23bbe0f8"}"#)
        .unwrap();

    let cases = [
        (
            concat!(
                r#"[ "$1" = "container" ] || exit 97
                   [ "$2" = "test" ] || exit 97
                   [ "$3" = "example:image" ] || exit 97
                   [ -n "$SNYK_TOKEN" ] || exit 98
                   [ "$NO_UPDATE_NOTIFIER" = "true" ] || exit 98
                   echo "no vulnerable paths found""#,
                "\nexit 0"
            ),
            0,
        ),
        ("echo 'vulnerability found'\nexit 1", 1),
        ("echo 'image was not found locally and pulling failed' >&2\nexit 2", 2),
    ];
    for (body, expected) in cases {
        let scanner = write_fake_scanner(bin.path(), body);
        let provider = provider_for(&scanner);
        assert_eq!(provider.scan("example:image").await.unwrap(), expected);
    }
}

#[tokio::test]
async fn version_wraps_scanner_output() {
    let bin = TempDir::new().unwrap();
    let scanner = write_fake_scanner(bin.path(), r#"echo "1.563.0 (standalone)""#);
    let provider = provider_for(&scanner);

    assert_eq!(provider.version().await.unwrap(), "Snyk (1.563.0 (standalone))");
}

#[tokio::test]
async fn version_failure_carries_stderr() {
    let bin = TempDir::new().unwrap();
    let scanner = write_fake_scanner(bin.path(), "echo 'unsupported flag' >&2\nexit 3");
    let provider = provider_for(&scanner);

    let err = provider.version().await.unwrap_err();
    assert!(matches!(err, ScanError::VersionFailed { .. }));
    let msg = err.to_string();
    assert!(msg.starts_with("failed to get snyk version:"));
    assert!(msg.contains("exit status 3"));
    assert!(msg.contains("unsupported flag"));
}

#[tokio::test]
async fn obsolete_user_binary_is_rejected() {
    let bin = TempDir::new().unwrap();
    let minimum = VersionReq::parse(">=1.400.0").unwrap();

    let old = write_fake_scanner(bin.path(), r#"echo "1.399.1 (standalone)""#);
    let err = check_user_binary(&old, &minimum).await.unwrap_err();
    assert!(matches!(err, ScanError::ObsoleteBinary { .. }));
    assert!(err.to_string().contains("using embedded Snyk version instead"));

    let recent = write_fake_scanner(bin.path(), r#"echo "1.563.0 (standalone)""#);
    let version = check_user_binary(&recent, &minimum).await.unwrap();
    assert_eq!(version, Version::new(1, 563, 0));
}

#[tokio::test]
async fn unparseable_user_binary_version_is_rejected() {
    let bin = TempDir::new().unwrap();
    let minimum = VersionReq::parse(">=1.400.0").unwrap();

    let garbled = write_fake_scanner(bin.path(), "echo 'snyk: command set unavailable'");
    assert!(matches!(
        check_user_binary(&garbled, &minimum).await,
        Err(ScanError::InvalidVersion { .. })
    ));
}

#[tokio::test]
async fn timeout_bounds_the_subprocess() {
    let bin = TempDir::new().unwrap();
    let scanner = write_fake_scanner(bin.path(), "sleep 30");
    let provider =
        SnykProvider::new(ProviderOptions::new(&scanner).timeout(1)).unwrap();

    let err = provider.authenticate(None).await.unwrap_err();
    assert!(matches!(err, ScanError::Timeout { secs: 1 }));
}

#[tokio::test]
async fn authenticate_relays_scanner_failure() {
    let bin = TempDir::new().unwrap();
    let scanner = write_fake_scanner(bin.path(), "exit 2");
    let provider = provider_for(&scanner);

    let err = provider.authenticate(None).await.unwrap_err();
    assert!(matches!(err, ScanError::CommandFailed { status: 2 }));
}

#[tokio::test]
async fn authenticate_passes_campaign_environment() {
    let bin = TempDir::new().unwrap();
    let scanner = write_fake_scanner(
        bin.path(),
        concat!(
            r#"[ "$1" = "auth" ] || exit 97
               [ "$2" = "8a3b5e40-68c5-4fb8-bf12-180f23bbe0f8" ] || exit 97
               [ "$SNYK_UTM_MEDIUM" = "Partner" ] || exit 98
               [ "$SNYK_UTM_SOURCE" = "Docker" ] || exit 98
               [ "$SNYK_UTM_CAMPAIGN" = "Docker-Desktop-2020" ] || exit 98"#,
            "\nexit 0"
        ),
    );
    let provider = provider_for(&scanner);

    provider
        .authenticate(Some("8a3b5e40-68c5-4fb8-bf12-180f23bbe0f8"))
        .await
        .unwrap();
}
