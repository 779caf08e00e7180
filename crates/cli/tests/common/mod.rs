//! Shared test utilities for dashbrowse integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Point every command at the fixture catalog with throwaway preferences.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper will be hermetic by default.

use std::path::PathBuf;

use assert_cmd::Command;

/// Path to the fixture catalog.
pub fn catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog.json")
}

/// Returns a hermetic `dashbrowse` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - Every `DASHBROWSE_*` variable is cleared so host settings do not leak in.
/// - The fixture catalog and the `/grafana` base path are used.
pub fn dashbrowse_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dashbrowse");

    cmd.env("DOTENV_DISABLED", "1");

    for (key, _) in std::env::vars() {
        if key.starts_with("DASHBROWSE_") {
            cmd.env_remove(key);
        }
    }

    cmd.env("DASHBROWSE_CATALOG", catalog_path());
    cmd.env("DASHBROWSE_BASE_PATH", "/grafana");
    cmd
}
