// crates/devtron-contract-core/src/config/file.rs
// ============================================================================
// Module: Contract Harness Config File
// Description: TOML schema for optional harness configuration files.
// Purpose: Deserialize non-secret settings with unknown keys rejected.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Every field is optional; missing values fall back to environment overrides
//! or built-in defaults during resolution in [`super::HarnessConfig`].
//! Secrets are never read from the file.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use super::harness::Browser;
use super::harness::FixtureMode;
use crate::error::ConfigError;

/// Maximum accepted config file size in bytes.
const MAX_CONFIG_FILE_BYTES: u64 = 1024 * 1024;

/// Raw contents of a harness TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ConfigFile {
    /// System-under-test settings.
    pub target: TargetSection,
    /// Browser automation settings.
    pub ui: UiSection,
    /// Fixture ids and fixture mode.
    pub fixtures: FixturesSection,
    /// Run-level settings.
    pub run: RunSection,
}

/// `[target]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TargetSection {
    /// Base URL of the system under test.
    pub base_url: Option<String>,
    /// Optional per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

/// `[ui]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct UiSection {
    /// WebDriver endpoint URL.
    pub webdriver_url: Option<String>,
    /// Browser requested from the WebDriver endpoint.
    pub browser: Option<Browser>,
    /// Run the browser without a window.
    pub headless: Option<bool>,
    /// Wait window for UI expectations in seconds.
    pub wait_timeout_secs: Option<u64>,
    /// Poll interval for UI expectations in milliseconds.
    pub poll_interval_ms: Option<u64>,
}

/// `[fixtures]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FixturesSection {
    /// Seeded or chained fixture ids.
    pub mode: Option<FixtureMode>,
    /// Seeded application id.
    pub application_id: Option<String>,
    /// Seeded chart repository id.
    pub repository_id: Option<String>,
    /// Seeded deployment pipeline id.
    pub pipeline_id: Option<String>,
    /// Seeded deployment id used for rollback.
    pub deployment_id: Option<String>,
    /// Seeded user id.
    pub user_id: Option<String>,
    /// Commit hash sent with deployment triggers.
    pub commit_hash: Option<String>,
}

/// `[run]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RunSection {
    /// Maximum number of scenarios in flight.
    pub jobs: Option<u64>,
    /// Directory receiving run artifacts.
    pub run_root: Option<PathBuf>,
}

impl ConfigFile {
    /// Parses TOML text. `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the TOML is malformed or carries unknown keys.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Reads and parses a config file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read or is too
    /// large, and [`ConfigError::Parse`] when it is not valid.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let read_error = |message: String| ConfigError::Read {
            path: path.to_path_buf(),
            message,
        };
        let metadata = fs::metadata(path).map_err(|err| read_error(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_FILE_BYTES {
            return Err(read_error(format!(
                "file exceeds {MAX_CONFIG_FILE_BYTES} bytes ({})",
                metadata.len()
            )));
        }
        let text = fs::read_to_string(path).map_err(|err| read_error(err.to_string()))?;
        Self::parse(&text, path)
    }
}
