// crates/devtron-contract-core/src/config/env.rs
// ============================================================================
// Module: Contract Harness Environment
// Description: Environment-backed configuration inputs for the harness.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are captured once into an [`EnvSnapshot`] at process
//! start and then threaded explicitly into configuration. Invalid UTF-8 fails
//! closed. Override variables reject empty values; secret variables treat an
//! empty value as unset.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::ConfigError;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys read by the contract harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContractEnv {
    /// Bearer token for the Devtron API.
    ApiToken,
    /// Admin username for the login UI.
    AdminUsername,
    /// Admin password for the login UI.
    AdminPassword,
    /// Username sent with chart repository credentials.
    ChartRepoUsername,
    /// Password sent with chart repository credentials.
    ChartRepoPassword,
    /// Base URL override for the system under test.
    BaseUrl,
    /// WebDriver endpoint override.
    WebDriverUrl,
    /// Request timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// UI wait window override in seconds (positive integer).
    UiWaitSeconds,
    /// Fixture mode override (`seeded` or `chained`).
    FixtureMode,
    /// Artifact root override.
    RunRoot,
    /// Worker count override (positive integer).
    Jobs,
}

impl ContractEnv {
    /// Every key, in a stable order.
    pub const ALL: [Self; 12] = [
        Self::ApiToken,
        Self::AdminUsername,
        Self::AdminPassword,
        Self::ChartRepoUsername,
        Self::ChartRepoPassword,
        Self::BaseUrl,
        Self::WebDriverUrl,
        Self::TimeoutSeconds,
        Self::UiWaitSeconds,
        Self::FixtureMode,
        Self::RunRoot,
        Self::Jobs,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiToken => "API_TOKEN",
            Self::AdminUsername => "ADMIN_USERNAME",
            Self::AdminPassword => "ADMIN_PASSWORD",
            Self::ChartRepoUsername => "CHART_REPO_USERNAME",
            Self::ChartRepoPassword => "CHART_REPO_PASSWORD",
            Self::BaseUrl => "DEVTRON_BASE_URL",
            Self::WebDriverUrl => "DEVTRON_WEBDRIVER_URL",
            Self::TimeoutSeconds => "DEVTRON_CONTRACT_TIMEOUT_SEC",
            Self::UiWaitSeconds => "DEVTRON_CONTRACT_UI_WAIT_SEC",
            Self::FixtureMode => "DEVTRON_CONTRACT_FIXTURE_MODE",
            Self::RunRoot => "DEVTRON_CONTRACT_RUN_ROOT",
            Self::Jobs => "DEVTRON_CONTRACT_JOBS",
        }
    }

    /// Returns true for credential variables.
    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(
            self,
            Self::ApiToken
                | Self::AdminUsername
                | Self::AdminPassword
                | Self::ChartRepoUsername
                | Self::ChartRepoPassword
        )
    }
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Immutable capture of the harness environment variables.
///
/// # Invariants
/// - Only keys listed in [`ContractEnv::ALL`] are stored.
/// - Secret keys with empty values are never stored; other secret values are
///   stored verbatim.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    /// Captured values keyed by variable.
    values: BTreeMap<ContractEnv, String>,
}

impl std::fmt::Debug for EnvSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.values {
            if key.is_secret() {
                map.entry(&key.as_str(), &"<redacted>");
            } else {
                map.entry(&key.as_str(), value);
            }
        }
        map.finish()
    }
}

impl EnvSnapshot {
    /// Captures the harness variables from the current process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is not valid UTF-8 or an override
    /// variable is set but empty.
    pub fn from_process() -> Result<Self, ConfigError> {
        let mut pairs = Vec::new();
        for key in ContractEnv::ALL {
            if let Some(value) = read_env_strict(key.as_str())? {
                pairs.push((key, value));
            }
        }
        Self::from_pairs(pairs)
    }

    /// Builds a snapshot from explicit key/value pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] when an override value is empty or
    /// whitespace. Empty secrets are dropped; other secret values are kept
    /// verbatim.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (ContractEnv, String)>,
    {
        let mut values = BTreeMap::new();
        for (key, value) in pairs {
            if key.is_secret() {
                if !value.is_empty() {
                    values.insert(key, value);
                }
                continue;
            }
            if value.trim().is_empty() {
                return Err(ConfigError::Empty {
                    name: key.as_str(),
                });
            }
            values.insert(key, value);
        }
        Ok(Self {
            values,
        })
    }

    /// Returns the captured value for a key.
    #[must_use]
    pub fn get(&self, key: ContractEnv) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Returns an owned copy of the captured value for a key.
    #[must_use]
    pub fn owned(&self, key: ContractEnv) -> Option<String> {
        self.get(key).map(ToString::to_string)
    }

    /// Parses a positive seconds value for a key, if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] when the value is non-numeric or zero.
    pub fn seconds(&self, key: ContractEnv) -> Result<Option<Duration>, ConfigError> {
        self.get(key).map(|raw| parse_positive(key.as_str(), raw).map(Duration::from_secs)).transpose()
    }

    /// Parses a positive integer value for a key, if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] when the value is non-numeric or zero.
    pub fn positive(&self, key: ContractEnv) -> Result<Option<u64>, ConfigError> {
        self.get(key).map(|raw| parse_positive(key.as_str(), raw)).transpose()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns [`ConfigError::NonUtf8`] when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &'static str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::NonUtf8 {
            name,
        })
    })
}

/// Parses a positive integer from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is missing, non-numeric, or zero.
fn parse_positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    let trimmed = raw.trim();
    let value: u64 = trimmed.parse().map_err(|_| ConfigError::InvalidEnv {
        name,
        reason: "must be a positive integer".to_string(),
    })?;
    if value == 0 {
        return Err(ConfigError::InvalidEnv {
            name,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
