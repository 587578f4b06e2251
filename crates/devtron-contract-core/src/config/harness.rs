// crates/devtron-contract-core/src/config/harness.rs
// ============================================================================
// Module: Harness Configuration
// Description: Resolved, typed configuration passed to every scenario.
// Purpose: Merge defaults, config file values, and environment overrides.
// Dependencies: serde, url
// ============================================================================

//! ## Overview
//! [`HarnessConfig`] is built once at process start and handed to the runner
//! by value. Scenarios read it through shared references only; nothing below
//! the CLI consults the process environment.
//!
//! Precedence, lowest to highest: built-in defaults, config file, environment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use url::Url;

use super::env::ContractEnv;
use super::env::EnvSnapshot;
use super::file::ConfigFile;
use crate::error::ConfigError;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default base URL of the system under test.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
/// Default WebDriver endpoint.
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
/// Default wait window for UI expectations.
pub const DEFAULT_UI_WAIT: Duration = Duration::from_secs(5);
/// Default poll interval for UI expectations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Default number of scenarios in flight.
pub const DEFAULT_JOBS: usize = 4;
/// Default artifact root.
pub const DEFAULT_RUN_ROOT: &str = "target/contract-runs";

/// Seeded application id.
pub const DEFAULT_APPLICATION_ID: &str = "test-app-id";
/// Seeded chart repository id.
pub const DEFAULT_REPOSITORY_ID: &str = "test-repo-id";
/// Seeded deployment pipeline id.
pub const DEFAULT_PIPELINE_ID: &str = "test-pipeline-id";
/// Seeded deployment id for rollbacks.
pub const DEFAULT_DEPLOYMENT_ID: &str = "previous-deployment-id";
/// Seeded user id.
pub const DEFAULT_USER_ID: &str = "test-user-id";
/// Commit hash sent with deployment triggers.
pub const DEFAULT_COMMIT_HASH: &str = "abc123";

/// Login username used when `ADMIN_USERNAME` is unset.
const DEFAULT_ADMIN_USERNAME: &str = "admin";
/// Login password used when `ADMIN_PASSWORD` is unset.
const DEFAULT_ADMIN_PASSWORD: &str = "password";
/// Password-reset email used when `ADMIN_USERNAME` is unset.
const DEFAULT_RESET_EMAIL: &str = "admin@devtron.ai";

// ============================================================================
// SECTION: Enumerations
// ============================================================================

/// How scenarios obtain ids of pre-existing resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureMode {
    /// Placeholder ids are assumed to exist in a seeded backend.
    #[default]
    Seeded,
    /// Scenarios create the resources they need and use the returned ids.
    Chained,
}

impl FixtureMode {
    /// Returns the canonical lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seeded => "seeded",
            Self::Chained => "chained",
        }
    }
}

impl FromStr for FixtureMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "seeded" => Ok(Self::Seeded),
            "chained" => Ok(Self::Chained),
            _ => Err("must be seeded or chained".to_string()),
        }
    }
}

impl fmt::Display for FixtureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Browser requested from the WebDriver endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    /// Chrome or Chromium via chromedriver.
    #[default]
    Chrome,
    /// Firefox via geckodriver.
    Firefox,
}

impl Browser {
    /// Returns the W3C `browserName` capability value.
    #[must_use]
    pub const fn capability_name(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// System-under-test settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    /// Base URL; request paths are resolved against it.
    pub base_url: Url,
    /// Per-request timeout; `None` keeps the client default.
    pub request_timeout: Option<Duration>,
}

/// Browser automation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiConfig {
    /// W3C WebDriver endpoint.
    pub webdriver_url: Url,
    /// Requested browser.
    pub browser: Browser,
    /// Run the browser without a window.
    pub headless: bool,
    /// Wait window for element, URL, and text expectations.
    pub wait_timeout: Duration,
    /// Delay between polls inside the wait window.
    pub poll_interval: Duration,
}

/// Fixture ids and mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureConfig {
    /// Seeded or chained ids.
    pub mode: FixtureMode,
    /// Application id bound as `application_id`.
    pub application_id: String,
    /// Chart repository id bound as `repository_id`.
    pub repository_id: String,
    /// Pipeline id bound as `pipeline_id`.
    pub pipeline_id: String,
    /// Deployment id bound as `deployment_id`.
    pub deployment_id: String,
    /// User id bound as `user_id`.
    pub user_id: String,
    /// Commit hash bound as `commit_hash`.
    pub commit_hash: String,
}

/// Run-level settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Maximum number of scenarios in flight.
    pub jobs: NonZeroUsize,
    /// Directory receiving run artifacts.
    pub run_root: PathBuf,
}

/// Credentials sourced from the environment.
///
/// # Invariants
/// - Stored values are never empty.
/// - `Debug` output never includes values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Bearer token for the API suites.
    api_token: Option<String>,
    /// Admin username for the login UI.
    admin_username: Option<String>,
    /// Admin password for the login UI.
    admin_password: Option<String>,
    /// Chart repository username.
    chart_repo_username: Option<String>,
    /// Chart repository password.
    chart_repo_password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("api_token", &redact(&self.api_token))
            .field("admin_username", &redact(&self.admin_username))
            .field("admin_password", &redact(&self.admin_password))
            .field("chart_repo_username", &redact(&self.chart_repo_username))
            .field("chart_repo_password", &redact(&self.chart_repo_password))
            .finish()
    }
}

impl Credentials {
    /// Reads credentials from an environment snapshot.
    #[must_use]
    pub fn from_env(env: &EnvSnapshot) -> Self {
        Self {
            api_token: env.owned(ContractEnv::ApiToken),
            admin_username: env.owned(ContractEnv::AdminUsername),
            admin_password: env.owned(ContractEnv::AdminPassword),
            chart_repo_username: env.owned(ContractEnv::ChartRepoUsername),
            chart_repo_password: env.owned(ContractEnv::ChartRepoPassword),
        }
    }

    /// Replaces the API token.
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into()).filter(|value| !value.is_empty());
        self
    }

    /// Replaces the admin login.
    #[must_use]
    pub fn with_admin(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin_username = Some(username.into()).filter(|value| !value.is_empty());
        self.admin_password = Some(password.into()).filter(|value| !value.is_empty());
        self
    }

    /// Replaces the chart repository login.
    #[must_use]
    pub fn with_chart_repo(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.chart_repo_username = Some(username.into()).filter(|value| !value.is_empty());
        self.chart_repo_password = Some(password.into()).filter(|value| !value.is_empty());
        self
    }

    /// Returns the API token, if configured.
    #[must_use]
    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    /// Username typed into the login form.
    #[must_use]
    pub fn login_username(&self) -> &str {
        self.admin_username.as_deref().unwrap_or(DEFAULT_ADMIN_USERNAME)
    }

    /// Password typed into the login form.
    #[must_use]
    pub fn login_password(&self) -> &str {
        self.admin_password.as_deref().unwrap_or(DEFAULT_ADMIN_PASSWORD)
    }

    /// Address typed into the password-reset form.
    #[must_use]
    pub fn reset_email(&self) -> &str {
        self.admin_username.as_deref().unwrap_or(DEFAULT_RESET_EMAIL)
    }

    /// Username sent with chart repository credentials (empty when unset).
    #[must_use]
    pub fn chart_repo_username(&self) -> &str {
        self.chart_repo_username.as_deref().unwrap_or_default()
    }

    /// Password sent with chart repository credentials (empty when unset).
    #[must_use]
    pub fn chart_repo_password(&self) -> &str {
        self.chart_repo_password.as_deref().unwrap_or_default()
    }
}

/// Fully resolved harness configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// System-under-test settings.
    pub target: TargetConfig,
    /// Browser automation settings.
    pub ui: UiConfig,
    /// Fixture ids and mode.
    pub fixtures: FixtureConfig,
    /// Run-level settings.
    pub run: RunConfig,
    /// Environment-sourced credentials.
    pub credentials: Credentials,
}

impl HarnessConfig {
    /// Loads configuration from an optional TOML file and an env snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or a
    /// resolved value is invalid.
    pub fn load(path: Option<&Path>, env: &EnvSnapshot) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => ConfigFile::read(path)?,
            None => ConfigFile::default(),
        };
        Self::resolve(file, env)
    }

    /// Resolves configuration from TOML text and an env snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the text is invalid or a value fails validation.
    pub fn from_toml_str(text: &str, env: &EnvSnapshot) -> Result<Self, ConfigError> {
        let file = ConfigFile::parse(text, Path::new("<inline>"))?;
        Self::resolve(file, env)
    }

    /// Default configuration aimed at a specific base URL, without credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `base_url` is not an http(s) URL.
    pub fn for_target(base_url: &str) -> Result<Self, ConfigError> {
        let mut file = ConfigFile::default();
        file.target.base_url = Some(base_url.to_string());
        Self::resolve(file, &EnvSnapshot::default())
    }

    /// Merges file values and environment overrides over the defaults.
    fn resolve(file: ConfigFile, env: &EnvSnapshot) -> Result<Self, ConfigError> {
        let base_url = env
            .owned(ContractEnv::BaseUrl)
            .or(file.target.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let request_timeout = match env.seconds(ContractEnv::TimeoutSeconds)? {
            Some(timeout) => Some(timeout),
            None => file
                .target
                .request_timeout_secs
                .map(|secs| positive_secs("target.request_timeout_secs", secs))
                .transpose()?,
        };
        let target = TargetConfig {
            base_url: parse_http_url("target.base_url", &base_url)?,
            request_timeout,
        };

        let webdriver_url = env
            .owned(ContractEnv::WebDriverUrl)
            .or(file.ui.webdriver_url)
            .unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string());
        let wait_timeout = match env.seconds(ContractEnv::UiWaitSeconds)? {
            Some(wait) => wait,
            None => file
                .ui
                .wait_timeout_secs
                .map(|secs| positive_secs("ui.wait_timeout_secs", secs))
                .transpose()?
                .unwrap_or(DEFAULT_UI_WAIT),
        };
        let poll_interval = match file.ui.poll_interval_ms {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    field: "ui.poll_interval_ms",
                    reason: "must be greater than zero".to_string(),
                });
            }
            Some(millis) => Duration::from_millis(millis),
            None => DEFAULT_POLL_INTERVAL,
        };
        let ui = UiConfig {
            webdriver_url: parse_http_url("ui.webdriver_url", &webdriver_url)?,
            browser: file.ui.browser.unwrap_or_default(),
            headless: file.ui.headless.unwrap_or(true),
            wait_timeout,
            poll_interval,
        };

        let mode = match env.get(ContractEnv::FixtureMode) {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::InvalidEnv {
                name: ContractEnv::FixtureMode.as_str(),
                reason,
            })?,
            None => file.fixtures.mode.unwrap_or_default(),
        };
        let fixtures = FixtureConfig {
            mode,
            application_id: fixture_id(
                "fixtures.application_id",
                file.fixtures.application_id,
                DEFAULT_APPLICATION_ID,
            )?,
            repository_id: fixture_id(
                "fixtures.repository_id",
                file.fixtures.repository_id,
                DEFAULT_REPOSITORY_ID,
            )?,
            pipeline_id: fixture_id(
                "fixtures.pipeline_id",
                file.fixtures.pipeline_id,
                DEFAULT_PIPELINE_ID,
            )?,
            deployment_id: fixture_id(
                "fixtures.deployment_id",
                file.fixtures.deployment_id,
                DEFAULT_DEPLOYMENT_ID,
            )?,
            user_id: fixture_id("fixtures.user_id", file.fixtures.user_id, DEFAULT_USER_ID)?,
            commit_hash: fixture_id(
                "fixtures.commit_hash",
                file.fixtures.commit_hash,
                DEFAULT_COMMIT_HASH,
            )?,
        };

        let jobs = match env.positive(ContractEnv::Jobs)? {
            Some(jobs) => jobs,
            None => file.run.jobs.unwrap_or(DEFAULT_JOBS as u64),
        };
        let jobs = usize::try_from(jobs).ok().and_then(NonZeroUsize::new).ok_or_else(|| {
            ConfigError::Invalid {
                field: "run.jobs",
                reason: "must be a positive integer".to_string(),
            }
        })?;
        let run_root = env
            .owned(ContractEnv::RunRoot)
            .map(PathBuf::from)
            .or(file.run.run_root)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RUN_ROOT));

        Ok(Self {
            target,
            ui,
            fixtures,
            run: RunConfig {
                jobs,
                run_root,
            },
            credentials: Credentials::from_env(env),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a URL and requires an http or https scheme.
fn parse_http_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|err| ConfigError::Invalid {
        field,
        reason: err.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            field,
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

/// Converts a positive seconds value from the config file.
fn positive_secs(field: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid {
            field,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Resolves a fixture id and rejects blank values.
fn fixture_id(
    field: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<String, ConfigError> {
    match value {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Invalid {
            field,
            reason: "must not be empty".to_string(),
        }),
        Some(value) => Ok(value),
        None => Ok(default.to_string()),
    }
}
