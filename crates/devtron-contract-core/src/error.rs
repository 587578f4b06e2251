// crates/devtron-contract-core/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Error taxonomy for configuration, harness, and scenario failures.
// Purpose: Keep failure kinds stable for reports and programmatic handling.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Three layers of failure:
//! - [`ConfigError`]: configuration could not be resolved.
//! - [`HarnessError`]: the run could not start or its artifacts could not be written.
//! - [`ScenarioFailure`]: one scenario failed; other scenarios are unaffected.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Configuration Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages never include secret values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable contains invalid UTF-8.
    #[error("{name} must be valid UTF-8")]
    NonUtf8 {
        /// Variable name.
        name: &'static str,
    },
    /// An override variable is set but empty.
    #[error("{name} must not be empty")]
    Empty {
        /// Variable name.
        name: &'static str,
    },
    /// An environment variable failed validation.
    #[error("{name} {reason}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Validation failure.
        reason: String,
    },
    /// The config file could not be read.
    #[error("failed to read config {}: {message}", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O failure.
        message: String,
    },
    /// The config file could not be parsed.
    #[error("invalid config {}: {message}", path.display())]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Parser failure.
        message: String,
    },
    /// A resolved value failed validation.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Dotted config field.
        field: &'static str,
        /// Validation failure.
        reason: String,
    },
}

// ============================================================================
// SECTION: Harness Errors
// ============================================================================

/// Errors that stop a run before or after scenarios execute.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration could not be resolved.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// The HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(String),
    /// Run artifacts could not be written.
    #[error("artifact error: {0}")]
    Artifact(String),
    /// The scenario selection is empty.
    #[error("no scenarios matched the selection")]
    EmptySelection,
}

// ============================================================================
// SECTION: Scenario Failures
// ============================================================================

/// Coarse failure class recorded in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Status code differed from the expectation.
    UnexpectedStatus,
    /// Response body was missing a field or held the wrong value.
    BodyMismatch,
    /// A UI element or URL did not appear within the wait window.
    UiTimeout,
    /// The request never produced a response.
    Transport,
    /// Fixture templating failed.
    Fixture,
    /// A required credential is not configured.
    MissingCredential,
    /// The WebDriver endpoint rejected a command.
    Driver,
    /// The scenario task ended abnormally.
    Aborted,
}

impl FailureKind {
    /// Returns the canonical snake case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnexpectedStatus => "unexpected_status",
            Self::BodyMismatch => "body_mismatch",
            Self::UiTimeout => "ui_timeout",
            Self::Transport => "transport",
            Self::Fixture => "fixture",
            Self::MissingCredential => "missing_credential",
            Self::Driver => "driver",
            Self::Aborted => "aborted",
        }
    }
}

/// A single scenario's failure.
///
/// # Invariants
/// - A failure terminates only the scenario that produced it.
/// - String payloads may include untrusted server text but never credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioFailure {
    /// Status code differed from the expectation.
    #[error("expected status {expected}, got {actual}")]
    UnexpectedStatus {
        /// Expected status.
        expected: u16,
        /// Observed status.
        actual: u16,
    },
    /// Response body check failed.
    #[error("body check `{check}` failed: {detail}")]
    BodyMismatch {
        /// Human-readable predicate.
        check: String,
        /// What was observed instead.
        detail: String,
    },
    /// A UI element or URL did not appear within the wait window.
    #[error("timed out after {waited_ms} ms waiting for {target}")]
    UiTimeout {
        /// What was awaited.
        target: String,
        /// Time spent waiting.
        waited_ms: u128,
    },
    /// Connection refused, timeout, or a body that could not be read.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Fixture templating failed.
    #[error("fixture error: {0}")]
    Fixture(String),
    /// A required credential is not configured.
    #[error("{0} is not set")]
    MissingCredential(&'static str),
    /// The WebDriver endpoint rejected a command.
    #[error("webdriver error: {0}")]
    Driver(String),
    /// The scenario task panicked or was cancelled.
    #[error("scenario aborted: {0}")]
    Aborted(String),
    /// A setup step inside a chained scenario failed.
    #[error("setup step `{step}` failed: {cause}")]
    Setup {
        /// Label of the failing setup step.
        step: String,
        /// Underlying failure.
        cause: Box<ScenarioFailure>,
    },
}

impl ScenarioFailure {
    /// Returns the report class of this failure, unwrapping setup failures.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::UnexpectedStatus {
                ..
            } => FailureKind::UnexpectedStatus,
            Self::BodyMismatch {
                ..
            } => FailureKind::BodyMismatch,
            Self::UiTimeout {
                ..
            } => FailureKind::UiTimeout,
            Self::Transport(_) => FailureKind::Transport,
            Self::Fixture(_) => FailureKind::Fixture,
            Self::MissingCredential(_) => FailureKind::MissingCredential,
            Self::Driver(_) => FailureKind::Driver,
            Self::Aborted(_) => FailureKind::Aborted,
            Self::Setup {
                cause, ..
            } => cause.kind(),
        }
    }

    /// Builds a [`ScenarioFailure::BodyMismatch`].
    pub fn body(check: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::BodyMismatch {
            check: check.into(),
            detail: detail.into(),
        }
    }
}
