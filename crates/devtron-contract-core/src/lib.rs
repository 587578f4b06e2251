// crates/devtron-contract-core/src/lib.rs
// ============================================================================
// Module: Devtron Contract Core Library
// Description: Public API surface for the Devtron contract harness.
// Purpose: Expose configuration, fixtures, execution, and reporting types.
// Dependencies: crate::{config, fixture, expect, client, ui, scenario, runner, report}
// ============================================================================

//! ## Overview
//! Devtron contract core runs black-box checks against a Devtron deployment:
//! HTTP requests against its API and scripted browser sessions against its
//! login UI. Each [`Scenario`] issues requests or UI steps, then asserts the
//! status code and response fields. The [`Runner`] executes scenarios
//! concurrently and produces a [`RunReport`]; [`RunArtifacts`] persists it.
//!
//! Configuration is resolved once into a [`HarnessConfig`] and passed down
//! explicitly; nothing below the binary reads the process environment.
//! Security posture: responses from the system under test are untrusted, and
//! credentials never appear in transcripts, reports, or logs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod config;
pub mod error;
pub mod expect;
pub mod fixture;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod transcript;
pub mod ui;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::ApiClient;
pub use client::ApiResponse;
pub use client::ResponseBody;
pub use config::Credentials;
pub use config::FixtureMode;
pub use config::HarnessConfig;
pub use error::ConfigError;
pub use error::FailureKind;
pub use error::HarnessError;
pub use error::ScenarioFailure;
pub use expect::BodyPredicate;
pub use expect::ExpectedOutcome;
pub use fixture::Auth;
pub use fixture::Bindings;
pub use fixture::Method;
pub use fixture::RequestFixture;
pub use report::RunArtifacts;
pub use report::RunReport;
pub use report::ScenarioOutcome;
pub use report::ScenarioStatus;
pub use runner::Runner;
pub use scenario::HttpStep;
pub use scenario::Scenario;
pub use scenario::ScenarioFilter;
pub use scenario::ScenarioKind;
pub use scenario::Suite;
pub use ui::DriverFactory;
pub use ui::PageDriver;
pub use ui::UiStep;
pub use ui::UrlMatcher;
pub use ui::WebDriverFactory;
