// crates/devtron-contract-suites/tests/suites/api_contract.rs
// ============================================================================
// Module: API Contract Tests
// Description: API suites executed against the Devtron stub.
// Purpose: Validate both fixture modes, auth handling, and run artifacts.
// Dependencies: devtron-contract-core, devtron-contract-suites, tempfile
// ============================================================================

//! ## Overview
//! Every API scenario runs through the real runner and HTTP client against
//! an in-memory Devtron stub. Seeded runs rely on the stub's pre-populated
//! ids; chained runs start from an empty stub and must create what they use.

use std::error::Error;
use std::fs;
use std::num::NonZeroUsize;

use devtron_contract_core::FailureKind;
use devtron_contract_core::FixtureMode;
use devtron_contract_core::HarnessConfig;
use devtron_contract_core::RunArtifacts;
use devtron_contract_core::RunReport;
use devtron_contract_core::Runner;
use devtron_contract_core::ScenarioFilter;
use devtron_contract_core::ScenarioStatus;
use devtron_contract_core::transcript::TranscriptEntry;
use devtron_contract_suites::all_suites;
use tempfile::TempDir;

use crate::helpers::devtron_stub::Collection;
use crate::helpers::devtron_stub::STUB_TOKEN;
use crate::helpers::devtron_stub::spawn_devtron_stub;
use crate::helpers::devtron_stub::spawn_empty_devtron_stub;

/// API scenarios in the catalog.
const API_SCENARIOS: usize = 21;
/// Chart repository password the stub echoes back on create.
const CHART_REPO_PASSWORD: &str = "chart-s3cret";

/// Config aimed at the stub, optionally carrying an API token.
fn api_config(base_url: &str, token: Option<&str>) -> Result<HarnessConfig, Box<dyn Error>> {
    let mut config = HarnessConfig::for_target(base_url)?;
    if let Some(token) = token {
        config.credentials = config.credentials.clone().with_api_token(token);
    }
    Ok(config)
}

/// Runs the catalog scenarios selected by `filter`.
async fn run_api(config: HarnessConfig, filter: ScenarioFilter) -> Result<RunReport, Box<dyn Error>> {
    let scenarios = filter.select(all_suites(&config));
    let report = Runner::new(config)?.run(scenarios).await?;
    Ok(report)
}

/// Filter selecting every API scenario.
fn api_only() -> ScenarioFilter {
    ScenarioFilter {
        api_only: true,
        ..ScenarioFilter::default()
    }
}

/// Renders failures for assertion messages.
fn failures(report: &RunReport) -> Vec<String> {
    report
        .outcomes
        .iter()
        .filter_map(|outcome| {
            outcome
                .failure
                .as_ref()
                .map(|failure| format!("{}: {}", outcome.qualified_id(), failure.message))
        })
        .collect()
}

/// Failure kind of one scenario, `None` when it passed.
fn failure_kind(report: &RunReport, qualified_id: &str) -> Option<FailureKind> {
    report
        .outcomes
        .iter()
        .find(|outcome| outcome.qualified_id() == qualified_id)
        .and_then(|outcome| outcome.failure.as_ref())
        .map(|failure| failure.kind)
}

// ============================================================================
// SECTION: Fixture Modes
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn seeded_catalog_passes_against_stub() -> Result<(), Box<dyn Error>> {
    let stub = spawn_devtron_stub()?;
    let mut config = api_config(stub.base_url(), Some(STUB_TOKEN))?;
    // Update and delete share seeded ids; keep them ordered.
    config.run.jobs = NonZeroUsize::MIN;

    let report = run_api(config, api_only()).await?;

    assert_eq!(report.outcomes.len(), API_SCENARIOS);
    assert!(report.is_success(), "unexpected failures: {:?}", failures(&report));
    let requests = stub.requests();
    assert!(requests.contains(&"GET /api/v1/applications/test-app-id".to_string()));
    assert!(requests.contains(&"DELETE /api/v1/chart-repositories/test-repo-id".to_string()));
    assert!(requests.contains(&"PATCH /api/v1/users/test-user-id".to_string()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn chained_catalog_creates_its_own_fixtures() -> Result<(), Box<dyn Error>> {
    let stub = spawn_empty_devtron_stub()?;
    let mut config = api_config(stub.base_url(), Some(STUB_TOKEN))?;
    config.fixtures.mode = FixtureMode::Chained;
    config.run.jobs = NonZeroUsize::new(4).ok_or("jobs must be positive")?;

    let report = run_api(config, api_only()).await?;

    assert!(report.is_success(), "unexpected failures: {:?}", failures(&report));
    assert_eq!(report.fixture_mode, FixtureMode::Chained);
    // One create-application scenario plus six setup chains rooted in an application.
    assert_eq!(stub.count(Collection::Applications), 7);
    assert_eq!(stub.count(Collection::Deployments), 2);
    assert!(stub.requests().iter().all(|request| !request.contains("test-app-id")));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn chained_bodies_carry_numeric_ids() -> Result<(), Box<dyn Error>> {
    let stub = spawn_empty_devtron_stub()?;
    let mut config = api_config(stub.base_url(), Some(STUB_TOKEN))?;
    config.fixtures.mode = FixtureMode::Chained;
    let filter = ScenarioFilter {
        pattern: Some("create-pipeline".to_string()),
        ..ScenarioFilter::default()
    };

    let report = run_api(config, filter).await?;

    assert_eq!(report.outcomes.len(), 1);
    assert!(report.is_success(), "unexpected failures: {:?}", failures(&report));
    let sent = report.outcomes[0]
        .transcript
        .iter()
        .find_map(|entry| match entry {
            TranscriptEntry::Http(exchange) if exchange.url.ends_with("/deployment-pipelines") => {
                exchange.request_body.clone()
            }
            _ => None,
        })
        .ok_or("pipeline request missing from transcript")?;
    assert!(sent["applicationId"].is_u64(), "applicationId sent as {}", sent["applicationId"]);
    assert_eq!(stub.count(Collection::Pipelines), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn seeded_ids_are_missing_from_an_empty_target() -> Result<(), Box<dyn Error>> {
    let stub = spawn_empty_devtron_stub()?;
    let config = api_config(stub.base_url(), Some(STUB_TOKEN))?;
    let filter = ScenarioFilter {
        pattern: Some("get-application".to_string()),
        ..ScenarioFilter::default()
    };

    let report = run_api(config, filter).await?;

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(
        failure_kind(&report, "api-endpoints.get-application"),
        Some(FailureKind::UnexpectedStatus)
    );
    Ok(())
}

// ============================================================================
// SECTION: Authentication
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn invalid_token_scenario_expects_rejection() -> Result<(), Box<dyn Error>> {
    let stub = spawn_devtron_stub()?;
    let config = api_config(stub.base_url(), Some(STUB_TOKEN))?;
    let filter = ScenarioFilter {
        pattern: Some("invalid-token".to_string()),
        ..ScenarioFilter::default()
    };

    let report = run_api(config, filter).await?;

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].status, ScenarioStatus::Pass);
    assert_eq!(stub.requests(), vec!["GET /api/v1/applications".to_string()]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn wrong_token_fails_authenticated_scenarios() -> Result<(), Box<dyn Error>> {
    let stub = spawn_devtron_stub()?;
    let config = api_config(stub.base_url(), Some("not-the-token"))?;

    let report = run_api(config, api_only()).await?;

    assert_eq!(report.passed(), 1);
    assert_eq!(report.failed(), API_SCENARIOS - 1);
    assert_eq!(failure_kind(&report, "api-endpoints.invalid-token"), None);
    assert_eq!(
        failure_kind(&report, "user-management.list-users"),
        Some(FailureKind::UnexpectedStatus)
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_token_fails_without_sending_requests() -> Result<(), Box<dyn Error>> {
    let stub = spawn_devtron_stub()?;
    let config = api_config(stub.base_url(), None)?;

    let report = run_api(config, api_only()).await?;

    assert_eq!(report.passed(), 1);
    assert_eq!(
        failure_kind(&report, "chart-repository.create-repository"),
        Some(FailureKind::MissingCredential)
    );
    // Only the invalid-token scenario carries its own credential.
    assert_eq!(stub.requests().len(), 1);
    Ok(())
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn artifacts_never_contain_secrets() -> Result<(), Box<dyn Error>> {
    let stub = spawn_devtron_stub()?;
    let mut config = api_config(stub.base_url(), Some(STUB_TOKEN))?;
    config.credentials = config.credentials.clone().with_chart_repo("charts", CHART_REPO_PASSWORD);
    config.run.jobs = NonZeroUsize::MIN;
    let filter = ScenarioFilter {
        suites: vec!["user-management".to_string(), "chart-repository".to_string()],
        ..ScenarioFilter::default()
    };
    let report = run_api(config, filter).await?;
    let temp = TempDir::new()?;

    let artifacts = RunArtifacts::create(temp.path(), report.started_at_ms)?;
    let written = artifacts.write_report(&report)?;

    assert_eq!(written.len(), 2 + report.outcomes.len());
    assert!(artifacts.root().join("summary.json").is_file());
    assert!(artifacts.root().join("transcripts/user-management.create-user.json").is_file());
    for path in written {
        let text = fs::read_to_string(&path)?;
        assert!(!text.contains(STUB_TOKEN), "{} leaks the token", path.display());
        assert!(!text.contains("TestPassword123!"), "{} leaks a password", path.display());
        assert!(!text.contains(CHART_REPO_PASSWORD), "{} leaks repository credentials", path.display());
    }
    Ok(())
}
