// crates/devtron-contract-suites/tests/suites/login_ui.rs
// ============================================================================
// Module: Login UI Tests
// Description: Authentication suite driven through the WebDriver stub.
// Purpose: Validate UI scripts, session lifecycle, and secret handling.
// Dependencies: devtron-contract-core, devtron-contract-suites, url
// ============================================================================

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use devtron_contract_core::FailureKind;
use devtron_contract_core::HarnessConfig;
use devtron_contract_core::RunReport;
use devtron_contract_core::Runner;
use devtron_contract_core::ScenarioFilter;
use devtron_contract_core::WebDriverFactory;
use devtron_contract_suites::all_suites;
use devtron_contract_suites::authentication;
use url::Url;

use crate::helpers::webdriver_stub::WebDriverStub;
use crate::helpers::webdriver_stub::spawn_webdriver_stub;

/// Admin login the stub accepts.
const ADMIN_EMAIL: &str = "admin@devtron.ai";
/// Admin password the stub accepts.
const ADMIN_PASSWORD: &str = "ui-s3cret";

/// Runs the authentication suite with the given login against `stub`.
async fn run_login_suite(
    stub: &WebDriverStub,
    username: &str,
    password: &str,
) -> Result<RunReport, Box<dyn Error>> {
    let mut config = HarnessConfig::for_target("http://devtron.test")?;
    config.credentials = config.credentials.clone().with_admin(username, password);
    config.ui.webdriver_url = Url::parse(stub.url())?;
    config.ui.wait_timeout = Duration::from_millis(400);
    config.ui.poll_interval = Duration::from_millis(20);
    let filter = ScenarioFilter {
        suites: vec![authentication::SUITE_ID.to_string()],
        ..ScenarioFilter::default()
    };
    let scenarios = filter.select(all_suites(&config));
    let factory = WebDriverFactory::new(&config.ui)?;
    let runner = Runner::new(config)?.with_driver_factory(Arc::new(factory));
    Ok(runner.run(scenarios).await?)
}

/// Failure kind of one authentication scenario.
fn failure_kind(report: &RunReport, scenario: &str) -> Option<FailureKind> {
    report
        .outcomes
        .iter()
        .find(|outcome| outcome.scenario == scenario)
        .and_then(|outcome| outcome.failure.as_ref())
        .map(|failure| failure.kind)
}

#[tokio::test(flavor = "multi_thread")]
async fn login_flows_pass_with_admin_credentials() -> Result<(), Box<dyn Error>> {
    let stub = spawn_webdriver_stub(ADMIN_EMAIL, ADMIN_PASSWORD)?;

    let report = run_login_suite(&stub, ADMIN_EMAIL, ADMIN_PASSWORD).await?;

    let failures: Vec<_> = report.outcomes.iter().filter_map(|outcome| outcome.failure.clone()).collect();
    assert_eq!(report.outcomes.len(), 4);
    assert!(report.is_success(), "unexpected failures: {failures:?}");
    assert_eq!(stub.session_counts(), (4, 4));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn wrong_admin_password_times_out_on_landing() -> Result<(), Box<dyn Error>> {
    let stub = spawn_webdriver_stub(ADMIN_EMAIL, "rotated-password")?;

    let report = run_login_suite(&stub, ADMIN_EMAIL, ADMIN_PASSWORD).await?;

    assert_eq!(failure_kind(&report, "login-valid"), Some(FailureKind::UiTimeout));
    assert_eq!(failure_kind(&report, "logout"), Some(FailureKind::UiTimeout));
    assert_eq!(failure_kind(&report, "login-invalid"), None);
    assert_eq!(failure_kind(&report, "password-reset"), None);
    // Sessions close even when a script fails.
    assert_eq!(stub.session_counts(), (4, 4));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn transcripts_omit_typed_secrets() -> Result<(), Box<dyn Error>> {
    let stub = spawn_webdriver_stub(ADMIN_EMAIL, ADMIN_PASSWORD)?;

    let report = run_login_suite(&stub, ADMIN_EMAIL, ADMIN_PASSWORD).await?;

    for outcome in &report.outcomes {
        let transcript = serde_json::to_string(&outcome.transcript)?;
        assert!(!transcript.contains(ADMIN_PASSWORD), "{} leaks the password", outcome.scenario);
        assert!(transcript.contains("input[name"), "{} lacks form steps", outcome.scenario);
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn sessions_request_headless_browsers() -> Result<(), Box<dyn Error>> {
    let stub = spawn_webdriver_stub(ADMIN_EMAIL, ADMIN_PASSWORD)?;

    run_login_suite(&stub, ADMIN_EMAIL, ADMIN_PASSWORD).await?;

    let payloads = stub.capabilities();
    assert_eq!(payloads.len(), 4);
    let always_match = &payloads[0]["capabilities"]["alwaysMatch"];
    assert_eq!(always_match["browserName"], "chrome");
    assert_eq!(always_match["goog:chromeOptions"]["args"][0], "--headless=new");
    Ok(())
}
