// crates/devtron-contract-suites/src/setup.rs
// ============================================================================
// Module: Chained Setup Steps
// Description: Resource-creating steps used in chained fixture mode.
// Purpose: Let scenarios create the resources they act on and bind real ids.
// Dependencies: devtron-contract-core, serde_json
// ============================================================================

//! Each step creates one resource, expects `201`/`202`, and captures the
//! returned `id`. Fixture names differ from the payloads the scenarios
//! themselves create so setup resources are distinguishable on the target.

use devtron_contract_core::Credentials;
use devtron_contract_core::ExpectedOutcome;
use devtron_contract_core::FixtureMode;
use devtron_contract_core::HarnessConfig;
use devtron_contract_core::HttpStep;
use devtron_contract_core::RequestFixture;
use devtron_contract_core::Scenario;
use devtron_contract_core::fixture::APPLICATION_ID;
use devtron_contract_core::fixture::COMMIT_HASH;
use devtron_contract_core::fixture::DEPLOYMENT_ID;
use devtron_contract_core::fixture::PIPELINE_ID;
use devtron_contract_core::fixture::REPOSITORY_ID;
use devtron_contract_core::fixture::USER_ID;
use devtron_contract_core::fixture::placeholder;
use serde_json::json;

/// Attaches setup steps when the config runs in chained mode.
pub(crate) fn chained(config: &HarnessConfig, scenario: Scenario, setup: Vec<HttpStep>) -> Scenario {
    match config.fixtures.mode {
        FixtureMode::Chained => scenario.with_setup(setup),
        FixtureMode::Seeded => scenario,
    }
}

/// Creates an application and binds `application_id`.
pub(crate) fn create_application() -> HttpStep {
    HttpStep::new(
        "create fixture application",
        RequestFixture::post(
            "/api/v1/applications",
            json!({
                "name": "E2E Fixture Application",
                "description": "E2E fixture for chained scenarios",
                "type": "microservice"
            }),
        ),
        ExpectedOutcome::status(201),
    )
    .capture("id", APPLICATION_ID)
}

/// Creates a pipeline for the bound application and binds `pipeline_id`.
pub(crate) fn create_pipeline() -> HttpStep {
    HttpStep::new(
        "create fixture pipeline",
        RequestFixture::post(
            "/api/v1/deployment-pipelines",
            json!({
                "name": "E2E Fixture Pipeline",
                "applicationId": placeholder(APPLICATION_ID),
                "environment": "staging",
                "deploymentStrategy": "rolling-update"
            }),
        ),
        ExpectedOutcome::status(201),
    )
    .capture("id", PIPELINE_ID)
}

/// Triggers a deployment of the bound pipeline and binds `deployment_id`.
pub(crate) fn trigger_deployment() -> HttpStep {
    HttpStep::new(
        "trigger fixture deployment",
        RequestFixture::post(
            "/api/v1/deployments",
            json!({
                "pipelineId": placeholder(PIPELINE_ID),
                "branch": "main",
                "commitHash": placeholder(COMMIT_HASH)
            }),
        ),
        ExpectedOutcome::status(202),
    )
    .capture("id", DEPLOYMENT_ID)
}

/// Creates a chart repository and binds `repository_id`.
pub(crate) fn create_repository(credentials: &Credentials) -> HttpStep {
    HttpStep::new(
        "create fixture repository",
        RequestFixture::post(
            "/api/v1/chart-repositories",
            json!({
                "name": "E2E Fixture Repo",
                "url": "https://charts.example.com",
                "type": "helm",
                "credentials": {
                    "username": credentials.chart_repo_username(),
                    "password": credentials.chart_repo_password()
                }
            }),
        ),
        ExpectedOutcome::status(201),
    )
    .capture("id", REPOSITORY_ID)
}

/// Creates a user and binds `user_id`.
pub(crate) fn create_user() -> HttpStep {
    HttpStep::new(
        "create fixture user",
        RequestFixture::post(
            "/api/v1/users",
            json!({
                "email": "e2e-fixture-user@devtron.ai",
                "username": "e2e_fixture_user",
                "role": "developer",
                "password": "TestPassword123!"
            }),
        ),
        ExpectedOutcome::status(201),
    )
    .capture("id", USER_ID)
}
