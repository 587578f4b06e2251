// crates/devtron-contract-suites/src/chart_repository.rs
// ============================================================================
// Module: Chart Repository Suite
// Description: Chart repository management checks.
// Purpose: Validate `/api/v1/chart-repositories` CRUD and validation errors.
// Dependencies: devtron-contract-core, serde_json
// ============================================================================

//! Chart repository management checks.

use devtron_contract_core::Credentials;
use devtron_contract_core::ExpectedOutcome;
use devtron_contract_core::HarnessConfig;
use devtron_contract_core::HttpStep;
use devtron_contract_core::RequestFixture;
use devtron_contract_core::Scenario;
use devtron_contract_core::Suite;
use serde_json::json;

use crate::setup;

/// Suite id.
pub const SUITE_ID: &str = "chart-repository";

/// Builds the suite.
#[must_use]
pub fn suite(config: &HarnessConfig) -> Suite {
    let credentials = &config.credentials;
    Suite {
        id: SUITE_ID.to_string(),
        title: "Devtron Chart Repository Management".to_string(),
        scenarios: vec![
            create_repository(credentials),
            list_repositories(),
            setup::chained(config, update_repository(), vec![setup::create_repository(credentials)]),
            setup::chained(config, delete_repository(), vec![setup::create_repository(credentials)]),
            repository_validation(),
        ],
    }
}

/// Repository credentials come from the environment and default to empty strings.
fn create_repository(credentials: &Credentials) -> Scenario {
    Scenario::http(
        SUITE_ID,
        "create-repository",
        "should add a new chart repository",
        HttpStep::new(
            "create repository",
            RequestFixture::post(
                "/api/v1/chart-repositories",
                json!({
                    "name": "E2E Test Repo",
                    "url": "https://charts.example.com",
                    "type": "helm",
                    "credentials": {
                        "username": credentials.chart_repo_username(),
                        "password": credentials.chart_repo_password()
                    }
                }),
            ),
            ExpectedOutcome::status(201).field_equals("name", "E2E Test Repo"),
        ),
    )
}

fn list_repositories() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "list-repositories",
        "should list available chart repositories",
        HttpStep::new(
            "list repositories",
            RequestFixture::get("/api/v1/chart-repositories"),
            ExpectedOutcome::status(200).array(),
        ),
    )
}

fn update_repository() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "update-repository",
        "should update an existing chart repository",
        HttpStep::new(
            "update repository",
            RequestFixture::patch(
                "/api/v1/chart-repositories/{repository_id}",
                json!({
                    "name": "Updated E2E Test Repo",
                    "url": "https://updated-charts.example.com"
                }),
            ),
            ExpectedOutcome::status(200).field_equals("name", "Updated E2E Test Repo"),
        ),
    )
}

fn delete_repository() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "delete-repository",
        "should delete a chart repository",
        HttpStep::new(
            "delete repository",
            RequestFixture::delete("/api/v1/chart-repositories/{repository_id}"),
            ExpectedOutcome::status(204),
        ),
    )
}

fn repository_validation() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "repository-validation",
        "should handle chart repository validation errors",
        HttpStep::new(
            "create invalid repository",
            RequestFixture::post(
                "/api/v1/chart-repositories",
                json!({ "name": "", "url": "invalid-url" }),
            ),
            ExpectedOutcome::status(400).has_property("errors"),
        ),
    )
}
