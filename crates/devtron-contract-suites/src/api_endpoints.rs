// crates/devtron-contract-suites/src/api_endpoints.rs
// ============================================================================
// Module: API Endpoints Suite
// Description: Application CRUD and bearer authentication checks.
// Purpose: Validate `/api/v1/applications` status codes and echoed fields.
// Dependencies: devtron-contract-core, serde_json
// ============================================================================

//! Application CRUD and bearer authentication checks.

use devtron_contract_core::Auth;
use devtron_contract_core::ExpectedOutcome;
use devtron_contract_core::HarnessConfig;
use devtron_contract_core::HttpStep;
use devtron_contract_core::RequestFixture;
use devtron_contract_core::Scenario;
use devtron_contract_core::Suite;
use devtron_contract_core::fixture::APPLICATION_ID;
use devtron_contract_core::fixture::placeholder;
use serde_json::json;

use crate::setup;

/// Suite id.
pub const SUITE_ID: &str = "api-endpoints";

/// Bearer token the API must reject.
const INVALID_TOKEN: &str = "invalid_token";

/// Builds the suite.
#[must_use]
pub fn suite(config: &HarnessConfig) -> Suite {
    Suite {
        id: SUITE_ID.to_string(),
        title: "Devtron API Endpoints".to_string(),
        scenarios: vec![
            list_applications(),
            create_application(),
            setup::chained(config, get_application(), vec![setup::create_application()]),
            setup::chained(config, update_application(), vec![setup::create_application()]),
            invalid_token(),
        ],
    }
}

fn list_applications() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "list-applications",
        "should retrieve application list",
        HttpStep::new(
            "list applications",
            RequestFixture::get("/api/v1/applications"),
            ExpectedOutcome::status(200).array(),
        ),
    )
}

fn create_application() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "create-application",
        "should create a new application",
        HttpStep::new(
            "create application",
            RequestFixture::post(
                "/api/v1/applications",
                json!({
                    "name": "Test Application",
                    "description": "E2E Test Application",
                    "type": "microservice"
                }),
            ),
            ExpectedOutcome::status(201).field_equals("name", "Test Application"),
        ),
    )
}

fn get_application() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "get-application",
        "should retrieve application details",
        HttpStep::new(
            "get application",
            RequestFixture::get("/api/v1/applications/{application_id}"),
            ExpectedOutcome::status(200).field_equals("id", placeholder(APPLICATION_ID)),
        ),
    )
}

fn update_application() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "update-application",
        "should update application configuration",
        HttpStep::new(
            "update application",
            RequestFixture::patch(
                "/api/v1/applications/{application_id}",
                json!({
                    "description": "Updated E2E Test Application",
                    "environment": "staging"
                }),
            ),
            ExpectedOutcome::status(200)
                .field_equals("description", "Updated E2E Test Application"),
        ),
    )
}

/// The only scenario that ignores `API_TOKEN`.
fn invalid_token() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "invalid-token",
        "should handle API authentication errors",
        HttpStep::new(
            "list applications with invalid token",
            RequestFixture::get("/api/v1/applications")
                .with_auth(Auth::Bearer(INVALID_TOKEN.to_string())),
            ExpectedOutcome::status(401),
        ),
    )
}
