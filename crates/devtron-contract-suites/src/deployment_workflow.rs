// crates/devtron-contract-suites/src/deployment_workflow.rs
// ============================================================================
// Module: Deployment Workflow Suite
// Description: Pipeline, deployment, history, and rollback checks.
// Purpose: Validate the deployment endpoints and their status transitions.
// Dependencies: devtron-contract-core, serde_json
// ============================================================================

//! Pipelines reference `application_id`, deployments reference `pipeline_id`
//! and `commit_hash`, and rollbacks reference `deployment_id`. In chained mode
//! each scenario builds that chain itself, one setup step per link.

use devtron_contract_core::ExpectedOutcome;
use devtron_contract_core::HarnessConfig;
use devtron_contract_core::HttpStep;
use devtron_contract_core::RequestFixture;
use devtron_contract_core::Scenario;
use devtron_contract_core::Suite;
use devtron_contract_core::fixture::APPLICATION_ID;
use devtron_contract_core::fixture::COMMIT_HASH;
use devtron_contract_core::fixture::DEPLOYMENT_ID;
use devtron_contract_core::fixture::PIPELINE_ID;
use devtron_contract_core::fixture::placeholder;
use serde_json::json;

use crate::setup;

/// Suite id.
pub const SUITE_ID: &str = "deployment-workflow";

/// Builds the suite.
#[must_use]
pub fn suite(config: &HarnessConfig) -> Suite {
    Suite {
        id: SUITE_ID.to_string(),
        title: "Devtron Deployment Workflows".to_string(),
        scenarios: vec![
            setup::chained(config, create_pipeline(), vec![setup::create_application()]),
            setup::chained(
                config,
                trigger_deployment(),
                vec![setup::create_application(), setup::create_pipeline()],
            ),
            setup::chained(config, deployment_history(), vec![setup::create_application()]),
            setup::chained(
                config,
                rollback_deployment(),
                vec![
                    setup::create_application(),
                    setup::create_pipeline(),
                    setup::trigger_deployment(),
                ],
            ),
            deployment_validation(),
        ],
    }
}

fn create_pipeline() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "create-pipeline",
        "should create a deployment pipeline",
        HttpStep::new(
            "create pipeline",
            RequestFixture::post(
                "/api/v1/deployment-pipelines",
                json!({
                    "name": "E2E Test Pipeline",
                    "applicationId": placeholder(APPLICATION_ID),
                    "environment": "staging",
                    "deploymentStrategy": "rolling-update"
                }),
            ),
            ExpectedOutcome::status(201).field_equals("name", "E2E Test Pipeline"),
        ),
    )
}

/// Triggering is asynchronous on the server: `202 Accepted`.
fn trigger_deployment() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "trigger-deployment",
        "should trigger a deployment",
        HttpStep::new(
            "trigger deployment",
            RequestFixture::post(
                "/api/v1/deployments",
                json!({
                    "pipelineId": placeholder(PIPELINE_ID),
                    "branch": "main",
                    "commitHash": placeholder(COMMIT_HASH)
                }),
            ),
            ExpectedOutcome::status(202).field_equals("status", "in_progress"),
        ),
    )
}

fn deployment_history() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "deployment-history",
        "should retrieve deployment history",
        HttpStep::new(
            "list deployments",
            RequestFixture::get("/api/v1/applications/{application_id}/deployments"),
            ExpectedOutcome::status(200).array(),
        ),
    )
}

fn rollback_deployment() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "rollback-deployment",
        "should rollback a deployment",
        HttpStep::new(
            "rollback deployment",
            RequestFixture::post(
                "/api/v1/deployments/rollback",
                json!({
                    "deploymentId": placeholder(DEPLOYMENT_ID),
                    "reason": "E2E Test Rollback"
                }),
            ),
            ExpectedOutcome::status(200).field_equals("status", "rolled_back"),
        ),
    )
}

fn deployment_validation() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "deployment-validation",
        "should handle deployment validation errors",
        HttpStep::new(
            "trigger invalid deployment",
            RequestFixture::post(
                "/api/v1/deployments",
                json!({ "pipelineId": "", "branch": "", "commitHash": "" }),
            ),
            ExpectedOutcome::status(400).has_property("errors"),
        ),
    )
}
