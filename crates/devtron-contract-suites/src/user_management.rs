// crates/devtron-contract-suites/src/user_management.rs
// ============================================================================
// Module: User Management Suite
// Description: User CRUD, validation, and password reset checks.
// Purpose: Validate `/api/v1/users` status codes and echoed fields.
// Dependencies: devtron-contract-core, serde_json
// ============================================================================

//! User CRUD, validation, and password reset checks.

use devtron_contract_core::ExpectedOutcome;
use devtron_contract_core::HarnessConfig;
use devtron_contract_core::HttpStep;
use devtron_contract_core::RequestFixture;
use devtron_contract_core::Scenario;
use devtron_contract_core::Suite;
use serde_json::json;

use crate::setup;

/// Suite id.
pub const SUITE_ID: &str = "user-management";

/// Builds the suite.
#[must_use]
pub fn suite(config: &HarnessConfig) -> Suite {
    Suite {
        id: SUITE_ID.to_string(),
        title: "Devtron User Management".to_string(),
        scenarios: vec![
            create_user(),
            list_users(),
            setup::chained(config, update_user(), vec![setup::create_user()]),
            setup::chained(config, delete_user(), vec![setup::create_user()]),
            user_validation(),
            reset_password(),
        ],
    }
}

fn create_user() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "create-user",
        "should create a new user",
        HttpStep::new(
            "create user",
            RequestFixture::post(
                "/api/v1/users",
                json!({
                    "email": "e2e-test-user@devtron.ai",
                    "username": "e2e_test_user",
                    "role": "developer",
                    "password": "TestPassword123!"
                }),
            ),
            ExpectedOutcome::status(201).field_equals("email", "e2e-test-user@devtron.ai"),
        ),
    )
}

fn list_users() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "list-users",
        "should retrieve user list",
        HttpStep::new(
            "list users",
            RequestFixture::get("/api/v1/users"),
            ExpectedOutcome::status(200).array(),
        ),
    )
}

fn update_user() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "update-user",
        "should update user details",
        HttpStep::new(
            "update user",
            RequestFixture::patch(
                "/api/v1/users/{user_id}",
                json!({ "role": "admin", "team": "engineering" }),
            ),
            ExpectedOutcome::status(200).field_equals("role", "admin"),
        ),
    )
}

/// No body expectation: `204` carries none.
fn delete_user() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "delete-user",
        "should delete a user",
        HttpStep::new(
            "delete user",
            RequestFixture::delete("/api/v1/users/{user_id}"),
            ExpectedOutcome::status(204),
        ),
    )
}

fn user_validation() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "user-validation",
        "should handle user creation validation errors",
        HttpStep::new(
            "create invalid user",
            RequestFixture::post(
                "/api/v1/users",
                json!({ "email": "invalid-email", "username": "", "role": "invalid-role" }),
            ),
            ExpectedOutcome::status(400).has_property("errors"),
        ),
    )
}

fn reset_password() -> Scenario {
    Scenario::http(
        SUITE_ID,
        "reset-password",
        "should reset user password",
        HttpStep::new(
            "reset password",
            RequestFixture::post(
                "/api/v1/users/reset-password",
                json!({
                    "email": "test-user@devtron.ai",
                    "newPassword": "NewSecurePassword456!"
                }),
            ),
            ExpectedOutcome::status(200).field_contains("message", "Password reset successful"),
        ),
    )
}
