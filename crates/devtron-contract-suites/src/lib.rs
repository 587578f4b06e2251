// crates/devtron-contract-suites/src/lib.rs
// ============================================================================
// Module: Devtron Contract Suites
// Description: Scenario catalog for the Devtron API and login UI.
// Purpose: Build every suite from a resolved harness configuration.
// Dependencies: devtron-contract-core, serde_json
// ============================================================================

//! ## Overview
//! Five suites mirror the Devtron contract areas: application endpoints,
//! chart repositories, deployment workflows, user management, and the login
//! UI. Suites are built from a [`HarnessConfig`] because payloads carry
//! configured credentials and, in chained fixture mode, scenarios that need an
//! existing resource gain setup steps that create it first.
//!
//! Catalog order is stable: suites in [`SUITE_IDS`] order, scenarios in
//! declaration order.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api_endpoints;
pub mod authentication;
pub mod chart_repository;
pub mod deployment_workflow;
pub mod user_management;

mod setup;


// ============================================================================
// SECTION: Catalog
// ============================================================================

use devtron_contract_core::HarnessConfig;
use devtron_contract_core::Suite;

/// Suite ids in catalog order.
pub const SUITE_IDS: [&str; 5] = [
    api_endpoints::SUITE_ID,
    chart_repository::SUITE_ID,
    deployment_workflow::SUITE_ID,
    user_management::SUITE_ID,
    authentication::SUITE_ID,
];

/// Builds every suite in catalog order.
#[must_use]
pub fn all_suites(config: &HarnessConfig) -> Vec<Suite> {
    vec![
        api_endpoints::suite(config),
        chart_repository::suite(config),
        deployment_workflow::suite(config),
        user_management::suite(config),
        authentication::suite(config),
    ]
}

/// Returns whether `id` names a suite.
#[must_use]
pub fn is_known_suite(id: &str) -> bool {
    SUITE_IDS.contains(&id)
}
