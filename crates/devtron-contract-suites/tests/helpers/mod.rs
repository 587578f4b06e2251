// crates/devtron-contract-suites/tests/helpers/mod.rs
// ============================================================================
// Module: Contract Test Helpers
// Description: Shared helpers for the suite integration tests.
// Purpose: Provide in-process Devtron and WebDriver stubs.
// Dependencies: axum, devtron-contract-core, tokio
// ============================================================================

//! ## Overview
//! Stubs stand in for the system under test and for a WebDriver endpoint.
//! Both run on loopback ports in their own runtime thread and shut down when
//! their handle drops.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod devtron_stub;
pub mod server;
