// crates/devtron-contract-core/src/config/mod.rs
// ============================================================================
// Module: Contract Harness Configuration
// Description: Centralized configuration for the contract harness.
// Purpose: Provide typed access to target, UI, fixture, and credential settings.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is read from an optional TOML file and a captured
//! environment snapshot, then mapped into [`HarnessConfig`] for explicit reuse
//! by the runner and every scenario.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;
mod file;
mod harness;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::ContractEnv;
pub use env::EnvSnapshot;
pub use env::read_env_strict;
pub use file::ConfigFile;
pub use harness::Browser;
pub use harness::Credentials;
pub use harness::DEFAULT_BASE_URL;
pub use harness::DEFAULT_JOBS;
pub use harness::DEFAULT_UI_WAIT;
pub use harness::FixtureConfig;
pub use harness::FixtureMode;
pub use harness::HarnessConfig;
pub use harness::RunConfig;
pub use harness::TargetConfig;
pub use harness::UiConfig;
