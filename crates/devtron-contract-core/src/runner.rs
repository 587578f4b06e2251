// crates/devtron-contract-core/src/runner.rs
// ============================================================================
// Module: Scenario Runner
// Description: Bounded-concurrency execution of selected scenarios.
// Purpose: Run scenarios independently and collect outcomes in catalog order.
// Dependencies: tokio, tracing
// ============================================================================

//! ## Overview
//! [`Runner`] spawns one tokio task per scenario and gates them with a
//! semaphore sized by `run.jobs`. Tasks share only the immutable
//! [`HarnessConfig`], a cloned [`ApiClient`], and the driver factory. Outcomes
//! are collected by awaiting handles in submission order, so the report is in
//! catalog order whatever order scenarios finish in.
//!
//! A failure ends only its own scenario. A scenario task that panics is
//! reported as [`ScenarioFailure::Aborted`].

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::info;
use tracing::warn;

use crate::client::ApiClient;
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::error::ScenarioFailure;
use crate::fixture::Bindings;
use crate::report::FailureRecord;
use crate::report::RunReport;
use crate::report::ScenarioOutcome;
use crate::report::ScenarioStatus;
use crate::report::now_millis;
use crate::scenario::Action;
use crate::scenario::Scenario;
use crate::transcript::Transcript;
use crate::ui::DriverFactory;
use crate::ui::UiStep;
use crate::ui::WaitPolicy;
use crate::ui::run_ui_steps;

/// Executes scenarios against one target.
#[derive(Clone)]
pub struct Runner {
    /// Resolved configuration shared by all scenarios.
    config: Arc<HarnessConfig>,
    /// HTTP client for the system under test.
    client: ApiClient,
    /// Browser session factory; `None` fails UI scenarios.
    drivers: Option<Arc<dyn DriverFactory>>,
}

impl Runner {
    /// Builds a runner without a browser driver.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Client`] when the HTTP client cannot be built.
    pub fn new(config: HarnessConfig) -> Result<Self, HarnessError> {
        let client = ApiClient::new(&config.target)?;
        Ok(Self {
            config: Arc::new(config),
            client,
            drivers: None,
        })
    }

    /// Attaches the factory UI scenarios open sessions from.
    #[must_use]
    pub fn with_driver_factory(mut self, drivers: Arc<dyn DriverFactory>) -> Self {
        self.drivers = Some(drivers);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Runs every scenario and returns outcomes in input order.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::EmptySelection`] when `scenarios` is empty.
    pub async fn run(&self, scenarios: Vec<Scenario>) -> Result<RunReport, HarnessError> {
        if scenarios.is_empty() {
            return Err(HarnessError::EmptySelection);
        }
        let started_at_ms = now_millis();
        let jobs = self.config.run.jobs.get();
        info!(
            scenarios = scenarios.len(),
            jobs,
            fixture_mode = self.config.fixtures.mode.as_str(),
            base_url = %self.config.target.base_url,
            "run started"
        );

        let permits = Arc::new(Semaphore::new(jobs));
        let mut pending = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let runner = self.clone();
            let permits = Arc::clone(&permits);
            let placeholder = aborted_outcome(&scenario);
            let handle = tokio::spawn(async move {
                let _permit = permits.acquire_owned().await;
                runner.run_scenario(&scenario).await
            });
            pending.push((placeholder, handle));
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        for (placeholder, handle) in pending {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    let failure = ScenarioFailure::Aborted(err.to_string());
                    warn!(
                        suite = %placeholder.suite,
                        scenario = %placeholder.scenario,
                        error = %failure,
                        "scenario task ended abnormally"
                    );
                    outcomes.push(ScenarioOutcome {
                        failure: Some(FailureRecord::from(&failure)),
                        ..placeholder
                    });
                }
            }
        }

        let report = RunReport {
            fixture_mode: self.config.fixtures.mode,
            base_url: self.config.target.base_url.to_string(),
            started_at_ms,
            ended_at_ms: now_millis(),
            outcomes,
        };
        info!(
            passed = report.passed(),
            failed = report.failed(),
            duration_ms = report.duration_ms(),
            "run finished"
        );
        Ok(report)
    }

    /// Runs one scenario to completion. Never fails; failures are outcomes.
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioOutcome {
        info!(suite = %scenario.suite, scenario = %scenario.id, "scenario started");
        let started = Instant::now();
        let mut transcript = Transcript::new();
        let result = self.execute(scenario, &mut transcript).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (status, failure) = match &result {
            Ok(()) => {
                info!(
                    suite = %scenario.suite,
                    scenario = %scenario.id,
                    status = "pass",
                    duration_ms,
                    "scenario finished"
                );
                (ScenarioStatus::Pass, None)
            }
            Err(failure) => {
                warn!(
                    suite = %scenario.suite,
                    scenario = %scenario.id,
                    status = "fail",
                    duration_ms,
                    kind = failure.kind().as_str(),
                    error = %failure,
                    "scenario finished"
                );
                (ScenarioStatus::Fail, Some(FailureRecord::from(failure)))
            }
        };
        ScenarioOutcome {
            suite: scenario.suite.clone(),
            scenario: scenario.id.clone(),
            title: scenario.title.clone(),
            kind: scenario.kind(),
            status,
            failure,
            duration_ms,
            transcript: transcript.into_entries(),
        }
    }

    /// Runs setup steps, then the action.
    async fn execute(
        &self,
        scenario: &Scenario,
        transcript: &mut Transcript,
    ) -> Result<(), ScenarioFailure> {
        let credentials = &self.config.credentials;
        let mut bindings = Bindings::from_fixtures(&self.config.fixtures);
        for step in &scenario.setup {
            step.run(&self.client, credentials, &mut bindings, transcript).await.map_err(
                |cause| ScenarioFailure::Setup {
                    step: step.label.clone(),
                    cause: Box::new(cause),
                },
            )?;
        }
        match &scenario.action {
            Action::Http(step) => step.run(&self.client, credentials, &mut bindings, transcript).await,
            Action::Ui(steps) => self.execute_ui(steps, transcript).await,
        }
    }

    /// Opens a browser session, runs the script, and always closes the session.
    async fn execute_ui(
        &self,
        steps: &[UiStep],
        transcript: &mut Transcript,
    ) -> Result<(), ScenarioFailure> {
        let factory = self
            .drivers
            .as_ref()
            .ok_or_else(|| ScenarioFailure::Driver("no WebDriver endpoint configured".to_string()))?;
        let mut driver = factory.open().await?;
        let wait = WaitPolicy::from_config(&self.config.ui);
        let result =
            run_ui_steps(driver.as_mut(), steps, &self.config.target.base_url, wait, transcript)
                .await;
        if let Err(err) = driver.close().await {
            warn!(error = %err, "webdriver session close failed");
        }
        result
    }
}

/// Outcome skeleton for a scenario whose task did not complete.
fn aborted_outcome(scenario: &Scenario) -> ScenarioOutcome {
    ScenarioOutcome {
        suite: scenario.suite.clone(),
        scenario: scenario.id.clone(),
        title: scenario.title.clone(),
        kind: scenario.kind(),
        status: ScenarioStatus::Fail,
        failure: None,
        duration_ms: 0,
        transcript: Vec::new(),
    }
}
