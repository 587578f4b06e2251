// crates/devtron-contract-core/src/scenario.rs
// ============================================================================
// Module: Scenario Model
// Description: Scenarios, suites, setup steps, and selection filters.
// Purpose: Describe each contract check as data the runner can execute.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Scenario`] is an optional list of setup [`HttpStep`]s followed by one
//! [`Action`]: an HTTP step or a UI script. Setup steps assert their own
//! expectations and may [`Capture`] response fields into the scenario's
//! [`Bindings`], which later steps reference through `{name}` templates.
//! [`Suite`]s group scenarios; [`ScenarioFilter`] selects from them in catalog
//! order.

use serde::Serialize;
use serde_json::Value;

use crate::client::ApiClient;
use crate::client::ResponseBody;
use crate::config::Credentials;
use crate::error::ScenarioFailure;
use crate::expect::ExpectedOutcome;
use crate::fixture::Bindings;
use crate::fixture::RequestFixture;
use crate::transcript::Transcript;
use crate::ui::UiStep;

// ============================================================================
// SECTION: HTTP Steps
// ============================================================================

/// Copies a top-level response field into a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Response field name.
    pub field: String,
    /// Binding that receives the value.
    pub binding: String,
}

impl Capture {
    /// Stores the field's value with its JSON type.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioFailure::BodyMismatch`] when the field is missing or
    /// is neither a non-empty string nor a number.
    pub fn apply(&self, body: &ResponseBody, bindings: &mut Bindings) -> Result<(), ScenarioFailure> {
        let check = format!("capture `{}` into {}", self.field, self.binding);
        let value = body
            .json()
            .and_then(Value::as_object)
            .and_then(|object| object.get(&self.field))
            .ok_or_else(|| ScenarioFailure::body(check.clone(), "field missing"))?;
        bindings
            .insert_json(self.binding.clone(), value.clone())
            .map_err(|_| ScenarioFailure::body(check, format!("cannot capture {value}")))
    }
}

/// One request, its expected outcome, and optional captures.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpStep {
    /// Short label used in setup failure messages.
    pub label: String,
    /// Request to send.
    pub request: RequestFixture,
    /// Expected status and body.
    pub expect: ExpectedOutcome,
    /// Fields copied into bindings after the expectation holds.
    pub captures: Vec<Capture>,
}

impl HttpStep {
    /// Builds a step without captures.
    pub fn new(label: impl Into<String>, request: RequestFixture, expect: ExpectedOutcome) -> Self {
        Self {
            label: label.into(),
            request,
            expect,
            captures: Vec::new(),
        }
    }

    /// Adds a capture of `field` into `binding`.
    #[must_use]
    pub fn capture(mut self, field: impl Into<String>, binding: impl Into<String>) -> Self {
        self.captures.push(Capture {
            field: field.into(),
            binding: binding.into(),
        });
        self
    }

    /// Resolves, sends, verifies, then applies captures.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScenarioFailure`] encountered.
    pub async fn run(
        &self,
        client: &ApiClient,
        credentials: &Credentials,
        bindings: &mut Bindings,
        transcript: &mut Transcript,
    ) -> Result<(), ScenarioFailure> {
        let request = self.request.resolve(bindings, credentials)?;
        let response = client.execute(&request, transcript).await?;
        self.expect.verify(&response, bindings)?;
        for capture in &self.captures {
            capture.apply(&response.body, bindings)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Scenarios
// ============================================================================

/// Scenario flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    /// HTTP API check.
    Api,
    /// Browser check.
    Ui,
}

/// The checked action of a scenario.
#[derive(Debug, Clone)]
pub enum Action {
    /// One HTTP request with its expectation.
    Http(HttpStep),
    /// A UI script.
    Ui(Vec<UiStep>),
}

/// One independent contract check.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Owning suite id.
    pub suite: String,
    /// Scenario id, unique within the suite.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Steps that create the resources the action needs.
    pub setup: Vec<HttpStep>,
    /// The checked action.
    pub action: Action,
}

impl Scenario {
    /// Builds an HTTP scenario.
    pub fn http(
        suite: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
        step: HttpStep,
    ) -> Self {
        Self {
            suite: suite.into(),
            id: id.into(),
            title: title.into(),
            setup: Vec::new(),
            action: Action::Http(step),
        }
    }

    /// Builds a UI scenario.
    pub fn ui(
        suite: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
        steps: Vec<UiStep>,
    ) -> Self {
        Self {
            suite: suite.into(),
            id: id.into(),
            title: title.into(),
            setup: Vec::new(),
            action: Action::Ui(steps),
        }
    }

    /// Replaces the setup steps.
    #[must_use]
    pub fn with_setup(mut self, setup: Vec<HttpStep>) -> Self {
        self.setup = setup;
        self
    }

    /// Returns the scenario flavor.
    #[must_use]
    pub const fn kind(&self) -> ScenarioKind {
        match self.action {
            Action::Http(_) => ScenarioKind::Api,
            Action::Ui(_) => ScenarioKind::Ui,
        }
    }

    /// Returns `suite.id`.
    #[must_use]
    pub fn qualified_id(&self) -> String {
        format!("{}.{}", self.suite, self.id)
    }
}

/// A named group of scenarios.
#[derive(Debug, Clone)]
pub struct Suite {
    /// Suite id, e.g. `api-endpoints`.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Scenarios in catalog order.
    pub scenarios: Vec<Scenario>,
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Scenario selection criteria. An empty filter selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioFilter {
    /// Suite ids to keep; empty keeps all suites.
    pub suites: Vec<String>,
    /// Substring matched against `suite.id`.
    pub pattern: Option<String>,
    /// Drop UI scenarios.
    pub api_only: bool,
}

impl ScenarioFilter {
    /// Returns whether a scenario passes every criterion.
    #[must_use]
    pub fn matches(&self, scenario: &Scenario) -> bool {
        if !self.suites.is_empty() && !self.suites.iter().any(|suite| *suite == scenario.suite) {
            return false;
        }
        if self.api_only && scenario.kind() == ScenarioKind::Ui {
            return false;
        }
        self.pattern.as_deref().is_none_or(|pattern| scenario.qualified_id().contains(pattern))
    }

    /// Flattens suites into the selected scenarios, preserving catalog order.
    #[must_use]
    pub fn select(&self, suites: Vec<Suite>) -> Vec<Scenario> {
        suites
            .into_iter()
            .flat_map(|suite| suite.scenarios)
            .filter(|scenario| self.matches(scenario))
            .collect()
    }
}
