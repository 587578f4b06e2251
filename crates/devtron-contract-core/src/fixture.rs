// crates/devtron-contract-core/src/fixture.rs
// ============================================================================
// Module: Request Fixtures
// Description: Request fixtures, fixture bindings, and template resolution.
// Purpose: Turn declarative scenario requests into concrete HTTP requests.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`RequestFixture`] names a method, a path template, an authorization
//! mode, and an optional JSON body. [`Bindings`] supplies fixture ids:
//! - `{name}` anywhere in a path is replaced by the bound value.
//! - A JSON string that is exactly `"{name}"` is replaced by the bound value,
//!   in request bodies and in expected field values alike. Captured numbers
//!   stay numbers there; paths use their decimal form.
//!
//! Values spliced into paths must be a single safe path segment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::config::Credentials;
use crate::config::FixtureConfig;
use crate::error::ScenarioFailure;

// ============================================================================
// SECTION: Binding Names
// ============================================================================

/// Binding holding the application id.
pub const APPLICATION_ID: &str = "application_id";
/// Binding holding the chart repository id.
pub const REPOSITORY_ID: &str = "repository_id";
/// Binding holding the deployment pipeline id.
pub const PIPELINE_ID: &str = "pipeline_id";
/// Binding holding the deployment id.
pub const DEPLOYMENT_ID: &str = "deployment_id";
/// Binding holding the user id.
pub const USER_ID: &str = "user_id";
/// Binding holding the commit hash.
pub const COMMIT_HASH: &str = "commit_hash";

// ============================================================================
// SECTION: Bindings
// ============================================================================

/// Named fixture values available to one scenario.
///
/// # Invariants
/// - Every bound value is a JSON string or a JSON number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    /// Values keyed by binding name.
    values: BTreeMap<String, Value>,
}

impl Bindings {
    /// Creates an empty binding set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds bindings from configured fixture ids.
    #[must_use]
    pub fn from_fixtures(fixtures: &FixtureConfig) -> Self {
        let mut bindings = Self::new();
        bindings.insert(APPLICATION_ID, &fixtures.application_id);
        bindings.insert(REPOSITORY_ID, &fixtures.repository_id);
        bindings.insert(PIPELINE_ID, &fixtures.pipeline_id);
        bindings.insert(DEPLOYMENT_ID, &fixtures.deployment_id);
        bindings.insert(USER_ID, &fixtures.user_id);
        bindings.insert(COMMIT_HASH, &fixtures.commit_hash);
        bindings
    }

    /// Binds or rebinds a string value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), Value::String(value.into()));
    }

    /// Binds or rebinds a captured JSON value, keeping its type for bodies.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioFailure::Fixture`] unless the value is a non-empty
    /// string or a number.
    pub fn insert_json(&mut self, name: impl Into<String>, value: Value) -> Result<(), ScenarioFailure> {
        let name = name.into();
        let bindable = value.is_number() || value.as_str().is_some_and(|text| !text.is_empty());
        if !bindable {
            return Err(ScenarioFailure::Fixture(format!("cannot bind {value} to `{name}`")));
        }
        self.values.insert(name, value);
        Ok(())
    }

    /// Returns a bound value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns a bound value or a fixture failure naming the binding.
    fn require(&self, name: &str) -> Result<&Value, ScenarioFailure> {
        self.get(name).ok_or_else(|| ScenarioFailure::Fixture(format!("unbound fixture `{name}`")))
    }

    /// Returns a bound value as text: strings as-is, numbers in decimal.
    fn require_text(&self, name: &str) -> Result<String, ScenarioFailure> {
        match self.require(name)? {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            other => Err(ScenarioFailure::Fixture(format!("fixture `{name}` holds {other}"))),
        }
    }

    /// Replaces every `{name}` placeholder in a path template.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioFailure::Fixture`] for unbound names, unterminated
    /// placeholders, or values that are not a single safe path segment.
    pub fn resolve_path(&self, template: &str) -> Result<String, ScenarioFailure> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[.. open]);
            let after = &rest[open + 1 ..];
            let close = after.find('}').ok_or_else(|| {
                ScenarioFailure::Fixture(format!("unterminated placeholder in `{template}`"))
            })?;
            let name = &after[.. close];
            if !is_binding_name(name) {
                return Err(ScenarioFailure::Fixture(format!(
                    "invalid placeholder `{{{name}}}` in `{template}`"
                )));
            }
            let value = self.require_text(name)?;
            if !is_path_segment(&value) {
                return Err(ScenarioFailure::Fixture(format!(
                    "fixture `{name}` is not a safe path segment"
                )));
            }
            out.push_str(&value);
            rest = &after[close + 1 ..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Replaces placeholder strings anywhere inside a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioFailure::Fixture`] when a placeholder is unbound.
    pub fn resolve_value(&self, value: &Value) -> Result<Value, ScenarioFailure> {
        match value {
            Value::String(text) => match placeholder_name(text) {
                Some(name) => Ok(self.require(name)?.clone()),
                None => Ok(value.clone()),
            },
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(fields) => {
                let mut resolved = Map::with_capacity(fields.len());
                for (key, item) in fields {
                    resolved.insert(key.clone(), self.resolve_value(item)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.clone()),
        }
    }
}

/// Returns a placeholder string for a binding name: `{name}`.
#[must_use]
pub fn placeholder(name: &str) -> String {
    format!("{{{name}}}")
}

/// Returns true when a JSON value is a bare `"{name}"` placeholder.
#[must_use]
pub fn is_placeholder(value: &Value) -> bool {
    value.as_str().and_then(placeholder_name).is_some()
}

/// Extracts `name` from a string that is exactly `{name}`.
fn placeholder_name(text: &str) -> Option<&str> {
    let name = text.strip_prefix('{')?.strip_suffix('}')?;
    is_binding_name(name).then_some(name)
}

/// Binding names are non-empty ASCII identifiers.
fn is_binding_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
}

/// Returns true when a value can be spliced into a path as one segment.
fn is_path_segment(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.chars().any(|ch| matches!(ch, '/' | '?' | '#' | '%') || ch.is_whitespace())
}

// ============================================================================
// SECTION: Request Fixtures
// ============================================================================

/// HTTP methods used by the scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Returns the method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Converts to the reqwest method type.
    #[must_use]
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization sent with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// Bearer token from `API_TOKEN`.
    ApiToken,
    /// A fixed bearer token, e.g. a deliberately invalid one.
    Bearer(String),
    /// No `Authorization` header.
    Anonymous,
}

/// Declarative HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestFixture {
    /// HTTP method.
    pub method: Method,
    /// Path template relative to the base URL.
    pub path: String,
    /// Authorization mode.
    pub auth: Auth,
    /// Optional JSON body, possibly holding placeholders.
    pub body: Option<Value>,
}

impl RequestFixture {
    /// Builds a request with the API token and no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            auth: Auth::ApiToken,
            body: None,
        }
    }

    /// `GET path`
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// `POST path` with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    /// `PATCH path` with a JSON body.
    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Patch, path).with_body(body)
    }

    /// `DELETE path`
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Replaces the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Replaces the authorization mode.
    #[must_use]
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    /// Resolves templates and credentials into a concrete request.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioFailure::Fixture`] for template errors and
    /// [`ScenarioFailure::MissingCredential`] when `API_TOKEN` is required but unset.
    pub fn resolve(
        &self,
        bindings: &Bindings,
        credentials: &Credentials,
    ) -> Result<ResolvedRequest, ScenarioFailure> {
        let bearer = match &self.auth {
            Auth::ApiToken => Some(
                credentials
                    .api_token()
                    .ok_or(ScenarioFailure::MissingCredential("API_TOKEN"))?
                    .to_string(),
            ),
            Auth::Bearer(token) => Some(token.clone()),
            Auth::Anonymous => None,
        };
        Ok(ResolvedRequest {
            method: self.method,
            path: bindings.resolve_path(&self.path)?,
            bearer,
            body: self.body.as_ref().map(|body| bindings.resolve_value(body)).transpose()?,
        })
    }
}

/// A request ready to send.
///
/// # Invariants
/// - `path` holds no placeholders.
/// - `Debug` output never includes the bearer token.
#[derive(Clone, PartialEq)]
pub struct ResolvedRequest {
    /// HTTP method.
    pub method: Method,
    /// Concrete path relative to the base URL.
    pub path: String,
    /// Bearer token, if any.
    pub bearer: Option<String>,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl fmt::Debug for ResolvedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("body", &self.body)
            .finish()
    }
}

