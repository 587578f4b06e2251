// crates/devtron-contract-core/src/expect.rs
// ============================================================================
// Module: Expected Outcomes
// Description: Status and response-body assertions.
// Purpose: Compare a response against an expected status and body predicates.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! An [`ExpectedOutcome`] is an exact status code plus an ordered list of
//! [`BodyPredicate`]s. The status is checked first; predicates run in
//! declaration order and the first failure ends the check.
//! Field predicates address top-level fields of a JSON object body.

use std::fmt;

use serde_json::Value;

use crate::client::ApiResponse;
use crate::client::ResponseBody;
use crate::error::ScenarioFailure;
use crate::fixture::Bindings;
use crate::fixture::is_placeholder;

/// Structural or value check over a decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyPredicate {
    /// Body is a JSON array.
    IsArray,
    /// Body is a JSON object carrying the field.
    HasProperty(String),
    /// Field equals a value; placeholder strings resolve against bindings.
    FieldEquals {
        /// Field name.
        field: String,
        /// Expected value.
        value: Value,
    },
    /// Field is a string containing a substring.
    FieldContains {
        /// Field name.
        field: String,
        /// Required substring.
        substring: String,
    },
}

impl fmt::Display for BodyPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IsArray => f.write_str("body is an array"),
            Self::HasProperty(field) => write!(f, "body has property `{field}`"),
            Self::FieldEquals {
                field,
                value,
            } => write!(f, "`{field}` equals {value}"),
            Self::FieldContains {
                field,
                substring,
            } => write!(f, "`{field}` contains {substring:?}"),
        }
    }
}

impl BodyPredicate {
    /// Evaluates the predicate.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioFailure::BodyMismatch`] when the body does not satisfy
    /// the predicate, or [`ScenarioFailure::Fixture`] when an expected value
    /// names an unbound placeholder.
    pub fn check(&self, body: &ResponseBody, bindings: &Bindings) -> Result<(), ScenarioFailure> {
        let json = body.json().ok_or_else(|| {
            ScenarioFailure::body(self.to_string(), format!("response body is {}", describe_body(body)))
        })?;
        match self {
            Self::IsArray => {
                if json.is_array() {
                    Ok(())
                } else {
                    Err(ScenarioFailure::body(self.to_string(), format!("got {}", json_kind(json))))
                }
            }
            Self::HasProperty(field) => field_of(json, field).map(|_| ()).ok_or_else(|| {
                ScenarioFailure::body(self.to_string(), missing_field_detail(json))
            }),
            Self::FieldEquals {
                field,
                value,
            } => {
                let expected = bindings.resolve_value(value)?;
                let actual = field_of(json, field).ok_or_else(|| {
                    ScenarioFailure::body(self.to_string(), missing_field_detail(json))
                })?;
                if *actual == expected || bound_id_matches(value, &expected, actual) {
                    Ok(())
                } else {
                    Err(ScenarioFailure::body(
                        format!("`{field}` equals {expected}"),
                        format!("got {actual}"),
                    ))
                }
            }
            Self::FieldContains {
                field,
                substring,
            } => {
                let actual = field_of(json, field).ok_or_else(|| {
                    ScenarioFailure::body(self.to_string(), missing_field_detail(json))
                })?;
                match actual.as_str() {
                    Some(text) if text.contains(substring.as_str()) => Ok(()),
                    Some(text) => Err(ScenarioFailure::body(self.to_string(), format!("got {text:?}"))),
                    None => Err(ScenarioFailure::body(
                        self.to_string(),
                        format!("got {}", json_kind(actual)),
                    )),
                }
            }
        }
    }
}

/// Expected status code plus body predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedOutcome {
    /// Exact expected status.
    pub status: u16,
    /// Body predicates, checked in order.
    pub body: Vec<BodyPredicate>,
}

impl ExpectedOutcome {
    /// Expects a status with no body checks.
    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    /// Adds [`BodyPredicate::IsArray`].
    #[must_use]
    pub fn array(mut self) -> Self {
        self.body.push(BodyPredicate::IsArray);
        self
    }

    /// Adds [`BodyPredicate::HasProperty`].
    #[must_use]
    pub fn has_property(mut self, field: impl Into<String>) -> Self {
        self.body.push(BodyPredicate::HasProperty(field.into()));
        self
    }

    /// Adds [`BodyPredicate::FieldEquals`].
    #[must_use]
    pub fn field_equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.push(BodyPredicate::FieldEquals {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Adds [`BodyPredicate::FieldContains`].
    #[must_use]
    pub fn field_contains(mut self, field: impl Into<String>, substring: impl Into<String>) -> Self {
        self.body.push(BodyPredicate::FieldContains {
            field: field.into(),
            substring: substring.into(),
        });
        self
    }

    /// Checks status first, then every body predicate in order.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn verify(&self, response: &ApiResponse, bindings: &Bindings) -> Result<(), ScenarioFailure> {
        assert_status(response.status, self.status)?;
        for predicate in &self.body {
            predicate.check(&response.body, bindings)?;
        }
        Ok(())
    }
}

/// Exact status comparison.
///
/// # Errors
///
/// Returns [`ScenarioFailure::UnexpectedStatus`] on mismatch.
pub fn assert_status(actual: u16, expected: u16) -> Result<(), ScenarioFailure> {
    if actual == expected {
        Ok(())
    } else {
        Err(ScenarioFailure::UnexpectedStatus {
            expected,
            actual,
        })
    }
}

/// Seeded bindings are strings, so a bound id also matches a number with the
/// same decimal rendering.
fn bound_id_matches(template: &Value, expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::String(text), Value::Number(number)) => {
            is_placeholder(template) && number.to_string() == *text
        }
        _ => false,
    }
}

/// Returns a top-level field of an object body.
fn field_of<'a>(json: &'a Value, field: &str) -> Option<&'a Value> {
    json.as_object().and_then(|object| object.get(field))
}

/// Names a JSON value's type for failure messages.
const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Describes what a non-JSON body held.
fn describe_body(body: &ResponseBody) -> String {
    match body {
        ResponseBody::Empty => "empty".to_string(),
        ResponseBody::Json(value) => json_kind(value).to_string(),
        ResponseBody::Text(text) => {
            let preview: String = text.chars().take(80).collect();
            format!("not JSON ({preview:?})")
        }
    }
}

/// Lists available fields, or the body kind when it is not an object.
fn missing_field_detail(json: &Value) -> String {
    match json.as_object() {
        Some(object) => {
            let keys: Vec<&str> = object.keys().map(String::as_str).collect();
            format!("field missing; body has [{}]", keys.join(", "))
        }
        None => format!("body is {}", json_kind(json)),
    }
}
