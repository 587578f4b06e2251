// crates/devtron-contract-core/src/transcript.rs
// ============================================================================
// Module: Scenario Transcripts
// Description: Ordered record of HTTP exchanges and UI events per scenario.
// Purpose: Give failing scenarios enough context to diagnose offline.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each scenario owns one [`Transcript`]. Entries are numbered from 1 in the
//! order they happened. Authorization headers and typed form values are never
//! recorded, and request or response body fields named in [`SECRET_FIELDS`]
//! are replaced with [`REDACTED`] before an exchange is stored.

use serde::Serialize;
use serde_json::Value;

/// Body fields whose values never reach a transcript.
pub const SECRET_FIELDS: [&str; 3] = ["password", "newPassword", "credentials"];

/// Replacement text for redacted values.
pub const REDACTED: &str = "<redacted>";

/// One HTTP request/response pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpExchange {
    /// Position in the transcript, starting at 1.
    pub sequence: u64,
    /// HTTP method.
    pub method: String,
    /// Absolute request URL.
    pub url: String,
    /// JSON request body, if any.
    pub request_body: Option<Value>,
    /// Response status, when a response arrived.
    pub status: Option<u16>,
    /// Decoded response body (JSON, or a string for non-JSON bodies).
    pub response_body: Option<Value>,
    /// Transport error, when no response arrived.
    pub error: Option<String>,
}

/// One browser interaction or observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiEvent {
    /// Position in the transcript, starting at 1.
    pub sequence: u64,
    /// Step kind, e.g. `navigate` or `expect_visible`.
    pub action: String,
    /// Step target (URL, selector, or matcher).
    pub detail: String,
    /// Failure text, when the step failed.
    pub error: Option<String>,
}

/// A transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptEntry {
    /// HTTP exchange.
    Http(HttpExchange),
    /// UI event.
    Ui(UiEvent),
}

/// Per-scenario transcript.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    /// Entries in order.
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sequence number for the next entry.
    fn next_sequence(&self) -> u64 {
        u64::try_from(self.entries.len()).unwrap_or(u64::MAX).saturating_add(1)
    }

    /// Records an HTTP exchange; the sequence number is assigned here.
    pub fn record_http(&mut self, mut exchange: HttpExchange) {
        exchange.sequence = self.next_sequence();
        let bodies = [exchange.request_body.as_mut(), exchange.response_body.as_mut()];
        for body in bodies.into_iter().flatten() {
            redact_secrets(body);
        }
        self.entries.push(TranscriptEntry::Http(exchange));
    }

    /// Records a UI event.
    pub fn record_ui(
        &mut self,
        action: impl Into<String>,
        detail: impl Into<String>,
        error: Option<String>,
    ) {
        let event = UiEvent {
            sequence: self.next_sequence(),
            action: action.into(),
            detail: detail.into(),
            error,
        };
        self.entries.push(TranscriptEntry::Ui(event));
    }

    /// Returns the recorded entries.
    #[must_use]
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Consumes the transcript, returning its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<TranscriptEntry> {
        self.entries
    }
}

/// Replaces secret fields at any depth.
fn redact_secrets(value: &mut Value) {
    match value {
        Value::Object(fields) => {
            for (key, field) in fields.iter_mut() {
                if SECRET_FIELDS.contains(&key.as_str()) {
                    *field = Value::String(REDACTED.to_string());
                } else {
                    redact_secrets(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_secrets),
        _ => {}
    }
}
