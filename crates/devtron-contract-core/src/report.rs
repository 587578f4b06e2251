// crates/devtron-contract-core/src/report.rs
// ============================================================================
// Module: Run Reports
// Description: Scenario outcomes, run summaries, and on-disk artifacts.
// Purpose: Record what ran and write deterministic summaries per run.
// Dependencies: serde, serde_jcs
// ============================================================================

//! ## Overview
//! The runner produces a [`RunReport`]: one [`ScenarioOutcome`] per selected
//! scenario in catalog order. [`RunArtifacts`] writes the report under
//! `<run_root>/run_<unix_ms>/` as canonical `summary.json`, a human-readable
//! `summary.md`, and one transcript file per scenario.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::config::FixtureMode;
use crate::error::FailureKind;
use crate::error::HarnessError;
use crate::error::ScenarioFailure;
use crate::scenario::ScenarioKind;
use crate::transcript::TranscriptEntry;

/// Attempts made to find an unused run directory name.
const MAX_RUN_DIR_ATTEMPTS: u32 = 100;

// ============================================================================
// SECTION: Report Types
// ============================================================================

/// Pass/fail status of one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    /// Every assertion held.
    Pass,
    /// A failure ended the scenario.
    Fail,
}

impl ScenarioStatus {
    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

/// Serializable failure summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Failure class.
    pub kind: FailureKind,
    /// Rendered failure message.
    pub message: String,
}

impl From<&ScenarioFailure> for FailureRecord {
    fn from(failure: &ScenarioFailure) -> Self {
        Self {
            kind: failure.kind(),
            message: failure.to_string(),
        }
    }
}

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    /// Suite id.
    pub suite: String,
    /// Scenario id.
    pub scenario: String,
    /// Scenario title.
    pub title: String,
    /// Scenario flavor.
    pub kind: ScenarioKind,
    /// Pass or fail.
    pub status: ScenarioStatus,
    /// Failure details for failed scenarios.
    pub failure: Option<FailureRecord>,
    /// Wall time spent on the scenario.
    pub duration_ms: u64,
    /// Transcript; written to its own file.
    #[serde(skip)]
    pub transcript: Vec<TranscriptEntry>,
}

impl ScenarioOutcome {
    /// Returns `suite.scenario`.
    #[must_use]
    pub fn qualified_id(&self) -> String {
        format!("{}.{}", self.suite, self.scenario)
    }
}

/// Outcomes of one run, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Fixture mode the run used.
    pub fixture_mode: FixtureMode,
    /// Target base URL.
    pub base_url: String,
    /// Run start, unix milliseconds.
    pub started_at_ms: u64,
    /// Run end, unix milliseconds.
    pub ended_at_ms: u64,
    /// Per-scenario outcomes.
    pub outcomes: Vec<ScenarioOutcome>,
}

impl RunReport {
    /// Number of passing scenarios.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.status == ScenarioStatus::Pass).count()
    }

    /// Number of failing scenarios.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// True when at least one scenario ran and none failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.outcomes.is_empty() && self.failed() == 0
    }

    /// Total run time.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.ended_at_ms.saturating_sub(self.started_at_ms)
    }
}

/// `summary.json` layout.
#[derive(Serialize)]
struct RunSummary<'a> {
    /// Fixture mode the run used.
    fixture_mode: FixtureMode,
    /// Target base URL.
    base_url: &'a str,
    /// Run start, unix milliseconds.
    started_at_ms: u64,
    /// Run end, unix milliseconds.
    ended_at_ms: u64,
    /// Total run time.
    duration_ms: u64,
    /// Passing scenario count.
    passed: usize,
    /// Failing scenario count.
    failed: usize,
    /// Outcomes without transcripts.
    scenarios: &'a [ScenarioOutcome],
}

/// `transcripts/<suite>.<scenario>.json` layout.
#[derive(Serialize)]
struct TranscriptFile<'a> {
    /// Suite id.
    suite: &'a str,
    /// Scenario id.
    scenario: &'a str,
    /// Scenario status.
    status: ScenarioStatus,
    /// Transcript entries in order.
    entries: &'a [TranscriptEntry],
}

/// Current time in unix milliseconds.
#[must_use]
pub fn now_millis() -> u64 {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    u64::try_from(millis).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Artifact directory for one run.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    /// `<run_root>/run_<unix_ms>` directory.
    root: PathBuf,
}

impl RunArtifacts {
    /// Creates a fresh `run_<started_at_ms>` directory under `run_root`.
    ///
    /// A numeric suffix is appended when the name is taken.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Artifact`] when the directory cannot be created.
    pub fn create(run_root: &Path, started_at_ms: u64) -> Result<Self, HarnessError> {
        fs::create_dir_all(run_root).map_err(|err| artifact_error(run_root, &err))?;
        for attempt in 0 .. MAX_RUN_DIR_ATTEMPTS {
            let name = if attempt == 0 {
                format!("run_{started_at_ms}")
            } else {
                format!("run_{started_at_ms}_{attempt}")
            };
            let root = run_root.join(name);
            match fs::create_dir(&root) {
                Ok(()) => {
                    let transcripts = root.join("transcripts");
                    fs::create_dir(&transcripts).map_err(|err| artifact_error(&transcripts, &err))?;
                    return Ok(Self {
                        root,
                    });
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
                Err(err) => return Err(artifact_error(&root, &err)),
            }
        }
        Err(HarnessError::Artifact(format!(
            "no free run directory under {}",
            run_root.display()
        )))
    }

    /// Returns the run directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Artifact`] on serialization or I/O failure.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, HarnessError> {
        let path = self.root.join(name);
        let bytes = serde_jcs::to_vec(value)
            .map_err(|err| HarnessError::Artifact(format!("{name}: {err}")))?;
        fs::write(&path, bytes).map_err(|err| artifact_error(&path, &err))?;
        Ok(path)
    }

    /// Writes a UTF-8 text artifact.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Artifact`] on I/O failure.
    pub fn write_text(&self, name: &str, value: &str) -> Result<PathBuf, HarnessError> {
        let path = self.root.join(name);
        fs::write(&path, value.as_bytes()).map_err(|err| artifact_error(&path, &err))?;
        Ok(path)
    }

    /// Writes the summaries and every transcript; returns the written paths.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Artifact`] on the first failed write.
    pub fn write_report(&self, report: &RunReport) -> Result<Vec<PathBuf>, HarnessError> {
        let summary = RunSummary {
            fixture_mode: report.fixture_mode,
            base_url: &report.base_url,
            started_at_ms: report.started_at_ms,
            ended_at_ms: report.ended_at_ms,
            duration_ms: report.duration_ms(),
            passed: report.passed(),
            failed: report.failed(),
            scenarios: &report.outcomes,
        };
        let mut written = vec![
            self.write_json("summary.json", &summary)?,
            self.write_text("summary.md", &summary_markdown(report))?,
        ];
        for outcome in &report.outcomes {
            let file = TranscriptFile {
                suite: &outcome.suite,
                scenario: &outcome.scenario,
                status: outcome.status,
                entries: &outcome.transcript,
            };
            let name = format!("transcripts/{}.json", outcome.qualified_id());
            written.push(self.write_json(&name, &file)?);
        }
        Ok(written)
    }
}

/// Wraps an I/O failure with the path it concerns.
fn artifact_error(path: &Path, err: &io::Error) -> HarnessError {
    HarnessError::Artifact(format!("{}: {err}", path.display()))
}

/// Renders the markdown summary.
#[must_use]
pub fn summary_markdown(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str("# Devtron Contract Run\n\n");
    out.push_str("## Status\n\n");
    let _ = writeln!(out, "- Target: {}", report.base_url);
    let _ = writeln!(out, "- Fixture mode: {}", report.fixture_mode);
    let _ = writeln!(out, "- Passed: {}", report.passed());
    let _ = writeln!(out, "- Failed: {}", report.failed());
    let _ = writeln!(out, "- Duration (ms): {}", report.duration_ms());
    out.push_str("\n## Scenarios\n\n");
    if report.outcomes.is_empty() {
        out.push_str("- None\n");
    } else {
        out.push_str("| Scenario | Kind | Status | Duration (ms) |\n");
        out.push_str("|----------|------|--------|---------------|\n");
        for outcome in &report.outcomes {
            let kind = match outcome.kind {
                ScenarioKind::Api => "api",
                ScenarioKind::Ui => "ui",
            };
            let _ = writeln!(
                out,
                "| {} | {kind} | {} | {} |",
                outcome.qualified_id(),
                outcome.status.as_str(),
                outcome.duration_ms
            );
        }
    }
    out.push_str("\n## Failures\n\n");
    let failures: Vec<&ScenarioOutcome> =
        report.outcomes.iter().filter(|outcome| outcome.failure.is_some()).collect();
    if failures.is_empty() {
        out.push_str("- None\n");
    } else {
        for outcome in failures {
            if let Some(failure) = &outcome.failure {
                let _ = writeln!(
                    out,
                    "- {} ({}): {}",
                    outcome.qualified_id(),
                    failure.kind.as_str(),
                    failure.message
                );
            }
        }
    }
    out
}
