// crates/devtron-contract-core/src/ui/script.rs
// ============================================================================
// Module: UI Steps
// Description: Declarative UI steps and their polling executor.
// Purpose: Run navigate/fill/click/expect sequences against a page driver.
// Dependencies: regex, tokio, url
// ============================================================================

use std::fmt;
use std::time::Duration;
use std::time::Instant;

use regex::Regex;
use tokio::time::sleep;
use url::Url;

use super::DriverError;
use super::PageDriver;
use crate::config::UiConfig;
use crate::error::ScenarioFailure;
use crate::transcript::Transcript;

// ============================================================================
// SECTION: URL Matching
// ============================================================================

/// Expectation over the current page URL.
#[derive(Debug, Clone)]
pub enum UrlMatcher {
    /// Regex searched anywhere in the absolute URL.
    Pattern(Regex),
    /// Exact URL path, ignoring origin, query, and fragment.
    Path(String),
}

impl UrlMatcher {
    /// Compiles a regex matcher.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] when the pattern is invalid.
    pub fn pattern(raw: &str) -> Result<Self, regex::Error> {
        Regex::new(raw).map(Self::Pattern)
    }

    /// Builds an exact-path matcher.
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    /// Returns true when the URL satisfies the matcher.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Pattern(regex) => regex.is_match(url),
            Self::Path(path) => Url::parse(url).is_ok_and(|parsed| parsed.path() == path),
        }
    }
}

impl fmt::Display for UrlMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(regex) => write!(f, "url matching /{}/", regex.as_str()),
            Self::Path(path) => write!(f, "url path {path}"),
        }
    }
}

// ============================================================================
// SECTION: Steps
// ============================================================================

/// One UI interaction or expectation.
#[derive(Debug, Clone)]
pub enum UiStep {
    /// Open a path relative to the base URL.
    Navigate(String),
    /// Type into an input; the value is never recorded.
    Fill {
        /// CSS selector.
        selector: String,
        /// Text to type.
        value: String,
    },
    /// Click an element.
    Click(String),
    /// Wait for the page URL to match.
    ExpectUrl(UrlMatcher),
    /// Wait for an element to be displayed.
    ExpectVisible(String),
    /// Wait for an element's text to contain a substring.
    ExpectText {
        /// CSS selector.
        selector: String,
        /// Required substring.
        contains: String,
    },
}

impl UiStep {
    /// [`UiStep::Navigate`]
    pub fn navigate(path: impl Into<String>) -> Self {
        Self::Navigate(path.into())
    }

    /// [`UiStep::Fill`]
    pub fn fill(selector: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Fill {
            selector: selector.into(),
            value: value.into(),
        }
    }

    /// [`UiStep::Click`]
    pub fn click(selector: impl Into<String>) -> Self {
        Self::Click(selector.into())
    }

    /// [`UiStep::ExpectVisible`]
    pub fn expect_visible(selector: impl Into<String>) -> Self {
        Self::ExpectVisible(selector.into())
    }

    /// [`UiStep::ExpectText`]
    pub fn expect_text(selector: impl Into<String>, contains: impl Into<String>) -> Self {
        Self::ExpectText {
            selector: selector.into(),
            contains: contains.into(),
        }
    }

    /// Transcript action label.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Navigate(_) => "navigate",
            Self::Fill {
                ..
            } => "fill",
            Self::Click(_) => "click",
            Self::ExpectUrl(_) => "expect_url",
            Self::ExpectVisible(_) => "expect_visible",
            Self::ExpectText {
                ..
            } => "expect_text",
        }
    }

    /// Transcript detail; never includes typed values.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Navigate(path) => path.clone(),
            Self::Fill {
                selector, ..
            }
            | Self::Click(selector)
            | Self::ExpectVisible(selector) => selector.clone(),
            Self::ExpectUrl(matcher) => matcher.to_string(),
            Self::ExpectText {
                selector,
                contains,
            } => format!("{selector} contains {contains:?}"),
        }
    }

    /// What a timed-out step was waiting for.
    fn awaited(&self) -> String {
        match self {
            Self::Navigate(path) => format!("navigation to {path}"),
            Self::Fill {
                selector, ..
            } => format!("`{selector}` to accept input"),
            Self::Click(selector) => format!("`{selector}` to be clickable"),
            Self::ExpectUrl(matcher) => matcher.to_string(),
            Self::ExpectVisible(selector) => format!("`{selector}` to be visible"),
            Self::ExpectText {
                selector,
                contains,
            } => format!("`{selector}` to contain {contains:?}"),
        }
    }
}

/// Wait window for UI steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Total time a step may wait.
    pub timeout: Duration,
    /// Delay between attempts.
    pub interval: Duration,
}

impl WaitPolicy {
    /// Reads the wait window from UI settings.
    #[must_use]
    pub const fn from_config(ui: &UiConfig) -> Self {
        Self {
            timeout: ui.wait_timeout,
            interval: ui.poll_interval,
        }
    }
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs steps in order, recording each in the transcript.
///
/// # Errors
///
/// Returns the first failing step's [`ScenarioFailure`].
pub async fn run_ui_steps(
    driver: &mut dyn PageDriver,
    steps: &[UiStep],
    base_url: &Url,
    wait: WaitPolicy,
    transcript: &mut Transcript,
) -> Result<(), ScenarioFailure> {
    for step in steps {
        let result = run_step(driver, step, base_url, wait).await;
        transcript.record_ui(step.action(), step.detail(), result.as_ref().err().map(ToString::to_string));
        result?;
    }
    Ok(())
}

/// Runs one step; navigation is issued once, everything else polls.
async fn run_step(
    driver: &mut dyn PageDriver,
    step: &UiStep,
    base_url: &Url,
    wait: WaitPolicy,
) -> Result<(), ScenarioFailure> {
    if let UiStep::Navigate(path) = step {
        let url = base_url
            .join(path)
            .map_err(|err| ScenarioFailure::Fixture(format!("invalid page path {path}: {err}")))?;
        return driver.goto(url.as_str()).await.map_err(ScenarioFailure::from);
    }
    let started = Instant::now();
    loop {
        match attempt(driver, step).await {
            Ok(true) => return Ok(()),
            Ok(false) | Err(DriverError::NotReady(_)) => {}
            Err(err) => return Err(err.into()),
        }
        let elapsed = started.elapsed();
        if elapsed >= wait.timeout {
            return Err(ScenarioFailure::UiTimeout {
                target: step.awaited(),
                waited_ms: elapsed.as_millis(),
            });
        }
        sleep(wait.interval.min(wait.timeout.saturating_sub(elapsed))).await;
    }
}

/// Makes one attempt at a step. `Ok(false)` means "not satisfied yet".
async fn attempt(driver: &mut dyn PageDriver, step: &UiStep) -> Result<bool, DriverError> {
    match step {
        UiStep::Navigate(_) => Ok(true),
        UiStep::Fill {
            selector,
            value,
        } => driver.fill(selector, value).await.map(|()| true),
        UiStep::Click(selector) => driver.click(selector).await.map(|()| true),
        UiStep::ExpectUrl(matcher) => Ok(matcher.matches(&driver.current_url().await?)),
        UiStep::ExpectVisible(selector) => driver.is_visible(selector).await,
        UiStep::ExpectText {
            selector,
            contains,
        } => Ok(driver.text(selector).await?.contains(contains.as_str())),
    }
}
