// crates/devtron-contract-core/src/ui/mod.rs
// ============================================================================
// Module: UI Automation
// Description: Browser driver abstraction and UI step execution.
// Purpose: Drive the login UI through a swappable page driver.
// Dependencies: async-trait, regex, reqwest
// ============================================================================

//! ## Overview
//! UI scenarios are a list of [`UiStep`]s executed against a [`PageDriver`].
//! The production driver speaks W3C WebDriver over HTTP
//! ([`WebDriverFactory`]); tests plug in their own drivers.
//!
//! Element interactions and expectations poll until the configured wait window
//! elapses. [`DriverError::NotReady`] means "not yet" and is retried; any other
//! driver error fails the scenario immediately.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod script;
mod webdriver;


// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;

use crate::error::ScenarioFailure;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use script::UiStep;
pub use script::UrlMatcher;
pub use script::WaitPolicy;
pub use script::run_ui_steps;
pub use webdriver::WebDriverFactory;
pub use webdriver::WebDriverSession;

// ============================================================================
// SECTION: Driver Interfaces
// ============================================================================

/// Page driver errors.
///
/// # Invariants
/// - Variants are stable for retry classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Element missing, stale, or not yet interactable; worth retrying.
    #[error("element not ready: {0}")]
    NotReady(String),
    /// The driver endpoint could not be reached.
    #[error("driver transport error: {0}")]
    Transport(String),
    /// The driver rejected a command.
    #[error("driver protocol error: {0}")]
    Protocol(String),
}

impl From<DriverError> for ScenarioFailure {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Transport(message) => Self::Transport(message),
            DriverError::NotReady(message) | DriverError::Protocol(message) => {
                Self::Driver(message)
            }
        }
    }
}

/// One browser page under automation.
///
/// Selectors are CSS selectors. Element lookups that find nothing return
/// [`DriverError::NotReady`].
#[async_trait]
pub trait PageDriver: Send {
    /// Navigates to an absolute URL.
    async fn goto(&mut self, url: &str) -> Result<(), DriverError>;

    /// Clears an input and types a value into it.
    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), DriverError>;

    /// Clicks an element.
    async fn click(&mut self, selector: &str) -> Result<(), DriverError>;

    /// Returns the current page URL.
    async fn current_url(&mut self) -> Result<String, DriverError>;

    /// Returns whether the element is displayed.
    async fn is_visible(&mut self, selector: &str) -> Result<bool, DriverError>;

    /// Returns the element's rendered text.
    async fn text(&mut self, selector: &str) -> Result<String, DriverError>;

    /// Ends the browser session.
    async fn close(&mut self) -> Result<(), DriverError>;
}

/// Opens one fresh page driver per UI scenario.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    /// Opens a new browser session.
    async fn open(&self) -> Result<Box<dyn PageDriver>, DriverError>;
}
