// crates/devtron-contract-core/src/ui/webdriver.rs
// ============================================================================
// Module: WebDriver Client
// Description: W3C WebDriver page driver over HTTP.
// Purpose: Automate a real browser through chromedriver, geckodriver, or a grid.
// Dependencies: async-trait, reqwest, serde_json
// ============================================================================

//! ## Overview
//! [`WebDriverFactory`] opens one session per UI scenario by posting the
//! configured capabilities to `{webdriver_url}/session`. [`WebDriverSession`]
//! maps each [`PageDriver`] call onto the matching W3C command. Elements are
//! located fresh on every call, so stale references surface as retryable
//! [`DriverError::NotReady`] rather than sticking to a dead node.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Method;
use serde_json::Value;
use serde_json::json;

use super::DriverError;
use super::DriverFactory;
use super::PageDriver;
use crate::config::Browser;
use crate::config::UiConfig;
use crate::error::HarnessError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// W3C web element identifier key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// WebDriver error codes that mean "try again shortly".
const RETRYABLE_ERRORS: [&str; 4] = [
    "no such element",
    "stale element reference",
    "element not interactable",
    "element click intercepted",
];

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Opens WebDriver sessions against a remote end.
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    /// Shared HTTP client.
    client: Client,
    /// Remote end URL without a trailing slash.
    endpoint: String,
    /// New-session payload.
    capabilities: Value,
}

impl WebDriverFactory {
    /// Builds a factory from UI settings.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Client`] when the HTTP client cannot be constructed.
    pub fn new(ui: &UiConfig) -> Result<Self, HarnessError> {
        let client = Client::builder().build().map_err(|err| HarnessError::Client(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: ui.webdriver_url.as_str().trim_end_matches('/').to_string(),
            capabilities: session_capabilities(ui.browser, ui.headless),
        })
    }

    /// Returns the new-session payload.
    #[must_use]
    pub const fn capabilities(&self) -> &Value {
        &self.capabilities
    }
}

#[async_trait]
impl DriverFactory for WebDriverFactory {
    async fn open(&self) -> Result<Box<dyn PageDriver>, DriverError> {
        let session =
            WebDriverSession::start(self.client.clone(), self.endpoint.clone(), &self.capabilities)
                .await?;
        Ok(Box::new(session))
    }
}

/// Builds the `alwaysMatch` capabilities for a browser.
fn session_capabilities(browser: Browser, headless: bool) -> Value {
    let mut always_match = json!({ "browserName": browser.capability_name() });
    if headless {
        let (key, flag) = match browser {
            Browser::Chrome => ("goog:chromeOptions", "--headless=new"),
            Browser::Firefox => ("moz:firefoxOptions", "-headless"),
        };
        always_match[key] = json!({ "args": [flag] });
    }
    json!({ "capabilities": { "alwaysMatch": always_match } })
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// One live WebDriver session.
#[derive(Debug)]
pub struct WebDriverSession {
    /// Shared HTTP client.
    client: Client,
    /// Remote end URL without a trailing slash.
    endpoint: String,
    /// Session id assigned by the remote end.
    session_id: String,
    /// Set once the session has been deleted.
    closed: bool,
}

impl WebDriverSession {
    /// Starts a session with the given new-session payload.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when the remote end refuses the session.
    pub async fn start(
        client: Client,
        endpoint: String,
        capabilities: &Value,
    ) -> Result<Self, DriverError> {
        let value =
            send(&client, Method::POST, &format!("{endpoint}/session"), Some(capabilities)).await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| DriverError::Protocol("new session response lacks sessionId".to_string()))?
            .to_string();
        Ok(Self {
            client,
            endpoint,
            session_id,
            closed: false,
        })
    }

    /// Returns the remote session id.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Sends a session-scoped command and returns its `value`.
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, DriverError> {
        let url = format!("{}/session/{}{path}", self.endpoint, self.session_id);
        send(&self.client, method, &url, body).await
    }

    /// Locates an element by CSS selector and returns its reference.
    async fn find(&self, selector: &str) -> Result<String, DriverError> {
        let body = json!({ "using": "css selector", "value": selector });
        let value = self.command(Method::POST, "/element", Some(&body)).await?;
        value.get(ELEMENT_KEY).and_then(Value::as_str).map(ToString::to_string).ok_or_else(|| {
            DriverError::Protocol(format!("find element response for {selector} lacks a reference"))
        })
    }

    /// Locates an element and sends a command to it.
    async fn element_command(
        &self,
        selector: &str,
        method: Method,
        command: &str,
        body: Option<&Value>,
    ) -> Result<Value, DriverError> {
        let element = self.find(selector).await?;
        self.command(method, &format!("/element/{element}/{command}"), body).await
    }
}

#[async_trait]
impl PageDriver for WebDriverSession {
    async fn goto(&mut self, url: &str) -> Result<(), DriverError> {
        self.command(Method::POST, "/url", Some(&json!({ "url": url }))).await.map(drop)
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), DriverError> {
        let element = self.find(selector).await?;
        self.command(Method::POST, &format!("/element/{element}/clear"), Some(&json!({})))
            .await?;
        self.command(
            Method::POST,
            &format!("/element/{element}/value"),
            Some(&json!({ "text": value })),
        )
        .await
        .map(drop)
    }

    async fn click(&mut self, selector: &str) -> Result<(), DriverError> {
        self.element_command(selector, Method::POST, "click", Some(&json!({}))).await.map(drop)
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        let value = self.command(Method::GET, "/url", None).await?;
        value
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| DriverError::Protocol("current url is not a string".to_string()))
    }

    async fn is_visible(&mut self, selector: &str) -> Result<bool, DriverError> {
        let value = self.element_command(selector, Method::GET, "displayed", None).await?;
        value
            .as_bool()
            .ok_or_else(|| DriverError::Protocol("displayed state is not a boolean".to_string()))
    }

    async fn text(&mut self, selector: &str) -> Result<String, DriverError> {
        let value = self.element_command(selector, Method::GET, "text", None).await?;
        value
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| DriverError::Protocol("element text is not a string".to_string()))
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let url = format!("{}/session/{}", self.endpoint, self.session_id);
        send(&self.client, Method::DELETE, &url, None).await.map(drop)
    }
}

// ============================================================================
// SECTION: Wire Helpers
// ============================================================================

/// Sends one WebDriver command and unwraps the `value` envelope.
async fn send(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<&Value>,
) -> Result<Value, DriverError> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(body);
    }
    let response = request.send().await.map_err(|err| DriverError::Transport(err.to_string()))?;
    let status = response.status();
    let envelope: Value =
        response.json().await.map_err(|err| DriverError::Protocol(err.to_string()))?;
    let value = envelope.get("value").cloned().unwrap_or(Value::Null);
    if status.is_success() && value.get("error").is_none() {
        return Ok(value);
    }
    Err(classify(status.as_u16(), &value))
}

/// Maps a WebDriver error payload onto [`DriverError`].
fn classify(status: u16, value: &Value) -> DriverError {
    let code = value.get("error").and_then(Value::as_str).unwrap_or("unknown error");
    let message = value.get("message").and_then(Value::as_str).unwrap_or_default();
    let text = format!("{code}: {message} (HTTP {status})");
    if RETRYABLE_ERRORS.contains(&code) {
        DriverError::NotReady(text)
    } else {
        DriverError::Protocol(text)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
