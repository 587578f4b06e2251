// crates/devtron-contract-suites/src/authentication.rs
// ============================================================================
// Module: Authentication Suite
// Description: Login UI checks driven through a browser.
// Purpose: Validate login, rejected login, logout, and password reset flows.
// Dependencies: devtron-contract-core
// ============================================================================

//! ## Overview
//! Scripts run against the target's web UI. Form selectors match the Devtron
//! login page: `input[name="username"]`, `input[name="password"]`, and
//! `button[type="submit"]`. Admin credentials come from `ADMIN_USERNAME` and
//! `ADMIN_PASSWORD`, falling back to `admin` / `password`.

use std::sync::LazyLock;

use devtron_contract_core::Credentials;
use devtron_contract_core::HarnessConfig;
use devtron_contract_core::Scenario;
use devtron_contract_core::Suite;
use devtron_contract_core::UiStep;
use devtron_contract_core::UrlMatcher;

/// Suite id.
pub const SUITE_ID: &str = "authentication";

/// Username field.
pub const USERNAME_INPUT: &str = "input[name=\"username\"]";
/// Password field.
pub const PASSWORD_INPUT: &str = "input[name=\"password\"]";
/// Email field on the password-reset form.
pub const EMAIL_INPUT: &str = "input[name=\"email\"]";
/// Submit button on both forms.
pub const SUBMIT_BUTTON: &str = "button[type=\"submit\"]";
/// Logout control on authenticated pages.
pub const LOGOUT_BUTTON: &str = "button[data-testid=\"logout-button\"]";
/// Link from the login page to the password-reset form.
pub const FORGOT_PASSWORD_LINK: &str = "a[href=\"/forgot-password\"]";
/// Login error banner.
pub const ERROR_MESSAGE: &str = ".error-message";
/// Password-reset confirmation banner.
pub const RESET_CONFIRMATION: &str = ".reset-confirmation";

/// Post-login landing pages.
const LANDING_PATTERN: &str = "dashboard|home";

/// Builds the suite.
#[must_use]
pub fn suite(config: &HarnessConfig) -> Suite {
    let credentials = &config.credentials;
    Suite {
        id: SUITE_ID.to_string(),
        title: "Devtron Authentication".to_string(),
        scenarios: vec![
            login_valid(credentials),
            login_invalid(),
            logout(credentials),
            password_reset(credentials),
        ],
    }
}

/// Navigate to `/login`, fill the form, and submit.
fn login_steps(username: &str, password: &str) -> Vec<UiStep> {
    vec![
        UiStep::navigate("/login"),
        UiStep::fill(USERNAME_INPUT, username),
        UiStep::fill(PASSWORD_INPUT, password),
        UiStep::click(SUBMIT_BUTTON),
    ]
}

/// Compiled [`LANDING_PATTERN`].
#[allow(clippy::expect_used, reason = "LANDING_PATTERN is a fixed literal alternation.")]
static LANDING_URL: LazyLock<UrlMatcher> = LazyLock::new(|| {
    UrlMatcher::pattern(LANDING_PATTERN).expect("landing pattern compiles")
});

fn landing_url() -> UiStep {
    UiStep::ExpectUrl(LANDING_URL.clone())
}

fn login_valid(credentials: &Credentials) -> Scenario {
    let mut steps = login_steps(credentials.login_username(), credentials.login_password());
    steps.push(landing_url());
    steps.push(UiStep::expect_visible("nav"));
    Scenario::ui(SUITE_ID, "login-valid", "should login with valid credentials", steps)
}

fn login_invalid() -> Scenario {
    let mut steps = login_steps("invalid_user", "wrong_password");
    steps.push(UiStep::expect_visible(ERROR_MESSAGE));
    steps.push(UiStep::expect_text(ERROR_MESSAGE, "Invalid credentials"));
    Scenario::ui(SUITE_ID, "login-invalid", "should prevent login with invalid credentials", steps)
}

fn logout(credentials: &Credentials) -> Scenario {
    let mut steps = login_steps(credentials.login_username(), credentials.login_password());
    steps.push(UiStep::click(LOGOUT_BUTTON));
    steps.push(UiStep::ExpectUrl(UrlMatcher::path("/login")));
    Scenario::ui(SUITE_ID, "logout", "should logout successfully", steps)
}

fn password_reset(credentials: &Credentials) -> Scenario {
    let steps = vec![
        UiStep::navigate("/login"),
        UiStep::click(FORGOT_PASSWORD_LINK),
        UiStep::fill(EMAIL_INPUT, credentials.reset_email()),
        UiStep::click(SUBMIT_BUTTON),
        UiStep::expect_visible(RESET_CONFIRMATION),
        UiStep::expect_text(RESET_CONFIRMATION, "Password reset instructions sent"),
    ];
    Scenario::ui(SUITE_ID, "password-reset", "should handle password reset", steps)
}
