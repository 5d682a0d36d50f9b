// easyrp-core/src/response.rs
// ============================================================================
// Module: Widget Response Builders
// Description: JSON, HTML, and notification payloads the widget understands.
// Purpose: Keep the wire shapes in one place, exactly as the widget expects.
// Dependencies: crate::account, serde_json
// ============================================================================

//! ## Overview
//! The account-chooser widget speaks three dialects: status JSON for
//! `userstatus` and `login` calls, a script page for popup callbacks that
//! invokes the toolkit notify functions, and notification payloads forwarded
//! to the login page in redirect mode. The shapes here are wire-compatible
//! with the widget and must not drift.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

use crate::account::Account;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Script page invoking the toolkit success notifier.
const HTML_SUCCESS: &str = "<script type=text/javascript \
     src='https://ajax.googleapis.com/jsapi'></script>\n\
     <script type='text/javascript'>  \
     google.load(\"identitytoolkit\", \"1.0\", {packages: [\"notify\"]});\n\
     </script>\n\
     <script type='text/javascript'>\n  \
     window.google.identitytoolkit.notifyFederatedSuccess(";

/// Script page invoking the toolkit error notifier.
const HTML_ERROR: &str = "<script type=text/javascript \
     src='https://ajax.googleapis.com/jsapi'></script>\n\
     <script type='text/javascript'>  \
     google.load(\"identitytoolkit\", \"1.0\", {packages: [\"notify\"]});\n\
     </script>\n\
     <script type='text/javascript'>\n  \
     window.google.identitytoolkit.notifyFederatedError(";

/// Closing tag shared by both script pages.
const HTML_TAIL: &str = ");\n</script>";

/// Error type for an assertion the IDP would not vouch for.
pub const ERROR_INVALID_ASSERTION_EMAIL: &str = "invalidAssertionEmail";
/// Error type for an assertion that failed verification.
pub const ERROR_INVALID_ASSERTION: &str = "invalidAssertion";
/// Error type for an asserted email that differs from the typed one.
pub const ERROR_ACCOUNT_MISMATCH: &str = "accountMismatch";

// ============================================================================
// SECTION: Status JSON
// ============================================================================

/// Legacy-signin status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigninStatus {
    /// Credentials accepted.
    Ok,
    /// Password missing or wrong.
    PasswordError,
    /// The account is federated; password login does not apply.
    Federated,
    /// No account exists for the email.
    EmailNotExist,
}

impl SigninStatus {
    /// Wire string for the status field.
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::PasswordError => "passwordError",
            Self::Federated => "federated",
            Self::EmailNotExist => "emailNotExist",
        }
    }
}

/// Builds the `userstatus` response body.
///
/// `legacy` is only emitted when true; profile fields are only emitted when
/// an account is supplied.
#[must_use]
pub fn user_status(registered: bool, legacy: bool, profile: Option<&Account>) -> Value {
    let mut body = json!({ "registered": registered });
    if legacy {
        body["legacy"] = Value::Bool(true);
    }
    fill_profile(&mut body, profile);
    body
}

/// Builds an empty `userstatus` error body.
#[must_use]
pub fn user_status_error() -> Value {
    json!({})
}

/// Builds the `login` response body.
#[must_use]
pub fn legacy_signin(status: SigninStatus, profile: Option<&Account>) -> Value {
    let mut body = json!({ "status": status.as_wire() });
    fill_profile(&mut body, profile);
    body
}

/// Copies display name and photo URL onto a body when present.
fn fill_profile(body: &mut Value, profile: Option<&Account>) {
    if let Some(account) = profile {
        if let Some(display_name) = &account.display_name {
            body["displayName"] = Value::String(display_name.clone());
        }
        if let Some(photo_url) = &account.photo_url {
            body["photoUrl"] = Value::String(photo_url.clone());
        }
    }
}

// ============================================================================
// SECTION: Popup Script Pages
// ============================================================================

/// Builds the popup page notifying federated success.
#[must_use]
pub fn popup_success(
    registered: bool,
    email: &str,
    display_name: Option<&str>,
    photo_url: Option<&str>,
) -> String {
    let mut body = json!({
        "email": email,
        "registered": registered,
    });
    if let Some(display_name) = display_name.filter(|value| !value.is_empty()) {
        body["displayName"] = Value::String(display_name.to_owned());
    }
    if let Some(photo_url) = photo_url.filter(|value| !value.is_empty()) {
        body["photoUrl"] = Value::String(photo_url.to_owned());
    }
    format!("{HTML_SUCCESS}{body}{HTML_TAIL}")
}

/// Builds the popup page notifying an account mismatch.
#[must_use]
pub fn popup_account_mismatch(
    validated_email: &str,
    input_email: &str,
    purpose: Option<&str>,
) -> String {
    let detail = mismatch_detail(validated_email, input_email, purpose);
    format!("{HTML_ERROR}'{ERROR_ACCOUNT_MISMATCH}', {detail}{HTML_TAIL}")
}

/// Builds the popup page notifying a generic federated error.
#[must_use]
pub fn popup_error(error_type: Option<&str>) -> String {
    let rendered = error_type
        .filter(|value| !value.is_empty())
        .map_or_else(|| "undefined".to_owned(), |value| format!("'{value}'"));
    format!("{HTML_ERROR}{rendered}, {{}}{HTML_TAIL}")
}

// ============================================================================
// SECTION: Redirect Notifications
// ============================================================================

/// Builds the account-mismatch notification for redirect mode.
#[must_use]
pub fn notification_account_mismatch(
    validated_email: &str,
    input_email: &str,
    purpose: Option<&str>,
) -> Value {
    let mut body = notification_error(Some(ERROR_ACCOUNT_MISMATCH));
    body["validatedEmail"] = Value::String(validated_email.to_owned());
    body["inputEmail"] = Value::String(input_email.to_owned());
    if let Some(purpose) = purpose.filter(|value| !value.is_empty()) {
        body["purpose"] = Value::String(purpose.to_owned());
    }
    body
}

/// Builds a generic error notification for redirect mode.
#[must_use]
pub fn notification_error(error_type: Option<&str>) -> Value {
    let mut body = json!({});
    if let Some(error_type) = error_type.filter(|value| !value.is_empty()) {
        body["errorType"] = Value::String(error_type.to_owned());
    }
    body
}

/// Shared mismatch detail payload for popup pages.
fn mismatch_detail(validated_email: &str, input_email: &str, purpose: Option<&str>) -> Value {
    let mut body = json!({
        "validatedEmail": validated_email,
        "inputEmail": input_email,
    });
    if let Some(purpose) = purpose.filter(|value| !value.is_empty()) {
        body["purpose"] = Value::String(purpose.to_owned());
    }
    body
}
