// easyrp-core/src/request.rs
// ============================================================================
// Module: Request Contexts
// Description: Per-call mutable contexts for the three sign-in flavors.
// Purpose: Carry identifiers, loaded accounts, and collected responses
//          through a tree walk.
// Dependencies: crate::{account, idp}, serde, serde_json
// ============================================================================

//! ## Overview
//! Each sign-in call builds one request context, hands it to a flavor tree,
//! and reads the widget responses off it afterwards. Evaluators and actions
//! shared across flavors see the context through [`SigninContext`]; the
//! flavor-specific operations work on the concrete types.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::account::Account;
use crate::idp::AssertionVerdict;

// ============================================================================
// SECTION: Widget Responses
// ============================================================================

/// A response the sign-in logic wants delivered to the widget.
///
/// The host application owns the actual transport; the logic only records
/// what should be sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WidgetResponse {
    /// A JSON body.
    Json(serde_json::Value),
    /// An HTML page body.
    Html(String),
    /// A redirect to a URL.
    Redirect(String),
    /// A forward to a page with a notification payload attached.
    Forward {
        /// Page to forward to.
        page: String,
        /// Attribute key the notification is stored under.
        notification_key: String,
        /// The notification payload.
        notification: serde_json::Value,
    },
}

// ============================================================================
// SECTION: Shared Context View
// ============================================================================

/// The view shared evaluators and actions have of any sign-in request.
pub trait SigninContext {
    /// Current identifier (usually an email address).
    fn identifier(&self) -> &str;

    /// Replaces the identifier, e.g. with a verified assertion email.
    fn set_identifier(&mut self, identifier: String);

    /// The account loaded for the identifier, when one was found.
    fn account(&self) -> Option<&Account>;

    /// Stores or clears the loaded account.
    fn set_account(&mut self, account: Option<Account>);

    /// Opaque session id of the caller.
    fn session_id(&self) -> &str;

    /// Appends a response for the widget.
    fn respond(&mut self, response: WidgetResponse);

    /// Responses collected so far, in emission order.
    fn responses(&self) -> &[WidgetResponse];
}

// ============================================================================
// SECTION: Status Requests
// ============================================================================

/// Context for the user-status flavor.
#[derive(Debug, Clone, Default)]
pub struct StatusRequest {
    /// Identifier supplied by the widget.
    identifier: String,
    /// Session id of the caller.
    session_id: String,
    /// Account loaded while walking the tree.
    account: Option<Account>,
    /// Responses collected while walking the tree.
    responses: Vec<WidgetResponse>,
}

impl StatusRequest {
    /// Creates a user-status context.
    pub fn new(identifier: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            session_id: session_id.into(),
            account: None,
            responses: Vec::new(),
        }
    }
}

impl SigninContext for StatusRequest {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn set_identifier(&mut self, identifier: String) {
        self.identifier = identifier;
    }

    fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    fn set_account(&mut self, account: Option<Account>) {
        self.account = account;
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn respond(&mut self, response: WidgetResponse) {
        self.responses.push(response);
    }

    fn responses(&self) -> &[WidgetResponse] {
        &self.responses
    }
}

// ============================================================================
// SECTION: Login Requests
// ============================================================================

/// Context for the legacy-signin flavor.
#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    /// Identifier supplied by the widget.
    identifier: String,
    /// Password supplied by the widget.
    password: String,
    /// Session id of the caller.
    session_id: String,
    /// Account loaded while walking the tree.
    account: Option<Account>,
    /// Responses collected while walking the tree.
    responses: Vec<WidgetResponse>,
}

impl LoginRequest {
    /// Creates a legacy-signin context.
    pub fn new(
        identifier: impl Into<String>,
        password: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
            session_id: session_id.into(),
            account: None,
            responses: Vec::new(),
        }
    }

    /// Password supplied by the widget.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl SigninContext for LoginRequest {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn set_identifier(&mut self, identifier: String) {
        self.identifier = identifier;
    }

    fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    fn set_account(&mut self, account: Option<Account>) {
        self.account = account;
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn respond(&mut self, response: WidgetResponse) {
        self.responses.push(response);
    }

    fn responses(&self) -> &[WidgetResponse] {
        &self.responses
    }
}

// ============================================================================
// SECTION: Callback Requests
// ============================================================================

/// Wire parameters of a federated callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackParams {
    /// Full request URI the IDP redirected to, including query string.
    pub request_uri: String,
    /// Raw POST body, when the IDP posted the assertion.
    pub post_body: Option<String>,
    /// Declared purpose of the flow: `signin` or `upgrade`.
    pub purpose: Option<String>,
    /// Email the user typed into the widget before federation started.
    pub input_email: Option<String>,
}

/// Context for the callback flavors.
#[derive(Debug, Clone, Default)]
pub struct CallbackRequest {
    /// Identifier; set from the verified assertion email.
    identifier: String,
    /// Session id of the caller.
    session_id: String,
    /// Wire parameters of the callback.
    params: CallbackParams,
    /// Verdict recorded by assertion verification.
    verdict: Option<AssertionVerdict>,
    /// Purpose recorded while walking the tree.
    purpose: Option<String>,
    /// Account loaded while walking the tree.
    account: Option<Account>,
    /// Responses collected while walking the tree.
    responses: Vec<WidgetResponse>,
}

impl CallbackRequest {
    /// Creates a callback context.
    pub fn new(params: CallbackParams, session_id: impl Into<String>) -> Self {
        Self {
            identifier: String::new(),
            session_id: session_id.into(),
            params,
            verdict: None,
            purpose: None,
            account: None,
            responses: Vec::new(),
        }
    }

    /// Wire parameters of the callback.
    #[must_use]
    pub const fn params(&self) -> &CallbackParams {
        &self.params
    }

    /// Verdict recorded by assertion verification, if it ran.
    #[must_use]
    pub const fn verdict(&self) -> Option<&AssertionVerdict> {
        self.verdict.as_ref()
    }

    /// Records the verification verdict.
    pub fn set_verdict(&mut self, verdict: AssertionVerdict) {
        self.verdict = Some(verdict);
    }

    /// Purpose recorded while walking the tree.
    #[must_use]
    pub fn purpose(&self) -> Option<&str> {
        self.purpose.as_deref()
    }

    /// Records the declared purpose.
    pub fn set_purpose(&mut self, purpose: Option<String>) {
        self.purpose = purpose;
    }
}

impl SigninContext for CallbackRequest {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn set_identifier(&mut self, identifier: String) {
        self.identifier = identifier;
    }

    fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    fn set_account(&mut self, account: Option<Account>) {
        self.account = account;
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn respond(&mut self, response: WidgetResponse) {
        self.responses.push(response);
    }

    fn responses(&self) -> &[WidgetResponse] {
        &self.responses
    }
}
