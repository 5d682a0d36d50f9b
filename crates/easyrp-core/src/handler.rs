// easyrp-core/src/handler.rs
// ============================================================================
// Module: Request Handler
// Description: Entry point mapping widget calls onto flavor trees.
// Purpose: Dispatch by target, honor the redirect override and callback
//          switch, and hand back the walked request plus its report.
// Dependencies: crate::{flavors, request, session}, rp-logic, thiserror,
//               tracing
// ============================================================================

//! ## Overview
//! The host application parses its transport (query parameters, POST bodies,
//! cookies) and calls the handler with plain values. The handler clears any
//! assertion stashed by an earlier federated attempt, picks the flavor for
//! the target, walks the tree, and returns the request so the host can
//! deliver the collected [`WidgetResponse`]s.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rp_logic::ExecuteError;
use rp_logic::WalkReport;
use thiserror::Error;

use crate::flavors::FlavorError;
use crate::flavors::FlavorOptions;
use crate::flavors::LogicFlavor;
use crate::flavors::RpServices;
use crate::flavors::callback_popup_tree;
use crate::flavors::callback_redirect_tree;
use crate::flavors::legacy_signin_tree;
use crate::flavors::user_status_tree;
use crate::request::CallbackParams;
use crate::request::CallbackRequest;
use crate::request::LoginRequest;
use crate::request::SigninContext;
use crate::request::StatusRequest;
use crate::request::WidgetResponse;
use crate::session::SessionError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Handler failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The flavor tree could not be wired.
    #[error(transparent)]
    Flavor(#[from] FlavorError),

    /// The walk aborted on an unhandled branch key.
    #[error(transparent)]
    Execute(#[from] ExecuteError),

    /// The session backend failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The widget named a target this handler does not serve.
    #[error("unknown target: {target}")]
    UnknownTarget {
        /// Target parameter as received.
        target: String,
    },

    /// A callback arrived while callbacks are disabled.
    #[error("federated callbacks are disabled")]
    CallbackDisabled,
}

// ============================================================================
// SECTION: Widget Calls
// ============================================================================

/// One parsed widget call, transport-agnostic.
#[derive(Debug, Clone, Default)]
pub struct WidgetCall {
    /// Target parameter naming the entry point.
    pub target: String,
    /// Email typed into the widget, when present.
    pub identifier: String,
    /// Password typed into the widget, when present.
    pub password: String,
    /// Callback parameters, meaningful for the callback target.
    pub callback: CallbackParams,
    /// Per-call override of the handler's redirect mode.
    pub full_page_redirect: Option<bool>,
}

/// What a dispatched call produced.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Flavor that served the call.
    pub flavor: LogicFlavor,
    /// Responses to deliver, in emission order.
    pub responses: Vec<WidgetResponse>,
    /// The walk that produced them.
    pub report: WalkReport,
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Sign-in request handler for one deployment.
pub struct RpHandler {
    /// Collaborators the flavors run against.
    services: RpServices,
    /// Deployment switches.
    options: FlavorOptions,
    /// Answer callbacks with redirects instead of a popup page.
    redirect_mode: bool,
    /// Refuse federated callbacks outright.
    disable_callback: bool,
}

impl RpHandler {
    /// Creates a handler in popup mode with callbacks enabled.
    #[must_use]
    pub const fn new(services: RpServices, options: FlavorOptions) -> Self {
        Self {
            services,
            options,
            redirect_mode: false,
            disable_callback: false,
        }
    }

    /// Switches callbacks to full-page-redirect mode.
    #[must_use]
    pub const fn with_redirect_mode(mut self, redirect_mode: bool) -> Self {
        self.redirect_mode = redirect_mode;
        self
    }

    /// Disables the callback target entirely.
    #[must_use]
    pub const fn with_callback_disabled(mut self, disable_callback: bool) -> Self {
        self.disable_callback = disable_callback;
        self
    }

    /// Dispatches a parsed widget call.
    ///
    /// Any assertion stashed by an earlier federated attempt is cleared
    /// before the walk so stale state never leaks into a new flow.
    ///
    /// # Errors
    /// Returns [`HandlerError`] for unknown targets, disabled callbacks, or
    /// a failed walk.
    pub fn dispatch(&self, call: &WidgetCall, session_id: &str) -> Result<DispatchOutcome, HandlerError> {
        self.services.sessions.set_idp_assertion(session_id, None)?;

        let redirect = call.full_page_redirect.unwrap_or(self.redirect_mode);
        let flavor = LogicFlavor::from_target(&call.target, redirect).ok_or_else(|| {
            HandlerError::UnknownTarget {
                target: call.target.clone(),
            }
        })?;
        tracing::info!(?flavor, "dispatching widget call");

        match flavor {
            LogicFlavor::UserStatus => {
                let (request, report) = self.handle_user_status(&call.identifier, session_id)?;
                Ok(outcome(flavor, &request, report))
            }
            LogicFlavor::LegacySignin => {
                let (request, report) =
                    self.handle_login(&call.identifier, &call.password, session_id)?;
                Ok(outcome(flavor, &request, report))
            }
            LogicFlavor::CallbackPopup | LogicFlavor::CallbackRedirect => {
                let (request, report) =
                    self.handle_callback(call.callback.clone(), session_id, redirect)?;
                Ok(outcome(flavor, &request, report))
            }
        }
    }

    /// Runs the user-status flavor for an email.
    ///
    /// # Errors
    /// Returns [`HandlerError`] when the tree cannot be wired or walked.
    pub fn handle_user_status(
        &self,
        identifier: &str,
        session_id: &str,
    ) -> Result<(StatusRequest, WalkReport), HandlerError> {
        let tree = user_status_tree(&self.services, self.options)?;
        let mut request = StatusRequest::new(identifier, session_id);
        let report = tree.execute(&mut request)?;
        Ok((request, report))
    }

    /// Runs the legacy-signin flavor for an email and password.
    ///
    /// # Errors
    /// Returns [`HandlerError`] when the tree cannot be wired or walked.
    pub fn handle_login(
        &self,
        identifier: &str,
        password: &str,
        session_id: &str,
    ) -> Result<(LoginRequest, WalkReport), HandlerError> {
        let tree = legacy_signin_tree(&self.services, self.options)?;
        let mut request = LoginRequest::new(identifier, password, session_id);
        let report = tree.execute(&mut request)?;
        Ok((request, report))
    }

    /// Runs a callback flavor for an IDP response.
    ///
    /// # Errors
    /// Returns [`HandlerError::CallbackDisabled`] when callbacks are off,
    /// and otherwise when the tree cannot be wired or walked.
    pub fn handle_callback(
        &self,
        params: CallbackParams,
        session_id: &str,
        redirect: bool,
    ) -> Result<(CallbackRequest, WalkReport), HandlerError> {
        if self.disable_callback {
            return Err(HandlerError::CallbackDisabled);
        }
        let tree = if redirect {
            callback_redirect_tree(&self.services, self.options)?
        } else {
            callback_popup_tree(&self.services, self.options)?
        };
        let mut request = CallbackRequest::new(params, session_id);
        let report = tree.execute(&mut request)?;
        Ok((request, report))
    }
}

/// Packages a walked request into a dispatch outcome.
fn outcome<C>(flavor: LogicFlavor, request: &C, report: WalkReport) -> DispatchOutcome
where
    C: SigninContext,
{
    DispatchOutcome {
        flavor,
        responses: request.responses().to_vec(),
        report,
    }
}
