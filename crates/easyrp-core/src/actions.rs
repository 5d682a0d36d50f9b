// easyrp-core/src/actions.rs
// ============================================================================
// Module: Sign-In Actions
// Description: Leaf-node operations emitting widget responses and side
//              effects.
// Purpose: One action pack per flavor, holding its collaborators explicitly.
// Dependencies: crate::{account, idp, request, response, session},
//               easyrp-config, rp-logic, serde_json, tracing
// ============================================================================

//! ## Overview
//! Actions run at the leaf a walk lands on. Most of them only append a
//! [`WidgetResponse`] to the request; the session-touching ones
//! (`set_logged_in`, `save_idp_assertion`, `upgrade`) mutate backend state
//! and report failures as operation errors so the remaining leaf actions
//! still run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use easyrp_config::RpConfig;
use rp_logic::ActionSet;
use rp_logic::OpError;
use rp_logic::RegistryError;

use crate::account::AccountService;
use crate::idp::AssertionVerdict;
use crate::request::CallbackRequest;
use crate::request::LoginRequest;
use crate::request::SigninContext;
use crate::request::StatusRequest;
use crate::request::WidgetResponse;
use crate::response::ERROR_INVALID_ASSERTION;
use crate::response::ERROR_INVALID_ASSERTION_EMAIL;
use crate::response::SigninStatus;
use crate::response::legacy_signin;
use crate::response::notification_account_mismatch;
use crate::response::notification_error;
use crate::response::popup_account_mismatch;
use crate::response::popup_error;
use crate::response::popup_success;
use crate::response::user_status;
use crate::response::user_status_error;
use crate::session::SessionManager;

// ============================================================================
// SECTION: User-Status Actions
// ============================================================================

/// Actions for the user-status flavor.
pub struct UserStatusActions {
    /// Whether profile fields are echoed back to the widget.
    return_profile_info: bool,
}

impl UserStatusActions {
    /// Creates the user-status action pack.
    #[must_use]
    pub const fn new(return_profile_info: bool) -> Self {
        Self {
            return_profile_info,
        }
    }

    /// Registers the user-status actions.
    ///
    /// # Errors
    /// Returns [`RegistryError`] on a name collision.
    pub fn register(&self, set: &mut ActionSet<StatusRequest>) -> Result<(), RegistryError> {
        set.register_fn("send_error", |ctx: &mut StatusRequest| {
            ctx.respond(WidgetResponse::Json(user_status_error()));
            Ok(())
        })?;

        let profile = self.return_profile_info;
        set.register_fn("send_registered", move |ctx: &mut StatusRequest| {
            let account = profile.then(|| ctx.account().cloned()).flatten();
            ctx.respond(WidgetResponse::Json(user_status(true, false, account.as_ref())));
            Ok(())
        })?;

        let profile = self.return_profile_info;
        set.register_fn("send_registered_legacy", move |ctx: &mut StatusRequest| {
            let account = profile.then(|| ctx.account().cloned()).flatten();
            ctx.respond(WidgetResponse::Json(user_status(true, true, account.as_ref())));
            Ok(())
        })?;

        set.register_fn("send_unregistered", |ctx: &mut StatusRequest| {
            ctx.respond(WidgetResponse::Json(user_status(false, false, None)));
            Ok(())
        })?;

        set.register_fn("send_unregistered_legacy", |ctx: &mut StatusRequest| {
            ctx.respond(WidgetResponse::Json(user_status(false, true, None)));
            Ok(())
        })?;

        Ok(())
    }
}

// ============================================================================
// SECTION: Legacy-Signin Actions
// ============================================================================

/// Actions for the legacy-signin flavor.
pub struct LegacySigninActions {
    /// Whether profile fields are echoed back to the widget.
    return_profile_info: bool,
    /// Session backend receiving the signed-in account.
    sessions: Arc<dyn SessionManager>,
}

impl LegacySigninActions {
    /// Creates the legacy-signin action pack.
    pub const fn new(return_profile_info: bool, sessions: Arc<dyn SessionManager>) -> Self {
        Self {
            return_profile_info,
            sessions,
        }
    }

    /// Registers the legacy-signin actions.
    ///
    /// # Errors
    /// Returns [`RegistryError`] on a name collision.
    pub fn register(&self, set: &mut ActionSet<LoginRequest>) -> Result<(), RegistryError> {
        let profile = self.return_profile_info;
        set.register_fn("send_ok", move |ctx: &mut LoginRequest| {
            let account = profile.then(|| ctx.account().cloned()).flatten();
            ctx.respond(WidgetResponse::Json(legacy_signin(SigninStatus::Ok, account.as_ref())));
            Ok(())
        })?;

        set.register_fn("send_password_error", |ctx: &mut LoginRequest| {
            ctx.respond(WidgetResponse::Json(legacy_signin(SigninStatus::PasswordError, None)));
            Ok(())
        })?;

        set.register_fn("send_federated", |ctx: &mut LoginRequest| {
            ctx.respond(WidgetResponse::Json(legacy_signin(SigninStatus::Federated, None)));
            Ok(())
        })?;

        set.register_fn("send_email_not_exist", |ctx: &mut LoginRequest| {
            ctx.respond(WidgetResponse::Json(legacy_signin(SigninStatus::EmailNotExist, None)));
            Ok(())
        })?;

        register_set_logged_in(set, Arc::clone(&self.sessions))?;

        Ok(())
    }
}

// ============================================================================
// SECTION: Popup Callback Actions
// ============================================================================

/// Actions for the callback flavor in popup mode.
pub struct PopupCallbackActions {
    /// Whether profile fields are echoed back to the widget.
    return_profile_info: bool,
    /// Session backend for sign-in and assertion stashing.
    sessions: Arc<dyn SessionManager>,
    /// Account backend for the upgrade action.
    accounts: Arc<dyn AccountService>,
}

impl PopupCallbackActions {
    /// Creates the popup callback action pack.
    pub const fn new(
        return_profile_info: bool,
        sessions: Arc<dyn SessionManager>,
        accounts: Arc<dyn AccountService>,
    ) -> Self {
        Self {
            return_profile_info,
            sessions,
            accounts,
        }
    }

    /// Registers the popup callback actions.
    ///
    /// # Errors
    /// Returns [`RegistryError`] on a name collision.
    pub fn register(&self, set: &mut ActionSet<CallbackRequest>) -> Result<(), RegistryError> {
        let profile = self.return_profile_info;
        set.register_fn("send_ok_registered", move |ctx: &mut CallbackRequest| {
            let page = success_page(ctx, true, profile);
            ctx.respond(WidgetResponse::Html(page));
            Ok(())
        })?;

        let profile = self.return_profile_info;
        set.register_fn("send_ok_unregistered", move |ctx: &mut CallbackRequest| {
            let page = success_page(ctx, false, profile);
            ctx.respond(WidgetResponse::Html(page));
            Ok(())
        })?;

        set.register_fn("send_invalid_assertion", |ctx: &mut CallbackRequest| {
            ctx.respond(WidgetResponse::Html(popup_error(Some(ERROR_INVALID_ASSERTION))));
            Ok(())
        })?;

        set.register_fn("send_invalid_assertion_email", |ctx: &mut CallbackRequest| {
            ctx.respond(WidgetResponse::Html(popup_error(Some(ERROR_INVALID_ASSERTION_EMAIL))));
            Ok(())
        })?;

        set.register_fn("send_account_mismatch", |ctx: &mut CallbackRequest| {
            let (validated, input, purpose) = mismatch_fields(ctx);
            let page = popup_account_mismatch(&validated, &input, purpose.as_deref());
            ctx.respond(WidgetResponse::Html(page));
            Ok(())
        })?;

        register_set_logged_in(set, Arc::clone(&self.sessions))?;
        register_save_idp_assertion(set, Arc::clone(&self.sessions))?;
        register_upgrade(set, Arc::clone(&self.accounts), Arc::clone(&self.sessions))?;

        Ok(())
    }
}

// ============================================================================
// SECTION: Redirect Callback Actions
// ============================================================================

/// Actions for the callback flavor in full-page-redirect mode.
pub struct RedirectCallbackActions {
    /// Session backend for sign-in and assertion stashing.
    sessions: Arc<dyn SessionManager>,
    /// Account backend for the upgrade action.
    accounts: Arc<dyn AccountService>,
    /// Site configuration supplying the redirect and forward targets.
    config: Arc<RpConfig>,
}

impl RedirectCallbackActions {
    /// Creates the redirect callback action pack.
    pub const fn new(
        sessions: Arc<dyn SessionManager>,
        accounts: Arc<dyn AccountService>,
        config: Arc<RpConfig>,
    ) -> Self {
        Self {
            sessions,
            accounts,
            config,
        }
    }

    /// Registers the redirect callback actions.
    ///
    /// # Errors
    /// Returns [`RegistryError`] on a name collision.
    pub fn register(&self, set: &mut ActionSet<CallbackRequest>) -> Result<(), RegistryError> {
        let config = Arc::clone(&self.config);
        set.register_fn("send_ok_registered", move |ctx: &mut CallbackRequest| {
            ctx.respond(WidgetResponse::Redirect(config.home_url.clone()));
            Ok(())
        })?;

        let config = Arc::clone(&self.config);
        set.register_fn("send_ok_unregistered", move |ctx: &mut CallbackRequest| {
            ctx.respond(WidgetResponse::Redirect(config.signup_url.clone()));
            Ok(())
        })?;

        let config = Arc::clone(&self.config);
        set.register_fn("send_invalid_assertion", move |ctx: &mut CallbackRequest| {
            let notification = notification_error(Some(ERROR_INVALID_ASSERTION));
            ctx.respond(forward(&config, notification));
            Ok(())
        })?;

        let config = Arc::clone(&self.config);
        set.register_fn("send_invalid_assertion_email", move |ctx: &mut CallbackRequest| {
            let notification = notification_error(Some(ERROR_INVALID_ASSERTION_EMAIL));
            ctx.respond(forward(&config, notification));
            Ok(())
        })?;

        let config = Arc::clone(&self.config);
        set.register_fn("send_account_mismatch", move |ctx: &mut CallbackRequest| {
            let (validated, input, purpose) = mismatch_fields(ctx);
            let notification = notification_account_mismatch(&validated, &input, purpose.as_deref());
            ctx.respond(forward(&config, notification));
            Ok(())
        })?;

        register_set_logged_in(set, Arc::clone(&self.sessions))?;
        register_save_idp_assertion(set, Arc::clone(&self.sessions))?;
        register_upgrade(set, Arc::clone(&self.accounts), Arc::clone(&self.sessions))?;

        Ok(())
    }
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Builds the popup success page from the loaded account or the verdict.
fn success_page(ctx: &CallbackRequest, registered: bool, return_profile_info: bool) -> String {
    let (display_name, photo_url) = if return_profile_info {
        match (ctx.account(), ctx.verdict()) {
            (Some(account), _) => (account.display_name.clone(), account.photo_url.clone()),
            (
                None,
                Some(AssertionVerdict::Trusted {
                    display_name,
                    photo_url,
                    ..
                }),
            ) => (display_name.clone(), photo_url.clone()),
            _ => (None, None),
        }
    } else {
        (None, None)
    };
    popup_success(registered, ctx.identifier(), display_name.as_deref(), photo_url.as_deref())
}

/// Pulls the validated email, typed email, and purpose for a mismatch report.
fn mismatch_fields(ctx: &CallbackRequest) -> (String, String, Option<String>) {
    let validated = ctx.identifier().to_owned();
    let input = ctx.params().input_email.clone().unwrap_or_else(|| validated.clone());
    let purpose = ctx.purpose().map(str::to_owned).or_else(|| ctx.params().purpose.clone());
    (validated, input, purpose)
}

/// Builds a forward to the login page with a notification attached.
fn forward(config: &RpConfig, notification: serde_json::Value) -> WidgetResponse {
    WidgetResponse::Forward {
        page: config.login_url.clone(),
        notification_key: config.notification_key.clone(),
        notification,
    }
}

/// Registers `set_logged_in` for any context carrying a loaded account.
fn register_set_logged_in<C>(
    set: &mut ActionSet<C>,
    sessions: Arc<dyn SessionManager>,
) -> Result<(), RegistryError>
where
    C: SigninContext + 'static,
{
    set.register_fn("set_logged_in", move |ctx: &mut C| {
        let account =
            ctx.account().cloned().ok_or_else(|| OpError::failed("no account to sign in"))?;
        sessions
            .set_session_account(ctx.session_id(), Some(&account))
            .map_err(|err| OpError::unavailable(err.to_string()))?;
        tracing::info!(email = %account.email, "session signed in");
        Ok(())
    })
}

/// Registers `save_idp_assertion`, stashing the verdict for a follow-up page.
fn register_save_idp_assertion(
    set: &mut ActionSet<CallbackRequest>,
    sessions: Arc<dyn SessionManager>,
) -> Result<(), RegistryError> {
    set.register_fn("save_idp_assertion", move |ctx: &mut CallbackRequest| {
        let verdict =
            ctx.verdict().ok_or_else(|| OpError::failed("no verified assertion to stash"))?;
        let assertion = serde_json::to_value(verdict)
            .map_err(|err| OpError::failed(format!("assertion not serializable: {err}")))?;
        sessions
            .set_idp_assertion(ctx.session_id(), Some(&assertion))
            .map_err(|err| OpError::unavailable(err.to_string()))?;
        Ok(())
    })
}

/// Registers `upgrade`, converting a password account to federated and
/// refreshing the session.
fn register_upgrade(
    set: &mut ActionSet<CallbackRequest>,
    accounts: Arc<dyn AccountService>,
    sessions: Arc<dyn SessionManager>,
) -> Result<(), RegistryError> {
    set.register_fn("upgrade", move |ctx: &mut CallbackRequest| {
        let upgraded = accounts
            .to_federated(ctx.identifier())
            .map_err(|err| OpError::failed(err.to_string()))?;
        sessions
            .set_session_account(ctx.session_id(), Some(&upgraded))
            .map_err(|err| OpError::unavailable(err.to_string()))?;
        tracing::info!(email = %upgraded.email, "account upgraded to federated");
        ctx.set_account(Some(upgraded));
        Ok(())
    })
}
