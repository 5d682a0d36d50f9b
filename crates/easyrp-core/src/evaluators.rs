// easyrp-core/src/evaluators.rs
// ============================================================================
// Module: Sign-In Evaluators
// Description: Decision-node operations for the sign-in flavor trees.
// Purpose: Turn request state into branch keys, with collaborators held
//          explicitly by each evaluator set.
// Dependencies: crate::{account, idp, request, session}, rp-logic, tracing
// ============================================================================

//! ## Overview
//! Evaluators answer one routing question each and log their answer. They
//! hold their collaborators directly: the registries built here are the only
//! wiring between the trees and the service seams. Evaluator failures are
//! absorbed by the engine and route to the default branch, so preconditions
//! (like "an account must already be loaded") surface as operation errors
//! rather than panics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use rp_logic::EvaluatorSet;
use rp_logic::OpError;
use rp_logic::RegistryError;

use crate::account::AccountService;
use crate::idp::AssertionVerdict;
use crate::idp::DomainChecker;
use crate::idp::IdpClient;
use crate::idp::IdpWhitelist;
use crate::idp::domain_of;
use crate::idp::is_valid_email;
use crate::request::CallbackRequest;
use crate::request::LoginRequest;
use crate::request::SigninContext;
use crate::session::SessionManager;

// ============================================================================
// SECTION: Common Evaluators
// ============================================================================

/// Evaluators shared by every flavor.
pub struct CommonEvaluators {
    /// Account backend.
    accounts: Arc<dyn AccountService>,
    /// Hosted-domain checker consulted after the whitelist.
    domains: Arc<dyn DomainChecker>,
    /// IDP client used for discovery when no whitelist is configured.
    idp: Arc<dyn IdpClient>,
    /// Local whitelist; present when the deployment opted in.
    whitelist: Option<IdpWhitelist>,
}

impl CommonEvaluators {
    /// Creates the shared evaluator pack.
    pub const fn new(
        accounts: Arc<dyn AccountService>,
        domains: Arc<dyn DomainChecker>,
        idp: Arc<dyn IdpClient>,
        whitelist: Option<IdpWhitelist>,
    ) -> Self {
        Self {
            accounts,
            domains,
            idp,
            whitelist,
        }
    }

    /// Registers the shared evaluators for a context type.
    ///
    /// # Errors
    /// Returns [`RegistryError`] on a name collision.
    pub fn register<C>(&self, set: &mut EvaluatorSet<C>) -> Result<(), RegistryError>
    where
        C: SigninContext + 'static,
    {
        set.register_fn("check_identifier_type", |ctx: &mut C| {
            let key = if is_valid_email(ctx.identifier()) { "email" } else { "invalid" };
            tracing::info!(result = key, "check_identifier_type");
            Ok(key.to_owned())
        })?;

        let accounts = Arc::clone(&self.accounts);
        set.register_fn("check_email_registered", move |ctx: &mut C| {
            if ctx.identifier().is_empty() {
                return Err(OpError::failed("no identifier to look up"));
            }
            let account = accounts
                .lookup(ctx.identifier())
                .map_err(|err| OpError::failed(err.to_string()))?;
            let key = if account.is_some() { "registered" } else { "unregistered" };
            ctx.set_account(account);
            tracing::info!(result = key, "check_email_registered");
            Ok(key.to_owned())
        })?;

        set.register_fn("check_account_type", |ctx: &mut C| {
            let account =
                ctx.account().ok_or_else(|| OpError::failed("no account loaded for type check"))?;
            let key = if account.federated { "federated" } else { "legacy" };
            tracing::info!(result = key, "check_account_type");
            Ok(key.to_owned())
        })?;

        let whitelist = self.whitelist.clone();
        let domains = Arc::clone(&self.domains);
        let idp = Arc::clone(&self.idp);
        set.register_fn("check_domain_type", move |ctx: &mut C| {
            let domain = domain_of(ctx.identifier())
                .ok_or_else(|| OpError::failed("identifier has no usable domain"))?;
            let federated = match &whitelist {
                Some(whitelist) => {
                    whitelist.supports(&domain) || domains.is_hosted_domain(&domain)
                }
                None => idp
                    .discover(&domain)
                    .map_err(|err| OpError::unavailable(err.to_string()))?,
            };
            let key = if federated { "idp" } else { "non-idp" };
            tracing::info!(result = key, "check_domain_type");
            Ok(key.to_owned())
        })?;

        Ok(())
    }
}

// ============================================================================
// SECTION: Login Evaluators
// ============================================================================

/// Evaluators specific to the legacy-signin flavor.
pub struct LoginEvaluators {
    /// Account backend holding the password credentials.
    accounts: Arc<dyn AccountService>,
}

impl LoginEvaluators {
    /// Creates the login evaluator pack.
    pub const fn new(accounts: Arc<dyn AccountService>) -> Self {
        Self {
            accounts,
        }
    }

    /// Registers the login evaluators.
    ///
    /// # Errors
    /// Returns [`RegistryError`] on a name collision.
    pub fn register(&self, set: &mut EvaluatorSet<LoginRequest>) -> Result<(), RegistryError> {
        set.register_fn("check_password_filled", |ctx: &mut LoginRequest| {
            let key = if ctx.password().is_empty() { "empty" } else { "filled" };
            tracing::info!(result = key, "check_password_filled");
            Ok(key.to_owned())
        })?;

        let accounts = Arc::clone(&self.accounts);
        set.register_fn("check_password_correct", move |ctx: &mut LoginRequest| {
            let correct = accounts
                .check_password(ctx.identifier(), ctx.password())
                .map_err(|err| OpError::failed(err.to_string()))?;
            let key = if correct { "correct" } else { "incorrect" };
            tracing::info!(result = key, "check_password_correct");
            Ok(key.to_owned())
        })?;

        Ok(())
    }
}

// ============================================================================
// SECTION: Callback Evaluators
// ============================================================================

/// Evaluators specific to the callback flavors.
pub struct CallbackEvaluators {
    /// Account backend for auto-creation.
    accounts: Arc<dyn AccountService>,
    /// Session backend for logged-in checks.
    sessions: Arc<dyn SessionManager>,
    /// IDP client verifying assertions.
    idp: Arc<dyn IdpClient>,
}

impl CallbackEvaluators {
    /// Creates the callback evaluator pack.
    pub const fn new(
        accounts: Arc<dyn AccountService>,
        sessions: Arc<dyn SessionManager>,
        idp: Arc<dyn IdpClient>,
    ) -> Self {
        Self {
            accounts,
            sessions,
            idp,
        }
    }

    /// Registers the callback evaluators.
    ///
    /// # Errors
    /// Returns [`RegistryError`] on a name collision.
    pub fn register(&self, set: &mut EvaluatorSet<CallbackRequest>) -> Result<(), RegistryError> {
        let idp = Arc::clone(&self.idp);
        set.register_fn("verify_assertion", move |ctx: &mut CallbackRequest| {
            let params = ctx.params().clone();
            let verdict = match idp.verify_assertion(&params.request_uri, params.post_body.as_deref())
            {
                Ok(verdict) => verdict,
                Err(err) => {
                    tracing::warn!(error = %err, "verify_assertion could not reach the idp");
                    AssertionVerdict::Invalid
                }
            };
            if let Some(email) = verdict.email() {
                ctx.set_identifier(email.to_owned());
            }
            let key = match &verdict {
                AssertionVerdict::Trusted {
                    ..
                } => "trusted",
                AssertionVerdict::Untrusted {
                    ..
                } => "untrusted",
                AssertionVerdict::Invalid => "error",
            };
            ctx.set_verdict(verdict);
            tracing::info!(result = key, "verify_assertion");
            Ok(key.to_owned())
        })?;

        set.register_fn("check_rp_input_email", |ctx: &mut CallbackRequest| {
            let input = ctx.params().input_email.clone().unwrap_or_default();
            let key = if !input.is_empty() && !input.eq_ignore_ascii_case(ctx.identifier()) {
                "mismatch"
            } else {
                "match"
            };
            tracing::info!(result = key, "check_rp_input_email");
            Ok(key.to_owned())
        })?;

        set.register_fn("check_rp_purpose", |ctx: &mut CallbackRequest| {
            let purpose = ctx.params().purpose.clone();
            let key = purpose.clone().unwrap_or_default();
            ctx.set_purpose(purpose);
            tracing::info!(result = %key, "check_rp_purpose");
            Ok(key)
        })?;

        let accounts = Arc::clone(&self.accounts);
        set.register_fn("try_create_account", move |ctx: &mut CallbackRequest| {
            if ctx.account().is_some() {
                return Err(OpError::failed("account already exists; nothing to create"));
            }
            let (display_name, photo_url) = match ctx.verdict() {
                Some(AssertionVerdict::Trusted {
                    display_name,
                    photo_url,
                    ..
                }) => (display_name.clone(), photo_url.clone()),
                _ => (None, None),
            };
            let key = match accounts.create_federated(
                ctx.identifier(),
                display_name.as_deref(),
                photo_url.as_deref(),
            ) {
                Ok(account) => {
                    ctx.set_account(Some(account));
                    "created"
                }
                Err(err) => {
                    tracing::info!(error = %err, "federated auto-create refused");
                    "not-created"
                }
            };
            tracing::info!(result = key, "try_create_account");
            Ok(key.to_owned())
        })?;

        let sessions = Arc::clone(&self.sessions);
        set.register_fn("check_logged_in", move |ctx: &mut CallbackRequest| {
            let account = sessions
                .session_account(ctx.session_id())
                .map_err(|err| OpError::unavailable(err.to_string()))?;
            let key = if account.is_some() { "logged-in" } else { "not-logged-in" };
            tracing::info!(result = key, "check_logged_in");
            Ok(key.to_owned())
        })?;

        let sessions = Arc::clone(&self.sessions);
        set.register_fn("check_session_email_match", move |ctx: &mut CallbackRequest| {
            let account = sessions
                .session_account(ctx.session_id())
                .map_err(|err| OpError::unavailable(err.to_string()))?;
            let key = match account {
                Some(account) if account.email.eq_ignore_ascii_case(ctx.identifier()) => "match",
                _ => "mismatch",
            };
            tracing::info!(result = key, "check_session_email_match");
            Ok(key.to_owned())
        })?;

        Ok(())
    }
}
