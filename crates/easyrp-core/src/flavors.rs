// easyrp-core/src/flavors.rs
// ============================================================================
// Module: Logic Flavors
// Description: The wired decision trees for each sign-in entry point.
// Purpose: Assemble evaluator and action packs into the four flavor trees.
// Dependencies: crate::{actions, evaluators, request}, easyrp-config, rp-logic
// ============================================================================

//! ## Overview
//! A flavor is one fully wired tree: user status, legacy signin, or the
//! federated callback in popup or full-page-redirect mode. The two callback
//! flavors share their verification subtree; redirect mode prefixes it with a
//! logged-in check so a session that already signed in elsewhere goes
//! straight home.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use easyrp_config::RpConfig;
use rp_logic::ActionSet;
use rp_logic::BuildError;
use rp_logic::DEFAULT_BRANCH;
use rp_logic::EvaluatorSet;
use rp_logic::RegistryError;
use rp_logic::Tree;
use rp_logic::TreeBuilder;
use thiserror::Error;

use crate::account::AccountService;
use crate::actions::LegacySigninActions;
use crate::actions::PopupCallbackActions;
use crate::actions::RedirectCallbackActions;
use crate::actions::UserStatusActions;
use crate::evaluators::CallbackEvaluators;
use crate::evaluators::CommonEvaluators;
use crate::evaluators::LoginEvaluators;
use crate::idp::DomainChecker;
use crate::idp::IdpClient;
use crate::idp::IdpWhitelist;
use crate::request::CallbackRequest;
use crate::request::LoginRequest;
use crate::request::SigninContext;
use crate::request::StatusRequest;
use crate::session::SessionManager;

// ============================================================================
// SECTION: Flavor Identity
// ============================================================================

/// The sign-in entry points a widget call can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicFlavor {
    /// Email lookup before showing a password or federated prompt.
    UserStatus,
    /// Email-and-password sign-in.
    LegacySignin,
    /// Federated callback answered with a popup script page.
    CallbackPopup,
    /// Federated callback answered with redirects and forwards.
    CallbackRedirect,
}

impl LogicFlavor {
    /// Maps a widget target parameter to a flavor.
    ///
    /// Targets are matched case-insensitively; `redirect` picks between the
    /// two callback flavors.
    #[must_use]
    pub fn from_target(target: &str, redirect: bool) -> Option<Self> {
        match target.to_ascii_lowercase().as_str() {
            "userstatus" => Some(Self::UserStatus),
            "login" => Some(Self::LegacySignin),
            "callback" if redirect => Some(Self::CallbackRedirect),
            "callback" => Some(Self::CallbackPopup),
            _ => None,
        }
    }
}

/// Per-deployment switches affecting how the trees are wired.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlavorOptions {
    /// Consult the built-in domain whitelist instead of live discovery.
    pub use_local_idp_whitelist: bool,
    /// Echo display name and photo URL back to the widget.
    pub return_profile_info: bool,
}

// ============================================================================
// SECTION: Service Bundle
// ============================================================================

/// The collaborators every flavor is wired against.
#[derive(Clone)]
pub struct RpServices {
    /// Account backend.
    pub accounts: Arc<dyn AccountService>,
    /// Session backend.
    pub sessions: Arc<dyn SessionManager>,
    /// IDP verification and discovery client.
    pub idp: Arc<dyn IdpClient>,
    /// Hosted-domain checker.
    pub domains: Arc<dyn DomainChecker>,
    /// Site configuration.
    pub config: Arc<RpConfig>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while wiring a flavor tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlavorError {
    /// An operation name collided during registration.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The tree shape was rejected by the builder.
    #[error(transparent)]
    Build(#[from] BuildError),
}

// ============================================================================
// SECTION: Registry Assembly
// ============================================================================

/// Builds the shared evaluator pack for a service bundle.
fn common_evaluators(services: &RpServices, options: FlavorOptions) -> CommonEvaluators {
    let whitelist = options.use_local_idp_whitelist.then(IdpWhitelist::default);
    CommonEvaluators::new(
        Arc::clone(&services.accounts),
        Arc::clone(&services.domains),
        Arc::clone(&services.idp),
        whitelist,
    )
}

/// Registers the shared evaluators into a fresh set.
fn base_evaluators<C>(
    services: &RpServices,
    options: FlavorOptions,
) -> Result<EvaluatorSet<C>, FlavorError>
where
    C: SigninContext + 'static,
{
    let mut set = EvaluatorSet::new();
    common_evaluators(services, options).register(&mut set)?;
    Ok(set)
}

// ============================================================================
// SECTION: User-Status Tree
// ============================================================================

/// Builds the user-status flavor tree.
///
/// # Errors
/// Returns [`FlavorError`] when registration or tree assembly fails; with the
/// shapes below that indicates a programming error in this module.
pub fn user_status_tree(
    services: &RpServices,
    options: FlavorOptions,
) -> Result<Tree<StatusRequest>, FlavorError> {
    let evaluators = base_evaluators::<StatusRequest>(services, options)?;
    let mut actions = ActionSet::new();
    UserStatusActions::new(options.return_profile_info).register(&mut actions)?;

    let mut builder = TreeBuilder::new(evaluators, actions);
    builder.start("identifier", "check_identifier_type")?;
    builder.leaf("invalid_identifier", "identifier", DEFAULT_BRANCH, &["send_error"])?;
    builder.decision("email_registered", "identifier", "email", "check_email_registered")?;
    builder.decision("account_type", "email_registered", "registered", "check_account_type")?;
    builder.decision("domain_type", "email_registered", DEFAULT_BRANCH, "check_domain_type")?;
    builder.leaf("federated_account", "account_type", "federated", &["send_registered"])?;
    builder.leaf("legacy_account", "account_type", DEFAULT_BRANCH, &["send_registered_legacy"])?;
    builder.leaf("idp_domain", "domain_type", "idp", &["send_unregistered"])?;
    builder.leaf("non_idp_domain", "domain_type", DEFAULT_BRANCH, &["send_unregistered_legacy"])?;
    Ok(builder.build()?)
}

// ============================================================================
// SECTION: Legacy-Signin Tree
// ============================================================================

/// Builds the legacy-signin flavor tree.
///
/// # Errors
/// Returns [`FlavorError`] when registration or tree assembly fails.
pub fn legacy_signin_tree(
    services: &RpServices,
    options: FlavorOptions,
) -> Result<Tree<LoginRequest>, FlavorError> {
    let mut evaluators = base_evaluators::<LoginRequest>(services, options)?;
    LoginEvaluators::new(Arc::clone(&services.accounts)).register(&mut evaluators)?;
    let mut actions = ActionSet::new();
    LegacySigninActions::new(options.return_profile_info, Arc::clone(&services.sessions))
        .register(&mut actions)?;

    let mut builder = TreeBuilder::new(evaluators, actions);
    builder.start("identifier", "check_identifier_type")?;
    builder.leaf("invalid_identifier", "identifier", DEFAULT_BRANCH, &["send_email_not_exist"])?;
    builder.decision("email_registered", "identifier", "email", "check_email_registered")?;
    builder.leaf(
        "unregistered_email",
        "email_registered",
        DEFAULT_BRANCH,
        &["send_email_not_exist"],
    )?;
    builder.decision("account_type", "email_registered", "registered", "check_account_type")?;
    builder.leaf("federated_account", "account_type", "federated", &["send_federated"])?;
    builder.decision("password_filled", "account_type", DEFAULT_BRANCH, "check_password_filled")?;
    builder.leaf("empty_password", "password_filled", "empty", &["send_password_error"])?;
    builder.decision("password_correct", "password_filled", "filled", "check_password_correct")?;
    builder.leaf("signed_in", "password_correct", "correct", &["set_logged_in", "send_ok"])?;
    builder.leaf("wrong_password", "password_correct", DEFAULT_BRANCH, &["send_password_error"])?;
    Ok(builder.build()?)
}

// ============================================================================
// SECTION: Callback Trees
// ============================================================================

/// Builds the popup-mode callback tree.
///
/// # Errors
/// Returns [`FlavorError`] when registration or tree assembly fails.
pub fn callback_popup_tree(
    services: &RpServices,
    options: FlavorOptions,
) -> Result<Tree<CallbackRequest>, FlavorError> {
    let evaluators = callback_evaluators(services, options)?;
    let mut actions = ActionSet::new();
    PopupCallbackActions::new(
        options.return_profile_info,
        Arc::clone(&services.sessions),
        Arc::clone(&services.accounts),
    )
    .register(&mut actions)?;

    let mut builder = TreeBuilder::new(evaluators, actions);
    builder.start("assertion", "verify_assertion")?;
    append_verified_subtree(&mut builder)?;
    Ok(builder.build()?)
}

/// Builds the full-page-redirect callback tree.
///
/// A session that is already signed in skips verification and is sent home.
///
/// # Errors
/// Returns [`FlavorError`] when registration or tree assembly fails.
pub fn callback_redirect_tree(
    services: &RpServices,
    options: FlavorOptions,
) -> Result<Tree<CallbackRequest>, FlavorError> {
    let evaluators = callback_evaluators(services, options)?;
    let mut actions = ActionSet::new();
    RedirectCallbackActions::new(
        Arc::clone(&services.sessions),
        Arc::clone(&services.accounts),
        Arc::clone(&services.config),
    )
    .register(&mut actions)?;

    let mut builder = TreeBuilder::new(evaluators, actions);
    builder.start("logged_in", "check_logged_in")?;
    builder.leaf("already_signed_in", "logged_in", "logged-in", &["send_ok_registered"])?;
    builder.decision("assertion", "logged_in", DEFAULT_BRANCH, "verify_assertion")?;
    append_verified_subtree(&mut builder)?;
    Ok(builder.build()?)
}

/// Registers the full evaluator set used by both callback flavors.
fn callback_evaluators(
    services: &RpServices,
    options: FlavorOptions,
) -> Result<EvaluatorSet<CallbackRequest>, FlavorError> {
    let mut set = base_evaluators::<CallbackRequest>(services, options)?;
    CallbackEvaluators::new(
        Arc::clone(&services.accounts),
        Arc::clone(&services.sessions),
        Arc::clone(&services.idp),
    )
    .register(&mut set)?;
    Ok(set)
}

/// Appends the shared subtree under an `assertion` decision node.
///
/// Both callback modes route identically once the assertion verdict is in;
/// only the registered action pack differs.
fn append_verified_subtree(builder: &mut TreeBuilder<CallbackRequest>) -> Result<(), BuildError> {
    builder.decision("input_email", "assertion", "trusted", "check_rp_input_email")?;
    builder.leaf(
        "untrusted_assertion",
        "assertion",
        "untrusted",
        &["send_invalid_assertion_email"],
    )?;
    builder.leaf("invalid_assertion", "assertion", DEFAULT_BRANCH, &["send_invalid_assertion"])?;
    builder.decision("email_registered", "input_email", "match", "check_email_registered")?;
    builder.leaf("input_mismatch", "input_email", DEFAULT_BRANCH, &["send_account_mismatch"])?;
    builder.decision("account_type", "email_registered", "registered", "check_account_type")?;
    builder.decision("auto_create", "email_registered", DEFAULT_BRANCH, "try_create_account")?;
    builder.leaf(
        "federated_signin",
        "account_type",
        "federated",
        &["set_logged_in", "send_ok_registered"],
    )?;
    builder.decision("purpose", "account_type", DEFAULT_BRANCH, "check_rp_purpose")?;
    builder.decision("session_match", "purpose", "upgrade", "check_session_email_match")?;
    builder.leaf(
        "legacy_without_upgrade",
        "purpose",
        DEFAULT_BRANCH,
        &["save_idp_assertion", "send_invalid_assertion_email"],
    )?;
    builder.leaf(
        "upgraded_account",
        "session_match",
        "match",
        &["upgrade", "send_ok_registered"],
    )?;
    builder.leaf(
        "upgrade_mismatch",
        "session_match",
        DEFAULT_BRANCH,
        &["send_account_mismatch"],
    )?;
    builder.leaf(
        "created_account",
        "auto_create",
        "created",
        &["set_logged_in", "send_ok_registered"],
    )?;
    builder.leaf(
        "unregistered_visitor",
        "auto_create",
        DEFAULT_BRANCH,
        &["save_idp_assertion", "send_ok_unregistered"],
    )?;
    Ok(())
}
