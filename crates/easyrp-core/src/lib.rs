// easyrp-core/src/lib.rs
// ============================================================================
// Module: Relying-Party Core
// Description: Sign-in logic for a federated-login relying party.
// Purpose: Wire accounts, sessions, and IDP verification into the flavor
//          trees behind the account-chooser widget.
// Dependencies: easyrp-config, rp-logic, regex, serde, serde_json, thiserror,
//               tracing
// ============================================================================

//! ## Overview
//! This crate holds the relying-party side of federated sign-in: service
//! seams for accounts, sessions, and the identity provider; request contexts
//! and widget response shapes; the evaluator and action packs; and the four
//! flavor trees dispatched by [`RpHandler`]. The host application owns the
//! transport and implements the seams; everything in here is
//! transport-agnostic.

/// Account model and backend seam.
pub mod account;
/// Leaf-node action packs.
pub mod actions;
/// Admin-console rules export.
pub mod admin;
/// Decision-node evaluator packs.
pub mod evaluators;
/// Flavor trees and their wiring.
pub mod flavors;
/// Widget-call dispatch.
pub mod handler;
/// IDP verification seam, email helpers, and the domain whitelist.
pub mod idp;
/// Request contexts and widget responses.
pub mod request;
/// Widget wire-format builders.
pub mod response;
/// Session state seam.
pub mod session;

pub use account::Account;
pub use account::AccountError;
pub use account::AccountService;
pub use account::InMemoryAccountService;
pub use actions::LegacySigninActions;
pub use actions::PopupCallbackActions;
pub use actions::RedirectCallbackActions;
pub use actions::UserStatusActions;
pub use admin::flavor_rules;
pub use admin::widget_rules_json;
pub use evaluators::CallbackEvaluators;
pub use evaluators::CommonEvaluators;
pub use evaluators::LoginEvaluators;
pub use flavors::FlavorError;
pub use flavors::FlavorOptions;
pub use flavors::LogicFlavor;
pub use flavors::RpServices;
pub use flavors::callback_popup_tree;
pub use flavors::callback_redirect_tree;
pub use flavors::legacy_signin_tree;
pub use flavors::user_status_tree;
pub use handler::DispatchOutcome;
pub use handler::HandlerError;
pub use handler::RpHandler;
pub use handler::WidgetCall;
pub use idp::AssertionVerdict;
pub use idp::DomainChecker;
pub use idp::IdpClient;
pub use idp::IdpError;
pub use idp::IdpWhitelist;
pub use idp::NoHostedDomains;
pub use idp::StaticIdpClient;
pub use idp::domain_of;
pub use idp::is_valid_email;
pub use request::CallbackParams;
pub use request::CallbackRequest;
pub use request::LoginRequest;
pub use request::SigninContext;
pub use request::StatusRequest;
pub use request::WidgetResponse;
pub use response::SigninStatus;
pub use session::InMemorySessionManager;
pub use session::SessionError;
pub use session::SessionManager;
