// easyrp-core/tests/callback.rs
// ============================================================================
// Module: Callback Tests
// Description: Tests for the federated callback trees in both modes.
// Purpose: Ensure assertion verdicts route to the right page, redirect, or
//          forward, with the right session side effects.
// ============================================================================
//! ## Overview
//! Integration tests for the callback flavors: trusted, untrusted, and
//! invalid assertions; account auto-creation; the upgrade flow; and the
//! redirect-mode short circuit for sessions that are already signed in.

#[path = "support/fixtures.rs"]
mod fixtures;
mod support;

use std::sync::Arc;

use easyrp_core::Account;
use easyrp_core::AssertionVerdict;
use easyrp_core::CallbackParams;
use easyrp_core::CallbackRequest;
use easyrp_core::FlavorOptions;
use easyrp_core::InMemoryAccountService;
use easyrp_core::RpServices;
use easyrp_core::SigninContext;
use easyrp_core::WidgetResponse;
use easyrp_core::callback_popup_tree;
use easyrp_core::callback_redirect_tree;
use serde_json::json;
use support::TestResult;
use support::ensure;

/// Options used by most callback tests.
const fn options() -> FlavorOptions {
    FlavorOptions {
        use_local_idp_whitelist: true,
        return_profile_info: true,
    }
}

/// Bare callback parameters with an optional purpose.
fn params(purpose: Option<&str>) -> CallbackParams {
    CallbackParams {
        request_uri: "/callback?mode=id_res".to_owned(),
        post_body: None,
        purpose: purpose.map(str::to_owned),
        input_email: None,
    }
}

/// Walks the popup tree and returns the request, leaf, and services.
fn walk_popup(
    verdict: AssertionVerdict,
    params: CallbackParams,
) -> TestResult<(CallbackRequest, String, RpServices)> {
    let services = fixtures::services(verdict)?;
    walk_popup_with(services, params)
}

/// Walks the popup tree against a prepared service bundle.
fn walk_popup_with(
    services: RpServices,
    params: CallbackParams,
) -> TestResult<(CallbackRequest, String, RpServices)> {
    let tree = callback_popup_tree(&services, options())?;
    let mut request = CallbackRequest::new(params, fixtures::SESSION);
    let report = tree.execute(&mut request)?;
    Ok((request, report.leaf, services))
}

/// The single HTML page a walk emitted.
fn html_page(request: &CallbackRequest) -> TestResult<&str> {
    match request.responses() {
        [WidgetResponse::Html(page)] => Ok(page),
        other => Err(format!("expected one HTML response, got {other:?}").into()),
    }
}

// ============================================================================
// SECTION: Popup Mode, Trusted Assertions
// ============================================================================

#[test]
fn test_trusted_unknown_email_creates_and_signs_in() -> TestResult {
    let (request, leaf, services) =
        walk_popup(fixtures::trusted(fixtures::UNKNOWN_EMAIL), params(None))?;
    ensure(leaf == "created_account", "Expected the auto-create leaf")?;
    let page = html_page(&request)?;
    ensure(page.contains("notifyFederatedSuccess"), "Expected the success notifier")?;
    ensure(page.contains("\"registered\":true"), "Expected a registered success payload")?;
    ensure(page.contains("\"displayName\":\"Pat\""), "Expected the asserted display name")?;
    let created = services.accounts.lookup(fixtures::UNKNOWN_EMAIL)?;
    ensure(
        created.is_some_and(|account| account.federated),
        "Expected a federated account to be created",
    )?;
    let session = services.sessions.session_account(fixtures::SESSION)?;
    ensure(session.is_some(), "Expected the new account to be signed in")?;
    Ok(())
}

#[test]
fn test_trusted_federated_email_signs_in() -> TestResult {
    let (request, leaf, services) =
        walk_popup(fixtures::trusted(fixtures::FEDERATED_EMAIL), params(None))?;
    ensure(leaf == "federated_signin", "Expected the federated sign-in leaf")?;
    ensure(html_page(&request)?.contains("notifyFederatedSuccess"), "Expected a success page")?;
    let session = services.sessions.session_account(fixtures::SESSION)?;
    ensure(
        session.is_some_and(|account| account.email == fixtures::FEDERATED_EMAIL),
        "Expected the federated account in the session",
    )?;
    Ok(())
}

#[test]
fn test_trusted_legacy_email_without_upgrade_is_refused() -> TestResult {
    let (request, leaf, services) =
        walk_popup(fixtures::trusted(fixtures::LEGACY_EMAIL), params(None))?;
    ensure(leaf == "legacy_without_upgrade", "Expected the refusal leaf")?;
    ensure(
        html_page(&request)?.contains("notifyFederatedError('invalidAssertionEmail'"),
        "Expected the invalid-assertion-email notifier",
    )?;
    let stashed = services.sessions.idp_assertion(fixtures::SESSION)?;
    ensure(stashed.is_some(), "Expected the assertion stashed for a follow-up upgrade")?;
    Ok(())
}

#[test]
fn test_input_email_mismatch_is_reported() -> TestResult {
    let mut call = params(None);
    call.input_email = Some("someoneelse@gmail.com".to_owned());
    let (request, leaf, _services) =
        walk_popup(fixtures::trusted(fixtures::FEDERATED_EMAIL), call)?;
    ensure(leaf == "input_mismatch", "Expected the mismatch leaf")?;
    let page = html_page(&request)?;
    ensure(
        page.contains("notifyFederatedError('accountMismatch'"),
        "Expected the account-mismatch notifier",
    )?;
    ensure(page.contains("someoneelse@gmail.com"), "Expected the typed email in the detail")?;
    Ok(())
}

// ============================================================================
// SECTION: Popup Mode, Upgrade Flow
// ============================================================================

#[test]
fn test_upgrade_purpose_converts_the_signed_in_legacy_account() -> TestResult {
    let services = fixtures::services(fixtures::trusted(fixtures::LEGACY_EMAIL))?;
    services
        .sessions
        .set_session_account(fixtures::SESSION, Some(&Account::legacy(fixtures::LEGACY_EMAIL)))?;
    let (request, leaf, services) = walk_popup_with(services, params(Some("upgrade")))?;
    ensure(leaf == "upgraded_account", "Expected the upgrade leaf")?;
    ensure(html_page(&request)?.contains("notifyFederatedSuccess"), "Expected a success page")?;
    let upgraded = services.accounts.lookup(fixtures::LEGACY_EMAIL)?;
    ensure(
        upgraded.is_some_and(|account| account.federated),
        "Expected the account converted to federated",
    )?;
    let session = services.sessions.session_account(fixtures::SESSION)?;
    ensure(
        session.is_some_and(|account| account.federated),
        "Expected the session refreshed with the upgraded account",
    )?;
    Ok(())
}

#[test]
fn test_upgrade_purpose_with_a_different_session_user_is_a_mismatch() -> TestResult {
    let services = fixtures::services(fixtures::trusted(fixtures::LEGACY_EMAIL))?;
    services
        .sessions
        .set_session_account(fixtures::SESSION, Some(&Account::legacy("other@example.com")))?;
    let (request, leaf, _services) = walk_popup_with(services, params(Some("upgrade")))?;
    ensure(leaf == "upgrade_mismatch", "Expected the mismatch leaf")?;
    ensure(
        html_page(&request)?.contains("notifyFederatedError('accountMismatch'"),
        "Expected the account-mismatch notifier",
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Popup Mode, Bad Assertions
// ============================================================================

#[test]
fn test_untrusted_assertion_is_reported() -> TestResult {
    let verdict = AssertionVerdict::Untrusted {
        email: fixtures::UNKNOWN_EMAIL.to_owned(),
    };
    let (request, leaf, _services) = walk_popup(verdict, params(None))?;
    ensure(leaf == "untrusted_assertion", "Expected the untrusted leaf")?;
    ensure(
        html_page(&request)?.contains("notifyFederatedError('invalidAssertionEmail'"),
        "Expected the invalid-assertion-email notifier",
    )?;
    Ok(())
}

#[test]
fn test_invalid_assertion_is_reported() -> TestResult {
    let (request, leaf, _services) = walk_popup(AssertionVerdict::Invalid, params(None))?;
    ensure(leaf == "invalid_assertion", "Expected the invalid leaf")?;
    ensure(
        html_page(&request)?.contains("notifyFederatedError('invalidAssertion'"),
        "Expected the invalid-assertion notifier",
    )?;
    Ok(())
}

#[test]
fn test_refused_auto_create_reports_unregistered() -> TestResult {
    let mut services = fixtures::services(fixtures::trusted(fixtures::UNKNOWN_EMAIL))?;
    services.accounts = Arc::new(InMemoryAccountService::without_auto_create());
    let (request, leaf, services) = walk_popup_with(services, params(None))?;
    ensure(leaf == "unregistered_visitor", "Expected the unregistered leaf")?;
    let page = html_page(&request)?;
    ensure(page.contains("notifyFederatedSuccess"), "Expected the success notifier")?;
    ensure(page.contains("\"registered\":false"), "Expected an unregistered payload")?;
    let stashed = services.sessions.idp_assertion(fixtures::SESSION)?;
    ensure(stashed.is_some(), "Expected the assertion stashed for the signup page")?;
    Ok(())
}

// ============================================================================
// SECTION: Redirect Mode
// ============================================================================

#[test]
fn test_signed_in_session_skips_verification_and_goes_home() -> TestResult {
    let services = fixtures::services(AssertionVerdict::Invalid)?;
    services
        .sessions
        .set_session_account(fixtures::SESSION, Some(&Account::legacy(fixtures::LEGACY_EMAIL)))?;
    let tree = callback_redirect_tree(&services, options())?;
    let mut request = CallbackRequest::new(params(None), fixtures::SESSION);
    let report = tree.execute(&mut request)?;
    ensure(report.leaf == "already_signed_in", "Expected the short-circuit leaf")?;
    ensure(
        request.responses() == [WidgetResponse::Redirect("/home".to_owned())],
        "Expected a redirect home",
    )?;
    Ok(())
}

#[test]
fn test_redirect_mode_sends_new_accounts_home() -> TestResult {
    let services = fixtures::services(fixtures::trusted(fixtures::UNKNOWN_EMAIL))?;
    let tree = callback_redirect_tree(&services, options())?;
    let mut request = CallbackRequest::new(params(None), fixtures::SESSION);
    let report = tree.execute(&mut request)?;
    ensure(report.leaf == "created_account", "Expected the auto-create leaf")?;
    ensure(
        request.responses() == [WidgetResponse::Redirect("/home".to_owned())],
        "Expected a redirect home after sign-in",
    )?;
    Ok(())
}

#[test]
fn test_redirect_mode_sends_unregistered_visitors_to_signup() -> TestResult {
    let mut services = fixtures::services(fixtures::trusted(fixtures::UNKNOWN_EMAIL))?;
    services.accounts = Arc::new(InMemoryAccountService::without_auto_create());
    let tree = callback_redirect_tree(&services, options())?;
    let mut request = CallbackRequest::new(params(None), fixtures::SESSION);
    let report = tree.execute(&mut request)?;
    ensure(report.leaf == "unregistered_visitor", "Expected the unregistered leaf")?;
    ensure(
        request.responses() == [WidgetResponse::Redirect("/signup".to_owned())],
        "Expected a redirect to signup",
    )?;
    Ok(())
}

#[test]
fn test_redirect_mode_forwards_errors_to_the_login_page() -> TestResult {
    let services = fixtures::services(AssertionVerdict::Invalid)?;
    let tree = callback_redirect_tree(&services, options())?;
    let mut request = CallbackRequest::new(params(None), fixtures::SESSION);
    let report = tree.execute(&mut request)?;
    ensure(report.leaf == "invalid_assertion", "Expected the invalid leaf")?;
    ensure(
        request.responses()
            == [WidgetResponse::Forward {
                page: "/login".to_owned(),
                notification_key: "Notification".to_owned(),
                notification: json!({ "errorType": "invalidAssertion" }),
            }],
        "Expected a forward to the login page with the error notification",
    )?;
    Ok(())
}
