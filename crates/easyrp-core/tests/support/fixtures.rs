// easyrp-core/tests/support/fixtures.rs
// ============================================================================
// Module: Test Fixtures
// Description: Service bundles and seeded backends for flavor tests.
// ============================================================================
//! ## Overview
//! Builds an in-memory [`RpServices`] bundle with a configurable IDP verdict
//! and a couple of seeded accounts, so each test reads as the scenario it
//! exercises rather than as setup.

#![allow(dead_code, reason = "Each integration test binary uses a subset of the fixtures.")]

use std::error::Error;
use std::sync::Arc;

use easyrp_config::RpConfig;
use easyrp_core::Account;
use easyrp_core::AssertionVerdict;
use easyrp_core::InMemoryAccountService;
use easyrp_core::InMemorySessionManager;
use easyrp_core::NoHostedDomains;
use easyrp_core::RpServices;
use easyrp_core::StaticIdpClient;

/// Email of the seeded legacy account.
pub const LEGACY_EMAIL: &str = "olduser@example.com";
/// Password of the seeded legacy account.
pub const LEGACY_PASSWORD: &str = "hunter2";
/// Email of the seeded federated account.
pub const FEDERATED_EMAIL: &str = "feduser@gmail.com";
/// Email no backend knows about.
pub const UNKNOWN_EMAIL: &str = "nobody@gmail.com";
/// Session id used by most tests.
pub const SESSION: &str = "session-1";

/// A trusted verdict for the given email, with a display name attached.
pub fn trusted(email: &str) -> AssertionVerdict {
    AssertionVerdict::Trusted {
        email: email.to_owned(),
        display_name: Some("Pat".to_owned()),
        photo_url: None,
    }
}

/// Installs a test-writer subscriber so walk logs land in captured output.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Builds the standard in-memory service bundle.
///
/// Seeds one legacy account and one federated account, and wires an IDP
/// client that always answers with `verdict`.
pub fn services(verdict: AssertionVerdict) -> Result<RpServices, Box<dyn Error>> {
    init_tracing();
    let accounts = InMemoryAccountService::new();
    accounts.seed_legacy(LEGACY_EMAIL, LEGACY_PASSWORD)?;
    accounts
        .seed_account(Account::federated(FEDERATED_EMAIL).with_display_name("Fed User"))?;
    Ok(RpServices {
        accounts: Arc::new(accounts),
        sessions: Arc::new(InMemorySessionManager::new()),
        idp: Arc::new(StaticIdpClient::new(verdict)),
        domains: Arc::new(NoHostedDomains),
        config: Arc::new(config()?),
    })
}

/// Builds the standard site configuration.
pub fn config() -> Result<RpConfig, Box<dyn Error>> {
    Ok(RpConfig::builder()
        .home_url("/home")
        .login_url("/login")
        .signup_url("/signup")
        .build()?)
}
