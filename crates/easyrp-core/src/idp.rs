// easyrp-core/src/idp.rs
// ============================================================================
// Module: Identity Provider Helpers
// Description: Assertion verification seam, email parsing, and the built-in
//              federated-domain whitelist.
// Purpose: Keep everything IDP-shaped behind traits and small helpers.
// Dependencies: regex, serde, thiserror
// ============================================================================

//! ## Overview
//! Federated sign-in hinges on two questions: is this assertion trustworthy,
//! and is this email's domain served by an IDP at all. The first goes
//! through [`IdpClient`]; the second either consults the built-in
//! [`IdpWhitelist`] plus a host-supplied [`DomainChecker`], or falls back to
//! the client's discovery call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Email Helpers
// ============================================================================

/// Email shape accepted by the sign-in flows.
static EMAIL_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\w+(\.\w+)*@(\w+(\.\w+)+)$").ok());

/// Returns true when the string looks like a routable email address.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() {
        return false;
    }
    EMAIL_REGEX.as_ref().is_some_and(|regex| regex.is_match(email))
}

/// Extracts the lowercased domain of an email address.
///
/// A string without `@` is treated as a bare domain. Invalid emails yield
/// `None`.
#[must_use]
pub fn domain_of(email: &str) -> Option<String> {
    if email.is_empty() {
        return None;
    }
    if !email.contains('@') {
        return Some(email.to_lowercase());
    }
    if !is_valid_email(email) {
        return None;
    }
    email.split('@').nth(1).map(str::to_lowercase)
}

// ============================================================================
// SECTION: Assertion Verdicts
// ============================================================================

/// Outcome of verifying an IDP assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssertionVerdict {
    /// The IDP vouches for this email.
    Trusted {
        /// Asserted email address.
        email: String,
        /// Display name from the assertion, when present.
        display_name: Option<String>,
        /// Avatar URL from the assertion, when present.
        photo_url: Option<String>,
    },
    /// The assertion parsed but the IDP is not authoritative for the email.
    Untrusted {
        /// Asserted email address.
        email: String,
    },
    /// The assertion could not be verified at all.
    Invalid,
}

impl AssertionVerdict {
    /// The asserted email, when the assertion carried one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Trusted {
                email, ..
            }
            | Self::Untrusted {
                email,
            } => Some(email),
            Self::Invalid => None,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// IDP client failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdpError {
    /// The verification endpoint could not be reached.
    #[error("idp unavailable: {0}")]
    Unavailable(String),

    /// The endpoint answered with something unusable.
    #[error("idp protocol error: {0}")]
    Protocol(String),
}

// ============================================================================
// SECTION: Service Seams
// ============================================================================

/// Client for the identity-toolkit verification and discovery endpoints.
pub trait IdpClient: Send + Sync {
    /// Verifies the assertion carried by a callback request.
    ///
    /// # Errors
    /// Returns [`IdpError`] when the endpoint cannot be consulted; a
    /// well-formed negative answer is an [`AssertionVerdict`], not an error.
    fn verify_assertion(
        &self,
        request_uri: &str,
        post_body: Option<&str>,
    ) -> Result<AssertionVerdict, IdpError>;

    /// Asks discovery whether a domain is served by an IDP.
    ///
    /// # Errors
    /// Returns [`IdpError`] when discovery cannot be consulted.
    fn discover(&self, domain: &str) -> Result<bool, IdpError>;
}

/// Host-supplied check for domains federated through the host's own
/// directory rather than a public IDP.
pub trait DomainChecker: Send + Sync {
    /// Returns true when the domain is a hosted (directory-managed) domain.
    fn is_hosted_domain(&self, domain: &str) -> bool;
}

/// Checker that recognizes no hosted domains.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHostedDomains;

impl DomainChecker for NoHostedDomains {
    fn is_hosted_domain(&self, _domain: &str) -> bool {
        false
    }
}

// ============================================================================
// SECTION: Federated Domain Whitelist
// ============================================================================

/// Built-in list of public email-provider domains with known IDP support.
#[derive(Debug, Clone)]
pub struct IdpWhitelist {
    /// Lowercased federated domains.
    domains: BTreeSet<String>,
}

impl Default for IdpWhitelist {
    /// The stock list: Gmail, AOL, LiveID, Yahoo, and partner ISP domains.
    fn default() -> Self {
        Self::from_domains([
            // Gmail
            "gmail.com",
            "googlemail.com",
            // AOL domains.
            "aol.com",
            "aim.com",
            "netscape.net",
            "cs.com",
            "ygm.com",
            "games.com",
            "love.com",
            "wow.com",
            // LiveID domains.
            "hotmail.com",
            "hotmail.co.uk",
            "hotmail.fr",
            "hotmail.it",
            "live.com",
            "msn.com",
            // Yahoo domains.
            "yahoo.com",
            "rocketmail.com",
            "ymail.com",
            "y7mail.com",
            "yahoo.com.au",
            "yahoo.com.cn",
            "yahoo.cn",
            "yahoo.com.hk",
            "yahoo.co.nz",
            "yahoo.com.pk",
            "yahoo.com.tw",
            "kimo.com",
            "bellsouth.net",
            "ameritech.net",
            "att.net",
            "attworld.com",
            "flash.net",
            "nvbell.net",
            "pacbell.net",
            "prodigy.net",
            "sbcglobal.net",
            "snet.net",
            "swbell.net",
            "wans.net",
            "btinternet.com",
            "btopenworld.com",
            "talk21.com",
            "rogers.com",
            "nl.rogers.com",
            "demobroadband.com",
            "xtra.co.nz",
            "verizon.net",
        ])
    }
}

impl IdpWhitelist {
    /// Builds a whitelist from explicit domains.
    pub fn from_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains.into_iter().map(|domain| domain.as_ref().to_lowercase()).collect(),
        }
    }

    /// Returns true when the domain is on the list.
    #[must_use]
    pub fn supports(&self, domain: &str) -> bool {
        if domain.is_empty() {
            return false;
        }
        self.domains.contains(&domain.to_lowercase())
    }

    /// Number of listed domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Returns true when the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

// ============================================================================
// SECTION: Static Client
// ============================================================================

/// IDP client answering from fixed data, for tests and examples.
#[derive(Debug, Clone)]
pub struct StaticIdpClient {
    /// Verdict returned for every verification call.
    verdict: AssertionVerdict,
    /// Domains discovery reports as IDP-served.
    idp_domains: BTreeSet<String>,
}

impl StaticIdpClient {
    /// Creates a client that always answers with the given verdict.
    #[must_use]
    pub const fn new(verdict: AssertionVerdict) -> Self {
        Self {
            verdict,
            idp_domains: BTreeSet::new(),
        }
    }

    /// Adds a domain that discovery will report as IDP-served.
    #[must_use]
    pub fn with_idp_domain(mut self, domain: &str) -> Self {
        self.idp_domains.insert(domain.to_lowercase());
        self
    }
}

impl IdpClient for StaticIdpClient {
    fn verify_assertion(
        &self,
        _request_uri: &str,
        _post_body: Option<&str>,
    ) -> Result<AssertionVerdict, IdpError> {
        Ok(self.verdict.clone())
    }

    fn discover(&self, domain: &str) -> Result<bool, IdpError> {
        Ok(self.idp_domains.contains(&domain.to_lowercase()))
    }
}
