// easyrp-core/src/account.rs
// ============================================================================
// Module: Account Model and Service
// Description: User accounts and the account backend seam.
// Purpose: Let host applications plug in their own account storage.
// Dependencies: serde, thiserror, std::collections, std::sync
// ============================================================================

//! ## Overview
//! The sign-in logic never talks to a database directly; it goes through
//! [`AccountService`]. The in-memory implementation exists for tests and
//! demos and mirrors the semantics a real backend must provide, including
//! the error codes the decision trees route on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Account Model
// ============================================================================

/// A user account as the Relying Party sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Primary email identifier.
    pub email: String,
    /// Display name, when the backend has one.
    pub display_name: Option<String>,
    /// Avatar URL, when the backend has one.
    pub photo_url: Option<String>,
    /// True for federated accounts, false for password accounts.
    pub federated: bool,
    /// True when the email address has been verified.
    pub verified: bool,
}

impl Account {
    /// Creates a password (legacy) account.
    pub fn legacy(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: None,
            photo_url: None,
            federated: false,
            verified: true,
        }
    }

    /// Creates a federated account.
    pub fn federated(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: None,
            photo_url: None,
            federated: true,
            verified: true,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Sets the avatar URL.
    #[must_use]
    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Account backend failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// An account with this email already exists.
    #[error("account already exists: {email}")]
    AlreadyExists {
        /// The colliding email.
        email: String,
    },

    /// No account with this email exists.
    #[error("account not found: {email}")]
    NotFound {
        /// The missing email.
        email: String,
    },

    /// The backend refused the operation for this account.
    #[error("action not allowed for account: {email}")]
    ActionNotAllowed {
        /// The affected email.
        email: String,
    },

    /// Any other backend failure.
    #[error("account backend error: {0}")]
    Unknown(String),
}

// ============================================================================
// SECTION: Service Seam
// ============================================================================

/// Account backend the sign-in logic runs against.
pub trait AccountService: Send + Sync {
    /// Looks up an account by email.
    ///
    /// # Errors
    /// Returns [`AccountError`] on backend failure; an absent account is
    /// `Ok(None)`.
    fn lookup(&self, email: &str) -> Result<Option<Account>, AccountError>;

    /// Checks a password against the stored credential.
    ///
    /// # Errors
    /// Returns [`AccountError`] on backend failure; a wrong password is
    /// `Ok(false)`.
    fn check_password(&self, email: &str, password: &str) -> Result<bool, AccountError>;

    /// Creates a federated account from a verified assertion profile.
    ///
    /// # Errors
    /// Returns [`AccountError::AlreadyExists`] for a taken email and
    /// [`AccountError::ActionNotAllowed`] when the backend forbids
    /// auto-creation.
    fn create_federated(
        &self,
        email: &str,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<Account, AccountError>;

    /// Upgrades a password account to a federated account.
    ///
    /// # Errors
    /// Returns [`AccountError::NotFound`] for an unknown email.
    fn to_federated(&self, email: &str) -> Result<Account, AccountError>;
}

// ============================================================================
// SECTION: In-Memory Service
// ============================================================================

/// Stored record for the in-memory backend.
#[derive(Debug, Clone)]
struct StoredAccount {
    /// The account itself.
    account: Account,
    /// Password for legacy accounts.
    password: Option<String>,
}

/// In-memory account backend for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAccountService {
    /// Account map protected by a mutex, keyed by lowercased email.
    accounts: Arc<Mutex<BTreeMap<String, StoredAccount>>>,
    /// When set, `create_federated` is refused.
    deny_auto_create: bool,
}

impl InMemoryAccountService {
    /// Creates an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that refuses federated auto-creation.
    #[must_use]
    pub fn without_auto_create() -> Self {
        Self {
            accounts: Arc::new(Mutex::new(BTreeMap::new())),
            deny_auto_create: true,
        }
    }

    /// Seeds a legacy account with a password.
    ///
    /// # Errors
    /// Returns [`AccountError::AlreadyExists`] for a taken email.
    pub fn seed_legacy(&self, email: &str, password: &str) -> Result<(), AccountError> {
        self.seed(Account::legacy(email), Some(password.to_owned()))
    }

    /// Seeds an arbitrary account without a password.
    ///
    /// # Errors
    /// Returns [`AccountError::AlreadyExists`] for a taken email.
    pub fn seed_account(&self, account: Account) -> Result<(), AccountError> {
        self.seed(account, None)
    }

    /// Inserts a record, rejecting duplicates.
    fn seed(&self, account: Account, password: Option<String>) -> Result<(), AccountError> {
        let key = account.email.to_lowercase();
        let mut guard = lock(&self.accounts)?;
        if guard.contains_key(&key) {
            return Err(AccountError::AlreadyExists {
                email: account.email,
            });
        }
        guard.insert(key, StoredAccount {
            account,
            password,
        });
        Ok(())
    }
}

/// Locks the account map, mapping a poisoned mutex to a backend error.
fn lock(
    accounts: &Arc<Mutex<BTreeMap<String, StoredAccount>>>,
) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, StoredAccount>>, AccountError> {
    accounts.lock().map_err(|_| AccountError::Unknown("account store mutex poisoned".to_owned()))
}

impl AccountService for InMemoryAccountService {
    fn lookup(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let guard = lock(&self.accounts)?;
        Ok(guard.get(&email.to_lowercase()).map(|stored| stored.account.clone()))
    }

    fn check_password(&self, email: &str, password: &str) -> Result<bool, AccountError> {
        let guard = lock(&self.accounts)?;
        Ok(guard
            .get(&email.to_lowercase())
            .and_then(|stored| stored.password.as_deref())
            .is_some_and(|stored| stored == password))
    }

    fn create_federated(
        &self,
        email: &str,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<Account, AccountError> {
        if self.deny_auto_create {
            return Err(AccountError::ActionNotAllowed {
                email: email.to_owned(),
            });
        }
        let mut account = Account::federated(email);
        account.display_name = display_name.map(str::to_owned);
        account.photo_url = photo_url.map(str::to_owned);
        self.seed(account.clone(), None)?;
        Ok(account)
    }

    fn to_federated(&self, email: &str) -> Result<Account, AccountError> {
        let mut guard = lock(&self.accounts)?;
        let stored = guard.get_mut(&email.to_lowercase()).ok_or_else(|| AccountError::NotFound {
            email: email.to_owned(),
        })?;
        stored.account.federated = true;
        stored.password = None;
        Ok(stored.account.clone())
    }
}
