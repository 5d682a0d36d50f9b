// easyrp-core/src/session.rs
// ============================================================================
// Module: Session Management
// Description: Session state seam for signed-in users and stashed assertions.
// Purpose: Keep sign-in state behind a trait the host application implements.
// Dependencies: crate::account, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Sessions are keyed by an opaque session id supplied by the host. The
//! logic stores two things per session: the signed-in account and, during a
//! federated flow that cannot finish immediately, a stashed IDP assertion
//! the follow-up page can pick up.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use thiserror::Error;

use crate::account::Account;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Session backend failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Any session store failure.
    #[error("session store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Service Seam
// ============================================================================

/// Session backend the sign-in logic runs against.
pub trait SessionManager: Send + Sync {
    /// Returns the signed-in account for a session, if any.
    ///
    /// # Errors
    /// Returns [`SessionError`] on backend failure.
    fn session_account(&self, session_id: &str) -> Result<Option<Account>, SessionError>;

    /// Sets or clears the signed-in account for a session.
    ///
    /// # Errors
    /// Returns [`SessionError`] on backend failure.
    fn set_session_account(
        &self,
        session_id: &str,
        account: Option<&Account>,
    ) -> Result<(), SessionError>;

    /// Returns the stashed IDP assertion for a session, if any.
    ///
    /// # Errors
    /// Returns [`SessionError`] on backend failure.
    fn idp_assertion(&self, session_id: &str) -> Result<Option<serde_json::Value>, SessionError>;

    /// Stashes or clears an IDP assertion for a session.
    ///
    /// # Errors
    /// Returns [`SessionError`] on backend failure.
    fn set_idp_assertion(
        &self,
        session_id: &str,
        assertion: Option<&serde_json::Value>,
    ) -> Result<(), SessionError>;

    /// Clears all state for a session.
    ///
    /// # Errors
    /// Returns [`SessionError`] on backend failure.
    fn sign_out(&self, session_id: &str) -> Result<(), SessionError>;
}

// ============================================================================
// SECTION: In-Memory Manager
// ============================================================================

/// Per-session state for the in-memory manager.
#[derive(Debug, Default, Clone)]
struct SessionData {
    /// Signed-in account.
    account: Option<Account>,
    /// Stashed IDP assertion.
    idp_assertion: Option<serde_json::Value>,
}

/// In-memory session manager for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemorySessionManager {
    /// Session map protected by a mutex.
    sessions: Arc<Mutex<BTreeMap<String, SessionData>>>,
}

impl InMemorySessionManager {
    /// Creates an empty in-memory session manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the map, mapping a poisoned mutex to a store error.
    fn guard(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, SessionData>>, SessionError> {
        self.sessions.lock().map_err(|_| SessionError::Store("session mutex poisoned".to_owned()))
    }
}

impl SessionManager for InMemorySessionManager {
    fn session_account(&self, session_id: &str) -> Result<Option<Account>, SessionError> {
        let guard = self.guard()?;
        Ok(guard.get(session_id).and_then(|data| data.account.clone()))
    }

    fn set_session_account(
        &self,
        session_id: &str,
        account: Option<&Account>,
    ) -> Result<(), SessionError> {
        let mut guard = self.guard()?;
        guard.entry(session_id.to_owned()).or_default().account = account.cloned();
        Ok(())
    }

    fn idp_assertion(&self, session_id: &str) -> Result<Option<serde_json::Value>, SessionError> {
        let guard = self.guard()?;
        Ok(guard.get(session_id).and_then(|data| data.idp_assertion.clone()))
    }

    fn set_idp_assertion(
        &self,
        session_id: &str,
        assertion: Option<&serde_json::Value>,
    ) -> Result<(), SessionError> {
        let mut guard = self.guard()?;
        guard.entry(session_id.to_owned()).or_default().idp_assertion = assertion.cloned();
        Ok(())
    }

    fn sign_out(&self, session_id: &str) -> Result<(), SessionError> {
        let mut guard = self.guard()?;
        guard.remove(session_id);
        Ok(())
    }
}
