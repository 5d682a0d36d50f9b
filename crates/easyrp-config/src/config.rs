// easyrp-config/src/config.rs
// ============================================================================
// Module: Relying Party Configuration
// Description: Configuration loading and validation for an RP deployment.
// Purpose: Provide strict, fail-closed config parsing for the sign-in stack.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with a strict size limit, or
//! assembled in code through [`RpConfigBuilder`]. Missing or invalid
//! configuration fails closed: a config that does not validate never reaches
//! the sign-in logic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Default session cookie name.
const DEFAULT_SESSION_COOKIE: &str = "RPSession";
/// Default IDP assertion cookie name.
const DEFAULT_IDP_ASSERTION_COOKIE: &str = "IdpAssertion";
/// Default OAuth token cookie name.
const DEFAULT_OAUTH_TOKEN_COOKIE: &str = "OauthToken";
/// Default session lifetime in seconds.
const DEFAULT_MAX_AGE_OF_SESSION: u32 = 3600;
/// Default IDP assertion lifetime in seconds.
const DEFAULT_MAX_AGE_OF_IDP_ASSERTION: u32 = 300;
/// Default OAuth token lifetime in seconds.
const DEFAULT_MAX_AGE_OF_OAUTH_TOKEN: u32 = 3600;
/// Default cookie path.
const DEFAULT_PATH: &str = "/";
/// Default session attribute key for the signed-in user.
const DEFAULT_SESSION_USER_KEY: &str = "SessionUser";
/// Default session attribute key for a stashed IDP assertion.
const DEFAULT_SESSION_IDP_ASSERTION_KEY: &str = "SessionIdpAssertion";
/// Default session attribute key for a stashed OAuth token.
const DEFAULT_SESSION_OAUTH_TOKEN_KEY: &str = "SessionOauthToken";
/// Default request attribute key for widget notifications.
const DEFAULT_NOTIFICATION_KEY: &str = "Notification";
/// Default request parameter key for account-chooser actions.
const DEFAULT_CDS_ACTION_KEY: &str = "CdsAction";

// ============================================================================
// SECTION: Configuration Type
// ============================================================================

/// Relying Party deployment configuration.
///
/// Cookie and session-attribute names describe where the host application
/// keeps sign-in state; the URLs tell callback flows where to send the
/// browser. All fields have defaults except the three page URLs, which
/// `validate` insists on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RpConfig {
    /// Session cookie name.
    #[serde(default = "default_session_cookie")]
    pub session_cookie_name: String,
    /// IDP assertion cookie name.
    #[serde(default = "default_idp_assertion_cookie")]
    pub idp_assertion_cookie_name: String,
    /// OAuth token cookie name.
    #[serde(default = "default_oauth_token_cookie")]
    pub oauth_token_cookie_name: String,
    /// Session lifetime in seconds.
    #[serde(default = "default_max_age_of_session")]
    pub max_age_of_session: u32,
    /// IDP assertion lifetime in seconds.
    #[serde(default = "default_max_age_of_idp_assertion")]
    pub max_age_of_idp_assertion: u32,
    /// OAuth token lifetime in seconds.
    #[serde(default = "default_max_age_of_oauth_token")]
    pub max_age_of_oauth_token: u32,
    /// Cookie domain; empty means host-only cookies.
    #[serde(default)]
    pub domain: String,
    /// Cookie path.
    #[serde(default = "default_path")]
    pub path: String,
    /// Session attribute key for the signed-in user.
    #[serde(default = "default_session_user_key")]
    pub session_user_key: String,
    /// Session attribute key for a stashed IDP assertion.
    #[serde(default = "default_session_idp_assertion_key")]
    pub session_idp_assertion_key: String,
    /// Session attribute key for a stashed OAuth token.
    #[serde(default = "default_session_oauth_token_key")]
    pub session_oauth_token_key: String,
    /// Request attribute key under which notifications are forwarded.
    #[serde(default = "default_notification_key")]
    pub notification_key: String,
    /// Request parameter key for account-chooser actions.
    #[serde(default = "default_cds_action_key")]
    pub cds_action_key: String,
    /// Base URL of the site.
    #[serde(default)]
    pub site_url: String,
    /// URL the account-chooser widget is served from.
    #[serde(default)]
    pub widget_url: String,
    /// URL of the signed-in landing page.
    pub home_url: String,
    /// URL of the login page.
    pub login_url: String,
    /// URL of the signup page.
    pub signup_url: String,
}

/// Serde default helper for the session cookie name.
fn default_session_cookie() -> String {
    DEFAULT_SESSION_COOKIE.to_owned()
}

/// Serde default helper for the IDP assertion cookie name.
fn default_idp_assertion_cookie() -> String {
    DEFAULT_IDP_ASSERTION_COOKIE.to_owned()
}

/// Serde default helper for the OAuth token cookie name.
fn default_oauth_token_cookie() -> String {
    DEFAULT_OAUTH_TOKEN_COOKIE.to_owned()
}

/// Serde default helper for the session lifetime.
const fn default_max_age_of_session() -> u32 {
    DEFAULT_MAX_AGE_OF_SESSION
}

/// Serde default helper for the assertion lifetime.
const fn default_max_age_of_idp_assertion() -> u32 {
    DEFAULT_MAX_AGE_OF_IDP_ASSERTION
}

/// Serde default helper for the token lifetime.
const fn default_max_age_of_oauth_token() -> u32 {
    DEFAULT_MAX_AGE_OF_OAUTH_TOKEN
}

/// Serde default helper for the cookie path.
fn default_path() -> String {
    DEFAULT_PATH.to_owned()
}

/// Serde default helper for the session user key.
fn default_session_user_key() -> String {
    DEFAULT_SESSION_USER_KEY.to_owned()
}

/// Serde default helper for the session assertion key.
fn default_session_idp_assertion_key() -> String {
    DEFAULT_SESSION_IDP_ASSERTION_KEY.to_owned()
}

/// Serde default helper for the session token key.
fn default_session_oauth_token_key() -> String {
    DEFAULT_SESSION_OAUTH_TOKEN_KEY.to_owned()
}

/// Serde default helper for the notification key.
fn default_notification_key() -> String {
    DEFAULT_NOTIFICATION_KEY.to_owned()
}

/// Serde default helper for the account-chooser action key.
fn default_cds_action_key() -> String {
    DEFAULT_CDS_ACTION_KEY.to_owned()
}

impl RpConfig {
    /// Starts a builder with all defaults applied.
    #[must_use]
    pub fn builder() -> RpConfigBuilder {
        RpConfigBuilder::new()
    }

    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file is missing, oversized,
    /// unparsable, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let metadata =
            fs::metadata(path).map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                size: metadata.len(),
                limit: MAX_CONFIG_FILE_SIZE,
            });
        }
        let content = fs::read_to_string(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_named(&self.session_cookie_name, "session_cookie_name")?;
        ensure_named(&self.idp_assertion_cookie_name, "idp_assertion_cookie_name")?;
        ensure_named(&self.oauth_token_cookie_name, "oauth_token_cookie_name")?;
        ensure_named(&self.path, "path")?;
        ensure_named(&self.session_user_key, "session_user_key")?;
        ensure_named(&self.session_idp_assertion_key, "session_idp_assertion_key")?;
        ensure_named(&self.session_oauth_token_key, "session_oauth_token_key")?;
        ensure_named(&self.notification_key, "notification_key")?;
        ensure_named(&self.cds_action_key, "cds_action_key")?;
        ensure_named(&self.home_url, "home_url")?;
        ensure_named(&self.login_url, "login_url")?;
        ensure_named(&self.signup_url, "signup_url")?;
        ensure_positive(self.max_age_of_session, "max_age_of_session")?;
        ensure_positive(self.max_age_of_idp_assertion, "max_age_of_idp_assertion")?;
        ensure_positive(self.max_age_of_oauth_token, "max_age_of_oauth_token")?;
        Ok(())
    }
}

/// Rejects empty or whitespace-only required fields.
fn ensure_named(value: &str, field: &'static str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field,
            reason: "must not be empty".to_owned(),
        });
    }
    Ok(())
}

/// Rejects zero lifetimes.
fn ensure_positive(value: u32, field: &'static str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            field,
            reason: "must be greater than zero".to_owned(),
        });
    }
    Ok(())
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Fluent builder for [`RpConfig`].
///
/// Starts from the documented defaults; the three page URLs must be set
/// before `build` will validate.
#[derive(Debug, Clone)]
pub struct RpConfigBuilder {
    /// Configuration under construction.
    config: RpConfig,
}

impl Default for RpConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RpConfigBuilder {
    /// Creates a builder with all defaults applied and empty URLs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RpConfig {
                session_cookie_name: default_session_cookie(),
                idp_assertion_cookie_name: default_idp_assertion_cookie(),
                oauth_token_cookie_name: default_oauth_token_cookie(),
                max_age_of_session: DEFAULT_MAX_AGE_OF_SESSION,
                max_age_of_idp_assertion: DEFAULT_MAX_AGE_OF_IDP_ASSERTION,
                max_age_of_oauth_token: DEFAULT_MAX_AGE_OF_OAUTH_TOKEN,
                domain: String::new(),
                path: default_path(),
                session_user_key: default_session_user_key(),
                session_idp_assertion_key: default_session_idp_assertion_key(),
                session_oauth_token_key: default_session_oauth_token_key(),
                notification_key: default_notification_key(),
                cds_action_key: default_cds_action_key(),
                site_url: String::new(),
                widget_url: String::new(),
                home_url: String::new(),
                login_url: String::new(),
                signup_url: String::new(),
            },
        }
    }

    /// Sets the session cookie name.
    #[must_use]
    pub fn session_cookie_name(mut self, val: impl Into<String>) -> Self {
        self.config.session_cookie_name = val.into();
        self
    }

    /// Sets the IDP assertion cookie name.
    #[must_use]
    pub fn idp_assertion_cookie_name(mut self, val: impl Into<String>) -> Self {
        self.config.idp_assertion_cookie_name = val.into();
        self
    }

    /// Sets the OAuth token cookie name.
    #[must_use]
    pub fn oauth_token_cookie_name(mut self, val: impl Into<String>) -> Self {
        self.config.oauth_token_cookie_name = val.into();
        self
    }

    /// Sets the session lifetime in seconds.
    #[must_use]
    pub const fn max_age_of_session(mut self, val: u32) -> Self {
        self.config.max_age_of_session = val;
        self
    }

    /// Sets the IDP assertion lifetime in seconds.
    #[must_use]
    pub const fn max_age_of_idp_assertion(mut self, val: u32) -> Self {
        self.config.max_age_of_idp_assertion = val;
        self
    }

    /// Sets the OAuth token lifetime in seconds.
    #[must_use]
    pub const fn max_age_of_oauth_token(mut self, val: u32) -> Self {
        self.config.max_age_of_oauth_token = val;
        self
    }

    /// Sets the cookie domain.
    #[must_use]
    pub fn domain(mut self, val: impl Into<String>) -> Self {
        self.config.domain = val.into();
        self
    }

    /// Sets the cookie path.
    #[must_use]
    pub fn path(mut self, val: impl Into<String>) -> Self {
        self.config.path = val.into();
        self
    }

    /// Sets the session attribute key for the signed-in user.
    #[must_use]
    pub fn session_user_key(mut self, val: impl Into<String>) -> Self {
        self.config.session_user_key = val.into();
        self
    }

    /// Sets the session attribute key for a stashed IDP assertion.
    #[must_use]
    pub fn session_idp_assertion_key(mut self, val: impl Into<String>) -> Self {
        self.config.session_idp_assertion_key = val.into();
        self
    }

    /// Sets the session attribute key for a stashed OAuth token.
    #[must_use]
    pub fn session_oauth_token_key(mut self, val: impl Into<String>) -> Self {
        self.config.session_oauth_token_key = val.into();
        self
    }

    /// Sets the notification forwarding key.
    #[must_use]
    pub fn notification_key(mut self, val: impl Into<String>) -> Self {
        self.config.notification_key = val.into();
        self
    }

    /// Sets the account-chooser action key.
    #[must_use]
    pub fn cds_action_key(mut self, val: impl Into<String>) -> Self {
        self.config.cds_action_key = val.into();
        self
    }

    /// Sets the base site URL.
    #[must_use]
    pub fn site_url(mut self, val: impl Into<String>) -> Self {
        self.config.site_url = val.into();
        self
    }

    /// Sets the widget URL.
    #[must_use]
    pub fn widget_url(mut self, val: impl Into<String>) -> Self {
        self.config.widget_url = val.into();
        self
    }

    /// Sets the signed-in landing page URL.
    #[must_use]
    pub fn home_url(mut self, val: impl Into<String>) -> Self {
        self.config.home_url = val.into();
        self
    }

    /// Sets the login page URL.
    #[must_use]
    pub fn login_url(mut self, val: impl Into<String>) -> Self {
        self.config.login_url = val.into();
        self
    }

    /// Sets the signup page URL.
    #[must_use]
    pub fn signup_url(mut self, val: impl Into<String>) -> Self {
        self.config.signup_url = val.into();
        self
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when a required field is missing.
    pub fn build(self) -> Result<RpConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("config io error: {0}")]
    Io(String),

    /// The config file exceeded the size limit.
    #[error("config file too large: {size} bytes (max {limit})")]
    TooLarge {
        /// Observed file size in bytes.
        size: u64,
        /// Enforced limit in bytes.
        limit: u64,
    },

    /// The TOML content did not parse.
    #[error("config parse error: {0}")]
    Parse(String),

    /// A field failed validation.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
