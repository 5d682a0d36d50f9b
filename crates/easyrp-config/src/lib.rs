// easyrp-config/src/lib.rs
// ============================================================================
// Module: Easy RP Config Library
// Description: Public API surface for Relying-Party configuration.
// Purpose: Expose the config model, builder, and loading helpers.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! Canonical configuration for a Relying-Party deployment: cookie and
//! session-attribute names, lifetimes, and the page URLs the sign-in flows
//! redirect to. Loading is fail-closed; an invalid config never reaches the
//! sign-in logic.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::RpConfig;
pub use config::RpConfigBuilder;
