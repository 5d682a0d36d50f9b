// rp-logic/tests/support/fixtures.rs
// ============================================================================
// Module: Test Fixtures
// Description: A probe context and canned registries for tree tests.
// ============================================================================
//! ## Overview
//! `Probe` records what a walk did to it; the canned registries expose
//! evaluators and actions with controllable outcomes.

#![allow(dead_code, reason = "Each integration test binary uses a subset of the fixtures.")]

use rp_logic::ActionSet;
use rp_logic::EvaluatorSet;
use rp_logic::OpError;
use rp_logic::RegistryError;

// ========================================================================
// Probe Context
// ========================================================================

/// Mutable context used by the fixture operations.
#[derive(Debug, Default)]
pub struct Probe {
    /// Key returned by the `pick_color` evaluator.
    pub color: String,
    /// Names appended by note actions, in execution order.
    pub ran: Vec<String>,
    /// Makes `pick_color` fail instead of returning a key.
    pub fail_eval: bool,
    /// Makes the `flaky` action fail.
    pub fail_action: bool,
}

impl Probe {
    /// Creates a probe that will answer `color` at `pick_color` nodes.
    pub fn with_color(color: &str) -> Self {
        Self {
            color: color.to_owned(),
            ..Self::default()
        }
    }
}

// ========================================================================
// Canned Registries
// ========================================================================

/// Builds the fixture evaluator registry.
///
/// # Errors
/// Propagates registry duplicates, which the fixture never produces.
pub fn evaluators() -> Result<EvaluatorSet<Probe>, RegistryError> {
    let mut set = EvaluatorSet::new();
    set.register_fn("pick_color", |probe: &mut Probe| {
        if probe.fail_eval {
            Err(OpError::failed("color probe offline"))
        } else {
            Ok(probe.color.clone())
        }
    })?;
    set.register_fn("always_red", |_probe: &mut Probe| Ok("red".to_owned()))?;
    Ok(set)
}

/// Builds the fixture action registry.
///
/// # Errors
/// Propagates registry duplicates, which the fixture never produces.
pub fn actions() -> Result<ActionSet<Probe>, RegistryError> {
    let mut set = ActionSet::new();
    set.register_fn("note_a", |probe: &mut Probe| {
        probe.ran.push("note_a".to_owned());
        Ok(())
    })?;
    set.register_fn("note_b", |probe: &mut Probe| {
        probe.ran.push("note_b".to_owned());
        Ok(())
    })?;
    set.register_fn("flaky", |probe: &mut Probe| {
        if probe.fail_action {
            Err(OpError::failed("flaky action tripped"))
        } else {
            probe.ran.push("flaky".to_owned());
            Ok(())
        }
    })?;
    Ok(set)
}
