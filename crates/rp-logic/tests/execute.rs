// rp-logic/tests/execute.rs
// ============================================================================
// Module: Execution Tests
// Description: Tests for tree walks, fallback routing, and fault absorption.
// Purpose: Ensure walks route correctly and swallow only what they should.
// ============================================================================
//! ## Overview
//! Integration tests covering walk routing, default-branch fallback,
//! best-effort action execution, and the one fatal walk error.

#[path = "support/fixtures.rs"]
mod fixtures;
mod support;

use fixtures::Probe;
use rp_logic::ExecuteError;
use rp_logic::Tree;
use rp_logic::TreeBuilder;
use support::TestResult;
use support::ensure;

/// Builds the standard two-level fixture tree.
///
/// `root` picks a color; `red` leads to a nested decision, everything else
/// to a fallback leaf. The nested node routes `red` to a two-action leaf.
fn color_tree() -> TestResult<Tree<Probe>> {
    let mut builder = TreeBuilder::new(fixtures::evaluators()?, fixtures::actions()?);
    builder.start("root", "pick_color")?;
    builder.decision("n_red", "root", "red", "always_red")?;
    builder.leaf("l_deep", "n_red", "red", &["note_a", "flaky", "note_b"])?;
    builder.leaf("l_fallback", "root", "DEFAULT", &["note_b"])?;
    Ok(builder.build()?)
}

// ============================================================================
// SECTION: Routing
// ============================================================================

#[test]
fn test_walk_routes_to_matching_branch() -> TestResult {
    let tree = color_tree()?;
    let mut probe = Probe::with_color("red");
    let report = tree.execute(&mut probe)?;
    ensure(report.leaf == "l_deep", "Expected the red branch to reach the deep leaf")?;
    ensure(probe.ran == ["note_a", "flaky", "note_b"], "Expected all actions in order")?;
    ensure(report.faults.is_empty(), "Expected a clean walk")?;
    Ok(())
}

#[test]
fn test_walk_matches_keys_case_insensitively() -> TestResult {
    let tree = color_tree()?;
    let mut probe = Probe::with_color("ReD");
    let report = tree.execute(&mut probe)?;
    ensure(report.leaf == "l_deep", "Expected mixed-case key to match the red branch")?;
    Ok(())
}

#[test]
fn test_walk_report_records_steps() -> TestResult {
    let tree = color_tree()?;
    let mut probe = Probe::with_color("red");
    let report = tree.execute(&mut probe)?;
    ensure(report.steps.len() == 2, "Expected two routing steps")?;
    ensure(
        report.steps[0].node == "root" && report.steps[0].branch == "red",
        "Expected the first step to record the root routing",
    )?;
    ensure(
        report.steps[1].node == "n_red" && report.steps[1].branch == "red",
        "Expected the second step to record the nested routing",
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Default Fallback
// ============================================================================

#[test]
fn test_unmatched_key_takes_default_branch() -> TestResult {
    let tree = color_tree()?;
    let mut probe = Probe::with_color("chartreuse");
    let report = tree.execute(&mut probe)?;
    ensure(report.leaf == "l_fallback", "Expected an unmatched key to take the default")?;
    ensure(report.steps[0].branch == "DEFAULT", "Expected the default branch in the step")?;
    Ok(())
}

#[test]
fn test_padded_key_takes_default_branch() -> TestResult {
    let tree = color_tree()?;
    let mut probe = Probe::with_color(" red");
    let report = tree.execute(&mut probe)?;
    ensure(report.leaf == "l_fallback", "Expected a padded key to stay distinct from `red`")?;
    ensure(probe.ran == ["note_b"], "Expected only the fallback action to run")?;
    Ok(())
}

#[test]
fn test_empty_key_takes_default_branch() -> TestResult {
    let tree = color_tree()?;
    let mut probe = Probe::with_color("");
    let report = tree.execute(&mut probe)?;
    ensure(report.leaf == "l_fallback", "Expected an empty key to take the default")?;
    ensure(report.faults.is_empty(), "Expected no fault for an empty key")?;
    Ok(())
}

#[test]
fn test_evaluator_failure_takes_default_branch_and_records_fault() -> TestResult {
    let tree = color_tree()?;
    let mut probe = Probe::with_color("red");
    probe.fail_eval = true;
    let report = tree.execute(&mut probe)?;
    ensure(report.leaf == "l_fallback", "Expected a failing evaluator to take the default")?;
    ensure(report.faults.len() == 1, "Expected exactly one recorded fault")?;
    ensure(
        report.faults[0].node == "root" && report.faults[0].operation == "pick_color",
        "Expected the fault to name the node and evaluator",
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Fatal Routing
// ============================================================================

#[test]
fn test_unmatched_key_without_default_is_fatal() -> TestResult {
    let mut builder = TreeBuilder::new(fixtures::evaluators()?, fixtures::actions()?);
    builder.start("root", "pick_color")?;
    builder.leaf("l_red", "root", "red", &["note_a"])?;
    let tree = builder.build()?;
    let mut probe = Probe::with_color("blue");
    match tree.execute(&mut probe) {
        Err(ExecuteError::UnhandledKey {
            node,
            evaluator,
            key,
        }) => {
            ensure(node == "root", "Expected the stuck node in the error")?;
            ensure(evaluator == "pick_color", "Expected the evaluator in the error")?;
            ensure(key == "blue", "Expected the unmatched key in the error")
        }
        other => Err(format!("Expected UnhandledKey, got {other:?}").into()),
    }
}

// ============================================================================
// SECTION: Best-Effort Actions
// ============================================================================

#[test]
fn test_failing_action_does_not_stop_remaining_actions() -> TestResult {
    let tree = color_tree()?;
    let mut probe = Probe::with_color("red");
    probe.fail_action = true;
    let report = tree.execute(&mut probe)?;
    ensure(report.leaf == "l_deep", "Expected the walk to finish at the leaf")?;
    ensure(probe.ran == ["note_a", "note_b"], "Expected the surviving actions to run in order")?;
    ensure(report.faults.len() == 1, "Expected the action fault to be recorded")?;
    ensure(
        report.faults[0].node == "l_deep" && report.faults[0].operation == "flaky",
        "Expected the fault to name the leaf and action",
    )?;
    Ok(())
}

#[test]
fn test_walk_is_repeatable_on_the_same_tree() -> TestResult {
    let tree = color_tree()?;
    for _ in 0..3 {
        let mut probe = Probe::with_color("red");
        let report = tree.execute(&mut probe)?;
        ensure(report.leaf == "l_deep", "Expected identical routing on every walk")?;
    }
    Ok(())
}
