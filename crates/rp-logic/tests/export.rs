// rp-logic/tests/export.rs
// ============================================================================
// Module: Export Tests
// Description: Tests for the pre-order rule export and rule serialization.
// Purpose: Ensure the exported rule list is deterministic and faithful.
// ============================================================================
//! ## Overview
//! Integration tests covering `Tree::rules` ordering and the serialized
//! shape of individual rule records.

#[path = "support/fixtures.rs"]
mod fixtures;
mod support;

use rp_logic::Rule;
use rp_logic::TreeBuilder;
use support::TestResult;
use support::ensure;

// ============================================================================
// SECTION: Pre-Order Export
// ============================================================================

#[test]
fn test_rules_export_in_pre_order() -> TestResult {
    let mut builder = TreeBuilder::new(fixtures::evaluators()?, fixtures::actions()?);
    builder.start("root", "pick_color")?;
    builder.decision("n_red", "root", "red", "always_red")?;
    builder.leaf("l_deep", "n_red", "red", &["note_a", "note_b"])?;
    builder.leaf("l_fallback", "root", "DEFAULT", &["note_b"])?;
    let tree = builder.build()?;

    let rules = tree.rules();
    let ids: Vec<&str> = rules.iter().map(|rule| rule.id.as_str()).collect();
    ensure(
        ids == ["root", "n_red", "l_deep", "l_fallback"],
        "Expected pre-order export with children in insertion order",
    )?;
    Ok(())
}

#[test]
fn test_exported_rules_carry_parent_and_payload() -> TestResult {
    let mut builder = TreeBuilder::new(fixtures::evaluators()?, fixtures::actions()?);
    builder.start("root", "pick_color")?;
    builder.leaf("l_red", "root", "Red", &["note_a"])?;
    builder.leaf("l_other", "root", "default", &["note_a", "note_b"])?;
    let tree = builder.build()?;

    let rules = tree.rules();
    ensure(rules.len() == 3, "Expected one rule per node")?;

    let root = &rules[0];
    ensure(root.is_root(), "Expected the first rule to be the root")?;
    ensure(root.evaluator.as_deref() == Some("pick_color"), "Expected the root evaluator name")?;

    let red = &rules[1];
    ensure(red.parent_id.as_deref() == Some("root"), "Expected the leaf to name its parent")?;
    ensure(red.parent_value.as_deref() == Some("red"), "Expected the canonical branch value")?;
    ensure(red.actions.as_deref() == Some(&["note_a".to_owned()][..]), "Expected the action list")?;

    let other = &rules[2];
    ensure(
        other.parent_value.as_deref() == Some("DEFAULT"),
        "Expected the default sentinel to export as DEFAULT",
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Rule Serialization
// ============================================================================

#[test]
fn test_root_rule_serializes_without_parent_fields() -> TestResult {
    let rule = Rule::decision("root", "pick_color");
    let json = serde_json::to_value(&rule)?;
    ensure(json.get("parent_id").is_none(), "Expected no parent_id on a root rule")?;
    ensure(json.get("actions").is_none(), "Expected no actions on a decision rule")?;
    ensure(
        json.get("evaluator").and_then(serde_json::Value::as_str) == Some("pick_color"),
        "Expected the evaluator name in the serialized rule",
    )?;
    Ok(())
}

#[test]
fn test_rule_round_trips_through_json() -> TestResult {
    let rule = Rule::leaf_under("l", "root", "red", vec!["note_a".to_owned()]);
    let json = serde_json::to_string(&rule)?;
    let back: Rule = serde_json::from_str(&json)?;
    ensure(back == rule, "Expected the rule to survive a JSON round trip")?;
    ensure(back.is_leaf(), "Expected the deserialized rule to stay a leaf")?;
    Ok(())
}
