// rp-logic/tests/keys.rs
// ============================================================================
// Module: Branch Key Tests
// Description: Tests for branch key normalization and the default sentinel.
// Purpose: Ensure key matching stays case-insensitive and collision-free.
// ============================================================================
//! ## Overview
//! Unit and property tests for `BranchKey::normalize`.

mod support;

use proptest::prelude::prop_assert;
use proptest::prelude::prop_assert_eq;
use proptest::prelude::prop_assume;
use proptest::proptest;
use rp_logic::BranchKey;
use rp_logic::DEFAULT_BRANCH;
use support::TestResult;
use support::ensure;

// ============================================================================
// SECTION: Unit Tests
// ============================================================================

#[test]
fn test_normalize_lowercases_but_preserves_whitespace() -> TestResult {
    ensure(
        BranchKey::normalize("  ReGiStErEd ") == BranchKey::Value("  registered ".to_owned()),
        "Expected normalization to fold casing only",
    )?;
    ensure(
        BranchKey::normalize(" a") != BranchKey::normalize("a"),
        "Expected padded and bare values to stay distinct",
    )?;
    Ok(())
}

#[test]
fn test_default_sentinel_accepts_any_casing() -> TestResult {
    for raw in ["DEFAULT", "default", "Default", "dEfAuLt"] {
        ensure(BranchKey::normalize(raw).is_default(), format!("Expected `{raw}` to be default"))?;
    }
    ensure(
        !BranchKey::normalize(" default ").is_default(),
        "Expected a padded default to stay an ordinary value",
    )?;
    Ok(())
}

#[test]
fn test_default_sentinel_renders_canonically() -> TestResult {
    ensure(
        BranchKey::Default.as_str() == DEFAULT_BRANCH,
        "Expected the sentinel to render as DEFAULT",
    )?;
    ensure(BranchKey::Default.to_string() == "DEFAULT", "Expected Display to match as_str")?;
    Ok(())
}

#[test]
fn test_ordinary_value_is_not_default() -> TestResult {
    ensure(
        !BranchKey::normalize("defaulted").is_default(),
        "Expected a near-miss value to stay ordinary",
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_normalization_is_case_insensitive(raw in "[a-zA-Z]{1,12}") {
        prop_assert_eq!(
            BranchKey::normalize(&raw),
            BranchKey::normalize(&raw.to_lowercase())
        );
    }

    #[test]
    fn prop_normalization_is_idempotent(raw in "[ -~]{0,16}") {
        let once = BranchKey::normalize(&raw);
        prop_assert_eq!(BranchKey::normalize(once.as_str()), once.clone());
    }

    #[test]
    fn prop_values_never_collide_with_the_sentinel(raw in "[a-z]{1,12}") {
        prop_assume!(raw != "default");
        prop_assert!(!BranchKey::normalize(&raw).is_default());
    }
}
