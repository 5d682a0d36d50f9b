// rp-logic/src/key.rs
// ============================================================================
// Module: Branch Key Normalization
// Description: Case-insensitive branch keys with a reserved default sentinel.
// Purpose: Give decision nodes one canonical form for branch values.
// Dependencies: std::fmt
// ============================================================================

//! ## Overview
//! Branch values written into a tree and keys returned by evaluators are
//! matched case-insensitively. The literal `DEFAULT` (any casing) is reserved
//! as the fallback sentinel and never collides with an ordinary value.

use std::fmt;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Lowercase form of the reserved default branch value.
const DEFAULT_KEYWORD: &str = "default";

/// Canonical rendering of the default sentinel in exported rules.
pub const DEFAULT_BRANCH: &str = "DEFAULT";

// ============================================================================
// SECTION: Branch Key
// ============================================================================

/// Canonical branch key for decision-node children.
///
/// # Invariants
/// - `Value` holds a lowercased string that is never the default keyword.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BranchKey {
    /// The fallback branch taken when no ordinary value matches.
    Default,
    /// An ordinary branch value in canonical (lowercase) form.
    Value(String),
}

impl BranchKey {
    /// Normalizes a raw branch value or evaluator result.
    ///
    /// Matching is case-insensitive but whitespace-preserving: only the
    /// casing is folded, so `" a"` and `"a"` stay distinct values. Any
    /// casing of `DEFAULT` maps to the sentinel.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        if lowered == DEFAULT_KEYWORD {
            Self::Default
        } else {
            Self::Value(lowered)
        }
    }

    /// Returns true for the default sentinel.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Canonical string form: the lowercased value, or [`DEFAULT_BRANCH`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => DEFAULT_BRANCH,
            Self::Value(value) => value,
        }
    }
}

impl fmt::Display for BranchKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

// Tests are in the central tests module (tests/keys.rs)
