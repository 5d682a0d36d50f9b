// rp-logic/src/rule.rs
// ============================================================================
// Module: Rule Records
// Description: Serializable description of a single tree node.
// Purpose: Carry tree shape between builders, exports, and tooling.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Rule`] is the flat, serializable form of one node: its id, where it
//! hangs off its parent, and either an evaluator name (decision) or an
//! ordered action list (leaf) — never both, never neither. Constructors
//! enforce that shape; deserialized rules are validated before use.

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Rule Record
// ============================================================================

/// Flat description of a single node in a decision tree.
///
/// # Invariants
/// - Exactly one of `evaluator` and `actions` is present.
/// - `parent_id` and `parent_value` are present together, and absent only
///   for the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique node id.
    pub id: String,
    /// Parent node id; absent for the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Branch value on the parent that leads here; absent for the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_value: Option<String>,
    /// Evaluator name for a decision node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluator: Option<String>,
    /// Ordered action names for a leaf node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
}

impl Rule {
    /// Creates the root decision rule.
    pub fn decision(id: impl Into<String>, evaluator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            parent_value: None,
            evaluator: Some(evaluator.into()),
            actions: None,
        }
    }

    /// Creates a decision rule attached under a parent branch.
    pub fn decision_under(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        parent_value: impl Into<String>,
        evaluator: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(parent_id.into()),
            parent_value: Some(parent_value.into()),
            evaluator: Some(evaluator.into()),
            actions: None,
        }
    }

    /// Creates a leaf rule attached under a parent branch.
    pub fn leaf_under(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        parent_value: impl Into<String>,
        actions: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(parent_id.into()),
            parent_value: Some(parent_value.into()),
            evaluator: None,
            actions: Some(actions),
        }
    }

    /// Returns true when this rule describes a leaf node.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.actions.is_some()
    }

    /// Returns true when this rule describes the root node.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
