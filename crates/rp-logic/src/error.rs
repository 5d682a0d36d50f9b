// rp-logic/src/error.rs
// ============================================================================
// Module: Tree Error Definitions
// Description: Structured diagnostics for tree construction and evaluation.
// Purpose: Keep configuration mistakes fatal and walk-time faults inspectable.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Construction problems are programming or configuration errors and surface
//! as [`BuildError`] before any tree exists. At walk time only one condition
//! is fatal: an unmatched evaluator key on a node with no default branch.
//! Everything else an operation does wrong is an [`OpError`], logged and
//! carried in the walk report rather than aborting the walk.

use thiserror::Error;

// ============================================================================
// SECTION: Build Errors
// ============================================================================

/// Fatal tree construction errors.
///
/// Every variant is deterministic for a given build script; none depend on
/// runtime context state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A node was given an empty id.
    #[error("node id must not be empty")]
    EmptyId,

    /// A node id was used twice.
    #[error("node `{id}` is already defined")]
    DuplicateNode {
        /// The repeated node id.
        id: String,
    },

    /// `start` was called after the root was already defined.
    #[error("root node is already defined; cannot start again with `{id}`")]
    RootAlreadyDefined {
        /// The rejected second root id.
        id: String,
    },

    /// A child named an empty parent id.
    #[error("parent id must not be empty (while adding `{id}`)")]
    EmptyParent {
        /// The child being added.
        id: String,
    },

    /// A child referenced a parent id that does not exist yet.
    #[error("parent node `{parent_id}` is not defined (while adding `{id}`)")]
    UnknownParent {
        /// The child being added.
        id: String,
        /// The missing parent id.
        parent_id: String,
    },

    /// A child was attached to a leaf node.
    #[error("parent node `{parent_id}` is a leaf and takes no children (while adding `{id}`)")]
    LeafParent {
        /// The child being added.
        id: String,
        /// The leaf that was named as parent.
        parent_id: String,
    },

    /// Two children of the same parent claimed the same branch value.
    #[error("branch `{value}` is already taken on node `{parent_id}`")]
    DuplicateBranch {
        /// The parent whose branch table collided.
        parent_id: String,
        /// The canonical branch value that collided.
        value: String,
    },

    /// A decision node named an evaluator absent from the registry.
    #[error("no evaluator named `{name}` is registered (node `{id}`)")]
    UnknownEvaluator {
        /// The decision node being added.
        id: String,
        /// The unresolved evaluator name.
        name: String,
    },

    /// A leaf node named an action absent from the registry.
    #[error("no action named `{name}` is registered (node `{id}`)")]
    UnknownAction {
        /// The leaf node being added.
        id: String,
        /// The unresolved action name.
        name: String,
    },

    /// `build` was called before `start`.
    #[error("no root node was defined")]
    EmptyTree,

    /// A decision node ended up with no children.
    #[error("decision node `{id}` has no children")]
    ChildlessDecision {
        /// The childless decision node.
        id: String,
    },

    /// The builder was used again after producing a tree.
    #[error("builder has already produced a tree")]
    AlreadyBuilt,
}

// ============================================================================
// SECTION: Execution Errors
// ============================================================================

/// Fatal walk-time errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteError {
    /// An evaluator produced a key with no matching branch and no default.
    #[error(
        "node `{node}` (evaluator `{evaluator}`) has no branch for key `{key}` and no default"
    )]
    UnhandledKey {
        /// The decision node that could not route.
        node: String,
        /// The evaluator that produced the key.
        evaluator: String,
        /// The normalized key that matched nothing.
        key: String,
    },
}

// ============================================================================
// SECTION: Operation Errors
// ============================================================================

/// Non-fatal failures raised by evaluators and actions.
///
/// These never abort a walk: an evaluator failure routes to the default
/// branch and an action failure lets the remaining actions run. Both are
/// logged and recorded on the walk report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    /// The operation ran but could not complete its task.
    #[error("operation failed: {0}")]
    Failed(String),

    /// A collaborator the operation depends on was unavailable.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

impl OpError {
    /// Creates a failure with a custom message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Creates an unavailable-collaborator error with a custom message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

// ============================================================================
// SECTION: Registry Errors
// ============================================================================

/// Errors raised while populating an operation registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two operations were registered under the same name.
    #[error("operation `{name}` is already registered")]
    Duplicate {
        /// The colliding operation name.
        name: String,
    },
}
