// rp-logic/src/tree.rs
// ============================================================================
// Module: Decision Tree Runtime
// Description: Frozen decision/action trees and their walk semantics.
// Purpose: Route a mutable context from the root to exactly one leaf.
// Dependencies: crate::{error, key, registry, rule}, serde, tracing
// ============================================================================

//! ## Overview
//! A [`Tree`] is immutable once built. A walk starts at the root decision
//! node, asks each evaluator for a branch key, and follows matching branches
//! until it reaches a leaf, whose actions then run in order. Faulting
//! operations do not abort the walk: a failing evaluator routes to the
//! default branch and a failing action yields to the next one. Every fault
//! is logged and recorded on the returned [`WalkReport`].

use serde::Serialize;

use crate::error::ExecuteError;
use crate::key::BranchKey;
use crate::registry::ActionFn;
use crate::registry::EvaluatorFn;
use crate::rule::Rule;

// ============================================================================
// SECTION: Node Storage
// ============================================================================

/// Index of a node within the tree arena.
pub(crate) type NodeIndex = usize;

/// Payload of a single stored node.
pub(crate) enum NodeKind<C> {
    /// A routing node holding an evaluator and its branch table.
    Decision {
        /// Registered name of the evaluator, kept for diagnostics and export.
        evaluator_name: String,
        /// The resolved evaluator operation.
        evaluator: EvaluatorFn<C>,
        /// Branch table in insertion order.
        children: Vec<(BranchKey, NodeIndex)>,
    },
    /// A terminal node holding an ordered action list.
    Leaf {
        /// Resolved actions paired with their registered names.
        actions: Vec<(String, ActionFn<C>)>,
    },
}

/// A stored node: identity, attachment point, and payload.
pub(crate) struct NodeData<C> {
    /// Unique node id.
    pub(crate) id: String,
    /// Parent index and the branch leading here; `None` for the root.
    pub(crate) parent: Option<(NodeIndex, BranchKey)>,
    /// Decision or leaf payload.
    pub(crate) kind: NodeKind<C>,
}

// ============================================================================
// SECTION: Walk Report
// ============================================================================

/// One routing step taken during a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkStep {
    /// Decision node that routed.
    pub node: String,
    /// Canonical branch key that was followed.
    pub branch: String,
}

/// A swallowed operation failure observed during a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkFault {
    /// Node on which the operation ran.
    pub node: String,
    /// Registered name of the faulting operation.
    pub operation: String,
    /// Rendered error message.
    pub error: String,
}

/// Outcome of a completed walk.
///
/// Faults are best-effort failures the walk absorbed; callers that need
/// stricter semantics can inspect them after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkReport {
    /// Routing steps from the root, in order.
    pub steps: Vec<WalkStep>,
    /// Id of the leaf the walk ended on.
    pub leaf: String,
    /// Operation failures absorbed along the way.
    pub faults: Vec<WalkFault>,
}

// ============================================================================
// SECTION: Tree
// ============================================================================

/// A frozen decision/action tree over a context type `C`.
///
/// # Invariants
/// - The arena is non-empty and `root` indexes into it.
/// - Every decision node has at least one child.
/// - Child indices always point at later-constructed nodes in the arena.
pub struct Tree<C> {
    /// Node arena; the builder guarantees index validity.
    nodes: Vec<NodeData<C>>,
    /// Index of the root node.
    root: NodeIndex,
}

impl<C> Tree<C> {
    /// Assembles a tree from builder output. Validation happens in the
    /// builder; this is a plain move.
    pub(crate) const fn from_parts(nodes: Vec<NodeData<C>>, root: NodeIndex) -> Self {
        Self {
            nodes,
            root,
        }
    }

    /// Id of the root node.
    #[must_use]
    pub fn root_id(&self) -> &str {
        &self.nodes[self.root].id
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true when the tree holds no nodes. Built trees never do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walks the tree from the root, mutating the context along the way.
    ///
    /// Evaluator failures and empty keys route to the default branch; action
    /// failures let the remaining actions run. Both are recorded as faults.
    ///
    /// # Errors
    /// Returns [`ExecuteError::UnhandledKey`] when a key matches no branch
    /// and the node has no default child.
    pub fn execute(&self, ctx: &mut C) -> Result<WalkReport, ExecuteError> {
        let mut steps = Vec::new();
        let mut faults = Vec::new();
        let mut current = self.root;
        loop {
            let node = &self.nodes[current];
            match &node.kind {
                NodeKind::Decision {
                    evaluator_name,
                    evaluator,
                    children,
                } => {
                    let key = match evaluator(ctx) {
                        Ok(key) => key,
                        Err(err) => {
                            tracing::warn!(
                                node = %node.id,
                                evaluator = %evaluator_name,
                                error = %err,
                                "evaluator failed; taking default branch"
                            );
                            faults.push(WalkFault {
                                node: node.id.clone(),
                                operation: evaluator_name.clone(),
                                error: err.to_string(),
                            });
                            String::new()
                        }
                    };
                    let Some((branch, next)) = Self::select_child(children, &key) else {
                        return Err(ExecuteError::UnhandledKey {
                            node: node.id.clone(),
                            evaluator: evaluator_name.clone(),
                            key: key.to_lowercase(),
                        });
                    };
                    steps.push(WalkStep {
                        node: node.id.clone(),
                        branch: branch.as_str().to_owned(),
                    });
                    current = next;
                }
                NodeKind::Leaf {
                    actions,
                } => {
                    for (name, action) in actions {
                        if let Err(err) = action(ctx) {
                            tracing::warn!(
                                node = %node.id,
                                action = %name,
                                error = %err,
                                "action failed; continuing with remaining actions"
                            );
                            faults.push(WalkFault {
                                node: node.id.clone(),
                                operation: name.clone(),
                                error: err.to_string(),
                            });
                        }
                    }
                    return Ok(WalkReport {
                        steps,
                        leaf: node.id.clone(),
                        faults,
                    });
                }
            }
        }
    }

    /// Resolves a raw evaluator key against a branch table.
    ///
    /// An empty key goes straight to the default child. A non-empty key is
    /// normalized and matched exactly; on a miss the default child is used.
    fn select_child<'tree>(
        children: &'tree [(BranchKey, NodeIndex)],
        raw_key: &str,
    ) -> Option<(&'tree BranchKey, NodeIndex)> {
        let lookup = |wanted: &BranchKey| {
            children.iter().find(|(key, _)| key == wanted).map(|(key, index)| (key, *index))
        };
        if !raw_key.is_empty() {
            let normalized = BranchKey::normalize(raw_key);
            if let Some(found) = lookup(&normalized) {
                return Some(found);
            }
        }
        lookup(&BranchKey::Default)
    }

    /// Exports the tree as a pre-order rule list.
    ///
    /// Children appear in insertion order, so the export is deterministic
    /// for a given build script. The default sentinel exports as `DEFAULT`.
    #[must_use]
    pub fn rules(&self) -> Vec<Rule> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.append_rules(self.root, &mut out);
        out
    }

    /// Appends this node's rule, then its children's, pre-order.
    fn append_rules(&self, index: NodeIndex, out: &mut Vec<Rule>) {
        let node = &self.nodes[index];
        let rule = match (&node.kind, &node.parent) {
            (
                NodeKind::Decision {
                    evaluator_name, ..
                },
                None,
            ) => Rule::decision(&node.id, evaluator_name),
            (
                NodeKind::Decision {
                    evaluator_name, ..
                },
                Some((parent, branch)),
            ) => Rule::decision_under(
                &node.id,
                &self.nodes[*parent].id,
                branch.as_str(),
                evaluator_name,
            ),
            (
                NodeKind::Leaf {
                    actions,
                },
                Some((parent, branch)),
            ) => Rule::leaf_under(
                &node.id,
                &self.nodes[*parent].id,
                branch.as_str(),
                actions.iter().map(|(name, _)| name.clone()).collect(),
            ),
            // A leaf root cannot be built; export it as an orphan leaf so
            // the rule list stays total if that ever changes.
            (
                NodeKind::Leaf {
                    actions,
                },
                None,
            ) => Rule {
                id: node.id.clone(),
                parent_id: None,
                parent_value: None,
                evaluator: None,
                actions: Some(actions.iter().map(|(name, _)| name.clone()).collect()),
            },
        };
        out.push(rule);
        if let NodeKind::Decision {
            children, ..
        } = &node.kind
        {
            for (_, child) in children {
                self.append_rules(*child, out);
            }
        }
    }
}
