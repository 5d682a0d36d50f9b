// rp-logic/src/builder.rs
// ============================================================================
// Module: Tree Builder
// Description: Single-use, validated construction of decision/action trees.
// Purpose: Make every tree misconfiguration a deterministic build error.
// Dependencies: crate::{error, key, registry, tree}, std::collections
// ============================================================================

//! ## Overview
//! A [`TreeBuilder`] is created over an evaluator registry and an action
//! registry, seeded with `start`, grown with `decision` and `leaf`, and
//! consumed by `build`. All structural mistakes — duplicate ids, unknown
//! parents, colliding branch values, unresolved operation names — fail at
//! the call that introduces them. `build` runs a final walk of the tree and
//! marks the builder spent; a spent builder rejects every further call.

use std::collections::BTreeMap;

use crate::error::BuildError;
use crate::key::BranchKey;
use crate::registry::ActionSet;
use crate::registry::EvaluatorSet;
use crate::tree::NodeData;
use crate::tree::NodeIndex;
use crate::tree::NodeKind;
use crate::tree::Tree;

// ============================================================================
// SECTION: Tree Builder
// ============================================================================

/// Single-use builder for [`Tree`] values.
///
/// # Invariants
/// - Every stored node's parent index refers to an earlier node.
/// - Once `build` succeeds or the builder is marked spent, no mutator runs.
pub struct TreeBuilder<C> {
    /// Evaluator registry used to resolve decision-node names.
    evaluators: EvaluatorSet<C>,
    /// Action registry used to resolve leaf-node names.
    actions: ActionSet<C>,
    /// Nodes in creation order.
    nodes: Vec<NodeData<C>>,
    /// Node id to arena index lookup.
    index: BTreeMap<String, NodeIndex>,
    /// Root index, set by `start`.
    root: Option<NodeIndex>,
    /// Set once `build` has produced a tree.
    built: bool,
}

impl<C> TreeBuilder<C> {
    /// Creates a builder over the given operation registries.
    #[must_use]
    pub const fn new(evaluators: EvaluatorSet<C>, actions: ActionSet<C>) -> Self {
        Self {
            evaluators,
            actions,
            nodes: Vec::new(),
            index: BTreeMap::new(),
            root: None,
            built: false,
        }
    }

    /// Creates the root decision node.
    ///
    /// # Errors
    /// Fails when the builder is spent, a root already exists, the id is
    /// empty or taken, or the evaluator name is unregistered.
    pub fn start(
        &mut self,
        id: impl Into<String>,
        evaluator: &str,
    ) -> Result<&mut Self, BuildError> {
        self.ensure_unspent()?;
        let id = id.into();
        if self.root.is_some() {
            return Err(BuildError::RootAlreadyDefined {
                id,
            });
        }
        self.ensure_fresh_id(&id)?;
        let evaluator_op = self.resolve_evaluator(&id, evaluator)?;
        let index = self.push_node(NodeData {
            id,
            parent: None,
            kind: NodeKind::Decision {
                evaluator_name: evaluator.to_owned(),
                evaluator: evaluator_op,
                children: Vec::new(),
            },
        });
        self.root = Some(index);
        Ok(self)
    }

    /// Adds a decision node under `parent_id` on branch `parent_value`.
    ///
    /// # Errors
    /// Fails when the builder is spent, the id is empty or taken, the parent
    /// is empty, missing, or a leaf, the branch value collides, or the
    /// evaluator name is unregistered.
    pub fn decision(
        &mut self,
        id: impl Into<String>,
        parent_id: &str,
        parent_value: &str,
        evaluator: &str,
    ) -> Result<&mut Self, BuildError> {
        self.ensure_unspent()?;
        let id = id.into();
        self.ensure_fresh_id(&id)?;
        let (parent, branch) = self.claim_branch(&id, parent_id, parent_value)?;
        let evaluator_op = self.resolve_evaluator(&id, evaluator)?;
        let index = self.push_node(NodeData {
            id,
            parent: Some((parent, branch.clone())),
            kind: NodeKind::Decision {
                evaluator_name: evaluator.to_owned(),
                evaluator: evaluator_op,
                children: Vec::new(),
            },
        });
        self.attach(parent, branch, index);
        Ok(self)
    }

    /// Adds a leaf node under `parent_id` on branch `parent_value`.
    ///
    /// Actions run in the order given here.
    ///
    /// # Errors
    /// Fails when the builder is spent, the id is empty or taken, the parent
    /// is empty, missing, or a leaf, the branch value collides, or any
    /// action name is unregistered.
    pub fn leaf(
        &mut self,
        id: impl Into<String>,
        parent_id: &str,
        parent_value: &str,
        action_names: &[&str],
    ) -> Result<&mut Self, BuildError> {
        self.ensure_unspent()?;
        let id = id.into();
        self.ensure_fresh_id(&id)?;
        let (parent, branch) = self.claim_branch(&id, parent_id, parent_value)?;
        let mut actions = Vec::with_capacity(action_names.len());
        for name in action_names {
            let op = self.actions.get(name).ok_or_else(|| BuildError::UnknownAction {
                id: id.clone(),
                name: (*name).to_owned(),
            })?;
            actions.push(((*name).to_owned(), op));
        }
        let index = self.push_node(NodeData {
            id,
            parent: Some((parent, branch.clone())),
            kind: NodeKind::Leaf {
                actions,
            },
        });
        self.attach(parent, branch, index);
        Ok(self)
    }

    /// Validates the assembled tree and freezes it.
    ///
    /// The builder is spent afterwards whether or not validation passed.
    ///
    /// # Errors
    /// Returns [`BuildError::AlreadyBuilt`] on reuse, [`BuildError::EmptyTree`]
    /// without a root, and [`BuildError::ChildlessDecision`] when a decision
    /// node has no children.
    pub fn build(&mut self) -> Result<Tree<C>, BuildError> {
        self.ensure_unspent()?;
        self.built = true;
        let root = self.root.ok_or(BuildError::EmptyTree)?;
        for node in &self.nodes {
            if let NodeKind::Decision {
                children, ..
            } = &node.kind
                && children.is_empty()
            {
                return Err(BuildError::ChildlessDecision {
                    id: node.id.clone(),
                });
            }
        }
        let nodes = std::mem::take(&mut self.nodes);
        Ok(Tree::from_parts(nodes, root))
    }

    // ========================================================================
    // SECTION: Internal Checks
    // ========================================================================

    /// Rejects any call on a spent builder.
    const fn ensure_unspent(&self) -> Result<(), BuildError> {
        if self.built {
            return Err(BuildError::AlreadyBuilt);
        }
        Ok(())
    }

    /// Rejects empty and reused node ids.
    fn ensure_fresh_id(&self, id: &str) -> Result<(), BuildError> {
        if id.is_empty() {
            return Err(BuildError::EmptyId);
        }
        if self.index.contains_key(id) {
            return Err(BuildError::DuplicateNode {
                id: id.to_owned(),
            });
        }
        Ok(())
    }

    /// Resolves an evaluator name, naming the node on failure.
    fn resolve_evaluator(
        &self,
        id: &str,
        name: &str,
    ) -> Result<crate::registry::EvaluatorFn<C>, BuildError> {
        self.evaluators.get(name).ok_or_else(|| BuildError::UnknownEvaluator {
            id: id.to_owned(),
            name: name.to_owned(),
        })
    }

    /// Validates the parent reference and branch value for a new child.
    ///
    /// Returns the parent index and the normalized branch key; the caller
    /// attaches the child after the node is stored.
    fn claim_branch(
        &self,
        id: &str,
        parent_id: &str,
        parent_value: &str,
    ) -> Result<(NodeIndex, BranchKey), BuildError> {
        if parent_id.is_empty() {
            return Err(BuildError::EmptyParent {
                id: id.to_owned(),
            });
        }
        let Some(parent) = self.index.get(parent_id).copied() else {
            return Err(BuildError::UnknownParent {
                id: id.to_owned(),
                parent_id: parent_id.to_owned(),
            });
        };
        let branch = BranchKey::normalize(parent_value);
        match &self.nodes[parent].kind {
            NodeKind::Leaf {
                ..
            } => Err(BuildError::LeafParent {
                id: id.to_owned(),
                parent_id: parent_id.to_owned(),
            }),
            NodeKind::Decision {
                children, ..
            } => {
                if children.iter().any(|(key, _)| *key == branch) {
                    return Err(BuildError::DuplicateBranch {
                        parent_id: parent_id.to_owned(),
                        value: branch.as_str().to_owned(),
                    });
                }
                Ok((parent, branch))
            }
        }
    }

    /// Stores a node and indexes its id.
    fn push_node(&mut self, node: NodeData<C>) -> NodeIndex {
        let index = self.nodes.len();
        self.index.insert(node.id.clone(), index);
        self.nodes.push(node);
        index
    }

    /// Records a child in its parent's branch table.
    fn attach(&mut self, parent: NodeIndex, branch: BranchKey, child: NodeIndex) {
        if let NodeKind::Decision {
            children, ..
        } = &mut self.nodes[parent].kind
        {
            children.push((branch, child));
        }
    }
}
