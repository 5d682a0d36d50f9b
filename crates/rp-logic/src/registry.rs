// rp-logic/src/registry.rs
// ============================================================================
// Module: Operation Registries
// Description: Named evaluator and action registries bound at build time.
// Purpose: Resolve operation names to closures before a tree ever runs.
// Dependencies: crate::error, std::collections, std::sync
// ============================================================================

//! ## Overview
//! Trees are described with operation *names*; the closures behind those
//! names live here. A builder resolves every name against its registries
//! while the tree is constructed, so a missing operation is a build error
//! rather than a walk-time surprise. Registered closures hold their own
//! collaborators (service handles, configuration) — there is no ambient
//! lookup at execution time.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::OpError;
use crate::error::RegistryError;

// ============================================================================
// SECTION: Operation Types
// ============================================================================

/// A decision-node operation: inspects the context and returns a branch key.
///
/// An empty string means "no opinion" and routes the walk to the default
/// branch, the same as a failing evaluator.
pub type EvaluatorFn<C> = Arc<dyn Fn(&mut C) -> Result<String, OpError> + Send + Sync>;

/// A leaf-node operation: mutates the context, producing no key.
pub type ActionFn<C> = Arc<dyn Fn(&mut C) -> Result<(), OpError> + Send + Sync>;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Name-keyed registry of operations.
///
/// # Invariants
/// - Names are unique; `register` rejects duplicates.
#[derive(Clone)]
pub struct OpSet<F> {
    /// Registered operations keyed by name.
    ops: BTreeMap<String, F>,
}

/// Registry of evaluators over a context type.
pub type EvaluatorSet<C> = OpSet<EvaluatorFn<C>>;

/// Registry of actions over a context type.
pub type ActionSet<C> = OpSet<ActionFn<C>>;

impl<F> Default for OpSet<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> OpSet<F> {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ops: BTreeMap::new(),
        }
    }

    /// Registers an operation under a unique name.
    ///
    /// # Errors
    /// Returns [`RegistryError::Duplicate`] when the name is already taken.
    pub fn register(&mut self, name: impl Into<String>, op: F) -> Result<(), RegistryError> {
        let name = name.into();
        if self.ops.contains_key(&name) {
            return Err(RegistryError::Duplicate {
                name,
            });
        }
        self.ops.insert(name, op);
        Ok(())
    }

    /// Returns true when an operation with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Returns the registered operation names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }

    /// Number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true when no operations are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl<F: Clone> OpSet<F> {
    /// Looks up an operation by name, cloning the handle.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<F> {
        self.ops.get(name).cloned()
    }
}

// ============================================================================
// SECTION: Closure Registration Helpers
// ============================================================================

impl<C> EvaluatorSet<C> {
    /// Registers a plain closure as an evaluator.
    ///
    /// # Errors
    /// Returns [`RegistryError::Duplicate`] when the name is already taken.
    pub fn register_fn<E>(&mut self, name: impl Into<String>, op: E) -> Result<(), RegistryError>
    where
        E: Fn(&mut C) -> Result<String, OpError> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(op) as EvaluatorFn<C>)
    }
}

impl<C> ActionSet<C> {
    /// Registers a plain closure as an action.
    ///
    /// # Errors
    /// Returns [`RegistryError::Duplicate`] when the name is already taken.
    pub fn register_fn<A>(&mut self, name: impl Into<String>, op: A) -> Result<(), RegistryError>
    where
        A: Fn(&mut C) -> Result<(), OpError> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(op) as ActionFn<C>)
    }
}
