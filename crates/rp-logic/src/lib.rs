// rp-logic/src/lib.rs
// ============================================================================
// Module: RP Logic Root
// Description: Public API surface for the decision/action tree engine.
// Purpose: Wire together keys, registries, rules, trees, and the builder.
// Dependencies: crate::{builder, error, key, registry, rule, tree}
// ============================================================================

//! ## Overview
//! A small, context-generic decision engine: named evaluators route a
//! mutable context through decision nodes, leaves run ordered actions, and
//! the whole shape is buildable once, walkable many times, and exportable
//! as a flat rule list. Domain crates supply the context type and the
//! operation registries; this crate owns construction validation and walk
//! semantics.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod builder;
pub mod error;
pub mod key;
pub mod registry;
pub mod rule;
pub mod tree;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use builder::TreeBuilder;
pub use error::BuildError;
pub use error::ExecuteError;
pub use error::OpError;
pub use error::RegistryError;
pub use key::BranchKey;
pub use key::DEFAULT_BRANCH;
pub use registry::ActionFn;
pub use registry::ActionSet;
pub use registry::EvaluatorFn;
pub use registry::EvaluatorSet;
pub use registry::OpSet;
pub use rule::Rule;
pub use tree::Tree;
pub use tree::WalkFault;
pub use tree::WalkReport;
pub use tree::WalkStep;
