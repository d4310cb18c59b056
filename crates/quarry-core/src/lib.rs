//! # quarry-core
//!
//! Core layer for Quarry: the pattern tree model and the passes that run
//! over it.
//!
//! This crate depends only on `quarry-common`.
//!
//! ## Modules
//!
//! - [`term`] - RDF terms (IRIs, literals, variables, blank nodes)
//! - [`path`] - Predicate paths (single predicates and `/` sequences)
//! - [`expr`] - Filter and bind expressions
//! - [`pattern`] - Triple patterns, pattern elements and groups
//! - [`prefix`] - Prefix-to-namespace mapping
//! - [`visit`] - Read-only traversal of the pattern tree
//! - [`substitute`] - Variable substitution and bind collapse
//! - [`bnode`] - Collision-free blank node allocation
//! - [`list`] - RDF list expansion
//! - [`render`] - SPARQL text rendering

pub mod bnode;
pub mod expr;
pub mod list;
pub mod path;
pub mod pattern;
pub mod prefix;
pub mod render;
pub mod substitute;
pub mod term;
pub mod visit;

#[cfg(any(test, feature = "testing"))]
pub mod oracle;

// Re-export commonly used types
pub use bnode::{BlankNodeAllocator, Relabel};
pub use expr::{BinaryOp, Expression, Function, UnaryOp};
pub use list::{ListChain, expand_list};
pub use path::Path;
pub use pattern::{ElementKind, PatternElement, PatternGroup, SubQuery, TriplePath};
pub use prefix::PrefixMapping;
pub use render::{RenderConfig, Renderer};
pub use substitute::{Materialize, Substitute, SubstitutionStats};
pub use term::{BlankNode, Iri, Literal, Term, Variable};
