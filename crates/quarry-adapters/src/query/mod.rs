//! Query text adapters.
//!
//! - [`shorthand`] - Terms, paths, expressions and variables written as
//!   SPARQL-like shorthand

pub mod shorthand;

pub use shorthand::{resolve_expression, resolve_path, resolve_term, resolve_variable};
