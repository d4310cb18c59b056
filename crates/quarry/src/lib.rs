//! # Quarry
//!
//! A programmatic builder for SPARQL WHERE clauses.
//!
//! Start with [`SelectBuilder`] for a full query or [`PatternBuilder`] for a
//! bare pattern. Arguments may be typed values or SPARQL-like shorthand
//! strings such as `"<one>"`, `"ts:two"`, `"?v"` or `"?one < 10"`.
//!
//! Variables stay resolvable after the pattern is built: `set_var` replaces
//! every slot of a variable with a value, and `unset_var` frees it again.
//!
//! ```rust
//! use quarry::{Config, SelectBuilder};
//!
//! let mut query = SelectBuilder::with_config(Config::compact());
//! query
//!     .add_prefix("ts", "urn:test:")
//!     .add_where("ts:one", "ts:two", "?v")?
//!     .add_filter("?v != <four>")?;
//!
//! query.set_var("?v", "<three>")?;
//! assert_eq!(
//!     query.build_string(),
//!     "PREFIX ts: <urn:test:> SELECT * WHERE { <urn:test:one> <urn:test:two> <three> . FILTER(<three> != <four>) }"
//! );
//!
//! query.unset_var("?v")?;
//! assert!(query.build_string().contains("<urn:test:two> ?v ."));
//! # Ok::<(), quarry::Error>(())
//! ```

// Builders and their configuration
pub use quarry_engine::{
    Attachment, Config, IntoExpression, IntoPath, IntoPattern, IntoTerm, IntoVariable,
    PatternBuilder, Query, SelectBuilder,
};

// Pattern model - you'll need these for typed arguments and inspection
pub use quarry_core::{
    BinaryOp, BlankNode, ElementKind, Expression, Function, Iri, Literal, Path, PatternElement,
    PatternGroup, PrefixMapping, RenderConfig, SubQuery, Term, TriplePath, UnaryOp, Variable,
};

pub use quarry_common::{Error, ParseError, ParseErrorKind, Result, StructuralError, vocab};

/// Shorthand resolver, for turning strings into typed values directly.
pub mod shorthand {
    pub use quarry_adapters::query::{
        resolve_expression, resolve_path, resolve_term, resolve_variable,
    };
}
