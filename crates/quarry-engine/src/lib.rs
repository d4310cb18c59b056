//! # quarry-engine
//!
//! The builders of Quarry: WHERE clause and `SELECT` query construction
//! with late variable substitution.
//!
//! ## Modules
//!
//! - [`builder`] - `PatternBuilder` and `SelectBuilder`
//! - [`args`] - Argument conversions accepted by builder methods
//! - [`config`] - Configuration options
//! - [`query`] - Built queries

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod args;
pub mod builder;
pub mod config;
pub mod query;

pub use args::{Attachment, IntoExpression, IntoPath, IntoPattern, IntoTerm, IntoVariable};
pub use builder::{PatternBuilder, SelectBuilder};
pub use config::Config;
pub use query::Query;
