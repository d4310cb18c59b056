//! # quarry-common
//!
//! Foundation layer for Quarry: error types and RDF vocabulary constants.
//!
//! This crate provides the building blocks used by all other Quarry crates.
//! It has no internal dependencies and should be kept minimal.
//!
//! ## Modules
//!
//! - [`utils`] - Error handling and source spans
//! - [`vocab`] - RDF and XSD vocabulary IRIs

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod utils;
pub mod vocab;

// Re-export commonly used types at crate root
pub use utils::error::{
    Error, ParseError, ParseErrorKind, Result, SourceSpan, StructuralError,
};
