//! # quarry-adapters
//!
//! Adapters layer for Quarry: turns shorthand text into the typed values of
//! `quarry-core`.
//!
//! ## Modules
//!
//! - [`query`] - Query text adapters (the shorthand resolver)

pub mod query;
