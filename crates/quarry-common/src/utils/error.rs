//! Error types for Quarry.
//!
//! Every failure is a programmer-input error raised synchronously by the
//! offending call: either a shorthand token could not be parsed
//! ([`ParseError`]) or a builder call would produce an invalid pattern tree
//! ([`StructuralError`]).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout Quarry.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A shorthand token was malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A builder call would violate a structural invariant.
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

impl Error {
    /// Returns the parse error, if this is one.
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Structural(_) => None,
        }
    }

    /// Returns the structural error, if this is one.
    pub fn as_structural(&self) -> Option<&StructuralError> {
        match self {
            Error::Structural(e) => Some(e),
            Error::Parse(_) => None,
        }
    }
}

/// A byte range inside a shorthand token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl SourceSpan {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates an empty span at `offset`.
    #[must_use]
    pub const fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns this span moved `by` bytes to the right.
    #[must_use]
    pub const fn offset(self, by: usize) -> Self {
        Self {
            start: self.start + by,
            end: self.end + by,
        }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// The category of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A prefixed name used a prefix with no registered namespace.
    UnknownPrefix,
    /// An `<...>` IRI was not terminated or contained illegal characters.
    MalformedIri,
    /// A quoted literal was not terminated or had a bad suffix.
    MalformedLiteral,
    /// A `?name` / `$name` form had no valid name.
    MalformedVariable,
    /// A property path could not be parsed.
    MalformedPath,
    /// A path used an operator other than `/` sequencing.
    UnsupportedPath,
    /// An expression could not be parsed.
    MalformedExpression,
    /// A token appeared where it is not allowed.
    UnexpectedToken,
    /// Input ended early.
    UnexpectedEnd,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseErrorKind::UnknownPrefix => "unknown prefix",
            ParseErrorKind::MalformedIri => "malformed IRI",
            ParseErrorKind::MalformedLiteral => "malformed literal",
            ParseErrorKind::MalformedVariable => "malformed variable",
            ParseErrorKind::MalformedPath => "malformed path",
            ParseErrorKind::UnsupportedPath => "unsupported path",
            ParseErrorKind::MalformedExpression => "malformed expression",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEnd => "unexpected end of input",
        };
        f.write_str(s)
    }
}

/// A malformed shorthand token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {span} in `{token}`: {message}")]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Human-readable detail.
    pub message: String,
    /// Location inside the token.
    pub span: SourceSpan,
    /// The full offending token.
    pub token: String,
}

impl ParseError {
    /// Creates a new parse error with an empty span and token.
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: SourceSpan::default(),
            token: String::new(),
        }
    }

    /// Attaches the location inside the token.
    #[must_use]
    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = span;
        self
    }

    /// Attaches the offending token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Re-anchors an error raised on `token[lead..]` to the whole `token`.
    #[must_use]
    pub fn within(mut self, token: &str, lead: usize) -> Self {
        self.span = self.span.offset(lead);
        self.token = token.to_string();
        self
    }
}

/// A builder call that would produce an invalid pattern tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// `BIND` targets a variable that already has a value.
    #[error("cannot bind ?{name}: it is already resolved to {value}")]
    BindTargetResolved {
        /// Variable name.
        name: String,
        /// The value it currently resolves to.
        value: String,
    },

    /// An RDF list must contain at least one term.
    #[error("a list requires at least one term")]
    EmptyList,

    /// No blank node label unique within the query could be allocated.
    #[error("no blank node label unique within the query after {attempts} attempts")]
    BlankNodeCollision {
        /// How many candidate labels were tried.
        attempts: usize,
    },

    /// A variable was required but something else was given.
    #[error("expected a variable, found {found}")]
    NotAVariable {
        /// Rendering of what was found.
        found: String,
    },
}
