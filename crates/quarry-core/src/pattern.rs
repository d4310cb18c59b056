//! Pattern tree: triple patterns, pattern elements and groups.
//!
//! A [`PatternGroup`] is one `{ }` scope holding an ordered list of
//! [`PatternElement`]s. Nested scopes (optional, minus, union branches and
//! sub-queries) own their groups outright; nothing in the tree is shared.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::expr::Expression;
use crate::path::Path;
use crate::prefix::PrefixMapping;
use crate::term::{Term, Variable};

/// A triple pattern whose predicate may be a path.
///
/// All three positions are always populated; an unbound position holds a
/// variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriplePath {
    /// Subject position.
    pub subject: Term,
    /// Predicate position.
    pub predicate: Path,
    /// Object position.
    pub object: Term,
}

impl TriplePath {
    /// Creates a triple pattern.
    pub fn new(subject: impl Into<Term>, predicate: impl Into<Path>, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// A nested `SELECT` embedded in a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubQuery {
    /// `SELECT DISTINCT` when set.
    pub distinct: bool,
    /// Projected variables; empty means `*`.
    pub projection: Vec<Variable>,
    /// The sub-query's own WHERE body.
    pub pattern: PatternGroup,
    /// Prefixes the sub-query declared. Merged into the enclosing query when
    /// attached; never rendered inside the sub-query.
    pub prefixes: PrefixMapping,
}

impl SubQuery {
    /// Creates a `SELECT *` sub-query over `pattern`.
    #[must_use]
    pub fn new(pattern: PatternGroup) -> Self {
        Self {
            distinct: false,
            projection: Vec::new(),
            pattern,
            prefixes: PrefixMapping::new(),
        }
    }
}

/// Discriminant of a [`PatternElement`], used for logging and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Triple block
    Block,
    /// `OPTIONAL`
    Optional,
    /// `UNION`
    Union,
    /// `MINUS`
    Minus,
    /// Nested `SELECT`
    SubQuery,
    /// `BIND`
    Bind,
    /// `FILTER`
    Filter,
}

impl ElementKind {
    /// Lower-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Block => "block",
            ElementKind::Optional => "optional",
            ElementKind::Union => "union",
            ElementKind::Minus => "minus",
            ElementKind::SubQuery => "subquery",
            ElementKind::Bind => "bind",
            ElementKind::Filter => "filter",
        }
    }
}

/// One element of a pattern group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternElement {
    /// Consecutive triple patterns, in insertion order.
    Block(Vec<TriplePath>),
    /// `OPTIONAL { ... }`
    Optional(PatternGroup),
    /// `{ ... } UNION { ... }`; never empty.
    Union(SmallVec<[PatternGroup; 2]>),
    /// `MINUS { ... }`
    Minus(PatternGroup),
    /// `{ SELECT ... WHERE { ... } }`
    SubQuery(Box<SubQuery>),
    /// `BIND(expression AS ?target)`; the target is always free.
    Bind {
        /// Computed value
        expression: Expression,
        /// Variable receiving the value
        target: Variable,
    },
    /// `FILTER(expression)`
    Filter(Expression),
}

impl PatternElement {
    /// Returns the element's kind.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            PatternElement::Block(_) => ElementKind::Block,
            PatternElement::Optional(_) => ElementKind::Optional,
            PatternElement::Union(_) => ElementKind::Union,
            PatternElement::Minus(_) => ElementKind::Minus,
            PatternElement::SubQuery(_) => ElementKind::SubQuery,
            PatternElement::Bind { .. } => ElementKind::Bind,
            PatternElement::Filter(_) => ElementKind::Filter,
        }
    }

    /// Whether this is a `BIND` targeting `name`.
    #[must_use]
    pub fn is_bind_of(&self, name: &str) -> bool {
        matches!(self, PatternElement::Bind { target, .. } if target.name() == name)
    }

    /// Whether this is a block with no triples.
    #[must_use]
    pub fn is_empty_block(&self) -> bool {
        matches!(self, PatternElement::Block(triples) if triples.is_empty())
    }
}

/// An ordered `{ }` scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternGroup {
    elements: Vec<PatternElement>,
}

impl PatternGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a group holding one block of `triples`.
    #[must_use]
    pub fn from_triples(triples: Vec<TriplePath>) -> Self {
        Self {
            elements: vec![PatternElement::Block(triples)],
        }
    }

    /// Returns the elements in order.
    #[must_use]
    pub fn elements(&self) -> &[PatternElement] {
        &self.elements
    }

    /// Returns the elements mutably.
    pub fn elements_mut(&mut self) -> &mut Vec<PatternElement> {
        &mut self.elements
    }

    /// Number of elements, counting empty blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the group renders as `{ }`: no elements, or only empty blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.iter().all(PatternElement::is_empty_block)
    }

    /// Appends an element.
    pub fn push(&mut self, element: PatternElement) {
        self.elements.push(element);
    }

    /// Returns the last element mutably.
    pub fn last_mut(&mut self) -> Option<&mut PatternElement> {
        self.elements.last_mut()
    }

    /// Appends a triple to the trailing block, opening a new block when the
    /// last element is anything else.
    pub fn push_triple(&mut self, triple: TriplePath) {
        if let Some(PatternElement::Block(triples)) = self.elements.last_mut() {
            triples.push(triple);
        } else {
            self.elements.push(PatternElement::Block(vec![triple]));
        }
    }

    /// Appends triples to the trailing block, in order.
    pub fn extend_triples(&mut self, triples: impl IntoIterator<Item = TriplePath>) {
        for triple in triples {
            self.push_triple(triple);
        }
    }

    /// Triples held directly by this group's blocks, in order.
    pub fn triples(&self) -> impl Iterator<Item = &TriplePath> {
        self.elements.iter().flat_map(|e| match e {
            PatternElement::Block(triples) => triples.as_slice(),
            _ => &[][..],
        })
    }
}
