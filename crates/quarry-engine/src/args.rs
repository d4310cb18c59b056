//! Argument conversions for builder methods.
//!
//! Every builder method takes its arguments through one of these traits, so
//! shorthand strings and typed values can be mixed freely:
//!
//! ```ignore
//! builder.add_where("<one>", Iri::new("two"), "?v")?;
//! ```
//!
//! String arguments are resolved by the shorthand resolver against the
//! builder's prefix mapping.

use quarry_adapters::query::{resolve_expression, resolve_path, resolve_term, resolve_variable};
use quarry_common::{Result, StructuralError};
use quarry_core::{
    BlankNode, Expression, Iri, Literal, Path, PatternGroup, PrefixMapping, SubQuery, Term,
    TriplePath, Variable,
};

use crate::builder::{PatternBuilder, SelectBuilder};

/// Values usable in subject and object position.
pub trait IntoTerm {
    /// Resolves `self` against `prefixes`.
    fn into_term(self, prefixes: &PrefixMapping) -> Result<Term>;
}

impl IntoTerm for &str {
    fn into_term(self, prefixes: &PrefixMapping) -> Result<Term> {
        Ok(resolve_term(self, prefixes)?)
    }
}

impl IntoTerm for String {
    fn into_term(self, prefixes: &PrefixMapping) -> Result<Term> {
        self.as_str().into_term(prefixes)
    }
}

impl IntoTerm for &String {
    fn into_term(self, prefixes: &PrefixMapping) -> Result<Term> {
        self.as_str().into_term(prefixes)
    }
}

impl IntoTerm for Term {
    fn into_term(self, _prefixes: &PrefixMapping) -> Result<Term> {
        Ok(self)
    }
}

impl IntoTerm for &Term {
    fn into_term(self, _prefixes: &PrefixMapping) -> Result<Term> {
        Ok(self.clone())
    }
}

macro_rules! into_term_via_from {
    ($($ty:ty),*) => {
        $(
            impl IntoTerm for $ty {
                fn into_term(self, _prefixes: &PrefixMapping) -> Result<Term> {
                    Ok(Term::from(self))
                }
            }
        )*
    };
}

into_term_via_from!(Iri, Literal, Variable, BlankNode);

impl IntoTerm for i64 {
    fn into_term(self, _prefixes: &PrefixMapping) -> Result<Term> {
        Ok(Term::Literal(Literal::integer(self)))
    }
}

impl IntoTerm for i32 {
    fn into_term(self, _prefixes: &PrefixMapping) -> Result<Term> {
        Ok(Term::Literal(Literal::integer(i64::from(self))))
    }
}

impl IntoTerm for bool {
    fn into_term(self, _prefixes: &PrefixMapping) -> Result<Term> {
        Ok(Term::Literal(Literal::boolean(self)))
    }
}

/// Values usable in predicate position.
pub trait IntoPath {
    /// Resolves `self` against `prefixes`.
    fn into_path(self, prefixes: &PrefixMapping) -> Result<Path>;
}

impl IntoPath for &str {
    fn into_path(self, prefixes: &PrefixMapping) -> Result<Path> {
        Ok(resolve_path(self, prefixes)?)
    }
}

impl IntoPath for String {
    fn into_path(self, prefixes: &PrefixMapping) -> Result<Path> {
        self.as_str().into_path(prefixes)
    }
}

impl IntoPath for Path {
    fn into_path(self, _prefixes: &PrefixMapping) -> Result<Path> {
        Ok(self)
    }
}

impl IntoPath for Iri {
    fn into_path(self, _prefixes: &PrefixMapping) -> Result<Path> {
        Ok(Path::from(self))
    }
}

impl IntoPath for Variable {
    fn into_path(self, _prefixes: &PrefixMapping) -> Result<Path> {
        Ok(Path::from(self))
    }
}

impl IntoPath for Term {
    fn into_path(self, _prefixes: &PrefixMapping) -> Result<Path> {
        Ok(Path::from(self))
    }
}

/// Values usable as `FILTER` and `BIND` expressions.
pub trait IntoExpression {
    /// Resolves `self` against `prefixes`.
    fn into_expression(self, prefixes: &PrefixMapping) -> Result<Expression>;
}

impl IntoExpression for &str {
    fn into_expression(self, prefixes: &PrefixMapping) -> Result<Expression> {
        Ok(resolve_expression(self, prefixes)?)
    }
}

impl IntoExpression for String {
    fn into_expression(self, prefixes: &PrefixMapping) -> Result<Expression> {
        self.as_str().into_expression(prefixes)
    }
}

impl IntoExpression for Expression {
    fn into_expression(self, _prefixes: &PrefixMapping) -> Result<Expression> {
        Ok(self)
    }
}

impl IntoExpression for Term {
    fn into_expression(self, _prefixes: &PrefixMapping) -> Result<Expression> {
        Ok(Expression::Term(self))
    }
}

impl IntoExpression for Variable {
    fn into_expression(self, _prefixes: &PrefixMapping) -> Result<Expression> {
        Ok(Expression::Term(Term::Variable(self)))
    }
}

/// Values naming a variable.
pub trait IntoVariable {
    /// Converts `self` to a free variable.
    fn into_variable(self) -> Result<Variable>;
}

impl IntoVariable for &str {
    fn into_variable(self) -> Result<Variable> {
        Ok(resolve_variable(self)?)
    }
}

impl IntoVariable for String {
    fn into_variable(self) -> Result<Variable> {
        self.as_str().into_variable()
    }
}

impl IntoVariable for Variable {
    fn into_variable(self) -> Result<Variable> {
        Ok(self.unbound())
    }
}

impl IntoVariable for &Variable {
    fn into_variable(self) -> Result<Variable> {
        Ok(self.unbound())
    }
}

impl IntoVariable for Term {
    fn into_variable(self) -> Result<Variable> {
        match self {
            Term::Variable(var) => Ok(var.unbound()),
            other => Err(StructuralError::NotAVariable {
                found: other.to_string(),
            }
            .into()),
        }
    }
}

/// What a pattern argument contributes when attached.
#[derive(Debug, Clone)]
pub enum Attachment {
    /// A plain group, with the prefixes its source declared.
    Group {
        /// Deep copy of the source's pattern.
        group: PatternGroup,
        /// Prefixes to merge into the receiving builder.
        prefixes: PrefixMapping,
    },
    /// A query with its own projection.
    Query(SubQuery),
}

impl Attachment {
    /// Returns the pattern and prefixes, dropping any projection.
    pub fn into_where(self) -> (PatternGroup, PrefixMapping) {
        match self {
            Attachment::Group { group, prefixes } => (group, prefixes),
            Attachment::Query(sub) => (sub.pattern, sub.prefixes),
        }
    }
}

/// Values accepted by `add_optional`, `add_union` and `add_minus`.
///
/// Builder sources are deep-copied, so later changes to them do not reach
/// the receiving builder.
pub trait IntoPattern {
    /// Converts `self` into an attachment, resolving shorthand against
    /// `prefixes`.
    fn into_attachment(self, prefixes: &PrefixMapping) -> Result<Attachment>;
}

impl IntoPattern for TriplePath {
    fn into_attachment(self, _prefixes: &PrefixMapping) -> Result<Attachment> {
        Ok(Attachment::Group {
            group: PatternGroup::from_triples(vec![self]),
            prefixes: PrefixMapping::new(),
        })
    }
}

impl<S, P, O> IntoPattern for (S, P, O)
where
    S: IntoTerm,
    P: IntoPath,
    O: IntoTerm,
{
    fn into_attachment(self, prefixes: &PrefixMapping) -> Result<Attachment> {
        let (s, p, o) = self;
        let triple = TriplePath::new(
            s.into_term(prefixes)?,
            p.into_path(prefixes)?,
            o.into_term(prefixes)?,
        );
        triple.into_attachment(prefixes)
    }
}

impl IntoPattern for PatternGroup {
    fn into_attachment(self, _prefixes: &PrefixMapping) -> Result<Attachment> {
        Ok(Attachment::Group {
            group: self,
            prefixes: PrefixMapping::new(),
        })
    }
}

impl IntoPattern for &PatternGroup {
    fn into_attachment(self, prefixes: &PrefixMapping) -> Result<Attachment> {
        self.clone().into_attachment(prefixes)
    }
}

impl IntoPattern for &PatternBuilder {
    fn into_attachment(self, _prefixes: &PrefixMapping) -> Result<Attachment> {
        Ok(Attachment::Group {
            group: self.group().clone(),
            prefixes: self.prefixes().clone(),
        })
    }
}

impl IntoPattern for &SelectBuilder {
    fn into_attachment(self, _prefixes: &PrefixMapping) -> Result<Attachment> {
        Ok(Attachment::Query(self.to_sub_query()))
    }
}
