//! Variable substitution.
//!
//! [`Substitute::substitute`] rewrites, in place, every slot of one named
//! variable across the whole tree: triple positions, path steps, expression
//! references, and sub-query projections, descending into every nested
//! scope. A `Some` value resolves the slot; `None` frees it again.
//!
//! Resolving the target of a `BIND` removes that element from its group.
//! Freeing the variable later does not bring it back.

use crate::expr::Expression;
use crate::path::Path;
use crate::pattern::{PatternElement, PatternGroup, SubQuery, TriplePath};
use crate::term::{Term, Variable};

/// Counters reported by a substitution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionStats {
    /// Variable slots whose binding was written or cleared.
    pub rewritten: usize,
    /// `BIND` elements removed by the collapse rule.
    pub collapsed: usize,
}

impl SubstitutionStats {
    fn absorb(&mut self, other: SubstitutionStats) {
        self.rewritten += other.rewritten;
        self.collapsed += other.collapsed;
    }
}

/// In-place variable rewrite.
pub trait Substitute {
    /// Sets every slot named `name` to `value` (or frees it for `None`).
    fn substitute(&mut self, name: &str, value: Option<&Term>) -> SubstitutionStats;
}

impl Substitute for Variable {
    fn substitute(&mut self, name: &str, value: Option<&Term>) -> SubstitutionStats {
        if self.name() != name {
            return SubstitutionStats::default();
        }
        self.set_binding(value.cloned());
        SubstitutionStats {
            rewritten: 1,
            collapsed: 0,
        }
    }
}

impl Substitute for Term {
    fn substitute(&mut self, name: &str, value: Option<&Term>) -> SubstitutionStats {
        match self {
            Term::Variable(var) => var.substitute(name, value),
            Term::Iri(_) | Term::Literal(_) | Term::BlankNode(_) => SubstitutionStats::default(),
        }
    }
}

impl Substitute for Path {
    fn substitute(&mut self, name: &str, value: Option<&Term>) -> SubstitutionStats {
        match self {
            Path::Predicate(term) => term.substitute(name, value),
            Path::Sequence(steps) => each(steps.iter_mut(), name, value),
        }
    }
}

impl Substitute for Expression {
    fn substitute(&mut self, name: &str, value: Option<&Term>) -> SubstitutionStats {
        match self {
            Expression::Term(term) => term.substitute(name, value),
            Expression::Binary { left, right, .. } => {
                let mut stats = left.substitute(name, value);
                stats.absorb(right.substitute(name, value));
                stats
            }
            Expression::Unary { operand, .. } => operand.substitute(name, value),
            Expression::Call { args, .. } => each(args.iter_mut(), name, value),
            Expression::In { operand, list, .. } => {
                let mut stats = operand.substitute(name, value);
                stats.absorb(each(list.iter_mut(), name, value));
                stats
            }
        }
    }
}

impl Substitute for TriplePath {
    fn substitute(&mut self, name: &str, value: Option<&Term>) -> SubstitutionStats {
        let mut stats = self.subject.substitute(name, value);
        stats.absorb(self.predicate.substitute(name, value));
        stats.absorb(self.object.substitute(name, value));
        stats
    }
}

impl Substitute for SubQuery {
    fn substitute(&mut self, name: &str, value: Option<&Term>) -> SubstitutionStats {
        let mut stats = each(self.projection.iter_mut(), name, value);
        stats.absorb(self.pattern.substitute(name, value));
        stats
    }
}

impl Substitute for PatternElement {
    fn substitute(&mut self, name: &str, value: Option<&Term>) -> SubstitutionStats {
        match self {
            PatternElement::Block(triples) => each(triples.iter_mut(), name, value),
            PatternElement::Optional(group) | PatternElement::Minus(group) => {
                group.substitute(name, value)
            }
            PatternElement::Union(alternatives) => each(alternatives.iter_mut(), name, value),
            PatternElement::SubQuery(sub) => sub.substitute(name, value),
            // The target is left alone: a resolved target is removed by the
            // enclosing group before elements are visited.
            PatternElement::Bind { expression, .. } => expression.substitute(name, value),
            PatternElement::Filter(expression) => expression.substitute(name, value),
        }
    }
}

impl Substitute for PatternGroup {
    fn substitute(&mut self, name: &str, value: Option<&Term>) -> SubstitutionStats {
        let mut stats = SubstitutionStats::default();
        if value.is_some() {
            let elements = self.elements_mut();
            let before = elements.len();
            elements.retain(|e| !e.is_bind_of(name));
            stats.collapsed = before - elements.len();
            if stats.collapsed > 0 {
                tracing::debug!(
                    variable = name,
                    removed = stats.collapsed,
                    "collapsed bind for resolved variable"
                );
                if elements.is_empty() {
                    elements.push(PatternElement::Block(Vec::new()));
                }
            }
        }
        stats.absorb(each(self.elements_mut().iter_mut(), name, value));
        stats
    }
}

fn each<'a, T, I>(items: I, name: &str, value: Option<&Term>) -> SubstitutionStats
where
    T: Substitute + 'a,
    I: Iterator<Item = &'a mut T>,
{
    let mut stats = SubstitutionStats::default();
    for item in items {
        stats.absorb(item.substitute(name, value));
    }
    stats
}

/// Replaces bound variable slots by their values.
///
/// Produces the constant view of a tree: triple positions, path steps and
/// expression references that carry a binding become the bound term. `BIND`
/// targets and projection entries keep their variable form because their
/// position requires a variable.
pub trait Materialize {
    /// Returns a copy with bound slots replaced.
    #[must_use]
    fn materialize(&self) -> Self;
}

impl Materialize for Term {
    fn materialize(&self) -> Self {
        self.effective().clone()
    }
}

impl Materialize for Path {
    fn materialize(&self) -> Self {
        match self {
            Path::Predicate(term) => Path::Predicate(term.materialize()),
            Path::Sequence(steps) => Path::Sequence(steps.iter().map(Path::materialize).collect()),
        }
    }
}

impl Materialize for Expression {
    fn materialize(&self) -> Self {
        match self {
            Expression::Term(term) => Expression::Term(term.materialize()),
            Expression::Binary { op, left, right } => Expression::Binary {
                op: *op,
                left: Box::new(left.materialize()),
                right: Box::new(right.materialize()),
            },
            Expression::Unary { op, operand } => Expression::Unary {
                op: *op,
                operand: Box::new(operand.materialize()),
            },
            Expression::Call { function, args } => Expression::Call {
                function: function.clone(),
                args: args.iter().map(Expression::materialize).collect(),
            },
            Expression::In {
                operand,
                list,
                negated,
            } => Expression::In {
                operand: Box::new(operand.materialize()),
                list: list.iter().map(Expression::materialize).collect(),
                negated: *negated,
            },
        }
    }
}

impl Materialize for TriplePath {
    fn materialize(&self) -> Self {
        TriplePath {
            subject: self.subject.materialize(),
            predicate: self.predicate.materialize(),
            object: self.object.materialize(),
        }
    }
}

impl Materialize for SubQuery {
    fn materialize(&self) -> Self {
        SubQuery {
            distinct: self.distinct,
            projection: self.projection.clone(),
            pattern: self.pattern.materialize(),
            prefixes: self.prefixes.clone(),
        }
    }
}

impl Materialize for PatternElement {
    fn materialize(&self) -> Self {
        match self {
            PatternElement::Block(triples) => {
                PatternElement::Block(triples.iter().map(TriplePath::materialize).collect())
            }
            PatternElement::Optional(group) => PatternElement::Optional(group.materialize()),
            PatternElement::Union(alternatives) => {
                PatternElement::Union(alternatives.iter().map(PatternGroup::materialize).collect())
            }
            PatternElement::Minus(group) => PatternElement::Minus(group.materialize()),
            PatternElement::SubQuery(sub) => PatternElement::SubQuery(Box::new(sub.materialize())),
            PatternElement::Bind { expression, target } => PatternElement::Bind {
                expression: expression.materialize(),
                target: target.clone(),
            },
            PatternElement::Filter(expression) => PatternElement::Filter(expression.materialize()),
        }
    }
}

impl Materialize for PatternGroup {
    fn materialize(&self) -> Self {
        let mut group = PatternGroup::new();
        for element in self.elements() {
            group.push(element.materialize());
        }
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{Iri, Literal};
    use smallvec::smallvec;

    fn triple_with_object(object: Term) -> TriplePath {
        TriplePath::new(Term::iri("one"), Iri::new("two"), object)
    }

    #[test]
    fn test_set_then_unset_restores_triple() {
        let mut group = PatternGroup::from_triples(vec![triple_with_object(Term::var("v"))]);
        let original = group.clone();

        let stats = group.substitute("v", Some(&Term::iri("three")));
        assert_eq!(stats.rewritten, 1);
        assert_eq!(group.materialize(), PatternGroup::from_triples(vec![triple_with_object(Term::iri("three"))]));

        group.substitute("v", Some(&Term::iri("four")));
        assert_eq!(group.materialize(), PatternGroup::from_triples(vec![triple_with_object(Term::iri("four"))]));

        group.substitute("v", None);
        assert_eq!(group, original);
    }

    #[test]
    fn test_unknown_variable_is_noop() {
        let mut group = PatternGroup::from_triples(vec![triple_with_object(Term::var("v"))]);
        let original = group.clone();
        let stats = group.substitute("nope", Some(&Term::iri("x")));
        assert_eq!(stats, SubstitutionStats::default());
        assert_eq!(group, original);
    }

    #[test]
    fn test_reaches_union_optional_minus_and_subquery() {
        let branch = PatternGroup::from_triples(vec![triple_with_object(Term::var("v"))]);
        let mut sub = SubQuery::new(branch.clone());
        sub.projection.push(Variable::new("v"));

        let mut group = PatternGroup::new();
        group.push(PatternElement::Union(smallvec![branch.clone(), branch.clone()]));
        group.push(PatternElement::Optional(branch.clone()));
        group.push(PatternElement::Minus(branch));
        group.push(PatternElement::SubQuery(Box::new(sub)));

        let stats = group.substitute("v", Some(&Term::iri("three")));
        // two union branches, optional, minus, sub-query body and projection
        assert_eq!(stats.rewritten, 6);

        let PatternElement::SubQuery(sub) = &group.elements()[3] else {
            panic!("expected sub-query");
        };
        assert_eq!(sub.projection[0].binding(), Some(&Term::iri("three")));
    }

    #[test]
    fn test_filter_expression_rewritten() {
        let mut group = PatternGroup::new();
        group.push(PatternElement::Filter(Expression::binary(
            crate::expr::BinaryOp::Lt,
            Expression::var("one"),
            Expression::var("v"),
        )));
        let ten = Term::Literal(Literal::typed("10", Iri::new(quarry_common::vocab::xsd::INT)));
        group.substitute("v", Some(&ten));

        let PatternElement::Filter(expr) = &group.elements()[0] else {
            panic!("expected filter");
        };
        assert_eq!(
            expr.to_string(),
            "?one < \"10\"^^<http://www.w3.org/2001/XMLSchema#int>"
        );
    }

    #[test]
    fn test_bind_collapse_is_one_way() {
        let mut group = PatternGroup::new();
        group.push(PatternElement::Bind {
            expression: Expression::call("RAND", vec![]),
            target: Variable::new("foo"),
        });

        let stats = group.substitute("foo", Some(&Term::iri("three")));
        assert_eq!(stats.collapsed, 1);
        assert_eq!(group.elements(), &[PatternElement::Block(Vec::new())]);
        assert!(group.is_empty());

        group.substitute("foo", None);
        assert!(group.is_empty());
        assert!(group.elements().iter().all(|e| !e.is_bind_of("foo")));
    }

    #[test]
    fn test_bind_survives_unset() {
        let mut group = PatternGroup::new();
        group.push(PatternElement::Bind {
            expression: Expression::call("RAND", vec![]),
            target: Variable::new("foo"),
        });
        let original = group.clone();
        let stats = group.substitute("foo", None);
        assert_eq!(stats.collapsed, 0);
        assert_eq!(group, original);
    }

    #[test]
    fn test_collapse_keeps_siblings() {
        let mut group = PatternGroup::from_triples(vec![triple_with_object(Term::var("foo"))]);
        group.push(PatternElement::Bind {
            expression: Expression::call("RAND", vec![]),
            target: Variable::new("foo"),
        });
        group.substitute("foo", Some(&Term::iri("three")));
        assert_eq!(group.len(), 1);
        assert_eq!(
            group.materialize(),
            PatternGroup::from_triples(vec![triple_with_object(Term::iri("three"))])
        );
    }
}
