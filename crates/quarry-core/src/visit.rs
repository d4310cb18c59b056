//! Read-only traversal of the pattern tree.
//!
//! [`Walk::walk`] descends through every scope (optional, minus, union
//! branches, sub-query bodies and projections) and reports each term slot to
//! a [`Visitor`].

use std::sync::Arc;

use hashbrown::HashSet;

use crate::expr::Expression;
use crate::path::Path;
use crate::pattern::{PatternElement, PatternGroup, SubQuery, TriplePath};
use crate::term::{BlankNode, Term, Variable};

/// Callbacks for [`Walk`]. Every method has a no-op default.
pub trait Visitor {
    /// Called for every variable slot, including `BIND` targets and
    /// projection entries.
    fn visit_variable(&mut self, _var: &Variable) {}

    /// Called for every blank node, including ones held by bindings.
    fn visit_blank_node(&mut self, _node: &BlankNode) {}

    /// Called for every term slot. The default dispatches to the
    /// variable and blank-node callbacks.
    fn visit_term(&mut self, term: &Term) {
        walk_term(self, term);
    }
}

/// Default traversal for a single term slot.
pub fn walk_term<V: Visitor + ?Sized>(visitor: &mut V, term: &Term) {
    match term {
        Term::Variable(var) => {
            visitor.visit_variable(var);
            if let Some(bound) = var.binding() {
                visitor.visit_term(bound);
            }
        }
        Term::BlankNode(node) => visitor.visit_blank_node(node),
        Term::Iri(_) | Term::Literal(_) => {}
    }
}

/// Tree nodes that can be traversed.
pub trait Walk {
    /// Reports every term slot under `self` to `visitor`.
    fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V);
}

impl Walk for Path {
    fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Path::Predicate(term) => visitor.visit_term(term),
            Path::Sequence(steps) => {
                for step in steps {
                    step.walk(visitor);
                }
            }
        }
    }
}

impl Walk for Expression {
    fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Expression::Term(term) => visitor.visit_term(term),
            Expression::Binary { left, right, .. } => {
                left.walk(visitor);
                right.walk(visitor);
            }
            Expression::Unary { operand, .. } => operand.walk(visitor),
            Expression::Call { args, .. } => {
                for arg in args {
                    arg.walk(visitor);
                }
            }
            Expression::In { operand, list, .. } => {
                operand.walk(visitor);
                for item in list {
                    item.walk(visitor);
                }
            }
        }
    }
}

impl Walk for TriplePath {
    fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_term(&self.subject);
        self.predicate.walk(visitor);
        visitor.visit_term(&self.object);
    }
}

impl Walk for SubQuery {
    fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        for var in &self.projection {
            visitor.visit_variable(var);
            if let Some(bound) = var.binding() {
                visitor.visit_term(bound);
            }
        }
        self.pattern.walk(visitor);
    }
}

impl Walk for PatternElement {
    fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            PatternElement::Block(triples) => {
                for triple in triples {
                    triple.walk(visitor);
                }
            }
            PatternElement::Optional(group) | PatternElement::Minus(group) => group.walk(visitor),
            PatternElement::Union(alternatives) => {
                for group in alternatives {
                    group.walk(visitor);
                }
            }
            PatternElement::SubQuery(sub) => sub.walk(visitor),
            PatternElement::Bind { expression, target } => {
                expression.walk(visitor);
                visitor.visit_variable(target);
            }
            PatternElement::Filter(expression) => expression.walk(visitor),
        }
    }
}

impl Walk for PatternGroup {
    fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        for element in self.elements() {
            element.walk(visitor);
        }
    }
}

/// Collects the labels of every blank node in the tree.
#[derive(Debug, Default)]
pub struct BlankNodeLabels(pub HashSet<Arc<str>>);

impl Visitor for BlankNodeLabels {
    fn visit_blank_node(&mut self, node: &BlankNode) {
        self.0.insert(Arc::clone(node.label_arc()));
    }
}

/// Returns every blank node label used under `node`.
pub fn blank_node_labels<W: Walk + ?Sized>(node: &W) -> HashSet<Arc<str>> {
    let mut labels = BlankNodeLabels::default();
    node.walk(&mut labels);
    labels.0
}

/// Finds the first binding of a named variable.
struct FindBinding<'a> {
    name: &'a str,
    found: Option<Term>,
}

impl Visitor for FindBinding<'_> {
    fn visit_variable(&mut self, var: &Variable) {
        if self.found.is_none() && var.name() == self.name {
            self.found = var.binding().cloned();
        }
    }
}

/// Returns the value `name` is resolved to anywhere under `node`, if any slot
/// of that name carries a binding.
pub fn find_binding<W: Walk + ?Sized>(node: &W, name: &str) -> Option<Term> {
    let mut finder = FindBinding { name, found: None };
    node.walk(&mut finder);
    finder.found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Iri;
    use smallvec::smallvec;

    fn nested_group() -> PatternGroup {
        let mut inner = PatternGroup::new();
        inner.push_triple(TriplePath::new(Term::blank("b1"), Iri::new("p"), Term::var("x")));

        let mut sub = SubQuery::new(PatternGroup::from_triples(vec![TriplePath::new(
            Term::var("y"),
            Iri::new("q"),
            Term::blank("b2"),
        )]));
        sub.projection.push(Variable::new("y"));

        let mut group = PatternGroup::new();
        group.push(PatternElement::Union(smallvec![inner]));
        group.push(PatternElement::SubQuery(Box::new(sub)));
        group.push(PatternElement::Bind {
            expression: Expression::var("x"),
            target: Variable::new("z"),
        });
        group
    }

    #[test]
    fn test_blank_node_labels_reach_nested_scopes() {
        let labels = blank_node_labels(&nested_group());
        assert_eq!(labels.len(), 2);
        assert!(labels.contains("b1"));
        assert!(labels.contains("b2"));
    }

    #[test]
    fn test_find_binding_absent() {
        assert!(find_binding(&nested_group(), "x").is_none());
        assert!(find_binding(&nested_group(), "nope").is_none());
    }
}
