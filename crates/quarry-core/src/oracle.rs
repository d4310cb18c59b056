//! Structural equality for tests.
//!
//! Two groups are structurally equal when their non-empty elements pair up
//! in order with equal kinds, every term compares by its effective value, and
//! blank nodes correspond through one consistent bijection across the whole
//! comparison instead of by label.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::expr::Expression;
use crate::path::Path;
use crate::pattern::{PatternElement, PatternGroup, SubQuery, TriplePath};
use crate::term::{BlankNode, Term, Variable};

/// Returns whether `left` and `right` describe the same pattern.
#[must_use]
pub fn structurally_equal(left: &PatternGroup, right: &PatternGroup) -> bool {
    Oracle::default().groups(left, right)
}

#[derive(Default)]
struct Oracle {
    forward: HashMap<Arc<str>, Arc<str>>,
    backward: HashMap<Arc<str>, Arc<str>>,
}

impl Oracle {
    fn groups(&mut self, left: &PatternGroup, right: &PatternGroup) -> bool {
        let mut l = left.elements().iter().filter(|e| !e.is_empty_block());
        let mut r = right.elements().iter().filter(|e| !e.is_empty_block());
        loop {
            match (l.next(), r.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) => {
                    if !self.elements(a, b) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }

    fn elements(&mut self, left: &PatternElement, right: &PatternElement) -> bool {
        match (left, right) {
            (PatternElement::Block(a), PatternElement::Block(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.triples(x, y))
            }
            (PatternElement::Optional(a), PatternElement::Optional(b))
            | (PatternElement::Minus(a), PatternElement::Minus(b)) => self.groups(a, b),
            (PatternElement::Union(a), PatternElement::Union(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.groups(x, y))
            }
            (PatternElement::SubQuery(a), PatternElement::SubQuery(b)) => self.sub_queries(a, b),
            (
                PatternElement::Bind {
                    expression: ea,
                    target: ta,
                },
                PatternElement::Bind {
                    expression: eb,
                    target: tb,
                },
            ) => ta.name() == tb.name() && self.expressions(ea, eb),
            (PatternElement::Filter(a), PatternElement::Filter(b)) => self.expressions(a, b),
            _ => false,
        }
    }

    fn sub_queries(&mut self, left: &SubQuery, right: &SubQuery) -> bool {
        left.distinct == right.distinct
            && left.projection.len() == right.projection.len()
            && left
                .projection
                .iter()
                .zip(&right.projection)
                .all(|(a, b)| self.projected(a, b))
            && self.groups(&left.pattern, &right.pattern)
    }

    fn projected(&mut self, left: &Variable, right: &Variable) -> bool {
        if left.name() != right.name() {
            return false;
        }
        match (left.binding(), right.binding()) {
            (None, None) => true,
            (Some(a), Some(b)) => self.terms(a, b),
            _ => false,
        }
    }

    fn triples(&mut self, left: &TriplePath, right: &TriplePath) -> bool {
        self.terms(&left.subject, &right.subject)
            && self.paths(&left.predicate, &right.predicate)
            && self.terms(&left.object, &right.object)
    }

    fn paths(&mut self, left: &Path, right: &Path) -> bool {
        match (left, right) {
            (Path::Predicate(a), Path::Predicate(b)) => self.terms(a, b),
            (Path::Sequence(a), Path::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.paths(x, y))
            }
            _ => false,
        }
    }

    fn expressions(&mut self, left: &Expression, right: &Expression) -> bool {
        match (left, right) {
            (Expression::Term(a), Expression::Term(b)) => self.terms(a, b),
            (
                Expression::Binary {
                    op: oa,
                    left: la,
                    right: ra,
                },
                Expression::Binary {
                    op: ob,
                    left: lb,
                    right: rb,
                },
            ) => oa == ob && self.expressions(la, lb) && self.expressions(ra, rb),
            (
                Expression::Unary {
                    op: oa,
                    operand: a,
                },
                Expression::Unary {
                    op: ob,
                    operand: b,
                },
            ) => oa == ob && self.expressions(a, b),
            (
                Expression::Call {
                    function: fa,
                    args: aa,
                },
                Expression::Call {
                    function: fb,
                    args: ab,
                },
            ) => {
                fa == fb
                    && aa.len() == ab.len()
                    && aa.iter().zip(ab).all(|(x, y)| self.expressions(x, y))
            }
            (
                Expression::In {
                    operand: oa,
                    list: la,
                    negated: na,
                },
                Expression::In {
                    operand: ob,
                    list: lb,
                    negated: nb,
                },
            ) => {
                na == nb
                    && la.len() == lb.len()
                    && self.expressions(oa, ob)
                    && la.iter().zip(lb).all(|(x, y)| self.expressions(x, y))
            }
            _ => false,
        }
    }

    fn terms(&mut self, left: &Term, right: &Term) -> bool {
        match (left.effective(), right.effective()) {
            (Term::BlankNode(a), Term::BlankNode(b)) => self.blank_nodes(a, b),
            (Term::Variable(a), Term::Variable(b)) => a.name() == b.name(),
            (a, b) => a == b,
        }
    }

    fn blank_nodes(&mut self, left: &BlankNode, right: &BlankNode) -> bool {
        let (l, r) = (left.label_arc(), right.label_arc());
        match (self.forward.get(l), self.backward.get(r)) {
            (Some(mapped), Some(back)) => mapped == r && back == l,
            (None, None) => {
                self.forward.insert(Arc::clone(l), Arc::clone(r));
                self.backward.insert(Arc::clone(r), Arc::clone(l));
                true
            }
            _ => false,
        }
    }
}
