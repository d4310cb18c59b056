//! Blank node allocation.
//!
//! Labels are drawn from one process-wide counter, so allocators held by
//! different builders never hand out the same label. Each candidate is also
//! checked against the labels already present in the owning query.
//!
//! Trees copied in from elsewhere may still reuse labels of the receiving
//! query. [`BlankNodeAllocator::make_disjoint`] renames those, one fresh
//! label per colliding node, through [`Relabel`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::{HashMap, HashSet};
use quarry_common::StructuralError;

use crate::expr::Expression;
use crate::path::Path;
use crate::pattern::{PatternElement, PatternGroup, SubQuery, TriplePath};
use crate::term::{BlankNode, Term, Variable};
use crate::visit::{Walk, blank_node_labels};

static NEXT_LABEL: AtomicU64 = AtomicU64::new(0);

/// Default label prefix.
pub const DEFAULT_PREFIX: &str = "b";

/// Default number of candidates tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 64;

/// Hands out blank nodes unique within one query.
#[derive(Debug, Clone)]
pub struct BlankNodeAllocator {
    prefix: Arc<str>,
    max_attempts: usize,
}

impl Default for BlankNodeAllocator {
    fn default() -> Self {
        Self {
            prefix: Arc::from(DEFAULT_PREFIX),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl BlankNodeAllocator {
    /// Creates an allocator with a custom label prefix and attempt limit.
    pub fn new(prefix: impl AsRef<str>, max_attempts: usize) -> Self {
        Self {
            prefix: Arc::from(prefix.as_ref()),
            max_attempts,
        }
    }

    /// Label prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns a blank node whose label is not in `in_use`, and records it
    /// there.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError::BlankNodeCollision`] when every one of the
    /// allowed candidates was already taken.
    pub fn allocate(&self, in_use: &mut HashSet<Arc<str>>) -> Result<BlankNode, StructuralError> {
        for _ in 0..self.max_attempts {
            let n = NEXT_LABEL.fetch_add(1, Ordering::Relaxed);
            let label: Arc<str> = Arc::from(format!("{}{n}", self.prefix));
            if in_use.insert(Arc::clone(&label)) {
                return Ok(BlankNode::new(&*label));
            }
            tracing::trace!(label = %label, "blank node label already in use");
        }
        Err(StructuralError::BlankNodeCollision {
            attempts: self.max_attempts,
        })
    }

    /// Renames every blank node in `node` whose label is in `in_use`, then
    /// records all of `node`'s labels there. Occurrences of one label get
    /// the same replacement. Returns the number of labels renamed.
    ///
    /// `node` is left untouched on error.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError::BlankNodeCollision`] when no fresh label
    /// can be found for one of the collisions.
    pub fn make_disjoint<T>(
        &self,
        node: &mut T,
        in_use: &mut HashSet<Arc<str>>,
    ) -> Result<usize, StructuralError>
    where
        T: Walk + Relabel,
    {
        let incoming = blank_node_labels(node);
        let mut reserved: HashSet<Arc<str>> = in_use.union(&incoming).cloned().collect();
        let mut renames = HashMap::new();
        for label in incoming.iter().filter(|label| in_use.contains(*label)) {
            let fresh = self.allocate(&mut reserved)?;
            renames.insert(Arc::clone(label), fresh);
        }

        if !renames.is_empty() {
            let rewritten = node.relabel(&renames);
            tracing::debug!(
                labels = renames.len(),
                rewritten,
                "renamed colliding blank nodes"
            );
        }
        *in_use = reserved;
        Ok(renames.len())
    }
}

/// In-place blank node rename.
pub trait Relabel {
    /// Replaces every blank node whose label is a key of `renames`. Returns
    /// the number of slots rewritten.
    fn relabel(&mut self, renames: &HashMap<Arc<str>, BlankNode>) -> usize;
}

impl Relabel for Term {
    fn relabel(&mut self, renames: &HashMap<Arc<str>, BlankNode>) -> usize {
        match self {
            Term::BlankNode(node) => match renames.get(node.label()) {
                Some(fresh) => {
                    *node = fresh.clone();
                    1
                }
                None => 0,
            },
            Term::Variable(var) => var.relabel(renames),
            Term::Iri(_) | Term::Literal(_) => 0,
        }
    }
}

impl Relabel for Variable {
    fn relabel(&mut self, renames: &HashMap<Arc<str>, BlankNode>) -> usize {
        self.binding_mut().map_or(0, |bound| bound.relabel(renames))
    }
}

impl Relabel for Path {
    fn relabel(&mut self, renames: &HashMap<Arc<str>, BlankNode>) -> usize {
        match self {
            Path::Predicate(term) => term.relabel(renames),
            Path::Sequence(steps) => each(steps.iter_mut(), renames),
        }
    }
}

impl Relabel for Expression {
    fn relabel(&mut self, renames: &HashMap<Arc<str>, BlankNode>) -> usize {
        match self {
            Expression::Term(term) => term.relabel(renames),
            Expression::Binary { left, right, .. } => left.relabel(renames) + right.relabel(renames),
            Expression::Unary { operand, .. } => operand.relabel(renames),
            Expression::Call { args, .. } => each(args.iter_mut(), renames),
            Expression::In { operand, list, .. } => {
                operand.relabel(renames) + each(list.iter_mut(), renames)
            }
        }
    }
}

impl Relabel for TriplePath {
    fn relabel(&mut self, renames: &HashMap<Arc<str>, BlankNode>) -> usize {
        self.subject.relabel(renames)
            + self.predicate.relabel(renames)
            + self.object.relabel(renames)
    }
}

impl Relabel for SubQuery {
    fn relabel(&mut self, renames: &HashMap<Arc<str>, BlankNode>) -> usize {
        each(self.projection.iter_mut(), renames) + self.pattern.relabel(renames)
    }
}

impl Relabel for PatternElement {
    fn relabel(&mut self, renames: &HashMap<Arc<str>, BlankNode>) -> usize {
        match self {
            PatternElement::Block(triples) => each(triples.iter_mut(), renames),
            PatternElement::Optional(group) | PatternElement::Minus(group) => {
                group.relabel(renames)
            }
            PatternElement::Union(alternatives) => each(alternatives.iter_mut(), renames),
            PatternElement::SubQuery(sub) => sub.relabel(renames),
            PatternElement::Bind { expression, .. } | PatternElement::Filter(expression) => {
                expression.relabel(renames)
            }
        }
    }
}

impl Relabel for PatternGroup {
    fn relabel(&mut self, renames: &HashMap<Arc<str>, BlankNode>) -> usize {
        each(self.elements_mut().iter_mut(), renames)
    }
}

fn each<'a, T, I>(items: I, renames: &HashMap<Arc<str>, BlankNode>) -> usize
where
    T: Relabel + 'a,
    I: Iterator<Item = &'a mut T>,
{
    items.map(|item| item.relabel(renames)).sum()
}
