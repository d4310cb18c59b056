//! RDF list expansion.

use std::sync::Arc;

use hashbrown::HashSet;
use quarry_common::StructuralError;
use quarry_common::vocab::rdf;

use crate::bnode::BlankNodeAllocator;
use crate::pattern::TriplePath;
use crate::term::{Iri, Term};

/// An expanded RDF list: its head node and the triples describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListChain {
    /// The first list node. Use it as subject or object to refer to the list.
    pub head: Term,
    /// `rdf:first` / `rdf:rest` triples, node by node.
    pub triples: Vec<TriplePath>,
}

/// Expands `terms` into a chain of blank nodes linked by `rdf:rest` and
/// terminated by `rdf:nil`.
///
/// Every allocated label is added to `in_use`.
///
/// # Errors
///
/// [`StructuralError::EmptyList`] for an empty input, or
/// [`StructuralError::BlankNodeCollision`] when no fresh label is available.
pub fn expand_list(
    terms: Vec<Term>,
    allocator: &BlankNodeAllocator,
    in_use: &mut HashSet<Arc<str>>,
) -> Result<ListChain, StructuralError> {
    if terms.is_empty() {
        return Err(StructuralError::EmptyList);
    }

    let nodes = terms
        .iter()
        .map(|_| allocator.allocate(in_use).map(Term::BlankNode))
        .collect::<Result<Vec<_>, _>>()?;

    let first = Iri::new(rdf::FIRST);
    let rest = Iri::new(rdf::REST);
    let nil = Term::iri(rdf::NIL);

    let mut triples = Vec::with_capacity(terms.len() * 2);
    for (i, (node, value)) in nodes.iter().zip(terms).enumerate() {
        triples.push(TriplePath::new(node.clone(), first.clone(), value));
        let next = nodes.get(i + 1).cloned().unwrap_or_else(|| nil.clone());
        triples.push(TriplePath::new(node.clone(), rest.clone(), next));
    }

    tracing::trace!(nodes = nodes.len(), "expanded list");
    Ok(ListChain {
        head: nodes[0].clone(),
        triples,
    })
}
