//! Predicate paths.
//!
//! Only the sequence operator is modelled. A path is either a single
//! predicate term or an ordered, non-empty sequence of steps.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::term::{Iri, Term, Variable};

/// A predicate position in a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Path {
    /// A single predicate (IRI or variable).
    Predicate(Term),
    /// `step1/step2/...`
    Sequence(Vec<Path>),
}

impl Path {
    /// Creates a single-predicate path.
    pub fn predicate(term: impl Into<Term>) -> Self {
        Path::Predicate(term.into())
    }

    /// Creates a sequence path from its steps.
    ///
    /// Nested sequences are flattened and a single step collapses to that
    /// step. Returns `None` for an empty sequence.
    pub fn sequence(steps: impl IntoIterator<Item = Path>) -> Option<Self> {
        let mut flat = Vec::new();
        for step in steps {
            match step {
                Path::Sequence(inner) => flat.extend(inner),
                predicate @ Path::Predicate(_) => flat.push(predicate),
            }
        }
        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(Path::Sequence(flat)),
        }
    }

    /// Returns the predicate term if this is a single-step path.
    #[must_use]
    pub fn as_predicate(&self) -> Option<&Term> {
        match self {
            Path::Predicate(term) => Some(term),
            Path::Sequence(_) => None,
        }
    }
}

impl From<Term> for Path {
    fn from(term: Term) -> Self {
        Path::Predicate(term)
    }
}

impl From<Iri> for Path {
    fn from(iri: Iri) -> Self {
        Path::Predicate(Term::Iri(iri))
    }
}

impl From<Variable> for Path {
    fn from(var: Variable) -> Self {
        Path::Predicate(Term::Variable(var))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Predicate(term) => term.fmt(f),
            Path::Sequence(steps) => {
                for (i, step) in steps.iter().enumerate() {
                    if i > 0 {
                        f.write_str("/")?;
                    }
                    step.fmt(f)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_flattens() {
        let inner = Path::sequence([Path::from(Iri::new("a")), Path::from(Iri::new("b"))]);
        let path = Path::sequence([inner.unwrap(), Path::from(Iri::new("c"))]).unwrap();
        assert_eq!(path.to_string(), "<a>/<b>/<c>");
        assert!(matches!(&path, Path::Sequence(steps) if steps.len() == 3));
    }

    #[test]
    fn test_single_step_collapses() {
        let path = Path::sequence([Path::from(Iri::new("a"))]).unwrap();
        assert_eq!(path.as_predicate(), Some(&Term::iri("a")));
    }

    #[test]
    fn test_empty_sequence() {
        assert!(Path::sequence(Vec::new()).is_none());
    }
}
