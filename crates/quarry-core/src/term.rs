//! RDF terms.
//!
//! A [`Term`] is an IRI, a literal, a variable or a blank node. Variables are
//! identified only by name: two [`Variable`] slots with equal names anywhere in
//! a pattern tree are the same logical variable.
//!
//! A variable slot may carry a *binding*, the term it currently resolves to.
//! Bindings are written by the substitution pass and cleared on revert; the
//! name is never lost, so a slot can be re-resolved or freed again later.

use std::fmt;
use std::sync::Arc;

use quarry_common::vocab::{rdf, xsd};
use serde::{Deserialize, Serialize};

/// An absolute or relative IRI, stored without angle brackets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Iri(Arc<str>);

impl Iri {
    /// Creates an IRI from its text.
    pub fn new(iri: impl AsRef<str>) -> Self {
        Self(Arc::from(iri.as_ref()))
    }

    /// The `rdf:type` IRI.
    #[must_use]
    pub fn rdf_type() -> Self {
        Self::new(rdf::TYPE)
    }

    /// Returns the IRI text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// A literal: a lexical form with an optional datatype or language tag.
///
/// A literal with neither is a simple string (`xsd:string`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    lexical: Arc<str>,
    datatype: Option<Iri>,
    language: Option<Arc<str>>,
}

impl Literal {
    /// Creates a simple string literal.
    pub fn simple(lexical: impl AsRef<str>) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            datatype: None,
            language: None,
        }
    }

    /// Creates a typed literal.
    ///
    /// An `xsd:string` datatype is normalized to a simple literal.
    pub fn typed(lexical: impl AsRef<str>, datatype: Iri) -> Self {
        let datatype = (datatype.as_str() != xsd::STRING).then_some(datatype);
        Self {
            lexical: Arc::from(lexical.as_ref()),
            datatype,
            language: None,
        }
    }

    /// Creates a language-tagged string.
    pub fn lang(lexical: impl AsRef<str>, language: impl AsRef<str>) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            datatype: None,
            language: Some(Arc::from(language.as_ref().to_ascii_lowercase())),
        }
    }

    /// Creates an `xsd:integer` literal.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), Iri::new(xsd::INTEGER))
    }

    /// Creates an `xsd:boolean` literal.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::typed(if value { "true" } else { "false" }, Iri::new(xsd::BOOLEAN))
    }

    /// Returns the lexical form.
    #[must_use]
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    /// Returns the datatype, or `None` for simple and language-tagged strings.
    #[must_use]
    pub fn datatype(&self) -> Option<&Iri> {
        self.datatype.as_ref()
    }

    /// Returns the language tag, if any.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Whether the lexical form can be written without quotes.
    fn is_bare(&self) -> bool {
        let Some(datatype) = &self.datatype else {
            return false;
        };
        let lex = self.lexical();
        match datatype.as_str() {
            xsd::INTEGER => is_integer(lex),
            xsd::DECIMAL => is_decimal(lex),
            xsd::DOUBLE => is_double(lex),
            xsd::BOOLEAN => lex == "true" || lex == "false",
            _ => false,
        }
    }
}

fn unsigned(lex: &str) -> &str {
    lex.strip_prefix(['+', '-']).unwrap_or(lex)
}

fn is_integer(lex: &str) -> bool {
    let digits = unsigned(lex);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal(lex: &str) -> bool {
    match unsigned(lex).split_once('.') {
        Some((int, frac)) => {
            int.bytes().all(|b| b.is_ascii_digit())
                && !frac.is_empty()
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

fn is_double(lex: &str) -> bool {
    let Some((mantissa, exponent)) = lex.split_once(['e', 'E']) else {
        return false;
    };
    let mantissa_ok = is_integer(mantissa)
        || is_decimal(mantissa)
        || unsigned(mantissa)
            .strip_suffix('.')
            .is_some_and(|m| !m.is_empty() && m.bytes().all(|b| b.is_ascii_digit()));
    mantissa_ok && is_integer(exponent)
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bare() {
            return f.write_str(self.lexical());
        }
        f.write_str("\"")?;
        for c in self.lexical.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                c => write!(f, "{c}")?,
            }
        }
        f.write_str("\"")?;
        if let Some(lang) = &self.language {
            write!(f, "@{lang}")?;
        } else if let Some(datatype) = &self.datatype {
            write!(f, "^^{datatype}")?;
        }
        Ok(())
    }
}

/// A variable slot.
///
/// Identity is the name alone. The optional binding is the term the variable
/// is currently resolved to; a slot without one is *free*.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    name: Arc<str>,
    binding: Option<Box<Term>>,
}

impl Variable {
    /// Creates a free variable. A leading `?` or `$` is stripped.
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        let name = name.strip_prefix(['?', '$']).unwrap_or(name);
        Self {
            name: Arc::from(name),
            binding: None,
        }
    }

    /// Returns the name without the `?` sigil.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current binding, if resolved.
    #[must_use]
    pub fn binding(&self) -> Option<&Term> {
        self.binding.as_deref()
    }

    /// Whether the slot has no binding.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.binding.is_none()
    }

    pub(crate) fn binding_mut(&mut self) -> Option<&mut Term> {
        self.binding.as_deref_mut()
    }

    /// Sets or clears the binding.
    pub(crate) fn set_binding(&mut self, value: Option<Term>) {
        self.binding = value.map(Box::new);
    }

    /// Returns a copy of this variable with no binding.
    #[must_use]
    pub fn unbound(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            binding: None,
        }
    }
}

/// Writes the variable's name form (`?name`), regardless of binding.
impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}

/// A blank node with an opaque label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlankNode(Arc<str>);

impl BlankNode {
    /// Creates a blank node with the given label (without `_:`).
    pub fn new(label: impl AsRef<str>) -> Self {
        let label = label.as_ref();
        Self(Arc::from(label.strip_prefix("_:").unwrap_or(label)))
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.0
    }

    pub(crate) fn label_arc(&self) -> &Arc<str> {
        &self.0
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// An RDF term in a pattern position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// An IRI.
    Iri(Iri),
    /// A literal value.
    Literal(Literal),
    /// A variable slot, possibly resolved.
    Variable(Variable),
    /// A blank node.
    BlankNode(BlankNode),
}

impl Term {
    /// Creates an IRI term.
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Iri::new(iri))
    }

    /// Creates a simple literal term.
    pub fn literal(lexical: impl AsRef<str>) -> Self {
        Term::Literal(Literal::simple(lexical))
    }

    /// Creates a free variable term.
    pub fn var(name: impl AsRef<str>) -> Self {
        Term::Variable(Variable::new(name))
    }

    /// Creates a blank node term.
    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::BlankNode(BlankNode::new(label))
    }

    /// Returns the variable slot, if this is one.
    #[must_use]
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the term this position currently stands for.
    ///
    /// A bound variable yields its binding (followed transitively); every
    /// other term yields itself.
    #[must_use]
    pub fn effective(&self) -> &Term {
        match self {
            Term::Variable(v) => v.binding().map_or(self, Term::effective),
            _ => self,
        }
    }

    /// Whether this position is a variable with no binding.
    #[must_use]
    pub fn is_free_variable(&self) -> bool {
        matches!(self, Term::Variable(v) if v.is_free())
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

impl From<Variable> for Term {
    fn from(var: Variable) -> Self {
        Term::Variable(var)
    }
}

impl From<BlankNode> for Term {
    fn from(node: BlankNode) -> Self {
        Term::BlankNode(node)
    }
}

/// Writes the effective term: a bound variable is written as its value.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.effective() {
            Term::Iri(iri) => iri.fmt(f),
            Term::Literal(lit) => lit.fmt(f),
            Term::Variable(var) => var.fmt(f),
            Term::BlankNode(node) => node.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_strips_sigil() {
        assert_eq!(Variable::new("?v").name(), "v");
        assert_eq!(Variable::new("$v").name(), "v");
        assert_eq!(Variable::new("v").name(), "v");
        assert_eq!(Variable::new("?v"), Variable::new("v"));
    }

    #[test]
    fn test_literal_rendering() {
        assert_eq!(Literal::simple("three").to_string(), "\"three\"");
        assert_eq!(Literal::simple("a\"b").to_string(), "\"a\\\"b\"");
        assert_eq!(Literal::lang("chat", "FR").to_string(), "\"chat\"@fr");
        assert_eq!(Literal::integer(10).to_string(), "10");
        assert_eq!(Literal::boolean(true).to_string(), "true");
        assert_eq!(
            Literal::typed("10", Iri::new(xsd::INT)).to_string(),
            "\"10\"^^<http://www.w3.org/2001/XMLSchema#int>"
        );
        assert_eq!(
            Literal::typed("1.5", Iri::new(xsd::DECIMAL)).to_string(),
            "1.5"
        );
        assert_eq!(
            Literal::typed("1.5e3", Iri::new(xsd::DOUBLE)).to_string(),
            "1.5e3"
        );
        assert_eq!(
            Literal::typed("abc", Iri::new(xsd::INTEGER)).to_string(),
            "\"abc\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }

    #[test]
    fn test_xsd_string_is_simple() {
        let lit = Literal::typed("x", Iri::new(xsd::STRING));
        assert_eq!(lit, Literal::simple("x"));
        assert!(lit.datatype().is_none());
    }

    #[test]
    fn test_effective_term() {
        let mut var = Variable::new("v");
        assert!(Term::Variable(var.clone()).is_free_variable());

        var.set_binding(Some(Term::iri("three")));
        let term = Term::Variable(var);
        assert!(!term.is_free_variable());
        assert_eq!(term.effective(), &Term::iri("three"));
        assert_eq!(term.to_string(), "<three>");
        assert_eq!(term.as_variable().map(|v| v.to_string()), Some("?v".into()));
    }

    #[test]
    fn test_blank_node_label() {
        let node = BlankNode::new("_:b0");
        assert_eq!(node.label(), "b0");
        assert_eq!(node.to_string(), "_:b0");
    }
}
