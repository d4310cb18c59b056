//! Built `SELECT` queries.

use std::fmt;

use quarry_core::{PatternGroup, PrefixMapping, RenderConfig, Renderer, Variable};
use serde::{Deserialize, Serialize};

/// A finished `SELECT` query.
///
/// Produced by [`SelectBuilder::build`](crate::SelectBuilder::build). The
/// pattern holds constants only; every bound variable slot has been replaced
/// by its value. Rendering goes through [`fmt::Display`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    prefixes: PrefixMapping,
    distinct: bool,
    projection: Vec<Variable>,
    pattern: PatternGroup,
    #[serde(default)]
    render: RenderConfig,
}

impl Query {
    /// Creates `SELECT * WHERE pattern` with no prefixes.
    #[must_use]
    pub fn new(pattern: PatternGroup) -> Self {
        Self {
            prefixes: PrefixMapping::new(),
            distinct: false,
            projection: Vec::new(),
            pattern,
            render: RenderConfig::default(),
        }
    }

    /// Sets the `PREFIX` declarations.
    #[must_use]
    pub fn with_prefixes(mut self, prefixes: PrefixMapping) -> Self {
        self.prefixes = prefixes;
        self
    }

    /// Sets `SELECT DISTINCT`.
    #[must_use]
    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Sets the projection.
    #[must_use]
    pub fn with_projection(mut self, projection: Vec<Variable>) -> Self {
        self.projection = projection;
        self
    }

    /// Sets the output layout.
    #[must_use]
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    /// Declared prefixes.
    #[must_use]
    pub fn prefixes(&self) -> &PrefixMapping {
        &self.prefixes
    }

    /// Whether this is `SELECT DISTINCT`.
    #[must_use]
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Projected variables; empty means `*`.
    #[must_use]
    pub fn projection(&self) -> &[Variable] {
        &self.projection
    }

    /// The WHERE pattern.
    #[must_use]
    pub fn pattern(&self) -> &PatternGroup {
        &self.pattern
    }

    /// Consumes the query, returning the WHERE pattern.
    #[must_use]
    pub fn into_pattern(self) -> PatternGroup {
        self.pattern
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Renderer::new(f, self.render).render_query(
            &self.prefixes,
            self.distinct,
            &self.projection,
            &self.pattern,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::{Iri, Literal, Term, TriplePath};

    fn pattern() -> PatternGroup {
        PatternGroup::from_triples(vec![TriplePath::new(
            Term::iri("one"),
            Iri::new("two"),
            Literal::simple("three"),
        )])
    }

    #[test]
    fn test_render_select_star() {
        let query = Query::new(pattern());
        assert_eq!(query.to_string(), "SELECT * WHERE { <one> <two> \"three\" . }");
        assert!(!query.is_distinct());
    }

    #[test]
    fn test_render_prefixes_pretty() {
        let mut prefixes = PrefixMapping::new();
        prefixes.set_prefix("ts", "urn:test:");
        let query = Query::new(pattern())
            .with_prefixes(prefixes)
            .with_distinct(true)
            .with_projection(vec![Variable::new("v")])
            .with_render(RenderConfig::pretty());
        assert_eq!(
            query.to_string(),
            "PREFIX ts: <urn:test:>\nSELECT DISTINCT ?v WHERE {\n  <one> <two> \"three\" .\n}"
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let query = Query::new(pattern()).with_projection(vec![Variable::new("v")]);
        let json = serde_json::to_string(&query).unwrap();
        let back: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(back, query);
        assert_eq!(back.into_pattern(), pattern());
    }
}
