//! `SELECT` query builder.

use std::fmt;

use quarry_common::Result;
use quarry_core::{PatternGroup, PrefixMapping, Substitute, SubQuery, Term, Variable};

use super::PatternBuilder;
use crate::args::{IntoExpression, IntoPath, IntoPattern, IntoTerm, IntoVariable};
use crate::config::Config;
use crate::query::Query;

/// Builds a `SELECT` query: projection, `DISTINCT` and a WHERE clause.
///
/// Pattern methods mirror [`PatternBuilder`]. Passing a `SelectBuilder` to
/// another builder copies it; later changes here are not seen there.
///
/// ```ignore
/// let mut query = SelectBuilder::new();
/// query
///     .add_var("?v")?
///     .add_where("<one>", "<two>", "?v")?
///     .add_filter("?v != <four>")?;
/// query.set_var("?v", "<three>")?;
/// println!("{}", query.build());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    distinct: bool,
    projection: Vec<Variable>,
    body: PatternBuilder,
}

impl SelectBuilder {
    /// Creates an empty `SELECT *` builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty `SELECT *` builder.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            distinct: false,
            projection: Vec::new(),
            body: PatternBuilder::with_config(&config),
        }
    }

    /// Declares a prefix. It is used for shorthand resolution and written
    /// as a `PREFIX` line.
    pub fn add_prefix(&mut self, prefix: &str, namespace: &str) -> &mut Self {
        self.body.add_prefix(prefix, namespace);
        self
    }

    /// Declared prefixes, including ones merged from attached builders.
    #[must_use]
    pub fn prefixes(&self) -> &PrefixMapping {
        self.body.prefixes()
    }

    /// Adds a projected variable. Repeated names are ignored.
    pub fn add_var(&mut self, var: impl IntoVariable) -> Result<&mut Self> {
        let mut var = var.into_variable()?;
        if self.projection.iter().any(|v| v.name() == var.name()) {
            return Ok(self);
        }
        self.body.resolve_projected(&mut var);
        tracing::debug!(
            variable = var.name(),
            projected = self.projection.len() + 1,
            "added projection"
        );
        self.projection.push(var);
        Ok(self)
    }

    /// Sets `SELECT DISTINCT`.
    pub fn distinct(&mut self, distinct: bool) -> &mut Self {
        self.distinct = distinct;
        self
    }

    /// Projected variables; empty means `*`.
    #[must_use]
    pub fn projection(&self) -> &[Variable] {
        &self.projection
    }

    /// The WHERE pattern built so far.
    #[must_use]
    pub fn pattern(&self) -> &PatternGroup {
        self.body.group()
    }

    /// See [`PatternBuilder::add_where`].
    pub fn add_where(
        &mut self,
        subject: impl IntoTerm,
        predicate: impl IntoPath,
        object: impl IntoTerm,
    ) -> Result<&mut Self> {
        self.body.add_where(subject, predicate, object)?;
        Ok(self)
    }

    /// See [`PatternBuilder::add_optional`].
    pub fn add_optional(&mut self, pattern: impl IntoPattern) -> Result<&mut Self> {
        self.body.add_optional(pattern)?;
        Ok(self)
    }

    /// See [`PatternBuilder::add_union`].
    pub fn add_union(&mut self, pattern: impl IntoPattern) -> Result<&mut Self> {
        self.body.add_union(pattern)?;
        Ok(self)
    }

    /// See [`PatternBuilder::add_minus`].
    pub fn add_minus(&mut self, pattern: impl IntoPattern) -> Result<&mut Self> {
        self.body.add_minus(pattern)?;
        Ok(self)
    }

    /// See [`PatternBuilder::add_sub_query`].
    pub fn add_sub_query(&mut self, query: &SelectBuilder) -> Result<&mut Self> {
        self.body.add_sub_query(query)?;
        Ok(self)
    }

    /// See [`PatternBuilder::add_bind`].
    pub fn add_bind(
        &mut self,
        expression: impl IntoExpression,
        var: impl IntoVariable,
    ) -> Result<&mut Self> {
        self.body.add_bind(expression, var)?;
        Ok(self)
    }

    /// See [`PatternBuilder::add_filter`].
    pub fn add_filter(&mut self, expression: impl IntoExpression) -> Result<&mut Self> {
        self.body.add_filter(expression)?;
        Ok(self)
    }

    /// See [`PatternBuilder::list`].
    pub fn list<I>(&mut self, terms: I) -> Result<Term>
    where
        I: IntoIterator,
        I::Item: IntoTerm,
    {
        self.body.list(terms)
    }

    /// Resolves `var` in the WHERE clause and the projection.
    pub fn set_var(&mut self, var: impl IntoVariable, value: impl IntoTerm) -> Result<&mut Self> {
        let var = var.into_variable()?;
        let value = value.into_term(self.body.prefixes())?;
        self.body.set_var(var.clone(), value.clone())?;
        for projected in &mut self.projection {
            projected.substitute(var.name(), Some(&value));
        }
        Ok(self)
    }

    /// Frees `var` in the WHERE clause and the projection.
    pub fn unset_var(&mut self, var: impl IntoVariable) -> Result<&mut Self> {
        let var = var.into_variable()?;
        self.body.unset_var(var.clone())?;
        for projected in &mut self.projection {
            projected.substitute(var.name(), None);
        }
        Ok(self)
    }

    /// Deep copy of this query for nesting inside another pattern.
    #[must_use]
    pub fn to_sub_query(&self) -> SubQuery {
        SubQuery {
            distinct: self.distinct,
            projection: self.projection.clone(),
            pattern: self.body.group().clone(),
            prefixes: self.body.prefixes().clone(),
        }
    }

    /// Builds the query with every bound variable replaced by its value.
    #[must_use]
    pub fn build(&self) -> Query {
        Query::new(self.body.build_group())
            .with_prefixes(self.body.prefixes().clone())
            .with_distinct(self.distinct)
            .with_projection(self.projection.clone())
            .with_render(self.body.render_config())
    }

    /// Renders the query with the configured layout.
    #[must_use]
    pub fn build_string(&self) -> String {
        self.build().to_string()
    }
}

impl fmt::Display for SelectBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.build().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quarry_core::Iri;
    use regex::Regex;

    fn compact() -> SelectBuilder {
        SelectBuilder::with_config(Config::compact())
    }

    #[test]
    fn test_select_star() {
        let mut query = compact();
        query.add_where("<one>", "<two>", "three").unwrap();
        assert_eq!(
            query.build_string(),
            "SELECT * WHERE { <one> <two> \"three\" . }"
        );
    }

    #[test]
    fn test_prefixes_and_distinct() {
        let mut query = compact();
        query.add_prefix("ts", "urn:test:").distinct(true);
        query.add_var("?v").unwrap().add_var("v").unwrap();
        query.add_where("ts:one", "ts:two", "?v").unwrap();
        assert_eq!(query.projection().len(), 1);
        assert_eq!(
            query.build_string(),
            "PREFIX ts: <urn:test:> SELECT DISTINCT ?v WHERE { <urn:test:one> <urn:test:two> ?v . }"
        );
    }

    #[test]
    fn test_bound_projection_renders_as_alias() {
        let mut query = compact();
        query.add_var("?v").unwrap();
        query.add_where("<one>", "<two>", "?v").unwrap();
        query.set_var("?v", "<three>").unwrap();
        assert_eq!(
            query.build_string(),
            "SELECT (<three> AS ?v) WHERE { <one> <two> <three> . }"
        );
        query.unset_var("?v").unwrap();
        assert_eq!(query.build_string(), "SELECT ?v WHERE { <one> <two> ?v . }");
    }

    #[test]
    fn test_projection_added_after_resolution() {
        let mut query = compact();
        query.set_var("?v", "<three>").unwrap();
        query.add_var("?v").unwrap();
        assert_eq!(query.projection()[0].binding(), Some(&Term::iri("three")));
    }

    #[test]
    fn test_to_sub_query_is_a_copy() {
        let mut query = compact();
        query.add_var("?x").unwrap();
        query.add_where("?x", Iri::new("p"), "<o>").unwrap();
        let sub = query.to_sub_query();
        query.add_where("<a>", "<b>", "<c>").unwrap();
        assert_eq!(sub.pattern.triples().count(), 1);
        assert_eq!(sub.projection.len(), 1);
    }

    #[test]
    fn test_pretty_build() {
        let mut query = SelectBuilder::new();
        query.add_where("<one>", "<two>", "three").unwrap();
        assert_eq!(
            query.build_string(),
            "SELECT * WHERE {\n  <one> <two> \"three\" .\n}"
        );
    }

    #[test]
    fn test_list_head_in_projection_query() {
        let mut query = compact();
        query.add_var("?x").unwrap();
        let head = query.list(["1", "2"]).unwrap();
        query.add_where("?x", "<items>", head).unwrap();

        let shape = Regex::new(
            r"^SELECT \?x WHERE \{ (_:b\d+) <[^>]+#first> 1 \. _:b\d+ <[^>]+#rest> (_:b\d+) \. (_:b\d+) <[^>]+#first> 2 \. _:b\d+ <[^>]+#rest> <[^>]+#nil> \. \?x <items> (_:b\d+) \. \}$",
        )
        .unwrap();
        let rendered = query.build_string();
        let caps = shape.captures(&rendered).expect("unexpected shape");
        assert_eq!(&caps[1], &caps[4]);
        assert_eq!(&caps[2], &caps[3]);
        assert_ne!(&caps[1], &caps[2]);
    }

    proptest! {
        #[test]
        fn test_projection_set_unset_roundtrip(name in "[a-z]{1,6}", iri in "[a-z]{1,6}") {
            let mut query = compact();
            query.add_var(format!("?{name}")).unwrap();
            query.add_where("<s>", "<p>", format!("?{name}")).unwrap();
            let before = query.build_string();

            query.set_var(format!("?{name}"), format!("<{iri}>")).unwrap();
            let alias = format!("(<{iri}> AS ?{name})");
            prop_assert!(query.build_string().contains(&alias));

            query.unset_var(format!("?{name}")).unwrap();
            prop_assert_eq!(query.build_string(), before);
        }
    }
}
