//! Pattern and query builders.
//!
//! [`PatternBuilder`] accumulates a WHERE clause. [`SelectBuilder`] wraps one
//! with a projection to form a `SELECT` query.
//!
//! Variables can be resolved at any time with `set_var` and freed again with
//! `unset_var`. A resolution reaches every slot of that variable in the whole
//! tree, including union branches and sub-queries, and also applies to
//! elements added afterwards.

mod select;

pub use select::SelectBuilder;

use std::fmt;

use indexmap::IndexMap;
use quarry_common::{Result, StructuralError};
use quarry_core::list::expand_list;
use quarry_core::visit::{Walk, blank_node_labels, find_binding};
use quarry_core::{
    BlankNodeAllocator, ElementKind, Materialize, PatternElement, PatternGroup, PrefixMapping,
    Relabel, Renderer, RenderConfig, Substitute, Term, TriplePath, Variable,
};

use crate::args::{Attachment, IntoExpression, IntoPath, IntoPattern, IntoTerm, IntoVariable};
use crate::config::Config;

/// Builds a WHERE clause.
#[derive(Debug, Clone)]
pub struct PatternBuilder {
    group: PatternGroup,
    prefixes: PrefixMapping,
    /// Active resolutions, in the order they were set.
    values: IndexMap<String, Term>,
    allocator: BlankNodeAllocator,
    render: RenderConfig,
}

impl Default for PatternBuilder {
    fn default() -> Self {
        Self::with_config(&Config::default())
    }
}

impl PatternBuilder {
    /// Creates an empty builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty builder.
    #[must_use]
    pub fn with_config(config: &Config) -> Self {
        Self {
            group: PatternGroup::new(),
            prefixes: PrefixMapping::new(),
            values: IndexMap::new(),
            allocator: config.allocator(),
            render: config.render,
        }
    }

    /// The pattern built so far. Bound variables still carry their names.
    #[must_use]
    pub fn group(&self) -> &PatternGroup {
        &self.group
    }

    /// The pattern with every bound variable slot replaced by its value.
    #[must_use]
    pub fn build_group(&self) -> PatternGroup {
        self.group.materialize()
    }

    /// Declared prefixes.
    #[must_use]
    pub fn prefixes(&self) -> &PrefixMapping {
        &self.prefixes
    }

    /// Declares a prefix used when resolving shorthand.
    pub fn add_prefix(&mut self, prefix: &str, namespace: &str) -> &mut Self {
        if let Some(old) = self.prefixes.set_prefix(prefix, namespace) {
            tracing::debug!(prefix, old = %old, new = namespace, "redeclared prefix");
        }
        self
    }

    /// Active resolutions as `(name, value)` pairs.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Appends a triple to the trailing block.
    pub fn add_where(
        &mut self,
        subject: impl IntoTerm,
        predicate: impl IntoPath,
        object: impl IntoTerm,
    ) -> Result<&mut Self> {
        let mut triple = TriplePath::new(
            subject.into_term(&self.prefixes)?,
            predicate.into_path(&self.prefixes)?,
            object.into_term(&self.prefixes)?,
        );
        self.apply_values(&mut triple);
        self.group.push_triple(triple);
        self.log_added(ElementKind::Block);
        Ok(self)
    }

    /// Appends `OPTIONAL { pattern }`.
    ///
    /// A query builder contributes only its WHERE body.
    pub fn add_optional(&mut self, pattern: impl IntoPattern) -> Result<&mut Self> {
        let group = self.attach_where(pattern)?;
        self.push(PatternElement::Optional(group));
        Ok(self)
    }

    /// Adds `pattern` as a union alternative.
    ///
    /// Extends the last element when it is already a union; otherwise starts
    /// a new single-alternative union. A query builder with projected
    /// variables becomes a nested `SELECT` inside its alternative.
    pub fn add_union(&mut self, pattern: impl IntoPattern) -> Result<&mut Self> {
        let (mut alternative, prefixes) = match pattern.into_attachment(&self.prefixes)? {
            Attachment::Group { group, prefixes } => (group, prefixes),
            Attachment::Query(sub) if sub.projection.is_empty() => (sub.pattern, sub.prefixes),
            Attachment::Query(sub) => {
                let prefixes = sub.prefixes.clone();
                let mut group = PatternGroup::new();
                group.push(PatternElement::SubQuery(Box::new(sub)));
                (group, prefixes)
            }
        };
        self.make_disjoint(&mut alternative)?;
        self.merge_prefixes(&prefixes);
        self.apply_values(&mut alternative);

        if let Some(PatternElement::Union(alternatives)) = self.group.last_mut() {
            alternatives.push(alternative);
            tracing::debug!(alternatives = alternatives.len(), "extended union");
        } else {
            self.push(PatternElement::Union(std::iter::once(alternative).collect()));
        }
        Ok(self)
    }

    /// Appends `MINUS { pattern }`.
    ///
    /// A query builder contributes only its WHERE body.
    pub fn add_minus(&mut self, pattern: impl IntoPattern) -> Result<&mut Self> {
        let group = self.attach_where(pattern)?;
        self.push(PatternElement::Minus(group));
        Ok(self)
    }

    /// Appends `{ SELECT ... }` built from `query` and merges its prefixes.
    pub fn add_sub_query(&mut self, query: &SelectBuilder) -> Result<&mut Self> {
        let mut sub = query.to_sub_query();
        self.make_disjoint(&mut sub)?;
        self.merge_prefixes(&sub.prefixes);
        self.apply_values(&mut sub);
        self.push(PatternElement::SubQuery(Box::new(sub)));
        Ok(self)
    }

    /// Appends `BIND(expression AS ?var)`.
    ///
    /// # Errors
    ///
    /// Fails with [`StructuralError::BindTargetResolved`] when `var` is
    /// already resolved anywhere in the pattern.
    pub fn add_bind(
        &mut self,
        expression: impl IntoExpression,
        var: impl IntoVariable,
    ) -> Result<&mut Self> {
        let target = var.into_variable()?;
        let resolved = self
            .values
            .get(target.name())
            .cloned()
            .or_else(|| find_binding(&self.group, target.name()));
        if let Some(value) = resolved {
            return Err(StructuralError::BindTargetResolved {
                name: target.name().to_string(),
                value: value.to_string(),
            }
            .into());
        }

        let mut expression = expression.into_expression(&self.prefixes)?;
        self.apply_values(&mut expression);
        self.push(PatternElement::Bind { expression, target });
        Ok(self)
    }

    /// Appends `FILTER(expression)`.
    pub fn add_filter(&mut self, expression: impl IntoExpression) -> Result<&mut Self> {
        let mut expression = expression.into_expression(&self.prefixes)?;
        self.apply_values(&mut expression);
        self.push(PatternElement::Filter(expression));
        Ok(self)
    }

    /// Appends the triples of an RDF list holding `terms` and returns its
    /// head node.
    ///
    /// # Errors
    ///
    /// Fails with [`StructuralError::EmptyList`] for no terms, and with
    /// [`StructuralError::BlankNodeCollision`] when no unused blank node
    /// label can be found.
    pub fn list<I>(&mut self, terms: I) -> Result<Term>
    where
        I: IntoIterator,
        I::Item: IntoTerm,
    {
        let mut resolved = Vec::new();
        for term in terms {
            let mut term = term.into_term(&self.prefixes)?;
            self.apply_values(&mut term);
            resolved.push(term);
        }

        let mut in_use = blank_node_labels(&self.group);
        let chain = expand_list(resolved, &self.allocator, &mut in_use)?;
        let count = chain.triples.len();
        self.group.extend_triples(chain.triples);
        tracing::debug!(triples = count, head = %chain.head, "added list");
        Ok(chain.head)
    }

    /// Resolves `var` to `value` everywhere in the pattern.
    ///
    /// Any `BIND` targeting `var` is removed and does not come back when the
    /// variable is freed again.
    pub fn set_var(&mut self, var: impl IntoVariable, value: impl IntoTerm) -> Result<&mut Self> {
        let var = var.into_variable()?;
        let value = value.into_term(&self.prefixes)?;
        let stats = self.group.substitute(var.name(), Some(&value));
        tracing::trace!(
            variable = var.name(),
            value = %value,
            rewritten = stats.rewritten,
            collapsed = stats.collapsed,
            "resolved variable"
        );
        self.values.insert(var.name().to_string(), value);
        Ok(self)
    }

    /// Frees `var` again everywhere in the pattern.
    pub fn unset_var(&mut self, var: impl IntoVariable) -> Result<&mut Self> {
        let var = var.into_variable()?;
        let stats = self.group.substitute(var.name(), None);
        tracing::trace!(
            variable = var.name(),
            rewritten = stats.rewritten,
            "freed variable"
        );
        self.values.shift_remove(var.name());
        Ok(self)
    }

    /// Renders the pattern with the configured layout.
    #[must_use]
    pub fn build_string(&self) -> String {
        self.to_string()
    }

    pub(crate) fn render_config(&self) -> RenderConfig {
        self.render
    }

    /// Resolves a projection entry against the active resolutions.
    pub(crate) fn resolve_projected(&self, var: &mut Variable) {
        if let Some(value) = self.values.get(var.name()) {
            let name = var.name().to_string();
            var.substitute(&name, Some(value));
        }
    }

    fn attach_where(&mut self, pattern: impl IntoPattern) -> Result<PatternGroup> {
        let (mut group, prefixes) = pattern.into_attachment(&self.prefixes)?.into_where();
        self.make_disjoint(&mut group)?;
        self.merge_prefixes(&prefixes);
        self.apply_values(&mut group);
        Ok(group)
    }

    /// Renames blank nodes in an incoming copy that reuse labels of this
    /// pattern.
    fn make_disjoint<T: Walk + Relabel>(&self, node: &mut T) -> Result<()> {
        let mut in_use = blank_node_labels(&self.group);
        self.allocator.make_disjoint(node, &mut in_use)?;
        Ok(())
    }

    fn merge_prefixes(&mut self, other: &PrefixMapping) {
        for prefix in self.prefixes.merge(other) {
            tracing::warn!(
                prefix = %prefix,
                kept = self.prefixes.namespace(&prefix).unwrap_or_default(),
                "conflicting prefix declaration ignored"
            );
        }
    }

    fn apply_values<T: Substitute>(&self, node: &mut T) {
        for (name, value) in &self.values {
            node.substitute(name, Some(value));
        }
    }

    fn push(&mut self, element: PatternElement) {
        let kind = element.kind();
        self.group.push(element);
        self.log_added(kind);
    }

    fn log_added(&self, kind: ElementKind) {
        tracing::debug!(kind = kind.as_str(), elements = self.group.len(), "added element");
    }
}

impl fmt::Display for PatternBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Renderer::new(f, self.render).render_group(&self.group)
    }
}
