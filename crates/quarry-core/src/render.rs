//! SPARQL text rendering.
//!
//! The renderer writes the effective form of the tree: a bound variable is
//! written as its value. Empty blocks are skipped, so a group holding only
//! empty blocks renders as `{ }`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pattern::{PatternElement, PatternGroup, SubQuery, TriplePath};
use crate::prefix::PrefixMapping;
use crate::term::Variable;

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// One element per line with indentation instead of a single line.
    pub pretty: bool,
    /// Spaces per nesting level when `pretty` is set.
    pub indent: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: 2,
        }
    }
}

impl RenderConfig {
    /// Multi-line layout with the default indent.
    #[must_use]
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    /// Sets the indent width.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

/// Writes pattern trees to a [`fmt::Write`] sink.
pub struct Renderer<'a, W: fmt::Write> {
    out: &'a mut W,
    config: RenderConfig,
    depth: usize,
}

impl<'a, W: fmt::Write> Renderer<'a, W> {
    /// Creates a renderer writing to `out`.
    pub fn new(out: &'a mut W, config: RenderConfig) -> Self {
        Self {
            out,
            config,
            depth: 0,
        }
    }

    fn break_line(&mut self) -> fmt::Result {
        if self.config.pretty {
            self.out.write_char('\n')?;
            for _ in 0..self.depth * self.config.indent {
                self.out.write_char(' ')?;
            }
            Ok(())
        } else {
            self.out.write_char(' ')
        }
    }

    /// Writes `{ ... }` for `group`.
    pub fn render_group(&mut self, group: &PatternGroup) -> fmt::Result {
        if group.is_empty() {
            return self.out.write_str("{ }");
        }
        self.out.write_char('{')?;
        self.depth += 1;
        for element in group.elements() {
            self.render_element(element)?;
        }
        self.depth -= 1;
        self.break_line()?;
        self.out.write_char('}')
    }

    fn render_element(&mut self, element: &PatternElement) -> fmt::Result {
        match element {
            PatternElement::Block(triples) => {
                for triple in triples {
                    self.break_line()?;
                    self.render_triple(triple)?;
                }
                Ok(())
            }
            PatternElement::Optional(group) => {
                self.break_line()?;
                self.out.write_str("OPTIONAL ")?;
                self.render_group(group)
            }
            PatternElement::Union(alternatives) => {
                self.break_line()?;
                for (i, group) in alternatives.iter().enumerate() {
                    if i > 0 {
                        self.out.write_str(" UNION ")?;
                    }
                    self.render_group(group)?;
                }
                Ok(())
            }
            PatternElement::Minus(group) => {
                self.break_line()?;
                self.out.write_str("MINUS ")?;
                self.render_group(group)
            }
            PatternElement::SubQuery(sub) => {
                self.break_line()?;
                self.render_sub_query(sub)
            }
            PatternElement::Bind { expression, target } => {
                self.break_line()?;
                write!(self.out, "BIND({expression} AS {target})")
            }
            PatternElement::Filter(expression) => {
                self.break_line()?;
                write!(self.out, "FILTER({expression})")
            }
        }
    }

    fn render_triple(&mut self, triple: &TriplePath) -> fmt::Result {
        write!(
            self.out,
            "{} {} {} .",
            triple.subject, triple.predicate, triple.object
        )
    }

    fn render_sub_query(&mut self, sub: &SubQuery) -> fmt::Result {
        self.out.write_char('{')?;
        self.depth += 1;
        self.break_line()?;
        self.render_select(sub.distinct, &sub.projection, &sub.pattern)?;
        self.depth -= 1;
        self.break_line()?;
        self.out.write_char('}')
    }

    /// Writes `SELECT [DISTINCT] vars WHERE { ... }`.
    ///
    /// An empty projection is written as `*`. A projected variable that is
    /// bound is written as `(value AS ?var)`.
    pub fn render_select(
        &mut self,
        distinct: bool,
        projection: &[Variable],
        pattern: &PatternGroup,
    ) -> fmt::Result {
        self.out.write_str("SELECT ")?;
        if distinct {
            self.out.write_str("DISTINCT ")?;
        }
        if projection.is_empty() {
            self.out.write_char('*')?;
        }
        for (i, var) in projection.iter().enumerate() {
            if i > 0 {
                self.out.write_char(' ')?;
            }
            match var.binding() {
                Some(value) => write!(self.out, "({value} AS {var})")?,
                None => write!(self.out, "{var}")?,
            }
        }
        self.out.write_str(" WHERE ")?;
        self.render_group(pattern)
    }

    /// Writes `PREFIX` declarations followed by the select query.
    pub fn render_query(
        &mut self,
        prefixes: &PrefixMapping,
        distinct: bool,
        projection: &[Variable],
        pattern: &PatternGroup,
    ) -> fmt::Result {
        for (prefix, namespace) in prefixes.iter() {
            write!(self.out, "PREFIX {prefix}: <{namespace}>")?;
            self.break_line()?;
        }
        self.render_select(distinct, projection, pattern)
    }
}

/// Renders `group` on a single line.
impl fmt::Display for PatternGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Renderer::new(f, RenderConfig::default()).render_group(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BinaryOp, Expression};
    use crate::term::{Iri, Literal, Term};
    use smallvec::smallvec;

    fn one_two_three() -> PatternGroup {
        PatternGroup::from_triples(vec![TriplePath::new(
            Term::iri("one"),
            Iri::new("two"),
            Literal::simple("three"),
        )])
    }

    fn render(group: &PatternGroup, config: RenderConfig) -> String {
        let mut out = String::new();
        Renderer::new(&mut out, config).render_group(group).unwrap();
        out
    }

    #[test]
    fn test_empty_group() {
        assert_eq!(PatternGroup::new().to_string(), "{ }");
        let mut group = PatternGroup::new();
        group.push(PatternElement::Block(Vec::new()));
        assert_eq!(render(&group, RenderConfig::pretty()), "{ }");
    }

    #[test]
    fn test_compact_elements() {
        let mut group = one_two_three();
        group.push(PatternElement::Optional(one_two_three()));
        group.push(PatternElement::Minus(one_two_three()));
        group.push(PatternElement::Filter(Expression::binary(
            BinaryOp::Lt,
            Expression::var("one"),
            Expression::constant(Literal::integer(10)),
        )));
        group.push(PatternElement::Bind {
            expression: Expression::call("rand", vec![]),
            target: Variable::new("foo"),
        });
        assert_eq!(
            group.to_string(),
            "{ <one> <two> \"three\" . OPTIONAL { <one> <two> \"three\" . } \
             MINUS { <one> <two> \"three\" . } FILTER(?one < 10) BIND(RAND() AS ?foo) }"
        );
    }

    #[test]
    fn test_union_alternatives() {
        let mut group = PatternGroup::new();
        group.push(PatternElement::Union(smallvec![one_two_three()]));
        assert_eq!(group.to_string(), "{ { <one> <two> \"three\" . } }");

        let mut group = PatternGroup::new();
        group.push(PatternElement::Union(smallvec![one_two_three(), PatternGroup::new()]));
        assert_eq!(
            group.to_string(),
            "{ { <one> <two> \"three\" . } UNION { } }"
        );
    }

    #[test]
    fn test_sub_query() {
        let mut sub = SubQuery::new(one_two_three());
        sub.projection.push(Variable::new("x"));
        sub.distinct = true;
        let mut group = PatternGroup::new();
        group.push(PatternElement::SubQuery(Box::new(sub)));
        assert_eq!(
            group.to_string(),
            "{ { SELECT DISTINCT ?x WHERE { <one> <two> \"three\" . } } }"
        );
    }

    #[test]
    fn test_pretty_layout() {
        let mut group = one_two_three();
        group.push(PatternElement::Optional(one_two_three()));
        assert_eq!(
            render(&group, RenderConfig::pretty()),
            "{\n  <one> <two> \"three\" .\n  OPTIONAL {\n    <one> <two> \"three\" .\n  }\n}"
        );
    }

    #[test]
    fn test_render_query_with_prefixes() {
        let mut prefixes = PrefixMapping::new();
        prefixes.set_prefix("ts", "urn:test:");
        let mut out = String::new();
        Renderer::new(&mut out, RenderConfig::default())
            .render_query(&prefixes, false, &[], &PatternGroup::new())
            .unwrap();
        assert_eq!(out, "PREFIX ts: <urn:test:> SELECT * WHERE { }");
    }
}
