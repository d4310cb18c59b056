//! Shorthand resolver.
//!
//! Builder methods accept SPARQL-like shorthand strings wherever a term,
//! path, expression or variable is expected. The functions here resolve such
//! strings against a prefix mapping:
//!
//! | Shorthand            | Result                                  |
//! |----------------------|-----------------------------------------|
//! | `<iri>`              | IRI                                     |
//! | `pfx:local`          | IRI expanded through the prefix mapping |
//! | `?v`, `$v`           | variable                                |
//! | `_:x`                | blank node                              |
//! | `"s"`, `'s'@en`      | literal, optionally `^^datatype`        |
//! | `10`, `1.5`, `1e3`   | `xsd:integer`, `xsd:decimal`, `xsd:double` |
//! | `true`, `false`      | `xsd:boolean`                           |
//! | `a`                  | `rdf:type`                              |
//! | any other bare text  | plain literal                           |

mod lexer;
mod parser;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;

use quarry_common::utils::error::{ParseError, ParseErrorKind, SourceSpan};
use quarry_core::expr::Expression;
use quarry_core::path::Path;
use quarry_core::prefix::PrefixMapping;
use quarry_core::term::{Term, Variable};

type Result<T> = std::result::Result<T, ParseError>;

fn empty_input(token: &str) -> ParseError {
    ParseError::new(ParseErrorKind::UnexpectedEnd, "empty input")
        .with_span(SourceSpan::at(token.len()))
        .with_token(token)
}

/// Splits surrounding whitespace off `token`, returning the trimmed text and
/// the length of the leading whitespace. Errors on the trimmed text are
/// reported against `token` through [`ParseError::within`].
fn trimmed(token: &str) -> Result<(&str, usize)> {
    let rest = token.trim_start();
    let text = rest.trim_end();
    if text.is_empty() {
        return Err(empty_input(token));
    }
    Ok((text, token.len() - rest.len()))
}

/// Bare text that is not shorthand syntax: starts with a letter and carries
/// no prefix separator or call parentheses.
fn is_plain_text(token: &str) -> bool {
    token.starts_with(char::is_alphabetic) && !token.contains([':', '(', ')'])
}

/// Resolves a term token.
///
/// # Errors
///
/// Returns a [`ParseError`] for an unknown prefix, an unterminated IRI or
/// literal, or trailing input after the term.
pub fn resolve_term(token: &str, prefixes: &PrefixMapping) -> Result<Term> {
    let (text, lead) = trimmed(token)?;
    if is_plain_text(text) {
        return Ok(parser::word_term(text));
    }
    Parser::new(text, prefixes)
        .and_then(|mut p| p.parse_term_only())
        .map_err(|e| e.within(token, lead))
}

/// Resolves a predicate or `/`-sequence path token.
///
/// # Errors
///
/// Returns [`ParseErrorKind::UnsupportedPath`] for path operators other than
/// `/`, and other [`ParseError`]s for malformed steps.
pub fn resolve_path(token: &str, prefixes: &PrefixMapping) -> Result<Path> {
    let (text, lead) = trimmed(token)?;
    Parser::new(text, prefixes)
        .and_then(|mut p| p.parse_path_only())
        .map_err(|e| e.within(token, lead))
}

/// Resolves an expression token such as `?one < 10` or `rand()`.
///
/// # Errors
///
/// Returns a [`ParseError`] when the expression is malformed.
pub fn resolve_expression(token: &str, prefixes: &PrefixMapping) -> Result<Expression> {
    let (text, lead) = trimmed(token)?;
    Parser::new(text, prefixes)
        .and_then(|mut p| p.parse_expression_only())
        .map_err(|e| e.within(token, lead))
}

/// Resolves a variable token: `?name`, `$name` or a bare `name`.
///
/// # Errors
///
/// Returns [`ParseErrorKind::MalformedVariable`] for anything else.
pub fn resolve_variable(token: &str) -> Result<Variable> {
    let (text, lead) = trimmed(token)?;
    Parser::new(text, &PrefixMapping::new())
        .and_then(|mut p| p.parse_variable_only())
        .map_err(|e| e.within(token, lead))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quarry_core::term::{Iri, Literal};

    #[test]
    fn test_bare_text_is_plain_literal() {
        let pm = PrefixMapping::new();
        assert_eq!(resolve_term("three", &pm).unwrap(), Term::literal("three"));
        assert_eq!(
            resolve_term("hello world", &pm).unwrap(),
            Term::literal("hello world")
        );
        assert_eq!(resolve_term("a", &pm).unwrap(), Term::Iri(Iri::rdf_type()));
        assert_eq!(
            resolve_term("true", &pm).unwrap(),
            Term::Literal(Literal::boolean(true))
        );
    }

    #[test]
    fn test_whitespace_trimmed() {
        let pm = PrefixMapping::new();
        assert_eq!(resolve_term("  <one> ", &pm).unwrap(), Term::iri("one"));
        assert_eq!(resolve_term("  ", &pm).unwrap_err().kind, ParseErrorKind::UnexpectedEnd);
    }

    #[test]
    fn test_error_located_in_untrimmed_token() {
        let pm = PrefixMapping::new();
        let err = resolve_term("  xx:one ", &pm).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownPrefix);
        assert_eq!(err.token, "  xx:one ");
        assert_eq!(err.span, SourceSpan::new(2, 5));
        assert_eq!(&err.token[err.span.start..err.span.end], "xx:");

        let err = resolve_expression(" ?a < ", &pm).unwrap_err();
        assert_eq!(err.token, " ?a < ");
        assert!(err.span.start >= 1);
    }

    #[test]
    fn test_resolve_variable() {
        assert_eq!(resolve_variable("?foo").unwrap().name(), "foo");
        assert_eq!(resolve_variable("$foo").unwrap().name(), "foo");
        assert_eq!(resolve_variable("foo").unwrap().name(), "foo");
        assert_eq!(
            resolve_variable("<foo>").unwrap_err().kind,
            ParseErrorKind::MalformedVariable
        );
        assert_eq!(
            resolve_variable("?").unwrap_err().kind,
            ParseErrorKind::MalformedVariable
        );
    }

    #[test]
    fn test_unknown_prefix_in_path() {
        let err = resolve_path("<two>/xx:dos", &PrefixMapping::new()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownPrefix);
        assert_eq!(err.token, "<two>/xx:dos");
    }

    proptest! {
        #[test]
        fn test_resolvers_never_panic(input in "\\PC{0,24}") {
            let pm = PrefixMapping::new();
            let _ = resolve_term(&input, &pm);
            let _ = resolve_path(&input, &pm);
            let _ = resolve_expression(&input, &pm);
            let _ = resolve_variable(&input);
        }

        #[test]
        fn test_variable_names_resolve(name in "[a-zA-Z_][a-zA-Z0-9_]{0,12}") {
            let var = resolve_variable(&format!("?{name}")).unwrap();
            prop_assert_eq!(var.name(), name.as_str());
        }
    }
}
