//! Shorthand parser.
//!
//! Turns tokenized shorthand into typed terms, paths and expressions.

use quarry_common::utils::error::{ParseError, ParseErrorKind, SourceSpan};
use quarry_common::vocab::xsd;
use quarry_core::expr::{BinaryOp, Expression, Function, UnaryOp};
use quarry_core::path::Path;
use quarry_core::prefix::PrefixMapping;
use quarry_core::term::{Iri, Literal, Term, Variable};

use super::lexer::{Lexer, Token, TokenKind};

type Result<T> = std::result::Result<T, ParseError>;

/// Shorthand parser.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    source: &'a str,
    prefixes: &'a PrefixMapping,
}

impl<'a> Parser<'a> {
    /// Tokenizes `source` and prepares to parse it against `prefixes`.
    pub fn new(source: &'a str, prefixes: &'a PrefixMapping) -> Result<Self> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            source,
            prefixes,
        })
    }

    /// Parses the whole input as one term.
    pub fn parse_term_only(&mut self) -> Result<Term> {
        let term = self.parse_term()?;
        self.expect_end()?;
        Ok(term)
    }

    /// Parses the whole input as one path.
    pub fn parse_path_only(&mut self) -> Result<Path> {
        let path = self.parse_path()?;
        self.expect_end()?;
        Ok(path)
    }

    /// Parses the whole input as one expression.
    pub fn parse_expression_only(&mut self) -> Result<Expression> {
        let expr = self.parse_expression()?;
        self.expect_end()?;
        Ok(expr)
    }

    /// Parses the whole input as one variable.
    pub fn parse_variable_only(&mut self) -> Result<Variable> {
        let var = match self.current_kind() {
            TokenKind::Var(name) => Variable::new(name),
            TokenKind::Word(name) => Variable::new(name),
            _ => {
                return Err(self.error(ParseErrorKind::MalformedVariable, "expected a variable"));
            }
        };
        self.advance();
        self.expect_end()?;
        Ok(var)
    }

    fn expect_end(&self) -> Result<()> {
        if self.check(&TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.error(
                ParseErrorKind::UnexpectedToken,
                format!("unexpected trailing {:?}", self.current_kind()),
            ))
        }
    }

    // Terms

    fn parse_term(&mut self) -> Result<Term> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::IriRef(iri) => {
                self.advance();
                Ok(Term::iri(iri))
            }
            TokenKind::PrefixedName { prefix, local } => {
                let iri = self.expand(&prefix, &local, token.span)?;
                self.advance();
                Ok(Term::Iri(iri))
            }
            TokenKind::Var(name) => {
                self.advance();
                Ok(Term::var(name))
            }
            TokenKind::BlankNode(label) => {
                self.advance();
                Ok(Term::blank(label))
            }
            TokenKind::String { value, lang } => {
                self.advance();
                self.parse_literal_suffix(value, lang).map(Term::Literal)
            }
            TokenKind::Integer(_) | TokenKind::Decimal(_) | TokenKind::Double(_) => {
                self.parse_number("").map(Term::Literal)
            }
            TokenKind::Plus | TokenKind::Minus => {
                let sign = if self.check(&TokenKind::Minus) { "-" } else { "+" };
                self.advance();
                self.parse_number(sign).map(Term::Literal)
            }
            TokenKind::Word(word) => {
                self.advance();
                Ok(word_term(&word))
            }
            TokenKind::Lt | TokenKind::LtEq => Err(self.error(
                ParseErrorKind::MalformedIri,
                "IRI reference is not terminated by '>' or contains illegal characters",
            )),
            TokenKind::Question => Err(self.error(
                ParseErrorKind::MalformedVariable,
                "expected a variable name after '?'",
            )),
            TokenKind::Eof => Err(self.error(ParseErrorKind::UnexpectedEnd, "expected a term")),
            other => Err(self.error(
                ParseErrorKind::UnexpectedToken,
                format!("expected a term, found {other:?}"),
            )),
        }
    }

    fn parse_literal_suffix(&mut self, value: String, lang: Option<String>) -> Result<Literal> {
        if let Some(lang) = lang {
            return Ok(Literal::lang(value, lang));
        }
        if !self.check(&TokenKind::DoubleCaret) {
            return Ok(Literal::simple(value));
        }
        self.advance();
        let token = self.current().clone();
        let datatype = match token.kind {
            TokenKind::IriRef(iri) => Iri::new(iri),
            TokenKind::PrefixedName { prefix, local } => self.expand(&prefix, &local, token.span)?,
            _ => {
                return Err(self.error(
                    ParseErrorKind::MalformedLiteral,
                    "expected a datatype IRI after '^^'",
                ));
            }
        };
        self.advance();
        Ok(Literal::typed(value, datatype))
    }

    fn parse_number(&mut self, sign: &str) -> Result<Literal> {
        let (text, datatype) = match self.current_kind() {
            TokenKind::Integer(text) => (text.clone(), xsd::INTEGER),
            TokenKind::Decimal(text) => (text.clone(), xsd::DECIMAL),
            TokenKind::Double(text) => (text.clone(), xsd::DOUBLE),
            _ => {
                return Err(self.error(ParseErrorKind::MalformedLiteral, "expected a number"));
            }
        };
        self.advance();
        Ok(Literal::typed(format!("{sign}{text}"), Iri::new(datatype)))
    }

    fn expand(&self, prefix: &str, local: &str, span: SourceSpan) -> Result<Iri> {
        self.prefixes.expand(prefix, local).map(Iri::new).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::UnknownPrefix,
                format!("no namespace registered for prefix '{prefix}:'"),
            )
            .with_span(SourceSpan::new(span.start, span.start + prefix.len() + 1))
            .with_token(self.source)
        })
    }

    // Paths

    fn parse_path(&mut self) -> Result<Path> {
        let mut steps = vec![self.parse_path_step()?];
        while self.check(&TokenKind::Slash) {
            self.advance();
            steps.push(self.parse_path_step()?);
        }
        self.reject_path_operator()?;
        Path::sequence(steps)
            .ok_or_else(|| self.error(ParseErrorKind::MalformedPath, "empty path"))
    }

    fn parse_path_step(&mut self) -> Result<Path> {
        self.reject_path_operator()?;
        let token = self.current().clone();
        let step = match token.kind {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_path()?;
                self.expect(&TokenKind::RParen, ParseErrorKind::MalformedPath)?;
                inner
            }
            TokenKind::IriRef(iri) => {
                self.advance();
                Path::predicate(Iri::new(iri))
            }
            TokenKind::PrefixedName { prefix, local } => {
                let iri = self.expand(&prefix, &local, token.span)?;
                self.advance();
                Path::predicate(iri)
            }
            TokenKind::Word(word) if word == "a" => {
                self.advance();
                Path::predicate(Iri::rdf_type())
            }
            TokenKind::Var(name) => {
                self.advance();
                Path::predicate(Variable::new(name))
            }
            TokenKind::Lt | TokenKind::LtEq => {
                return Err(self.error(
                    ParseErrorKind::MalformedIri,
                    "IRI reference is not terminated by '>' or contains illegal characters",
                ));
            }
            TokenKind::Eof => {
                return Err(self.error(ParseErrorKind::UnexpectedEnd, "expected a path step"));
            }
            other => {
                return Err(self.error(
                    ParseErrorKind::MalformedPath,
                    format!("expected a predicate, found {other:?}"),
                ));
            }
        };
        self.reject_path_operator()?;
        Ok(step)
    }

    /// Fails on `|`, `^`, `!` and the `* + ?` modifiers.
    fn reject_path_operator(&self) -> Result<()> {
        let op = match self.current_kind() {
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Bang => "!",
            TokenKind::Star => "*",
            TokenKind::Plus => "+",
            TokenKind::Question => "?",
            _ => return Ok(()),
        };
        Err(self.error(
            ParseErrorKind::UnsupportedPath,
            format!("path operator '{op}' is not supported; only '/' sequences are"),
        ))
    }

    // Expressions

    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_or_expression()
    }

    fn parse_or_expression(&mut self) -> Result<Expression> {
        let mut left = self.parse_and_expression()?;
        while self.check(&TokenKind::Or) {
            self.advance();
            let right = self.parse_and_expression()?;
            left = Expression::binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and_expression(&mut self) -> Result<Expression> {
        let mut left = self.parse_relational_expression()?;
        while self.check(&TokenKind::And) {
            self.advance();
            let right = self.parse_relational_expression()?;
            left = Expression::binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_relational_expression(&mut self) -> Result<Expression> {
        let left = self.parse_additive_expression()?;

        let op = match self.current_kind() {
            TokenKind::Eq => Some(BinaryOp::Eq),
            TokenKind::NotEq => Some(BinaryOp::NotEq),
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::LtEq => Some(BinaryOp::LtEq),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::GtEq => Some(BinaryOp::GtEq),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let right = self.parse_additive_expression()?;
            return Ok(Expression::binary(op, left, right));
        }

        if self.check_keyword("IN") {
            self.advance();
            let list = self.parse_argument_list()?;
            return Ok(Expression::In {
                operand: Box::new(left),
                list,
                negated: false,
            });
        }
        if self.check_keyword("NOT") && self.peek_keyword("IN") {
            self.advance();
            self.advance();
            let list = self.parse_argument_list()?;
            return Ok(Expression::In {
                operand: Box::new(left),
                list,
                negated: true,
            });
        }

        Ok(left)
    }

    fn parse_additive_expression(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplicative_expression()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative_expression()?;
            left = Expression::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative_expression(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary_expression()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary_expression()?;
            left = Expression::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> Result<Expression> {
        let op = match self.current_kind() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            _ => return self.parse_primary_expression(),
        };
        self.advance();
        let operand = self.parse_unary_expression()?;
        Ok(Expression::unary(op, operand))
    }

    fn parse_primary_expression(&mut self) -> Result<Expression> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen, ParseErrorKind::MalformedExpression)?;
                Ok(inner)
            }
            TokenKind::Var(name) => {
                self.advance();
                Ok(Expression::var(name))
            }
            TokenKind::IriRef(_) | TokenKind::PrefixedName { .. } => {
                let Term::Iri(iri) = self.parse_term()? else {
                    return Err(self.error(ParseErrorKind::MalformedExpression, "expected an IRI"));
                };
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_argument_list()?;
                    Ok(Expression::Call {
                        function: Function::Iri(iri),
                        args,
                    })
                } else {
                    Ok(Expression::constant(iri))
                }
            }
            TokenKind::String { .. }
            | TokenKind::Integer(_)
            | TokenKind::Decimal(_)
            | TokenKind::Double(_)
            | TokenKind::BlankNode(_) => self.parse_term().map(Expression::Term),
            TokenKind::Word(word) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_argument_list()?;
                    return Ok(Expression::call(word, args));
                }
                match word.as_str() {
                    "true" => Ok(Expression::constant(Literal::boolean(true))),
                    "false" => Ok(Expression::constant(Literal::boolean(false))),
                    _ => Err(ParseError::new(
                        ParseErrorKind::MalformedExpression,
                        format!("unexpected word '{word}'"),
                    )
                    .with_span(token.span)
                    .with_token(self.source)),
                }
            }
            TokenKind::Eof => Err(self.error(
                ParseErrorKind::UnexpectedEnd,
                "expected an expression",
            )),
            other => Err(self.error(
                ParseErrorKind::MalformedExpression,
                format!("expected an expression, found {other:?}"),
            )),
        }
    }

    /// `( [expr (, expr)*] )`
    fn parse_argument_list(&mut self) -> Result<Vec<Expression>> {
        self.expect(&TokenKind::LParen, ParseErrorKind::MalformedExpression)?;
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&TokenKind::RParen, ParseErrorKind::MalformedExpression)?;
        Ok(args)
    }

    // Helpers

    fn current(&self) -> &Token {
        // The token list always ends with Eof and `advance` never moves past it.
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        matches!(self.current_kind(), TokenKind::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(
            self.tokens.get(self.position + 1).map(|t| &t.kind),
            Some(TokenKind::Word(w)) if w.eq_ignore_ascii_case(keyword)
        )
    }

    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn expect(&mut self, kind: &TokenKind, error_kind: ParseErrorKind) -> Result<()> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(
                error_kind,
                format!("expected {kind:?}, found {:?}", self.current_kind()),
            ))
        }
    }

    fn error(&self, kind: ParseErrorKind, message: impl Into<String>) -> ParseError {
        ParseError::new(kind, message)
            .with_span(self.current().span)
            .with_token(self.source)
    }
}

/// Resolves a bare word in term position.
pub(super) fn word_term(word: &str) -> Term {
    match word {
        "a" => Term::Iri(Iri::rdf_type()),
        "true" => Term::Literal(Literal::boolean(true)),
        "false" => Term::Literal(Literal::boolean(false)),
        _ => Term::literal(word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> PrefixMapping {
        let mut pm = PrefixMapping::new();
        pm.set_prefix("ts", "urn:test:");
        pm
    }

    fn term(source: &str) -> Result<Term> {
        let pm = prefixes();
        Parser::new(source, &pm)?.parse_term_only()
    }

    fn path(source: &str) -> Result<Path> {
        let pm = prefixes();
        Parser::new(source, &pm)?.parse_path_only()
    }

    fn expr(source: &str) -> Result<Expression> {
        let pm = prefixes();
        Parser::new(source, &pm)?.parse_expression_only()
    }

    #[test]
    fn test_parse_terms() {
        assert_eq!(term("<one>").unwrap(), Term::iri("one"));
        assert_eq!(term("ts:two").unwrap(), Term::iri("urn:test:two"));
        assert_eq!(term("?v").unwrap(), Term::var("v"));
        assert_eq!(term("_:b0").unwrap(), Term::blank("b0"));
        assert_eq!(term("a").unwrap(), Term::Iri(Iri::rdf_type()));
        assert_eq!(term("'three'").unwrap(), Term::literal("three"));
        assert_eq!(
            term("-5").unwrap(),
            Term::Literal(Literal::typed("-5", Iri::new(xsd::INTEGER)))
        );
    }

    #[test]
    fn test_parse_typed_literal() {
        assert_eq!(
            term("\"10\"^^ts:int").unwrap(),
            Term::Literal(Literal::typed("10", Iri::new("urn:test:int")))
        );
        assert_eq!(
            term("\"chat\"@fr").unwrap(),
            Term::Literal(Literal::lang("chat", "fr"))
        );
        let err = term("\"10\"^^").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MalformedLiteral);
    }

    #[test]
    fn test_unknown_prefix() {
        let err = term("xx:two").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownPrefix);
        assert_eq!(err.span, SourceSpan::new(0, 3));
        assert_eq!(err.token, "xx:two");
    }

    #[test]
    fn test_malformed_iri() {
        assert_eq!(term("<one").unwrap_err().kind, ParseErrorKind::MalformedIri);
        assert_eq!(term("<one two>").unwrap_err().kind, ParseErrorKind::MalformedIri);
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = term("<one> ?two").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
        assert_eq!(err.span, SourceSpan::new(6, 10));
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(path("<two>").unwrap(), Path::predicate(Iri::new("two")));
        let seq = path("<two>/ts:dos").unwrap();
        assert_eq!(seq.to_string(), "<two>/<urn:test:dos>");
        let grouped = path("(<a>/<b>)/<c>").unwrap();
        assert!(matches!(&grouped, Path::Sequence(steps) if steps.len() == 3));
        assert_eq!(path("?p").unwrap(), Path::predicate(Variable::new("p")));
    }

    #[test]
    fn test_unsupported_path_operators() {
        for source in ["<a>|<b>", "^<a>", "<a>*", "<a>+", "<a>?", "!<a>", "<a>/<b>*"] {
            assert_eq!(
                path(source).unwrap_err().kind,
                ParseErrorKind::UnsupportedPath,
                "{source}"
            );
        }
        assert_eq!(path("<a>/").unwrap_err().kind, ParseErrorKind::UnexpectedEnd);
        assert_eq!(path("(<a>").unwrap_err().kind, ParseErrorKind::MalformedPath);
    }

    #[test]
    fn test_parse_expressions() {
        assert_eq!(expr("?one < 10").unwrap().to_string(), "?one < 10");
        assert_eq!(expr("rand()").unwrap(), Expression::call("RAND", vec![]));
        assert_eq!(
            expr("(?a + ?b) * ?c").unwrap().to_string(),
            "(?a + ?b) * ?c"
        );
        assert_eq!(
            expr("?a < 1 || ?b > 2 && !bound(?c)").unwrap().to_string(),
            "?a < 1 || ?b > 2 && !BOUND(?c)"
        );
        assert_eq!(
            expr("?x not in (1, 'two')").unwrap().to_string(),
            "?x NOT IN (1, \"two\")"
        );
        assert_eq!(
            expr("ts:fn(?x)").unwrap().to_string(),
            "<urn:test:fn>(?x)"
        );
    }

    #[test]
    fn test_unspaced_comparisons() {
        assert_eq!(
            expr("?a<?b&&?c>1").unwrap().to_string(),
            "?a < ?b && ?c > 1"
        );
        assert_eq!(expr("?a!=<b>").unwrap().to_string(), "?a != <b>");
    }

    #[test]
    fn test_expression_errors() {
        assert_eq!(expr("?a <").unwrap_err().kind, ParseErrorKind::UnexpectedEnd);
        assert_eq!(expr("(?a").unwrap_err().kind, ParseErrorKind::MalformedExpression);
        assert_eq!(expr("three").unwrap_err().kind, ParseErrorKind::MalformedExpression);
        assert_eq!(expr("?a ?b").unwrap_err().kind, ParseErrorKind::UnexpectedToken);
    }
}
