//! Shorthand tokenizer.

use quarry_common::utils::error::{ParseError, ParseErrorKind, SourceSpan};

/// Token types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Terms
    /// `<...>`, without the brackets.
    IriRef(String),
    /// `prefix:local`
    PrefixedName {
        /// Prefix label, possibly empty.
        prefix: String,
        /// Local part, possibly empty.
        local: String,
    },
    /// `?name` or `$name`, without the sigil.
    Var(String),
    /// `_:label`, without `_:`.
    BlankNode(String),
    /// Quoted string, unescaped, with its optional `@lang` tag.
    String {
        /// Unescaped value.
        value: String,
        /// Language tag, if any.
        lang: Option<String>,
    },
    /// Unsigned integer text.
    Integer(String),
    /// Unsigned decimal text.
    Decimal(String),
    /// Unsigned double text.
    Double(String),
    /// Bare word: keywords, function names and plain values.
    Word(String),

    // Symbols
    LParen,      // (
    RParen,      // )
    Comma,       // ,
    Slash,       // /
    Pipe,        // |
    Caret,       // ^
    DoubleCaret, // ^^
    Star,        // *
    Plus,        // +
    Minus,       // -
    Question,    // ?
    Bang,        // !
    And,         // &&
    Or,          // ||
    Eq,          // =
    NotEq,       // !=
    Lt,          // <
    LtEq,        // <=
    Gt,          // >
    GtEq,        // >=

    /// End of input
    Eof,
}

impl TokenKind {
    /// Whether this token can end an operand. A `<` right after one is a
    /// comparison, never the start of an IRI.
    fn ends_operand(&self) -> bool {
        matches!(
            self,
            Self::IriRef(_)
                | Self::PrefixedName { .. }
                | Self::Var(_)
                | Self::BlankNode(_)
                | Self::String { .. }
                | Self::Integer(_)
                | Self::Decimal(_)
                | Self::Double(_)
                | Self::Word(_)
                | Self::RParen
        )
    }
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Source range.
    pub span: SourceSpan,
}

impl Token {
    fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            span: SourceSpan::new(start, end),
        }
    }
}

/// Characters allowed in variable names, bare words and prefix labels.
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Characters allowed in the local part of a prefixed name.
fn is_local_char(c: char) -> bool {
    is_name_char(c) || matches!(c, '-' | '.' | ':' | '%')
}

/// Characters that cannot appear inside `<...>`.
fn is_iri_excluded(c: char) -> bool {
    c.is_whitespace() || matches!(c, '<' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
}

/// Splits shorthand text into tokens.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    after_operand: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            after_operand: false,
        }
    }

    /// Tokenizes all input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    fn rest(&self) -> &'a str {
        let input = self.input;
        &input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        let input = self.input;
        &input[start..self.pos]
    }

    fn error(&self, kind: ParseErrorKind, message: impl Into<String>, start: usize) -> ParseError {
        ParseError::new(kind, message)
            .with_span(SourceSpan::new(start, self.pos))
            .with_token(self.input)
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();
        let start = self.pos;

        let Some(c) = self.next_char() else {
            return Ok(Token::new(TokenKind::Eof, start, start));
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '/' => TokenKind::Slash,
            '*' => TokenKind::Star,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '=' => TokenKind::Eq,
            '^' => {
                if self.eat('^') {
                    TokenKind::DoubleCaret
                } else {
                    TokenKind::Caret
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::Or
                } else {
                    TokenKind::Pipe
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::And
                } else {
                    return Err(self.error(ParseErrorKind::UnexpectedToken, "expected '&&'", start));
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '<' if self.after_operand => self.scan_less_than(),
            '<' => self.scan_iri_or_less_than(),
            '?' | '$' => {
                let name = self.take_while(is_name_char);
                if name.is_empty() {
                    if c == '$' {
                        return Err(self.error(
                            ParseErrorKind::MalformedVariable,
                            "expected a variable name after '$'",
                            start,
                        ));
                    }
                    TokenKind::Question
                } else {
                    TokenKind::Var(name.to_string())
                }
            }
            '"' | '\'' => self.scan_string(c, start)?,
            '_' if self.peek_char() == Some(':') => {
                self.next_char();
                let label = self.take_while(is_name_char);
                if label.is_empty() {
                    return Err(self.error(
                        ParseErrorKind::UnexpectedToken,
                        "expected a blank node label after '_:'",
                        start,
                    ));
                }
                TokenKind::BlankNode(label.to_string())
            }
            ':' => self.scan_local(String::new()),
            c if c.is_ascii_digit() => self.scan_number(start),
            c if is_name_char(c) => {
                self.take_while(is_name_char);
                let word = self.input[start..self.pos].to_string();
                if self.eat(':') {
                    self.scan_local(word)
                } else {
                    TokenKind::Word(word)
                }
            }
            other => {
                return Err(self.error(
                    ParseErrorKind::UnexpectedToken,
                    format!("unexpected character '{other}'"),
                    start,
                ));
            }
        };

        self.after_operand = kind.ends_operand();
        Ok(Token::new(kind, start, self.pos))
    }

    /// After `<`: an IRI reference when a `>` closes it before any excluded
    /// character, a comparison operator otherwise.
    fn scan_iri_or_less_than(&mut self) -> TokenKind {
        let rest = self.rest();
        if let Some(end) = rest.find(|c: char| c == '>' || is_iri_excluded(c)) {
            if rest[end..].starts_with('>') {
                let iri = rest[..end].to_string();
                self.pos += end + 1;
                return TokenKind::IriRef(iri);
            }
        }
        self.scan_less_than()
    }

    fn scan_less_than(&mut self) -> TokenKind {
        if self.eat('=') {
            TokenKind::LtEq
        } else {
            TokenKind::Lt
        }
    }

    fn scan_local(&mut self, prefix: String) -> TokenKind {
        let mut local = self.take_while(is_local_char);
        // A trailing '.' belongs to the surrounding text.
        while let Some(stripped) = local.strip_suffix('.') {
            self.pos -= 1;
            local = stripped;
        }
        TokenKind::PrefixedName {
            prefix,
            local: local.to_string(),
        }
    }

    fn scan_string(&mut self, quote: char, start: usize) -> Result<TokenKind, ParseError> {
        let mut value = String::new();
        loop {
            match self.next_char() {
                None => {
                    return Err(self.error(
                        ParseErrorKind::MalformedLiteral,
                        "unterminated string literal",
                        start,
                    ));
                }
                Some(c) if c == quote => break,
                Some('\\') => {
                    let escaped = match self.next_char() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some('\'') => '\'',
                        Some(c) => {
                            return Err(self.error(
                                ParseErrorKind::MalformedLiteral,
                                format!("invalid escape sequence '\\{c}'"),
                                start,
                            ));
                        }
                        None => {
                            return Err(self.error(
                                ParseErrorKind::MalformedLiteral,
                                "unterminated escape sequence",
                                start,
                            ));
                        }
                    };
                    value.push(escaped);
                }
                Some(c) => value.push(c),
            }
        }

        let lang = if self.eat('@') {
            let tag = self.take_while(|c| c.is_ascii_alphanumeric() || c == '-');
            if tag.is_empty() || tag.starts_with('-') {
                return Err(self.error(
                    ParseErrorKind::MalformedLiteral,
                    "expected a language tag after '@'",
                    start,
                ));
            }
            Some(tag.to_string())
        } else {
            None
        };

        Ok(TokenKind::String { value, lang })
    }

    fn scan_number(&mut self, start: usize) -> TokenKind {
        self.take_while(|c| c.is_ascii_digit());
        let mut decimal = false;
        if self.peek_char() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.next_char();
            self.take_while(|c| c.is_ascii_digit());
            decimal = true;
        }

        if matches!(self.peek_char(), Some('e' | 'E')) {
            let mark = self.pos;
            self.next_char();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.next_char();
            }
            if self.take_while(|c| c.is_ascii_digit()).is_empty() {
                self.pos = mark;
            } else {
                return TokenKind::Double(self.input[start..self.pos].to_string());
            }
        }

        let text = self.input[start..self.pos].to_string();
        if decimal {
            TokenKind::Decimal(text)
        } else {
            TokenKind::Integer(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_iri_versus_less_than() {
        assert_eq!(
            tokenize("<one>"),
            vec![TokenKind::IriRef("one".into()), TokenKind::Eof]
        );
        assert_eq!(
            tokenize("?one < 10"),
            vec![
                TokenKind::Var("one".into()),
                TokenKind::Lt,
                TokenKind::Integer("10".into()),
                TokenKind::Eof
            ]
        );
        assert_eq!(
            tokenize("?a <= ?b"),
            vec![
                TokenKind::Var("a".into()),
                TokenKind::LtEq,
                TokenKind::Var("b".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_less_than_after_operand() {
        assert_eq!(
            tokenize("?a<?b&&?c>1"),
            vec![
                TokenKind::Var("a".into()),
                TokenKind::Lt,
                TokenKind::Var("b".into()),
                TokenKind::And,
                TokenKind::Var("c".into()),
                TokenKind::Gt,
                TokenKind::Integer("1".into()),
                TokenKind::Eof
            ]
        );
        assert_eq!(
            tokenize("STR(?a)<=<b>"),
            vec![
                TokenKind::Word("STR".into()),
                TokenKind::LParen,
                TokenKind::Var("a".into()),
                TokenKind::RParen,
                TokenKind::LtEq,
                TokenKind::IriRef("b".into()),
                TokenKind::Eof
            ]
        );
        assert_eq!(
            tokenize("?a=<b>&&(<c>)"),
            vec![
                TokenKind::Var("a".into()),
                TokenKind::Eq,
                TokenKind::IriRef("b".into()),
                TokenKind::And,
                TokenKind::LParen,
                TokenKind::IriRef("c".into()),
                TokenKind::RParen,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_prefixed_names() {
        assert_eq!(
            tokenize("ts:two :x"),
            vec![
                TokenKind::PrefixedName {
                    prefix: "ts".into(),
                    local: "two".into()
                },
                TokenKind::PrefixedName {
                    prefix: String::new(),
                    local: "x".into()
                },
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_strings_and_tags() {
        assert_eq!(
            tokenize(r#""chat"@fr 'it'"#)[0],
            TokenKind::String {
                value: "chat".into(),
                lang: Some("fr".into())
            }
        );
        assert_eq!(
            tokenize(r#""10"^^<int>"#),
            vec![
                TokenKind::String {
                    value: "10".into(),
                    lang: None
                },
                TokenKind::DoubleCaret,
                TokenKind::IriRef("int".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("\"three").tokenize().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MalformedLiteral);
        assert_eq!(err.span, SourceSpan::new(0, 6));
        assert_eq!(err.token, "\"three");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokenize("1 2.5 3e10 4.0E-2"),
            vec![
                TokenKind::Integer("1".into()),
                TokenKind::Decimal("2.5".into()),
                TokenKind::Double("3e10".into()),
                TokenKind::Double("4.0E-2".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_path_operators() {
        assert_eq!(
            tokenize("^<p>|<q>*"),
            vec![
                TokenKind::Caret,
                TokenKind::IriRef("p".into()),
                TokenKind::Pipe,
                TokenKind::IriRef("q".into()),
                TokenKind::Star,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            tokenize("<p>?"),
            vec![TokenKind::IriRef("p".into()), TokenKind::Question, TokenKind::Eof]
        );
    }

    #[test]
    fn test_blank_nodes_and_words() {
        assert_eq!(
            tokenize("_:b0 rand a"),
            vec![
                TokenKind::BlankNode("b0".into()),
                TokenKind::Word("rand".into()),
                TokenKind::Word("a".into()),
                TokenKind::Eof
            ]
        );
    }
}
