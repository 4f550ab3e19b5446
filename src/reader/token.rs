//! Module for extracting Lisp tokens from source text.

use std::fmt::{Display, Formatter};

use crate::reader::{ReadErr, ReadResult};

/// Kind of a token.
///
/// Whitespace is a token of its own (`Ignored`); the parser discards it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    EndOfInput,
    Ignored,
    LeftParen,
    RightParen,
    SingleQuote,
    DoubleQuote,
    /// `""`, recognized as a single unit.
    DoubleQuotePair,
    Symbol,
    Integer,
}

impl TokenKind {
    /// Human-readable name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::EndOfInput => "EOF",
            TokenKind::Ignored => "Ignored",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::SingleQuote => "'",
            TokenKind::DoubleQuote => "\"",
            TokenKind::DoubleQuotePair => "\"\"",
            TokenKind::Symbol => "Symbol",
            TokenKind::Integer => "Int",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A token, with the line (1-indexed) at which it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub kind: TokenKind,
    pub line: usize,
}

impl<'a> Token<'a> {
    fn new(text: &'a str, kind: TokenKind, line: usize) -> Self {
        Token { text, kind, line }
    }
}

mod regex {
    use regex::Regex;
    use std::sync::OnceLock;

    pub(super) fn ignored() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"\A[\t\n\x0B\x0C\r ]+").expect("could not compile regex for whitespace")
        })
    }

    pub(super) fn integer() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| Regex::new(r"\A[0-9]+").expect("could not compile regex for integer"))
    }

    pub(super) fn symbol() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            // Digits may follow, but not lead.
            Regex::new(r#"\A[^0-9()'"\t\n\x0B\x0C\r ][^()'"\t\n\x0B\x0C\r ]*"#)
                .expect("could not compile regex for symbol")
        })
    }

    pub(super) fn string_body() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        // No escapes: the body runs to the next quote.
        MATCH.get_or_init(|| Regex::new(r#"\A[^"]*"#).expect("could not compile regex for string"))
    }
}

/// Count the line breaks in the text.
///
/// "\r\n" and "\n\r" are each a single break; a lone '\r' or '\n' is one break.
fn line_breaks(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1)) {
            (b'\r', Some(b'\n')) | (b'\n', Some(b'\r')) => {
                count += 1;
                i += 2;
            }
            (b'\r' | b'\n', _) => {
                count += 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    count
}

/// Scanner over in-memory source text, with one token of lookahead.
pub struct Tokenizer<'a> {
    remainder: &'a str,
    line: usize,
    lookahead: Option<Token<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            remainder: input,
            line: 1,
            lookahead: None,
        }
    }

    /// Current line of the cursor. Does not account for a buffered token.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> ReadResult<Token<'a>> {
        match self.lookahead.take() {
            Some(token) => Ok(token),
            None => self.scan_token(),
        }
    }

    /// Kind of the next token, without consuming it.
    pub fn peek_kind(&mut self) -> ReadResult<TokenKind> {
        if let Some(token) = &self.lookahead {
            return Ok(token.kind);
        }
        let token = self.scan_token()?;
        self.lookahead = Some(token);
        Ok(token.kind)
    }

    /// Consume the next token, requiring it to be of the given kind.
    pub fn expect(&mut self, kind: TokenKind) -> ReadResult<Token<'a>> {
        tracing::trace!("expecting {}", kind);
        let token = self.next_token()?;
        if token.kind == kind {
            Ok(token)
        } else if token.kind == TokenKind::EndOfInput {
            Err(ReadErr::Incomplete {
                expected: kind,
                line: token.line,
            })
        } else {
            Err(ReadErr::Syntax {
                expected: kind,
                found: token.text.to_owned(),
                line: token.line,
            })
        }
    }

    /// Consume a whitespace token, if one is next.
    pub fn skip_ignored(&mut self) -> ReadResult<()> {
        if self.peek_kind()? == TokenKind::Ignored {
            self.expect(TokenKind::Ignored)?;
        }
        Ok(())
    }

    /// Scan a string body and its closing quote, after the opening quote has been consumed.
    ///
    /// The closing quote is taken as a single `"` even if another follows it.
    pub fn scan_string(&mut self) -> ReadResult<&'a str> {
        if let Some(token) = &self.lookahead {
            return Err(ReadErr::Internal {
                message: format!("string body requested with '{}' buffered", token.text),
                line: token.line,
            });
        }
        let body = self.scan_pattern(regex::string_body())?;
        self.advance(body.len());
        self.line += line_breaks(body);

        if self.remainder.starts_with('"') {
            self.advance(1);
            Ok(body)
        } else {
            Err(ReadErr::Incomplete {
                expected: TokenKind::DoubleQuote,
                line: self.line,
            })
        }
    }

    fn advance(&mut self, n: usize) {
        self.remainder = &self.remainder[n..];
    }

    fn scan_pattern(&self, pattern: &::regex::Regex) -> ReadResult<&'a str> {
        let remainder: &'a str = self.remainder;
        pattern
            .find(remainder)
            .map(|m| m.as_str())
            .ok_or_else(|| ReadErr::Internal {
                message: format!(
                    "no token rule matches {:?}",
                    remainder.chars().next().unwrap_or_default()
                ),
                line: self.line,
            })
    }

    /// Take a token of `n` bytes from the front of the input.
    fn take(&mut self, n: usize, kind: TokenKind) -> Token<'a> {
        let remainder: &'a str = self.remainder;
        let token = Token::new(&remainder[..n], kind, self.line);
        self.advance(n);
        token
    }

    fn scan_token(&mut self) -> ReadResult<Token<'a>> {
        let Some(first) = self.remainder.chars().next() else {
            return Ok(Token::new("EOF", TokenKind::EndOfInput, self.line));
        };

        let token = match first {
            '(' => self.take(1, TokenKind::LeftParen),
            ')' => self.take(1, TokenKind::RightParen),
            '\'' => self.take(1, TokenKind::SingleQuote),
            '"' if self.remainder.starts_with("\"\"") => self.take(2, TokenKind::DoubleQuotePair),
            '"' => self.take(1, TokenKind::DoubleQuote),
            '0'..='9' => {
                let matched = self.scan_pattern(regex::integer())?;
                self.take(matched.len(), TokenKind::Integer)
            }
            '\t' | '\n' | '\x0B' | '\x0C' | '\r' | ' ' => {
                let matched = self.scan_pattern(regex::ignored())?;
                // Whitespace is reported at the line it starts on.
                let token = self.take(matched.len(), TokenKind::Ignored);
                self.line += line_breaks(matched);
                token
            }
            _ => {
                let matched = self.scan_pattern(regex::symbol())?;
                self.take(matched.len(), TokenKind::Symbol)
            }
        };
        Ok(token)
    }
}

/// Split the input into its constituent tokens, ending with `EndOfInput`.
///
/// String bodies are not recognized here; a quote is just a quote.
pub fn tokenize(input: &str) -> ReadResult<Vec<Token<'_>>> {
    let mut tokenizer = Tokenizer::new(input);
    let mut result = Vec::new();
    loop {
        let token = tokenizer.next_token()?;
        let done = token.kind == TokenKind::EndOfInput;
        result.push(token);
        if done {
            return Ok(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_text(input: &str) -> ReadResult<Vec<(TokenKind, String)>> {
        Ok(tokenize(input)?
            .into_iter()
            .map(|t| (t.kind, t.text.to_owned()))
            .collect())
    }

    #[test]
    fn recognize_symbols() {
        for sym in [
            "hello",
            "+",
            "tree->list",
            "operator<>",
            "Queryable?",
            "x1",
            "-5",
        ] {
            let r = super::regex::symbol();
            let m = r.find(sym).map(|m| m.as_str());
            assert_eq!(m, Some(sym), "did not find symbol {}", sym);
        }
        assert!(super::regex::symbol().find("1x").is_none());
    }

    #[test]
    fn tokenize_call() -> ReadResult<()> {
        let output = kinds_and_text("(add 1 2)")?;
        let want = [
            (TokenKind::LeftParen, "("),
            (TokenKind::Symbol, "add"),
            (TokenKind::Ignored, " "),
            (TokenKind::Integer, "1"),
            (TokenKind::Ignored, " "),
            (TokenKind::Integer, "2"),
            (TokenKind::RightParen, ")"),
            (TokenKind::EndOfInput, "EOF"),
        ];

        assert_eq!(output.len(), want.len());
        for (i, (got, want)) in output.iter().zip(want.iter()).enumerate() {
            assert_eq!(got.0, want.0, "unexpected token kind in case {}", i);
            assert_eq!(got.1, want.1, "unexpected token text in case {}", i);
        }
        Ok(())
    }

    #[test]
    fn tokenize_quotes() -> ReadResult<()> {
        let output: Vec<TokenKind> = tokenize("'(\"\" \"x\")")?
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            output,
            vec![
                TokenKind::SingleQuote,
                TokenKind::LeftParen,
                TokenKind::DoubleQuotePair,
                TokenKind::Ignored,
                TokenKind::DoubleQuote,
                TokenKind::Symbol,
                TokenKind::DoubleQuote,
                TokenKind::RightParen,
                TokenKind::EndOfInput,
            ]
        );
        Ok(())
    }

    #[test]
    fn maximal_munch() -> ReadResult<()> {
        let output = kinds_and_text("12345abc \t\x0B\x0C  x9(")?;
        assert_eq!(output[0], (TokenKind::Integer, "12345".to_owned()));
        assert_eq!(output[1], (TokenKind::Symbol, "abc".to_owned()));
        assert_eq!(output[2], (TokenKind::Ignored, " \t\x0B\x0C  ".to_owned()));
        assert_eq!(output[3], (TokenKind::Symbol, "x9".to_owned()));
        assert_eq!(output[4], (TokenKind::LeftParen, "(".to_owned()));
        Ok(())
    }

    #[test]
    fn line_numbers() -> ReadResult<()> {
        let tokens = tokenize("a\nb\r\nc\n\rd\r\re\n\n f")?;
        let lines: Vec<(&str, usize)> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Symbol)
            .map(|t| (t.text, t.line))
            .collect();
        assert_eq!(
            lines,
            vec![("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 6), ("f", 8)]
        );
        // Whitespace carries the line it starts on.
        assert_eq!(tokens[1].kind, TokenKind::Ignored);
        assert_eq!(tokens[1].line, 1);
        Ok(())
    }

    #[test]
    fn string_body_lines() -> ReadResult<()> {
        let mut tokenizer = Tokenizer::new("\"one\r\ntwo\nthree\" x");
        tokenizer.expect(TokenKind::DoubleQuote)?;
        assert_eq!(tokenizer.scan_string()?, "one\r\ntwo\nthree");
        tokenizer.skip_ignored()?;
        let x = tokenizer.expect(TokenKind::Symbol)?;
        assert_eq!(x.line, 3);
        Ok(())
    }

    #[test]
    fn string_body_stops_at_first_quote() -> ReadResult<()> {
        let mut tokenizer = Tokenizer::new("\"a\"\"b\"");
        tokenizer.expect(TokenKind::DoubleQuote)?;
        assert_eq!(tokenizer.scan_string()?, "a");
        tokenizer.expect(TokenKind::DoubleQuote)?;
        assert_eq!(tokenizer.scan_string()?, "b");
        assert_eq!(tokenizer.peek_kind()?, TokenKind::EndOfInput);
        Ok(())
    }

    #[test]
    fn error_on_unterminated_string() {
        let mut tokenizer = Tokenizer::new("\"hello\n");
        tokenizer.expect(TokenKind::DoubleQuote).unwrap();
        match tokenizer.scan_string() {
            Err(ReadErr::Incomplete {
                expected: TokenKind::DoubleQuote,
                line: 2,
            }) => (),
            v => panic!("expected incomplete string, got: {:?}", v),
        }
    }

    #[test]
    fn string_body_with_buffered_token() {
        let mut tokenizer = Tokenizer::new("abc\"");
        tokenizer.peek_kind().unwrap();
        match tokenizer.scan_string() {
            Err(ReadErr::Internal { .. }) => (),
            v => panic!("expected internal error, got: {:?}", v),
        }
    }

    #[test]
    fn peek_is_idempotent() -> ReadResult<()> {
        let mut tokenizer = Tokenizer::new("foo bar");
        assert_eq!(tokenizer.peek_kind()?, TokenKind::Symbol);
        assert_eq!(tokenizer.peek_kind()?, TokenKind::Symbol);
        let foo = tokenizer.next_token()?;
        assert_eq!(foo.text, "foo");
        assert_eq!(tokenizer.peek_kind()?, TokenKind::Ignored);
        tokenizer.next_token()?;
        assert_eq!(tokenizer.next_token()?.text, "bar");
        assert_eq!(tokenizer.peek_kind()?, TokenKind::EndOfInput);
        assert_eq!(tokenizer.next_token()?.kind, TokenKind::EndOfInput);
        // End of input repeats.
        assert_eq!(tokenizer.next_token()?.kind, TokenKind::EndOfInput);
        Ok(())
    }

    #[test]
    fn line_after_peek() -> ReadResult<()> {
        let mut tokenizer = Tokenizer::new("a\r\n\n b");
        tokenizer.expect(TokenKind::Symbol)?;
        assert_eq!(tokenizer.line(), 1);
        // Peeking whitespace scans it, so the cursor moves past its breaks.
        assert_eq!(tokenizer.peek_kind()?, TokenKind::Ignored);
        assert_eq!(tokenizer.line(), 3);
        // The buffered token keeps the line it started on.
        assert_eq!(tokenizer.next_token()?.line, 1);
        assert_eq!(tokenizer.line(), 3);
        assert_eq!(tokenizer.next_token()?.line, 3);
        Ok(())
    }

    #[test]
    fn expect_mismatch() {
        let mut tokenizer = Tokenizer::new("\n 42");
        tokenizer.skip_ignored().unwrap();
        match tokenizer.expect(TokenKind::Symbol) {
            Err(ReadErr::Syntax {
                expected: TokenKind::Symbol,
                found,
                line: 2,
            }) => assert_eq!(found, "42"),
            v => panic!("expected syntax error, got: {:?}", v),
        }
    }

    #[test]
    fn unicode_symbols() -> ReadResult<()> {
        let output = kinds_and_text("(λ→ ünï)")?;
        assert_eq!(output[1], (TokenKind::Symbol, "λ→".to_owned()));
        assert_eq!(output[3], (TokenKind::Symbol, "ünï".to_owned()));
        Ok(())
    }
}
