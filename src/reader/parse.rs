//! Recursive-descent parser over the tokenizer's lookahead.
//!
//! Every production consumes the whitespace that follows its last token,
//! so element boundaries never need to skip whitespace explicitly.

use crate::data::{Element, FunctionCall, Integer};
use crate::reader::token::{TokenKind, Tokenizer};
use crate::reader::{ReadErr, ReadResult};

/// Deepest nesting of calls and lists accepted in one form.
///
/// Parsing recurses once per level; past this the native stack is at risk.
pub const MAX_DEPTH: usize = 256;

pub struct Parser<'a> {
    tokens: Tokenizer<'a>,
    // Calls and lists currently open.
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            tokens: Tokenizer::new(input),
            depth: 0,
        }
    }

    /// Parse all top-level forms until the end of input.
    pub fn parse_body(&mut self) -> ReadResult<Vec<FunctionCall>> {
        let mut forms = Vec::new();
        self.tokens.skip_ignored()?;
        while self.tokens.peek_kind()? != TokenKind::EndOfInput {
            let form = self.parse_function_call()?;
            tracing::debug!("read form at line {}", form.line);
            forms.push(form);
        }
        Ok(forms)
    }

    /// Parse a single parenthesized form: `(function arguments...)`.
    pub fn parse_function_call(&mut self) -> ReadResult<FunctionCall> {
        let line = self.tokens.expect(TokenKind::LeftParen)?.line;
        self.descend(line)?;
        let call = self.parse_call_contents(line);
        self.depth -= 1;
        call
    }

    /// The rest of a call, after its opening paren.
    fn parse_call_contents(&mut self, line: usize) -> ReadResult<FunctionCall> {
        self.tokens.skip_ignored()?;
        if self.tokens.peek_kind()? == TokenKind::RightParen {
            return Err(ReadErr::EmptyCall { line });
        }
        let function = self.parse_element()?;
        let arguments = self.parse_elements()?;
        self.tokens.expect(TokenKind::RightParen)?;
        self.tokens.skip_ignored()?;
        Ok(FunctionCall::new(function, arguments, line))
    }

    /// Open one level of nesting, or fail if that would pass `MAX_DEPTH`.
    ///
    /// Callers close the level themselves, on success and on error alike.
    fn descend(&mut self, line: usize) -> ReadResult<()> {
        if self.depth >= MAX_DEPTH {
            return Err(ReadErr::TooDeep { line });
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_element(&mut self) -> ReadResult<Element> {
        match self.tokens.peek_kind()? {
            TokenKind::Integer => self.parse_int(),
            TokenKind::DoubleQuote | TokenKind::DoubleQuotePair => self.parse_string(),
            TokenKind::SingleQuote => self.parse_list(),
            TokenKind::LeftParen => Ok(self.parse_function_call()?.into()),
            _ => self.parse_symbol(),
        }
    }

    /// Elements up to, not including, the closing paren.
    fn parse_elements(&mut self) -> ReadResult<Vec<Element>> {
        let mut elements = Vec::new();
        loop {
            match self.tokens.peek_kind()? {
                TokenKind::RightParen => return Ok(elements),
                TokenKind::EndOfInput => {
                    return Err(ReadErr::Incomplete {
                        expected: TokenKind::RightParen,
                        line: self.tokens.line(),
                    })
                }
                _ => elements.push(self.parse_element()?),
            }
        }
    }

    fn parse_int(&mut self) -> ReadResult<Element> {
        let token = self.tokens.expect(TokenKind::Integer)?;
        self.tokens.skip_ignored()?;
        let value: Integer = token.text.parse().map_err(|_| ReadErr::InvalidInteger {
            text: token.text.to_owned(),
            line: token.line,
        })?;
        Ok(Element::Int {
            value,
            line: token.line,
        })
    }

    fn parse_string(&mut self) -> ReadResult<Element> {
        if self.tokens.peek_kind()? == TokenKind::DoubleQuotePair {
            let line = self.tokens.expect(TokenKind::DoubleQuotePair)?.line;
            self.tokens.skip_ignored()?;
            return Ok(Element::String {
                value: String::new(),
                line,
            });
        }
        let line = self.tokens.expect(TokenKind::DoubleQuote)?.line;
        let value = self.tokens.scan_string()?.to_owned();
        self.tokens.skip_ignored()?;
        Ok(Element::String { value, line })
    }

    fn parse_symbol(&mut self) -> ReadResult<Element> {
        let token = self.tokens.expect(TokenKind::Symbol)?;
        self.tokens.skip_ignored()?;
        Ok(Element::Symbol {
            name: token.text.to_owned(),
            line: token.line,
        })
    }

    fn parse_list(&mut self) -> ReadResult<Element> {
        let line = self.tokens.expect(TokenKind::SingleQuote)?.line;
        self.tokens.expect(TokenKind::LeftParen)?;
        self.descend(line)?;
        let elements = self.parse_list_contents();
        self.depth -= 1;
        Ok(Element::List {
            elements: elements?,
            line,
        })
    }

    /// The elements of a list and its closing paren.
    fn parse_list_contents(&mut self) -> ReadResult<Vec<Element>> {
        self.tokens.skip_ignored()?;
        let elements = self.parse_elements()?;
        self.tokens.expect(TokenKind::RightParen)?;
        self.tokens.skip_ignored()?;
        Ok(elements)
    }
}
