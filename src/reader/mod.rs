//! Support for reading Lisp source text into a syntax tree.

use std::io::ErrorKind;

use crate::data::FunctionCall;

mod parse;
mod token;

pub use parse::{Parser, MAX_DEPTH};
pub use token::{tokenize, Token, TokenKind, Tokenizer};

/// Parse every top-level form in the input.
pub fn read(input: &str) -> ReadResult<Vec<FunctionCall>> {
    Parser::new(input).parse_body()
}

/// Error type if a read does not complete.
///
/// Reading stops at the first error; there is no resynchronization.
///
/// `Incomplete` is split out from `Syntax`: "(()" may become valid with more input,
/// while "())" never will. An interactive caller can prompt for more input
/// in the first case and report an error in the second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadErr {
    /// The next token was not the one the grammar requires.
    Syntax {
        expected: TokenKind,
        found: String,
        line: usize,
    },
    /// Input ended where the grammar requires another token.
    Incomplete { expected: TokenKind, line: usize },
    /// A parenthesized form with nothing in the function position: "()".
    EmptyCall { line: usize },
    /// Calls and lists nested deeper than `MAX_DEPTH`.
    TooDeep { line: usize },
    /// A run of digits that does not fit in an integer.
    InvalidInteger { text: String, line: usize },
    /// The tokenizer reached a state its rules should make impossible.
    Internal { message: String, line: usize },
}

impl ReadErr {
    /// Line at which the error was detected.
    pub fn line(&self) -> usize {
        match self {
            ReadErr::Syntax { line, .. }
            | ReadErr::Incomplete { line, .. }
            | ReadErr::EmptyCall { line }
            | ReadErr::TooDeep { line }
            | ReadErr::InvalidInteger { line, .. }
            | ReadErr::Internal { line, .. } => *line,
        }
    }

    /// True if more input could complete the read.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ReadErr::Incomplete { .. })
    }

    /// Add additional context to an error.
    pub fn annotate(self, more: impl AsRef<str>) -> AnnotatedErr {
        AnnotatedErr {
            context: more.as_ref().to_owned(),
            err: self,
        }
    }
}

impl std::fmt::Display for ReadErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        match self {
            ReadErr::Syntax {
                expected, found, ..
            } => write!(
                f,
                "syntax error near '{found}': expecting '{expected}', got '{found}'"
            ),
            ReadErr::Incomplete { expected, .. } => {
                write!(f, "incomplete input: expecting '{expected}', got end of input")
            }
            ReadErr::EmptyCall { .. } => {
                write!(f, "syntax error near '()': function call has no function")
            }
            ReadErr::TooDeep { .. } => {
                write!(f, "forms nested deeper than {MAX_DEPTH} levels")
            }
            ReadErr::InvalidInteger { text, .. } => {
                write!(f, "failed to convert \"{text}\" into integer")
            }
            ReadErr::Internal { message, .. } => write!(f, "internal error: {message}"),
        }
    }
}

impl std::error::Error for ReadErr {}

/// A read error with caller-supplied context, e.g. the name of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedErr {
    pub context: String,
    pub err: ReadErr,
}

impl std::fmt::Display for AnnotatedErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "{}:{}: {}", self.context, self.err.line(), self.err)
    }
}

impl std::error::Error for AnnotatedErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}

/// The main result type for this module:
/// a T (token, expression, etc), or an error.
pub type ReadResult<T> = Result<T, ReadErr>;

impl From<ReadErr> for std::io::Error {
    fn from(value: ReadErr) -> Self {
        let kind = if value.is_incomplete() {
            ErrorKind::UnexpectedEof
        } else {
            ErrorKind::InvalidInput
        };
        std::io::Error::new(kind, value)
    }
}
