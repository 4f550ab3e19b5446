//! Syntax tree produced by the reader.
//!
//! Each node records the line of its first token (1-indexed).
//! The Display implementation renders a node as Lisp source that reads back
//! as an equal tree; the Debug implementation shows the internal representation.

use std::fmt::{Display, Formatter};

pub type Integer = i64;

/// A node in the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Int { value: Integer, line: usize },
    String { value: String, line: usize },
    Symbol { name: String, line: usize },
    /// A quoted list: `'(1 2 3)`.
    List { elements: Vec<Element>, line: usize },
    FunctionCall(FunctionCall),
}

/// An application: `(function arguments...)`.
///
/// The function position holds any element, including another call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub function: Box<Element>,
    pub arguments: Vec<Element>,
    pub line: usize,
}

impl Element {
    /// Line on which this element starts.
    pub fn line(&self) -> usize {
        match self {
            Element::Int { line, .. }
            | Element::String { line, .. }
            | Element::Symbol { line, .. }
            | Element::List { line, .. } => *line,
            Element::FunctionCall(call) => call.line,
        }
    }
}

impl FunctionCall {
    pub fn new(function: Element, arguments: Vec<Element>, line: usize) -> Self {
        FunctionCall {
            function: Box::new(function),
            arguments,
            line,
        }
    }
}

impl From<FunctionCall> for Element {
    fn from(value: FunctionCall) -> Self {
        Element::FunctionCall(value)
    }
}

/// Writes the elements separated by single spaces.
fn write_spaced(f: &mut Formatter<'_>, elements: &[Element]) -> std::fmt::Result {
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", element)?;
    }
    Ok(())
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Int { value, .. } => write!(f, "{}", value),
            // No escapes exist, so the body is written verbatim.
            Element::String { value, .. } => write!(f, "\"{}\"", value),
            Element::Symbol { name, .. } => write!(f, "{}", name),
            Element::List { elements, .. } => {
                write!(f, "'(")?;
                write_spaced(f, elements)?;
                write!(f, ")")
            }
            Element::FunctionCall(call) => write!(f, "{}", call),
        }
    }
}

impl Display for FunctionCall {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.function)?;
        if !self.arguments.is_empty() {
            write!(f, " ")?;
            write_spaced(f, &self.arguments)?;
        }
        write!(f, ")")
    }
}
