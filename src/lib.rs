//! Reader for a minimal Lisp dialect.
//!
//! Turns source text into a tree of function calls, literals, and symbols.
//! Nothing is evaluated.
//!
//! ```ignore
//! let forms = lispingo::read("(add 1 2)")?;
//! assert_eq!(forms[0].to_string(), "(add 1 2)");
//! ```

pub mod data;
pub mod reader;

pub use data::{Element, FunctionCall};
pub use reader::{read, Parser, ReadErr, ReadResult, Tokenizer};
