use std::fmt;

/// Error types for the reader and evaluator
#[derive(Debug, Clone, PartialEq)]
pub enum LispError {
    /// A character that cannot start or continue any token
    LexError { character: char, position: usize },
    /// A token other than the one the grammar requires at this position
    SyntaxError {
        expected: &'static str,
        found: String,
        position: usize,
    },
    /// Input ended before a complete expression was read
    UnexpectedEof { expected: &'static str },
    InvalidAtom(String),
    UndefinedAtom(String),
    TypeError(String),
    EvalError(String),
    ArityError { expected: usize, got: usize },
}

impl LispError {
    pub fn arity_error(expected: usize, got: usize) -> Self {
        LispError::ArityError { expected, got }
    }

    /// True for failures raised while reading text, before any evaluation
    pub fn is_read_error(&self) -> bool {
        matches!(
            self,
            LispError::LexError { .. }
                | LispError::SyntaxError { .. }
                | LispError::UnexpectedEof { .. }
                | LispError::InvalidAtom(_)
        )
    }
}

impl std::error::Error for LispError {}

impl fmt::Display for LispError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LispError::LexError {
                character,
                position,
            } => write!(
                f,
                "illegal character '{}' at position {}",
                character.escape_debug(),
                position
            ),
            LispError::SyntaxError {
                expected,
                found,
                position,
            } => write!(
                f,
                "Syntax error at position {}: expected {}, found '{}'",
                position, expected, found
            ),
            LispError::UnexpectedEof { expected } => {
                write!(f, "Unexpected end of input: expected {}", expected)
            }
            LispError::InvalidAtom(name) => write!(f, "Invalid atom: '{}'", name),
            LispError::UndefinedAtom(name) => write!(f, "undefined atom: {}", name),
            LispError::TypeError(msg) => write!(f, "Type error: {}", msg),
            LispError::EvalError(msg) => write!(f, "Evaluation error: {}", msg),
            LispError::ArityError { expected, got } => {
                write!(
                    f,
                    "Arity error: expected {} arguments, got {}",
                    expected, got
                )
            }
        }
    }
}

pub mod ast;
pub mod builtinops;
pub mod desugar;
pub mod evaluator;
pub mod list;
pub mod parser;

pub use ast::{Atom, Expr, Procedure};
pub use evaluator::Environment;
