//! ConsLisp - eval/apply engine for a small dynamically scoped Lisp
//!
//! This crate provides a tree-walking evaluator over cons-cell s-expressions.
//! An embedder that already has a reader producing [`ast::Value`] trees hands
//! them to an [`evaluator::Evaluator`], which resolves symbols against a stack
//! of scope frames and returns the resulting value.
//!
//! ```scheme
//! (+ 1 2 3)                          ; 6
//! (+ 1 2.0)                          ; 3.0 (float contagion)
//! (define sq (lambda (x) (* x x)))
//! (sq 5)                             ; 25
//! (let ((a 1) (b 2)) (+ a b))        ; 3
//! ```
//!
//! ## Language Notes
//!
//! - Numbers are exact integers or inexact floats; any float operand makes an
//!   arithmetic result a float.
//! - Truth is numeric: predicates return `1` or `0`, and `if` treats any
//!   non-zero number as true.
//! - Scoping is dynamic. A procedure body resolves free symbols against the
//!   frames live at call time, not against a captured snapshot.
//! - `define` creates a binding in the innermost frame and never overwrites one.
//!
//! ## Modules
//!
//! - `ast`: the value model and list utilities
//! - `hashtable`: chained hash map backing each scope frame
//! - `evaluator`: the `Evaluator`, its environment and the special forms
//! - `builtinops`: registry of builtin names and their arity
//! - `reader`: s-expression text reader (feature `reader`)

use std::fmt;

use crate::builtinops::Arity;

/// Maximum parsing depth for nested lists and quote shorthand
pub const MAX_PARSE_DEPTH: usize = 512;

/// Default maximum evaluation depth.
/// Runaway recursion is reported as [`Error::DepthLimitExceeded`] once this is hit.
pub const MAX_EVAL_DEPTH: usize = 10_000;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Clone)]
pub enum ParseErrorKind {
    /// Invalid or unexpected syntax (bad tokens, malformed expressions)
    InvalidSyntax,
    /// Input ended before the expression was complete (unclosed parens)
    Incomplete,
    /// Expression nesting exceeded the maximum parse depth
    TooDeeplyNested,
    /// Extra input found after a complete, valid expression
    TrailingContent,
}

/// A structured error providing detailed information about a parsing failure.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Context snippet from the input showing where the error occurred (max 100 chars)
    pub context: Option<String>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, context: Option<String>) -> Self {
        ParseError {
            kind,
            message: message.into(),
            context,
        }
    }

    /// Create a ParseError with a kind and message but no context
    pub fn from_message(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, None)
    }

    /// Create a ParseError with context extracted from input at a given offset
    pub fn with_context(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
    ) -> Self {
        const MAX_CONTEXT: usize = 100;

        let context_start = error_offset.saturating_sub(20);
        let context_str: String = input
            .chars()
            .skip(context_start)
            .take(MAX_CONTEXT)
            .collect();

        let mut display_context = String::new();
        if context_start > 0 {
            display_context.push_str("[...]");
        }
        display_context.push_str(&context_str);
        if context_start + context_str.len() < input.len() {
            display_context.push_str("[...]");
        }

        let display_context = display_context.replace('\n', "\\n").replace('\r', "");

        Self::new(kind, message, Some(display_context))
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(context) = &self.context {
            write!(f, "\nContext: {context}")?;
        }
        Ok(())
    }
}

/// Error types for the interpreter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("ParseError: {0}")]
    ParseError(ParseError),
    /// Wrong value variant for the requested operation
    #[error("Type error: {0}")]
    TypeError(String),
    /// Operand count outside the accepted range
    #[error(
        "ArityError: {}expected {expected} arguments, got {got}",
        .expression.as_ref().map(|e| format!("expression {e}: ")).unwrap_or_default()
    )]
    ArityError {
        expected: Arity,
        got: usize,
        expression: Option<String>,
    },
    #[error("Unbound symbol: {0}")]
    UnboundSymbol(String),
    /// `define` of a name already bound in the same frame
    #[error("Duplicate definition: the symbol \"{0}\" is already defined")]
    DuplicateDefinition(String),
    #[error("Division by zero")]
    DivideByZero,
    #[error("Not applicable: {0}")]
    NotApplicable(String),
    #[error("Cannot evaluate an empty list")]
    EmptyEvaluation,
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
    #[error("Evaluation depth limit exceeded (max: {0})")]
    DepthLimitExceeded(usize),
    #[error("Output error: {0}")]
    Output(String),
}

impl Error {
    /// Create an ArityError without expression context
    pub fn arity_error(expected: Arity, got: usize) -> Self {
        Error::ArityError {
            expected,
            got,
            expression: None,
        }
    }

    /// Create an ArityError with expression context
    pub fn arity_error_with_expr(expected: Arity, got: usize, expression: String) -> Self {
        Error::ArityError {
            expected,
            got,
            expression: Some(expression),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Output(err.to_string())
    }
}

pub mod ast;
pub mod builtinops;
pub mod evaluator;
pub mod hashtable;
mod stack;

#[cfg(feature = "reader")]
pub mod reader;
