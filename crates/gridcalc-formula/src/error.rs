//! Formula error taxonomy
//!
//! Every failure mode of the engine maps to one [`ErrorKind`] with a stable
//! numeric code. [`FormulaError`] wraps the kind together with the formula
//! text and worksheet name where known; both are attached at the boundary
//! that knows them (the lexer/parser for syntax errors, `Rpn::evaluate` for
//! runtime errors) so a rendered error reads
//! `Code N. <message>. Formula: <text>. WS: <name>`.

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// The distinct failure kinds of lexing, parsing and evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// No token pattern matches at the current scan position
    #[error("Unrecognized symbol {fragment:?} at position {pos}")]
    Lex { fragment: String, pos: usize },

    /// Unmatched or mismatched parentheses
    #[error("Inconsistent parentheses")]
    InconsistentParentheses,

    /// Argument separator outside any open argument list
    #[error("Separator outside of function argument list")]
    SeparatorOutsideFunction,

    /// Reference to a worksheet that does not exist
    #[error("Worksheet does not exist")]
    Link,

    /// Reference to a named range that does not exist
    #[error("Named range {name:?} is not defined")]
    Name { name: String },

    /// Division by zero during evaluation
    #[error("Division by zero")]
    DivisionByZero,

    /// Type-incompatible operation (failed coercion, array misuse, ...)
    #[error("{reason}")]
    Value { reason: String },

    /// Function name missing from the registry
    #[error("Unknown function {name:?}")]
    UnknownFunction { name: String },

    /// Argument count outside the registered function's declared arity
    #[error("Wrong number of arguments for {name}: expected {expected}, got {actual}")]
    ArityMismatch {
        name: String,
        expected: String,
        actual: usize,
    },

    /// Internal parser/evaluator inconsistency; never a user-facing formula
    /// mistake and must not be conflated with one
    #[error("Internal invariant violated: {detail}")]
    InvariantViolation { detail: String },
}

impl ErrorKind {
    /// Stable numeric code for diagnostic rendering
    pub fn code(&self) -> u8 {
        match self {
            ErrorKind::Lex { .. } => 1,
            ErrorKind::InconsistentParentheses => 2,
            ErrorKind::SeparatorOutsideFunction => 3,
            ErrorKind::Link => 4,
            ErrorKind::Name { .. } => 5,
            ErrorKind::DivisionByZero => 6,
            ErrorKind::Value { .. } => 7,
            ErrorKind::UnknownFunction { .. } => 8,
            ErrorKind::ArityMismatch { .. } => 9,
            ErrorKind::InvariantViolation { .. } => 10,
        }
    }
}

/// A formula failure with its diagnostic context
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaError {
    pub kind: ErrorKind,
    /// Formula text the failure belongs to, where known
    pub formula: Option<String>,
    /// Worksheet the formula was evaluated against, where known
    pub ws_name: Option<String>,
}

impl FormulaError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            formula: None,
            ws_name: None,
        }
    }

    /// Attach the formula text unless one is already recorded
    pub fn with_formula(mut self, formula: &str) -> Self {
        if self.formula.is_none() {
            self.formula = Some(formula.to_string());
        }
        self
    }

    /// Attach the worksheet name unless one is already recorded
    pub fn with_ws(mut self, ws_name: &str) -> Self {
        if self.ws_name.is_none() {
            self.ws_name = Some(ws_name.to_string());
        }
        self
    }

    /// Stable numeric code of the underlying kind
    pub fn code(&self) -> u8 {
        self.kind.code()
    }
}

impl std::fmt::Display for FormulaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Code {}. {}", self.kind.code(), self.kind)?;
        if let Some(formula) = &self.formula {
            write!(f, ". Formula: {formula}")?;
        }
        if let Some(ws_name) = &self.ws_name {
            write!(f, ". WS: {ws_name}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FormulaError {}

impl From<ErrorKind> for FormulaError {
    fn from(kind: ErrorKind) -> Self {
        FormulaError::new(kind)
    }
}
