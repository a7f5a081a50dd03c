//! # gridcalc-formula
//!
//! Formula lexer, RPN parser and evaluator for gridcalc.
//!
//! This crate provides:
//! - Formula parsing (text → postfix/RPN program) via a hand-rolled
//!   shunting-yard pass with spreadsheet-grammar specifics: context-sensitive
//!   unary operators, variable-arity calls, parenthesized argument groups,
//!   open-ended ranges, worksheet and named-range indirection
//! - Lazy operand resolution against a pluggable [`DataSource`]
//! - Stack-machine evaluation with Excel-like coercion rules
//! - A default registry of built-in functions (SUM, IF, ...)
//!
//! ## Example
//!
//! ```rust,ignore
//! use gridcalc_formula::{parse, EvaluationContext};
//!
//! let rpn = parse("SUM(A1:B1)*2", "Sheet 1")?;
//! let result = rpn.evaluate(&EvaluationContext::new(&source))?;
//! ```

pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod operand;
pub mod operation;
pub mod parser;
pub mod rpn;
pub mod source;
pub mod token;

pub use error::{ErrorKind, FormulaError, FormulaResult};
pub use evaluator::EvaluationContext;
pub use functions::{default_registry, FunctionDef, FunctionRegistry};
pub use gridcalc_core::Value;
pub use operand::Operand;
pub use operation::{Operation, OperatorKind};
pub use parser::parse;
pub use rpn::{Rpn, RpnItem};
pub use source::{DataSource, NamedCells};

/// Parse and evaluate a formula in one call, using the default function
/// registry. For repeated evaluation of the same formula, [`parse`] once and
/// reuse the [`Rpn`] program instead.
pub fn evaluate(formula: &str, ws_name: &str, source: &dyn DataSource) -> FormulaResult<Value> {
    let rpn = parse(formula, ws_name)?;
    rpn.evaluate(&EvaluationContext::new(source))
}
