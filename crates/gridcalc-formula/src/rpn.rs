//! The RPN program
//!
//! A parsed formula: operands and operations in postfix order, plus the
//! formula text it was built from (kept for diagnostics). The program is
//! immutable once the parser returns it and carries no data-source state, so
//! it can be evaluated repeatedly — including concurrently — against
//! different sources.

use crate::error::FormulaResult;
use crate::evaluator::{self, EvaluationContext};
use crate::operand::Operand;
use crate::operation::Operation;
use gridcalc_core::Value;

/// One entry of an RPN program
#[derive(Debug, Clone, PartialEq)]
pub enum RpnItem {
    Operand(Operand),
    Operation(Operation),
}

/// A formula compiled to postfix order
#[derive(Debug, Clone, PartialEq)]
pub struct Rpn {
    items: Vec<RpnItem>,
    src: String,
}

impl Rpn {
    pub(crate) fn new(items: Vec<RpnItem>, src: String) -> Self {
        Self { items, src }
    }

    /// The program entries in evaluation order
    pub fn items(&self) -> &[RpnItem] {
        &self.items
    }

    /// The formula text this program was parsed from
    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Run the program against a data source and function registry,
    /// producing exactly one value.
    pub fn evaluate(&self, ctx: &EvaluationContext<'_>) -> FormulaResult<Value> {
        evaluator::evaluate_rpn(self, ctx)
    }
}
