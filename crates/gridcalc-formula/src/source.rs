//! The data-source collaborator boundary
//!
//! The engine never owns spreadsheet data. Operand resolution and evaluation
//! consume a [`DataSource`]: whatever backs it (an in-memory workbook, a
//! database, a test fixture) is the caller's concern.

use crate::evaluator::EvaluationContext;
use crate::operand::Operand;
use gridcalc_core::Value;

/// What a named range resolves to: one operand, or a possibly nested set of
/// operands. Every operand yielded here is already worksheet-scoped by the
/// data source.
#[derive(Debug, Clone, PartialEq)]
pub enum NamedCells {
    One(Operand),
    Many(Vec<NamedCells>),
}

impl NamedCells {
    /// Recursively resolve the yielded operands against the data source.
    pub fn resolve(&self, ctx: &EvaluationContext<'_>) -> crate::error::FormulaResult<Value> {
        match self {
            NamedCells::One(operand) => operand.resolve(ctx),
            NamedCells::Many(cells) => {
                let mut values = Vec::with_capacity(cells.len());
                for cell in cells {
                    values.push(cell.resolve(ctx)?);
                }
                Ok(Value::Array(values))
            }
        }
    }
}

/// Capability set the engine requires from a spreadsheet backing store.
///
/// Contract notes:
/// - `cell_to_value` returns `None` for a missing cell (an empty cell, not an
///   error) and is never called for a worksheet whose existence has not been
///   confirmed via `is_ws_exists` first. The same holds for
///   `named_range_to_cells`, `max_row` and `max_column`.
/// - `max_row`/`max_column` report the sheet extent used to close open-ended
///   range corners.
pub trait DataSource {
    fn cell_to_value(&self, row: u32, column: u32, ws_name: &str) -> Option<Value>;

    fn named_range_to_cells(&self, name: &str, ws_name: &str) -> Option<NamedCells>;

    fn is_ws_exists(&self, ws_name: &str) -> bool;

    fn is_named_range_exists(&self, name: &str, ws_name: &str) -> bool;

    fn max_row(&self, ws_name: &str) -> u32;

    fn max_column(&self, ws_name: &str) -> u32;
}
