//! Operand model with lazy resolution
//!
//! Operands are the value-producing nodes of an RPN program. Nothing is
//! resolved at construction time: every variant resolves against the data
//! source when [`Operand::resolve`] runs, so one parsed program can be
//! evaluated repeatedly against different sources. Results are never cached
//! inside the operand.

use crate::error::{ErrorKind, FormulaError, FormulaResult};
use crate::evaluator::{self, EvaluationContext};
use crate::rpn::Rpn;
use gridcalc_core::Value;

/// A value-producing node of the RPN program
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Literal whose value is already known
    Value(Value),

    /// One cell, addressed 1-based on a resolved worksheet
    SingleCell {
        row: u32,
        column: u32,
        ws_name: String,
    },

    /// Rectangular span; open corner components close over the sheet extent
    CellRange {
        row1: Option<u32>,
        column1: Option<u32>,
        row2: Option<u32>,
        column2: Option<u32>,
        ws_name: String,
    },

    /// Named range, resolved through the data source
    NamedRange { name: String, ws_name: String },

    /// A nested RPN program used as one argument (a parenthesized group)
    Rpn(Rpn),
}

impl Operand {
    /// Resolve the operand to a value against the evaluation context.
    ///
    /// A missing cell yields [`Value::Empty`]; a missing worksheet is a link
    /// error and a missing named range a name error, both fatal to the
    /// formula.
    pub fn resolve(&self, ctx: &EvaluationContext<'_>) -> FormulaResult<Value> {
        match self {
            Operand::Value(value) => Ok(value.clone()),

            Operand::SingleCell {
                row,
                column,
                ws_name,
            } => {
                ensure_ws_exists(ctx, ws_name)?;
                Ok(ctx
                    .source
                    .cell_to_value(*row, *column, ws_name)
                    .unwrap_or(Value::Empty))
            }

            Operand::CellRange {
                row1,
                column1,
                row2,
                column2,
                ws_name,
            } => {
                ensure_ws_exists(ctx, ws_name)?;
                let first_row = row1.unwrap_or(1);
                let last_row = row2.unwrap_or_else(|| ctx.source.max_row(ws_name));
                let first_column = column1.unwrap_or(1);
                let last_column = column2.unwrap_or_else(|| ctx.source.max_column(ws_name));

                let mut values = Vec::new();
                for row in first_row..=last_row {
                    for column in first_column..=last_column {
                        values.push(
                            ctx.source
                                .cell_to_value(row, column, ws_name)
                                .unwrap_or(Value::Empty),
                        );
                    }
                }
                Ok(Value::Array(values))
            }

            Operand::NamedRange { name, ws_name } => {
                ensure_ws_exists(ctx, ws_name)?;
                if !ctx.source.is_named_range_exists(name, ws_name) {
                    return Err(FormulaError::new(ErrorKind::Name { name: name.clone() })
                        .with_ws(ws_name));
                }
                match ctx.source.named_range_to_cells(name, ws_name) {
                    Some(cells) => cells.resolve(ctx),
                    None => Err(FormulaError::new(ErrorKind::Name { name: name.clone() })
                        .with_ws(ws_name)),
                }
            }

            Operand::Rpn(rpn) => evaluator::evaluate_group(rpn, ctx),
        }
    }
}

fn ensure_ws_exists(ctx: &EvaluationContext<'_>, ws_name: &str) -> FormulaResult<()> {
    if ctx.source.is_ws_exists(ws_name) {
        Ok(())
    } else {
        Err(FormulaError::new(ErrorKind::Link).with_ws(ws_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DataSource, NamedCells};

    /// Two-sheet fixture: `Data` holds (1,1)=13, (1,2)=16, (2,1)=4;
    /// `Other` defines the named ranges.
    struct Grid;

    impl DataSource for Grid {
        fn cell_to_value(&self, row: u32, column: u32, ws_name: &str) -> Option<Value> {
            if ws_name != "Data" {
                return None;
            }
            match (row, column) {
                (1, 1) => Some(Value::Number(13.0)),
                (1, 2) => Some(Value::Number(16.0)),
                (2, 1) => Some(Value::Number(4.0)),
                _ => None,
            }
        }

        fn named_range_to_cells(&self, name: &str, _ws_name: &str) -> Option<NamedCells> {
            match name {
                "first" => Some(NamedCells::One(Operand::SingleCell {
                    row: 1,
                    column: 1,
                    ws_name: "Data".to_string(),
                })),
                "pair" => Some(NamedCells::Many(vec![
                    NamedCells::One(Operand::SingleCell {
                        row: 1,
                        column: 1,
                        ws_name: "Data".to_string(),
                    }),
                    NamedCells::One(Operand::SingleCell {
                        row: 1,
                        column: 2,
                        ws_name: "Data".to_string(),
                    }),
                ])),
                _ => None,
            }
        }

        fn is_ws_exists(&self, ws_name: &str) -> bool {
            ws_name == "Data" || ws_name == "Other"
        }

        fn is_named_range_exists(&self, name: &str, _ws_name: &str) -> bool {
            name == "first" || name == "pair"
        }

        fn max_row(&self, _ws_name: &str) -> u32 {
            2
        }

        fn max_column(&self, _ws_name: &str) -> u32 {
            2
        }
    }

    fn ctx_resolve(operand: &Operand) -> FormulaResult<Value> {
        let source = Grid;
        let ctx = EvaluationContext::new(&source);
        operand.resolve(&ctx)
    }

    #[test]
    fn test_literal_resolves_to_itself() {
        let operand = Operand::Value(Value::Number(7.5));
        assert_eq!(ctx_resolve(&operand).unwrap(), Value::Number(7.5));
    }

    #[test]
    fn test_single_cell_lookup() {
        let operand = Operand::SingleCell {
            row: 1,
            column: 2,
            ws_name: "Data".to_string(),
        };
        assert_eq!(ctx_resolve(&operand).unwrap(), Value::Number(16.0));
    }

    #[test]
    fn test_missing_cell_is_empty_not_an_error() {
        let operand = Operand::SingleCell {
            row: 40,
            column: 40,
            ws_name: "Data".to_string(),
        };
        assert_eq!(ctx_resolve(&operand).unwrap(), Value::Empty);
    }

    #[test]
    fn test_missing_worksheet_is_a_link_error() {
        let operand = Operand::SingleCell {
            row: 1,
            column: 1,
            ws_name: "Nope".to_string(),
        };
        let err = ctx_resolve(&operand).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Link);
        assert_eq!(err.ws_name.as_deref(), Some("Nope"));
    }

    #[test]
    fn test_range_resolves_row_major() {
        let operand = Operand::CellRange {
            row1: Some(1),
            column1: Some(1),
            row2: Some(2),
            column2: Some(2),
            ws_name: "Data".to_string(),
        };
        assert_eq!(
            ctx_resolve(&operand).unwrap(),
            Value::Array(vec![
                Value::Number(13.0),
                Value::Number(16.0),
                Value::Number(4.0),
                Value::Empty,
            ])
        );
    }

    #[test]
    fn test_open_corners_span_the_sheet_extent() {
        // B:B covers rows 1..=max_row of column 2
        let operand = Operand::CellRange {
            row1: None,
            column1: Some(2),
            row2: None,
            column2: Some(2),
            ws_name: "Data".to_string(),
        };
        assert_eq!(
            ctx_resolve(&operand).unwrap(),
            Value::Array(vec![Value::Number(16.0), Value::Empty])
        );
    }

    #[test]
    fn test_named_range_single() {
        let operand = Operand::NamedRange {
            name: "first".to_string(),
            ws_name: "Other".to_string(),
        };
        assert_eq!(ctx_resolve(&operand).unwrap(), Value::Number(13.0));
    }

    #[test]
    fn test_named_range_set_resolves_recursively() {
        let operand = Operand::NamedRange {
            name: "pair".to_string(),
            ws_name: "Other".to_string(),
        };
        assert_eq!(
            ctx_resolve(&operand).unwrap(),
            Value::Array(vec![Value::Number(13.0), Value::Number(16.0)])
        );
    }

    #[test]
    fn test_unknown_named_range_is_a_name_error() {
        let operand = Operand::NamedRange {
            name: "ghost".to_string(),
            ws_name: "Other".to_string(),
        };
        let err = ctx_resolve(&operand).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::Name {
                name: "ghost".to_string()
            }
        );
        assert_eq!(err.ws_name.as_deref(), Some("Other"));
    }
}
