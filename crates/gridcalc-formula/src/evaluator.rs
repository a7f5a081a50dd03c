//! RPN evaluator
//!
//! Walks a program left to right with a value stack: operands push their
//! resolved value, operations pop exactly their arity and push one result.
//! A correct parser never lets the stack underflow or finish with anything
//! but a single entry — the evaluator still checks both and reports them as
//! invariant violations, kept distinct from user-facing formula errors.

use crate::error::{ErrorKind, FormulaError, FormulaResult};
use crate::functions::{default_registry, FunctionRegistry};
use crate::operation::{self, Operation};
use crate::rpn::{Rpn, RpnItem};
use crate::source::DataSource;
use gridcalc_core::Value;

/// The collaborators one evaluation runs against
pub struct EvaluationContext<'a> {
    pub source: &'a dyn DataSource,
    pub functions: &'a FunctionRegistry,
}

impl<'a> EvaluationContext<'a> {
    /// Context with the default built-in function registry
    pub fn new(source: &'a dyn DataSource) -> Self {
        Self {
            source,
            functions: default_registry(),
        }
    }

    /// Context with an injected function registry
    pub fn with_functions(source: &'a dyn DataSource, functions: &'a FunctionRegistry) -> Self {
        Self { source, functions }
    }
}

/// Evaluate a full program to its single result value.
pub(crate) fn evaluate_rpn(rpn: &Rpn, ctx: &EvaluationContext<'_>) -> FormulaResult<Value> {
    let mut stack = run_stack(rpn, ctx)?;
    if stack.len() != 1 {
        log::warn!(
            "value stack held {} entries after evaluating {:?}",
            stack.len(),
            rpn.src()
        );
        return Err(FormulaError::new(ErrorKind::InvariantViolation {
            detail: format!("value stack held {} entries at end of program", stack.len()),
        })
        .with_formula(rpn.src()));
    }
    Ok(stack.pop().unwrap_or(Value::Empty))
}

/// Evaluate a sub-expression-group program. One stack entry is that value;
/// several become the group's value set (an inline multi-value argument); an
/// empty program is an empty value.
pub(crate) fn evaluate_group(rpn: &Rpn, ctx: &EvaluationContext<'_>) -> FormulaResult<Value> {
    let mut stack = run_stack(rpn, ctx)?;
    match stack.len() {
        0 => Ok(Value::Empty),
        1 => Ok(stack.pop().unwrap_or(Value::Empty)),
        _ => Ok(Value::Array(stack)),
    }
}

fn run_stack(rpn: &Rpn, ctx: &EvaluationContext<'_>) -> FormulaResult<Vec<Value>> {
    let mut stack: Vec<Value> = Vec::new();

    for item in rpn.items() {
        match item {
            RpnItem::Operand(operand) => {
                let value = operand
                    .resolve(ctx)
                    .map_err(|e| e.with_formula(rpn.src()))?;
                stack.push(value);
            }
            RpnItem::Operation(op) => {
                let count = op.operands_count();
                if stack.len() < count {
                    log::warn!(
                        "operation needed {count} operands, stack held {} ({:?})",
                        stack.len(),
                        rpn.src()
                    );
                    return Err(FormulaError::new(ErrorKind::InvariantViolation {
                        detail: format!(
                            "operation needed {count} operands, stack held {}",
                            stack.len()
                        ),
                    })
                    .with_formula(rpn.src()));
                }
                let args = stack.split_off(stack.len() - count);
                let value = match op {
                    Operation::Operator { op, .. } => operation::apply_operator(*op, &args),
                    Operation::Function { name, .. } => call_function(ctx, name, &args),
                }
                .map_err(|e| e.with_formula(rpn.src()))?;
                stack.push(value);
            }
        }
    }

    Ok(stack)
}

/// Dispatch a function call through the registry, validating the declared
/// arity before invoking the implementation.
fn call_function(
    ctx: &EvaluationContext<'_>,
    name: &str,
    args: &[Value],
) -> FormulaResult<Value> {
    let def = ctx.functions.get(name).ok_or_else(|| {
        FormulaError::new(ErrorKind::UnknownFunction {
            name: name.to_string(),
        })
    })?;

    if args.len() < def.min_args || def.max_args.is_some_and(|max| args.len() > max) {
        let expected = match def.max_args {
            Some(max) if max == def.min_args => max.to_string(),
            Some(max) => format!("{}..{}", def.min_args, max),
            None => format!("at least {}", def.min_args),
        };
        return Err(ErrorKind::ArityMismatch {
            name: name.to_string(),
            expected,
            actual: args.len(),
        }
        .into());
    }

    (def.implementation)(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::Operand;
    use crate::operation::OperatorKind;
    use crate::parser::parse;
    use crate::source::NamedCells;

    /// Evaluation fixtures run against an empty workbook
    struct EmptySource;

    impl DataSource for EmptySource {
        fn cell_to_value(&self, _row: u32, _column: u32, _ws_name: &str) -> Option<Value> {
            None
        }

        fn named_range_to_cells(&self, _name: &str, _ws_name: &str) -> Option<NamedCells> {
            None
        }

        fn is_ws_exists(&self, ws_name: &str) -> bool {
            ws_name == "Sheet 1"
        }

        fn is_named_range_exists(&self, _name: &str, _ws_name: &str) -> bool {
            false
        }

        fn max_row(&self, _ws_name: &str) -> u32 {
            0
        }

        fn max_column(&self, _ws_name: &str) -> u32 {
            0
        }
    }

    fn eval(formula: &str) -> FormulaResult<Value> {
        let rpn = parse(formula, "Sheet 1")?;
        let source = EmptySource;
        rpn.evaluate(&EvaluationContext::new(&source))
    }

    #[test]
    fn test_evaluate_literals() {
        assert_eq!(eval("42").unwrap(), Value::Number(42.0));
        assert_eq!(eval("4.25").unwrap(), Value::Number(4.25));
        assert_eq!(eval("TRUE").unwrap(), Value::Bool(true));
        assert_eq!(eval("\"hi\"").unwrap(), Value::String("hi".into()));
    }

    #[test]
    fn test_evaluate_precedence() {
        assert_eq!(eval("2+3*4").unwrap(), Value::Number(14.0));
        assert_eq!(eval("2*3+4").unwrap(), Value::Number(10.0));
        assert_eq!(eval("(1+2)*3").unwrap(), Value::Number(9.0));
        assert_eq!(eval("2+3*4-5").unwrap(), Value::Number(9.0));
    }

    #[test]
    fn test_exponent_left_associative() {
        // (2^3)^2, not 2^(3^2)
        assert_eq!(eval("2^3^2").unwrap(), Value::Number(64.0));
    }

    #[test]
    fn test_unary_detection() {
        assert_eq!(eval("-5+3").unwrap(), Value::Number(-2.0));
        assert_eq!(eval("5-(-3)").unwrap(), Value::Number(8.0));
        assert_eq!(eval("+7").unwrap(), Value::Number(7.0));
        assert_eq!(eval("5*(-2)").unwrap(), Value::Number(-10.0));
    }

    #[test]
    fn test_comparisons_and_concat() {
        assert_eq!(eval("1<2").unwrap(), Value::Bool(true));
        assert_eq!(eval("5<>5").unwrap(), Value::Bool(false));
        assert_eq!(eval("2>=2").unwrap(), Value::Bool(true));
        assert_eq!(eval("SUM(1,2)=3").unwrap(), Value::Bool(true));
        assert_eq!(
            eval("\"a\"&\"b\"&7").unwrap(),
            Value::String("ab7".into())
        );
    }

    #[test]
    fn test_division_by_zero() {
        let err = eval("1/0").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        assert_eq!(err.formula.as_deref(), Some("1/0"));
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(eval("SUM(1,2,3)").unwrap(), Value::Number(6.0));
        assert_eq!(eval("SUM((1,2),3)").unwrap(), Value::Number(6.0));
        assert_eq!(eval("MAX(1,MIN(5,3))").unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_unknown_function() {
        let err = eval("NOPE(1)").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::UnknownFunction {
                name: "NOPE".to_string()
            }
        );
    }

    #[test]
    fn test_arity_mismatch() {
        let err = eval("NOT(1,2)").unwrap_err();
        match err.kind {
            ErrorKind::ArityMismatch { name, actual, .. } => {
                assert_eq!(name, "NOT");
                assert_eq!(actual, 2);
            }
            other => panic!("expected arity mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_program_is_an_invariant_violation() {
        // Hand-built program with a stranded operand: 1 2 (no operation)
        let rpn = Rpn::new(
            vec![
                RpnItem::Operand(Operand::Value(Value::Number(1.0))),
                RpnItem::Operand(Operand::Value(Value::Number(2.0))),
            ],
            "1 2".to_string(),
        );
        let source = EmptySource;
        let err = rpn.evaluate(&EvaluationContext::new(&source)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvariantViolation { .. }));

        // Hand-built program that underflows: lone binary +
        let rpn = Rpn::new(
            vec![RpnItem::Operation(Operation::operator(OperatorKind::Add))],
            "+".to_string(),
        );
        let err = rpn.evaluate(&EvaluationContext::new(&source)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvariantViolation { .. }));
    }

    #[test]
    fn test_errors_do_not_corrupt_the_program() {
        let rpn = parse("1/0", "Sheet 1").unwrap();
        let source = EmptySource;
        let ctx = EvaluationContext::new(&source);
        assert!(rpn.evaluate(&ctx).is_err());
        // The program stays valid for subsequent evaluations
        assert!(rpn.evaluate(&ctx).is_err());
        let ok = parse("1/1", "Sheet 1").unwrap();
        assert_eq!(ok.evaluate(&ctx).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let rpn = parse("2^5-SUM(1,2)", "Sheet 1").unwrap();
        let source = EmptySource;
        let ctx = EvaluationContext::new(&source);
        let first = rpn.evaluate(&ctx).unwrap();
        let second = rpn.evaluate(&ctx).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Value::Number(29.0));
    }
}
