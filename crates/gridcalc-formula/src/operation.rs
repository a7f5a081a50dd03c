//! Operation model: operators and function calls
//!
//! An [`Operation`] consumes `operands_count` values from the evaluation
//! stack and produces one. Function-call nodes start at arity 1 and grow by
//! one per top-level argument separator while their call is being parsed;
//! arithmetic operators default to arity 2 and are rewritten to 1 when the
//! parser recognizes them as unary. Once a node leaves the parser's operator
//! stack for the RPN program its arity is frozen.

use std::cmp::Ordering;

use crate::error::{ErrorKind, FormulaError, FormulaResult};
use crate::token::TokenKind;
use gridcalc_core::Value;

/// Arithmetic and comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Exponent,
    Concat,
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl OperatorKind {
    /// The process-wide constant priority table. Left-associative throughout;
    /// comparisons sit at 0 and are only drained by brackets, separators or
    /// end of input. Subtract deliberately ranks above add — compatibility
    /// with the reference engine, not a typo (see DESIGN.md).
    pub const fn priority(self) -> u8 {
        match self {
            OperatorKind::Exponent => 5,
            OperatorKind::Multiply | OperatorKind::Divide => 4,
            OperatorKind::Subtract => 3,
            OperatorKind::Add => 2,
            OperatorKind::Concat => 1,
            OperatorKind::Eq
            | OperatorKind::NotEq
            | OperatorKind::Gt
            | OperatorKind::Gte
            | OperatorKind::Lt
            | OperatorKind::Lte => 0,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            OperatorKind::Add => "+",
            OperatorKind::Subtract => "-",
            OperatorKind::Multiply => "*",
            OperatorKind::Divide => "/",
            OperatorKind::Exponent => "^",
            OperatorKind::Concat => "&",
            OperatorKind::Eq => "=",
            OperatorKind::NotEq => "<>",
            OperatorKind::Gt => ">",
            OperatorKind::Gte => ">=",
            OperatorKind::Lt => "<",
            OperatorKind::Lte => "<=",
        }
    }

    pub(crate) fn from_token(kind: &TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Add => Some(OperatorKind::Add),
            TokenKind::Subtract => Some(OperatorKind::Subtract),
            TokenKind::Multiply => Some(OperatorKind::Multiply),
            TokenKind::Divide => Some(OperatorKind::Divide),
            TokenKind::Concat => Some(OperatorKind::Concat),
            TokenKind::Exponent => Some(OperatorKind::Exponent),
            TokenKind::Eq => Some(OperatorKind::Eq),
            TokenKind::NotEq => Some(OperatorKind::NotEq),
            TokenKind::Gt => Some(OperatorKind::Gt),
            TokenKind::Gte => Some(OperatorKind::Gte),
            TokenKind::Lt => Some(OperatorKind::Lt),
            TokenKind::Lte => Some(OperatorKind::Lte),
            _ => None,
        }
    }
}

/// A value-consuming node of the RPN program
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Operator {
        op: OperatorKind,
        operands_count: usize,
    },
    Function {
        name: String,
        operands_count: usize,
    },
}

impl Operation {
    /// A binary operator node (the stored default arity)
    pub fn operator(op: OperatorKind) -> Self {
        Operation::Operator {
            op,
            operands_count: 2,
        }
    }

    /// A unary operator node (`+`/`-` recognized in prefix position)
    pub fn unary_operator(op: OperatorKind) -> Self {
        Operation::Operator {
            op,
            operands_count: 1,
        }
    }

    /// A function-call node; arity starts at 1 and grows per separator
    pub fn function(name: impl Into<String>) -> Self {
        Operation::Function {
            name: name.into(),
            operands_count: 1,
        }
    }

    pub fn operands_count(&self) -> usize {
        match self {
            Operation::Operator { operands_count, .. }
            | Operation::Function { operands_count, .. } => *operands_count,
        }
    }

    /// One more top-level argument seen while parsing this call
    pub(crate) fn bump_operands_count(&mut self) {
        match self {
            Operation::Operator { operands_count, .. }
            | Operation::Function { operands_count, .. } => *operands_count += 1,
        }
    }

    /// Precedence used by the shunting loop; function calls carry 0
    pub fn priority(&self) -> u8 {
        match self {
            Operation::Operator { op, .. } => op.priority(),
            Operation::Function { .. } => 0,
        }
    }
}

/// Apply an operator to its popped operands (left-most first).
pub(crate) fn apply_operator(op: OperatorKind, args: &[Value]) -> FormulaResult<Value> {
    match args {
        [operand] => match op {
            OperatorKind::Add => Ok(Value::Number(to_number(operand)?)),
            OperatorKind::Subtract => Ok(Value::Number(-to_number(operand)?)),
            _ => Err(ErrorKind::InvariantViolation {
                detail: format!("operator {:?} applied with arity 1", op.symbol()),
            }
            .into()),
        },
        [left, right] => apply_binary(op, left, right),
        _ => Err(ErrorKind::InvariantViolation {
            detail: format!(
                "operator {:?} applied with arity {}",
                op.symbol(),
                args.len()
            ),
        }
        .into()),
    }
}

fn apply_binary(op: OperatorKind, left: &Value, right: &Value) -> FormulaResult<Value> {
    match op {
        OperatorKind::Add => Ok(Value::Number(to_number(left)? + to_number(right)?)),
        OperatorKind::Subtract => Ok(Value::Number(to_number(left)? - to_number(right)?)),
        OperatorKind::Multiply => Ok(Value::Number(to_number(left)? * to_number(right)?)),
        OperatorKind::Divide => {
            let divisor = to_number(right)?;
            if divisor == 0.0 {
                return Err(ErrorKind::DivisionByZero.into());
            }
            Ok(Value::Number(to_number(left)? / divisor))
        }
        OperatorKind::Exponent => {
            let result = to_number(left)?.powf(to_number(right)?);
            if !result.is_finite() {
                return Err(ErrorKind::Value {
                    reason: "exponentiation overflowed the numeric range".to_string(),
                }
                .into());
            }
            Ok(Value::Number(result))
        }
        OperatorKind::Concat => Ok(Value::String(format!(
            "{}{}",
            to_text(left)?,
            to_text(right)?
        ))),
        OperatorKind::Eq => Ok(Value::Bool(compare(left, right)? == Ordering::Equal)),
        OperatorKind::NotEq => Ok(Value::Bool(compare(left, right)? != Ordering::Equal)),
        OperatorKind::Gt => Ok(Value::Bool(compare(left, right)? == Ordering::Greater)),
        OperatorKind::Gte => Ok(Value::Bool(compare(left, right)? != Ordering::Less)),
        OperatorKind::Lt => Ok(Value::Bool(compare(left, right)? == Ordering::Less)),
        OperatorKind::Lte => Ok(Value::Bool(compare(left, right)? != Ordering::Greater)),
    }
}

/// Numeric coercion for arithmetic operands
pub(crate) fn to_number(value: &Value) -> FormulaResult<f64> {
    value.as_number().ok_or_else(|| {
        FormulaError::new(ErrorKind::Value {
            reason: format!("cannot use a {} as a number", value.type_name()),
        })
    })
}

/// String coercion for concatenation
fn to_text(value: &Value) -> FormulaResult<String> {
    if matches!(value, Value::Array(_)) {
        return Err(ErrorKind::Value {
            reason: "cannot concatenate an array".to_string(),
        }
        .into());
    }
    Ok(value.as_string())
}

/// Total order across mixed scalar types: numbers < strings < booleans,
/// strings case-insensitive, empty cells compare as the number 0.
fn compare(left: &Value, right: &Value) -> FormulaResult<Ordering> {
    if matches!(left, Value::Array(_)) || matches!(right, Value::Array(_)) {
        return Err(ErrorKind::Value {
            reason: "cannot compare an array".to_string(),
        }
        .into());
    }

    let normalize = |v: &Value| match v {
        Value::Empty => Value::Number(0.0),
        other => other.clone(),
    };

    match (normalize(left), normalize(right)) {
        (Value::Number(l), Value::Number(r)) => Ok(l.total_cmp(&r)),
        (Value::String(l), Value::String(r)) => Ok(l.to_lowercase().cmp(&r.to_lowercase())),
        (Value::Bool(l), Value::Bool(r)) => Ok(l.cmp(&r)),
        (l, r) => Ok(l.type_rank().cmp(&r.type_rank())),
    }
}
