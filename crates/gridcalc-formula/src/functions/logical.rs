//! Logical functions

use super::flatten;
use crate::error::{ErrorKind, FormulaError, FormulaResult};
use gridcalc_core::Value;

fn to_condition(value: &Value) -> FormulaResult<bool> {
    value.as_bool().ok_or_else(|| {
        FormulaError::new(ErrorKind::Value {
            reason: format!("cannot use a {} as a condition", value.type_name()),
        })
    })
}

/// IF(condition, then, else=FALSE)
pub(crate) fn fn_if(args: &[Value]) -> FormulaResult<Value> {
    if to_condition(&args[0])? {
        Ok(args[1].clone())
    } else {
        Ok(args.get(2).cloned().unwrap_or(Value::Bool(false)))
    }
}

pub(crate) fn fn_and(args: &[Value]) -> FormulaResult<Value> {
    let mut result = true;
    let mut seen = false;
    for value in flatten(args) {
        if value.is_empty() {
            continue;
        }
        seen = true;
        result &= to_condition(value)?;
    }
    if !seen {
        return Err(ErrorKind::Value {
            reason: "no logical values among the arguments".to_string(),
        }
        .into());
    }
    Ok(Value::Bool(result))
}

pub(crate) fn fn_or(args: &[Value]) -> FormulaResult<Value> {
    let mut result = false;
    let mut seen = false;
    for value in flatten(args) {
        if value.is_empty() {
            continue;
        }
        seen = true;
        result |= to_condition(value)?;
    }
    if !seen {
        return Err(ErrorKind::Value {
            reason: "no logical values among the arguments".to_string(),
        }
        .into());
    }
    Ok(Value::Bool(result))
}

pub(crate) fn fn_not(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::Bool(!to_condition(&args[0])?))
}
