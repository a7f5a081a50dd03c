//! Text functions

use super::flatten;
use crate::error::{ErrorKind, FormulaError, FormulaResult};
use crate::operation::to_number;
use gridcalc_core::Value;

fn text_arg(value: &Value) -> FormulaResult<String> {
    if matches!(value, Value::Array(_)) {
        return Err(ErrorKind::Value {
            reason: "cannot use an array as text".to_string(),
        }
        .into());
    }
    Ok(value.as_string())
}

fn count_arg(value: &Value) -> FormulaResult<usize> {
    let n = to_number(value)?.trunc();
    if n < 0.0 {
        return Err(FormulaError::new(ErrorKind::Value {
            reason: "character count cannot be negative".to_string(),
        }));
    }
    Ok(n as usize)
}

pub(crate) fn fn_len(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::Number(text_arg(&args[0])?.chars().count() as f64))
}

/// LEFT(text, count=1)
pub(crate) fn fn_left(args: &[Value]) -> FormulaResult<Value> {
    let text = text_arg(&args[0])?;
    let count = match args.get(1) {
        Some(v) => count_arg(v)?,
        None => 1,
    };
    Ok(Value::String(text.chars().take(count).collect()))
}

/// RIGHT(text, count=1)
pub(crate) fn fn_right(args: &[Value]) -> FormulaResult<Value> {
    let text = text_arg(&args[0])?;
    let count = match args.get(1) {
        Some(v) => count_arg(v)?,
        None => 1,
    };
    let chars: Vec<char> = text.chars().collect();
    let start = chars.len().saturating_sub(count);
    Ok(Value::String(chars[start..].iter().collect()))
}

/// MID(text, start, count); start is 1-based
pub(crate) fn fn_mid(args: &[Value]) -> FormulaResult<Value> {
    let text = text_arg(&args[0])?;
    let start = to_number(&args[1])?.trunc();
    if start < 1.0 {
        return Err(ErrorKind::Value {
            reason: "start position must be at least 1".to_string(),
        }
        .into());
    }
    let count = count_arg(&args[2])?;
    Ok(Value::String(
        text.chars().skip(start as usize - 1).take(count).collect(),
    ))
}

pub(crate) fn fn_upper(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::String(text_arg(&args[0])?.to_uppercase()))
}

pub(crate) fn fn_lower(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::String(text_arg(&args[0])?.to_lowercase()))
}

/// CONCATENATE(...) joins every scalar, flattening array arguments
pub(crate) fn fn_concatenate(args: &[Value]) -> FormulaResult<Value> {
    let mut out = String::new();
    for value in flatten(args) {
        out.push_str(&value.as_string());
    }
    Ok(Value::String(out))
}
