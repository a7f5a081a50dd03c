//! Math and aggregate functions

use super::numeric_scalars;
use crate::error::{ErrorKind, FormulaResult};
use crate::operation::to_number;
use gridcalc_core::Value;

pub(crate) fn fn_sum(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::Number(numeric_scalars(args).iter().sum()))
}

pub(crate) fn fn_average(args: &[Value]) -> FormulaResult<Value> {
    let numbers = numeric_scalars(args);
    if numbers.is_empty() {
        return Err(ErrorKind::DivisionByZero.into());
    }
    Ok(Value::Number(
        numbers.iter().sum::<f64>() / numbers.len() as f64,
    ))
}

pub(crate) fn fn_min(args: &[Value]) -> FormulaResult<Value> {
    let min = numeric_scalars(args)
        .into_iter()
        .fold(f64::INFINITY, f64::min);
    Ok(Value::Number(if min.is_finite() { min } else { 0.0 }))
}

pub(crate) fn fn_max(args: &[Value]) -> FormulaResult<Value> {
    let max = numeric_scalars(args)
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max);
    Ok(Value::Number(if max.is_finite() { max } else { 0.0 }))
}

pub(crate) fn fn_count(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::Number(numeric_scalars(args).len() as f64))
}

pub(crate) fn fn_abs(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::Number(to_number(&args[0])?.abs()))
}

/// ROUND(number, digits=0), half away from zero
pub(crate) fn fn_round(args: &[Value]) -> FormulaResult<Value> {
    let number = to_number(&args[0])?;
    let digits = match args.get(1) {
        Some(v) => to_number(v)?.trunc() as i32,
        None => 0,
    };
    let factor = 10f64.powi(digits);
    Ok(Value::Number((number * factor).round() / factor))
}

/// MOD(number, divisor); the result takes the divisor's sign
pub(crate) fn fn_mod(args: &[Value]) -> FormulaResult<Value> {
    let number = to_number(&args[0])?;
    let divisor = to_number(&args[1])?;
    if divisor == 0.0 {
        return Err(ErrorKind::DivisionByZero.into());
    }
    Ok(Value::Number(number - divisor * (number / divisor).floor()))
}

/// FLOOR(number, significance=1)
pub(crate) fn fn_floor(args: &[Value]) -> FormulaResult<Value> {
    let number = to_number(&args[0])?;
    let significance = match args.get(1) {
        Some(v) => to_number(v)?,
        None => 1.0,
    };
    if significance == 0.0 {
        return Err(ErrorKind::DivisionByZero.into());
    }
    Ok(Value::Number((number / significance).floor() * significance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_sum_flattens_and_skips_text() {
        let args = vec![
            num(1.0),
            Value::Array(vec![num(2.0), Value::from("junk"), num(3.0)]),
            Value::Empty,
        ];
        assert_eq!(fn_sum(&args).unwrap(), num(6.0));
    }

    #[test]
    fn test_average() {
        assert_eq!(fn_average(&[num(2.0), num(4.0), num(6.0)]).unwrap(), num(4.0));
        let err = fn_average(&[Value::Empty]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_min_max() {
        let args = [num(5.0), num(2.0), num(8.0), num(1.0)];
        assert_eq!(fn_min(&args).unwrap(), num(1.0));
        assert_eq!(fn_max(&args).unwrap(), num(8.0));
        // No numeric inputs at all
        assert_eq!(fn_min(&[Value::Empty]).unwrap(), num(0.0));
        assert_eq!(fn_max(&[Value::Empty]).unwrap(), num(0.0));
    }

    #[test]
    fn test_count_skips_non_numeric() {
        let args = [num(1.0), num(2.0), Value::from("a"), num(3.0)];
        assert_eq!(fn_count(&args).unwrap(), num(3.0));
    }

    #[test]
    fn test_abs() {
        assert_eq!(fn_abs(&[num(-5.0)]).unwrap(), num(5.0));
        assert_eq!(fn_abs(&[num(5.0)]).unwrap(), num(5.0));
    }

    #[test]
    fn test_round() {
        assert_eq!(fn_round(&[num(2.5)]).unwrap(), num(3.0));
        assert_eq!(fn_round(&[num(-2.5)]).unwrap(), num(-3.0));
        assert_eq!(fn_round(&[num(3.14159), num(2.0)]).unwrap(), num(3.14));
        assert_eq!(fn_round(&[num(1250.0), num(-2.0)]).unwrap(), num(1300.0));
    }

    #[test]
    fn test_mod_takes_the_divisor_sign() {
        assert_eq!(fn_mod(&[num(3.0), num(2.0)]).unwrap(), num(1.0));
        assert_eq!(fn_mod(&[num(-3.0), num(2.0)]).unwrap(), num(1.0));
        assert_eq!(fn_mod(&[num(3.0), num(-2.0)]).unwrap(), num(-1.0));
        let err = fn_mod(&[num(3.0), num(0.0)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_floor() {
        assert_eq!(fn_floor(&[num(4.7)]).unwrap(), num(4.0));
        assert_eq!(fn_floor(&[num(7.3), num(2.0)]).unwrap(), num(6.0));
        let err = fn_floor(&[num(1.0), num(0.0)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
    }
}
