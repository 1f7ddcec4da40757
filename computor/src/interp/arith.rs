//! Arithmetic over the numeric tower
//!
//! Promotion rules: int op int stays int unless the result needs more (a
//! non-exact quotient, a negative exponent, overflow), any float operand makes
//! the result float, and any complex operand makes it complex. Complex results
//! with a zero imaginary part fall back to reals: integers when no float went
//! into them, floats otherwise.

use super::value::{Real, Value};
use crate::ast::{BinOp, Span, UnOp};
use crate::error::{EvalError, Result};
use num_complex::Complex64;
use tracing::trace;

/// Components this small relative to the modulus are rounding noise from `powc`
const COMPONENT_EPSILON: f64 = 1e-14;

/// Apply a binary operator
pub fn binary(op: BinOp, left: &Value, right: &Value, span: Span) -> Result<Value> {
    trace!(%op, left = left.type_name(), right = right.type_name(), "apply");
    match (left, right) {
        (Value::Scalar(a), Value::Scalar(b)) => real_binary(op, *a, *b, span),
        (Value::Scalar(_) | Value::Complex { .. }, Value::Scalar(_) | Value::Complex { .. }) => {
            let exact = left.is_exact() && right.is_exact();
            match (left.as_complex(), right.as_complex()) {
                (Some(a), Some(b)) => complex_binary(op, a, b, exact, span),
                _ => Err(operand_error(op, left, right, span)),
            }
        }
        _ => Err(operand_error(op, left, right, span)),
    }
}

/// Apply a unary operator
pub fn unary(op: UnOp, value: &Value, span: Span) -> Result<Value> {
    match (op, value) {
        (UnOp::Plus, Value::Scalar(_) | Value::Complex { .. }) => Ok(value.clone()),
        (UnOp::Neg, Value::Scalar(Real::Int(n))) => Ok(n
            .checked_neg()
            .map_or_else(|| Value::float(-(*n as f64)), Value::int)),
        (UnOp::Neg, Value::Scalar(Real::Float(x))) => Ok(Value::float(-x)),
        (UnOp::Neg, Value::Complex { value, exact }) => Ok(Value::Complex {
            value: -value,
            exact: *exact,
        }),
        _ => Err(EvalError::value(
            format!("cannot apply '{op}' to a {}", value.type_name()),
            span,
        )),
    }
}

fn operand_error(op: BinOp, left: &Value, right: &Value, span: Span) -> EvalError {
    EvalError::value(
        format!(
            "cannot apply '{op}' to a {} and a {}",
            left.type_name(),
            right.type_name()
        ),
        span,
    )
}

fn division_by_zero(op: BinOp, span: Span) -> EvalError {
    match op {
        BinOp::Mod => EvalError::internal("modulo by zero", span),
        _ => EvalError::internal("division by zero", span),
    }
}

fn real_binary(op: BinOp, a: Real, b: Real, span: Span) -> Result<Value> {
    match (a, b) {
        (Real::Int(x), Real::Int(y)) => int_binary(op, x, y, span),
        _ => float_binary(op, a.as_f64(), b.as_f64(), span),
    }
}

fn int_binary(op: BinOp, x: i64, y: i64, span: Span) -> Result<Value> {
    let exact = match op {
        BinOp::Add => x.checked_add(y),
        BinOp::Sub => x.checked_sub(y),
        BinOp::Mul => x.checked_mul(y),
        BinOp::Div => {
            if y == 0 {
                return Err(division_by_zero(op, span));
            }
            // only an even split stays integral
            match x.checked_rem(y) {
                Some(0) => x.checked_div(y),
                _ => None,
            }
        }
        BinOp::Mod => {
            if y == 0 {
                return Err(division_by_zero(op, span));
            }
            let r = x.wrapping_rem(y);
            Some(if r != 0 && (r < 0) != (y < 0) { r + y } else { r })
        }
        BinOp::Pow => {
            if x == 0 && y < 0 {
                return Err(EvalError::internal("zero cannot be raised to a negative power", span));
            }
            u32::try_from(y).ok().and_then(|e| x.checked_pow(e))
        }
    };

    match exact {
        Some(n) => Ok(Value::int(n)),
        None => float_binary(op, x as f64, y as f64, span),
    }
}

fn float_binary(op: BinOp, x: f64, y: f64, span: Span) -> Result<Value> {
    let result = match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div => {
            if y == 0.0 {
                return Err(division_by_zero(op, span));
            }
            x / y
        }
        BinOp::Mod => {
            if y == 0.0 {
                return Err(division_by_zero(op, span));
            }
            let r = x % y;
            if r != 0.0 && (r < 0.0) != (y < 0.0) { r + y } else { r }
        }
        BinOp::Pow => {
            if x == 0.0 && y < 0.0 {
                return Err(EvalError::internal("zero cannot be raised to a negative power", span));
            }
            if x < 0.0 && y.fract() != 0.0 {
                // a negative base with a fractional exponent leaves the reals
                return complex_binary(op, Complex64::new(x, 0.0), Complex64::new(y, 0.0), false, span);
            }
            x.powf(y)
        }
    };

    if result.is_finite() {
        Ok(Value::float(result))
    } else {
        Err(EvalError::internal("numeric overflow", span))
    }
}

fn complex_binary(op: BinOp, a: Complex64, b: Complex64, exact: bool, span: Span) -> Result<Value> {
    let zero = Complex64::new(0.0, 0.0);
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == zero {
                return Err(division_by_zero(op, span));
            }
            a / b
        }
        BinOp::Mod => {
            return Err(EvalError::internal("modulo is not defined for complex numbers", span));
        }
        BinOp::Pow => complex_pow(a, b, span)?,
    };

    if result.re.is_finite() && result.im.is_finite() {
        Ok(Value::from_complex(tidy(result), exact))
    } else {
        Err(EvalError::internal("numeric overflow", span))
    }
}

fn complex_pow(base: Complex64, exp: Complex64, span: Span) -> Result<Complex64> {
    let zero = Complex64::new(0.0, 0.0);
    if base == zero {
        return if exp.re > 0.0 {
            Ok(zero)
        } else if exp == zero {
            Ok(Complex64::new(1.0, 0.0))
        } else {
            Err(EvalError::internal("zero cannot be raised to a negative power", span))
        };
    }
    if exp.im == 0.0 && exp.re.fract() == 0.0 && exp.re.abs() <= f64::from(i32::MAX) {
        return Ok(powi(base, exp.re as i64));
    }
    Ok(base.powc(exp))
}

/// Exact integer power by repeated squaring, so `i^2` is exactly `-1`
fn powi(base: Complex64, exp: i64) -> Complex64 {
    let mut result = Complex64::new(1.0, 0.0);
    let mut square = base;
    let mut n = exp.unsigned_abs();
    while n > 0 {
        if n & 1 == 1 {
            result *= square;
        }
        square *= square;
        n >>= 1;
    }
    if exp < 0 { result.inv() } else { result }
}

/// Zero out a component that is only rounding noise
fn tidy(c: Complex64) -> Complex64 {
    let noise = c.norm() * COMPONENT_EPSILON;
    let re = if c.re.abs() <= noise { 0.0 } else { c.re };
    let im = if c.im.abs() <= noise { 0.0 } else { c.im };
    Complex64::new(re, im)
}
