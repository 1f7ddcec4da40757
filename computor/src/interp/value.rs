//! Runtime values: the numeric tower plus matrices and functions

use super::function::Function;
use super::matrix::Matrix;
use num_complex::Complex64;
use std::fmt;

/// Largest magnitude at which every integral f64 is exactly representable
const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Real number; integers and floats stay distinct
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Real {
    Int(i64),
    Float(f64),
}

impl Real {
    pub fn as_f64(self) -> f64 {
        match self {
            Real::Int(n) => n as f64,
            Real::Float(x) => x,
        }
    }

    /// Integral values come back as `Int`
    fn demote(x: f64) -> Real {
        if x.is_finite() && x.fract() == 0.0 && x.abs() < EXACT_INT_LIMIT {
            Real::Int(x as i64)
        } else {
            Real::Float(x)
        }
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Real::Int(n) => write!(f, "{n}"),
            Real::Float(x) => f.write_str(&format_float(*x)),
        }
    }
}

/// Runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer or float
    Scalar(Real),
    /// Complex number with a non-zero imaginary part. `exact` while only
    /// integers and `i` went into it.
    Complex { value: Complex64, exact: bool },
    /// Rectangular integer matrix
    Matrix(Matrix),
    /// One-variable function template
    Function(Function),
}

impl Value {
    pub fn int(n: i64) -> Self {
        Value::Scalar(Real::Int(n))
    }

    pub fn float(x: f64) -> Self {
        Value::Scalar(Real::Float(x))
    }

    /// What an unknown identifier reads as
    pub fn zero() -> Self {
        Value::int(0)
    }

    /// The imaginary unit
    pub fn imaginary_unit() -> Self {
        Value::Complex {
            value: Complex64::new(0.0, 1.0),
            exact: true,
        }
    }

    /// Complex result of an operation; a zero imaginary part collapses to a
    /// real, which is an integer only when the result is exact and integral
    pub fn from_complex(c: Complex64, exact: bool) -> Self {
        match (c.im == 0.0, exact) {
            (true, true) => Value::Scalar(Real::demote(c.re)),
            (true, false) => Value::float(c.re),
            (false, _) => Value::Complex { value: c, exact },
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Scalar(_) | Value::Complex { .. })
    }

    /// Whether no float went into this number
    pub fn is_exact(&self) -> bool {
        match self {
            Value::Scalar(Real::Int(_)) => true,
            Value::Complex { exact, .. } => *exact,
            _ => false,
        }
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Scalar(Real::Int(_)) => "integer",
            Value::Scalar(Real::Float(_)) => "float",
            Value::Complex { .. } => "complex",
            Value::Matrix(_) => "matrix",
            Value::Function(_) => "function",
        }
    }

    /// Widen a number to complex
    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            Value::Scalar(r) => Some(Complex64::new(r.as_f64(), 0.0)),
            Value::Complex { value, .. } => Some(*value),
            Value::Matrix(_) | Value::Function(_) => None,
        }
    }
}

/// Floats always carry a radix point
pub fn format_float(x: f64) -> String {
    let text = format!("{x}");
    if x.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

/// One component of a complex number; integral parts print without a point
fn format_component(x: f64) -> String {
    // avoid printing "-0"
    let x = if x == 0.0 { 0.0 } else { x };
    format!("{x}")
}

/// `a + bi`, `a - bi`, or `bi` when the real part is zero; a unit coefficient prints as bare `i`
pub fn format_complex(c: Complex64) -> String {
    let magnitude = c.im.abs();
    let imag = if magnitude == 1.0 {
        "i".to_string()
    } else {
        format!("{}i", format_component(magnitude))
    };

    if c.re == 0.0 {
        if c.im < 0.0 { format!("-{imag}") } else { imag }
    } else {
        let sign = if c.im < 0.0 { '-' } else { '+' };
        format!("{} {sign} {imag}", format_component(c.re))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(r) => write!(f, "{r}"),
            Value::Complex { value, .. } => f.write_str(&format_complex(*value)),
            Value::Matrix(m) => write!(f, "{m}"),
            Value::Function(func) => write!(f, "{func}"),
        }
    }
}
