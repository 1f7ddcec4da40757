//! Values, arithmetic, and evaluation
//!
//! Numbers form a tower (integer, float, complex) and results are kept as
//! low on it as they can be. Matrices only take part in `**` products.

mod arith;
mod env;
mod eval;
mod function;
mod matrix;
mod value;

pub use env::{Environment, IMAGINARY_UNIT};
pub use eval::Evaluator;
pub use function::Function;
pub use matrix::{Matrix, MatrixError};
pub use value::{format_complex, format_float, Real, Value};
