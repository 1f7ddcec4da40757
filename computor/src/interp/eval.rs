//! Tree-walking evaluator

use super::arith;
use super::env::{Environment, IMAGINARY_UNIT};
use super::function::{lookup, Function};
use super::matrix::{Matrix, MatrixError};
use super::Value;
use crate::ast::{Expr, MatrixTerm, Span, Spanned};
use crate::error::{EvalError, Result};
use crate::util::{STACK_GROW_SIZE, STACK_RED_ZONE};
use tracing::trace;

/// The parameter of the function being applied and its argument
type Binding<'b> = Option<(&'b str, &'b Value)>;

/// Evaluates expressions against a read-only environment
pub struct Evaluator<'a> {
    env: &'a Environment,
}

impl<'a> Evaluator<'a> {
    pub fn new(env: &'a Environment) -> Self {
        Evaluator { env }
    }

    /// Evaluate a scalar expression
    pub fn eval(&self, expr: &Spanned<Expr>) -> Result<Value> {
        self.eval_in(expr, None)
    }

    /// Apply a stored function to an argument
    pub fn apply(&self, function: &Function, arg: &Value, span: Span) -> Result<Value> {
        if !arg.is_number() {
            return Err(EvalError::value(
                format!("function '{}' expects a number, got a {}", function.name, arg.type_name()),
                span,
            ));
        }
        trace!(function = %function.name, %arg, "apply");
        // body spans point into the definition, not into the caller's line
        self.eval_in(&function.body, Some((function.param.as_str(), arg)))
            .map_err(|err| err.with_span(span))
    }

    fn eval_in(&self, expr: &Spanned<Expr>, binding: Binding<'_>) -> Result<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(expr, binding))
    }

    fn eval_inner(&self, expr: &Spanned<Expr>, binding: Binding<'_>) -> Result<Value> {
        let span = expr.span;
        match &expr.node {
            Expr::IntLit(n) => Ok(Value::int(*n)),
            Expr::FloatLit(x) => Ok(Value::float(*x)),
            Expr::Bound { value, .. } => Ok((**value).clone()),
            Expr::Var(name) => self.variable(name, binding, span),
            Expr::Binary { left, op, right } => {
                let l = self.eval_in(left, binding)?;
                let r = self.eval_in(right, binding)?;
                arith::binary(*op, &l, &r, span)
            }
            Expr::Unary { op, expr } => {
                let v = self.eval_in(expr, binding)?;
                arith::unary(*op, &v, span)
            }
            Expr::Call { func, arg } => {
                let function = lookup(self.env, func, span)?;
                let arg = self.eval_in(arg, binding)?;
                self.apply(function, &arg, span)
            }
            Expr::BoundCall { callee, arg } => {
                let arg = self.eval_in(arg, binding)?;
                self.apply(callee, &arg, span)
            }
        }
    }

    fn variable(&self, name: &str, binding: Binding<'_>, span: Span) -> Result<Value> {
        if let Some((param, value)) = binding {
            if param == name {
                return Ok(value.clone());
            }
        }
        if name == IMAGINARY_UNIT {
            return Ok(Value::imaginary_unit());
        }
        match self.env.get(name) {
            Some(value @ (Value::Scalar(_) | Value::Complex { .. })) => Ok(value.clone()),
            Some(Value::Matrix(_)) => Err(EvalError::value(
                format!("matrix '{name}' can only be used with '**'"),
                span,
            )),
            Some(Value::Function(_)) => Err(EvalError::value(
                format!("function '{name}' is used without an argument"),
                span,
            )),
            None => {
                trace!(name, "undefined variable reads as 0");
                Ok(Value::zero())
            }
        }
    }

    /// Multiply a chain of matrix terms left to right
    pub fn eval_matrix_product(&self, terms: &[Spanned<MatrixTerm>]) -> Result<Matrix> {
        let mut iter = terms.iter();
        let Some(first) = iter.next() else {
            return Err(EvalError::internal_unlocated("empty matrix product"));
        };
        let mut acc = self.matrix_term(first)?;
        for term in iter {
            let rhs = self.matrix_term(term)?;
            acc = acc.multiply(&rhs).map_err(|err| match err {
                MatrixError::Overflow => EvalError::internal(err.to_string(), term.span),
                _ => EvalError::value(err.to_string(), term.span),
            })?;
        }
        Ok(acc)
    }

    fn matrix_term(&self, term: &Spanned<MatrixTerm>) -> Result<Matrix> {
        match &term.node {
            MatrixTerm::Literal(rows) => {
                Matrix::new(rows.clone()).map_err(|err| EvalError::value(err.to_string(), term.span))
            }
            MatrixTerm::Var(name) => match self.env.get(name) {
                Some(Value::Matrix(m)) => Ok(m.clone()),
                Some(other) => Err(EvalError::value(
                    format!("'{name}' is a {}, not a matrix", other.type_name()),
                    term.span,
                )),
                None => Err(EvalError::value(format!("'{name}' is not defined"), term.span)),
            },
        }
    }
}
