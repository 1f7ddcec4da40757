//! One-variable function templates
//!
//! A definition such as `f(x) = a * x^2 + g(x)` is stored with every name other
//! than the parameter and `i` already replaced by its current value. Calls to
//! other functions capture the callee as it is at definition time.

use super::env::{Environment, IMAGINARY_UNIT};
use super::Value;
use crate::ast::{Expr, Span, Spanned};
use crate::error::{EvalError, Result};
use crate::util::{find_similar_name, STACK_GROW_SIZE, STACK_RED_ZONE};
use std::fmt;
use tracing::debug;

/// Stored function: parameter name plus a partially evaluated body
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub param: String,
    pub body: Spanned<Expr>,
    /// Names substituted into the body at definition, in order of first use
    pub bound: Vec<String>,
}

impl Function {
    /// Define a function, binding every free name in `body` against `env` now
    pub fn define(name: &str, param: &str, body: Spanned<Expr>, env: &Environment) -> Result<Function> {
        let mut bound = Vec::new();
        let body = bind(body, param, env, &mut bound)?;
        if !body.node.mentions(param) {
            debug!(name, param, "function body does not use its parameter");
        }
        debug!(name, param, ?bound, template = %body.node, "function defined");
        Ok(Function {
            name: name.to_string(),
            param: param.to_string(),
            body,
            bound,
        })
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body.node)
    }
}

/// Look up a function by name, suggesting a close match when there is none
pub fn lookup<'e>(env: &'e Environment, name: &str, span: Span) -> Result<&'e Function> {
    match env.get(name) {
        Some(Value::Function(function)) => Ok(function),
        _ => {
            let suggestion = find_similar_name(name, env.function_names(), 2).map(str::to_string);
            Err(EvalError::undefined_function(name, suggestion, span))
        }
    }
}

fn bind(expr: Spanned<Expr>, param: &str, env: &Environment, bound: &mut Vec<String>) -> Result<Spanned<Expr>> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || bind_node(expr, param, env, bound))
}

fn bind_node(expr: Spanned<Expr>, param: &str, env: &Environment, bound: &mut Vec<String>) -> Result<Spanned<Expr>> {
    let span = expr.span;
    let node = match expr.node {
        Expr::Var(name) if name == param || name == IMAGINARY_UNIT => Expr::Var(name),
        Expr::Var(name) => {
            let value = match env.get(&name) {
                Some(value @ (Value::Scalar(_) | Value::Complex { .. })) => value.clone(),
                None => Value::zero(),
                Some(Value::Matrix(_)) => {
                    return Err(EvalError::value(
                        format!("matrix '{name}' cannot be used in a function body"),
                        span,
                    ));
                }
                Some(Value::Function(_)) => {
                    return Err(EvalError::value(
                        format!("function '{name}' is used without an argument"),
                        span,
                    ));
                }
            };
            if !bound.contains(&name) {
                bound.push(name.clone());
            }
            Expr::Bound {
                name,
                value: Box::new(value),
            }
        }
        Expr::Call { func, arg } => {
            let callee = lookup(env, &func, span)?.clone();
            Expr::BoundCall {
                callee: Box::new(callee),
                arg: Box::new(bind(*arg, param, env, bound)?),
            }
        }
        Expr::BoundCall { callee, arg } => Expr::BoundCall {
            callee,
            arg: Box::new(bind(*arg, param, env, bound)?),
        },
        Expr::Binary { left, op, right } => Expr::Binary {
            left: Box::new(bind(*left, param, env, bound)?),
            op,
            right: Box::new(bind(*right, param, env, bound)?),
        },
        Expr::Unary { op, expr } => Expr::Unary {
            op,
            expr: Box::new(bind(*expr, param, env, bound)?),
        },
        node @ (Expr::IntLit(_) | Expr::FloatLit(_) | Expr::Bound { .. }) => node,
    };
    Ok(Spanned::new(node, span))
}
