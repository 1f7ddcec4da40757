//! Expression tree

use super::Spanned;
use crate::interp::{format_float, Function, Value};
use crate::util::{STACK_GROW_SIZE, STACK_RED_ZONE};
use std::fmt;

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal
    IntLit(i64),
    /// Float literal
    FloatLit(f64),

    /// Variable reference (`i` is the imaginary unit)
    Var(String),

    /// A variable whose value was captured when a function was defined
    Bound { name: String, value: Box<Value> },

    /// Binary operation
    Binary {
        left: Box<Spanned<Expr>>,
        op: BinOp,
        right: Box<Spanned<Expr>>,
    },

    /// Unary operation
    Unary {
        op: UnOp,
        expr: Box<Spanned<Expr>>,
    },

    /// Single-argument function call
    Call {
        func: String,
        arg: Box<Spanned<Expr>>,
    },

    /// Call whose callee was captured when the enclosing function was defined
    BoundCall {
        callee: Box<Function>,
        arg: Box<Spanned<Expr>>,
    },
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinOp {
    /// Precedence tier; higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div | BinOp::Mod => 2,
            BinOp::Pow => 4,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "^",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Plus,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnOp::Neg => f.write_str("-"),
            UnOp::Plus => f.write_str("+"),
        }
    }
}

/// Operand of a matrix product chain `a ** b ** ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixTerm {
    /// Bracket literal; rows are not yet checked for equal length
    Literal(Vec<Vec<i64>>),
    /// Name expected to hold a matrix
    Var(String),
}

/// Binding strength used when printing; unary sits between `*` and `^`
const UNARY_BINDING: u8 = 3;
const ATOM_BINDING: u8 = 5;

impl Expr {
    fn binding(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Unary { .. } => UNARY_BINDING,
            _ => ATOM_BINDING,
        }
    }

    /// Whether the tree mentions `name` as a free variable
    pub fn mentions(&self, name: &str) -> bool {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.mentions_inner(name))
    }

    fn mentions_inner(&self, name: &str) -> bool {
        match self {
            Expr::Var(v) => v == name,
            Expr::Binary { left, right, .. } => left.node.mentions(name) || right.node.mentions(name),
            Expr::Unary { expr, .. } => expr.node.mentions(name),
            Expr::Call { arg, .. } | Expr::BoundCall { arg, .. } => arg.node.mentions(name),
            Expr::IntLit(_) | Expr::FloatLit(_) | Expr::Bound { .. } => false,
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.write_to(f))
    }
}

impl Expr {
    fn write_to(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntLit(n) => write!(f, "{n}"),
            Expr::FloatLit(x) => f.write_str(&format_float(*x)),
            Expr::Var(name) => f.write_str(name),
            Expr::Bound { value, .. } => {
                let text = value.to_string();
                if text.starts_with('-') || matches!(**value, Value::Complex { .. }) {
                    write!(f, "({text})")
                } else {
                    f.write_str(&text)
                }
            }
            Expr::Binary { left, op, right } => {
                let p = op.precedence();
                write_operand(f, &left.node, left.node.binding() < p)?;
                write!(f, " {op} ")?;
                // operators are left-associative, so an equal-tier right operand needs parens
                write_operand(f, &right.node, right.node.binding() <= p)
            }
            Expr::Unary { op, expr } => {
                write!(f, "{op}")?;
                write_operand(f, &expr.node, expr.node.binding() < UNARY_BINDING)
            }
            Expr::Call { func, arg } => write!(f, "{func}({})", arg.node),
            Expr::BoundCall { callee, arg } => write!(f, "{}({})", callee.name, arg.node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;

    fn sp(expr: Expr) -> Box<Spanned<Expr>> {
        Box::new(Spanned::new(expr, Span::new(0, 0)))
    }

    fn bin(left: Expr, op: BinOp, right: Expr) -> Expr {
        Expr::Binary { left: sp(left), op, right: sp(right) }
    }

    #[test]
    fn test_display_flat_sum() {
        let e = bin(bin(Expr::Var("x".into()), BinOp::Pow, Expr::IntLit(2)), BinOp::Add, Expr::IntLit(1));
        assert_eq!(e.to_string(), "x ^ 2 + 1");
    }

    #[test]
    fn test_display_parenthesizes_lower_tier() {
        let e = bin(bin(Expr::Var("x".into()), BinOp::Add, Expr::IntLit(1)), BinOp::Mul, Expr::IntLit(3));
        assert_eq!(e.to_string(), "(x + 1) * 3");
    }

    #[test]
    fn test_display_right_operand_same_tier() {
        let e = bin(Expr::IntLit(8), BinOp::Sub, bin(Expr::IntLit(2), BinOp::Sub, Expr::IntLit(1)));
        assert_eq!(e.to_string(), "8 - (2 - 1)");
    }

    #[test]
    fn test_display_negated_power_base() {
        let neg = Expr::Unary { op: UnOp::Neg, expr: sp(Expr::Var("x".into())) };
        let e = bin(neg, BinOp::Pow, Expr::IntLit(2));
        assert_eq!(e.to_string(), "(-x) ^ 2");
    }

    #[test]
    fn test_display_negative_bound_value() {
        let e = bin(
            Expr::Var("x".into()),
            BinOp::Mul,
            Expr::Bound { name: "a".into(), value: Box::new(Value::int(-3)) },
        );
        assert_eq!(e.to_string(), "x * (-3)");
    }

    #[test]
    fn test_display_call_and_float() {
        let e = Expr::Call { func: "f".into(), arg: sp(Expr::FloatLit(2.0)) };
        assert_eq!(e.to_string(), "f(2.0)");
    }

    #[test]
    fn test_mentions() {
        let e = bin(Expr::Var("x".into()), BinOp::Add, Expr::IntLit(1));
        assert!(e.mentions("x"));
        assert!(!e.mentions("y"));
    }
}
