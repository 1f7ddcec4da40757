//! Expression and matrix-product parsers
//!
//! Expressions are tokenized once and parsed by precedence climbing into an
//! [`Expr`] tree. Tiers, tightest first: `^`, then `* / %` (and the implicit
//! product in `3x`), then `+ -`. Every tier is left-associative. Unary signs
//! bind looser than `^`, so `-2^2` is `-(2^2)`.

use crate::ast::{BinOp, Expr, MatrixTerm, Span, Spanned, UnOp};
use crate::error::{EvalError, Result};
use crate::lexer::{tokenize, Token};
use crate::util::{STACK_GROW_SIZE, STACK_RED_ZONE};


/// Operators that cannot open an expression
const NON_UNARY_OPERATORS: &[char] = &['*', '/', '%', '^'];
/// Operators that cannot close an expression
const BINARY_OPERATORS: &[char] = &['+', '-', '*', '/', '%', '^'];

/// Parse a scalar expression. Spans are relative to `source`.
pub fn parse_expression(source: &str) -> Result<Spanned<Expr>> {
    validate_expression(source)?;
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(tokens, source.len());
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(Token::RParen) => Err(EvalError::syntax("unmatched ')'", parser.peek_span())),
        Some(token) => Err(EvalError::syntax(format!("unexpected '{token}'"), parser.peek_span())),
    }
}

/// Parse `term ** term ** ...` where each term is a bracket literal or a name.
///
/// Anything malformed here is a value error rather than a syntax error.
pub fn parse_matrix_product(source: &str) -> Result<Vec<Spanned<MatrixTerm>>> {
    let tokens = tokenize(source).map_err(as_value_error)?;
    let mut parser = Parser::new(tokens, source.len());
    let mut terms = vec![parser.matrix_term()?];
    while parser.eat(&Token::StarStar) {
        terms.push(parser.matrix_term()?);
    }
    if parser.peek().is_some() {
        return Err(parser.matrix_error("'**' or end of input"));
    }
    Ok(terms)
}

/// Split `name(param)` into its two names
pub fn parse_function_head(source: &str) -> Option<(&str, &str)> {
    let (name, rest) = source.split_once('(')?;
    let param = rest.strip_suffix(')')?;
    let (name, param) = (name.trim(), param.trim());
    let is_name = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphabetic());
    (is_name(name) && is_name(param)).then_some((name, param))
}

fn as_value_error(err: EvalError) -> EvalError {
    match err {
        EvalError::Syntax { message, span } => EvalError::Value { message, span },
        other => other,
    }
}

/// Character-level checks done before tokenizing
fn validate_expression(source: &str) -> Result<()> {
    let end = Span::new(source.len(), source.len());
    let (first, last) = match (source.char_indices().next(), source.char_indices().next_back()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(EvalError::syntax("empty expression", end)),
    };

    if let Some((pos, c)) = source.char_indices().find(|&(_, c)| !is_expression_char(c)) {
        return Err(EvalError::syntax(
            format!("unexpected character '{c}'"),
            Span::new(pos, pos + c.len_utf8()),
        ));
    }
    if NON_UNARY_OPERATORS.contains(&first.1) {
        return Err(EvalError::syntax(
            format!("expression cannot start with '{}'", first.1),
            Span::new(first.0, first.0 + 1),
        ));
    }
    if BINARY_OPERATORS.contains(&last.1) {
        return Err(EvalError::syntax(
            format!("expression cannot end with '{}'", last.1),
            Span::new(last.0, last.0 + 1),
        ));
    }
    Ok(())
}

fn is_expression_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '(' | ')' | ' ' | '\t') || BINARY_OPERATORS.contains(&c)
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    eof: Span,
}

impl Parser {
    fn new(tokens: Vec<(Token, Span)>, len: usize) -> Self {
        Parser {
            tokens,
            pos: 0,
            eof: Span::new(len, len),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_span(&self) -> Span {
        self.tokens.get(self.pos).map_or(self.eof, |(_, s)| *s)
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn follows_number(&self) -> bool {
        self.pos > 0 && self.tokens[self.pos - 1].0.is_number()
    }

    fn binary(left: Spanned<Expr>, op: BinOp, right: Spanned<Expr>) -> Spanned<Expr> {
        let span = left.span.merge(right.span);
        Spanned::new(
            Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        )
    }

    fn expr(&mut self) -> Result<Spanned<Expr>> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.sum())
    }

    /// expr := term (('+' | '-') term)*
    fn sum(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.term()?;
            left = Self::binary(left, op, right);
        }
    }

    /// term := unary (('*' | '/' | '%') unary | <number directly followed by a name> unary)*
    fn term(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Mod,
                Some(Token::Ident(_)) if self.follows_number() => {
                    let right = self.power()?;
                    left = Self::binary(left, BinOp::Mul, right);
                    continue;
                }
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Self::binary(left, op, right);
        }
    }

    /// unary := ('-' | '+')* power
    fn unary(&mut self) -> Result<Spanned<Expr>> {
        let signs = self.signs();
        let inner = self.power()?;
        Ok(Self::apply_signs(signs, inner))
    }

    /// power := atom ('^' signed)*
    fn power(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.atom()?;
        while self.eat(&Token::Caret) {
            let right = self.signed()?;
            left = Self::binary(left, BinOp::Pow, right);
        }
        Ok(left)
    }

    /// signed := ('-' | '+')* atom
    fn signed(&mut self) -> Result<Spanned<Expr>> {
        let signs = self.signs();
        let inner = self.atom()?;
        Ok(Self::apply_signs(signs, inner))
    }

    /// A run of signs folded into one operator, spanning from its first sign.
    /// An odd number of '-' gives `Neg`, anything else `Plus`.
    fn signs(&mut self) -> Option<(UnOp, Span)> {
        let (mut op, start) = self.sign()?;
        while let Some((next, _)) = self.sign() {
            op = if (op == UnOp::Neg) != (next == UnOp::Neg) {
                UnOp::Neg
            } else {
                UnOp::Plus
            };
        }
        Some((op, start))
    }

    fn apply_signs(signs: Option<(UnOp, Span)>, inner: Spanned<Expr>) -> Spanned<Expr> {
        match signs {
            Some((op, span)) => Self::unary_node(op, span, inner),
            None => inner,
        }
    }

    fn sign(&mut self) -> Option<(UnOp, Span)> {
        let op = match self.peek()? {
            Token::Minus => UnOp::Neg,
            Token::Plus => UnOp::Plus,
            _ => return None,
        };
        let span = self.peek_span();
        self.pos += 1;
        Some((op, span))
    }

    fn unary_node(op: UnOp, op_span: Span, inner: Spanned<Expr>) -> Spanned<Expr> {
        let span = op_span.merge(inner.span);
        Spanned::new(
            Expr::Unary {
                op,
                expr: Box::new(inner),
            },
            span,
        )
    }

    /// atom := number | name | name '(' expr ')' | '(' expr ')'
    fn atom(&mut self) -> Result<Spanned<Expr>> {
        let Some((token, span)) = self.advance() else {
            return Err(EvalError::syntax("unexpected end of expression", self.eof));
        };
        match token {
            Token::IntLit(n) => Ok(Spanned::new(Expr::IntLit(n), span)),
            Token::FloatLit(x) => Ok(Spanned::new(Expr::FloatLit(x), span)),
            Token::Ident(name) if self.peek() == Some(&Token::LParen) => {
                self.pos += 1;
                let arg = self.expr()?;
                let close = self.close_paren(span)?;
                Ok(Spanned::new(
                    Expr::Call {
                        func: name,
                        arg: Box::new(arg),
                    },
                    span.merge(close),
                ))
            }
            Token::Ident(name) => Ok(Spanned::new(Expr::Var(name), span)),
            Token::LParen => {
                let inner = self.expr()?;
                let close = self.close_paren(span)?;
                Ok(Spanned::new(inner.node, span.merge(close)))
            }
            other => Err(EvalError::syntax(format!("expected operand, found '{other}'"), span)),
        }
    }

    fn close_paren(&mut self, open: Span) -> Result<Span> {
        let span = self.peek_span();
        if self.eat(&Token::RParen) {
            Ok(span)
        } else if self.peek().is_none() {
            Err(EvalError::syntax("unclosed '('", open))
        } else {
            Err(EvalError::syntax(
                format!("expected ')', found '{}'", self.tokens[self.pos].0),
                span,
            ))
        }
    }

    fn matrix_error(&self, expected: &str) -> EvalError {
        let found = self.peek().map_or("end of input".to_string(), |t| format!("'{t}'"));
        EvalError::value(
            format!("malformed matrix literal: expected {expected}, found {found}"),
            self.peek_span(),
        )
    }

    /// term := name | '[' row (';' row)* ']'
    fn matrix_term(&mut self) -> Result<Spanned<MatrixTerm>> {
        let start = self.peek_span();
        if let Some(Token::Ident(name)) = self.peek() {
            let name = name.clone();
            self.pos += 1;
            return Ok(Spanned::new(MatrixTerm::Var(name), start));
        }
        if !self.eat(&Token::LBracket) {
            return Err(self.matrix_error("'[' or a matrix name"));
        }
        let mut rows = vec![self.matrix_row()?];
        while self.eat(&Token::Semi) {
            rows.push(self.matrix_row()?);
        }
        let end = self.peek_span();
        if !self.eat(&Token::RBracket) {
            return Err(self.matrix_error("';' or ']'"));
        }
        Ok(Spanned::new(MatrixTerm::Literal(rows), start.merge(end)))
    }

    /// row := '[' entry (',' entry)* ']'
    fn matrix_row(&mut self) -> Result<Vec<i64>> {
        if !self.eat(&Token::LBracket) {
            return Err(self.matrix_error("'['"));
        }
        let mut row = vec![self.matrix_entry()?];
        while self.eat(&Token::Comma) {
            row.push(self.matrix_entry()?);
        }
        if !self.eat(&Token::RBracket) {
            return Err(self.matrix_error("',' or ']'"));
        }
        Ok(row)
    }

    /// entry := '-'? integer
    fn matrix_entry(&mut self) -> Result<i64> {
        let negative = self.eat(&Token::Minus);
        match self.peek() {
            Some(Token::IntLit(n)) => {
                let n = *n;
                self.pos += 1;
                Ok(if negative { -n } else { n })
            }
            _ => Err(self.matrix_error("an integer")),
        }
    }
}
