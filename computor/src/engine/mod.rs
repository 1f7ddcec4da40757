//! Statement dispatcher
//!
//! One [`Engine`] is one session: it owns the variable environment and the
//! error counter. Each call to [`Engine::evaluate`] handles one input line,
//! which is one of
//!
//! - `variables`: list every binding
//! - `expr` or `name = ?`: print a value
//! - `name(param) = body`: define a function
//! - `a = b = ... = expr`: bind every target to the value of `expr`

use crate::ast::Span;
use crate::error::{ErrorKind, EvalError, Result};
use crate::interp::{Environment, Evaluator, Function, Value, IMAGINARY_UNIT};
use crate::lexer::{classify, TokenClass};
use crate::parser::{parse_expression, parse_function_head, parse_matrix_product};
use serde::Serialize;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

const VARIABLES_COMMAND: &str = "variables";
const QUERY_MARKER: &str = "?";

/// Result of evaluating one line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EngineOutput {
    /// Text to show; the caller adds any prompt marker
    Printed { text: String },
    /// The line failed; `index` numbers failures across the session from 0
    Failed { index: usize, error: EvalError },
}

impl EngineOutput {
    pub fn text(&self) -> Option<&str> {
        match self {
            EngineOutput::Printed { text } => Some(text),
            EngineOutput::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&EvalError> {
        match self {
            EngineOutput::Printed { .. } => None,
            EngineOutput::Failed { error, .. } => Some(error),
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.error().map(EvalError::kind)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EngineOutput::Failed { .. })
    }
}

impl fmt::Display for EngineOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineOutput::Printed { text } => f.write_str(text),
            EngineOutput::Failed { index, error } => write!(f, "Error {index}: {error}"),
        }
    }
}

/// A piece of the line between `=` signs, trimmed, with its offset into the line
#[derive(Debug, Clone, Copy)]
struct Fragment<'s> {
    text: &'s str,
    offset: usize,
}

impl<'s> Fragment<'s> {
    fn span(&self) -> Span {
        Span::new(self.offset, self.offset + self.text.len())
    }
}

/// What a line asks for
#[derive(Debug)]
enum Statement<'s> {
    VariablesDump,
    PlainQuery(Fragment<'s>),
    FunctionQuery(Fragment<'s>),
    FunctionDefine {
        name: &'s str,
        param: &'s str,
        head: Fragment<'s>,
        body: Fragment<'s>,
    },
    ChainAssign {
        targets: Vec<Fragment<'s>>,
        value: Fragment<'s>,
    },
}

/// Split on every `=`, trimming each piece
fn split_fragments(line: &str) -> Vec<Fragment<'_>> {
    let mut fragments = Vec::new();
    let mut start = 0;
    for piece in line.split('=') {
        let lead = piece.len() - piece.trim_start().len();
        fragments.push(Fragment {
            text: piece.trim(),
            offset: start + lead,
        });
        start += piece.len() + 1;
    }
    fragments
}

fn classify_statement(line: &str) -> Result<Statement<'_>> {
    if line.is_empty() {
        return Err(EvalError::syntax("empty statement", Span::new(0, 0)));
    }
    if line == VARIABLES_COMMAND {
        return Ok(Statement::VariablesDump);
    }

    let mut parts = split_fragments(line);
    if parts.len() == 1 {
        return Ok(Statement::PlainQuery(parts[0]));
    }

    let last = parts[parts.len() - 1];
    if last.text == QUERY_MARKER {
        if parts.len() != 2 {
            return Err(EvalError::syntax("'?' can only query a single name or expression", last.span()));
        }
        return Ok(Statement::FunctionQuery(parts[0]));
    }

    if parts.len() == 2 {
        if let Some((name, param)) = parse_function_head(parts[0].text) {
            return Ok(Statement::FunctionDefine {
                name,
                param,
                head: parts[0],
                body: parts[1],
            });
        }
    }

    let value = parts.pop().unwrap_or(last);
    Ok(Statement::ChainAssign { targets: parts, value })
}

fn is_variable_name(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_alphabetic())
}

/// An evaluation session
#[derive(Debug, Default)]
pub struct Engine {
    env: Environment,
    errors: usize,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one line. Never panics; every failure comes back numbered.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn evaluate(&mut self, line: &str) -> EngineOutput {
        let line = line.trim().to_ascii_lowercase();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.execute(&line)))
            .unwrap_or_else(|_| Err(EvalError::internal_unlocated("evaluation aborted unexpectedly")));

        match outcome {
            Ok(text) => EngineOutput::Printed { text },
            Err(error) => {
                let index = self.errors;
                self.errors += 1;
                debug!(index, kind = %error.kind(), %error, "statement failed");
                EngineOutput::Failed { index, error }
            }
        }
    }

    /// Bindings of this session
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Number of failed lines so far
    pub fn error_count(&self) -> usize {
        self.errors
    }

    fn execute(&mut self, line: &str) -> Result<String> {
        let statement = classify_statement(line)?;
        debug!(?statement, "dispatch");
        match statement {
            Statement::VariablesDump => Ok(self.dump_variables()),
            Statement::PlainQuery(fragment) | Statement::FunctionQuery(fragment) => {
                self.resolve(fragment).map(|value| value.to_string())
            }
            Statement::FunctionDefine {
                name,
                param,
                head,
                body,
            } => self.define_function(name, param, head, body),
            Statement::ChainAssign { targets, value } => self.assign(&targets, value),
        }
    }

    fn dump_variables(&self) -> String {
        self.env
            .iter()
            .map(|(name, value)| format!("{name}-> {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn define_function(&mut self, name: &str, param: &str, head: Fragment<'_>, body: Fragment<'_>) -> Result<String> {
        if name == IMAGINARY_UNIT || param == IMAGINARY_UNIT {
            return Err(EvalError::reserved_name(head.span()));
        }
        let expr = parse_expression(body.text).map_err(|err| err.shifted(body.offset))?;
        let function = Function::define(name, param, expr, &self.env).map_err(|err| err.shifted(body.offset))?;
        let template = function.to_string();
        self.env.define(name, Value::Function(function))?;
        Ok(template)
    }

    fn assign(&mut self, targets: &[Fragment<'_>], value: Fragment<'_>) -> Result<String> {
        let value = self.resolve(value)?;
        for target in targets {
            if target.text == IMAGINARY_UNIT {
                return Err(EvalError::reserved_name(target.span()));
            }
            if !is_variable_name(target.text) {
                return Err(EvalError::syntax(
                    format!("invalid variable name '{}'", target.text),
                    target.span(),
                ));
            }
        }
        for target in targets {
            self.env.define(target.text, value.clone())?;
        }
        debug!(targets = targets.len(), %value, "assigned");
        Ok(value.to_string())
    }

    /// Evaluate the right-hand side of a statement
    fn resolve(&self, fragment: Fragment<'_>) -> Result<Value> {
        let text = fragment.text;
        let evaluator = Evaluator::new(&self.env);
        let value = match classify(text) {
            TokenClass::Identifier if text == IMAGINARY_UNIT => {
                return Err(EvalError::reserved_name(fragment.span()));
            }
            TokenClass::Identifier => Ok(self.env.get(text).cloned().unwrap_or_else(Value::zero)),
            TokenClass::Integer => text
                .parse::<i64>()
                .map(Value::int)
                .map_err(|err| EvalError::syntax(err.to_string(), Span::new(0, text.len()))),
            TokenClass::Float => text
                .parse::<f64>()
                .map(Value::float)
                .map_err(|err| EvalError::syntax(err.to_string(), Span::new(0, text.len()))),
            TokenClass::MatrixLiteral => Self::matrix(&evaluator, text),
            TokenClass::Malformed if text.starts_with('[') || text.contains("**") => {
                Self::matrix(&evaluator, text)
            }
            TokenClass::Malformed => parse_expression(text).and_then(|expr| evaluator.eval(&expr)),
        };
        value.map_err(|err| err.shifted(fragment.offset))
    }

    fn matrix(evaluator: &Evaluator<'_>, text: &str) -> Result<Value> {
        let terms = parse_matrix_product(text)?;
        evaluator.eval_matrix_product(&terms).map(Value::Matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printed(engine: &mut Engine, line: &str) -> String {
        match engine.evaluate(line) {
            EngineOutput::Printed { text } => text,
            EngineOutput::Failed { error, .. } => panic!("{line:?} failed: {error}"),
        }
    }

    fn failed(engine: &mut Engine, line: &str) -> ErrorKind {
        engine
            .evaluate(line)
            .kind()
            .unwrap_or_else(|| panic!("{line:?} should fail"))
    }

    #[test]
    fn test_split_fragments_offsets() {
        let parts = split_fragments("a = b= 5");
        let texts: Vec<_> = parts.iter().map(|p| (p.text, p.offset)).collect();
        assert_eq!(texts, vec![("a", 0), ("b", 4), ("5", 7)]);
    }

    #[test]
    fn test_classify_statements() {
        assert!(matches!(classify_statement("variables"), Ok(Statement::VariablesDump)));
        assert!(matches!(classify_statement("2+2"), Ok(Statement::PlainQuery(_))));
        assert!(matches!(classify_statement("a = ?"), Ok(Statement::FunctionQuery(_))));
        assert!(matches!(classify_statement("f(x) = x"), Ok(Statement::FunctionDefine { .. })));
        assert!(matches!(classify_statement("a = b = 1"), Ok(Statement::ChainAssign { .. })));
        assert!(classify_statement("a = b = ?").is_err());
        assert!(classify_statement("").is_err());
    }

    #[test]
    fn test_plain_query() {
        let mut engine = Engine::new();
        assert_eq!(printed(&mut engine, "2 + 3 * 4"), "14");
        assert_eq!(printed(&mut engine, "1.5"), "1.5");
        assert_eq!(printed(&mut engine, "7"), "7");
    }

    #[test]
    fn test_line_is_case_insensitive() {
        let mut engine = Engine::new();
        printed(&mut engine, "VarA = 2");
        assert_eq!(printed(&mut engine, "vara"), "2");
        assert_eq!(printed(&mut engine, "VARA * 2"), "4");
    }

    #[test]
    fn test_chain_assign_validates_before_binding() {
        let mut engine = Engine::new();
        assert_eq!(failed(&mut engine, "a = 2b = 3"), ErrorKind::SyntaxError);
        assert!(engine.environment().is_empty());
        assert_eq!(failed(&mut engine, "a = i = 3"), ErrorKind::ReservedNameError);
        assert!(engine.environment().is_empty());
    }

    #[test]
    fn test_assign_copies_current_value() {
        let mut engine = Engine::new();
        printed(&mut engine, "a = 1");
        printed(&mut engine, "b = a");
        printed(&mut engine, "a = 2");
        assert_eq!(printed(&mut engine, "b"), "1");
    }

    #[test]
    fn test_function_define_prints_template() {
        let mut engine = Engine::new();
        printed(&mut engine, "k = 3");
        assert_eq!(printed(&mut engine, "f(x) = k*x + 2x"), "3 * x + 2 * x");
        assert_eq!(printed(&mut engine, "f(2)"), "10");
        assert_eq!(printed(&mut engine, "f"), "3 * x + 2 * x");
    }

    #[test]
    fn test_function_reserved_names() {
        let mut engine = Engine::new();
        assert_eq!(failed(&mut engine, "f(i) = i + 1"), ErrorKind::ReservedNameError);
        assert_eq!(failed(&mut engine, "i(x) = x"), ErrorKind::ReservedNameError);
        assert!(engine.environment().is_empty());
    }

    #[test]
    fn test_error_spans_point_into_line() {
        let mut engine = Engine::new();
        let output = engine.evaluate("y = 2 $ 3");
        assert_eq!(output.error().and_then(EvalError::span), Some(Span::new(6, 7)));
    }

    #[test]
    fn test_failures_are_numbered() {
        let mut engine = Engine::new();
        assert_eq!(engine.evaluate("*5").to_string(), "Error 0: syntax error: expression cannot start with '*'");
        printed(&mut engine, "1");
        assert!(engine.evaluate("5+").to_string().starts_with("Error 1: "));
        assert_eq!(engine.error_count(), 2);
    }

    #[test]
    fn test_json_shape() {
        let mut engine = Engine::new();
        let ok = serde_json::to_value(engine.evaluate("1+1")).unwrap();
        assert_eq!(ok, serde_json::json!({"status": "printed", "text": "2"}));
        let err = serde_json::to_value(engine.evaluate("1/0")).unwrap();
        assert_eq!(err["status"], "failed");
        assert_eq!(err["index"], 0);
    }
}
