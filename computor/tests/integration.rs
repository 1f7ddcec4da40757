//! Integration tests for computor
//!
//! Drives the engine one line at a time, the way the REPL does, and checks:
//! - Arithmetic, precedence and the numeric tower
//! - Assignments, queries and the variable listing
//! - Functions and matrices
//! - Error kinds, numbering, and that failures leave state untouched

use computor::interp::Value;
use computor::{Engine, EngineOutput, ErrorKind};
use insta::assert_snapshot;

/// Helper to run lines through a fresh engine and return the last output
fn run(lines: &[&str]) -> EngineOutput {
    let mut engine = Engine::new();
    let mut last = None;
    for line in lines {
        last = Some(engine.evaluate(line));
    }
    last.expect("at least one line")
}

/// Helper to expect success and return the printed text
fn eval_ok(engine: &mut Engine, line: &str) -> String {
    match engine.evaluate(line) {
        EngineOutput::Printed { text } => text,
        EngineOutput::Failed { error, .. } => panic!("{line:?} failed: {error}"),
    }
}

/// Helper to expect failure and return its kind
fn eval_err(engine: &mut Engine, line: &str) -> ErrorKind {
    match engine.evaluate(line) {
        EngineOutput::Printed { text } => panic!("{line:?} should fail, printed {text:?}"),
        EngineOutput::Failed { error, .. } => error.kind(),
    }
}

/// Helper for one-line evaluations
fn eval(line: &str) -> String {
    eval_ok(&mut Engine::new(), line)
}

// ============================================
// Arithmetic
// ============================================

#[test]
fn test_precedence() {
    assert_eq!(eval("2+3*4"), "14");
    assert_eq!(eval("2^3+1"), "9");
    assert_eq!(eval("10%3"), "1");
    assert_eq!(eval("(2+3)*4"), "20");
    assert_eq!(eval("2^3^2"), "64");
}

#[test]
fn test_integer_and_float_results() {
    assert_eq!(eval("6/3"), "2");
    assert_eq!(eval("7/2"), "3.5");
    assert_eq!(eval("1.5*2"), "3.0");
    assert_eq!(eval("2^-1"), "0.5");
}

#[test]
fn test_modulo_is_floored() {
    assert_eq!(eval("-7%3"), "2");
    assert_eq!(eval("7%-3"), "-2");
}

#[test]
fn test_integer_overflow_promotes_to_float() {
    let text = eval("9223372036854775807+1");
    assert!(text.contains('e') || text.contains('.'), "{text}");
}

#[test]
fn test_long_sign_runs() {
    assert_eq!(eval(&format!("{}1", "-".repeat(100_000))), "1");
    assert_eq!(eval(&format!("3*{}x", "-".repeat(99_999))), "0");
    assert_eq!(eval(&format!("5{}2", "-".repeat(100_001))), "3");
}

#[test]
fn test_undefined_variable_reads_zero() {
    assert_eq!(eval("x+5"), "5");
}

// ============================================
// Complex numbers
// ============================================

#[test]
fn test_complex_results() {
    assert_eq!(eval("2+3i"), "2 + 3i");
    assert_eq!(eval("i*i"), "-1");
    assert_eq!(eval("2-i"), "2 - i");
    assert_eq!(eval("3i"), "3i");
    assert_eq!(eval("(1+i)*(1-i)"), "2");
}

#[test]
fn test_float_complex_results_stay_float() {
    assert_eq!(eval("1.0*i*i"), "-1.0");
    assert_eq!(eval("2.0i*i"), "-2.0");
    assert_eq!(eval("(1+i)*(1.0-i)"), "2.0");
    assert_eq!(eval("i*i*1.0"), "-1.0");
}

#[test]
fn test_negative_base_fractional_power_is_complex() {
    assert_eq!(eval("(-4)^0.5"), "2i");
}

#[test]
fn test_complex_variable() {
    let mut engine = Engine::new();
    assert_eq!(eval_ok(&mut engine, "z = 1 + 2i"), "1 + 2i");
    assert_eq!(eval_ok(&mut engine, "z * 2"), "2 + 4i");
}

// ============================================
// Assignment and queries
// ============================================

#[test]
fn test_chain_assignment() {
    let mut engine = Engine::new();
    assert_eq!(eval_ok(&mut engine, "a=b=5"), "5");
    assert_eq!(engine.environment().get("a"), Some(&Value::int(5)));
    assert_eq!(engine.environment().get("b"), Some(&Value::int(5)));
}

#[test]
fn test_assignment_from_expression() {
    let mut engine = Engine::new();
    eval_ok(&mut engine, "x = 3");
    assert_eq!(eval_ok(&mut engine, "y = x * 2 + 1"), "7");
    assert_eq!(eval_ok(&mut engine, "y = ?"), "7");
}

#[test]
fn test_queries_are_idempotent() {
    let mut engine = Engine::new();
    eval_ok(&mut engine, "a = 4");
    let before = engine.environment().len();
    assert_eq!(eval_ok(&mut engine, "a = ?"), "4");
    assert_eq!(eval_ok(&mut engine, "a"), "4");
    assert_eq!(eval_ok(&mut engine, "a = ?"), "4");
    assert_eq!(engine.environment().len(), before);
    assert_eq!(engine.error_count(), 0);
}

#[test]
fn test_variables_listing() {
    let mut engine = Engine::new();
    assert_eq!(eval_ok(&mut engine, "variables"), "");
    eval_ok(&mut engine, "b = 2.5");
    eval_ok(&mut engine, "a = 2 - 3i");
    eval_ok(&mut engine, "f(x) = b * x");
    eval_ok(&mut engine, "b = 1");
    assert_snapshot!(eval_ok(&mut engine, "variables"), @r"
    b-> 1
    a-> 2 - 3i
    f-> 2.5 * x
    ");
}

// ============================================
// Reserved imaginary unit
// ============================================

#[test]
fn test_imaginary_unit_is_reserved() {
    let mut engine = Engine::new();
    eval_ok(&mut engine, "x = 1");
    for line in ["i=3", "x=i", "i=?", "i"] {
        assert_eq!(eval_err(&mut engine, line), ErrorKind::ReservedNameError, "{line}");
    }
    assert_eq!(engine.environment().len(), 1);
    assert_eq!(engine.environment().get("x"), Some(&Value::int(1)));
}

// ============================================
// Functions
// ============================================

#[test]
fn test_function_calls_are_independent() {
    let mut engine = Engine::new();
    assert_eq!(eval_ok(&mut engine, "f(x)=x^2+1"), "x ^ 2 + 1");
    assert_eq!(eval_ok(&mut engine, "f(3)"), "10");
    assert_eq!(eval_ok(&mut engine, "f(4)"), "17");
    assert_eq!(eval_ok(&mut engine, "f(3)"), "10");
}

#[test]
fn test_function_binds_names_at_definition() {
    let mut engine = Engine::new();
    eval_ok(&mut engine, "a = 2");
    assert_eq!(eval_ok(&mut engine, "g(x) = a * x"), "2 * x");
    eval_ok(&mut engine, "a = 100");
    assert_eq!(eval_ok(&mut engine, "g(5)"), "10");
}

#[test]
fn test_function_argument_forms() {
    let mut engine = Engine::new();
    eval_ok(&mut engine, "f(x) = 3x + 1");
    eval_ok(&mut engine, "y = 2");
    assert_eq!(eval_ok(&mut engine, "f(y)"), "7");
    assert_eq!(eval_ok(&mut engine, "f(1+1)"), "7");
    assert_eq!(eval_ok(&mut engine, "f(f(0))"), "4");
    assert_eq!(eval_ok(&mut engine, "f(i)"), "1 + 3i");
}

#[test]
fn test_function_redefinition_builds_on_previous() {
    let mut engine = Engine::new();
    eval_ok(&mut engine, "f(x) = x + 1");
    eval_ok(&mut engine, "f(x) = f(x) * 2");
    assert_eq!(eval_ok(&mut engine, "f(1)"), "4");
}

#[test]
fn test_function_query_prints_template() {
    let mut engine = Engine::new();
    eval_ok(&mut engine, "h(t) = t / 2");
    assert_eq!(eval_ok(&mut engine, "h = ?"), "t / 2");
}

#[test]
fn test_undefined_function() {
    let mut engine = Engine::new();
    eval_ok(&mut engine, "square(x) = x * x");
    let output = engine.evaluate("sqare(3)");
    assert_eq!(output.kind(), Some(ErrorKind::UndefinedFunctionError));
    assert_eq!(
        output.to_string(),
        "Error 0: undefined function: sqare (did you mean `square`?)"
    );
}

// ============================================
// Matrices
// ============================================

#[test]
fn test_matrix_identity_product() {
    assert_eq!(
        eval("[[1,2];[3,4]] ** [[1,0];[0,1]]"),
        "[ 1 , 2 ]\n   [ 3 , 4 ]"
    );
}

#[test]
fn test_matrix_variables() {
    let mut engine = Engine::new();
    eval_ok(&mut engine, "m = [[1,2];[3,4]]");
    eval_ok(&mut engine, "v = [[1];[-1]]");
    assert_eq!(eval_ok(&mut engine, "m ** v"), "[ -1 ]\n   [ -1 ]");
    assert_eq!(eval_ok(&mut engine, "m ** m ** v"), "[ -3 ]\n   [ -7 ]");
}

#[test]
fn test_matrix_errors() {
    let mut engine = Engine::new();
    assert_eq!(eval_err(&mut engine, "[[1,2];[3]]"), ErrorKind::ValueError);
    assert_eq!(eval_err(&mut engine, "[[1,2]] ** [[1,2]]"), ErrorKind::ValueError);
    assert_eq!(eval_err(&mut engine, "[[1,2]"), ErrorKind::ValueError);
    eval_ok(&mut engine, "m = [[1]]");
    assert_eq!(eval_err(&mut engine, "m + 1"), ErrorKind::ValueError);
}

// ============================================
// Errors
// ============================================

#[test]
fn test_malformed_input_leaves_state_untouched() {
    let mut engine = Engine::new();
    eval_ok(&mut engine, "a = 1");
    for line in ["*5", "5+", "[[1,2];[3]]", "a = 2 +", "a = [[1,2];[3]]"] {
        assert!(engine.evaluate(line).is_failed(), "{line}");
    }
    assert_eq!(engine.environment().len(), 1);
    assert_eq!(engine.environment().get("a"), Some(&Value::int(1)));
}

#[test]
fn test_syntax_errors() {
    let mut engine = Engine::new();
    for line in ["*5", "5+", "2 $ 3", "(1+2", "1+2)", "a = = 1", "3 = 4", ""] {
        assert_eq!(eval_err(&mut engine, line), ErrorKind::SyntaxError, "{line:?}");
    }
}

#[test]
fn test_division_by_zero_is_internal() {
    assert_eq!(run(&["1/0"]).kind(), Some(ErrorKind::InternalError));
    assert_eq!(run(&["5%0"]).kind(), Some(ErrorKind::InternalError));
    assert_eq!(run(&["f(x) = 1/x", "f(0)"]).kind(), Some(ErrorKind::InternalError));
}

#[test]
fn test_errors_are_numbered_in_order() {
    let mut engine = Engine::new();
    let first = engine.evaluate("1/0");
    eval_ok(&mut engine, "1");
    let second = engine.evaluate("i = 2");
    assert!(first.to_string().starts_with("Error 0: internal error"));
    assert_eq!(
        second.to_string(),
        "Error 1: 'i' cannot be assigned or used as a variable name"
    );
    assert_eq!(engine.error_count(), 2);
}
