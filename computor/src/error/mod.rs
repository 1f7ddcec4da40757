//! Error types and reporting

use crate::ast::Span;
use crate::util::suggestion_hint;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, EvalError>;

/// Evaluation error
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum EvalError {
    /// Malformed token stream, illegal character, dangling operator, bad parenthesis
    #[error("syntax error: {message}")]
    Syntax { message: String, span: Option<Span> },

    /// Well-formed but semantically invalid input, e.g. a ragged matrix
    #[error("value error: {message}")]
    Value { message: String, span: Option<Span> },

    /// `i` used as a variable or parameter name
    #[error("'i' cannot be assigned or used as a variable name")]
    ReservedName { span: Option<Span> },

    #[error("undefined function: {name}{}", suggestion_hint(.suggestion))]
    UndefinedFunction {
        name: String,
        suggestion: Option<String>,
        span: Option<Span>,
    },

    /// Any other evaluation failure (division by zero, overflow, ...)
    #[error("internal error: {message}")]
    Internal { message: String, span: Option<Span> },
}

/// Error kind tag, as reported to callers of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    SyntaxError,
    ValueError,
    ReservedNameError,
    UndefinedFunctionError,
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::ValueError => "ValueError",
            ErrorKind::ReservedNameError => "ReservedNameError",
            ErrorKind::UndefinedFunctionError => "UndefinedFunctionError",
            ErrorKind::InternalError => "InternalError",
        };
        f.write_str(name)
    }
}

impl EvalError {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn value(message: impl Into<String>, span: Span) -> Self {
        Self::Value {
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn reserved_name(span: Span) -> Self {
        Self::ReservedName { span: Some(span) }
    }

    pub fn undefined_function(name: impl Into<String>, suggestion: Option<String>, span: Span) -> Self {
        Self::UndefinedFunction {
            name: name.into(),
            suggestion,
            span: Some(span),
        }
    }

    pub fn internal(message: impl Into<String>, span: Span) -> Self {
        Self::Internal {
            message: message.into(),
            span: Some(span),
        }
    }

    /// Internal error with no location, e.g. a panic caught at the engine boundary
    pub fn internal_unlocated(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            span: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax { .. } => ErrorKind::SyntaxError,
            Self::Value { .. } => ErrorKind::ValueError,
            Self::ReservedName { .. } => ErrorKind::ReservedNameError,
            Self::UndefinedFunction { .. } => ErrorKind::UndefinedFunctionError,
            Self::Internal { .. } => ErrorKind::InternalError,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Syntax { span, .. }
            | Self::Value { span, .. }
            | Self::ReservedName { span }
            | Self::UndefinedFunction { span, .. }
            | Self::Internal { span, .. } => *span,
        }
    }

    /// Replace the location, keeping kind and message.
    ///
    /// Errors raised inside a stored function body point into the definition
    /// line; the evaluator re-anchors them at the call site.
    pub fn with_span(mut self, new_span: Span) -> Self {
        match &mut self {
            Self::Syntax { span, .. }
            | Self::Value { span, .. }
            | Self::ReservedName { span }
            | Self::UndefinedFunction { span, .. }
            | Self::Internal { span, .. } => *span = Some(new_span),
        }
        self
    }

    /// Move the location right by `offset` bytes
    pub fn shifted(self, offset: usize) -> Self {
        match self.span() {
            Some(span) => self.with_span(span.shift(offset)),
            None => self,
        }
    }
}

/// Report error with ariadne
pub fn report_error(filename: &str, source: &str, error: &EvalError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = error.kind();
    let message = error.to_string();

    let result = if let Some(span) = error.span() {
        let range = std::ops::Range::from(span);
        Report::build(ReportKind::Error, (filename, range.clone()))
            .with_message(format!("{kind}"))
            .with_label(
                Label::new((filename, range))
                    .with_message(message)
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((filename, Source::from(source)))
    } else {
        Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind}: {message}"))
            .finish()
            .eprint((filename, Source::from(source)))
    };

    if let Err(err) = result {
        eprintln!("{filename}: {kind}: {error} (could not render report: {err})");
    }
}
