//! Lexer implementation using logos

mod classify;
mod token;

pub use classify::{classify, TokenClass};
pub use token::Token;

use crate::ast::Span;
use crate::error::{EvalError, Result};
use logos::Logos;

/// Tokenize one statement fragment
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(_) => {
                let slice = lexer.slice();
                let message = if slice.bytes().all(|b| b.is_ascii_digit()) {
                    format!("integer literal out of range: {slice}")
                } else {
                    format!("unexpected character: {slice:?}")
                };
                return Err(EvalError::syntax(message, span));
            }
        }
    }

    Ok(tokens)
}
