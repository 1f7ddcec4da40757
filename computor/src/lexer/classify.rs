//! Lexical classification of whole statement operands
//!
//! The dispatcher decides which evaluator handles an operand by looking at its
//! shape: a literal, a bare name, a matrix literal (or product of literals), or
//! anything else, which is handed to the expression evaluator.

use super::{tokenize, Token};

/// Shape of a trimmed operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Integer,
    Float,
    Identifier,
    MatrixLiteral,
    Malformed,
}

/// Classify a trimmed operand. Never fails.
pub fn classify(text: &str) -> TokenClass {
    if text.parse::<i64>().is_ok() {
        TokenClass::Integer
    } else if is_float(text) {
        TokenClass::Float
    } else if !text.is_empty() && text.bytes().all(|b| b.is_ascii_alphabetic()) {
        TokenClass::Identifier
    } else if is_matrix_literal(text) {
        TokenClass::MatrixLiteral
    } else {
        TokenClass::Malformed
    }
}

/// Optional sign, digits with exactly one radix point, at least one digit
fn is_float(text: &str) -> bool {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    let digits = body.bytes().filter(u8::is_ascii_digit).count();
    let points = body.bytes().filter(|&b| b == b'.').count();
    digits > 0 && points == 1 && digits + points == body.len() && body.parse::<f64>().is_ok()
}

/// `[[n,..];[n,..]]`, optionally chained with `**`.
///
/// Only the bracket structure is checked; equal row lengths are the matrix
/// constructor's job.
fn is_matrix_literal(text: &str) -> bool {
    let Ok(tokens) = tokenize(text) else {
        return false;
    };
    let tokens: Vec<Token> = tokens.into_iter().map(|(t, _)| t).collect();

    let mut pos = 0;
    loop {
        match literal_end(&tokens, pos) {
            Some(end) => pos = end,
            None => return false,
        }
        match tokens.get(pos) {
            None => return true,
            Some(Token::StarStar) => pos += 1,
            Some(_) => return false,
        }
    }
}

/// Index just past a bracketed literal starting at `pos`
fn literal_end(tokens: &[Token], mut pos: usize) -> Option<usize> {
    if tokens.get(pos) != Some(&Token::LBracket) {
        return None;
    }
    pos += 1;
    loop {
        pos = row_end(tokens, pos)?;
        match tokens.get(pos)? {
            Token::Semi => pos += 1,
            Token::RBracket => return Some(pos + 1),
            _ => return None,
        }
    }
}

fn row_end(tokens: &[Token], mut pos: usize) -> Option<usize> {
    if tokens.get(pos) != Some(&Token::LBracket) {
        return None;
    }
    pos += 1;
    loop {
        if tokens.get(pos) == Some(&Token::Minus) {
            pos += 1;
        }
        if !matches!(tokens.get(pos), Some(Token::IntLit(_))) {
            return None;
        }
        pos += 1;
        match tokens.get(pos)? {
            Token::Comma => pos += 1,
            Token::RBracket => return Some(pos + 1),
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_integers() {
        assert_eq!(classify("42"), TokenClass::Integer);
        assert_eq!(classify("-7"), TokenClass::Integer);
        assert_eq!(classify("+3"), TokenClass::Integer);
    }

    #[test]
    fn test_classify_floats() {
        assert_eq!(classify("4.0"), TokenClass::Float);
        assert_eq!(classify("-0.5"), TokenClass::Float);
        assert_eq!(classify(".5"), TokenClass::Float);
        assert_eq!(classify("1.2.3"), TokenClass::Malformed);
        assert_eq!(classify("inf"), TokenClass::Identifier);
        assert_eq!(classify("1e5"), TokenClass::Malformed);
    }

    #[test]
    fn test_classify_identifiers() {
        assert_eq!(classify("abc"), TokenClass::Identifier);
        assert_eq!(classify("i"), TokenClass::Identifier);
        assert_eq!(classify("x1"), TokenClass::Malformed);
        assert_eq!(classify(""), TokenClass::Malformed);
    }

    #[test]
    fn test_classify_matrix_literals() {
        assert_eq!(classify("[[1,2];[3,4]]"), TokenClass::MatrixLiteral);
        assert_eq!(classify("[[1]]"), TokenClass::MatrixLiteral);
        assert_eq!(classify("[[1, -2]; [3, 4]] ** [[1];[0]]"), TokenClass::MatrixLiteral);
        // ragged rows still have literal structure
        assert_eq!(classify("[[1,2];[3]]"), TokenClass::MatrixLiteral);
    }

    #[test]
    fn test_classify_malformed() {
        assert_eq!(classify("[[1,2];[3,4]"), TokenClass::Malformed);
        assert_eq!(classify("[[1,2],[3,4]]"), TokenClass::Malformed);
        assert_eq!(classify("[[1.5]]"), TokenClass::Malformed);
        assert_eq!(classify("[[1]] **"), TokenClass::Malformed);
        assert_eq!(classify("2+3"), TokenClass::Malformed);
        assert_eq!(classify("a ** b"), TokenClass::Malformed);
    }
}
