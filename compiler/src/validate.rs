//! Input checks that run before the lexer.
//!
//! These catch the common typing mistakes with friendlier messages than the
//! lexer or parser would give: empty input, unbalanced parentheses, a
//! dangling operator at the end, identifiers that start with a digit, and
//! words that are neither numbers, ASCII identifiers nor `sqrt`.
//!
//! A word is a maximal run of characters that are not whitespace, operators
//! or parentheses. Identifier words must be ASCII.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ValidationError;
use crate::token::Span;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\s()+\-*/^=]+").unwrap());
static DIGIT_LEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+[A-Za-z][A-Za-z0-9]*$").unwrap());
static RADICAL_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^sqrt[0-9]*$").unwrap());
static NUMBER_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").unwrap());
static IDENTIFIER_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").unwrap());

const DANGLING: &str = "+-*/^=(";

/// Reject input the compiler should never see. Checks run in a fixed order
/// and the first failure is reported.
pub fn validate_input(text: &str) -> Result<(), ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    check_parentheses(text)?;

    if let Some(last) = trimmed.chars().last().filter(|c| DANGLING.contains(*c)) {
        let leading = text.len() - text.trim_start().len();
        let offset = leading + trimmed.len() - last.len_utf8();
        return Err(ValidationError::TrailingOperator {
            span: Span::new(offset, offset + last.len_utf8()).into(),
        });
    }

    if let Some(found) = WORD.find_iter(text).find(|w| DIGIT_LEADING.is_match(w.as_str())) {
        return Err(ValidationError::DigitLeadingIdentifier {
            word: found.as_str().to_string(),
            span: Span::new(found.start(), found.end()).into(),
        });
    }

    for word in WORD.find_iter(text) {
        let w = word.as_str();
        if RADICAL_WORD.is_match(w) || NUMBER_WORD.is_match(w) || IDENTIFIER_WORD.is_match(w) {
            continue;
        }
        debug!("rejected word '{w}' at byte {}", word.start());
        return Err(ValidationError::InvalidWord {
            word: w.to_string(),
            span: Span::new(word.start(), word.end()).into(),
        });
    }

    Ok(())
}

fn check_parentheses(text: &str) -> Result<(), ValidationError> {
    let mut balance = 0i64;
    for (offset, c) in text.char_indices() {
        match c {
            '(' => balance += 1,
            ')' => balance -= 1,
            _ => continue,
        }
        if balance < 0 {
            return Err(ValidationError::TooManyClosing {
                span: Span::new(offset, offset + 1).into(),
            });
        }
    }
    if balance != 0 {
        return Err(ValidationError::Unbalanced);
    }
    Ok(())
}
