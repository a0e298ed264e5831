//! Token types for the expression language.
//!
//! Each token carries its kind, the raw text it was scanned from, and a span
//! indicating its position in the source. Identifier tokens additionally carry
//! the canonical alias (`id1`, `id2`, ...) assigned after scanning, and
//! function tokens carry their radical degree.

use std::fmt;

use miette::SourceSpan;
use serde::Serialize;

use crate::ast::BinOp;

/// Byte offset range in the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span right after this one.
    pub fn end_point(self) -> Span {
        Span::new(self.end, self.end)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

/// Lexical categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Identifier,
    Number,
    Operator,
    LParen,
    RParen,
    Assign,
    /// Radical function: `sqrt` with an optional degree suffix.
    Function,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::Operator => "operator",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Assign => "'='",
            TokenKind::Function => "function",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    /// Canonical identifier name, filled in by the alias pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Radical degree of a `Function` token (2 for a bare `sqrt`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<u64>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            alias: None,
            degree: None,
        }
    }

    pub fn function(text: impl Into<String>, degree: u64, span: Span) -> Self {
        Self {
            degree: Some(degree),
            ..Self::new(TokenKind::Function, text, span)
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// The operator a function application is rewritten into.
    pub fn rewrite_operator(&self) -> Option<BinOp> {
        match self.kind {
            TokenKind::Function => Some(BinOp::Pow),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{:<10} {} ({})", self.kind, self.text, alias),
            None => match self.degree {
                Some(degree) => write!(f, "{:<10} {} (degree {})", self.kind, self.text, degree),
                None => write!(f, "{:<10} {}", self.kind, self.text),
            },
        }
    }
}
