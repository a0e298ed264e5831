//! Rich error reporting with source spans.
//!
//! Every pipeline stage has its own error type. All of them derive
//! [`miette::Diagnostic`] so the driver can render the offending source
//! region with an underline. Errors carry spans only; the source text is
//! attached where the error is reported (`Report::with_source_code`), since
//! the parser and code generator never see the raw source.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::token::Token;

/// Rejections from the caller-side checks that run before lexing.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Input is empty.")]
    #[diagnostic(code(tacc::validate::empty))]
    Empty,

    #[error("Parentheses mismatch: too many ).")]
    #[diagnostic(code(tacc::validate::unbalanced))]
    TooManyClosing {
        #[label("no '(' left to close")]
        span: SourceSpan,
    },

    #[error("Parentheses mismatch: not balanced.")]
    #[diagnostic(code(tacc::validate::unbalanced), help("add the missing ')'"))]
    Unbalanced,

    #[error("Expression ends with an operator or invalid character.")]
    #[diagnostic(code(tacc::validate::trailing_operator))]
    TrailingOperator {
        #[label("operand expected after this")]
        span: SourceSpan,
    },

    #[error("Identifiers must not start with a digit.")]
    #[diagnostic(code(tacc::validate::digit_identifier))]
    DigitLeadingIdentifier {
        word: String,
        #[label("starts with a digit")]
        span: SourceSpan,
    },

    #[error("Invalid token or non-English identifier detected: \"{word}\"")]
    #[diagnostic(
        code(tacc::validate::invalid_word),
        help("identifiers are ASCII letters followed by letters or digits")
    )]
    InvalidWord {
        word: String,
        #[label("not a number, identifier or sqrt")]
        span: SourceSpan,
    },
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unknown token starting at: {rest}")]
    #[diagnostic(code(tacc::lex::unknown_token))]
    UnknownToken {
        rest: String,
        #[label("no token starts here")]
        span: SourceSpan,
    },

    #[error("Invalid radical degree '{digits}'")]
    #[diagnostic(
        code(tacc::lex::invalid_degree),
        help("the degree must be a positive integer, e.g. sqrt3(x)")
    )]
    InvalidDegree {
        digits: String,
        #[label("degree out of range")]
        span: SourceSpan,
    },

    #[error("Expected ( after function '{function}'")]
    #[diagnostic(code(tacc::lex::missing_paren))]
    MissingFunctionParen {
        function: String,
        #[label("function applied to nothing")]
        span: SourceSpan,
    },

    #[error("Unmatched parenthesis after function '{function}'")]
    #[diagnostic(code(tacc::lex::unmatched_paren))]
    UnmatchedFunctionParen {
        function: String,
        #[label("this '(' is never closed")]
        span: SourceSpan,
    },
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected end of input while parsing {expected}")]
    #[diagnostic(code(tacc::parse::unexpected_end))]
    UnexpectedEnd {
        expected: &'static str,
        #[label("input ends here")]
        span: SourceSpan,
    },

    #[error("Expected {expected}, found '{}'", .token.text)]
    #[diagnostic(code(tacc::parse::unexpected_token))]
    UnexpectedToken {
        expected: &'static str,
        token: Token,
        #[label("unexpected token")]
        span: SourceSpan,
    },
}

impl ParseError {
    pub fn unexpected(expected: &'static str, token: &Token) -> Self {
        ParseError::UnexpectedToken {
            expected,
            token: token.clone(),
            span: token.span.into(),
        }
    }

    /// The offending token, or `None` when input ran out.
    pub fn token(&self) -> Option<&Token> {
        match self {
            ParseError::UnexpectedEnd { .. } => None,
            ParseError::UnexpectedToken { token, .. } => Some(token),
        }
    }
}

/// Structural problems in a hand-built tree. The parser never produces these.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error("Malformed number literal '{text}'")]
    #[diagnostic(code(tacc::codegen::malformed_literal))]
    MalformedLiteral { text: String },

    #[error("{node} node has neither a name nor an alias")]
    #[diagnostic(code(tacc::codegen::unnamed))]
    Unnamed { node: &'static str },
}

/// Any failure of the full pipeline.
#[derive(Error, Debug, Diagnostic)]
pub enum CompileError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    /// Name of the stage that failed, for log lines.
    pub fn stage(&self) -> &'static str {
        match self {
            CompileError::Validation(_) => "validation",
            CompileError::Lex(_) => "lexing",
            CompileError::Parse(_) => "parsing",
            CompileError::Codegen(_) => "code generation",
        }
    }
}
