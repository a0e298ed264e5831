//! Lexer — tokenizes an assignment-or-expression source string.
//!
//! Scanning is greedy and tries the token classes in a fixed order at every
//! position: whitespace, number, radical function, identifier, operator,
//! parentheses, `=`. The first class that matches wins, so `sqrt3(x)` is a
//! function applied to `x` while `sqrt3x` is a plain identifier.
//!
//! Two passes follow the scan:
//!
//! - **Aliasing**: every distinct identifier gets a canonical name `id1`,
//!   `id2`, ... in order of first appearance. Repeated uses share the alias.
//! - **Transformed echo**: a display string in which identifiers are replaced
//!   by their aliases and every `sqrtN( E )` is spelled `( E ) ^ 1/N`, the
//!   same rewrite the parser performs on the tree.

use indexmap::IndexMap;
use log::{debug, trace};
use serde::Serialize;

use crate::errors::LexError;
use crate::token::{Span, Token, TokenKind};

const RADICAL: &str = "sqrt";
const DEFAULT_DEGREE: u64 = 2;

/// Identifier name to alias, in first-appearance order.
pub type AliasMap = IndexMap<String, String>;

/// Everything the lexing stage hands to later stages and to the display.
#[derive(Debug, Clone, Serialize)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub transformed: String,
    pub aliases: AliasMap,
}

/// Tokenize `source`, assign identifier aliases and build the transformed echo.
pub fn tokenize(source: &str) -> Result<Lexed, LexError> {
    let mut tokens = Lexer::new(source).scan_tokens()?;
    let aliases = assign_aliases(&mut tokens);
    let transformed = transform(&tokens, 0, tokens.len())?.join(" ");
    debug!(
        "lexed {} tokens, {} distinct identifiers",
        tokens.len(),
        aliases.len()
    );
    Ok(Lexed {
        tokens,
        transformed,
        aliases,
    })
}

pub struct Lexer<'src> {
    source: &'src str,
    chars: Vec<char>,
    start: usize,    // Start of current token (byte offset)
    current: usize,  // Current position (char index)
    byte_pos: usize, // Current byte position
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            start: 0,
            current: 0,
            byte_pos: 0,
            tokens: Vec::new(),
        }
    }

    /// Scan the whole source. Stops at the first position no token matches.
    pub fn scan_tokens(mut self) -> Result<Vec<Token>, LexError> {
        while !self.is_at_end() {
            self.start = self.byte_pos;
            self.scan_token()?;
        }
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), LexError> {
        let c = self.peek();

        if c.is_whitespace() {
            while !self.is_at_end() && self.peek().is_whitespace() {
                self.advance();
            }
            return Ok(());
        }

        if c.is_ascii_digit() {
            self.number();
            return Ok(());
        }

        if self.radical()? {
            return Ok(());
        }

        if c.is_ascii_alphabetic() {
            self.identifier();
            return Ok(());
        }

        let kind = match c {
            '+' | '-' | '*' | '/' | '^' => TokenKind::Operator,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '=' => TokenKind::Assign,
            _ => {
                return Err(LexError::UnknownToken {
                    rest: self.source[self.start..].to_string(),
                    span: Span::new(self.start, self.start + c.len_utf8()).into(),
                })
            }
        };
        self.advance();
        self.add_token(kind);
        Ok(())
    }

    // ── Token scanners ───────────────────────────────────────────────

    /// `digits ( '.' digits )?`; a dot without a digit after it is left alone.
    fn number(&mut self) {
        self.skip_digits();
        if self.peek() == '.' && self.peek_at(1).is_ascii_digit() {
            self.advance(); // consume .
            self.skip_digits();
        }
        self.add_token(TokenKind::Number);
    }

    /// `sqrt` plus optional degree digits, ending on a word boundary.
    ///
    /// Returns `Ok(false)` without consuming anything when the text here is
    /// not a radical, so the identifier scanner can take it instead.
    fn radical(&mut self) -> Result<bool, LexError> {
        if !self.source[self.start..].starts_with(RADICAL) {
            return Ok(false);
        }

        let digits = self.chars[self.current + RADICAL.len()..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        let after = self.peek_at(RADICAL.len() + digits);
        if is_word_char(after) {
            return Ok(false);
        }

        for _ in 0..RADICAL.len() + digits {
            self.advance();
        }
        let text = &self.source[self.start..self.byte_pos];
        let span = Span::new(self.start, self.byte_pos);
        let degree_text = &text[RADICAL.len()..];
        let degree = if degree_text.is_empty() {
            DEFAULT_DEGREE
        } else {
            match degree_text.parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(LexError::InvalidDegree {
                        digits: degree_text.to_string(),
                        span: Span::new(self.start + RADICAL.len(), self.byte_pos).into(),
                    })
                }
            }
        };

        trace!("radical '{text}' with degree {degree}");
        self.tokens.push(Token::function(text, degree, span));
        Ok(true)
    }

    /// `letter (letter | digit)*`, ASCII only.
    fn identifier(&mut self) {
        while !self.is_at_end() && self.peek().is_ascii_alphanumeric() {
            self.advance();
        }
        self.add_token(TokenKind::Identifier);
    }

    // ── Character-level helpers ──────────────────────────────────────

    fn skip_digits(&mut self) {
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            self.advance();
        }
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        self.byte_pos += c.len_utf8();
        c
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.chars.get(self.current + offset).copied().unwrap_or('\0')
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn add_token(&mut self, kind: TokenKind) {
        let span = Span::new(self.start, self.byte_pos);
        let token = Token::new(kind, &self.source[self.start..self.byte_pos], span);
        trace!("token {token}");
        self.tokens.push(token);
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Give every identifier token its alias and return the alias map.
fn assign_aliases(tokens: &mut [Token]) -> AliasMap {
    let mut aliases = AliasMap::new();
    for token in tokens.iter_mut().filter(|t| t.is(TokenKind::Identifier)) {
        let next = aliases.len() + 1;
        let alias = aliases
            .entry(token.text.clone())
            .or_insert_with(|| format!("id{next}"));
        token.alias = Some(alias.clone());
    }
    aliases
}

/// Echo `tokens[start..end]` with aliases substituted and radicals expanded.
fn transform(tokens: &[Token], start: usize, end: usize) -> Result<Vec<String>, LexError> {
    let mut parts = Vec::new();
    let mut i = start;
    while i < end {
        let token = &tokens[i];
        match token.kind {
            TokenKind::Function => {
                let close = matching_paren(tokens, i, end)?;
                let inner = transform(tokens, i + 2, close)?;
                let degree = token.degree.unwrap_or(DEFAULT_DEGREE);
                let op = token.rewrite_operator().map_or("^", |op| op.symbol());
                parts.push(format!("({})", inner.join(" ")));
                parts.push(op.to_string());
                parts.push(format!("1/{degree}"));
                i = close + 1;
                continue;
            }
            TokenKind::Identifier => {
                parts.push(token.alias.clone().unwrap_or_else(|| token.text.clone()));
            }
            _ => parts.push(token.text.clone()),
        }
        i += 1;
    }
    Ok(parts)
}

/// Index of the `)` closing the group that opens right after `tokens[function]`.
fn matching_paren(tokens: &[Token], function: usize, end: usize) -> Result<usize, LexError> {
    let name = &tokens[function];
    let open = function + 1;
    if !tokens.get(open).is_some_and(|t| open < end && t.is(TokenKind::LParen)) {
        return Err(LexError::MissingFunctionParen {
            function: name.text.clone(),
            span: name.span.into(),
        });
    }

    let mut depth = 0usize;
    for (j, token) in tokens.iter().enumerate().take(end).skip(open) {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Ok(j);
                }
            }
            _ => {}
        }
    }

    Err(LexError::UnmatchedFunctionParen {
        function: name.text.clone(),
        span: tokens[open].span.into(),
    })
}
