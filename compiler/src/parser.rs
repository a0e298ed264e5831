//! Parser — recursive descent from tokens to an AST.
//!
//! One function per precedence level, loosest first:
//!
//! ```text
//! program        := IDENT '=' expression | expression
//! expression     := additive
//! additive       := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := power (('*' | '/') power)*
//! power          := unary ('^' power)?
//! unary          := ('+' | '-') unary | primary
//! primary        := NUMBER | IDENT | FUNCTION '(' expression ')' | '(' expression ')'
//! ```
//!
//! `^` is right-associative through the right recursion in `power`; all
//! other binary operators fold to the left.
//!
//! The choice between an assignment and a bare expression is made by
//! peeking at the first two tokens, so a lone identifier is parsed as an
//! expression rather than a degenerate assignment.
//!
//! A radical application `sqrtN( E )` is rewritten on the spot into
//! `E ^ 1/N`; no function-call node exists in the tree.
//!
//! Parsing stops at the first error. Tokens left over after a complete
//! program are an error as well.

use log::{debug, trace};

use crate::ast::{BinOp, Node, UnaryOp};
use crate::errors::ParseError;
use crate::token::{Span, Token, TokenKind};

/// Parse a token sequence into a single program tree.
pub fn parse(tokens: &[Token]) -> Result<Node, ParseError> {
    let node = Parser::new(tokens).parse()?;
    debug!("parsed {node}");
    Ok(node)
}

pub struct Parser<'t> {
    tokens: &'t [Token],
    current: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parse a complete program and require that every token was consumed.
    pub fn parse(&mut self) -> Result<Node, ParseError> {
        let node = self.program()?;
        match self.peek() {
            Some(token) => Err(ParseError::unexpected("end of input", token)),
            None => Ok(node),
        }
    }

    // ── Top level ────────────────────────────────────────────────────

    fn program(&mut self) -> Result<Node, ParseError> {
        let is_assignment = matches!(
            (self.peek_at(0), self.peek_at(1)),
            (Some(target), Some(eq)) if target.is(TokenKind::Identifier) && eq.is(TokenKind::Assign)
        );
        if !is_assignment {
            return self.expression();
        }

        let target = self.advance_token().clone();
        self.advance_token(); // consume =
        trace!("assignment to '{}'", target.text);
        let value = self.expression()?;
        Ok(Node::assignment(target.text, target.alias, value))
    }

    // ── Expressions ──────────────────────────────────────────────────

    fn expression(&mut self) -> Result<Node, ParseError> {
        self.additive()
    }

    fn additive(&mut self) -> Result<Node, ParseError> {
        let mut node = self.multiplicative()?;
        while let Some(op) = self.match_binary(&[BinOp::Add, BinOp::Sub]) {
            let right = self.multiplicative()?;
            node = Node::binary(op, node, right);
        }
        Ok(node)
    }

    fn multiplicative(&mut self) -> Result<Node, ParseError> {
        let mut node = self.power()?;
        while let Some(op) = self.match_binary(&[BinOp::Mul, BinOp::Div]) {
            let right = self.power()?;
            node = Node::binary(op, node, right);
        }
        Ok(node)
    }

    fn power(&mut self) -> Result<Node, ParseError> {
        let base = self.unary()?;
        if self.match_binary(&[BinOp::Pow]).is_some() {
            let exponent = self.power()?;
            return Ok(Node::binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<Node, ParseError> {
        let op = self
            .peek()
            .filter(|t| t.is(TokenKind::Operator))
            .and_then(|t| UnaryOp::from_symbol(&t.text));
        match op {
            Some(op) => {
                self.advance_token();
                let operand = self.unary()?;
                Ok(Node::unary(op, operand))
            }
            None => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.end_of_input("a primary expression"));
        };

        match token.kind {
            TokenKind::Number => {
                let text = self.advance_token().text.clone();
                Ok(Node::number(text))
            }
            TokenKind::Identifier => {
                let token = self.advance_token();
                Ok(Node::identifier(token.text.clone(), token.alias.clone()))
            }
            TokenKind::Function => self.radical(),
            TokenKind::LParen => {
                self.advance_token();
                let node = self.expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(node)
            }
            TokenKind::Operator | TokenKind::RParen | TokenKind::Assign => {
                Err(ParseError::unexpected("a primary expression", token))
            }
        }
    }

    /// `FUNCTION '(' expression ')'`, rewritten to `expression ^ 1/degree`.
    fn radical(&mut self) -> Result<Node, ParseError> {
        let function = self.advance_token();
        let degree = function.degree.unwrap_or(2);
        self.expect(TokenKind::LParen, "'(' after function name")?;
        let operand = self.expression()?;
        self.expect(TokenKind::RParen, "')' after function argument")?;
        trace!("rewrote radical of degree {degree}");
        Ok(Node::radical(operand, degree))
    }

    // ── Token manipulation ───────────────────────────────────────────

    fn peek(&self) -> Option<&'t Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.current + offset)
    }

    /// Consume and return the current token. Callers peek first.
    fn advance_token(&mut self) -> &'t Token {
        let token = &self.tokens[self.current];
        self.current += 1;
        token
    }

    /// Consume an operator token if it spells one of `ops`.
    fn match_binary(&mut self, ops: &[BinOp]) -> Option<BinOp> {
        let op = self
            .peek()
            .filter(|t| t.is(TokenKind::Operator))
            .and_then(|t| BinOp::from_symbol(&t.text))
            .filter(|op| ops.contains(op))?;
        self.current += 1;
        Some(op)
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<(), ParseError> {
        match self.peek() {
            Some(token) if token.is(kind) => {
                self.current += 1;
                Ok(())
            }
            Some(token) => Err(ParseError::unexpected(expected, token)),
            None => Err(self.end_of_input(expected)),
        }
    }

    fn end_of_input(&self, expected: &'static str) -> ParseError {
        let span = self
            .tokens
            .last()
            .map_or(Span::new(0, 0), |t| t.span.end_point());
        ParseError::UnexpectedEnd {
            expected,
            span: span.into(),
        }
    }
}
