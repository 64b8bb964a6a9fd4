//! Recursive-descent parser producing the expression tree.
//!
//! Precedence, lowest first:
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/' | '%') unary | <implicit> unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('^' unary)?
//! primary := number | name | name '(' args ')' | '(' sum ')' | '|' sum '|'
//! ```

use super::eval::{BinOp, Func1, Func2, Node};
use super::lexer::{Token, TokenKind};
use crate::error::{ParseError, ParseErrorKind};
use std::f64::consts::{E, PI, TAU};

/// Deepest tree, and deepest chain of nested sub-expressions, accepted.
///
/// Parsing and evaluation both recurse, so this bounds their stack use.
pub(crate) const MAX_DEPTH: usize = 256;

/// A parsed sub-expression and the height of its tree.
struct Branch {
    node: Node,
    depth: usize,
}

impl Branch {
    const fn leaf(node: Node) -> Self {
        Self { node, depth: 1 }
    }
}

pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    nesting: usize,
}

impl<'a> Parser<'a> {
    pub(crate) const fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            nesting: 0,
        }
    }

    /// Parse the whole token stream as one expression.
    pub(crate) fn parse(mut self) -> Result<Node, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::new(ParseErrorKind::Empty, 0));
        }
        let branch = self.parse_sum()?;
        match self.peek() {
            None => Ok(branch.node),
            Some(token) => Err(self.unexpected(token)),
        }
    }

    /// Byte offset of the next token, or the end of the source.
    fn offset(&self) -> usize {
        self.peek().map_or(self.source.len(), |t| t.start)
    }

    fn too_deep(at: usize) -> ParseError {
        ParseError::new(ParseErrorKind::TooDeep(MAX_DEPTH), at)
    }

    /// Wrap `children` under a new node, rejecting trees taller than
    /// [`MAX_DEPTH`].
    fn grow<const N: usize>(
        children: [Branch; N],
        at: usize,
        build: impl FnOnce([Box<Node>; N]) -> Node,
    ) -> Result<Branch, ParseError> {
        let depth = children.iter().map(|c| c.depth).max().unwrap_or(0) + 1;
        if depth > MAX_DEPTH {
            return Err(Self::too_deep(at));
        }
        Ok(Branch {
            node: build(children.map(|c| Box::new(c.node))),
            depth,
        })
    }

    fn binary(op: BinOp, lhs: Branch, rhs: Branch, at: usize) -> Result<Branch, ParseError> {
        Self::grow([lhs, rhs], at, |[a, b]| Node::Binary(op, a, b))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, token: &Token) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken(self.source[token.start..token.end].to_string()),
            token.start,
        )
    }

    fn end_of_input(&self) -> ParseError {
        ParseError::new(ParseErrorKind::UnexpectedEnd, self.source.len())
    }

    fn parse_sum(&mut self) -> Result<Branch, ParseError> {
        let mut lhs = self.parse_product()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            let at = self.offset();
            self.advance();
            let rhs = self.parse_product()?;
            lhs = Self::binary(op, lhs, rhs, at)?;
        }
    }

    fn parse_product(&mut self) -> Result<Branch, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let at = self.offset();
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                Some(TokenKind::Percent) => BinOp::Rem,
                // `2x`, `3sin(x)`, `(x+1)(x-1)`
                Some(TokenKind::Number(_) | TokenKind::Ident(_) | TokenKind::LParen) => {
                    let rhs = self.parse_unary()?;
                    lhs = Self::binary(BinOp::Mul, lhs, rhs, at)?;
                    continue;
                }
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Self::binary(op, lhs, rhs, at)?;
        }
    }

    /// Every recursive path passes through here, so this is where nesting
    /// is counted.
    fn parse_unary(&mut self) -> Result<Branch, ParseError> {
        if self.nesting >= MAX_DEPTH {
            return Err(Self::too_deep(self.offset()));
        }
        self.nesting += 1;
        let result = self.parse_signed();
        self.nesting -= 1;
        result
    }

    fn parse_signed(&mut self) -> Result<Branch, ParseError> {
        let at = self.offset();
        match self.peek_kind() {
            Some(TokenKind::Minus) => {
                self.advance();
                let operand = self.parse_unary()?;
                Self::grow([operand], at, |[a]| Node::Neg(a))
            }
            Some(TokenKind::Plus) => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Branch, ParseError> {
        let base = self.parse_primary()?;
        if self.peek_kind() == Some(&TokenKind::Caret) {
            let at = self.offset();
            self.advance();
            // Right-associative, and the exponent may carry its own sign.
            let exponent = self.parse_unary()?;
            return Self::binary(BinOp::Pow, base, exponent, at);
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Branch, ParseError> {
        let Some(token) = self.advance() else {
            return Err(self.end_of_input());
        };
        match token.kind {
            TokenKind::Number(value) => Ok(Branch::leaf(Node::Number(value))),
            TokenKind::LParen => {
                let inner = self.parse_sum()?;
                self.expect_close(TokenKind::RParen, '(', token.start)?;
                Ok(inner)
            }
            TokenKind::Pipe => {
                let inner = self.parse_sum()?;
                self.expect_close(TokenKind::Pipe, '|', token.start)?;
                Self::grow([inner], token.start, |[a]| Node::Call1(Func1::Abs, a))
            }
            TokenKind::Ident(ref name) => self.parse_name(name, &token),
            _ => Err(self.unexpected(&token)),
        }
    }

    fn expect_close(
        &mut self,
        close: TokenKind,
        open: char,
        open_at: usize,
    ) -> Result<(), ParseError> {
        match self.peek() {
            Some(token) if token.kind == close => {}
            Some(token) => return Err(self.unexpected(token)),
            None => return Err(ParseError::new(ParseErrorKind::Unbalanced(open), open_at)),
        }
        self.advance();
        Ok(())
    }

    fn parse_name(&mut self, name: &str, token: &Token) -> Result<Branch, ParseError> {
        let constant = match name {
            "x" => Some(Node::X),
            "pi" | "π" => Some(Node::Number(PI)),
            "e" => Some(Node::Number(E)),
            "tau" | "τ" => Some(Node::Number(TAU)),
            _ => None,
        };
        if let Some(node) = constant {
            return Ok(Branch::leaf(node));
        }

        let callee = if let Some(func) = Func1::lookup(name) {
            Callee::Unary(func)
        } else if let Some(func) = Func2::lookup(name) {
            Callee::Binary(func)
        } else {
            return Err(ParseError::new(
                ParseErrorKind::UnknownIdentifier(name.to_string()),
                token.start,
            ));
        };

        let args = self.parse_arguments(name, token)?;
        let arity_error = |found| {
            ParseError::new(
                ParseErrorKind::Arity {
                    name: name.to_string(),
                    expected: callee.arity(),
                    found,
                },
                token.start,
            )
        };
        let found = args.len();
        let mut args = args.into_iter();
        match (callee, args.next(), args.next(), args.next()) {
            (Callee::Unary(func), Some(a), None, None) => {
                Self::grow([a], token.start, |[a]| Node::Call1(func, a))
            }
            (Callee::Binary(func), Some(a), Some(b), None) => {
                Self::grow([a, b], token.start, |[a, b]| Node::Call2(func, a, b))
            }
            _ => Err(arity_error(found)),
        }
    }

    fn parse_arguments(&mut self, name: &str, token: &Token) -> Result<Vec<Branch>, ParseError> {
        let open_at = match self.peek() {
            Some(t) if t.kind == TokenKind::LParen => t.start,
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::MissingArguments(name.to_string()),
                    token.start,
                ))
            }
        };
        self.advance();

        let mut args = Vec::new();
        if self.peek_kind() == Some(&TokenKind::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_sum()?);
            let done = match self.peek() {
                Some(t) if t.kind == TokenKind::Comma => false,
                Some(t) if t.kind == TokenKind::RParen => true,
                Some(t) => return Err(self.unexpected(t)),
                None => return Err(ParseError::new(ParseErrorKind::Unbalanced('('), open_at)),
            };
            self.advance();
            if done {
                return Ok(args);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Callee {
    Unary(Func1),
    Binary(Func2),
}

impl Callee {
    const fn arity(self) -> usize {
        match self {
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
        }
    }
}
