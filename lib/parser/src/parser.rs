mod expr;
mod printer;

use errors::{Location, Reporter, SlangError};
pub use expr::{Expr, Visitor};
pub use printer::AstPrinter;
pub use scanner::LiteralValue;
use scanner::{Token, TokenKind};

use TokenKind::*;

pub type Result<T> = std::result::Result<T, ParserError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct ParserError {
    error: ParserErrorType,
    token: Token,
}

impl ParserError {
    fn new(error: ParserErrorType, token: Token) -> Self {
        Self { error, token }
    }

    pub fn error(&self) -> ParserErrorType {
        self.error
    }

    pub fn token(&self) -> &Token {
        &self.token
    }
}

impl From<ParserError> for SlangError {
    fn from(error: ParserError) -> Self {
        let location = match error.token.kind {
            Eof => Location::AtEnd,
            _ => Location::At(error.token.lexeme.clone()),
        };
        SlangError::Syntax { line: error.token.line, location, message: error.error.to_string() }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ParserErrorType {
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Expect ')' after expression.")]
    MissingRightParen,
    #[error("Expression nests too deeply.")]
    TooDeeplyNested,
}

/// Tallest expression tree the parser builds, also bounding its own
/// recursion. Evaluating and dropping a tree both recurse once per level.
pub const MAX_DEPTH: usize = 128;

/// Recursive descent parser for a single expression.
///
/// ```text
/// expression → equality
/// equality   → comparison ( ( "!=" | "==" ) comparison )*
/// comparison → term ( ( ">" | ">=" | "<" | "<=" ) term )*
/// term       → factor ( ( "-" | "+" ) factor )*
/// factor     → unary ( ( "/" | "*" ) unary )*
/// unary      → ( "!" | "-" ) unary | primary
/// primary    → NUMBER | STRING | "true" | "false" | "nil" | "(" expression ")"
/// ```
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    /// Pending `unary`/`grouping` recursions.
    depth: usize,
    /// Height of the last expression built.
    height: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(Eof) {
            let line = tokens.last().map(|t| t.line).unwrap_or(errors::Line(1));
            tokens.push(Token::eof(line));
        }
        Self { tokens, current: 0, depth: 0, height: 0 }
    }

    /// Parses one expression. On a syntax error the error is reported and
    /// no tree is returned. Tokens after the expression are left unread.
    pub fn parse(mut self, reporter: &mut impl Reporter) -> Option<Expr> {
        match self.expression() {
            Ok(expr) => {
                log::debug!("parsed: {expr}");
                Some(expr)
            }
            Err(e) => {
                reporter.report(e.into());
                None
            }
        }
    }

    fn expression(&mut self) -> Result<Expr> {
        self.equality()
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut expr = self.comparison()?;

        while self.match_any(&[BangEqual, EqualEqual]) {
            let operator = self.previous().clone();
            let left_height = self.height;
            let right = self.comparison()?;
            expr = self.grow(Expr::binary(expr, operator, right), left_height.max(self.height))?;
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr = self.term()?;

        while self.match_any(&[Greater, GreaterEqual, Less, LessEqual]) {
            let operator = self.previous().clone();
            let left_height = self.height;
            let right = self.term()?;
            expr = self.grow(Expr::binary(expr, operator, right), left_height.max(self.height))?;
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut expr = self.factor()?;

        while self.match_any(&[Minus, Plus]) {
            let operator = self.previous().clone();
            let left_height = self.height;
            let right = self.factor()?;
            expr = self.grow(Expr::binary(expr, operator, right), left_height.max(self.height))?;
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;

        while self.match_any(&[Slash, Star]) {
            let operator = self.previous().clone();
            let left_height = self.height;
            let right = self.unary()?;
            expr = self.grow(Expr::binary(expr, operator, right), left_height.max(self.height))?;
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.match_any(&[Bang, Minus]) {
            let operator = self.previous().clone();
            self.descend()?;
            let right = self.unary()?;
            self.depth -= 1;
            return self.grow(Expr::unary(operator, right), self.height);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.match_any(&[LeftParen]) {
            self.descend()?;
            let expr = self.expression()?;
            self.depth -= 1;
            self.consume(RightParen, ParserErrorType::MissingRightParen)?;
            return self.grow(Expr::grouping(expr), self.height);
        }

        let value = match (self.peek().kind, self.peek().literal()) {
            (False, _) => LiteralValue::Boolean(false),
            (True, _) => LiteralValue::Boolean(true),
            (Nil, _) => LiteralValue::Nil,
            (Number | Str, Some(literal)) => literal.clone(),
            _ => return Err(self.error(ParserErrorType::ExpectedExpression)),
        };

        self.advance();
        self.height = 1;
        Ok(Expr::Literal(value))
    }

    /// Skips ahead to the next likely statement boundary after a syntax
    /// error. `parse` stops at the first error, so nothing calls this yet.
    pub fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == Semicolon {
                return;
            }

            if let Class | Fun | Var | For | If | While | Print | Return = self.peek().kind {
                return;
            }

            self.advance();
        }
    }
}

// Helpers
impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_any(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|&kind| self.check(kind)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, error: ParserErrorType) -> Result<&Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(error))
        }
    }

    /// Enters one more nested `unary` or `grouping`, failing past [`MAX_DEPTH`].
    fn descend(&mut self) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(ParserErrorType::TooDeeplyNested));
        }
        self.depth += 1;
        Ok(())
    }

    /// Records the height of a node whose tallest child is `child_height`
    /// high, failing once the tree is taller than [`MAX_DEPTH`].
    fn grow(&mut self, expr: Expr, child_height: usize) -> Result<Expr> {
        self.height = child_height + 1;
        if self.height > MAX_DEPTH {
            return Err(self.error(ParserErrorType::TooDeeplyNested));
        }
        Ok(expr)
    }

    fn error(&self, error: ParserErrorType) -> ParserError {
        ParserError::new(error, self.peek().clone())
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == Eof
    }
}
