use std::io::{self, Write};

use errors::{Reporter, SlangError};
use parser::{Expr, LiteralValue, Parser, Visitor};
use scanner::{Scanner, Token, TokenKind};

mod value;
pub use value::Value;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("Operand must be number")]
    OperandMustBeNumber,
    #[error("Operands must be number")]
    OperandsMustBeNumbers,
    #[error("Operands must be two numbers or two strings")]
    OperandsMustBeNumbersOrStrings,
}

/// A type error, tied to the operator that caused it.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub operator: Token,
}

impl RuntimeError {
    fn new(kind: RuntimeErrorKind, operator: &Token) -> Self {
        Self { kind, operator: operator.clone() }
    }
}

impl From<RuntimeError> for SlangError {
    fn from(error: RuntimeError) -> Self {
        SlangError::Runtime { line: error.operator.line, message: error.kind.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    /// Scans, parses and evaluates `source`. Errors of every stage end up in
    /// `reporter`; nothing is evaluated if scanning or parsing failed.
    pub fn run_source(
        &mut self,
        source: &str,
        output: &mut impl Write,
        reporter: &mut impl Reporter,
    ) -> io::Result<()> {
        let tokens = Scanner::new(source).scan_tokens(reporter);
        let expr = Parser::new(tokens).parse(reporter);

        match expr {
            Some(expr) if !reporter.had_error() => self.interpret(&expr, output, reporter),
            _ => Ok(()),
        }
    }

    /// Evaluates `expr` and writes the result to `output`. A runtime error is
    /// reported instead and goes no further; only writing can fail.
    pub fn interpret(
        &mut self,
        expr: &Expr,
        output: &mut impl Write,
        reporter: &mut impl Reporter,
    ) -> io::Result<()> {
        match self.evaluate(expr) {
            Ok(value) => writeln!(output, "{value}"),
            Err(e) => {
                reporter.report(e.into());
                Ok(())
            }
        }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        let value = expr.accept(self);
        log::trace!("{expr} => {value:?}");
        value
    }
}

impl Visitor for Interpreter {
    type Output = Result<Value>;

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        use RuntimeErrorKind::*;
        use TokenKind::*;

        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;
        match (&left, &right, operator.kind) {
            (_, _, EqualEqual) => Ok(left.eq_in_lox(&right).into()),
            (_, _, BangEqual) => Ok((!left.eq_in_lox(&right)).into()),

            (Value::Number(l), Value::Number(r), Plus) => Ok((l + r).into()),
            (Value::Str(l), Value::Str(r), Plus) => Ok(format!("{l}{r}").into()),
            (_, _, Plus) => Err(RuntimeError::new(OperandsMustBeNumbersOrStrings, operator)),

            (Value::Number(l), Value::Number(r), Minus) => Ok((l - r).into()),
            (Value::Number(l), Value::Number(r), Slash) => Ok((l / r).into()),
            (Value::Number(l), Value::Number(r), Star) => Ok((l * r).into()),

            (Value::Number(l), Value::Number(r), Greater) => Ok((l > r).into()),
            (Value::Number(l), Value::Number(r), GreaterEqual) => Ok((l >= r).into()),
            (Value::Number(l), Value::Number(r), Less) => Ok((l < r).into()),
            (Value::Number(l), Value::Number(r), LessEqual) => Ok((l <= r).into()),

            (_, _, Minus | Slash | Star | Greater | GreaterEqual | Less | LessEqual) => {
                Err(RuntimeError::new(OperandsMustBeNumbers, operator))
            }

            (_, _, kind) => unreachable!("{kind} is not a binary operator"),
        }
    }

    fn visit_grouping(&mut self, inner: &Expr) -> Result<Value> {
        self.evaluate(inner)
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let right = self.evaluate(right)?;
        match (operator.kind, right) {
            (TokenKind::Minus, Value::Number(n)) => Ok((-n).into()),
            (TokenKind::Minus, _) => {
                Err(RuntimeError::new(RuntimeErrorKind::OperandMustBeNumber, operator))
            }
            (TokenKind::Bang, v) => Ok((!v.is_truthy()).into()),
            (kind, _) => unreachable!("{kind} is not a unary operator"),
        }
    }

    fn visit_literal(&mut self, value: &LiteralValue) -> Result<Value> {
        Ok(value.into())
    }
}
