use itertools::Itertools;
use scanner::{LiteralValue, Token};

use crate::{Expr, Visitor};

/// Renders an expression in fully parenthesized prefix form, e.g.
/// `(* (- 123) (group 45.67))`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> String {
        format!("({} {})", name, exprs.iter().map(|e| e.accept(self)).join(" "))
    }
}

impl Visitor for AstPrinter {
    type Output = String;

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> String {
        self.parenthesize(operator.lexeme(), &[left, right])
    }

    fn visit_grouping(&mut self, inner: &Expr) -> String {
        self.parenthesize("group", &[inner])
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> String {
        self.parenthesize(operator.lexeme(), &[right])
    }

    fn visit_literal(&mut self, value: &LiteralValue) -> String {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use errors::Line;
    use pretty_assertions::assert_eq;
    use scanner::TokenKind;

    use super::*;

    #[test]
    fn hand_built_tree() {
        let expr = Expr::binary(
            Expr::unary(
                Token::new(TokenKind::Minus, "-", None, Line(1)),
                Expr::Literal(LiteralValue::Number(123.0)),
            ),
            Token::new(TokenKind::Star, "*", None, Line(1)),
            Expr::grouping(Expr::Literal(LiteralValue::Number(45.67))),
        );

        assert_eq!(AstPrinter.print(&expr), "(* (- 123) (group 45.67))");
        assert_eq!(expr.to_string(), "(* (- 123) (group 45.67))");
    }

    #[test]
    fn literals() {
        assert_eq!(AstPrinter.print(&Expr::Literal(LiteralValue::Nil)), "nil");
        assert_eq!(AstPrinter.print(&Expr::Literal(LiteralValue::Boolean(false))), "false");
        assert_eq!(AstPrinter.print(&Expr::Literal(LiteralValue::Str("hi".to_string()))), "hi");
    }
}
