//! Recursive-descent parser for the supported SELECT subset.
//!
//! Grammar (informal):
//! ```text
//! select_stmt := SELECT [DISTINCT] proj_list FROM table_list
//!                [WHERE condition] [GROUP BY col_list] [ORDER BY order_list]
//! proj_list   := '*' | select_item (',' select_item)*
//! select_item := SUM '(' expr ')' | qualified_ident
//! condition   := and_expr
//! and_expr    := comparison (AND comparison)*
//! comparison  := arith (cmp_op arith)?
//! arith       := term ('+' term)*
//! term        := factor ('*' factor)*
//! factor      := number | qualified_ident | '(' condition ')'
//! ```

use super::ast::{OrderByItem, OrderTarget, SelectItem, SelectStatement};
use super::lexer::{tokenize, Token};
use crate::error::{EngineError, EngineResult};
use crate::expr::{ArithOp, CompareOp, Expr};

/// Parse a single SELECT statement.
pub fn parse_select(input: &str) -> EngineResult<SelectStatement> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
    };
    let stmt = parser.parse_select_statement()?;
    parser.expect(&Token::Eof)?;
    Ok(stmt)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> EngineResult<()> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(EngineError::Parse(format!(
                "expected {expected:?}, found {:?}",
                self.peek()
            )))
        }
    }

    fn keyword_is(&self, word: &str) -> bool {
        matches!(self.peek(), Token::Ident(s) if s.eq_ignore_ascii_case(word))
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if self.keyword_is(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, word: &str) -> EngineResult<()> {
        if self.eat_keyword(word) {
            Ok(())
        } else {
            Err(EngineError::Parse(format!(
                "expected keyword '{word}', found {:?}",
                self.peek()
            )))
        }
    }

    fn ident(&mut self) -> EngineResult<String> {
        match self.advance() {
            Token::Ident(s) => Ok(s),
            other => Err(EngineError::Parse(format!(
                "expected an identifier, found {other:?}"
            ))),
        }
    }

    /// `T.C`, or a bare `C` / `T` resolved later by the planner.
    fn qualified_ident(&mut self) -> EngineResult<String> {
        let first = self.ident()?;
        if matches!(self.peek(), Token::Dot) {
            self.advance();
            let second = self.ident()?;
            Ok(format!("{first}.{second}"))
        } else {
            Ok(first)
        }
    }

    fn parse_select_statement(&mut self) -> EngineResult<SelectStatement> {
        self.expect_keyword("SELECT")?;
        let distinct = self.eat_keyword("DISTINCT");
        let items = self.parse_select_list()?;
        self.expect_keyword("FROM")?;
        let from = self.parse_table_list()?;

        let where_clause = if self.eat_keyword("WHERE") {
            Some(self.parse_condition()?)
        } else {
            None
        };

        let group_by = if self.eat_keyword("GROUP") {
            self.expect_keyword("BY")?;
            self.parse_ident_list()?
        } else {
            Vec::new()
        };

        let order_by = if self.eat_keyword("ORDER") {
            self.expect_keyword("BY")?;
            self.parse_order_list()?
        } else {
            Vec::new()
        };

        Ok(SelectStatement {
            distinct,
            items,
            from,
            where_clause,
            group_by,
            order_by,
        })
    }

    fn parse_select_list(&mut self) -> EngineResult<Vec<SelectItem>> {
        if matches!(self.peek(), Token::Star) {
            self.advance();
            return Ok(vec![SelectItem::Star]);
        }

        let mut items = vec![self.parse_select_item()?];
        while matches!(self.peek(), Token::Comma) {
            self.advance();
            items.push(self.parse_select_item()?);
        }
        Ok(items)
    }

    fn parse_select_item(&mut self) -> EngineResult<SelectItem> {
        if self.keyword_is("SUM") {
            self.advance();
            self.expect(&Token::LParen)?;
            let inner = self.parse_arith()?;
            self.expect(&Token::RParen)?;
            return Ok(SelectItem::Sum(inner));
        }
        Ok(SelectItem::Column(self.qualified_ident()?))
    }

    fn parse_table_list(&mut self) -> EngineResult<Vec<String>> {
        let mut tables = vec![self.ident()?];
        while matches!(self.peek(), Token::Comma) {
            self.advance();
            tables.push(self.ident()?);
        }
        Ok(tables)
    }

    fn parse_ident_list(&mut self) -> EngineResult<Vec<String>> {
        let mut idents = vec![self.qualified_ident()?];
        while matches!(self.peek(), Token::Comma) {
            self.advance();
            idents.push(self.qualified_ident()?);
        }
        Ok(idents)
    }

    fn parse_order_list(&mut self) -> EngineResult<Vec<OrderByItem>> {
        let mut items = vec![self.parse_order_item()?];
        while matches!(self.peek(), Token::Comma) {
            self.advance();
            items.push(self.parse_order_item()?);
        }
        Ok(items)
    }

    fn parse_order_item(&mut self) -> EngineResult<OrderByItem> {
        let target = if self.keyword_is("SUM") {
            self.advance();
            self.expect(&Token::LParen)?;
            let inner = self.parse_arith()?;
            self.expect(&Token::RParen)?;
            OrderTarget::Sum(inner)
        } else {
            OrderTarget::Column(self.qualified_ident()?)
        };

        let descending = if self.eat_keyword("DESC") {
            true
        } else {
            self.eat_keyword("ASC");
            false
        };

        Ok(OrderByItem { target, descending })
    }

    /// `condition := comparison (AND comparison)*` — OR/other combinators
    /// are not supported by the grammar, matching spec.md §6.
    fn parse_condition(&mut self) -> EngineResult<Expr> {
        let mut expr = self.parse_comparison()?;
        while self.eat_keyword("AND") {
            let rhs = self.parse_comparison()?;
            expr = Expr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> EngineResult<Expr> {
        let lhs = self.parse_arith()?;
        let op = match self.peek() {
            Token::Eq => CompareOp::Eq,
            Token::Ne => CompareOp::Ne,
            Token::Lt => CompareOp::Lt,
            Token::Le => CompareOp::Le,
            Token::Gt => CompareOp::Gt,
            Token::Ge => CompareOp::Ge,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_arith()?;
        Ok(Expr::Compare(Box::new(lhs), op, Box::new(rhs)))
    }

    fn parse_arith(&mut self) -> EngineResult<Expr> {
        let mut expr = self.parse_term()?;
        while matches!(self.peek(), Token::Plus) {
            self.advance();
            let rhs = self.parse_term()?;
            expr = Expr::Arith(Box::new(expr), ArithOp::Add, Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> EngineResult<Expr> {
        let mut expr = self.parse_factor()?;
        while matches!(self.peek(), Token::Star) {
            self.advance();
            let rhs = self.parse_factor()?;
            expr = Expr::Arith(Box::new(expr), ArithOp::Mul, Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> EngineResult<Expr> {
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Literal(n))
            }
            Token::Ident(_) => Ok(Expr::Column(self.qualified_ident()?)),
            Token::LParen => {
                self.advance();
                let expr = self.parse_condition_or_arith()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            other => Err(EngineError::Parse(format!(
                "expected a number, column, or '(', found {other:?}"
            ))),
        }
    }

    /// Parenthesized sub-expressions may nest either an arithmetic
    /// sub-expression or a full condition (`(R.A = 1 AND R.B > 2)`); try the
    /// richer condition grammar first and fall back to arithmetic.
    fn parse_condition_or_arith(&mut self) -> EngineResult<Expr> {
        let checkpoint = self.pos;
        if let Ok(expr) = self.parse_condition() {
            if matches!(self.peek(), Token::RParen) {
                return Ok(expr);
            }
        }
        self.pos = checkpoint;
        self.parse_arith()
    }
}
