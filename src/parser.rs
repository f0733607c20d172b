//! Recursive-descent parser.

use crate::ast::{Expr, Stmt};
use crate::cursor::TokenCursor;
use crate::diag::{FullParseError, ParseError};
use crate::interner::Symbol;
use crate::token::Token;

/// Builds syntax trees from a token cursor.
///
/// Statement-level errors are recoverable: `parse_program` records the
/// diagnostic, steps one token past the error site and carries on, so a
/// single pass reports every malformed statement.  Errors inside an
/// expression bubble up and end the statement they occurred in.
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: TokenCursor<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(cursor: TokenCursor<'a>) -> Parser<'a> {
        Parser { cursor }
    }

    /// Parse declarations up to `Eof`, accumulating diagnostics.
    pub fn parse_program(&mut self) -> (Vec<Stmt>, Vec<FullParseError>) {
        let mut stmts = Vec::new();
        let mut errors = Vec::new();
        while *self.cursor.current() != Token::Eof {
            match self.declaration() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    errors.push(e);
                    if *self.cursor.current() != Token::Eof {
                        self.advance();
                    }
                }
            }
        }
        (stmts, errors)
    }

    /// Parse a single bare expression (single-expression input mode).
    pub fn parse_expression(&mut self) -> Result<Expr, FullParseError> {
        self.expression()
    }

    /// True once the cursor reached the trailing `Eof`.
    pub fn at_end(&self) -> bool {
        *self.cursor.current() == Token::Eof
    }

    fn declaration(&mut self) -> Result<Stmt, FullParseError> {
        match self.cursor.current() {
            Token::Var => self.var_decl(),
            _ => self.statement(),
        }
    }

    /// Parse a variable declaration.
    /// Current token is `Token::Var`.
    fn var_decl(&mut self) -> Result<Stmt, FullParseError> {
        self.advance();
        let name = self.identifier()?;
        let init = match self.cursor.current() {
            Token::Equal => {
                self.advance();
                self.expression()?
            }
            _ => Expr::Nil,
        };
        self.consume(Token::Semicolon)?;
        Ok(Stmt::VarDecl(name, Box::new(init)))
    }

    fn identifier(&mut self) -> Result<Symbol, FullParseError> {
        if let Token::Identifier(sym) = self.cursor.current() {
            let sym = sym.clone();
            self.advance();
            Ok(sym)
        } else {
            Err(self.error(ParseError::ExpectedIdentifier(
                self.cursor.current().clone(),
            )))
        }
    }

    fn statement(&mut self) -> Result<Stmt, FullParseError> {
        match self.cursor.current() {
            Token::Print => {
                self.advance();
                let expr = Box::new(self.expression()?);
                self.consume(Token::Semicolon)?;
                Ok(Stmt::Print(expr))
            }
            Token::LeftBrace => self.block(),
            _ => {
                let expr = Box::new(self.expression()?);
                self.consume(Token::Semicolon)?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn block(&mut self) -> Result<Stmt, FullParseError> {
        self.consume(Token::LeftBrace)?;
        let mut stmts = Vec::new();
        loop {
            match self.cursor.current() {
                Token::RightBrace => {
                    self.advance();
                    return Ok(Stmt::Block(stmts));
                }
                Token::Eof => {
                    return Err(self.error(ParseError::UnexpectedToken {
                        expected: Token::RightBrace,
                        found: Token::Eof,
                    }));
                }
                _ => stmts.push(self.declaration()?),
            }
        }
    }

    fn expression(&mut self) -> Result<Expr, FullParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, FullParseError> {
        let lhs = self.equality()?;
        if *self.cursor.current() == Token::Equal {
            let equal_pos = self.cursor.pos();
            self.advance();
            let rhs = self.assignment()?;
            if let Expr::Var(name) = lhs {
                Ok(Expr::Assign(name, Box::new(rhs)))
            } else {
                Err(FullParseError {
                    pos: equal_pos,
                    error: ParseError::InvalidAssignmentTarget,
                })
            }
        } else {
            Ok(lhs)
        }
    }

    fn equality(&mut self) -> Result<Expr, FullParseError> {
        let mut expr = self.comparison()?;
        loop {
            match self.cursor.current() {
                Token::EqualEqual => {
                    self.advance();
                    expr = Expr::Equal(Box::new(expr), Box::new(self.comparison()?));
                }
                Token::BangEqual => {
                    self.advance();
                    expr = Expr::NotEqual(Box::new(expr), Box::new(self.comparison()?));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, FullParseError> {
        let mut expr = self.term()?;
        loop {
            match self.cursor.current() {
                Token::Less => {
                    self.advance();
                    expr = Expr::Less(Box::new(expr), Box::new(self.term()?));
                }
                Token::LessEqual => {
                    self.advance();
                    expr = Expr::LessEqual(Box::new(expr), Box::new(self.term()?));
                }
                Token::Greater => {
                    self.advance();
                    expr = Expr::Greater(Box::new(expr), Box::new(self.term()?));
                }
                Token::GreaterEqual => {
                    self.advance();
                    expr = Expr::GreaterEqual(Box::new(expr), Box::new(self.term()?));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, FullParseError> {
        let mut expr = self.factor()?;
        loop {
            match self.cursor.current() {
                Token::Plus => {
                    self.advance();
                    expr = Expr::Add(Box::new(expr), Box::new(self.factor()?));
                }
                Token::Minus => {
                    self.advance();
                    expr = Expr::Sub(Box::new(expr), Box::new(self.factor()?));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, FullParseError> {
        let mut expr = self.unary()?;
        loop {
            match self.cursor.current() {
                Token::Star => {
                    self.advance();
                    expr = Expr::Mul(Box::new(expr), Box::new(self.unary()?));
                }
                Token::Slash => {
                    self.advance();
                    expr = Expr::Div(Box::new(expr), Box::new(self.unary()?));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, FullParseError> {
        match self.cursor.current() {
            Token::Minus => {
                self.advance();
                Ok(Expr::UnaryMinus(Box::new(self.unary()?)))
            }
            Token::Bang => {
                self.advance();
                Ok(Expr::Not(Box::new(self.unary()?)))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, FullParseError> {
        let expr = match self.cursor.current() {
            Token::Nil => Expr::Nil,
            Token::True => Expr::Bool(true),
            Token::False => Expr::Bool(false),
            Token::Number { value, .. } => Expr::Number(*value),
            Token::Str(value) => Expr::Str(value.clone()),
            Token::Identifier(sym) => Expr::Var(sym.clone()),
            Token::LeftParen => {
                self.advance();
                let inner = self.expression()?;
                self.consume(Token::RightParen)?;
                return Ok(Expr::Group(Box::new(inner)));
            }
            found => {
                return Err(self.error(ParseError::ExpectedExpression(found.clone())));
            }
        };
        self.advance();
        Ok(expr)
    }

    fn advance(&mut self) {
        self.cursor = self.cursor.advance();
    }

    fn consume(&mut self, expected: Token) -> Result<(), FullParseError> {
        if *self.cursor.current() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(ParseError::UnexpectedToken {
                expected,
                found: self.cursor.current().clone(),
            }))
        }
    }

    fn error(&self, error: ParseError) -> FullParseError {
        FullParseError {
            pos: self.cursor.pos(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::ctx::Context;
    use crate::scanner::scan;

    fn parse_expr(input: &str) -> Result<Expr, FullParseError> {
        parse_expr_with_ctx(Context::new(), input)
    }

    fn parse_expr_with_ctx(ctx: Rc<Context>, input: &str) -> Result<Expr, FullParseError> {
        let (tokens, errors) = scan(input, ctx);
        assert!(errors.is_empty(), "lexical errors in test input: {:?}", errors);
        let mut parser = Parser::new(TokenCursor::new(&tokens));
        parser.parse_expression()
    }

    fn parse_prg(input: &str) -> Vec<Stmt> {
        parse_prg_with_ctx(Context::new(), input)
    }

    fn parse_prg_with_ctx(ctx: Rc<Context>, input: &str) -> Vec<Stmt> {
        let (stmts, errors) = parse_prg_with_errors(ctx, input);
        assert!(errors.is_empty(), "parse errors in test input: {:?}", errors);
        stmts
    }

    fn parse_prg_with_errors(
        ctx: Rc<Context>,
        input: &str,
    ) -> (Vec<Stmt>, Vec<FullParseError>) {
        let (tokens, errors) = scan(input, ctx);
        assert!(errors.is_empty(), "lexical errors in test input: {:?}", errors);
        let mut parser = Parser::new(TokenCursor::new(&tokens));
        parser.parse_program()
    }

    #[test]
    fn number() -> Result<(), FullParseError> {
        assert_eq!(parse_expr("42")?, Expr::Number(42.0));
        Ok(())
    }

    #[test]
    fn bool_literals() -> Result<(), FullParseError> {
        assert_eq!(parse_expr("true")?, Expr::Bool(true));
        assert_eq!(parse_expr("false")?, Expr::Bool(false));
        Ok(())
    }

    #[test]
    fn nil_literal() -> Result<(), FullParseError> {
        assert_eq!(parse_expr("nil")?, Expr::Nil);
        Ok(())
    }

    #[test]
    fn string_literal() -> Result<(), FullParseError> {
        assert_eq!(
            parse_expr("\"hi there\"")?,
            Expr::Str("hi there".to_string())
        );
        Ok(())
    }

    #[test]
    fn unary_minus() -> Result<(), FullParseError> {
        assert_eq!(
            parse_expr("--42")?,
            Expr::UnaryMinus(Box::new(Expr::UnaryMinus(Box::new(Expr::Number(42.0)))))
        );
        Ok(())
    }

    #[test]
    fn logical_not() -> Result<(), FullParseError> {
        assert_eq!(
            parse_expr("!!true")?,
            Expr::Not(Box::new(Expr::Not(Box::new(Expr::Bool(true)))))
        );
        Ok(())
    }

    #[test]
    fn addition() -> Result<(), FullParseError> {
        assert_eq!(
            parse_expr("42 + 24")?,
            Expr::Add(Box::new(Expr::Number(42.0)), Box::new(Expr::Number(24.0)))
        );
        Ok(())
    }

    #[test]
    fn subtraction_is_left_associative() -> Result<(), FullParseError> {
        assert_eq!(
            parse_expr("1 - 2 - 3")?,
            Expr::Sub(
                Box::new(Expr::Sub(
                    Box::new(Expr::Number(1.0)),
                    Box::new(Expr::Number(2.0))
                )),
                Box::new(Expr::Number(3.0))
            )
        );
        Ok(())
    }

    #[test]
    fn factors_have_precedence_over_terms() -> Result<(), FullParseError> {
        assert_eq!(
            parse_expr("1 + 2 * 3")?,
            Expr::Add(
                Box::new(Expr::Number(1.0)),
                Box::new(Expr::Mul(
                    Box::new(Expr::Number(2.0)),
                    Box::new(Expr::Number(3.0))
                )),
            )
        );
        Ok(())
    }

    #[test]
    fn grouping_takes_precedence() -> Result<(), FullParseError> {
        assert_eq!(
            parse_expr("1 * (2 + 3)")?,
            Expr::Mul(
                Box::new(Expr::Number(1.0)),
                Box::new(Expr::Group(Box::new(Expr::Add(
                    Box::new(Expr::Number(2.0)),
                    Box::new(Expr::Number(3.0))
                ))))
            ),
        );
        Ok(())
    }

    #[test]
    fn missing_right_paren() {
        match parse_expr("(1") {
            Err(FullParseError {
                pos: 1,
                error:
                    ParseError::UnexpectedToken {
                        expected: Token::RightParen,
                        found: Token::Eof,
                    },
            }) => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn comparisons() -> Result<(), FullParseError> {
        assert_eq!(
            parse_expr("1 < 2")?,
            Expr::Less(Box::new(Expr::Number(1.0)), Box::new(Expr::Number(2.0)))
        );
        assert_eq!(
            parse_expr("1 <= 2")?,
            Expr::LessEqual(Box::new(Expr::Number(1.0)), Box::new(Expr::Number(2.0)))
        );
        assert_eq!(
            parse_expr("1 > 2")?,
            Expr::Greater(Box::new(Expr::Number(1.0)), Box::new(Expr::Number(2.0)))
        );
        assert_eq!(
            parse_expr("1 >= 2")?,
            Expr::GreaterEqual(Box::new(Expr::Number(1.0)), Box::new(Expr::Number(2.0)))
        );
        Ok(())
    }

    #[test]
    fn equality_binds_looser_than_comparison() -> Result<(), FullParseError> {
        assert_eq!(
            parse_expr("1 < 2 == true")?,
            Expr::Equal(
                Box::new(Expr::Less(
                    Box::new(Expr::Number(1.0)),
                    Box::new(Expr::Number(2.0))
                )),
                Box::new(Expr::Bool(true))
            )
        );
        Ok(())
    }

    #[test]
    fn inequality() -> Result<(), FullParseError> {
        assert_eq!(
            parse_expr("42 != 24")?,
            Expr::NotEqual(Box::new(Expr::Number(42.0)), Box::new(Expr::Number(24.0)))
        );
        Ok(())
    }

    #[test]
    fn expr_stmts() -> Result<(), FullParseError> {
        assert_eq!(
            parse_prg("1; 1+2;"),
            vec![
                Stmt::Expr(Box::new(Expr::Number(1.0))),
                Stmt::Expr(Box::new(Expr::Add(
                    Box::new(Expr::Number(1.0)),
                    Box::new(Expr::Number(2.0))
                )))
            ]
        );
        Ok(())
    }

    #[test]
    fn print_stmt() {
        assert_eq!(
            parse_prg("print 1+2;"),
            vec![Stmt::Print(Box::new(Expr::Add(
                Box::new(Expr::Number(1.0)),
                Box::new(Expr::Number(2.0))
            )))]
        );
    }

    #[test]
    fn var_decl() {
        let ctx = Context::new();
        let sym_foo = ctx.symbol("foo");
        let sym_bar = ctx.symbol("bar");
        assert_eq!(
            parse_prg_with_ctx(ctx, "var foo; var bar = 2 * 3.14;"),
            vec![
                Stmt::VarDecl(sym_foo, Box::new(Expr::Nil)),
                Stmt::VarDecl(
                    sym_bar,
                    Box::new(Expr::Mul(
                        Box::new(Expr::Number(2.0)),
                        Box::new(Expr::Number(3.14))
                    ))
                )
            ]
        );
    }

    #[test]
    fn var_decl_without_name() {
        let ctx = Context::new();
        let (stmts, errors) = parse_prg_with_errors(ctx, "var 1;");
        assert!(stmts.is_empty());
        assert!(matches!(
            errors.as_slice(),
            [
                FullParseError {
                    error: ParseError::ExpectedIdentifier(_),
                    ..
                },
                // Recovery resumes at the stray `;`, which cannot start a
                // statement either.
                FullParseError {
                    error: ParseError::ExpectedExpression(Token::Semicolon),
                    ..
                }
            ]
        ));
    }

    #[test]
    fn simple_assignment() -> Result<(), FullParseError> {
        let ctx = Context::new();
        let sym_a = ctx.symbol("a");
        let sym_b = ctx.symbol("b");
        assert_eq!(
            parse_expr_with_ctx(ctx, "a = b")?,
            Expr::Assign(sym_a, Box::new(Expr::Var(sym_b)))
        );
        Ok(())
    }

    #[test]
    fn assignment_is_right_associative() -> Result<(), FullParseError> {
        let ctx = Context::new();
        let sym_a = ctx.symbol("a");
        let sym_b = ctx.symbol("b");
        let sym_c = ctx.symbol("c");
        assert_eq!(
            parse_expr_with_ctx(ctx, "a = b = c")?,
            Expr::Assign(
                sym_a,
                Box::new(Expr::Assign(sym_b, Box::new(Expr::Var(sym_c))))
            )
        );
        Ok(())
    }

    #[test]
    fn bad_assignment_lhs() {
        match parse_expr("(1+a=b") {
            Err(FullParseError {
                pos: 1,
                error: ParseError::InvalidAssignmentTarget,
            }) => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn empty_block() {
        assert_eq!(parse_prg("{ }"), vec![Stmt::Block(vec![])]);
    }

    #[test]
    fn block_with_many_stmts() {
        assert_eq!(
            parse_prg("{ 1; 2; }"),
            vec![Stmt::Block(vec![
                Stmt::Expr(Box::new(Expr::Number(1.0))),
                Stmt::Expr(Box::new(Expr::Number(2.0))),
            ])]
        );
    }

    #[test]
    fn nested_blocks() {
        assert_eq!(
            parse_prg("{ { 1; } }"),
            vec![Stmt::Block(vec![Stmt::Block(vec![Stmt::Expr(Box::new(
                Expr::Number(1.0)
            ))])])]
        );
    }

    #[test]
    fn unterminated_block() {
        let ctx = Context::new();
        let (_, errors) = parse_prg_with_errors(ctx, "{ 1;");
        assert!(matches!(
            errors.as_slice(),
            [FullParseError {
                error:
                    ParseError::UnexpectedToken {
                        expected: Token::RightBrace,
                        found: Token::Eof,
                    },
                ..
            }]
        ));
    }

    #[test]
    fn recovery_continues_after_a_bad_statement() {
        let ctx = Context::new();
        let sym_x = ctx.symbol("x");
        let (stmts, errors) = parse_prg_with_errors(ctx, "print; var x = 1;");
        assert_eq!(
            stmts,
            vec![Stmt::VarDecl(sym_x, Box::new(Expr::Number(1.0)))]
        );
        assert!(matches!(
            errors.as_slice(),
            [FullParseError {
                error: ParseError::ExpectedExpression(Token::Semicolon),
                ..
            }]
        ));
    }

    #[test]
    fn recovery_accumulates_multiple_errors() {
        let ctx = Context::new();
        let (stmts, errors) = parse_prg_with_errors(ctx, "1 2; print 3;");
        assert_eq!(stmts, vec![Stmt::Print(Box::new(Expr::Number(3.0)))]);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].is_missing_semicolon());
    }

    #[test]
    fn missing_semicolon_after_expression() {
        let ctx = Context::new();
        let (_, errors) = parse_prg_with_errors(ctx, "1 + 2");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_missing_semicolon());
    }

    #[test]
    fn expression_mode_reports_remaining_input() -> Result<(), FullParseError> {
        let ctx = Context::new();
        let (tokens, _) = scan("1 + 2", ctx);
        let mut parser = Parser::new(TokenCursor::new(&tokens));
        parser.parse_expression()?;
        assert!(parser.at_end());

        let ctx = Context::new();
        let (tokens, _) = scan("1 + 2; 3;", ctx);
        let mut parser = Parser::new(TokenCursor::new(&tokens));
        parser.parse_expression()?;
        assert!(!parser.at_end());
        Ok(())
    }
}
