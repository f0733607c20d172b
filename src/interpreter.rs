//! API to control the interpreter.

use std::error::Error;
use std::fmt;
use std::io;
use std::io::prelude::*;
use std::rc::Rc;

use crate::ast::{Expr, Stmt};
use crate::ctx::Context;
use crate::cursor::TokenCursor;
use crate::diag::{FullParseError, Position};
use crate::eval::{Evaluator, RuntimeError};
use crate::parser::Parser;
use crate::printer;
use crate::scanner;
use crate::token::Token;

/// Tree-walk interpreter session.
///
/// Interned names and the global environment persist across calls, so
/// state built by one source string is visible to the next:
///
/// ```
/// # use treelox::interpreter::{Interpreter, LoxError};
/// let mut output: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output);
///
/// interp.run("var greeting = \"hello\";")?;
/// interp.run("print greeting;")?;
///
/// assert_eq!(output, b"hello\n");
/// # Ok::<(), LoxError>(())
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    ctx: Rc<Context>,
    evaluator: Evaluator,
    output: &'t mut W,
}

/// Errors an interpreter session can raise.
///
/// `Display` renders the stderr lines of the command-line interface:
/// lexical errors as `[line N] Error: <msg>`, syntax errors as
/// `Error: <msg>`, runtime errors as the bare message.
#[derive(Debug)]
pub enum LoxError {
    /// Errors occurring during lexical analysis.
    Lex(Vec<FullParseError>),

    /// Errors occurring during syntactic analysis.
    Syntax(Vec<FullParseError>),

    /// Error occurring during evaluation.
    Runtime(RuntimeError),
}

impl fmt::Display for LoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxError::Lex(errors) => {
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", e)?;
                }
                Ok(())
            }
            LoxError::Syntax(errors) => {
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "Error: {}", e.error)?;
                }
                Ok(())
            }
            LoxError::Runtime(e) => write!(f, "{}", e),
        }
    }
}

impl Error for LoxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoxError::Lex(_) | LoxError::Syntax(_) => None,
            LoxError::Runtime(e) => Some(e),
        }
    }
}

impl From<RuntimeError> for LoxError {
    fn from(e: RuntimeError) -> LoxError {
        LoxError::Runtime(e)
    }
}

impl From<io::Error> for LoxError {
    fn from(e: io::Error) -> LoxError {
        LoxError::Runtime(RuntimeError::from(e))
    }
}

/// Outcome of parsing in single-expression compatibility mode.
enum Parsed {
    Expression(Expr),
    Program(Vec<Stmt>),
}

impl<'t, W: Write> Interpreter<'t, W> {
    pub fn new(output: &'t mut W) -> Interpreter<'t, W> {
        Interpreter {
            ctx: Context::new(),
            evaluator: Evaluator::new(),
            output,
        }
    }

    /// Print one `KIND LEXEME LITERAL` line per token, terminated by
    /// `EOF  null`.
    ///
    /// Valid tokens print even when lexical errors are present; the
    /// errors are returned for the caller to report.
    pub fn tokenize(&mut self, source: &str) -> Result<(), LoxError> {
        let (tokens, errors) = scanner::scan(source, self.ctx.clone());
        for (_, token) in &tokens {
            writeln!(
                self.output,
                "{} {} {}",
                token.kind_name(),
                token.lexeme(),
                token.literal()
            )?;
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(LoxError::Lex(errors))
        }
    }

    /// Print the S-expression dump of the input, one line per tree.
    pub fn parse(&mut self, source: &str) -> Result<(), LoxError> {
        let tokens = self.lex(source)?;
        match parse_compat(&tokens) {
            Ok(Parsed::Expression(expr)) => {
                writeln!(self.output, "{}", printer::print_expr(&expr))?;
                Ok(())
            }
            Ok(Parsed::Program(stmts)) => {
                for stmt in &stmts {
                    writeln!(self.output, "{}", printer::print_stmt(stmt))?;
                }
                Ok(())
            }
            Err(errors) => Err(LoxError::Syntax(errors)),
        }
    }

    /// Evaluate the input: a bare expression prints its value, a program
    /// runs for its effects.
    pub fn evaluate(&mut self, source: &str) -> Result<(), LoxError> {
        let tokens = self.lex(source)?;
        match parse_compat(&tokens) {
            Ok(Parsed::Expression(expr)) => {
                let value = self.evaluator.eval_in_globals(&expr)?;
                writeln!(self.output, "{}", value)?;
                Ok(())
            }
            Ok(Parsed::Program(stmts)) => self.exec(&stmts),
            Err(errors) => Err(first_syntax_error(errors)),
        }
    }

    /// Run the input as a program.
    pub fn run(&mut self, source: &str) -> Result<(), LoxError> {
        let tokens = self.lex(source)?;
        let mut parser = Parser::new(TokenCursor::new(&tokens));
        let (stmts, errors) = parser.parse_program();
        if !errors.is_empty() {
            return Err(first_syntax_error(errors));
        }
        self.exec(&stmts)
    }

    fn lex(&self, source: &str) -> Result<Vec<(Position, Token)>, LoxError> {
        let (tokens, errors) = scanner::scan(source, self.ctx.clone());
        if errors.is_empty() {
            Ok(tokens)
        } else {
            Err(LoxError::Lex(errors))
        }
    }

    fn exec(&mut self, stmts: &[Stmt]) -> Result<(), LoxError> {
        self.evaluator.eval_program(stmts, self.output)?;
        Ok(())
    }
}

/// Parse as a program, falling back to a bare expression when the only
/// obstacle is a missing `;`.
///
/// The fallback keys on the first recorded error, so a missing `;` early
/// in genuinely malformed input can mask later diagnostics.  Preserved
/// for command-line compatibility.
fn parse_compat(tokens: &[(Position, Token)]) -> Result<Parsed, Vec<FullParseError>> {
    let mut parser = Parser::new(TokenCursor::new(tokens));
    let (stmts, errors) = parser.parse_program();
    if errors.is_empty() {
        return Ok(Parsed::Program(stmts));
    }
    if errors[0].is_missing_semicolon() {
        let mut retry = Parser::new(TokenCursor::new(tokens));
        if let Ok(expr) = retry.parse_expression() {
            if retry.at_end() {
                return Ok(Parsed::Expression(expr));
            }
        }
    }
    Err(errors)
}

fn first_syntax_error(mut errors: Vec<FullParseError>) -> LoxError {
    errors.truncate(1);
    LoxError::Syntax(errors)
}
