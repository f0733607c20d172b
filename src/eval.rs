use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::io;
use std::io::prelude::*;
use std::rc::Rc;

use crate::ast::{Expr, Stmt};
use crate::interner::Symbol;

/// A runtime value.
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl Value {
    /// Only `nil` and `false` are falsy; `0` and `""` are truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            // Shortest round-trip form: integral values print without a
            // decimal point.
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug)]
pub enum RuntimeError {
    DivByZero,
    UnaryOperandNotNumber,
    OperandsNotNumbers,
    OperandsNotAddable,
    UndefinedVariable(String),
    Io(io::Error),
}

impl Error for RuntimeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RuntimeError::DivByZero
            | RuntimeError::UnaryOperandNotNumber
            | RuntimeError::OperandsNotNumbers
            | RuntimeError::OperandsNotAddable
            | RuntimeError::UndefinedVariable(_) => None,
            RuntimeError::Io(e) => Some(e),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::DivByZero => write!(f, "Division by zero"),
            RuntimeError::UnaryOperandNotNumber => {
                write!(f, "Operand must be a number for unary operator '-'")
            }
            RuntimeError::OperandsNotNumbers => write!(f, "Operands must be numbers"),
            RuntimeError::OperandsNotAddable => {
                write!(f, "Operands must be two numbers or two strings")
            }
            RuntimeError::UndefinedVariable(name) => {
                write!(f, "Undefined variable '{}'", name)
            }
            RuntimeError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> RuntimeError {
        RuntimeError::Io(e)
    }
}

/// Walks syntax trees against a persistent global environment.
///
/// The first runtime error aborts execution; output written before the
/// error stays written.
#[derive(Debug)]
pub struct Evaluator {
    globals: Rc<Env>,
}

impl Evaluator {
    pub fn new() -> Evaluator {
        Evaluator {
            globals: Env::new(),
        }
    }

    /// Execute a program top to bottom, writing `print` output to `output`.
    pub fn eval_program<W: Write>(
        &mut self,
        stmts: &[Stmt],
        output: &mut W,
    ) -> Result<(), RuntimeError> {
        self.eval_stmts(stmts, self.globals.clone(), output)
    }

    /// Evaluate a bare expression against the global environment.
    pub fn eval_in_globals(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        self.eval_expr(expr, self.globals.clone())
    }

    fn eval_stmts<W: Write>(
        &mut self,
        stmts: &[Stmt],
        env: Rc<Env>,
        output: &mut W,
    ) -> Result<(), RuntimeError> {
        for stmt in stmts {
            self.eval_stmt(stmt, env.clone(), output)?;
        }
        Ok(())
    }

    fn eval_stmt<W: Write>(
        &mut self,
        stmt: &Stmt,
        env: Rc<Env>,
        output: &mut W,
    ) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expr(e) => {
                self.eval_expr(e, env)?;
            }
            Stmt::Print(e) => {
                let v = self.eval_expr(e, env)?;
                writeln!(output, "{}", v)?;
            }
            Stmt::VarDecl(name, init) => {
                let value = self.eval_expr(init, env.clone())?;
                env.define(name, value);
            }
            Stmt::Block(stmts) => {
                // The child frame is dropped on exit, so block-local
                // bindings do not leak into the enclosing scope.
                self.eval_stmts(stmts, Env::with_parent(env), output)?;
            }
        };
        Ok(())
    }

    fn eval_expr(&mut self, expr: &Expr, env: Rc<Env>) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Nil => Ok(Value::Nil),
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Var(name) => env
                .get(name)
                .ok_or_else(|| RuntimeError::UndefinedVariable(name.name().to_owned())),
            Expr::Not(e) => {
                let v = self.eval_expr(e, env)?;
                Ok(Value::Bool(!v.is_truthy()))
            }
            Expr::UnaryMinus(e) => {
                if let Value::Number(n) = self.eval_expr(e, env)? {
                    Ok(Value::Number(-n))
                } else {
                    Err(RuntimeError::UnaryOperandNotNumber)
                }
            }
            Expr::Add(lhs, rhs) => {
                let l = self.eval_expr(lhs, env.clone())?;
                let r = self.eval_expr(rhs, env)?;
                match (l, r) {
                    (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                    (Value::Str(mut l), Value::Str(r)) => {
                        l.push_str(&r);
                        Ok(Value::Str(l))
                    }
                    _ => Err(RuntimeError::OperandsNotAddable),
                }
            }
            Expr::Sub(lhs, rhs) => {
                let (l, r) = self.number_operands(lhs, rhs, env)?;
                Ok(Value::Number(l - r))
            }
            Expr::Mul(lhs, rhs) => {
                let (l, r) = self.number_operands(lhs, rhs, env)?;
                Ok(Value::Number(l * r))
            }
            Expr::Div(lhs, rhs) => {
                let (l, r) = self.number_operands(lhs, rhs, env)?;
                if r == 0.0 {
                    Err(RuntimeError::DivByZero)
                } else {
                    Ok(Value::Number(l / r))
                }
            }
            Expr::Equal(lhs, rhs) => {
                let l = self.eval_expr(lhs, env.clone())?;
                let r = self.eval_expr(rhs, env)?;
                Ok(Value::Bool(l == r))
            }
            Expr::NotEqual(lhs, rhs) => {
                let l = self.eval_expr(lhs, env.clone())?;
                let r = self.eval_expr(rhs, env)?;
                Ok(Value::Bool(l != r))
            }
            Expr::Less(lhs, rhs) => {
                let (l, r) = self.number_operands(lhs, rhs, env)?;
                Ok(Value::Bool(l < r))
            }
            Expr::LessEqual(lhs, rhs) => {
                let (l, r) = self.number_operands(lhs, rhs, env)?;
                Ok(Value::Bool(l <= r))
            }
            Expr::Greater(lhs, rhs) => {
                let (l, r) = self.number_operands(lhs, rhs, env)?;
                Ok(Value::Bool(l > r))
            }
            Expr::GreaterEqual(lhs, rhs) => {
                let (l, r) = self.number_operands(lhs, rhs, env)?;
                Ok(Value::Bool(l >= r))
            }
            Expr::Group(e) => self.eval_expr(e, env),
            Expr::Assign(name, rhs) => {
                let value = self.eval_expr(rhs, env.clone())?;
                env.assign(name, value.clone())?;
                Ok(value)
            }
        }
    }

    /// Evaluate both sides, left first, and require numbers.
    fn number_operands(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        env: Rc<Env>,
    ) -> Result<(f64, f64), RuntimeError> {
        let l = self.eval_expr(lhs, env.clone())?;
        let r = self.eval_expr(rhs, env)?;
        if let (Value::Number(l), Value::Number(r)) = (l, r) {
            Ok((l, r))
        } else {
            Err(RuntimeError::OperandsNotNumbers)
        }
    }
}

/// A lexical scope: one frame of bindings chained to its parent.
#[derive(Debug)]
struct Env {
    parent: Option<Rc<Env>>,
    bindings: RefCell<HashMap<Symbol, Value>>,
}

impl Env {
    fn new() -> Rc<Env> {
        Rc::new(Env {
            parent: None,
            bindings: RefCell::new(HashMap::new()),
        })
    }

    fn with_parent(parent: Rc<Env>) -> Rc<Env> {
        Rc::new(Env {
            parent: Some(parent),
            bindings: RefCell::new(HashMap::new()),
        })
    }

    /// Bind in this frame, overwriting any previous binding here.
    fn define(&self, name: &Symbol, value: Value) {
        self.bindings.borrow_mut().insert(name.clone(), value);
    }

    /// Rebind in the innermost frame that already contains `name`.
    fn assign(&self, name: &Symbol, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.bindings.borrow_mut().get_mut(name) {
            *slot = value;
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(RuntimeError::UndefinedVariable(name.name().to_owned())),
        }
    }

    fn get(&self, name: &Symbol) -> Option<Value> {
        match self.bindings.borrow().get(name) {
            Some(v) => Some(v.clone()),
            None => self.parent.as_ref().and_then(|p| p.get(name)),
        }
    }
}
