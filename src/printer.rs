//! S-expression dump of syntax trees, used by the `parse` command.

use crate::ast::{Expr, Stmt};
use crate::token::number_literal;

pub fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Expr(e) => format!("(expr {})", print_expr(e)),
        Stmt::Print(e) => format!("(print {})", print_expr(e)),
        Stmt::VarDecl(name, init) => format!("(var {} {})", name, print_expr(init)),
        Stmt::Block(stmts) => {
            if stmts.is_empty() {
                "(block)".to_string()
            } else {
                let body: Vec<String> = stmts.iter().map(print_stmt).collect();
                format!("(block {})", body.join(" "))
            }
        }
    }
}

pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Nil => "nil".to_string(),
        // Numbers dump in literal form, with at least one fractional digit.
        Expr::Number(n) => number_literal(*n),
        Expr::Bool(b) => b.to_string(),
        Expr::Str(s) => s.clone(),
        Expr::Var(name) => name.to_string(),
        Expr::Not(e) => format!("(! {})", print_expr(e)),
        Expr::UnaryMinus(e) => format!("(- {})", print_expr(e)),
        Expr::Group(e) => format!("(group {})", print_expr(e)),
        Expr::Assign(name, value) => format!("(= {} {})", name, print_expr(value)),
        Expr::Equal(lhs, rhs) => binary("==", lhs, rhs),
        Expr::NotEqual(lhs, rhs) => binary("!=", lhs, rhs),
        Expr::Less(lhs, rhs) => binary("<", lhs, rhs),
        Expr::LessEqual(lhs, rhs) => binary("<=", lhs, rhs),
        Expr::Greater(lhs, rhs) => binary(">", lhs, rhs),
        Expr::GreaterEqual(lhs, rhs) => binary(">=", lhs, rhs),
        Expr::Add(lhs, rhs) => binary("+", lhs, rhs),
        Expr::Sub(lhs, rhs) => binary("-", lhs, rhs),
        Expr::Mul(lhs, rhs) => binary("*", lhs, rhs),
        Expr::Div(lhs, rhs) => binary("/", lhs, rhs),
    }
}

fn binary(op: &str, lhs: &Expr, rhs: &Expr) -> String {
    format!("({} {} {})", op, print_expr(lhs), print_expr(rhs))
}
