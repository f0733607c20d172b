//! A tree-walk interpreter for a small language in the Lox family.
//!
//! See [Crafting Interpreters](https://craftinginterpreters.com/).
//!
//! The pipeline is `source text → characters → tokens → syntax tree →
//! values/effects`, one module per stage.  Every stage reports its errors
//! as values in its output; the driver decides which are fatal.
//!
//! # Examples
//!
//! See [`crate::interpreter::Interpreter`].
//!
//! # Limitations
//!
//! - The interpreter implements only a subset of Lox: no functions,
//!   classes or control flow.

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]

pub mod interpreter;

mod ast;
mod char_cursor;
mod ctx;
mod cursor;
mod diag;
mod eval;
mod interner;
mod parser;
mod printer;
mod scanner;
mod token;
