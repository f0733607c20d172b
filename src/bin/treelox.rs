//! Interpreter command-line.
//!
//! `treelox <command> <filename>` reads the file and runs the requested
//! pipeline stage against it: `tokenize` dumps tokens, `parse` dumps
//! syntax trees, `evaluate` prints the value of a bare expression, and
//! `run` executes a program.
//!
//! Language errors go to stderr with conventional interpreter exit
//! codes: 65 for lexical or syntax errors, 70 for runtime errors.

use std::env;
use std::fs;
use std::io;
use std::process;

use anyhow::Context;

use treelox::interpreter::{Interpreter, LoxError};

fn main() -> Result<(), anyhow::Error> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let (command, path) = match args.as_slice() {
        [command, path] => (command.as_str(), path.as_str()),
        _ => {
            eprintln!("Usage: treelox <tokenize|parse|evaluate|run> <filename>");
            process::exit(1);
        }
    };

    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;

    let mut stdout = io::stdout();
    let mut interp = Interpreter::new(&mut stdout);
    let result = match command {
        "tokenize" => interp.tokenize(&source),
        "parse" => interp.parse(&source),
        "evaluate" => interp.evaluate(&source),
        "run" => interp.run(&source),
        _ => {
            eprintln!("Unknown command: {}", command);
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        let code = match e {
            LoxError::Lex(_) | LoxError::Syntax(_) => 65,
            LoxError::Runtime(_) => 70,
        };
        process::exit(code);
    }

    Ok(())
}
