//! lpm - a small Spanish-keyword scripting language
//!
//! This is the entry point for the lpm interpreter. Run with no arguments
//! to get an interactive REPL, or pass a source file path to run it
//! directly.
//!
//! ## Architecture Overview
//!
//! The interpreter is a conventional three-stage tree-walking pipeline:
//! - **lexer**: tokenizes source text
//! - **parser**: builds an AST from the token stream using Pratt parsing
//! - **ast**: the AST node types produced by the parser
//! - **object**: runtime values and lexical environments
//! - **evaluator**: walks the AST against an `Environment`, producing a `Value`
//! - **error**: host-level (non-language) error handling

mod ast;
mod error;
mod evaluator;
mod lexer;
mod object;
mod parser;

use std::io::{self, Write};
use std::{env, fs, process};

use error::{InterpreterError, Result};
use lexer::Lexer;
use object::{Environment, Value};
use parser::Parser;

const PROMPT: &str = ">> ";
const EXIT_SENTINEL: &str = "salir()";

fn main() {
    let args: Vec<String> = env::args().collect();

    let outcome = match args.get(1) {
        Some(path) => run_file(path),
        None => run_repl(),
    };

    if let Err(e) = outcome {
        eprintln!("{}", e);
        process::exit(1);
    }
}

/// Reads an entire source file and evaluates it once against a fresh
/// environment, printing the final value's `inspect()` form.
fn run_file(path: &str) -> Result<()> {
    let source = fs::read_to_string(path)?;
    let env = Environment::new();

    match run_source(&source, &env) {
        Ok(value) => {
            println!("{}", value.inspect());
            Ok(())
        }
        Err(errors) => {
            print_parse_errors(&errors);
            process::exit(1);
        }
    }
}

/// Interactive read-eval-print loop.
///
/// Mirrors the reference REPL's shape: every line typed so far is kept and
/// re-joined with spaces, then re-lexed and re-parsed from scratch on each
/// iteration, against a *fresh* environment every time (so a REPL session
/// has no persistent bindings across lines). This is a deliberate property
/// of the reference implementation, not an oversight: see DESIGN.md.
fn run_repl() -> Result<()> {
    let stdin = io::stdin();
    let mut scanned: Vec<String> = Vec::new();

    loop {
        print!("{}", PROMPT);
        io::stdout().flush().map_err(|e| InterpreterError::StdinRead(e.to_string()))?;

        let mut line = String::new();
        let bytes_read = stdin
            .read_line(&mut line)
            .map_err(|e| InterpreterError::StdinRead(e.to_string()))?;

        if bytes_read == 0 {
            println!();
            return Ok(());
        }

        let line = line.trim_end_matches(['\n', '\r']);
        if line == EXIT_SENTINEL {
            return Ok(());
        }

        scanned.push(line.to_string());
        let source = scanned.join(" ");
        let env = Environment::new();

        match run_source(&source, &env) {
            Ok(value) => {
                if value != Value::Null {
                    println!("{}", value.inspect());
                }
            }
            Err(errors) => print_parse_errors(&errors),
        }
    }
}

/// Shared lex/parse/evaluate seam used by both the REPL and the file
/// runner. Parser errors short-circuit evaluation entirely; otherwise the
/// program's final value is returned for the caller to print, even when
/// that value is `NULL` (e.g. a source that is just a `variable` binding).
fn run_source(source: &str, env: &Environment) -> std::result::Result<Value, Vec<String>> {
    let lexer = Lexer::new(source);
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
        return Err(parser.errors().to_vec());
    }

    Ok(evaluator::evaluate_program(&program, env))
}

fn print_parse_errors(errors: &[String]) {
    eprintln!("¡Ups! Se encontraron errores de parseo:");
    for error in errors {
        eprintln!("\t{}", error);
    }
}
