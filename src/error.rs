//! Ambient error handling for the lpm host program.
//!
//! The language itself has two error channels that are *not* routed through
//! this type: a parser accumulates a `Vec<String>` of syntax errors (see
//! `parser.rs`), and a failed evaluation produces a `Value::Error` (see
//! `object.rs`/`evaluator.rs`). Both are language-level values, printed and
//! handled by the caller, not Rust-level errors.
//!
//! `InterpreterError` exists only for the concerns around those two
//! channels: reading a source file, reading a line from stdin, and any
//! other host/OS-level failure the CLI needs to report.

use std::fmt;
use std::error::Error;

/// Host-level error for the lpm CLI, covering what the language's own two
/// error channels (parser errors, runtime `Value::Error`) do not.
#[derive(Debug, Clone)]
pub enum InterpreterError {
    /// A source file could not be read.
    ///
    /// # Examples
    /// - `No se pudo leer el archivo 'script.lpm': No such file or directory`
    SourceRead(String),

    /// Reading a line from stdin failed (EOF handled separately by the REPL).
    StdinRead(String),
}

impl fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InterpreterError::SourceRead(msg) => write!(f, "No se pudo leer el archivo: {}", msg),
            InterpreterError::StdinRead(msg) => write!(f, "No se pudo leer la entrada: {}", msg),
        }
    }
}

impl Error for InterpreterError {}

impl From<std::io::Error> for InterpreterError {
    fn from(err: std::io::Error) -> Self {
        InterpreterError::SourceRead(err.to_string())
    }
}

/// Convenience alias for Results carrying an `InterpreterError`.
pub type Result<T> = std::result::Result<T, InterpreterError>;
