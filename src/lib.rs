//! auryn - declarative shell pipelines
//!
//! # Overview
//!
//! auryn reads a small line-oriented script language that runs shell
//! commands, pipes their output through external parser scripts, keeps
//! results in named in-memory streams and appends them to files.
//!
//! ```text
//! # Constants come first and are substituted everywhere
//! __TARGETS__ = "targets.txt"
//! __OUTPUT_DIR__ = "out"
//!
//! # Run a command, parse it, keep the lines as a stream
//! run "cat __TARGETS__" as $hosts
//!
//! # One command per combination of stream values
//! map $hosts do "nmap -p 22 $hosts"
//!     parsewith OpenPorts
//!     output "__OUTPUT_DIR__/ssh.txt"
//!     as $ssh
//!
//! # Drive a map straight from a file, one line at a time
//! input "extra.txt" map $host do "ping -c1 {line}" output "__OUTPUT_DIR__/ping.txt"
//! ```
//!
//! Indented lines continue the statement above them. Every command runs to
//! completion before the next one starts.
//!
//! # Example
//!
//! ```rust
//! use auryn::{Config, Interpreter};
//!
//! let mut interp = Interpreter::new(Config::default());
//! let report = interp.run_source("run \"echo hello\" as $greeting").unwrap();
//! assert!(report.is_clean());
//! assert_eq!(interp.streams().lines("greeting"), ["hello".to_string()]);
//! ```

pub mod ast;
pub mod config;
pub mod constants;
pub mod eval;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod source;
pub mod streams;

// Re-export commonly used items
pub use ast::{
    Binding, Clauses, CommandText, InputMapInstruction, Instruction, MapInstruction, Quote,
    RunInstruction,
};
pub use config::Config;
pub use constants::{ConstantError, ConstantTable};
pub use eval::{FailureKind, Interpreter, RunError, RunReport, Statement, StatementFailure};
pub use executor::{CommandOutput, CommandRunner, ExecuteError, ShellRunner};
pub use lexer::{lex, LexError, Token};
pub use parser::{parse_statement, ParseError};
pub use resolver::{ParserError, ParserInvoker, ScriptParsers};
pub use source::{logical_lines, split_source, LogicalLine};
pub use streams::StreamStore;

/// Run a script with the default configuration
pub fn run(source: &str) -> Result<Interpreter, RunError> {
    let mut interp = Interpreter::new(Config::default());
    interp.run_source(source)?;
    Ok(interp)
}
