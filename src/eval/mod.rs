//! Interpreter for auryn scripts
//!
//! A run has two phases:
//!
//! 1. **Compile**: constant declarations are resolved into the constant
//!    table, then every other logical line is substituted and parsed into a
//!    typed [`Instruction`]. Violations of global rules (constant ordering,
//!    circular or unresolved constants, single-quoted bodies that try to
//!    interpolate, malformed `input` statements) stop the run here, before
//!    any command has executed.
//! 2. **Execute**: statements run one at a time in source order. Failures
//!    that only concern one statement (a parse error, a failing command, a
//!    failing parser) are recorded in the [`RunReport`] and the run moves on.
//!
//! The interpreter owns all mutable state (constants and named streams),
//! so independent runs never share anything.

mod command;
mod input;
mod map;
mod sink;

use crate::ast::Instruction;
use crate::config::Config;
use crate::constants::{is_declaration, parse_declaration, ConstantError, ConstantTable};
use crate::executor::{CommandRunner, ExecuteError, ShellRunner};
use crate::parser::{parse_statement, ParseError};
use crate::resolver::{ParserError, ParserInvoker, ScriptParsers};
use crate::source::{split_source, LogicalLine};
use crate::streams::StreamStore;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error};

/// Constant whose value is created as a directory when declared
pub const OUTPUT_DIR: &str = "OUTPUT_DIR";

/// Errors that abort a run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("line {line}: {source}")]
    Constant {
        line: usize,
        #[source]
        source: ConstantError,
    },
    #[error("line {line}: {source}")]
    Statement {
        line: usize,
        #[source]
        source: ParseError,
    },
    #[error("line {line}: cannot create OUTPUT_DIR {}: {source}", .path.display())]
    OutputDir {
        line: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: cannot read input file {}: {source}", .path.display())]
    InputFile {
        line: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read script {}: {source}", .path.display())]
    Script {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RunError {
    /// Source line of the offending statement, if there is one
    pub fn line(&self) -> Option<usize> {
        match self {
            RunError::Constant { line, .. }
            | RunError::Statement { line, .. }
            | RunError::OutputDir { line, .. }
            | RunError::InputFile { line, .. } => Some(*line),
            RunError::Script { .. } => None,
        }
    }
}

/// Why a single statement (or one `map` combination) did not complete
#[derive(Error, Debug)]
pub enum FailureKind {
    #[error("could not parse statement: {0}")]
    Parse(ParseError),
    #[error("command failed with exit code {code}: {command}")]
    CommandFailed { command: String, code: i32 },
    #[error("could not run command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: ExecuteError,
    },
    #[error("{0}")]
    Parser(ParserError),
    #[error("cannot append to {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// A recovered failure and where it happened
#[derive(Debug)]
pub struct StatementFailure {
    pub line: usize,
    pub kind: FailureKind,
}

impl fmt::Display for StatementFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

/// Summary of a completed run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Commands handed to the command runner
    pub commands_run: usize,
    /// Statement-local failures, in the order they happened
    pub failures: Vec<StatementFailure>,
    /// Lines whose command was refused without running
    pub skipped: Vec<usize>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }

    pub(crate) fn fail(&mut self, line: usize, kind: FailureKind) {
        error!("line {}: {}", line, kind);
        self.failures.push(StatementFailure { line, kind });
    }

    pub(crate) fn skip(&mut self, line: usize) {
        if self.skipped.last() != Some(&line) {
            self.skipped.push(line);
        }
    }
}

/// A compiled statement: its source line, substituted text and parse result
#[derive(Debug, Clone)]
pub struct Statement {
    pub line: usize,
    pub text: String,
    pub instruction: Result<Instruction, ParseError>,
}

/// One interpreter session
pub struct Interpreter {
    pub(crate) config: Config,
    pub(crate) constants: ConstantTable,
    pub(crate) streams: StreamStore,
    pub(crate) runner: Box<dyn CommandRunner>,
    pub(crate) parsers: Box<dyn ParserInvoker>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Interpreter {
    /// Interpreter that runs real shell commands and parser scripts
    pub fn new(config: Config) -> Self {
        let runner = ShellRunner::new(config.shell.clone(), config.echo_output);
        let parsers = ScriptParsers::new(
            config.parser_dir.clone(),
            config.parser_extension.clone(),
            config.parser_shell.clone(),
        );
        Self::with_collaborators(config, runner, parsers)
    }

    /// Interpreter with injected command runner and parsers
    pub fn with_collaborators(
        config: Config,
        runner: impl CommandRunner + 'static,
        parsers: impl ParserInvoker + 'static,
    ) -> Self {
        Interpreter {
            constants: ConstantTable::new(config.substitution_limit),
            streams: StreamStore::new(),
            runner: Box::new(runner),
            parsers: Box::new(parsers),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn constants(&self) -> &ConstantTable {
        &self.constants
    }

    pub fn streams(&self) -> &StreamStore {
        &self.streams
    }

    pub fn streams_mut(&mut self) -> &mut StreamStore {
        &mut self.streams
    }

    /// Run a script file
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> Result<RunReport, RunError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| RunError::Script {
            path: path.to_path_buf(),
            source,
        })?;
        self.run_source(&source)
    }

    /// Run script text
    pub fn run_source(&mut self, source: &str) -> Result<RunReport, RunError> {
        self.run_lines(&split_source(source))
    }

    /// Run already reconstructed logical lines
    pub fn run_lines(&mut self, lines: &[LogicalLine]) -> Result<RunReport, RunError> {
        let program = self.compile(lines)?;
        self.execute(&program)
    }

    /// Resolve constants and parse every statement without running anything.
    pub fn compile(&mut self, lines: &[LogicalLine]) -> Result<Vec<Statement>, RunError> {
        let mut program = Vec::new();

        for logical in lines {
            let line = logical.line;
            if is_declaration(&logical.text) {
                self.define_constant(logical)?;
                continue;
            }

            self.constants.seal();
            let text = self
                .constants
                .substitute(&logical.text)
                .map_err(|source| RunError::Constant { line, source })?;

            let instruction = parse_statement(&text);
            if let Err(e) = &instruction {
                if e.is_fatal() {
                    return Err(RunError::Statement {
                        line,
                        source: e.clone(),
                    });
                }
            }
            program.push(Statement {
                line,
                text,
                instruction,
            });
        }

        Ok(program)
    }

    fn define_constant(&mut self, logical: &LogicalLine) -> Result<(), RunError> {
        let line = logical.line;
        let constant_err = |source: ConstantError| RunError::Constant { line, source };

        let (name, raw) = parse_declaration(&logical.text).map_err(constant_err)?;
        let value = self.constants.define(&name, &raw).map_err(constant_err)?;

        if name == OUTPUT_DIR {
            fs::create_dir_all(value).map_err(|source| RunError::OutputDir {
                line,
                path: PathBuf::from(value),
                source,
            })?;
            debug!(dir = value, "ensured OUTPUT_DIR exists");
        }
        Ok(())
    }

    /// Execute compiled statements in order
    pub fn execute(&mut self, program: &[Statement]) -> Result<RunReport, RunError> {
        let mut report = RunReport::default();

        for statement in program {
            let line = statement.line;
            match &statement.instruction {
                Err(e) => report.fail(line, FailureKind::Parse(e.clone())),
                Ok(Instruction::Run(run)) => self.eval_run(line, run, &mut report),
                Ok(Instruction::Map(map)) => self.eval_map(line, map, &mut report),
                Ok(Instruction::InputMap(input)) => {
                    let map = self.load_input(line, input)?;
                    self.eval_map(line, &map, &mut report);
                }
            }
        }

        Ok(report)
    }
}
