use super::{FailureKind, Interpreter, RunReport};
use crate::ast::Clauses;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Append `lines` to `path`, one per line, creating parent directories.
pub(crate) fn append_lines(path: &Path, lines: &[String]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()
}

impl Interpreter {
    /// Hand a statement's result to its `as` stream and `output` file
    pub(crate) fn deliver(
        &mut self,
        line: usize,
        clauses: &Clauses,
        lines: Vec<String>,
        report: &mut RunReport,
    ) {
        if let Some(path) = &clauses.output {
            match append_lines(Path::new(path), &lines) {
                Ok(()) => debug!(file = %path, lines = lines.len(), "appended output"),
                Err(source) => report.fail(
                    line,
                    FailureKind::Output {
                        path: path.clone(),
                        source,
                    },
                ),
            }
        }

        if let Some(name) = &clauses.stream {
            self.streams.store(name, lines);
        }
    }
}
