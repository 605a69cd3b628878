use super::{FailureKind, Interpreter, RunReport};
use crate::ast::RunInstruction;
use crate::resolver::ParserError;
use tracing::warn;

/// `cat` with nothing to read waits on the terminal forever
const BLOCKING_COMMAND: &str = "cat";

/// Split captured output into result lines
pub(crate) fn split_output(output: &str) -> Vec<String> {
    output.trim().lines().map(String::from).collect()
}

impl Interpreter {
    /// `run "<command>" [parsewith P] [output "<path>"] [as $name]`
    pub(crate) fn eval_run(&mut self, line: usize, run: &RunInstruction, report: &mut RunReport) {
        let Some(output) = self.execute_command(line, &run.command, report) else {
            return;
        };

        let lines = match &run.clauses.parser {
            Some(parser) => match self.apply_parser(line, parser, &output, report) {
                Some(lines) => lines,
                None => return,
            },
            None => split_output(&output),
        };

        self.deliver(line, &run.clauses, lines, report);
    }

    /// Run one command, returning its output only if it succeeded
    pub(crate) fn execute_command(
        &mut self,
        line: usize,
        command: &str,
        report: &mut RunReport,
    ) -> Option<String> {
        if command.trim() == BLOCKING_COMMAND {
            warn!(
                "line {}: command 'cat' has no input redirection and would hang; skipping",
                line
            );
            report.skip(line);
            return None;
        }

        report.commands_run += 1;
        match self.runner.run(command) {
            Ok(result) if result.success() => Some(result.output),
            Ok(result) => {
                report.fail(
                    line,
                    FailureKind::CommandFailed {
                        command: command.to_string(),
                        code: result.exit_code,
                    },
                );
                None
            }
            Err(source) => {
                report.fail(
                    line,
                    FailureKind::Spawn {
                        command: command.to_string(),
                        source,
                    },
                );
                None
            }
        }
    }

    /// Pipe `input` through a parser.
    ///
    /// A parser that runs and fails yields no lines; one that cannot be
    /// found or started abandons the statement (`None`).
    pub(crate) fn apply_parser(
        &mut self,
        line: usize,
        parser: &str,
        input: &str,
        report: &mut RunReport,
    ) -> Option<Vec<String>> {
        match self.parsers.invoke(parser, input) {
            Ok(lines) => Some(lines),
            Err(e @ ParserError::Failed { .. }) => {
                report.fail(line, FailureKind::Parser(e));
                Some(Vec::new())
            }
            Err(e) => {
                report.fail(line, FailureKind::Parser(e));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_output_trims_surrounding_blank_lines() {
        assert_eq!(split_output("\n\na\nb\n\n"), vec!["a", "b"]);
        assert!(split_output("").is_empty());
        assert_eq!(split_output("a\n\nb"), vec!["a", "", "b"]);
    }
}
