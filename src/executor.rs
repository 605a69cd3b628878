//! Executor: runs shell commands
//!
//! Commands go through `<shell> -c`. Standard output and standard error
//! share one pipe, so the captured text keeps the order the command wrote it.

use std::io::{self, BufRead, BufReader};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("Failed to spawn {shell}: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Captured combined output and exit code of one command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub output: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn new(output: impl Into<String>, exit_code: i32) -> Self {
        CommandOutput {
            output: output.into(),
            exit_code,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Something that can execute a shell command string
pub trait CommandRunner {
    fn run(&mut self, command: &str) -> Result<CommandOutput, ExecuteError>;
}

impl<F> CommandRunner for F
where
    F: FnMut(&str) -> Result<CommandOutput, ExecuteError>,
{
    fn run(&mut self, command: &str) -> Result<CommandOutput, ExecuteError> {
        self(command)
    }
}

/// Runs commands through a real shell
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
    /// Print each output line to stdout as it arrives
    echo: bool,
}

impl ShellRunner {
    pub fn new(shell: impl Into<String>, echo: bool) -> Self {
        ShellRunner {
            shell: shell.into(),
            echo,
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&mut self, command: &str) -> Result<CommandOutput, ExecuteError> {
        info!("[RUNNING] {}", command);

        let (reader, writer) = io::pipe()?;
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(writer.try_clone()?)
            .stderr(writer);

        let mut child = cmd.spawn().map_err(|source| ExecuteError::Spawn {
            shell: self.shell.clone(),
            source,
        })?;
        // The command still owns write ends of the pipe; EOF never arrives until they close
        drop(cmd);

        let mut reader = BufReader::new(reader);
        let mut lines = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf).trim_end().to_string();
            if self.echo {
                println!("{}", line);
            }
            lines.push(line);
        }

        let status = child.wait()?;
        Ok(CommandOutput {
            output: lines.join("\n"),
            exit_code: status.code().unwrap_or(-1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh() -> ShellRunner {
        ShellRunner::new("sh", false)
    }

    #[test]
    fn execute_simple_command() {
        let result = sh().run("echo hello").unwrap();
        assert!(result.success());
        assert_eq!(result.output, "hello");
    }

    #[test]
    fn stderr_is_merged_in_order() {
        let result = sh().run("echo one; echo two 1>&2; echo three").unwrap();
        assert_eq!(result.output, "one\ntwo\nthree");
    }

    #[test]
    fn exit_code_is_reported() {
        let result = sh().run("echo partial; exit 3").unwrap();
        assert_eq!(result.exit_code, 3);
        assert!(!result.success());
        assert_eq!(result.output, "partial");
    }

    #[test]
    fn trailing_whitespace_is_trimmed_per_line() {
        let result = sh().run("printf 'a  \\nb\\t\\n'").unwrap();
        assert_eq!(result.output, "a\nb");
    }

    #[test]
    fn missing_shell_fails_to_spawn() {
        let err = ShellRunner::new("/definitely/not/a/shell", false)
            .run("true")
            .unwrap_err();
        assert!(matches!(err, ExecuteError::Spawn { .. }));
    }

    #[test]
    fn closures_are_runners() {
        let mut seen = Vec::new();
        let mut runner = |cmd: &str| {
            seen.push(cmd.to_string());
            Ok::<_, ExecuteError>(CommandOutput::new("ok", 0))
        };
        assert_eq!(runner.run("x").unwrap().output, "ok");
        drop(runner);
        assert_eq!(seen, vec!["x"]);
    }
}
