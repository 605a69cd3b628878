//! Parser resolution and invocation
//!
//! A parser named `P` is a script at `<parser_dir>/<p>.<ext>`. It reads the
//! text to parse on stdin and writes one result per line on stdout.
//! Resolved paths are cached for the lifetime of the resolver.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Parser script not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Parser '{name}' failed with exit code {code}: {stderr}")]
    Failed {
        name: String,
        code: i32,
        stderr: String,
    },
    #[error("Failed to run parser '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Pipes text through a named parser
pub trait ParserInvoker {
    fn invoke(&mut self, name: &str, input: &str) -> Result<Vec<String>, ParserError>;
}

impl<F> ParserInvoker for F
where
    F: FnMut(&str, &str) -> Result<Vec<String>, ParserError>,
{
    fn invoke(&mut self, name: &str, input: &str) -> Result<Vec<String>, ParserError> {
        self(name, input)
    }
}

/// Parsers backed by script files in one directory
#[derive(Debug, Clone)]
pub struct ScriptParsers {
    dir: PathBuf,
    extension: String,
    shell: String,
    /// Cached name -> script path lookups
    cache: HashMap<String, PathBuf>,
}

impl ScriptParsers {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>, shell: impl Into<String>) -> Self {
        ScriptParsers {
            dir: dir.into(),
            extension: extension.into(),
            shell: shell.into(),
            cache: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the script for `name` is expected to live
    pub fn script_path(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", name.to_lowercase(), self.extension))
    }

    /// Find the script for `name`
    pub fn resolve(&mut self, name: &str) -> Result<PathBuf, ParserError> {
        let key = name.to_lowercase();
        if let Some(path) = self.cache.get(&key) {
            return Ok(path.clone());
        }

        let path = self.script_path(name);
        if !path.is_file() {
            return Err(ParserError::NotFound(path));
        }
        self.cache.insert(key, path.clone());
        Ok(path)
    }
}

impl ParserInvoker for ScriptParsers {
    fn invoke(&mut self, name: &str, input: &str) -> Result<Vec<String>, ParserError> {
        let script = self.resolve(name)?;
        debug!(parser = name, script = %script.display(), input_bytes = input.len(), "running parser");

        let io_err = |source: io::Error| ParserError::Io {
            name: name.to_string(),
            source,
        };

        let mut child = Command::new(&self.shell)
            .arg(&script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(io_err)?;

        // Feed stdin from another thread so a chatty parser can't fill its stdout and stall us
        let feeder = child.stdin.take().map(|mut stdin| {
            let input = input.to_string();
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child.wait_with_output().map_err(io_err)?;
        if let Some(handle) = feeder {
            // A parser may exit without reading its input; a broken pipe is not our failure
            let _ = handle.join();
        }

        if !output.status.success() {
            return Err(ParserError::Failed {
                name: name.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<String> = stdout.trim().lines().map(String::from).collect();
        debug!(parser = name, lines = lines.len(), "parser output");
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn parsers_with(scripts: &[(&str, &str)]) -> (tempfile::TempDir, ScriptParsers) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in scripts {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let parsers = ScriptParsers::new(dir.path(), "sh", "bash");
        (dir, parsers)
    }

    #[test]
    fn script_path_is_lowercased() {
        let parsers = ScriptParsers::new("parsers", "sh", "bash");
        assert_eq!(parsers.script_path("OpenPorts"), PathBuf::from("parsers/openports.sh"));
    }

    #[test]
    fn missing_script_is_not_found() {
        let (_dir, mut parsers) = parsers_with(&[]);
        let err = parsers.invoke("nothing", "text").unwrap_err();
        assert!(matches!(err, ParserError::NotFound(p) if p.ends_with("nothing.sh")));
    }

    #[test]
    fn parser_transforms_input_lines() {
        let (_dir, mut parsers) = parsers_with(&[("upper.sh", "tr a-z A-Z\n")]);
        let lines = parsers.invoke("Upper", "one\ntwo\n").unwrap();
        assert_eq!(lines, vec!["ONE", "TWO"]);
    }

    #[test]
    fn failing_parser_reports_stderr() {
        let (_dir, mut parsers) = parsers_with(&[("bad.sh", "echo broken >&2\nexit 4\n")]);
        match parsers.invoke("bad", "x").unwrap_err() {
            ParserError::Failed { name, code, stderr } => {
                assert_eq!(name, "bad");
                assert_eq!(code, 4);
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parser_that_ignores_input_still_succeeds() {
        let big = "line\n".repeat(100_000);
        let (_dir, mut parsers) = parsers_with(&[("const.sh", "echo fixed\n")]);
        assert_eq!(parsers.invoke("const", &big).unwrap(), vec!["fixed"]);
    }

    #[test]
    fn empty_output_is_empty() {
        let (_dir, mut parsers) = parsers_with(&[("quiet.sh", "cat > /dev/null\n")]);
        assert!(parsers.invoke("quiet", "a\nb").unwrap().is_empty());
    }

    #[test]
    fn resolved_paths_are_cached() {
        let (dir, mut parsers) = parsers_with(&[("keep.sh", "cat\n")]);
        let first = parsers.resolve("keep").unwrap();
        fs::remove_file(dir.path().join("keep.sh")).unwrap();
        assert_eq!(parsers.resolve("KEEP").unwrap(), first);
    }
}
