//! Interpreter configuration
//!
//! Defaults can be overridden through the environment:
//!
//! | variable                  | field                |
//! |---------------------------|----------------------|
//! | `AURYN_PARSER_DIR`        | `parser_dir`         |
//! | `AURYN_SHELL`             | `shell`              |
//! | `AURYN_PARSER_SHELL`      | `parser_shell`       |
//! | `AURYN_MAX_SUBSTITUTIONS` | `substitution_limit` |

use crate::constants::DEFAULT_SUBSTITUTION_LIMIT;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding parser scripts
    pub parser_dir: PathBuf,
    /// Extension of parser scripts, without the dot
    pub parser_extension: String,
    /// Interpreter used to run parser scripts
    pub parser_shell: String,
    /// Shell used for `run`/`map` commands (invoked as `<shell> -c`)
    pub shell: String,
    /// Passes allowed for constant substitution to settle
    pub substitution_limit: usize,
    /// Echo command output to stdout while it is captured
    pub echo_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            parser_dir: PathBuf::from("parsers"),
            parser_extension: "sh".to_string(),
            parser_shell: "bash".to_string(),
            shell: "sh".to_string(),
            substitution_limit: DEFAULT_SUBSTITUTION_LIMIT,
            echo_output: false,
        }
    }
}

impl Config {
    /// Defaults, overridden by whatever `AURYN_*` variables are set
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        Config {
            parser_dir: lookup("AURYN_PARSER_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.parser_dir),
            shell: lookup("AURYN_SHELL").unwrap_or(defaults.shell),
            parser_shell: lookup("AURYN_PARSER_SHELL").unwrap_or(defaults.parser_shell),
            substitution_limit: lookup("AURYN_MAX_SUBSTITUTIONS")
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.substitution_limit),
            ..defaults
        }
    }

    pub fn with_parser_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.parser_dir = dir.into();
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo_output = echo;
        self
    }
}
