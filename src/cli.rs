use auryn::Config;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "auryn")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run declarative shell pipelines", long_about = None)]
pub(crate) struct Args {
    /// Script to run
    #[arg(value_name = "SCRIPT")]
    pub(crate) script: PathBuf,

    /// Trace constant resolution, parser calls and stream/file writes
    #[arg(long)]
    pub(crate) debug: bool,

    /// Directory holding parser scripts [env: AURYN_PARSER_DIR]
    #[arg(long, value_name = "DIR")]
    pub(crate) parsers: Option<PathBuf>,

    /// Shell used to run commands [env: AURYN_SHELL]
    #[arg(long, value_name = "SHELL")]
    pub(crate) shell: Option<String>,

    /// Print every named stream as JSON when the run finishes
    #[arg(long = "dump-streams")]
    pub(crate) dump_streams: bool,
}

impl Args {
    /// Environment configuration with command-line overrides applied
    pub(crate) fn config(&self) -> Config {
        let mut config = Config::from_env().with_echo(true);
        if let Some(dir) = &self.parsers {
            config = config.with_parser_dir(dir);
        }
        if let Some(shell) = &self.shell {
            config = config.with_shell(shell);
        }
        config
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise `info`, or `debug` for auryn with `--debug`.
pub(crate) fn init_tracing(debug: bool) {
    let default = if debug { "info,auryn=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn script_is_required() {
        assert!(Args::try_parse_from(["auryn"]).is_err());
    }

    #[test]
    fn flags_parse() {
        let args = Args::try_parse_from([
            "auryn",
            "scan.auryn",
            "--debug",
            "--parsers",
            "my-parsers",
            "--dump-streams",
        ])
        .unwrap();
        assert_eq!(args.script, PathBuf::from("scan.auryn"));
        assert!(args.debug);
        assert!(args.dump_streams);
        assert_eq!(args.config().parser_dir, PathBuf::from("my-parsers"));
        assert!(args.config().echo_output);
    }
}
