//! auryn - run declarative shell pipelines
//!
//! Usage:
//!   auryn script.auryn            Run a script
//!   auryn script.auryn --debug    Run with verbose tracing

mod cli;

use auryn::Interpreter;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = cli::Args::parse();
    cli::init_tracing(args.debug);

    let mut interp = Interpreter::new(args.config());
    let report = match interp.run_file(&args.script) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if !report.failures.is_empty() {
        eprintln!(
            "Finished with {} failed statement(s):",
            report.failures.len()
        );
        for failure in &report.failures {
            eprintln!("  {}", failure);
        }
    }

    if args.dump_streams {
        match serde_json::to_string_pretty(&interp.streams().to_json()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: cannot serialize streams: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
