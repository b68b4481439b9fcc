//! `vesupro-gen`: generates Go dispatch routines for methods marked
//! `// vesupro: export`.

use std::process::ExitCode;

use clap::Parser;
use log::{error, warn};
use vesupro_cli::{execute, render_error, render_error_json, render_outcome, Args, Outcome};

fn main() -> ExitCode {
    let args = Args::parse();

    let mut builder = colog::default_builder();
    builder.filter_level(args.log_level());
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();

    match execute(&args) {
        Ok(outcome) => {
            if let Outcome::Written(report) = &outcome {
                for warning in &report.warnings.warnings {
                    warn!("{warning}");
                }
            }
            match render_outcome(&outcome, args.json) {
                Ok(Some(text)) => println!("{text}"),
                Ok(None) => {}
                Err(err) => {
                    error!("failed to serialize output: {err}");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            if args.json {
                match render_error_json(&err) {
                    Ok(text) => println!("{text}"),
                    Err(json_err) => error!("failed to serialize diagnostics: {json_err}"),
                }
            }
            eprintln!("{}", render_error(&err));
            ExitCode::FAILURE
        }
    }
}
