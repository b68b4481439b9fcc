//! Argument handling and reporting for the `vesupro-gen` binary.

use std::path::PathBuf;

use log::LevelFilter;
use vesupro_codegen::ArgumentSource;
use vesupro_compiler::{generate_sources, load_sources, run, ExportFilter, GenerateConfig, GenerateError, RunReport};
use vesupro_types::{ApiModel, VesuproError};

#[derive(clap::Parser, Debug, Clone)]
#[command(name = "vesupro-gen", author, version, about, long_about = None)]
pub struct Args {
    /// Go source file or package directory
    #[arg(value_parser)]
    pub input: PathBuf,

    /// Output file. Defaults to `<input>_vesupro.go`, or
    /// `vesupro_dispatch.go` inside a package directory.
    #[arg(value_parser)]
    pub output: Option<PathBuf>,

    /// Generate dispatchers taking `[]vesupro.Value` instead of a tokenizer
    #[arg(long, default_value_t = false)]
    pub listed: bool,

    /// Export every method with a receiver, marked or not
    #[arg(long, default_value_t = false)]
    pub all_methods: bool,

    /// Print the API model as JSON and exit without writing
    #[arg(long, default_value_t = false)]
    pub emit_model: bool,

    /// Report results and diagnostics as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn to_config(&self) -> GenerateConfig {
        GenerateConfig {
            source: if self.listed {
                ArgumentSource::Listed
            } else {
                ArgumentSource::Streamed
            },
            filter: if self.all_methods {
                ExportFilter::AllMethods
            } else {
                ExportFilter::Marked
            },
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// What a successful invocation produced.
#[derive(Debug)]
pub enum Outcome {
    Written(RunReport),
    Model(ApiModel),
}

/// Carry out the command described by `args`.
pub fn execute(args: &Args) -> Result<Outcome, GenerateError> {
    let config = args.to_config();
    if args.emit_model {
        let sources = load_sources(&args.input)?;
        let generated = generate_sources(&sources, &config)?;
        return Ok(Outcome::Model(generated.model));
    }
    run(&args.input, args.output.as_deref(), &config).map(Outcome::Written)
}

/// Text printed to stdout for a successful invocation.
pub fn render_outcome(outcome: &Outcome, json: bool) -> Result<Option<String>, serde_json::Error> {
    match outcome {
        Outcome::Model(model) => serde_json::to_string_pretty(model).map(Some),
        Outcome::Written(report) if json => serde_json::to_string_pretty(report).map(Some),
        Outcome::Written(_) => Ok(None),
    }
}

/// Coded diagnostics behind a failure, if it has any.
pub fn diagnostics(err: &GenerateError) -> Vec<VesuproError> {
    match err {
        GenerateError::Distill(err) => vec![err.to_diagnostic()],
        GenerateError::NoSources { skipped } => skipped
            .iter()
            .flat_map(|s| s.diagnostics.errors.iter().chain(&s.diagnostics.warnings))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Human-readable report of a failure for stderr.
pub fn render_error(err: &GenerateError) -> String {
    let mut out = format!("error: {err}");
    for diagnostic in diagnostics(err) {
        out.push_str(&format!("\n{diagnostic}"));
        if !diagnostic.source_line.is_empty() {
            out.push_str(&format!("\n    {}", diagnostic.source_line));
        }
    }
    out
}

/// JSON report of a failure.
pub fn render_error_json(err: &GenerateError) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "error": err.to_string(),
        "diagnostics": diagnostics(err),
    }))
}
