//! vesupro-gen compiler: orchestrates the generation pipeline.
//!
//! ```text
//! Go sources → Lexer → Parser → Distiller → ApiModel → Dispatcher Generator → *_vesupro.go
//! ```
//!
//! [`generate_sources`] is the in-memory pipeline; [`run`] adds input
//! discovery, output naming and the staged write.

pub mod distill;
pub mod output;

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use vesupro_codegen::{generate_with, ArgumentSource, CodegenError, GenerateOptions};
use vesupro_types::{ApiModel, CompileErrors, SourceFile};

pub use distill::{distill, is_export_marker, DistillError, Distillation, Distiller, ExportFilter, SkippedSource};
pub use output::{default_output_path, scan_package, write_staged};

/// Pipeline settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateConfig {
    pub source: ArgumentSource,
    pub filter: ExportFilter,
}

/// Why a run produced no output.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no source could be parsed ({} skipped)", .skipped.len())]
    NoSources { skipped: Vec<SkippedSource> },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Distill(#[from] DistillError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

/// Result of the in-memory pipeline.
#[derive(Debug, Clone)]
pub struct Generated {
    /// Rendered Go source.
    pub code: String,
    pub model: ApiModel,
    pub skipped: Vec<SkippedSource>,
    pub warnings: CompileErrors,
}

/// Summary of a [`run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub output: PathBuf,
    pub receivers: usize,
    pub methods: usize,
    pub skipped: Vec<SkippedSource>,
    pub warnings: CompileErrors,
    #[serde(skip)]
    pub model: ApiModel,
}

/// First 12 hex digits of the SHA-256 of `text`.
pub fn fingerprint(text: &str) -> String {
    Sha256::digest(text.as_bytes())
        .iter()
        .take(6)
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Distill `sources` and render the dispatchers.
///
/// The header names every contributing source with its fingerprint.
pub fn generate_sources(sources: &[SourceFile], config: &GenerateConfig) -> Result<Generated, GenerateError> {
    let distillation = distill(sources, config.filter)?;
    let Some(model) = distillation.model else {
        return Err(GenerateError::NoSources {
            skipped: distillation.skipped,
        });
    };

    let header = sources
        .iter()
        .filter(|s| distillation.accepted.contains(&s.name))
        .map(|s| format!("source: {} sha256:{}", display_name(&s.name), fingerprint(&s.source)))
        .collect();
    let options = GenerateOptions {
        source: config.source,
        header,
    };
    let code = generate_with(&model, &options)?;

    Ok(Generated {
        code,
        model,
        skipped: distillation.skipped,
        warnings: distillation.warnings,
    })
}

/// [`generate_sources`] for a single in-memory source.
pub fn generate_source(name: &str, text: &str, config: &GenerateConfig) -> Result<Generated, GenerateError> {
    generate_sources(&[SourceFile::new(name, text)], config)
}

/// Generate from a file or package directory and write the result.
///
/// `output` defaults to [`default_output_path`]. Nothing is written unless
/// generation succeeded.
pub fn run(input: &Path, output: Option<&Path>, config: &GenerateConfig) -> Result<RunReport, GenerateError> {
    let sources = load_sources(input)?;
    let generated = generate_sources(&sources, config)?;

    let output = output.map_or_else(|| default_output_path(input), Path::to_path_buf);
    write_staged(&output, &generated.code).map_err(|source| GenerateError::Write {
        path: output.clone(),
        source,
    })?;
    info!(
        "wrote {} ({} methods on {} receivers)",
        output.display(),
        generated.model.method_count(),
        generated.model.entries.len()
    );

    Ok(RunReport {
        output,
        receivers: generated.model.entries.len(),
        methods: generated.model.method_count(),
        skipped: generated.skipped,
        warnings: generated.warnings,
        model: generated.model,
    })
}

/// Read a single source file, or every package source of a directory.
pub fn load_sources(input: &Path) -> Result<Vec<SourceFile>, GenerateError> {
    let paths = if input.is_dir() {
        scan_package(input).map_err(|source| GenerateError::Read {
            path: input.to_path_buf(),
            source,
        })?
    } else {
        vec![input.to_path_buf()]
    };

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path).map_err(|source| GenerateError::Read {
            path: path.clone(),
            source,
        })?;
        sources.push(SourceFile::new(path.display().to_string(), text));
    }
    Ok(sources)
}

/// File name of a source path, for the generated header.
fn display_name(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name)
}
