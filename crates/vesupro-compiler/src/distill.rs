//! Distiller: declaration AST to API model.
//!
//! Walks the method declarations of each source, keeps the exported ones
//! and resolves every parameter through the type rule table. Error codes
//! emitted:
//! - E200: unsupported parameter type (fatal)
//! - E201: variadic parameter (fatal)
//! - E202: unsupported result list (fatal)
//! - E203: generic receiver (fatal)
//! - E204: method named `Dispatch` (fatal)
//! - E205: parameter package named like a dispatcher local (fatal)
//! - W300: method declared twice on one receiver, later one kept
//! - W301: source belongs to another package, skipped
//!
//! Fatal errors abort distillation at the first occurrence. Sources that do
//! not parse are skipped and reported, the rest still contribute.

use std::fmt;

use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;
use vesupro_codegen::{is_reserved_name, DISPATCH_METHOD};
use vesupro_types::ast::{FuncDecl, ParamGroup, SourceDecls, TypeExpr};
use vesupro_types::{
    ApiModel, CompileErrors, ErrorCode, MethodSpec, PackageImport, ParameterSpec, ResultShape, SourceFile, Span,
    TypeRule, VesuproError,
};

/// Which receiver methods end up in the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFilter {
    /// Only methods whose doc group carries `// vesupro: export`.
    #[default]
    Marked,
    /// Every method with a receiver.
    AllMethods,
}

/// Whether a doc comment line is the export marker.
///
/// Matches `^//\s*vesupro:\s*export.*$`.
pub fn is_export_marker(line: &str) -> bool {
    line.strip_prefix("//")
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix("vesupro:"))
        .is_some_and(|rest| rest.trim_start().starts_with("export"))
}

/// Where a fatal error occurred.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub file: String,
    pub span: Span,
    pub source_line: String,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.span)
    }
}

/// A fatal distillation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistillError {
    #[error("{location}: unsupported type `{type_name}` for parameter {position} of {receiver}.{method}")]
    UnsupportedType {
        location: Location,
        receiver: String,
        method: String,
        position: usize,
        type_name: String,
    },

    #[error("{location}: variadic parameter `{type_name}` of {receiver}.{method} is not supported")]
    VariadicParameter {
        location: Location,
        receiver: String,
        method: String,
        type_name: String,
    },

    #[error("{location}: results `({results})` of {receiver}.{method} are not supported, expected at most a value and an error")]
    UnsupportedResults {
        location: Location,
        receiver: String,
        method: String,
        results: String,
    },

    #[error("{location}: generic receiver type {receiver} of {receiver}.{method} is not supported")]
    GenericReceiver {
        location: Location,
        receiver: String,
        method: String,
    },

    #[error("{location}: method {receiver}.{method} collides with the generated {method} method")]
    ReservedMethod {
        location: Location,
        receiver: String,
        method: String,
    },

    #[error("{location}: package name `{package}` of parameter {position} of {receiver}.{method} collides with a name the generated dispatcher declares")]
    ReservedPackageName {
        location: Location,
        receiver: String,
        method: String,
        position: usize,
        package: String,
    },
}

impl DistillError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DistillError::UnsupportedType { .. } => ErrorCode::UNSUPPORTED_TYPE,
            DistillError::VariadicParameter { .. } => ErrorCode::VARIADIC_PARAMETER,
            DistillError::UnsupportedResults { .. } => ErrorCode::UNSUPPORTED_RESULTS,
            DistillError::GenericReceiver { .. } => ErrorCode::GENERIC_RECEIVER,
            DistillError::ReservedMethod { .. } => ErrorCode::RESERVED_METHOD,
            DistillError::ReservedPackageName { .. } => ErrorCode::RESERVED_PACKAGE_NAME,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            DistillError::UnsupportedType { location, .. }
            | DistillError::VariadicParameter { location, .. }
            | DistillError::UnsupportedResults { location, .. }
            | DistillError::GenericReceiver { location, .. }
            | DistillError::ReservedMethod { location, .. }
            | DistillError::ReservedPackageName { location, .. } => location,
        }
    }

    /// The coded diagnostic for this error.
    pub fn to_diagnostic(&self) -> VesuproError {
        let location = self.location();
        let full = self.to_string();
        let prefix = format!("{location}: ");
        let message = full.strip_prefix(&prefix).unwrap_or(&full);
        VesuproError::new(
            location.file.clone(),
            self.code(),
            message,
            location.span,
            location.source_line.clone(),
        )
    }
}

/// A source left out of the model, with the reasons.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedSource {
    pub name: String,
    pub diagnostics: CompileErrors,
}

/// Everything the distiller learned.
#[derive(Debug, Clone)]
pub struct Distillation {
    /// `None` when no source was accepted.
    pub model: Option<ApiModel>,
    /// Names of the sources that contributed, in input order.
    pub accepted: Vec<String>,
    pub skipped: Vec<SkippedSource>,
    /// Non-fatal model diagnostics (W300).
    pub warnings: CompileErrors,
}

/// Builds an [`ApiModel`] one source at a time.
#[derive(Debug, Default)]
pub struct Distiller {
    filter: ExportFilter,
    model: Option<ApiModel>,
    accepted: Vec<String>,
    skipped: Vec<SkippedSource>,
    warnings: CompileErrors,
}

impl Distiller {
    pub fn new(filter: ExportFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Parse `source` and add its exported methods.
    pub fn distill_source(&mut self, source: &SourceFile) -> Result<(), DistillError> {
        let parsed = vesupro_parser::parse(source);
        let decls = match parsed.decls {
            Some(decls) if !parsed.errors.has_errors() => decls,
            _ => {
                warn!(
                    "skipping {}: {} syntax error(s)",
                    source.name, parsed.errors.total_errors
                );
                self.skipped.push(SkippedSource {
                    name: source.name.clone(),
                    diagnostics: parsed.errors,
                });
                return Ok(());
            }
        };

        if let Some(model) = &self.model {
            if model.package != decls.package.name {
                let message = format!(
                    "package `{}` does not match `{}`, source skipped",
                    decls.package.name, model.package
                );
                warn!("skipping {}: {message}", source.name);
                let mut diagnostics = CompileErrors::empty();
                diagnostics.push_warning(diagnostic(source, ErrorCode::PACKAGE_MISMATCH, message, decls.package.span));
                self.skipped.push(SkippedSource {
                    name: source.name.clone(),
                    diagnostics,
                });
                return Ok(());
            }
        }

        self.distill_decls(source, &decls)?;
        self.accepted.push(source.name.clone());
        Ok(())
    }

    /// Add the exported methods of already parsed declarations.
    pub fn distill_decls(&mut self, source: &SourceFile, decls: &SourceDecls) -> Result<(), DistillError> {
        let package = decls.package.name.clone();
        let mut methods = Vec::new();
        let mut imports = Vec::new();

        for func in decls.methods() {
            if self.filter == ExportFilter::Marked && !func.doc.iter().any(|line| is_export_marker(line)) {
                continue;
            }
            let Some(receiver) = &func.receiver else {
                continue;
            };
            let receiver = receiver.type_name.name.clone();
            let spec = MethodBuilder {
                source,
                decls,
                func,
                receiver: &receiver,
            }
            .build(&mut imports)?;
            methods.push((receiver, func.span, spec));
        }

        // nothing is recorded until the whole source distilled cleanly
        let model = self.model.get_or_insert_with(|| ApiModel::new(package));
        for import in imports {
            model.add_import(import);
        }
        for (receiver, span, spec) in methods {
            debug!("exporting {receiver}.{} ({} parameters)", spec.name, spec.arity());
            let name = spec.name.clone();
            if let Some(shadowed) = model.entry_mut(&receiver).upsert(spec) {
                let message = format!(
                    "method {receiver}.{name} is declared again; the declaration from {} is replaced",
                    shadowed.source
                );
                warn!("{}: {message}", source.name);
                self.warnings
                    .push_warning(diagnostic(source, ErrorCode::DUPLICATE_METHOD, message, span));
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Distillation {
        Distillation {
            model: self.model,
            accepted: self.accepted,
            skipped: self.skipped,
            warnings: self.warnings,
        }
    }
}

/// Distill every source in order, stopping at the first fatal error.
pub fn distill(sources: &[SourceFile], filter: ExportFilter) -> Result<Distillation, DistillError> {
    let mut distiller = Distiller::new(filter);
    for source in sources {
        distiller.distill_source(source)?;
    }
    Ok(distiller.finish())
}

fn diagnostic(source: &SourceFile, code: ErrorCode, message: String, span: Span) -> VesuproError {
    let line = source.line(span.start_line).unwrap_or_default();
    VesuproError::new(source.name.clone(), code, message, span, line)
}

// ══════════════════════════════════════════════════════════════════════════════
// Methods
// ══════════════════════════════════════════════════════════════════════════════

/// Predeclared names that are never aggregates behind a pointer.
const PREDECLARED: &[&str] = &["any", "comparable", "error", "uintptr"];

struct MethodBuilder<'a> {
    source: &'a SourceFile,
    decls: &'a SourceDecls,
    func: &'a FuncDecl,
    receiver: &'a str,
}

impl MethodBuilder<'_> {
    fn build(&self, imports: &mut Vec<PackageImport>) -> Result<MethodSpec, DistillError> {
        // the dispatcher is declared on the bare type name
        if let Some(decl) = self.func.receiver.as_ref().filter(|r| r.generic) {
            return Err(DistillError::GenericReceiver {
                location: self.location(decl.span),
                receiver: self.receiver.to_string(),
                method: self.func.name.name.clone(),
            });
        }
        if self.func.name.name == DISPATCH_METHOD {
            return Err(DistillError::ReservedMethod {
                location: self.location(self.func.name.span),
                receiver: self.receiver.to_string(),
                method: self.func.name.name.clone(),
            });
        }

        let mut parameters = Vec::with_capacity(self.func.param_count());
        for group in &self.func.params {
            let (type_name, rule) = self.classify(group, parameters.len(), imports)?;
            let names: Vec<&str> = if group.names.is_empty() {
                vec!["_"]
            } else {
                group.names.iter().map(|n| n.name.as_str()).collect()
            };
            for name in names {
                parameters.push(ParameterSpec::new(parameters.len(), name, type_name.clone(), rule));
            }
        }

        Ok(MethodSpec {
            name: self.func.name.name.clone(),
            parameters,
            results: self.result_shape()?,
            source: self.source.name.clone(),
        })
    }

    fn location(&self, span: Span) -> Location {
        Location {
            file: self.source.name.clone(),
            span,
            source_line: self.source.line(span.start_line).unwrap_or_default().to_string(),
        }
    }

    /// Resolve a parameter type to its declared name and rule.
    fn classify(
        &self,
        group: &ParamGroup,
        position: usize,
        imports: &mut Vec<PackageImport>,
    ) -> Result<(String, TypeRule), DistillError> {
        let unsupported = || DistillError::UnsupportedType {
            location: self.location(group.span),
            receiver: self.receiver.to_string(),
            method: self.func.name.name.clone(),
            position,
            type_name: group.ty.to_string(),
        };

        match &group.ty {
            TypeExpr::Named(name) => TypeRule::resolve(name)
                .map(|rule| (name.clone(), rule))
                .ok_or_else(unsupported),
            TypeExpr::Pointer(inner) => match inner.as_ref() {
                TypeExpr::Named(name)
                    if TypeRule::resolve(name).is_none() && !PREDECLARED.contains(&name.as_str()) =>
                {
                    Ok((name.clone(), TypeRule::Aggregate))
                }
                TypeExpr::Qualified { package, .. } if is_reserved_name(package) => {
                    Err(DistillError::ReservedPackageName {
                        location: self.location(group.span),
                        receiver: self.receiver.to_string(),
                        method: self.func.name.name.clone(),
                        position,
                        package: package.clone(),
                    })
                }
                TypeExpr::Qualified { package, name } => {
                    if let Some(import) = self.import_for(package) {
                        imports.push(import);
                    }
                    Ok((format!("{package}.{name}"), TypeRule::Aggregate))
                }
                _ => Err(unsupported()),
            },
            TypeExpr::Variadic(_) => Err(DistillError::VariadicParameter {
                location: self.location(group.span),
                receiver: self.receiver.to_string(),
                method: self.func.name.name.clone(),
                type_name: group.ty.to_string(),
            }),
            _ => Err(unsupported()),
        }
    }

    /// The import the generated file needs to name `package.T`.
    fn import_for(&self, package: &str) -> Option<PackageImport> {
        let import = self.decls.import_for(package)?;
        Some(PackageImport {
            path: import.path.clone(),
            alias: import.alias.clone(),
        })
    }

    fn result_shape(&self) -> Result<ResultShape, DistillError> {
        let types: Vec<&TypeExpr> = self
            .func
            .results
            .iter()
            .flat_map(|group| std::iter::repeat(&group.ty).take(group.arity()))
            .collect();
        let is_error = |ty: &TypeExpr| ty.as_named() == Some("error");

        match types.as_slice() {
            [] => Ok(ResultShape::None),
            [only] if is_error(only) => Ok(ResultShape::Error),
            [_] => Ok(ResultShape::Value),
            [value, err] if is_error(err) && !is_error(value) => Ok(ResultShape::ValueAndError),
            _ => {
                let span = self
                    .func
                    .results
                    .iter()
                    .map(|g| g.span)
                    .reduce(Span::merge)
                    .unwrap_or(self.func.span);
                Err(DistillError::UnsupportedResults {
                    location: self.location(span),
                    receiver: self.receiver.to_string(),
                    method: self.func.name.name.clone(),
                    results: types.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
                })
            }
        }
    }
}
