//! Dispatcher generation: one Go `Dispatch` method per receiver type.
//!
//! Each dispatcher switches on the method name. A case validates and
//! converts every argument in declaration order, returning an error at the
//! first problem, then calls the method with each argument cast back to its
//! declared type. Arguments either arrive as a token stream read through
//! the runtime tokenizer ([`ArgumentSource::Streamed`]) or as a pre-split
//! slice of runtime values ([`ArgumentSource::Listed`]).

use log::debug;
use vesupro_types::{ApiEntry, ApiModel, Conversion, MethodSpec, ParameterSpec, ResultShape, TypeRule, WireKind};

use crate::error::{CodegenError, CodegenResult};
use crate::vs_line;
use crate::writer::SourceWriter;

/// First line of every generated file, in the form `go generate` tooling
/// recognises.
pub const GENERATED_MARKER: &str = "// Code generated by vesupro-gen. DO NOT EDIT.";

/// Import path of the Go runtime package.
pub const RUNTIME_IMPORT: &str = "github.com/d-s-d/vesupro";

/// Name of the generated method on every exported receiver.
pub const DISPATCH_METHOD: &str = "Dispatch";

const METHOD_NAME: &str = "methodName";
const TOKENIZER: &str = "t";
const ARGS: &str = "args";
const RECEIVER: &str = "r";

/// Whether `name` is already declared inside a generated file: a package
/// every file imports, or a local of the dispatcher body.
pub fn is_reserved_name(name: &str) -> bool {
    if [RECEIVER, METHOD_NAME, TOKENIZER, ARGS, "err", "fmt", "strconv", "vesupro"].contains(&name) {
        return true;
    }
    // fresh locals: tok, tok_N, argP, argP_N
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let suffix = |s: &str| s.is_empty() || s.strip_prefix('_').is_some_and(digits);
    if let Some(rest) = name.strip_prefix("tok") {
        return suffix(rest);
    }
    if let Some(rest) = name.strip_prefix("arg") {
        let (position, rest) = rest.split_at(rest.find('_').unwrap_or(rest.len()));
        return digits(position) && suffix(rest);
    }
    false
}

/// How arguments reach the generated dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArgumentSource {
    /// Read from a `vesupro.Tokenizer`, separated by `COMMA` tokens.
    #[default]
    Streamed,
    /// Delivered as `[]vesupro.Value`, already split.
    Listed,
}

/// Options for [`generate_with`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub source: ArgumentSource,
    /// Extra comment lines after the generated-code marker, without `//`.
    pub header: Vec<String>,
}

/// Render dispatchers for every receiver of `model`.
pub fn generate(model: &ApiModel, source: ArgumentSource) -> CodegenResult<String> {
    generate_with(
        model,
        &GenerateOptions {
            source,
            header: Vec::new(),
        },
    )
}

/// Render dispatchers with explicit options.
pub fn generate_with(model: &ApiModel, options: &GenerateOptions) -> CodegenResult<String> {
    let mut w = SourceWriter::new();

    w.line(GENERATED_MARKER);
    for line in &options.header {
        vs_line!(w, "// {line}");
    }
    w.blank_line();
    vs_line!(w, "package {}", model.package);

    let entries: Vec<&ApiEntry> = model.entries.iter().filter(|e| !e.methods.is_empty()).collect();
    if entries.is_empty() {
        return Ok(w.finish());
    }

    w.blank_line();
    write_imports(&mut w, model, options.source);

    for entry in entries {
        debug!(
            "generating dispatcher for {} ({} methods)",
            entry.receiver,
            entry.methods.len()
        );
        w.blank_line();
        write_dispatcher(&mut w, entry, options.source)?;
    }

    Ok(w.finish())
}

fn write_imports(w: &mut SourceWriter, model: &ApiModel, source: ArgumentSource) {
    w.line("import (");
    w.indent();
    w.line("\"fmt\"");
    if source == ArgumentSource::Streamed && model.needs_conversion() {
        w.line("\"strconv\"");
    }
    w.blank_line();
    vs_line!(w, "\"{RUNTIME_IMPORT}\"");
    for import in &model.imports {
        w.line(&import.spec());
    }
    w.unindent();
    w.line(")");
}

fn write_dispatcher(w: &mut SourceWriter, entry: &ApiEntry, source: ArgumentSource) -> CodegenResult<()> {
    let arguments = match source {
        ArgumentSource::Streamed => format!("{TOKENIZER} vesupro.Tokenizer"),
        ArgumentSource::Listed => format!("{ARGS} []vesupro.Value"),
    };
    w.open(&format!(
        "func ({RECEIVER} *{}) {DISPATCH_METHOD}({METHOD_NAME} string, {arguments}) (vesupro.VesuproObject, error)",
        entry.receiver
    ));
    vs_line!(w, "switch {METHOD_NAME} {{");

    for method in &entry.methods {
        check_method(entry, method)?;
        vs_line!(w, "case {:?}:", method.name);
        w.indent();
        w.reset_names();
        for fixed in [RECEIVER, METHOD_NAME, TOKENIZER, ARGS, "err"] {
            w.reserve(fixed, "");
        }
        let values = match source {
            ArgumentSource::Streamed => write_streamed_case(w, method),
            ArgumentSource::Listed => write_listed_case(w, method),
        };
        write_invocation(w, method, &values);
        w.unindent();
    }

    w.line("default:");
    w.indent();
    vs_line!(
        w,
        "return nil, fmt.Errorf(\"vesupro: unknown method %q\", {METHOD_NAME})"
    );
    w.unindent();
    w.line("}");
    w.close();
    Ok(())
}

/// Reject models the generator cannot render faithfully.
fn check_method(entry: &ApiEntry, method: &MethodSpec) -> CodegenResult<()> {
    for (idx, param) in method.parameters.iter().enumerate() {
        if param.position != idx {
            return Err(CodegenError::Internal(format!(
                "{}.{}: parameter at index {idx} has position {}",
                entry.receiver, method.name, param.position
            )));
        }
        if !param.is_aggregate() && param.accepted.is_empty() {
            return Err(CodegenError::NoAcceptedKinds {
                receiver: entry.receiver.clone(),
                method: method.name.clone(),
                position: param.position,
                type_name: param.type_name.clone(),
            });
        }
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════════════════════
// STREAMED
// ══════════════════════════════════════════════════════════════════════════════

/// Emit argument scanning for one case. Returns, per parameter, the name
/// holding its final value.
fn write_streamed_case(w: &mut SourceWriter, method: &MethodSpec) -> Vec<String> {
    let mut values = Vec::with_capacity(method.arity());
    for param in &method.parameters {
        if param.position > 0 {
            let tok = w.fresh("tok", "vesupro.Token");
            vs_line!(w, "{tok} := vesupro.Scan({TOKENIZER}, true)");
            w.open(&format!("if {tok} != vesupro.{}", WireKind::Separator));
            vs_line!(
                w,
                "return nil, fmt.Errorf(\"vesupro: method %s: expected {} before parameter {}, got %v\", {METHOD_NAME}, {tok})",
                WireKind::Separator,
                param.position
            );
            w.close();
        }

        let value = if param.is_aggregate() {
            write_streamed_aggregate(w, param)
        } else {
            write_streamed_primitive(w, param)
        };
        values.push(value);
    }
    values
}

fn write_streamed_primitive(w: &mut SourceWriter, param: &ParameterSpec) -> String {
    let tok = w.fresh("tok", "vesupro.Token");
    vs_line!(w, "{tok} := vesupro.Scan({TOKENIZER}, true)");

    let condition = param
        .accepted
        .iter()
        .map(|kind| format!("{tok} != vesupro.{kind}"))
        .collect::<Vec<_>>()
        .join(" && ");
    w.open(&format!("if {condition}"));
    vs_line!(
        w,
        "return nil, fmt.Errorf(\"vesupro: method %s: parameter {} of type {}: expected {}, got %v\", {METHOD_NAME}, {tok})",
        param.position,
        param.type_name,
        expected_kinds(&param.accepted)
    );
    w.close();

    let base = format!("arg{}", param.position);
    if param.rule == TypeRule::Bool {
        let arg = w.fresh(&base, "bool");
        vs_line!(w, "{arg} := {tok} == vesupro.{}", WireKind::True);
        return arg;
    }

    let text = w.fresh(&base, "string");
    vs_line!(w, "{text} := string({TOKENIZER}.CurrentToken())");

    let Some(conversion) = param.conversion() else {
        return text;
    };
    let (ty, call) = match conversion {
        Conversion::ParseUint { bits } => ("uint64", format!("strconv.ParseUint({text}, 10, {bits})")),
        Conversion::ParseInt { bits } => ("int64", format!("strconv.ParseInt({text}, 10, {bits})")),
        Conversion::ParseFloat { bits } => ("float64", format!("strconv.ParseFloat({text}, {bits})")),
    };
    let parsed = w.fresh(&base, ty);
    vs_line!(w, "{parsed}, err := {call}");
    w.open("if err != nil");
    vs_line!(
        w,
        "return nil, fmt.Errorf(\"vesupro: method %s: failed to parse %q as type {}: %v\", {METHOD_NAME}, {text}, err)",
        param.type_name
    );
    w.close();
    parsed
}

fn write_streamed_aggregate(w: &mut SourceWriter, param: &ParameterSpec) -> String {
    let base = format!("arg{}", param.position);
    vs_line!(w, "vesupro.Scan({TOKENIZER}, true)");
    let raw = w.fresh(&base, "[]byte");
    vs_line!(w, "{raw} := {TOKENIZER}.CurrentToken()");
    let value = w.fresh(&base, &format!("*{}", param.type_name));
    vs_line!(w, "{value} := &{}{{}}", param.type_name);
    w.open(&format!("if err := {value}.UnmarshalJSON({raw}); err != nil"));
    vs_line!(
        w,
        "return nil, fmt.Errorf(\"vesupro: method %s: failed to decode %q as type {}: %v\", {METHOD_NAME}, string({raw}), err)",
        param.type_name
    );
    w.close();
    value
}

/// `INT`, or `one of TRUE, FALSE`.
fn expected_kinds(kinds: &[WireKind]) -> String {
    match kinds {
        [single] => single.to_string(),
        many => format!(
            "one of {}",
            many.iter().map(WireKind::to_string).collect::<Vec<_>>().join(", ")
        ),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// LISTED
// ══════════════════════════════════════════════════════════════════════════════

fn write_listed_case(w: &mut SourceWriter, method: &MethodSpec) -> Vec<String> {
    let arity = method.arity();
    w.open(&format!("if len({ARGS}) != {arity}"));
    vs_line!(
        w,
        "return nil, fmt.Errorf(\"vesupro: method %s: expected {arity} arguments, got %d\", {METHOD_NAME}, len({ARGS}))"
    );
    w.close();

    let mut values = Vec::with_capacity(arity);
    for param in &method.parameters {
        let i = param.position;
        let base = format!("arg{i}");
        let failure = format!(
            "return nil, fmt.Errorf(\"vesupro: method %s: parameter {i} of type {}: %v\", {METHOD_NAME}, err)",
            param.type_name
        );

        let Some((ty, accessor)) = listed_accessor(param.rule) else {
            let value = w.fresh(&base, &format!("*{}", param.type_name));
            vs_line!(w, "{value} := &{}{{}}", param.type_name);
            w.open(&format!("if err := {ARGS}[{i}].Decode({value}); err != nil"));
            w.line(&failure);
            w.close();
            values.push(value);
            continue;
        };
        let value = w.fresh(&base, ty);
        vs_line!(w, "{value}, err := {ARGS}[{i}].{accessor}");
        w.open("if err != nil");
        w.line(&failure);
        w.close();
        values.push(value);
    }
    values
}

/// Go type and call of the `vesupro.Value` accessor for a rule. Aggregates
/// are decoded instead and have none.
fn listed_accessor(rule: TypeRule) -> Option<(&'static str, String)> {
    let accessor = match rule {
        TypeRule::Unsigned { bits } => ("uint64", format!("Uint({bits})")),
        TypeRule::Signed { bits } => ("int64", format!("Int({bits})")),
        TypeRule::Float { bits } => ("float64", format!("Float({bits})")),
        // real part only
        TypeRule::Complex { .. } => ("float64", "Float(64)".to_string()),
        TypeRule::Bool => ("bool", "Bool()".to_string()),
        TypeRule::Str => ("string", "String()".to_string()),
        TypeRule::Aggregate => return None,
    };
    Some(accessor)
}

// ══════════════════════════════════════════════════════════════════════════════
// Invocation
// ══════════════════════════════════════════════════════════════════════════════

fn write_invocation(w: &mut SourceWriter, method: &MethodSpec, values: &[String]) {
    let args = method
        .parameters
        .iter()
        .zip(values)
        .map(|(param, value)| cast(param, value))
        .collect::<Vec<_>>()
        .join(", ");
    let call = format!("{RECEIVER}.{}({args})", method.name);
    match method.results {
        ResultShape::ValueAndError => vs_line!(w, "return {call}"),
        ResultShape::Value => vs_line!(w, "return {call}, nil"),
        ResultShape::Error => vs_line!(w, "return nil, {call}"),
        ResultShape::None => {
            w.line(&call);
            w.line("return nil, nil");
        }
    }
}

/// Cast a converted value back to the declared parameter type.
fn cast(param: &ParameterSpec, value: &str) -> String {
    match param.rule {
        TypeRule::Aggregate => value.to_string(),
        TypeRule::Complex { bits: 64 } => format!("complex(float32({value}), 0)"),
        TypeRule::Complex { .. } => format!("complex({value}, 0)"),
        _ => format!("{}({value})", param.type_name),
    }
}
