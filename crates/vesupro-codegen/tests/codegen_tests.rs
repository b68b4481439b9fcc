//! Integration tests for the dispatcher generator.
//!
//! Tests validate:
//! - File layout (marker, package clause, imports)
//! - Streamed cases: separator and kind checks, conversions, casts
//! - Listed cases: arity check and value accessors
//! - Result shapes and aggregates
//! - Deterministic output

use vesupro_codegen::{generate, generate_with, ArgumentSource, CodegenError, GenerateOptions, GENERATED_MARKER};
use vesupro_types::{ApiModel, MethodSpec, PackageImport, ParameterSpec, ResultShape, TypeRule, WireKind};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Build a method from `(name, type)` pairs; a leading `*` marks an aggregate.
fn method(name: &str, params: &[(&str, &str)], results: ResultShape) -> MethodSpec {
    MethodSpec {
        name: name.to_string(),
        parameters: params
            .iter()
            .enumerate()
            .map(|(i, (n, t))| match t.strip_prefix('*') {
                Some(inner) => ParameterSpec::new(i, *n, inner, TypeRule::Aggregate),
                None => ParameterSpec::new(
                    i,
                    *n,
                    *t,
                    TypeRule::resolve(t).unwrap_or_else(|| panic!("unsupported test type {t}")),
                ),
            })
            .collect(),
        results,
        source: "widget.go".to_string(),
    }
}

fn model_with(receiver: &str, methods: Vec<MethodSpec>) -> ApiModel {
    let mut model = ApiModel::new("widgets");
    for m in methods {
        model.entry_mut(receiver).upsert(m);
    }
    model
}

fn streamed(model: &ApiModel) -> String {
    generate(model, ArgumentSource::Streamed).unwrap_or_else(|e| panic!("codegen failed: {e}"))
}

fn listed(model: &ApiModel) -> String {
    generate(model, ArgumentSource::Listed).unwrap_or_else(|e| panic!("codegen failed: {e}"))
}

const RESIZE_GOLDEN: &str = r#"// Code generated by vesupro-gen. DO NOT EDIT.

package widgets

import (
    "fmt"
    "strconv"

    "github.com/d-s-d/vesupro"
)

func (r *Widget) Dispatch(methodName string, t vesupro.Tokenizer) (vesupro.VesuproObject, error) {
    switch methodName {
    case "Resize":
        tok := vesupro.Scan(t, true)
        if tok != vesupro.INT {
            return nil, fmt.Errorf("vesupro: method %s: parameter 0 of type uint16: expected INT, got %v", methodName, tok)
        }
        arg0 := string(t.CurrentToken())
        arg0_1, err := strconv.ParseUint(arg0, 10, 16)
        if err != nil {
            return nil, fmt.Errorf("vesupro: method %s: failed to parse %q as type uint16: %v", methodName, arg0, err)
        }
        tok_1 := vesupro.Scan(t, true)
        if tok_1 != vesupro.COMMA {
            return nil, fmt.Errorf("vesupro: method %s: expected COMMA before parameter 1, got %v", methodName, tok_1)
        }
        tok_2 := vesupro.Scan(t, true)
        if tok_2 != vesupro.INT {
            return nil, fmt.Errorf("vesupro: method %s: parameter 1 of type uint16: expected INT, got %v", methodName, tok_2)
        }
        arg1 := string(t.CurrentToken())
        arg1_1, err := strconv.ParseUint(arg1, 10, 16)
        if err != nil {
            return nil, fmt.Errorf("vesupro: method %s: failed to parse %q as type uint16: %v", methodName, arg1, err)
        }
        r.Resize(uint16(arg0_1), uint16(arg1_1))
        return nil, nil
    default:
        return nil, fmt.Errorf("vesupro: unknown method %q", methodName)
    }
}
"#;

// ══════════════════════════════════════════════════════════════════════════════
// File layout
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_resize_golden() {
    let model = model_with(
        "Widget",
        vec![method("Resize", &[("w", "uint16"), ("h", "uint16")], ResultShape::None)],
    );
    assert_eq!(streamed(&model), RESIZE_GOLDEN);
}

#[test]
fn test_empty_model_has_package_only() {
    let model = ApiModel::new("widgets");
    let out = streamed(&model);
    assert_eq!(out, format!("{GENERATED_MARKER}\n\npackage widgets\n"));
    assert!(!out.contains("import"));
    assert!(!out.contains("Dispatch"));
}

#[test]
fn test_header_lines_follow_marker() {
    let model = ApiModel::new("widgets");
    let options = GenerateOptions {
        source: ArgumentSource::Streamed,
        header: vec!["source: widget.go".to_string()],
    };
    let out = generate_with(&model, &options).unwrap();
    assert!(out.starts_with(&format!("{GENERATED_MARKER}\n// source: widget.go\n\npackage widgets")));
}

#[test]
fn test_strconv_only_when_converting() {
    let strings = model_with("Widget", vec![method("SetName", &[("n", "string")], ResultShape::None)]);
    let out = streamed(&strings);
    assert!(out.contains("\"fmt\""));
    assert!(!out.contains("strconv"));

    let ints = model_with("Widget", vec![method("SetSize", &[("n", "int")], ResultShape::None)]);
    assert!(streamed(&ints).contains("\"strconv\""));
    // listed dispatchers convert through the runtime values
    assert!(!listed(&ints).contains("strconv"));
}

#[test]
fn test_one_dispatcher_per_receiver_in_order() {
    let mut model = ApiModel::new("widgets");
    model.entry_mut("Widget").upsert(method("Ping", &[], ResultShape::None));
    model.entry_mut("Gadget").upsert(method("Ping", &[], ResultShape::None));
    model.entry_mut("Empty");
    let out = streamed(&model);

    let widget = out.find("func (r *Widget) Dispatch").expect("Widget dispatcher");
    let gadget = out.find("func (r *Gadget) Dispatch").expect("Gadget dispatcher");
    assert!(widget < gadget);
    assert!(!out.contains("*Empty"));
}

#[test]
fn test_qualified_aggregate_imports() {
    let mut model = model_with(
        "Widget",
        vec![method("MoveTo", &[("p", "*geo.Point")], ResultShape::Error)],
    );
    model.add_import(PackageImport {
        alias: None,
        path: "example.com/geo".to_string(),
    });
    model.add_import(PackageImport {
        alias: Some("col".to_string()),
        path: "example.com/color".to_string(),
    });
    let out = streamed(&model);
    assert!(out.contains(
        "    \"github.com/d-s-d/vesupro\"\n    col \"example.com/color\"\n    \"example.com/geo\"\n)"
    ));
    assert!(out.contains("arg0_1 := &geo.Point{}"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Streamed cases
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_separator_checks_between_parameters() {
    let params: Vec<(&str, &str)> = vec![("a", "int"), ("b", "string"), ("c", "bool"), ("d", "float64")];
    let model = model_with("Widget", vec![method("Many", &params, ResultShape::None)]);
    let out = streamed(&model);

    assert_eq!(out.matches("vesupro.COMMA").count(), params.len() - 1);
    assert_eq!(out.matches("vesupro.Scan(t, true)").count(), 2 * params.len() - 1);
    assert!(out.contains("expected COMMA before parameter 3"));
    assert!(!out.contains("expected COMMA before parameter 0"));
}

#[test]
fn test_no_parameters_scans_nothing() {
    let model = model_with("Widget", vec![method("Reset", &[], ResultShape::Error)]);
    let out = streamed(&model);
    assert!(!out.contains("vesupro.Scan"));
    assert!(out.contains("return nil, r.Reset()"));
}

#[test]
fn test_bool_accepts_either_literal() {
    let model = model_with("Widget", vec![method("Toggle", &[("on", "bool")], ResultShape::None)]);
    let out = streamed(&model);
    assert!(out.contains("if tok != vesupro.TRUE && tok != vesupro.FALSE {"));
    assert!(out.contains("expected one of TRUE, FALSE, got %v"));
    assert!(out.contains("arg0 := tok == vesupro.TRUE"));
    assert!(out.contains("r.Toggle(bool(arg0))"));
}

#[test]
fn test_string_is_passed_through() {
    let model = model_with("Widget", vec![method("SetName", &[("n", "string")], ResultShape::None)]);
    let out = streamed(&model);
    assert!(out.contains("if tok != vesupro.STRING {"));
    assert!(out.contains("arg0 := string(t.CurrentToken())"));
    assert!(out.contains("r.SetName(string(arg0))"));
}

#[test]
fn test_conversions_use_declared_widths() {
    let model = model_with(
        "Widget",
        vec![method(
            "Set",
            &[("a", "int8"), ("b", "uint"), ("c", "float32"), ("d", "rune"), ("e", "byte")],
            ResultShape::None,
        )],
    );
    let out = streamed(&model);
    assert!(out.contains("strconv.ParseInt(arg0, 10, 8)"));
    assert!(out.contains("strconv.ParseUint(arg1, 10, 0)"));
    assert!(out.contains("strconv.ParseFloat(arg2, 32)"));
    assert!(out.contains("strconv.ParseInt(arg3, 10, 0)"));
    assert!(out.contains("strconv.ParseUint(arg4, 10, 8)"));
    assert!(out.contains("r.Set(int8(arg0_1), uint(arg1_1), float32(arg2_1), rune(arg3_1), byte(arg4_1))"));
}

#[test]
fn test_complex_takes_real_part() {
    let model = model_with(
        "Widget",
        vec![method("Phase", &[("a", "complex64"), ("b", "complex128")], ResultShape::None)],
    );
    let out = streamed(&model);
    assert!(out.contains("strconv.ParseFloat(arg0, 64)"));
    assert!(out.contains("r.Phase(complex(float32(arg0_1), 0), complex(arg1_1, 0))"));
}

#[test]
fn test_aggregate_decodes_itself() {
    let model = model_with("Widget", vec![method("MoveTo", &[("p", "*Point")], ResultShape::Value)]);
    let out = streamed(&model);
    assert!(out.contains("arg0 := t.CurrentToken()"));
    assert!(out.contains("arg0_1 := &Point{}"));
    assert!(out.contains("if err := arg0_1.UnmarshalJSON(arg0); err != nil {"));
    assert!(out.contains("return r.MoveTo(arg0_1), nil"));
    // no kind restriction for aggregates
    assert!(!out.contains("tok !="));
}

#[test]
fn test_result_shapes() {
    let model = model_with(
        "Widget",
        vec![
            method("A", &[], ResultShape::None),
            method("B", &[], ResultShape::Value),
            method("C", &[], ResultShape::Error),
            method("D", &[], ResultShape::ValueAndError),
        ],
    );
    let out = streamed(&model);
    assert!(out.contains("        r.A()\n        return nil, nil\n"));
    assert!(out.contains("return r.B(), nil"));
    assert!(out.contains("return nil, r.C()"));
    assert!(out.contains("        return r.D()\n"));
}

#[test]
fn test_cases_in_declaration_order() {
    let model = model_with(
        "Widget",
        vec![
            method("Zeta", &[], ResultShape::None),
            method("Alpha", &[], ResultShape::None),
        ],
    );
    let out = streamed(&model);
    let zeta = out.find("case \"Zeta\":").unwrap();
    let alpha = out.find("case \"Alpha\":").unwrap();
    assert!(zeta < alpha);
    assert!(out.contains("    default:\n        return nil, fmt.Errorf(\"vesupro: unknown method %q\", methodName)"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Listed cases
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_listed_signature_and_arity() {
    let model = model_with(
        "Widget",
        vec![method("Resize", &[("w", "uint16"), ("h", "uint16")], ResultShape::None)],
    );
    let out = listed(&model);
    assert!(out.contains(
        "func (r *Widget) Dispatch(methodName string, args []vesupro.Value) (vesupro.VesuproObject, error) {"
    ));
    assert!(out.contains("if len(args) != 2 {"));
    assert!(out.contains("expected 2 arguments, got %d\", methodName, len(args))"));
    assert!(out.contains("arg0, err := args[0].Uint(16)"));
    assert!(out.contains("arg1, err := args[1].Uint(16)"));
    assert!(out.contains("r.Resize(uint16(arg0), uint16(arg1))"));
    assert!(!out.contains("vesupro.Scan"));
}

#[test]
fn test_listed_accessors_and_aggregates() {
    let model = model_with(
        "Widget",
        vec![method(
            "Mix",
            &[("a", "int32"), ("b", "float64"), ("c", "bool"), ("d", "string"), ("e", "*Point")],
            ResultShape::ValueAndError,
        )],
    );
    let out = listed(&model);
    assert!(out.contains("arg0, err := args[0].Int(32)"));
    assert!(out.contains("arg1, err := args[1].Float(64)"));
    assert!(out.contains("arg2, err := args[2].Bool()"));
    assert!(out.contains("arg3, err := args[3].String()"));
    assert!(out.contains("arg4 := &Point{}"));
    assert!(out.contains("if err := args[4].Decode(arg4); err != nil {"));
    assert!(out.contains("return r.Mix(int32(arg0), float64(arg1), bool(arg2), string(arg3), arg4)"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Errors & determinism
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_parameter_without_kinds_is_rejected() {
    let mut m = method("Broken", &[("x", "int")], ResultShape::None);
    m.parameters[0].accepted.clear();
    let model = model_with("Widget", vec![m]);
    match generate(&model, ArgumentSource::Streamed) {
        Err(CodegenError::NoAcceptedKinds { receiver, method, position, type_name }) => {
            assert_eq!(receiver, "Widget");
            assert_eq!(method, "Broken");
            assert_eq!(position, 0);
            assert_eq!(type_name, "int");
        }
        other => panic!("expected NoAcceptedKinds, got {other:?}"),
    }
}

#[test]
fn test_out_of_order_positions_are_internal_errors() {
    let mut m = method("Broken", &[("x", "int"), ("y", "int")], ResultShape::None);
    m.parameters.swap(0, 1);
    let model = model_with("Widget", vec![m]);
    let err = generate(&model, ArgumentSource::Listed).unwrap_err();
    assert!(matches!(err, CodegenError::Internal(_)));
}

#[test]
fn test_extra_accepted_kinds_widen_the_check() {
    let mut m = method("Count", &[("n", "int")], ResultShape::None);
    m.parameters[0].accepted.push(WireKind::Float);
    let out = streamed(&model_with("Widget", vec![m]));
    assert!(out.contains("if tok != vesupro.INT && tok != vesupro.FLOAT {"));
    assert!(out.contains("expected one of INT, FLOAT"));
}

#[test]
fn test_determinism_100_iterations() {
    let model = model_with(
        "Widget",
        vec![
            method("Resize", &[("w", "uint16"), ("h", "uint16")], ResultShape::None),
            method("MoveTo", &[("p", "*Point")], ResultShape::ValueAndError),
            method("Toggle", &[("on", "bool")], ResultShape::Error),
        ],
    );
    let reference = streamed(&model);
    for i in 0..100 {
        assert_eq!(streamed(&model), reference, "output diverged on iteration {i}");
    }
}
