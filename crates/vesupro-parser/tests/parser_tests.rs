//! Parser tests for Go declarations.
//!
//! Covers: package clause, receivers, parameter grouping, result lists,
//! type expressions, doc comment groups, skipped declarations, error
//! recovery, and the 100-iteration determinism test.

use vesupro_parser::parse;
use vesupro_types::ast::*;
use vesupro_types::{ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse_ok(source: &str) -> SourceDecls {
    let sf = SourceFile::new("test.go", source);
    let result = parse(&sf);
    assert!(
        !result.has_errors(),
        "unexpected errors: {:?}",
        result.errors.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>()
    );
    result.decls.expect("declarations")
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    let sf = SourceFile::new("test.go", source);
    parse(&sf).errors.errors.iter().map(|e| e.code).collect()
}

/// Parse `package p` followed by a single declaration and return it.
fn single_func(decl: &str) -> FuncDecl {
    let decls = parse_ok(&format!("package p\n\n{decl}\n"));
    assert_eq!(decls.funcs.len(), 1, "expected one func in {decl:?}");
    decls.funcs.into_iter().next().unwrap()
}

fn param_types(func: &FuncDecl) -> Vec<String> {
    func.params.iter().map(|g| g.ty.to_string()).collect()
}

fn param_names(func: &FuncDecl) -> Vec<Vec<String>> {
    func.params
        .iter()
        .map(|g| g.names.iter().map(|n| n.name.clone()).collect())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────
// Package clause
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_package_clause() {
    let decls = parse_ok("package widgets\n");
    assert_eq!(decls.package.name, "widgets");
    assert!(decls.funcs.is_empty());
}

#[test]
fn test_package_after_file_comment() {
    let decls = parse_ok("// Copyright notice.\n\n/* more */\npackage widgets\n");
    assert_eq!(decls.package.name, "widgets");
}

#[test]
fn test_missing_package_clause() {
    let sf = SourceFile::new("test.go", "func F() {}\n");
    let result = parse(&sf);
    assert!(result.decls.is_none());
    assert_eq!(result.errors.errors[0].code, ErrorCode::MISSING_PACKAGE_CLAUSE);
}

// ─────────────────────────────────────────────────────────────────────
// Receivers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_pointer_receiver() {
    let f = single_func("func (w *Widget) Ping() {}");
    let recv = f.receiver.expect("receiver");
    assert_eq!(recv.name.map(|n| n.name), Some("w".to_string()));
    assert_eq!(recv.type_name.name, "Widget");
    assert!(recv.by_reference);
}

#[test]
fn test_value_receiver() {
    let f = single_func("func (w Widget) Ping() {}");
    let recv = f.receiver.expect("receiver");
    assert_eq!(recv.type_name.name, "Widget");
    assert!(!recv.by_reference);
}

#[test]
fn test_unnamed_receivers() {
    let f = single_func("func (*Widget) Ping() {}");
    let recv = f.receiver.expect("receiver");
    assert!(recv.name.is_none());
    assert!(recv.by_reference);

    let f = single_func("func (Widget) Ping() {}");
    assert_eq!(f.receiver.map(|r| r.type_name.name), Some("Widget".to_string()));
}

#[test]
fn test_generic_receiver_strips_type_arguments() {
    let f = single_func("func (s *Set[K]) Add(k K) {}");
    let recv = f.receiver.expect("receiver");
    assert_eq!(recv.type_name.name, "Set");
    assert!(recv.generic);

    let f = single_func("func (s *Set) Add(k int) {}");
    assert!(!f.receiver.expect("receiver").generic);
}

#[test]
fn test_plain_function_has_no_receiver() {
    let decls = parse_ok("package p\nfunc New() *Widget { return nil }\nfunc (w *Widget) M() {}\n");
    assert_eq!(decls.funcs.len(), 2);
    assert!(decls.funcs[0].receiver.is_none());
    assert_eq!(decls.methods().count(), 1);
}

// ─────────────────────────────────────────────────────────────────────
// Parameters
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_grouped_parameters() {
    let f = single_func("func (w *Widget) Resize(width, height uint16, label string) {}");
    assert_eq!(param_names(&f), vec![vec!["width", "height"], vec!["label"]]);
    assert_eq!(param_types(&f), vec!["uint16", "string"]);
    assert_eq!(f.param_count(), 3);
}

#[test]
fn test_unnamed_parameters() {
    let f = single_func("func (w *Widget) Resize(uint16, uint16) {}");
    assert_eq!(param_names(&f), vec![Vec::<String>::new(), Vec::new()]);
    assert_eq!(f.param_count(), 2);
}

#[test]
fn test_parameters_across_lines() {
    let f = single_func(
        "func (w *Widget) Move(\n    x int, // horizontal\n    y int,\n) {}",
    );
    assert_eq!(param_names(&f), vec![vec!["x"], vec!["y"]]);
}

#[test]
fn test_pointer_and_qualified_parameters() {
    let f = single_func("func (w *Widget) Place(at *Point, origin *geo.Point) {}");
    assert_eq!(param_types(&f), vec!["*Point", "*geo.Point"]);
    assert!(matches!(
        &f.params[1].ty,
        TypeExpr::Pointer(inner) if **inner == TypeExpr::Qualified { package: "geo".into(), name: "Point".into() }
    ));
}

#[test]
fn test_variadic_parameter() {
    let f = single_func("func (w *Widget) Tag(prefix string, tags ...string) {}");
    assert!(matches!(f.params[1].ty, TypeExpr::Variadic(_)));
    assert_eq!(param_types(&f), vec!["string", "...string"]);
}

#[test]
fn test_array_name_versus_generic_type() {
    let f = single_func("func (w *Widget) Load(buf [4]byte) {}");
    assert_eq!(param_names(&f), vec![vec!["buf"]]);
    assert_eq!(param_types(&f), vec!["[4]byte"]);

    let f = single_func("func (w *Widget) Load(List[int]) {}");
    assert_eq!(param_names(&f), vec![Vec::<String>::new()]);
    assert_eq!(param_types(&f), vec!["List[int]"]);
}

#[test]
fn test_composite_parameter_types() {
    let f = single_func(
        "func (w *Widget) All(m map[string][]int, cb func(int) error, ch <-chan int, s struct{ X int }) {}",
    );
    assert_eq!(
        param_types(&f),
        vec!["map[string][]int", "func(int) error", "<-chan int", "struct{ X int }"]
    );
    assert!(matches!(f.params[1].ty, TypeExpr::Opaque(_)));
}

#[test]
fn test_mixed_named_and_unnamed_parameters() {
    assert_eq!(
        error_codes("package p\nfunc (w *Widget) M(x int, []byte) {}\n"),
        vec![ErrorCode::MIXED_PARAMETER_NAMES]
    );
    assert_eq!(
        error_codes("package p\nfunc (w *Widget) M(x int, y) {}\n"),
        vec![ErrorCode::MIXED_PARAMETER_NAMES]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_result_forms() {
    assert_eq!(single_func("func (w *Widget) A() {}").result_count(), 0);
    assert_eq!(single_func("func (w *Widget) A() error { return nil }").result_count(), 1);
    let f = single_func("func (w *Widget) A() (int, error) { return 0, nil }");
    assert_eq!(f.result_count(), 2);
    assert_eq!(f.results[1].ty.to_string(), "error");
    let f = single_func("func (w *Widget) A() (n, m int, err error) { return }");
    assert_eq!(f.result_count(), 3);
}

#[test]
fn test_declaration_without_body() {
    let f = single_func("func (w *Widget) Fast(n int) int");
    assert!(!f.has_body);
    assert_eq!(f.result_count(), 1);
}

#[test]
fn test_body_with_nested_braces_is_skipped() {
    let decls = parse_ok(
        "package p\nfunc (w *Widget) A() {\n\tif true {\n\t\tfor {}\n\t}\n\ts := \"}\"\n\t_ = s\n}\n\nfunc (w *Widget) B() {}\n",
    );
    let names: Vec<_> = decls.funcs.iter().map(|f| f.name.name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
}

// ─────────────────────────────────────────────────────────────────────
// Doc comments
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_doc_group_attached() {
    let f = single_func("// Ping checks liveness.\n// vesupro: export\nfunc (w *Widget) Ping() {}");
    assert_eq!(f.doc, vec!["// Ping checks liveness.", "// vesupro: export"]);
}

#[test]
fn test_blank_line_detaches_doc_group() {
    let f = single_func("// vesupro: export\n\nfunc (w *Widget) Ping() {}");
    assert!(f.doc.is_empty());
}

#[test]
fn test_trailing_comment_is_not_doc() {
    let decls = parse_ok(
        "package p\nfunc (w *Widget) A() {} // vesupro: export\nfunc (w *Widget) B() {}\n",
    );
    assert!(decls.funcs.iter().all(|f| f.doc.is_empty()));
}

#[test]
fn test_doc_not_carried_across_declarations() {
    let decls = parse_ok(
        "package p\n// vesupro: export\ntype Widget struct {\n\tw, h uint16\n}\nfunc (w *Widget) A() {}\n",
    );
    assert!(decls.funcs[0].doc.is_empty());
}

// ─────────────────────────────────────────────────────────────────────
// Skipped declarations
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_imports_types_vars_and_consts_are_skipped() {
    let decls = parse_ok(
        r#"package widgets

import (
	"fmt"
	"strings"
)

type Widget struct {
	name string
	size [2]uint16
}

var defaultWidget = Widget{
	name: "w",
}

const (
	MaxWidth = 1 << 16
	MinWidth = 1 +
		0
)

func (w *Widget) String() string { return fmt.Sprint(strings.ToUpper(w.name)) }
"#,
    );
    assert_eq!(decls.funcs.len(), 1);
    assert_eq!(decls.funcs[0].name.name, "String");
}

#[test]
fn test_imports_are_recorded() {
    let decls = parse_ok(
        "package p\n\nimport \"fmt\"\n\nimport (\n\tg \"example.com/geo\" // shapes\n\t_ \"embed\"; . \"math\"\n\t`example.com/color/v2`\n)\n",
    );
    let specs: Vec<_> = decls
        .imports
        .iter()
        .map(|i| (i.alias.as_deref(), i.path.as_str()))
        .collect();
    assert_eq!(
        specs,
        vec![
            (None, "fmt"),
            (Some("g"), "example.com/geo"),
            (Some("_"), "embed"),
            (Some("."), "math"),
            (None, "example.com/color/v2"),
        ]
    );
    assert_eq!(decls.import_for("g").map(|i| i.path.as_str()), Some("example.com/geo"));
    assert_eq!(decls.import_for("color").map(|i| i.path.as_str()), Some("example.com/color/v2"));
    assert!(decls.import_for("embed").is_none());
}

#[test]
fn test_bad_import_spec() {
    assert_eq!(
        error_codes("package p\nimport (\n\tfmt\n\t\"os\"\n)\n"),
        vec![ErrorCode::UNEXPECTED_TOKEN]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Errors & recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_recovers_at_next_declaration() {
    let sf = SourceFile::new(
        "test.go",
        "package p\nfunc (w *Widget) Bad(x int,, y int) {}\nfunc (w *Widget) Good() {}\n",
    );
    let result = parse(&sf);
    assert!(result.has_errors());
    let decls = result.decls.expect("declarations");
    assert_eq!(decls.funcs.len(), 1);
    assert_eq!(decls.funcs[0].name.name, "Good");
}

#[test]
fn test_unclosed_body() {
    assert_eq!(
        error_codes("package p\nfunc (w *Widget) A() {\n"),
        vec![ErrorCode::UNCLOSED_DELIMITER]
    );
}

#[test]
fn test_unclosed_parameter_list() {
    assert!(error_codes("package p\nfunc (w *Widget) A(x int\n")
        .contains(&ErrorCode::UNCLOSED_DELIMITER));
}

#[test]
fn test_lexer_errors_are_merged() {
    let codes = error_codes("package p\nvar s = \"open\n");
    assert_eq!(codes[0], ErrorCode::UNTERMINATED_LITERAL);
}

#[test]
fn test_spans_point_at_source() {
    let sf = SourceFile::new("test.go", "package p\n\nfunc (w *Widget) Resize(a uint16) {}\n");
    let decls = parse(&sf).decls.unwrap();
    let f = &decls.funcs[0];
    assert_eq!(f.name.span.start_line, 3);
    assert_eq!(sf.snippet(f.name.span), Some("Resize"));
    assert_eq!(sf.snippet(f.params[0].span), Some("a uint16"));
}

// ─────────────────────────────────────────────────────────────────────
// 100-iteration determinism test
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_parser_determinism_100_iterations() {
    let source = r#"package widgets

// vesupro: export
func (w *Widget) Resize(width, height uint16) error { return nil }

// vesupro: export
func (w *Widget) Place(at *Point, label string) (string, error) { return label, nil }
"#;
    let first = parse_ok(source);
    for _ in 0..100 {
        assert_eq!(parse_ok(source), first);
    }
}
