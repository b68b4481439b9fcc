//! Declaration AST for Go sources.
//!
//! Only the parts of a Go file the stub compiler needs survive parsing:
//! the package clause and every function declaration's signature, together
//! with the doc comment group attached to it. Bodies, imports and non-func
//! declarations are skipped by the parser.

use std::fmt;

use crate::Span;

/// All declarations of one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDecls {
    pub package: Ident,
    pub imports: Vec<ImportDecl>,
    pub funcs: Vec<FuncDecl>,
    pub span: Span,
}

impl SourceDecls {
    /// Function declarations with a receiver.
    pub fn methods(&self) -> impl Iterator<Item = &FuncDecl> {
        self.funcs.iter().filter(|f| f.receiver.is_some())
    }

    /// The import a qualifier such as `geo` in `geo.Point` refers to.
    pub fn import_for(&self, qualifier: &str) -> Option<&ImportDecl> {
        self.imports.iter().find(|i| i.local_name() == Some(qualifier))
    }
}

/// One import spec: `"fmt"`, `geo "example.com/geo/v2"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Explicit local name, including `_` and `.`.
    pub alias: Option<String>,
    /// Import path without quotes.
    pub path: String,
    pub span: Span,
}

impl ImportDecl {
    /// Name the package is referred to by in this file.
    ///
    /// Without an alias this is the last path element, skipping a trailing
    /// major version element (`/v2`). Blank and dot imports have none.
    pub fn local_name(&self) -> Option<&str> {
        match self.alias.as_deref() {
            Some("_") | Some(".") => None,
            Some(alias) => Some(alias),
            None => {
                let mut segments = self.path.rsplit('/');
                let last = segments.next()?;
                let is_version = last.len() > 1
                    && last.starts_with('v')
                    && last[1..].bytes().all(|b| b.is_ascii_digit());
                if is_version {
                    segments.next().or(Some(last))
                } else {
                    Some(last)
                }
            }
        }
    }
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// `func (recv) Name(params) results { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: Ident,
    pub receiver: Option<Receiver>,
    pub params: Vec<ParamGroup>,
    pub results: Vec<ParamGroup>,
    /// Line comments directly above the declaration, `//` included.
    pub doc: Vec<String>,
    pub has_body: bool,
    pub span: Span,
}

impl FuncDecl {
    /// Number of formal parameters, counting every name of a group.
    pub fn param_count(&self) -> usize {
        self.params.iter().map(ParamGroup::arity).sum()
    }

    /// Number of results, counting every name of a group.
    pub fn result_count(&self) -> usize {
        self.results.iter().map(ParamGroup::arity).sum()
    }
}

/// Method receiver: `(w *Widget)`, `(Widget)`, `(s *Set[K])`.
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    pub name: Option<Ident>,
    /// Base type name, with pointer and type arguments stripped.
    pub type_name: Ident,
    pub by_reference: bool,
    /// `(l *List[T])`: the type arguments were present.
    pub generic: bool,
    pub span: Span,
}

/// Parameters sharing one type annotation: `a, b int`.
///
/// Unnamed parameters (`func(int, string)`) are groups with no names; each
/// such group stands for exactly one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGroup {
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub span: Span,
}

impl ParamGroup {
    /// Number of parameters the group declares.
    pub fn arity(&self) -> usize {
        self.names.len().max(1)
    }
}

/// A Go type expression, as far as the stub compiler distinguishes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `int`, `Point`
    Named(String),
    /// `geo.Point`
    Qualified { package: String, name: String },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `[N]T`
    Array { len: String, elem: Box<TypeExpr> },
    /// `map[K]V`
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    /// `...T`, only valid as the last parameter
    Variadic(Box<TypeExpr>),
    /// `Set[K]` and other instantiated generics
    Generic { base: Box<TypeExpr>, args: Vec<TypeExpr> },
    /// func, chan, interface and struct types, kept as source text
    Opaque(String),
}

impl TypeExpr {
    /// The bare identifier when this is an unqualified named type.
    pub fn as_named(&self) -> Option<&str> {
        match self {
            TypeExpr::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::Qualified { package, name } => write!(f, "{package}.{name}"),
            TypeExpr::Pointer(inner) => write!(f, "*{inner}"),
            TypeExpr::Slice(elem) => write!(f, "[]{elem}"),
            TypeExpr::Array { len, elem } => write!(f, "[{len}]{elem}"),
            TypeExpr::Map { key, value } => write!(f, "map[{key}]{value}"),
            TypeExpr::Variadic(elem) => write!(f, "...{elem}"),
            TypeExpr::Generic { base, args } => {
                write!(f, "{base}[")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str("]")
            }
            TypeExpr::Opaque(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(n: &str) -> Box<TypeExpr> {
        Box::new(TypeExpr::Named(n.to_string()))
    }

    #[test]
    fn test_type_display_round_trips_go_syntax() {
        let cases = [
            (TypeExpr::Pointer(named("Point")), "*Point"),
            (TypeExpr::Slice(named("byte")), "[]byte"),
            (
                TypeExpr::Array { len: "4".into(), elem: named("int") },
                "[4]int",
            ),
            (
                TypeExpr::Map { key: named("string"), value: TypeExpr::Slice(named("int")).into() },
                "map[string][]int",
            ),
            (TypeExpr::Variadic(named("string")), "...string"),
            (
                TypeExpr::Qualified { package: "geo".into(), name: "Point".into() },
                "geo.Point",
            ),
            (
                TypeExpr::Generic { base: named("Pair"), args: vec![TypeExpr::Named("K".into()), TypeExpr::Named("V".into())] },
                "Pair[K, V]",
            ),
            (TypeExpr::Opaque("func(int) error".into()), "func(int) error"),
        ];
        for (ty, expected) in cases {
            assert_eq!(ty.to_string(), expected);
        }
    }

    #[test]
    fn test_import_local_name() {
        let import = |alias: Option<&str>, path: &str| ImportDecl {
            alias: alias.map(str::to_string),
            path: path.to_string(),
            span: Span::point(1, 1),
        };
        assert_eq!(import(None, "fmt").local_name(), Some("fmt"));
        assert_eq!(import(None, "example.com/geo").local_name(), Some("geo"));
        assert_eq!(import(None, "example.com/geo/v2").local_name(), Some("geo"));
        assert_eq!(import(Some("g"), "example.com/geo").local_name(), Some("g"));
        assert_eq!(import(Some("_"), "example.com/geo").local_name(), None);
        assert_eq!(import(Some("."), "example.com/geo").local_name(), None);
    }

    #[test]
    fn test_group_len_counts_unnamed_as_one() {
        let span = Span::point(1, 1);
        let unnamed = ParamGroup { names: vec![], ty: TypeExpr::Named("int".into()), span };
        let pair = ParamGroup {
            names: vec![Ident::new("a", span), Ident::new("b", span)],
            ty: TypeExpr::Named("int".into()),
            span,
        };
        assert_eq!(unnamed.arity(), 1);
        assert_eq!(pair.arity(), 2);
    }
}
