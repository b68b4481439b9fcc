//! Token types for the Go lexer.
//!
//! Defines [`TokenKind`], covering the Go lexemes the declaration parser
//! distinguishes, and [`Token`], which pairs a kind with a source [`Span`].
//! Operators the parser never inspects collapse into
//! [`TokenKind::Operator`].

use std::fmt;

use vesupro_types::Span;

/// The 25 reserved words of Go.
pub const ALL_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else",
    "fallthrough", "for", "func", "go", "goto", "if", "import", "interface",
    "map", "package", "range", "return", "select", "struct", "switch", "type",
    "var",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns `true` if this token is a reserved keyword.
    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every token kind the lexer produces.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals (raw lexeme text) ───────────────────────────

    /// `42`, `0x2A`, `1_000`
    Int(String),
    /// `3.14`, `1e9`, `0x1p-2`
    Float(String),
    /// `2i`, `1.5i`
    Imaginary(String),
    /// `'a'`, `'\n'`
    Rune(String),
    /// `"hello"`, quotes included
    Str(String),
    /// `` `raw` ``, backquotes included
    RawStr(String),

    // ── Identifiers ──────────────────────────────────────────

    Ident(String),

    // ── Keywords ─────────────────────────────────────────────

    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,

    // ── Punctuation the parser inspects ──────────────────────

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `...`
    Ellipsis,
    /// `*`
    Star,
    /// `&`
    Amp,
    /// `~`
    Tilde,
    /// `:`
    Colon,
    /// `=`
    Assign,
    /// `:=`
    Define,
    /// `<-`
    Arrow,
    /// Any other operator: `+`, `&&`, `<<=`, ...
    Operator(String),

    // ── Trivia kept for the parser ───────────────────────────

    /// A `// ...` comment, slashes included, trailing newline excluded.
    Comment(String),
    Newline,
    Eof,
}

impl TokenKind {
    /// Look up a reserved word. Returns `None` for ordinary identifiers.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "break" => TokenKind::Break,
            "case" => TokenKind::Case,
            "chan" => TokenKind::Chan,
            "const" => TokenKind::Const,
            "continue" => TokenKind::Continue,
            "default" => TokenKind::Default,
            "defer" => TokenKind::Defer,
            "else" => TokenKind::Else,
            "fallthrough" => TokenKind::Fallthrough,
            "for" => TokenKind::For,
            "func" => TokenKind::Func,
            "go" => TokenKind::Go,
            "goto" => TokenKind::Goto,
            "if" => TokenKind::If,
            "import" => TokenKind::Import,
            "interface" => TokenKind::Interface,
            "map" => TokenKind::Map,
            "package" => TokenKind::Package,
            "range" => TokenKind::Range,
            "return" => TokenKind::Return,
            "select" => TokenKind::Select,
            "struct" => TokenKind::Struct,
            "switch" => TokenKind::Switch,
            "type" => TokenKind::Type,
            "var" => TokenKind::Var,
            _ => return None,
        })
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Break
                | TokenKind::Case
                | TokenKind::Chan
                | TokenKind::Const
                | TokenKind::Continue
                | TokenKind::Default
                | TokenKind::Defer
                | TokenKind::Else
                | TokenKind::Fallthrough
                | TokenKind::For
                | TokenKind::Func
                | TokenKind::Go
                | TokenKind::Goto
                | TokenKind::If
                | TokenKind::Import
                | TokenKind::Interface
                | TokenKind::Map
                | TokenKind::Package
                | TokenKind::Range
                | TokenKind::Return
                | TokenKind::Select
                | TokenKind::Struct
                | TokenKind::Switch
                | TokenKind::Type
                | TokenKind::Var
        )
    }

    /// Whether a newline after this token terminates a statement.
    ///
    /// This is Go's automatic semicolon rule; the declaration parser uses it
    /// to find the end of declarations it skips.
    pub fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Imaginary(_)
                | TokenKind::Rune(_)
                | TokenKind::Str(_)
                | TokenKind::RawStr(_)
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fallthrough
                | TokenKind::Return
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        ) || matches!(self, TokenKind::Operator(op) if op == "++" || op == "--")
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int(s)
            | TokenKind::Float(s)
            | TokenKind::Imaginary(s)
            | TokenKind::Rune(s)
            | TokenKind::Str(s)
            | TokenKind::RawStr(s)
            | TokenKind::Ident(s)
            | TokenKind::Operator(s) => f.write_str(s),
            TokenKind::Break => f.write_str("break"),
            TokenKind::Case => f.write_str("case"),
            TokenKind::Chan => f.write_str("chan"),
            TokenKind::Const => f.write_str("const"),
            TokenKind::Continue => f.write_str("continue"),
            TokenKind::Default => f.write_str("default"),
            TokenKind::Defer => f.write_str("defer"),
            TokenKind::Else => f.write_str("else"),
            TokenKind::Fallthrough => f.write_str("fallthrough"),
            TokenKind::For => f.write_str("for"),
            TokenKind::Func => f.write_str("func"),
            TokenKind::Go => f.write_str("go"),
            TokenKind::Goto => f.write_str("goto"),
            TokenKind::If => f.write_str("if"),
            TokenKind::Import => f.write_str("import"),
            TokenKind::Interface => f.write_str("interface"),
            TokenKind::Map => f.write_str("map"),
            TokenKind::Package => f.write_str("package"),
            TokenKind::Range => f.write_str("range"),
            TokenKind::Return => f.write_str("return"),
            TokenKind::Select => f.write_str("select"),
            TokenKind::Struct => f.write_str("struct"),
            TokenKind::Switch => f.write_str("switch"),
            TokenKind::Type => f.write_str("type"),
            TokenKind::Var => f.write_str("var"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Semicolon => f.write_str(";"),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Ellipsis => f.write_str("..."),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Amp => f.write_str("&"),
            TokenKind::Tilde => f.write_str("~"),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Assign => f.write_str("="),
            TokenKind::Define => f.write_str(":="),
            TokenKind::Arrow => f.write_str("<-"),
            TokenKind::Comment(text) => f.write_str(text),
            TokenKind::Newline => f.write_str("newline"),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}
