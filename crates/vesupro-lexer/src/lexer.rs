//! Go lexer: converts source text to a token stream.
//!
//! Scans the full Go lexical grammar well enough to walk any well-formed
//! file, but only distinguishes what the declaration parser needs:
//! - Line comments are kept as [`TokenKind::Comment`] so doc groups survive
//! - Block comments are skipped; one spanning lines yields a single newline
//! - Newlines are tokens (statement ends matter when skipping declarations)
//! - Literal tokens carry their raw lexeme text, nothing is unescaped
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use vesupro_types::{CompileErrors, ErrorCode, SourceFile, Span, VesuproError};

use crate::token::{Token, TokenKind};

/// Multi-character operators, longest first so the first match wins.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=",
    ":=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^",
];

/// The Go lexer.
///
/// Converts source text into a vector of [`Token`]s, collecting up to
/// [`MAX_ERRORS`](vesupro_types::MAX_ERRORS) errors along the way.
pub struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    /// Source file for error reporting.
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, in bytes like `go/token`).
    col: u32,
    errors: CompileErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

/// Where a token started, captured before its first byte is consumed.
#[derive(Clone, Copy)]
struct Mark {
    pos: usize,
    line: u32,
    col: u32,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        while !self.errors.is_full() {
            self.skip_whitespace();
            if self.at_end() {
                break;
            }
            if let Some(token) = self.scan_token() {
                tokens.push(token);
            }
        }

        tokens.push(Token::new(TokenKind::Eof, self.current_span()));

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start: Mark) -> Span {
        Span::new(
            start.line,
            start.col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    /// Raw source text consumed since `start`.
    fn lexeme(&self, start: Mark) -> String {
        String::from_utf8_lossy(&self.source[start.pos..self.pos]).into_owned()
    }

    fn token(&self, kind: TokenKind, start: Mark) -> Token {
        Token::new(kind, self.span_from(start))
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = VesuproError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip spaces, tabs and carriage returns (NOT newlines, those are tokens).
    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\r') = self.peek() {
            self.advance();
        }
    }

    /// `// ...` up to, not including, the newline.
    fn scan_line_comment(&mut self, start: Mark) -> Token {
        while let Some(ch) = self.peek() {
            if ch == b'\n' {
                break;
            }
            self.advance();
        }
        let text = self.lexeme(start);
        let text = text.trim_end_matches('\r').to_string();
        self.token(TokenKind::Comment(text), start)
    }

    /// `/* ... */`, already past the opening `/*`.
    ///
    /// A block comment spanning lines acts like a newline; otherwise it
    /// vanishes.
    fn scan_block_comment(&mut self, start: Mark) -> Option<Token> {
        let mut spans_lines = false;
        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_LITERAL,
                        "comment not terminated",
                        span,
                    );
                    return None;
                }
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.advance_n(2);
                    break;
                }
                Some(ch) => {
                    spans_lines |= ch == b'\n';
                    self.advance();
                }
            }
        }
        spans_lines.then(|| self.token(TokenKind::Newline, start))
    }

    // ─────────────────────────────────────────────────────────────
    // Token dispatch
    // ─────────────────────────────────────────────────────────────

    /// Scan one token. Returns `None` when the input produced no token
    /// (a skipped comment or a reported error).
    fn scan_token(&mut self) -> Option<Token> {
        let start = self.mark();
        let ch = self.peek()?;

        match ch {
            b'\n' => {
                self.advance();
                Some(self.token(TokenKind::Newline, start))
            }

            b'/' if self.peek_at(1) == Some(b'/') => Some(self.scan_line_comment(start)),
            b'/' if self.peek_at(1) == Some(b'*') => {
                self.advance_n(2);
                self.scan_block_comment(start)
            }

            b'"' => Some(self.scan_string(start)),
            b'`' => Some(self.scan_raw_string(start)),
            b'\'' => Some(self.scan_rune(start)),

            b'0'..=b'9' => Some(self.scan_number(start)),
            b'.' if matches!(self.peek_at(1), Some(b'0'..=b'9')) => Some(self.scan_number(start)),

            // Non-ASCII bytes can only start a Unicode identifier in valid Go.
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | 0x80..=0xFF => Some(self.scan_identifier(start)),

            _ => self.scan_punctuation(start),
        }
    }

    fn scan_punctuation(&mut self, start: Mark) -> Option<Token> {
        let rest = &self.source[self.pos..];
        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(op.as_bytes())) {
            self.advance_n(op.len());
            let kind = match *op {
                "..." => TokenKind::Ellipsis,
                ":=" => TokenKind::Define,
                "<-" => TokenKind::Arrow,
                other => TokenKind::Operator(other.to_string()),
            };
            return Some(self.token(kind, start));
        }

        let ch = self.advance()?;
        let kind = match ch {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'.' => TokenKind::Dot,
            b'*' => TokenKind::Star,
            b'&' => TokenKind::Amp,
            b'~' => TokenKind::Tilde,
            b':' => TokenKind::Colon,
            b'=' => TokenKind::Assign,
            b'+' | b'-' | b'/' | b'%' | b'<' | b'>' | b'!' | b'|' | b'^' => {
                TokenKind::Operator((ch as char).to_string())
            }
            _ => {
                let span = self.span_from(start);
                self.emit_error(
                    ErrorCode::UNEXPECTED_CHARACTER,
                    format!("invalid character {:?}", ch as char),
                    span,
                );
                return None;
            }
        };
        Some(self.token(kind, start))
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    /// Integer, float and imaginary literals in every Go base.
    ///
    /// Digit validity per base is left to the Go compiler; this only has to
    /// find where the literal ends and what kind it is.
    fn scan_number(&mut self, start: Mark) -> Token {
        let mut is_float = false;
        let mut hex = false;

        if self.peek() == Some(b'0') {
            if let Some(b'x' | b'X' | b'b' | b'B' | b'o' | b'O') = self.peek_at(1) {
                hex = matches!(self.peek_at(1), Some(b'x' | b'X'));
                self.advance_n(2);
            }
        }

        loop {
            match self.peek() {
                Some(ch) if ch.is_ascii_digit() || ch == b'_' => {
                    self.advance();
                }
                Some(ch) if hex && ch.is_ascii_hexdigit() => {
                    self.advance();
                }
                Some(b'.') if !is_float => {
                    is_float = true;
                    self.advance();
                }
                Some(b'e' | b'E') if !hex => {
                    is_float = true;
                    self.advance();
                    if let Some(b'+' | b'-') = self.peek() {
                        self.advance();
                    }
                }
                Some(b'p' | b'P') if hex => {
                    is_float = true;
                    self.advance();
                    if let Some(b'+' | b'-') = self.peek() {
                        self.advance();
                    }
                    // exponent digits are decimal
                    hex = false;
                }
                _ => break,
            }
        }

        if self.peek() == Some(b'i') {
            self.advance();
            return self.token(TokenKind::Imaginary(self.lexeme(start)), start);
        }

        let text = self.lexeme(start);
        let kind = if is_float {
            TokenKind::Float(text)
        } else {
            TokenKind::Int(text)
        };
        self.token(kind, start)
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, start: Mark) -> Token {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' || ch >= 0x80 {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.lexeme(start);
        let kind = TokenKind::from_keyword(&text).unwrap_or(TokenKind::Ident(text));
        self.token(kind, start)
    }

    // ─────────────────────────────────────────────────────────────
    // String and rune literals
    // ─────────────────────────────────────────────────────────────

    /// Interpreted string literal, quotes included in the lexeme.
    fn scan_string(&mut self, start: Mark) -> Token {
        self.advance();
        if self.scan_quoted(b'"') {
            return self.token(TokenKind::Str(self.lexeme(start)), start);
        }
        let span = self.span_from(start);
        self.emit_error(ErrorCode::UNTERMINATED_LITERAL, "string literal not terminated", span);
        self.token(TokenKind::Str(self.lexeme(start)), start)
    }

    fn scan_rune(&mut self, start: Mark) -> Token {
        self.advance();
        if self.scan_quoted(b'\'') {
            return self.token(TokenKind::Rune(self.lexeme(start)), start);
        }
        let span = self.span_from(start);
        self.emit_error(ErrorCode::UNTERMINATED_LITERAL, "rune literal not terminated", span);
        self.token(TokenKind::Rune(self.lexeme(start)), start)
    }

    /// Consume up to and including `quote`, honouring backslash escapes.
    /// Returns `false` if a newline or end of input came first.
    fn scan_quoted(&mut self, quote: u8) -> bool {
        loop {
            match self.peek() {
                None | Some(b'\n') => return false,
                Some(b'\\') => {
                    self.advance();
                    if let Some(b'\n') | None = self.peek() {
                        return false;
                    }
                    self.advance();
                }
                Some(ch) => {
                    self.advance();
                    if ch == quote {
                        return true;
                    }
                }
            }
        }
    }

    /// Raw string literal; may span lines, no escapes.
    fn scan_raw_string(&mut self, start: Mark) -> Token {
        self.advance();
        loop {
            match self.advance() {
                Some(b'`') => return self.token(TokenKind::RawStr(self.lexeme(start)), start),
                Some(_) => {}
                None => {
                    let span = self.span_from(start);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_LITERAL,
                        "raw string literal not terminated",
                        span,
                    );
                    return self.token(TokenKind::RawStr(self.lexeme(start)), start);
                }
            }
        }
    }
}
