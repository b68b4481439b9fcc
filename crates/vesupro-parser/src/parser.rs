//! Core parser infrastructure: token cursor, error reporting, helpers.

use vesupro_lexer::{Lexer, Token, TokenKind};
use vesupro_types::ast::{Ident, SourceDecls};
use vesupro_types::{CompileErrors, ErrorCode, SourceFile, Span, VesuproError};

/// The declaration parser.
///
/// Consumes a token stream produced by the lexer and keeps the package
/// clause and every function signature. Collects errors and recovers at the
/// next top-level declaration.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    /// Returned by the cursor past the end of `tokens`.
    eof: Token,
    source_file: &'src SourceFile,
    errors: CompileErrors,
}

/// Result of parsing.
pub struct ParseResult {
    /// `None` when the package clause is missing.
    pub decls: Option<SourceDecls>,
    pub errors: CompileErrors,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        self.errors.has_errors()
    }
}

/// Lex and parse a source file, merging diagnostics from both stages.
pub fn parse(source_file: &SourceFile) -> ParseResult {
    let lexed = Lexer::new(source_file).lex();
    let mut result = Parser::new(lexed.tokens, source_file).parse();
    let mut errors = lexed.errors;
    errors.extend(result.errors);
    result.errors = errors;
    result
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        let eof_span = tokens.last().map(|t| t.span).unwrap_or(Span::point(1, 1));
        Self {
            tokens,
            pos: 0,
            eof: Token::new(TokenKind::Eof, eof_span),
            source_file,
            errors: CompileErrors::empty(),
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::point(1, 1),
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from the current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.kind_at(self.pos + n)
    }

    pub(crate) fn kind_at(&self, idx: usize) -> &TokenKind {
        self.tokens.get(idx).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    /// Index of the `]` closing the `[` at `open`, if any.
    pub(crate) fn matching_bracket(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (idx, token) in self.tokens.iter().enumerate().skip(open) {
            match token.kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(idx);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
        }
        None
    }

    /// Rebuild readable source text from the tokens in `from..to`.
    pub(crate) fn text_between(&self, from: usize, to: usize) -> String {
        let mut text = String::new();
        let mut prev: Option<&TokenKind> = None;
        for token in self.tokens.get(from..to).unwrap_or_default() {
            if matches!(token.kind, TokenKind::Newline | TokenKind::Comment(_)) {
                continue;
            }
            if let Some(prev) = prev {
                if needs_space(prev, &token.kind) {
                    text.push(' ');
                }
            }
            text.push_str(&token.kind.to_string());
            prev = Some(&token.kind);
        }
        text
    }

    // ── Newline Handling ──────────────────────────────────────────────────────

    /// Skip newlines and comments. Used inside delimiters, where Go ignores
    /// line breaks.
    pub(crate) fn skip_trivia(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Comment(_)) {
            self.advance();
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns the token if matched, or emits an error.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check_exact(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    /// Expect an identifier token.
    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// Expect the closing delimiter of a list, reporting E101 at end of input.
    pub(crate) fn expect_close(&mut self, close: &TokenKind, open_span: Span) -> Option<Token> {
        if self.at_end() {
            self.error_at(
                ErrorCode::UNCLOSED_DELIMITER,
                format!("unclosed delimiter, expected '{close}'"),
                open_span,
            );
            return None;
        }
        self.expect(close)
    }

    /// Skip a balanced `open ... close` run, starting at `open`.
    pub(crate) fn skip_balanced(&mut self, open: &TokenKind, close: &TokenKind) -> bool {
        let open_span = self.current_span();
        let mut depth = 0usize;
        loop {
            let kind = self.peek_kind();
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    self.advance();
                    return true;
                }
            } else if *kind == TokenKind::Eof {
                self.error_at(
                    ErrorCode::UNCLOSED_DELIMITER,
                    format!("unclosed delimiter, expected '{close}'"),
                    open_span,
                );
                return false;
            }
            self.advance();
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Report an error at the current token position.
    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    /// Report an error at a specific span.
    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let error = VesuproError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(error);
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.is_full()
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until the next top-level declaration keyword at the
    /// start of a line.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            if self.check_exact(&TokenKind::Newline) {
                self.advance();
                if matches!(
                    self.peek_kind(),
                    TokenKind::Func
                        | TokenKind::Type
                        | TokenKind::Var
                        | TokenKind::Const
                        | TokenKind::Import
                        | TokenKind::Comment(_)
                ) {
                    return;
                }
                continue;
            }
            self.advance();
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into the file's declarations.
    pub fn parse(mut self) -> ParseResult {
        let decls = self.parse_source();
        ParseResult {
            decls,
            errors: self.errors,
        }
    }
}

fn is_word(kind: &TokenKind) -> bool {
    kind.is_keyword()
        || matches!(
            kind,
            TokenKind::Ident(_)
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Imaginary(_)
                | TokenKind::Rune(_)
                | TokenKind::Str(_)
                | TokenKind::RawStr(_)
        )
}

/// Spacing rule for [`Parser::text_between`], close to `gofmt` for types.
fn needs_space(prev: &TokenKind, next: &TokenKind) -> bool {
    match (prev, next) {
        (TokenKind::Comma | TokenKind::Semicolon, _) => true,
        (TokenKind::LBrace, TokenKind::RBrace) => false,
        (TokenKind::LBrace, _) | (_, TokenKind::RBrace) => true,
        (TokenKind::Chan, TokenKind::Arrow) => false,
        (TokenKind::Arrow, next) => *next != TokenKind::Chan,
        (TokenKind::RParen, next) => {
            is_word(next) || matches!(next, TokenKind::LParen | TokenKind::Star | TokenKind::LBracket)
        }
        (prev, next) => {
            is_word(prev)
                && (is_word(next)
                    || matches!(next, TokenKind::Star | TokenKind::Ellipsis | TokenKind::Arrow))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rebuilt(src: &str) -> String {
        let file = SourceFile::new("t.go", src);
        let tokens = Lexer::new(&file).lex().tokens;
        let end = tokens.len() - 1;
        Parser::new(tokens, &file).text_between(0, end)
    }

    #[test]
    fn test_text_between_reads_like_gofmt() {
        let cases = [
            "func(int) error",
            "func(a, b int) (int, error)",
            "<-chan int",
            "chan<- *Point",
            "struct{ X int }",
            "interface{}",
            "map[string][]int",
            "func(xs ...string)",
        ];
        for src in cases {
            assert_eq!(rebuilt(src), src);
        }
    }

    #[test]
    fn test_cursor_past_end_yields_eof() {
        let file = SourceFile::new("t.go", "x");
        let tokens = Lexer::new(&file).lex().tokens;
        let mut parser = Parser::new(tokens, &file);
        parser.advance();
        parser.advance();
        parser.advance();
        assert!(parser.at_end());
        assert_eq!(parser.look_ahead(5), &TokenKind::Eof);
    }
}
