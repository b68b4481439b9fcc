//! Top-level and declaration parsing.
//!
//! Handles the package clause, imports and function declarations. Types,
//! variables and constants are skipped as balanced token runs; function
//! bodies are skipped by brace matching.

use vesupro_lexer::TokenKind;
use vesupro_types::ast::*;
use vesupro_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Source file
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse a complete file: `PackageClause { TopLevelDecl }`.
    pub(crate) fn parse_source(&mut self) -> Option<SourceDecls> {
        self.skip_trivia();
        let start = self.current_span();
        let package = self.parse_package_clause()?;

        let mut imports = Vec::new();
        let mut funcs = Vec::new();
        let mut doc: Vec<String> = Vec::new();

        while !self.at_end() && !self.too_many_errors() {
            match self.peek_kind().clone() {
                TokenKind::Comment(text) => {
                    if self.at_line_start() {
                        doc.push(text);
                    } else {
                        doc.clear();
                    }
                    self.advance();
                    // a blank line detaches the group from what follows
                    if self.eat(&TokenKind::Newline) && self.check_exact(&TokenKind::Newline) {
                        doc.clear();
                    }
                }
                TokenKind::Newline | TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::Func => {
                    let group = std::mem::take(&mut doc);
                    match self.parse_func_decl(group) {
                        Some(func) => funcs.push(func),
                        None => self.synchronize(),
                    }
                }
                TokenKind::Import => {
                    doc.clear();
                    self.parse_import_decl(&mut imports);
                }
                TokenKind::Type | TokenKind::Var | TokenKind::Const => {
                    doc.clear();
                    self.skip_declaration();
                }
                other => {
                    doc.clear();
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!("expected declaration, got '{other}'"),
                    );
                    self.synchronize();
                }
            }
        }

        let span = start.merge(self.previous_span());
        Some(SourceDecls {
            package,
            imports,
            funcs,
            span,
        })
    }

    /// Whether the current token is the first on its line.
    fn at_line_start(&self) -> bool {
        match self.position().checked_sub(1) {
            Some(prev) => *self.kind_at(prev) == TokenKind::Newline,
            None => true,
        }
    }

    /// `package name`
    fn parse_package_clause(&mut self) -> Option<Ident> {
        if !self.check_exact(&TokenKind::Package) {
            self.error_at_current(
                ErrorCode::MISSING_PACKAGE_CLAUSE,
                format!("expected 'package' clause, got '{}'", self.peek_kind()),
            );
            return None;
        }
        self.advance();
        self.expect_identifier()
    }

    /// ```ebnf
    /// ImportDecl = "import" ( ImportSpec | "(" { ImportSpec ";" } ")" ) ;
    /// ```
    fn parse_import_decl(&mut self, imports: &mut Vec<ImportDecl>) {
        self.advance();
        if !self.check_exact(&TokenKind::LParen) {
            match self.parse_import_spec() {
                Some(spec) => imports.push(spec),
                None => self.synchronize(),
            }
            return;
        }

        let open = self.advance().span;
        loop {
            while matches!(
                self.peek_kind(),
                TokenKind::Newline | TokenKind::Comment(_) | TokenKind::Semicolon
            ) {
                self.advance();
            }
            if self.check_exact(&TokenKind::RParen) || self.at_end() {
                break;
            }
            match self.parse_import_spec() {
                Some(spec) => imports.push(spec),
                None => {
                    while !matches!(
                        self.peek_kind(),
                        TokenKind::Newline | TokenKind::RParen | TokenKind::Eof
                    ) {
                        self.advance();
                    }
                }
            }
        }
        self.expect_close(&TokenKind::RParen, open);
    }

    /// ```ebnf
    /// ImportSpec = [ "." | "_" | Name ] ImportPath ;
    /// ```
    fn parse_import_spec(&mut self) -> Option<ImportDecl> {
        let start = self.current_span();
        let alias = match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Some(name)
            }
            TokenKind::Dot => {
                self.advance();
                Some(".".to_string())
            }
            _ => None,
        };

        let path = match self.peek_kind().clone() {
            TokenKind::Str(lit) | TokenKind::RawStr(lit) => {
                self.advance();
                lit.get(1..lit.len().saturating_sub(1)).unwrap_or("").to_string()
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected import path, got '{other}'"),
                );
                return None;
            }
        };

        Some(ImportDecl {
            alias,
            path,
            span: start.merge(self.previous_span()),
        })
    }

    /// Skip a type, var or const declaration.
    ///
    /// Ends at the first newline or `;` outside delimiters that follows a
    /// token able to end a statement.
    fn skip_declaration(&mut self) {
        let open_span = self.current_span();
        let mut depth = 0usize;
        let mut last = self.advance().kind;

        loop {
            match self.peek_kind() {
                TokenKind::Eof => {
                    if depth > 0 {
                        self.error_at(
                            ErrorCode::UNCLOSED_DELIMITER,
                            "unclosed delimiter in declaration",
                            open_span,
                        );
                    }
                    return;
                }
                TokenKind::Newline | TokenKind::Semicolon if depth == 0 && last.ends_statement() => {
                    return;
                }
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            let token = self.advance();
            if !matches!(token.kind, TokenKind::Comment(_) | TokenKind::Newline) {
                last = token.kind;
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Functions & methods
    // ══════════════════════════════════════════════════════════════════════════

    /// ```ebnf
    /// FunctionDecl = "func" [ Receiver ] Name [ TypeParams ] Parameters [ Result ] [ Body ] ;
    /// Result       = Parameters | Type ;
    /// ```
    fn parse_func_decl(&mut self, doc: Vec<String>) -> Option<FuncDecl> {
        let start = self.expect(&TokenKind::Func)?.span;

        let receiver = if self.check_exact(&TokenKind::LParen) {
            Some(self.parse_receiver()?)
        } else {
            None
        };

        let name = self.expect_identifier()?;

        if self.check_exact(&TokenKind::LBracket)
            && !self.skip_balanced(&TokenKind::LBracket, &TokenKind::RBracket)
        {
            return None;
        }

        let params = self.parse_parameters()?;

        let results = if self.check_exact(&TokenKind::LParen) {
            self.parse_parameters()?
        } else if starts_type(self.peek_kind()) {
            let ty_start = self.current_span();
            let ty = self.parse_type()?;
            let span = ty_start.merge(self.previous_span());
            vec![ParamGroup {
                names: Vec::new(),
                ty,
                span,
            }]
        } else {
            Vec::new()
        };

        let has_body = self.check_exact(&TokenKind::LBrace);
        if has_body && !self.skip_balanced(&TokenKind::LBrace, &TokenKind::RBrace) {
            return None;
        }

        let span = start.merge(self.previous_span());
        Some(FuncDecl {
            name,
            receiver,
            params,
            results,
            doc,
            has_body,
            span,
        })
    }

    /// ```ebnf
    /// Receiver = "(" [ Name ] [ "*" ] TypeName [ TypeArgs ] ")" ;
    /// ```
    fn parse_receiver(&mut self) -> Option<Receiver> {
        let open = self.expect(&TokenKind::LParen)?.span;
        self.skip_trivia();

        let named = matches!(self.peek_kind(), TokenKind::Ident(_))
            && matches!(self.look_ahead(1), TokenKind::Ident(_) | TokenKind::Star);
        let name = if named {
            Some(self.expect_identifier()?)
        } else {
            None
        };

        let by_reference = self.eat(&TokenKind::Star);
        let type_name = self.expect_identifier()?;
        let generic = self.check_exact(&TokenKind::LBracket);
        if generic && !self.skip_balanced(&TokenKind::LBracket, &TokenKind::RBracket) {
            return None;
        }

        self.skip_trivia();
        self.eat(&TokenKind::Comma);
        self.skip_trivia();
        self.expect_close(&TokenKind::RParen, open)?;

        Some(Receiver {
            name,
            type_name,
            by_reference,
            generic,
            span: open.merge(self.previous_span()),
        })
    }
}

/// Whether `kind` can begin a type expression.
pub(crate) fn starts_type(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident(_)
            | TokenKind::Star
            | TokenKind::LBracket
            | TokenKind::LParen
            | TokenKind::Map
            | TokenKind::Func
            | TokenKind::Chan
            | TokenKind::Interface
            | TokenKind::Struct
            | TokenKind::Arrow
            | TokenKind::Ellipsis
    )
}
