//! Parameter list and type expression parsing.

use vesupro_lexer::TokenKind;
use vesupro_types::ast::*;
use vesupro_types::{ErrorCode, Span};

use crate::parse_decl::starts_type;
use crate::parser::Parser;

/// One comma-separated entry of a parameter list before grouping.
enum Entry {
    /// `name Type`
    Named(Ident, TypeExpr, Span),
    /// A lone type, or a name waiting for the type of a later entry.
    Bare(TypeExpr, Span),
}

impl<'src> Parser<'src> {
    /// Parse a parenthesized parameter or result list.
    ///
    /// ```ebnf
    /// Parameters    = "(" [ ParameterList [ "," ] ] ")" ;
    /// ParameterList = ParameterDecl { "," ParameterDecl } ;
    /// ParameterDecl = [ IdentifierList ] [ "..." ] Type ;
    /// ```
    ///
    /// Go requires the list to be either all named or all unnamed; in a
    /// named list, bare names take the type of the next named entry
    /// (`a, b int`).
    pub(crate) fn parse_parameters(&mut self) -> Option<Vec<ParamGroup>> {
        let open = self.expect(&TokenKind::LParen)?.span;
        let mut entries = Vec::new();

        loop {
            self.skip_trivia();
            if self.check_exact(&TokenKind::RParen) || self.at_end() {
                break;
            }
            entries.push(self.parse_entry()?);
            self.skip_trivia();
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.skip_trivia();
        self.expect_close(&TokenKind::RParen, open)?;

        self.group_entries(entries)
    }

    fn parse_entry(&mut self) -> Option<Entry> {
        let start = self.current_span();
        if matches!(self.peek_kind(), TokenKind::Ident(_)) && self.entry_is_named() {
            let name = self.expect_identifier()?;
            let ty = self.parse_type()?;
            let span = start.merge(self.previous_span());
            return Some(Entry::Named(name, ty, span));
        }
        let ty = self.parse_type()?;
        Some(Entry::Bare(ty, start.merge(self.previous_span())))
    }

    /// Decide whether the identifier under the cursor is a parameter name.
    ///
    /// `a [4]int` and `T[K]` share a prefix; the bracket run is a type
    /// argument list unless another type follows it.
    fn entry_is_named(&self) -> bool {
        match self.look_ahead(1) {
            TokenKind::Dot => false,
            TokenKind::LBracket => {
                if *self.look_ahead(2) == TokenKind::RBracket {
                    return true;
                }
                match self.matching_bracket(self.position() + 1) {
                    Some(close) => starts_type(self.kind_at(close + 1)),
                    None => false,
                }
            }
            next => starts_type(next),
        }
    }

    fn group_entries(&mut self, entries: Vec<Entry>) -> Option<Vec<ParamGroup>> {
        let any_named = entries.iter().any(|e| matches!(e, Entry::Named(..)));
        if !any_named {
            return Some(
                entries
                    .into_iter()
                    .map(|entry| match entry {
                        Entry::Bare(ty, span) | Entry::Named(_, ty, span) => ParamGroup {
                            names: Vec::new(),
                            ty,
                            span,
                        },
                    })
                    .collect(),
            );
        }

        let mut groups = Vec::new();
        let mut pending: Vec<Ident> = Vec::new();
        let mut pending_span: Option<Span> = None;

        for entry in entries {
            match entry {
                Entry::Bare(TypeExpr::Named(name), span) => {
                    pending.push(Ident::new(name, span));
                    pending_span = Some(pending_span.map_or(span, |s| s.merge(span)));
                }
                Entry::Bare(ty, span) => {
                    self.error_at(
                        ErrorCode::MIXED_PARAMETER_NAMES,
                        format!("mixed named and unnamed parameters: '{ty}' has no name"),
                        span,
                    );
                    return None;
                }
                Entry::Named(name, ty, span) => {
                    let mut names = std::mem::take(&mut pending);
                    names.push(name);
                    let span = pending_span.take().map_or(span, |s| s.merge(span));
                    groups.push(ParamGroup { names, ty, span });
                }
            }
        }

        if let Some(span) = pending_span {
            self.error_at(
                ErrorCode::MIXED_PARAMETER_NAMES,
                "mixed named and unnamed parameters: trailing names have no type",
                span,
            );
            return None;
        }
        Some(groups)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Types
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse a type expression.
    ///
    /// ```ebnf
    /// Type = TypeName [ TypeArgs ] | "*" Type | "[" "]" Type | "[" Len "]" Type
    ///      | "map" "[" Type "]" Type | "..." Type | "(" Type ")"
    ///      | FuncType | ChanType | InterfaceType | StructType ;
    /// ```
    ///
    /// Function, channel, interface and struct types are kept as text.
    pub(crate) fn parse_type(&mut self) -> Option<TypeExpr> {
        match self.peek_kind().clone() {
            TokenKind::Star => {
                self.advance();
                Some(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            TokenKind::Ellipsis => {
                self.advance();
                Some(TypeExpr::Variadic(Box::new(self.parse_type()?)))
            }
            TokenKind::LBracket => {
                let open = self.advance().span;
                if self.eat(&TokenKind::RBracket) {
                    return Some(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                let from = self.position();
                let close = self.matching_bracket(from - 1);
                let Some(close) = close else {
                    self.error_at(
                        ErrorCode::UNCLOSED_DELIMITER,
                        "unclosed delimiter, expected ']'",
                        open,
                    );
                    return None;
                };
                let len = self.text_between(from, close);
                while self.position() <= close {
                    self.advance();
                }
                let elem = self.parse_type()?;
                Some(TypeExpr::Array {
                    len,
                    elem: Box::new(elem),
                })
            }
            TokenKind::Map => {
                self.advance();
                let open = self.expect(&TokenKind::LBracket)?.span;
                let key = self.parse_type()?;
                self.expect_close(&TokenKind::RBracket, open)?;
                let value = self.parse_type()?;
                Some(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                })
            }
            TokenKind::LParen => {
                let open = self.advance().span;
                self.skip_trivia();
                let inner = self.parse_type()?;
                self.skip_trivia();
                self.expect_close(&TokenKind::RParen, open)?;
                Some(inner)
            }
            TokenKind::Ident(_) => self.parse_type_name(),
            TokenKind::Func | TokenKind::Chan | TokenKind::Arrow | TokenKind::Interface | TokenKind::Struct => {
                self.parse_opaque_type()
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected type, got '{other}'"),
                );
                None
            }
        }
    }

    /// `Name`, `pkg.Name`, either with optional type arguments.
    fn parse_type_name(&mut self) -> Option<TypeExpr> {
        let first = self.expect_identifier()?;
        let base = if self.eat(&TokenKind::Dot) {
            let name = self.expect_identifier()?;
            TypeExpr::Qualified {
                package: first.name,
                name: name.name,
            }
        } else {
            TypeExpr::Named(first.name)
        };

        if !self.check_exact(&TokenKind::LBracket) {
            return Some(base);
        }

        let open = self.advance().span;
        let mut args = Vec::new();
        loop {
            self.skip_trivia();
            if self.check_exact(&TokenKind::RBracket) {
                break;
            }
            args.push(self.parse_type()?);
            self.skip_trivia();
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.skip_trivia();
        self.expect_close(&TokenKind::RBracket, open)?;
        Some(TypeExpr::Generic {
            base: Box::new(base),
            args,
        })
    }

    /// Consume a func, chan, interface or struct type and keep its text.
    fn parse_opaque_type(&mut self) -> Option<TypeExpr> {
        let from = self.position();
        match self.peek_kind() {
            TokenKind::Func => {
                self.advance();
                self.parse_parameters()?;
                if self.check_exact(&TokenKind::LParen) {
                    self.parse_parameters()?;
                } else if starts_type(self.peek_kind()) && !self.check_exact(&TokenKind::Ellipsis) {
                    self.parse_type()?;
                }
            }
            TokenKind::Arrow | TokenKind::Chan => {
                self.eat(&TokenKind::Arrow);
                self.expect(&TokenKind::Chan)?;
                self.eat(&TokenKind::Arrow);
                self.parse_type()?;
            }
            _ => {
                // interface{...} and struct{...}
                self.advance();
                if !self.check_exact(&TokenKind::LBrace) {
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!("expected '{{', got '{}'", self.peek_kind()),
                    );
                    return None;
                }
                if !self.skip_balanced(&TokenKind::LBrace, &TokenKind::RBrace) {
                    return None;
                }
            }
        }
        Some(TypeExpr::Opaque(self.text_between(from, self.position())))
    }
}
