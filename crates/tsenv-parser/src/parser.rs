//! Core Parser struct and module-level parsing

use super::*;

/// Recursive descent parser for TypeScript declaration files
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
    pub(crate) errors: Vec<ParseError>,
    /// Set while parsing the `extends` clause of a conditional type, where
    /// a nested `extends` cannot start another conditional type.
    pub(crate) no_conditional_types: bool,
}

impl Parser {
    /// Creates a new parser from a token stream. Lexer error tokens are
    /// reported as parse errors and removed from the stream.
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut errors = Vec::new();
        let mut kept = Vec::with_capacity(tokens.len());
        for token in tokens {
            if token.kind == TokenKind::Error {
                errors.push(ParseError {
                    message: token.value,
                    span: token.span,
                });
            } else {
                kept.push(token);
            }
        }
        if kept.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let end = kept.last().map(|t| t.span).unwrap_or(Span::new(0, 0, 0));
            kept.push(Token {
                kind: TokenKind::Eof,
                span: Span::new(end.end, end.end, end.file_id),
                value: String::new(),
                has_newline_before: false,
            });
        }
        Self {
            tokens: kept,
            current: 0,
            errors,
            no_conditional_types: false,
        }
    }

    /// Parses a complete source file. Parsing always produces a tree; items
    /// that failed to parse are dropped and reported in the error list.
    pub fn parse_source_file(mut self) -> (SourceFile, Vec<ParseError>) {
        let start_span = self.current_token().span;
        let items = self.parse_module_items(false);
        let end_span = self.current_token().span;
        let file = SourceFile {
            items,
            span: start_span.merge(&end_span),
        };
        (file, self.errors)
    }

    /// Parses items until end of input, or until the closing brace of a
    /// module block when `in_block` is set.
    pub(crate) fn parse_module_items(&mut self, in_block: bool) -> Vec<Node<ModuleItem>> {
        let mut items = Vec::new();
        while !self.is_at_end() && !(in_block && self.check(TokenKind::RBrace)) {
            let before = self.current;
            match self.parse_module_item() {
                Ok(item) => items.push(item),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
            if self.current == before {
                // Stray closing brace at top level
                self.advance();
            }
        }
        items
    }

    // =========================================================================
    // Module Items
    // =========================================================================

    pub(crate) fn parse_module_item(&mut self) -> ParseResult<Node<ModuleItem>> {
        let start = self.current_token().span;

        let item = match self.current_token().kind {
            TokenKind::Import if self.is_import_declaration() => {
                if self.is_import_equals() {
                    let decl = self.parse_import_equals()?;
                    ModuleItem::Decl(decl)
                } else {
                    ModuleItem::Import(self.parse_import_decl()?)
                }
            }
            TokenKind::Export => ModuleItem::Export(self.parse_export_decl()?),
            _ if self.is_declaration_start() => ModuleItem::Decl(self.parse_declaration()?),
            TokenKind::Semicolon => {
                self.advance();
                ModuleItem::Statement
            }
            _ => {
                self.skip_statement();
                ModuleItem::Statement
            }
        };

        Ok(Node::new(item, self.span_from(start)))
    }

    // =========================================================================
    // Import/Export
    // =========================================================================

    fn is_import_declaration(&self) -> bool {
        // `import(...)` and `import.meta` are expressions
        !matches!(self.peek_kind(1), Some(TokenKind::LParen) | Some(TokenKind::Dot))
    }

    fn is_import_equals(&self) -> bool {
        let offset = if self.peek_kind(1) == Some(TokenKind::Type)
            && self.peek_kind(3) == Some(TokenKind::Eq)
        {
            2
        } else {
            1
        };
        self.peek_token(offset).is_some_and(|t| t.is_identifier())
            && self.peek_kind(offset + 1) == Some(TokenKind::Eq)
    }

    pub(crate) fn parse_import_equals(&mut self) -> ParseResult<Node<Decl>> {
        let start = self.current_token().span;
        self.consume(TokenKind::Import)?;
        if self.check(TokenKind::Type) && self.peek_kind(2) == Some(TokenKind::Eq) {
            self.advance();
        }
        let name = self.parse_identifier()?;
        self.consume(TokenKind::Eq)?;

        let target = if self.check(TokenKind::Require) && self.peek_kind(1) == Some(TokenKind::LParen) {
            self.advance();
            self.advance();
            let source = self.consume(TokenKind::StringLiteral)?.value.clone();
            self.consume(TokenKind::RParen)?;
            ImportEqualsTarget::External(source)
        } else {
            ImportEqualsTarget::Entity(self.parse_entity_name()?)
        };
        self.consume_semicolon();

        Ok(Node::new(
            Decl::ImportEquals(ImportEqualsDecl { name, target }),
            self.span_from(start),
        ))
    }

    pub(crate) fn parse_import_decl(&mut self) -> ParseResult<ImportDecl> {
        self.consume(TokenKind::Import)?;

        let type_only = if self.check(TokenKind::Type)
            && matches!(
                self.peek_kind(1),
                Some(TokenKind::LBrace) | Some(TokenKind::Star) | Some(TokenKind::Identifier)
            )
            && self.peek_kind(1) != Some(TokenKind::From)
        {
            self.advance();
            true
        } else {
            false
        };

        let mut specifiers = Vec::new();

        // import "module"
        if self.check(TokenKind::StringLiteral) {
            let source = self.advance().value.clone();
            self.consume_semicolon();
            return Ok(ImportDecl {
                specifiers,
                source,
                type_only,
            });
        }

        // import defaultName from "module"
        if self.current_token().is_identifier() && !self.check(TokenKind::From) {
            let name = self.parse_identifier()?;
            specifiers.push(ImportSpecifier::Default(name));
            if self.check(TokenKind::Comma) {
                self.advance();
            }
        }

        if self.check(TokenKind::Star) {
            // import * as name from "module"
            self.advance();
            self.consume(TokenKind::As)?;
            let name = self.parse_identifier()?;
            specifiers.push(ImportSpecifier::Namespace(name));
        } else if self.check(TokenKind::LBrace) {
            // import { a, type b, c as d } from "module"
            self.advance();
            while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                let spec_type_only = self.eat_type_modifier();
                let imported = self.parse_identifier_name()?;
                let local = if self.check(TokenKind::As) {
                    self.advance();
                    Some(self.parse_identifier()?)
                } else {
                    None
                };
                specifiers.push(ImportSpecifier::Named {
                    imported,
                    local,
                    type_only: spec_type_only,
                });
                if !self.check(TokenKind::RBrace) {
                    self.consume(TokenKind::Comma)?;
                }
            }
            self.consume(TokenKind::RBrace)?;
        }

        self.consume(TokenKind::From)?;
        let source = self.consume(TokenKind::StringLiteral)?.value.clone();
        self.consume_semicolon();

        Ok(ImportDecl {
            specifiers,
            source,
            type_only,
        })
    }

    /// `type` before a specifier name, unless it is itself the name
    /// (`{ type }` or `{ type as t }`).
    fn eat_type_modifier(&mut self) -> bool {
        if self.check(TokenKind::Type)
            && self.peek_token(1).is_some_and(|t| t.is_identifier_name())
            && !(self.peek_kind(1) == Some(TokenKind::As)
                && !self.peek_token(2).is_some_and(|t| t.is_identifier_name()))
        {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn parse_export_decl(&mut self) -> ParseResult<ExportDecl> {
        self.consume(TokenKind::Export)?;

        // export = A.B
        if self.check(TokenKind::Eq) {
            self.advance();
            let target = self.parse_entity_name()?;
            self.consume_semicolon();
            return Ok(ExportDecl::Assignment(target));
        }

        // export as namespace Name
        if self.check(TokenKind::As) && self.peek_kind(1) == Some(TokenKind::Namespace) {
            self.advance();
            self.advance();
            let name = self.parse_identifier()?;
            self.consume_semicolon();
            return Ok(ExportDecl::AsNamespace(name));
        }

        // export import x = A.B
        if self.check(TokenKind::Import) {
            let decl = self.parse_import_equals()?;
            return Ok(ExportDecl::Decl(Box::new(decl)));
        }

        let type_only = if self.check(TokenKind::Type)
            && matches!(self.peek_kind(1), Some(TokenKind::LBrace) | Some(TokenKind::Star))
        {
            self.advance();
            true
        } else {
            false
        };

        // export default
        if self.check(TokenKind::Default) {
            self.advance();
            if self.is_declaration_start() {
                let decl = self.parse_declaration()?;
                return Ok(ExportDecl::DefaultDecl(Box::new(decl)));
            }
            if self.current_token().is_identifier_name() && self.is_entity_then_end() {
                let name = self.parse_entity_name()?;
                self.consume_semicolon();
                return Ok(ExportDecl::Default(Some(name)));
            }
            self.skip_expression();
            self.consume_semicolon();
            return Ok(ExportDecl::Default(None));
        }

        // export * from "module"
        if self.check(TokenKind::Star) {
            self.advance();
            let as_name = if self.check(TokenKind::As) {
                self.advance();
                Some(self.parse_identifier_name()?)
            } else {
                None
            };
            self.consume(TokenKind::From)?;
            let source = self.consume(TokenKind::StringLiteral)?.value.clone();
            self.consume_semicolon();
            return Ok(ExportDecl::All {
                source,
                as_name,
                type_only,
            });
        }

        // export { ... }
        if self.check(TokenKind::LBrace) {
            self.advance();
            let mut specifiers = Vec::new();
            while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                let spec_type_only = self.eat_type_modifier();
                let local = self.parse_identifier_name()?;
                let exported = if self.check(TokenKind::As) {
                    self.advance();
                    Some(self.parse_identifier_name()?)
                } else {
                    None
                };
                specifiers.push(ExportSpecifier {
                    local,
                    exported,
                    type_only: spec_type_only,
                });
                if !self.check(TokenKind::RBrace) {
                    self.consume(TokenKind::Comma)?;
                }
            }
            self.consume(TokenKind::RBrace)?;

            let source = if self.check(TokenKind::From) {
                self.advance();
                Some(self.consume(TokenKind::StringLiteral)?.value.clone())
            } else {
                None
            };
            self.consume_semicolon();

            return Ok(ExportDecl::Named {
                specifiers,
                source,
                type_only,
            });
        }

        let decl = self.parse_declaration()?;
        Ok(ExportDecl::Decl(Box::new(decl)))
    }

    /// True when the tokens from here form `A.B.C` followed by the end of
    /// the statement.
    fn is_entity_then_end(&self) -> bool {
        let mut offset = 1;
        while self.peek_kind(offset) == Some(TokenKind::Dot) {
            offset += 2;
        }
        match self.peek_token(offset) {
            None => true,
            Some(t) => {
                matches!(t.kind, TokenKind::Semicolon | TokenKind::Eof | TokenKind::RBrace)
                    || t.has_newline_before
            }
        }
    }
}
