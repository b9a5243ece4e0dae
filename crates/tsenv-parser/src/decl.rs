//! Declaration parsing (functions, classes, interfaces, type aliases,
//! enums, modules and variables)

use super::*;

impl Parser {
    /// True when the current token begins a declaration rather than an
    /// executable statement. Contextual keywords only count when the
    /// following token makes the declaration form unambiguous.
    pub(crate) fn is_declaration_start(&self) -> bool {
        let next_is_name = |offset: usize| {
            self.same_line(offset) && self.peek_token(offset).is_some_and(|t| t.is_identifier())
        };

        match self.current_token().kind {
            TokenKind::Function | TokenKind::Class | TokenKind::Enum | TokenKind::Var => true,
            TokenKind::At => true,
            TokenKind::Const => {
                self.peek_kind(1) == Some(TokenKind::Enum)
                    || self.peek_token(1).is_some_and(|t| t.is_identifier())
            }
            TokenKind::Let => {
                next_is_name(1)
                    || matches!(self.peek_kind(1), Some(TokenKind::LBrace) | Some(TokenKind::LBracket))
            }
            TokenKind::Async => self.peek_kind(1) == Some(TokenKind::Function) && self.same_line(1),
            TokenKind::Abstract => self.peek_kind(1) == Some(TokenKind::Class) && self.same_line(1),
            TokenKind::Interface => next_is_name(1),
            TokenKind::Type => {
                next_is_name(1)
                    && matches!(self.peek_kind(2), Some(TokenKind::Eq) | Some(TokenKind::Lt))
            }
            TokenKind::Module | TokenKind::Namespace => {
                next_is_name(1)
                    || (self.current_token().kind == TokenKind::Module
                        && self.same_line(1)
                        && self.peek_kind(1) == Some(TokenKind::StringLiteral))
            }
            TokenKind::Global => self.peek_kind(1) == Some(TokenKind::LBrace),
            TokenKind::Declare => {
                self.same_line(1)
                    && self.peek_token(1).is_some_and(|t| {
                        t.is_identifier_name()
                            && !matches!(t.kind, TokenKind::Identifier | TokenKind::Declare)
                    })
            }
            _ => false,
        }
    }

    pub(crate) fn parse_declaration(&mut self) -> ParseResult<Node<Decl>> {
        let start = self.current_token().span;

        let is_declare = if self.check(TokenKind::Declare) {
            self.advance();
            true
        } else {
            false
        };

        self.skip_decorators()?;

        let decl = match self.current_token().kind {
            TokenKind::Function => Decl::Function(self.parse_function_decl(is_declare)?),
            TokenKind::Async if self.peek_kind(1) == Some(TokenKind::Function) => {
                self.advance();
                Decl::Function(self.parse_function_decl(is_declare)?)
            }
            TokenKind::Class => Decl::Class(self.parse_class_decl(is_declare, false)?),
            TokenKind::Abstract if self.peek_kind(1) == Some(TokenKind::Class) => {
                self.advance();
                Decl::Class(self.parse_class_decl(is_declare, true)?)
            }
            TokenKind::Interface => Decl::Interface(self.parse_interface_decl(is_declare)?),
            TokenKind::Type => Decl::TypeAlias(self.parse_type_alias_decl(is_declare)?),
            TokenKind::Enum => Decl::Enum(self.parse_enum_decl(is_declare, false)?),
            TokenKind::Const if self.peek_kind(1) == Some(TokenKind::Enum) => {
                self.advance();
                Decl::Enum(self.parse_enum_decl(is_declare, true)?)
            }
            TokenKind::Module | TokenKind::Namespace => {
                Decl::Module(self.parse_module_decl(is_declare)?)
            }
            TokenKind::Global => Decl::Module(self.parse_global_augmentation(is_declare)?),
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                Decl::Var(self.parse_var_decl(is_declare)?)
            }
            TokenKind::Import => return self.parse_import_equals(),
            kind => {
                return Err(self.error(format!("Expected declaration, found {:?}", kind)));
            }
        };

        Ok(Node::new(decl, self.span_from(start)))
    }

    // =========================================================================
    // Functions
    // =========================================================================

    fn parse_function_decl(&mut self, is_declare: bool) -> ParseResult<FunctionDecl> {
        self.consume(TokenKind::Function)?;
        if self.check(TokenKind::Star) {
            self.advance();
        }

        let name = if self.current_token().is_identifier() {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        let signature = self.parse_signature()?;
        let has_body = self.skip_body()?;

        Ok(FunctionDecl {
            name,
            signature,
            has_body,
            is_declare,
        })
    }

    /// Skips a `{ ... }` body if present, or consumes the `;` that ends an
    /// overload signature.
    fn skip_body(&mut self) -> ParseResult<bool> {
        if self.check(TokenKind::LBrace) {
            self.skip_balanced()?;
            Ok(true)
        } else {
            self.consume_semicolon();
            Ok(false)
        }
    }

    // =========================================================================
    // Classes
    // =========================================================================

    fn parse_class_decl(&mut self, is_declare: bool, is_abstract: bool) -> ParseResult<ClassDecl> {
        self.consume(TokenKind::Class)?;

        let name = if self.current_token().is_identifier()
            && !matches!(self.current_token().kind, TokenKind::Implements)
        {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        let type_params = self.parse_optional_type_params()?;

        let extends = if self.check(TokenKind::Extends) {
            self.advance();
            let expr = self.parse_entity_name()?;
            let type_args = self.parse_optional_type_args()?;
            Some(ExpressionWithTypeArgs { expr, type_args })
        } else {
            None
        };

        let mut implements = Vec::new();
        if self.check(TokenKind::Implements) {
            self.advance();
            loop {
                implements.push(self.parse_type()?);
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }

        self.consume(TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            if self.check(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            if self.check(TokenKind::Static) && self.peek_kind(1) == Some(TokenKind::LBrace) {
                // static initialization block
                self.advance();
                self.skip_balanced()?;
                continue;
            }
            match self.parse_class_member() {
                Ok(member) => members.push(member),
                Err(err) => {
                    self.errors.push(err);
                    self.skip_to_member_end();
                }
            }
        }
        self.consume(TokenKind::RBrace)?;

        Ok(ClassDecl {
            name,
            type_params,
            extends,
            implements,
            members,
            is_abstract,
            is_declare,
        })
    }

    fn parse_class_member(&mut self) -> ParseResult<Node<ClassMember>> {
        let start = self.current_token().span;
        self.skip_decorators()?;

        let mut modifiers = MemberModifiers::default();
        loop {
            let kind = self.current_token().kind;
            let is_modifier = matches!(
                kind,
                TokenKind::Public
                    | TokenKind::Private
                    | TokenKind::Protected
                    | TokenKind::Static
                    | TokenKind::Abstract
                    | TokenKind::Readonly
                    | TokenKind::Override
                    | TokenKind::Declare
                    | TokenKind::Accessor
                    | TokenKind::Async
            ) && self.is_modifier_before_name();
            if !is_modifier {
                break;
            }
            match self.advance().kind {
                TokenKind::Public => modifiers.access = AccessModifier::Public,
                TokenKind::Private => modifiers.access = AccessModifier::Private,
                TokenKind::Protected => modifiers.access = AccessModifier::Protected,
                TokenKind::Static => modifiers.is_static = true,
                TokenKind::Abstract => modifiers.is_abstract = true,
                TokenKind::Readonly => modifiers.is_readonly = true,
                TokenKind::Override => modifiers.is_override = true,
                _ => {}
            }
        }

        if self.is_index_signature_start() {
            let signature = self.parse_index_signature(modifiers.is_readonly)?;
            self.consume_semicolon();
            return Ok(Node::new(
                ClassMember::IndexSignature {
                    signature,
                    is_static: modifiers.is_static,
                },
                self.span_from(start),
            ));
        }

        if self.check(TokenKind::Star) {
            self.advance();
        }

        let accessor = if matches!(self.current_token().kind, TokenKind::Get | TokenKind::Set)
            && self.is_modifier_before_name()
        {
            Some(self.advance().kind)
        } else {
            None
        };

        let is_constructor = accessor.is_none()
            && (self.current_token().value == "constructor"
                && matches!(
                    self.current_token().kind,
                    TokenKind::Identifier | TokenKind::StringLiteral
                ))
            && matches!(self.peek_kind(1), Some(TokenKind::LParen) | Some(TokenKind::Lt));

        let member = if is_constructor {
            self.advance();
            let signature = self.parse_signature()?;
            let has_body = self.skip_body()?;
            ClassMember::Constructor {
                params: signature.params,
                access: modifiers.access,
                has_body,
            }
        } else {
            let name = self.parse_property_name()?;
            match accessor {
                Some(TokenKind::Get) => {
                    let signature = self.parse_signature()?;
                    self.skip_body()?;
                    ClassMember::Getter {
                        name,
                        return_type: signature.return_type,
                        modifiers,
                    }
                }
                Some(_) => {
                    let signature = self.parse_signature()?;
                    self.skip_body()?;
                    let param = signature
                        .params
                        .into_iter()
                        .find(|p| !matches!(p.name, ParamName::This))
                        .ok_or_else(|| self.error("Setter must have a parameter".to_string()))?;
                    ClassMember::Setter {
                        name,
                        param,
                        modifiers,
                    }
                }
                None => {
                    let is_optional = if self.check(TokenKind::Question) {
                        self.advance();
                        true
                    } else {
                        if self.check(TokenKind::Bang) {
                            self.advance();
                        }
                        false
                    };

                    if self.check(TokenKind::LParen) || self.check(TokenKind::Lt) {
                        let signature = self.parse_signature()?;
                        let has_body = self.skip_body()?;
                        ClassMember::Method {
                            name,
                            signature,
                            modifiers,
                            is_optional,
                            has_body,
                        }
                    } else {
                        let type_annotation = if self.check(TokenKind::Colon) {
                            self.advance();
                            Some(Box::new(self.parse_type()?))
                        } else {
                            None
                        };
                        let init = if self.check(TokenKind::Eq) {
                            self.advance();
                            Some(self.parse_initializer())
                        } else {
                            None
                        };
                        self.consume_semicolon();
                        ClassMember::Property {
                            name,
                            type_annotation,
                            init,
                            modifiers,
                            is_optional,
                        }
                    }
                }
            }
        };

        Ok(Node::new(member, self.span_from(start)))
    }

    // =========================================================================
    // Interfaces and type aliases
    // =========================================================================

    fn parse_interface_decl(&mut self, is_declare: bool) -> ParseResult<InterfaceDecl> {
        self.consume(TokenKind::Interface)?;
        let name = self.parse_identifier()?;
        let type_params = self.parse_optional_type_params()?;

        let mut extends = Vec::new();
        if self.check(TokenKind::Extends) {
            self.advance();
            loop {
                extends.push(self.parse_heritage_type()?);
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }

        let members = self.parse_object_type_members()?;

        Ok(InterfaceDecl {
            name,
            type_params,
            extends,
            members,
            is_declare,
        })
    }

    /// `A.B<T>` in an `extends` list
    fn parse_heritage_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;
        let name = self.parse_entity_name()?;
        let type_args = self.parse_optional_type_args()?;
        Ok(Node::new(Type::TypeRef { name, type_args }, self.span_from(start)))
    }

    fn parse_type_alias_decl(&mut self, is_declare: bool) -> ParseResult<TypeAliasDecl> {
        self.consume(TokenKind::Type)?;
        let name = self.parse_identifier()?;
        let type_params = self.parse_optional_type_params()?;
        self.consume(TokenKind::Eq)?;

        let ends_after_keyword = matches!(
            self.peek_kind(1),
            Some(TokenKind::Semicolon) | Some(TokenKind::Eof) | None
        ) || !self.same_line(1);
        let ty = if self.current_token().kind == TokenKind::Identifier
            && self.current_token().value == "intrinsic"
            && ends_after_keyword
        {
            let span = self.advance().span;
            Node::new(Type::Keyword(KeywordType::Intrinsic), span)
        } else {
            self.parse_type()?
        };
        self.consume_semicolon();

        Ok(TypeAliasDecl {
            name,
            type_params,
            ty,
            is_declare,
        })
    }

    // =========================================================================
    // Enums
    // =========================================================================

    fn parse_enum_decl(&mut self, is_declare: bool, is_const: bool) -> ParseResult<EnumDecl> {
        self.consume(TokenKind::Enum)?;
        let name = self.parse_identifier()?;
        self.consume(TokenKind::LBrace)?;

        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let start = self.current_token().span;
            let member_name = self.parse_property_name()?;
            let init = if self.check(TokenKind::Eq) {
                self.advance();
                Some(self.parse_initializer())
            } else {
                None
            };
            members.push(Node::new(
                EnumMember {
                    name: member_name,
                    init,
                },
                self.span_from(start),
            ));
            if !self.check(TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RBrace)?;

        Ok(EnumDecl {
            name,
            members,
            is_const,
            is_declare,
        })
    }

    // =========================================================================
    // Modules
    // =========================================================================

    fn parse_module_decl(&mut self, is_declare: bool) -> ParseResult<ModuleDecl> {
        self.advance(); // module / namespace

        if self.check(TokenKind::StringLiteral) {
            let name = ModuleName::String(self.advance().value.clone());
            let body = if self.check(TokenKind::LBrace) {
                Some(self.parse_module_block()?)
            } else {
                self.consume_semicolon();
                None
            };
            return Ok(ModuleDecl {
                name,
                body,
                is_declare,
                is_global: false,
            });
        }

        self.parse_namespace_segments(is_declare)
    }

    /// `A.B.C { ... }` becomes `A` containing `B` containing `C`.
    fn parse_namespace_segments(&mut self, is_declare: bool) -> ParseResult<ModuleDecl> {
        let name = self.parse_identifier()?;

        let body = if self.check(TokenKind::Dot) {
            self.advance();
            let start = self.current_token().span;
            let inner = self.parse_namespace_segments(is_declare)?;
            ModuleBody::Namespace(Box::new(Node::new(inner, self.span_from(start))))
        } else {
            self.parse_module_block()?
        };

        Ok(ModuleDecl {
            name: ModuleName::Ident(name),
            body: Some(body),
            is_declare,
            is_global: false,
        })
    }

    fn parse_global_augmentation(&mut self, is_declare: bool) -> ParseResult<ModuleDecl> {
        let token = self.consume(TokenKind::Global)?;
        let name = Node::new(Ident::new("global"), token.span);
        let body = self.parse_module_block()?;
        Ok(ModuleDecl {
            name: ModuleName::Ident(name),
            body: Some(body),
            is_declare,
            is_global: true,
        })
    }

    fn parse_module_block(&mut self) -> ParseResult<ModuleBody> {
        self.consume(TokenKind::LBrace)?;
        let items = self.parse_module_items(true);
        self.consume(TokenKind::RBrace)?;
        Ok(ModuleBody::Block(items))
    }

    // =========================================================================
    // Variables
    // =========================================================================

    fn parse_var_decl(&mut self, is_declare: bool) -> ParseResult<VarDecl> {
        let kind = match self.advance().kind {
            TokenKind::Const => VarDeclKind::Const,
            TokenKind::Let => VarDeclKind::Let,
            _ => VarDeclKind::Var,
        };

        let mut declarations = Vec::new();
        loop {
            let start = self.current_token().span;
            if self.check(TokenKind::LBrace) || self.check(TokenKind::LBracket) {
                // Destructuring declarations bind nothing nameable here
                self.skip_balanced()?;
                if self.check(TokenKind::Colon) {
                    self.advance();
                    self.parse_type()?;
                }
                if self.check(TokenKind::Eq) {
                    self.advance();
                    self.skip_expression();
                }
            } else {
                let name = self.parse_identifier()?;
                if self.check(TokenKind::Bang) {
                    self.advance();
                }
                let type_annotation = if self.check(TokenKind::Colon) {
                    self.advance();
                    Some(Box::new(self.parse_type()?))
                } else {
                    None
                };
                let init = if self.check(TokenKind::Eq) {
                    self.advance();
                    Some(self.parse_initializer())
                } else {
                    None
                };
                declarations.push(Node::new(
                    VarDeclarator {
                        name,
                        type_annotation,
                        init,
                    },
                    self.span_from(start),
                ));
            }

            if !self.check(TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.consume_semicolon();

        Ok(VarDecl {
            kind,
            declarations,
            is_declare,
        })
    }
}
