//! Type expression parsing

use super::*;

impl Parser {
    pub(crate) fn parse_type(&mut self) -> ParseResult<Node<Type>> {
        if self.is_function_type_start() {
            return self.parse_function_type(false, false);
        }
        if self.check(TokenKind::New) {
            self.advance();
            return self.parse_function_type(true, false);
        }
        if self.check(TokenKind::Abstract) && self.peek_kind(1) == Some(TokenKind::New) {
            self.advance();
            self.advance();
            return self.parse_function_type(true, true);
        }

        let start = self.current_token().span;
        let check_type = self.parse_union_type()?;

        if !self.no_conditional_types && self.check(TokenKind::Extends) && self.same_line(0) {
            self.advance();
            let extends_type = self.with_conditional_types(false, Self::parse_type)?;
            self.consume(TokenKind::Question)?;
            let true_type = self.with_conditional_types(true, Self::parse_type)?;
            self.consume(TokenKind::Colon)?;
            let false_type = self.with_conditional_types(true, Self::parse_type)?;
            return Ok(Node::new(
                Type::Conditional {
                    check_type: Box::new(check_type),
                    extends_type: Box::new(extends_type),
                    true_type: Box::new(true_type),
                    false_type: Box::new(false_type),
                },
                self.span_from(start),
            ));
        }

        Ok(check_type)
    }

    /// Runs `parse` with conditional types allowed or disallowed, restoring
    /// the previous setting afterwards.
    fn with_conditional_types<T>(
        &mut self,
        allowed: bool,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        let saved = std::mem::replace(&mut self.no_conditional_types, !allowed);
        let result = parse(self);
        self.no_conditional_types = saved;
        result
    }

    fn parse_union_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;
        if self.check(TokenKind::Pipe) {
            self.advance();
        }

        let mut types = vec![self.parse_intersection_type()?];
        while self.check(TokenKind::Pipe) {
            self.advance();
            types.push(self.parse_intersection_type()?);
        }

        if types.len() == 1 {
            Ok(types.remove(0))
        } else {
            Ok(Node::new(Type::Union(types), self.span_from(start)))
        }
    }

    fn parse_intersection_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;
        if self.check(TokenKind::Amp) {
            self.advance();
        }

        let mut types = vec![self.parse_type_operator()?];
        while self.check(TokenKind::Amp) {
            self.advance();
            types.push(self.parse_type_operator()?);
        }

        if types.len() == 1 {
            Ok(types.remove(0))
        } else {
            Ok(Node::new(Type::Intersection(types), self.span_from(start)))
        }
    }

    /// Function and constructor types are also accepted as the last
    /// constituent of a union or intersection.
    fn parse_type_operator(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;

        match self.current_token().kind {
            TokenKind::Keyof => {
                self.advance();
                let operand = self.parse_type_operator()?;
                Ok(Node::new(Type::Keyof(Box::new(operand)), self.span_from(start)))
            }
            TokenKind::Unique if self.peek_token(1).is_some_and(|t| t.value == "symbol") => {
                self.advance();
                self.advance();
                Ok(Node::new(Type::UniqueSymbol, self.span_from(start)))
            }
            TokenKind::Readonly => {
                self.advance();
                let operand = self.parse_type_operator()?;
                Ok(Node::new(Type::Readonly(Box::new(operand)), self.span_from(start)))
            }
            TokenKind::Infer => {
                self.advance();
                let param = self.parse_infer_type_param()?;
                Ok(Node::new(Type::Infer(param), self.span_from(start)))
            }
            _ if self.is_function_type_start() || self.check(TokenKind::New) => self.parse_type(),
            _ => self.parse_postfix_type(),
        }
    }

    /// `infer U` or `infer U extends C`. Outside the extends clause of a
    /// conditional type, `infer U extends C ?` reads as a conditional type
    /// instead of a constraint.
    fn parse_infer_type_param(&mut self) -> ParseResult<TypeParam> {
        let name = self.parse_identifier()?;
        let mut constraint = None;

        if self.check(TokenKind::Extends) {
            let saved = self.current;
            let saved_errors = self.errors.len();
            self.advance();
            match self.with_conditional_types(false, Self::parse_type) {
                Ok(ty) if self.no_conditional_types || !self.check(TokenKind::Question) => {
                    constraint = Some(Box::new(ty))
                }
                _ => {
                    self.current = saved;
                    self.errors.truncate(saved_errors);
                }
            }
        }

        Ok(TypeParam {
            name,
            constraint,
            default: None,
        })
    }

    fn parse_postfix_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;
        let mut ty = self.with_conditional_types(true, Self::parse_primary_type)?;

        while self.check(TokenKind::LBracket) && self.same_line(0) {
            self.advance();
            if self.check(TokenKind::RBracket) {
                self.advance();
                ty = Node::new(Type::Array(Box::new(ty)), self.span_from(start));
            } else {
                let index_type = self.with_conditional_types(true, Self::parse_type)?;
                self.consume(TokenKind::RBracket)?;
                ty = Node::new(
                    Type::IndexedAccess {
                        object_type: Box::new(ty),
                        index_type: Box::new(index_type),
                    },
                    self.span_from(start),
                );
            }
        }

        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;

        let ty = match self.current_token().kind {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.consume(TokenKind::RParen)?;
                Type::Paren(Box::new(inner))
            }
            TokenKind::LBracket => self.parse_tuple_type()?,
            TokenKind::LBrace => {
                if self.is_mapped_type_start() {
                    Type::Mapped(self.parse_mapped_type()?)
                } else {
                    Type::Object(ObjectType {
                        members: self.parse_object_type_members()?,
                    })
                }
            }
            TokenKind::Void => {
                self.advance();
                Type::Keyword(KeywordType::Void)
            }
            TokenKind::Null => {
                self.advance();
                Type::Keyword(KeywordType::Null)
            }
            TokenKind::This => {
                self.advance();
                Type::This
            }
            TokenKind::True | TokenKind::False => {
                let value = self.advance().kind == TokenKind::True;
                Type::Literal(LiteralType::Boolean(value))
            }
            TokenKind::StringLiteral => {
                let value = self.advance().value.clone();
                Type::Literal(LiteralType::String(value))
            }
            TokenKind::NumberLiteral => {
                let value = parse_number_literal(&self.advance().value);
                Type::Literal(LiteralType::Number(value))
            }
            TokenKind::BigIntLiteral => {
                let value = self.advance().value.clone();
                Type::Literal(LiteralType::BigInt(value))
            }
            TokenKind::Minus => {
                self.advance();
                match self.current_token().kind {
                    TokenKind::NumberLiteral => {
                        let value = parse_number_literal(&self.advance().value);
                        Type::Literal(LiteralType::Number(-value))
                    }
                    TokenKind::BigIntLiteral => {
                        let value = format!("-{}", self.advance().value);
                        Type::Literal(LiteralType::BigInt(value))
                    }
                    _ => return Err(self.error("Expected numeric literal after '-'".to_string())),
                }
            }
            TokenKind::TemplateLiteral => self.parse_template_literal_type()?,
            TokenKind::Typeof => self.parse_type_query()?,
            TokenKind::Import => self.parse_import_type(false)?,
            _ if self.current_token().is_identifier_name() => {
                let is_keyword = self.current_token().kind == TokenKind::Identifier
                    && self.peek_kind(1) != Some(TokenKind::Dot);
                if let Some(keyword) = KeywordType::from_name(&self.current_token().value)
                    .filter(|_| is_keyword)
                {
                    self.advance();
                    Type::Keyword(keyword)
                } else {
                    let name = self.parse_entity_name()?;
                    let type_args = self.parse_optional_type_args()?;
                    Type::TypeRef { name, type_args }
                }
            }
            kind => return Err(self.error(format!("Expected type, found {:?}", kind))),
        };

        Ok(Node::new(ty, self.span_from(start)))
    }

    fn parse_tuple_type(&mut self) -> ParseResult<Type> {
        self.consume(TokenKind::LBracket)?;
        let mut elements = Vec::new();

        while !self.check(TokenKind::RBracket) && !self.is_at_end() {
            let is_rest = if self.check(TokenKind::DotDotDot) {
                self.advance();
                true
            } else {
                false
            };

            let mut name = None;
            let mut optional = false;
            let named = self.current_token().is_identifier_name()
                && (self.peek_kind(1) == Some(TokenKind::Colon)
                    || (self.peek_kind(1) == Some(TokenKind::Question)
                        && self.peek_kind(2) == Some(TokenKind::Colon)));
            if named {
                name = Some(self.parse_identifier_name()?.value);
                if self.check(TokenKind::Question) {
                    self.advance();
                    optional = true;
                }
                self.consume(TokenKind::Colon)?;
            }

            let ty = self.parse_type()?;
            if self.check(TokenKind::Question) {
                self.advance();
                optional = true;
            }

            elements.push(TupleElement {
                ty,
                name,
                optional,
                is_rest,
            });

            if !self.check(TokenKind::RBracket) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RBracket)?;
        Ok(Type::Tuple(elements))
    }

    fn parse_type_query(&mut self) -> ParseResult<Type> {
        self.consume(TokenKind::Typeof)?;
        if self.check(TokenKind::Import) {
            return self.parse_import_type(true);
        }
        let expr = self.parse_entity_name()?;
        let type_args = if self.same_line(0) {
            self.parse_optional_type_args()?
        } else {
            None
        };
        Ok(Type::TypeQuery { expr, type_args })
    }

    fn parse_import_type(&mut self, is_typeof: bool) -> ParseResult<Type> {
        self.consume(TokenKind::Import)?;
        self.consume(TokenKind::LParen)?;
        let argument = self.consume(TokenKind::StringLiteral)?.value.clone();
        self.consume(TokenKind::RParen)?;

        let qualifier = if self.check(TokenKind::Dot) {
            self.advance();
            Some(self.parse_entity_name()?)
        } else {
            None
        };
        let type_args = self.parse_optional_type_args()?;

        Ok(Type::ImportType {
            argument,
            qualifier,
            type_args,
            is_typeof,
        })
    }

    /// Template literal types are re-tokenized piecewise: the text between
    /// `${` and `}` is parsed as a type.
    fn parse_template_literal_type(&mut self) -> ParseResult<Type> {
        let token = self.advance().clone();
        let mut parts = Vec::new();
        let mut types = Vec::new();
        let mut text = String::new();
        let mut chars = token.value.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch == '$' && chars.peek() == Some(&'{') {
                chars.next();
                parts.push(std::mem::take(&mut text));
                let mut inner = String::new();
                let mut depth = 1usize;
                for c in chars.by_ref() {
                    match c {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    inner.push(c);
                }
                types.push(self.parse_embedded_type(&inner, token.span)?);
            } else {
                text.push(ch);
            }
        }
        parts.push(text);

        Ok(Type::TemplateLiteral { parts, types })
    }

    fn parse_embedded_type(&mut self, source: &str, span: Span) -> ParseResult<Node<Type>> {
        let mut lexer = Lexer::with_file_id(source, span.file_id);
        let tokens = lexer
            .tokenize()
            .into_iter()
            .map(|mut t| {
                t.span = span;
                t
            })
            .collect();
        let mut parser = Parser::new(tokens);
        let ty = parser.parse_type()?;
        if let Some(err) = parser.errors.into_iter().next() {
            return Err(err);
        }
        Ok(ty)
    }

    // =========================================================================
    // Mapped types
    // =========================================================================

    fn is_mapped_type_start(&self) -> bool {
        let mut offset = 1;
        if matches!(self.peek_kind(offset), Some(TokenKind::Plus) | Some(TokenKind::Minus)) {
            if self.peek_kind(offset + 1) != Some(TokenKind::Readonly) {
                return false;
            }
            offset += 1;
        }
        if self.peek_kind(offset) == Some(TokenKind::Readonly) {
            offset += 1;
        }
        self.peek_kind(offset) == Some(TokenKind::LBracket)
            && self.peek_token(offset + 1).is_some_and(|t| t.is_identifier())
            && self.peek_kind(offset + 2) == Some(TokenKind::In)
    }

    fn parse_mapped_modifier(&mut self, keyword: TokenKind) -> Option<MappedModifier> {
        let modifier = match self.current_token().kind {
            TokenKind::Plus if self.peek_kind(1) == Some(keyword) => MappedModifier::Add,
            TokenKind::Minus if self.peek_kind(1) == Some(keyword) => MappedModifier::Remove,
            kind if kind == keyword => {
                self.advance();
                return Some(MappedModifier::Present);
            }
            _ => return None,
        };
        self.advance();
        self.advance();
        Some(modifier)
    }

    fn parse_mapped_type(&mut self) -> ParseResult<MappedType> {
        self.consume(TokenKind::LBrace)?;
        let readonly = self.parse_mapped_modifier(TokenKind::Readonly);

        self.consume(TokenKind::LBracket)?;
        let type_param = self.parse_identifier()?;
        self.consume(TokenKind::In)?;
        let constraint = self.parse_type()?;
        let name_type = if self.check(TokenKind::As) {
            self.advance();
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };
        self.consume(TokenKind::RBracket)?;

        let optional = self.parse_mapped_modifier(TokenKind::Question);
        let value_type = if self.check(TokenKind::Colon) {
            self.advance();
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };
        if self.check(TokenKind::Semicolon) || self.check(TokenKind::Comma) {
            self.advance();
        }
        self.consume(TokenKind::RBrace)?;

        Ok(MappedType {
            type_param,
            constraint: Box::new(constraint),
            name_type,
            value_type,
            readonly,
            optional,
        })
    }

    // =========================================================================
    // Object type members (type literals and interface bodies)
    // =========================================================================

    /// Parses `{ members }`. A member that fails to parse is reported and
    /// skipped; the remaining members are still collected.
    pub(crate) fn parse_object_type_members(
        &mut self,
    ) -> ParseResult<Vec<Node<ObjectTypeMember>>> {
        self.consume(TokenKind::LBrace)?;
        let mut members = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            match self.parse_type_member() {
                Ok(member) => members.push(member),
                Err(err) => {
                    self.errors.push(err);
                    self.skip_to_member_end();
                }
            }
            while self.check(TokenKind::Semicolon) || self.check(TokenKind::Comma) {
                self.advance();
            }
        }

        self.consume(TokenKind::RBrace)?;
        Ok(members)
    }

    /// Skips to the next `;`/`,` or the closing brace of the member list.
    pub(crate) fn skip_to_member_end(&mut self) {
        let start = self.current;
        while !self.is_at_end() {
            match self.current_token().kind {
                TokenKind::Semicolon | TokenKind::Comma => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace => {
                    if self.current == start {
                        self.advance();
                    }
                    return;
                }
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => {
                    if self.skip_balanced().is_err() {
                        return;
                    }
                }
                _ => {
                    if self.current > start && self.current_token().has_newline_before {
                        return;
                    }
                    self.advance();
                }
            }
        }
    }

    fn parse_type_member(&mut self) -> ParseResult<Node<ObjectTypeMember>> {
        let start = self.current_token().span;

        let member = if self.check(TokenKind::LParen) || self.check(TokenKind::Lt) {
            ObjectTypeMember::CallSignature(self.parse_signature()?)
        } else if self.check(TokenKind::New)
            && matches!(self.peek_kind(1), Some(TokenKind::LParen) | Some(TokenKind::Lt))
        {
            self.advance();
            ObjectTypeMember::ConstructSignature(self.parse_signature()?)
        } else {
            let readonly = self.check(TokenKind::Readonly) && self.is_modifier_before_name();
            if readonly {
                self.advance();
            }

            if self.is_index_signature_start() {
                ObjectTypeMember::IndexSignature(self.parse_index_signature(readonly)?)
            } else if matches!(self.current_token().kind, TokenKind::Get | TokenKind::Set)
                && self.is_modifier_before_name()
            {
                let is_get = self.advance().kind == TokenKind::Get;
                let name = self.parse_property_name()?;
                let signature = self.parse_signature()?;
                if is_get {
                    ObjectTypeMember::Getter {
                        name,
                        return_type: signature.return_type,
                    }
                } else {
                    let param = signature
                        .params
                        .into_iter()
                        .find(|p| !matches!(p.name, ParamName::This))
                        .ok_or_else(|| self.error("Setter must have a parameter".to_string()))?;
                    ObjectTypeMember::Setter { name, param }
                }
            } else {
                let name = self.parse_property_name()?;
                let optional = if self.check(TokenKind::Question) {
                    self.advance();
                    true
                } else {
                    false
                };

                if self.check(TokenKind::LParen) || self.check(TokenKind::Lt) {
                    ObjectTypeMember::Method {
                        name,
                        signature: self.parse_signature()?,
                        optional,
                    }
                } else {
                    let ty = if self.check(TokenKind::Colon) {
                        self.advance();
                        Some(self.parse_type()?)
                    } else {
                        None
                    };
                    ObjectTypeMember::Property {
                        name,
                        ty,
                        optional,
                        readonly,
                    }
                }
            }
        };

        Ok(Node::new(member, self.span_from(start)))
    }

    /// A modifier keyword (`readonly`, `get`, `static`, ...) is a modifier
    /// only when a member name follows it on the same line.
    pub(crate) fn is_modifier_before_name(&self) -> bool {
        self.same_line(1) && self.is_property_name_start_at(1)
    }

    pub(crate) fn is_index_signature_start(&self) -> bool {
        self.check(TokenKind::LBracket)
            && self.peek_token(1).is_some_and(|t| t.is_identifier_name())
            && self.peek_kind(2) == Some(TokenKind::Colon)
    }

    pub(crate) fn parse_index_signature(&mut self, readonly: bool) -> ParseResult<IndexSignature> {
        self.consume(TokenKind::LBracket)?;
        let key_name = self.parse_identifier_name()?;
        self.consume(TokenKind::Colon)?;
        let key_type = self.parse_type()?;
        self.consume(TokenKind::RBracket)?;
        self.consume(TokenKind::Colon)?;
        let value_type = self.parse_type()?;
        Ok(IndexSignature {
            key_name,
            key_type,
            value_type,
            readonly,
        })
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    /// `<T>(params): R` with every part but the parameter list optional.
    pub(crate) fn parse_signature(&mut self) -> ParseResult<SignatureDecl> {
        let type_params = self.parse_optional_type_params()?;
        let params = self.parse_params()?;
        let return_type = if self.check(TokenKind::Colon) {
            self.advance();
            Some(Box::new(self.parse_return_type()?))
        } else {
            None
        };
        Ok(SignatureDecl {
            type_params,
            params,
            return_type,
        })
    }

    /// Return type annotation, including the predicate forms
    /// `x is T`, `asserts x`, `asserts x is T` and `this is T`.
    pub(crate) fn parse_return_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;
        let is_param_token = |t: &Token| t.is_identifier() || t.kind == TokenKind::This;

        let asserts = self.check(TokenKind::Asserts)
            && self.same_line(1)
            && self.peek_token(1).is_some_and(is_param_token);
        let offset = usize::from(asserts);
        let is_predicate = asserts
            || (self.peek_token(0).is_some_and(is_param_token)
                && self.peek_kind(1) == Some(TokenKind::Is)
                && self.same_line(1));

        if !is_predicate {
            return self.parse_type();
        }

        for _ in 0..offset {
            self.advance();
        }
        let parameter = self.advance().value.clone();
        let ty = if self.check(TokenKind::Is) && self.same_line(0) {
            self.advance();
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };

        Ok(Node::new(
            Type::Predicate {
                asserts,
                parameter,
                ty,
            },
            self.span_from(start),
        ))
    }

    fn parse_function_type(
        &mut self,
        is_constructor: bool,
        is_abstract: bool,
    ) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;
        let type_params = self.with_conditional_types(true, Self::parse_optional_type_params)?;
        let params = self.with_conditional_types(true, Self::parse_params)?;
        self.consume(TokenKind::FatArrow)?;
        let return_type = self.parse_return_type()?;

        Ok(Node::new(
            Type::Function(FunctionType {
                signature: SignatureDecl {
                    type_params,
                    params,
                    return_type: Some(Box::new(return_type)),
                },
                is_constructor,
                is_abstract,
            }),
            self.span_from(start),
        ))
    }

    /// Distinguishes `(a: T) => R` and `<T>(x: T) => R` from a
    /// parenthesized type.
    fn is_function_type_start(&self) -> bool {
        if self.check(TokenKind::Lt) {
            return true;
        }
        if !self.check(TokenKind::LParen) {
            return false;
        }

        let mut offset = 1;
        match self.peek_kind(offset) {
            Some(TokenKind::RParen) | Some(TokenKind::DotDotDot) => return true,
            _ => {}
        }
        while matches!(
            self.peek_kind(offset),
            Some(TokenKind::Public)
                | Some(TokenKind::Private)
                | Some(TokenKind::Protected)
                | Some(TokenKind::Readonly)
        ) && self.peek_token(offset + 1).is_some_and(|t| t.is_identifier())
        {
            offset += 1;
        }

        match self.peek_token(offset) {
            Some(t) if t.is_identifier() || t.kind == TokenKind::This => offset += 1,
            Some(t) if matches!(t.kind, TokenKind::LBrace | TokenKind::LBracket) => {
                match self.matching_close(offset) {
                    Some(close) => offset = close + 1,
                    None => return false,
                }
            }
            _ => return false,
        }

        match self.peek_kind(offset) {
            Some(TokenKind::Colon)
            | Some(TokenKind::Comma)
            | Some(TokenKind::Question)
            | Some(TokenKind::Eq) => true,
            Some(TokenKind::RParen) => self.peek_kind(offset + 1) == Some(TokenKind::FatArrow),
            _ => false,
        }
    }

    /// Offset of the bracket closing the one at `offset`.
    fn matching_close(&self, offset: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut index = offset;
        loop {
            match self.peek_kind(index)? {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(index);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
            index += 1;
        }
    }

    // =========================================================================
    // Type parameters and arguments
    // =========================================================================

    pub(crate) fn parse_optional_type_params(&mut self) -> ParseResult<Option<Vec<TypeParam>>> {
        if !self.check(TokenKind::Lt) {
            return Ok(None);
        }
        self.advance();

        let mut params = Vec::new();
        while !self.check(TokenKind::Gt) && !self.is_at_end() {
            // Variance and const modifiers: <in T>, <out T>, <const T>
            while (matches!(self.current_token().kind, TokenKind::In | TokenKind::Const)
                || self.current_token().value == "out")
                && self.peek_token(1).is_some_and(|t| t.is_identifier())
            {
                self.advance();
            }

            let name = self.parse_identifier()?;
            let constraint = if self.check(TokenKind::Extends) {
                self.advance();
                Some(Box::new(self.parse_type()?))
            } else {
                None
            };
            let default = if self.check(TokenKind::Eq) {
                self.advance();
                Some(Box::new(self.parse_type()?))
            } else {
                None
            };
            params.push(TypeParam {
                name,
                constraint,
                default,
            });

            if !self.check(TokenKind::Gt) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::Gt)?;

        Ok(Some(params))
    }

    pub(crate) fn parse_optional_type_args(&mut self) -> ParseResult<Option<Vec<Node<Type>>>> {
        if !self.check(TokenKind::Lt) {
            return Ok(None);
        }
        self.advance();

        let mut args = Vec::new();
        while !self.check(TokenKind::Gt) && !self.is_at_end() {
            args.push(self.parse_type()?);
            if !self.check(TokenKind::Gt) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::Gt)?;

        Ok(Some(args))
    }
}
