//! Helper methods and utilities

use super::*;

impl Parser {
    pub(crate) fn parse_identifier(&mut self) -> ParseResult<Node<Ident>> {
        if !self.current_token().is_identifier() {
            return Err(self.error(format!(
                "Expected identifier, found {:?}",
                self.current_token().kind
            )));
        }
        let token = self.advance();
        Ok(Node::new(Ident::new(token.value.clone()), token.span))
    }

    /// Identifier in a position where reserved words are allowed
    /// (`A.default`, `{ import: T }`, export specifiers).
    pub(crate) fn parse_identifier_name(&mut self) -> ParseResult<Node<Ident>> {
        if !self.current_token().is_identifier_name() {
            return Err(self.error(format!(
                "Expected identifier name, found {:?}",
                self.current_token().kind
            )));
        }
        let token = self.advance();
        Ok(Node::new(Ident::new(token.value.clone()), token.span))
    }

    pub(crate) fn parse_entity_name(&mut self) -> ParseResult<Node<EntityName>> {
        let start = self.current_token().span;
        let mut parts = vec![self.parse_identifier_name()?.value];
        while self.check(TokenKind::Dot)
            && self.peek_token(1).is_some_and(|t| t.is_identifier_name())
        {
            self.advance();
            parts.push(self.parse_identifier_name()?.value);
        }
        Ok(Node::new(EntityName { parts }, self.span_from(start)))
    }

    pub(crate) fn is_property_name_start_at(&self, offset: usize) -> bool {
        self.peek_token(offset).is_some_and(|token| {
            token.is_identifier_name()
                || matches!(
                    token.kind,
                    TokenKind::StringLiteral
                        | TokenKind::NumberLiteral
                        | TokenKind::LBracket
                        | TokenKind::Hash
                )
        })
    }

    pub(crate) fn parse_property_name(&mut self) -> ParseResult<PropertyName> {
        match self.current_token().kind {
            TokenKind::StringLiteral => {
                let value = self.advance().value.clone();
                Ok(PropertyName::String(value))
            }
            TokenKind::NumberLiteral => {
                let value = parse_number_literal(&self.advance().value);
                Ok(PropertyName::Number(value))
            }
            TokenKind::Hash => {
                let start = self.advance().span;
                let ident = self.parse_identifier_name()?;
                Ok(PropertyName::Ident(Node::new(
                    Ident::new(format!("#{}", ident.value.name)),
                    start.merge(&ident.span),
                )))
            }
            TokenKind::LBracket => {
                self.advance();
                let name = match self.current_token().kind {
                    TokenKind::StringLiteral => PropertyName::String(self.advance().value.clone()),
                    TokenKind::NumberLiteral => {
                        PropertyName::Number(parse_number_literal(&self.advance().value))
                    }
                    _ => PropertyName::Computed(self.parse_entity_name()?),
                };
                self.consume(TokenKind::RBracket)?;
                Ok(name)
            }
            _ if self.current_token().is_identifier_name() => {
                Ok(PropertyName::Ident(self.parse_identifier_name()?))
            }
            _ => Err(self.error("Expected property name".to_string())),
        }
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Parses `( params )` including the parentheses.
    pub(crate) fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.consume(TokenKind::LParen)?;
        let mut params = Vec::new();

        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            let index = params.len();
            params.push(self.parse_param(index)?);
            if !self.check(TokenKind::RParen) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RParen)?;

        Ok(params)
    }

    pub(crate) fn parse_param(&mut self, index: usize) -> ParseResult<Param> {
        let start = self.current_token().span;
        self.skip_decorators()?;

        let mut accessibility = None;
        while self.is_parameter_modifier() {
            match self.advance().kind {
                TokenKind::Private => accessibility = Some(AccessModifier::Private),
                TokenKind::Protected => accessibility = Some(AccessModifier::Protected),
                _ => {
                    accessibility.get_or_insert(AccessModifier::Public);
                }
            }
        }

        let is_rest = if self.check(TokenKind::DotDotDot) {
            self.advance();
            true
        } else {
            false
        };

        let name = match self.current_token().kind {
            TokenKind::This => {
                self.advance();
                ParamName::This
            }
            TokenKind::LBrace | TokenKind::LBracket => {
                self.skip_balanced()?;
                ParamName::Pattern(index)
            }
            _ => ParamName::Ident(self.parse_identifier()?),
        };

        let optional = if self.check(TokenKind::Question) {
            self.advance();
            true
        } else {
            false
        };

        let type_annotation = if self.check(TokenKind::Colon) {
            self.advance();
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };

        let has_initializer = if self.check(TokenKind::Eq) {
            self.advance();
            self.skip_expression();
            true
        } else {
            false
        };

        Ok(Param {
            name,
            type_annotation,
            optional,
            is_rest,
            has_initializer,
            accessibility,
            span: self.span_from(start),
        })
    }

    /// `public x`, `readonly y`, but not a parameter named `public`.
    fn is_parameter_modifier(&self) -> bool {
        matches!(
            self.current_token().kind,
            TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Readonly
                | TokenKind::Override
        ) && self.peek_token(1).is_some_and(|next| {
            next.is_identifier_name()
                || matches!(
                    next.kind,
                    TokenKind::LBrace | TokenKind::LBracket | TokenKind::DotDotDot
                )
        })
    }

    pub(crate) fn skip_decorators(&mut self) -> ParseResult<()> {
        while self.check(TokenKind::At) {
            self.advance();
            self.parse_entity_name()?;
            if self.check(TokenKind::LParen) {
                self.skip_balanced()?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Initializers and skipped code
    // =========================================================================

    /// Parses the expression after `=`. Literal initializers are kept since
    /// they give `const` declarations their literal types.
    pub(crate) fn parse_initializer(&mut self) -> Initializer {
        let negative = self.check(TokenKind::Minus)
            && self.peek_kind(1) == Some(TokenKind::NumberLiteral);
        let offset = usize::from(negative);
        let literal_end = self.peek_token(offset + 1).map_or(true, |t| {
            matches!(
                t.kind,
                TokenKind::Semicolon
                    | TokenKind::Comma
                    | TokenKind::RBrace
                    | TokenKind::RParen
                    | TokenKind::Eof
            ) || t.has_newline_before
        });

        if literal_end {
            let literal = self.peek_token(offset).map(|t| (t.kind, t.value.clone()));
            let init = match literal {
                Some((TokenKind::StringLiteral, value)) => Some(Initializer::String(value)),
                Some((TokenKind::NumberLiteral, value)) => {
                    let value = parse_number_literal(&value);
                    Some(Initializer::Number(if negative { -value } else { value }))
                }
                Some((TokenKind::True, _)) => Some(Initializer::Boolean(true)),
                Some((TokenKind::False, _)) => Some(Initializer::Boolean(false)),
                _ => None,
            };
            if let Some(init) = init {
                for _ in 0..=offset {
                    self.advance();
                }
                return init;
            }
        }

        self.skip_expression();
        Initializer::Other
    }

    /// Skips a bracketed group starting at the current opening token,
    /// including everything nested inside it.
    pub(crate) fn skip_balanced(&mut self) -> ParseResult<()> {
        let open_span = self.current_token().span;
        let mut depth = 0usize;
        loop {
            if self.is_at_end() {
                return Err(ParseError {
                    message: "Unbalanced brackets".to_string(),
                    span: open_span,
                });
            }
            match self.advance().kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    /// Skips an expression up to a top-level `,`, `;` or closing bracket.
    pub(crate) fn skip_expression(&mut self) {
        let start = self.current;
        while !self.is_at_end() {
            let token = self.current_token();
            if self.current > start && token.has_newline_before && self.is_declaration_start() {
                return;
            }
            match token.kind {
                TokenKind::Comma
                | TokenKind::Semicolon
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace => return,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    if self.skip_balanced().is_err() {
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skips an executable statement. A statement ends at a top-level `;`,
    /// before the closing brace of the enclosing block, or after a block
    /// followed by a line break.
    pub(crate) fn skip_statement(&mut self) {
        let start = self.current;
        while !self.is_at_end() {
            let token = self.current_token();
            if self.current > start
                && token.has_newline_before
                && (self.is_declaration_start()
                    || matches!(token.kind, TokenKind::Export | TokenKind::Import))
            {
                return;
            }
            match token.kind {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    if self.current == start {
                        self.advance();
                    }
                    return;
                }
                TokenKind::LBrace => {
                    if self.skip_balanced().is_err() {
                        return;
                    }
                    let next = self.current_token();
                    if next.has_newline_before && next.kind != TokenKind::Else {
                        return;
                    }
                }
                TokenKind::LParen | TokenKind::LBracket => {
                    if self.skip_balanced().is_err() {
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // =========================================================================
    // Utility Methods (Token Manipulation)
    // =========================================================================

    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous_token(&self) -> &Token {
        &self.tokens[(self.current.saturating_sub(1)).min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous_token()
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.current_token().kind == kind
    }

    pub(crate) fn peek_token(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.current + offset)
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.peek_token(offset).map(|t| t.kind)
    }

    /// True when the token at `offset` starts on the same line as the one
    /// before it.
    pub(crate) fn same_line(&self, offset: usize) -> bool {
        self.peek_token(offset).is_some_and(|t| !t.has_newline_before)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.current_token().kind == TokenKind::Eof
    }

    pub(crate) fn consume(&mut self, kind: TokenKind) -> ParseResult<&Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {:?}, found {:?}", kind, self.current_token().kind)))
        }
    }

    pub(crate) fn consume_semicolon(&mut self) {
        if self.check(TokenKind::Semicolon) {
            self.advance();
        }
    }

    pub(crate) fn span_from(&self, start: Span) -> Span {
        let end = self.previous_token().span;
        if self.current == 0 || end.end < start.start {
            start
        } else {
            start.merge(&end)
        }
    }

    pub(crate) fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            span: self.current_token().span,
        }
    }

    /// Recovers after a failed item: skips to the end of the current
    /// statement, stepping over nested blocks.
    pub(crate) fn synchronize(&mut self) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            match self.current_token().kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::Export
                | TokenKind::Declare
                | TokenKind::Interface
                | TokenKind::Class
                | TokenKind::Function
                    if depth == 0 && self.current_token().has_newline_before =>
                {
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }
}
