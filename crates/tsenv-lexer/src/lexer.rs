use tsenv_ast::Span;
use crate::token::{Token, TokenKind};

/// Punctuators, longest first so a greedy scan picks `===` over `==`.
///
/// `>` is always a single token: the declaration grammar never needs shift
/// or comparison operators, and splitting them keeps nested type argument
/// lists (`Array<Array<T>>`) simple for the parser.
const PUNCTUATORS: &[(&str, TokenKind)] = &[
    ("...", TokenKind::DotDotDot),
    ("===", TokenKind::EqEqEq),
    ("!==", TokenKind::BangEqEq),
    ("**", TokenKind::StarStar),
    ("=>", TokenKind::FatArrow),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::BangEq),
    ("<=", TokenKind::LtEq),
    ("<<", TokenKind::LtLt),
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("??", TokenKind::QuestionQuestion),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("&=", TokenKind::AmpEq),
    ("|=", TokenKind::PipeEq),
    ("^=", TokenKind::CaretEq),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("=", TokenKind::Eq),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("!", TokenKind::Bang),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("~", TokenKind::Tilde),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    (".", TokenKind::Dot),
    (":", TokenKind::Colon),
    ("?", TokenKind::Question),
    ("@", TokenKind::At),
    ("#", TokenKind::Hash),
];

/// The lexer/tokenizer for TypeScript declaration files.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current_pos: usize,
    current_char: Option<char>,
    file_id: usize,
    saw_newline: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer from source code.
    pub fn new(source: &'a str) -> Self {
        Self::with_file_id(source, 0)
    }

    /// Creates a new lexer with a specific file ID.
    pub fn with_file_id(source: &'a str, file_id: usize) -> Self {
        let mut chars = source.char_indices();
        let current_char = chars.next().map(|(_, c)| c);
        Self {
            source,
            chars,
            current_pos: 0,
            current_char,
            file_id,
            saw_newline: false,
        }
    }

    /// Tokenizes the entire source code and returns all tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Gets the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.saw_newline = false;
        let mut token = match self.skip_whitespace_and_comments() {
            Some(error_token) => error_token,
            None => self.scan_token(),
        };
        token.has_newline_before = self.saw_newline;
        token
    }

    fn scan_token(&mut self) -> Token {
        let start = self.current_pos;

        let Some(ch) = self.current_char else {
            return Token::new(TokenKind::Eof, self.span_from(start), String::new());
        };

        match ch {
            '"' | '\'' => self.read_string_literal(ch),
            '`' => self.read_template_literal(),
            '0'..='9' => self.read_number(),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            'a'..='z' | 'A'..='Z' | '_' | '$' => self.read_identifier_or_keyword(),
            _ if ch.is_alphabetic() => self.read_identifier_or_keyword(),
            _ => self.read_punctuator(ch),
        }
    }

    // Helper methods

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.current_pos, self.file_id)
    }

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos;
            self.current_char = Some(ch);
        } else {
            self.current_pos = self.source.len();
            self.current_char = None;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            match self.current_char {
                Some(ch) if ch.is_whitespace() => {
                    if matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}') {
                        self.saw_newline = true;
                    }
                    self.advance();
                }
                Some('/') if self.peek() == Some('/') => self.skip_single_line_comment(),
                Some('/') if self.peek() == Some('*') => {
                    let start = self.current_pos;
                    if !self.skip_multi_line_comment() {
                        return Some(Token::new(
                            TokenKind::Error,
                            self.span_from(start),
                            "Unterminated multi-line comment".to_string(),
                        ));
                    }
                }
                _ => break,
            }
        }
        None
    }

    fn skip_single_line_comment(&mut self) {
        while let Some(ch) = self.current_char {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_multi_line_comment(&mut self) -> bool {
        // Skip /*
        self.advance();
        self.advance();

        while let Some(ch) = self.current_char {
            if ch == '*' && self.peek() == Some('/') {
                self.advance();
                self.advance();
                return true;
            }
            if ch == '\n' {
                self.saw_newline = true;
            }
            self.advance();
        }
        false
    }

    fn read_punctuator(&mut self, ch: char) -> Token {
        let start = self.current_pos;
        let rest = &self.source[start..];

        // `a?.b` is optional chaining, `a ?.5 : b` a conditional
        if rest.starts_with("?.") && !rest[2..].starts_with(|c: char| c.is_ascii_digit()) {
            self.advance();
            self.advance();
            return Token::new(TokenKind::QuestionDot, self.span_from(start), "?.".to_string());
        }

        for (text, kind) in PUNCTUATORS {
            if rest.starts_with(text) {
                for _ in 0..text.len() {
                    self.advance();
                }
                return Token::new(*kind, self.span_from(start), text.to_string());
            }
        }

        self.advance();
        Token::new(
            TokenKind::Error,
            self.span_from(start),
            format!("Unexpected character: {}", ch),
        )
    }

    fn read_string_literal(&mut self, quote: char) -> Token {
        let start = self.current_pos;
        self.advance();

        let mut value = String::new();
        while let Some(ch) = self.current_char {
            match ch {
                _ if ch == quote => {
                    self.advance();
                    return Token::new(TokenKind::StringLiteral, self.span_from(start), value);
                }
                '\\' => {
                    self.advance();
                    if let Some(escaped) = self.read_escape() {
                        value.push(escaped);
                    }
                }
                '\n' => break,
                _ => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        Token::new(
            TokenKind::Error,
            self.span_from(start),
            "Unterminated string literal".to_string(),
        )
    }

    /// Reads the escape after a backslash. Line continuations yield `None`.
    fn read_escape(&mut self) -> Option<char> {
        let escaped = self.current_char?;
        match escaped {
            'u' => {
                self.advance();
                Some(self.read_unicode_escape())
            }
            'x' => {
                self.advance();
                Some(self.read_hex_digits(2))
            }
            '\r' | '\n' => {
                self.advance();
                if escaped == '\r' && self.current_char == Some('\n') {
                    self.advance();
                }
                None
            }
            _ => {
                self.advance();
                Some(match escaped {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'b' => '\u{8}',
                    'f' => '\u{c}',
                    'v' => '\u{b}',
                    '0' => '\0',
                    other => other,
                })
            }
        }
    }

    fn read_unicode_escape(&mut self) -> char {
        if self.current_char == Some('{') {
            self.advance();
            let mut code = 0u32;
            while let Some(digit) = self.current_char.and_then(|c| c.to_digit(16)) {
                code = code.saturating_mul(16).saturating_add(digit);
                self.advance();
            }
            if self.current_char == Some('}') {
                self.advance();
            }
            return char::from_u32(code).unwrap_or('\u{FFFD}');
        }
        self.read_hex_digits(4)
    }

    fn read_hex_digits(&mut self, count: usize) -> char {
        let mut code = 0u32;
        for _ in 0..count {
            match self.current_char.and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    code = code * 16 + digit;
                    self.advance();
                }
                None => break,
            }
        }
        char::from_u32(code).unwrap_or('\u{FFFD}')
    }

    /// Reads a whole template literal as one token. Substitutions are kept
    /// verbatim in the value (`a${T}b`); braces inside them are balanced.
    fn read_template_literal(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        let mut value = String::new();
        let mut depth = 0usize;
        while let Some(ch) = self.current_char {
            match ch {
                '`' if depth == 0 => {
                    self.advance();
                    return Token::new(TokenKind::TemplateLiteral, self.span_from(start), value);
                }
                '\\' => {
                    self.advance();
                    if let Some(escaped) = self.read_escape() {
                        value.push(escaped);
                    }
                    continue;
                }
                '$' if self.peek() == Some('{') => {
                    value.push_str("${");
                    self.advance();
                    self.advance();
                    depth += 1;
                    continue;
                }
                '{' if depth > 0 => depth += 1,
                '}' if depth > 0 => depth -= 1,
                _ => {}
            }
            value.push(ch);
            self.advance();
        }

        Token::new(
            TokenKind::Error,
            self.span_from(start),
            "Unterminated template literal".to_string(),
        )
    }

    fn read_number(&mut self) -> Token {
        let start = self.current_pos;

        if self.current_char == Some('0') {
            let radix = match self.peek() {
                Some('x') | Some('X') => Some((16, "0x")),
                Some('o') | Some('O') => Some((8, "0o")),
                Some('b') | Some('B') => Some((2, "0b")),
                _ => None,
            };
            if let Some((radix, prefix)) = radix {
                self.advance();
                self.advance();
                let mut value = String::from(prefix);
                self.read_digits(&mut value, |c| c.is_digit(radix));
                return self.finish_number(start, value);
            }
        }

        let mut value = String::new();
        self.read_digits(&mut value, |c| c.is_ascii_digit());

        if self.current_char == Some('.') {
            value.push('.');
            self.advance();
            self.read_digits(&mut value, |c| c.is_ascii_digit());
        }

        if matches!(self.current_char, Some('e') | Some('E')) {
            value.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.current_char {
                value.push(sign);
                self.advance();
            }
            self.read_digits(&mut value, |c| c.is_ascii_digit());
        }

        self.finish_number(start, value)
    }

    fn read_digits(&mut self, value: &mut String, accept: impl Fn(char) -> bool) {
        while let Some(ch) = self.current_char {
            if ch == '_' {
                self.advance();
            } else if accept(ch) {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn finish_number(&mut self, start: usize, value: String) -> Token {
        if self.current_char == Some('n') {
            self.advance();
            return Token::new(TokenKind::BigIntLiteral, self.span_from(start), value);
        }
        Token::new(TokenKind::NumberLiteral, self.span_from(start), value)
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let start = self.current_pos;
        let mut value = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = TokenKind::keyword(&value).unwrap_or(TokenKind::Identifier);
        Token::new(kind, self.span_from(start), value)
    }
}

/// Parses the text of a numeric literal token.
pub fn parse_number_literal(text: &str) -> f64 {
    let radix = match text.get(..2) {
        Some("0x") => 16,
        Some("0o") => 8,
        Some("0b") => 2,
        _ => return text.parse().unwrap_or(f64::NAN),
    };
    u64::from_str_radix(&text[2..], radix)
        .map(|v| v as f64)
        .unwrap_or(f64::NAN)
}
