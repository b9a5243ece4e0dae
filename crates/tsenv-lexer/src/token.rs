use tsenv_ast::Span;

/// Token kinds of the TypeScript declaration grammar.
///
/// Contextual keywords (`type`, `module`, `declare`, `get`, ...) are lexed as
/// keywords; the parser accepts any keyword where an identifier name is
/// allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Reserved words
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Debugger,
    Default,
    Delete,
    Do,
    Else,
    Enum,
    Export,
    Extends,
    False,
    Finally,
    For,
    Function,
    If,
    Import,
    In,
    Instanceof,
    New,
    Null,
    Return,
    Super,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Var,
    Void,
    While,
    With,

    // Contextual keywords
    Abstract,
    Accessor,
    As,
    Asserts,
    Async,
    Await,
    Declare,
    From,
    Get,
    Global,
    Implements,
    Infer,
    Interface,
    Is,
    Keyof,
    Let,
    Module,
    Namespace,
    Of,
    Override,
    Private,
    Protected,
    Public,
    Readonly,
    Require,
    Satisfies,
    Set,
    Static,
    Type,
    Unique,
    Yield,

    // Literals
    NumberLiteral,
    StringLiteral,
    TemplateLiteral,
    BigIntLiteral,

    // Identifier
    Identifier,

    // Operators
    Plus,              // +
    Minus,             // -
    Star,              // *
    Slash,             // /
    Percent,           // %
    StarStar,          // **
    Eq,                // =
    EqEq,              // ==
    EqEqEq,            // ===
    BangEq,            // !=
    BangEqEq,          // !==
    Lt,                // <
    Gt,                // >
    LtEq,              // <=
    AmpAmp,            // &&
    PipePipe,          // ||
    Bang,              // !
    Amp,               // &
    Pipe,              // |
    Caret,             // ^
    Tilde,             // ~
    LtLt,              // <<
    PlusEq,            // +=
    MinusEq,           // -=
    StarEq,            // *=
    SlashEq,           // /=
    PercentEq,         // %=
    AmpEq,             // &=
    PipeEq,            // |=
    CaretEq,           // ^=
    QuestionQuestion,  // ??
    QuestionDot,       // ?.
    PlusPlus,          // ++
    MinusMinus,        // --
    FatArrow,          // =>
    DotDotDot,         // ...

    // Delimiters
    LParen,            // (
    RParen,            // )
    LBrace,            // {
    RBrace,            // }
    LBracket,          // [
    RBracket,          // ]
    Semicolon,         // ;
    Comma,             // ,
    Dot,               // .
    Colon,             // :
    Question,          // ?
    At,                // @
    Hash,              // #

    // Special
    Eof,
    Error,
}

impl TokenKind {
    pub fn keyword(text: &str) -> Option<TokenKind> {
        use TokenKind::*;
        Some(match text {
            "break" => Break,
            "case" => Case,
            "catch" => Catch,
            "class" => Class,
            "const" => Const,
            "continue" => Continue,
            "debugger" => Debugger,
            "default" => Default,
            "delete" => Delete,
            "do" => Do,
            "else" => Else,
            "enum" => Enum,
            "export" => Export,
            "extends" => Extends,
            "false" => False,
            "finally" => Finally,
            "for" => For,
            "function" => Function,
            "if" => If,
            "import" => Import,
            "in" => In,
            "instanceof" => Instanceof,
            "new" => New,
            "null" => Null,
            "return" => Return,
            "super" => Super,
            "switch" => Switch,
            "this" => This,
            "throw" => Throw,
            "true" => True,
            "try" => Try,
            "typeof" => Typeof,
            "var" => Var,
            "void" => Void,
            "while" => While,
            "with" => With,
            "abstract" => Abstract,
            "accessor" => Accessor,
            "as" => As,
            "asserts" => Asserts,
            "async" => Async,
            "await" => Await,
            "declare" => Declare,
            "from" => From,
            "get" => Get,
            "global" => Global,
            "implements" => Implements,
            "infer" => Infer,
            "interface" => Interface,
            "is" => Is,
            "keyof" => Keyof,
            "let" => Let,
            "module" => Module,
            "namespace" => Namespace,
            "of" => Of,
            "override" => Override,
            "private" => Private,
            "protected" => Protected,
            "public" => Public,
            "readonly" => Readonly,
            "require" => Require,
            "satisfies" => Satisfies,
            "set" => Set,
            "static" => Static,
            "type" => Type,
            "unique" => Unique,
            "yield" => Yield,
            _ => return None,
        })
    }

    pub fn is_reserved_word(self) -> bool {
        (self as u32) <= (TokenKind::With as u32)
    }

    pub fn is_contextual_keyword(self) -> bool {
        (self as u32) >= (TokenKind::Abstract as u32) && (self as u32) <= (TokenKind::Yield as u32)
    }
}

/// A token with its kind, span and text. `has_newline_before` records a
/// line terminator between this token and the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: String,
    pub has_newline_before: bool,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: Span, value: String) -> Self {
        Self {
            kind,
            span,
            value,
            has_newline_before: false,
        }
    }

    /// Identifier names include every keyword (`x.default`, `{ type: T }`).
    pub fn is_identifier_name(&self) -> bool {
        self.kind == TokenKind::Identifier
            || self.kind.is_reserved_word()
            || self.kind.is_contextual_keyword()
    }

    /// Binding identifiers exclude reserved words.
    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier || self.kind.is_contextual_keyword()
    }
}
