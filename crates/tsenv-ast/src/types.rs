//! Type expressions for the AST

use super::*;
use std::fmt;

/// Type expression
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Keyword types: any, unknown, string, number, boolean, ...
    Keyword(KeywordType),

    /// Polymorphic `this` type
    This,

    /// Array type: T[]
    Array(Box<Node<Type>>),

    /// readonly T[] / readonly [A, B]
    Readonly(Box<Node<Type>>),

    /// unique symbol
    UniqueSymbol,

    /// Tuple type: [T1, T2?, ...T3[]]
    Tuple(Vec<TupleElement>),

    /// Union type: T1 | T2 | ...
    Union(Vec<Node<Type>>),

    /// Intersection type: T1 & T2 & ...
    Intersection(Vec<Node<Type>>),

    /// Function or constructor type: (args) => R, new (args) => R
    Function(FunctionType),

    /// Type reference: A.B.Name<Args>
    TypeRef {
        name: Node<EntityName>,
        type_args: Option<Vec<Node<Type>>>,
    },

    /// Type literal: { prop: T; method(): R; [key: string]: V }
    Object(ObjectType),

    /// Literal type: "hello" | 42 | true
    Literal(LiteralType),

    /// Parenthesized type
    Paren(Box<Node<Type>>),

    /// Conditional type: T extends U ? X : Y
    Conditional {
        check_type: Box<Node<Type>>,
        extends_type: Box<Node<Type>>,
        true_type: Box<Node<Type>>,
        false_type: Box<Node<Type>>,
    },

    /// Mapped type: { [K in keyof T]: V }
    Mapped(MappedType),

    /// Template literal type: `hello ${string}`
    TemplateLiteral {
        parts: Vec<String>,
        types: Vec<Node<Type>>,
    },

    /// Indexed access type: T[K]
    IndexedAccess {
        object_type: Box<Node<Type>>,
        index_type: Box<Node<Type>>,
    },

    /// keyof type: keyof T
    Keyof(Box<Node<Type>>),

    /// Type query: typeof A.B
    TypeQuery {
        expr: Node<EntityName>,
        type_args: Option<Vec<Node<Type>>>,
    },

    /// infer type: infer T (used in conditional types)
    Infer(TypeParam),

    /// Import type: import("module").Type / typeof import("module")
    ImportType {
        argument: String,
        qualifier: Option<Node<EntityName>>,
        type_args: Option<Vec<Node<Type>>>,
        is_typeof: bool,
    },

    /// Type predicate in return position: x is T, asserts x, this is T
    Predicate {
        asserts: bool,
        parameter: String,
        ty: Option<Box<Node<Type>>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordType {
    Any,
    Unknown,
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Void,
    Undefined,
    Null,
    Never,
    Object,
    Intrinsic,
}

impl KeywordType {
    pub fn from_name(name: &str) -> Option<KeywordType> {
        Some(match name {
            "any" => KeywordType::Any,
            "unknown" => KeywordType::Unknown,
            "string" => KeywordType::String,
            "number" => KeywordType::Number,
            "boolean" => KeywordType::Boolean,
            "bigint" => KeywordType::BigInt,
            "symbol" => KeywordType::Symbol,
            "void" => KeywordType::Void,
            "undefined" => KeywordType::Undefined,
            "null" => KeywordType::Null,
            "never" => KeywordType::Never,
            "object" => KeywordType::Object,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    pub ty: Node<Type>,
    pub name: Option<Ident>,
    pub optional: bool,
    pub is_rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub signature: SignatureDecl,
    pub is_constructor: bool,
    pub is_abstract: bool,
}

/// Type parameters, parameters and return annotation shared by functions,
/// methods, constructors and signature members.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureDecl {
    pub type_params: Option<Vec<TypeParam>>,
    pub params: Vec<Param>,
    pub return_type: Option<Box<Node<Type>>>,
}

impl SignatureDecl {
    /// Parameters that take part in a call, i.e. without a leading `this`.
    pub fn value_params(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|p| !matches!(p.name, ParamName::This))
    }

    pub fn min_argument_count(&self) -> usize {
        self.value_params()
            .take_while(|p| !p.optional && !p.is_rest && !p.has_initializer)
            .count()
    }

    pub fn has_rest_parameter(&self) -> bool {
        self.value_params().any(|p| p.is_rest)
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: ParamName,
    pub type_annotation: Option<Box<Node<Type>>>,
    pub optional: bool,
    pub is_rest: bool,
    pub has_initializer: bool,
    pub accessibility: Option<AccessModifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamName {
    Ident(Node<Ident>),
    /// `this: T` pseudo-parameter
    This,
    /// Destructuring pattern; the index is the parameter position
    Pattern(usize),
}

impl ParamName {
    pub fn text(&self) -> String {
        match self {
            ParamName::Ident(id) => id.value.name.clone(),
            ParamName::This => "this".to_string(),
            ParamName::Pattern(index) => format!("__{}", index),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub members: Vec<Node<ObjectTypeMember>>,
}

/// Member of an interface body or type literal
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectTypeMember {
    Property {
        name: PropertyName,
        ty: Option<Node<Type>>,
        optional: bool,
        readonly: bool,
    },
    Method {
        name: PropertyName,
        signature: SignatureDecl,
        optional: bool,
    },
    CallSignature(SignatureDecl),
    ConstructSignature(SignatureDecl),
    IndexSignature(IndexSignature),
    Getter {
        name: PropertyName,
        return_type: Option<Box<Node<Type>>>,
    },
    Setter {
        name: PropertyName,
        param: Param,
    },
}

impl ObjectTypeMember {
    pub fn name(&self) -> Option<&PropertyName> {
        match self {
            ObjectTypeMember::Property { name, .. }
            | ObjectTypeMember::Method { name, .. }
            | ObjectTypeMember::Getter { name, .. }
            | ObjectTypeMember::Setter { name, .. } => Some(name),
            ObjectTypeMember::CallSignature(_)
            | ObjectTypeMember::ConstructSignature(_)
            | ObjectTypeMember::IndexSignature(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSignature {
    pub key_name: Node<Ident>,
    pub key_type: Node<Type>,
    pub value_type: Node<Type>,
    pub readonly: bool,
}

/// Property name in a member position
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyName {
    Ident(Node<Ident>),
    String(String),
    Number(f64),
    /// `[Symbol.iterator]`
    Computed(Node<EntityName>),
}

impl PropertyName {
    pub fn text(&self) -> String {
        match self {
            PropertyName::Ident(id) => id.value.name.clone(),
            PropertyName::String(s) => s.clone(),
            PropertyName::Number(n) => format_number(*n),
            PropertyName::Computed(expr) => format!("[{}]", expr.value),
        }
    }
}

/// Formats a numeric literal the way it reads in source (`1`, not `1.0`).
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    String(String),
    Number(f64),
    BigInt(String),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappedType {
    pub type_param: Node<Ident>,
    pub constraint: Box<Node<Type>>,
    pub name_type: Option<Box<Node<Type>>>,
    pub value_type: Option<Box<Node<Type>>>,
    pub readonly: Option<MappedModifier>,
    pub optional: Option<MappedModifier>,
}

/// Type parameter (generic)
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: Node<Ident>,
    pub constraint: Option<Box<Node<Type>>>,
    pub default: Option<Box<Node<Type>>>,
}

/// Modifier for mapped types (+/- readonly, +/- optional)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappedModifier {
    /// Add the modifier (+readonly, +?)
    Add,
    /// Remove the modifier (-readonly, -?)
    Remove,
    /// Keep the modifier as-is (readonly, ?)
    Present,
}

// Display implementations

impl fmt::Display for KeywordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            KeywordType::Any => "any",
            KeywordType::Unknown => "unknown",
            KeywordType::String => "string",
            KeywordType::Number => "number",
            KeywordType::Boolean => "boolean",
            KeywordType::BigInt => "bigint",
            KeywordType::Symbol => "symbol",
            KeywordType::Void => "void",
            KeywordType::Undefined => "undefined",
            KeywordType::Null => "null",
            KeywordType::Never => "never",
            KeywordType::Object => "object",
            KeywordType::Intrinsic => "intrinsic",
        };
        write!(f, "{}", text)
    }
}
