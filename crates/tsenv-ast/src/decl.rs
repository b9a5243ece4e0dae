//! Declaration definitions for the AST

use super::*;
use std::fmt;

/// Declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    /// Function declaration (one overload signature, or an implementation)
    Function(FunctionDecl),

    /// Class declaration
    Class(ClassDecl),

    /// Interface declaration
    Interface(InterfaceDecl),

    /// Type alias declaration
    TypeAlias(TypeAliasDecl),

    /// Enum declaration
    Enum(EnumDecl),

    /// Module/namespace declaration
    Module(ModuleDecl),

    /// Variable statement
    Var(VarDecl),

    /// import x = require("m") / import x = A.B
    ImportEquals(ImportEqualsDecl),
}

/// Function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// `None` only for `export default function (...)`
    pub name: Option<Node<Ident>>,
    pub signature: SignatureDecl,
    pub has_body: bool,
    pub is_declare: bool,
}

/// Class declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// `None` only for `export default class { ... }`
    pub name: Option<Node<Ident>>,
    pub type_params: Option<Vec<TypeParam>>,
    pub extends: Option<ExpressionWithTypeArgs>,
    pub implements: Vec<Node<Type>>,
    pub members: Vec<Node<ClassMember>>,
    pub is_abstract: bool,
    pub is_declare: bool,
}

/// Heritage clause entry: `Base<T>` in `class C extends Base<T>`
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionWithTypeArgs {
    pub expr: Node<EntityName>,
    pub type_args: Option<Vec<Node<Type>>>,
}

/// Class member
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Constructor {
        params: Vec<Param>,
        access: AccessModifier,
        has_body: bool,
    },

    Method {
        name: PropertyName,
        signature: SignatureDecl,
        modifiers: MemberModifiers,
        is_optional: bool,
        has_body: bool,
    },

    Property {
        name: PropertyName,
        type_annotation: Option<Box<Node<Type>>>,
        init: Option<Initializer>,
        modifiers: MemberModifiers,
        is_optional: bool,
    },

    Getter {
        name: PropertyName,
        return_type: Option<Box<Node<Type>>>,
        modifiers: MemberModifiers,
    },

    Setter {
        name: PropertyName,
        param: Param,
        modifiers: MemberModifiers,
    },

    IndexSignature {
        signature: IndexSignature,
        is_static: bool,
    },
}

impl ClassMember {
    pub fn name(&self) -> Option<&PropertyName> {
        match self {
            ClassMember::Method { name, .. }
            | ClassMember::Property { name, .. }
            | ClassMember::Getter { name, .. }
            | ClassMember::Setter { name, .. } => Some(name),
            ClassMember::Constructor { .. } | ClassMember::IndexSignature { .. } => None,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            ClassMember::Method { modifiers, .. }
            | ClassMember::Property { modifiers, .. }
            | ClassMember::Getter { modifiers, .. }
            | ClassMember::Setter { modifiers, .. } => modifiers.is_static,
            ClassMember::IndexSignature { is_static, .. } => *is_static,
            ClassMember::Constructor { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemberModifiers {
    pub access: AccessModifier,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_readonly: bool,
    pub is_override: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessModifier {
    #[default]
    Public,
    Private,
    Protected,
}

/// Initializer of a variable or property. Only literal shapes are kept;
/// anything else is recorded as `Other` and contributes no type.
#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    String(String),
    Number(f64),
    Boolean(bool),
    Other,
}

/// Interface declaration
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: Node<Ident>,
    pub type_params: Option<Vec<TypeParam>>,
    pub extends: Vec<Node<Type>>,
    pub members: Vec<Node<ObjectTypeMember>>,
    pub is_declare: bool,
}

/// Type alias declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub name: Node<Ident>,
    pub type_params: Option<Vec<TypeParam>>,
    pub ty: Node<Type>,
    pub is_declare: bool,
}

/// Enum declaration
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Node<Ident>,
    pub members: Vec<Node<EnumMember>>,
    pub is_const: bool,
    pub is_declare: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: PropertyName,
    pub init: Option<Initializer>,
}

/// Module/namespace declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDecl {
    pub name: ModuleName,
    /// `None` for the shorthand `declare module "m";`
    pub body: Option<ModuleBody>,
    pub is_declare: bool,
    /// `declare global { ... }`
    pub is_global: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleName {
    Ident(Node<Ident>),
    String(String),
}

impl ModuleName {
    pub fn text(&self) -> &str {
        match self {
            ModuleName::Ident(id) => &id.value.name,
            ModuleName::String(s) => s,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, ModuleName::String(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleBody {
    Block(Vec<Node<ModuleItem>>),
    /// Inner segment of a dotted name: `module A.B { }` nests `B` in `A`
    Namespace(Box<Node<ModuleDecl>>),
}

/// Variable statement
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarDeclKind,
    pub declarations: Vec<Node<VarDeclarator>>,
    pub is_declare: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarDeclKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub name: Node<Ident>,
    pub type_annotation: Option<Box<Node<Type>>>,
    pub init: Option<Initializer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportEqualsDecl {
    pub name: Node<Ident>,
    pub target: ImportEqualsTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportEqualsTarget {
    /// import x = require("m")
    External(String),
    /// import x = A.B
    Entity(Node<EntityName>),
}

// Display implementations

impl fmt::Display for AccessModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessModifier::Public => write!(f, "public"),
            AccessModifier::Private => write!(f, "private"),
            AccessModifier::Protected => write!(f, "protected"),
        }
    }
}

impl fmt::Display for VarDeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarDeclKind::Var => write!(f, "var"),
            VarDeclKind::Let => write!(f, "let"),
            VarDeclKind::Const => write!(f, "const"),
        }
    }
}
