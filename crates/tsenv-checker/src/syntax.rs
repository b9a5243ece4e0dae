//! Declaration-node arena
//!
//! The binder flattens every declaration of interest into a [`NodeData`]
//! with a parent link, so consumers can walk the syntactic ancestry of a
//! declaration (`SourceFile -> ModuleDeclaration -> ModuleBlock ->
//! VariableStatement -> VariableDeclaration`) without holding on to the
//! tree itself.

use std::fmt;
use std::rc::Rc;
use tsenv_ast::*;

use crate::symbols::SymbolId;

/// Handle of a node in the [`DeclArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    SourceFile,
    ModuleDeclaration,
    ModuleBlock,
    VariableStatement,
    VariableDeclaration,
    FunctionDeclaration,
    ClassDeclaration,
    InterfaceDeclaration,
    TypeAliasDeclaration,
    EnumDeclaration,
    EnumMember,
    ImportEqualsDeclaration,
    ImportSpecifier,
    ExportSpecifier,
    ExportDeclaration,
    ExportAssignment,
    NamespaceExportDeclaration,
    Constructor,
    MethodDeclaration,
    PropertyDeclaration,
    GetAccessor,
    SetAccessor,
    IndexSignature,
    PropertySignature,
    MethodSignature,
    CallSignature,
    ConstructSignature,
    Parameter,
    TypeParameter,
    TypeLiteral,
    FunctionType,
    ConstructorType,
    MappedType,
    ConditionalType,
}

impl SyntaxKind {
    /// Declarations that carry their own call signature
    pub fn is_signature_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::FunctionDeclaration
                | SyntaxKind::MethodDeclaration
                | SyntaxKind::MethodSignature
                | SyntaxKind::CallSignature
                | SyntaxKind::ConstructSignature
                | SyntaxKind::Constructor
                | SyntaxKind::FunctionType
                | SyntaxKind::ConstructorType
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Name of a declaration as written
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclName {
    pub text: String,
    /// `declare module "fs"` and `"quoted-prop": T` are string-literal names
    pub is_string_literal: bool,
}

impl DeclName {
    pub fn ident(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_string_literal: false,
        }
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_string_literal: true,
        }
    }

    pub(crate) fn from_property(name: &PropertyName) -> Self {
        match name {
            PropertyName::String(s) => DeclName::string(s.clone()),
            other => DeclName::ident(other.text()),
        }
    }
}

/// How an import specifier names what it imports
#[derive(Debug, Clone, PartialEq)]
pub enum ImportedName {
    Default,
    Namespace,
    Named(String),
}

/// The slice of syntax each node kind needs later on. Bodies of classes,
/// interfaces and enums are bound into member nodes and are not repeated.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    None,
    SourceFile {
        is_external_module: bool,
        is_declaration_file: bool,
    },
    Module {
        is_global: bool,
        is_ambient: bool,
        instantiated: bool,
    },
    Variable {
        kind: VarDeclKind,
        declarator: VarDeclarator,
    },
    Function(FunctionDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Enum {
        is_const: bool,
    },
    EnumMember(EnumMember),
    ClassMember(ClassMember),
    TypeMember(ObjectTypeMember),
    Parameter(Param),
    TypeParameter(TypeParam),
    TypeLiteral,
    FunctionType(FunctionType),
    Mapped(MappedType),
    Conditional {
        check_type: Node<Type>,
        extends_type: Node<Type>,
        true_type: Node<Type>,
        false_type: Node<Type>,
    },
    ImportEquals(ImportEqualsTarget),
    ImportSpecifier {
        source: String,
        imported: ImportedName,
    },
    ExportSpecifier {
        local: String,
        source: Option<String>,
    },
    ExportStar {
        source: String,
    },
    ExportAssignment(Node<EntityName>),
}

#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: SyntaxKind,
    pub name: Option<DeclName>,
    pub parent: Option<NodeId>,
    pub file: usize,
    pub span: Span,
    pub symbol: Option<SymbolId>,
    pub payload: Rc<NodePayload>,
}

/// Append-only arena of declaration nodes
#[derive(Debug, Clone, Default)]
pub struct DeclArena {
    nodes: Vec<NodeData>,
}

impl DeclArena {
    pub fn alloc(
        &mut self,
        kind: SyntaxKind,
        name: Option<DeclName>,
        parent: Option<NodeId>,
        span: Span,
        payload: NodePayload,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            name,
            parent,
            file: span.file_id,
            span,
            symbol: None,
            payload: Rc::new(payload),
        });
        id
    }

    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.get(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    pub fn payload(&self, id: NodeId) -> Rc<NodePayload> {
        Rc::clone(&self.get(id).payload)
    }

    pub(crate) fn set_symbol(&mut self, id: NodeId, symbol: SymbolId) {
        self.nodes[id.index()].symbol = Some(symbol);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Strict ancestors of `id`, innermost first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            next: self.parent(id),
        }
    }
}

pub struct Ancestors<'a> {
    arena: &'a DeclArena,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.arena.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ancestors_walk_to_root() {
        let mut arena = DeclArena::default();
        let span = Span::new(0, 1, 0);
        let file = arena.alloc(SyntaxKind::SourceFile, None, None, span, NodePayload::None);
        let module = arena.alloc(
            SyntaxKind::ModuleDeclaration,
            Some(DeclName::ident("N")),
            Some(file),
            span,
            NodePayload::None,
        );
        let block = arena.alloc(SyntaxKind::ModuleBlock, None, Some(module), span, NodePayload::None);

        let kinds: Vec<_> = arena.ancestors(block).map(|id| arena.kind(id)).collect();
        assert_eq!(kinds, vec![SyntaxKind::ModuleDeclaration, SyntaxKind::SourceFile]);
        assert_eq!(arena.len(), 3);
        assert!(arena.get(module).symbol.is_none());
    }

    #[test]
    fn test_decl_name_from_property() {
        let quoted = DeclName::from_property(&PropertyName::String("a-b".into()));
        assert!(quoted.is_string_literal);
        assert_eq!(DeclName::from_property(&PropertyName::Number(2.0)).text, "2");
    }
}
