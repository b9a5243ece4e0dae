//! Module-level items and the source file root

use super::*;

/// Module item (top-level in a file or a module block)
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleItem {
    /// Import declaration
    Import(ImportDecl),

    /// Export declaration
    Export(ExportDecl),

    /// Declaration
    Decl(Node<Decl>),

    /// Executable statement; its contents are not part of the type surface
    Statement,
}

/// Import declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    pub source: String,
    pub type_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// import name from "module"
    Default(Node<Ident>),

    /// import * as name from "module"
    Namespace(Node<Ident>),

    /// import { name } from "module" or import { name as alias } from "module"
    Named {
        imported: Node<Ident>,
        local: Option<Node<Ident>>,
        type_only: bool,
    },
}

/// Export declaration
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    /// export { name }
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
        type_only: bool,
    },

    /// export default A.B
    Default(Option<Node<EntityName>>),

    /// export default declaration
    DefaultDecl(Box<Node<Decl>>),

    /// export * from "module"
    All {
        source: String,
        as_name: Option<Node<Ident>>,
        type_only: bool,
    },

    /// export declaration
    Decl(Box<Node<Decl>>),

    /// export = A.B
    Assignment(Node<EntityName>),

    /// export as namespace Name
    AsNamespace(Node<Ident>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: Node<Ident>,
    pub exported: Option<Node<Ident>>,
    pub type_only: bool,
}

/// Root AST node - represents a complete source file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub items: Vec<Node<ModuleItem>>,
    pub span: Span,
}

impl SourceFile {
    /// A file with a top-level import or export is an external module; its
    /// declarations do not contribute to the global scope.
    pub fn is_external_module(&self) -> bool {
        self.items.iter().any(|item| match &item.value {
            ModuleItem::Import(_) | ModuleItem::Export(_) => true,
            ModuleItem::Decl(decl) => matches!(
                &decl.value,
                Decl::ImportEquals(ImportEqualsDecl {
                    target: ImportEqualsTarget::External(_),
                    ..
                })
            ),
            ModuleItem::Statement => false,
        })
    }
}
