//! Binder
//!
//! Walks every parsed file once, allocating declaration nodes, creating
//! symbols and merging same-named declarations within a container.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;
use tsenv_ast::*;

use crate::error::{codes, Diagnostic};
use crate::program::SourceFileInfo;
use crate::symbols::{names, Symbol, SymbolArena, SymbolFlags, SymbolId, SymbolTable};
use crate::syntax::{DeclArena, DeclName, ImportedName, NodeId, NodePayload, SyntaxKind};

/// Everything the binder produces. The checker takes ownership of a copy
/// and keeps extending it with nodes for type literals it meets lazily.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    pub nodes: DeclArena,
    pub symbols: SymbolArena,
    pub globals: SymbolTable,
    /// Block-scoped tables: type parameters of signatures and aliases,
    /// non-exported namespace members, locals of external modules
    pub locals: FxHashMap<NodeId, SymbolTable>,
    pub file_roots: Vec<NodeId>,
    /// Module symbol of each external-module file
    pub file_symbols: Vec<Option<SymbolId>>,
    /// Per file: declaration name to declarations, first-seen order
    pub named_declarations: Vec<IndexMap<String, Vec<NodeId>>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A symbol table addressed by where it lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Table {
    Globals,
    Locals(NodeId),
    Members(SymbolId),
    Exports(SymbolId),
    TypeParameters(SymbolId),
}

impl Table {
    fn owner(self) -> Option<SymbolId> {
        match self {
            Table::Members(s) | Table::Exports(s) | Table::TypeParameters(s) => Some(s),
            Table::Globals | Table::Locals(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Container {
    exports: Table,
    locals: Table,
    parent: NodeId,
    ambient: bool,
    implicit_export: bool,
    symbol: Option<SymbolId>,
}

impl Container {
    fn table(&self, exported: bool) -> Table {
        if exported {
            self.exports
        } else {
            self.locals
        }
    }
}

/// Binds all files in program order.
pub fn bind_files(files: &[SourceFileInfo]) -> Binding {
    let mut binding = Binding::default();
    for (index, file) in files.iter().enumerate() {
        binding.named_declarations.push(IndexMap::new());
        binding.bind_file(index, file);
    }
    debug!(
        files = files.len(),
        nodes = binding.nodes.len(),
        symbols = binding.symbols.len(),
        "bound program"
    );
    binding
}

impl Binding {
    fn bind_file(&mut self, index: usize, file: &SourceFileInfo) {
        let is_external = file.ast.is_external_module();
        let span = Span::new(0, file.text.len(), index);
        let root = self.nodes.alloc(
            SyntaxKind::SourceFile,
            None,
            None,
            span,
            NodePayload::SourceFile {
                is_external_module: is_external,
                is_declaration_file: file.is_declaration,
            },
        );
        self.file_roots.push(root);

        let container = if is_external {
            let symbol = self.symbols.alloc(Symbol::new(
                format!("\"{}\"", file.module_name()),
                SymbolFlags::VALUE_MODULE,
            ));
            let data = self.symbols.get_mut(symbol);
            data.declarations.push(root);
            data.value_declaration = Some(root);
            self.nodes.set_symbol(root, symbol);
            self.file_symbols.push(Some(symbol));
            Container {
                exports: Table::Exports(symbol),
                locals: Table::Locals(root),
                parent: root,
                ambient: file.is_declaration,
                implicit_export: false,
                symbol: Some(symbol),
            }
        } else {
            self.file_symbols.push(None);
            Container {
                exports: Table::Globals,
                locals: Table::Globals,
                parent: root,
                ambient: file.is_declaration,
                implicit_export: false,
                symbol: None,
            }
        };

        self.bind_items(&file.ast.items, container);
    }

    fn bind_items(&mut self, items: &[Node<ModuleItem>], container: Container) {
        for item in items {
            match &item.value {
                ModuleItem::Decl(decl) => {
                    self.bind_declaration(decl, container, container.implicit_export);
                }
                ModuleItem::Export(export) => self.bind_export(export, item.span, container),
                ModuleItem::Import(import) => self.bind_import(import, item.span, container),
                ModuleItem::Statement => {}
            }
        }
    }

    fn bind_import(&mut self, import: &ImportDecl, span: Span, container: Container) {
        for specifier in &import.specifiers {
            let (local, imported) = match specifier {
                ImportSpecifier::Default(name) => (name, ImportedName::Default),
                ImportSpecifier::Namespace(name) => (name, ImportedName::Namespace),
                ImportSpecifier::Named { imported, local, .. } => (
                    local.as_ref().unwrap_or(imported),
                    ImportedName::Named(imported.value.name.clone()),
                ),
            };
            let node = self.nodes.alloc(
                SyntaxKind::ImportSpecifier,
                Some(DeclName::ident(local.value.name.clone())),
                Some(container.parent),
                local.span.merge(&span),
                NodePayload::ImportSpecifier {
                    source: import.source.clone(),
                    imported,
                },
            );
            self.declare(container.locals, &local.value.name, SymbolFlags::ALIAS, node);
            self.add_named(node);
        }
    }

    fn bind_export(&mut self, export: &ExportDecl, span: Span, container: Container) {
        match export {
            ExportDecl::Decl(decl) => {
                self.bind_declaration(decl, container, true);
            }
            ExportDecl::DefaultDecl(decl) => {
                let named = match &decl.value {
                    Decl::Class(class) => class.name.is_some(),
                    Decl::Function(func) => func.name.is_some(),
                    _ => true,
                };
                if let Some(symbol) = self.bind_declaration(decl, container, !named) {
                    if named {
                        if let Table::Exports(owner) = container.exports {
                            self.symbols
                                .get_mut(owner)
                                .exports
                                .insert(names::DEFAULT.to_string(), symbol);
                        }
                    }
                }
            }
            ExportDecl::Default(Some(entity)) => {
                self.bind_export_assignment(entity, names::DEFAULT, container);
            }
            ExportDecl::Default(None) => {}
            ExportDecl::Assignment(entity) => {
                self.bind_export_assignment(entity, names::EXPORT_EQUALS, container);
            }
            ExportDecl::Named {
                specifiers, source, ..
            } => {
                for specifier in specifiers {
                    let exported = specifier.exported.as_ref().unwrap_or(&specifier.local);
                    let node = self.nodes.alloc(
                        SyntaxKind::ExportSpecifier,
                        Some(DeclName::ident(exported.value.name.clone())),
                        Some(container.parent),
                        exported.span,
                        NodePayload::ExportSpecifier {
                            local: specifier.local.value.name.clone(),
                            source: source.clone(),
                        },
                    );
                    self.declare(container.exports, &exported.value.name, SymbolFlags::ALIAS, node);
                    self.add_named(node);
                }
            }
            ExportDecl::All {
                source, as_name, ..
            } => {
                let node = self.nodes.alloc(
                    SyntaxKind::ExportDeclaration,
                    as_name.as_ref().map(|n| DeclName::ident(n.value.name.clone())),
                    Some(container.parent),
                    span,
                    NodePayload::ExportStar {
                        source: source.clone(),
                    },
                );
                match as_name {
                    Some(name) => {
                        self.declare(container.exports, &name.value.name, SymbolFlags::ALIAS, node);
                    }
                    None => {
                        if let Some(owner) = container.symbol {
                            self.symbols.get_mut(owner).export_stars.push(node);
                        }
                    }
                }
            }
            ExportDecl::AsNamespace(name) => {
                let node = self.nodes.alloc(
                    SyntaxKind::NamespaceExportDeclaration,
                    Some(DeclName::ident(name.value.name.clone())),
                    Some(container.parent),
                    name.span,
                    NodePayload::None,
                );
                self.declare(Table::Globals, &name.value.name, SymbolFlags::ALIAS, node);
            }
        }
    }

    fn bind_export_assignment(&mut self, entity: &Node<EntityName>, name: &str, container: Container) {
        let node = self.nodes.alloc(
            SyntaxKind::ExportAssignment,
            Some(DeclName::ident(name)),
            Some(container.parent),
            entity.span,
            NodePayload::ExportAssignment(entity.clone()),
        );
        self.declare(container.exports, name, SymbolFlags::ALIAS, node);
    }

    fn bind_declaration(
        &mut self,
        decl: &Node<Decl>,
        container: Container,
        exported: bool,
    ) -> Option<SymbolId> {
        let table = container.table(exported);
        let parent = Some(container.parent);
        match &decl.value {
            Decl::Var(var) => {
                let statement = self.nodes.alloc(
                    SyntaxKind::VariableStatement,
                    None,
                    parent,
                    decl.span,
                    NodePayload::None,
                );
                let flags = match var.kind {
                    VarDeclKind::Var => SymbolFlags::FUNCTION_SCOPED_VARIABLE,
                    VarDeclKind::Let | VarDeclKind::Const => SymbolFlags::BLOCK_SCOPED_VARIABLE,
                };
                let mut last = None;
                for declarator in &var.declarations {
                    let name = declarator.value.name.value.name.clone();
                    let node = self.nodes.alloc(
                        SyntaxKind::VariableDeclaration,
                        Some(DeclName::ident(name.clone())),
                        Some(statement),
                        declarator.span,
                        NodePayload::Variable {
                            kind: var.kind,
                            declarator: declarator.value.clone(),
                        },
                    );
                    last = Some(self.declare(table, &name, flags, node));
                    self.add_named(node);
                }
                last
            }
            Decl::Function(func) => {
                let name = func
                    .name
                    .as_ref()
                    .map_or(names::DEFAULT.to_string(), |n| n.value.name.clone());
                let node = self.nodes.alloc(
                    SyntaxKind::FunctionDeclaration,
                    Some(DeclName::ident(name.clone())),
                    parent,
                    decl.span,
                    NodePayload::Function(func.clone()),
                );
                let symbol = self.declare(table, &name, SymbolFlags::FUNCTION, node);
                self.bind_local_type_parameters(node, func.signature.type_params.as_deref());
                self.add_named(node);
                Some(symbol)
            }
            Decl::Class(class) => Some(self.bind_class(class, decl.span, table, container)),
            Decl::Interface(interface) => {
                let name = interface.name.value.name.clone();
                let mut header = interface.clone();
                header.members.clear();
                let node = self.nodes.alloc(
                    SyntaxKind::InterfaceDeclaration,
                    Some(DeclName::ident(name.clone())),
                    parent,
                    decl.span,
                    NodePayload::Interface(header),
                );
                let symbol = self.declare(table, &name, SymbolFlags::INTERFACE, node);
                self.add_named(node);
                self.bind_shared_type_parameters(symbol, node, interface.type_params.as_deref());
                for member in &interface.members {
                    self.bind_type_member(Table::Members(symbol), node, member, true);
                }
                Some(symbol)
            }
            Decl::TypeAlias(alias) => {
                let name = alias.name.value.name.clone();
                let node = self.nodes.alloc(
                    SyntaxKind::TypeAliasDeclaration,
                    Some(DeclName::ident(name.clone())),
                    parent,
                    decl.span,
                    NodePayload::TypeAlias(alias.clone()),
                );
                let symbol = self.declare(table, &name, SymbolFlags::TYPE_ALIAS, node);
                self.bind_local_type_parameters(node, alias.type_params.as_deref());
                self.add_named(node);
                Some(symbol)
            }
            Decl::Enum(enum_decl) => {
                let name = enum_decl.name.value.name.clone();
                let node = self.nodes.alloc(
                    SyntaxKind::EnumDeclaration,
                    Some(DeclName::ident(name.clone())),
                    parent,
                    decl.span,
                    NodePayload::Enum {
                        is_const: enum_decl.is_const,
                    },
                );
                let flags = if enum_decl.is_const {
                    SymbolFlags::CONST_ENUM
                } else {
                    SymbolFlags::REGULAR_ENUM
                };
                let symbol = self.declare(table, &name, flags, node);
                self.add_named(node);
                for member in &enum_decl.members {
                    let member_name = DeclName::from_property(&member.value.name);
                    let text = member_name.text.clone();
                    let member_node = self.nodes.alloc(
                        SyntaxKind::EnumMember,
                        Some(member_name),
                        Some(node),
                        member.span,
                        NodePayload::EnumMember(member.value.clone()),
                    );
                    self.declare(Table::Exports(symbol), &text, SymbolFlags::ENUM_MEMBER, member_node);
                    self.add_named(member_node);
                }
                Some(symbol)
            }
            Decl::Module(module) => self.bind_module(module, decl.span, container, exported),
            Decl::ImportEquals(import) => {
                let name = import.name.value.name.clone();
                let node = self.nodes.alloc(
                    SyntaxKind::ImportEqualsDeclaration,
                    Some(DeclName::ident(name.clone())),
                    parent,
                    decl.span,
                    NodePayload::ImportEquals(import.target.clone()),
                );
                let symbol = self.declare(table, &name, SymbolFlags::ALIAS, node);
                self.add_named(node);
                Some(symbol)
            }
        }
    }

    fn bind_class(&mut self, class: &ClassDecl, span: Span, table: Table, container: Container) -> SymbolId {
        let name = class
            .name
            .as_ref()
            .map_or(names::DEFAULT.to_string(), |n| n.value.name.clone());
        let mut header = class.clone();
        header.members.clear();
        let node = self.nodes.alloc(
            SyntaxKind::ClassDeclaration,
            Some(DeclName::ident(name.clone())),
            Some(container.parent),
            span,
            NodePayload::Class(header),
        );
        let symbol = self.declare(table, &name, SymbolFlags::CLASS, node);
        self.add_named(node);
        self.bind_shared_type_parameters(symbol, node, class.type_params.as_deref());

        if !self.symbols.get(symbol).exports.contains_key(names::PROTOTYPE) {
            let mut prototype = Symbol::new(names::PROTOTYPE, SymbolFlags::PROPERTY | SymbolFlags::PROTOTYPE);
            prototype.parent = Some(symbol);
            let prototype = self.symbols.alloc(prototype);
            self.symbols
                .get_mut(symbol)
                .exports
                .insert(names::PROTOTYPE.to_string(), prototype);
        }

        for member in &class.members {
            self.bind_class_member(symbol, node, member);
        }
        symbol
    }

    fn bind_class_member(&mut self, class: SymbolId, class_node: NodeId, member: &Node<ClassMember>) {
        let table = if member.value.is_static() {
            Table::Exports(class)
        } else {
            Table::Members(class)
        };
        let payload = NodePayload::ClassMember(member.value.clone());
        match &member.value {
            ClassMember::Constructor { params, .. } => {
                let node = self.nodes.alloc(
                    SyntaxKind::Constructor,
                    None,
                    Some(class_node),
                    member.span,
                    payload,
                );
                self.declare(Table::Members(class), names::CONSTRUCTOR, SymbolFlags::CONSTRUCTOR, node);
                for param in params.iter().filter(|p| p.accessibility.is_some()) {
                    if let ParamName::Ident(ident) = &param.name {
                        let param_node = self.nodes.alloc(
                            SyntaxKind::Parameter,
                            Some(DeclName::ident(ident.value.name.clone())),
                            Some(node),
                            param.span,
                            NodePayload::Parameter(param.clone()),
                        );
                        let mut flags = SymbolFlags::PROPERTY;
                        if param.optional {
                            flags |= SymbolFlags::OPTIONAL;
                        }
                        self.declare(Table::Members(class), &ident.value.name, flags, param_node);
                        self.add_named(param_node);
                    }
                }
            }
            ClassMember::Method {
                name,
                signature,
                is_optional,
                ..
            } => {
                let node = self.alloc_named(SyntaxKind::MethodDeclaration, name, class_node, member.span, payload);
                let mut flags = SymbolFlags::METHOD;
                if *is_optional {
                    flags |= SymbolFlags::OPTIONAL;
                }
                self.declare(table, &name.text(), flags, node);
                self.bind_local_type_parameters(node, signature.type_params.as_deref());
                self.add_named(node);
            }
            ClassMember::Property {
                name, is_optional, ..
            } => {
                let node = self.alloc_named(SyntaxKind::PropertyDeclaration, name, class_node, member.span, payload);
                let mut flags = SymbolFlags::PROPERTY;
                if *is_optional {
                    flags |= SymbolFlags::OPTIONAL;
                }
                self.declare(table, &name.text(), flags, node);
                self.add_named(node);
            }
            ClassMember::Getter { name, .. } => {
                let node = self.alloc_named(SyntaxKind::GetAccessor, name, class_node, member.span, payload);
                self.declare(table, &name.text(), SymbolFlags::GET_ACCESSOR, node);
                self.add_named(node);
            }
            ClassMember::Setter { name, .. } => {
                let node = self.alloc_named(SyntaxKind::SetAccessor, name, class_node, member.span, payload);
                self.declare(table, &name.text(), SymbolFlags::SET_ACCESSOR, node);
                self.add_named(node);
            }
            ClassMember::IndexSignature { .. } => {
                let node = self.nodes.alloc(
                    SyntaxKind::IndexSignature,
                    None,
                    Some(class_node),
                    member.span,
                    payload,
                );
                self.declare(table, names::INDEX, SymbolFlags::SIGNATURE, node);
            }
        }
    }

    /// Binds one member of an interface body or type literal into `table`.
    pub(crate) fn bind_type_member(
        &mut self,
        table: Table,
        parent: NodeId,
        member: &Node<ObjectTypeMember>,
        index_names: bool,
    ) {
        let payload = NodePayload::TypeMember(member.value.clone());
        let (node, named) = match &member.value {
            ObjectTypeMember::Property { name, optional, .. } => {
                let node = self.alloc_named(SyntaxKind::PropertySignature, name, parent, member.span, payload);
                let mut flags = SymbolFlags::PROPERTY;
                if *optional {
                    flags |= SymbolFlags::OPTIONAL;
                }
                self.declare(table, &name.text(), flags, node);
                (node, true)
            }
            ObjectTypeMember::Method {
                name,
                signature,
                optional,
            } => {
                let node = self.alloc_named(SyntaxKind::MethodSignature, name, parent, member.span, payload);
                let mut flags = SymbolFlags::METHOD;
                if *optional {
                    flags |= SymbolFlags::OPTIONAL;
                }
                self.declare(table, &name.text(), flags, node);
                self.bind_local_type_parameters(node, signature.type_params.as_deref());
                (node, true)
            }
            ObjectTypeMember::CallSignature(signature) => {
                let node = self.nodes.alloc(SyntaxKind::CallSignature, None, Some(parent), member.span, payload);
                self.declare(table, names::CALL, SymbolFlags::SIGNATURE, node);
                self.bind_local_type_parameters(node, signature.type_params.as_deref());
                (node, false)
            }
            ObjectTypeMember::ConstructSignature(signature) => {
                let node = self.nodes.alloc(SyntaxKind::ConstructSignature, None, Some(parent), member.span, payload);
                self.declare(table, names::NEW, SymbolFlags::SIGNATURE, node);
                self.bind_local_type_parameters(node, signature.type_params.as_deref());
                (node, false)
            }
            ObjectTypeMember::IndexSignature(_) => {
                let node = self.nodes.alloc(SyntaxKind::IndexSignature, None, Some(parent), member.span, payload);
                self.declare(table, names::INDEX, SymbolFlags::SIGNATURE, node);
                (node, false)
            }
            ObjectTypeMember::Getter { name, .. } => {
                let node = self.alloc_named(SyntaxKind::GetAccessor, name, parent, member.span, payload);
                self.declare(table, &name.text(), SymbolFlags::GET_ACCESSOR, node);
                (node, true)
            }
            ObjectTypeMember::Setter { name, .. } => {
                let node = self.alloc_named(SyntaxKind::SetAccessor, name, parent, member.span, payload);
                self.declare(table, &name.text(), SymbolFlags::SET_ACCESSOR, node);
                (node, true)
            }
        };
        if named && index_names {
            self.add_named(node);
        }
    }

    fn bind_module(
        &mut self,
        module: &ModuleDecl,
        span: Span,
        container: Container,
        exported: bool,
    ) -> Option<SymbolId> {
        if module.is_global {
            let node = self.nodes.alloc(
                SyntaxKind::ModuleDeclaration,
                Some(DeclName::ident("global")),
                Some(container.parent),
                span,
                NodePayload::Module {
                    is_global: true,
                    is_ambient: true,
                    instantiated: true,
                },
            );
            let mut symbol = Symbol::new("global", SymbolFlags::NAMESPACE_MODULE);
            symbol.declarations.push(node);
            let symbol = self.symbols.alloc(symbol);
            self.nodes.set_symbol(node, symbol);
            self.add_named(node);
            if let Some(ModuleBody::Block(items)) = &module.body {
                let block = self.nodes.alloc(SyntaxKind::ModuleBlock, None, Some(node), span, NodePayload::None);
                let globals = Container {
                    exports: Table::Globals,
                    locals: Table::Globals,
                    parent: block,
                    ambient: true,
                    implicit_export: true,
                    symbol: None,
                };
                self.bind_items(items, globals);
            }
            return Some(symbol);
        }

        let ambient = container.ambient || module.is_declare;
        let instantiated = module_instantiated(module.body.as_ref());
        let (name, table, flags, decl_name) = match &module.name {
            ModuleName::String(spec) => (
                format!("\"{}\"", spec),
                Table::Globals,
                SymbolFlags::VALUE_MODULE,
                DeclName::string(spec.clone()),
            ),
            ModuleName::Ident(ident) => {
                let flags = if instantiated {
                    SymbolFlags::VALUE_MODULE
                } else {
                    SymbolFlags::NAMESPACE_MODULE
                };
                (
                    ident.value.name.clone(),
                    container.table(exported),
                    flags,
                    DeclName::ident(ident.value.name.clone()),
                )
            }
        };
        let node = self.nodes.alloc(
            SyntaxKind::ModuleDeclaration,
            Some(decl_name),
            Some(container.parent),
            span,
            NodePayload::Module {
                is_global: false,
                is_ambient: ambient || module.name.is_string(),
                instantiated,
            },
        );
        let symbol = self.declare(table, &name, flags, node);
        self.add_named(node);

        let ambient = ambient || module.name.is_string();
        match &module.body {
            None => {}
            Some(ModuleBody::Block(items)) => {
                let block = self.nodes.alloc(SyntaxKind::ModuleBlock, None, Some(node), span, NodePayload::None);
                let inner = Container {
                    exports: Table::Exports(symbol),
                    locals: Table::Locals(node),
                    parent: block,
                    ambient,
                    implicit_export: ambient && !has_export_declarations(items),
                    symbol: Some(symbol),
                };
                self.bind_items(items, inner);
            }
            Some(ModuleBody::Namespace(inner)) => {
                let nested = Container {
                    exports: Table::Exports(symbol),
                    locals: Table::Locals(node),
                    parent: node,
                    ambient,
                    implicit_export: true,
                    symbol: Some(symbol),
                };
                self.bind_module(&inner.value, inner.span, nested, true);
            }
        }
        Some(symbol)
    }

    fn bind_shared_type_parameters(&mut self, owner: SymbolId, decl: NodeId, params: Option<&[TypeParam]>) {
        for param in params.unwrap_or_default() {
            let node = self.alloc_type_parameter(decl, param);
            self.declare(
                Table::TypeParameters(owner),
                &param.name.value.name,
                SymbolFlags::TYPE_PARAMETER,
                node,
            );
        }
    }

    pub(crate) fn bind_local_type_parameters(&mut self, decl: NodeId, params: Option<&[TypeParam]>) {
        for param in params.unwrap_or_default() {
            let node = self.alloc_type_parameter(decl, param);
            self.declare(
                Table::Locals(decl),
                &param.name.value.name,
                SymbolFlags::TYPE_PARAMETER,
                node,
            );
        }
    }

    fn alloc_type_parameter(&mut self, decl: NodeId, param: &TypeParam) -> NodeId {
        self.nodes.alloc(
            SyntaxKind::TypeParameter,
            Some(DeclName::ident(param.name.value.name.clone())),
            Some(decl),
            param.name.span,
            NodePayload::TypeParameter(param.clone()),
        )
    }

    fn alloc_named(
        &mut self,
        kind: SyntaxKind,
        name: &PropertyName,
        parent: NodeId,
        span: Span,
        payload: NodePayload,
    ) -> NodeId {
        self.nodes
            .alloc(kind, Some(DeclName::from_property(name)), Some(parent), span, payload)
    }

    pub(crate) fn table(&self, table: Table) -> Option<&SymbolTable> {
        match table {
            Table::Globals => Some(&self.globals),
            Table::Locals(node) => self.locals.get(&node),
            Table::Members(s) => Some(&self.symbols.get(s).members),
            Table::Exports(s) => Some(&self.symbols.get(s).exports),
            Table::TypeParameters(s) => Some(&self.symbols.get(s).type_parameters),
        }
    }

    fn table_mut(&mut self, table: Table) -> &mut SymbolTable {
        match table {
            Table::Globals => &mut self.globals,
            Table::Locals(node) => self.locals.entry(node).or_default(),
            Table::Members(s) => &mut self.symbols.get_mut(s).members,
            Table::Exports(s) => &mut self.symbols.get_mut(s).exports,
            Table::TypeParameters(s) => &mut self.symbols.get_mut(s).type_parameters,
        }
    }

    /// Declares `node` under `name` in `table`, merging with a compatible
    /// existing symbol.
    pub(crate) fn declare(&mut self, table: Table, name: &str, flags: SymbolFlags, node: NodeId) -> SymbolId {
        let existing = self.table(table).and_then(|t| t.get(name)).copied();
        let symbol = match existing {
            Some(id) if !self.symbols.get(id).flags.intersects(flags.excludes()) => id,
            Some(_) => {
                let span = self.nodes.get(node).span;
                self.diagnostics.push(Diagnostic::new(
                    span,
                    codes::DUPLICATE_IDENTIFIER,
                    format!("Duplicate identifier '{}'.", name),
                ));
                self.symbols.alloc(Symbol::new(name, SymbolFlags::empty()))
            }
            None => {
                let id = self.symbols.alloc(Symbol::new(name, SymbolFlags::empty()));
                self.table_mut(table).insert(name.to_string(), id);
                id
            }
        };

        let data = self.symbols.get_mut(symbol);
        data.flags |= flags;
        data.declarations.push(node);
        if flags.intersects(SymbolFlags::VALUE) && data.value_declaration.is_none() {
            data.value_declaration = Some(node);
        }
        if data.parent.is_none() {
            data.parent = table.owner();
        }
        self.nodes.set_symbol(node, symbol);
        symbol
    }

    fn add_named(&mut self, node: NodeId) {
        let data = self.nodes.get(node);
        let Some(name) = &data.name else { return };
        let text = name.text.clone();
        let file = data.file;
        if let Some(index) = self.named_declarations.get_mut(file) {
            index.entry(text).or_default().push(node);
        }
    }
}

/// A namespace is instantiated when it contributes a runtime value.
fn module_instantiated(body: Option<&ModuleBody>) -> bool {
    match body {
        None => true,
        Some(ModuleBody::Namespace(inner)) => module_instantiated(inner.value.body.as_ref()),
        Some(ModuleBody::Block(items)) => items.iter().any(|item| match &item.value {
            ModuleItem::Decl(decl) => decl_instantiated(&decl.value),
            ModuleItem::Export(ExportDecl::Decl(decl)) | ModuleItem::Export(ExportDecl::DefaultDecl(decl)) => {
                decl_instantiated(&decl.value)
            }
            ModuleItem::Export(ExportDecl::Named { specifiers, .. }) => !specifiers.is_empty(),
            ModuleItem::Export(_) => true,
            ModuleItem::Import(_) => false,
            ModuleItem::Statement => true,
        }),
    }
}

fn decl_instantiated(decl: &Decl) -> bool {
    match decl {
        Decl::Interface(_) | Decl::TypeAlias(_) => false,
        Decl::Enum(e) => !e.is_const,
        Decl::Module(m) => module_instantiated(m.body.as_ref()),
        Decl::Var(_) | Decl::Function(_) | Decl::Class(_) | Decl::ImportEquals(_) => true,
    }
}

/// Blocks with an explicit export declaration do not export implicitly.
fn has_export_declarations(items: &[Node<ModuleItem>]) -> bool {
    items.iter().any(|item| {
        matches!(
            &item.value,
            ModuleItem::Export(
                ExportDecl::Named { .. }
                    | ExportDecl::All { .. }
                    | ExportDecl::Assignment(_)
                    | ExportDecl::Default(Some(_))
            )
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompilerOptions;
    use crate::program::Program;

    fn bind(sources: &[(&str, &str)]) -> Program {
        Program::from_sources(sources, CompilerOptions::default())
    }

    fn global(program: &Program, name: &str) -> SymbolId {
        *program.binding().globals.get(name).expect("global symbol")
    }

    #[test]
    fn test_merges_interface_declarations() {
        let program = bind(&[
            ("a.d.ts", "interface T { a: string }"),
            ("b.d.ts", "interface T { b: string }"),
        ]);
        let binding = program.binding();
        let symbol = binding.symbols.get(global(&program, "T"));
        assert_eq!(symbol.declarations.len(), 2);
        assert!(symbol.members.contains_key("a"));
        assert!(symbol.members.contains_key("b"));
        assert!(binding.diagnostics.is_empty());
    }

    #[test]
    fn test_duplicate_class_reported() {
        let program = bind(&[("a.d.ts", "declare class C {}\ndeclare class C {}")]);
        let diags = &program.binding().diagnostics;
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::DUPLICATE_IDENTIFIER);
    }

    #[test]
    fn test_dotted_namespace_nests_directly() {
        let program = bind(&[("a.d.ts", "declare module A.B { var x: number; }")]);
        let binding = program.binding();
        let x = binding.named_declarations[0]["x"][0];
        let kinds: Vec<_> = binding
            .nodes
            .ancestors(x)
            .map(|id| binding.nodes.kind(id))
            .collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::VariableStatement,
                SyntaxKind::ModuleBlock,
                SyntaxKind::ModuleDeclaration,
                SyntaxKind::ModuleDeclaration,
                SyntaxKind::SourceFile,
            ]
        );
        let a = binding.symbols.get(global(&program, "A"));
        let b = binding.symbols.get(a.exports["B"]);
        assert!(b.exports.contains_key("x"));
        assert!(a.flags.contains(SymbolFlags::VALUE_MODULE));
    }

    #[test]
    fn test_ambient_module_exports() {
        let program = bind(&[(
            "a.d.ts",
            "declare module 'foo' { var bar: number; interface Hidden {} }\n\
             declare module 'baz' { var kept: number; export = kept; }",
        )]);
        let binding = program.binding();
        let foo = binding.symbols.get(global(&program, "\"foo\""));
        assert!(foo.exports.contains_key("bar"));
        assert!(foo.exports.contains_key("Hidden"));

        let baz_id = global(&program, "\"baz\"");
        let baz = binding.symbols.get(baz_id);
        assert_eq!(baz.exports.keys().collect::<Vec<_>>(), vec!["export="]);
        let module_node = baz.declarations[0];
        assert!(binding.locals[&module_node].contains_key("kept"));
    }

    #[test]
    fn test_class_members_and_statics() {
        let program = bind(&[(
            "a.d.ts",
            "declare class K<T> { constructor(private n: number); static make(): K<number>; value: T; }",
        )]);
        let binding = program.binding();
        let k = binding.symbols.get(global(&program, "K"));
        assert!(k.members.contains_key(names::CONSTRUCTOR));
        assert!(k.members.contains_key("n"));
        assert!(k.members.contains_key("value"));
        assert!(k.exports.contains_key("make"));
        assert!(k.exports.contains_key(names::PROTOTYPE));
        assert!(k.type_parameters.contains_key("T"));
    }

    #[test]
    fn test_named_declarations_first_seen_order() {
        let program = bind(&[(
            "a.d.ts",
            "interface T { a: string }\ndeclare var v: T;\ninterface T { b: string }",
        )]);
        let index = &program.binding().named_declarations[0];
        let keys: Vec<_> = index.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["T", "a", "v", "b"]);
        assert_eq!(index["T"].len(), 2);
    }

    #[test]
    fn test_external_module_keeps_globals_clean() {
        let program = bind(&[(
            "mod.d.ts",
            "export declare function f(): void;\ndeclare var hidden: number;\ndeclare global { var shared: string; }",
        )]);
        let binding = program.binding();
        assert!(!binding.globals.contains_key("f"));
        assert!(!binding.globals.contains_key("hidden"));
        assert!(binding.globals.contains_key("shared"));
        let module = binding.file_symbols[0].expect("module symbol");
        assert!(binding.symbols.get(module).exports.contains_key("f"));
    }

    #[test]
    fn test_type_only_namespace_not_instantiated() {
        let program = bind(&[("a.d.ts", "declare namespace Types { interface A {} type B = A; }")]);
        let symbol = program.binding().symbols.get(global(&program, "Types"));
        assert!(symbol.flags.contains(SymbolFlags::NAMESPACE_MODULE));
        assert!(!symbol.flags.contains(SymbolFlags::VALUE_MODULE));
    }
}
