//! Type checker
//!
//! Answers type queries over a bound [`Program`]. Everything is computed
//! on demand and cached, so asking for the same declaration twice yields
//! the same [`TypeId`].

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;
use tracing::debug;
use tsenv_ast::*;

use crate::binder::Binding;
use crate::builtins::Intrinsics;
use crate::error::{codes, Diagnostic};
use crate::program::Program;
use crate::symbols::{names, Symbol, SymbolFlags, SymbolId, SymbolTable};
use crate::syntax::{NodeData, NodeId, NodePayload, SyntaxKind};
use crate::types::*;

/// Work that must not be re-entered while in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Resolving {
    SymbolType(SymbolId),
    AliasType(SymbolId),
    AliasTarget(SymbolId),
    Members(TypeId),
    Exports(SymbolId),
    Constraint(TypeId),
}

/// Key of an instantiated anonymous, mapped or conditional type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum InstantiationKey {
    Anonymous(AnonymousOrigin, Vec<TypeId>, Vec<TypeId>),
    Mapped(NodeId, Vec<TypeId>, Vec<TypeId>),
    Conditional(NodeId, Vec<TypeId>, Vec<TypeId>),
    Substitution(TypeId, TypeId),
}

pub struct TypeChecker<'p> {
    pub(crate) program: &'p Program,
    pub(crate) binding: Binding,
    pub(crate) types: TypeArena,
    pub(crate) intrinsics: Intrinsics,

    pub(crate) symbol_types: FxHashMap<SymbolId, TypeId>,
    pub(crate) declared_types: FxHashMap<SymbolId, TypeId>,
    pub(crate) type_parameters: FxHashMap<SymbolId, TypeId>,
    pub(crate) constraints: FxHashMap<TypeId, Option<TypeId>>,
    pub(crate) signatures: FxHashMap<NodeId, Rc<Signature>>,
    pub(crate) declared_members: FxHashMap<TypeId, Rc<DeclaredMembers>>,
    pub(crate) resolved_members: FxHashMap<TypeId, Option<Rc<ResolvedMembers>>>,
    pub(crate) interface_views: FxHashMap<NodeId, TypeId>,
    pub(crate) lazy_nodes: FxHashMap<(Span, SyntaxKind), NodeId>,
    pub(crate) node_types: FxHashMap<NodeId, TypeId>,
    pub(crate) alias_targets: FxHashMap<SymbolId, Option<SymbolId>>,
    pub(crate) exports: FxHashMap<SymbolId, Rc<SymbolTable>>,
    pub(crate) instantiations: FxHashMap<InstantiationKey, TypeId>,
    pub(crate) conditional_constraints: FxHashMap<TypeId, TypeId>,
    pub(crate) transient_types: FxHashMap<SymbolId, TypeId>,
    pub(crate) nesting: FxHashMap<TypeId, u32>,
    pub(crate) resolving: FxHashSet<Resolving>,
    /// Type parameters narrowed inside the true branch being converted
    pub(crate) substitutions: Vec<(TypeId, TypeId)>,
    pub(crate) instantiation_depth: u32,
    pub(crate) global_array: Option<TypeId>,

    diagnostics: Vec<Diagnostic>,
    reported: FxHashSet<(Option<usize>, usize, u32)>,
}

impl<'p> TypeChecker<'p> {
    pub fn new(program: &'p Program) -> Self {
        let mut types = TypeArena::default();
        let intrinsics = Intrinsics::new(&mut types);
        Self {
            program,
            binding: program.binding().clone(),
            types,
            intrinsics,
            symbol_types: FxHashMap::default(),
            declared_types: FxHashMap::default(),
            type_parameters: FxHashMap::default(),
            constraints: FxHashMap::default(),
            signatures: FxHashMap::default(),
            declared_members: FxHashMap::default(),
            resolved_members: FxHashMap::default(),
            interface_views: FxHashMap::default(),
            lazy_nodes: FxHashMap::default(),
            node_types: FxHashMap::default(),
            alias_targets: FxHashMap::default(),
            exports: FxHashMap::default(),
            instantiations: FxHashMap::default(),
            conditional_constraints: FxHashMap::default(),
            transient_types: FxHashMap::default(),
            nesting: FxHashMap::default(),
            resolving: FxHashSet::default(),
            substitutions: Vec::new(),
            instantiation_depth: 0,
            global_array: None,
            diagnostics: Vec::new(),
            reported: FxHashSet::default(),
        }
    }

    // =========================================================================
    // Public API: program structure
    // =========================================================================

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.binding.symbols.get(id)
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        self.binding.nodes.get(id)
    }

    pub fn node_kind(&self, id: NodeId) -> SyntaxKind {
        self.binding.nodes.kind(id)
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.binding.nodes.ancestors(id)
    }

    pub fn globals(&self) -> &SymbolTable {
        &self.binding.globals
    }

    /// Declaration name to declarations of one file, first-seen order
    pub fn named_declarations(&self, file: usize) -> Option<&IndexMap<String, Vec<NodeId>>> {
        self.binding.named_declarations.get(file)
    }

    // =========================================================================
    // Public API: type structure
    // =========================================================================

    pub fn type_data(&self, ty: TypeId) -> &TypeData {
        self.types.get(ty)
    }

    pub fn flags(&self, ty: TypeId) -> TypeFlags {
        self.types.get(ty).flags
    }

    pub fn object_flags(&self, ty: TypeId) -> ObjectFlags {
        self.types.get(ty).object_flags
    }

    pub fn intrinsic_name(&self, ty: TypeId) -> Option<&'static str> {
        match self.types.get(ty).kind {
            TypeKind::Intrinsic(name) => Some(name),
            _ => None,
        }
    }

    pub fn literal_value(&self, ty: TypeId) -> Option<&LiteralValue> {
        match &self.types.get(ty).kind {
            TypeKind::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Generic target of a reference; a generic declared type is its own
    /// target, an interface view targets the merged type.
    pub fn reference_target(&self, ty: TypeId) -> Option<TypeId> {
        match &self.types.get(ty).kind {
            TypeKind::Reference { target, .. } => Some(*target),
            TypeKind::ClassOrInterface {
                type_parameters,
                view,
                ..
            } => match view {
                Some(view) => Some(view.merged),
                None if !type_parameters.is_empty()
                    || self.object_flags(ty).contains(ObjectFlags::CLASS) =>
                {
                    Some(ty)
                }
                None => None,
            },
            _ => None,
        }
    }

    pub fn type_arguments(&self, ty: TypeId) -> Vec<TypeId> {
        match &self.types.get(ty).kind {
            TypeKind::Reference { arguments, .. } => arguments.clone(),
            TypeKind::ClassOrInterface { type_parameters, .. } => type_parameters.clone(),
            _ => Vec::new(),
        }
    }

    /// Tuple shape of a tuple reference: minimum length and rest flag
    pub fn tuple_shape(&self, ty: TypeId) -> Option<(usize, bool)> {
        let target = match &self.types.get(ty).kind {
            TypeKind::Reference { target, .. } => *target,
            TypeKind::TupleTarget { .. } => ty,
            _ => return None,
        };
        match self.types.get(target).kind {
            TypeKind::TupleTarget {
                min_length,
                has_rest,
                ..
            } => Some((min_length, has_rest)),
            _ => None,
        }
    }

    pub fn is_this_type(&self, ty: TypeId) -> bool {
        matches!(
            self.types.get(ty).kind,
            TypeKind::TypeParameter {
                is_this_type: true,
                ..
            }
        )
    }

    pub fn union_members(&self, ty: TypeId) -> &[TypeId] {
        match &self.types.get(ty).kind {
            TypeKind::Union(members) | TypeKind::Intersection(members) => members,
            _ => &[],
        }
    }

    pub fn indexed_access_parts(&self, ty: TypeId) -> Option<(TypeId, TypeId)> {
        match self.types.get(ty).kind {
            TypeKind::IndexedAccess { object, index } => Some((object, index)),
            _ => None,
        }
    }

    pub fn index_operand(&self, ty: TypeId) -> Option<TypeId> {
        match self.types.get(ty).kind {
            TypeKind::Index(operand) => Some(operand),
            _ => None,
        }
    }

    /// Best-effort stand-in for a conditional or substitution type: the
    /// union of both branches, or the substituted type parameter.
    pub fn base_constraint(&mut self, ty: TypeId) -> Option<TypeId> {
        match self.types.get(ty).kind.clone() {
            TypeKind::Conditional {
                declaration,
                mapper,
            } => Some(self.conditional_constraint(ty, declaration, mapper)),
            TypeKind::Substitution { base, .. } => Some(base),
            _ => None,
        }
    }

    /// Class symbol of a class declared type or of a class static side.
    pub fn class_symbol(&self, ty: TypeId) -> Option<SymbolId> {
        let data = self.types.get(ty);
        let symbol = data.symbol?;
        let is_class = self.symbol(symbol).flags.contains(SymbolFlags::CLASS);
        match data.kind {
            TypeKind::ClassOrInterface { view: None, .. }
                if data.object_flags.contains(ObjectFlags::CLASS) =>
            {
                Some(symbol)
            }
            TypeKind::Anonymous {
                origin: AnonymousOrigin::Symbol(origin),
                ..
            } if is_class && origin == symbol => Some(symbol),
            _ => None,
        }
    }

    // =========================================================================
    // Public API: declarations and symbols
    // =========================================================================

    /// Type a declaration introduces at its own position: the declared
    /// type for type declarations, the value type otherwise.
    pub fn type_at_declaration(&mut self, node: NodeId) -> TypeId {
        let data = self.node(node);
        let kind = data.kind;
        let Some(symbol) = data.symbol else {
            return match kind {
                SyntaxKind::TypeLiteral | SyntaxKind::FunctionType | SyntaxKind::ConstructorType => {
                    self.node_types.get(&node).copied().unwrap_or(self.intrinsics.any)
                }
                _ => self.intrinsics.any,
            };
        };
        match kind {
            SyntaxKind::ClassDeclaration => self.declared_type_of_symbol(symbol),
            SyntaxKind::InterfaceDeclaration => {
                let merged = self.declared_type_of_symbol(symbol);
                let declarations = self
                    .symbol(symbol)
                    .declarations
                    .iter()
                    .filter(|&&d| {
                        matches!(
                            self.node_kind(d),
                            SyntaxKind::ClassDeclaration | SyntaxKind::InterfaceDeclaration
                        )
                    })
                    .count();
                if declarations > 1 {
                    self.interface_view(node, merged)
                } else {
                    merged
                }
            }
            SyntaxKind::TypeAliasDeclaration
            | SyntaxKind::EnumDeclaration
            | SyntaxKind::TypeParameter => self.declared_type_of_symbol(symbol),
            SyntaxKind::ModuleDeclaration => {
                if self.symbol(symbol).flags.intersects(SymbolFlags::VALUE) {
                    self.type_of_symbol(symbol)
                } else {
                    self.intrinsics.any
                }
            }
            _ => self.type_of_symbol(symbol),
        }
    }

    /// Value type of a symbol.
    pub fn type_of_symbol(&mut self, symbol: SymbolId) -> TypeId {
        if let Some(&ty) = self.symbol_types.get(&symbol) {
            return ty;
        }
        if !self.resolving.insert(Resolving::SymbolType(symbol)) {
            return self.intrinsics.any;
        }
        let ty = self.compute_type_of_symbol(symbol);
        self.resolving.remove(&Resolving::SymbolType(symbol));
        self.symbol_types.insert(symbol, ty);
        ty
    }

    fn compute_type_of_symbol(&mut self, symbol: SymbolId) -> TypeId {
        let flags = self.symbol(symbol).flags;
        if flags.contains(SymbolFlags::TRANSIENT) {
            return self
                .transient_types
                .get(&symbol)
                .copied()
                .unwrap_or(self.intrinsics.any);
        }
        if flags.contains(SymbolFlags::PROTOTYPE) {
            return match self.symbol(symbol).parent {
                Some(class) => self.declared_type_of_symbol(class),
                None => self.intrinsics.any,
            };
        }
        if flags == SymbolFlags::ALIAS {
            return match self.resolve_alias(symbol) {
                Some(target) if self.symbol(target).flags.intersects(SymbolFlags::VALUE) => {
                    self.type_of_symbol(target)
                }
                _ => self.intrinsics.any,
            };
        }
        if flags.contains(SymbolFlags::ENUM_MEMBER) {
            return match self.symbol(symbol).parent {
                Some(parent) => self.declared_type_of_symbol(parent),
                None => self.intrinsics.any,
            };
        }
        if flags.intersects(SymbolFlags::VARIABLE | SymbolFlags::PROPERTY) {
            return self.type_of_variable_like(symbol);
        }
        if flags.intersects(SymbolFlags::ACCESSOR) {
            return self.type_of_accessor(symbol);
        }
        if flags.intersects(
            SymbolFlags::FUNCTION
                | SymbolFlags::METHOD
                | SymbolFlags::CLASS
                | SymbolFlags::ENUM
                | SymbolFlags::VALUE_MODULE,
        ) {
            return self.anonymous_type(AnonymousOrigin::Symbol(symbol), Some(symbol));
        }
        self.intrinsics.any
    }

    fn type_of_variable_like(&mut self, symbol: SymbolId) -> TypeId {
        let data = self.symbol(symbol);
        let Some(node) = data.value_declaration.or_else(|| data.declarations.first().copied()) else {
            return self.intrinsics.any;
        };
        let optional = data.flags.contains(SymbolFlags::OPTIONAL);
        let payload = self.binding.nodes.payload(node);
        let (annotation, init, is_const) = match &*payload {
            NodePayload::Variable { kind, declarator } => (
                declarator.type_annotation.as_deref(),
                declarator.init.as_ref(),
                *kind == VarDeclKind::Const,
            ),
            NodePayload::ClassMember(ClassMember::Property {
                type_annotation,
                init,
                modifiers,
                ..
            }) => (type_annotation.as_deref(), init.as_ref(), modifiers.is_readonly),
            NodePayload::TypeMember(ObjectTypeMember::Property { ty, .. }) => (ty.as_ref(), None, false),
            NodePayload::Parameter(param) => (param.type_annotation.as_deref(), None, false),
            NodePayload::EnumMember(_) => {
                return match self.node(node).parent.and_then(|p| self.node(p).symbol) {
                    Some(parent) => self.declared_type_of_symbol(parent),
                    None => self.intrinsics.any,
                };
            }
            _ => (None, None, false),
        };

        let ty = match (annotation, init) {
            (Some(annotation), _) => self.type_from_type_node(annotation, node),
            (None, Some(init)) => match self.initializer_type(init) {
                Some(literal) if is_const => literal,
                Some(literal) => self.intrinsics.widen(&self.types, literal),
                None => self.implicit_any(node, symbol),
            },
            (None, None) => self.implicit_any(node, symbol),
        };
        if optional {
            self.add_optionality(ty)
        } else {
            ty
        }
    }

    fn initializer_type(&mut self, init: &Initializer) -> Option<TypeId> {
        let value = match init {
            Initializer::String(s) => LiteralValue::String(s.clone()),
            Initializer::Number(n) => LiteralValue::Number(*n),
            Initializer::Boolean(b) => LiteralValue::Boolean(*b),
            Initializer::Other => return None,
        };
        Some(self.types.literal(value))
    }

    fn implicit_any(&mut self, node: NodeId, symbol: SymbolId) -> TypeId {
        if self.program.options().no_implicit_any {
            let name = self.symbol(symbol).name.clone();
            let code = if self.node_kind(node) == SyntaxKind::Parameter {
                codes::IMPLICIT_ANY_PARAMETER
            } else {
                codes::IMPLICIT_ANY_VARIABLE
            };
            self.error(
                self.node(node).span,
                code,
                format!("'{}' implicitly has an 'any' type.", name),
            );
        }
        self.intrinsics.any
    }

    fn type_of_accessor(&mut self, symbol: SymbolId) -> TypeId {
        let declarations = self.symbol(symbol).declarations.clone();
        let mut setter_type = None;
        for node in &declarations {
            let payload = self.binding.nodes.payload(*node);
            match &*payload {
                NodePayload::ClassMember(ClassMember::Getter {
                    return_type: Some(ty),
                    ..
                })
                | NodePayload::TypeMember(ObjectTypeMember::Getter {
                    return_type: Some(ty),
                    ..
                }) => return self.type_from_type_node(ty, *node),
                NodePayload::ClassMember(ClassMember::Setter { param, .. })
                | NodePayload::TypeMember(ObjectTypeMember::Setter { param, .. }) => {
                    if let Some(annotation) = &param.type_annotation {
                        setter_type.get_or_insert((annotation.clone(), *node));
                    }
                }
                _ => {}
            }
        }
        match setter_type {
            Some((annotation, node)) => self.type_from_type_node(&annotation, node),
            None => self.intrinsics.any,
        }
    }

    /// `T | undefined` when optional members carry `undefined`.
    pub(crate) fn add_optionality(&mut self, ty: TypeId) -> TypeId {
        if self.program.options().strict_null_checks {
            let undefined = self.intrinsics.undefined;
            self.get_union(vec![ty, undefined])
        } else {
            ty
        }
    }

    /// Declared (type-side) meaning of a symbol.
    pub fn declared_type_of_symbol(&mut self, symbol: SymbolId) -> TypeId {
        let flags = self.symbol(symbol).flags;
        if flags.intersects(SymbolFlags::CLASS | SymbolFlags::INTERFACE) {
            self.class_or_interface_type(symbol)
        } else if flags.contains(SymbolFlags::TYPE_ALIAS) {
            self.type_alias_type(symbol)
        } else if flags.intersects(SymbolFlags::ENUM) {
            self.enum_type(symbol)
        } else if flags.contains(SymbolFlags::TYPE_PARAMETER) {
            self.type_parameter_of_symbol(symbol)
        } else if flags.contains(SymbolFlags::ENUM_MEMBER) {
            match self.symbol(symbol).parent {
                Some(parent) => self.enum_type(parent),
                None => self.intrinsics.any,
            }
        } else if flags.contains(SymbolFlags::ALIAS) {
            match self.resolve_alias(symbol) {
                Some(target) if target != symbol => self.declared_type_of_symbol(target),
                _ => self.intrinsics.any,
            }
        } else {
            self.intrinsics.any
        }
    }

    fn class_or_interface_type(&mut self, symbol: SymbolId) -> TypeId {
        if let Some(&ty) = self.declared_types.get(&symbol) {
            return ty;
        }
        let is_class = self.symbol(symbol).flags.contains(SymbolFlags::CLASS);
        let parameter_symbols: Vec<SymbolId> =
            self.symbol(symbol).type_parameters.values().copied().collect();

        let mut object_flags = if is_class {
            ObjectFlags::CLASS
        } else {
            ObjectFlags::INTERFACE
        };
        if is_class || !parameter_symbols.is_empty() {
            object_flags |= ObjectFlags::REFERENCE;
        }
        let ty = self.types.alloc(TypeData::object(
            object_flags,
            Some(symbol),
            TypeKind::ClassOrInterface {
                type_parameters: Vec::new(),
                this_type: None,
                view: None,
            },
        ));
        self.declared_types.insert(symbol, ty);

        let type_parameters: Vec<TypeId> = parameter_symbols
            .into_iter()
            .map(|p| self.type_parameter_of_symbol(p))
            .collect();
        let this_type = self.types.alloc(TypeData {
            flags: TypeFlags::TYPE_PARAMETER,
            object_flags: ObjectFlags::empty(),
            symbol: Some(symbol),
            kind: TypeKind::TypeParameter {
                declaration: None,
                is_this_type: true,
                this_of: Some(ty),
            },
        });
        self.constraints.insert(this_type, Some(ty));
        if let TypeKind::ClassOrInterface {
            type_parameters: params,
            this_type: this,
            ..
        } = &mut self.types.get_mut(ty).kind
        {
            params.clone_from(&type_parameters);
            *this = Some(this_type);
        }
        if object_flags.contains(ObjectFlags::REFERENCE) {
            self.types.register_reference(ty, type_parameters, ty);
        }
        debug!(symbol = %self.symbol(symbol).name, ?ty, "declared type");
        ty
    }

    /// Per-declaration type of one of several merged interface
    /// declarations.
    fn interface_view(&mut self, declaration: NodeId, merged: TypeId) -> TypeId {
        if let Some(&ty) = self.interface_views.get(&declaration) {
            return ty;
        }
        let merged_data = self.types.get(merged).clone();
        let (type_parameters, this_type) = match merged_data.kind {
            TypeKind::ClassOrInterface {
                type_parameters,
                this_type,
                ..
            } => (type_parameters, this_type),
            _ => (Vec::new(), None),
        };
        let mut object_flags = ObjectFlags::INTERFACE;
        if !type_parameters.is_empty() {
            object_flags |= ObjectFlags::REFERENCE;
        }
        let ty = self.types.alloc(TypeData::object(
            object_flags,
            merged_data.symbol,
            TypeKind::ClassOrInterface {
                type_parameters,
                this_type,
                view: Some(InterfaceView {
                    declaration,
                    merged,
                }),
            },
        ));
        self.interface_views.insert(declaration, ty);
        ty
    }

    fn enum_type(&mut self, symbol: SymbolId) -> TypeId {
        if let Some(&ty) = self.declared_types.get(&symbol) {
            return ty;
        }
        let ty = self.types.alloc(TypeData {
            flags: TypeFlags::ENUM,
            object_flags: ObjectFlags::empty(),
            symbol: Some(symbol),
            kind: TypeKind::Enum,
        });
        self.declared_types.insert(symbol, ty);
        ty
    }

    pub(crate) fn type_parameter_of_symbol(&mut self, symbol: SymbolId) -> TypeId {
        if let Some(&ty) = self.type_parameters.get(&symbol) {
            return ty;
        }
        let declaration = self.symbol(symbol).declarations.first().copied();
        let ty = self.types.alloc(TypeData {
            flags: TypeFlags::TYPE_PARAMETER,
            object_flags: ObjectFlags::empty(),
            symbol: Some(symbol),
            kind: TypeKind::TypeParameter {
                declaration,
                is_this_type: false,
                this_of: None,
            },
        });
        self.type_parameters.insert(symbol, ty);
        ty
    }

    /// Constraint of a type parameter, `None` when unconstrained.
    pub fn constraint_of_type_parameter(&mut self, ty: TypeId) -> Option<TypeId> {
        if let Some(&constraint) = self.constraints.get(&ty) {
            return constraint;
        }
        let TypeKind::TypeParameter {
            declaration: Some(node),
            ..
        } = self.types.get(ty).kind
        else {
            return None;
        };
        if !self.resolving.insert(Resolving::Constraint(ty)) {
            return None;
        }
        let payload = self.binding.nodes.payload(node);
        let scope = self.node(node).parent.unwrap_or(node);
        let constraint = match &*payload {
            NodePayload::TypeParameter(param) => param
                .constraint
                .as_deref()
                .map(|c| self.type_from_type_node(c, scope)),
            _ => None,
        };
        self.resolving.remove(&Resolving::Constraint(ty));
        self.constraints.insert(ty, constraint);
        constraint
    }

    /// Default of a type parameter, used to fill omitted type arguments.
    pub(crate) fn default_of_type_parameter(&mut self, ty: TypeId) -> Option<TypeId> {
        let TypeKind::TypeParameter {
            declaration: Some(node),
            ..
        } = self.types.get(ty).kind
        else {
            return None;
        };
        let payload = self.binding.nodes.payload(node);
        let scope = self.node(node).parent.unwrap_or(node);
        match &*payload {
            NodePayload::TypeParameter(param) => param
                .default
                .as_deref()
                .map(|d| self.type_from_type_node(d, scope)),
            _ => None,
        }
    }

    /// Constructor declarations of a class, in declaration order.
    pub fn class_constructor_declarations(&self, class: SymbolId) -> Vec<NodeId> {
        self.symbol(class)
            .members
            .get(names::CONSTRUCTOR)
            .map(|&ctor| self.symbol(ctor).declarations.clone())
            .unwrap_or_default()
    }

    /// Static side members of a class, including `prototype` and merged
    /// namespace exports.
    pub fn class_static_members(&mut self, class: SymbolId) -> Vec<SymbolId> {
        self.exports_of(class)
            .iter()
            .filter(|(name, _)| !names::is_reserved(name))
            .map(|(_, &s)| s)
            .collect()
    }

    /// Value declarations local to a module's bodies, other than the
    /// target of its `export =`.
    pub fn module_locals(&mut self, module: SymbolId) -> Vec<SymbolId> {
        let export_target = self
            .symbol(module)
            .exports
            .get(names::EXPORT_EQUALS)
            .copied()
            .and_then(|alias| self.resolve_alias(alias));
        let declarations = self.symbol(module).declarations.clone();
        let mut locals = Vec::new();
        for declaration in declarations {
            let Some(table) = self.binding.locals.get(&declaration) else {
                continue;
            };
            for &symbol in table.values() {
                let flags = self.symbol(symbol).flags;
                if flags.intersects(SymbolFlags::VALUE)
                    && Some(symbol) != export_target
                    && !locals.contains(&symbol)
                {
                    locals.push(symbol);
                }
            }
        }
        locals
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn error(&mut self, span: Span, code: u32, message: String) {
        if self.reported.insert((Some(span.file_id), span.start, code)) {
            self.diagnostics.push(Diagnostic::new(span, code, message));
        }
    }

    pub(crate) fn global_error(&mut self, code: u32, message: String) {
        if self.reported.insert((None, 0, code)) {
            self.diagnostics.push(Diagnostic::global(code, message));
        }
    }

    /// Program diagnostics plus everything found while resolving every
    /// declaration, ordered by file and position.
    pub fn pre_emit_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.check_all();
        let skip_js = self.program.options().skip_js_checking;
        let program = self.program;
        let mut all: Vec<Diagnostic> = program
            .diagnostics()
            .iter()
            .chain(self.diagnostics.iter())
            .filter(|d| match d.file {
                Some(file) if skip_js => !program.file(file).is_js,
                _ => true,
            })
            .cloned()
            .collect();
        all.sort_by_key(|d| (d.file.map_or(0, |f| f + 1), d.start, d.code));
        all.dedup();
        all
    }

    fn check_all(&mut self) {
        let count = self.binding.nodes.len();
        for id in self.binding.nodes.ids().take(count).collect::<Vec<_>>() {
            match self.node_kind(id) {
                SyntaxKind::VariableDeclaration
                | SyntaxKind::PropertyDeclaration
                | SyntaxKind::PropertySignature
                | SyntaxKind::GetAccessor
                | SyntaxKind::SetAccessor
                | SyntaxKind::TypeAliasDeclaration
                | SyntaxKind::EnumDeclaration
                | SyntaxKind::ModuleDeclaration
                | SyntaxKind::ImportEqualsDeclaration
                | SyntaxKind::ImportSpecifier
                | SyntaxKind::ExportSpecifier
                | SyntaxKind::ExportAssignment => {
                    if let Some(symbol) = self.node(id).symbol {
                        if self.symbol(symbol).flags.intersects(SymbolFlags::ALIAS) {
                            self.resolve_alias(symbol);
                        }
                    }
                    self.type_at_declaration(id);
                }
                SyntaxKind::ClassDeclaration | SyntaxKind::InterfaceDeclaration => {
                    let ty = self.type_at_declaration(id);
                    self.declared_members(ty);
                }
                SyntaxKind::TypeParameter => {
                    let ty = self.type_at_declaration(id);
                    self.constraint_of_type_parameter(ty);
                }
                kind if kind.is_signature_declaration() => {
                    self.signature_of_declaration(id);
                }
                _ => {}
            }
        }
    }

    // =========================================================================
    // Display
    // =========================================================================

    /// Readable rendering of a type for messages.
    pub fn type_to_string(&self, ty: TypeId) -> String {
        self.write_type(ty, 0)
    }

    fn write_type(&self, ty: TypeId, depth: usize) -> String {
        if depth > 4 {
            return "...".to_string();
        }
        let data = self.types.get(ty);
        let symbol_name = || {
            data.symbol
                .map(|s| self.symbol(s).name.clone())
                .unwrap_or_else(|| "?".to_string())
        };
        let list = |types: &[TypeId], sep: &str| {
            types
                .iter()
                .map(|&t| self.write_type(t, depth + 1))
                .collect::<Vec<_>>()
                .join(sep)
        };
        match &data.kind {
            TypeKind::Intrinsic(name) => name.to_string(),
            TypeKind::Literal(LiteralValue::String(s)) => format!("\"{}\"", s),
            TypeKind::Literal(LiteralValue::Number(n)) => format_number(*n),
            TypeKind::Literal(LiteralValue::Boolean(b)) => b.to_string(),
            TypeKind::Literal(LiteralValue::BigInt(s)) => format!("{}n", s),
            TypeKind::Enum | TypeKind::TypeParameter { is_this_type: false, .. } => symbol_name(),
            TypeKind::TypeParameter { .. } => "this".to_string(),
            TypeKind::ClassOrInterface { type_parameters, .. } if type_parameters.is_empty() => {
                symbol_name()
            }
            TypeKind::ClassOrInterface { type_parameters, .. } => {
                format!("{}<{}>", symbol_name(), list(type_parameters, ", "))
            }
            TypeKind::Reference { target, arguments } => match self.types.get(*target).kind {
                TypeKind::TupleTarget { .. } => format!("[{}]", list(arguments, ", ")),
                _ if arguments.is_empty() => self.write_type(*target, depth + 1),
                _ => {
                    let name = self.types.get(*target).symbol.map(|s| self.symbol(s).name.clone());
                    format!("{}<{}>", name.unwrap_or_default(), list(arguments, ", "))
                }
            },
            TypeKind::TupleTarget { arity, .. } => format!("[{} elements]", arity),
            TypeKind::Union(members) => list(members, " | "),
            TypeKind::Intersection(members) => list(members, " & "),
            TypeKind::Anonymous {
                origin: AnonymousOrigin::Symbol(symbol),
                ..
            } => format!("typeof {}", self.symbol(*symbol).name),
            TypeKind::Anonymous { .. } => "{ ... }".to_string(),
            TypeKind::Mapped { .. } => "{ [mapped] }".to_string(),
            TypeKind::Conditional { .. } => "(conditional)".to_string(),
            TypeKind::IndexedAccess { object, index } => format!(
                "{}[{}]",
                self.write_type(*object, depth + 1),
                self.write_type(*index, depth + 1)
            ),
            TypeKind::Index(operand) => format!("keyof {}", self.write_type(*operand, depth + 1)),
            TypeKind::Substitution { base, .. } => self.write_type(*base, depth),
        }
    }
}
