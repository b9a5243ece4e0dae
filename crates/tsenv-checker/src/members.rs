//! Members of object types
//!
//! Declared members of classes and interfaces, resolved members of
//! anonymous and mapped types, signatures of declarations, and the
//! apparent property lookup `keyof` and `T[K]` evaluate against.

use indexmap::IndexMap;
use std::rc::Rc;
use tracing::trace;
use tsenv_ast::*;

use crate::checker::{Resolving, TypeChecker};
use crate::error::codes;
use crate::resolve::Meaning;
use crate::symbols::{names, Symbol, SymbolFlags, SymbolId, SymbolTable};
use crate::syntax::{NodeId, NodePayload, SyntaxKind};
use crate::types::*;

/// Bases deeper than this are not searched for properties
const MAX_BASE_DEPTH: u32 = 8;

/// Members of an object type with the mapper their declared types need
struct ObjectView {
    properties: Vec<SymbolId>,
    string_index: Option<TypeId>,
    number_index: Option<TypeId>,
    bases: Vec<TypeId>,
    mapper: Option<Rc<TypeMapper>>,
}

/// Type and optionality of an apparent property
pub type PropertyInfo = (TypeId, bool);

impl TypeChecker<'_> {
    // =========================================================================
    // Classes and interfaces
    // =========================================================================

    /// Members a class or interface type declares itself. An interface view
    /// only sees the members of its own declaration.
    pub fn declared_members(&mut self, ty: TypeId) -> Rc<DeclaredMembers> {
        if let Some(members) = self.declared_members.get(&ty) {
            return Rc::clone(members);
        }
        let data = self.types.get(ty).clone();
        let TypeKind::ClassOrInterface {
            type_parameters,
            view,
            ..
        } = data.kind
        else {
            return Rc::new(DeclaredMembers::default());
        };
        let empty = || {
            Rc::new(DeclaredMembers {
                type_parameters: type_parameters.clone(),
                ..Default::default()
            })
        };
        let Some(symbol) = data.symbol else {
            return empty();
        };
        if !self.resolving.insert(Resolving::Members(ty)) {
            trace!(symbol = %self.symbol(symbol).name, "members requested while resolving");
            return empty();
        }

        let only = view.map(|v| v.declaration);
        let table = self.symbol(symbol).members.clone();
        let properties = table
            .iter()
            .filter(|(name, _)| !names::is_reserved(name))
            .filter(|&(_, &member)| self.declared_in(member, only))
            .map(|(_, &member)| member)
            .collect();
        let call_signatures = self.table_signatures(&table, names::CALL, only);
        let construct_signatures = self.table_signatures(&table, names::NEW, only);
        let (string_index, number_index) = self.table_index_types(&table, only);
        let base_types = self.base_types(symbol, only);

        let members = Rc::new(DeclaredMembers {
            type_parameters: type_parameters.clone(),
            base_types,
            properties,
            call_signatures,
            construct_signatures,
            string_index,
            number_index,
        });
        self.resolving.remove(&Resolving::Members(ty));
        self.declared_members.insert(ty, Rc::clone(&members));
        members
    }

    fn declared_in(&self, member: SymbolId, only: Option<NodeId>) -> bool {
        match only {
            None => true,
            Some(declaration) => self
                .symbol(member)
                .declarations
                .iter()
                .any(|&d| self.node(d).parent == Some(declaration)),
        }
    }

    fn table_signatures(&mut self, table: &SymbolTable, key: &str, only: Option<NodeId>) -> Vec<Signature> {
        let Some(&symbol) = table.get(key) else {
            return Vec::new();
        };
        let declarations: Vec<NodeId> = self
            .symbol(symbol)
            .declarations
            .iter()
            .copied()
            .filter(|&d| only.is_none() || self.node(d).parent == only)
            .collect();
        declarations
            .into_iter()
            .map(|d| (*self.signature_of_declaration(d)).clone())
            .collect()
    }

    fn table_index_types(&mut self, table: &SymbolTable, only: Option<NodeId>) -> (Option<TypeId>, Option<TypeId>) {
        let mut string_index = None;
        let mut number_index = None;
        let Some(&symbol) = table.get(names::INDEX) else {
            return (None, None);
        };
        let declarations = self.symbol(symbol).declarations.clone();
        for node in declarations {
            if only.is_some() && self.node(node).parent != only {
                continue;
            }
            let payload = self.binding.nodes.payload(node);
            let signature = match &*payload {
                NodePayload::TypeMember(ObjectTypeMember::IndexSignature(signature)) => signature,
                NodePayload::ClassMember(ClassMember::IndexSignature {
                    signature,
                    is_static: false,
                }) => signature,
                _ => continue,
            };
            let key = self.type_from_type_node(&signature.key_type, node);
            let value = self.type_from_type_node(&signature.value_type, node);
            if self.flags(key).contains(TypeFlags::NUMBER) {
                number_index.get_or_insert(value);
            } else {
                string_index.get_or_insert(value);
            }
        }
        (string_index, number_index)
    }

    fn base_types(&mut self, symbol: SymbolId, only: Option<NodeId>) -> Vec<TypeId> {
        let declarations = self.symbol(symbol).declarations.clone();
        let mut bases = Vec::new();
        for declaration in declarations {
            if only.is_some_and(|d| d != declaration) {
                continue;
            }
            let payload = self.binding.nodes.payload(declaration);
            match &*payload {
                NodePayload::Class(class) => {
                    if let Some(base) = class.extends.as_ref().and_then(|e| self.class_base(e, declaration)) {
                        bases.push(base);
                    }
                }
                NodePayload::Interface(interface) => {
                    for heritage in &interface.extends {
                        let base = self.type_from_type_node(heritage, declaration);
                        if base != self.intrinsics.any && !bases.contains(&base) {
                            bases.push(base);
                        }
                    }
                }
                _ => {}
            }
        }
        bases
    }

    /// Instance type a class `extends` clause denotes: a class or interface
    /// type when the name has a type meaning, otherwise whatever the
    /// constructor value produces.
    fn class_base(&mut self, heritage: &ExpressionWithTypeArgs, class: NodeId) -> Option<TypeId> {
        let type_symbol = self
            .try_resolve_entity(&heritage.expr, class, Meaning::Type)
            .filter(|&s| self.symbol(s).flags.intersects(SymbolFlags::CLASS | SymbolFlags::INTERFACE));
        if let Some(symbol) = type_symbol {
            return Some(self.type_from_symbol_reference(
                symbol,
                heritage.type_args.as_deref(),
                heritage.expr.span,
                class,
            ));
        }
        let value = self.resolve_entity(&heritage.expr, class, Meaning::Value)?;
        let constructor = self.type_of_symbol(value);
        let members = self.resolved_members(constructor)?;
        members.construct_signatures.first().map(|s| s.return_type)
    }

    // =========================================================================
    // Anonymous and mapped types
    // =========================================================================

    /// Members of an anonymous or mapped type; `None` for other types and
    /// for mapped types over a still generic key set.
    pub fn resolved_members(&mut self, ty: TypeId) -> Option<Rc<ResolvedMembers>> {
        if let Some(members) = self.resolved_members.get(&ty) {
            return members.clone();
        }
        if !self.resolving.insert(Resolving::Members(ty)) {
            return None;
        }
        let resolved = match self.types.get(ty).kind.clone() {
            TypeKind::Anonymous { origin, mapper } => {
                let members = self.anonymous_members(origin);
                Some(Rc::new(match mapper {
                    Some(mapper) => self.instantiate_members(members, &mapper),
                    None => members,
                }))
            }
            TypeKind::Mapped {
                declaration,
                mapper,
            } => self.mapped_members(declaration, mapper).map(Rc::new),
            _ => None,
        };
        self.resolving.remove(&Resolving::Members(ty));
        self.resolved_members.insert(ty, resolved.clone());
        resolved
    }

    fn anonymous_members(&mut self, origin: AnonymousOrigin) -> ResolvedMembers {
        match origin {
            AnonymousOrigin::TypeLiteral(node) => {
                let Some(symbol) = self.node(node).symbol else {
                    return ResolvedMembers::default();
                };
                let table = self.symbol(symbol).members.clone();
                let properties = table
                    .iter()
                    .filter(|(name, _)| !names::is_reserved(name))
                    .map(|(_, &s)| s)
                    .collect();
                let call_signatures = self.table_signatures(&table, names::CALL, None);
                let construct_signatures = self.table_signatures(&table, names::NEW, None);
                let (string_index, number_index) = self.table_index_types(&table, None);
                ResolvedMembers {
                    properties,
                    call_signatures,
                    construct_signatures,
                    string_index,
                    number_index,
                }
            }
            AnonymousOrigin::Signature(node) => {
                let signature = (*self.signature_of_declaration(node)).clone();
                let is_constructor = self.node_kind(node) == SyntaxKind::ConstructorType;
                let mut members = ResolvedMembers::default();
                if is_constructor {
                    members.construct_signatures.push(signature);
                } else {
                    members.call_signatures.push(signature);
                }
                members
            }
            AnonymousOrigin::Symbol(symbol) => self.value_members(symbol),
        }
    }

    /// Members of the value side of a function, class, enum or namespace.
    fn value_members(&mut self, symbol: SymbolId) -> ResolvedMembers {
        let flags = self.symbol(symbol).flags;
        let mut members = ResolvedMembers::default();

        if flags.contains(SymbolFlags::CLASS) {
            members.properties = self.class_static_members(symbol);
            members.construct_signatures = self.class_construct_signatures(symbol);
        } else if flags.intersects(SymbolFlags::ENUM | SymbolFlags::VALUE_MODULE | SymbolFlags::FUNCTION) {
            let exports = self.exports_of(symbol);
            for (name, &export) in exports.iter() {
                if names::is_reserved(name) {
                    continue;
                }
                if self.has_value_meaning(export) {
                    members.properties.push(export);
                }
            }
        }

        if flags.intersects(SymbolFlags::FUNCTION | SymbolFlags::METHOD) {
            let declarations: Vec<NodeId> = self
                .symbol(symbol)
                .declarations
                .iter()
                .copied()
                .filter(|&d| self.node_kind(d).is_signature_declaration())
                .collect();
            let overloads: Vec<NodeId> = declarations
                .iter()
                .copied()
                .filter(|&d| !self.has_body(d))
                .collect();
            let chosen = if overloads.is_empty() { declarations } else { overloads };
            members.call_signatures = chosen
                .into_iter()
                .map(|d| (*self.signature_of_declaration(d)).clone())
                .collect();
        }
        members
    }

    fn has_value_meaning(&mut self, symbol: SymbolId) -> bool {
        let flags = self.symbol(symbol).flags;
        if flags.intersects(SymbolFlags::VALUE) {
            return true;
        }
        flags.contains(SymbolFlags::ALIAS)
            && self
                .resolve_alias(symbol)
                .is_some_and(|target| self.symbol(target).flags.intersects(SymbolFlags::VALUE))
    }

    fn has_body(&self, node: NodeId) -> bool {
        match &*self.binding.nodes.payload(node) {
            NodePayload::Function(function) => function.has_body,
            NodePayload::ClassMember(ClassMember::Method { has_body, .. })
            | NodePayload::ClassMember(ClassMember::Constructor { has_body, .. }) => *has_body,
            _ => false,
        }
    }

    /// Construct signatures of a class; a class without constructor
    /// declarations gets a parameterless one.
    fn class_construct_signatures(&mut self, class: SymbolId) -> Vec<Signature> {
        let declarations = self.class_constructor_declarations(class);
        let overloads: Vec<NodeId> = declarations
            .iter()
            .copied()
            .filter(|&d| !self.has_body(d))
            .collect();
        let chosen = if overloads.is_empty() { declarations } else { overloads };
        if !chosen.is_empty() {
            return chosen
                .into_iter()
                .map(|d| (*self.signature_of_declaration(d)).clone())
                .collect();
        }
        let instance = self.declared_type_of_symbol(class);
        vec![Signature {
            declaration: None,
            type_parameters: self.type_arguments(instance),
            parameters: Vec::new(),
            return_type: instance,
            min_argument_count: 0,
            has_rest_parameter: false,
        }]
    }

    fn instantiate_members(&mut self, members: ResolvedMembers, mapper: &Rc<TypeMapper>) -> ResolvedMembers {
        ResolvedMembers {
            properties: members.properties,
            call_signatures: members
                .call_signatures
                .iter()
                .map(|s| self.instantiate_signature(s, mapper))
                .collect(),
            construct_signatures: members
                .construct_signatures
                .iter()
                .map(|s| self.instantiate_signature(s, mapper))
                .collect(),
            string_index: members.string_index.map(|t| self.instantiate(t, mapper)),
            number_index: members.number_index.map(|t| self.instantiate(t, mapper)),
        }
    }

    pub(crate) fn instantiate_signature(&mut self, signature: &Signature, mapper: &Rc<TypeMapper>) -> Signature {
        let parameters = signature
            .parameters
            .iter()
            .map(|p| SignatureParameter {
                name: p.name.clone(),
                ty: self.instantiate(p.ty, mapper),
            })
            .collect();
        Signature {
            declaration: signature.declaration,
            type_parameters: signature.type_parameters.clone(),
            parameters,
            return_type: self.instantiate(signature.return_type, mapper),
            min_argument_count: signature.min_argument_count,
            has_rest_parameter: signature.has_rest_parameter,
        }
    }

    fn mapped_type_parameter(&mut self, declaration: NodeId) -> Option<TypeId> {
        let payload = self.binding.nodes.payload(declaration);
        let NodePayload::Mapped(mapped) = &*payload else {
            return None;
        };
        let symbol = self
            .binding
            .locals
            .get(&declaration)
            .and_then(|locals| locals.get(&mapped.type_param.value.name))
            .copied()?;
        Some(self.type_parameter_of_symbol(symbol))
    }

    /// Key set of a mapped type, instantiated.
    pub(crate) fn mapped_constraint(&mut self, ty: TypeId) -> TypeId {
        let TypeKind::Mapped {
            declaration,
            mapper,
        } = self.types.get(ty).kind.clone()
        else {
            return self.intrinsics.any;
        };
        let constraint = self
            .mapped_type_parameter(declaration)
            .and_then(|key| self.constraint_of_type_parameter(key))
            .unwrap_or(self.intrinsics.any);
        match mapper {
            Some(mapper) => self.instantiate(constraint, &mapper),
            None => constraint,
        }
    }

    /// Properties of a mapped type whose key set is known. Keys come from
    /// the literal members of the constraint; `keyof X` constraints also
    /// carry over the optionality of the properties of `X`.
    fn mapped_members(&mut self, declaration: NodeId, mapper: Option<Rc<TypeMapper>>) -> Option<ResolvedMembers> {
        let payload = self.binding.nodes.payload(declaration);
        let NodePayload::Mapped(mapped) = &*payload else {
            return Some(ResolvedMembers::default());
        };
        let key_parameter = self.mapped_type_parameter(declaration)?;
        let instantiate = |checker: &mut Self, ty: TypeId| match &mapper {
            Some(mapper) => checker.instantiate(ty, mapper),
            None => ty,
        };

        let modifiers_type = match &mapped.constraint.value {
            Type::Keyof(operand) => {
                let operand = self.type_from_type_node(operand, declaration);
                Some(instantiate(self, operand))
            }
            _ => None,
        };
        let constraint = self.type_from_type_node(&mapped.constraint, declaration);
        let constraint = instantiate(self, constraint);
        if self.is_generic(constraint) || modifiers_type.is_some_and(|t| self.is_generic(t)) {
            return None;
        }

        let template = match &mapped.value_type {
            Some(value) => self.type_from_type_node(value, declaration),
            None => self.intrinsics.any,
        };
        let source_properties = match modifiers_type {
            Some(source) => self.properties_of_type(source),
            None => IndexMap::new(),
        };
        let keys = match &self.types.get(constraint).kind {
            TypeKind::Union(members) => members.clone(),
            _ => vec![constraint],
        };

        let mut members = ResolvedMembers::default();
        for key in keys {
            let template_for_key = |checker: &mut Self| {
                let (mut sources, mut targets) = (vec![key_parameter], vec![key]);
                if let Some(mapper) = &mapper {
                    sources.extend(mapper.sources.iter().copied());
                    targets.extend(mapper.targets.iter().copied());
                }
                let combined = Rc::new(TypeMapper::new(sources, targets));
                checker.instantiate(template, &combined)
            };
            let name = match self.types.get(key).kind.clone() {
                TypeKind::Literal(LiteralValue::String(s)) => s,
                TypeKind::Literal(LiteralValue::Number(n)) => format_number(n),
                _ => {
                    let flags = self.flags(key);
                    if flags.contains(TypeFlags::STRING) {
                        members.string_index = Some(template_for_key(self));
                    } else if flags.contains(TypeFlags::NUMBER) {
                        members.number_index = Some(template_for_key(self));
                    }
                    continue;
                }
            };
            let optional = match mapped.optional {
                Some(MappedModifier::Add | MappedModifier::Present) => true,
                Some(MappedModifier::Remove) => false,
                None => source_properties.get(&name).is_some_and(|&(_, optional)| optional),
            };
            let mut ty = template_for_key(self);
            let mut flags = SymbolFlags::PROPERTY | SymbolFlags::TRANSIENT;
            if optional {
                flags |= SymbolFlags::OPTIONAL;
                ty = self.add_optionality(ty);
            }
            let property = self.binding.symbols.alloc(Symbol::new(name, flags));
            self.transient_types.insert(property, ty);
            members.properties.push(property);
        }
        Some(members)
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    /// Signature of a function, method, constructor, call or construct
    /// signature, or function type node.
    pub fn signature_of_declaration(&mut self, node: NodeId) -> Rc<Signature> {
        if let Some(signature) = self.signatures.get(&node) {
            return Rc::clone(signature);
        }
        let signature = Rc::new(self.compute_signature(node));
        self.signatures.insert(node, Rc::clone(&signature));
        signature
    }

    fn compute_signature(&mut self, node: NodeId) -> Signature {
        let payload = self.binding.nodes.payload(node);
        let (declaration, has_body, is_constructor) = match &*payload {
            NodePayload::Function(function) => (function.signature.clone(), function.has_body, false),
            NodePayload::ClassMember(ClassMember::Method {
                signature, has_body, ..
            }) => (signature.clone(), *has_body, false),
            NodePayload::ClassMember(ClassMember::Constructor { params, has_body, .. }) => (
                SignatureDecl {
                    type_params: None,
                    params: params.clone(),
                    return_type: None,
                },
                *has_body,
                true,
            ),
            NodePayload::TypeMember(
                ObjectTypeMember::Method { signature, .. }
                | ObjectTypeMember::CallSignature(signature)
                | ObjectTypeMember::ConstructSignature(signature),
            ) => (signature.clone(), false, false),
            NodePayload::FunctionType(function) => (function.signature.clone(), false, false),
            _ => {
                return Signature {
                    declaration: Some(node),
                    type_parameters: Vec::new(),
                    parameters: Vec::new(),
                    return_type: self.intrinsics.any,
                    min_argument_count: 0,
                    has_rest_parameter: false,
                }
            }
        };

        let class_type = if is_constructor {
            self.node(node)
                .parent
                .and_then(|class| self.node(class).symbol)
                .map(|class| self.declared_type_of_symbol(class))
        } else {
            None
        };
        let type_parameters = match class_type {
            Some(class_type) => self.type_arguments(class_type),
            None => self.local_type_parameters(node, declaration.type_params.as_deref()),
        };

        let strict = self.program.options().strict_null_checks;
        let no_implicit_any = self.program.options().no_implicit_any;
        let mut parameters = Vec::new();
        for param in declaration.value_params() {
            let name = param.name.text();
            let mut ty = match &param.type_annotation {
                Some(annotation) => self.type_from_type_node(annotation, node),
                None if param.is_rest => {
                    let any = self.intrinsics.any;
                    self.create_array_type(any, false)
                }
                None => {
                    if no_implicit_any {
                        self.error(
                            param.span,
                            codes::IMPLICIT_ANY_PARAMETER,
                            format!("Parameter '{}' implicitly has an 'any' type.", name),
                        );
                    }
                    self.intrinsics.any
                }
            };
            if strict && (param.optional || param.has_initializer) {
                ty = self.add_optionality(ty);
            }
            parameters.push(SignatureParameter { name, ty });
        }

        let return_type = match (&declaration.return_type, class_type) {
            (Some(annotation), _) => self.type_from_type_node(annotation, node),
            (None, Some(class_type)) => class_type,
            (None, None) => {
                let kind = self.node_kind(node);
                if no_implicit_any
                    && !has_body
                    && !matches!(kind, SyntaxKind::ConstructSignature | SyntaxKind::ConstructorType)
                {
                    let name = self
                        .node(node)
                        .name
                        .as_ref()
                        .map(|n| n.text.clone())
                        .unwrap_or_else(|| kind.to_string());
                    self.error(
                        self.node(node).span,
                        codes::IMPLICIT_ANY_RETURN,
                        format!(
                            "'{}', which lacks return-type annotation, implicitly has an 'any' return type.",
                            name
                        ),
                    );
                }
                self.intrinsics.any
            }
        };

        Signature {
            declaration: Some(node),
            type_parameters,
            parameters,
            return_type,
            min_argument_count: declaration.min_argument_count(),
            has_rest_parameter: declaration.has_rest_parameter(),
        }
    }

    // =========================================================================
    // Apparent properties
    // =========================================================================

    fn object_view(&mut self, ty: TypeId) -> Option<ObjectView> {
        match self.types.get(ty).kind.clone() {
            TypeKind::ClassOrInterface { view, .. } => {
                let target = view.map_or(ty, |v| v.merged);
                let members = self.declared_members(target);
                Some(ObjectView {
                    properties: members.properties.clone(),
                    string_index: members.string_index,
                    number_index: members.number_index,
                    bases: members.base_types.clone(),
                    mapper: None,
                })
            }
            TypeKind::Reference { target, arguments } => {
                if self.tuple_shape(target).is_some() {
                    let element = self.get_union(arguments);
                    return Some(ObjectView {
                        properties: Vec::new(),
                        string_index: None,
                        number_index: Some(element),
                        bases: Vec::new(),
                        mapper: None,
                    });
                }
                let members = self.declared_members(target);
                let count = members.type_parameters.len().min(arguments.len());
                let mapper = Rc::new(TypeMapper::new(
                    members.type_parameters[..count].to_vec(),
                    arguments[..count].to_vec(),
                ));
                let string_index = members.string_index.map(|t| self.instantiate(t, &mapper));
                let number_index = members.number_index.map(|t| self.instantiate(t, &mapper));
                let bases = members
                    .base_types
                    .iter()
                    .map(|&b| self.instantiate(b, &mapper))
                    .collect();
                Some(ObjectView {
                    properties: members.properties.clone(),
                    string_index,
                    number_index,
                    bases,
                    mapper: Some(mapper),
                })
            }
            TypeKind::Anonymous { mapper, .. } => {
                let members = self.resolved_members(ty)?;
                Some(ObjectView {
                    properties: members.properties.clone(),
                    string_index: members.string_index,
                    number_index: members.number_index,
                    bases: Vec::new(),
                    mapper,
                })
            }
            TypeKind::Mapped { .. } => {
                let members = self.resolved_members(ty)?;
                Some(ObjectView {
                    properties: members.properties.clone(),
                    string_index: members.string_index,
                    number_index: members.number_index,
                    bases: Vec::new(),
                    mapper: None,
                })
            }
            _ => None,
        }
    }

    /// Apparent properties of a type, own members shadowing inherited ones.
    pub fn properties_of_type(&mut self, ty: TypeId) -> IndexMap<String, PropertyInfo> {
        let mut properties = IndexMap::new();
        self.collect_properties(ty, &mut properties, 0);
        properties
    }

    fn collect_properties(&mut self, ty: TypeId, out: &mut IndexMap<String, PropertyInfo>, depth: u32) {
        if depth > MAX_BASE_DEPTH {
            return;
        }
        match self.types.get(ty).kind.clone() {
            TypeKind::Union(members) => {
                let mut common: Option<IndexMap<String, Vec<PropertyInfo>>> = None;
                for member in members {
                    let own = self.properties_of_type(member);
                    common = Some(match common {
                        None => own.into_iter().map(|(k, v)| (k, vec![v])).collect(),
                        Some(mut acc) => {
                            acc.retain(|name, _| own.contains_key(name));
                            for (name, infos) in acc.iter_mut() {
                                if let Some(&info) = own.get(name) {
                                    infos.push(info);
                                }
                            }
                            acc
                        }
                    });
                }
                for (name, infos) in common.unwrap_or_default() {
                    if out.contains_key(&name) {
                        continue;
                    }
                    let optional = infos.iter().any(|&(_, optional)| optional);
                    let ty = self.get_union(infos.into_iter().map(|(t, _)| t).collect());
                    out.insert(name, (ty, optional));
                }
            }
            TypeKind::Intersection(members) => {
                for member in members {
                    self.collect_properties(member, out, depth + 1);
                }
            }
            TypeKind::TypeParameter { .. } => {
                if let Some(constraint) = self.constraint_of_type_parameter(ty) {
                    self.collect_properties(constraint, out, depth + 1);
                }
            }
            TypeKind::Substitution { base, .. } => self.collect_properties(base, out, depth + 1),
            _ => {
                let Some(view) = self.object_view(ty) else {
                    return;
                };
                for property in view.properties {
                    let name = self.symbol(property).name.clone();
                    if out.contains_key(&name) {
                        continue;
                    }
                    let optional = self.symbol(property).flags.contains(SymbolFlags::OPTIONAL);
                    let declared = self.type_of_symbol(property);
                    let ty = match &view.mapper {
                        Some(mapper) => self.instantiate(declared, mapper),
                        None => declared,
                    };
                    out.insert(name, (ty, optional));
                }
                for base in view.bases {
                    self.collect_properties(base, out, depth + 1);
                }
            }
        }
    }

    /// Type of an apparent property of `ty`.
    pub fn property_of_type(&mut self, ty: TypeId, name: &str) -> Option<TypeId> {
        self.properties_of_type(ty).get(name).map(|&(ty, _)| ty)
    }

    /// String or number index type of `ty`; a number lookup falls back to
    /// the string index.
    pub fn index_type_of_type(&mut self, ty: TypeId, number: bool) -> Option<TypeId> {
        self.index_type_at_depth(ty, number, 0)
    }

    fn index_type_at_depth(&mut self, ty: TypeId, number: bool, depth: u32) -> Option<TypeId> {
        if depth > MAX_BASE_DEPTH {
            return None;
        }
        match self.types.get(ty).kind.clone() {
            TypeKind::Union(members) => {
                let mut found = Vec::with_capacity(members.len());
                for member in members {
                    found.push(self.index_type_at_depth(member, number, depth + 1)?);
                }
                Some(self.get_union(found))
            }
            TypeKind::Intersection(members) => members
                .into_iter()
                .find_map(|m| self.index_type_at_depth(m, number, depth + 1)),
            TypeKind::TypeParameter { .. } => {
                let constraint = self.constraint_of_type_parameter(ty)?;
                self.index_type_at_depth(constraint, number, depth + 1)
            }
            _ => {
                let view = self.object_view(ty)?;
                let own = if number {
                    view.number_index.or(view.string_index)
                } else {
                    view.string_index
                };
                own.or_else(|| {
                    view.bases
                        .iter()
                        .find_map(|&base| self.index_type_at_depth(base, number, depth + 1))
                })
            }
        }
    }
}
