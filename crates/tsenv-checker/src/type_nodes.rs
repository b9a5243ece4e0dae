//! Type nodes to types
//!
//! Converts written type expressions into [`TypeId`]s. Names inside a type
//! node are resolved from a scope node, the nearest declaration enclosing
//! the type. Type literals, function types, mapped and conditional types
//! get a declaration node of their own the first time they are met, so
//! their members and type parameters can be bound and later resolved like
//! any other declaration.

use std::rc::Rc;
use tsenv_ast::*;

use crate::binder::Table;
use crate::checker::{InstantiationKey, Resolving, TypeChecker};
use crate::error::codes;
use crate::resolve::Meaning;
use crate::symbols::{names, Symbol, SymbolFlags, SymbolId};
use crate::syntax::{NodeId, NodePayload, SyntaxKind};
use crate::types::*;

impl TypeChecker<'_> {
    /// Type denoted by `node`, with names resolved from `scope`.
    pub(crate) fn type_from_type_node(&mut self, node: &Node<Type>, scope: NodeId) -> TypeId {
        match &node.value {
            Type::Keyword(KeywordType::Intrinsic) => self.intrinsics.string,
            Type::Keyword(keyword) => self
                .intrinsics
                .by_name(&keyword.to_string())
                .unwrap_or(self.intrinsics.any),
            Type::This => self.this_type_at(scope),
            Type::Array(element) => {
                let element = self.type_from_type_node(element, scope);
                self.create_array_type(element, false)
            }
            Type::Readonly(inner) => match &inner.value {
                Type::Array(element) => {
                    let element = self.type_from_type_node(element, scope);
                    self.create_array_type(element, true)
                }
                _ => self.type_from_type_node(inner, scope),
            },
            Type::UniqueSymbol => self.intrinsics.symbol,
            Type::Tuple(elements) => self.tuple_type(elements, scope),
            Type::Union(members) => {
                let members = members.iter().map(|m| self.type_from_type_node(m, scope)).collect();
                self.get_union(members)
            }
            Type::Intersection(members) => {
                let members = members.iter().map(|m| self.type_from_type_node(m, scope)).collect();
                self.get_intersection(members)
            }
            Type::Function(function) => self.function_type_node(node.span, function, scope),
            Type::TypeRef { name, type_args } => self.type_from_reference(name, type_args.as_deref(), scope),
            Type::Object(object) => self.type_literal_node(node.span, object, scope),
            Type::Literal(literal) => {
                let value = match literal {
                    LiteralType::String(s) => LiteralValue::String(s.clone()),
                    LiteralType::Number(n) => LiteralValue::Number(*n),
                    LiteralType::Boolean(b) => LiteralValue::Boolean(*b),
                    LiteralType::BigInt(s) => LiteralValue::BigInt(s.clone()),
                };
                self.types.literal(value)
            }
            Type::Paren(inner) => self.type_from_type_node(inner, scope),
            Type::Conditional {
                check_type,
                extends_type,
                true_type,
                false_type,
            } => {
                let payload = NodePayload::Conditional {
                    check_type: (**check_type).clone(),
                    extends_type: (**extends_type).clone(),
                    true_type: (**true_type).clone(),
                    false_type: (**false_type).clone(),
                };
                self.conditional_type_node(node.span, payload, extends_type, scope)
            }
            Type::Mapped(mapped) => self.mapped_type_node(node.span, mapped, scope),
            Type::TemplateLiteral { .. } => self.intrinsics.string,
            Type::IndexedAccess {
                object_type,
                index_type,
            } => {
                let object = self.type_from_type_node(object_type, scope);
                let index = self.type_from_type_node(index_type, scope);
                self.get_indexed_access(object, index)
            }
            Type::Keyof(operand) => {
                let operand = self.type_from_type_node(operand, scope);
                self.get_index_type(operand)
            }
            Type::TypeQuery { expr, .. } => match self.resolve_entity(expr, scope, Meaning::Value) {
                Some(symbol) => self.type_of_symbol(symbol),
                None => self.intrinsics.any,
            },
            Type::Infer(param) => match self.resolve_name(&param.name.value.name, scope, Meaning::Type) {
                Some(symbol) if self.symbol(symbol).flags.contains(SymbolFlags::TYPE_PARAMETER) => {
                    self.type_parameter_of_symbol(symbol)
                }
                _ => self.intrinsics.any,
            },
            Type::ImportType {
                argument,
                qualifier,
                type_args,
                is_typeof,
            } => self.import_type(node.span, argument, qualifier.as_ref(), type_args.as_deref(), *is_typeof, scope),
            Type::Predicate { asserts: true, .. } => self.intrinsics.void,
            Type::Predicate { .. } => self.intrinsics.boolean,
        }
    }

    fn this_type_at(&mut self, scope: NodeId) -> TypeId {
        let container = std::iter::once(scope)
            .chain(self.binding.nodes.ancestors(scope))
            .find(|&n| {
                matches!(
                    self.node_kind(n),
                    SyntaxKind::ClassDeclaration | SyntaxKind::InterfaceDeclaration
                )
            })
            .and_then(|n| self.node(n).symbol);
        let Some(symbol) = container else {
            return self.intrinsics.any;
        };
        let declared = self.declared_type_of_symbol(symbol);
        match self.types.get(declared).kind {
            TypeKind::ClassOrInterface {
                this_type: Some(this),
                ..
            } => this,
            _ => self.intrinsics.any,
        }
    }

    // =========================================================================
    // References
    // =========================================================================

    fn type_from_reference(
        &mut self,
        name: &Node<EntityName>,
        type_args: Option<&[Node<Type>]>,
        scope: NodeId,
    ) -> TypeId {
        match self.resolve_entity(name, scope, Meaning::Type) {
            Some(symbol) => self.type_from_symbol_reference(symbol, type_args, name.span, scope),
            None => self.intrinsics.any,
        }
    }

    /// Type a reference to `symbol` with optional written type arguments
    /// denotes.
    pub(crate) fn type_from_symbol_reference(
        &mut self,
        symbol: SymbolId,
        type_args: Option<&[Node<Type>]>,
        span: Span,
        scope: NodeId,
    ) -> TypeId {
        let flags = self.symbol(symbol).flags;
        let arguments: Option<Vec<TypeId>> =
            type_args.map(|args| args.iter().map(|a| self.type_from_type_node(a, scope)).collect());

        if flags.intersects(SymbolFlags::CLASS | SymbolFlags::INTERFACE) {
            let declared = self.declared_type_of_symbol(symbol);
            let parameters = self.type_arguments(declared);
            if parameters.is_empty() {
                if arguments.is_some() {
                    self.report_not_generic(symbol, span);
                }
                return declared;
            }
            let arguments = self.fill_type_arguments(symbol, &parameters, arguments, span);
            return self.types.reference(declared, arguments);
        }

        if flags.contains(SymbolFlags::TYPE_ALIAS) {
            let aliased = self.type_alias_type(symbol);
            let parameters = self.alias_type_parameters(symbol);
            if parameters.is_empty() {
                if arguments.is_some() {
                    self.report_not_generic(symbol, span);
                }
                return aliased;
            }
            let arguments = self.fill_type_arguments(symbol, &parameters, arguments, span);
            let mapper = Rc::new(TypeMapper::new(parameters, arguments));
            return self.instantiate(aliased, &mapper);
        }

        if flags.contains(SymbolFlags::TYPE_PARAMETER) {
            let parameter = self.type_parameter_of_symbol(symbol);
            let narrowed = self
                .substitutions
                .iter()
                .rev()
                .find(|(base, _)| *base == parameter)
                .map(|&(_, substitute)| substitute);
            return match narrowed {
                Some(substitute) => self.substitution_type(parameter, substitute),
                None => parameter,
            };
        }

        self.declared_type_of_symbol(symbol)
    }

    fn report_not_generic(&mut self, symbol: SymbolId, span: Span) {
        let name = self.symbol(symbol).name.clone();
        self.error(span, codes::NOT_GENERIC, format!("Type '{}' is not generic.", name));
    }

    /// Checks the argument count and fills omitted arguments from the
    /// parameter defaults, falling back to `any`.
    fn fill_type_arguments(
        &mut self,
        symbol: SymbolId,
        parameters: &[TypeId],
        arguments: Option<Vec<TypeId>>,
        span: Span,
    ) -> Vec<TypeId> {
        let mut defaults = Vec::with_capacity(parameters.len());
        for &parameter in parameters {
            defaults.push(self.default_of_type_parameter(parameter));
        }
        let required = defaults.iter().take_while(|d| d.is_none()).count();
        let given = arguments.unwrap_or_default();
        if given.len() < required || given.len() > parameters.len() {
            let name = self.symbol(symbol).name.clone();
            let expected = if required == parameters.len() {
                required.to_string()
            } else {
                format!("between {} and {}", required, parameters.len())
            };
            self.error(
                span,
                codes::GENERIC_ARITY,
                format!("Generic type '{}' requires {} type argument(s).", name, expected),
            );
        }

        let mut filled: Vec<TypeId> = given.into_iter().take(parameters.len()).collect();
        while filled.len() < parameters.len() {
            let index = filled.len();
            let value = match defaults[index] {
                Some(default) => {
                    let mapper = Rc::new(TypeMapper::new(parameters[..index].to_vec(), filled.clone()));
                    self.instantiate(default, &mapper)
                }
                None => self.intrinsics.any,
            };
            filled.push(value);
        }
        filled
    }

    /// Body of a type alias, unresolved type parameters and all.
    pub(crate) fn type_alias_type(&mut self, symbol: SymbolId) -> TypeId {
        if let Some(&ty) = self.declared_types.get(&symbol) {
            return ty;
        }
        let Some(&declaration) = self.symbol(symbol).declarations.first() else {
            return self.intrinsics.any;
        };
        if !self.resolving.insert(Resolving::AliasType(symbol)) {
            let name = self.symbol(symbol).name.clone();
            let span = self.node(declaration).span;
            self.error(
                span,
                codes::CIRCULAR_ALIAS,
                format!("Type alias '{}' circularly references itself.", name),
            );
            return self.intrinsics.any;
        }
        let payload = self.binding.nodes.payload(declaration);
        let ty = match &*payload {
            NodePayload::TypeAlias(alias) => self.type_from_type_node(&alias.ty, declaration),
            _ => self.intrinsics.any,
        };
        self.resolving.remove(&Resolving::AliasType(symbol));
        self.declared_types.entry(symbol).or_insert(ty);
        ty
    }

    fn alias_type_parameters(&mut self, symbol: SymbolId) -> Vec<TypeId> {
        let Some(&declaration) = self.symbol(symbol).declarations.first() else {
            return Vec::new();
        };
        let payload = self.binding.nodes.payload(declaration);
        match &*payload {
            NodePayload::TypeAlias(alias) => {
                self.local_type_parameters(declaration, alias.type_params.as_deref())
            }
            _ => Vec::new(),
        }
    }

    /// Type parameters bound in the locals of `declaration`, in written
    /// order.
    pub(crate) fn local_type_parameters(
        &mut self,
        declaration: NodeId,
        params: Option<&[TypeParam]>,
    ) -> Vec<TypeId> {
        let symbols: Vec<SymbolId> = params
            .unwrap_or_default()
            .iter()
            .filter_map(|p| {
                self.binding
                    .locals
                    .get(&declaration)
                    .and_then(|locals| locals.get(&p.name.value.name))
                    .copied()
            })
            .collect();
        symbols
            .into_iter()
            .map(|s| self.type_parameter_of_symbol(s))
            .collect()
    }

    fn substitution_type(&mut self, base: TypeId, substitute: TypeId) -> TypeId {
        let key = InstantiationKey::Substitution(base, substitute);
        if let Some(&ty) = self.instantiations.get(&key) {
            return ty;
        }
        let ty = self.types.alloc(TypeData::new(
            TypeFlags::SUBSTITUTION,
            TypeKind::Substitution { base, substitute },
        ));
        self.instantiations.insert(key, ty);
        ty
    }

    pub(crate) fn substitution_of(&mut self, base: TypeId, substitute: TypeId) -> TypeId {
        if self.is_generic(base) {
            self.substitution_type(base, substitute)
        } else {
            base
        }
    }

    fn import_type(
        &mut self,
        span: Span,
        argument: &str,
        qualifier: Option<&Node<EntityName>>,
        type_args: Option<&[Node<Type>]>,
        is_typeof: bool,
        scope: NodeId,
    ) -> TypeId {
        let file = self.node(scope).file;
        let Some(module) = self.resolve_external_module(argument, file, span) else {
            return self.intrinsics.any;
        };
        let mut current = self.resolve_export_equals(module);
        let Some(qualifier) = qualifier else {
            return if is_typeof {
                self.type_of_symbol(current)
            } else {
                self.intrinsics.any
            };
        };
        for part in &qualifier.value.parts {
            let exports = self.exports_of(current);
            let found = exports.get(&part.name).copied();
            match found.and_then(|s| self.resolve_alias(s)) {
                Some(symbol) => current = symbol,
                None => {
                    let container = self.symbol(current).name.clone();
                    self.error(
                        qualifier.span,
                        codes::NO_EXPORTED_MEMBER,
                        format!("Namespace '{}' has no exported member '{}'.", container, part.name),
                    );
                    return self.intrinsics.any;
                }
            }
        }
        if is_typeof {
            self.type_of_symbol(current)
        } else {
            self.type_from_symbol_reference(current, type_args, qualifier.span, scope)
        }
    }

    // =========================================================================
    // Arrays and tuples
    // =========================================================================

    pub(crate) fn create_array_type(&mut self, element: TypeId, readonly: bool) -> TypeId {
        let name = if readonly { "ReadonlyArray" } else { "Array" };
        let global = self
            .binding
            .globals
            .get(name)
            .or_else(|| self.binding.globals.get("Array"))
            .copied()
            .filter(|&s| self.symbol(s).flags.intersects(SymbolFlags::CLASS | SymbolFlags::INTERFACE));
        let target = match global {
            Some(symbol) => self.declared_type_of_symbol(symbol),
            None => self.synthesized_array(),
        };
        if self.type_arguments(target).len() == 1 {
            self.types.reference(target, vec![element])
        } else {
            target
        }
    }

    /// Stand-in `Array<T>` for programs without a standard library.
    fn synthesized_array(&mut self) -> TypeId {
        if let Some(array) = self.global_array {
            return array;
        }
        let parameter = self.types.alloc(TypeData::new(
            TypeFlags::TYPE_PARAMETER,
            TypeKind::TypeParameter {
                declaration: None,
                is_this_type: false,
                this_of: None,
            },
        ));
        let array = self.types.alloc(TypeData::object(
            ObjectFlags::INTERFACE | ObjectFlags::REFERENCE,
            None,
            TypeKind::ClassOrInterface {
                type_parameters: vec![parameter],
                this_type: None,
                view: None,
            },
        ));
        self.types.register_reference(array, vec![parameter], array);
        self.global_array = Some(array);
        array
    }

    fn tuple_type(&mut self, elements: &[TupleElement], scope: NodeId) -> TypeId {
        let mut element_types = Vec::with_capacity(elements.len());
        for element in elements {
            let ty = match (&element.ty.value, element.is_rest) {
                (Type::Array(inner), true) => self.type_from_type_node(inner, scope),
                _ => self.type_from_type_node(&element.ty, scope),
            };
            element_types.push(ty);
        }
        let min_length = elements
            .iter()
            .rposition(|e| !e.optional && !e.is_rest)
            .map_or(0, |i| i + 1);
        let has_rest = elements.iter().any(|e| e.is_rest);
        let target = self.types.tuple_target(elements.len(), min_length, has_rest);
        self.types.reference(target, element_types)
    }

    // =========================================================================
    // Declaration-like type nodes
    // =========================================================================

    /// Node standing for a type expression, created on first sight.
    fn lazy_node(
        &mut self,
        span: Span,
        kind: SyntaxKind,
        scope: NodeId,
        payload: NodePayload,
    ) -> (NodeId, bool) {
        if let Some(&node) = self.lazy_nodes.get(&(span, kind)) {
            return (node, false);
        }
        let node = self.binding.nodes.alloc(kind, None, Some(scope), span, payload);
        self.lazy_nodes.insert((span, kind), node);
        (node, true)
    }

    pub(crate) fn anonymous_type(&mut self, origin: AnonymousOrigin, symbol: Option<SymbolId>) -> TypeId {
        self.types.alloc(TypeData::object(
            ObjectFlags::ANONYMOUS,
            symbol,
            TypeKind::Anonymous { origin, mapper: None },
        ))
    }

    fn function_type_node(&mut self, span: Span, function: &FunctionType, scope: NodeId) -> TypeId {
        let kind = if function.is_constructor {
            SyntaxKind::ConstructorType
        } else {
            SyntaxKind::FunctionType
        };
        let (node, fresh) = self.lazy_node(span, kind, scope, NodePayload::FunctionType(function.clone()));
        if !fresh {
            if let Some(&ty) = self.node_types.get(&node) {
                return ty;
            }
        }
        self.binding
            .bind_local_type_parameters(node, function.signature.type_params.as_deref());
        let ty = self.anonymous_type(AnonymousOrigin::Signature(node), None);
        self.node_types.insert(node, ty);
        ty
    }

    fn type_literal_node(&mut self, span: Span, object: &ObjectType, scope: NodeId) -> TypeId {
        let (node, fresh) = self.lazy_node(span, SyntaxKind::TypeLiteral, scope, NodePayload::TypeLiteral);
        if !fresh {
            if let Some(&ty) = self.node_types.get(&node) {
                return ty;
            }
        }
        let mut symbol = Symbol::new(names::TYPE, SymbolFlags::TYPE_LITERAL);
        symbol.declarations.push(node);
        let symbol = self.binding.symbols.alloc(symbol);
        self.binding.nodes.set_symbol(node, symbol);
        for member in &object.members {
            self.binding
                .bind_type_member(Table::Members(symbol), node, member, false);
        }
        let ty = self.anonymous_type(AnonymousOrigin::TypeLiteral(node), Some(symbol));
        self.node_types.insert(node, ty);
        ty
    }

    fn mapped_type_node(&mut self, span: Span, mapped: &MappedType, scope: NodeId) -> TypeId {
        let (node, fresh) = self.lazy_node(span, SyntaxKind::MappedType, scope, NodePayload::Mapped(mapped.clone()));
        if !fresh {
            if let Some(&ty) = self.node_types.get(&node) {
                return ty;
            }
        }
        let key = TypeParam {
            name: mapped.type_param.clone(),
            constraint: Some(mapped.constraint.clone()),
            default: None,
        };
        self.binding
            .bind_local_type_parameters(node, Some(std::slice::from_ref(&key)));
        let ty = self.types.alloc(TypeData::object(
            ObjectFlags::MAPPED,
            None,
            TypeKind::Mapped {
                declaration: node,
                mapper: None,
            },
        ));
        self.node_types.insert(node, ty);
        ty
    }

    fn conditional_type_node(
        &mut self,
        span: Span,
        payload: NodePayload,
        extends_type: &Node<Type>,
        scope: NodeId,
    ) -> TypeId {
        let (node, fresh) = self.lazy_node(span, SyntaxKind::ConditionalType, scope, payload);
        if !fresh {
            if let Some(&ty) = self.node_types.get(&node) {
                return ty;
            }
        }
        let mut inferred = Vec::new();
        collect_infer_parameters(extends_type, &mut inferred);
        self.binding.bind_local_type_parameters(node, Some(&inferred));
        let ty = self.types.alloc(TypeData::new(
            TypeFlags::CONDITIONAL,
            TypeKind::Conditional {
                declaration: node,
                mapper: None,
            },
        ));
        self.node_types.insert(node, ty);
        ty
    }

    /// Union of both branches of a conditional type, the true branch seeing
    /// the checked type parameter narrowed by the `extends` type.
    pub(crate) fn conditional_constraint(
        &mut self,
        ty: TypeId,
        declaration: NodeId,
        mapper: Option<Rc<TypeMapper>>,
    ) -> TypeId {
        let Some(&generic) = self.node_types.get(&declaration) else {
            return self.intrinsics.any;
        };
        let branches = match self.conditional_constraints.get(&generic) {
            Some(&branches) => branches,
            None => {
                self.conditional_constraints.insert(generic, self.intrinsics.any);
                let branches = self.conditional_branches(declaration);
                self.conditional_constraints.insert(generic, branches);
                branches
            }
        };
        match mapper {
            Some(mapper) if ty != generic => self.instantiate(branches, &mapper),
            _ => branches,
        }
    }

    fn conditional_branches(&mut self, declaration: NodeId) -> TypeId {
        let payload = self.binding.nodes.payload(declaration);
        let NodePayload::Conditional {
            check_type,
            extends_type,
            true_type,
            false_type,
        } = &*payload
        else {
            return self.intrinsics.any;
        };
        let outer = self.node(declaration).parent.unwrap_or(declaration);
        let check = self.type_from_type_node(check_type, outer);
        let extends = self.type_from_type_node(extends_type, declaration);

        let narrowed = self.flags(check).contains(TypeFlags::TYPE_PARAMETER);
        if narrowed {
            self.substitutions.push((check, extends));
        }
        let when_true = self.type_from_type_node(true_type, declaration);
        if narrowed {
            self.substitutions.pop();
        }
        let when_false = self.type_from_type_node(false_type, outer);
        self.get_union(vec![when_true, when_false])
    }

    // =========================================================================
    // Type constructors
    // =========================================================================

    /// Normalized union: nested unions flattened, duplicates and `never`
    /// removed, `any` absorbing, `true | false` collapsed to `boolean`.
    pub fn get_union(&mut self, types: Vec<TypeId>) -> TypeId {
        let mut members: Vec<TypeId> = Vec::with_capacity(types.len());
        for ty in types {
            match &self.types.get(ty).kind {
                TypeKind::Union(nested) => {
                    for &n in nested {
                        if !members.contains(&n) {
                            members.push(n);
                        }
                    }
                }
                _ => {
                    if !members.contains(&ty) {
                        members.push(ty);
                    }
                }
            }
        }

        for absorbing in [self.intrinsics.any, self.intrinsics.unknown] {
            if members.contains(&absorbing) {
                return absorbing;
            }
        }
        let never = self.intrinsics.never;
        members.retain(|&m| m != never);
        if !self.program.options().strict_null_checks {
            let first = members.first().copied();
            members.retain(|&m| !self.types.get(m).flags.intersects(TypeFlags::NULLABLE));
            if members.is_empty() {
                members.extend(first);
            }
        }
        let (t, f) = (self.intrinsics.true_type, self.intrinsics.false_type);
        if let (Some(ti), Some(fi)) = (
            members.iter().position(|&m| m == t),
            members.iter().position(|&m| m == f),
        ) {
            let first = ti.min(fi);
            members[first] = self.intrinsics.boolean;
            members.remove(ti.max(fi));
            let boolean = self.intrinsics.boolean;
            if members.iter().filter(|&&m| m == boolean).count() > 1 {
                let mut seen = false;
                members.retain(|&m| {
                    if m != boolean {
                        return true;
                    }
                    !std::mem::replace(&mut seen, true)
                });
            }
        }

        match members.len() {
            0 => never,
            1 => members[0],
            _ => self.types.union(members),
        }
    }

    pub fn get_intersection(&mut self, types: Vec<TypeId>) -> TypeId {
        let mut members: Vec<TypeId> = Vec::with_capacity(types.len());
        for ty in types {
            match &self.types.get(ty).kind {
                TypeKind::Intersection(nested) => {
                    for &n in nested {
                        if !members.contains(&n) {
                            members.push(n);
                        }
                    }
                }
                _ => {
                    if !members.contains(&ty) {
                        members.push(ty);
                    }
                }
            }
        }
        for absorbing in [self.intrinsics.any, self.intrinsics.never] {
            if members.contains(&absorbing) {
                return absorbing;
            }
        }
        match members.len() {
            0 => self.intrinsics.unknown,
            1 => members[0],
            _ => self.types.intersection(members),
        }
    }

    /// Whether a type still depends on unresolved type parameters in a way
    /// that blocks eager evaluation of `keyof` and `T[K]`.
    pub(crate) fn is_generic(&mut self, ty: TypeId) -> bool {
        match &self.types.get(ty).kind {
            TypeKind::TypeParameter { .. }
            | TypeKind::IndexedAccess { .. }
            | TypeKind::Index(_)
            | TypeKind::Conditional { .. }
            | TypeKind::Substitution { .. } => true,
            TypeKind::Union(members) | TypeKind::Intersection(members) => {
                let members = members.clone();
                members.into_iter().any(|m| self.is_generic(m))
            }
            TypeKind::Mapped { .. } => {
                let constraint = self.mapped_constraint(ty);
                self.is_generic(constraint)
            }
            _ => false,
        }
    }

    /// `object[index]`, resolved right away when both sides are concrete.
    pub fn get_indexed_access(&mut self, object: TypeId, index: TypeId) -> TypeId {
        if self.is_generic(object) || self.is_generic(index) {
            return self.types.indexed_access(object, index);
        }
        if let TypeKind::Union(members) = &self.types.get(index).kind {
            let members = members.clone();
            let parts = members
                .into_iter()
                .map(|m| self.get_indexed_access(object, m))
                .collect();
            return self.get_union(parts);
        }

        let index_flags = self.flags(index);
        let resolved = match self.types.get(index).kind.clone() {
            TypeKind::Literal(LiteralValue::String(name)) => self
                .property_of_type(object, &name)
                .or_else(|| self.index_type_of_type(object, false)),
            TypeKind::Literal(LiteralValue::Number(n)) => {
                let name = format_number(n);
                self.tuple_element(object, n)
                    .or_else(|| self.property_of_type(object, &name))
                    .or_else(|| self.index_type_of_type(object, true))
            }
            _ if index_flags.contains(TypeFlags::NUMBER) => self
                .tuple_elements(object)
                .map(|elements| self.get_union(elements))
                .or_else(|| self.index_type_of_type(object, true)),
            _ if index_flags.contains(TypeFlags::STRING) => self.index_type_of_type(object, false),
            _ => None,
        };
        resolved.unwrap_or(self.intrinsics.any)
    }

    fn tuple_elements(&self, ty: TypeId) -> Option<Vec<TypeId>> {
        self.tuple_shape(ty)?;
        Some(self.type_arguments(ty))
    }

    fn tuple_element(&self, ty: TypeId, position: f64) -> Option<TypeId> {
        let elements = self.tuple_elements(ty)?;
        if position < 0.0 || position.fract() != 0.0 {
            return None;
        }
        elements.get(position as usize).copied()
    }

    /// `keyof operand`, as a union of literal keys when the operand is
    /// concrete.
    pub fn get_index_type(&mut self, operand: TypeId) -> TypeId {
        if self.is_generic(operand) {
            return self.types.index(operand);
        }
        let flags = self.flags(operand);
        if flags.contains(TypeFlags::ANY) {
            let keys = vec![self.intrinsics.string, self.intrinsics.number, self.intrinsics.symbol];
            return self.get_union(keys);
        }
        if let TypeKind::Union(members) = &self.types.get(operand).kind {
            let members = members.clone();
            let keys = members.into_iter().map(|m| self.get_index_type(m)).collect();
            return self.get_intersection(keys);
        }
        if !flags.intersects(TypeFlags::OBJECT | TypeFlags::INTERSECTION) {
            return self.intrinsics.never;
        }

        let mut keys = Vec::new();
        if self.index_type_of_type(operand, false).is_some() {
            keys.push(self.intrinsics.string);
            keys.push(self.intrinsics.number);
        } else if self.index_type_of_type(operand, true).is_some() {
            keys.push(self.intrinsics.number);
        }
        let names: Vec<String> = self.properties_of_type(operand).into_keys().collect();
        for name in names {
            keys.push(self.types.literal(LiteralValue::String(name)));
        }
        self.get_union(keys)
    }
}

/// `infer X` declarations of an `extends` clause, outside nested
/// conditional types.
fn collect_infer_parameters(node: &Node<Type>, out: &mut Vec<TypeParam>) {
    if let Type::Infer(param) = &node.value {
        out.push(param.clone());
        return;
    }
    let mut visit = |n: &Node<Type>| collect_infer_parameters(n, out);
    match &node.value {
        Type::Array(inner) | Type::Readonly(inner) | Type::Paren(inner) | Type::Keyof(inner) => visit(inner),
        Type::Tuple(elements) => elements.iter().for_each(|e| visit(&e.ty)),
        Type::Union(members) | Type::Intersection(members) => members.iter().for_each(visit),
        Type::TypeRef {
            type_args: Some(args),
            ..
        } => args.iter().for_each(visit),
        Type::Function(function) => {
            for param in &function.signature.params {
                if let Some(annotation) = &param.type_annotation {
                    visit(annotation);
                }
            }
            if let Some(ret) = &function.signature.return_type {
                visit(ret);
            }
        }
        Type::Object(object) => {
            for member in &object.members {
                if let ObjectTypeMember::Property { ty: Some(ty), .. } = &member.value {
                    visit(ty);
                }
            }
        }
        Type::IndexedAccess {
            object_type,
            index_type,
        } => {
            visit(object_type);
            visit(index_type);
        }
        Type::TemplateLiteral { types, .. } => types.iter().for_each(visit),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompilerOptions;
    use crate::program::Program;

    fn program(source: &str) -> Program {
        Program::from_sources(&[("test.d.ts", source)], CompilerOptions::default())
    }

    fn var_type(checker: &mut TypeChecker<'_>, name: &str) -> TypeId {
        let node = checker.named_declarations(0).expect("file")[name][0];
        checker.type_at_declaration(node)
    }

    #[test]
    fn test_union_normalization() {
        let program = program(
            "interface A {} interface B {}\n\
             declare var x: A | A | B;\n\
             declare var y: true | false | never;\n\
             declare var z: string | null | undefined;\n\
             declare var w: string | any;",
        );
        let mut checker = program.checker();
        let a = var_type(&mut checker, "A");
        let b = var_type(&mut checker, "B");
        let x = var_type(&mut checker, "x");
        assert_eq!(checker.union_members(x), &[a, b]);
        assert_eq!(var_type(&mut checker, "y"), checker.intrinsics().boolean);
        assert_eq!(var_type(&mut checker, "z"), checker.intrinsics().string);
        assert_eq!(var_type(&mut checker, "w"), checker.intrinsics().any);
    }

    #[test]
    fn test_strict_null_checks_keep_nullables() {
        let options = CompilerOptions {
            strict_null_checks: true,
            ..Default::default()
        };
        let program = Program::from_sources(&[("a.d.ts", "declare var z: string | null;")], options);
        let mut checker = program.checker();
        let z = var_type(&mut checker, "z");
        assert_eq!(checker.union_members(z).len(), 2);
    }

    #[test]
    fn test_same_union_is_interned() {
        let program = program("interface A {} interface B {}\ndeclare var p: A | B;\ndeclare var q: B | A | A;");
        let mut checker = program.checker();
        let p = var_type(&mut checker, "p");
        let q = var_type(&mut checker, "q");
        assert_ne!(p, q);
        let p2 = var_type(&mut checker, "p");
        assert_eq!(p, p2);
    }

    #[test]
    fn test_generic_references_and_arity() {
        let program = program(
            "interface Box<T, U = string> { value: T; other: U }\n\
             declare var a: Box<number>;\n\
             declare var b: Box;\n\
             interface Plain {}\n\
             declare var c: Plain<number>;",
        );
        let mut checker = program.checker();
        let a = var_type(&mut checker, "a");
        let args = checker.type_arguments(a);
        assert_eq!(args, vec![checker.intrinsics().number, checker.intrinsics().string]);
        let box_type = var_type(&mut checker, "Box");
        assert_eq!(checker.reference_target(a), Some(box_type));
        let found: Vec<u32> = checker.pre_emit_diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(found, vec![codes::GENERIC_ARITY, codes::NOT_GENERIC]);
    }

    #[test]
    fn test_alias_instantiation_and_indexed_access() {
        let program = program(
            "interface Point { x: number; label: string }\n\
             type Pick1<T, K extends keyof T> = T[K];\n\
             declare var a: Pick1<Point, 'label'>;\n\
             declare var k: keyof Point;\n\
             declare var t: [string, number?][1];",
        );
        let mut checker = program.checker();
        assert_eq!(var_type(&mut checker, "a"), checker.intrinsics().string);
        let k = var_type(&mut checker, "k");
        let keys: Vec<_> = checker
            .union_members(k)
            .iter()
            .map(|&m| checker.literal_value(m).cloned())
            .collect();
        assert_eq!(
            keys,
            vec![
                Some(LiteralValue::String("x".into())),
                Some(LiteralValue::String("label".into()))
            ]
        );
        assert_eq!(var_type(&mut checker, "t"), checker.intrinsics().number);
    }

    #[test]
    fn test_tuple_shape() {
        let program = program("declare var t: [string, number?, ...boolean[]];");
        let mut checker = program.checker();
        let t = var_type(&mut checker, "t");
        assert_eq!(checker.tuple_shape(t), Some((1, true)));
        let intrinsics = *checker.intrinsics();
        assert_eq!(
            checker.type_arguments(t),
            vec![intrinsics.string, intrinsics.number, intrinsics.boolean]
        );
    }

    #[test]
    fn test_circular_alias_reported() {
        let program = program("type A = B;\ntype B = A;\ndeclare var x: A;");
        let mut checker = program.checker();
        assert_eq!(var_type(&mut checker, "x"), checker.intrinsics().any);
        let diagnostics = checker.pre_emit_diagnostics();
        assert!(diagnostics.iter().any(|d| d.code == codes::CIRCULAR_ALIAS));
    }

    #[test]
    fn test_conditional_constraint_is_union_of_branches() {
        let program = program("type IsString<T> = T extends string ? 'yes' : 'no';\ndeclare var c: IsString<number>;");
        let mut checker = program.checker();
        let c = var_type(&mut checker, "c");
        assert!(checker.flags(c).contains(TypeFlags::CONDITIONAL));
        let constraint = checker.base_constraint(c).expect("constraint");
        assert_eq!(checker.union_members(constraint).len(), 2);
    }

    #[test]
    fn test_this_type_in_interface() {
        let program = program("interface Chain { next(): this; self: this }");
        let mut checker = program.checker();
        let chain = var_type(&mut checker, "Chain");
        let self_prop = checker.named_declarations(0).expect("file")["self"][0];
        let ty = checker.type_at_declaration(self_prop);
        assert!(checker.is_this_type(ty));
        assert_eq!(checker.constraint_of_type_parameter(ty), Some(chain));
    }
}
