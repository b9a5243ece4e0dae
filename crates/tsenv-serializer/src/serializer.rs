//! Type serializer
//!
//! Converts checker types into [`TypeRecord`]s. Every type gets its id
//! before its body is built, so cyclic type graphs turn into records that
//! refer to each other by index and never embed one another.
//!
//! Classes are the one type with two ids: the instance form (the declared
//! class type) and the constructor form (the class as a value). Both are
//! allocated together; the instance record links to the constructor
//! record, and the constructor's construct signatures return the
//! instance id.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use tsenv_ast::{ClassMember, ObjectTypeMember, Type};
use tsenv_checker::{
    names, AnonymousOrigin, LiteralValue, NodeId, NodePayload, ObjectFlags, Signature, SymbolFlags, SymbolId,
    SyntaxKind, TypeChecker, TypeFlags, TypeId, TypeKind,
};

use crate::error::SerializeError;
use crate::record::*;

/// Fix-up run once the main traversal is complete
type Deferred = Box<dyn FnOnce(&mut Graph) -> Result<(), SerializeError>>;

/// Append-only record storage. Slots are allocated empty and populated
/// once the record body is known.
#[derive(Debug, Default)]
pub struct Graph {
    records: Vec<Option<TypeRecord>>,
    /// Constructor id to instance id
    instance_forms: FxHashMap<SerializationId, SerializationId>,
    /// Instance id to constructor id
    constructor_forms: FxHashMap<SerializationId, SerializationId>,
}

impl Graph {
    fn allocate(&mut self) -> SerializationId {
        let id = SerializationId::from_index(self.records.len());
        self.records.push(None);
        id
    }

    fn populate(&mut self, id: SerializationId, record: TypeRecord) {
        if let Some(slot) = id.index().and_then(|i| self.records.get_mut(i)) {
            *slot = Some(record);
        }
    }

    fn pair(&mut self, constructor: SerializationId, instance: SerializationId) {
        self.instance_forms.insert(constructor, instance);
        self.constructor_forms.insert(instance, constructor);
    }

    pub fn get(&self, id: SerializationId) -> Option<&TypeRecord> {
        self.records.get(id.index()?)?.as_ref()
    }

    fn get_mut(&mut self, id: SerializationId) -> Option<&mut TypeRecord> {
        self.records.get_mut(id.index()?)?.as_mut()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replaces the base types of class record `class` that name a class
    /// constructor by the paired instance.
    fn instantiate_bases(&mut self, class: SerializationId) -> Result<(), SerializeError> {
        let bases = match self.get(class) {
            Some(TypeRecord::Class(record)) => record.base_types.clone(),
            _ => return Err(SerializeError::UnpopulatedRecord { id: class }),
        };
        let mut rewritten = Vec::with_capacity(bases.len());
        for base in bases {
            match self.get(base) {
                Some(TypeRecord::Class(_)) => {
                    let instance = self
                        .instance_forms
                        .get(&base)
                        .copied()
                        .ok_or(SerializeError::MissingInstanceForm { id: base })?;
                    rewritten.push(instance);
                }
                _ => rewritten.push(base),
            }
        }
        if let Some(TypeRecord::Class(record)) = self.get_mut(class) {
            record.base_types = rewritten;
        }
        Ok(())
    }

    /// Populates `id` with a copy of the interface-like record `source`
    /// whose properties are extended by `extra`; existing names win.
    fn populate_extended(
        &mut self,
        id: SerializationId,
        source: SerializationId,
        extra: PropertyMap,
    ) -> Result<(), SerializeError> {
        let mut copy = self
            .get(source)
            .cloned()
            .ok_or(SerializeError::UnpopulatedRecord { id: source })?;
        if let Some(shape) = copy.interface_shape_mut() {
            for (name, property) in extra {
                shape.declared_properties.entry(name).or_insert(property);
            }
        }
        self.populate(id, copy);
        Ok(())
    }

    fn into_records(self) -> Result<Vec<TypeRecord>, SerializeError> {
        self.records
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                record.ok_or(SerializeError::UnpopulatedRecord {
                    id: SerializationId::from_index(i),
                })
            })
            .collect()
    }
}

pub struct TypeSerializer<'a, 'p> {
    checker: &'a mut TypeChecker<'p>,
    graph: Graph,
    cache: FxHashMap<TypeId, SerializationId>,
    primitives: FxHashMap<&'static str, SerializationId>,
    deferred: Vec<Deferred>,
}

impl<'a, 'p> TypeSerializer<'a, 'p> {
    pub fn new(checker: &'a mut TypeChecker<'p>) -> Self {
        Self {
            checker,
            graph: Graph::default(),
            cache: FxHashMap::default(),
            primitives: FxHashMap::default(),
            deferred: Vec::new(),
        }
    }

    pub fn checker(&mut self) -> &mut TypeChecker<'p> {
        &mut *self.checker
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Serializes `ty` and returns its id. `constructor_form` selects the
    /// constructor id when `ty` is a class.
    pub fn serialize(&mut self, ty: TypeId, constructor_form: bool) -> Result<SerializationId, SerializeError> {
        if let Some(class) = self.checker.class_symbol(ty) {
            let declared = self.checker.declared_type_of_symbol(class);
            // The static side of a class always means its constructor.
            return self.serialize_class(declared, constructor_form || declared != ty);
        }
        if let Some(&id) = self.cache.get(&ty) {
            return Ok(id);
        }
        if let Some(record) = self.primitive_record(ty)? {
            return Ok(self.primitive(record));
        }
        if self
            .checker
            .flags(ty)
            .intersects(TypeFlags::CONDITIONAL | TypeFlags::SUBSTITUTION)
        {
            let constraint = self.checker.base_constraint(ty);
            let id = self.serialize_optional(constraint)?;
            self.cache.insert(ty, id);
            return Ok(id);
        }
        if let Some(id) = self.unwrap_export_equals(ty)? {
            self.cache.insert(ty, id);
            return Ok(id);
        }

        let id = self.graph.allocate();
        self.cache.insert(ty, id);
        trace!(?ty, %id, "serializing");
        let record = self.make_record(ty)?;
        self.graph.populate(id, record);
        Ok(id)
    }

    fn serialize_optional(&mut self, ty: Option<TypeId>) -> Result<SerializationId, SerializeError> {
        match ty {
            Some(ty) => self.serialize(ty, false),
            None => Ok(SerializationId::NONE),
        }
    }

    fn serialize_all(&mut self, types: &[TypeId]) -> Result<Vec<SerializationId>, SerializeError> {
        types.iter().map(|&t| self.serialize(t, false)).collect()
    }

    /// Runs the deferred fix-ups, most recently registered first, and
    /// hands out the finished records.
    pub fn finish(mut self) -> Result<Vec<TypeRecord>, SerializeError> {
        while let Some(fixup) = self.deferred.pop() {
            fixup(&mut self.graph)?;
        }
        debug!(records = self.graph.len(), "serialization finished");
        self.graph.into_records()
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn primitive(&mut self, record: TypeRecord) -> SerializationId {
        let kind = record.kind_name();
        if let Some(&id) = self.primitives.get(kind) {
            return id;
        }
        let id = self.graph.allocate();
        self.graph.populate(id, record);
        self.primitives.insert(kind, id);
        id
    }

    /// The singleton record of a primitive type, `None` for non-primitives.
    fn primitive_record(&self, ty: TypeId) -> Result<Option<TypeRecord>, SerializeError> {
        let record = match &self.checker.type_data(ty).kind {
            TypeKind::Intrinsic(name) => match *name {
                "any" | "unknown" => TypeRecord::Any,
                "string" => TypeRecord::String,
                "number" => TypeRecord::Number,
                "boolean" => TypeRecord::Boolean,
                "void" => TypeRecord::Void,
                "undefined" => TypeRecord::Undefined,
                "null" => TypeRecord::Null,
                "never" => TypeRecord::Never,
                "symbol" => TypeRecord::Symbol,
                "object" => TypeRecord::Object,
                _ => return Err(self.unhandled(ty)),
            },
            TypeKind::Enum => TypeRecord::Enum,
            _ => return Ok(None),
        };
        Ok(Some(record))
    }

    fn make_record(&mut self, ty: TypeId) -> Result<TypeRecord, SerializeError> {
        let data = self.checker.type_data(ty).clone();
        match data.kind {
            TypeKind::Literal(LiteralValue::String(value)) => Ok(TypeRecord::StringLiteral { value }),
            TypeKind::Literal(LiteralValue::Number(value)) => Ok(TypeRecord::NumberLiteral { value }),
            TypeKind::Literal(LiteralValue::Boolean(value)) => Ok(TypeRecord::BooleanLiteral { value }),
            TypeKind::TypeParameter { is_this_type, .. } => {
                let constraint = self.checker.constraint_of_type_parameter(ty);
                let constraint = self.serialize_optional(constraint)?;
                Ok(if is_this_type {
                    TypeRecord::ThisType { constraint }
                } else {
                    TypeRecord::TypeParameter { constraint }
                })
            }
            TypeKind::ClassOrInterface { .. } if data.object_flags.contains(ObjectFlags::REFERENCE) => {
                let shape = self.interface_shape(ty)?;
                let target = self.checker.reference_target(ty).unwrap_or(ty);
                let target = self.serialize(target, false)?;
                let arguments = self.checker.type_arguments(ty);
                Ok(TypeRecord::Generic(GenericRecord {
                    shape,
                    target,
                    type_arguments: self.serialize_all(&arguments)?,
                }))
            }
            TypeKind::ClassOrInterface { .. } => Ok(TypeRecord::Interface(self.interface_shape(ty)?)),
            TypeKind::Reference { target, arguments } => {
                let type_arguments = self.serialize_all(&arguments)?;
                match self.checker.tuple_shape(ty) {
                    Some((min_length, _)) => Ok(TypeRecord::Tuple {
                        element_types: type_arguments,
                        min_length,
                    }),
                    None => Ok(TypeRecord::Reference {
                        target: self.serialize(target, false)?,
                        type_arguments,
                    }),
                }
            }
            TypeKind::Union(members) => Ok(TypeRecord::Union {
                elements: self.elements(&members)?,
            }),
            TypeKind::Intersection(members) => Ok(TypeRecord::Intersection {
                elements: self.elements(&members)?,
            }),
            TypeKind::Anonymous { .. } | TypeKind::Mapped { .. } => self.anonymous_record(ty),
            TypeKind::IndexedAccess { object, index } => Ok(TypeRecord::IndexedAccess {
                object_type: self.serialize(object, false)?,
                index_type: self.serialize(index, false)?,
            }),
            TypeKind::Index(operand) => Ok(TypeRecord::Index {
                ty: self.serialize(operand, false)?,
            }),
            TypeKind::Literal(LiteralValue::BigInt(_))
            | TypeKind::Intrinsic(_)
            | TypeKind::Enum
            | TypeKind::TupleTarget { .. }
            | TypeKind::Conditional { .. }
            | TypeKind::Substitution { .. } => Err(self.unhandled(ty)),
        }
    }

    fn unhandled(&self, ty: TypeId) -> SerializeError {
        let data = self.checker.type_data(ty);
        SerializeError::UnhandledTypeKind {
            flags: data.flags.bits(),
            object_flags: data.object_flags.bits(),
            description: self.checker.type_to_string(ty),
        }
    }

    /// Member ids, first occurrence kept.
    fn elements(&mut self, members: &[TypeId]) -> Result<Vec<SerializationId>, SerializeError> {
        let mut elements = Vec::with_capacity(members.len());
        for &member in members {
            let id = self.serialize(member, false)?;
            if !elements.contains(&id) {
                elements.push(id);
            }
        }
        Ok(elements)
    }

    fn signature(&mut self, signature: &Signature) -> Result<SignatureRecord, SerializeError> {
        let type_parameters = self.serialize_all(&signature.type_parameters)?;
        let mut parameters = Vec::with_capacity(signature.parameters.len());
        for parameter in &signature.parameters {
            parameters.push(ParameterRecord {
                name: parameter.name.clone(),
                ty: self.serialize(parameter.ty, false)?,
            });
        }
        Ok(SignatureRecord {
            type_parameters,
            parameters,
            resolved_return_type: self.serialize(signature.return_type, false)?,
            min_argument_count: signature.min_argument_count,
            has_rest_parameter: signature.has_rest_parameter,
        })
    }

    fn signatures(&mut self, signatures: &[Signature]) -> Result<Vec<SignatureRecord>, SerializeError> {
        signatures.iter().map(|s| self.signature(s)).collect()
    }

    // =========================================================================
    // Interfaces and anonymous types
    // =========================================================================

    fn interface_shape(&mut self, ty: TypeId) -> Result<InterfaceRecord, SerializeError> {
        let members = self.checker.declared_members(ty);
        Ok(InterfaceRecord {
            type_parameters: self.serialize_all(&members.type_parameters)?,
            base_types: self.serialize_all(&members.base_types)?,
            declared_properties: self.properties(&members.properties)?,
            declared_call_signatures: self.signatures(&members.call_signatures)?,
            declared_construct_signatures: self.signatures(&members.construct_signatures)?,
            declared_string_index_type: self.serialize_optional(members.string_index)?,
            declared_number_index_type: self.serialize_optional(members.number_index)?,
        })
    }

    /// Interface record of an anonymous or mapped type; the placeholder
    /// when the checker cannot resolve its members ahead of time.
    fn anonymous_record(&mut self, ty: TypeId) -> Result<TypeRecord, SerializeError> {
        let Some(members) = self.checker.resolved_members(ty) else {
            debug!(ty = %self.checker.type_to_string(ty), "unresolved members, emitting placeholder");
            return Ok(TypeRecord::Anonymous);
        };
        Ok(TypeRecord::Interface(InterfaceRecord {
            type_parameters: Vec::new(),
            base_types: Vec::new(),
            declared_properties: self.properties(&members.properties)?,
            declared_call_signatures: self.signatures(&members.call_signatures)?,
            declared_construct_signatures: self.signatures(&members.construct_signatures)?,
            declared_string_index_type: self.serialize_optional(members.string_index)?,
            declared_number_index_type: self.serialize_optional(members.number_index)?,
        }))
    }

    /// A module whose only member is `export =` stands for the exported
    /// value. When that value is an interface-like object and the module
    /// has other local values, the module gets its own id for a copy of
    /// the value's record extended by those locals.
    fn unwrap_export_equals(&mut self, ty: TypeId) -> Result<Option<SerializationId>, SerializeError> {
        let Some((module, export)) = self.export_equals_of(ty) else {
            return Ok(None);
        };
        let target = self.checker.type_of_symbol(export);
        let locals = self.checker.module_locals(module);
        if locals.is_empty() {
            return self.serialize(target, false).map(Some);
        }
        if !self.has_interface_shape(target) {
            debug!(
                module = %self.checker.symbol(module).name,
                locals = locals.len(),
                "export = target is not an object, local values dropped"
            );
            return self.serialize(target, false).map(Some);
        }

        let id = self.graph.allocate();
        self.cache.insert(ty, id);
        let inner = self.serialize(target, false)?;
        let extra = self.properties(&locals)?;
        // The target may still be under construction here.
        self.deferred
            .push(Box::new(move |graph: &mut Graph| graph.populate_extended(id, inner, extra)));
        Ok(Some(id))
    }

    /// The module symbol and its `export =` member when `ty` is the type
    /// of a module exporting a single value.
    fn export_equals_of(&mut self, ty: TypeId) -> Option<(SymbolId, SymbolId)> {
        let TypeKind::Anonymous {
            origin: AnonymousOrigin::Symbol(module),
            ..
        } = self.checker.type_data(ty).kind
        else {
            return None;
        };
        if !self.checker.symbol(module).flags.contains(SymbolFlags::VALUE_MODULE) {
            return None;
        }
        let members = self.checker.resolved_members(ty)?;
        match members.properties.as_slice() {
            [only] if self.checker.symbol(*only).name == names::EXPORT_EQUALS => Some((module, *only)),
            _ => None,
        }
    }

    /// Whether `ty` serializes to an interface or generic record.
    fn has_interface_shape(&mut self, ty: TypeId) -> bool {
        if self.checker.class_symbol(ty).is_some() {
            return false;
        }
        let kind = &self.checker.type_data(ty).kind;
        if matches!(kind, TypeKind::ClassOrInterface { .. }) {
            return true;
        }
        if !matches!(kind, TypeKind::Anonymous { .. } | TypeKind::Mapped { .. }) {
            return false;
        }
        self.export_equals_of(ty).is_none() && self.checker.resolved_members(ty).is_some()
    }

    // =========================================================================
    // Classes
    // =========================================================================

    fn serialize_class(&mut self, declared: TypeId, constructor_form: bool) -> Result<SerializationId, SerializeError> {
        if let Some(&instance) = self.cache.get(&declared) {
            if !constructor_form {
                return Ok(instance);
            }
            return self
                .graph
                .constructor_forms
                .get(&instance)
                .copied()
                .ok_or(SerializeError::MissingInstanceForm { id: instance });
        }

        let instance = self.graph.allocate();
        let constructor = self.graph.allocate();
        self.cache.insert(declared, instance);
        self.graph.pair(constructor, instance);
        self.graph.populate(
            instance,
            TypeRecord::ClassInstance {
                class_type: constructor,
            },
        );
        trace!(?declared, %instance, %constructor, "serializing class");

        let record = self.make_class(declared)?;
        self.graph.populate(constructor, TypeRecord::Class(record));
        self.deferred
            .push(Box::new(move |graph: &mut Graph| graph.instantiate_bases(constructor)));
        Ok(if constructor_form { constructor } else { instance })
    }

    fn make_class(&mut self, declared: TypeId) -> Result<ClassRecord, SerializeError> {
        let Some(class) = self.checker.type_data(declared).symbol else {
            return Err(self.unhandled(declared));
        };
        let members = self.checker.declared_members(declared);

        let static_side = self.checker.type_of_symbol(class);
        let construct_signatures = self
            .checker
            .resolved_members(static_side)
            .map(|m| m.construct_signatures.clone())
            .unwrap_or_default();
        let constructors = self.signatures(&construct_signatures)?;

        let statics: Vec<SymbolId> = self
            .checker
            .class_static_members(class)
            .into_iter()
            .filter(|&s| self.checker.symbol(s).name != names::PROTOTYPE)
            .collect();
        let static_properties = self.properties(&statics)?;
        let instance_properties = self.properties(&members.properties)?;

        let mut base_types = Vec::with_capacity(members.base_types.len());
        for &base in &members.base_types {
            base_types.push(self.serialize(base, true)?);
        }

        let arguments = self.checker.type_arguments(declared);
        let target = self.checker.reference_target(declared).unwrap_or(declared);
        Ok(ClassRecord {
            constructors,
            base_types,
            static_properties,
            instance_properties,
            declared_string_index_type: self.serialize_optional(members.string_index)?,
            declared_number_index_type: self.serialize_optional(members.number_index)?,
            type_parameters: self.serialize_all(&members.type_parameters)?,
            type_arguments: self.serialize_all(&arguments)?,
            target: self.serialize(target, true)?,
        })
    }

    // =========================================================================
    // Properties
    // =========================================================================

    fn properties(&mut self, symbols: &[SymbolId]) -> Result<PropertyMap, SerializeError> {
        let mut properties = PropertyMap::with_capacity(symbols.len());
        for &symbol in symbols {
            let name = self.checker.symbol(symbol).name.clone();
            let id = self.property_type(symbol)?;
            properties.insert(name, id);
        }
        Ok(properties)
    }

    fn property_type(&mut self, symbol: SymbolId) -> Result<SerializationId, SerializeError> {
        let Some(declaration) = self.representative_declaration(symbol)? else {
            let ty = self.checker.type_of_symbol(symbol);
            return self.serialize(ty, false);
        };
        let constructor_form = self.names_class_value(declaration);
        let ty = self.checker.type_at_declaration(declaration);
        self.serialize(ty, constructor_form)
    }

    /// The declaration a property's type is read from. Members contributed
    /// by interface declarations only count when nothing else declares the
    /// property; several remaining declarations must form one of the
    /// shapes that merge into a single value.
    fn representative_declaration(&self, symbol: SymbolId) -> Result<Option<NodeId>, SerializeError> {
        let declarations = &self.checker.symbol(symbol).declarations;
        let Some(&first) = declarations.first() else {
            return Ok(None);
        };
        let candidates: Vec<NodeId> = declarations
            .iter()
            .copied()
            .filter(|&d| !self.is_interface_contribution(d))
            .collect();
        match candidates.as_slice() {
            [] => Ok(Some(first)),
            [only] => Ok(Some(*only)),
            _ => {
                let kinds: Vec<SyntaxKind> = candidates.iter().map(|&d| self.checker.node_kind(d)).collect();
                if !merges_into_one_value(&kinds) {
                    return Err(SerializeError::AmbiguousDeclarations {
                        property: self.checker.symbol(symbol).name.clone(),
                        kinds: kinds.iter().map(|k| k.to_string()).collect(),
                    });
                }
                let value = candidates
                    .iter()
                    .copied()
                    .find(|&d| self.checker.node_kind(d) != SyntaxKind::ModuleDeclaration);
                Ok(Some(value.unwrap_or(candidates[0])))
            }
        }
    }

    fn is_interface_contribution(&self, declaration: NodeId) -> bool {
        let data = self.checker.node(declaration);
        match data.kind {
            SyntaxKind::InterfaceDeclaration => true,
            SyntaxKind::ModuleDeclaration => matches!(
                *data.payload,
                NodePayload::Module {
                    instantiated: false,
                    ..
                }
            ),
            _ => data
                .parent
                .is_some_and(|p| self.checker.node_kind(p) == SyntaxKind::InterfaceDeclaration),
        }
    }

    /// A property that is a class declaration, or annotated `typeof X`,
    /// denotes a constructor rather than an instance.
    fn names_class_value(&self, declaration: NodeId) -> bool {
        let data = self.checker.node(declaration);
        if data.kind == SyntaxKind::ClassDeclaration {
            return true;
        }
        let annotation = match &*data.payload {
            NodePayload::Variable { declarator, .. } => declarator.type_annotation.as_deref(),
            NodePayload::ClassMember(ClassMember::Property { type_annotation, .. }) => type_annotation.as_deref(),
            NodePayload::TypeMember(ObjectTypeMember::Property { ty, .. }) => ty.as_ref(),
            _ => None,
        };
        annotation.is_some_and(|a| matches!(a.value, Type::TypeQuery { .. }))
    }
}

/// Declaration kinds that together still describe one value: overloads,
/// accessor pairs, redeclared variables, namespace augmentations, and a
/// function, class or enum merged with namespaces.
fn merges_into_one_value(kinds: &[SyntaxKind]) -> bool {
    let values: Vec<SyntaxKind> = kinds
        .iter()
        .copied()
        .filter(|&k| k != SyntaxKind::ModuleDeclaration)
        .collect();
    let all = |pred: fn(SyntaxKind) -> bool| values.iter().all(|&k| pred(k));
    values.is_empty()
        || all(|k| {
            matches!(
                k,
                SyntaxKind::FunctionDeclaration | SyntaxKind::MethodDeclaration | SyntaxKind::MethodSignature
            )
        })
        || all(|k| matches!(k, SyntaxKind::GetAccessor | SyntaxKind::SetAccessor))
        || all(|k| k == SyntaxKind::EnumDeclaration)
        || all(|k| k == SyntaxKind::VariableDeclaration)
        || (values.len() == 1 && values[0] == SyntaxKind::ClassDeclaration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsenv_checker::{CompilerOptions, Program};

    fn program(source: &str) -> Program {
        Program::from_sources(&[("test.d.ts", source)], CompilerOptions::default())
    }

    fn decl(checker: &TypeChecker<'_>, name: &str) -> NodeId {
        checker.named_declarations(0).expect("file")[name][0]
    }

    fn serialize_decl(serializer: &mut TypeSerializer<'_, '_>, name: &str, constructor: bool) -> SerializationId {
        let node = decl(serializer.checker(), name);
        let ty = serializer.checker().type_at_declaration(node);
        serializer.serialize(ty, constructor).expect("serialize")
    }

    fn record(records: &[TypeRecord], id: SerializationId) -> &TypeRecord {
        &records[id.index().expect("id")]
    }

    #[test]
    fn test_primitives_are_shared() {
        let program = program("declare var a: number;\ndeclare var b: number;\ndeclare var c: unknown;\ndeclare var d: any;");
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let a = serialize_decl(&mut serializer, "a", false);
        let b = serialize_decl(&mut serializer, "b", false);
        let c = serialize_decl(&mut serializer, "c", false);
        let d = serialize_decl(&mut serializer, "d", false);
        assert_eq!(a, b);
        assert_eq!(c, d);
        let records = serializer.finish().expect("finish");
        assert_eq!(records.len(), 2);
        assert_eq!(record(&records, a), &TypeRecord::Number);
        assert_eq!(record(&records, c), &TypeRecord::Any);
    }

    #[test]
    fn test_literals_and_enums() {
        let program = program(
            "declare var s: 'a';\ndeclare var n: 2;\ndeclare var t: true;\n\
             declare enum E { A }\ndeclare enum F { B }\ndeclare var e: E;\ndeclare var f: F;",
        );
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let s = serialize_decl(&mut serializer, "s", false);
        let n = serialize_decl(&mut serializer, "n", false);
        let t = serialize_decl(&mut serializer, "t", false);
        let e = serialize_decl(&mut serializer, "e", false);
        let f = serialize_decl(&mut serializer, "f", false);
        assert_eq!(e, f);
        let records = serializer.finish().expect("finish");
        assert_eq!(record(&records, s), &TypeRecord::StringLiteral { value: "a".into() });
        assert_eq!(record(&records, n), &TypeRecord::NumberLiteral { value: 2.0 });
        assert_eq!(record(&records, t), &TypeRecord::BooleanLiteral { value: true });
        assert_eq!(record(&records, e), &TypeRecord::Enum);
    }

    #[test]
    fn test_self_referencing_interface() {
        let program = program("interface Node2 { next: Node2; value: string }\ndeclare var n: Node2;");
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let n = serialize_decl(&mut serializer, "n", false);
        let records = serializer.finish().expect("finish");
        let TypeRecord::Interface(shape) = record(&records, n) else {
            panic!("expected interface");
        };
        assert_eq!(shape.declared_properties["next"], n);
        assert_eq!(record(&records, shape.declared_properties["value"]), &TypeRecord::String);
        assert!(shape.declared_string_index_type.is_none());
    }

    #[test]
    fn test_generic_interface_references_itself() {
        let program = program("interface Box<T> { value: T }\ndeclare var b: Box<string>;");
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let b = serialize_decl(&mut serializer, "b", false);
        let records = serializer.finish().expect("finish");
        let TypeRecord::Reference { target, type_arguments } = record(&records, b) else {
            panic!("expected reference");
        };
        assert_eq!(record(&records, type_arguments[0]), &TypeRecord::String);
        let TypeRecord::Generic(generic) = record(&records, *target) else {
            panic!("expected generic");
        };
        assert_eq!(generic.target, *target);
        assert_eq!(generic.type_arguments, generic.shape.type_parameters);
        let parameter = generic.shape.type_parameters[0];
        assert_eq!(generic.shape.declared_properties["value"], parameter);
        assert_eq!(
            record(&records, parameter),
            &TypeRecord::TypeParameter {
                constraint: SerializationId::NONE
            }
        );
    }

    #[test]
    fn test_union_members_are_deduplicated() {
        let program = program(
            "interface A { a: string }\ninterface B { b: string }\ntype A2 = A;\ndeclare var x: A | A2 | B;\n\
             declare enum E { One }\ndeclare enum F { Two }\ndeclare var y: E | string | F;",
        );
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let a = serialize_decl(&mut serializer, "A", false);
        let b = serialize_decl(&mut serializer, "B", false);
        let x = serialize_decl(&mut serializer, "x", false);
        let y = serialize_decl(&mut serializer, "y", false);
        let records = serializer.finish().expect("finish");
        assert_eq!(record(&records, x), &TypeRecord::Union { elements: vec![a, b] });
        let TypeRecord::Union { elements } = record(&records, y) else {
            panic!("expected union");
        };
        let kinds: Vec<_> = elements.iter().map(|&e| record(&records, e).kind_name()).collect();
        assert_eq!(kinds, vec!["Enum", "String"]);
    }

    #[test]
    fn test_tuples_keep_min_length() {
        let program = program("declare var t: [string, number?];");
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let t = serialize_decl(&mut serializer, "t", false);
        let records = serializer.finish().expect("finish");
        let TypeRecord::Tuple {
            element_types,
            min_length,
        } = record(&records, t)
        else {
            panic!("expected tuple");
        };
        assert_eq!(element_types.len(), 2);
        assert_eq!(*min_length, 1);
    }

    #[test]
    fn test_class_duality() {
        let program = program(
            "declare class C { constructor(n: number); method(): C; static create(): C; }\n\
             declare var value: typeof C;\ndeclare var instance: C;",
        );
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let value = serialize_decl(&mut serializer, "value", false);
        let instance = serialize_decl(&mut serializer, "instance", false);
        let class = serialize_decl(&mut serializer, "C", true);
        assert_ne!(value, instance);
        assert_eq!(value, class);
        let records = serializer.finish().expect("finish");
        assert_eq!(record(&records, instance), &TypeRecord::ClassInstance { class_type: value });
        let TypeRecord::Class(class) = record(&records, value) else {
            panic!("expected class");
        };
        assert_eq!(class.constructors.len(), 1);
        assert_eq!(class.constructors[0].resolved_return_type, instance);
        assert_eq!(record(&records, class.constructors[0].parameters[0].ty), &TypeRecord::Number);
        assert_eq!(class.static_properties.keys().collect::<Vec<_>>(), vec!["create"]);
        assert_eq!(class.instance_properties.keys().collect::<Vec<_>>(), vec!["method"]);
        assert_eq!(class.target, value);
    }

    #[test]
    fn test_class_without_constructor_gets_default() {
        let program = program("declare class Empty {}\ndeclare var e: typeof Empty;");
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let e = serialize_decl(&mut serializer, "e", false);
        let records = serializer.finish().expect("finish");
        let TypeRecord::Class(class) = record(&records, e) else {
            panic!("expected class");
        };
        assert_eq!(class.constructors.len(), 1);
        assert!(class.constructors[0].parameters.is_empty());
        assert_eq!(
            record(&records, class.constructors[0].resolved_return_type),
            &TypeRecord::ClassInstance { class_type: e }
        );
    }

    #[test]
    fn test_base_classes_are_rewritten_to_instances() {
        let program = program("declare class Base { a: string }\ndeclare class Derived extends Base { b: number }");
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let derived = serialize_decl(&mut serializer, "Derived", true);
        let base = serialize_decl(&mut serializer, "Base", false);
        let records = serializer.finish().expect("finish");
        let TypeRecord::Class(class) = record(&records, derived) else {
            panic!("expected class");
        };
        assert_eq!(class.base_types, vec![base]);
        assert!(matches!(record(&records, base), TypeRecord::ClassInstance { .. }));
    }

    #[test]
    fn test_class_valued_property_uses_constructor_form() {
        let program = program(
            "declare namespace N { class K {} var k: K; }\ndeclare var holder: { ctor: typeof N.K };",
        );
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let n = serialize_decl(&mut serializer, "N", false);
        let holder = serialize_decl(&mut serializer, "holder", false);
        let records = serializer.finish().expect("finish");
        let TypeRecord::Interface(namespace) = record(&records, n) else {
            panic!("expected namespace interface");
        };
        let class = namespace.declared_properties["K"];
        assert!(matches!(record(&records, class), TypeRecord::Class(_)));
        assert_eq!(
            record(&records, namespace.declared_properties["k"]),
            &TypeRecord::ClassInstance { class_type: class }
        );
        let TypeRecord::Interface(holder) = record(&records, holder) else {
            panic!("expected interface");
        };
        assert_eq!(holder.declared_properties["ctor"], class);
    }

    #[test]
    fn test_function_overloads_are_one_property() {
        let program = program(
            "declare namespace N { function f(a: string): void; function f(a: number): void; namespace f { var x: number; } }",
        );
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let n = serialize_decl(&mut serializer, "N", false);
        let records = serializer.finish().expect("finish");
        let TypeRecord::Interface(namespace) = record(&records, n) else {
            panic!("expected interface");
        };
        let TypeRecord::Interface(f) = record(&records, namespace.declared_properties["f"]) else {
            panic!("expected function interface");
        };
        assert_eq!(f.declared_call_signatures.len(), 2);
        assert!(f.declared_properties.contains_key("x"));
    }

    #[test]
    fn test_ambiguous_declarations_fail() {
        let program = program("declare class C { p(): void; p: string; }\ndeclare var c: C;");
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let node = decl(serializer.checker(), "c");
        let ty = serializer.checker().type_at_declaration(node);
        let err = serializer.serialize(ty, false).expect_err("ambiguous");
        assert!(matches!(err, SerializeError::AmbiguousDeclarations { ref property, .. } if property == "p"));
    }

    #[test]
    fn test_bigint_is_unhandled() {
        let program = program("declare var big: bigint;");
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let node = decl(serializer.checker(), "big");
        let ty = serializer.checker().type_at_declaration(node);
        let err = serializer.serialize(ty, false).expect_err("bigint");
        assert!(matches!(err, SerializeError::UnhandledTypeKind { flags, .. } if flags == TypeFlags::BIGINT.bits()));
    }

    #[test]
    fn test_conditional_types_use_their_constraint() {
        let program = program(
            "type Pick2<T> = T extends string ? 'yes' : 'no';\ndeclare function f<U>(u: U): Pick2<U>;\ndeclare var g: typeof f;",
        );
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let f = serialize_decl(&mut serializer, "f", false);
        let records = serializer.finish().expect("finish");
        let TypeRecord::Interface(function) = record(&records, f) else {
            panic!("expected interface");
        };
        let result = function.declared_call_signatures[0].resolved_return_type;
        let TypeRecord::Union { elements } = record(&records, result) else {
            panic!("expected union");
        };
        let values: Vec<_> = elements.iter().map(|&e| record(&records, e).clone()).collect();
        assert_eq!(
            values,
            vec![
                TypeRecord::StringLiteral { value: "yes".into() },
                TypeRecord::StringLiteral { value: "no".into() },
            ]
        );
    }

    #[test]
    fn test_export_equals_module_is_unwrapped() {
        let program = program(
            "declare module 'lib' { interface Api { run(): void } var api: Api; var helper: number; export = api; }",
        );
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let module = serialize_decl(&mut serializer, "lib", false);
        let api = serialize_decl(&mut serializer, "api", false);
        assert_ne!(module, api);
        let records = serializer.finish().expect("finish");
        let TypeRecord::Interface(copy) = record(&records, module) else {
            panic!("expected interface copy");
        };
        assert_eq!(copy.declared_properties.keys().collect::<Vec<_>>(), vec!["run", "helper"]);
        let TypeRecord::Interface(original) = record(&records, api) else {
            panic!("expected interface");
        };
        assert_eq!(original.declared_properties.len(), 1);
    }

    #[test]
    fn test_export_equals_module_referenced_from_its_target() {
        let program = program(
            "declare namespace lib { var api: { me: typeof lib }; var helper: number; export = api; }",
        );
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let module = serialize_decl(&mut serializer, "lib", false);
        let api = serialize_decl(&mut serializer, "api", false);
        assert_ne!(module, api);
        let records = serializer.finish().expect("finish");
        let TypeRecord::Interface(copy) = record(&records, module) else {
            panic!("expected interface copy");
        };
        assert_eq!(copy.declared_properties["me"], module);
        assert_eq!(copy.declared_properties.keys().collect::<Vec<_>>(), vec!["me", "helper"]);
        let TypeRecord::Interface(original) = record(&records, api) else {
            panic!("expected interface");
        };
        assert_eq!(original.declared_properties["me"], module);
        assert!(!original.declared_properties.contains_key("helper"));
    }

    #[test]
    fn test_deferred_fixups_run_last_registered_first() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let program = program("");
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let order = Rc::new(RefCell::new(Vec::new()));
        for label in ["first", "second"] {
            let order = Rc::clone(&order);
            serializer.deferred.push(Box::new(move |_: &mut Graph| {
                order.borrow_mut().push(label);
                Ok(())
            }));
        }
        serializer.finish().expect("finish");
        assert_eq!(*order.borrow(), vec!["second", "first"]);
    }

    #[test]
    fn test_merged_values_are_one_property() {
        let program = program(
            "declare namespace N { class K {} namespace K { var s: string; } enum E { A } namespace E { var extra: number; } var v: number; var v: number; }",
        );
        let mut checker = program.checker();
        let mut serializer = TypeSerializer::new(&mut checker);
        let n = serialize_decl(&mut serializer, "N", false);
        let records = serializer.finish().expect("finish");
        let TypeRecord::Interface(namespace) = record(&records, n) else {
            panic!("expected interface");
        };
        assert!(matches!(record(&records, namespace.declared_properties["K"]), TypeRecord::Class(_)));
        assert!(namespace.declared_properties.contains_key("E"));
        assert_eq!(record(&records, namespace.declared_properties["v"]), &TypeRecord::Number);
    }

    #[test]
    fn test_merges_into_one_value() {
        use SyntaxKind::*;

        assert!(merges_into_one_value(&[FunctionDeclaration, FunctionDeclaration, ModuleDeclaration]));
        assert!(merges_into_one_value(&[GetAccessor, SetAccessor]));
        assert!(merges_into_one_value(&[EnumDeclaration, EnumDeclaration, ModuleDeclaration]));
        assert!(merges_into_one_value(&[VariableDeclaration, VariableDeclaration]));
        assert!(merges_into_one_value(&[ClassDeclaration, ModuleDeclaration, ModuleDeclaration]));
        assert!(merges_into_one_value(&[ModuleDeclaration, ModuleDeclaration]));
        assert!(!merges_into_one_value(&[ClassDeclaration, ClassDeclaration]));
        assert!(!merges_into_one_value(&[MethodDeclaration, PropertyDeclaration]));
        assert!(!merges_into_one_value(&[VariableDeclaration, FunctionDeclaration]));
    }
}
