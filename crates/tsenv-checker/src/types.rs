//! Type representation
//!
//! Every type lives in a [`TypeArena`] and is addressed by a [`TypeId`].
//! Two lookups of the same type yield the same id, which is what consumers
//! memoize on: references, unions, intersections, literals and the
//! index/indexed-access operators are interned, declared types are cached
//! per symbol, anonymous types per declaration node.

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use std::rc::Rc;

use crate::symbols::SymbolId;
use crate::syntax::NodeId;

/// Handle of a type in the [`TypeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u32 {
        const ANY             = 1 << 0;
        const UNKNOWN         = 1 << 1;
        const STRING          = 1 << 2;
        const NUMBER          = 1 << 3;
        const BOOLEAN         = 1 << 4;
        const ENUM            = 1 << 5;
        const BIGINT          = 1 << 6;
        const STRING_LITERAL  = 1 << 7;
        const NUMBER_LITERAL  = 1 << 8;
        const BOOLEAN_LITERAL = 1 << 9;
        const BIGINT_LITERAL  = 1 << 10;
        const ES_SYMBOL       = 1 << 11;
        const VOID            = 1 << 12;
        const UNDEFINED       = 1 << 13;
        const NULL            = 1 << 14;
        const NEVER           = 1 << 15;
        const TYPE_PARAMETER  = 1 << 16;
        const OBJECT          = 1 << 17;
        const UNION           = 1 << 18;
        const INTERSECTION    = 1 << 19;
        const INDEX           = 1 << 20;
        const INDEXED_ACCESS  = 1 << 21;
        const CONDITIONAL     = 1 << 22;
        const SUBSTITUTION    = 1 << 23;
        const NON_PRIMITIVE   = 1 << 24;

        const LITERAL = Self::STRING_LITERAL.bits() | Self::NUMBER_LITERAL.bits()
            | Self::BOOLEAN_LITERAL.bits() | Self::BIGINT_LITERAL.bits();
        const NULLABLE = Self::UNDEFINED.bits() | Self::NULL.bits();
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ObjectFlags: u32 {
        const CLASS        = 1 << 0;
        const INTERFACE    = 1 << 1;
        const REFERENCE    = 1 << 2;
        const TUPLE        = 1 << 3;
        const ANONYMOUS    = 1 << 4;
        const MAPPED       = 1 << 5;
        const INSTANTIATED = 1 << 6;
    }
}

/// Value of a literal type
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    BigInt(String),
}

impl LiteralValue {
    fn key(&self) -> LiteralKey {
        match self {
            LiteralValue::String(s) => LiteralKey::String(s.clone()),
            LiteralValue::Number(n) => LiteralKey::Number(n.to_bits()),
            LiteralValue::Boolean(b) => LiteralKey::Boolean(*b),
            LiteralValue::BigInt(s) => LiteralKey::BigInt(s.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LiteralKey {
    String(String),
    Number(u64),
    Boolean(bool),
    BigInt(String),
}

/// Where the members of an anonymous object type come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnonymousOrigin {
    /// A `{ ... }` type literal node
    TypeLiteral(NodeId),
    /// A function or constructor type node
    Signature(NodeId),
    /// The value side of a function, class, enum or namespace symbol
    Symbol(SymbolId),
}

/// Declaration-local view of one of several merged interface declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceView {
    pub declaration: NodeId,
    pub merged: TypeId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// `any`, `string`, `object`, ...
    Intrinsic(&'static str),
    Literal(LiteralValue),
    Enum,
    TypeParameter {
        declaration: Option<NodeId>,
        is_this_type: bool,
        /// Class or interface a `this` type belongs to
        this_of: Option<TypeId>,
    },
    ClassOrInterface {
        type_parameters: Vec<TypeId>,
        this_type: Option<TypeId>,
        view: Option<InterfaceView>,
    },
    Reference {
        target: TypeId,
        arguments: Vec<TypeId>,
    },
    /// Generic tuple shape; tuples are references to one of these
    TupleTarget {
        arity: usize,
        min_length: usize,
        has_rest: bool,
    },
    Union(Vec<TypeId>),
    Intersection(Vec<TypeId>),
    Anonymous {
        origin: AnonymousOrigin,
        mapper: Option<Rc<TypeMapper>>,
    },
    Mapped {
        declaration: NodeId,
        mapper: Option<Rc<TypeMapper>>,
    },
    Conditional {
        declaration: NodeId,
        mapper: Option<Rc<TypeMapper>>,
    },
    IndexedAccess {
        object: TypeId,
        index: TypeId,
    },
    Index(TypeId),
    /// A type parameter narrowed by the `extends` clause of an enclosing
    /// conditional type
    Substitution {
        base: TypeId,
        substitute: TypeId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeData {
    pub flags: TypeFlags,
    pub object_flags: ObjectFlags,
    pub symbol: Option<SymbolId>,
    pub kind: TypeKind,
}

impl TypeData {
    pub fn new(flags: TypeFlags, kind: TypeKind) -> Self {
        Self {
            flags,
            object_flags: ObjectFlags::empty(),
            symbol: None,
            kind,
        }
    }

    pub fn object(object_flags: ObjectFlags, symbol: Option<SymbolId>, kind: TypeKind) -> Self {
        Self {
            flags: TypeFlags::OBJECT,
            object_flags,
            symbol,
            kind,
        }
    }
}

/// Substitution of type parameters by type arguments
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeMapper {
    pub sources: Vec<TypeId>,
    pub targets: Vec<TypeId>,
}

impl TypeMapper {
    pub fn new(sources: Vec<TypeId>, targets: Vec<TypeId>) -> Self {
        debug_assert_eq!(sources.len(), targets.len());
        Self { sources, targets }
    }

    pub fn map(&self, ty: TypeId) -> Option<TypeId> {
        self.sources
            .iter()
            .position(|&s| s == ty)
            .map(|i| self.targets[i])
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignatureParameter {
    pub name: String,
    pub ty: TypeId,
}

/// A call or construct signature
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub declaration: Option<NodeId>,
    pub type_parameters: Vec<TypeId>,
    pub parameters: Vec<SignatureParameter>,
    pub return_type: TypeId,
    pub min_argument_count: usize,
    pub has_rest_parameter: bool,
}

/// Members a class or interface declares itself, before inheritance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclaredMembers {
    pub type_parameters: Vec<TypeId>,
    pub base_types: Vec<TypeId>,
    pub properties: Vec<SymbolId>,
    pub call_signatures: Vec<Signature>,
    pub construct_signatures: Vec<Signature>,
    pub string_index: Option<TypeId>,
    pub number_index: Option<TypeId>,
}

/// Members of an anonymous or mapped object type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedMembers {
    pub properties: Vec<SymbolId>,
    pub call_signatures: Vec<Signature>,
    pub construct_signatures: Vec<Signature>,
    pub string_index: Option<TypeId>,
    pub number_index: Option<TypeId>,
}

impl ResolvedMembers {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
            && self.call_signatures.is_empty()
            && self.construct_signatures.is_empty()
            && self.string_index.is_none()
            && self.number_index.is_none()
    }
}

/// Append-only type storage with interning tables
#[derive(Debug, Default)]
pub struct TypeArena {
    types: Vec<TypeData>,
    references: FxHashMap<(TypeId, Vec<TypeId>), TypeId>,
    unions: FxHashMap<Vec<TypeId>, TypeId>,
    intersections: FxHashMap<Vec<TypeId>, TypeId>,
    literals: FxHashMap<LiteralKey, TypeId>,
    indexed: FxHashMap<(TypeId, TypeId), TypeId>,
    index: FxHashMap<TypeId, TypeId>,
    tuples: FxHashMap<(usize, usize, bool), TypeId>,
}

impl TypeArena {
    pub fn alloc(&mut self, data: TypeData) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(data);
        id
    }

    pub fn get(&self, id: TypeId) -> &TypeData {
        &self.types[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: TypeId) -> &mut TypeData {
        &mut self.types[id.index()]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn literal(&mut self, value: LiteralValue) -> TypeId {
        let key = value.key();
        if let Some(&id) = self.literals.get(&key) {
            return id;
        }
        let flags = match value {
            LiteralValue::String(_) => TypeFlags::STRING_LITERAL,
            LiteralValue::Number(_) => TypeFlags::NUMBER_LITERAL,
            LiteralValue::Boolean(_) => TypeFlags::BOOLEAN_LITERAL,
            LiteralValue::BigInt(_) => TypeFlags::BIGINT_LITERAL,
        };
        let id = self.alloc(TypeData::new(flags, TypeKind::Literal(value)));
        self.literals.insert(key, id);
        id
    }

    /// Registers `id` as the reference of `target` to `arguments`.
    pub(crate) fn register_reference(&mut self, target: TypeId, arguments: Vec<TypeId>, id: TypeId) {
        self.references.insert((target, arguments), id);
    }

    pub fn reference(&mut self, target: TypeId, arguments: Vec<TypeId>) -> TypeId {
        let key = (target, arguments);
        if let Some(&id) = self.references.get(&key) {
            return id;
        }
        let symbol = self.get(target).symbol;
        let id = self.alloc(TypeData::object(
            ObjectFlags::REFERENCE,
            symbol,
            TypeKind::Reference {
                target,
                arguments: key.1.clone(),
            },
        ));
        self.references.insert(key, id);
        id
    }

    pub fn tuple_target(&mut self, arity: usize, min_length: usize, has_rest: bool) -> TypeId {
        let key = (arity, min_length, has_rest);
        if let Some(&id) = self.tuples.get(&key) {
            return id;
        }
        let id = self.alloc(TypeData::object(
            ObjectFlags::TUPLE,
            None,
            TypeKind::TupleTarget {
                arity,
                min_length,
                has_rest,
            },
        ));
        self.tuples.insert(key, id);
        id
    }

    /// Interns a union of already normalized, distinct members.
    pub(crate) fn union(&mut self, members: Vec<TypeId>) -> TypeId {
        if let Some(&id) = self.unions.get(&members) {
            return id;
        }
        let id = self.alloc(TypeData::new(TypeFlags::UNION, TypeKind::Union(members.clone())));
        self.unions.insert(members, id);
        id
    }

    pub(crate) fn intersection(&mut self, members: Vec<TypeId>) -> TypeId {
        if let Some(&id) = self.intersections.get(&members) {
            return id;
        }
        let id = self.alloc(TypeData::new(
            TypeFlags::INTERSECTION,
            TypeKind::Intersection(members.clone()),
        ));
        self.intersections.insert(members, id);
        id
    }

    pub(crate) fn indexed_access(&mut self, object: TypeId, index: TypeId) -> TypeId {
        if let Some(&id) = self.indexed.get(&(object, index)) {
            return id;
        }
        let id = self.alloc(TypeData::new(
            TypeFlags::INDEXED_ACCESS,
            TypeKind::IndexedAccess { object, index },
        ));
        self.indexed.insert((object, index), id);
        id
    }

    pub(crate) fn index(&mut self, operand: TypeId) -> TypeId {
        if let Some(&id) = self.index.get(&operand) {
            return id;
        }
        let id = self.alloc(TypeData::new(TypeFlags::INDEX, TypeKind::Index(operand)));
        self.index.insert(operand, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_are_interned() {
        let mut arena = TypeArena::default();
        let a = arena.literal(LiteralValue::String("a".into()));
        let b = arena.literal(LiteralValue::String("a".into()));
        let one = arena.literal(LiteralValue::Number(1.0));
        assert_eq!(a, b);
        assert_ne!(a, one);
        assert!(arena.get(one).flags.contains(TypeFlags::NUMBER_LITERAL));
    }

    #[test]
    fn test_references_are_interned() {
        let mut arena = TypeArena::default();
        let target = arena.alloc(TypeData::object(
            ObjectFlags::INTERFACE | ObjectFlags::REFERENCE,
            None,
            TypeKind::ClassOrInterface {
                type_parameters: Vec::new(),
                this_type: None,
                view: None,
            },
        ));
        let arg = arena.literal(LiteralValue::Boolean(true));
        let first = arena.reference(target, vec![arg]);
        let second = arena.reference(target, vec![arg]);
        assert_eq!(first, second);
        assert_eq!(arena.get(first).object_flags, ObjectFlags::REFERENCE);
        assert_ne!(arena.reference(target, vec![]), first);
    }

    #[test]
    fn test_mapper_lookup() {
        let mut arena = TypeArena::default();
        let t = arena.literal(LiteralValue::Number(0.0));
        let u = arena.literal(LiteralValue::Number(1.0));
        let mapper = TypeMapper::new(vec![t], vec![u]);
        assert_eq!(mapper.map(t), Some(u));
        assert_eq!(mapper.map(u), None);
        assert!(!mapper.is_empty());
    }
}
