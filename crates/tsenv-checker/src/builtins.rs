//! Intrinsic types shared by the whole program

use crate::types::{LiteralValue, TypeArena, TypeData, TypeFlags, TypeId, TypeKind};

/// One id per intrinsic, allocated before anything else
#[derive(Debug, Clone, Copy)]
pub struct Intrinsics {
    pub any: TypeId,
    pub unknown: TypeId,
    pub string: TypeId,
    pub number: TypeId,
    pub boolean: TypeId,
    pub bigint: TypeId,
    pub symbol: TypeId,
    pub void: TypeId,
    pub undefined: TypeId,
    pub null: TypeId,
    pub never: TypeId,
    /// The `object` keyword type
    pub non_primitive: TypeId,
    pub true_type: TypeId,
    pub false_type: TypeId,
}

impl Intrinsics {
    pub fn new(arena: &mut TypeArena) -> Self {
        let mut intrinsic = |flags: TypeFlags, name: &'static str| {
            arena.alloc(TypeData::new(flags, TypeKind::Intrinsic(name)))
        };
        let any = intrinsic(TypeFlags::ANY, "any");
        let unknown = intrinsic(TypeFlags::UNKNOWN, "unknown");
        let string = intrinsic(TypeFlags::STRING, "string");
        let number = intrinsic(TypeFlags::NUMBER, "number");
        let boolean = intrinsic(TypeFlags::BOOLEAN, "boolean");
        let bigint = intrinsic(TypeFlags::BIGINT, "bigint");
        let symbol = intrinsic(TypeFlags::ES_SYMBOL, "symbol");
        let void = intrinsic(TypeFlags::VOID, "void");
        let undefined = intrinsic(TypeFlags::UNDEFINED, "undefined");
        let null = intrinsic(TypeFlags::NULL, "null");
        let never = intrinsic(TypeFlags::NEVER, "never");
        let non_primitive = intrinsic(TypeFlags::NON_PRIMITIVE, "object");
        let true_type = arena.literal(LiteralValue::Boolean(true));
        let false_type = arena.literal(LiteralValue::Boolean(false));
        Self {
            any,
            unknown,
            string,
            number,
            boolean,
            bigint,
            symbol,
            void,
            undefined,
            null,
            never,
            non_primitive,
            true_type,
            false_type,
        }
    }

    /// Keyword text to intrinsic, for the keywords that name one.
    pub fn by_name(&self, name: &str) -> Option<TypeId> {
        Some(match name {
            "any" => self.any,
            "unknown" => self.unknown,
            "string" => self.string,
            "number" => self.number,
            "boolean" => self.boolean,
            "bigint" => self.bigint,
            "symbol" => self.symbol,
            "void" => self.void,
            "undefined" => self.undefined,
            "null" => self.null,
            "never" => self.never,
            "object" => self.non_primitive,
            _ => return None,
        })
    }

    /// Widened type of a literal: `"a"` to `string`, `1` to `number`.
    pub fn widen(&self, arena: &TypeArena, ty: TypeId) -> TypeId {
        let flags = arena.get(ty).flags;
        if flags.contains(TypeFlags::STRING_LITERAL) {
            self.string
        } else if flags.contains(TypeFlags::NUMBER_LITERAL) {
            self.number
        } else if flags.contains(TypeFlags::BOOLEAN_LITERAL) {
            self.boolean
        } else if flags.contains(TypeFlags::BIGINT_LITERAL) {
            self.bigint
        } else {
            ty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsics_are_distinct() {
        let mut arena = TypeArena::default();
        let intrinsics = Intrinsics::new(&mut arena);
        assert_ne!(intrinsics.any, intrinsics.unknown);
        assert_eq!(intrinsics.by_name("object"), Some(intrinsics.non_primitive));
        assert_eq!(intrinsics.by_name("Object"), None);
        assert!(arena.get(intrinsics.null).flags.contains(TypeFlags::NULL));
    }

    #[test]
    fn test_widening() {
        let mut arena = TypeArena::default();
        let intrinsics = Intrinsics::new(&mut arena);
        let lit = arena.literal(LiteralValue::String("x".into()));
        assert_eq!(intrinsics.widen(&arena, lit), intrinsics.string);
        assert_eq!(intrinsics.widen(&arena, intrinsics.true_type), intrinsics.boolean);
        assert_eq!(intrinsics.widen(&arena, intrinsics.void), intrinsics.void);
    }
}
