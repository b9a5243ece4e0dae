//! Instantiation of generic types
//!
//! Replaces type parameters by type arguments. References, unions and the
//! type operators are rebuilt structurally; anonymous, mapped and
//! conditional types keep their declaration and carry a composed mapper,
//! so their members are only instantiated when someone asks for them.

use std::rc::Rc;
use tracing::debug;

use crate::checker::{InstantiationKey, TypeChecker};
use crate::error::codes;
use crate::types::*;

/// Instantiations nested deeper than this are abandoned with an error
const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Type arguments nested deeper than this stop a deferred instantiation.
/// Recursive aliases such as `type Chain<T> = { (): Chain<Box<T>> }` would
/// otherwise produce a new type on every expansion.
const MAX_ARGUMENT_NESTING: u32 = 10;

impl TypeChecker<'_> {
    /// `ty` with the mapper's type parameters replaced.
    pub fn instantiate(&mut self, ty: TypeId, mapper: &Rc<TypeMapper>) -> TypeId {
        if mapper.is_empty() {
            return ty;
        }
        if self.instantiation_depth >= MAX_INSTANTIATION_DEPTH {
            self.global_error(
                codes::EXCESSIVE_INSTANTIATION,
                "Type instantiation is excessively deep and possibly infinite.".to_string(),
            );
            return self.intrinsics.any;
        }
        self.instantiation_depth += 1;
        let result = self.instantiate_type(ty, mapper);
        self.instantiation_depth -= 1;
        result
    }

    fn instantiate_list(&mut self, types: &[TypeId], mapper: &Rc<TypeMapper>) -> Vec<TypeId> {
        types.iter().map(|&t| self.instantiate(t, mapper)).collect()
    }

    fn instantiate_type(&mut self, ty: TypeId, mapper: &Rc<TypeMapper>) -> TypeId {
        match self.types.get(ty).kind.clone() {
            TypeKind::TypeParameter { .. } => mapper.map(ty).unwrap_or(ty),
            TypeKind::Intrinsic(_) | TypeKind::Literal(_) | TypeKind::Enum | TypeKind::TupleTarget { .. } => ty,
            TypeKind::ClassOrInterface {
                type_parameters,
                view,
                ..
            } => {
                if type_parameters.is_empty() {
                    return ty;
                }
                let arguments = self.instantiate_list(&type_parameters, mapper);
                if arguments == type_parameters {
                    return ty;
                }
                let target = view.map_or(ty, |v| v.merged);
                self.types.reference(target, arguments)
            }
            TypeKind::Reference { target, arguments } => {
                let instantiated = self.instantiate_list(&arguments, mapper);
                if instantiated == arguments {
                    ty
                } else {
                    self.types.reference(target, instantiated)
                }
            }
            TypeKind::Union(members) => {
                let instantiated = self.instantiate_list(&members, mapper);
                if instantiated == members {
                    ty
                } else {
                    self.get_union(instantiated)
                }
            }
            TypeKind::Intersection(members) => {
                let instantiated = self.instantiate_list(&members, mapper);
                if instantiated == members {
                    ty
                } else {
                    self.get_intersection(instantiated)
                }
            }
            // The value side of a declaration does not depend on outer
            // type parameters.
            TypeKind::Anonymous {
                origin: AnonymousOrigin::Symbol(_),
                ..
            } => ty,
            TypeKind::Anonymous { mapper: inner, .. }
            | TypeKind::Mapped { mapper: inner, .. }
            | TypeKind::Conditional { mapper: inner, .. } => self.instantiate_deferred(ty, inner, mapper),
            TypeKind::IndexedAccess { object, index } => {
                let object = self.instantiate(object, mapper);
                let index = self.instantiate(index, mapper);
                self.get_indexed_access(object, index)
            }
            TypeKind::Index(operand) => {
                let operand = self.instantiate(operand, mapper);
                self.get_index_type(operand)
            }
            TypeKind::Substitution { base, substitute } => {
                let base = self.instantiate(base, mapper);
                let substitute = self.instantiate(substitute, mapper);
                self.substitution_of(base, substitute)
            }
        }
    }

    /// Anonymous, mapped or conditional type under a composed mapper,
    /// cached per declaration and mapping.
    fn instantiate_deferred(
        &mut self,
        ty: TypeId,
        inner: Option<Rc<TypeMapper>>,
        outer: &Rc<TypeMapper>,
    ) -> TypeId {
        let combined = self.combine_mappers(inner.as_deref(), outer);
        if inner.as_deref() == Some(&combined) {
            return ty;
        }
        let nesting = combined
            .targets
            .iter()
            .map(|&t| self.nesting_of(t))
            .max()
            .unwrap_or(0);
        if nesting > MAX_ARGUMENT_NESTING {
            debug!(?ty, nesting, "deferred instantiation nested too deeply");
            return self.intrinsics.any;
        }

        let data = self.types.get(ty).clone();
        let sources = combined.sources.clone();
        let targets = combined.targets.clone();
        let combined = Some(Rc::new(combined));
        let (key, kind) = match data.kind {
            TypeKind::Anonymous { origin, .. } => (
                InstantiationKey::Anonymous(origin, sources, targets),
                TypeKind::Anonymous {
                    origin,
                    mapper: combined,
                },
            ),
            TypeKind::Mapped { declaration, .. } => (
                InstantiationKey::Mapped(declaration, sources, targets),
                TypeKind::Mapped {
                    declaration,
                    mapper: combined,
                },
            ),
            TypeKind::Conditional { declaration, .. } => (
                InstantiationKey::Conditional(declaration, sources, targets),
                TypeKind::Conditional {
                    declaration,
                    mapper: combined,
                },
            ),
            _ => return ty,
        };
        if let Some(&existing) = self.instantiations.get(&key) {
            return existing;
        }
        let mut object_flags = data.object_flags;
        if data.flags.contains(TypeFlags::OBJECT) {
            object_flags |= ObjectFlags::INSTANTIATED;
        }
        let id = self.types.alloc(TypeData {
            flags: data.flags,
            object_flags,
            symbol: data.symbol,
            kind,
        });
        self.instantiations.insert(key, id);
        id
    }

    /// `outer` applied after `inner`: inner targets are instantiated by
    /// `outer`, and parameters only `outer` maps are appended.
    fn combine_mappers(&mut self, inner: Option<&TypeMapper>, outer: &Rc<TypeMapper>) -> TypeMapper {
        let Some(inner) = inner else {
            return (**outer).clone();
        };
        let mut sources = inner.sources.clone();
        let mut targets = self.instantiate_list(&inner.targets, outer);
        for (&source, &target) in outer.sources.iter().zip(&outer.targets) {
            if !sources.contains(&source) {
                sources.push(source);
                targets.push(target);
            }
        }
        TypeMapper::new(sources, targets)
    }

    /// How deeply type arguments are nested inside `ty`.
    fn nesting_of(&mut self, ty: TypeId) -> u32 {
        if let Some(&nesting) = self.nesting.get(&ty) {
            return nesting;
        }
        let nested: Vec<TypeId> = match &self.types.get(ty).kind {
            TypeKind::Reference { arguments, .. } => arguments.clone(),
            TypeKind::Anonymous { mapper: Some(m), .. }
            | TypeKind::Mapped { mapper: Some(m), .. }
            | TypeKind::Conditional { mapper: Some(m), .. } => m.targets.clone(),
            TypeKind::Union(members) | TypeKind::Intersection(members) => {
                let members = members.clone();
                let nesting = members.into_iter().map(|m| self.nesting_of(m)).max().unwrap_or(0);
                self.nesting.insert(ty, nesting);
                return nesting;
            }
            _ => Vec::new(),
        };
        let nesting = if nested.is_empty() {
            0
        } else {
            1 + nested.into_iter().map(|t| self.nesting_of(t)).max().unwrap_or(0)
        };
        self.nesting.insert(ty, nesting);
        nesting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompilerOptions;
    use crate::program::Program;
    use crate::syntax::NodeId;

    fn program(source: &str) -> Program {
        Program::from_sources(&[("test.d.ts", source)], CompilerOptions::default())
    }

    fn decl(checker: &TypeChecker<'_>, name: &str) -> NodeId {
        checker.named_declarations(0).expect("file")[name][0]
    }

    #[test]
    fn test_instantiated_references_are_shared() {
        let program = program(
            "interface List<T> { item: T }\n\
             type Alias<U> = List<U>;\n\
             declare var a: Alias<string>;\n\
             declare var b: List<string>;",
        );
        let mut checker = program.checker();
        let a = checker.type_at_declaration(decl(&checker, "a"));
        let b = checker.type_at_declaration(decl(&checker, "b"));
        assert_eq!(a, b);
        assert_eq!(checker.type_arguments(a), vec![checker.intrinsics().string]);
    }

    #[test]
    fn test_anonymous_instantiation_is_cached() {
        let program = program(
            "type Box<T> = { value: T; get(): T };\n\
             declare var a: Box<number>;\n\
             declare var b: Box<number>;\n\
             declare var c: Box<string>;",
        );
        let mut checker = program.checker();
        let a = checker.type_at_declaration(decl(&checker, "a"));
        let b = checker.type_at_declaration(decl(&checker, "b"));
        let c = checker.type_at_declaration(decl(&checker, "c"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(checker.object_flags(a).contains(ObjectFlags::INSTANTIATED));
        let value = checker.property_of_type(a, "value");
        assert_eq!(value, Some(checker.intrinsics().number));
    }

    #[test]
    fn test_signatures_follow_the_mapper() {
        let program = program("type Fn<T> = (x: T) => T[];\ndeclare var f: Fn<boolean>;");
        let mut checker = program.checker();
        let f = checker.type_at_declaration(decl(&checker, "f"));
        let members = checker.resolved_members(f).expect("members");
        let signature = &members.call_signatures[0];
        let boolean = checker.intrinsics().boolean;
        assert_eq!(signature.parameters[0].ty, boolean);
        assert_eq!(checker.type_arguments(signature.return_type), vec![boolean]);
    }

    #[test]
    fn test_recursive_expansion_terminates() {
        let program = program(
            "interface Wrap<T> { inner: T }\n\
             type Chain<T> = { (): Chain<Wrap<T>> };\n\
             declare var c: Chain<number>;",
        );
        let mut checker = program.checker();
        let mut current = checker.type_at_declaration(decl(&checker, "c"));
        let any = checker.intrinsics().any;
        for _ in 0..32 {
            if current == any {
                break;
            }
            let members = checker.resolved_members(current).expect("members");
            current = members.call_signatures[0].return_type;
        }
        assert_eq!(current, any);
    }
}
