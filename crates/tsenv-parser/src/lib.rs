//! # tsenv Parser
//!
//! Recursive descent parser for TypeScript declaration files.
//! Executable code is skipped token-wise; declarations, type annotations
//! and module structure are parsed into the `tsenv_ast` tree.

use tsenv_ast::*;
use tsenv_lexer::{parse_number_literal, Lexer, Token, TokenKind};

// Module declarations
mod error;
mod parser;
mod types;
mod decl;
mod directives;
mod helpers;

// Re-export public types
pub use directives::{reference_directives, ReferenceDirective};
pub use error::{ParseError, ParseResult};
pub use parser::Parser;

/// Lexes and parses `source` as file `file_id`.
pub fn parse_source(source: &str, file_id: usize) -> (SourceFile, Vec<ParseError>) {
    let tokens = Lexer::with_file_id(source, file_id).tokenize();
    Parser::new(tokens).parse_source_file()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> SourceFile {
        let (file, errors) = parse_source(source, 0);
        assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);
        file
    }

    fn decls(file: &SourceFile) -> Vec<&Decl> {
        file.items
            .iter()
            .filter_map(|item| match &item.value {
                ModuleItem::Decl(d) => Some(&d.value),
                ModuleItem::Export(ExportDecl::Decl(d)) => Some(&d.value),
                _ => None,
            })
            .collect()
    }

    fn alias_type(source: &str) -> Type {
        let file = parse(source);
        match decls(&file).first() {
            Some(Decl::TypeAlias(alias)) => alias.ty.value.clone(),
            other => panic!("expected type alias, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_declare_var() {
        let file = parse("declare var x: number, y: string;");
        match decls(&file)[0] {
            Decl::Var(var) => {
                assert!(var.is_declare);
                assert_eq!(var.declarations.len(), 2);
                assert_eq!(var.declarations[1].value.name.value.name, "y");
            }
            other => panic!("expected var, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_const_literal_initializer() {
        let file = parse("export const a = 5;\nexport const b = -1;\nexport const c = \"s\";");
        let inits: Vec<_> = decls(&file)
            .into_iter()
            .filter_map(|d| match d {
                Decl::Var(v) => v.declarations[0].value.init.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(
            inits,
            vec![
                Initializer::Number(5.0),
                Initializer::Number(-1.0),
                Initializer::String("s".into())
            ]
        );
    }

    #[test]
    fn test_parse_class_members() {
        let file = parse(
            r#"declare class Foo<T> extends Base.Inner<T> implements I {
                static create(): Foo<string>;
                constructor(x: number);
                private y?: string;
                readonly z: T;
                get size(): number;
                set size(v: number);
                [key: string]: any;
                method<U>(this: Foo<T>, a: U, ...rest: any[]): void;
            }"#,
        );
        let class = match decls(&file)[0] {
            Decl::Class(c) => c,
            other => panic!("expected class, got {:?}", other),
        };
        assert_eq!(class.name.as_ref().unwrap().value.name, "Foo");
        assert_eq!(class.extends.as_ref().unwrap().expr.value.to_string(), "Base.Inner");
        assert_eq!(class.implements.len(), 1);
        assert_eq!(class.members.len(), 8);
        assert!(class.members[0].value.is_static());
        assert!(matches!(class.members[1].value, ClassMember::Constructor { .. }));
        match &class.members[2].value {
            ClassMember::Property { modifiers, is_optional, .. } => {
                assert_eq!(modifiers.access, AccessModifier::Private);
                assert!(is_optional);
            }
            other => panic!("expected property, got {:?}", other),
        }
        assert!(matches!(class.members[4].value, ClassMember::Getter { .. }));
        assert!(matches!(class.members[5].value, ClassMember::Setter { .. }));
        assert!(matches!(class.members[6].value, ClassMember::IndexSignature { .. }));
        match &class.members[7].value {
            ClassMember::Method { signature, .. } => {
                assert_eq!(signature.params.len(), 3);
                assert_eq!(signature.min_argument_count(), 1);
                assert!(signature.has_rest_parameter());
            }
            other => panic!("expected method, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_interface() {
        let file = parse(
            r#"interface Array<T> extends ReadonlyArray<T>, Iterable<T> {
                length: number;
                readonly [n: number]: T;
                push(...items: T[]): number;
                (x: string): void
                new (x: string): Array<T>
                [Symbol.iterator](): Iterator<T>;
                "quoted-name"?: string,
            }"#,
        );
        let iface = match decls(&file)[0] {
            Decl::Interface(i) => i,
            other => panic!("expected interface, got {:?}", other),
        };
        assert_eq!(iface.extends.len(), 2);
        assert_eq!(iface.members.len(), 7);
        assert!(matches!(
            iface.members[1].value,
            ObjectTypeMember::IndexSignature(IndexSignature { readonly: true, .. })
        ));
        assert!(matches!(iface.members[3].value, ObjectTypeMember::CallSignature(_)));
        assert!(matches!(iface.members[4].value, ObjectTypeMember::ConstructSignature(_)));
        assert_eq!(
            iface.members[5].value.name().map(|n| n.text()),
            Some("[Symbol.iterator]".to_string())
        );
        assert_eq!(
            iface.members[6].value.name().map(|n| n.text()),
            Some("quoted-name".to_string())
        );
    }

    #[test]
    fn test_parse_dotted_namespace() {
        let file = parse("declare namespace A.B.C { export var x: number; }");
        let outer = match decls(&file)[0] {
            Decl::Module(m) => m,
            other => panic!("expected module, got {:?}", other),
        };
        assert_eq!(outer.name.text(), "A");
        let b = match &outer.body {
            Some(ModuleBody::Namespace(inner)) => &inner.value,
            other => panic!("expected nested namespace, got {:?}", other),
        };
        assert_eq!(b.name.text(), "B");
        match &b.body {
            Some(ModuleBody::Namespace(c)) => {
                assert_eq!(c.value.name.text(), "C");
                assert!(matches!(c.value.body, Some(ModuleBody::Block(ref items)) if items.len() == 1));
            }
            other => panic!("expected nested namespace, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_ambient_module_and_global() {
        let file = parse(
            r#"declare module "fs" {
                export function readFileSync(path: string): string;
                export = fs;
            }
            declare module "shorthand";
            declare global { interface Window { x: number } }"#,
        );
        let modules: Vec<_> = decls(&file)
            .into_iter()
            .filter_map(|d| match d {
                Decl::Module(m) => Some(m),
                _ => None,
            })
            .collect();
        assert_eq!(modules.len(), 3);
        assert!(modules[0].name.is_string());
        assert!(modules[1].body.is_none());
        assert!(modules[2].is_global);
        assert!(!file.is_external_module());
    }

    #[test]
    fn test_parse_union_intersection_and_function_types() {
        match alias_type("type T = | A | B & C | ((x: number) => void);") {
            Type::Union(parts) => {
                assert_eq!(parts.len(), 3);
                assert!(matches!(parts[1].value, Type::Intersection(_)));
                assert!(matches!(parts[2].value, Type::Paren(_)));
            }
            other => panic!("expected union, got {:?}", other),
        }
        assert!(matches!(
            alias_type("type F = new <T>(...args: T[]) => T;"),
            Type::Function(FunctionType { is_constructor: true, .. })
        ));
        assert!(matches!(alias_type("type P = (string);"), Type::Paren(_)));
    }

    #[test]
    fn test_parse_conditional_with_infer() {
        match alias_type("type R<T> = T extends (...a: any[]) => infer U extends string ? U : never;") {
            Type::Conditional { extends_type, false_type, .. } => {
                assert!(matches!(extends_type.value, Type::Function(_)));
                assert!(matches!(false_type.value, Type::Keyword(KeywordType::Never)));
            }
            other => panic!("expected conditional, got {:?}", other),
        }
        match alias_type("type E<T> = T extends [infer H, ...infer Rest] ? H : never;") {
            Type::Conditional { extends_type, .. } => {
                assert!(matches!(extends_type.value, Type::Tuple(ref e) if e.len() == 2 && e[1].is_rest));
            }
            other => panic!("expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_mapped_and_indexed_types() {
        match alias_type("type P<T> = { readonly [K in keyof T]?: T[K] };") {
            Type::Mapped(mapped) => {
                assert_eq!(mapped.readonly, Some(MappedModifier::Present));
                assert_eq!(mapped.optional, Some(MappedModifier::Present));
                assert!(matches!(mapped.constraint.value, Type::Keyof(_)));
                assert!(matches!(
                    mapped.value_type.as_ref().unwrap().value,
                    Type::IndexedAccess { .. }
                ));
            }
            other => panic!("expected mapped type, got {:?}", other),
        }
        match alias_type("type M<T> = { -readonly [K in keyof T]-?: T[K] };") {
            Type::Mapped(mapped) => {
                assert_eq!(mapped.readonly, Some(MappedModifier::Remove));
                assert_eq!(mapped.optional, Some(MappedModifier::Remove));
            }
            other => panic!("expected mapped type, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_literal_and_query_types() {
        match alias_type("type L = \"a\" | 1 | -2 | true | typeof globalThis.x | unique symbol;") {
            Type::Union(parts) => {
                assert!(matches!(parts[0].value, Type::Literal(LiteralType::String(ref s)) if s == "a"));
                assert!(matches!(parts[2].value, Type::Literal(LiteralType::Number(n)) if n == -2.0));
                assert!(matches!(parts[4].value, Type::TypeQuery { .. }));
                assert!(matches!(parts[5].value, Type::UniqueSymbol));
            }
            other => panic!("expected union, got {:?}", other),
        }
        assert!(matches!(
            alias_type("type I = typeof import(\"fs\").readFile;"),
            Type::ImportType { is_typeof: true, .. }
        ));
        assert!(matches!(
            alias_type("type U<S extends string> = intrinsic;"),
            Type::Keyword(KeywordType::Intrinsic)
        ));
    }

    #[test]
    fn test_parse_template_literal_type() {
        match alias_type("type T = `on${Capitalize<string>}Changed`;") {
            Type::TemplateLiteral { parts, types } => {
                assert_eq!(parts, vec!["on".to_string(), "Changed".to_string()]);
                assert_eq!(types.len(), 1);
            }
            other => panic!("expected template literal, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_type_predicates() {
        let file = parse(
            "declare function isString(x: unknown): x is string;\n\
             declare function assert(v: unknown): asserts v;",
        );
        let returns: Vec<_> = decls(&file)
            .into_iter()
            .filter_map(|d| match d {
                Decl::Function(f) => f.signature.return_type.clone(),
                _ => None,
            })
            .collect();
        assert!(matches!(returns[0].value, Type::Predicate { asserts: false, ref ty, .. } if ty.is_some()));
        assert!(matches!(returns[1].value, Type::Predicate { asserts: true, ref ty, .. } if ty.is_none()));
    }

    #[test]
    fn test_parse_exports() {
        let file = parse(
            r#"import { a, type b as c } from "./m";
            import * as ns from "ns";
            import fs = require("fs");
            export { a as default, c };
            export * from "./other";
            export default Foo.Bar;
            export = Foo;
            export as namespace MyLib;"#,
        );
        assert!(file.is_external_module());
        let exports: Vec<_> = file
            .items
            .iter()
            .filter_map(|i| match &i.value {
                ModuleItem::Export(e) => Some(e),
                _ => None,
            })
            .collect();
        assert_eq!(exports.len(), 5);
        assert!(matches!(exports[2], ExportDecl::Default(Some(_))));
        assert!(matches!(exports[3], ExportDecl::Assignment(ref n) if n.value.to_string() == "Foo"));
        assert!(matches!(exports[4], ExportDecl::AsNamespace(_)));
    }

    #[test]
    fn test_parse_enum() {
        let file = parse("declare const enum E { A = 1, B, C = \"c\" }");
        match decls(&file)[0] {
            Decl::Enum(e) => {
                assert!(e.is_const);
                assert_eq!(e.members.len(), 3);
                assert_eq!(e.members[0].value.init, Some(Initializer::Number(1.0)));
                assert_eq!(e.members[1].value.init, None);
            }
            other => panic!("expected enum, got {:?}", other),
        }
    }

    #[test]
    fn test_skips_executable_code() {
        let file = parse(
            r#"var x = 1;
            function f(a) { if (a) { return 1; } else { return 2; } }
            x = f(x) + 2;
            for (let i = 0; i < 3; i++) { console.log(i); }
            class C { m() { return this; } }"#,
        );
        let names: Vec<_> = decls(&file)
            .into_iter()
            .filter_map(|d| match d {
                Decl::Function(f) => f.name.as_ref().map(|n| n.value.name.clone()),
                Decl::Class(c) => c.name.as_ref().map(|n| n.value.name.clone()),
                Decl::Var(v) => Some(v.declarations[0].value.name.value.name.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["x", "f", "C"]);
    }

    #[test]
    fn test_recovers_from_bad_member() {
        let (file, errors) = parse_source(
            "interface A { ok: string; bad: ; other: number }\ndeclare var after: A;",
            0,
        );
        assert!(!errors.is_empty());
        match &file.items[0].value {
            ModuleItem::Decl(d) => match &d.value {
                Decl::Interface(i) => {
                    let names: Vec<_> = i.members.iter().filter_map(|m| m.value.name()).map(|n| n.text()).collect();
                    assert_eq!(names, vec!["ok", "other"]);
                }
                other => panic!("expected interface, got {:?}", other),
            },
            other => panic!("expected declaration, got {:?}", other),
        }
        assert_eq!(file.items.len(), 2);
    }

    #[test]
    fn test_unterminated_string_reported() {
        let (_, errors) = parse_source("declare var s: \"abc", 0);
        assert!(!errors.is_empty());
    }
}
