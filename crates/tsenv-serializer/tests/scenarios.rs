//! End-to-end environment scenarios run through the checker and serializer.

use serde_json::{json, Value};
use tsenv_checker::{CompilerOptions, Program};
use tsenv_serializer::{analyze_program, OutputDocument, SerializationId, TypeRecord};

fn analyze_files(files: &[(&str, &str)]) -> OutputDocument {
    let program = Program::from_sources(files, CompilerOptions::default());
    let doc = analyze_program(&program).expect("analyze");
    doc.validate().expect("every id resolves");
    doc
}

fn analyze_source(source: &str) -> OutputDocument {
    analyze_files(&[("env.d.ts", source)])
}

fn entry(entries: &[tsenv_serializer::NamedType], name: &str) -> SerializationId {
    entries
        .iter()
        .find(|e| e.q_name.join(".") == name)
        .unwrap_or_else(|| panic!("no entry named {}", name))
        .ty
}

fn as_json(doc: &OutputDocument, id: SerializationId) -> Value {
    serde_json::to_value(doc.record(id).expect("record")).expect("json")
}

#[test]
fn interface_and_variable_share_a_record() {
    let doc = analyze_source("interface Foo { x: number }\ndeclare var v: Foo;");
    let foo = entry(&doc.types, "Foo");
    assert_eq!(entry(&doc.globals, "v"), foo);

    let number = doc
        .data
        .iter()
        .position(|r| *r == TypeRecord::Number)
        .expect("number record");
    assert_eq!(
        as_json(&doc, foo),
        json!({
            "kind": "Interface",
            "typeParameters": [],
            "baseTypes": [],
            "declaredProperties": {"x": number},
            "declaredCallSignatures": [],
            "declaredConstructSignatures": [],
            "declaredStringIndexType": -1,
            "declaredNumberIndexType": -1
        })
    );
}

#[test]
fn class_constructor_returns_instance() {
    let doc = analyze_source("declare class K { constructor(n: number); method(n: number): boolean; }");
    let class = entry(&doc.types, "K");
    let TypeRecord::Class(record) = doc.record(class).expect("record") else {
        panic!("expected class record");
    };
    assert_eq!(record.constructors.len(), 1);
    let constructor = &record.constructors[0];
    assert_eq!(constructor.parameters.len(), 1);
    assert_eq!(constructor.parameters[0].name, "n");
    assert_eq!(doc.record(constructor.parameters[0].ty), Some(&TypeRecord::Number));

    let instance = constructor.resolved_return_type;
    assert_eq!(doc.record(instance), Some(&TypeRecord::ClassInstance { class_type: class }));
    assert_eq!(doc.instance_of(class), Some(instance));
    assert!(record.instance_properties.contains_key("method"));
}

#[test]
fn class_value_and_instance_types_differ() {
    let doc = analyze_source(
        "declare class C { }\ndeclare namespace Holder { var ctor: typeof C; var object: C; }\ndeclare var instance: C;",
    );
    let TypeRecord::Interface(holder) = doc.record(entry(&doc.globals, "Holder")).expect("record") else {
        panic!("expected namespace interface");
    };
    let ctor = holder.declared_properties["ctor"];
    let object = holder.declared_properties["object"];
    assert_ne!(ctor, object);
    assert_eq!(entry(&doc.globals, "instance"), object);
    let TypeRecord::Class(class) = doc.record(ctor).expect("record") else {
        panic!("expected class record");
    };
    assert_eq!(class.constructors[0].resolved_return_type, object);
}

#[test]
fn merged_interfaces_stay_separate_entries() {
    let doc = analyze_source("interface T { a: string }\ninterface T { b: string }\ndeclare var t: T;");
    let entries: Vec<_> = doc.types.iter().filter(|e| e.q_name == ["T"]).collect();
    assert_eq!(entries.len(), 2);
    assert_ne!(entries[0].ty, entries[1].ty);

    let own_properties = |id: SerializationId| match doc.record(id) {
        Some(TypeRecord::Interface(shape)) => shape.declared_properties.keys().cloned().collect::<Vec<_>>(),
        other => panic!("expected interface, found {:?}", other),
    };
    assert_eq!(own_properties(entries[0].ty), vec!["a"]);
    assert_eq!(own_properties(entries[1].ty), vec!["b"]);

    let merged = entry(&doc.globals, "t");
    assert_eq!(own_properties(merged), vec!["a", "b"]);
}

#[test]
fn union_across_redeclared_variables() {
    let source = "interface A { a: string }\ninterface B { b: string }\ndeclare var x: A | B;";
    let doc = analyze_files(&[("one.d.ts", source), ("two.d.ts", "declare var x: A | B;")]);
    let xs: Vec<_> = doc.globals.iter().filter(|e| e.q_name == ["x"]).collect();
    assert_eq!(xs.len(), 2);
    assert_eq!(xs[0].ty, xs[1].ty);
    assert_eq!(
        doc.record(xs[0].ty),
        Some(&TypeRecord::Union {
            elements: vec![entry(&doc.types, "A"), entry(&doc.types, "B")]
        })
    );
}

#[test]
fn ambient_module_members_lose_their_module_segment() {
    let doc = analyze_source("declare module 'foo' { export var bar: number; }\ndeclare var n: number;");
    let names: Vec<_> = doc.ambient.iter().map(|e| e.q_name.clone()).collect();
    assert_eq!(names, vec![vec!["foo".to_string()], vec!["bar".to_string()]]);
    assert_eq!(entry(&doc.ambient, "bar"), entry(&doc.globals, "n"));
    assert_eq!(doc.record(entry(&doc.ambient, "bar")), Some(&TypeRecord::Number));
}

#[test]
fn unresolved_mapped_type_is_a_placeholder() {
    let doc = analyze_source("declare function clone<T>(value: T): { [K in keyof T]: T[K] };");
    let TypeRecord::Interface(function) = doc.record(entry(&doc.globals, "clone")).expect("record") else {
        panic!("expected function interface");
    };
    let signature = &function.declared_call_signatures[0];
    assert_eq!(signature.type_parameters.len(), 1);
    assert_eq!(doc.record(signature.resolved_return_type), Some(&TypeRecord::Anonymous));
}

#[test]
fn primitives_are_shared_across_declarations() {
    let doc = analyze_source(
        "declare var a: number;\ndeclare function f(n: number): number;\ninterface I { n: number; s: string }",
    );
    let counts = doc.kind_counts();
    assert_eq!(counts["Number"], 1);
    assert_eq!(counts["String"], 1);
}

#[test]
fn output_is_deterministic() {
    let files = [
        ("a.d.ts", "declare class Tree<T> { children: Tree<T>[]; value: T; }\ndeclare var forest: Tree<string>[];"),
        ("b.d.ts", "declare namespace Util { function id<X>(x: X): X; var tree: Tree<number>; }"),
    ];
    let first = serde_json::to_string(&analyze_files(&files)).expect("json");
    let second = serde_json::to_string(&analyze_files(&files)).expect("json");
    assert_eq!(first, second);
}
