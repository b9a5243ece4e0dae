//! Analysis orchestration
//!
//! Extracts declarations, serializes their types and sorts them into the
//! three partitions of the output:
//!
//! - `types`: interfaces and classes, under their full qualified name
//! - `globals`: other top-level declarations
//! - `ambient`: ambient modules under their unquoted specifier, and the
//!   direct non-interface members of ambient modules with the module
//!   segment dropped

use tracing::info;
use tsenv_checker::{SyntaxKind, TypeChecker};

use crate::assemble::{assemble, Entry};
use crate::error::SerializeError;
use crate::extract::{extract, DeclarationRecord};
use crate::qname::{is_quoted, unquote, QualifiedNames};
use crate::record::OutputDocument;
use crate::serializer::TypeSerializer;

pub fn analyze(checker: &mut TypeChecker<'_>) -> Result<OutputDocument, SerializeError> {
    let mut names = QualifiedNames::new();
    let declarations = extract(checker, &mut names);
    let mut serializer = TypeSerializer::new(checker);

    let mut types = Vec::new();
    for declaration in declarations.iter().filter(|d| is_type_declaration(d.kind)) {
        types.push(serialize(&mut serializer, declaration, declaration.qualified_name.to_vec())?);
    }

    let mut globals = Vec::new();
    let mut ambient = Vec::new();
    for declaration in declarations
        .iter()
        .filter(|d| d.kind != SyntaxKind::InterfaceDeclaration)
    {
        match &*declaration.qualified_name {
            [name] if is_quoted(name) => {
                let path = vec![unquote(name).to_string()];
                ambient.push(serialize(&mut serializer, declaration, path)?);
            }
            [_] => {
                let path = declaration.qualified_name.to_vec();
                globals.push(serialize(&mut serializer, declaration, path)?);
            }
            [module, member] if is_quoted(module) => {
                ambient.push(serialize(&mut serializer, declaration, vec![member.clone()])?);
            }
            _ => {}
        }
    }

    let records = serializer.finish()?;
    info!(
        declarations = declarations.len(),
        records = records.len(),
        globals = globals.len(),
        types = types.len(),
        ambient = ambient.len(),
        "environment serialized"
    );
    Ok(assemble(records, globals, types, ambient))
}

fn is_type_declaration(kind: SyntaxKind) -> bool {
    matches!(kind, SyntaxKind::InterfaceDeclaration | SyntaxKind::ClassDeclaration)
}

/// Classes are entered by their constructor.
fn serialize(
    serializer: &mut TypeSerializer<'_, '_>,
    declaration: &DeclarationRecord,
    path: Vec<String>,
) -> Result<Entry, SerializeError> {
    let constructor_form = declaration.kind == SyntaxKind::ClassDeclaration;
    let id = serializer.serialize(declaration.ty, constructor_form)?;
    Ok((path, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TypeRecord;
    use tsenv_checker::{CompilerOptions, Program};

    fn analyze_source(source: &str) -> OutputDocument {
        let program = Program::from_sources(&[("test.d.ts", source)], CompilerOptions::default());
        let mut checker = program.checker();
        analyze(&mut checker).expect("analyze")
    }

    fn names(entries: &[crate::record::NamedType]) -> Vec<String> {
        entries.iter().map(|e| e.q_name.join(".")).collect()
    }

    #[test]
    fn test_partitions() {
        let doc = analyze_source(
            "interface I { a: string }\ndeclare class C {}\ndeclare var v: I;\n\
             declare namespace N { var inner: number; interface J {} }\n\
             declare module 'm' { export var exported: string; export interface Hidden {} }",
        );
        assert_eq!(names(&doc.types), vec!["I", "C", "N.J", "'m'.Hidden"]);
        assert_eq!(names(&doc.globals), vec!["C", "v", "N"]);
        assert_eq!(names(&doc.ambient), vec!["m", "exported"]);
    }

    #[test]
    fn test_classes_are_entered_by_constructor() {
        let doc = analyze_source("declare class C { x: number }");
        let id = doc.types[0].ty;
        assert!(matches!(doc.data[id.index().expect("id")], TypeRecord::Class(_)));
        assert_eq!(doc.globals[0].ty, id);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let source = "interface A { b: B; list: A[] }\ninterface B { a: A }\ndeclare var a: A;\ndeclare class K extends Base {}\ndeclare class Base { k: K }";
        let first = serde_json::to_string(&analyze_source(source)).expect("json");
        let second = serde_json::to_string(&analyze_source(source)).expect("json");
        assert_eq!(first, second);
    }
}
