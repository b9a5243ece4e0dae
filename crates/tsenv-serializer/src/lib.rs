//! # tsenv serializer
//!
//! Turns the declarations of a checked program into a flat, acyclic type
//! graph: every type becomes a record in one array and records refer to
//! each other by index. Named declarations are then listed in three
//! partitions (`globals`, `types`, `ambient`) pointing into that array.

mod analyze;
mod assemble;
mod error;
mod extract;
mod qname;
pub mod reader;
mod record;
mod serializer;

// Re-export public API
pub use analyze::analyze;
pub use error::SerializeError;
pub use extract::{extract, DeclarationRecord};
pub use qname::{QualifiedName, QualifiedNames};
pub use reader::{read_document, ReadError};
pub use record::{
    ClassRecord, GenericRecord, InterfaceRecord, NamedType, OutputDocument, ParameterRecord,
    PropertyMap, SerializationId, SignatureRecord, TypeRecord,
};
pub use serializer::{Graph, TypeSerializer};

use tsenv_checker::Program;

// =============================================================================
// Public API
// =============================================================================

/// Serialize the type environment declared by `program`.
pub fn analyze_program(program: &Program) -> Result<OutputDocument, SerializeError> {
    let mut checker = program.checker();
    analyze(&mut checker)
}

/// Render a document as JSON text.
pub fn to_json(document: &OutputDocument, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tsenv_checker::{check_files, CompilerOptions};

    #[test]
    fn test_analyze_program_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("env.d.ts");
        fs::write(&path, "interface Point { x: number; y: number }\ndeclare var origin: Point;")
            .expect("write");
        let (program, diagnostics) = check_files(&[path], CompilerOptions::default()).expect("load");
        assert!(diagnostics.is_empty());

        let doc = analyze_program(&program).expect("analyze");
        doc.validate().expect("valid");
        assert_eq!(doc.types[0].q_name, vec!["Point".to_string()]);
        assert_eq!(doc.globals[0].ty, doc.types[0].ty);
    }

    #[test]
    fn test_to_json_round_trips_through_reader() {
        let program = Program::from_sources(
            &[("env.d.ts", "declare function f(a: string, ...rest: number[]): void;")],
            CompilerOptions::default(),
        );
        let doc = analyze_program(&program).expect("analyze");
        for pretty in [false, true] {
            let text = to_json(&doc, pretty).expect("json");
            assert_eq!(read_document(&text).expect("read"), doc);
        }
    }
}
