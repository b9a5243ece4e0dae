//! # tsenv checker
//!
//! Loads a program of TypeScript declaration files, binds declarations to
//! symbols and answers type queries over them. The checker is lazy: types,
//! members and signatures are computed the first time they are requested
//! and cached by identity afterwards.

mod binder;
mod builtins;
mod checker;
mod error;
mod instantiate;
mod members;
mod options;
mod program;
mod resolution;
mod resolve;
mod symbols;
mod syntax;
mod type_nodes;
mod types;

// Re-export public API
pub use binder::Binding;
pub use builtins::Intrinsics;
pub use checker::TypeChecker;
pub use error::{codes, Diagnostic, ProgramError};
pub use members::PropertyInfo;
pub use options::{CompilerOptions, ModuleResolution};
pub use program::{Program, SourceFileInfo};
pub use resolution::{is_relative_specifier, normalize, CompilerHost, FileSystemHost, MemoryHost};
pub use resolve::Meaning;
pub use symbols::{names, Symbol, SymbolFlags, SymbolId, SymbolTable};
pub use syntax::{DeclName, NodeData, NodeId, NodePayload, SyntaxKind};
pub use types::{
    AnonymousOrigin, DeclaredMembers, LiteralValue, ObjectFlags, ResolvedMembers, Signature,
    SignatureParameter, TypeData, TypeFlags, TypeId, TypeKind,
};

use std::path::PathBuf;

// =============================================================================
// Public API
// =============================================================================

/// Load the programs rooted at `roots` from disk and collect every
/// diagnostic the checker finds in them.
pub fn check_files(
    roots: &[PathBuf],
    options: CompilerOptions,
) -> Result<(Program, Vec<Diagnostic>), ProgramError> {
    let program = Program::load(roots, options)?;
    let diagnostics = program.checker().pre_emit_diagnostics();
    Ok((program, diagnostics))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_check_files_reports_diagnostics() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.d.ts");
        fs::write(&path, "declare var x: Missing;\ndeclare var y: string;").expect("write");
        let (program, diagnostics) = check_files(&[path], CompilerOptions::default()).expect("load");
        assert_eq!(program.files().len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, codes::CANNOT_FIND_NAME);
        assert_eq!(diagnostics[0].message, "Cannot find name 'Missing'.");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let result = check_files(&[PathBuf::from("/nonexistent/a.d.ts")], CompilerOptions::default());
        assert!(matches!(result, Err(ProgramError::MissingFile(_))));
    }
}
