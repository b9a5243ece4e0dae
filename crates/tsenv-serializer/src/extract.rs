//! Declaration extraction
//!
//! Collects the named declarations of every source file that make up the
//! observable environment, together with their types and qualified names.

use tracing::trace;
use tsenv_checker::{NodeId, SyntaxKind, TypeChecker, TypeId};

use crate::qname::{QualifiedName, QualifiedNames};

#[derive(Debug, Clone)]
pub struct DeclarationRecord {
    pub qualified_name: QualifiedName,
    pub ty: TypeId,
    pub kind: SyntaxKind,
    pub declaration: NodeId,
}

fn is_extracted(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::VariableDeclaration
            | SyntaxKind::ClassDeclaration
            | SyntaxKind::FunctionDeclaration
            | SyntaxKind::ModuleDeclaration
            | SyntaxKind::InterfaceDeclaration
    )
}

/// Every variable, class, function, namespace and interface declaration
/// in file order, then first-seen name order within a file.
pub fn extract(checker: &mut TypeChecker<'_>, names: &mut QualifiedNames) -> Vec<DeclarationRecord> {
    let mut records = Vec::new();
    for file in 0..checker.program().files().len() {
        let declarations: Vec<NodeId> = checker
            .named_declarations(file)
            .map(|index| index.values().flatten().copied().collect())
            .unwrap_or_default();
        for declaration in declarations {
            let kind = checker.node_kind(declaration);
            if !is_extracted(kind) {
                continue;
            }
            let ty = checker.type_at_declaration(declaration);
            let qualified_name = names.qualified_name_of(checker, declaration);
            trace!(name = ?qualified_name, %kind, "extracted declaration");
            records.push(DeclarationRecord {
                qualified_name,
                ty,
                kind,
                declaration,
            });
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsenv_checker::{CompilerOptions, Program};

    #[test]
    fn test_extracts_declarations_of_interest() {
        let program = Program::from_sources(
            &[(
                "test.d.ts",
                "interface I { p: string }\ntype Alias = number;\ndeclare var v: I;\n\
                 declare function f(x: number): void;\ndeclare class C { m(): void }\n\
                 declare namespace N { var inner: string; }\ndeclare enum E { A }",
            )],
            CompilerOptions::default(),
        );
        let mut checker = program.checker();
        let mut names = QualifiedNames::new();
        let records = extract(&mut checker, &mut names);
        let summary: Vec<(String, SyntaxKind)> = records
            .iter()
            .map(|r| (r.qualified_name.join("."), r.kind))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("I".to_string(), SyntaxKind::InterfaceDeclaration),
                ("v".to_string(), SyntaxKind::VariableDeclaration),
                ("f".to_string(), SyntaxKind::FunctionDeclaration),
                ("C".to_string(), SyntaxKind::ClassDeclaration),
                ("N".to_string(), SyntaxKind::ModuleDeclaration),
                ("N.inner".to_string(), SyntaxKind::VariableDeclaration),
            ]
        );
    }

    #[test]
    fn test_files_are_visited_in_order() {
        let program = Program::from_sources(
            &[("a.d.ts", "declare var a: string;"), ("b.d.ts", "declare var b: number;")],
            CompilerOptions::default(),
        );
        let mut checker = program.checker();
        let mut names = QualifiedNames::new();
        let records = extract(&mut checker, &mut names);
        let files: Vec<usize> = records.iter().map(|r| checker.node(r.declaration).file).collect();
        assert_eq!(files, vec![0, 1]);
    }
}
