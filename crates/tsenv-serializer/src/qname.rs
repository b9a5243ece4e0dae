//! Qualified names
//!
//! A declaration's qualified name is its lexical path: the names of the
//! enclosing namespaces, classes, interfaces and type aliases, outermost
//! first, followed by its own name. Module specifiers are wrapped in
//! single quotes so `declare module 'fs'` stays distinguishable from
//! `namespace fs`.

use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::warn;
use tsenv_checker::{DeclName, NodeId, SyntaxKind, TypeChecker};

pub type QualifiedName = Rc<[String]>;

/// Memoizing resolver of qualified names
#[derive(Debug, Default)]
pub struct QualifiedNames {
    cache: FxHashMap<NodeId, QualifiedName>,
}

impl QualifiedNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn qualified_name_of(&mut self, checker: &TypeChecker<'_>, declaration: NodeId) -> QualifiedName {
        if let Some(name) = self.cache.get(&declaration) {
            return Rc::clone(name);
        }
        let name = compute(checker, declaration);
        self.cache.insert(declaration, Rc::clone(&name));
        name
    }
}

fn compute(checker: &TypeChecker<'_>, declaration: NodeId) -> QualifiedName {
    let own = checker.node(declaration).name.as_ref().map(segment).unwrap_or_default();
    let mut path = vec![own];
    for ancestor in checker.ancestors(declaration) {
        let data = checker.node(ancestor);
        match data.kind {
            SyntaxKind::ModuleDeclaration
            | SyntaxKind::ClassDeclaration
            | SyntaxKind::InterfaceDeclaration
            | SyntaxKind::TypeAliasDeclaration => {
                path.push(data.name.as_ref().map(segment).unwrap_or_default());
            }
            SyntaxKind::ModuleBlock
            | SyntaxKind::SourceFile
            | SyntaxKind::VariableStatement
            | SyntaxKind::VariableDeclaration
            | SyntaxKind::PropertySignature => {}
            kind => {
                warn!(
                    %kind,
                    declaration = %path[0],
                    "unexpected ancestor in qualified name, skipped"
                );
            }
        }
    }
    path.reverse();
    path.into()
}

fn segment(name: &DeclName) -> String {
    if name.is_string_literal {
        format!("'{}'", name.text)
    } else {
        name.text.clone()
    }
}

/// Whether a segment names an ambient module.
pub fn is_quoted(segment: &str) -> bool {
    segment.starts_with('\'')
}

/// A quoted segment without its quotes.
pub fn unquote(segment: &str) -> &str {
    segment
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(segment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsenv_checker::{CompilerOptions, Program};

    fn program(source: &str) -> Program {
        Program::from_sources(&[("test.d.ts", source)], CompilerOptions::default())
    }

    fn names_of(source: &str, name: &str) -> Vec<Vec<String>> {
        let program = program(source);
        let checker = program.checker();
        let mut names = QualifiedNames::new();
        checker.named_declarations(0).expect("file")[name]
            .iter()
            .map(|&d| names.qualified_name_of(&checker, d).to_vec())
            .collect()
    }

    #[test]
    fn test_nested_namespaces() {
        let names = names_of("declare namespace N { namespace M { var p: number; } }", "p");
        assert_eq!(names, vec![vec!["N", "M", "p"]]);
    }

    #[test]
    fn test_dotted_namespace() {
        let names = names_of("declare namespace A.B { function f(): void; }", "f");
        assert_eq!(names, vec![vec!["A", "B", "f"]]);
    }

    #[test]
    fn test_ambient_modules_are_quoted() {
        let names = names_of("declare module 'foo' { export var bar: number; }", "bar");
        assert_eq!(names, vec![vec!["'foo'", "bar"]]);
        let modules = names_of("declare module 'foo' { export var bar: number; }", "foo");
        assert_eq!(modules, vec![vec!["'foo'"]]);
    }

    #[test]
    fn test_members_are_qualified_by_their_container() {
        let names = names_of("interface I { size: number }\ndeclare class C { size: string }", "size");
        assert_eq!(names, vec![vec!["I", "size"], vec!["C", "size"]]);
    }

    #[test]
    fn test_parameter_properties_skip_the_constructor() {
        let names = names_of("declare class K { constructor(public size: number); }", "size");
        assert_eq!(names, vec![vec!["K", "size"]]);
    }

    #[test]
    fn test_names_are_memoized() {
        let program = program("declare var v: string;");
        let checker = program.checker();
        let v = checker.named_declarations(0).expect("file")["v"][0];
        let mut names = QualifiedNames::new();
        let first = names.qualified_name_of(&checker, v);
        let second = names.qualified_name_of(&checker, v);
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_unquote() {
        assert!(is_quoted("'foo'"));
        assert!(!is_quoted("foo"));
        assert_eq!(unquote("'foo'"), "foo");
        assert_eq!(unquote("bar"), "bar");
    }
}
