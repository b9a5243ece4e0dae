//! # tsenv AST
//!
//! Syntax tree for TypeScript declaration files. Only the declaration
//! surface is modelled: executable statements and expression bodies are
//! recorded as skipped items, and the few expression positions that matter
//! for types (heritage clauses, `export =`, `typeof` queries) are entity
//! names.

use std::fmt;

// =============================================================================
// Core Types (kept in lib.rs - used by all modules)
// =============================================================================

/// Source location information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub file_id: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, file_id: usize) -> Self {
        Self { start, end, file_id }
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            file_id: self.file_id,
        }
    }
}

/// AST node wrapper that includes span information
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub span: Span,
    pub value: T,
}

impl<T> Node<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { span, value }
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Dotted name such as `A.B.C`, used wherever a declaration file refers to
/// an entity by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityName {
    pub parts: Vec<Ident>,
}

impl EntityName {
    pub fn simple(name: impl Into<String>) -> Self {
        Self { parts: vec![Ident::new(name)] }
    }

    pub fn first(&self) -> &str {
        self.parts.first().map(|p| p.name.as_str()).unwrap_or("")
    }

    pub fn last(&self) -> &str {
        self.parts.last().map(|p| p.name.as_str()).unwrap_or("")
    }

    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", part.name)?;
        }
        Ok(())
    }
}

// =============================================================================
// Module Declarations
// =============================================================================

pub mod types;
pub mod decl;
pub mod module;

pub use types::*;
pub use decl::*;
pub use module::*;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_span() -> Span {
        Span::new(0, 0, 0)
    }

    #[test]
    fn test_keyword_types() {
        assert_eq!(format!("{}", KeywordType::Number), "number");
        assert_eq!(format!("{}", KeywordType::Object), "object");

        let array_type = Type::Array(Box::new(Node::new(
            Type::Keyword(KeywordType::String),
            dummy_span(),
        )));
        assert!(matches!(array_type, Type::Array(_)));
    }

    #[test]
    fn test_entity_name_display() {
        let name = EntityName {
            parts: vec![Ident::new("A"), Ident::new("B"), Ident::new("C")],
        };
        assert_eq!(name.to_string(), "A.B.C");
        assert_eq!(name.first(), "A");
        assert_eq!(name.last(), "C");
        assert!(!name.is_simple());
        assert!(EntityName::simple("x").is_simple());
    }

    #[test]
    fn test_property_name_text() {
        let ident = PropertyName::Ident(Node::new(Ident::new("foo"), dummy_span()));
        assert_eq!(ident.text(), "foo");
        assert_eq!(PropertyName::String("a-b".into()).text(), "a-b");
        assert_eq!(PropertyName::Number(1.0).text(), "1");
        assert_eq!(PropertyName::Number(1.5).text(), "1.5");
        let computed = PropertyName::Computed(Node::new(
            EntityName {
                parts: vec![Ident::new("Symbol"), Ident::new("iterator")],
            },
            dummy_span(),
        ));
        assert_eq!(computed.text(), "[Symbol.iterator]");
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(4, 10, 2);
        let b = Span::new(1, 6, 2);
        assert_eq!(a.merge(&b), Span::new(1, 10, 2));
    }

    #[test]
    fn test_module_name_text() {
        let quoted = ModuleName::String("fs".into());
        assert!(quoted.is_string());
        assert_eq!(quoted.text(), "fs");
        let ident = ModuleName::Ident(Node::new(Ident::new("NS"), dummy_span()));
        assert!(!ident.is_string());
        assert_eq!(ident.text(), "NS");
    }

    #[test]
    fn test_signature_min_arguments() {
        let param = |name: &str, optional: bool, is_rest: bool| Param {
            name: ParamName::Ident(Node::new(Ident::new(name), dummy_span())),
            type_annotation: None,
            optional,
            is_rest,
            has_initializer: false,
            accessibility: None,
            span: dummy_span(),
        };
        let sig = SignatureDecl {
            type_params: None,
            params: vec![
                param("a", false, false),
                param("b", true, false),
                param("rest", false, true),
            ],
            return_type: None,
        };
        assert_eq!(sig.min_argument_count(), 1);
        assert!(sig.has_rest_parameter());
    }
}
