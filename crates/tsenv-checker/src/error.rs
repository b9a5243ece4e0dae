//! Diagnostics and program construction errors

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tsenv_ast::Span;

/// A problem found while loading, binding or checking the program.
///
/// Diagnostics never stop analysis; they are reported alongside the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Index of the source file, if the diagnostic has a location
    pub file: Option<usize>,
    pub start: usize,
    pub end: usize,
    pub message: String,
    /// TypeScript-compatible diagnostic code
    pub code: u32,
}

impl Diagnostic {
    pub fn new(span: Span, code: u32, message: impl Into<String>) -> Self {
        Self {
            file: Some(span.file_id),
            start: span.start,
            end: span.end,
            message: message.into(),
            code,
        }
    }

    /// A diagnostic not attached to any source location.
    pub fn global(code: u32, message: impl Into<String>) -> Self {
        Self {
            file: None,
            start: 0,
            end: 0,
            message: message.into(),
            code,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error TS{}: {}", self.code, self.message)
    }
}

/// Diagnostic codes emitted by the checker
pub mod codes {
    pub const FILE_NOT_FOUND: u32 = 6053;
    pub const UNSUPPORTED_EXTENSION: u32 = 6054;
    pub const PARSE_ERROR: u32 = 1005;
    pub const DUPLICATE_IDENTIFIER: u32 = 2300;
    pub const CANNOT_FIND_NAME: u32 = 2304;
    pub const CANNOT_FIND_MODULE: u32 = 2307;
    pub const NO_EXPORTED_MODULE_MEMBER: u32 = 2305;
    pub const GENERIC_ARITY: u32 = 2314;
    pub const NOT_GENERIC: u32 = 2315;
    pub const CIRCULAR_ALIAS: u32 = 2456;
    pub const CANNOT_FIND_NAMESPACE: u32 = 2503;
    pub const EXCESSIVE_INSTANTIATION: u32 = 2589;
    pub const CANNOT_FIND_TYPE_DEFINITION: u32 = 2688;
    pub const NO_EXPORTED_MEMBER: u32 = 2694;
    pub const VALUE_AS_TYPE: u32 = 2749;
    pub const IMPLICIT_ANY_VARIABLE: u32 = 7005;
    pub const IMPLICIT_ANY_PARAMETER: u32 = 7006;
    pub const IMPLICIT_ANY_RETURN: u32 = 7010;
}

/// Fatal errors raised while constructing a [`crate::Program`].
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("no input files")]
    NoInputs,

    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: {}", .0.display())]
    UnsupportedExtension(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(Span::new(3, 7, 1), codes::CANNOT_FIND_NAME, "Cannot find name 'Foo'.");
        assert_eq!(diag.file, Some(1));
        assert_eq!(diag.to_string(), "error TS2304: Cannot find name 'Foo'.");
        assert_eq!(Diagnostic::global(6053, "x").file, None);
    }

    #[test]
    fn test_program_error_messages() {
        let err = ProgramError::MissingFile(PathBuf::from("lib/a.d.ts"));
        assert_eq!(err.to_string(), "file not found: lib/a.d.ts");
        assert_eq!(ProgramError::NoInputs.to_string(), "no input files");
    }
}
